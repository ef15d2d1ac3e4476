use std::sync::Arc;

use chrono::{DateTime, Datelike, Duration, Utc, Weekday};
use chrono_tz::Tz;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use hirewire_core::config::JobsConfig;
use hirewire_core::outbound::Outbound;
use hirewire_core::types::{Interview, OwnerCount, NO_TIME};
use hirewire_store::InterviewStore;

use crate::schedule::next_occurrence;

/// Local fire time for one recurring job.
#[derive(Debug, Clone, Copy)]
struct FireTime {
    hour: u32,
    minute: u32,
}

/// Drives the daily reminder and the Sunday ranking poll.
#[derive(Clone)]
pub struct JobRunner {
    store: Arc<InterviewStore>,
    outbound: mpsc::Sender<Outbound>,
    channel_id: u64,
    tz: Tz,
    reminder_at: FireTime,
    ranking_at: FireTime,
}

impl JobRunner {
    pub fn new(
        store: Arc<InterviewStore>,
        outbound: mpsc::Sender<Outbound>,
        channel_id: u64,
        tz: Tz,
        jobs: &JobsConfig,
    ) -> Self {
        Self {
            store,
            outbound,
            channel_id,
            tz,
            reminder_at: FireTime {
                hour: jobs.reminder_hour,
                minute: jobs.reminder_minute,
            },
            ranking_at: FireTime {
                hour: jobs.ranking_hour,
                minute: jobs.ranking_minute,
            },
        }
    }

    /// Spawn both jobs. Each waits for `ready` to turn true before its
    /// first tick and exits when `shutdown` flips (or its sender drops).
    pub fn spawn(
        self,
        ready: watch::Receiver<bool>,
        shutdown: watch::Receiver<bool>,
    ) -> (JoinHandle<()>, JoinHandle<()>) {
        let reminder = self.clone();
        let h1 = tokio::spawn(reminder.reminder_loop(ready.clone(), shutdown.clone()));
        let h2 = tokio::spawn(self.ranking_loop(ready, shutdown));
        (h1, h2)
    }

    async fn reminder_loop(
        self,
        ready: watch::Receiver<bool>,
        mut shutdown: watch::Receiver<bool>,
    ) {
        if !wait_ready(ready, &mut shutdown).await {
            return;
        }
        info!(
            hour = self.reminder_at.hour,
            minute = self.reminder_at.minute,
            "daily reminder job started"
        );
        loop {
            let next = next_occurrence(
                self.tz,
                self.reminder_at.hour,
                self.reminder_at.minute,
                Utc::now(),
            );
            debug!(next = %next, "daily reminder sleeping");
            if !sleep_or_shutdown(next, &mut shutdown).await {
                info!("daily reminder job stopping");
                return;
            }
            self.reminder_tick().await;
        }
    }

    async fn ranking_loop(
        self,
        ready: watch::Receiver<bool>,
        mut shutdown: watch::Receiver<bool>,
    ) {
        if !wait_ready(ready, &mut shutdown).await {
            return;
        }
        info!(
            hour = self.ranking_at.hour,
            minute = self.ranking_at.minute,
            "ranking poll started"
        );
        loop {
            let next = next_occurrence(
                self.tz,
                self.ranking_at.hour,
                self.ranking_at.minute,
                Utc::now(),
            );
            debug!(next = %next, "ranking poll sleeping");
            if !sleep_or_shutdown(next, &mut shutdown).await {
                info!("ranking poll stopping");
                return;
            }
            self.ranking_tick().await;
        }
    }

    /// One reminder tick: retention sweep, then today's schedule.
    /// Failures are logged and the tick is skipped; the next tick
    /// retries naturally.
    async fn reminder_tick(&self) {
        let today = self.store.today();

        // Records stay visible for one day after their date passes.
        match self.store.delete_before(today - Duration::days(1)) {
            Ok(0) => {}
            Ok(n) => info!(removed = n, "retention sweep"),
            Err(e) => error!(error = %e, "retention sweep failed"),
        }

        let interviews = match self.store.list_for_date(today) {
            Ok(list) => list,
            Err(e) => {
                error!(error = %e, "daily reminder query failed; skipping tick");
                return;
            }
        };

        let text = if interviews.is_empty() {
            "No interviews scheduled for today! 🎉".to_string()
        } else {
            render_daily(&interviews)
        };
        self.send(text).await;
    }

    /// One ranking tick. Posts only on Sunday; every other day is a
    /// deliberate no-op (see the crate docs).
    async fn ranking_tick(&self) {
        if Utc::now().with_timezone(&self.tz).weekday() != Weekday::Sun {
            debug!("ranking poll: not Sunday, skipping");
            return;
        }

        let counts = match self.store.count_by_owner() {
            Ok(counts) => counts,
            Err(e) => {
                error!(error = %e, "ranking query failed; skipping tick");
                return;
            }
        };

        let text = if counts.is_empty() {
            "No interviews tracked yet! 📭".to_string()
        } else {
            render_ranking(&counts)
        };
        self.send(text).await;
    }

    async fn send(&self, text: String) {
        let out = Outbound {
            channel_id: self.channel_id,
            text,
        };
        if self.outbound.send(out).await.is_err() {
            warn!("outbound channel closed — message dropped");
        }
    }
}

/// Combined message for the daily reminder: one line per interview.
pub fn render_daily(interviews: &[Interview]) -> String {
    let mut lines = vec!["**Today's Interviews 🚨**".to_string()];
    for record in interviews {
        let time = record.clock_time().unwrap_or(NO_TIME);
        lines.push(format!(
            "• **{}** at **{}**: {} - {}",
            record.owner_name, time, record.category, record.description
        ));
    }
    lines.join("\n")
}

/// 1-indexed ranking, descending by count (the store's order).
pub fn render_ranking(counts: &[OwnerCount]) -> String {
    let mut lines = vec!["**Weekly Interview Ranking 🏆**".to_string()];
    for (idx, row) in counts.iter().enumerate() {
        lines.push(format!(
            "{}. {}: {} interviews",
            idx + 1,
            row.owner_name,
            row.count
        ));
    }
    lines.join("\n")
}

/// Wait until `ready` broadcasts true. Returns false when shutdown wins
/// the race (or either sender is gone).
async fn wait_ready(mut ready: watch::Receiver<bool>, shutdown: &mut watch::Receiver<bool>) -> bool {
    loop {
        if *ready.borrow() {
            return true;
        }
        if *shutdown.borrow() {
            return false;
        }
        tokio::select! {
            changed = ready.changed() => {
                if changed.is_err() {
                    return false;
                }
            }
            changed = shutdown.changed() => {
                if changed.is_err() || *shutdown.borrow() {
                    return false;
                }
            }
        }
    }
}

/// Sleep until `until`, unless shutdown flips first. Returns true when
/// the fire time arrived.
async fn sleep_or_shutdown(until: DateTime<Utc>, shutdown: &mut watch::Receiver<bool>) -> bool {
    let wait = (until - Utc::now()).to_std().unwrap_or_default();
    tokio::select! {
        _ = tokio::time::sleep(wait) => true,
        changed = shutdown.changed() => changed.is_ok() && !*shutdown.borrow(),
    }
}
