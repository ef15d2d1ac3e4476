//! `hirewire-scheduler` — wall-clock recurring jobs.
//!
//! # Overview
//!
//! Two independent tasks share one `InterviewStore` and one outbound
//! channel:
//!
//! | Job      | Fires                | Behaviour                              |
//! |----------|----------------------|----------------------------------------|
//! | Reminder | daily at 08:00 local | retention sweep, then today's schedule |
//! | Ranking  | daily at 20:00 local | posts only when the day is Sunday      |
//!
//! The ranking job deliberately polls every evening and gates on the
//! weekday instead of arming a once-a-week timer: a process that was
//! down over the weekend still posts on the next Sunday without any
//! catch-up bookkeeping.
//!
//! Both jobs hold their first tick until the Discord gateway reports
//! ready, and both stop together when the shutdown channel flips.

pub mod jobs;
pub mod schedule;

pub use jobs::JobRunner;
pub use schedule::next_occurrence;
