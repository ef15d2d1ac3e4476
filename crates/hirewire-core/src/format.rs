//! Grouped rendering of interview lists.
//!
//! Records are bucketed by their day offset from "today" (Today,
//! Tomorrow, then dated headers), and each line carries the id, the
//! optional owner name, the time annotation and the category/description
//! pair. The render-time leg of the legacy repair rule lives here: a
//! time-shaped category is shown as the time instead.

use chrono::NaiveDate;

use crate::types::{Interview, DEFAULT_CATEGORY};
use crate::validate::looks_like_time;

/// Render `records` under `title`, grouped relative to `today`.
///
/// Bucket order is Today, Tomorrow, then strictly ascending by actual
/// date; within a bucket the input order (already `(date, time)`-sorted
/// by the store) is preserved. `include_owner` adds the owner display
/// name to every line (the admin view).
///
/// Callers handle the empty case themselves, since the "nothing
/// scheduled" wording differs between the personal and admin views.
pub fn format_interview_list(
    records: &[Interview],
    title: &str,
    include_owner: bool,
    today: NaiveDate,
) -> String {
    let mut buckets: Vec<(NaiveDate, Vec<String>)> = Vec::new();

    for record in records {
        let line = render_line(record, include_owner);
        match buckets.iter_mut().find(|(date, _)| *date == record.date) {
            Some((_, lines)) => lines.push(line),
            None => buckets.push((record.date, vec![line])),
        }
    }

    buckets.sort_by_key(|&(date, _)| (pin_rank(date, today), date));

    let mut out = vec![format!("**{title}**")];
    for (date, lines) in buckets {
        out.push(format!("\n{}", bucket_label(date, today)));
        out.extend(lines);
    }
    out.join("\n")
}

/// Today and Tomorrow are pinned ahead of every dated bucket.
fn pin_rank(date: NaiveDate, today: NaiveDate) -> u8 {
    match date.signed_duration_since(today).num_days() {
        0 => 0,
        1 => 1,
        _ => 2,
    }
}

fn bucket_label(date: NaiveDate, today: NaiveDate) -> String {
    match date.signed_duration_since(today).num_days() {
        0 => "**Today** 🚨".to_string(),
        1 => "**Tomorrow** ⏳".to_string(),
        n if n > 1 => format!("**{}** (in {n} days) 📅", date.format("%A, %b %d")),
        n => format!("**{}** ({} days ago) 📅", date.format("%A, %b %d"), -n),
    }
}

fn render_line(record: &Interview, include_owner: bool) -> String {
    let mut category = record.category.as_str();
    let mut time_info = String::new();

    if let Some(t) = record.clock_time() {
        time_info = format!(" at {t}");
        // A time-shaped category next to a real time is stale data.
        if looks_like_time(category) {
            category = DEFAULT_CATEGORY;
        }
    } else if looks_like_time(category) {
        // Legacy rows: the time ended up in the category column. Show it
        // as the time and fall back to the default category.
        time_info = format!(" at {category}");
        category = DEFAULT_CATEGORY;
    }

    let mut line = format!("`ID {}`", record.id);
    if include_owner {
        line.push_str(&format!(" **{}**", record.owner_name));
    }
    line.push_str(&format!("{time_info} {category}: {}", record.description));
    line
}
