use chrono::{DateTime, Duration, LocalResult, NaiveDate, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;

/// Next instant strictly after `after` at which the wall clock in `tz`
/// reads `hour:minute`.
///
/// On a spring-forward day where the target local time falls into the
/// DST gap, the first valid instant after the gap is used; on fall-back
/// days the earlier of the two occurrences wins.
pub fn next_occurrence(tz: Tz, hour: u32, minute: u32, after: DateTime<Utc>) -> DateTime<Utc> {
    let mut day = after.with_timezone(&tz).date_naive();

    loop {
        if let Some(at) = resolve_local(tz, day, hour, minute) {
            if at > after {
                return at;
            }
        }
        day += Duration::days(1);
    }
}

fn resolve_local(tz: Tz, day: NaiveDate, hour: u32, minute: u32) -> Option<DateTime<Utc>> {
    let time = NaiveTime::from_hms_opt(hour, minute, 0)?;
    match tz.from_local_datetime(&day.and_time(time)) {
        LocalResult::Single(dt) => Some(dt.with_timezone(&Utc)),
        LocalResult::Ambiguous(first, _) => Some(first.with_timezone(&Utc)),
        LocalResult::None => {
            // DST gap: probe forward minute by minute until local time
            // exists again (gaps are at most a few hours).
            let mut probe = day.and_time(time);
            for _ in 0..240 {
                probe += Duration::minutes(1);
                match tz.from_local_datetime(&probe) {
                    LocalResult::Single(dt) | LocalResult::Ambiguous(dt, _) => {
                        return Some(dt.with_timezone(&Utc));
                    }
                    LocalResult::None => {}
                }
            }
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono_tz::Europe::Paris;

    fn utc(y: i32, mo: u32, d: u32, h: u32, mi: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, mo, d, h, mi, 0).unwrap()
    }

    #[test]
    fn later_today_when_the_time_has_not_passed() {
        // 06:30 UTC in January is 07:30 in Paris (CET, +1).
        let next = next_occurrence(Paris, 8, 0, utc(2024, 1, 10, 6, 30));
        assert_eq!(next, utc(2024, 1, 10, 7, 0));
    }

    #[test]
    fn rolls_to_tomorrow_once_passed() {
        // 08:30 Paris has already passed 08:00.
        let next = next_occurrence(Paris, 8, 0, utc(2024, 1, 10, 7, 30));
        assert_eq!(next, utc(2024, 1, 11, 7, 0));
    }

    #[test]
    fn exact_fire_instant_schedules_the_next_day() {
        // "Strictly after": firing at 08:00 must not reschedule 08:00.
        let at = utc(2024, 1, 10, 7, 0);
        let next = next_occurrence(Paris, 8, 0, at);
        assert_eq!(next, utc(2024, 1, 11, 7, 0));
    }

    #[test]
    fn summer_offset_differs_from_winter() {
        // CEST is +2: 08:00 Paris is 06:00 UTC in July.
        let next = next_occurrence(Paris, 8, 0, utc(2024, 7, 10, 3, 0));
        assert_eq!(next, utc(2024, 7, 10, 6, 0));
    }

    #[test]
    fn dst_gap_resolves_past_the_jump() {
        // Paris springs 02:00 -> 03:00 on 2024-03-31; 02:30 never exists
        // that day. The job lands on the first valid instant instead of
        // being skipped.
        let next = next_occurrence(Paris, 2, 30, utc(2024, 3, 30, 23, 0));
        assert_eq!(next.with_timezone(&Paris).date_naive(),
                   NaiveDate::from_ymd_opt(2024, 3, 31).unwrap());
        assert!(next > utc(2024, 3, 31, 0, 59));
    }
}
