//! Date and time string validation. Pure functions, no I/O.

use chrono::NaiveDate;

/// Parse a strict `YYYY-MM-DD` date.
///
/// The shape is checked before the calendar: exactly ten characters,
/// digits in the year/month/day positions, `-` separators. Anything
/// else (including shape-valid but impossible dates like `2024-02-30`)
/// yields `None`.
pub fn parse_date(s: &str) -> Option<NaiveDate> {
    let b = s.as_bytes();
    if b.len() != 10 || b[4] != b'-' || b[7] != b'-' {
        return None;
    }
    if !b
        .iter()
        .enumerate()
        .all(|(i, c)| matches!(i, 4 | 7) || c.is_ascii_digit())
    {
        return None;
    }
    let year: i32 = s[..4].parse().ok()?;
    let month: u32 = s[5..7].parse().ok()?;
    let day: u32 = s[8..10].parse().ok()?;
    NaiveDate::from_ymd_opt(year, month, day)
}

/// Validate an `HH:MM` 24-hour time: hour 0–23 (one or two digits),
/// minute 00–59.
pub fn parse_time(s: &str) -> bool {
    if !looks_like_time(s) {
        return false;
    }
    match s.split_once(':') {
        Some((h, m)) => match (h.parse::<u32>(), m.parse::<u32>()) {
            (Ok(hour), Ok(minute)) => hour <= 23 && minute <= 59,
            _ => false,
        },
        None => false,
    }
}

/// Shape check used by the legacy repair rule: does `s` look like a
/// clock time (`H:MM` / `HH:MM`)? No range validation: the point is to
/// catch time values historically written into the category column,
/// whatever their digits say.
pub fn looks_like_time(s: &str) -> bool {
    let Some((h, m)) = s.split_once(':') else {
        return false;
    };
    (1..=2).contains(&h.len())
        && m.len() == 2
        && h.bytes().all(|b| b.is_ascii_digit())
        && m.bytes().all(|b| b.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_dates_round_trip() {
        for s in ["2024-03-01", "2000-01-01", "2024-02-29", "1999-12-31"] {
            let date = parse_date(s).unwrap();
            assert_eq!(date.to_string(), s);
        }
    }

    #[test]
    fn malformed_dates_are_rejected() {
        for s in [
            "2024/03/01",
            "2024-3-01",
            "2024-03-1",
            "24-03-01",
            "2024-03-01 ",
            "2024-13-01",
            "2024-00-10",
            "2024-02-30",
            "2023-02-29",
            "2024-03",
            "",
            "march 1st",
        ] {
            assert!(parse_date(s).is_none(), "accepted {s:?}");
        }
    }

    #[test]
    fn valid_times_are_accepted() {
        for s in ["00:00", "0:00", "9:05", "09:05", "14:30", "23:59"] {
            assert!(parse_time(s), "rejected {s:?}");
        }
    }

    #[test]
    fn out_of_range_or_malformed_times_are_rejected() {
        for s in [
            "24:00", "23:60", "99:99", "14.30", "14:3", "14:305", "143:30", ":30", "14:", "",
            "noon",
        ] {
            assert!(!parse_time(s), "accepted {s:?}");
        }
    }

    #[test]
    fn time_shape_ignores_ranges() {
        assert!(looks_like_time("14:30"));
        assert!(looks_like_time("9:05"));
        // Shape only: out-of-range digits still count as time-shaped.
        assert!(looks_like_time("99:99"));
        assert!(!looks_like_time("14:3"));
        assert!(!looks_like_time("Technical"));
    }
}
