use chrono::{NaiveDate, NaiveDateTime};

/// Format used for on-screen labels and for the serialized point records.
pub const DISPLAY_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y/%m/%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y/%m/%d %H:%M",
];

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d"];

/// Parses a timestamp cell or user-supplied bound. Date-only values resolve to midnight.
///
/// Numeric fields do not need zero padding, so `2024-9-1 9:00:00` is accepted.
pub fn parse_timestamp(value: &str) -> Option<NaiveDateTime> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }

    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(trimmed, fmt) {
            return Some(dt);
        }
    }

    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(trimmed, fmt).ok())
        .and_then(|date| date.and_hms_opt(0, 0, 0))
}

pub fn format_display(timestamp: &NaiveDateTime) -> String {
    timestamp.format(DISPLAY_FORMAT).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(y: i32, m: u32, d: u32, h: u32, min: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .and_then(|date| date.and_hms_opt(h, min, s))
            .expect("valid date")
    }

    #[test]
    fn parses_common_layouts() {
        let expected = at(2024, 9, 1, 9, 5, 0);
        for input in [
            "2024-09-01 09:05:00",
            "2024-9-1 9:05:00",
            "2024-09-01T09:05:00",
            "2024/09/01 09:05:00",
            "2024-09-01 09:05",
            "  2024-09-01 09:05:00  ",
        ] {
            assert_eq!(parse_timestamp(input), Some(expected), "input {input:?}");
        }
    }

    #[test]
    fn keeps_fractional_seconds() {
        let parsed = parse_timestamp("2024-09-01 09:05:00.250").expect("fractional");
        assert_eq!(format_display(&parsed), "2024-09-01 09:05:00");
        assert!(parsed > at(2024, 9, 1, 9, 5, 0));
    }

    #[test]
    fn date_only_is_midnight() {
        assert_eq!(parse_timestamp("2024-09-30"), Some(at(2024, 9, 30, 0, 0, 0)));
        assert_eq!(parse_timestamp("2024/9/30"), Some(at(2024, 9, 30, 0, 0, 0)));
    }

    #[test]
    fn rejects_garbage() {
        assert_eq!(parse_timestamp(""), None);
        assert_eq!(parse_timestamp("yesterday"), None);
        assert_eq!(parse_timestamp("2024-13-01 09:00:00"), None);
        assert_eq!(parse_timestamp("2024-02-30"), None);
    }

    #[test]
    fn display_is_zero_padded() {
        assert_eq!(format_display(&at(2024, 9, 1, 9, 0, 0)), "2024-09-01 09:00:00");
    }
}
