pub mod serde;

use chrono::{DateTime, Local, TimeZone, Utc};

/// Milliseconds since the unix epoch.
pub type Timestamp = i64;

pub fn now_millis() -> Timestamp {
    Utc::now().timestamp_millis()
}

/// Local wall clock rendering of a timestamp, e.g. `2026/02/17 20:05:09`.
/// Out of range timestamps render as the raw number.
pub fn format_timestamp(timestamp: Timestamp) -> String {
    match Local.timestamp_millis_opt(timestamp).single() {
        Some(time) => time.format("%Y/%m/%d %H:%M:%S").to_string(),
        None => timestamp.to_string(),
    }
}

/// Compact stamp used in exported file names, e.g. `20260217200509`.
pub fn file_stamp<Tz: TimeZone>(time: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    time.format("%Y%m%d%H%M%S").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_stamp_is_zero_padded() {
        let time = Utc.with_ymd_and_hms(2026, 2, 3, 4, 5, 6).unwrap();
        assert_eq!(file_stamp(&time), "20260203040506");
    }

    #[test]
    fn timestamp_formatting_shape() {
        let rendered = format_timestamp(0);
        assert_eq!(rendered.len(), "1970/01/01 00:00:00".len());
        assert_eq!(format_timestamp(i64::MAX), i64::MAX.to_string());
    }
}
