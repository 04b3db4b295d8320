use chrono::{DateTime, Local, Utc};
use serde::Deserialize;

const FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Serialize Option<String> as empty string when None
pub fn serialize_option_string<S>(option: &Option<String>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    match option {
        Some(value) => serializer.serialize_str(value),
        None => serializer.serialize_str(""),
    }
}

/// Deserialize empty string as None
pub fn deserialize_option_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    if s.trim().is_empty() { Ok(None) } else { Ok(Some(s)) }
}

/// Submission time in the user's local timezone.
pub fn format_local(dt: &DateTime<Utc>) -> String {
    dt.with_timezone(&Local).format(FORMAT).to_string()
}

pub fn format_datetime(dt: &DateTime<Utc>) -> String {
    dt.format(FORMAT).to_string()
}

/// Epoch second as a UTC timestamp, or the raw number if out of range.
pub fn format_epoch(epoch_second: u64) -> String {
    i64::try_from(epoch_second)
        .ok()
        .and_then(|s| DateTime::from_timestamp(s, 0))
        .map(|dt| format!("{} UTC", format_datetime(&dt)))
        .unwrap_or_else(|| epoch_second.to_string())
}

pub fn truncate_string(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let truncated: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", truncated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_epoch() {
        assert_eq!(format_epoch(0), "1970-01-01 00:00:00 UTC");
        assert_eq!(format_epoch(1704067200), "2024-01-01 00:00:00 UTC");
        assert_eq!(format_epoch(u64::MAX), u64::MAX.to_string());
    }

    #[test]
    fn test_truncate_string() {
        assert_eq!(truncate_string("short", 10), "short");
        assert_eq!(truncate_string("a long repository description", 10), "a long ...");
    }
}
