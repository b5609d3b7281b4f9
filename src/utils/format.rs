use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{self, Deserialize};
use std::collections::BTreeSet;

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
    if s.is_empty() { Ok(None) } else { Ok(Some(s)) }
}

pub fn format_datetime(dt: &DateTime<Utc>) -> String {
    dt.format(FORMAT).to_string()
}

/// Parse a `YYYY-MM-DD` day as its first instant (UTC)
pub fn parse_day_start(day: &str) -> Result<DateTime<Utc>, String> {
    parse_day(day).map(|date| date.and_time(NaiveTime::MIN).and_utc())
}

/// Parse a `YYYY-MM-DD` day as its last representable instant (UTC)
pub fn parse_day_end(day: &str) -> Result<DateTime<Utc>, String> {
    parse_day(day).and_then(|date| {
        date.and_hms_nano_opt(23, 59, 59, 999_999_999)
            .map(|dt| dt.and_utc())
            .ok_or_else(|| format!("Invalid date: {}", day))
    })
}

fn parse_day(day: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(day.trim(), "%Y-%m-%d")
        .map_err(|e| format!("Invalid date '{}' (expected YYYY-MM-DD): {}", day, e))
}

pub fn format_tags_comma(tags: &BTreeSet<String>) -> String {
    tags.iter().cloned().collect::<Vec<_>>().join(", ")
}

pub fn format_tags_hash(tags: &BTreeSet<String>) -> String {
    tags.iter().map(|t| format!(" #{}", t)).collect()
}

/// Truncate to at most `max_len` characters, single line, with an ellipsis
pub fn truncate_string(s: &str, max_len: usize) -> String {
    let single_line = s.replace(['\n', '\r'], " ");
    if single_line.chars().count() <= max_len {
        return single_line;
    }
    let keep = max_len.saturating_sub(3);
    let mut truncated: String = single_line.chars().take(keep).collect();
    truncated.push_str("...");
    truncated
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Timelike;

    #[test]
    fn test_truncate_string() {
        assert_eq!(truncate_string("short", 10), "short");
        assert_eq!(truncate_string("line one\nline two", 100), "line one line two");
        assert_eq!(truncate_string("abcdefghij", 6), "abc...");
        assert_eq!(truncate_string("héllo wörld", 8), "héllo...");
    }

    #[test]
    fn test_day_bounds() {
        let start = parse_day_start("2024-03-01").unwrap();
        let end = parse_day_end("2024-03-01").unwrap();
        assert_eq!(format_datetime(&start), "2024-03-01 00:00:00");
        assert_eq!(format_datetime(&end), "2024-03-01 23:59:59");
        assert_eq!(end.nanosecond(), 999_999_999);
        assert!(parse_day_start("03/01/2024").is_err());
    }

    #[test]
    fn test_tag_formatting() {
        let tags: BTreeSet<String> = ["seo".to_string(), "blog".to_string()].into();
        assert_eq!(format_tags_comma(&tags), "blog, seo");
        assert_eq!(format_tags_hash(&tags), " #blog #seo");
    }
}
