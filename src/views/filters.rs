//! Time helpers available to every template
//!
//! - `time_ago`: relative time, e.g. `{{ tweet.created_at | time_ago }}` → "5 minutes ago"
//! - `format_time`: strftime-style, e.g. `{{ tweet.created_at | format_time(fmt="%b %e") }}`

use chrono::{DateTime, Utc};
use std::collections::HashMap;
use tera::{Tera, Value};

const DEFAULT_TIME_FORMAT: &str = "%Y-%m-%d %H:%M";

pub fn register(tera: &mut Tera) {
    tera.register_filter("time_ago", time_ago_filter);
    tera.register_filter("format_time", format_time_filter);
}

fn parse_timestamp(value: &Value, filter: &str) -> tera::Result<DateTime<Utc>> {
    let raw = value
        .as_str()
        .ok_or_else(|| tera::Error::msg(format!("`{}` expects an RFC 3339 string", filter)))?;
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| tera::Error::msg(format!("`{}` could not parse '{}': {}", filter, raw, e)))
}

fn time_ago_filter(value: &Value, _args: &HashMap<String, Value>) -> tera::Result<Value> {
    let then = parse_timestamp(value, "time_ago")?;
    Ok(Value::String(humanize_since(then, Utc::now())))
}

fn format_time_filter(value: &Value, args: &HashMap<String, Value>) -> tera::Result<Value> {
    let at = parse_timestamp(value, "format_time")?;
    let fmt = args
        .get("fmt")
        .and_then(Value::as_str)
        .unwrap_or(DEFAULT_TIME_FORMAT);

    let mut out = String::new();
    use std::fmt::Write;
    write!(out, "{}", at.format(fmt))
        .map_err(|_| tera::Error::msg(format!("`format_time` got an invalid format '{}'", fmt)))?;
    Ok(Value::String(out))
}

/// Relative description of `then` as seen from `now`.
///
/// Thresholds follow the usual "from now" buckets: under 45 seconds is
/// "a few seconds", under 90 is "a minute", then minutes up to 45, hours up
/// to 22, days up to 26, months up to 11, then years.
pub fn humanize_since(then: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let seconds = (now - then).num_seconds();
    if seconds < 0 {
        return "in the future".to_string();
    }

    let minutes = (seconds as f64 / 60.0).round() as i64;
    let hours = (seconds as f64 / 3600.0).round() as i64;
    let days = (seconds as f64 / 86400.0).round() as i64;

    let phrase = match seconds {
        s if s < 45 => "a few seconds".to_string(),
        s if s < 90 => "a minute".to_string(),
        _ if minutes < 45 => format!("{} minutes", minutes),
        _ if minutes < 90 => "an hour".to_string(),
        _ if hours < 22 => format!("{} hours", hours),
        _ if hours < 36 => "a day".to_string(),
        _ if days < 26 => format!("{} days", days),
        _ if days < 45 => "a month".to_string(),
        _ if days < 320 => format!("{} months", ((days as f64) / 30.0).round() as i64),
        _ if days < 548 => "a year".to_string(),
        _ => format!("{} years", ((days as f64) / 365.0).round() as i64),
    };
    format!("{} ago", phrase)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn ago(d: Duration) -> String {
        let now = Utc::now();
        humanize_since(now - d, now)
    }

    #[test]
    fn test_humanize_buckets() {
        assert_eq!(ago(Duration::seconds(3)), "a few seconds ago");
        assert_eq!(ago(Duration::seconds(60)), "a minute ago");
        assert_eq!(ago(Duration::minutes(5)), "5 minutes ago");
        assert_eq!(ago(Duration::minutes(60)), "an hour ago");
        assert_eq!(ago(Duration::hours(3)), "3 hours ago");
        assert_eq!(ago(Duration::hours(30)), "a day ago");
        assert_eq!(ago(Duration::days(4)), "4 days ago");
        assert_eq!(ago(Duration::days(30)), "a month ago");
        assert_eq!(ago(Duration::days(90)), "3 months ago");
        assert_eq!(ago(Duration::days(400)), "a year ago");
        assert_eq!(ago(Duration::days(365 * 3)), "3 years ago");
    }

    #[test]
    fn test_humanize_future() {
        assert_eq!(ago(Duration::minutes(-5)), "in the future");
    }

    #[test]
    fn test_format_time_filter() {
        let mut args = HashMap::new();
        args.insert("fmt".to_string(), Value::String("%d/%m/%Y".to_string()));
        let value = Value::String("2024-03-09T14:30:00Z".to_string());

        let out = format_time_filter(&value, &args).unwrap();
        assert_eq!(out, Value::String("09/03/2024".to_string()));

        let default = format_time_filter(&value, &HashMap::new()).unwrap();
        assert_eq!(default, Value::String("2024-03-09 14:30".to_string()));
    }

    #[test]
    fn test_filters_reject_non_timestamps() {
        let args = HashMap::new();
        assert!(time_ago_filter(&Value::from(42), &args).is_err());
        assert!(format_time_filter(&Value::String("yesterday".to_string()), &args).is_err());
    }
}
