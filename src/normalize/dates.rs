//! Timestamp parsing for payload date fields.

use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, TimeZone, Utc};
use serde_json::Value;

use super::fields::{first_truthy, FieldTable};

/// Creation-date spellings seen across user payloads, in priority order.
pub const USER_CREATED_AT: FieldTable = &[
    "createdAt",
    "created_at",
    "createdOn",
    "created_on",
    "registeredAt",
    "registered_at",
    "registeredOn",
    "signupAt",
    "signedUpAt",
    "joinedAt",
    "joined_at",
    "dateCreated",
    "date_created",
];

/// Numbers above this are epoch milliseconds, below it epoch seconds.
const MILLIS_THRESHOLD: f64 = 100_000_000_000.0;

/// Parse RFC 3339, `YYYY-MM-DD HH:MM:SS`, `YYYY-MM-DD` (UTC midnight) or an
/// epoch number (seconds or milliseconds).
pub fn parse_timestamp(v: &Value) -> Option<DateTime<Utc>> {
    match v {
        Value::String(s) => parse_timestamp_str(s.trim()),
        Value::Number(n) => {
            let f = n.as_f64().filter(|f| f.is_finite())?;
            let millis = if f.abs() >= MILLIS_THRESHOLD { f } else { f * 1000.0 };
            Utc.timestamp_millis_opt(millis as i64).single()
        }
        _ => None,
    }
}

fn parse_timestamp_str(s: &str) -> Option<DateTime<Utc>> {
    if s.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// First truthy creation-date candidate that parses.
pub fn resolve_created_at(user: &Value) -> Option<DateTime<Utc>> {
    first_truthy(user, USER_CREATED_AT).and_then(parse_timestamp)
}

/// en-IN short form in the given zone: `05 Mar 2024, 02:30 pm`.
pub fn format_date_time_in<Tz: TimeZone>(dt: &DateTime<Utc>, tz: &Tz) -> String
where
    Tz::Offset: std::fmt::Display,
{
    dt.with_timezone(tz).format("%d %b %Y, %I:%M %P").to_string()
}

pub fn format_date_time(dt: &DateTime<Utc>) -> String {
    format_date_time_in(dt, &Local)
}

/// `Created: <date>` or `Created: --`.
pub fn created_line(created_at: Option<&DateTime<Utc>>) -> String {
    match created_at {
        Some(dt) => format!("Created: {}", format_date_time(dt)),
        None => "Created: --".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::FixedOffset;
    use serde_json::json;

    #[test]
    fn parses_common_shapes() {
        let rfc = parse_timestamp(&json!("2024-03-05T09:00:00Z")).unwrap();
        assert_eq!(rfc.to_rfc3339(), "2024-03-05T09:00:00+00:00");

        let day = parse_timestamp(&json!("2024-03-05")).unwrap();
        assert_eq!(day, rfc - chrono::Duration::hours(9));

        let secs = parse_timestamp(&json!(1_709_629_200)).unwrap();
        let millis = parse_timestamp(&json!(1_709_629_200_000_i64)).unwrap();
        assert_eq!(secs, millis);
    }

    #[test]
    fn garbage_is_absent() {
        assert!(parse_timestamp(&json!("not a date")).is_none());
        assert!(parse_timestamp(&json!("")).is_none());
        assert!(parse_timestamp(&json!({"at": 1})).is_none());
    }

    #[test]
    fn created_at_priority() {
        let user = json!({"joinedAt": "2023-01-01", "createdAt": "2024-01-01"});
        let dt = resolve_created_at(&user).unwrap();
        assert_eq!(dt.format("%Y").to_string(), "2024");
        assert!(resolve_created_at(&json!({"createdAt": ""})).is_none());
    }

    #[test]
    fn formats_in_en_in_style() {
        let dt = parse_timestamp(&json!("2024-03-05T09:00:00Z")).unwrap();
        let ist = FixedOffset::east_opt(5 * 3600 + 1800).unwrap();
        assert_eq!(format_date_time_in(&dt, &ist), "05 Mar 2024, 02:30 pm");
        assert_eq!(created_line(None), "Created: --");
    }
}
