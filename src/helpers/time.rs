use chrono::{SecondsFormat, Utc};

/// Current UTC time as RFC 3339 with second precision, e.g. `2024-05-01T12:00:00Z`
pub fn now_iso() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true)
}
