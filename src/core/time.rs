use chrono::{DateTime, Utc};

/// Capture time for records and runs. `HUNTER_FIXED_TIME` (RFC 3339) pins it for replays.
pub fn now_utc() -> DateTime<Utc> {
    if let Ok(value) = std::env::var("HUNTER_FIXED_TIME") {
        if let Ok(dt) = DateTime::parse_from_rfc3339(&value) {
            return dt.with_timezone(&Utc);
        }
    }
    Utc::now()
}
