use chrono::Utc;

/// `YYYY-MM-DD HH:MM:SS` in UTC, the format stored in the emoji date columns.
pub fn timestamp() -> String {
    Utc::now().format("%Y-%m-%d %H:%M:%S").to_string()
}

pub fn unix_now() -> i64 {
    Utc::now().timestamp()
}
