//! Time utilities

use chrono::{DateTime, Utc};

/// Get current UTC time
pub fn now_utc() -> DateTime<Utc> {
    Utc::now()
}

/// Check if current time is between two datetimes
pub fn is_between(start: DateTime<Utc>, end: DateTime<Utc>) -> bool {
    let now = now_utc();
    now >= start && now <= end
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_is_between() {
        let now = now_utc();
        assert!(is_between(now - Duration::hours(1), now + Duration::hours(1)));
        assert!(!is_between(now + Duration::hours(1), now + Duration::hours(2)));
        assert!(!is_between(now - Duration::hours(2), now - Duration::hours(1)));
    }
}
