//! Database utility functions.

use chrono::{NaiveDate, NaiveDateTime, Utc};

/// Current UTC time, the value stamped into `created_at`, `updated_at`
/// and `completed_at`.
pub fn current_timestamp() -> NaiveDateTime {
    Utc::now().naive_utc()
}

/// Current UTC calendar day, used for the "today" and "upcoming" views.
pub fn today() -> NaiveDate {
    Utc::now().date_naive()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn today_matches_current_timestamp_date() {
        let now = current_timestamp();
        let day = today();
        // Only fails if the test straddles midnight UTC.
        assert!(now.date() == day || now.date().succ_opt() == Some(day));
    }
}
