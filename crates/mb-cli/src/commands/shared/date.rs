use chrono::{DateTime, NaiveDate, Utc};

/// Today's date in local time.
#[must_use]
pub fn today() -> NaiveDate {
    chrono::Local::now().date_naive()
}

/// The `--on` date, or today.
#[must_use]
pub fn on_or_today(on: Option<NaiveDate>) -> NaiveDate {
    on.unwrap_or_else(today)
}

/// Midnight UTC at the start of `date`.
#[must_use]
pub fn start_of_day(date: NaiveDate) -> DateTime<Utc> {
    date.and_time(chrono::NaiveTime::MIN).and_utc()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_date_wins() {
        let d = NaiveDate::from_ymd_opt(2026, 2, 7).unwrap();
        assert_eq!(on_or_today(Some(d)), d);
    }

    #[test]
    fn start_of_day_is_midnight() {
        let d = NaiveDate::from_ymd_opt(2026, 2, 7).unwrap();
        assert_eq!(start_of_day(d).to_rfc3339(), "2026-02-07T00:00:00+00:00");
    }
}
