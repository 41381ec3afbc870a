use chrono::{DateTime, Datelike, Days, NaiveDate, Utc, Weekday};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::errors::CoreError;
use crate::values::required;

/// A school term. Sessions are rostered on one weekday inside each term.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct SchoolTerm {
    pub id: String,
    pub year: i32,
    pub label: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub created_at: DateTime<Utc>,
}

impl SchoolTerm {
    /// # Errors
    ///
    /// Returns `CoreError::Validation` for a blank label or when the term
    /// ends before it starts.
    pub fn new(
        id: String,
        label: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
        now: DateTime<Utc>,
    ) -> Result<Self, CoreError> {
        let label = required("term label", label)?;
        if end_date < start_date {
            return Err(CoreError::validation(format!(
                "term '{label}' ends ({end_date}) before it starts ({start_date})"
            )));
        }
        Ok(Self {
            id,
            year: start_date.year(),
            label,
            start_date,
            end_date,
            created_at: now,
        })
    }

    #[must_use]
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start_date <= date && date <= self.end_date
    }

    #[must_use]
    pub fn overlaps(&self, other: &Self) -> bool {
        self.start_date <= other.end_date && other.start_date <= self.end_date
    }

    /// Every `weekday` between start and end, inclusive.
    #[must_use]
    pub fn session_dates(&self, weekday: Weekday) -> Vec<NaiveDate> {
        let offset = (7 + weekday.num_days_from_monday()
            - self.start_date.weekday().num_days_from_monday())
            % 7;
        let Some(first) = self.start_date.checked_add_days(Days::new(u64::from(offset))) else {
            return Vec::new();
        };
        first
            .iter_weeks()
            .take_while(|d| *d <= self.end_date)
            .collect()
    }

    /// 1-based week of `date` within the term, counted from the start date.
    #[must_use]
    pub fn week_number(&self, date: NaiveDate) -> Option<u32> {
        if !self.contains(date) {
            return None;
        }
        let days = (date - self.start_date).num_days();
        u32::try_from(days / 7 + 1).ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn term(start: NaiveDate, end: NaiveDate) -> SchoolTerm {
        SchoolTerm::new("trm-1".into(), "Term 1", start, end, Utc::now()).unwrap()
    }

    #[test]
    fn rejects_inverted_range() {
        assert!(SchoolTerm::new("trm-1".into(), "T", d(2026, 4, 1), d(2026, 3, 1), Utc::now()).is_err());
        assert!(SchoolTerm::new("trm-1".into(), " ", d(2026, 1, 1), d(2026, 3, 1), Utc::now()).is_err());
    }

    #[test]
    fn contains_is_inclusive() {
        let t = term(d(2026, 1, 27), d(2026, 4, 2));
        assert_eq!(t.year, 2026);
        assert!(t.contains(d(2026, 1, 27)));
        assert!(t.contains(d(2026, 4, 2)));
        assert!(!t.contains(d(2026, 4, 3)));
    }

    #[test]
    fn overlap_detection() {
        let a = term(d(2026, 1, 27), d(2026, 4, 2));
        let b = term(d(2026, 4, 2), d(2026, 6, 26));
        let c = term(d(2026, 4, 20), d(2026, 6, 26));
        assert!(a.overlaps(&b));
        assert!(!a.overlaps(&c));
        assert!(c.overlaps(&b));
    }

    #[test]
    fn session_dates_lists_each_saturday() {
        // 2026-01-27 is a Tuesday; first Saturday is 2026-01-31.
        let t = term(d(2026, 1, 27), d(2026, 2, 21));
        let dates = t.session_dates(Weekday::Sat);
        assert_eq!(
            dates,
            vec![d(2026, 1, 31), d(2026, 2, 7), d(2026, 2, 14), d(2026, 2, 21)]
        );
        let tuesdays = t.session_dates(Weekday::Tue);
        assert_eq!(tuesdays.first(), Some(&d(2026, 1, 27)));
        assert_eq!(tuesdays.len(), 4);
    }

    #[test]
    fn week_numbers() {
        let t = term(d(2026, 1, 27), d(2026, 4, 2));
        assert_eq!(t.week_number(d(2026, 1, 27)), Some(1));
        assert_eq!(t.week_number(d(2026, 2, 2)), Some(1));
        assert_eq!(t.week_number(d(2026, 2, 3)), Some(2));
        assert_eq!(t.week_number(d(2026, 5, 1)), None);
    }
}
