//! Date dimension reconciler

use super::DateDimension;
use chrono::{Datelike, NaiveDate, Weekday};
use shelf_common::time::date_key;
use tracing::debug;

const DAY_NAMES: [&str; 7] = [
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
    "Sunday",
];

impl DateDimension {
    /// Derive every dimension attribute from a calendar date
    pub fn from_date(date: NaiveDate) -> Self {
        let month = date.month();
        let weekday = date.weekday();

        Self {
            date_key: date_key(date),
            full_date: date,
            year: date.year(),
            month,
            day: date.day(),
            quarter: format!("Q{}", (month - 1) / 3 + 1),
            day_of_week: DAY_NAMES[weekday.num_days_from_monday() as usize].to_string(),
            is_weekend: matches!(weekday, Weekday::Sat | Weekday::Sun),
        }
    }
}

/// Parse `YYYY-MM-DD`, `YYYY-MM` or `YYYY`; coarser forms resolve to the
/// first day of the period
pub fn parse_published_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    let all_digits = |s: &str| !s.is_empty() && s.chars().all(|c| c.is_ascii_digit());

    match (raw.len(), raw.matches('-').count()) {
        (10, 2) => NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok(),
        (7, 1) => {
            let (year, month) = raw.split_once('-')?;
            if !all_digits(year) || !all_digits(month) {
                return None;
            }
            NaiveDate::from_ymd_opt(year.parse().ok()?, month.parse().ok()?, 1)
        }
        (4, 0) if all_digits(raw) => NaiveDate::from_ymd_opt(raw.parse().ok()?, 1, 1),
        _ => None,
    }
}

/// Publication date dimension; `None` for a missing or unparseable date
pub fn reconcile_date(published_date: Option<&str>) -> Option<DateDimension> {
    let Some(raw) = published_date else {
        debug!("No publication date provided");
        return None;
    };

    match parse_published_date(raw) {
        Some(date) => Some(DateDimension::from_date(date)),
        None => {
            debug!(published_date = %raw, "Unrecognized publication date format");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_date_attributes() {
        let date = reconcile_date(Some("2017-10-10")).unwrap();

        assert_eq!(date.date_key, 20171010);
        assert_eq!(date.full_date, NaiveDate::from_ymd_opt(2017, 10, 10).unwrap());
        assert_eq!((date.year, date.month, date.day), (2017, 10, 10));
        assert_eq!(date.quarter, "Q4");
        assert_eq!(date.day_of_week, "Tuesday");
        assert!(!date.is_weekend);
    }

    #[test]
    fn test_year_only() {
        let date = reconcile_date(Some("2020")).unwrap();

        assert_eq!(date.date_key, 20200101);
        assert_eq!(date.quarter, "Q1");
        assert_eq!(date.day_of_week, "Wednesday");
    }

    #[test]
    fn test_year_month() {
        let date = reconcile_date(Some("1965-08")).unwrap();

        assert_eq!(date.date_key, 19650801);
        assert_eq!(date.quarter, "Q3");
        assert_eq!(date.day_of_week, "Sunday");
        assert!(date.is_weekend);
    }

    #[test]
    fn test_unparseable_dates() {
        assert_eq!(reconcile_date(None), None);
        assert_eq!(reconcile_date(Some("")), None);
        assert_eq!(reconcile_date(Some("circa 1900")), None);
        assert_eq!(reconcile_date(Some("2017-13-01")), None);
        assert_eq!(reconcile_date(Some("2017-02-30")), None);
        assert_eq!(reconcile_date(Some("2017/10/10")), None);
        assert_eq!(reconcile_date(Some("17-10")), None);
    }

    #[test]
    fn test_quarter_boundaries() {
        let quarter = |m| DateDimension::from_date(NaiveDate::from_ymd_opt(2021, m, 1).unwrap()).quarter;
        assert_eq!(quarter(3), "Q1");
        assert_eq!(quarter(4), "Q2");
        assert_eq!(quarter(9), "Q3");
        assert_eq!(quarter(12), "Q4");
    }
}
