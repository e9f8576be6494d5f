//! Business-day calendar and calendar-period bucketing.

use chrono::{Datelike, Days, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

/// Whether `date` falls on Monday through Friday.
pub fn is_business_day(date: NaiveDate) -> bool {
    !matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

/// The first business day strictly after `date`.
pub fn next_business_day(date: NaiveDate) -> NaiveDate {
    let mut next = date.succ_opt().unwrap_or(date);
    while !is_business_day(next) {
        match next.succ_opt() {
            Some(d) => next = d,
            None => break,
        }
    }
    next
}

/// Business days in `[start, end)`.
///
/// The end date is exclusive, so a range ending on a Monday stops at the
/// preceding Friday.
pub fn business_days(start: NaiveDate, end: NaiveDate) -> Vec<NaiveDate> {
    let mut days = Vec::new();
    let mut day = start;
    while day < end {
        if is_business_day(day) {
            days.push(day);
        }
        match day.checked_add_days(Days::new(1)) {
            Some(next) => day = next,
            None => break,
        }
    }
    days
}

/// Calendar bucket used to group observations.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Period {
    Month,
    Year,
}

impl Period {
    /// The last calendar day of the bucket containing `date`.
    ///
    /// Two dates belong to the same bucket exactly when their period ends are
    /// equal, so the period end doubles as the bucket key.
    pub fn period_end(self, date: NaiveDate) -> NaiveDate {
        match self {
            Period::Year => NaiveDate::from_ymd_opt(date.year(), 12, 31).unwrap_or(date),
            Period::Month => {
                let (year, month) = if date.month() == 12 {
                    (date.year() + 1, 1)
                } else {
                    (date.year(), date.month() + 1)
                };
                NaiveDate::from_ymd_opt(year, month, 1)
                    .and_then(|first_of_next| first_of_next.pred_opt())
                    .unwrap_or(date)
            }
        }
    }

    /// Number of buckets per year, used to scale an annual rate to one bucket.
    pub fn periods_per_year(self) -> f64 {
        match self {
            Period::Month => 12.0,
            Period::Year => 1.0,
        }
    }
}
