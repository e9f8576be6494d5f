//! Date-indexed numeric series.
//!
//! Provides the [`TimeSeries`] container every calculator operates on, plus
//! calendar bucketing and the small set of statistics the analytics need.

mod calendar;
mod stats;

pub use calendar::{business_days, is_business_day, next_business_day, Period};
pub use stats::{mean, pearson_correlation, sample_std_dev};

use crate::{Error, Result};
use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};

/// A single dated value.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Observation {
    /// Calendar date of the observation
    pub date: NaiveDate,
    /// Observed value (price, portfolio value, rate, ...)
    pub value: f64,
}

impl Observation {
    /// Create a new observation.
    pub fn new(date: NaiveDate, value: f64) -> Self {
        Self { date, value }
    }
}

/// Ordered sequence of observations with strictly increasing dates.
///
/// Serializes as a plain JSON array of `{"date": "YYYY-MM-DD", "value": x}`
/// objects. Deserialization applies the same ordering check as [`TimeSeries::new`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Observation>", into = "Vec<Observation>")]
pub struct TimeSeries {
    observations: Vec<Observation>,
}

impl TimeSeries {
    /// Create a series, rejecting duplicate or out-of-order dates.
    pub fn new(observations: Vec<Observation>) -> Result<Self> {
        if let Some(pair) = observations.windows(2).find(|w| w[1].date <= w[0].date) {
            return Err(Error::InvalidArgument(format!(
                "series dates must be strictly increasing ({} is followed by {})",
                pair[0].date, pair[1].date
            )));
        }
        Ok(Self { observations })
    }

    /// Create a series from `(date, value)` pairs.
    pub fn from_pairs<I>(pairs: I) -> Result<Self>
    where
        I: IntoIterator<Item = (NaiveDate, f64)>,
    {
        Self::new(
            pairs
                .into_iter()
                .map(|(date, value)| Observation::new(date, value))
                .collect(),
        )
    }

    /// Create a series on consecutive business days, beginning with the first
    /// business day on or after `start`.
    pub fn from_business_days(start: NaiveDate, values: &[f64]) -> Result<Self> {
        let mut date = if is_business_day(start) {
            start
        } else {
            next_business_day(start)
        };

        let mut observations = Vec::with_capacity(values.len());
        for &value in values {
            observations.push(Observation::new(date, value));
            date = next_business_day(date);
        }
        Self::new(observations)
    }

    /// Number of observations.
    pub fn len(&self) -> usize {
        self.observations.len()
    }

    /// Whether the series has no observations.
    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }

    /// All observations in date order.
    pub fn observations(&self) -> &[Observation] {
        &self.observations
    }

    /// Iterate over observations in date order.
    pub fn iter(&self) -> std::slice::Iter<'_, Observation> {
        self.observations.iter()
    }

    /// First observation.
    pub fn first(&self) -> Option<&Observation> {
        self.observations.first()
    }

    /// Last observation.
    pub fn last(&self) -> Option<&Observation> {
        self.observations.last()
    }

    /// Dates of all observations.
    pub fn dates(&self) -> Vec<NaiveDate> {
        self.observations.iter().map(|o| o.date).collect()
    }

    /// Values of all observations.
    pub fn values(&self) -> Vec<f64> {
        self.observations.iter().map(|o| o.value).collect()
    }

    /// Value recorded on exactly `date`.
    pub fn get(&self, date: NaiveDate) -> Option<f64> {
        self.observations
            .binary_search_by_key(&date, |o| o.date)
            .ok()
            .map(|idx| self.observations[idx].value)
    }

    /// Observations with `start <= date <= end`.
    pub fn between(&self, start: NaiveDate, end: NaiveDate) -> TimeSeries {
        TimeSeries {
            observations: self
                .observations
                .iter()
                .filter(|o| o.date >= start && o.date <= end)
                .copied()
                .collect(),
        }
    }

    /// Drop the first observation.
    pub fn skip_first(&self) -> TimeSeries {
        TimeSeries {
            observations: self.observations.iter().skip(1).copied().collect(),
        }
    }

    /// Period-over-period fractional change. The first element is 0.
    pub fn pct_change(&self) -> TimeSeries {
        let mut observations = Vec::with_capacity(self.len());
        let mut prev: Option<f64> = None;
        for obs in &self.observations {
            let change = match prev {
                Some(p) => obs.value / p - 1.0,
                None => 0.0,
            };
            observations.push(Observation::new(obs.date, change));
            prev = Some(obs.value);
        }
        TimeSeries { observations }
    }

    /// Period-over-period change in percentage points. The first element is 0.
    pub fn pct_change_percent(&self) -> TimeSeries {
        self.pct_change().map_values(|r| r * 100.0)
    }

    /// Apply `f` to every value, keeping the dates.
    pub fn map_values<F>(&self, f: F) -> TimeSeries
    where
        F: Fn(f64) -> f64,
    {
        TimeSeries {
            observations: self
                .observations
                .iter()
                .map(|o| Observation::new(o.date, f(o.value)))
                .collect(),
        }
    }

    /// Project the series onto `dates`.
    ///
    /// Each target date takes the value recorded on exactly that date. Dates
    /// without a (finite) value are then forward-filled from earlier target
    /// dates, and any leading gap is back-filled from the first available one.
    pub fn reindex_fill(&self, dates: &[NaiveDate]) -> Result<TimeSeries> {
        let mut values: Vec<Option<f64>> = dates
            .iter()
            .map(|d| self.get(*d).filter(|v| v.is_finite()))
            .collect();

        fill_gaps(values.iter_mut());
        fill_gaps(values.iter_mut().rev());

        let observations = dates
            .iter()
            .zip(values)
            .map(|(date, value)| {
                value.map(|v| Observation::new(*date, v)).ok_or_else(|| {
                    Error::InsufficientData(
                        "series has no values on any of the target dates".to_string(),
                    )
                })
            })
            .collect::<Result<Vec<_>>>()?;

        TimeSeries::new(observations)
    }

    /// Resample to calendar-day frequency and forward-fill gaps, then keep
    /// `start <= date <= end`.
    ///
    /// The resample spans the series' own first to last date, so days past
    /// the last published value are not extrapolated. Non-finite values count
    /// as missing; a missing prefix is dropped.
    pub fn resample_daily_ffill(&self, start: NaiveDate, end: NaiveDate) -> TimeSeries {
        let (Some(first), Some(last)) = (self.first(), self.last()) else {
            return TimeSeries::default();
        };

        let mut observations = Vec::new();
        let mut source = self.observations.iter().peekable();
        let mut carry: Option<f64> = None;
        let mut day = first.date;

        while day <= last.date {
            while let Some(obs) = source.next_if(|o| o.date <= day) {
                if obs.value.is_finite() {
                    carry = Some(obs.value);
                }
            }
            if let Some(value) = carry {
                if day >= start && day <= end {
                    observations.push(Observation::new(day, value));
                }
            }
            match day.checked_add_days(Days::new(1)) {
                Some(next) => day = next,
                None => break,
            }
        }

        TimeSeries { observations }
    }

    /// Split into contiguous, non-overlapping chunks of `size` observations.
    /// The last chunk may be shorter.
    pub fn chunks(&self, size: usize) -> Result<Vec<TimeSeries>> {
        if size == 0 {
            return Err(Error::InvalidArgument(
                "chunk size must be at least 1".to_string(),
            ));
        }
        Ok(self
            .observations
            .chunks(size)
            .map(|chunk| TimeSeries {
                observations: chunk.to_vec(),
            })
            .collect())
    }
}

/// Replace each gap with the last value seen in iteration order.
fn fill_gaps<'a, I>(values: I)
where
    I: Iterator<Item = &'a mut Option<f64>>,
{
    let mut carry = None;
    for value in values {
        if value.is_some() {
            carry = *value;
        } else {
            *value = carry;
        }
    }
}

impl TryFrom<Vec<Observation>> for TimeSeries {
    type Error = Error;

    fn try_from(observations: Vec<Observation>) -> Result<Self> {
        TimeSeries::new(observations)
    }
}

impl From<TimeSeries> for Vec<Observation> {
    fn from(series: TimeSeries) -> Self {
        series.observations
    }
}

impl<'a> IntoIterator for &'a TimeSeries {
    type Item = &'a Observation;
    type IntoIter = std::slice::Iter<'a, Observation>;

    fn into_iter(self) -> Self::IntoIter {
        self.observations.iter()
    }
}
