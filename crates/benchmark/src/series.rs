use crate::error::BenchmarkError;
use chrono::{Datelike, NaiveDate, Weekday};
use core_types::daily_rate_from_annual;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// A date-indexed series of daily fractional rates for a reference
/// instrument.
///
/// Rates are fractions per period (0.0005 = 0.05% a day), never percents.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RateSeries {
    rates: std::collections::BTreeMap<NaiveDate, Decimal>,
}

impl RateSeries {
    /// Builds a series from explicit `(date, daily_rate)` observations.
    pub fn from_observations(
        observations: impl IntoIterator<Item = (NaiveDate, Decimal)>,
    ) -> Self {
        Self {
            rates: observations.into_iter().collect(),
        }
    }

    /// Synthesizes a business-day (Mon–Fri) series at the constant daily
    /// equivalent of `annual_rate`, inclusive of both endpoints.
    pub fn fixed(annual_rate: Decimal, start: NaiveDate, end: NaiveDate) -> Self {
        let daily = daily_rate_from_annual(annual_rate);
        let mut rates = std::collections::BTreeMap::new();

        let mut date = start;
        while date <= end {
            if !matches!(date.weekday(), Weekday::Sat | Weekday::Sun) {
                rates.insert(date, daily);
            }
            match date.succ_opt() {
                Some(next) => date = next,
                None => break,
            }
        }

        Self { rates }
    }

    pub fn is_empty(&self) -> bool {
        self.rates.is_empty()
    }

    pub fn len(&self) -> usize {
        self.rates.len()
    }

    /// Mean rate across all observations; zero for an empty series.
    pub fn mean_rate(&self) -> Decimal {
        if self.rates.is_empty() {
            return Decimal::ZERO;
        }
        let sum: Decimal = self.rates.values().copied().sum();
        sum / Decimal::from(self.rates.len() as u64)
    }

    /// The rate in effect on `date`: the exact observation when present,
    /// otherwise forward-filled from the most recent earlier one. `None`
    /// only before the first observation.
    pub fn rate_on(&self, date: NaiveDate) -> Option<Decimal> {
        self.rates
            .range(..=date)
            .next_back()
            .map(|(_, rate)| *rate)
    }

    /// Reindexes the series onto an exact date axis.
    ///
    /// The result always has one rate per requested date, in order: exact
    /// matches are copied, gaps forward-fill, and dates before the first
    /// observation take the series mean. Errs only when the source itself is
    /// empty.
    pub fn align(&self, dates: &[NaiveDate]) -> Result<Vec<Decimal>, BenchmarkError> {
        if self.rates.is_empty() {
            return Err(BenchmarkError::EmptySeries);
        }

        let mean = self.mean_rate();
        let aligned = dates
            .iter()
            .map(|date| match self.rate_on(*date) {
                Some(rate) => rate,
                None => {
                    debug!(%date, "no prior rate observation, using series mean");
                    mean
                }
            })
            .collect();
        Ok(aligned)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn day(month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, month, day).unwrap()
    }

    #[test]
    fn fixed_series_covers_business_days_only() {
        // 2024-01-01 is a Monday; the 6th and 7th are a weekend.
        let series = RateSeries::fixed(dec!(0.135), day(1, 1), day(1, 8));
        assert_eq!(series.len(), 6);
        assert!(series.rate_on(day(1, 5)).is_some());
    }

    #[test]
    fn align_copies_exact_dates() {
        let series = RateSeries::from_observations([
            (day(1, 2), dec!(0.0004)),
            (day(1, 3), dec!(0.0005)),
        ]);
        let aligned = series.align(&[day(1, 2), day(1, 3)]).unwrap();
        assert_eq!(aligned, vec![dec!(0.0004), dec!(0.0005)]);
    }

    #[test]
    fn missing_date_forward_fills_from_prior_rate() {
        // The 3rd is missing from the source (a holiday in its calendar).
        let series = RateSeries::from_observations([
            (day(1, 2), dec!(0.0004)),
            (day(1, 4), dec!(0.0006)),
        ]);
        let aligned = series
            .align(&[day(1, 2), day(1, 3), day(1, 4)])
            .unwrap();
        assert_eq!(aligned, vec![dec!(0.0004), dec!(0.0004), dec!(0.0006)]);
    }

    #[test]
    fn leading_gap_falls_back_to_mean_rate() {
        let series = RateSeries::from_observations([
            (day(1, 10), dec!(0.0004)),
            (day(1, 11), dec!(0.0006)),
        ]);
        let aligned = series.align(&[day(1, 8), day(1, 10)]).unwrap();
        assert_eq!(aligned[0], dec!(0.0005));
        assert_eq!(aligned[1], dec!(0.0004));
    }

    #[test]
    fn aligned_series_matches_requested_length() {
        let series = RateSeries::fixed(dec!(0.10), day(1, 1), day(3, 29));
        let axis: Vec<NaiveDate> = (2..=12).map(|d| day(2, d)).collect();
        let aligned = series.align(&axis).unwrap();
        assert_eq!(aligned.len(), axis.len());
    }

    #[test]
    fn empty_source_fails_loudly() {
        let series = RateSeries::default();
        assert!(matches!(
            series.align(&[day(1, 2)]),
            Err(BenchmarkError::EmptySeries)
        ));
    }
}
