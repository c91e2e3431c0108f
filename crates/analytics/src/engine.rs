use crate::error::AnalyticsError;
use crate::report::PerformanceReport;
use core_types::{daily_rate_from_annual, safe_ratio, HistoryRecord, TRADING_DAYS_PER_YEAR};
use rust_decimal::prelude::*;
use rust_decimal::{Decimal, MathematicalOps};
use rust_decimal_macros::dec;
use tracing::debug;

/// A stateless calculator for deriving performance metrics from a
/// simulation's recorded history.
#[derive(Debug, Default)]
pub struct AnalyticsEngine {}

impl AnalyticsEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// The main entry point for calculating performance metrics.
    ///
    /// # Arguments
    ///
    /// * `history` - The per-period snapshots recorded by the portfolio.
    /// * `benchmark` - Daily benchmark rates aligned onto the history's date
    ///   axis (same length, same order), or `None` to fall back to a fixed
    ///   annual risk-free rate.
    /// * `fallback_annual_rate` - The annual risk-free rate used when no
    ///   benchmark series is supplied.
    ///
    /// # Returns
    ///
    /// The `PerformanceReport`, or the zeroed empty report when fewer than
    /// two history records exist. A benchmark series of the wrong length is
    /// a caller error and fails loudly.
    pub fn calculate(
        &self,
        history: &[HistoryRecord],
        benchmark: Option<&[Decimal]>,
        fallback_annual_rate: Decimal,
    ) -> Result<PerformanceReport, AnalyticsError> {
        let mut report = PerformanceReport::new();

        if history.len() < 2 {
            // There is no return to measure yet; this is a routine outcome.
            debug!(records = history.len(), "not enough history for metrics");
            return Ok(report);
        }

        if let Some(series) = benchmark {
            if series.len() != history.len() {
                return Err(AnalyticsError::SeriesLengthMismatch {
                    history: history.len(),
                    benchmark: series.len(),
                });
            }
        }

        // The first record's return is zero by convention; drop it and work
        // with fractional returns from there on.
        let returns: Vec<Decimal> = history[1..]
            .iter()
            .map(|record| record.daily_return_pct / dec!(100))
            .collect();

        // Benchmark daily rates aligned against the same dropped-first-row
        // axis as the portfolio returns.
        let benchmark_daily: Vec<Decimal> = match benchmark {
            Some(series) => series[1..].to_vec(),
            None => vec![daily_rate_from_annual(fallback_annual_rate); returns.len()],
        };

        let initial_value = history[0].total_value;
        let final_value = history[history.len() - 1].total_value;

        report.num_periods = history.len();
        let years = Decimal::from(history.len() as u64) / Decimal::from(TRADING_DAYS_PER_YEAR);
        report.num_years = years;

        let sqrt_periods = Decimal::from(TRADING_DAYS_PER_YEAR).sqrt().ok_or_else(|| {
            AnalyticsError::InternalError(
                "Failed to calculate square root of the annualization factor".to_string(),
            )
        })?;

        // --- Returns ---
        report.total_return_pct = safe_ratio(final_value - initial_value, initial_value) * dec!(100);
        report.annualized_return_pct =
            annualized_growth(safe_ratio(final_value, initial_value), years) * dec!(100);

        // --- Volatility ---
        report.volatility_annual_pct = sample_std_dev(&returns)? * sqrt_periods * dec!(100);

        // --- Sharpe (excess over the benchmark, annualized) ---
        let excess: Vec<Decimal> = returns
            .iter()
            .zip(&benchmark_daily)
            .map(|(portfolio, benchmark)| portfolio - benchmark)
            .collect();
        report.sharpe_ratio = safe_ratio(mean(&excess), sample_std_dev(&excess)?) * sqrt_periods;

        // --- Max drawdown, via the cumulative-product running maximum ---
        let mut cumulative = Decimal::ONE;
        let mut running_max = Decimal::ZERO;
        let mut max_drawdown = Decimal::ZERO;
        for daily_return in &returns {
            cumulative *= Decimal::ONE + daily_return;
            if cumulative > running_max {
                running_max = cumulative;
            }
            let drawdown = safe_ratio(cumulative - running_max, running_max);
            if drawdown < max_drawdown {
                max_drawdown = drawdown;
            }
        }
        report.max_drawdown_pct = max_drawdown * dec!(100);

        // --- Calmar ---
        report.calmar_ratio =
            safe_ratio(report.annualized_return_pct, report.max_drawdown_pct).abs();

        // --- Period statistics ---
        let positive_periods = returns.iter().filter(|r| **r > Decimal::ZERO).count();
        report.win_rate_pct =
            safe_ratio(Decimal::from(positive_periods as u64), Decimal::from(returns.len() as u64))
                * dec!(100);
        report.best_day_pct = returns.iter().copied().max().unwrap_or(Decimal::ZERO) * dec!(100);
        report.worst_day_pct = returns.iter().copied().min().unwrap_or(Decimal::ZERO) * dec!(100);

        // --- Benchmark comparison ---
        report.benchmark_return_pct = match benchmark {
            Some(_) => {
                let cumulative: Decimal = benchmark_daily
                    .iter()
                    .fold(Decimal::ONE, |acc, rate| acc * (Decimal::ONE + rate));
                (cumulative - Decimal::ONE) * dec!(100)
            }
            // With only a fixed annual rate, compound it over the window.
            None => annualized_to_window(fallback_annual_rate, years) * dec!(100),
        };
        report.outperformance_pct = report.total_return_pct - report.benchmark_return_pct;

        Ok(report)
    }
}

/// Geometric annualization: `growth^(1/years) - 1`, zero for a degenerate
/// window or non-positive growth.
fn annualized_growth(growth: Decimal, years: Decimal) -> Decimal {
    if years <= Decimal::ZERO || growth <= Decimal::ZERO {
        return Decimal::ZERO;
    }
    let growth = growth.to_f64().unwrap_or(0.0);
    let years = years.to_f64().unwrap_or(0.0);
    if growth <= 0.0 || years <= 0.0 {
        return Decimal::ZERO;
    }
    Decimal::from_f64(growth.powf(1.0 / years) - 1.0).unwrap_or(Decimal::ZERO)
}

/// Compounds an annual rate over a window measured in years:
/// `(1 + annual)^years - 1`.
fn annualized_to_window(annual_rate: Decimal, years: Decimal) -> Decimal {
    let annual = annual_rate.to_f64().unwrap_or(0.0);
    let years = years.to_f64().unwrap_or(0.0);
    Decimal::from_f64((1.0 + annual).powf(years) - 1.0).unwrap_or(Decimal::ZERO)
}

fn mean(values: &[Decimal]) -> Decimal {
    if values.is_empty() {
        return Decimal::ZERO;
    }
    let sum: Decimal = values.iter().copied().sum();
    sum / Decimal::from(values.len() as u64)
}

/// Sample standard deviation (n-1 denominator); zero when fewer than two
/// observations exist.
fn sample_std_dev(values: &[Decimal]) -> Result<Decimal, AnalyticsError> {
    if values.len() < 2 {
        return Ok(Decimal::ZERO);
    }
    let mean = mean(values);
    let variance = values
        .iter()
        .map(|value| (*value - mean) * (*value - mean))
        .sum::<Decimal>()
        / Decimal::from(values.len() as u64 - 1);
    variance.sqrt().ok_or_else(|| {
        AnalyticsError::InternalError(
            "Failed to calculate square root of the return variance".to_string(),
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    /// Builds a history series from percentage daily returns, keeping the
    /// `total_value` column consistent with the return column.
    fn history_from_returns(returns_pct: &[Decimal]) -> Vec<HistoryRecord> {
        let mut records = Vec::with_capacity(returns_pct.len());
        let mut value = dec!(1_000_000);
        for (index, pct) in returns_pct.iter().enumerate() {
            if index > 0 {
                value *= Decimal::ONE + pct / dec!(100);
            }
            records.push(HistoryRecord {
                date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap() + chrono::Days::new(index as u64),
                total_value: value,
                cash: value,
                positions_value: Decimal::ZERO,
                num_positions: 0,
                daily_return_pct: if index == 0 { Decimal::ZERO } else { *pct },
            });
        }
        records
    }

    fn assert_close(actual: Decimal, expected: Decimal) {
        assert!(
            (actual - expected).abs() < dec!(0.0001),
            "expected {expected}, got {actual}"
        );
    }

    #[test]
    fn insufficient_history_yields_empty_report() {
        let engine = AnalyticsEngine::new();
        let history = history_from_returns(&[dec!(0)]);
        let report = engine.calculate(&history, None, dec!(0.135)).unwrap();
        assert!(report.is_empty());
        assert_eq!(report.total_return_pct, Decimal::ZERO);
    }

    #[test]
    fn mismatched_benchmark_length_fails_loudly() {
        let engine = AnalyticsEngine::new();
        let history = history_from_returns(&[dec!(0), dec!(1)]);
        let benchmark = vec![dec!(0.0005)];
        assert!(matches!(
            engine.calculate(&history, Some(&benchmark), dec!(0.135)),
            Err(AnalyticsError::SeriesLengthMismatch { .. })
        ));
    }

    #[test]
    fn drawdown_uses_cumulative_product_not_min_return() {
        let engine = AnalyticsEngine::new();
        let history = history_from_returns(&[dec!(0), dec!(1), dec!(-2), dec!(3)]);
        let report = engine.calculate(&history, None, dec!(0.135)).unwrap();

        // Trough at 1.01 * 0.98 measured against the 1.01 peak: exactly -2%.
        assert_close(report.max_drawdown_pct, dec!(-2));
        // A naive min-of-returns would also say -2 here, so pin the peak too:
        // the best day is +3% and total return is positive.
        assert_close(report.best_day_pct, dec!(3));
        assert!(report.total_return_pct > Decimal::ZERO);
    }

    #[test]
    fn drawdown_peak_tracks_the_series_itself() {
        let engine = AnalyticsEngine::new();
        // An immediate loss that is fully recovered never sets a lower peak.
        let history = history_from_returns(&[dec!(0), dec!(-2), dec!(1), dec!(1.1)]);
        let report = engine.calculate(&history, None, dec!(0.135)).unwrap();
        assert_eq!(report.max_drawdown_pct, Decimal::ZERO);
        assert_eq!(report.calmar_ratio, Decimal::ZERO);
    }

    #[test]
    fn total_and_annualized_returns() {
        let engine = AnalyticsEngine::new();
        let history = history_from_returns(&[dec!(0), dec!(1), dec!(1), dec!(1)]);
        let report = engine.calculate(&history, None, dec!(0.135)).unwrap();

        assert_close(report.total_return_pct, dec!(3.0301));
        assert_eq!(report.num_periods, 4);
        assert_close(report.num_years, dec!(4) / dec!(252));
        // Four days of +1% compound to an enormous annualized figure; just
        // pin the direction and monotonicity.
        assert!(report.annualized_return_pct > report.total_return_pct);
    }

    #[test]
    fn volatility_is_sample_based_and_annualized() {
        let engine = AnalyticsEngine::new();
        let history = history_from_returns(&[dec!(0), dec!(1), dec!(3)]);
        let report = engine.calculate(&history, None, dec!(0)).unwrap();

        // Sample variance of {1%, 3%} is 0.0002 (n-1 denominator).
        let expected = dec!(0.0002).sqrt().unwrap() * dec!(252).sqrt().unwrap() * dec!(100);
        assert_close(report.volatility_annual_pct, expected);
    }

    #[test]
    fn sharpe_is_zero_when_excess_has_no_variance() {
        let engine = AnalyticsEngine::new();
        let history = history_from_returns(&[dec!(0), dec!(0.05), dec!(0.05), dec!(0.05)]);
        let benchmark = vec![dec!(0.0005); 4];
        let report = engine.calculate(&history, Some(&benchmark), dec!(0.135)).unwrap();
        assert_eq!(report.sharpe_ratio, Decimal::ZERO);
    }

    #[test]
    fn sharpe_is_positive_when_consistently_beating_benchmark() {
        let engine = AnalyticsEngine::new();
        let history = history_from_returns(&[dec!(0), dec!(0.2), dec!(0.1), dec!(0.3)]);
        let benchmark = vec![dec!(0.0004); 4];
        let report = engine.calculate(&history, Some(&benchmark), dec!(0.135)).unwrap();
        assert!(report.sharpe_ratio > Decimal::ZERO);
    }

    #[test]
    fn win_rate_counts_strictly_positive_periods() {
        let engine = AnalyticsEngine::new();
        let history = history_from_returns(&[dec!(0), dec!(1), dec!(-2), dec!(0), dec!(3)]);
        let report = engine.calculate(&history, None, dec!(0.135)).unwrap();
        assert_close(report.win_rate_pct, dec!(50));
        assert_close(report.best_day_pct, dec!(3));
        assert_close(report.worst_day_pct, dec!(-2));
    }

    #[test]
    fn benchmark_comparison_uses_aligned_series() {
        let engine = AnalyticsEngine::new();
        let history = history_from_returns(&[dec!(0), dec!(0.1), dec!(0.1)]);
        let benchmark = vec![dec!(0.0005); 3];
        let report = engine.calculate(&history, Some(&benchmark), dec!(0.135)).unwrap();

        // Two benchmark periods compound off the dropped-first-row axis.
        let expected = ((Decimal::ONE + dec!(0.0005)) * (Decimal::ONE + dec!(0.0005))
            - Decimal::ONE)
            * dec!(100);
        assert_close(report.benchmark_return_pct, expected);
        assert_close(
            report.outperformance_pct,
            report.total_return_pct - report.benchmark_return_pct,
        );
    }

    #[test]
    fn fixed_rate_fallback_compounds_over_the_window() {
        let engine = AnalyticsEngine::new();
        let history = history_from_returns(&[dec!(0), dec!(0.1), dec!(0.1)]);
        let report = engine.calculate(&history, None, dec!(0.135)).unwrap();

        let years = (3.0f64) / 252.0;
        let expected = Decimal::from_f64((1.135f64.powf(years) - 1.0) * 100.0).unwrap();
        assert_close(report.benchmark_return_pct, expected);
    }
}
