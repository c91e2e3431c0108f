use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A comprehensive, standardized report of a simulation's performance.
///
/// This struct is the final output of the `AnalyticsEngine` and serves as the
/// data transfer object for performance results throughout the entire system.
/// Ratios with a degenerate denominator (zero excess-return variance, zero
/// drawdown) are reported as zero, per the workspace-wide `safe_ratio`
/// policy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformanceReport {
    // I. Returns
    pub total_return_pct: Decimal,
    pub annualized_return_pct: Decimal,
    pub benchmark_return_pct: Decimal,
    /// Portfolio total return minus benchmark total return over the same
    /// window.
    pub outperformance_pct: Decimal,

    // II. Risk
    pub volatility_annual_pct: Decimal,
    /// Most negative peak-to-trough decline of the cumulative return series,
    /// as a (negative) percentage.
    pub max_drawdown_pct: Decimal,

    // III. Ratios
    pub sharpe_ratio: Decimal,
    pub calmar_ratio: Decimal,

    // IV. Period statistics
    pub win_rate_pct: Decimal,
    pub best_day_pct: Decimal,
    pub worst_day_pct: Decimal,
    pub num_periods: usize,
    pub num_years: Decimal,
}

impl PerformanceReport {
    /// Creates a new, zeroed-out PerformanceReport.
    ///
    /// This is also the "empty result" returned when the history is too
    /// short to measure (fewer than two records).
    pub fn new() -> Self {
        Self {
            total_return_pct: Decimal::ZERO,
            annualized_return_pct: Decimal::ZERO,
            benchmark_return_pct: Decimal::ZERO,
            outperformance_pct: Decimal::ZERO,
            volatility_annual_pct: Decimal::ZERO,
            max_drawdown_pct: Decimal::ZERO,
            sharpe_ratio: Decimal::ZERO,
            calmar_ratio: Decimal::ZERO,
            win_rate_pct: Decimal::ZERO,
            best_day_pct: Decimal::ZERO,
            worst_day_pct: Decimal::ZERO,
            num_periods: 0,
            num_years: Decimal::ZERO,
        }
    }

    /// True when the report was produced from insufficient history.
    pub fn is_empty(&self) -> bool {
        self.num_periods == 0
    }
}

impl Default for PerformanceReport {
    fn default() -> Self {
        Self::new()
    }
}
