use rust_decimal::prelude::*;
use rust_decimal::Decimal;

/// Trading-day count used for every annualization in the workspace.
pub const TRADING_DAYS_PER_YEAR: u32 = 252;

/// Division with a defined result for an invalid denominator.
///
/// Every percentage and ratio in the workspace (exposure, P&L %, Sharpe,
/// Calmar, win rate) goes through this single primitive. Policy: a zero
/// denominator yields `Decimal::ZERO` rather than an error, because in this
/// domain a degenerate denominator means "nothing to measure" (no cost basis,
/// no variance, no drawdown), never a fault.
pub fn safe_ratio(numerator: Decimal, denominator: Decimal) -> Decimal {
    if denominator.is_zero() {
        Decimal::ZERO
    } else {
        numerator / denominator
    }
}

/// Converts an annual rate to its compounded daily equivalent over the
/// 252-trading-day year: `(1 + annual)^(1/252) - 1`.
pub fn daily_rate_from_annual(annual_rate: Decimal) -> Decimal {
    let annual = annual_rate.to_f64().unwrap_or(0.0);
    let daily = (1.0 + annual).powf(1.0 / f64::from(TRADING_DAYS_PER_YEAR)) - 1.0;
    Decimal::from_f64(daily).unwrap_or(Decimal::ZERO)
}
