use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Top-level snapshot of the portfolio, consumed by reporting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortfolioSummary {
    pub initial_capital: Decimal,
    pub current_value: Decimal,
    pub cash: Decimal,
    pub positions_value: Decimal,
    pub num_positions: usize,
    pub total_return_pct: Decimal,
    /// Absolute gain or loss over the initial capital.
    pub total_return_abs: Decimal,
    /// Fraction of total value held in positions rather than cash, in percent.
    pub exposure_pct: Decimal,
    pub num_trades: usize,
}

/// One audit row per open position, for trade-level reporting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PositionSnapshot {
    pub symbol: String,
    pub shares: u64,
    pub avg_cost: Decimal,
    pub mark_price: Decimal,
    pub market_value: Decimal,
    pub cost_basis: Decimal,
    pub unrealized_pnl: Decimal,
    pub unrealized_pnl_pct: Decimal,
    /// This position's share of total portfolio value, in percent.
    pub weight_pct: Decimal,
    pub entry_date: NaiveDate,
    pub stop_loss: Option<Decimal>,
    pub take_profit: Option<Decimal>,
}
