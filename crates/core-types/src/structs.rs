use crate::enums::{TradeAction, TradeReason};
use crate::math::safe_ratio;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

/// One open holding in one instrument.
///
/// A `Position` is a pure value object: it knows how to value itself against
/// its latest mark price and whether its protective levels have been crossed,
/// but it never mutates cash or the ledger. A position with zero shares must
/// not exist inside a portfolio; it is removed, not retained.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub symbol: String,
    /// Whole-share count. Fractional holdings are out of scope.
    pub shares: u64,
    /// Volume-weighted average entry price across all buys.
    pub avg_cost: Decimal,
    /// Latest observed price. Updated only through an explicit mark, never
    /// implicitly by buys or sells of other instruments.
    pub mark_price: Decimal,
    /// Date of the first buy that opened this holding.
    pub entry_date: NaiveDate,
    pub stop_loss: Option<Decimal>,
    pub take_profit: Option<Decimal>,
}

impl Position {
    /// Current market value: `shares × mark_price`.
    pub fn market_value(&self) -> Decimal {
        Decimal::from(self.shares) * self.mark_price
    }

    /// Total acquisition cost: `shares × avg_cost`.
    pub fn cost_basis(&self) -> Decimal {
        Decimal::from(self.shares) * self.avg_cost
    }

    /// Unrealized profit or loss at the current mark.
    pub fn unrealized_pnl(&self) -> Decimal {
        self.market_value() - self.cost_basis()
    }

    /// Unrealized P&L as a percentage of the cost basis.
    pub fn unrealized_pnl_pct(&self) -> Decimal {
        safe_ratio(self.unrealized_pnl(), self.cost_basis()) * dec!(100)
    }

    /// True when a stop-loss level is set and the mark price has fallen to or
    /// below it.
    pub fn should_stop_loss(&self) -> bool {
        match self.stop_loss {
            Some(stop) => self.mark_price <= stop,
            None => false,
        }
    }

    /// True when a take-profit level is set and the mark price has risen to
    /// or above it.
    pub fn should_take_profit(&self) -> bool {
        match self.take_profit {
            Some(target) => self.mark_price >= target,
            None => false,
        }
    }
}

/// One executed transaction, immutable once appended to the ledger.
///
/// The ledger is the sole source of truth for realized cash movement:
/// `cash_after = cash_before + net_cash_delta` holds for every entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trade {
    pub date: NaiveDate,
    pub symbol: String,
    pub action: TradeAction,
    /// Zero for `Interest` entries.
    pub shares: u64,
    /// Zero for `Interest` entries.
    pub price: Decimal,
    pub commission: Decimal,
    /// Signed realized cash movement: negative for an outflow (buy cost),
    /// positive for an inflow (sell proceeds, interest).
    pub net_cash_delta: Decimal,
    pub reason: TradeReason,
}

/// One end-of-period snapshot of portfolio state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryRecord {
    pub date: NaiveDate,
    pub total_value: Decimal,
    pub cash: Decimal,
    pub positions_value: Decimal,
    pub num_positions: usize,
    /// `(total_value[i] / total_value[i-1] - 1) × 100`; zero for the first
    /// record of a run by convention.
    pub daily_return_pct: Decimal,
}

/// A numeric sizing decision handed down by the upstream pipeline.
///
/// The upstream risk logic has already vetted the decision; the portfolio
/// still enforces its own min/max sizing bounds regardless of what is
/// requested here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Decision {
    pub symbol: String,
    /// `Buy` targets a portfolio weight; `Sell` liquidates shares.
    pub action: TradeAction,
    /// Target weight of total portfolio value, in percent (0–100). Ignored
    /// for sells.
    pub target_weight_pct: Decimal,
    /// Decision price for the instrument this period.
    pub price: Decimal,
    /// For sells: how many shares to liquidate (`None` = the full position).
    /// Ignored for buys.
    pub shares: Option<u64>,
    pub stop_loss: Option<Decimal>,
    pub take_profit: Option<Decimal>,
    pub reason: TradeReason,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn position(mark: Decimal) -> Position {
        Position {
            symbol: "PETR4.SA".to_string(),
            shares: 100,
            avg_cost: dec!(30.00),
            mark_price: mark,
            entry_date: NaiveDate::from_ymd_opt(2024, 1, 2).unwrap(),
            stop_loss: Some(dec!(28.00)),
            take_profit: Some(dec!(33.00)),
        }
    }

    #[test]
    fn valuations_derive_from_mark_price() {
        let pos = position(dec!(31.50));
        assert_eq!(pos.market_value(), dec!(3150.00));
        assert_eq!(pos.cost_basis(), dec!(3000.00));
        assert_eq!(pos.unrealized_pnl(), dec!(150.00));
        assert_eq!(pos.unrealized_pnl_pct(), dec!(5));
    }

    #[test]
    fn pnl_pct_with_zero_cost_basis_is_zero() {
        let mut pos = position(dec!(31.50));
        pos.shares = 0;
        assert_eq!(pos.unrealized_pnl_pct(), Decimal::ZERO);
    }

    #[test]
    fn stop_loss_triggers_at_or_below_level() {
        assert!(position(dec!(28.00)).should_stop_loss());
        assert!(position(dec!(27.10)).should_stop_loss());
        assert!(!position(dec!(28.01)).should_stop_loss());
    }

    #[test]
    fn take_profit_triggers_at_or_above_level() {
        assert!(position(dec!(33.00)).should_take_profit());
        assert!(position(dec!(34.20)).should_take_profit());
        assert!(!position(dec!(32.99)).should_take_profit());
    }

    #[test]
    fn unset_levels_never_trigger() {
        let mut pos = position(dec!(1.00));
        pos.stop_loss = None;
        pos.take_profit = None;
        assert!(!pos.should_stop_loss());
        assert!(!pos.should_take_profit());
    }
}
