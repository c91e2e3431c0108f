use serde::{Deserialize, Serialize};
use std::fmt;

/// The kind of transaction recorded in the trade ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TradeAction {
    Buy,
    Sell,
    /// Interest accrued on idle cash. Carries zero shares and a zero price.
    Interest,
}

impl fmt::Display for TradeAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TradeAction::Buy => write!(f, "BUY"),
            TradeAction::Sell => write!(f, "SELL"),
            TradeAction::Interest => write!(f, "INTEREST"),
        }
    }
}

/// Why a ledger entry was produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TradeReason {
    /// Opening allocation at the start of a run.
    Initial,
    /// Resizing an existing holding toward a new target weight.
    Rebalance,
    /// Involuntary exit: the mark price crossed the stop-loss level.
    StopLoss,
    /// Involuntary exit: the mark price crossed the take-profit level.
    TakeProfit,
    /// Ordinary decision-driven entry or exit.
    Signal,
    /// Daily benchmark yield credited to idle cash.
    SelicYield,
}

impl fmt::Display for TradeReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TradeReason::Initial => write!(f, "INITIAL"),
            TradeReason::Rebalance => write!(f, "REBALANCE"),
            TradeReason::StopLoss => write!(f, "STOP_LOSS"),
            TradeReason::TakeProfit => write!(f, "TAKE_PROFIT"),
            TradeReason::Signal => write!(f, "SIGNAL"),
            TradeReason::SelicYield => write!(f, "SELIC_YIELD"),
        }
    }
}
