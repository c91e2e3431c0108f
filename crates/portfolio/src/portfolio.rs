use crate::error::PortfolioError;
use crate::summary::{PortfolioSummary, PositionSnapshot};
use chrono::NaiveDate;
use core_types::{safe_ratio, HistoryRecord, Position, Trade, TradeAction, TradeReason};
use rust_decimal::prelude::*;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::collections::HashMap;
use tracing::{debug, info};

const DEFAULT_COMMISSION_PCT: Decimal = dec!(0.001);
const DEFAULT_MIN_POSITION_PCT: Decimal = dec!(0.01);
const DEFAULT_MAX_POSITION_PCT: Decimal = dec!(0.15);
const DEFAULT_BENCHMARK_SYMBOL: &str = "SELIC";

/// The outcome of the sizing negotiation for one buy request.
///
/// A rejected check is a routine business outcome, not a fault; the reason
/// string is meant for humans reading the simulation log.
#[derive(Debug, Clone, PartialEq)]
pub struct BuyCheck {
    pub allowed: bool,
    /// The value the portfolio is actually willing to deploy. Never more
    /// than the requested target; zero when the check is rejected.
    pub affordable_value: Decimal,
    pub reason: String,
}

impl BuyCheck {
    fn approved(affordable_value: Decimal) -> Self {
        Self {
            allowed: true,
            affordable_value,
            reason: "OK".to_string(),
        }
    }

    fn rejected(reason: String) -> Self {
        Self {
            allowed: false,
            affordable_value: Decimal::ZERO,
            reason,
        }
    }
}

/// Manages the state of a simulated trading account: cash, open positions,
/// the append-only trade ledger, and the per-period history series.
///
/// All mutation goes through the operation methods; the accessors expose
/// read-only views so the ledger cannot be rewritten from outside.
#[derive(Debug, Clone)]
pub struct Portfolio {
    initial_capital: Decimal,
    cash: Decimal,
    commission_pct: Decimal,
    min_position_pct: Decimal,
    max_position_pct: Decimal,
    benchmark_symbol: String,
    positions: HashMap<String, Position>,
    trades: Vec<Trade>,
    history: Vec<HistoryRecord>,
}

impl Portfolio {
    /// Creates a new `Portfolio` with a given amount of starting capital and
    /// the default commission and sizing bounds (0.1%, 1%–15%).
    pub fn new(initial_capital: Decimal) -> Self {
        Self {
            initial_capital,
            cash: initial_capital,
            commission_pct: DEFAULT_COMMISSION_PCT,
            min_position_pct: DEFAULT_MIN_POSITION_PCT,
            max_position_pct: DEFAULT_MAX_POSITION_PCT,
            benchmark_symbol: DEFAULT_BENCHMARK_SYMBOL.to_string(),
            positions: HashMap::new(),
            trades: Vec::new(),
            history: Vec::new(),
        }
    }

    /// Creates a `Portfolio` with explicit commission and sizing bounds,
    /// validating that the parameters are logical.
    pub fn with_limits(
        initial_capital: Decimal,
        commission_pct: Decimal,
        min_position_pct: Decimal,
        max_position_pct: Decimal,
    ) -> Result<Self, PortfolioError> {
        if initial_capital <= Decimal::ZERO {
            return Err(PortfolioError::InvalidParameters(
                "initial_capital must be greater than 0".to_string(),
            ));
        }
        if commission_pct < Decimal::ZERO || commission_pct >= dec!(1) {
            return Err(PortfolioError::InvalidParameters(
                "commission_pct must be in [0, 1)".to_string(),
            ));
        }
        if min_position_pct <= Decimal::ZERO
            || max_position_pct >= dec!(1)
            || min_position_pct > max_position_pct
        {
            return Err(PortfolioError::InvalidParameters(
                "position bounds must satisfy 0 < min <= max < 1".to_string(),
            ));
        }

        let mut portfolio = Self::new(initial_capital);
        portfolio.commission_pct = commission_pct;
        portfolio.min_position_pct = min_position_pct;
        portfolio.max_position_pct = max_position_pct;
        Ok(portfolio)
    }

    /// Sets the instrument tag stamped on interest ledger entries.
    pub fn set_benchmark_symbol(&mut self, symbol: impl Into<String>) {
        self.benchmark_symbol = symbol.into();
    }

    // --- Read-only views ---

    pub fn initial_capital(&self) -> Decimal {
        self.initial_capital
    }

    pub fn cash(&self) -> Decimal {
        self.cash
    }

    /// The full append-only trade ledger, in execution order.
    pub fn trades(&self) -> &[Trade] {
        &self.trades
    }

    /// The per-period history series, in recording order.
    pub fn history(&self) -> &[HistoryRecord] {
        &self.history
    }

    /// A snapshot of a single open position.
    pub fn position(&self, symbol: &str) -> Option<&Position> {
        self.positions.get(symbol)
    }

    pub fn num_positions(&self) -> usize {
        self.positions.len()
    }

    /// Combined market value of all open positions.
    pub fn positions_value(&self) -> Decimal {
        self.positions
            .values()
            .map(|position| position.market_value())
            .sum()
    }

    /// Total portfolio value: cash plus the market value of all positions.
    /// This is the sole basis for every percentage calculation.
    pub fn total_value(&self) -> Decimal {
        self.cash + self.positions_value()
    }

    /// Fraction of total value held in positions rather than cash, in percent.
    pub fn exposure_pct(&self) -> Decimal {
        safe_ratio(self.positions_value(), self.total_value()) * dec!(100)
    }

    // --- Operations ---

    /// Updates the mark price of every held instrument present in `prices`.
    /// Instruments absent from the map retain their last mark. The map is
    /// validated before any price is applied, so a faulty feed never leaves
    /// the portfolio half-marked.
    pub fn mark(&mut self, prices: &HashMap<String, Decimal>) -> Result<(), PortfolioError> {
        for (symbol, price) in prices {
            if *price <= Decimal::ZERO {
                return Err(PortfolioError::InvalidPrice {
                    symbol: symbol.clone(),
                    price: *price,
                });
            }
        }

        for (symbol, position) in self.positions.iter_mut() {
            if let Some(price) = prices.get(symbol) {
                position.mark_price = *price;
            }
        }
        Ok(())
    }

    /// Negotiates how much of a requested target weight the portfolio can
    /// actually deploy for `symbol`.
    ///
    /// The request is clamped to the maximum position size; anything below
    /// the minimum is a hard rejection. For an existing position only the
    /// *incremental* value counts, and it must itself clear the minimum so
    /// that economically meaningless top-ups are refused. If cash cannot
    /// cover the value plus commission, the value shrinks to what cash can
    /// fund, which must in turn still clear the minimum.
    pub fn can_buy(&self, symbol: &str, target_weight_pct: Decimal) -> BuyCheck {
        let min_weight_pct = self.min_position_pct * dec!(100);
        let max_weight_pct = self.max_position_pct * dec!(100);

        if target_weight_pct < min_weight_pct {
            return BuyCheck::rejected(format!(
                "target {}% below minimum {}%",
                target_weight_pct.round_dp(1),
                min_weight_pct.round_dp(1)
            ));
        }
        let target_weight_pct = target_weight_pct.min(max_weight_pct);

        let total_value = self.total_value();
        let mut target_value = target_weight_pct / dec!(100) * total_value;

        if let Some(position) = self.positions.get(symbol) {
            let additional_value = target_value - position.market_value();
            if additional_value < total_value * self.min_position_pct {
                return BuyCheck::rejected(format!(
                    "increment of {}% too small",
                    (safe_ratio(additional_value, total_value) * dec!(100)).round_dp(1)
                ));
            }
            target_value = additional_value;
        }

        let required_cash = target_value * (Decimal::ONE + self.commission_pct);
        if required_cash > self.cash {
            target_value = self.cash / (Decimal::ONE + self.commission_pct);

            if target_value < total_value * self.min_position_pct {
                return BuyCheck::rejected(format!(
                    "insufficient cash (have {}, need {})",
                    self.cash.round_dp(2),
                    required_cash.round_dp(2)
                ));
            }
        }

        BuyCheck::approved(target_value)
    }

    /// Executes a buy toward a target portfolio weight.
    ///
    /// Returns `Ok(None)` when the sizing negotiation rejects the request or
    /// the affordable value rounds down to zero whole shares; both are
    /// routine outcomes. Errs only on non-positive prices or protective
    /// levels, which indicate a driver bug.
    #[allow(clippy::too_many_arguments)]
    pub fn buy(
        &mut self,
        symbol: &str,
        price: Decimal,
        target_weight_pct: Decimal,
        date: NaiveDate,
        stop_loss: Option<Decimal>,
        take_profit: Option<Decimal>,
        reason: TradeReason,
    ) -> Result<Option<Trade>, PortfolioError> {
        self.ensure_positive_price(symbol, price)?;
        for level in [stop_loss, take_profit].into_iter().flatten() {
            if level <= Decimal::ZERO {
                return Err(PortfolioError::InvalidLevel {
                    symbol: symbol.to_string(),
                    level,
                });
            }
        }

        let check = self.can_buy(symbol, target_weight_pct);
        if !check.allowed {
            debug!(symbol, reason = %check.reason, "buy rejected");
            return Ok(None);
        }

        let mut shares = whole_shares(check.affordable_value, price);
        if shares == 0 {
            return Ok(None);
        }

        let mut gross_value = Decimal::from(shares) * price;
        let mut commission = gross_value * self.commission_pct;
        let mut total_cost = gross_value + commission;

        // Rounding to whole shares can push the exact cost past available
        // cash; shrink the share count until the full cost fits. Cash must
        // never go negative.
        if total_cost > self.cash {
            shares = whole_shares(self.cash, price * (Decimal::ONE + self.commission_pct));
            if shares == 0 {
                return Ok(None);
            }
            gross_value = Decimal::from(shares) * price;
            commission = gross_value * self.commission_pct;
            total_cost = gross_value + commission;
        }

        self.cash -= total_cost;

        match self.positions.get_mut(symbol) {
            Some(position) => {
                let old_cost = position.cost_basis();
                position.shares += shares;
                position.avg_cost = (old_cost + gross_value) / Decimal::from(position.shares);
                position.mark_price = price;
                // Protective levels are overwritten only when explicitly
                // supplied on this call.
                if let Some(level) = stop_loss {
                    position.stop_loss = Some(level);
                }
                if let Some(level) = take_profit {
                    position.take_profit = Some(level);
                }
            }
            None => {
                self.positions.insert(
                    symbol.to_string(),
                    Position {
                        symbol: symbol.to_string(),
                        shares,
                        avg_cost: price,
                        mark_price: price,
                        entry_date: date,
                        stop_loss,
                        take_profit,
                    },
                );
            }
        }

        let trade = Trade {
            date,
            symbol: symbol.to_string(),
            action: TradeAction::Buy,
            shares,
            price,
            commission,
            net_cash_delta: -total_cost,
            reason,
        };
        info!(symbol, shares, price = %price, cost = %total_cost.round_dp(2), reason = %reason, "executed buy");
        self.trades.push(trade.clone());

        Ok(Some(trade))
    }

    /// Executes a sell.
    ///
    /// `shares` defaults to the full position and is clamped to it — the
    /// portfolio never oversells. Selling without a position is `Ok(None)`.
    pub fn sell(
        &mut self,
        symbol: &str,
        price: Decimal,
        date: NaiveDate,
        shares: Option<u64>,
        reason: TradeReason,
    ) -> Result<Option<Trade>, PortfolioError> {
        self.ensure_positive_price(symbol, price)?;

        let (quantity, commission, net_proceeds, remaining) =
            match self.positions.get_mut(symbol) {
                None => return Ok(None),
                Some(position) => {
                    let quantity = shares.unwrap_or(position.shares).min(position.shares);
                    if quantity == 0 {
                        return Ok(None);
                    }
                    let gross_value = Decimal::from(quantity) * price;
                    let commission = gross_value * self.commission_pct;
                    position.shares -= quantity;
                    (quantity, commission, gross_value - commission, position.shares)
                }
            };

        self.cash += net_proceeds;
        // A position that reaches zero shares is removed, never retained.
        if remaining == 0 {
            self.positions.remove(symbol);
        }

        let trade = Trade {
            date,
            symbol: symbol.to_string(),
            action: TradeAction::Sell,
            shares: quantity,
            price,
            commission,
            net_cash_delta: net_proceeds,
            reason,
        };
        info!(symbol, shares = quantity, price = %price, proceeds = %net_proceeds.round_dp(2), reason = %reason, "executed sell");
        self.trades.push(trade.clone());

        Ok(Some(trade))
    }

    /// Evaluates every held position's protective levels against its current
    /// mark and liquidates the ones that triggered, stop-loss checked before
    /// take-profit.
    ///
    /// Triggers are collected before any sell executes: the position map is
    /// never mutated while being iterated, and the resulting ledger order is
    /// deterministic regardless of map iteration order.
    pub fn check_exits(&mut self, date: NaiveDate) -> Result<Vec<Trade>, PortfolioError> {
        let mut triggered: Vec<(String, Decimal, TradeReason)> = Vec::new();
        for (symbol, position) in &self.positions {
            if position.should_stop_loss() {
                triggered.push((symbol.clone(), position.mark_price, TradeReason::StopLoss));
            } else if position.should_take_profit() {
                triggered.push((symbol.clone(), position.mark_price, TradeReason::TakeProfit));
            }
        }
        triggered.sort_by(|a, b| a.0.cmp(&b.0));

        let mut executed = Vec::new();
        for (symbol, price, reason) in triggered {
            if let Some(trade) = self.sell(&symbol, price, date, None, reason)? {
                executed.push(trade);
            }
        }
        Ok(executed)
    }

    /// Credits one period of benchmark yield to idle cash. Fully-invested
    /// portfolios (no cash) accrue nothing.
    pub fn accrue_interest(
        &mut self,
        date: NaiveDate,
        daily_rate: Decimal,
    ) -> Result<Option<Trade>, PortfolioError> {
        if daily_rate <= dec!(-1) {
            return Err(PortfolioError::InvalidRate(daily_rate));
        }
        if self.cash <= Decimal::ZERO {
            return Ok(None);
        }

        let interest = self.cash * daily_rate;
        self.cash += interest;

        let trade = Trade {
            date,
            symbol: self.benchmark_symbol.clone(),
            action: TradeAction::Interest,
            shares: 0,
            price: Decimal::ZERO,
            commission: Decimal::ZERO,
            net_cash_delta: interest,
            reason: TradeReason::SelicYield,
        };
        self.trades.push(trade.clone());

        Ok(Some(trade))
    }

    /// Appends one end-of-period snapshot to the history series.
    ///
    /// Precondition: called exactly once per simulated period, after all
    /// marks and trades for the period are applied — otherwise the return
    /// series silently loses meaning.
    pub fn record_state(&mut self, date: NaiveDate) {
        let total = self.total_value();
        let daily_return_pct = match self.history.last() {
            Some(previous) if previous.total_value > Decimal::ZERO => {
                (total / previous.total_value - Decimal::ONE) * dec!(100)
            }
            _ => Decimal::ZERO,
        };

        self.history.push(HistoryRecord {
            date,
            total_value: total,
            cash: self.cash,
            positions_value: self.positions_value(),
            num_positions: self.num_positions(),
            daily_return_pct,
        });
    }

    // --- Audit views ---

    /// Top-level snapshot for reporting.
    pub fn summary(&self) -> PortfolioSummary {
        let total = self.total_value();
        PortfolioSummary {
            initial_capital: self.initial_capital,
            current_value: total,
            cash: self.cash,
            positions_value: self.positions_value(),
            num_positions: self.num_positions(),
            total_return_pct: safe_ratio(total - self.initial_capital, self.initial_capital)
                * dec!(100),
            total_return_abs: total - self.initial_capital,
            exposure_pct: self.exposure_pct(),
            num_trades: self.trades.len(),
        }
    }

    /// One audit row per open position, heaviest weight first.
    pub fn positions_summary(&self) -> Vec<PositionSnapshot> {
        let total = self.total_value();
        let mut rows: Vec<PositionSnapshot> = self
            .positions
            .values()
            .map(|position| PositionSnapshot {
                symbol: position.symbol.clone(),
                shares: position.shares,
                avg_cost: position.avg_cost,
                mark_price: position.mark_price,
                market_value: position.market_value(),
                cost_basis: position.cost_basis(),
                unrealized_pnl: position.unrealized_pnl(),
                unrealized_pnl_pct: position.unrealized_pnl_pct(),
                weight_pct: safe_ratio(position.market_value(), total) * dec!(100),
                entry_date: position.entry_date,
                stop_loss: position.stop_loss,
                take_profit: position.take_profit,
            })
            .collect();
        rows.sort_by(|a, b| b.weight_pct.cmp(&a.weight_pct));
        rows
    }

    fn ensure_positive_price(&self, symbol: &str, price: Decimal) -> Result<(), PortfolioError> {
        if price <= Decimal::ZERO {
            return Err(PortfolioError::InvalidPrice {
                symbol: symbol.to_string(),
                price,
            });
        }
        Ok(())
    }
}

/// Whole shares purchasable for `value` at `unit_cost` apiece.
fn whole_shares(value: Decimal, unit_cost: Decimal) -> u64 {
    if unit_cost <= Decimal::ZERO {
        return 0;
    }
    (value / unit_cost).floor().to_u64().unwrap_or(0)
}
