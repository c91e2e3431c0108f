//! # Meridian Simulation Driver
//!
//! Sequences one simulation run over historical periods. The required
//! per-period call order — mark prices, check protective exits, apply
//! decision-driven trades, accrue benchmark interest, record state — is easy
//! to get wrong from the outside and silently corrupts the return series when
//! violated, so this crate funnels it through a single `advance_period` entry
//! point.

use analytics::{AnalyticsEngine, PerformanceReport};
use benchmark::{BenchmarkError, RateSeries};
use chrono::NaiveDate;
use configuration::Config;
use core_types::{daily_rate_from_annual, Decision, Trade, TradeAction};
use indicatif::{ProgressBar, ProgressStyle};
use portfolio::{Portfolio, PortfolioSummary};
use rust_decimal::Decimal;
use std::collections::HashMap;
use tracing::info;
use uuid::Uuid;

pub mod error;

pub use error::BacktestError;

/// Everything the simulation needs to advance one period: the date, the
/// closing prices observed that period, and the decisions the upstream
/// pipeline produced for it.
#[derive(Debug, Clone)]
pub struct PeriodUpdate {
    pub date: NaiveDate,
    pub prices: HashMap<String, Decimal>,
    pub decisions: Vec<Decision>,
}

/// One simulation run: a portfolio, a benchmark rate series, and the
/// analytics engine that scores the result.
///
/// A `Simulation` owns all of its mutable state. Parameter sweeps that run
/// in parallel must construct one `Simulation` per run; nothing is shared.
pub struct Simulation {
    run_id: Uuid,
    portfolio: Portfolio,
    rates: RateSeries,
    analytics_engine: AnalyticsEngine,
    fallback_annual_rate: Decimal,
}

impl Simulation {
    /// Constructs a run from validated configuration plus an
    /// externally-sourced benchmark rate series. An empty series is allowed
    /// and falls back to the configured fixed annual rate throughout.
    pub fn new(config: &Config, rates: RateSeries) -> Result<Self, BacktestError> {
        let mut portfolio = Portfolio::with_limits(
            config.simulation.initial_capital,
            config.simulation.commission_pct,
            config.sizing.min_position_pct,
            config.sizing.max_position_pct,
        )?;
        portfolio.set_benchmark_symbol(&config.benchmark.symbol);

        Ok(Self {
            run_id: Uuid::new_v4(),
            portfolio,
            rates,
            analytics_engine: AnalyticsEngine::new(),
            fallback_annual_rate: config.benchmark.annual_rate,
        })
    }

    pub fn run_id(&self) -> Uuid {
        self.run_id
    }

    pub fn portfolio(&self) -> &Portfolio {
        &self.portfolio
    }

    pub fn summary(&self) -> PortfolioSummary {
        self.portfolio.summary()
    }

    /// Advances the simulation by one period, in the mandated order:
    ///
    /// 1. mark positions to the period's prices;
    /// 2. execute protective stop-loss/take-profit exits;
    /// 3. apply the period's decision-driven buys and sells;
    /// 4. accrue one period of benchmark yield on idle cash;
    /// 5. record the end-of-period snapshot.
    ///
    /// Returns every trade executed during the period, in execution order.
    pub fn advance_period(&mut self, period: &PeriodUpdate) -> Result<Vec<Trade>, BacktestError> {
        self.portfolio.mark(&period.prices)?;

        let mut executed = self.portfolio.check_exits(period.date)?;

        for decision in &period.decisions {
            let trade = match decision.action {
                TradeAction::Buy => self.portfolio.buy(
                    &decision.symbol,
                    decision.price,
                    decision.target_weight_pct,
                    period.date,
                    decision.stop_loss,
                    decision.take_profit,
                    decision.reason,
                )?,
                TradeAction::Sell => self.portfolio.sell(
                    &decision.symbol,
                    decision.price,
                    period.date,
                    decision.shares,
                    decision.reason,
                )?,
                // Interest is accrued by the simulation itself, never
                // decided upstream.
                TradeAction::Interest => {
                    return Err(BacktestError::UnsupportedAction {
                        symbol: decision.symbol.clone(),
                        action: decision.action,
                    });
                }
            };
            if let Some(trade) = trade {
                executed.push(trade);
            }
        }

        let daily_rate = if self.rates.is_empty() {
            daily_rate_from_annual(self.fallback_annual_rate)
        } else {
            self.rates
                .rate_on(period.date)
                .unwrap_or_else(|| self.rates.mean_rate())
        };
        if let Some(trade) = self.portfolio.accrue_interest(period.date, daily_rate)? {
            executed.push(trade);
        }

        self.portfolio.record_state(period.date);

        Ok(executed)
    }

    /// Runs the full period stream and returns the final performance report.
    pub fn run(&mut self, periods: &[PeriodUpdate]) -> Result<PerformanceReport, BacktestError> {
        if periods.is_empty() {
            return Err(BacktestError::EmptySimulation);
        }

        let progress_bar = ProgressBar::new(periods.len() as u64);
        progress_bar.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta})")
                .unwrap()
                .progress_chars("=>-"),
        );

        for period in periods {
            self.advance_period(period)?;
            progress_bar.inc(1);
        }
        progress_bar.finish_with_message("Simulation complete.");

        info!(run_id = %self.run_id, periods = periods.len(), trades = self.portfolio.trades().len(), "simulation finished");
        self.report()
    }

    /// Aligns the benchmark series onto the recorded date axis and derives
    /// the performance report. An empty benchmark source degrades to the
    /// configured fixed annual rate.
    pub fn report(&self) -> Result<PerformanceReport, BacktestError> {
        let history = self.portfolio.history();
        let dates: Vec<NaiveDate> = history.iter().map(|record| record.date).collect();

        let aligned = match self.rates.align(&dates) {
            Ok(series) => Some(series),
            Err(BenchmarkError::EmptySeries) => None,
        };

        self.analytics_engine
            .calculate(history, aligned.as_deref(), self.fallback_annual_rate)
            .map_err(Into::into)
    }
}
