//! End-to-end simulation runs against deterministic synthetic data.

use backtester::{PeriodUpdate, Simulation};
use benchmark::RateSeries;
use chrono::NaiveDate;
use configuration::{Benchmark, Config, Simulation as SimulationSettings, Sizing};
use core_types::{Decision, TradeAction, TradeReason};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::collections::HashMap;

fn day(d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 1, d).unwrap()
}

fn config(scale: Decimal) -> Config {
    Config {
        simulation: SimulationSettings {
            initial_capital: dec!(50_000_000) * scale,
            commission_pct: dec!(0.001),
            start_date: day(2),
            end_date: day(9),
        },
        sizing: Sizing {
            min_position_pct: dec!(0.01),
            max_position_pct: dec!(0.15),
        },
        benchmark: Benchmark {
            symbol: "SELIC".to_string(),
            annual_rate: dec!(0.135),
        },
    }
}

fn quotes(scale: Decimal, entries: &[(&str, Decimal)]) -> HashMap<String, Decimal> {
    entries
        .iter()
        .map(|(symbol, price)| (symbol.to_string(), *price * scale))
        .collect()
}

fn buy(symbol: &str, price: Decimal, weight: Decimal, stop: Option<Decimal>, take: Option<Decimal>) -> Decision {
    Decision {
        symbol: symbol.to_string(),
        action: TradeAction::Buy,
        target_weight_pct: weight,
        price,
        shares: None,
        stop_loss: stop,
        take_profit: take,
        reason: TradeReason::Initial,
    }
}

/// Six trading days: three entries, a stop-loss hit, a take-profit hit, and
/// one rebalance, with prices scalable for the metamorphic check.
fn periods(scale: Decimal) -> Vec<PeriodUpdate> {
    vec![
        PeriodUpdate {
            date: day(2),
            prices: quotes(scale, &[("PETR4.SA", dec!(30.50)), ("VALE3.SA", dec!(65.20)), ("ITUB4.SA", dec!(28.90))]),
            decisions: vec![
                buy("PETR4.SA", dec!(30.50) * scale, dec!(8), Some(dec!(29.50) * scale), None),
                buy("VALE3.SA", dec!(65.20) * scale, dec!(8), None, Some(dec!(70.00) * scale)),
                buy("ITUB4.SA", dec!(28.90) * scale, dec!(6), None, None),
            ],
        },
        PeriodUpdate {
            date: day(3),
            prices: quotes(scale, &[("PETR4.SA", dec!(30.10)), ("VALE3.SA", dec!(66.00)), ("ITUB4.SA", dec!(29.20))]),
            decisions: vec![],
        },
        PeriodUpdate {
            date: day(4),
            // PETR4 crashes through its 29.50 stop.
            prices: quotes(scale, &[("PETR4.SA", dec!(29.00)), ("VALE3.SA", dec!(67.40)), ("ITUB4.SA", dec!(28.70))]),
            decisions: vec![],
        },
        PeriodUpdate {
            date: day(5),
            // VALE3 clears its 70.00 target.
            prices: quotes(scale, &[("PETR4.SA", dec!(29.40)), ("VALE3.SA", dec!(70.50)), ("ITUB4.SA", dec!(29.00))]),
            decisions: vec![],
        },
        PeriodUpdate {
            date: day(8),
            prices: quotes(scale, &[("PETR4.SA", dec!(29.80)), ("VALE3.SA", dec!(69.90)), ("ITUB4.SA", dec!(29.50))]),
            decisions: vec![Decision {
                symbol: "ITUB4.SA".to_string(),
                action: TradeAction::Buy,
                target_weight_pct: dec!(10),
                price: dec!(29.50) * scale,
                shares: None,
                stop_loss: None,
                take_profit: None,
                reason: TradeReason::Rebalance,
            }],
        },
        PeriodUpdate {
            date: day(9),
            prices: quotes(scale, &[("PETR4.SA", dec!(30.00)), ("VALE3.SA", dec!(70.10)), ("ITUB4.SA", dec!(29.80))]),
            decisions: vec![],
        },
    ]
}

fn assert_close(actual: Decimal, expected: Decimal) {
    assert!(
        (actual - expected).abs() < dec!(0.000001),
        "expected {expected}, got {actual}"
    );
}

#[test]
fn full_run_produces_consistent_ledger_and_report() {
    let config = config(Decimal::ONE);
    let rates = RateSeries::fixed(config.benchmark.annual_rate, day(1), day(31));
    let mut simulation = Simulation::new(&config, rates).unwrap();

    let report = simulation.run(&periods(Decimal::ONE)).unwrap();
    let portfolio = simulation.portfolio();

    // One stop-loss and one take-profit exit fired, leaving only ITUB4.
    assert!(portfolio.position("PETR4.SA").is_none());
    assert!(portfolio.position("VALE3.SA").is_none());
    assert!(portfolio.position("ITUB4.SA").is_some());
    assert_eq!(
        portfolio
            .trades()
            .iter()
            .filter(|t| t.reason == TradeReason::StopLoss)
            .count(),
        1
    );
    assert_eq!(
        portfolio
            .trades()
            .iter()
            .filter(|t| t.reason == TradeReason::TakeProfit)
            .count(),
        1
    );

    // The ledger replays exactly into the cash balance.
    let replayed: Decimal = portfolio.trades().iter().map(|t| t.net_cash_delta).sum();
    assert_eq!(portfolio.cash(), config.simulation.initial_capital + replayed);
    assert!(portfolio.cash() >= Decimal::ZERO);
    assert_eq!(
        portfolio.total_value(),
        portfolio.cash() + portfolio.positions_value()
    );

    // One snapshot per period, first return pinned to zero.
    assert_eq!(portfolio.history().len(), 6);
    assert_eq!(portfolio.history()[0].daily_return_pct, Decimal::ZERO);

    assert_eq!(report.num_periods, 6);
    assert!(report.max_drawdown_pct <= Decimal::ZERO);
    assert!(report.win_rate_pct >= Decimal::ZERO && report.win_rate_pct <= dec!(100));
    assert!(!report.is_empty());
}

#[test]
fn interest_accrues_every_period_with_idle_cash() {
    let config = config(Decimal::ONE);
    let rates = RateSeries::fixed(config.benchmark.annual_rate, day(1), day(31));
    let mut simulation = Simulation::new(&config, rates).unwrap();
    simulation.run(&periods(Decimal::ONE)).unwrap();

    let interest_entries = simulation
        .portfolio()
        .trades()
        .iter()
        .filter(|t| t.action == TradeAction::Interest)
        .count();
    // Cash stays positive throughout, so every period accrues.
    assert_eq!(interest_entries, 6);
}

#[test]
fn empty_period_stream_is_rejected() {
    let config = config(Decimal::ONE);
    let mut simulation = Simulation::new(&config, RateSeries::default()).unwrap();
    assert!(simulation.run(&[]).is_err());
}

#[test]
fn scaling_prices_and_capital_leaves_percentages_unchanged() {
    let scale = dec!(10);

    let base_config = config(Decimal::ONE);
    let rates = RateSeries::fixed(base_config.benchmark.annual_rate, day(1), day(31));
    let mut base = Simulation::new(&base_config, rates.clone()).unwrap();
    let base_report = base.run(&periods(Decimal::ONE)).unwrap();

    let scaled_config = config(scale);
    let mut scaled = Simulation::new(&scaled_config, rates).unwrap();
    let scaled_report = scaled.run(&periods(scale)).unwrap();

    assert_close(base_report.total_return_pct, scaled_report.total_return_pct);
    assert_close(base_report.max_drawdown_pct, scaled_report.max_drawdown_pct);
    assert_close(base_report.sharpe_ratio, scaled_report.sharpe_ratio);
    assert_close(base_report.calmar_ratio, scaled_report.calmar_ratio);
    assert_close(base_report.win_rate_pct, scaled_report.win_rate_pct);

    let base_summary = base.summary();
    let scaled_summary = scaled.summary();
    assert_close(base_summary.total_return_pct, scaled_summary.total_return_pct);
    assert_close(base_summary.exposure_pct, scaled_summary.exposure_pct);
}

#[test]
fn missing_benchmark_source_falls_back_to_fixed_rate() {
    let config = config(Decimal::ONE);
    let mut simulation = Simulation::new(&config, RateSeries::default()).unwrap();
    let report = simulation.run(&periods(Decimal::ONE)).unwrap();

    // The fixed 13.5% annual rate compounds to a small positive return over
    // six trading days.
    assert!(report.benchmark_return_pct > Decimal::ZERO);
    assert!(report.benchmark_return_pct < dec!(1));
}
