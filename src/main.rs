use anyhow::Context;
use backtester::{PeriodUpdate, Simulation};
use benchmark::RateSeries;
use chrono::{Datelike, NaiveDate, Weekday};
use clap::{Parser, Subcommand};
use comfy_table::{presets::UTF8_FULL, Table};
use configuration::{Benchmark, Config, Simulation as SimulationSettings, Sizing};
use core_types::{Decision, TradeAction, TradeReason};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::collections::HashMap;
use tracing_subscriber::EnvFilter;

/// The main entry point for the Meridian simulation application.
fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    // Parse command-line arguments
    let cli = Cli::parse();

    // Execute the appropriate command
    match cli.command {
        Commands::Simulate(args) => handle_simulate(args)?,
    }

    Ok(())
}

// ==============================================================================
// CLI Structure
// ==============================================================================

/// A portfolio ledger and performance-metrics engine for simulated trading.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a deterministic demonstration simulation and print the report.
    Simulate(SimulateArgs),
}

#[derive(Parser)]
struct SimulateArgs {
    /// Number of trading days to simulate.
    #[arg(long, default_value_t = 120)]
    days: usize,

    /// Initial capital for the run.
    #[arg(long, default_value = "50000000")]
    capital: Decimal,

    /// Start date for the simulation (format: YYYY-MM-DD).
    #[arg(long, default_value = "2024-01-02")]
    from: NaiveDate,

    /// Annual benchmark rate used for interest accrual and comparison.
    #[arg(long, default_value = "0.135")]
    annual_rate: Decimal,

    /// Write the full audit record (ledger, history, metrics) as JSON.
    #[arg(long)]
    export: Option<std::path::PathBuf>,
}

// ==============================================================================
// Demonstration Scenario
// ==============================================================================

/// The instruments traded by the demonstration run: symbol, entry price, and
/// the target weight requested on the first day.
const UNIVERSE: &[(&str, Decimal, Decimal)] = &[
    ("PETR4.SA", dec!(30.50), dec!(8)),
    ("VALE3.SA", dec!(65.20), dec!(8)),
    ("ITUB4.SA", dec!(28.90), dec!(6)),
    ("BBDC4.SA", dec!(14.80), dec!(6)),
    ("WEGE3.SA", dec!(36.40), dec!(5)),
];

/// A fixed 12-day return cycle; each instrument starts at a different offset
/// and carries its own drift so the scenario exercises both protective exits.
const RETURN_CYCLE: &[Decimal] = &[
    dec!(0.006),
    dec!(-0.004),
    dec!(0.002),
    dec!(0),
    dec!(-0.007),
    dec!(0.009),
    dec!(0.001),
    dec!(-0.002),
    dec!(0.004),
    dec!(-0.001),
    dec!(0.003),
    dec!(-0.005),
];

const DRIFT: &[Decimal] = &[
    dec!(0.0005),
    dec!(0.001),
    dec!(-0.003),
    dec!(0.0008),
    dec!(0.0025),
];

fn handle_simulate(args: SimulateArgs) -> anyhow::Result<()> {
    let dates = business_days(args.from, args.days)?;
    let last_date = *dates.last().context("simulation needs at least one day")?;

    let config = Config {
        simulation: SimulationSettings {
            initial_capital: args.capital,
            commission_pct: dec!(0.001),
            start_date: args.from,
            end_date: last_date,
        },
        sizing: Sizing {
            min_position_pct: dec!(0.01),
            max_position_pct: dec!(0.15),
        },
        benchmark: Benchmark {
            symbol: "SELIC".to_string(),
            annual_rate: args.annual_rate,
        },
    };
    config.validate()?;

    let periods = build_periods(&dates);

    let rates = RateSeries::fixed(args.annual_rate, args.from, last_date);
    let mut simulation = Simulation::new(&config, rates)?;

    println!(
        "Running simulation {} over {} trading days from {}",
        simulation.run_id(),
        dates.len(),
        args.from
    );
    let report = simulation.run(&periods)?;
    tracing::info!(run_id = %simulation.run_id(), trades = simulation.portfolio().trades().len(), "demonstration run complete");

    print_summary(&simulation);
    print_positions(&simulation);
    print_metrics(&report);
    print_trade_tally(&simulation);

    if let Some(path) = args.export.as_deref() {
        let audit = serde_json::json!({
            "run_id": simulation.run_id().to_string(),
            "summary": simulation.summary(),
            "positions": simulation.portfolio().positions_summary(),
            "history": simulation.portfolio().history(),
            "trades": simulation.portfolio().trades(),
            "metrics": report,
        });
        std::fs::write(path, serde_json::to_string_pretty(&audit)?)
            .with_context(|| format!("failed to write audit export to {}", path.display()))?;
        println!("\nAudit export written to {}", path.display());
    }

    Ok(())
}

/// Generates `count` consecutive business days (Mon-Fri) starting at `from`.
fn business_days(from: NaiveDate, count: usize) -> anyhow::Result<Vec<NaiveDate>> {
    let mut dates = Vec::with_capacity(count);
    let mut date = from;
    while dates.len() < count {
        if !matches!(date.weekday(), Weekday::Sat | Weekday::Sun) {
            dates.push(date);
        }
        date = date.succ_opt().context("date range overflow")?;
    }
    Ok(dates)
}

/// Builds the deterministic period stream: initial entries on the first day,
/// a rebalance of the two heaviest names every 21 trading days, and the
/// cyclic price paths in between.
fn build_periods(dates: &[NaiveDate]) -> Vec<PeriodUpdate> {
    let mut last_prices: Vec<Decimal> = UNIVERSE.iter().map(|(_, price, _)| *price).collect();
    let mut periods = Vec::with_capacity(dates.len());

    for (day_index, date) in dates.iter().enumerate() {
        let mut prices = HashMap::new();
        for (symbol_index, (symbol, _, _)) in UNIVERSE.iter().enumerate() {
            if day_index > 0 {
                let cycle = RETURN_CYCLE[(day_index + 3 * symbol_index) % RETURN_CYCLE.len()];
                last_prices[symbol_index] *= Decimal::ONE + cycle + DRIFT[symbol_index];
            }
            prices.insert(symbol.to_string(), last_prices[symbol_index].round_dp(4));
        }

        let mut decisions = Vec::new();
        if day_index == 0 {
            for (symbol_index, (symbol, _, weight)) in UNIVERSE.iter().enumerate() {
                let entry = last_prices[symbol_index];
                decisions.push(Decision {
                    symbol: symbol.to_string(),
                    action: TradeAction::Buy,
                    target_weight_pct: *weight,
                    price: entry,
                    shares: None,
                    stop_loss: Some((entry * dec!(0.90)).round_dp(2)),
                    take_profit: Some((entry * dec!(1.15)).round_dp(2)),
                    reason: TradeReason::Initial,
                });
            }
        } else if day_index % 21 == 0 {
            for (symbol_index, (symbol, _, _)) in UNIVERSE.iter().enumerate().take(2) {
                decisions.push(Decision {
                    symbol: symbol.to_string(),
                    action: TradeAction::Buy,
                    target_weight_pct: dec!(10),
                    price: last_prices[symbol_index].round_dp(4),
                    shares: None,
                    stop_loss: None,
                    take_profit: None,
                    reason: TradeReason::Rebalance,
                });
            }
        }

        periods.push(PeriodUpdate {
            date: *date,
            prices,
            decisions,
        });
    }

    periods
}

// ==============================================================================
// Report Rendering
// ==============================================================================

fn print_summary(simulation: &Simulation) {
    let summary = simulation.summary();
    let mut table = Table::new();
    table.load_preset(UTF8_FULL).set_header(vec!["Portfolio", "Value"]);
    table.add_row(vec!["Initial capital".to_string(), format!("{}", summary.initial_capital.round_dp(2))]);
    table.add_row(vec!["Current value".to_string(), format!("{}", summary.current_value.round_dp(2))]);
    table.add_row(vec!["Cash".to_string(), format!("{}", summary.cash.round_dp(2))]);
    table.add_row(vec!["Positions value".to_string(), format!("{}", summary.positions_value.round_dp(2))]);
    table.add_row(vec!["Open positions".to_string(), summary.num_positions.to_string()]);
    table.add_row(vec!["Total return %".to_string(), format!("{}", summary.total_return_pct.round_dp(2))]);
    table.add_row(vec!["Total return".to_string(), format!("{}", summary.total_return_abs.round_dp(2))]);
    table.add_row(vec!["Exposure %".to_string(), format!("{}", summary.exposure_pct.round_dp(2))]);
    table.add_row(vec!["Trades".to_string(), summary.num_trades.to_string()]);
    println!("\n{table}");
}

fn print_positions(simulation: &Simulation) {
    let rows = simulation.portfolio().positions_summary();
    if rows.is_empty() {
        println!("\nNo open positions.");
        return;
    }

    let mut table = Table::new();
    table.load_preset(UTF8_FULL).set_header(vec![
        "Symbol", "Shares", "Avg cost", "Mark", "Market value", "P&L", "P&L %", "Weight %",
    ]);
    for row in rows {
        table.add_row(vec![
            row.symbol.clone(),
            row.shares.to_string(),
            format!("{}", row.avg_cost.round_dp(2)),
            format!("{}", row.mark_price.round_dp(2)),
            format!("{}", row.market_value.round_dp(2)),
            format!("{}", row.unrealized_pnl.round_dp(2)),
            format!("{}", row.unrealized_pnl_pct.round_dp(2)),
            format!("{}", row.weight_pct.round_dp(2)),
        ]);
    }
    println!("\n{table}");
}

fn print_metrics(report: &analytics::PerformanceReport) {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL).set_header(vec!["Metric", "Value"]);
    table.add_row(vec!["Total return %".to_string(), format!("{}", report.total_return_pct.round_dp(2))]);
    table.add_row(vec!["Annualized return %".to_string(), format!("{}", report.annualized_return_pct.round_dp(2))]);
    table.add_row(vec!["Benchmark return %".to_string(), format!("{}", report.benchmark_return_pct.round_dp(2))]);
    table.add_row(vec!["Outperformance %".to_string(), format!("{}", report.outperformance_pct.round_dp(2))]);
    table.add_row(vec!["Annual volatility %".to_string(), format!("{}", report.volatility_annual_pct.round_dp(2))]);
    table.add_row(vec!["Max drawdown %".to_string(), format!("{}", report.max_drawdown_pct.round_dp(2))]);
    table.add_row(vec!["Sharpe ratio".to_string(), format!("{}", report.sharpe_ratio.round_dp(3))]);
    table.add_row(vec!["Calmar ratio".to_string(), format!("{}", report.calmar_ratio.round_dp(3))]);
    table.add_row(vec!["Win rate %".to_string(), format!("{}", report.win_rate_pct.round_dp(1))]);
    table.add_row(vec!["Best day %".to_string(), format!("{}", report.best_day_pct.round_dp(2))]);
    table.add_row(vec!["Worst day %".to_string(), format!("{}", report.worst_day_pct.round_dp(2))]);
    table.add_row(vec!["Trading days".to_string(), report.num_periods.to_string()]);
    table.add_row(vec!["Years".to_string(), format!("{}", report.num_years.round_dp(2))]);
    println!("\n{table}");
}

fn print_trade_tally(simulation: &Simulation) {
    let mut tally: HashMap<String, usize> = HashMap::new();
    for trade in simulation.portfolio().trades() {
        *tally.entry(format!("{} / {}", trade.action, trade.reason)).or_default() += 1;
    }
    let mut rows: Vec<(String, usize)> = tally.into_iter().collect();
    rows.sort();

    let mut table = Table::new();
    table.load_preset(UTF8_FULL).set_header(vec!["Ledger entry", "Count"]);
    for (kind, count) in rows {
        table.add_row(vec![kind, count.to_string()]);
    }
    println!("\n{table}");
}
