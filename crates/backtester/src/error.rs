use core_types::TradeAction;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BacktestError {
    #[error("Portfolio error: {0}")]
    Portfolio(#[from] portfolio::PortfolioError),

    #[error("Analytics error: {0}")]
    Analytics(#[from] analytics::AnalyticsError),

    #[error("Benchmark error: {0}")]
    Benchmark(#[from] benchmark::BenchmarkError),

    #[error("Simulation received an empty period stream")]
    EmptySimulation,

    #[error("Decision for {symbol} carries unsupported action {action}")]
    UnsupportedAction { symbol: String, action: TradeAction },
}
