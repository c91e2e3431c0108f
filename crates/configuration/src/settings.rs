use crate::error::ConfigError;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::Deserialize;

/// The root configuration structure for the entire application.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub simulation: Simulation,
    pub sizing: Sizing,
    pub benchmark: Benchmark,
}

/// Contains parameters for a single simulation run.
#[derive(Debug, Clone, Deserialize)]
pub struct Simulation {
    /// The initial starting capital for the simulation.
    pub initial_capital: Decimal,
    /// The brokerage commission charged on the gross value of every buy and
    /// sell leg. 0.001 corresponds to 0.1%.
    pub commission_pct: Decimal,
    /// The default start date for the simulation period.
    pub start_date: NaiveDate,
    /// The default end date for the simulation period.
    pub end_date: NaiveDate,
}

/// Contains the position-sizing bounds enforced by the portfolio.
#[derive(Debug, Clone, Deserialize)]
pub struct Sizing {
    /// The minimum fraction of total portfolio value a single position may
    /// target (e.g., 0.01 for 1%). A hard floor, not a clamp.
    pub min_position_pct: Decimal,
    /// The maximum fraction of total portfolio value a single position may
    /// target (e.g., 0.15 for 15%). Requests above it are clamped down.
    pub max_position_pct: Decimal,
}

/// Contains parameters for the risk-free reference rate.
#[derive(Debug, Clone, Deserialize)]
pub struct Benchmark {
    /// The instrument tag stamped on interest ledger entries (e.g., "SELIC").
    pub symbol: String,
    /// The annual rate used when no external rate series is available
    /// (e.g., 0.135 for 13.5% a year).
    pub annual_rate: Decimal,
}

impl Config {
    /// Checks that the configured parameters are logical before any
    /// simulation state is built from them.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.simulation.initial_capital <= Decimal::ZERO {
            return Err(ConfigError::ValidationError(
                "simulation.initial_capital must be greater than 0".to_string(),
            ));
        }
        if self.simulation.commission_pct < Decimal::ZERO
            || self.simulation.commission_pct >= dec!(1)
        {
            return Err(ConfigError::ValidationError(
                "simulation.commission_pct must be in [0, 1)".to_string(),
            ));
        }
        if self.sizing.min_position_pct <= Decimal::ZERO
            || self.sizing.max_position_pct >= dec!(1)
            || self.sizing.min_position_pct > self.sizing.max_position_pct
        {
            return Err(ConfigError::ValidationError(
                "sizing bounds must satisfy 0 < min <= max < 1".to_string(),
            ));
        }
        if self.simulation.end_date < self.simulation.start_date {
            return Err(ConfigError::ValidationError(
                "simulation.end_date must not precede start_date".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_config() -> Config {
        Config {
            simulation: Simulation {
                initial_capital: dec!(50_000_000),
                commission_pct: dec!(0.001),
                start_date: NaiveDate::from_ymd_opt(2024, 1, 2).unwrap(),
                end_date: NaiveDate::from_ymd_opt(2024, 6, 28).unwrap(),
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

    #[test]
    fn valid_config_passes() {
        assert!(valid_config().validate().is_ok());
    }

    #[test]
    fn inverted_sizing_bounds_are_rejected() {
        let mut config = valid_config();
        config.sizing.min_position_pct = dec!(0.20);
        assert!(config.validate().is_err());
    }

    #[test]
    fn non_positive_capital_is_rejected() {
        let mut config = valid_config();
        config.simulation.initial_capital = Decimal::ZERO;
        assert!(config.validate().is_err());
    }
}
