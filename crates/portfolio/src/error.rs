use rust_decimal::Decimal;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PortfolioError {
    #[error("Invalid price {price} for {symbol}: prices must be positive")]
    InvalidPrice { symbol: String, price: Decimal },

    #[error("Invalid protective level {level} for {symbol}: levels must be positive")]
    InvalidLevel { symbol: String, level: Decimal },

    #[error("Invalid daily rate {0}: must be greater than -1")]
    InvalidRate(Decimal),

    #[error("Invalid parameters: {0}")]
    InvalidParameters(String),
}
