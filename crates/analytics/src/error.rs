use thiserror::Error;

#[derive(Error, Debug)]
pub enum AnalyticsError {
    #[error("Benchmark series of length {benchmark} does not match history of length {history}")]
    SeriesLengthMismatch { history: usize, benchmark: usize },

    #[error("An unexpected error occurred during analytics calculation: {0}")]
    InternalError(String),
}
