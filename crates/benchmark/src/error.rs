use thiserror::Error;

#[derive(Error, Debug)]
pub enum BenchmarkError {
    #[error("Cannot align an empty rate series")]
    EmptySeries,
}
