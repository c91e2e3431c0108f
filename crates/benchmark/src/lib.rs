//! # Meridian Benchmark Rates
//!
//! The risk-free reference-rate series (SELIC/CDI-style daily rates) and its
//! alignment onto a simulation's exact date axis.
//!
//! ## Architectural Principles
//!
//! - **Gap-free output:** `RateSeries::align` always produces one rate per
//!   requested date — exact matches are copied, holiday gaps forward-fill
//!   from the most recent known rate, and a leading gap falls back to the
//!   series mean. The Sharpe and benchmark-comparison calculations require a
//!   complete series; the only loud failure is an entirely empty source.
//! - **No I/O:** Fetching real rates from an external provider is a
//!   collaborator's job. This crate only reshapes in-memory series, or
//!   synthesizes one from a fixed annual rate.

pub mod error;
pub mod series;

// Re-export the key components to create a clean, public-facing API.
pub use error::BenchmarkError;
pub use series::RateSeries;
