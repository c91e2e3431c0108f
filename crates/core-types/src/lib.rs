//! # Meridian Core Types
//!
//! The foundational vocabulary of the simulation engine. Every other crate in
//! the workspace speaks in these types.
//!
//! ## Architectural Principles
//!
//! - **Layer 0:** This crate has no dependencies on any other workspace crate
//!   and performs no I/O. It defines data, not behavior with side effects.
//! - **Exact accounting:** All monetary quantities are `rust_decimal::Decimal`
//!   so that the ledger stays exactly auditable; share counts are integers.
//!
//! ## Public API
//!
//! - `Position`: one open holding, with its derived valuations and exit
//!   predicates.
//! - `Trade`: one immutable ledger entry (buy, sell, or interest accrual).
//! - `HistoryRecord`: one end-of-period snapshot of portfolio state.
//! - `Decision`: a numeric sizing decision handed down by the upstream
//!   pipeline.
//! - `safe_ratio`: the single division primitive used for every percentage
//!   and ratio calculation.

pub mod enums;
pub mod error;
pub mod math;
pub mod structs;

// Re-export the core types to provide a clean public API.
pub use enums::{TradeAction, TradeReason};
pub use error::CoreError;
pub use math::{daily_rate_from_annual, safe_ratio, TRADING_DAYS_PER_YEAR};
pub use structs::{Decision, HistoryRecord, Position, Trade};
