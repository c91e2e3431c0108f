//! # Meridian Portfolio Ledger
//!
//! The stateful accounting engine of the simulation. A `Portfolio` owns the
//! cash balance, the set of open positions, the append-only trade ledger, and
//! the per-period history series, and it enforces the position-sizing bounds
//! on every buy.
//!
//! ## Architectural Principles
//!
//! - **Single writer:** A `Portfolio` is an explicitly owned state object.
//!   One driver mutates it strictly sequentially; there is no ambient or
//!   global access, and parallel runs each own an independent instance.
//! - **Routine rejection is not an error:** Insufficient cash, sub-minimum
//!   sizing, overselling, and selling without a position all produce a
//!   well-defined "no trade occurred" result. `Err` is reserved for caller
//!   programming errors such as non-positive prices.
//! - **The ledger is truth:** Every realized cash movement appends exactly
//!   one immutable `Trade`; the ledger is never mutated or reordered.
//!
//! ## Public API
//!
//! - `Portfolio`: the engine itself.
//! - `BuyCheck`: the outcome of the sizing negotiation for one buy request.
//! - `PortfolioSummary` / `PositionSnapshot`: audit views for reporting.
//! - `PortfolioError`: the specific error types that can be returned from
//!   this crate.

pub mod error;
pub mod portfolio;
pub mod summary;

// Re-export the key components to create a clean, public-facing API.
pub use error::PortfolioError;
pub use portfolio::{BuyCheck, Portfolio};
pub use summary::{PortfolioSummary, PositionSnapshot};
