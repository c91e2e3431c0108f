//! # Meridian Analytics Engine
//!
//! This crate derives the performance-report scalar set from a simulation's
//! history series. It acts as the "unbiased judge" of the system.
//!
//! ## Architectural Principles
//!
//! - **Layer 1 Logic:** This is a pure logic crate. It has no knowledge of
//!   external systems and depends only on `core-types` (Layer 0).
//! - **Stateless Calculation:** The `AnalyticsEngine` is a stateless
//!   calculator. It takes the recorded history plus an aligned benchmark
//!   daily-rate series and produces a `PerformanceReport`. This makes it
//!   highly reliable and easy to test.
//! - **Graceful degradation:** Fewer than two history records means there is
//!   no return to measure; the engine reports the empty (zeroed) result
//!   rather than an error.
//!
//! ## Public API
//!
//! - `AnalyticsEngine`: the main struct that contains the calculation logic.
//! - `PerformanceReport`: the standardized struct that holds the performance
//!   metrics.
//! - `AnalyticsError`: the specific error types that can be returned from
//!   this crate.

// Declare the modules that constitute this crate.
pub mod engine;
pub mod error;
pub mod report;

// Re-export the key components to create a clean, public-facing API.
pub use engine::AnalyticsEngine;
pub use error::AnalyticsError;
pub use report::PerformanceReport;
