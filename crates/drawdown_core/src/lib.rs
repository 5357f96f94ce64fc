//! Retirement drawdown simulation library
//!
//! This crate projects a household's finances forward month by month:
//! - Accounts with different tax treatment (taxable, Roth-style, tax-deferred)
//! - Required Minimum Distribution (RMD) modeling
//! - Bracket-limited withdrawals from tax-deferred accounts
//! - Progressive income and capital gains tax, paid one year in arrears
//! - Roth conversions into the standard deduction
//! - Fixed or historical market assumptions, with historical sweeps
//!
//! # Builder DSL
//!
//! ```ignore
//! use drawdown_core::{ScenarioBuilder, simulate};
//!
//! let scenario = ScenarioBuilder::new(2025, 2060)
//!     .birth_year(1965)
//!     .expenses(90_000.0, 0.03)
//!     .fixed_rates(0.06, 0.03)
//!     .taxable_account("Brokerage", 600_000.0)
//!     .post_tax_account("401ks", "Work 401k", 900_000.0)
//!     .pre_tax_account("Roth", 150_000.0, 2025)
//!     .build()?;
//! let result = simulate(scenario)?;
//! ```

#![warn(clippy::all)]

// ============================================================================
// Core modules
// ============================================================================

pub mod error;
pub mod manager;
pub mod report;
pub mod simulation;
pub mod taxes;
pub mod withdrawal_group;

// ============================================================================
// Type definition modules
// ============================================================================

pub mod config;
pub mod model;

// ============================================================================
// Test modules
// ============================================================================

#[cfg(test)]
mod tests;

// ============================================================================
// Public re-exports for convenience
// ============================================================================

pub use config::{Scenario, ScenarioBuilder, ScenarioConfig};
pub use error::{AccountError, ConfigError, SimulationError};
pub use manager::WithdrawManager;
pub use report::Report;
pub use simulation::{simulate, sweep};
pub use withdrawal_group::RateLimitedWithdrawalGroup;
