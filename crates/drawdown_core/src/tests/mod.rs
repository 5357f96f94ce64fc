//! Cross-module tests for the drawdown simulation engine
//!
//! Tests are organized by topic:
//! - `accounts` - Account growth, withdrawal and deposit properties
//! - `rmd` - Required Minimum Distribution behaviour through accounts
//! - `withdrawal_group` - RMD and bracket-limited withdrawal waterfall
//! - `manager` - Routing order, conversions, lump sums and tax settlement
//! - `simulation` - Full runs, failure conditions and historical sweeps

mod withdrawal_group;
