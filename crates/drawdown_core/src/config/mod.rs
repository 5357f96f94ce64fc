//! Scenario configuration
//!
//! `ScenarioConfig` is the serializable description of a household: the
//! years to simulate, spending, market assumptions, tax tables, accounts
//! and income. `Scenario::from_config` validates it and turns it into live
//! simulation state.
//!
//! # Builder DSL
//!
//! ```ignore
//! use drawdown_core::config::ScenarioBuilder;
//!
//! let scenario = ScenarioBuilder::new(2025, 2060)
//!     .birth_year(1970)
//!     .expenses(80_000.0, 0.03)
//!     .taxable_account("Brokerage", 500_000.0)
//!     .post_tax_account("401ks", "Work 401k", 800_000.0)
//!     .pre_tax_account("Roth", 100_000.0, 2030)
//!     .social_security("SSI", 3_000.0, 2037)
//!     .build()?;
//! ```

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::model::{
    DEFAULT_POST_TAX_MIN_AGE, LumpSumPayment, MarketAssumptions, RmdTable, StandardDeduction,
    TaxBracket, TaxBracketCollection,
};
use crate::withdrawal_group::{DEFAULT_MAX_TAX_RATE, DEFAULT_OVERFLOW_ALLOWANCE};

pub mod builder;
mod scenario;

pub use builder::ScenarioBuilder;
pub use scenario::Scenario;

fn default_start_year() -> i32 {
    2025
}

fn default_end_year() -> i32 {
    2092
}

fn default_expense_inflation() -> f64 {
    0.03
}

fn default_min_age() -> i32 {
    DEFAULT_POST_TAX_MIN_AGE
}

fn default_max_tax_rate() -> f64 {
    DEFAULT_MAX_TAX_RATE
}

fn default_overflow_allowance() -> f64 {
    DEFAULT_OVERFLOW_ALLOWANCE
}

/// Complete description of a household to simulate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioConfig {
    #[serde(default = "default_start_year")]
    pub start_year: i32,
    /// Last simulated year, inclusive
    #[serde(default = "default_end_year")]
    pub end_year: i32,
    /// Birth year used for the report's age column and as the default
    /// owner birth year of post-tax accounts
    pub birth_year: i32,
    pub expenses: ExpensesConfig,
    #[serde(default)]
    pub market: MarketAssumptions,
    #[serde(default)]
    pub taxes: TaxConfig,
    /// Divisor table for every post-tax account without its own
    #[serde(default)]
    pub rmd_table: RmdTable,
    #[serde(default)]
    pub taxable_accounts: Vec<TaxableAccountConfig>,
    #[serde(default)]
    pub post_tax_groups: Vec<PostTaxGroupConfig>,
    #[serde(default)]
    pub pre_tax_accounts: Vec<PreTaxAccountConfig>,
    #[serde(default)]
    pub incomes: Vec<IncomeConfig>,
    #[serde(default)]
    pub lump_sums: Vec<LumpSumPayment>,
}

impl ScenarioConfig {
    pub fn new(start_year: i32, end_year: i32, birth_year: i32) -> Self {
        Self {
            start_year,
            end_year,
            birth_year,
            expenses: ExpensesConfig::default(),
            market: MarketAssumptions::default(),
            taxes: TaxConfig::default(),
            rmd_table: RmdTable::default(),
            taxable_accounts: Vec::new(),
            post_tax_groups: Vec::new(),
            pre_tax_accounts: Vec::new(),
            incomes: Vec::new(),
            lump_sums: Vec::new(),
        }
    }

    /// Same scenario replaying history from `historic_year`
    #[must_use]
    pub fn with_historic_year(&self, historic_year: i32) -> Self {
        Self {
            market: self.market.with_historic_year(historic_year),
            ..self.clone()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpensesConfig {
    /// Yearly spending in start-year dollars
    pub annual: f64,
    #[serde(default = "default_expense_inflation")]
    pub inflation_rate: f64,
}

impl Default for ExpensesConfig {
    fn default() -> Self {
        Self {
            annual: 0.0,
            inflation_rate: default_expense_inflation(),
        }
    }
}

/// Tax law assumptions. Bracket ceilings inflate with the market's
/// inflation rates; the deduction with its own fixed rate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaxConfig {
    /// Year the tables are expressed in
    pub base_year: i32,
    pub income_brackets: Vec<TaxBracket>,
    /// Exactly two tiers: the 0% tier and the rate above it
    pub capital_gains_brackets: Vec<TaxBracket>,
    pub standard_deduction: f64,
    pub deduction_inflation: f64,
}

impl Default for TaxConfig {
    fn default() -> Self {
        let income = TaxBracketCollection::federal_income_2023(Default::default());
        let gains = TaxBracketCollection::capital_gains_2023(Default::default());
        let deduction = StandardDeduction::married_joint_2023();
        Self {
            base_year: income.year,
            income_brackets: income.brackets,
            capital_gains_brackets: gains.brackets,
            standard_deduction: deduction.amount,
            deduction_inflation: deduction.inflation_rate,
        }
    }
}

/// Brokerage account. Giving a `basis` turns on basis/gains tracking.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaxableAccountConfig {
    pub name: String,
    pub balance: f64,
    #[serde(default)]
    pub basis: Option<f64>,
    /// Fixed growth rate instead of the market's
    #[serde(default)]
    pub growth: Option<f64>,
    /// Per-year rates layered over `growth` (or the market)
    #[serde(default)]
    pub growth_by_year: FxHashMap<i32, f64>,
}

/// Already-taxed retirement account, locked until `min_year`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PreTaxAccountConfig {
    pub name: String,
    pub balance: f64,
    pub min_year: i32,
    #[serde(default)]
    pub growth: Option<f64>,
    #[serde(default)]
    pub growth_by_year: FxHashMap<i32, f64>,
}

/// Tax-deferred, RMD-subject account
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostTaxAccountConfig {
    pub name: String,
    pub balance: f64,
    /// Owner birth year; defaults to the scenario's
    #[serde(default)]
    pub born_year: Option<i32>,
    #[serde(default = "default_min_age")]
    pub min_age: i32,
    #[serde(default)]
    pub growth: Option<f64>,
    #[serde(default)]
    pub growth_by_year: FxHashMap<i32, f64>,
    /// Overrides the scenario's `rmd_table`
    #[serde(default)]
    pub rmd_table: Option<RmdTable>,
}

/// Post-tax accounts withdrawn together under a bracket limit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostTaxGroupConfig {
    pub name: String,
    #[serde(default = "default_max_tax_rate")]
    pub max_tax_rate: f64,
    #[serde(default = "default_overflow_allowance")]
    pub overflow_allowance: f64,
    pub accounts: Vec<PostTaxAccountConfig>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum IncomeConfig {
    Pension {
        name: String,
        monthly_payment: f64,
        min_year: i32,
        /// Fixed yearly raise instead of market inflation
        #[serde(default)]
        inflation: Option<f64>,
    },
    SocialSecurity {
        name: String,
        monthly_payment: f64,
        min_year: i32,
        #[serde(default)]
        inflation: Option<f64>,
    },
    AccountsAsPension {
        name: String,
        #[serde(default = "default_max_tax_rate")]
        max_tax_rate: f64,
        accounts: Vec<PostTaxAccountConfig>,
    },
}
