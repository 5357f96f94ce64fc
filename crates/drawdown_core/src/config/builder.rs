//! Scenario Builder
//!
//! Fluent API over `ScenarioConfig`. Accounts added to a post-tax group that
//! does not exist yet create the group with default limits.

use rustc_hash::FxHashMap;

use crate::error::ConfigError;
use crate::model::{LumpSumPayment, MarketAssumptions, RmdTable, TaxBracket};

use super::{
    ExpensesConfig, IncomeConfig, PostTaxAccountConfig, PostTaxGroupConfig, PreTaxAccountConfig,
    Scenario, ScenarioConfig, TaxableAccountConfig, default_max_tax_rate, default_min_age,
    default_overflow_allowance,
};

/// Builder for scenarios, mostly used by tests and benches
#[derive(Debug, Clone)]
pub struct ScenarioBuilder {
    config: ScenarioConfig,
}

impl ScenarioBuilder {
    /// Start a scenario covering `start_year..=end_year`. The birth year
    /// defaults to 65 years before the start.
    #[must_use]
    pub fn new(start_year: i32, end_year: i32) -> Self {
        Self {
            config: ScenarioConfig::new(start_year, end_year, start_year - 65),
        }
    }

    // =========================================================================
    // Basic Configuration
    // =========================================================================

    #[must_use]
    pub fn birth_year(mut self, year: i32) -> Self {
        self.config.birth_year = year;
        self
    }

    #[must_use]
    pub fn expenses(mut self, annual: f64, inflation_rate: f64) -> Self {
        self.config.expenses = ExpensesConfig {
            annual,
            inflation_rate,
        };
        self
    }

    #[must_use]
    pub fn market(mut self, market: MarketAssumptions) -> Self {
        self.config.market = market;
        self
    }

    /// Fixed growth and inflation every year
    #[must_use]
    pub fn fixed_rates(self, growth: f64, inflation: f64) -> Self {
        self.market(MarketAssumptions::Fixed { growth, inflation })
    }

    #[must_use]
    pub fn income_brackets(mut self, base_year: i32, brackets: Vec<TaxBracket>) -> Self {
        self.config.taxes.base_year = base_year;
        self.config.taxes.income_brackets = brackets;
        self
    }

    #[must_use]
    pub fn capital_gains_brackets(mut self, brackets: Vec<TaxBracket>) -> Self {
        self.config.taxes.capital_gains_brackets = brackets;
        self
    }

    #[must_use]
    pub fn standard_deduction(mut self, amount: f64, inflation_rate: f64) -> Self {
        self.config.taxes.standard_deduction = amount;
        self.config.taxes.deduction_inflation = inflation_rate;
        self
    }

    /// Divisor table used by every post-tax account
    #[must_use]
    pub fn rmd_table(mut self, table: RmdTable) -> Self {
        self.config.rmd_table = table;
        self
    }

    // =========================================================================
    // Accounts
    // =========================================================================

    /// Override one year's growth for the account called `name`, whatever
    /// kind it is. Unknown names are ignored.
    #[must_use]
    pub fn account_growth_override(mut self, name: &str, year: i32, rate: f64) -> Self {
        let config = &mut self.config;
        let overrides = config
            .taxable_accounts
            .iter_mut()
            .filter(|a| a.name == name)
            .map(|a| &mut a.growth_by_year)
            .chain(
                config
                    .pre_tax_accounts
                    .iter_mut()
                    .filter(|a| a.name == name)
                    .map(|a| &mut a.growth_by_year),
            )
            .chain(
                config
                    .post_tax_groups
                    .iter_mut()
                    .flat_map(|g| g.accounts.iter_mut())
                    .filter(|a| a.name == name)
                    .map(|a| &mut a.growth_by_year),
            );
        for by_year in overrides {
            by_year.insert(year, rate);
        }
        self
    }

    #[must_use]
    pub fn taxable_account(mut self, name: impl Into<String>, balance: f64) -> Self {
        self.config.taxable_accounts.push(TaxableAccountConfig {
            name: name.into(),
            balance,
            basis: None,
            growth: None,
            growth_by_year: FxHashMap::default(),
        });
        self
    }

    #[must_use]
    pub fn taxable_account_with_basis(
        mut self,
        name: impl Into<String>,
        basis: f64,
        gains: f64,
    ) -> Self {
        self.config.taxable_accounts.push(TaxableAccountConfig {
            name: name.into(),
            balance: basis + gains,
            basis: Some(basis),
            growth: None,
            growth_by_year: FxHashMap::default(),
        });
        self
    }

    #[must_use]
    pub fn pre_tax_account(mut self, name: impl Into<String>, balance: f64, min_year: i32) -> Self {
        self.config.pre_tax_accounts.push(PreTaxAccountConfig {
            name: name.into(),
            balance,
            min_year,
            growth: None,
            growth_by_year: FxHashMap::default(),
        });
        self
    }

    /// Add an account owned by the scenario's household to `group`
    #[must_use]
    pub fn post_tax_account(
        mut self,
        group: impl Into<String>,
        name: impl Into<String>,
        balance: f64,
    ) -> Self {
        let group = group.into();
        let account = PostTaxAccountConfig {
            name: name.into(),
            balance,
            born_year: None,
            min_age: default_min_age(),
            growth: None,
            growth_by_year: FxHashMap::default(),
            rmd_table: None,
        };
        match self.config.post_tax_groups.iter_mut().find(|g| g.name == group) {
            Some(existing) => existing.accounts.push(account),
            None => self.config.post_tax_groups.push(PostTaxGroupConfig {
                name: group,
                max_tax_rate: default_max_tax_rate(),
                overflow_allowance: default_overflow_allowance(),
                accounts: vec![account],
            }),
        }
        self
    }

    // =========================================================================
    // Income
    // =========================================================================

    #[must_use]
    pub fn pension(
        mut self,
        name: impl Into<String>,
        monthly_payment: f64,
        min_year: i32,
    ) -> Self {
        self.config.incomes.push(IncomeConfig::Pension {
            name: name.into(),
            monthly_payment,
            min_year,
            inflation: None,
        });
        self
    }

    #[must_use]
    pub fn social_security(
        mut self,
        name: impl Into<String>,
        monthly_payment: f64,
        min_year: i32,
    ) -> Self {
        self.config.incomes.push(IncomeConfig::SocialSecurity {
            name: name.into(),
            monthly_payment,
            min_year,
            inflation: None,
        });
        self
    }

    #[must_use]
    pub fn lump_sum(mut self, amount: f64, year: i32) -> Self {
        self.config.lump_sums.push(LumpSumPayment { amount, year });
        self
    }

    // =========================================================================
    // Build
    // =========================================================================

    /// The configuration assembled so far
    #[must_use]
    pub fn config(&self) -> &ScenarioConfig {
        &self.config
    }

    #[must_use]
    pub fn into_config(self) -> ScenarioConfig {
        self.config
    }

    pub fn build(&self) -> Result<Scenario, ConfigError> {
        Scenario::from_config(&self.config)
    }
}
