use rustc_hash::FxHashMap;

use crate::error::ConfigError;
use crate::manager::WithdrawManager;
use crate::model::{
    Account, AccountsAsPension, Expenses, FixedPension, Income, MonthCursor, RateSchedule,
    StandardDeduction, TaxBracketCollection,
};
use crate::withdrawal_group::RateLimitedWithdrawalGroup;

use super::{IncomeConfig, PostTaxAccountConfig, ScenarioConfig};

/// Live simulation state built from a validated `ScenarioConfig`
#[derive(Debug, Clone)]
pub struct Scenario {
    pub manager: WithdrawManager,
    pub expenses: Expenses,
    pub start_year: i32,
    pub end_year: i32,
    pub birth_year: i32,
}

fn check_balance(name: &str, balance: f64) -> Result<(), ConfigError> {
    if balance.is_nan() || balance < 0.0 {
        return Err(ConfigError::NegativeBalance {
            account: name.to_string(),
        });
    }
    Ok(())
}

fn check_basis(name: &str, basis: f64, balance: f64) -> Result<(), ConfigError> {
    if !(0.0..=balance).contains(&basis) {
        return Err(ConfigError::InvalidBasis {
            account: name.to_string(),
            basis,
            balance,
        });
    }
    Ok(())
}

fn fixed_or(rate: Option<f64>, market: &RateSchedule) -> RateSchedule {
    rate.map_or_else(|| market.clone(), RateSchedule::fixed)
}

/// Account growth: a fixed rate or the market's, then per-year overrides
fn account_growth(
    rate: Option<f64>,
    by_year: &FxHashMap<i32, f64>,
    market: &RateSchedule,
) -> RateSchedule {
    let mut schedule = fixed_or(rate, market);
    for (&year, &rate) in by_year {
        schedule.set_year(year, rate);
    }
    schedule
}

impl Scenario {
    pub fn from_config(config: &ScenarioConfig) -> Result<Self, ConfigError> {
        if config.end_year < config.start_year {
            return Err(ConfigError::YearRange {
                start_year: config.start_year,
                end_year: config.end_year,
            });
        }
        if !config.lump_sums.is_empty() && config.taxable_accounts.is_empty() {
            return Err(ConfigError::NoTaxableAccount);
        }

        let growth = config.market.growth(config.start_year)?;
        let inflation = config.market.inflation(config.start_year)?;
        let start = MonthCursor::new(config.start_year, 1);

        let taxes = &config.taxes;
        let income_brackets = TaxBracketCollection::new(
            taxes.income_brackets.clone(),
            taxes.base_year,
            inflation.clone(),
        );
        income_brackets.validate("income")?;
        let cap_gains_brackets = TaxBracketCollection::new(
            taxes.capital_gains_brackets.clone(),
            taxes.base_year,
            inflation.clone(),
        );
        cap_gains_brackets.validate("capital gains")?;
        if cap_gains_brackets.len() != 2 {
            return Err(ConfigError::CapitalGainsTiers {
                found: cap_gains_brackets.len(),
            });
        }
        let deduction = StandardDeduction::new(
            taxes.standard_deduction,
            taxes.base_year,
            taxes.deduction_inflation,
        );

        let mut manager =
            WithdrawManager::new(income_brackets.clone(), cap_gains_brackets, deduction);

        for acc in &config.taxable_accounts {
            check_balance(&acc.name, acc.balance)?;
            let schedule = account_growth(acc.growth, &acc.growth_by_year, &growth);
            manager.taxable_accounts.push(match acc.basis {
                Some(basis) => {
                    check_basis(&acc.name, basis, acc.balance)?;
                    Account::taxable_with_basis(
                        &acc.name,
                        basis,
                        acc.balance - basis,
                        schedule,
                        start,
                    )
                }
                None => Account::taxable(&acc.name, acc.balance, schedule, start),
            });
        }

        let post_tax_account = |acc: &PostTaxAccountConfig| -> Result<Account, ConfigError> {
            check_balance(&acc.name, acc.balance)?;
            let table = acc.rmd_table.as_ref().unwrap_or(&config.rmd_table);
            Ok(Account::post_tax_401k(
                &acc.name,
                acc.balance,
                acc.born_year.unwrap_or(config.birth_year),
                acc.min_age,
                account_growth(acc.growth, &acc.growth_by_year, &growth),
                start,
            )
            .with_rmd_table(table.clone()))
        };

        for group in &config.post_tax_groups {
            let accounts = group
                .accounts
                .iter()
                .map(post_tax_account)
                .collect::<Result<Vec<_>, _>>()?;
            manager.post_tax_groups.push(
                RateLimitedWithdrawalGroup::new(&group.name, accounts)
                    .with_limits(group.max_tax_rate, group.overflow_allowance),
            );
        }

        for acc in &config.pre_tax_accounts {
            check_balance(&acc.name, acc.balance)?;
            manager.pre_tax_accounts.push(Account::pre_tax_401k(
                &acc.name,
                acc.balance,
                acc.min_year,
                account_growth(acc.growth, &acc.growth_by_year, &growth),
                start,
            ));
        }

        for income in &config.incomes {
            let built = match income {
                IncomeConfig::Pension {
                    name,
                    monthly_payment,
                    min_year,
                    inflation: raise,
                } => Income::FixedPension(FixedPension::new(
                    name,
                    *monthly_payment,
                    fixed_or(*raise, &inflation),
                    *min_year,
                    config.start_year,
                )),
                IncomeConfig::SocialSecurity {
                    name,
                    monthly_payment,
                    min_year,
                    inflation: raise,
                } => Income::SocialSecurity(FixedPension::new(
                    name,
                    *monthly_payment,
                    fixed_or(*raise, &inflation),
                    *min_year,
                    config.start_year,
                )),
                IncomeConfig::AccountsAsPension {
                    name,
                    max_tax_rate,
                    accounts,
                } => {
                    let accounts = accounts
                        .iter()
                        .map(post_tax_account)
                        .collect::<Result<Vec<_>, _>>()?;
                    Income::AccountsAsPension(AccountsAsPension::new(
                        name,
                        accounts,
                        income_brackets.clone(),
                        *max_tax_rate,
                    ))
                }
            };
            manager.incomes.push(built);
        }

        manager.lump_sums = config.lump_sums.clone();

        tracing::debug!(
            start_year = config.start_year,
            end_year = config.end_year,
            accounts = manager.accounts().count(),
            incomes = manager.incomes.len(),
            "Scenario built"
        );

        Ok(Self {
            manager,
            expenses: Expenses::new(
                config.expenses.annual,
                config.start_year,
                config.expenses.inflation_rate,
            ),
            start_year: config.start_year,
            end_year: config.end_year,
            birth_year: config.birth_year,
        })
    }

    pub fn age(&self, year: i32) -> i32 {
        year - self.birth_year
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{PostTaxGroupConfig, PreTaxAccountConfig, TaxableAccountConfig};
    use crate::model::{Holdings, LumpSumPayment, MarketAssumptions, RmdTable, TaxBracket};

    fn work_401k(balance: f64) -> PostTaxAccountConfig {
        PostTaxAccountConfig {
            name: "Work".into(),
            balance,
            born_year: None,
            min_age: 60,
            growth: None,
            growth_by_year: FxHashMap::default(),
            rmd_table: None,
        }
    }

    fn group(accounts: Vec<PostTaxAccountConfig>) -> PostTaxGroupConfig {
        PostTaxGroupConfig {
            name: "401ks".into(),
            max_tax_rate: 0.12,
            overflow_allowance: 0.1,
            accounts,
        }
    }

    fn config() -> ScenarioConfig {
        let mut config = ScenarioConfig::new(2025, 2030, 1970);
        config.taxable_accounts.push(TaxableAccountConfig {
            name: "Brokerage".into(),
            balance: 100_000.0,
            basis: Some(60_000.0),
            growth: None,
            growth_by_year: FxHashMap::default(),
        });
        config
    }

    #[test]
    fn test_basis_split_from_balance() {
        let scenario = Scenario::from_config(&config()).unwrap();
        assert_eq!(
            scenario.manager.taxable_accounts[0].holdings(),
            Holdings::Basis {
                basis: 60_000.0,
                gains: 40_000.0
            }
        );
        assert_eq!(scenario.age(2025), 55);
    }

    #[test]
    fn test_rejects_reversed_years() {
        let mut config = config();
        config.end_year = 2020;
        assert!(matches!(
            Scenario::from_config(&config),
            Err(ConfigError::YearRange { .. })
        ));
    }

    #[test]
    fn test_rejects_negative_balance() {
        let mut config = config();
        config.pre_tax_accounts.push(PreTaxAccountConfig {
            name: "Roth".into(),
            balance: -1.0,
            min_year: 2030,
            growth: None,
            growth_by_year: FxHashMap::default(),
        });
        assert_eq!(
            Scenario::from_config(&config).unwrap_err(),
            ConfigError::NegativeBalance {
                account: "Roth".into()
            }
        );
    }

    #[test]
    fn test_rejects_three_tier_capital_gains() {
        let mut config = config();
        config.taxes.capital_gains_brackets.push(TaxBracket::new(f64::INFINITY, 0.20));
        assert_eq!(
            Scenario::from_config(&config).unwrap_err(),
            ConfigError::CapitalGainsTiers { found: 3 }
        );
    }

    #[test]
    fn test_lump_sums_need_taxable_account() {
        let mut config = ScenarioConfig::new(2025, 2030, 1970);
        config.lump_sums.push(LumpSumPayment {
            amount: 1_000.0,
            year: 2026,
        });
        assert_eq!(
            Scenario::from_config(&config).unwrap_err(),
            ConfigError::NoTaxableAccount
        );
    }

    #[test]
    fn test_unknown_historic_year() {
        let mut config = config();
        config.market = MarketAssumptions::Historical {
            historic_year: 1800,
            fallback_growth: 0.05,
            fallback_inflation: 0.03,
        };
        assert!(matches!(
            Scenario::from_config(&config),
            Err(ConfigError::HistoricYearOutOfRange { year: 1800, .. })
        ));
    }

    #[test]
    fn test_post_tax_owner_defaults_to_scenario_birth_year() {
        let mut config = config();
        config.post_tax_groups.push(group(vec![work_401k(274_000.0)]));
        let mut scenario = Scenario::from_config(&config).unwrap();
        let group = &mut scenario.manager.post_tax_groups[0];
        assert_eq!(group.max_tax_rate, 0.12);
        // Born 1970: first RMD at 75 in 2045
        assert_eq!(group.required_minimum(2044), 0.0);
        assert_eq!(group.required_minimum(2045), 10_000.0);
    }

    #[test]
    fn test_rejects_basis_above_balance() {
        let mut config = config();
        config.taxable_accounts[0].basis = Some(150_000.0);
        assert_eq!(
            Scenario::from_config(&config).unwrap_err(),
            ConfigError::InvalidBasis {
                account: "Brokerage".into(),
                basis: 150_000.0,
                balance: 100_000.0
            }
        );
    }

    #[test]
    fn test_rejects_negative_or_nan_basis() {
        for basis in [-1.0, f64::NAN] {
            let mut config = config();
            config.taxable_accounts[0].basis = Some(basis);
            assert!(
                matches!(
                    Scenario::from_config(&config),
                    Err(ConfigError::InvalidBasis { .. })
                ),
                "basis {basis} should be rejected"
            );
        }
    }

    #[test]
    fn test_basis_equal_to_balance_has_no_gains() {
        let mut config = config();
        config.taxable_accounts[0].basis = Some(100_000.0);
        let scenario = Scenario::from_config(&config).unwrap();
        assert_eq!(
            scenario.manager.taxable_accounts[0].holdings(),
            Holdings::Basis {
                basis: 100_000.0,
                gains: 0.0
            }
        );
    }

    #[test]
    fn test_scenario_rmd_table_reaches_post_tax_accounts() {
        let mut config = config();
        config.rmd_table = RmdTable {
            start_age: 70,
            divisors: vec![20.0],
        };
        config.post_tax_groups.push(group(vec![work_401k(200_000.0)]));
        let mut scenario = Scenario::from_config(&config).unwrap();
        let group = &mut scenario.manager.post_tax_groups[0];
        // Born 1970: first RMD at 70 in 2040
        assert_eq!(group.required_minimum(2039), 0.0);
        assert_eq!(group.required_minimum(2040), 10_000.0);
    }

    #[test]
    fn test_account_rmd_table_overrides_scenario_table() {
        let mut config = config();
        config.rmd_table = RmdTable {
            start_age: 70,
            divisors: vec![20.0],
        };
        let mut own = work_401k(200_000.0);
        own.rmd_table = Some(RmdTable {
            start_age: 72,
            divisors: vec![10.0],
        });
        config.post_tax_groups.push(group(vec![own]));
        let mut scenario = Scenario::from_config(&config).unwrap();
        let group = &mut scenario.manager.post_tax_groups[0];
        assert_eq!(group.required_minimum(2041), 0.0);
        assert_eq!(group.required_minimum(2042), 20_000.0);
    }

    #[test]
    fn test_growth_by_year_layers_over_market_and_fixed_rates() {
        let mut config = config();
        config.market = MarketAssumptions::Fixed {
            growth: 0.05,
            inflation: 0.0,
        };
        config.taxable_accounts[0].growth_by_year.insert(2027, -0.2);
        let mut fixed = work_401k(1_000.0);
        fixed.growth = Some(0.02);
        fixed.growth_by_year.insert(2026, 0.5);
        config.post_tax_groups.push(group(vec![fixed]));

        let scenario = Scenario::from_config(&config).unwrap();
        let brokerage = scenario.manager.taxable_accounts[0].growth();
        assert_eq!(brokerage.rate(2026), 0.05);
        assert_eq!(brokerage.rate(2027), -0.2);
        let work = scenario.manager.post_tax_groups[0].accounts[0].growth();
        assert_eq!(work.rate(2025), 0.02);
        assert_eq!(work.rate(2026), 0.5);
    }
}
