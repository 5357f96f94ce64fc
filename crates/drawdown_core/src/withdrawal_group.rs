//! Rate-limited withdrawals from a pool of RMD-subject accounts
//!
//! Each request is served in two passes. Outstanding required minimum
//! distributions are paid first. Discretionary money then comes out only
//! while the year's taxable income stays below the low-bracket target
//! (ceiling plus deduction, with an overflow allowance on top). Whatever
//! the group does not pay goes back to the caller as left-over.

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::model::{Account, StandardDeduction, check_amount, TaxBracketCollection, YearLedger};

pub const DEFAULT_MAX_TAX_RATE: f64 = 0.15;
pub const DEFAULT_OVERFLOW_ALLOWANCE: f64 = 0.30;

/// Tax tables the group plans against, owned by the manager
#[derive(Debug, Clone, Copy)]
pub struct TaxContext<'a> {
    pub brackets: &'a TaxBracketCollection,
    pub deduction: &'a StandardDeduction,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RateLimitedWithdrawalGroup {
    pub name: String,
    pub accounts: Vec<Account>,
    /// Highest marginal rate discretionary withdrawals aim to stay within
    pub max_tax_rate: f64,
    /// Fraction the target may be overrun by
    pub overflow_allowance: f64,
    /// Predicted taxable pension income per year
    pension_income: YearLedger,
}

impl RateLimitedWithdrawalGroup {
    pub fn new(name: impl Into<String>, accounts: Vec<Account>) -> Self {
        Self {
            name: name.into(),
            accounts,
            max_tax_rate: DEFAULT_MAX_TAX_RATE,
            overflow_allowance: DEFAULT_OVERFLOW_ALLOWANCE,
            pension_income: YearLedger::new(),
        }
    }

    #[must_use]
    pub fn with_limits(mut self, max_tax_rate: f64, overflow_allowance: f64) -> Self {
        self.max_tax_rate = max_tax_rate;
        self.overflow_allowance = overflow_allowance;
        self
    }

    pub fn grow(&mut self, year: i32, month: u32) {
        for acc in &mut self.accounts {
            acc.grow(year, month);
        }
    }

    pub fn value(&self) -> f64 {
        self.accounts.iter().map(Account::value).sum()
    }

    pub fn withdrawn(&self, year: i32) -> f64 {
        self.accounts.iter().map(|acc| acc.withdrawn(year)).sum()
    }

    pub fn taxable_income(&self, year: i32) -> f64 {
        self.accounts.iter().map(|acc| acc.taxable_income(year)).sum()
    }

    /// Tax-deferred money never produces capital gains
    pub fn capital_gains(&self, _year: i32) -> f64 {
        0.0
    }

    pub fn required_minimum(&mut self, year: i32) -> f64 {
        self.accounts
            .iter_mut()
            .map(|acc| acc.required_minimum(year))
            .sum()
    }

    /// Record the taxable pension income expected for `year`
    pub fn set_pension_income(&mut self, amount: f64, year: i32) {
        self.pension_income.set(year, amount);
    }

    pub fn pension_income(&self, year: i32) -> f64 {
        self.pension_income.get(year)
    }

    /// Taxable-income target for a year, including the overflow allowance
    pub fn max_taxable_target(&self, ctx: &TaxContext<'_>) -> f64 {
        let ceiling = ctx
            .brackets
            .ceiling_at_or_below_rate(self.max_tax_rate)
            .unwrap_or(0.0);
        (ceiling + ctx.deduction.amount) * (1.0 + self.overflow_allowance)
    }

    /// Roth-style conversion across members in order, ignoring age gates
    pub fn conversion(&mut self, amount: f64, year: i32) -> Result<f64> {
        let mut left_over = amount;
        for acc in &mut self.accounts {
            left_over = acc.convert(left_over, year)?;
        }
        Ok(left_over)
    }

    fn cascade(&mut self, amount: f64, year: i32) -> Result<f64> {
        let mut left_over = amount;
        for acc in &mut self.accounts {
            left_over = acc.withdraw(left_over, year)?;
        }
        Ok(left_over)
    }

    /// Pay outstanding RMD shortfalls out of `amount`, member by member.
    /// Returns what is left of the request.
    fn withdraw_rmd(&mut self, amount: f64, year: i32) -> Result<f64> {
        let required = self.required_minimum(year);
        if required <= 0.0 {
            return Ok(amount);
        }
        let already = self.withdrawn(year);
        let can_withdraw = (required - already).max(0.0).min(amount);

        let mut left = can_withdraw;
        for acc in &mut self.accounts {
            let shortfall = acc.required_minimum(year) - acc.withdrawn(year);
            if shortfall <= 0.0 {
                continue;
            }
            if left > shortfall {
                left = acc.withdraw(shortfall, year)? + (left - shortfall);
            } else {
                left = acc.withdraw(left, year)?;
            }
            tracing::debug!(
                group = %self.name,
                account = %acc.name,
                year,
                shortfall,
                left,
                "RMD withdrawal"
            );
        }

        Ok(left + (amount - can_withdraw))
    }

    /// Withdraw up to `amount` for `year`. Returns the left-over.
    pub fn withdraw(&mut self, amount: f64, year: i32, ctx: &TaxContext<'_>) -> Result<f64> {
        check_amount(&self.name, amount)?;

        let max_target = self.max_taxable_target(ctx);
        let mut total_taxable = self.withdrawn(year) + self.pension_income.get(year);

        let left_over = self.withdraw_rmd(amount, year)?;
        total_taxable += amount - left_over;

        if total_taxable + left_over < max_target {
            let remaining = self.cascade(left_over, year)?;
            tracing::debug!(
                group = %self.name,
                year,
                withdrawn = left_over - remaining,
                remaining,
                "Withdrawal under target"
            );
            return Ok(remaining);
        }

        let can_withdraw = (max_target - total_taxable).max(0.0).min(left_over);
        let remaining = self.cascade(can_withdraw, year)?;
        tracing::debug!(
            group = %self.name,
            year,
            max_target,
            total_taxable,
            can_withdraw,
            remaining,
            "Withdrawal capped at target"
        );
        Ok(remaining + (left_over - can_withdraw))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AccountError;
    use crate::model::{MonthCursor, RateSchedule, TaxBracket};

    fn brackets() -> TaxBracketCollection {
        TaxBracketCollection::new(
            vec![
                TaxBracket::new(20_000.0, 0.10),
                TaxBracket::new(f64::INFINITY, 0.30),
            ],
            2025,
            RateSchedule::fixed(0.0),
        )
    }

    fn deduction() -> StandardDeduction {
        StandardDeduction::new(10_000.0, 2025, 0.0)
    }

    fn account(name: &str, balance: f64, born_year: i32) -> Account {
        Account::post_tax_401k(
            name,
            balance,
            born_year,
            60,
            RateSchedule::fixed(0.0),
            MonthCursor::new(2025, 1),
        )
    }

    #[test]
    fn test_target_includes_overflow() {
        let group = RateLimitedWithdrawalGroup::new("401ks", vec![]);
        let (b, d) = (brackets(), deduction());
        let ctx = TaxContext {
            brackets: &b,
            deduction: &d,
        };
        // (20k + 10k) * 1.3
        assert!((group.max_taxable_target(&ctx) - 39_000.0).abs() < 1e-9);
    }

    #[test]
    fn test_under_target_withdraws_everything_in_order() {
        let mut group = RateLimitedWithdrawalGroup::new(
            "401ks",
            vec![account("a", 5_000.0, 1960), account("b", 50_000.0, 1960)],
        );
        let (b, d) = (brackets(), deduction());
        let ctx = TaxContext {
            brackets: &b,
            deduction: &d,
        };
        let left_over = group.withdraw(8_000.0, 2025, &ctx).unwrap();
        assert_eq!(left_over, 0.0);
        assert_eq!(group.accounts[0].value(), 0.0);
        assert_eq!(group.accounts[1].value(), 47_000.0);
    }

    #[test]
    fn test_capped_withdrawal_returns_remainder() {
        let mut group =
            RateLimitedWithdrawalGroup::new("401ks", vec![account("a", 100_000.0, 1960)]);
        let (b, d) = (brackets(), deduction());
        let ctx = TaxContext {
            brackets: &b,
            deduction: &d,
        };
        group.set_pension_income(30_000.0, 2025);
        // Target 39k, pension already at 30k: only 9k may come out
        let left_over = group.withdraw(20_000.0, 2025, &ctx).unwrap();
        assert!((left_over - 11_000.0).abs() < 1e-9);
        assert!((group.withdrawn(2025) - 9_000.0).abs() < 1e-9);
    }

    #[test]
    fn test_over_target_withdraws_nothing_discretionary() {
        let mut group =
            RateLimitedWithdrawalGroup::new("401ks", vec![account("a", 100_000.0, 1960)]);
        let (b, d) = (brackets(), deduction());
        let ctx = TaxContext {
            brackets: &b,
            deduction: &d,
        };
        group.set_pension_income(50_000.0, 2025);
        assert_eq!(group.withdraw(5_000.0, 2025, &ctx).unwrap(), 5_000.0);
        assert_eq!(group.withdrawn(2025), 0.0);
    }

    #[test]
    fn test_rmd_larger_than_request_is_paid_from_request() {
        // Age 75 in 2035: RMD is 274k / 27.4 = 10k
        let mut group =
            RateLimitedWithdrawalGroup::new("401ks", vec![account("a", 274_000.0, 1960)]);
        let (b, d) = (brackets(), deduction());
        let ctx = TaxContext {
            brackets: &b,
            deduction: &d,
        };
        group.set_pension_income(100_000.0, 2035);
        let left_over = group.withdraw(1_000.0, 2035, &ctx).unwrap();
        assert_eq!(left_over, 0.0);
        assert_eq!(group.withdrawn(2035), 1_000.0);
    }

    #[test]
    fn test_rmd_paid_even_above_target() {
        let mut group =
            RateLimitedWithdrawalGroup::new("401ks", vec![account("a", 274_000.0, 1960)]);
        let (b, d) = (brackets(), deduction());
        let ctx = TaxContext {
            brackets: &b,
            deduction: &d,
        };
        group.set_pension_income(100_000.0, 2035);
        let left_over = group.withdraw(15_000.0, 2035, &ctx).unwrap();
        assert!((left_over - 5_000.0).abs() < 1e-9);
        assert!((group.withdrawn(2035) - 10_000.0).abs() < 1e-9);
    }

    #[test]
    fn test_rmd_shortfall_walks_members_in_order() {
        let mut group = RateLimitedWithdrawalGroup::new(
            "401ks",
            vec![account("a", 27_400.0, 1960), account("b", 54_800.0, 1960)],
        );
        let (b, d) = (brackets(), deduction());
        let ctx = TaxContext {
            brackets: &b,
            deduction: &d,
        };
        group.set_pension_income(100_000.0, 2035);
        // RMDs are 1k and 2k; a 2.5k request covers a fully and b partly
        let left_over = group.withdraw(2_500.0, 2035, &ctx).unwrap();
        assert!(left_over.abs() < 1e-9);
        assert!((group.accounts[0].withdrawn(2035) - 1_000.0).abs() < 1e-9);
        assert!((group.accounts[1].withdrawn(2035) - 1_500.0).abs() < 1e-9);
    }

    #[test]
    fn test_negative_request_is_rejected() {
        let mut group =
            RateLimitedWithdrawalGroup::new("401ks", vec![account("a", 1_000.0, 1960)]);
        let (b, d) = (brackets(), deduction());
        let ctx = TaxContext {
            brackets: &b,
            deduction: &d,
        };
        assert!(group.withdraw(-1.0, 2025, &ctx).is_err());
    }

    #[test]
    fn test_non_finite_request_is_rejected() {
        let mut group =
            RateLimitedWithdrawalGroup::new("401ks", vec![account("a", 1_000.0, 1960)]);
        let (b, d) = (brackets(), deduction());
        let ctx = TaxContext {
            brackets: &b,
            deduction: &d,
        };
        for amount in [f64::NAN, f64::INFINITY] {
            assert_eq!(
                group.withdraw(amount, 2025, &ctx),
                Err(AccountError::NonFiniteAmount {
                    account: "401ks".into()
                })
            );
        }
        assert_eq!(group.accounts[0].value(), 1_000.0);
        assert_eq!(group.withdrawn(2025), 0.0);
    }

    #[test]
    fn test_conversion_ignores_age_gate() {
        let mut group =
            RateLimitedWithdrawalGroup::new("401ks", vec![account("a", 10_000.0, 1990)]);
        assert_eq!(group.conversion(4_000.0, 2025).unwrap(), 0.0);
        assert_eq!(group.taxable_income(2025), 4_000.0);
        assert_eq!(group.conversion(10_000.0, 2025).unwrap(), 4_000.0);
    }
}
