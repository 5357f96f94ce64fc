//! Yearly withdrawal orchestration
//!
//! The manager owns every account group, income source and tax table of a
//! household. Money always leaves in the same order: taxable accounts, then
//! the rate-limited post-tax groups, then pre-tax accounts. Single-target
//! operations (conversions, lump sums) use the first account of a group.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::model::{
    Account, Holdings, Income, LumpSumPayment, ReportColumn, StandardDeduction,
    TaxBracketCollection, YearlyTaxes,
};
use crate::taxes::{compute_cap_gains_tax, compute_income_tax};
use crate::withdrawal_group::{RateLimitedWithdrawalGroup, TaxContext};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WithdrawManager {
    pub taxable_accounts: Vec<Account>,
    pub post_tax_groups: Vec<RateLimitedWithdrawalGroup>,
    pub pre_tax_accounts: Vec<Account>,
    pub incomes: Vec<Income>,
    pub income_brackets: TaxBracketCollection,
    pub cap_gains_brackets: TaxBracketCollection,
    pub deduction: StandardDeduction,
    pub lump_sums: Vec<LumpSumPayment>,
    #[serde(skip)]
    taxes_by_year: FxHashMap<i32, YearlyTaxes>,
}

impl WithdrawManager {
    pub fn new(
        income_brackets: TaxBracketCollection,
        cap_gains_brackets: TaxBracketCollection,
        deduction: StandardDeduction,
    ) -> Self {
        Self {
            taxable_accounts: Vec::new(),
            post_tax_groups: Vec::new(),
            pre_tax_accounts: Vec::new(),
            incomes: Vec::new(),
            income_brackets,
            cap_gains_brackets,
            deduction,
            lump_sums: Vec::new(),
            taxes_by_year: FxHashMap::default(),
        }
    }

    // ========================================================================
    // Year boundary
    // ========================================================================

    /// Bring every tax table and income source up to `year`
    pub fn inflate(&mut self, year: i32) {
        self.income_brackets.inflate(year);
        self.cap_gains_brackets.inflate(year);
        for income in &mut self.incomes {
            income.inflate(year);
        }
        self.deduction.inflate(year);
    }

    /// Share the year's predicted pension income with the post-tax groups
    pub fn set_total_predicted_income_taxes(&mut self, year: i32) {
        let predicted: f64 = self
            .incomes
            .iter_mut()
            .map(|income| income.predicted_yearly_taxable_income(year))
            .sum();
        for group in &mut self.post_tax_groups {
            group.set_pension_income(predicted, year);
        }
    }

    /// Pay a (prior year's) tax bill. Returns the unpaid part.
    pub fn pay_taxes(&mut self, amount: f64, year: i32) -> Result<f64> {
        self.route_withdrawal(amount, year)
    }

    // ========================================================================
    // Monthly
    // ========================================================================

    pub fn grow(&mut self, year: i32, month: u32) {
        for acc in &mut self.taxable_accounts {
            acc.grow(year, month);
        }
        for group in &mut self.post_tax_groups {
            group.grow(year, month);
        }
        for acc in &mut self.pre_tax_accounts {
            acc.grow(year, month);
        }
        for income in &mut self.incomes {
            income.grow(year, month);
        }
    }

    /// Collect this month's payment from every income source
    pub fn monthly_pension(&mut self, year: i32) -> Result<f64> {
        let mut total = 0.0;
        for income in &mut self.incomes {
            total += income.payment(year)?;
        }
        Ok(total)
    }

    /// Cover `amount` of spending. Returns the part no account could pay.
    pub fn withdraw(&mut self, amount: f64, year: i32) -> Result<f64> {
        self.route_withdrawal(amount, year)
    }

    fn route_withdrawal(&mut self, amount: f64, year: i32) -> Result<f64> {
        let mut left_over = amount;
        for acc in &mut self.taxable_accounts {
            left_over = acc.withdraw(left_over, year)?;
        }

        let ctx = TaxContext {
            brackets: &self.income_brackets,
            deduction: &self.deduction,
        };
        for group in &mut self.post_tax_groups {
            left_over = group.withdraw(left_over, year, &ctx)?;
        }

        for acc in &mut self.pre_tax_accounts {
            left_over = acc.withdraw(left_over, year)?;
        }
        Ok(left_over)
    }

    // ========================================================================
    // Year end
    // ========================================================================

    /// Fill the zero-tax room under the standard deduction by converting
    /// post-tax money into the first pre-tax account. Returns the amount
    /// converted.
    pub fn conversions(&mut self, year: i32) -> Result<f64> {
        if self.pre_tax_accounts.is_empty() {
            return Ok(0.0);
        }
        let taxable_income = self.total_taxable_income(year);
        if taxable_income >= self.deduction.amount {
            return Ok(0.0);
        }

        let wanted = self.deduction.amount - taxable_income;
        let mut left_over = wanted;
        for group in &mut self.post_tax_groups {
            left_over = group.conversion(left_over, year)?;
        }

        let converted = wanted - left_over;
        if converted > 0.0
            && let Some(roth) = self.pre_tax_accounts.first_mut()
        {
            roth.deposit(converted, year)?;
            tracing::debug!(year, converted, account = %roth.name, "Roth conversion");
        }
        Ok(converted)
    }

    /// Deposit the year's scheduled lump sums into the first taxable account
    pub fn lump_sum_payments(&mut self, year: i32) -> Result<()> {
        let Some(target) = self.taxable_accounts.first_mut() else {
            return Ok(());
        };
        for lump in self.lump_sums.iter().filter(|l| l.year == year) {
            target.deposit(lump.amount, year)?;
        }
        Ok(())
    }

    pub fn total_taxable_income(&self, year: i32) -> f64 {
        self.taxable_accounts
            .iter()
            .map(|acc| acc.taxable_income(year))
            .chain(self.post_tax_groups.iter().map(|g| g.taxable_income(year)))
            .chain(self.pre_tax_accounts.iter().map(|acc| acc.taxable_income(year)))
            .chain(self.incomes.iter().map(|i| i.taxable_income(year)))
            .sum()
    }

    pub fn total_capital_gains(&self, year: i32) -> f64 {
        self.taxable_accounts
            .iter()
            .map(|acc| acc.capital_gains(year))
            .chain(self.post_tax_groups.iter().map(|g| g.capital_gains(year)))
            .chain(self.pre_tax_accounts.iter().map(|acc| acc.capital_gains(year)))
            .sum()
    }

    /// Taxes owed for `year`. The first call settles the year; later calls
    /// return the same result even if balances have moved since.
    pub fn taxes(&mut self, year: i32) -> &YearlyTaxes {
        if !self.taxes_by_year.contains_key(&year) {
            let settled = self.settle_taxes(year);
            self.taxes_by_year.insert(year, settled);
        }
        &self.taxes_by_year[&year]
    }

    fn settle_taxes(&self, year: i32) -> YearlyTaxes {
        let taxable_income = self.total_taxable_income(year);
        let capital_gains = self.total_capital_gains(year);
        let income = compute_income_tax(taxable_income, &self.income_brackets, &self.deduction);
        let capital_gains_tax =
            compute_cap_gains_tax(taxable_income, capital_gains, &self.cap_gains_brackets);
        YearlyTaxes {
            year,
            taxable_income,
            capital_gains,
            income_tax: income.tax,
            capital_gains_tax,
            per_bracket: income.per_bracket,
        }
    }

    // ========================================================================
    // Reporting
    // ========================================================================

    /// Every account, in withdrawal order
    pub fn accounts(&self) -> impl Iterator<Item = &Account> {
        self.taxable_accounts
            .iter()
            .chain(self.post_tax_groups.iter().flat_map(|g| g.accounts.iter()))
            .chain(self.pre_tax_accounts.iter())
    }

    /// Report columns for `year`. Names and values come from the same walk,
    /// so every year yields the same column order.
    pub fn columns(&mut self, year: i32) -> Vec<ReportColumn> {
        let mut columns = Vec::new();

        for acc in &self.taxable_accounts {
            push_account_columns(&mut columns, acc, year);
        }
        for group in &mut self.post_tax_groups {
            for acc in &mut group.accounts {
                push_account_columns(&mut columns, acc, year);
                let rmd = acc.required_minimum(year);
                columns.push(ReportColumn::new(format!("{}-rmd", acc.name), rmd));
            }
        }
        for acc in &self.pre_tax_accounts {
            push_account_columns(&mut columns, acc, year);
        }

        for income in &self.incomes {
            if let Income::AccountsAsPension(pension) = income {
                for acc in &pension.accounts {
                    push_account_columns(&mut columns, acc, year);
                }
            }
            columns.push(ReportColumn::new(income.name(), income.paid(year)));
        }

        // Unbounded top ceilings stay unbounded every year, so skipping them
        // keeps the column set stable
        let ceilings = self
            .income_brackets
            .brackets
            .iter()
            .map(|b| ("income", b))
            .chain(self.cap_gains_brackets.brackets.iter().map(|b| ("gains", b)))
            .filter(|(_, b)| b.ceiling.is_finite());
        for (table, bracket) in ceilings {
            columns.push(ReportColumn::new(
                format!("{table}-{:.0}%", bracket.rate * 100.0),
                bracket.ceiling,
            ));
        }
        columns.push(ReportColumn::new("deduction", self.deduction.amount));

        let rates: Vec<f64> = self.income_brackets.brackets.iter().map(|b| b.rate).collect();
        let taxes = self.taxes(year);
        for (index, rate) in rates.iter().enumerate() {
            columns.push(ReportColumn::new(
                format!("income-{:.0}%-taxed", rate * 100.0),
                taxes.amount_in_bracket(index),
            ));
        }
        columns.push(ReportColumn::new("gains-tax", taxes.capital_gains_tax));
        columns.push(ReportColumn::new("income-tax", taxes.income_tax));
        columns.push(ReportColumn::new("total-tax", taxes.total()));

        columns
    }
}

fn push_account_columns(columns: &mut Vec<ReportColumn>, acc: &Account, year: i32) {
    if let Holdings::Basis { basis, gains } = acc.holdings() {
        columns.push(ReportColumn::new(format!("{}-basis", acc.name), basis));
        columns.push(ReportColumn::new(format!("{}-gains", acc.name), gains));
    }
    columns.push(ReportColumn::new(acc.name.clone(), acc.value()));
    columns.push(ReportColumn::new(
        format!("{}-pay", acc.name),
        acc.withdrawn(year),
    ));
}
