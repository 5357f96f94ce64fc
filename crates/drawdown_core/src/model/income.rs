//! Recurring income sources
//!
//! Incomes pay a monthly amount once they become eligible and report what
//! they paid as taxable income.

use serde::{Deserialize, Serialize};

use crate::error::Result;

use super::accounts::Account;
use super::ledger::{RateSchedule, YearLedger};
use super::tax_config::TaxBracketCollection;

/// Share of social security benefits treated as taxable.
///
/// Assumes combined income is above the threshold where the 85% rule kicks
/// in. TODO: households living below that threshold owe tax on less.
pub const SOCIAL_SECURITY_TAXABLE_FRACTION: f64 = 0.85;

/// A fixed monthly pension that inflates once per calendar year
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FixedPension {
    pub name: String,
    pub monthly_payment: f64,
    pub inflation: RateSchedule,
    /// First calendar year that pays out
    pub min_year: i32,
    /// Year `monthly_payment` is expressed in
    pub year: i32,
    paid: YearLedger,
}

impl FixedPension {
    pub fn new(
        name: impl Into<String>,
        monthly_payment: f64,
        inflation: RateSchedule,
        min_year: i32,
        start_year: i32,
    ) -> Self {
        Self {
            name: name.into(),
            monthly_payment,
            inflation,
            min_year,
            year: start_year,
            paid: YearLedger::new(),
        }
    }

    pub fn payment(&mut self, year: i32) -> f64 {
        if year < self.min_year {
            return 0.0;
        }
        self.paid.add(year, self.monthly_payment);
        self.monthly_payment
    }

    pub fn inflate(&mut self, year: i32) {
        while self.year < year {
            self.year += 1;
            self.monthly_payment *= 1.0 + self.inflation.rate(self.year);
        }
    }

    pub fn paid(&self, year: i32) -> f64 {
        self.paid.get(year)
    }

    /// Full-year payout expected for `year`, projected from the current
    /// payment without touching any state
    pub fn predicted_yearly_payment(&self, year: i32) -> f64 {
        if year < self.min_year {
            return 0.0;
        }
        let mut monthly = self.monthly_payment;
        let mut projected_year = self.year;
        while projected_year < year {
            projected_year += 1;
            monthly *= 1.0 + self.inflation.rate(projected_year);
        }
        monthly * 12.0
    }
}

/// Tax-deferred accounts drawn down on a fixed monthly schedule, sized to
/// fill the low tax brackets or meet the RMD, whichever is larger
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccountsAsPension {
    pub name: String,
    pub accounts: Vec<Account>,
    pub brackets: TaxBracketCollection,
    /// Highest marginal rate the payout is sized to stay within
    pub max_tax_rate: f64,
    /// Amount actually paid in the most recent month
    pub monthly_payment: f64,
    paid: YearLedger,
}

impl AccountsAsPension {
    pub fn new(
        name: impl Into<String>,
        accounts: Vec<Account>,
        brackets: TaxBracketCollection,
        max_tax_rate: f64,
    ) -> Self {
        Self {
            name: name.into(),
            accounts,
            brackets,
            max_tax_rate,
            monthly_payment: 0.0,
            paid: YearLedger::new(),
        }
    }

    fn low_bracket_ceiling(&self) -> f64 {
        self.brackets
            .ceiling_at_or_below_rate(self.max_tax_rate)
            .unwrap_or(0.0)
    }

    pub fn required_minimum(&mut self, year: i32) -> f64 {
        self.accounts
            .iter_mut()
            .map(|acc| acc.required_minimum(year))
            .sum()
    }

    fn yearly_target(&mut self, year: i32) -> f64 {
        self.low_bracket_ceiling().max(self.required_minimum(year))
    }

    pub fn payment(&mut self, year: i32) -> Result<f64> {
        let monthly_target = self.yearly_target(year) / 12.0;
        let mut left_over = monthly_target;
        for acc in &mut self.accounts {
            left_over = acc.withdraw(left_over, year)?;
        }
        let paid = monthly_target - left_over;
        self.monthly_payment = paid;
        self.paid.add(year, paid);
        Ok(paid)
    }

    pub fn paid(&self, year: i32) -> f64 {
        self.paid.get(year)
    }

    pub fn taxable_income(&self, year: i32) -> f64 {
        self.accounts.iter().map(|acc| acc.taxable_income(year)).sum()
    }
}

/// One-time deposit into the primary taxable account
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LumpSumPayment {
    pub amount: f64,
    pub year: i32,
}

/// Any source of recurring income
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Income {
    FixedPension(FixedPension),
    /// Government benefit; only part of each payment is taxable
    SocialSecurity(FixedPension),
    AccountsAsPension(AccountsAsPension),
}

impl Income {
    pub fn name(&self) -> &str {
        match self {
            Income::FixedPension(p) | Income::SocialSecurity(p) => &p.name,
            Income::AccountsAsPension(p) => &p.name,
        }
    }

    /// Collect this month's payment
    pub fn payment(&mut self, year: i32) -> Result<f64> {
        match self {
            Income::FixedPension(p) | Income::SocialSecurity(p) => Ok(p.payment(year)),
            Income::AccountsAsPension(p) => p.payment(year),
        }
    }

    pub fn inflate(&mut self, year: i32) {
        match self {
            Income::FixedPension(p) | Income::SocialSecurity(p) => p.inflate(year),
            Income::AccountsAsPension(p) => p.brackets.inflate(year),
        }
    }

    pub fn grow(&mut self, year: i32, month: u32) {
        if let Income::AccountsAsPension(p) = self {
            for acc in &mut p.accounts {
                acc.grow(year, month);
            }
        }
    }

    /// Total paid out during `year` so far
    pub fn paid(&self, year: i32) -> f64 {
        match self {
            Income::FixedPension(p) | Income::SocialSecurity(p) => p.paid(year),
            Income::AccountsAsPension(p) => p.paid(year),
        }
    }

    pub fn taxable_income(&self, year: i32) -> f64 {
        match self {
            Income::FixedPension(p) => p.paid(year),
            Income::SocialSecurity(p) => p.paid(year) * SOCIAL_SECURITY_TAXABLE_FRACTION,
            Income::AccountsAsPension(p) => p.taxable_income(year),
        }
    }

    /// Taxable income this source is expected to produce over all of `year`
    pub fn predicted_yearly_taxable_income(&mut self, year: i32) -> f64 {
        match self {
            Income::FixedPension(p) => p.predicted_yearly_payment(year),
            Income::SocialSecurity(p) => {
                p.predicted_yearly_payment(year) * SOCIAL_SECURITY_TAXABLE_FRACTION
            }
            Income::AccountsAsPension(p) => p.yearly_target(year),
        }
    }
}
