//! Account definitions
//!
//! Every account holds money that grows monthly and can be withdrawn from or
//! deposited into. The flavor decides when withdrawals are allowed and how
//! withdrawals show up as taxable income.

use std::fmt;

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::error::{AccountError, Result};

use super::ledger::{MonthCursor, RateSchedule, YearLedger, monthly_rate};
use super::rmd::RmdTable;

/// Share of a plain taxable withdrawal assumed to be realized gains
pub const TAXABLE_ASSUMED_GAINS_FRACTION: f64 = 0.60;

/// Default age before which tax-deferred withdrawals are refused
pub const DEFAULT_POST_TAX_MIN_AGE: i32 = 60;

/// How the money inside an account is tracked
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Holdings {
    Balance(f64),
    /// Already-taxed principal and unrealized gains kept apart
    Basis { basis: f64, gains: f64 },
}

impl Holdings {
    pub fn total(&self) -> f64 {
        match *self {
            Holdings::Balance(balance) => balance,
            Holdings::Basis { basis, gains } => basis + gains,
        }
    }

    fn grow(&mut self, monthly_rate: f64) {
        match self {
            Holdings::Balance(balance) => *balance *= 1.0 + monthly_rate,
            // Growth is all gains; basis only moves on deposit/withdrawal
            Holdings::Basis { basis, gains } => *gains += (*basis + *gains) * monthly_rate,
        }
    }

    /// Remove `amount` (at most the total). Returns the gains realized.
    fn remove(&mut self, amount: f64) -> f64 {
        match self {
            Holdings::Balance(balance) => {
                *balance = (*balance - amount).max(0.0);
                0.0
            }
            Holdings::Basis { basis, gains } => {
                let total = *basis + *gains;
                if total <= 0.0 {
                    return 0.0;
                }
                // Both parts shrink by the same factor so the total drops by
                // exactly `amount`, even when gains are underwater
                let kept = (total - amount.min(total)) / total;
                let realized = *gains * (1.0 - kept);
                *basis *= kept;
                *gains *= kept;
                realized
            }
        }
    }

    /// Empty the holdings. Returns the gains realized.
    fn drain(&mut self) -> f64 {
        match self {
            Holdings::Balance(balance) => {
                *balance = 0.0;
                0.0
            }
            Holdings::Basis { basis, gains } => {
                let realized = *gains;
                *basis = 0.0;
                *gains = 0.0;
                realized
            }
        }
    }

    fn add(&mut self, amount: f64) {
        match self {
            Holdings::Balance(balance) => *balance += amount,
            Holdings::Basis { basis, .. } => *basis += amount,
        }
    }
}

/// RMD-subject state of a tax-deferred account
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RmdSchedule {
    pub born_year: i32,
    /// Owner age before which ordinary withdrawals are refused
    pub min_age: i32,
    pub table: RmdTable,
    /// First answer given for each year, against that moment's balance
    #[serde(skip)]
    required_by_year: FxHashMap<i32, f64>,
}

impl RmdSchedule {
    pub fn new(born_year: i32, min_age: i32) -> Self {
        Self {
            born_year,
            min_age,
            table: RmdTable::default(),
            required_by_year: FxHashMap::default(),
        }
    }

    pub fn age(&self, year: i32) -> i32 {
        year - self.born_year
    }
}

/// Tax treatment of an account
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum AccountFlavor {
    /// Brokerage without basis tracking; a fixed share of withdrawals is gains
    Taxable,
    /// Brokerage with basis tracking; withdrawals realize their gains share
    TaxableWithBasis,
    /// Already-taxed retirement money (Roth style), locked until `min_year`
    PreTax401k { min_year: i32 },
    /// Tax-deferred retirement money, locked until a minimum age and
    /// subject to required minimum distributions
    PostTax401k(RmdSchedule),
}

/// A balance-holding account
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Account {
    pub name: String,
    pub flavor: AccountFlavor,
    holdings: Holdings,
    growth: RateSchedule,
    cursor: MonthCursor,
    /// Gross withdrawals per year, reduced by same-year deposits
    withdrawn: YearLedger,
    deposited: YearLedger,
    realized_gains: YearLedger,
}

impl Account {
    fn with_parts(
        name: impl Into<String>,
        flavor: AccountFlavor,
        holdings: Holdings,
        growth: RateSchedule,
        start: MonthCursor,
    ) -> Self {
        Self {
            name: name.into(),
            flavor,
            holdings,
            growth,
            cursor: start,
            withdrawn: YearLedger::new(),
            deposited: YearLedger::new(),
            realized_gains: YearLedger::new(),
        }
    }

    pub fn taxable(
        name: impl Into<String>,
        balance: f64,
        growth: RateSchedule,
        start: MonthCursor,
    ) -> Self {
        Self::with_parts(
            name,
            AccountFlavor::Taxable,
            Holdings::Balance(balance),
            growth,
            start,
        )
    }

    pub fn taxable_with_basis(
        name: impl Into<String>,
        basis: f64,
        gains: f64,
        growth: RateSchedule,
        start: MonthCursor,
    ) -> Self {
        Self::with_parts(
            name,
            AccountFlavor::TaxableWithBasis,
            Holdings::Basis { basis, gains },
            growth,
            start,
        )
    }

    pub fn pre_tax_401k(
        name: impl Into<String>,
        balance: f64,
        min_year: i32,
        growth: RateSchedule,
        start: MonthCursor,
    ) -> Self {
        Self::with_parts(
            name,
            AccountFlavor::PreTax401k { min_year },
            Holdings::Balance(balance),
            growth,
            start,
        )
    }

    pub fn post_tax_401k(
        name: impl Into<String>,
        balance: f64,
        born_year: i32,
        min_age: i32,
        growth: RateSchedule,
        start: MonthCursor,
    ) -> Self {
        Self::with_parts(
            name,
            AccountFlavor::PostTax401k(RmdSchedule::new(born_year, min_age)),
            Holdings::Balance(balance),
            growth,
            start,
        )
    }

    /// Replace the RMD table. No effect on accounts that owe no RMD.
    #[must_use]
    pub fn with_rmd_table(mut self, table: RmdTable) -> Self {
        if let AccountFlavor::PostTax401k(schedule) = &mut self.flavor {
            schedule.table = table;
        }
        self
    }

    pub fn value(&self) -> f64 {
        self.holdings.total()
    }

    pub fn holdings(&self) -> Holdings {
        self.holdings
    }

    pub fn growth(&self) -> &RateSchedule {
        &self.growth
    }

    pub fn growth_mut(&mut self) -> &mut RateSchedule {
        &mut self.growth
    }

    pub fn is_rmd_subject(&self) -> bool {
        matches!(self.flavor, AccountFlavor::PostTax401k(_))
    }

    /// Compound monthly growth up to the start of (`year`, `month`).
    /// Each month compounds at its own calendar year's rate.
    pub fn grow(&mut self, year: i32, month: u32) {
        let holdings = &mut self.holdings;
        let growth = &self.growth;
        self.cursor.advance_to(MonthCursor::new(year, month), |stepped| {
            holdings.grow(monthly_rate(growth.rate(stepped.year())))
        });
    }

    fn withdrawals_open(&self, year: i32) -> bool {
        match &self.flavor {
            AccountFlavor::Taxable | AccountFlavor::TaxableWithBasis => true,
            AccountFlavor::PreTax401k { min_year } => year >= *min_year,
            AccountFlavor::PostTax401k(schedule) => schedule.age(year) >= schedule.min_age,
        }
    }

    fn check_amount(&self, amount: f64) -> Result<()> {
        check_amount(&self.name, amount)
    }

    /// Withdraw up to `amount`. Returns the part that could not be paid.
    ///
    /// Locked accounts pay nothing and return the whole request.
    pub fn withdraw(&mut self, amount: f64, year: i32) -> Result<f64> {
        self.check_amount(amount)?;
        if !self.withdrawals_open(year) {
            return Ok(amount);
        }
        Ok(self.take(amount, year))
    }

    /// Roth-style conversion: a withdrawal that ignores the age/year lock
    pub fn convert(&mut self, amount: f64, year: i32) -> Result<f64> {
        self.check_amount(amount)?;
        Ok(self.take(amount, year))
    }

    fn take(&mut self, amount: f64, year: i32) -> f64 {
        let available = self.holdings.total();
        if amount > available {
            let realized = self.holdings.drain();
            self.withdrawn.add(year, available);
            self.realized_gains.add(year, realized);
            amount - available
        } else {
            let realized = self.holdings.remove(amount);
            self.withdrawn.add(year, amount);
            self.realized_gains.add(year, realized);
            0.0
        }
    }

    /// Add money. The year's recorded withdrawal shrinks by the same amount,
    /// never below zero.
    pub fn deposit(&mut self, amount: f64, year: i32) -> Result<()> {
        self.check_amount(amount)?;
        self.holdings.add(amount);
        self.deposited.add(year, amount);

        let before = self.withdrawn.get(year);
        self.withdrawn.offset(year, amount);
        if before > 0.0 {
            // Realized gains shrink with the withdrawal they came from
            let kept = self.withdrawn.get(year) / before;
            let realized = self.realized_gains.get(year) * kept;
            self.realized_gains.set(year, realized);
        }
        Ok(())
    }

    /// Net amount withdrawn in `year`
    pub fn withdrawn(&self, year: i32) -> f64 {
        self.withdrawn.get(year).max(0.0)
    }

    pub fn deposited(&self, year: i32) -> f64 {
        self.deposited.get(year)
    }

    /// Ordinary taxable income produced by this account in `year`
    pub fn taxable_income(&self, year: i32) -> f64 {
        match self.flavor {
            AccountFlavor::PostTax401k(_) => self.withdrawn(year),
            _ => 0.0,
        }
    }

    /// Capital gains realized by this account in `year`
    pub fn capital_gains(&self, year: i32) -> f64 {
        match self.flavor {
            AccountFlavor::Taxable => self.withdrawn(year) * TAXABLE_ASSUMED_GAINS_FRACTION,
            // Realized losses do not offset other income
            AccountFlavor::TaxableWithBasis => self.realized_gains.get(year).max(0.0),
            _ => 0.0,
        }
    }

    /// Required minimum distribution for `year`.
    ///
    /// Computed against the balance at the first query of the year and
    /// remembered, so later balance changes do not move it.
    pub fn required_minimum(&mut self, year: i32) -> f64 {
        let balance = self.holdings.total();
        match &mut self.flavor {
            AccountFlavor::PostTax401k(schedule) => {
                let age = schedule.age(year);
                let table = &schedule.table;
                *schedule
                    .required_by_year
                    .entry(year)
                    .or_insert_with(|| table.required_minimum_withdrawal(balance, age))
            }
            _ => 0.0,
        }
    }
}

/// Reject amounts that are negative, NaN or infinite
pub(crate) fn check_amount(account: &str, amount: f64) -> Result<()> {
    if !amount.is_finite() {
        return Err(AccountError::NonFiniteAmount {
            account: account.to_string(),
        });
    }
    if amount < 0.0 {
        return Err(AccountError::NegativeAmount {
            account: account.to_string(),
            amount,
        });
    }
    Ok(())
}

impl fmt::Display for Account {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: ${:.2}", self.name, self.value())
    }
}
