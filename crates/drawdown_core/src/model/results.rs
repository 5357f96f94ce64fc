//! Simulation results and snapshots
//!
//! Output types from running simulations: the settled taxes of each year,
//! per-year report rows and the outcome of historical sweeps.

use serde::{Deserialize, Serialize};

/// Tax settled for one calendar year. Computed once and then cached.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct YearlyTaxes {
    pub year: i32,
    /// Ordinary taxable income before the standard deduction
    pub taxable_income: f64,
    pub capital_gains: f64,
    pub income_tax: f64,
    pub capital_gains_tax: f64,
    /// Income taxed in each ordinary bracket, in bracket order. Empty when
    /// income did not exceed the standard deduction.
    pub per_bracket: Vec<f64>,
}

impl YearlyTaxes {
    pub fn total(&self) -> f64 {
        self.income_tax + self.capital_gains_tax
    }

    /// Income that landed in bracket `index`, zero when untouched
    pub fn amount_in_bracket(&self, index: usize) -> f64 {
        self.per_bracket.get(index).copied().unwrap_or(0.0)
    }
}

/// One labelled figure of a report row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportColumn {
    pub name: String,
    pub value: f64,
}

impl ReportColumn {
    pub fn new(name: impl Into<String>, value: f64) -> Self {
        Self {
            name: name.into(),
            value,
        }
    }
}

/// End-of-year state of a single account
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccountSnapshot {
    pub name: String,
    pub value: f64,
}

/// Everything recorded about one simulated year
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct YearSnapshot {
    pub year: i32,
    pub age: i32,
    pub expenses: f64,
    pub taxes: YearlyTaxes,
    /// Manager columns in report order
    pub columns: Vec<ReportColumn>,
}

/// Complete results from a single simulation run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationResult {
    pub start_year: i32,
    pub end_year: i32,
    pub years: Vec<YearSnapshot>,
    pub final_balances: Vec<AccountSnapshot>,
}

impl SimulationResult {
    pub fn final_net_worth(&self) -> f64 {
        self.final_balances.iter().map(|a| a.value).sum()
    }

    pub fn year(&self, year: i32) -> Option<&YearSnapshot> {
        self.years.iter().find(|s| s.year == year)
    }
}

/// Outcome of replaying the scenario from one historic start year
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SweepRun {
    pub historic_year: i32,
    /// Diagnostic of the condition that ended the run early
    pub failure: Option<String>,
    /// Simulation year the run failed in
    pub failed_year: Option<i32>,
    pub final_net_worth: f64,
}

impl SweepRun {
    pub fn succeeded(&self) -> bool {
        self.failure.is_none()
    }
}

/// Aggregate of a historical sweep, ordered by historic start year
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SweepSummary {
    pub runs: Vec<SweepRun>,
}

impl SweepSummary {
    pub fn successes(&self) -> usize {
        self.runs.iter().filter(|r| r.succeeded()).count()
    }

    /// Fraction of runs that reached the end year, 0.0 when empty
    pub fn success_rate(&self) -> f64 {
        if self.runs.is_empty() {
            return 0.0;
        }
        self.successes() as f64 / self.runs.len() as f64
    }
}
