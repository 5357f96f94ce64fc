//! Tax bracket tables and the standard deduction
//!
//! Both inflate once per calendar year. The actual tax calculation lives in
//! the `taxes` module.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

use super::ledger::RateSchedule;

fn unbounded() -> f64 {
    f64::INFINITY
}

/// A single bracket in a progressive tax system
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TaxBracket {
    /// Income at which this bracket stops applying. The top bracket is
    /// normally unbounded.
    #[serde(default = "unbounded")]
    pub ceiling: f64,
    /// Marginal tax rate for income in this bracket (e.g., 0.22 for 22%)
    pub rate: f64,
}

impl TaxBracket {
    pub fn new(ceiling: f64, rate: f64) -> Self {
        Self { ceiling, rate }
    }

    fn inflate(&mut self, rate: f64) {
        self.ceiling *= 1.0 + rate;
    }
}

/// Brackets ordered by ascending ceiling, inflated once per calendar year
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaxBracketCollection {
    pub brackets: Vec<TaxBracket>,
    /// Last year the ceilings were inflated to
    pub year: i32,
    pub inflation: RateSchedule,
}

impl TaxBracketCollection {
    pub fn new(brackets: Vec<TaxBracket>, year: i32, inflation: RateSchedule) -> Self {
        Self {
            brackets,
            year,
            inflation,
        }
    }

    /// 2023 US married-filing-jointly ordinary income brackets
    pub fn federal_income_2023(inflation: RateSchedule) -> Self {
        Self::new(
            vec![
                TaxBracket::new(22_000.0, 0.10),
                TaxBracket::new(89_450.0, 0.12),
                TaxBracket::new(190_750.0, 0.22),
                TaxBracket::new(364_200.0, 0.24),
                TaxBracket::new(462_500.0, 0.32),
                TaxBracket::new(693_750.0, 0.35),
                TaxBracket::new(f64::INFINITY, 0.37),
            ],
            2023,
            inflation,
        )
    }

    /// 2023 US married-filing-jointly long-term capital gains tiers
    pub fn capital_gains_2023(inflation: RateSchedule) -> Self {
        Self::new(
            vec![
                TaxBracket::new(89_450.0, 0.0),
                TaxBracket::new(517_200.0, 0.15),
            ],
            2023,
            inflation,
        )
    }

    pub fn validate(&self, table: &'static str) -> Result<(), ConfigError> {
        if self.brackets.windows(2).all(|w| w[0].ceiling < w[1].ceiling) {
            Ok(())
        } else {
            Err(ConfigError::UnsortedBrackets { table })
        }
    }

    pub fn len(&self) -> usize {
        self.brackets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.brackets.is_empty()
    }

    /// Advance every ceiling to `year`, one calendar year at a time.
    /// Years already reached are never applied twice.
    pub fn inflate(&mut self, year: i32) {
        while self.year < year {
            self.year += 1;
            let rate = self.inflation.rate(self.year);
            for bracket in &mut self.brackets {
                bracket.inflate(rate);
            }
        }
    }

    /// Ceiling of the last bracket (in table order) whose rate does not
    /// exceed `max_rate`.
    pub fn ceiling_at_or_below_rate(&self, max_rate: f64) -> Option<f64> {
        self.brackets
            .iter()
            .rev()
            .find(|b| b.rate <= max_rate)
            .map(|b| b.ceiling)
    }
}

/// Flat amount subtracted from taxable income before brackets apply
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StandardDeduction {
    pub amount: f64,
    pub year: i32,
    pub inflation_rate: f64,
}

impl Default for StandardDeduction {
    fn default() -> Self {
        Self::married_joint_2023()
    }
}

impl StandardDeduction {
    pub fn new(amount: f64, year: i32, inflation_rate: f64) -> Self {
        Self {
            amount,
            year,
            inflation_rate,
        }
    }

    pub fn married_joint_2023() -> Self {
        Self::new(27_700.0, 2023, 0.029)
    }

    pub fn inflate(&mut self, year: i32) {
        while self.year < year {
            self.year += 1;
            self.amount *= 1.0 + self.inflation_rate;
        }
    }
}
