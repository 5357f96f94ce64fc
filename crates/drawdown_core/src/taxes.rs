//! Progressive tax calculation
//!
//! Ordinary income is taxed bracket by bracket after the standard deduction.
//! Capital gains stack on top of ordinary income against a separate two-tier
//! table.

use crate::model::{StandardDeduction, TaxBracketCollection};

/// Tax owed on ordinary income and where the income landed
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IncomeTaxResult {
    pub tax: f64,
    /// Income taxed in each bracket, in bracket order. Empty when income
    /// does not exceed the deduction.
    pub per_bracket: Vec<f64>,
}

/// Calculate ordinary income tax after subtracting the standard deduction.
///
/// Income above the last finite ceiling is taxed at the last bracket's rate.
pub fn compute_income_tax(
    taxable_income: f64,
    brackets: &TaxBracketCollection,
    deduction: &StandardDeduction,
) -> IncomeTaxResult {
    let after_deduction = taxable_income - deduction.amount;
    if after_deduction < 0.0 || brackets.is_empty() {
        return IncomeTaxResult::default();
    }

    let mut tax = 0.0;
    let mut previous_ceiling = 0.0;
    let mut per_bracket = vec![0.0; brackets.len()];

    for (i, bracket) in brackets.brackets.iter().enumerate() {
        if after_deduction > bracket.ceiling {
            let slice = bracket.ceiling - previous_ceiling;
            tax += slice * bracket.rate;
            per_bracket[i] = slice;
            previous_ceiling = bracket.ceiling;
        } else {
            let slice = after_deduction - previous_ceiling;
            tax += slice * bracket.rate;
            per_bracket[i] = slice;
            return IncomeTaxResult { tax, per_bracket };
        }
    }

    // Every ceiling was finite and exceeded
    let last = brackets.len() - 1;
    let residual = after_deduction - previous_ceiling;
    tax += residual * brackets.brackets[last].rate;
    per_bracket[last] += residual;

    IncomeTaxResult { tax, per_bracket }
}

/// Calculate tax on capital gains stacked on `taxable_income`.
///
/// Gains that fit under the first tier's ceiling are taxed at the first
/// tier's rate (normally 0%); the rest at the second tier's rate. Tables with
/// fewer than two tiers owe nothing.
pub fn compute_cap_gains_tax(
    taxable_income: f64,
    capital_gains: f64,
    brackets: &TaxBracketCollection,
) -> f64 {
    let (Some(first), Some(second)) = (brackets.brackets.first(), brackets.brackets.get(1))
    else {
        return 0.0;
    };

    if taxable_income > first.ceiling {
        return capital_gains * second.rate;
    }

    let under_first = (first.ceiling - taxable_income).min(capital_gains);
    let over_first = capital_gains - under_first;
    under_first * first.rate + over_first * second.rate
}
