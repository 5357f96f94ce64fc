//! Year-by-year simulation driver
//!
//! Each simulated year runs the same sequence:
//! 1. inflate expenses, tax tables and incomes; share predicted pension income
//! 2. pay last year's tax bill
//! 3. for every month: grow, collect pensions, withdraw the remaining need
//! 4. convert into the zero-tax room, deposit lump sums, settle this year's taxes

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::config::{Scenario, ScenarioConfig};
use crate::error::{ConfigError, SimulationError};
use crate::model::{
    AccountSnapshot, Income, SimulationResult, SweepRun, SweepSummary, YearSnapshot,
};

pub fn simulate(mut scenario: Scenario) -> Result<SimulationResult, SimulationError> {
    let span = usize::try_from(scenario.end_year - scenario.start_year + 1).map_err(|_| {
        tracing::warn!(
            start_year = scenario.start_year,
            end_year = scenario.end_year,
            "Scenario ends before it starts"
        );
        ConfigError::YearRange {
            start_year: scenario.start_year,
            end_year: scenario.end_year,
        }
    })?;
    let mut years = Vec::with_capacity(span);
    let mut last_year_taxes = 0.0;

    for year in scenario.start_year..=scenario.end_year {
        scenario.expenses.inflate(year);
        scenario.manager.inflate(year);
        scenario.manager.set_total_predicted_income_taxes(year);

        let unpaid = scenario.manager.pay_taxes(last_year_taxes, year)?;
        if unpaid > 0.0 {
            tracing::warn!(year, unpaid, "Could not pay taxes");
            return Err(SimulationError::TaxPaymentShortfall {
                year,
                shortfall: unpaid,
            });
        }

        let monthly_need = scenario.expenses.monthly();
        for month in 1..=12 {
            scenario.manager.grow(year, month);
            let pension = scenario.manager.monthly_pension(year)?;
            let needed = monthly_need - pension;
            if needed < 0.0 {
                tracing::warn!(year, month, pension, monthly_need, "Pension exceeds need");
                return Err(SimulationError::PensionExceedsIncome {
                    year,
                    month,
                    pension,
                    needed: monthly_need,
                });
            }
            let left_over = scenario.manager.withdraw(needed, year)?;
            if left_over > 0.0 {
                tracing::warn!(year, month, left_over, "Out of money");
                return Err(SimulationError::OutOfMoney {
                    year,
                    month,
                    shortfall: left_over,
                });
            }
        }

        scenario.manager.conversions(year)?;
        scenario.manager.lump_sum_payments(year)?;
        let taxes = scenario.manager.taxes(year).clone();
        last_year_taxes = taxes.total();

        let columns = scenario.manager.columns(year);
        tracing::info!(
            year,
            taxable_income = taxes.taxable_income,
            total_tax = last_year_taxes,
            "Year settled"
        );
        years.push(YearSnapshot {
            year,
            age: scenario.age(year),
            expenses: scenario.expenses.yearly(),
            taxes,
            columns,
        });
    }

    Ok(SimulationResult {
        start_year: scenario.start_year,
        end_year: scenario.end_year,
        years,
        final_balances: final_balances(&scenario),
    })
}

fn final_balances(scenario: &Scenario) -> Vec<AccountSnapshot> {
    let pension_accounts = scenario.manager.incomes.iter().flat_map(|income| match income {
        Income::AccountsAsPension(p) => p.accounts.as_slice(),
        _ => [].as_slice(),
    });
    scenario
        .manager
        .accounts()
        .chain(pension_accounts)
        .map(|acc| AccountSnapshot {
            name: acc.name.clone(),
            value: acc.value(),
        })
        .collect()
}

fn sweep_run(config: &ScenarioConfig, historic_year: i32) -> SweepRun {
    let outcome = Scenario::from_config(&config.with_historic_year(historic_year))
        .map_err(|e| (e.to_string(), None))
        .and_then(|scenario| simulate(scenario).map_err(|e| (e.to_string(), e.year())));

    match outcome {
        Ok(result) => SweepRun {
            historic_year,
            failure: None,
            failed_year: None,
            final_net_worth: result.final_net_worth(),
        },
        Err((failure, failed_year)) => SweepRun {
            historic_year,
            failure: Some(failure),
            failed_year,
            final_net_worth: 0.0,
        },
    }
}

/// Replay the scenario once per historic start year.
///
/// Runs are independent; results come back in `historic_years` order.
pub fn sweep(config: &ScenarioConfig, historic_years: &[i32]) -> SweepSummary {
    #[cfg(feature = "parallel")]
    let runs: Vec<SweepRun> = historic_years
        .par_iter()
        .map(|&year| sweep_run(config, year))
        .collect();

    #[cfg(not(feature = "parallel"))]
    let runs: Vec<SweepRun> = historic_years
        .iter()
        .map(|&year| sweep_run(config, year))
        .collect();

    let summary = SweepSummary { runs };
    tracing::info!(
        runs = summary.runs.len(),
        successes = summary.successes(),
        "Sweep complete"
    );
    summary
}
