//! Withdrawal group waterfall properties

use proptest::prelude::{prop_assert, prop_assume, proptest};

use crate::model::{
    Account, MonthCursor, RateSchedule, StandardDeduction, TaxBracketCollection,
};
use crate::withdrawal_group::{RateLimitedWithdrawalGroup, TaxContext};

const EPS: f64 = 1e-6;
const YEAR: i32 = 2030;

fn group(born_year: i32, balances: &[f64]) -> RateLimitedWithdrawalGroup {
    let accounts = balances
        .iter()
        .enumerate()
        .map(|(i, &balance)| {
            Account::post_tax_401k(
                format!("IRA {i}"),
                balance,
                born_year,
                60,
                RateSchedule::fixed(0.0),
                MonthCursor::new(2025, 1),
            )
        })
        .collect();
    RateLimitedWithdrawalGroup::new("IRAs", accounts)
}

fn tables() -> (TaxBracketCollection, StandardDeduction) {
    (
        TaxBracketCollection::federal_income_2023(RateSchedule::fixed(0.0)),
        StandardDeduction::married_joint_2023(),
    )
}

// ============================================================================
// Fixed cases
// ============================================================================

#[test]
fn test_target_is_ceiling_plus_deduction_with_overflow() {
    let (brackets, deduction) = tables();
    let ctx = TaxContext {
        brackets: &brackets,
        deduction: &deduction,
    };
    let g = group(1960, &[1_000_000.0]);
    let expected = (89_450.0 + 27_700.0) * 1.3;
    assert!(
        (g.max_taxable_target(&ctx) - expected).abs() < 1e-6,
        "12% ceiling plus deduction, 30% overflow"
    );
}

#[test]
fn test_repeated_monthly_requests_stop_at_target() {
    let (brackets, deduction) = tables();
    let ctx = TaxContext {
        brackets: &brackets,
        deduction: &deduction,
    };
    let mut g = group(1960, &[5_000_000.0]);
    let target = g.max_taxable_target(&ctx);

    let mut unpaid = 0.0;
    for _ in 0..12 {
        unpaid += g.withdraw(20_000.0, YEAR, &ctx).unwrap();
    }
    assert!((g.withdrawn(YEAR) - target).abs() < 1e-6, "Year capped at the target");
    assert!((unpaid - (240_000.0 - target)).abs() < 1e-6, "Rest handed back");
}

#[test]
fn test_locked_members_are_skipped() {
    let (brackets, deduction) = tables();
    let ctx = TaxContext {
        brackets: &brackets,
        deduction: &deduction,
    };
    // Owner is 55 in 2030, below the default minimum age
    let mut g = group(1975, &[100_000.0]);
    assert_eq!(g.withdraw(1_000.0, YEAR, &ctx).unwrap(), 1_000.0);
    assert_eq!(g.value(), 100_000.0);
}

// ============================================================================
// Properties
// ============================================================================

proptest! {
    #![proptest_config(proptest::test_runner::Config::with_cases(64))]

    #[test]
    fn prop_left_over_conserves_request(
        first in 0.0f64..500_000.0,
        second in 0.0f64..500_000.0,
        born_year in 1940i32..1970,
        pension in 0.0f64..200_000.0,
        amount in 0.0f64..400_000.0,
    ) {
        let (brackets, deduction) = tables();
        let ctx = TaxContext { brackets: &brackets, deduction: &deduction };
        let mut g = group(born_year, &[first, second]);
        g.set_pension_income(pension, YEAR);

        let before = g.value();
        let left_over = g.withdraw(amount, YEAR, &ctx).unwrap();
        let paid = before - g.value();

        prop_assert!(left_over >= -EPS);
        prop_assert!(left_over <= amount + EPS);
        prop_assert!((paid + left_over - amount).abs() <= EPS * (1.0 + amount));
    }

    #[test]
    fn prop_discretionary_withdrawals_respect_target(
        balance in 0.0f64..2_000_000.0,
        pension in 0.0f64..200_000.0,
        amount in 0.0f64..400_000.0,
    ) {
        let (brackets, deduction) = tables();
        let ctx = TaxContext { brackets: &brackets, deduction: &deduction };
        // Age 70: withdrawals open, no RMD yet
        let mut g = group(1960, &[balance]);
        g.set_pension_income(pension, YEAR);
        let target = g.max_taxable_target(&ctx);

        g.withdraw(amount, YEAR, &ctx).unwrap();
        prop_assert!(g.withdrawn(YEAR) <= (target - pension).max(0.0) + EPS);
    }

    #[test]
    fn prop_rmd_paid_even_above_target(
        balance in 1_000.0f64..2_000_000.0,
        amount in 0.0f64..400_000.0,
    ) {
        let (brackets, deduction) = tables();
        let ctx = TaxContext { brackets: &brackets, deduction: &deduction };
        // Age 80 in 2030
        let mut g = group(1950, &[balance]);
        g.set_pension_income(1.0e9, YEAR);
        let required = g.required_minimum(YEAR);
        prop_assume!(required > 0.0);

        g.withdraw(amount, YEAR, &ctx).unwrap();
        prop_assert!(g.withdrawn(YEAR) >= required.min(amount) - EPS);
        prop_assert!(g.withdrawn(YEAR) <= required + EPS);
    }
}
