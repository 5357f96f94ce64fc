//! Required Minimum Distribution (RMD) divisor table
//!
//! Tax-deferred accounts must pay out at least `balance / divisor(age)` each
//! year once the owner reaches the table's starting age.

use serde::{Deserialize, Serialize};

/// Uniform lifetime divisors, one per age starting at 75
const UNIFORM_LIFETIME_DIVISORS: &[f64] = &[
    27.4, 26.5, 25.6, 24.7, 23.8, 22.9, 22.0, 21.2, 20.3, 19.5, 18.7, 17.9, 17.1, 16.3, 15.5,
    14.8, 14.1, 13.4, 12.7, 12.0, 11.4, 10.8, 10.2, 9.6, 9.1, 8.6, 8.1, 7.6, 7.1, 6.7, 6.3, 5.9,
    5.5, 5.2, 4.9, 4.6, 4.3, 4.1, 3.9, 3.7, 3.5, 3.4, 3.3, 3.1, 3.0, 2.9, 2.8, 2.7, 2.5, 2.3,
    2.0,
];

/// Age-indexed divisor table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RmdTable {
    /// First age that owes a distribution
    pub start_age: i32,
    /// Divisor for `start_age`, `start_age + 1`, ...
    pub divisors: Vec<f64>,
}

impl Default for RmdTable {
    fn default() -> Self {
        Self::uniform_lifetime()
    }
}

impl RmdTable {
    #[must_use]
    pub fn uniform_lifetime() -> Self {
        Self {
            start_age: 75,
            divisors: UNIFORM_LIFETIME_DIVISORS.to_vec(),
        }
    }

    /// Divisor for `age`. `None` below the starting age; ages past the end of
    /// the table use the last divisor.
    #[must_use]
    pub fn divisor_for_age(&self, age: i32) -> Option<f64> {
        if age < self.start_age {
            return None;
        }
        let idx = (age - self.start_age) as usize;
        self.divisors
            .get(idx)
            .or_else(|| self.divisors.last())
            .copied()
    }

    /// Minimum amount that must leave an account holding `balance` this year
    #[must_use]
    pub fn required_minimum_withdrawal(&self, balance: f64, age: i32) -> f64 {
        match self.divisor_for_age(age) {
            Some(divisor) => balance / divisor,
            None => 0.0,
        }
    }
}
