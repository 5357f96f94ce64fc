use serde::{Deserialize, Serialize};

/// Household spending need, inflated once per calendar year
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Expenses {
    /// Annual amount in `year` dollars
    pub amount: f64,
    pub year: i32,
    pub inflation_rate: f64,
}

impl Expenses {
    pub fn new(amount: f64, year: i32, inflation_rate: f64) -> Self {
        Self {
            amount,
            year,
            inflation_rate,
        }
    }

    pub fn inflate(&mut self, year: i32) {
        while self.year < year {
            self.year += 1;
            self.amount *= 1.0 + self.inflation_rate;
        }
    }

    pub fn yearly(&self) -> f64 {
        self.amount
    }

    pub fn monthly(&self) -> f64 {
        self.amount / 12.0
    }
}
