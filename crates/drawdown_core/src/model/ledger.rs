//! Year-keyed bookkeeping shared by accounts and income sources

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

/// Amounts keyed by calendar year. Years never touched read as zero.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct YearLedger(FxHashMap<i32, f64>);

impl YearLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, year: i32) -> f64 {
        self.0.get(&year).copied().unwrap_or(0.0)
    }

    pub fn add(&mut self, year: i32, amount: f64) {
        *self.0.entry(year).or_insert(0.0) += amount;
    }

    pub fn set(&mut self, year: i32, amount: f64) {
        self.0.insert(year, amount);
    }

    /// Reduce the year's amount by `amount`, stopping at zero.
    ///
    /// Returns the amount actually removed.
    pub fn offset(&mut self, year: i32, amount: f64) -> f64 {
        let current = self.get(year);
        let reduced = (current - amount).max(0.0);
        self.0.insert(year, reduced);
        current - reduced
    }
}

/// Absolute month index (`year * 12 + month - 1`) that only moves forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MonthCursor(i32);

impl MonthCursor {
    /// `month` is 1-based.
    pub fn new(year: i32, month: u32) -> Self {
        Self(year * 12 + month as i32 - 1)
    }

    pub fn year(self) -> i32 {
        self.0.div_euclid(12)
    }

    pub fn month(self) -> u32 {
        self.0.rem_euclid(12) as u32 + 1
    }

    /// Step the cursor one month at a time up to `target`, calling `tick`
    /// with each month being stepped over. A target at or behind the cursor
    /// does nothing.
    pub fn advance_to(&mut self, target: MonthCursor, mut tick: impl FnMut(MonthCursor)) -> u32 {
        let mut steps = 0;
        while self.0 < target.0 {
            tick(*self);
            self.0 += 1;
            steps += 1;
        }
        steps
    }
}

/// A base annual rate with optional per-calendar-year overrides
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RateSchedule {
    pub default: f64,
    #[serde(default)]
    pub by_year: FxHashMap<i32, f64>,
}

impl RateSchedule {
    pub fn fixed(rate: f64) -> Self {
        Self {
            default: rate,
            by_year: FxHashMap::default(),
        }
    }

    pub fn with_overrides(default: f64, by_year: FxHashMap<i32, f64>) -> Self {
        Self { default, by_year }
    }

    pub fn rate(&self, year: i32) -> f64 {
        self.by_year.get(&year).copied().unwrap_or(self.default)
    }

    pub fn set_year(&mut self, year: i32, rate: f64) {
        self.by_year.insert(year, rate);
    }
}

/// Monthly rate that compounds to `annual_rate` over twelve months
pub fn monthly_rate(annual_rate: f64) -> f64 {
    (1.0 + annual_rate).powf(1.0 / 12.0) - 1.0
}
