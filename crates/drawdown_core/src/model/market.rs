//! Historical market data and the growth/inflation assumptions built on it
//!
//! Historical series are replayed in order: a run starting in simulation
//! year `start_year` sees the returns of `historic_year`, then
//! `historic_year + 1` and so on.

use std::borrow::Cow;

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

use super::ledger::RateSchedule;

/// A named annual series indexed by calendar year
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoricalSeries {
    /// Index/source name for display purposes
    pub name: Cow<'static, str>,
    /// Calendar year of the first value
    pub start_year: i32,
    /// Annual rates (index 0 = `start_year`)
    pub rates: Cow<'static, [f64]>,
}

impl HistoricalSeries {
    #[must_use]
    pub fn new(
        name: impl Into<Cow<'static, str>>,
        start_year: i32,
        rates: impl Into<Cow<'static, [f64]>>,
    ) -> Self {
        Self {
            name: name.into(),
            start_year,
            rates: rates.into(),
        }
    }

    /// S&P 500 Total Return (1927-2023)
    #[must_use]
    pub fn sp500() -> Self {
        Self::new("S&P 500", 1927, historical_returns::SP_500_ANNUAL_RETURNS)
    }

    /// US CPI inflation, all urban consumers (1948-2025)
    #[must_use]
    pub fn us_cpi() -> Self {
        Self::new("US CPI", 1948, historical_inflation::US_CPI_ANNUAL_RATES)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rates.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rates.is_empty()
    }

    /// Last calendar year with data
    #[must_use]
    pub fn end_year(&self) -> i32 {
        self.start_year + self.rates.len() as i32 - 1
    }

    #[must_use]
    pub fn rate_for_year(&self, year: i32) -> Option<f64> {
        if year < self.start_year {
            return None;
        }
        self.rates.get((year - self.start_year) as usize).copied()
    }

    /// Map the series from `historic_year` onward onto consecutive years
    /// beginning at `start_year`. Stops where the data runs out.
    pub fn recast(
        &self,
        start_year: i32,
        historic_year: i32,
    ) -> Result<FxHashMap<i32, f64>, ConfigError> {
        if self.rate_for_year(historic_year).is_none() {
            return Err(ConfigError::HistoricYearOutOfRange {
                year: historic_year,
                first: self.start_year,
                last: self.end_year(),
            });
        }
        let offset = (historic_year - self.start_year) as usize;
        Ok(self.rates[offset..]
            .iter()
            .enumerate()
            .map(|(i, rate)| (start_year + i as i32, *rate))
            .collect())
    }
}

/// Where yearly growth and inflation rates come from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MarketAssumptions {
    /// The same rates every year
    Fixed { growth: f64, inflation: f64 },
    /// Replay history starting at `historic_year`; years past the end of
    /// the data use the fallback rates
    Historical {
        historic_year: i32,
        fallback_growth: f64,
        fallback_inflation: f64,
    },
}

impl Default for MarketAssumptions {
    fn default() -> Self {
        MarketAssumptions::Fixed {
            growth: 0.07,
            inflation: 0.03,
        }
    }
}

impl MarketAssumptions {
    /// Same assumptions replayed from a different historic year. Fixed
    /// assumptions become historical ones with their rates as fallback.
    #[must_use]
    pub fn with_historic_year(&self, historic_year: i32) -> Self {
        match *self {
            MarketAssumptions::Fixed { growth, inflation } => MarketAssumptions::Historical {
                historic_year,
                fallback_growth: growth,
                fallback_inflation: inflation,
            },
            MarketAssumptions::Historical {
                fallback_growth,
                fallback_inflation,
                ..
            } => MarketAssumptions::Historical {
                historic_year,
                fallback_growth,
                fallback_inflation,
            },
        }
    }

    pub fn growth(&self, start_year: i32) -> Result<RateSchedule, ConfigError> {
        match *self {
            MarketAssumptions::Fixed { growth, .. } => Ok(RateSchedule::fixed(growth)),
            MarketAssumptions::Historical {
                historic_year,
                fallback_growth,
                ..
            } => Ok(RateSchedule::with_overrides(
                fallback_growth,
                HistoricalSeries::sp500().recast(start_year, historic_year)?,
            )),
        }
    }

    pub fn inflation(&self, start_year: i32) -> Result<RateSchedule, ConfigError> {
        match *self {
            MarketAssumptions::Fixed { inflation, .. } => Ok(RateSchedule::fixed(inflation)),
            MarketAssumptions::Historical {
                historic_year,
                fallback_inflation,
                ..
            } => Ok(RateSchedule::with_overrides(
                fallback_inflation,
                HistoricalSeries::us_cpi().recast(start_year, historic_year)?,
            )),
        }
    }
}

/// Historical annual returns
pub mod historical_returns {
    /// US Large Cap Stocks (S&P 500 Total Return)
    /// Source: Robert Shiller, Yale University
    /// Annual returns 1927-2023 (97 years)
    pub const SP_500_ANNUAL_RETURNS: &[f64] = &[
        0.1071, 0.3490, 0.4533, -0.0803, -0.1985, -0.3873, -0.0936, 0.5318, -0.0791, 0.5231,
        0.3292, -0.2964, 0.1507, 0.0431, -0.0719, -0.0786, 0.1817, 0.2250, 0.1815, 0.3760, -0.1054,
        0.0309, 0.1032, 0.1677, 0.3240, 0.1990, 0.1397, 0.0222, 0.4375, 0.2781, 0.0684, -0.0571,
        0.3839, 0.0780, 0.0587, 0.1897, -0.0266, 0.2045, 0.1562, 0.1168, -0.0634, 0.1558, 0.1052,
        -0.0765, 0.0667, 0.1332, 0.1763, -0.1457, -0.2023, 0.3722, 0.1162, -0.0793, 0.1570, 0.1623,
        0.2494, -0.0613, 0.2736, 0.1987, 0.0727, 0.2477, 0.3002, -0.0181, 0.1715, 0.2260, -0.0102,
        0.3080, 0.0737, 0.1147, 0.0084, 0.3421, 0.2645, 0.2720, 0.3087, 0.1532, -0.0498, -0.1304,
        -0.1972, 0.2807, 0.0606, 0.1004, 0.1316, -0.0085, -0.3455, 0.3176, 0.1609, 0.0348, 0.1586,
        0.2504, 0.1332, -0.0327, 0.2052, 0.2449, -0.0461, 0.2756, 0.1710, 0.2212, -0.1180,
    ];
}

/// Historical annual inflation rates
pub mod historical_inflation {
    /// US CPI Inflation (All Urban Consumers)
    /// Source: FRED (CPIAUCSL)
    /// Annual rates 1948-2025 (78 years)
    pub const US_CPI_ANNUAL_RATES: &[f64] = &[
        0.0273, -0.0183, 0.0580, 0.0596, 0.0091, 0.0060, -0.0037, 0.0037, 0.0283, 0.0304, 0.0176,
        0.0152, 0.0136, 0.0067, 0.0123, 0.0165, 0.0120, 0.0192, 0.0336, 0.0328, 0.0471, 0.0590,
        0.0557, 0.0327, 0.0341, 0.0894, 0.1210, 0.0713, 0.0504, 0.0668, 0.0899, 0.1325, 0.1235,
        0.0891, 0.0383, 0.0379, 0.0404, 0.0379, 0.0119, 0.0433, 0.0441, 0.0464, 0.0625, 0.0298,
        0.0297, 0.0281, 0.0260, 0.0253, 0.0338, 0.0170, 0.0161, 0.0268, 0.0344, 0.0160, 0.0248,
        0.0204, 0.0334, 0.0334, 0.0252, 0.0411, -0.0002, 0.0281, 0.0144, 0.0306, 0.0176, 0.0151,
        0.0065, 0.0064, 0.0205, 0.0213, 0.0200, 0.0232, 0.0132, 0.0716, 0.0641, 0.0332, 0.0287,
        0.0265,
    ];
}
