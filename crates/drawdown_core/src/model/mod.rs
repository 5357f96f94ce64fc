mod accounts;
mod expenses;
mod income;
mod ledger;
mod market;
mod results;
mod rmd;
mod tax_config;

pub(crate) use accounts::check_amount;
pub use accounts::{
    Account, AccountFlavor, DEFAULT_POST_TAX_MIN_AGE, Holdings, RmdSchedule,
    TAXABLE_ASSUMED_GAINS_FRACTION,
};
pub use expenses::Expenses;
pub use income::{
    AccountsAsPension, FixedPension, Income, LumpSumPayment, SOCIAL_SECURITY_TAXABLE_FRACTION,
};
pub use ledger::{MonthCursor, RateSchedule, YearLedger, monthly_rate};
pub use market::{HistoricalSeries, MarketAssumptions, historical_inflation, historical_returns};
pub use results::{
    AccountSnapshot, ReportColumn, SimulationResult, SweepRun, SweepSummary, YearSnapshot,
    YearlyTaxes,
};
pub use rmd::RmdTable;
pub use tax_config::{StandardDeduction, TaxBracket, TaxBracketCollection};
