use std::fmt;

/// Invalid requests made against a single account.
///
/// Running out of money is never an error at this level; accounts hand the
/// unsatisfied remainder back as a left-over amount instead.
#[derive(Debug, Clone, PartialEq)]
pub enum AccountError {
    NegativeAmount { account: String, amount: f64 },
    NonFiniteAmount { account: String },
}

impl fmt::Display for AccountError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AccountError::NegativeAmount { account, amount } => {
                write!(f, "{account}: can not move negative amount ${amount:.2}")
            }
            AccountError::NonFiniteAmount { account } => {
                write!(f, "{account}: amount must be a finite number")
            }
        }
    }
}

impl std::error::Error for AccountError {}

/// Errors detected while turning a scenario description into live state
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    UnsortedBrackets { table: &'static str },
    CapitalGainsTiers { found: usize },
    NegativeBalance { account: String },
    InvalidBasis {
        account: String,
        basis: f64,
        balance: f64,
    },
    NoTaxableAccount,
    YearRange { start_year: i32, end_year: i32 },
    HistoricYearOutOfRange { year: i32, first: i32, last: i32 },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::UnsortedBrackets { table } => {
                write!(f, "{table} brackets must have ascending ceilings")
            }
            ConfigError::CapitalGainsTiers { found } => {
                write!(
                    f,
                    "capital gains table needs exactly two tiers, found {found}"
                )
            }
            ConfigError::NegativeBalance { account } => {
                write!(f, "account {account} has a negative opening balance")
            }
            ConfigError::InvalidBasis {
                account,
                basis,
                balance,
            } => write!(
                f,
                "account {account} has basis ${basis:.2} outside its balance ${balance:.2}"
            ),
            ConfigError::NoTaxableAccount => {
                write!(f, "lump sum payments need at least one taxable account")
            }
            ConfigError::YearRange {
                start_year,
                end_year,
            } => write!(f, "end year {end_year} is before start year {start_year}"),
            ConfigError::HistoricYearOutOfRange { year, first, last } => {
                write!(
                    f,
                    "historic year {year} outside available data ({first}-{last})"
                )
            }
        }
    }
}

impl std::error::Error for ConfigError {}

/// Conditions that end a simulation run early
#[derive(Debug, Clone, PartialEq)]
pub enum SimulationError {
    /// Every account group was drained before the month's expenses were met
    OutOfMoney { year: i32, month: u32, shortfall: f64 },
    /// Income sources paid more than the household needed for the month
    PensionExceedsIncome {
        year: i32,
        month: u32,
        pension: f64,
        needed: f64,
    },
    /// Last year's tax bill could not be covered
    TaxPaymentShortfall { year: i32, shortfall: f64 },
    /// The scenario handed to the driver is not runnable
    Config(ConfigError),
    Account(AccountError),
}

impl SimulationError {
    /// Calendar year the run stopped in, when the failure is tied to one
    pub fn year(&self) -> Option<i32> {
        match self {
            SimulationError::OutOfMoney { year, .. }
            | SimulationError::PensionExceedsIncome { year, .. }
            | SimulationError::TaxPaymentShortfall { year, .. } => Some(*year),
            SimulationError::Config(_) | SimulationError::Account(_) => None,
        }
    }
}

impl fmt::Display for SimulationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SimulationError::OutOfMoney {
                year,
                month,
                shortfall,
            } => write!(f, "out of money in {year}-{month:02}: short ${shortfall:.2}"),
            SimulationError::PensionExceedsIncome {
                year,
                month,
                pension,
                needed,
            } => write!(
                f,
                "pension payment ${pension:.2} is more than needed income ${needed:.2} in {year}-{month:02}"
            ),
            SimulationError::TaxPaymentShortfall { year, shortfall } => {
                write!(f, "could not pay taxes in {year}: short ${shortfall:.2}")
            }
            SimulationError::Config(e) => write!(f, "{e}"),
            SimulationError::Account(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for SimulationError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SimulationError::Config(e) => Some(e),
            SimulationError::Account(e) => Some(e),
            _ => None,
        }
    }
}

impl From<ConfigError> for SimulationError {
    fn from(err: ConfigError) -> Self {
        SimulationError::Config(err)
    }
}

impl From<AccountError> for SimulationError {
    fn from(err: AccountError) -> Self {
        SimulationError::Account(err)
    }
}

pub type Result<T> = std::result::Result<T, AccountError>;
