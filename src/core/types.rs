use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Which year's purchasing power a desired income is expressed in.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DollarsMode {
    Today,
    Target,
}

/// A desired annual income, tagged with the dollars it is measured in.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum DesiredIncome {
    /// Purchasing power at the calculation's `today_year`.
    Today(f64),
    /// Nominal dollars in the target year.
    Target(f64),
}

impl DesiredIncome {
    pub fn new(mode: DollarsMode, amount: f64) -> Self {
        match mode {
            DollarsMode::Today => DesiredIncome::Today(amount),
            DollarsMode::Target => DesiredIncome::Target(amount),
        }
    }

    pub fn amount(self) -> f64 {
        match self {
            DesiredIncome::Today(amount) | DesiredIncome::Target(amount) => amount,
        }
    }

    pub fn mode(self) -> DollarsMode {
        match self {
            DesiredIncome::Today(_) => DollarsMode::Today,
            DesiredIncome::Target(_) => DollarsMode::Target,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TargetPortfolioInput {
    pub income: DesiredIncome,
    /// Percent of the portfolio withdrawn in the first retirement year, e.g. 4.
    pub withdrawal_rate_pct: f64,
    /// Annual inflation in percent, e.g. 3.
    pub inflation_pct: f64,
    pub today_year: i32,
    pub retirement_year: i32,
    pub target_year: i32,
}

/// Outputs of the target portfolio calculation. The all-zero value doubles as
/// the "invalid input" sentinel.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TargetPortfolioResult {
    /// Withdrawal in the retirement year's nominal dollars.
    pub year1_withdrawal: f64,
    /// Balance required at retirement.
    pub portfolio_needed: f64,
    /// Desired income in target-year nominal dollars.
    pub target_year_income: f64,
}

impl TargetPortfolioResult {
    pub fn is_zero(&self) -> bool {
        self.year1_withdrawal == 0.0
            && self.portfolio_needed == 0.0
            && self.target_year_income == 0.0
    }
}

#[derive(Debug, Clone, Copy, Error, PartialEq)]
pub enum CalcError {
    #[error("withdrawal rate must be > 0")]
    NonPositiveWithdrawalRate,
    #[error("target year must be >= retirement year")]
    TargetBeforeRetirement,
    #[error("{0} must be finite")]
    NonFinite(&'static str),
    #[error("calculation produced a non-finite result")]
    NonFiniteResult,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CompoundFrequency {
    Daily,
    Monthly,
    Annually,
}

impl CompoundFrequency {
    pub fn periods_per_year(self) -> u32 {
        match self {
            CompoundFrequency::Daily => 365,
            CompoundFrequency::Monthly => 12,
            CompoundFrequency::Annually => 1,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct SavingsRow {
    pub name: String,
    pub amount: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SavingsProjection {
    pub monthly_total: f64,
    pub future_value: f64,
    pub total_contributed: f64,
    pub growth: f64,
}
