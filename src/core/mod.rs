mod growth;
mod retirement;
mod savings;
mod types;

pub use growth::{annual_withdrawal, compound_interest_totals, future_value_monthly};
pub use retirement::{compute_target_portfolio, inflation_factor, try_compute_target_portfolio};
pub use savings::{
    MAX_SAVINGS_RATE_PCT, MAX_SAVINGS_YEARS, has_blocking_rows, is_amount_input_accepted,
    is_amount_valid, project_savings, total_monthly_savings,
};
pub use types::{
    CalcError, CompoundFrequency, DesiredIncome, DollarsMode, SavingsProjection, SavingsRow,
    TargetPortfolioInput, TargetPortfolioResult,
};
