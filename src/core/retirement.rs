use super::types::{CalcError, DesiredIncome, TargetPortfolioInput, TargetPortfolioResult};

/// Portfolio needed at retirement to fund a desired income at a fixed
/// withdrawal rate.
///
/// Any invalid input (non-positive withdrawal rate, target year before the
/// retirement year, non-finite values) or a non-finite result yields the
/// all-zero [`TargetPortfolioResult`]. Use [`try_compute_target_portfolio`]
/// when the reason matters.
pub fn compute_target_portfolio(input: &TargetPortfolioInput) -> TargetPortfolioResult {
    try_compute_target_portfolio(input).unwrap_or_default()
}

pub fn try_compute_target_portfolio(
    input: &TargetPortfolioInput,
) -> Result<TargetPortfolioResult, CalcError> {
    validate_input(input)?;

    let w = input.withdrawal_rate_pct / 100.0;
    let i = input.inflation_pct / 100.0;
    let grow = |years: i64| inflation_factor(i, years);

    let retirement = i64::from(input.retirement_year);
    let target = i64::from(input.target_year);
    let today = i64::from(input.today_year);

    let result = match input.income {
        DesiredIncome::Target(income) => {
            let year1_withdrawal = income / grow(target - retirement);
            TargetPortfolioResult {
                year1_withdrawal,
                portfolio_needed: year1_withdrawal / w,
                target_year_income: income,
            }
        }
        DesiredIncome::Today(income) => {
            let year1_withdrawal = income * grow(retirement - today);
            // Target year only moves the projected income, never the portfolio.
            TargetPortfolioResult {
                year1_withdrawal,
                portfolio_needed: year1_withdrawal / w,
                target_year_income: income * grow(target - today),
            }
        }
    };

    if !result.year1_withdrawal.is_finite()
        || !result.portfolio_needed.is_finite()
        || !result.target_year_income.is_finite()
    {
        return Err(CalcError::NonFiniteResult);
    }

    Ok(result)
}

/// `(1 + rate)^years`, exactly 1 when either the rate or the span is zero.
pub fn inflation_factor(rate: f64, years: i64) -> f64 {
    if rate == 0.0 || years == 0 {
        return 1.0;
    }
    (1.0 + rate).powf(years as f64)
}

fn validate_input(input: &TargetPortfolioInput) -> Result<(), CalcError> {
    if input.withdrawal_rate_pct <= 0.0 {
        return Err(CalcError::NonPositiveWithdrawalRate);
    }
    if input.target_year < input.retirement_year {
        return Err(CalcError::TargetBeforeRetirement);
    }
    for (name, value) in [
        ("desired income", input.income.amount()),
        ("withdrawal rate", input.withdrawal_rate_pct),
        ("inflation rate", input.inflation_pct),
    ] {
        if !value.is_finite() {
            return Err(CalcError::NonFinite(name));
        }
    }
    Ok(())
}
