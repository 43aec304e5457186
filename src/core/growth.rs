use super::types::CompoundFrequency;

/// Year-end balances of a principal compounding at `annual_rate_pct`, with a
/// contribution added at the end of every compounding period.
///
/// Balances are rounded to whole dollars. Negative or non-finite inputs give
/// an empty projection.
pub fn compound_interest_totals(
    principal: f64,
    annual_rate_pct: f64,
    contribution_per_period: f64,
    years: u32,
    frequency: CompoundFrequency,
) -> Vec<f64> {
    if [principal, annual_rate_pct, contribution_per_period]
        .iter()
        .any(|v| !v.is_finite() || *v < 0.0)
    {
        return Vec::new();
    }

    let periods = frequency.periods_per_year();
    let rate_per_period = annual_rate_pct / 100.0 / periods as f64;

    let mut balance = principal;
    let mut totals = Vec::with_capacity(years as usize);
    for _ in 0..years {
        for _ in 0..periods {
            balance *= 1.0 + rate_per_period;
            balance += contribution_per_period;
        }
        totals.push(balance.round());
    }
    totals
}

/// Future value of a fixed monthly deposit with monthly compounding
/// (ordinary annuity). `annual_rate` is a fraction, e.g. 0.08.
pub fn future_value_monthly(monthly_amount: f64, annual_rate: f64, years: f64) -> f64 {
    if !(monthly_amount.is_finite() && annual_rate.is_finite() && years.is_finite()) {
        return 0.0;
    }
    if monthly_amount <= 0.0 || annual_rate <= 0.0 || years <= 0.0 {
        return 0.0;
    }

    let monthly_rate = annual_rate / 12.0;
    let months = years * 12.0;
    monthly_amount * (((1.0 + monthly_rate).powf(months) - 1.0) / monthly_rate)
}

/// First-year withdrawal from a portfolio at a given withdrawal rate.
pub fn annual_withdrawal(portfolio_value: f64, withdrawal_rate_pct: f64) -> f64 {
    if !portfolio_value.is_finite()
        || !withdrawal_rate_pct.is_finite()
        || portfolio_value < 0.0
        || withdrawal_rate_pct <= 0.0
    {
        return 0.0;
    }
    portfolio_value * (withdrawal_rate_pct / 100.0)
}
