use super::growth::future_value_monthly;
use super::types::{SavingsProjection, SavingsRow};

pub const MAX_SAVINGS_RATE_PCT: f64 = 25.0;
pub const MAX_SAVINGS_YEARS: u32 = 60;

/// A filled-in amount: parses to a finite number greater than zero.
pub fn is_amount_valid(amount: &str) -> bool {
    let trimmed = amount.trim();
    if trimmed.is_empty() {
        return false;
    }
    matches!(trimmed.parse::<f64>(), Ok(n) if n.is_finite() && n > 0.0)
}

/// Whether a partially typed amount may be accepted into a row: empty, or
/// digits with an optional decimal point followed by at most two digits.
pub fn is_amount_input_accepted(raw: &str) -> bool {
    if raw.is_empty() {
        return true;
    }
    let (whole, fraction) = match raw.split_once('.') {
        Some((whole, fraction)) => (whole, Some(fraction)),
        None => (raw, None),
    };
    if whole.is_empty() || !whole.bytes().all(|b| b.is_ascii_digit()) {
        return false;
    }
    match fraction {
        None => true,
        Some(fraction) => fraction.len() <= 2 && fraction.bytes().all(|b| b.is_ascii_digit()),
    }
}

/// A row blocks adding another when it is half filled or its amount is
/// invalid. Fully blank rows never block.
pub fn has_blocking_rows(rows: &[SavingsRow]) -> bool {
    rows.iter().any(|row| {
        let name = row.name.trim();
        let amount = row.amount.trim();
        if name.is_empty() && amount.is_empty() {
            return false;
        }
        if name.is_empty() || amount.is_empty() {
            return true;
        }
        !is_amount_valid(amount)
    })
}

pub fn total_monthly_savings(rows: &[SavingsRow]) -> f64 {
    rows.iter()
        .filter_map(|row| row.amount.trim().parse::<f64>().ok())
        .filter(|n| n.is_finite() && *n > 0.0)
        .sum()
}

/// Projects the monthly savings from every row forward at `annual_rate_pct`.
///
/// The rate must be in (0, 25] and the horizon in 1..=60 years; otherwise only
/// the monthly total is reported.
pub fn project_savings(rows: &[SavingsRow], annual_rate_pct: f64, years: u32) -> SavingsProjection {
    let monthly_total = total_monthly_savings(rows);
    let rate_ok = annual_rate_pct.is_finite()
        && annual_rate_pct > 0.0
        && annual_rate_pct <= MAX_SAVINGS_RATE_PCT;
    let years_ok = (1..=MAX_SAVINGS_YEARS).contains(&years);

    if !(monthly_total > 0.0 && rate_ok && years_ok) {
        return SavingsProjection {
            monthly_total,
            ..SavingsProjection::default()
        };
    }

    let future_value = future_value_monthly(monthly_total, annual_rate_pct / 100.0, years as f64);
    let total_contributed = monthly_total * 12.0 * years as f64;
    SavingsProjection {
        monthly_total,
        future_value,
        total_contributed,
        growth: future_value - total_contributed,
    }
}
