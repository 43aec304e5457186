use axum::{
    Router,
    extract::{Json, Query},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use chrono::Datelike;
use clap::{Args, Parser, Subcommand, ValueEnum};
use serde::{Deserialize, Serialize};
use std::ffi::OsString;
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tracing::{info, warn};

use crate::core::{
    CompoundFrequency, DesiredIncome, DollarsMode, SavingsProjection, SavingsRow,
    TargetPortfolioInput, TargetPortfolioResult, annual_withdrawal, compound_interest_totals,
    has_blocking_rows, project_savings, try_compute_target_portfolio, MAX_SAVINGS_RATE_PCT,
    MAX_SAVINGS_YEARS,
};

const MIN_YEAR: i32 = 1900;
const MAX_YEAR: i32 = 2120;
const MIN_WITHDRAWAL_RATE_PCT: f64 = 0.1;
const MAX_INFLATION_PCT: f64 = 50.0;
const DEFAULT_PORT: u16 = 8080;

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
enum CliDollarsMode {
    Today,
    Target,
}

impl From<CliDollarsMode> for DollarsMode {
    fn from(value: CliDollarsMode) -> Self {
        match value {
            CliDollarsMode::Today => DollarsMode::Today,
            CliDollarsMode::Target => DollarsMode::Target,
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
enum CliFrequency {
    Daily,
    Monthly,
    Annually,
}

impl From<CliFrequency> for CompoundFrequency {
    fn from(value: CliFrequency) -> Self {
        match value {
            CliFrequency::Daily => CompoundFrequency::Daily,
            CliFrequency::Monthly => CompoundFrequency::Monthly,
            CliFrequency::Annually => CompoundFrequency::Annually,
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Deserialize)]
#[serde(rename_all = "kebab-case")]
enum ApiDollarsMode {
    #[serde(alias = "todays", alias = "todayDollars", alias = "today_dollars")]
    Today,
    #[serde(alias = "targetYear", alias = "target_year", alias = "target-year")]
    Target,
}

impl From<ApiDollarsMode> for CliDollarsMode {
    fn from(value: ApiDollarsMode) -> Self {
        match value {
            ApiDollarsMode::Today => CliDollarsMode::Today,
            ApiDollarsMode::Target => CliDollarsMode::Target,
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Deserialize)]
#[serde(rename_all = "kebab-case")]
enum ApiFrequency {
    Daily,
    Monthly,
    #[serde(alias = "annual", alias = "yearly")]
    Annually,
}

impl From<ApiFrequency> for CliFrequency {
    fn from(value: ApiFrequency) -> Self {
        match value {
            ApiFrequency::Daily => CliFrequency::Daily,
            ApiFrequency::Monthly => CliFrequency::Monthly,
            ApiFrequency::Annually => CliFrequency::Annually,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct TargetPortfolioPayload {
    #[serde(alias = "dollarsMode")]
    mode: Option<ApiDollarsMode>,
    #[serde(alias = "desiredAnnualIncome")]
    desired_income: Option<f64>,
    withdrawal_rate_pct: Option<f64>,
    inflation_pct: Option<f64>,
    today_year: Option<i32>,
    retirement_year: Option<i32>,
    target_year: Option<i32>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct AnnualWithdrawalPayload {
    portfolio_value: Option<f64>,
    withdrawal_rate_pct: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct CompoundInterestPayload {
    initial_investment: Option<f64>,
    annual_rate_of_return: Option<f64>,
    contribution_amount: Option<f64>,
    contribution_frequency: Option<ApiFrequency>,
    years_invested: Option<u32>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct SavingsPayload {
    rows: Vec<SavingsRow>,
    #[serde(alias = "rate")]
    rate_pct: Option<f64>,
    years: Option<u32>,
}

#[derive(Parser, Debug)]
#[command(
    name = "nestegg",
    about = "Retirement calculators: target portfolio, annual withdrawal, compound growth and savings from cuts"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Serve the calculators as a JSON HTTP API
    Serve {
        #[arg(default_value_t = DEFAULT_PORT)]
        port: u16,
    },
    /// Portfolio needed at retirement for a desired income
    TargetPortfolio(TargetPortfolioArgs),
    /// First-year withdrawal from a portfolio
    AnnualWithdrawal(AnnualWithdrawalArgs),
    /// Year-end balances with periodic contributions
    CompoundInterest(CompoundInterestArgs),
    /// Future value of monthly savings from spending cuts
    SavingsProjection(SavingsArgs),
}

#[derive(Args, Debug, Clone)]
struct TargetPortfolioArgs {
    #[arg(
        long,
        value_enum,
        default_value_t = CliDollarsMode::Today,
        help = "Whether --desired-income is in today's dollars or target-year dollars"
    )]
    mode: CliDollarsMode,
    #[arg(long, default_value_t = 80_000.0, help = "Desired annual income")]
    desired_income: f64,
    #[arg(
        long,
        default_value_t = 4.0,
        help = "First-year withdrawal rate in percent"
    )]
    withdrawal_rate: f64,
    #[arg(long, default_value_t = 3.0, help = "Annual inflation in percent")]
    inflation: f64,
    #[arg(long, help = "Calendar year today's dollars refer to; defaults to the current year")]
    today_year: Option<i32>,
    #[arg(long)]
    retirement_year: i32,
    #[arg(long, help = "Year the desired income is measured in; defaults to --retirement-year")]
    target_year: Option<i32>,
}

#[derive(Args, Debug, Clone)]
struct AnnualWithdrawalArgs {
    #[arg(long, default_value_t = 1_000_000.0)]
    portfolio_value: f64,
    #[arg(long, default_value_t = 4.0, help = "Withdrawal rate in percent")]
    withdrawal_rate: f64,
}

#[derive(Args, Debug, Clone)]
struct CompoundInterestArgs {
    #[arg(long, default_value_t = 10_000.0)]
    initial_investment: f64,
    #[arg(long, default_value_t = 8.0, help = "Annual rate of return in percent")]
    annual_rate: f64,
    #[arg(long, default_value_t = 0.0, help = "Contribution per compounding period")]
    contribution: f64,
    #[arg(long, value_enum, default_value_t = CliFrequency::Annually)]
    frequency: CliFrequency,
    #[arg(long, default_value_t = 10)]
    years: u32,
}

#[derive(Args, Debug, Clone)]
struct SavingsArgs {
    #[arg(
        long = "cut",
        value_parser = parse_savings_row,
        help = "Monthly saving as NAME=AMOUNT, repeatable"
    )]
    rows: Vec<SavingsRow>,
    #[arg(long, default_value_t = 8.0, help = "Annual return in percent")]
    rate: f64,
    #[arg(long, default_value_t = 10)]
    years: u32,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct TargetPortfolioResponse {
    mode: DollarsMode,
    desired_income: f64,
    withdrawal_rate_pct: f64,
    inflation_pct: f64,
    today_year: i32,
    retirement_year: i32,
    target_year: i32,
    #[serde(flatten)]
    result: TargetPortfolioResult,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct AnnualWithdrawalResponse {
    portfolio_value: f64,
    withdrawal_rate_pct: f64,
    annual_withdrawal: f64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct YearTotal {
    year: u32,
    total: f64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CompoundInterestResponse {
    frequency: CompoundFrequency,
    final_balance: f64,
    total_contributed: f64,
    yearly_totals: Vec<YearTotal>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SavingsResponse {
    rate_pct: f64,
    years: u32,
    #[serde(flatten)]
    projection: SavingsProjection,
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

fn parse_savings_row(raw: &str) -> Result<SavingsRow, String> {
    let (name, amount) = raw
        .rsplit_once('=')
        .ok_or_else(|| format!("expected NAME=AMOUNT, got {raw:?}"))?;
    Ok(SavingsRow {
        name: name.to_string(),
        amount: amount.to_string(),
    })
}

fn current_year() -> i32 {
    chrono::Utc::now().year()
}

fn build_target_portfolio_input(args: TargetPortfolioArgs) -> Result<TargetPortfolioInput, String> {
    if !args.desired_income.is_finite() || args.desired_income < 0.0 {
        return Err("--desired-income must be >= 0".to_string());
    }

    if !(MIN_WITHDRAWAL_RATE_PCT..=100.0).contains(&args.withdrawal_rate) {
        return Err(format!(
            "--withdrawal-rate must be between {MIN_WITHDRAWAL_RATE_PCT} and 100"
        ));
    }

    if !(0.0..=MAX_INFLATION_PCT).contains(&args.inflation) {
        return Err(format!("--inflation must be between 0 and {MAX_INFLATION_PCT}"));
    }

    let target_year = args.target_year.unwrap_or(args.retirement_year);
    for (name, year) in [
        ("--retirement-year", args.retirement_year),
        ("--target-year", target_year),
    ] {
        if !(MIN_YEAR..=MAX_YEAR).contains(&year) {
            return Err(format!("{name} must be between {MIN_YEAR} and {MAX_YEAR}"));
        }
    }

    if target_year < args.retirement_year {
        return Err("--target-year must be >= --retirement-year".to_string());
    }

    Ok(TargetPortfolioInput {
        income: DesiredIncome::new(args.mode.into(), args.desired_income),
        withdrawal_rate_pct: args.withdrawal_rate,
        inflation_pct: args.inflation,
        today_year: args.today_year.unwrap_or_else(current_year),
        retirement_year: args.retirement_year,
        target_year,
    })
}

fn build_annual_withdrawal_inputs(args: &AnnualWithdrawalArgs) -> Result<(f64, f64), String> {
    if !args.portfolio_value.is_finite() || args.portfolio_value < 0.0 {
        return Err("--portfolio-value must be >= 0".to_string());
    }
    if !(MIN_WITHDRAWAL_RATE_PCT..=100.0).contains(&args.withdrawal_rate) {
        return Err(format!(
            "--withdrawal-rate must be between {MIN_WITHDRAWAL_RATE_PCT} and 100"
        ));
    }
    Ok((args.portfolio_value, args.withdrawal_rate))
}

fn validate_compound_interest(args: &CompoundInterestArgs) -> Result<(), String> {
    if !args.initial_investment.is_finite() || args.initial_investment < 0.0 {
        return Err("--initial-investment must be >= 0".to_string());
    }
    if !(0.0..=100.0).contains(&args.annual_rate) {
        return Err("--annual-rate must be between 0 and 100".to_string());
    }
    if !args.contribution.is_finite() || args.contribution < 0.0 {
        return Err("--contribution must be >= 0".to_string());
    }
    if args.years == 0 {
        return Err("--years must be >= 1".to_string());
    }
    Ok(())
}

fn validate_savings(args: &SavingsArgs) -> Result<(), String> {
    if has_blocking_rows(&args.rows) {
        return Err("every --cut needs a name and an amount > 0".to_string());
    }
    if !(args.rate > 0.0 && args.rate <= MAX_SAVINGS_RATE_PCT) {
        return Err(format!("--rate must be > 0 and <= {MAX_SAVINGS_RATE_PCT}"));
    }
    if !(1..=MAX_SAVINGS_YEARS).contains(&args.years) {
        return Err(format!("--years must be between 1 and {MAX_SAVINGS_YEARS}"));
    }
    Ok(())
}

fn run_target_portfolio(args: TargetPortfolioArgs) -> Result<TargetPortfolioResponse, String> {
    let input = build_target_portfolio_input(args)?;
    let result = try_compute_target_portfolio(&input).map_err(|e| e.to_string())?;
    Ok(TargetPortfolioResponse {
        mode: input.income.mode(),
        desired_income: input.income.amount(),
        withdrawal_rate_pct: input.withdrawal_rate_pct,
        inflation_pct: input.inflation_pct,
        today_year: input.today_year,
        retirement_year: input.retirement_year,
        target_year: input.target_year,
        result,
    })
}

fn run_annual_withdrawal(args: AnnualWithdrawalArgs) -> Result<AnnualWithdrawalResponse, String> {
    let (portfolio_value, withdrawal_rate_pct) = build_annual_withdrawal_inputs(&args)?;
    Ok(AnnualWithdrawalResponse {
        portfolio_value,
        withdrawal_rate_pct,
        annual_withdrawal: annual_withdrawal(portfolio_value, withdrawal_rate_pct),
    })
}

fn run_compound_interest(args: CompoundInterestArgs) -> Result<CompoundInterestResponse, String> {
    validate_compound_interest(&args)?;
    let frequency = CompoundFrequency::from(args.frequency);
    let totals = compound_interest_totals(
        args.initial_investment,
        args.annual_rate,
        args.contribution,
        args.years,
        frequency,
    );
    let total_contributed = args.initial_investment
        + args.contribution * frequency.periods_per_year() as f64 * args.years as f64;
    Ok(CompoundInterestResponse {
        frequency,
        final_balance: totals.last().copied().unwrap_or(args.initial_investment),
        total_contributed,
        yearly_totals: totals
            .into_iter()
            .zip(1..)
            .map(|(total, year)| YearTotal { year, total })
            .collect(),
    })
}

fn run_savings_projection(args: SavingsArgs) -> Result<SavingsResponse, String> {
    validate_savings(&args)?;
    Ok(SavingsResponse {
        rate_pct: args.rate,
        years: args.years,
        projection: project_savings(&args.rows, args.rate, args.years),
    })
}

/// Parses command-line arguments and runs the selected calculator, printing
/// its JSON result, or starts the HTTP server.
pub async fn run_cli<I, T>(args: I) -> Result<(), String>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let cli = Cli::parse_from(args);
    let output = match cli.command {
        Command::Serve { port } => {
            return run_http_server(port)
                .await
                .map_err(|e| format!("Server error: {e}"));
        }
        Command::TargetPortfolio(args) => to_json(&run_target_portfolio(args)?),
        Command::AnnualWithdrawal(args) => to_json(&run_annual_withdrawal(args)?),
        Command::CompoundInterest(args) => to_json(&run_compound_interest(args)?),
        Command::SavingsProjection(args) => to_json(&run_savings_projection(args)?),
    }?;
    println!("{output}");
    Ok(())
}

fn to_json<T: Serialize>(value: &T) -> Result<String, String> {
    serde_json::to_string_pretty(value).map_err(|e| format!("Failed to serialize result: {e}"))
}

pub async fn run_http_server(port: u16) -> std::io::Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = TcpListener::bind(addr).await?;
    info!(%addr, "nestegg HTTP API listening");

    axum::serve(listener, router()).await
}

fn router() -> Router {
    Router::new()
        .route(
            "/api/target-portfolio",
            get(target_portfolio_get_handler).post(target_portfolio_post_handler),
        )
        .route(
            "/api/annual-withdrawal",
            get(annual_withdrawal_get_handler).post(annual_withdrawal_post_handler),
        )
        .route(
            "/api/compound-interest",
            get(compound_interest_get_handler).post(compound_interest_post_handler),
        )
        .route("/api/savings-projection", post(savings_post_handler))
        .fallback(not_found_handler)
}

async fn not_found_handler() -> Response {
    error_response(StatusCode::NOT_FOUND, "Not found")
}

async fn target_portfolio_get_handler(Query(payload): Query<TargetPortfolioPayload>) -> Response {
    target_portfolio_handler_impl(payload)
}

async fn target_portfolio_post_handler(Json(payload): Json<TargetPortfolioPayload>) -> Response {
    target_portfolio_handler_impl(payload)
}

async fn annual_withdrawal_get_handler(Query(payload): Query<AnnualWithdrawalPayload>) -> Response {
    annual_withdrawal_handler_impl(payload)
}

async fn annual_withdrawal_post_handler(Json(payload): Json<AnnualWithdrawalPayload>) -> Response {
    annual_withdrawal_handler_impl(payload)
}

async fn compound_interest_get_handler(Query(payload): Query<CompoundInterestPayload>) -> Response {
    compound_interest_handler_impl(payload)
}

async fn compound_interest_post_handler(Json(payload): Json<CompoundInterestPayload>) -> Response {
    compound_interest_handler_impl(payload)
}

async fn savings_post_handler(Json(payload): Json<SavingsPayload>) -> Response {
    respond("/api/savings-projection", run_savings_projection(savings_args_from_payload(payload)))
}

fn target_portfolio_handler_impl(payload: TargetPortfolioPayload) -> Response {
    respond(
        "/api/target-portfolio",
        run_target_portfolio(target_portfolio_args_from_payload(payload)),
    )
}

fn annual_withdrawal_handler_impl(payload: AnnualWithdrawalPayload) -> Response {
    respond(
        "/api/annual-withdrawal",
        run_annual_withdrawal(annual_withdrawal_args_from_payload(payload)),
    )
}

fn compound_interest_handler_impl(payload: CompoundInterestPayload) -> Response {
    respond(
        "/api/compound-interest",
        run_compound_interest(compound_interest_args_from_payload(payload)),
    )
}

fn respond<T: Serialize>(route: &'static str, result: Result<T, String>) -> Response {
    match result {
        Ok(body) => json_response(StatusCode::OK, body),
        Err(msg) => {
            warn!(route, error = %msg, "rejected request");
            error_response(StatusCode::BAD_REQUEST, &msg)
        }
    }
}

fn json_response<T: Serialize>(status: StatusCode, body: T) -> Response {
    let mut response = (status, Json(body)).into_response();
    response.headers_mut().insert(
        header::CACHE_CONTROL,
        header::HeaderValue::from_static("no-store"),
    );
    response
}

fn error_response(status: StatusCode, msg: &str) -> Response {
    json_response(
        status,
        ErrorResponse {
            error: msg.to_string(),
        },
    )
}

fn default_target_portfolio_args() -> TargetPortfolioArgs {
    TargetPortfolioArgs {
        mode: CliDollarsMode::Today,
        desired_income: 80_000.0,
        withdrawal_rate: 4.0,
        inflation: 3.0,
        today_year: None,
        retirement_year: current_year() + 10,
        target_year: None,
    }
}

fn default_annual_withdrawal_args() -> AnnualWithdrawalArgs {
    AnnualWithdrawalArgs {
        portfolio_value: 1_000_000.0,
        withdrawal_rate: 4.0,
    }
}

fn default_compound_interest_args() -> CompoundInterestArgs {
    CompoundInterestArgs {
        initial_investment: 10_000.0,
        annual_rate: 8.0,
        contribution: 0.0,
        frequency: CliFrequency::Annually,
        years: 10,
    }
}

fn target_portfolio_args_from_payload(payload: TargetPortfolioPayload) -> TargetPortfolioArgs {
    let mut args = default_target_portfolio_args();

    if let Some(v) = payload.mode {
        args.mode = CliDollarsMode::from(v);
    }
    if let Some(v) = payload.desired_income {
        args.desired_income = v;
    }
    if let Some(v) = payload.withdrawal_rate_pct {
        args.withdrawal_rate = v;
    }
    if let Some(v) = payload.inflation_pct {
        args.inflation = v;
    }
    if let Some(v) = payload.today_year {
        args.today_year = Some(v);
    }
    if let Some(v) = payload.retirement_year {
        args.retirement_year = v;
    }
    if let Some(v) = payload.target_year {
        args.target_year = Some(v);
    }

    args
}

fn annual_withdrawal_args_from_payload(payload: AnnualWithdrawalPayload) -> AnnualWithdrawalArgs {
    let mut args = default_annual_withdrawal_args();
    if let Some(v) = payload.portfolio_value {
        args.portfolio_value = v;
    }
    if let Some(v) = payload.withdrawal_rate_pct {
        args.withdrawal_rate = v;
    }
    args
}

fn compound_interest_args_from_payload(payload: CompoundInterestPayload) -> CompoundInterestArgs {
    let mut args = default_compound_interest_args();
    if let Some(v) = payload.initial_investment {
        args.initial_investment = v;
    }
    if let Some(v) = payload.annual_rate_of_return {
        args.annual_rate = v;
    }
    if let Some(v) = payload.contribution_amount {
        args.contribution = v;
    }
    if let Some(v) = payload.contribution_frequency {
        args.frequency = CliFrequency::from(v);
    }
    if let Some(v) = payload.years_invested {
        args.years = v;
    }
    args
}

fn savings_args_from_payload(payload: SavingsPayload) -> SavingsArgs {
    SavingsArgs {
        rows: payload.rows,
        rate: payload.rate_pct.unwrap_or(8.0),
        years: payload.years.unwrap_or(10),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-6;

    fn assert_approx(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() <= EPS,
            "expected {expected}, got {actual}"
        );
    }

    fn sample_target_args() -> TargetPortfolioArgs {
        TargetPortfolioArgs {
            today_year: Some(2025),
            retirement_year: 2035,
            target_year: Some(2040),
            ..default_target_portfolio_args()
        }
    }

    fn target_payload_from_json(json: &str) -> Result<TargetPortfolioArgs, String> {
        let payload = serde_json::from_str::<TargetPortfolioPayload>(json)
            .map_err(|e| format!("Invalid API JSON payload: {e}"))?;
        Ok(target_portfolio_args_from_payload(payload))
    }

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body should be readable");
        serde_json::from_slice(&bytes).expect("body should be JSON")
    }

    #[test]
    fn build_target_input_defaults_target_year_to_retirement_year() {
        let mut args = sample_target_args();
        args.target_year = None;

        let input = build_target_portfolio_input(args).expect("valid inputs");
        assert_eq!(input.target_year, 2035);
        assert_eq!(input.today_year, 2025);
    }

    #[test]
    fn build_target_input_uses_current_year_when_today_missing() {
        let mut args = sample_target_args();
        args.today_year = None;

        let input = build_target_portfolio_input(args).expect("valid inputs");
        assert_eq!(input.today_year, current_year());
    }

    #[test]
    fn build_target_input_rejects_target_before_retirement() {
        let mut args = sample_target_args();
        args.target_year = Some(2030);

        let err = build_target_portfolio_input(args).expect_err("must reject year order");
        assert!(err.contains("--target-year"));
    }

    #[test]
    fn build_target_input_rejects_out_of_range_fields() {
        let mut args = sample_target_args();
        args.withdrawal_rate = 0.05;
        let err = build_target_portfolio_input(args).expect_err("rate too low");
        assert!(err.contains("--withdrawal-rate"));

        let mut args = sample_target_args();
        args.inflation = 51.0;
        let err = build_target_portfolio_input(args).expect_err("inflation too high");
        assert!(err.contains("--inflation"));

        let mut args = sample_target_args();
        args.desired_income = f64::NAN;
        let err = build_target_portfolio_input(args).expect_err("income must be finite");
        assert!(err.contains("--desired-income"));

        let mut args = sample_target_args();
        args.retirement_year = 1899;
        let err = build_target_portfolio_input(args).expect_err("year out of range");
        assert!(err.contains("--retirement-year"));

        let mut args = sample_target_args();
        args.target_year = Some(2121);
        let err = build_target_portfolio_input(args).expect_err("year out of range");
        assert!(err.contains("--target-year"));
    }

    #[test]
    fn run_target_portfolio_matches_calculator() {
        let mut args = sample_target_args();
        args.mode = CliDollarsMode::Target;

        let response = run_target_portfolio(args).expect("valid request");
        assert_eq!(response.mode, DollarsMode::Target);
        assert_eq!(response.result.year1_withdrawal.round(), 69_009.0);
        assert_eq!(response.result.portfolio_needed.round(), 1_725_218.0);
        assert_approx(response.result.target_year_income, 80_000.0);
    }

    #[test]
    fn target_payload_parses_web_keys() {
        let json = r#"{
          "dollarsMode": "target",
          "desiredAnnualIncome": 95000,
          "withdrawalRatePct": 3.5,
          "inflationPct": 2.5,
          "todayYear": 2024,
          "retirementYear": 2050,
          "targetYear": 2055
        }"#;
        let args = target_payload_from_json(json).expect("json should parse");
        let input = build_target_portfolio_input(args).expect("valid inputs");

        assert_eq!(input.income, DesiredIncome::Target(95_000.0));
        assert_approx(input.withdrawal_rate_pct, 3.5);
        assert_approx(input.inflation_pct, 2.5);
        assert_eq!(input.today_year, 2024);
        assert_eq!(input.retirement_year, 2050);
        assert_eq!(input.target_year, 2055);
    }

    #[test]
    fn target_payload_accepts_mode_aliases() {
        let args = target_payload_from_json(r#"{"mode": "target-year"}"#).expect("json");
        assert_eq!(args.mode, CliDollarsMode::Target);
        let args = target_payload_from_json(r#"{"mode": "today"}"#).expect("json");
        assert_eq!(args.mode, CliDollarsMode::Today);
        assert!(target_payload_from_json(r#"{"mode": "yesterday"}"#).is_err());
    }

    #[test]
    fn target_response_serialization_contains_expected_fields() {
        let response = run_target_portfolio(sample_target_args()).expect("valid request");
        let json = serde_json::to_string(&response).expect("response should serialize");
        assert!(json.contains("\"mode\":\"today\""));
        assert!(json.contains("\"year1Withdrawal\""));
        assert!(json.contains("\"portfolioNeeded\""));
        assert!(json.contains("\"targetYearIncome\""));
        assert!(json.contains("\"retirementYear\":2035"));
    }

    #[test]
    fn annual_withdrawal_validation() {
        let response = run_annual_withdrawal(default_annual_withdrawal_args()).expect("valid");
        assert_approx(response.annual_withdrawal, 40_000.0);

        let mut args = default_annual_withdrawal_args();
        args.portfolio_value = -1.0;
        let err = run_annual_withdrawal(args).expect_err("negative portfolio");
        assert!(err.contains("--portfolio-value"));

        let mut args = default_annual_withdrawal_args();
        args.withdrawal_rate = 101.0;
        let err = run_annual_withdrawal(args).expect_err("rate too high");
        assert!(err.contains("--withdrawal-rate"));
    }

    #[test]
    fn compound_interest_reports_yearly_totals() {
        let response = run_compound_interest(default_compound_interest_args()).expect("valid");
        assert_eq!(response.yearly_totals.len(), 10);
        assert_eq!(response.yearly_totals[0].year, 1);
        assert_eq!(response.yearly_totals[0].total, 10_800.0);
        assert_eq!(response.final_balance, 21_589.0);
        assert_approx(response.total_contributed, 10_000.0);
    }

    #[test]
    fn compound_interest_payload_overlays_defaults() {
        let payload = serde_json::from_str::<CompoundInterestPayload>(
            r#"{"contributionAmount": 100, "contributionFrequency": "monthly", "yearsInvested": 2, "annualRateOfReturn": 0, "initialInvestment": 0}"#,
        )
        .expect("json should parse");
        let response =
            run_compound_interest(compound_interest_args_from_payload(payload)).expect("valid");
        assert_eq!(response.frequency, CompoundFrequency::Monthly);
        assert_eq!(response.final_balance, 2_400.0);
        assert_approx(response.total_contributed, 2_400.0);
    }

    #[test]
    fn compound_interest_rejects_zero_years() {
        let mut args = default_compound_interest_args();
        args.years = 0;
        let err = run_compound_interest(args).expect_err("must reject zero years");
        assert!(err.contains("--years"));
    }

    #[test]
    fn savings_validation_and_projection() {
        let args = SavingsArgs {
            rows: vec![
                parse_savings_row("Coffee=60").expect("row"),
                parse_savings_row("Apps=40").expect("row"),
            ],
            rate: 12.0,
            years: 1,
        };
        let response = run_savings_projection(args).expect("valid");
        assert_approx(response.projection.monthly_total, 100.0);
        assert_approx(response.projection.total_contributed, 1_200.0);

        let args = SavingsArgs {
            rows: vec![parse_savings_row("Coffee=").expect("row")],
            rate: 8.0,
            years: 10,
        };
        let err = run_savings_projection(args).expect_err("half-filled row");
        assert!(err.contains("--cut"));

        let args = SavingsArgs {
            rows: vec![],
            rate: 30.0,
            years: 10,
        };
        let err = run_savings_projection(args).expect_err("rate too high");
        assert!(err.contains("--rate"));
    }

    #[test]
    fn parse_savings_row_splits_on_last_equals() {
        let row = parse_savings_row("a=b=12.5").expect("row");
        assert_eq!(row.name, "a=b");
        assert_eq!(row.amount, "12.5");
        assert!(parse_savings_row("no-amount").is_err());
    }

    #[test]
    fn cli_parses_target_portfolio_subcommand() {
        let cli = Cli::try_parse_from([
            "nestegg",
            "target-portfolio",
            "--mode",
            "target",
            "--desired-income",
            "80000",
            "--retirement-year",
            "2035",
            "--target-year",
            "2040",
        ])
        .expect("cli should parse");
        let Command::TargetPortfolio(args) = cli.command else {
            panic!("expected target-portfolio subcommand");
        };
        assert_eq!(args.mode, CliDollarsMode::Target);
        assert_eq!(args.target_year, Some(2040));
        assert_approx(args.withdrawal_rate, 4.0);
    }

    #[tokio::test]
    async fn target_portfolio_handler_returns_json_with_no_store() {
        let payload = TargetPortfolioPayload {
            mode: Some(ApiDollarsMode::Today),
            desired_income: Some(80_000.0),
            today_year: Some(2025),
            retirement_year: Some(2035),
            target_year: Some(2040),
            ..TargetPortfolioPayload::default()
        };
        let response = target_portfolio_handler_impl(payload);
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers().get(header::CACHE_CONTROL).map(|v| v.as_bytes()),
            Some(&b"no-store"[..])
        );

        let body = body_json(response).await;
        let portfolio = body["portfolioNeeded"].as_f64().expect("number");
        assert_eq!(portfolio.round(), 2_687_833.0);
        assert_eq!(body["targetYearIncome"].as_f64().map(f64::round), Some(124_637.0));
    }

    #[tokio::test]
    async fn target_portfolio_handler_rejects_invalid_years() {
        let payload = TargetPortfolioPayload {
            retirement_year: Some(2040),
            target_year: Some(2035),
            ..TargetPortfolioPayload::default()
        };
        let response = target_portfolio_handler_impl(payload);
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert!(
            body["error"]
                .as_str()
                .is_some_and(|msg| msg.contains("--target-year"))
        );
    }
}
