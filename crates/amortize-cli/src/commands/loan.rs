use clap::{Args, ValueEnum};
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::Value;

use amortize_core::amortization::{build_schedule, ScheduleInput};
use amortize_core::annuity::{resolve_parameters, ResolveInput, UnknownParameter};
use amortize_core::rates::annual_to_monthly;

use crate::input;

/// CLI-facing selector for the parameter to solve.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum SolveFor {
    Principal,
    Term,
    Payment,
}

impl From<SolveFor> for UnknownParameter {
    fn from(s: SolveFor) -> Self {
        match s {
            SolveFor::Principal => UnknownParameter::Principal,
            SolveFor::Term => UnknownParameter::Term,
            SolveFor::Payment => UnknownParameter::Payment,
        }
    }
}

/// Arguments for loan parameter resolution
#[derive(Args)]
#[command(allow_hyphen_values = true)]
pub struct ResolveArgs {
    /// Path to JSON input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    /// Principal (capital borrowed)
    #[arg(long)]
    pub principal: Option<Decimal>,

    /// Annual rate in percent (3.5 = 3.5%)
    #[arg(long, alias = "rate")]
    pub annual_rate: Option<Decimal>,

    /// Term in months
    #[arg(long, alias = "term")]
    pub term_months: Option<u32>,

    /// Monthly instalment excluding insurance
    #[arg(long)]
    pub payment: Option<Decimal>,

    /// Which parameter to solve for
    #[arg(long, value_enum)]
    pub solve_for: Option<SolveFor>,
}

/// Arguments for schedule generation
#[derive(Args)]
#[command(allow_hyphen_values = true)]
pub struct ScheduleArgs {
    #[command(flatten)]
    pub loan: ResolveArgs,

    /// Annual insurance rate in percent (default 0.36; a JSON input
    /// field takes precedence over this flag)
    #[arg(long)]
    pub insurance_rate: Option<Decimal>,
}

/// Arguments for rate conversion
#[derive(Args)]
pub struct ConvertRateArgs {
    /// Annual rate in percent (3.5 = 3.5%)
    #[arg(long, alias = "rate")]
    pub annual_rate: Decimal,
}

/// JSON document accepted by `schedule --input` / piped stdin.
#[derive(Deserialize)]
struct ScheduleRequest {
    #[serde(flatten)]
    loan: ResolveInput,
    annual_insurance_rate_percent: Option<Decimal>,
}

pub fn run_resolve(args: ResolveArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let resolve_input = gather_resolve_input(&args)?;
    let output = resolve_parameters(&resolve_input)?;
    let mut value = serde_json::to_value(output)?;
    tag_solved_field(&mut value, resolve_input.solve_for);
    Ok(value)
}

/// Record which field was solved so formatters can headline it.
fn tag_solved_field(value: &mut Value, solve_for: UnknownParameter) {
    let key = match solve_for {
        UnknownParameter::Principal => "principal",
        UnknownParameter::Term => "term_months",
        UnknownParameter::Payment => "payment",
    };
    value["result"]["solved_for"] = Value::String(key.to_string());
}

pub fn run_schedule(args: ScheduleArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let (resolve_input, insurance) = if let Some(ref path) = args.loan.input {
        let request: ScheduleRequest = input::read_json(path)?;
        (
            request.loan,
            request.annual_insurance_rate_percent.or(args.insurance_rate),
        )
    } else if let Some(data) = input::read_stdin()? {
        let request: ScheduleRequest = serde_json::from_value(data)?;
        (
            request.loan,
            request.annual_insurance_rate_percent.or(args.insurance_rate),
        )
    } else {
        (resolve_from_flags(&args.loan)?, args.insurance_rate)
    };

    let resolved = resolve_parameters(&resolve_input)?;
    let mut warnings = resolved.warnings.clone();

    let schedule = build_schedule(&ScheduleInput {
        loan: resolved.result,
        annual_insurance_rate_percent: insurance,
    })?;

    // Surface resolution warnings (e.g. term ceiling) alongside schedule ones
    let mut output = schedule;
    warnings.extend(output.warnings);
    output.warnings = warnings;

    Ok(serde_json::to_value(output)?)
}

pub fn run_convert_rate(args: ConvertRateArgs) -> Result<Value, Box<dyn std::error::Error>> {
    if args.annual_rate < Decimal::ZERO {
        return Err("--annual-rate cannot be negative".into());
    }
    let monthly = annual_to_monthly(args.annual_rate);
    Ok(serde_json::json!({
        "annual_rate_percent": args.annual_rate,
        "monthly_rate": monthly,
    }))
}

fn gather_resolve_input(args: &ResolveArgs) -> Result<ResolveInput, Box<dyn std::error::Error>> {
    if let Some(ref path) = args.input {
        return Ok(input::read_json(path)?);
    }
    if let Some(data) = input::read_stdin()? {
        return Ok(serde_json::from_value(data)?);
    }
    resolve_from_flags(args)
}

fn resolve_from_flags(args: &ResolveArgs) -> Result<ResolveInput, Box<dyn std::error::Error>> {
    Ok(ResolveInput {
        principal: args.principal,
        annual_rate_percent: args
            .annual_rate
            .ok_or("--annual-rate is required (or provide --input)")?,
        term_months: args.term_months,
        payment: args.payment,
        solve_for: args
            .solve_for
            .ok_or("--solve-for is required (or provide --input)")?
            .into(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_flags_map_to_resolve_input() {
        let args = ResolveArgs {
            input: None,
            principal: Some(dec!(200000)),
            annual_rate: Some(dec!(3)),
            term_months: Some(240),
            payment: None,
            solve_for: Some(SolveFor::Payment),
        };
        let input = resolve_from_flags(&args).unwrap();
        assert_eq!(input.principal, Some(dec!(200000)));
        assert!(matches!(input.solve_for, UnknownParameter::Payment));
    }

    #[test]
    fn test_solved_field_is_tagged() {
        let input = ResolveInput {
            principal: Some(dec!(100000)),
            annual_rate_percent: dec!(0),
            term_months: None,
            payment: Some(dec!(1000)),
            solve_for: UnknownParameter::Term,
        };
        let output = resolve_parameters(&input).unwrap();
        let mut value = serde_json::to_value(output).unwrap();
        tag_solved_field(&mut value, input.solve_for);
        assert_eq!(value["result"]["solved_for"], "term_months");
        assert_eq!(value["result"]["term_months"], 100);
    }

    fn schedule_args_with_input(path: &std::path::Path, flag: Option<Decimal>) -> ScheduleArgs {
        ScheduleArgs {
            loan: ResolveArgs {
                input: Some(path.to_string_lossy().into_owned()),
                principal: None,
                annual_rate: None,
                term_months: None,
                payment: None,
                solve_for: None,
            },
            insurance_rate: flag,
        }
    }

    #[test]
    fn test_insurance_flag_fills_in_when_json_omits_it() {
        let path = std::env::temp_dir().join("amort_sched_no_insurance.json");
        std::fs::write(
            &path,
            r#"{"principal":"1000","annual_rate_percent":"0","payment":"100","solve_for":"term"}"#,
        )
        .unwrap();

        let value = run_schedule(schedule_args_with_input(&path, Some(dec!(1.2)))).unwrap();
        assert_eq!(
            value["assumptions"]["annual_insurance_rate_percent"],
            serde_json::json!(dec!(1.2))
        );
    }

    #[test]
    fn test_json_insurance_field_wins_over_flag() {
        let path = std::env::temp_dir().join("amort_sched_with_insurance.json");
        std::fs::write(
            &path,
            r#"{"principal":"1000","annual_rate_percent":"0","payment":"100","solve_for":"term","annual_insurance_rate_percent":"0.5"}"#,
        )
        .unwrap();

        let value = run_schedule(schedule_args_with_input(&path, Some(dec!(1.2)))).unwrap();
        assert_eq!(
            value["assumptions"]["annual_insurance_rate_percent"],
            serde_json::json!(dec!(0.5))
        );
    }

    #[test]
    fn test_missing_rate_flag_is_an_error() {
        let args = ResolveArgs {
            input: None,
            principal: Some(dec!(200000)),
            annual_rate: None,
            term_months: Some(240),
            payment: None,
            solve_for: Some(SolveFor::Payment),
        };
        assert!(resolve_from_flags(&args).is_err());
    }
}
