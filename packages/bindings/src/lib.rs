use napi::Result as NapiResult;
use napi_derive::napi;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Convert any Display error into a napi::Error.
fn to_napi_error(e: impl std::fmt::Display) -> napi::Error {
    napi::Error::from_reason(e.to_string())
}

// ---------------------------------------------------------------------------
// Resolution
// ---------------------------------------------------------------------------

#[napi]
pub fn resolve_loan(input_json: String) -> NapiResult<String> {
    let input: amortize_core::annuity::ResolveInput =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = amortize_core::annuity::resolve_parameters(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Schedule
// ---------------------------------------------------------------------------

#[napi]
pub fn build_amortization_schedule(input_json: String) -> NapiResult<String> {
    let input: amortize_core::amortization::ScheduleInput =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = amortize_core::amortization::build_schedule(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Rate conversion
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
struct ConvertRateInput {
    annual_rate_percent: Decimal,
}

#[derive(Serialize)]
struct ConvertRateOutput {
    annual_rate_percent: Decimal,
    monthly_rate: Decimal,
}

#[napi]
pub fn convert_annual_rate(input_json: String) -> NapiResult<String> {
    let input: ConvertRateInput = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = ConvertRateOutput {
        monthly_rate: amortize_core::rates::annual_to_monthly(input.annual_rate_percent),
        annual_rate_percent: input.annual_rate_percent,
    };
    serde_json::to_string(&output).map_err(to_napi_error)
}
