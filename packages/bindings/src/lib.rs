use chrono::NaiveDate;
use napi::Result as NapiResult;
use napi_derive::napi;
use serde::Deserialize;
use vestcalc_core::{Grant, GrantInput};

/// Convert any Display error into a napi::Error.
fn to_napi_error(e: impl std::fmt::Display) -> napi::Error {
    napi::Error::from_reason(e.to_string())
}

// ---------------------------------------------------------------------------
// Grants
// ---------------------------------------------------------------------------

/// Validate a grant form and return the normalised record with the given id.
#[napi]
pub fn validate_grant(input_json: String, id: String) -> NapiResult<String> {
    let input: GrantInput = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    input.validate().map_err(to_napi_error)?;
    serde_json::to_string(&input.into_grant(id)).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Vesting
// ---------------------------------------------------------------------------

#[napi]
pub fn vesting_schedule(input_json: String) -> NapiResult<String> {
    let input: vestcalc_core::vesting::schedule::VestingScheduleInput =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output =
        vestcalc_core::vesting::schedule::vesting_schedule(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Portfolio
// ---------------------------------------------------------------------------

#[napi]
pub fn analyze_portfolio(input_json: String) -> NapiResult<String> {
    let input: vestcalc_core::portfolio::aggregate::PortfolioInput =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output =
        vestcalc_core::portfolio::aggregate::analyze_portfolio(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Valuation
// ---------------------------------------------------------------------------

#[napi]
pub fn exit_scenario(input_json: String) -> NapiResult<String> {
    let input: vestcalc_core::valuation::intrinsic::ExitScenarioInput =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output =
        vestcalc_core::valuation::intrinsic::exit_scenario(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn what_if_prices(input_json: String) -> NapiResult<String> {
    let input: vestcalc_core::valuation::what_if::WhatIfInput =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output =
        vestcalc_core::valuation::what_if::what_if_prices(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn option_value(input_json: String) -> NapiResult<String> {
    let input: vestcalc_core::valuation::calculators::OptionValueInput =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output =
        vestcalc_core::valuation::calculators::option_value(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn rsu_value(input_json: String) -> NapiResult<String> {
    let input: vestcalc_core::valuation::calculators::RsuValueInput =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output =
        vestcalc_core::valuation::calculators::rsu_value(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Export
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
struct ExportInput {
    grants: Vec<Grant>,
    as_of: NaiveDate,
}

/// Returns CSV text, not JSON.
#[napi]
pub fn export_csv(input_json: String) -> NapiResult<String> {
    let input: ExportInput = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    vestcalc_core::export::export_csv(&input.grants, input.as_of).map_err(to_napi_error)
}
