use napi::Result as NapiResult;
use napi_derive::napi;

use madlab_core::validation::Validate;
use madlab_core::valuation::dcf::DcfInput;
use madlab_core::valuation::epv::EpvInput;

/// Convert any Display error into a napi::Error.
fn to_napi_error(e: impl std::fmt::Display) -> napi::Error {
    napi::Error::from_reason(e.to_string())
}

/// Parse untyped JSON and narrow it, surfacing the first issue the way the
/// fail-fast valuation functions would.
fn narrow<T: Validate>(input_json: &str) -> NapiResult<T> {
    let raw: serde_json::Value = serde_json::from_str(input_json).map_err(to_napi_error)?;
    T::parse(&raw)
        .map_err(madlab_core::ValuationError::from)
        .map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Throwing entry points
// ---------------------------------------------------------------------------

#[napi]
pub fn dcf(input_json: String) -> NapiResult<String> {
    let input: DcfInput = narrow(&input_json)?;
    let output = madlab_core::valuation::dcf::dcf(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn epv(input_json: String) -> NapiResult<String> {
    let input: EpvInput = narrow(&input_json)?;
    let output = madlab_core::valuation::epv::epv(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn project_cash_flows(input_json: String) -> NapiResult<String> {
    let input: DcfInput = narrow(&input_json)?;
    let output =
        madlab_core::valuation::dcf::project_cash_flows(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn dcf_sensitivity(input_json: String) -> NapiResult<String> {
    let raw: serde_json::Value = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let input = madlab_core::valuation::sensitivity::parse_sensitivity_input(&raw)
        .map_err(madlab_core::ValuationError::from)
        .map_err(to_napi_error)?;
    let output = madlab_core::valuation::sensitivity::dcf_sensitivity(&input)
        .map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Non-throwing entry points ({ ok, value } | { ok, error: { issues } })
// ---------------------------------------------------------------------------

#[napi]
pub fn compute_dcf(input_json: String) -> String {
    madlab_core::adapter::compute_dcf_json(&input_json)
}

#[napi]
pub fn compute_epv(input_json: String) -> String {
    madlab_core::adapter::compute_epv_json(&input_json)
}
