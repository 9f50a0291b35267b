use clap::Args;
use serde_json::{json, Map, Value};
use tracing::{debug, warn};

use madlab_core::valuation::dcf::{dcf, dcf_warnings, parse_dcf_input, project_cash_flows};
use madlab_core::valuation::epv::{epv, parse_epv_input};

use crate::input;

/// Arguments for DCF valuation
#[derive(Args)]
#[command(allow_hyphen_values = true)]
pub struct DcfArgs {
    /// Base-year free cash flow
    #[arg(long, value_parser = finite_number)]
    pub fcf0: Option<f64>,

    /// Constant annual growth rate (e.g. 0.03 for 3%)
    #[arg(long, value_parser = finite_number)]
    pub growth: Option<f64>,

    /// Discount rate (WACC)
    #[arg(long, value_parser = finite_number)]
    pub wacc: Option<f64>,

    /// Explicit forecast years
    #[arg(long, value_parser = finite_number)]
    pub horizon: Option<f64>,

    /// Multiple applied to final-year cash flow for terminal value
    #[arg(long, value_parser = finite_number)]
    pub terminal_multiple: Option<f64>,

    /// Diluted shares outstanding
    #[arg(long, value_parser = finite_number)]
    pub shares: Option<f64>,

    /// Include the year-by-year projection schedule
    #[arg(long)]
    pub schedule: bool,

    /// Path to JSON or YAML input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,
}

/// Arguments for EPV valuation
#[derive(Args)]
#[command(allow_hyphen_values = true)]
pub struct EpvArgs {
    /// Earnings before interest and taxes
    #[arg(long, value_parser = finite_number)]
    pub ebit: Option<f64>,

    /// Marginal tax rate
    #[arg(long, value_parser = finite_number)]
    pub tax_rate: Option<f64>,

    /// Share of after-tax operating income reinvested
    #[arg(long, value_parser = finite_number)]
    pub reinvestment_rate: Option<f64>,

    /// Capitalisation rate (WACC)
    #[arg(long, value_parser = finite_number)]
    pub wacc: Option<f64>,

    /// Diluted shares outstanding
    #[arg(long, value_parser = finite_number)]
    pub shares: Option<f64>,

    /// Path to JSON or YAML input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,
}

pub fn run_dcf(args: DcfArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let raw = input::resolve(args.input.as_deref(), || {
        flags_to_object(&[
            ("fcf0", args.fcf0),
            ("growth", args.growth),
            ("wacc", args.wacc),
            ("horizon", args.horizon),
            ("terminalMultiple", args.terminal_multiple),
            ("shares", args.shares),
        ])
    })?;
    dcf_report(&raw, args.schedule)
}

pub fn run_epv(args: EpvArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let raw = input::resolve(args.input.as_deref(), || {
        flags_to_object(&[
            ("ebit", args.ebit),
            ("taxRate", args.tax_rate),
            ("reinvestmentRate", args.reinvestment_rate),
            ("wacc", args.wacc),
            ("shares", args.shares),
        ])
    })?;
    epv_report(&raw)
}

fn dcf_report(raw: &Value, schedule: bool) -> Result<Value, Box<dyn std::error::Error>> {
    debug!(input = %raw, "dcf input resolved");

    // every issue at once, then the same math the adapter runs
    let dcf_input = parse_dcf_input(raw)?;
    let result = dcf(&dcf_input)?;

    let warnings = dcf_warnings(&dcf_input, &result);
    for w in &warnings {
        warn!("{w}");
    }

    let mut envelope = json!({
        "result": result,
        "methodology": "Single-stage DCF (exit multiple on final-year FCF)",
        "warnings": warnings,
    });
    if schedule {
        envelope["projections"] = serde_json::to_value(project_cash_flows(&dcf_input)?)?;
    }
    Ok(envelope)
}

fn epv_report(raw: &Value) -> Result<Value, Box<dyn std::error::Error>> {
    debug!(input = %raw, "epv input resolved");

    let epv_input = parse_epv_input(raw)?;
    let result = epv(&epv_input)?;

    Ok(json!({
        "result": result,
        "methodology": "Earnings Power Value (after-tax EBIT net of reinvestment, capitalised at WACC)",
        "warnings": Vec::<String>::new(),
    }))
}

/// Flag values must be finite: JSON has no NaN or infinity, so they could not
/// reach the validator as numbers.
fn finite_number(s: &str) -> Result<f64, String> {
    let value: f64 = s.parse().map_err(|e| format!("{e}"))?;
    if value.is_finite() {
        Ok(value)
    } else {
        Err("Number must be finite".to_string())
    }
}

/// Only flags actually given become fields, so missing ones surface as
/// `Required` issues from the validator.
fn flags_to_object(flags: &[(&str, Option<f64>)]) -> Value {
    let mut map = Map::new();
    for (name, value) in flags {
        if let Some(v) = value {
            map.insert((*name).to_string(), Value::from(*v));
        }
    }
    Value::Object(map)
}
