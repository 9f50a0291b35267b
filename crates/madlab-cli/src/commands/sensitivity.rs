use clap::Args;
use serde_json::{json, Value};
use tracing::debug;

use madlab_core::valuation::sensitivity::{dcf_sensitivity, parse_sensitivity_input};

use crate::input;

/// Arguments for a DCF sensitivity grid
#[derive(Args)]
pub struct SensitivityArgs {
    /// Path to JSON or YAML file with `base`, `rows` and `columns`
    #[arg(long)]
    pub input: Option<String>,
}

pub fn run_sensitivity(args: SensitivityArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let raw = input::resolve(args.input.as_deref(), || Value::Null)?;
    if raw.is_null() {
        return Err("--input file (or piped JSON) is required for sensitivity analysis".into());
    }
    sensitivity_report(&raw)
}

fn sensitivity_report(raw: &Value) -> Result<Value, Box<dyn std::error::Error>> {
    // same field-level report as the dcf command, with base fields under `base.`
    let grid_input = parse_sensitivity_input(raw)?;
    debug!(
        rows = grid_input.rows.values.len(),
        columns = grid_input.columns.values.len(),
        "sensitivity grid resolved"
    );

    let output = dcf_sensitivity(&grid_input)?;
    Ok(json!({
        "result": output,
        "methodology": "2-Way DCF Sensitivity (per-share value)",
        "warnings": Vec::<String>::new(),
    }))
}
