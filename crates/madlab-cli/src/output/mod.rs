pub mod csv_out;
pub mod minimal;
pub mod table;

use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::Decimal;
use serde_json::{Map, Value};
use std::io::{self, Write};

use crate::OutputFormat;

/// Dispatch output to the appropriate formatter.
pub fn format_output(format: &OutputFormat, value: &Value) {
    match format {
        OutputFormat::Json => print_json(value),
        OutputFormat::Table => table::print_table(value),
        OutputFormat::Csv => csv_out::print_csv(value),
        OutputFormat::Minimal => minimal::print_minimal(value),
    }
}

/// Pretty-print JSON to stdout.
fn print_json(value: &Value) {
    let mut out = io::stdout().lock();
    let written = serde_json::to_writer_pretty(&mut out, value)
        .map_err(io::Error::from)
        .and_then(|()| writeln!(out));
    if let Err(e) = written {
        eprintln!("JSON output error: {}", e);
    }
}

/// Round every float in `value` to `dp` decimal places (midpoint away from
/// zero). Display only; the core never rounds.
pub fn round_numbers(value: &mut Value, dp: u32) {
    match value {
        Value::Number(n) if n.is_f64() => {
            if let Some(rounded) = n.as_f64().and_then(|x| round_f64(x, dp)) {
                *value = Value::from(rounded);
            }
        }
        Value::Array(items) => items.iter_mut().for_each(|v| round_numbers(v, dp)),
        Value::Object(map) => map.values_mut().for_each(|v| round_numbers(v, dp)),
        _ => {}
    }
}

fn round_f64(x: f64, dp: u32) -> Option<f64> {
    let d = Decimal::from_f64(x)?;
    d.round_dp_with_strategy(dp, rust_decimal::RoundingStrategy::MidpointAwayFromZero)
        .to_f64()
}

/// Flatten nested objects into `parent.child` keys for two-column output.
pub fn flatten(map: &Map<String, Value>) -> Vec<(String, Value)> {
    let mut rows = Vec::new();
    flatten_into("", map, &mut rows);
    rows
}

fn flatten_into(prefix: &str, map: &Map<String, Value>, rows: &mut Vec<(String, Value)>) {
    for (key, val) in map {
        let name = if prefix.is_empty() {
            key.clone()
        } else {
            format!("{prefix}.{key}")
        };
        match val {
            Value::Object(inner) => flatten_into(&name, inner, rows),
            other => rows.push((name, other.clone())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_round_numbers_nested() {
        let mut v = json!({
            "result": { "perShare": 11.320861, "breakdown": { "pvStage": 412.267811 } },
            "rows": [0.123456, 2],
            "methodology": "x"
        });
        round_numbers(&mut v, 2);
        assert_eq!(
            v,
            json!({
                "result": { "perShare": 11.32, "breakdown": { "pvStage": 412.27 } },
                "rows": [0.12, 2],
                "methodology": "x"
            })
        );
    }

    #[test]
    fn test_round_midpoint_away_from_zero() {
        assert_eq!(round_f64(168.745, 2), Some(168.75));
        assert_eq!(round_f64(-0.125, 2), Some(-0.13));
    }

    #[test]
    fn test_flatten() {
        let v = json!({ "equityValue": 1.0, "breakdown": { "pvStage": 2.0, "pvTerminal": 3.0 } });
        let keys: Vec<String> = flatten(v.as_object().unwrap())
            .into_iter()
            .map(|(k, _)| k)
            .collect();
        let mut sorted = keys.clone();
        sorted.sort();
        assert_eq!(
            sorted,
            vec!["breakdown.pvStage", "breakdown.pvTerminal", "equityValue"]
        );
    }
}
