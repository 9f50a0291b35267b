use serde_json::{Map, Value};
use tabled::{builder::Builder, Table};

use super::flatten;

/// Format output as tables using the tabled crate.
pub fn print_table(value: &Value) {
    match value {
        Value::Object(map) => match map.get("result") {
            Some(result) => print_envelope(result, map),
            None => print_field_table(map),
        },
        Value::Array(arr) => print_array_table(arr),
        _ => println!("{}", value),
    }
}

fn print_envelope(result: &Value, envelope: &Map<String, Value>) {
    match result {
        Value::Object(res_map) if res_map.contains_key("matrix") => print_grid(res_map),
        Value::Object(res_map) => print_field_table(res_map),
        other => println!("{}", format_value(other)),
    }

    if let Some(Value::Array(projections)) = envelope.get("projections") {
        println!("\nProjections:");
        print_array_table(projections);
    }

    if let Some(Value::Array(warnings)) = envelope.get("warnings") {
        if !warnings.is_empty() {
            println!("\nWarnings:");
            for w in warnings {
                if let Value::String(s) = w {
                    println!("  - {}", s);
                }
            }
        }
    }

    if let Some(Value::String(meth)) = envelope.get("methodology") {
        println!("\nMethodology: {}", meth);
    }
}

fn print_field_table(map: &Map<String, Value>) {
    let mut builder = Builder::default();
    builder.push_record(["Field", "Value"]);
    for (key, val) in flatten(map) {
        builder.push_record([key, format_value(&val)]);
    }
    println!("{}", Table::from(builder));
}

/// Sensitivity matrix: row variable values down the side, column values across.
fn print_grid(res: &Map<String, Value>) {
    let label = |key: &str| res.get(key).map(format_value).unwrap_or_default();
    let row_values = res.get("rowValues").and_then(Value::as_array);
    let col_values = res.get("columnValues").and_then(Value::as_array);
    let matrix = res.get("matrix").and_then(Value::as_array);

    let (Some(row_values), Some(col_values), Some(matrix)) = (row_values, col_values, matrix)
    else {
        print_field_table(res);
        return;
    };

    let mut builder = Builder::default();
    let mut header = vec![format!(
        "{} \\ {}",
        label("rowVariable"),
        label("columnVariable")
    )];
    header.extend(col_values.iter().map(format_value));
    builder.push_record(header);

    for (row_value, row) in row_values.iter().zip(matrix) {
        let mut record = vec![format_value(row_value)];
        if let Value::Array(cells) = row {
            record.extend(cells.iter().map(format_value));
        }
        builder.push_record(record);
    }
    println!("{}", Table::from(builder));

    println!("\nBase case per share: {}", label("baseCaseValue"));
}

fn print_array_table(arr: &[Value]) {
    if arr.is_empty() {
        println!("(empty)");
        return;
    }

    if let Some(Value::Object(first)) = arr.first() {
        let headers: Vec<String> = first.keys().cloned().collect();
        let mut builder = Builder::default();
        builder.push_record(headers.clone());

        for item in arr {
            if let Value::Object(map) = item {
                let row: Vec<String> = headers
                    .iter()
                    .map(|h| map.get(h.as_str()).map(format_value).unwrap_or_default())
                    .collect();
                builder.push_record(row);
            }
        }

        println!("{}", Table::from(builder));
    } else {
        for item in arr {
            println!("{}", format_value(item));
        }
    }
}

fn format_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => "null".to_string(),
        Value::Array(arr) => {
            let items: Vec<String> = arr.iter().map(format_value).collect();
            items.join(", ")
        }
        Value::Object(_) => serde_json::to_string(value).unwrap_or_default(),
    }
}
