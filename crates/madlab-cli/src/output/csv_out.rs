use serde_json::Value;
use std::io;

use super::flatten;

/// Write output as CSV to stdout.
pub fn print_csv(value: &Value) {
    let stdout = io::stdout();
    let mut wtr = csv::Writer::from_writer(stdout.lock());

    match value {
        Value::Object(map) => {
            if let Some(Value::Array(projections)) = map.get("projections") {
                // The schedule is the tabular part of a DCF run
                write_array_csv(&mut wtr, projections);
            } else if let Some(Value::Object(result)) = map.get("result") {
                if let Some(Value::Array(matrix)) = result.get("matrix") {
                    write_grid_csv(&mut wtr, result, matrix);
                } else {
                    let _ = wtr.write_record(["field", "value"]);
                    for (key, val) in flatten(result) {
                        let _ = wtr.write_record([key, format_csv_value(&val)]);
                    }
                }
            } else {
                let _ = wtr.write_record(["field", "value"]);
                for (key, val) in flatten(map) {
                    let _ = wtr.write_record([key, format_csv_value(&val)]);
                }
            }
        }
        Value::Array(arr) => write_array_csv(&mut wtr, arr),
        _ => {
            let _ = wtr.write_record([&format_csv_value(value)]);
        }
    }

    let _ = wtr.flush();
}

fn write_grid_csv(
    wtr: &mut csv::Writer<io::StdoutLock<'_>>,
    result: &serde_json::Map<String, Value>,
    matrix: &[Value],
) {
    let cols = result
        .get("columnValues")
        .and_then(Value::as_array)
        .cloned()
        .unwrap_or_default();
    let rows = result
        .get("rowValues")
        .and_then(Value::as_array)
        .cloned()
        .unwrap_or_default();

    let mut header = vec![String::new()];
    header.extend(cols.iter().map(format_csv_value));
    let _ = wtr.write_record(&header);

    for (row_value, row) in rows.iter().zip(matrix) {
        let mut record = vec![format_csv_value(row_value)];
        if let Value::Array(cells) = row {
            record.extend(cells.iter().map(format_csv_value));
        }
        let _ = wtr.write_record(&record);
    }
}

fn write_array_csv(wtr: &mut csv::Writer<io::StdoutLock<'_>>, arr: &[Value]) {
    if arr.is_empty() {
        return;
    }

    if let Some(Value::Object(first)) = arr.first() {
        let headers: Vec<&str> = first.keys().map(|k| k.as_str()).collect();
        let _ = wtr.write_record(&headers);

        for item in arr {
            if let Value::Object(map) = item {
                let row: Vec<String> = headers
                    .iter()
                    .map(|h| map.get(*h).map(format_csv_value).unwrap_or_default())
                    .collect();
                let _ = wtr.write_record(&row);
            }
        }
    } else {
        for item in arr {
            let _ = wtr.write_record([&format_csv_value(item)]);
        }
    }
}

fn format_csv_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => String::new(),
        _ => serde_json::to_string(value).unwrap_or_default(),
    }
}
