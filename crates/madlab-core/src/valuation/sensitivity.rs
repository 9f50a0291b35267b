use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ValuationError;
use crate::types::Money;
use crate::validation::{type_name, Issue, Validate, ValidationIssues};
use crate::ValuationResult;

use super::dcf::{dcf, DcfInput};

/// DCF assumptions that can be swept in a sensitivity grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DcfVariable {
    Growth,
    Wacc,
    TerminalMultiple,
}

impl DcfVariable {
    pub fn wire_name(self) -> &'static str {
        match self {
            DcfVariable::Growth => "growth",
            DcfVariable::Wacc => "wacc",
            DcfVariable::TerminalMultiple => "terminalMultiple",
        }
    }

    fn get(self, input: &DcfInput) -> f64 {
        match self {
            DcfVariable::Growth => input.growth,
            DcfVariable::Wacc => input.wacc,
            DcfVariable::TerminalMultiple => input.terminal_multiple,
        }
    }

    fn set(self, input: &mut DcfInput, value: f64) {
        match self {
            DcfVariable::Growth => input.growth = value,
            DcfVariable::Wacc => input.wacc = value,
            DcfVariable::TerminalMultiple => input.terminal_multiple = value,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensitivityAxis {
    pub variable: DcfVariable,
    pub values: Vec<f64>,
}

/// Input for a 2-way DCF sensitivity grid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DcfSensitivityInput {
    /// Base case; the swept variables are overridden per cell
    pub base: DcfInput,
    pub rows: SensitivityAxis,
    pub columns: SensitivityAxis,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SensitivityOutput {
    pub row_variable: DcfVariable,
    pub column_variable: DcfVariable,
    pub row_values: Vec<f64>,
    pub column_values: Vec<f64>,
    /// matrix[i][j] = per-share value at row_values[i], column_values[j]
    pub matrix: Vec<Vec<Money>>,
    /// Per-share value of the unmodified base case
    pub base_case_value: Money,
    /// Grid cell nearest to the base case (row, col)
    pub base_case_position: (usize, usize),
}

/// Narrow an untyped grid request. `base` goes through the DCF validator, so
/// its issues carry the same messages as a plain DCF input, under `base.`.
pub fn parse_sensitivity_input(input: &Value) -> Result<DcfSensitivityInput, ValidationIssues> {
    let Value::Object(obj) = input else {
        return Err(ValidationIssues::single(
            "",
            format!("Expected object, received {}", type_name(input)),
        ));
    };

    let mut issues = Vec::new();

    let base = match DcfInput::parse(obj.get("base").unwrap_or(&Value::Null)) {
        Ok(base) => Some(base),
        Err(report) => {
            issues.extend(report.issues.into_iter().map(|issue| {
                let path = if issue.path.is_empty() {
                    "base".to_string()
                } else {
                    format!("base.{}", issue.path)
                };
                Issue::new(path, issue.msg)
            }));
            None
        }
    };
    let rows = parse_axis(obj.get("rows"), "rows", &mut issues);
    let columns = parse_axis(obj.get("columns"), "columns", &mut issues);

    match (base, rows, columns) {
        (Some(base), Some(rows), Some(columns)) if issues.is_empty() => Ok(DcfSensitivityInput {
            base,
            rows,
            columns,
        }),
        _ => Err(ValidationIssues { issues }),
    }
}

fn parse_axis(raw: Option<&Value>, name: &str, issues: &mut Vec<Issue>) -> Option<SensitivityAxis> {
    let Some(raw) = raw else {
        issues.push(Issue::new(name, "Required"));
        return None;
    };
    match SensitivityAxis::deserialize(raw) {
        Ok(axis) => Some(axis),
        Err(e) => {
            issues.push(Issue::new(name, e.to_string()));
            None
        }
    }
}

/// Per-share DCF value over a grid of two swept assumptions.
pub fn dcf_sensitivity(input: &DcfSensitivityInput) -> ValuationResult<SensitivityOutput> {
    let base = dcf(&input.base)?;

    if input.rows.variable == input.columns.variable {
        return Err(ValuationError::InvalidInput {
            field: "columns".into(),
            reason: format!(
                "Cannot sweep {} on both axes",
                input.rows.variable.wire_name()
            ),
        });
    }
    check_axis("rows", &input.rows)?;
    check_axis("columns", &input.columns)?;

    let mut matrix = Vec::with_capacity(input.rows.values.len());
    for &row_value in &input.rows.values {
        let mut row = Vec::with_capacity(input.columns.values.len());
        for &col_value in &input.columns.values {
            let mut cell = input.base;
            input.rows.variable.set(&mut cell, row_value);
            input.columns.variable.set(&mut cell, col_value);
            row.push(dcf(&cell)?.per_share);
        }
        matrix.push(row);
    }

    let base_row = closest_index(&input.rows.values, input.rows.variable.get(&input.base));
    let base_col = closest_index(
        &input.columns.values,
        input.columns.variable.get(&input.base),
    );

    Ok(SensitivityOutput {
        row_variable: input.rows.variable,
        column_variable: input.columns.variable,
        row_values: input.rows.values.clone(),
        column_values: input.columns.values.clone(),
        matrix,
        base_case_value: base.per_share,
        base_case_position: (base_row, base_col),
    })
}

fn check_axis(name: &str, axis: &SensitivityAxis) -> ValuationResult<()> {
    if axis.values.is_empty() {
        return Err(ValuationError::InvalidInput {
            field: name.into(),
            reason: "At least one value is required".into(),
        });
    }
    Ok(())
}

fn closest_index(values: &[f64], target: f64) -> usize {
    values
        .iter()
        .enumerate()
        .min_by(|(_, a), (_, b)| (*a - target).abs().total_cmp(&(*b - target).abs()))
        .map(|(i, _)| i)
        .unwrap_or(0)
}
