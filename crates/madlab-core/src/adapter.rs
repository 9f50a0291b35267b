//! Non-throwing entry points for callers that want a result object rather
//! than an error: UI forms rendering field-level issues, and message bridges
//! where errors cannot cross the boundary.
//!
//! Serialized shape: `{"ok":true,"value":..}` or
//! `{"ok":false,"error":{"issues":[{"path":..,"msg":..}]}}`.

use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};
use serde_json::Value;

use crate::validation::{Validate, ValidationIssues};
use crate::valuation::dcf::{value_dcf, DcfInput, DcfResult};
use crate::valuation::epv::{value_epv, EpvInput, EpvResult};

/// Tagged outcome of a compute call.
#[derive(Debug, Clone, PartialEq)]
pub enum Computation<T> {
    Ok(T),
    Err(ValidationIssues),
}

impl<T> Computation<T> {
    pub fn is_ok(&self) -> bool {
        matches!(self, Computation::Ok(_))
    }

    pub fn into_result(self) -> Result<T, ValidationIssues> {
        match self {
            Computation::Ok(value) => Ok(value),
            Computation::Err(issues) => Err(issues),
        }
    }

    pub fn issues(&self) -> Option<&ValidationIssues> {
        match self {
            Computation::Ok(_) => None,
            Computation::Err(issues) => Some(issues),
        }
    }
}

impl<T> From<Result<T, ValidationIssues>> for Computation<T> {
    fn from(result: Result<T, ValidationIssues>) -> Self {
        match result {
            Ok(value) => Computation::Ok(value),
            Err(issues) => Computation::Err(issues),
        }
    }
}

impl<T: Serialize> Serialize for Computation<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("Computation", 2)?;
        match self {
            Computation::Ok(value) => {
                state.serialize_field("ok", &true)?;
                state.serialize_field("value", value)?;
            }
            Computation::Err(issues) => {
                state.serialize_field("ok", &false)?;
                state.serialize_field("error", issues)?;
            }
        }
        state.end()
    }
}

/// Validate and value a DCF input of any shape.
pub fn compute_dcf(input: &Value) -> Computation<DcfResult> {
    DcfInput::parse(input).and_then(|i| value_dcf(&i)).into()
}

/// Validate and value an EPV input of any shape.
pub fn compute_epv(input: &Value) -> Computation<EpvResult> {
    EpvInput::parse(input).and_then(|i| value_epv(&i)).into()
}

/// String-in, string-out `compute_dcf` for message bridges.
pub fn compute_dcf_json(input: &str) -> String {
    match serde_json::from_str::<Value>(input) {
        Ok(value) => to_json(&compute_dcf(&value)),
        Err(e) => to_json(&unparsable::<DcfResult>(e)),
    }
}

/// String-in, string-out `compute_epv` for message bridges.
pub fn compute_epv_json(input: &str) -> String {
    match serde_json::from_str::<Value>(input) {
        Ok(value) => to_json(&compute_epv(&value)),
        Err(e) => to_json(&unparsable::<EpvResult>(e)),
    }
}

fn unparsable<T>(e: serde_json::Error) -> Computation<T> {
    Computation::Err(ValidationIssues::single("", format!("Invalid JSON: {e}")))
}

fn to_json<T: Serialize>(outcome: &Computation<T>) -> String {
    // plain structs of numbers and strings; the fallback is unreachable in practice
    serde_json::to_string(outcome).unwrap_or_else(|e| {
        format!(
            r#"{{"ok":false,"error":{{"issues":[{{"path":"","msg":{}}}]}}}}"#,
            Value::String(e.to_string())
        )
    })
}
