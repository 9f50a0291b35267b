use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

use crate::error::ValuationError;
use crate::ValuationResult;

// ---------------------------------------------------------------------------
// Issues
// ---------------------------------------------------------------------------

/// A single violated constraint, addressed by the wire name of the field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Issue {
    /// camelCase field name; empty when the input as a whole is malformed
    pub path: String,
    pub msg: String,
}

impl Issue {
    pub fn new(path: impl Into<String>, msg: impl Into<String>) -> Self {
        Issue {
            path: path.into(),
            msg: msg.into(),
        }
    }
}

impl fmt::Display for Issue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.path.is_empty() {
            write!(f, "{}", self.msg)
        } else {
            write!(f, "{}: {}", self.path, self.msg)
        }
    }
}

/// Every violation found in one pass, in field order then check order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ValidationIssues {
    pub issues: Vec<Issue>,
}

impl ValidationIssues {
    pub fn single(path: impl Into<String>, msg: impl Into<String>) -> Self {
        ValidationIssues {
            issues: vec![Issue::new(path, msg)],
        }
    }

    pub fn is_empty(&self) -> bool {
        self.issues.is_empty()
    }

    pub fn len(&self) -> usize {
        self.issues.len()
    }

    /// True if any issue is addressed to `path`.
    pub fn mentions(&self, path: &str) -> bool {
        self.issues.iter().any(|i| i.path == path)
    }
}

impl fmt::Display for ValidationIssues {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let joined: Vec<String> = self.issues.iter().map(Issue::to_string).collect();
        write!(f, "{}", joined.join("; "))
    }
}

impl std::error::Error for ValidationIssues {}

// ---------------------------------------------------------------------------
// Constraint tables
// ---------------------------------------------------------------------------

/// One side of a numeric domain.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Bound {
    Gt(f64),
    Gte(f64),
    Lt(f64),
    Lte(f64),
}

impl Bound {
    pub fn admits(self, x: f64) -> bool {
        match self {
            Bound::Gt(b) => x > b,
            Bound::Gte(b) => x >= b,
            Bound::Lt(b) => x < b,
            Bound::Lte(b) => x <= b,
        }
    }

    pub fn message(self) -> String {
        match self {
            Bound::Gt(b) => format!("Number must be greater than {b}"),
            Bound::Gte(b) => format!("Number must be greater than or equal to {b}"),
            Bound::Lt(b) => format!("Number must be less than {b}"),
            Bound::Lte(b) => format!("Number must be less than or equal to {b}"),
        }
    }
}

/// Domain constraints for a single numeric field.
#[derive(Debug, Clone, Copy)]
pub struct FieldRule {
    /// Wire (camelCase) name, also used as the issue path
    pub name: &'static str,
    pub integer: bool,
    pub bounds: &'static [Bound],
}

impl FieldRule {
    pub const fn finite(name: &'static str, bounds: &'static [Bound]) -> Self {
        FieldRule {
            name,
            integer: false,
            bounds,
        }
    }

    pub const fn integer(name: &'static str, bounds: &'static [Bound]) -> Self {
        FieldRule {
            name,
            integer: true,
            bounds,
        }
    }

    /// Push one issue per violated check. A non-finite value stops further
    /// checks since no bound is meaningful against it.
    pub fn check(&self, value: f64, issues: &mut Vec<Issue>) {
        if !value.is_finite() {
            issues.push(Issue::new(self.name, "Number must be finite"));
            return;
        }
        if self.integer && value.fract() != 0.0 {
            issues.push(Issue::new(self.name, "Expected integer, received float"));
        }
        for bound in self.bounds {
            if !bound.admits(value) {
                issues.push(Issue::new(self.name, bound.message()));
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Validate trait
// ---------------------------------------------------------------------------

/// A flat struct of numeric fields described by an ordered constraint table.
///
/// The same table drives the aggregated path (`issues`, `parse`) and the
/// fail-fast path (`validate`), so both report identical constraints.
pub trait Validate: Sized {
    /// Constraint table in check order.
    const RULES: &'static [FieldRule];

    /// Field values in `RULES` order.
    fn values(&self) -> Vec<f64>;

    /// Build from values in `RULES` order. Only called after every rule passed.
    fn from_values(values: &[f64]) -> Self;

    /// All violations, in field order.
    fn issues(&self) -> Vec<Issue> {
        let mut issues = Vec::new();
        for (rule, value) in Self::RULES.iter().zip(self.values()) {
            rule.check(value, &mut issues);
        }
        issues
    }

    /// Fail on the first violated constraint.
    fn validate(&self) -> ValuationResult<()> {
        for (rule, value) in Self::RULES.iter().zip(self.values()) {
            let mut issues = Vec::new();
            rule.check(value, &mut issues);
            if let Some(issue) = issues.into_iter().next() {
                return Err(ValuationError::InvalidInput {
                    field: issue.path,
                    reason: issue.msg,
                });
            }
        }
        Ok(())
    }

    /// Narrow an untyped value, reporting every problem in a single pass.
    fn parse(input: &Value) -> Result<Self, ValidationIssues> {
        let obj = match input {
            Value::Object(map) => map,
            other => {
                return Err(ValidationIssues::single(
                    "",
                    format!("Expected object, received {}", type_name(other)),
                ))
            }
        };

        let mut issues = Vec::new();
        let mut values = Vec::with_capacity(Self::RULES.len());
        for rule in Self::RULES {
            match obj.get(rule.name) {
                None => issues.push(Issue::new(rule.name, "Required")),
                Some(Value::Number(n)) => match n.as_f64() {
                    Some(x) => {
                        rule.check(x, &mut issues);
                        values.push(x);
                    }
                    None => issues.push(Issue::new(rule.name, "Number must be finite")),
                },
                Some(other) => issues.push(Issue::new(
                    rule.name,
                    format!("Expected number, received {}", type_name(other)),
                )),
            }
        }

        if issues.is_empty() {
            Ok(Self::from_values(&values))
        } else {
            Err(ValidationIssues { issues })
        }
    }
}

pub(crate) fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
