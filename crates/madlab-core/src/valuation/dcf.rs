use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ValuationError;
use crate::types::{Money, Multiple, Rate, Shares};
use crate::validation::{Bound, FieldRule, Validate, ValidationIssues};
use crate::ValuationResult;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Input parameters for a single-stage DCF valuation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DcfInput {
    /// Base-year free cash flow
    pub fcf0: Money,
    /// Constant annual growth rate applied to `fcf0`
    pub growth: Rate,
    /// Discount rate (weighted average cost of capital)
    pub wacc: Rate,
    /// Number of explicit forecast years
    pub horizon: u32,
    /// Multiple applied to the final-year cash flow to derive terminal value
    pub terminal_multiple: Multiple,
    /// Diluted shares outstanding
    pub shares: Shares,
}

/// The two additive components of equity value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DcfBreakdown {
    /// Sum of present values of the explicit-period cash flows
    pub pv_stage: Money,
    /// Present value of the terminal value
    pub pv_terminal: Money,
}

/// Output of the DCF valuation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DcfResult {
    /// pv_stage + pv_terminal
    pub equity_value: Money,
    pub per_share: Money,
    pub breakdown: DcfBreakdown,
}

/// One explicit forecast year.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DcfYear {
    pub year: u32,
    pub cash_flow: Money,
    /// 1 / (1 + wacc)^year, for display
    pub discount_factor: Rate,
    pub present_value: Money,
}

const FCF0: [Bound; 1] = [Bound::Gt(0.0)];
const GROWTH: [Bound; 2] = [Bound::Gt(-0.5), Bound::Lt(1.0)];
const WACC: [Bound; 2] = [Bound::Gt(0.0), Bound::Lt(1.0)];
const HORIZON: [Bound; 2] = [Bound::Gte(1.0), Bound::Lte(u32::MAX as f64)];
const POSITIVE: [Bound; 1] = [Bound::Gt(0.0)];

/// Longest schedule `project_cash_flows` will materialise.
pub const MAX_SCHEDULE_YEARS: u32 = 1_000_000;

pub(crate) const NON_FINITE_RESULT: &str = "Valuation is outside the representable number range";

impl Validate for DcfInput {
    const RULES: &'static [FieldRule] = &[
        FieldRule::finite("fcf0", &FCF0),
        FieldRule::finite("growth", &GROWTH),
        FieldRule::finite("wacc", &WACC),
        FieldRule::integer("horizon", &HORIZON),
        FieldRule::finite("terminalMultiple", &POSITIVE),
        FieldRule::finite("shares", &POSITIVE),
    ];

    fn values(&self) -> Vec<f64> {
        vec![
            self.fcf0,
            self.growth,
            self.wacc,
            f64::from(self.horizon),
            self.terminal_multiple,
            self.shares,
        ]
    }

    fn from_values(values: &[f64]) -> Self {
        DcfInput {
            fcf0: values[0],
            growth: values[1],
            wacc: values[2],
            // integral and within u32 range once the horizon rule has passed
            horizon: values[3] as u32,
            terminal_multiple: values[4],
            shares: values[5],
        }
    }
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Narrow an untyped value into a `DcfInput`, reporting every violation.
pub fn parse_dcf_input(input: &Value) -> Result<DcfInput, ValidationIssues> {
    DcfInput::parse(input)
}

/// Run a single-stage DCF valuation.
///
/// Fails on the first violated constraint, checked in the order
/// `fcf0`, `growth`, `wacc`, `horizon`, `terminalMultiple`, `shares`.
/// `growth >= wacc` is not a violation; the stage sum is computed literally.
/// Inputs whose valuation overflows `f64` are rejected rather than returned
/// as NaN or infinity.
pub fn dcf(input: &DcfInput) -> ValuationResult<DcfResult> {
    input.validate()?;
    Ok(value_dcf(input)?)
}

/// Explicit-period cash flow schedule underlying `dcf`.
///
/// Horizons above [`MAX_SCHEDULE_YEARS`] are rejected on `horizon`.
pub fn project_cash_flows(input: &DcfInput) -> ValuationResult<Vec<DcfYear>> {
    input.validate()?;
    build_projections(input)
}

/// Advisory notes on a finished valuation. Never affects the numbers.
pub fn dcf_warnings(input: &DcfInput, result: &DcfResult) -> Vec<String> {
    let mut warnings = Vec::new();

    if input.growth >= input.wacc {
        warnings.push(format!(
            "Growth ({}) is at or above WACC ({}); the stage value grows with the horizon",
            input.growth, input.wacc
        ));
    }

    if result.equity_value > 0.0 {
        let tv_pct = result.breakdown.pv_terminal / result.equity_value;
        if tv_pct > 0.75 {
            warnings.push(format!(
                "Terminal value represents {:.1}% of equity value; consider extending the horizon",
                tv_pct * 100.0
            ));
        }
    }

    warnings
}

// ---------------------------------------------------------------------------
// Internal helpers
// ---------------------------------------------------------------------------

/// The valuation proper. Assumes `input` has been validated.
pub(crate) fn value_dcf(input: &DcfInput) -> Result<DcfResult, ValidationIssues> {
    let mut pv_stage: f64 = 0.0;
    for year in 1..=input.horizon {
        pv_stage += project_year(input, year).present_value;
        // a non-finite partial sum cannot recover
        if !pv_stage.is_finite() {
            break;
        }
    }

    let horizon = f64::from(input.horizon);
    let fcf_terminal_year = input.fcf0 * (1.0 + input.growth).powf(horizon);
    let terminal_value = input.terminal_multiple * fcf_terminal_year;
    let pv_terminal = terminal_value / (1.0 + input.wacc).powf(horizon);

    let equity_value = pv_stage + pv_terminal;
    let per_share = equity_value / input.shares;

    let all_finite = [equity_value, per_share, pv_stage, pv_terminal]
        .iter()
        .all(|v| v.is_finite());
    if !all_finite {
        return Err(ValidationIssues::single("", NON_FINITE_RESULT));
    }

    Ok(DcfResult {
        equity_value,
        per_share,
        breakdown: DcfBreakdown {
            pv_stage,
            pv_terminal,
        },
    })
}

fn build_projections(input: &DcfInput) -> ValuationResult<Vec<DcfYear>> {
    if input.horizon > MAX_SCHEDULE_YEARS {
        return Err(ValuationError::InvalidInput {
            field: "horizon".into(),
            reason: format!("Schedule is limited to {MAX_SCHEDULE_YEARS} years"),
        });
    }

    let mut years = Vec::new();
    years
        .try_reserve_exact(input.horizon as usize)
        .map_err(|e| ValuationError::InvalidInput {
            field: "horizon".into(),
            reason: format!("Schedule cannot be allocated: {e}"),
        })?;

    for year in 1..=input.horizon {
        let projected = project_year(input, year);
        if !(projected.cash_flow.is_finite() && projected.present_value.is_finite()) {
            return Err(ValuationError::InvalidInput {
                field: String::new(),
                reason: NON_FINITE_RESULT.into(),
            });
        }
        years.push(projected);
    }
    Ok(years)
}

fn project_year(input: &DcfInput, year: u32) -> DcfYear {
    let t = f64::from(year);
    let cash_flow = input.fcf0 * (1.0 + input.growth).powf(t);
    let compounding = (1.0 + input.wacc).powf(t);

    DcfYear {
        year,
        cash_flow,
        discount_factor: 1.0 / compounding,
        present_value: cash_flow / compounding,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample_dcf_input() -> DcfInput {
        DcfInput {
            fcf0: 100.0,
            growth: 0.03,
            wacc: 0.10,
            horizon: 5,
            terminal_multiple: 10.0,
            shares: 100.0,
        }
    }

    #[test]
    fn test_basic_dcf() {
        let out = dcf(&sample_dcf_input()).unwrap();

        assert!(out.breakdown.pv_stage > 0.0 && out.breakdown.pv_stage.is_finite());
        assert!(out.breakdown.pv_terminal > 0.0 && out.breakdown.pv_terminal.is_finite());
        assert_eq!(
            out.equity_value,
            out.breakdown.pv_stage + out.breakdown.pv_terminal
        );
        assert_eq!(out.per_share, out.equity_value / 100.0);
    }

    #[test]
    fn test_dcf_reference_values() {
        let out = dcf(&sample_dcf_input()).unwrap();

        // Year-by-year PVs of 100 * 1.03^t / 1.10^t, t = 1..5
        let expected_stage: f64 = (1..=5)
            .map(|t| 100.0 * 1.03_f64.powf(t as f64) / 1.10_f64.powf(t as f64))
            .sum();
        assert!((out.breakdown.pv_stage - expected_stage).abs() < 1e-9);
        assert!((out.breakdown.pv_stage - 412.27).abs() < 0.01);

        // TV = 10 * 100 * 1.03^5 = 1159.27; PV = 1159.27 / 1.61051 = 719.82
        assert!((out.breakdown.pv_terminal - 719.82).abs() < 0.01);
    }

    #[test]
    fn test_dcf_single_year_horizon() {
        let mut input = sample_dcf_input();
        input.horizon = 1;
        let out = dcf(&input).unwrap();

        assert_eq!(out.breakdown.pv_stage, 100.0 * 1.03 / 1.10);
        assert_eq!(out.breakdown.pv_terminal, 10.0 * (100.0 * 1.03) / 1.10);
    }

    #[test]
    fn test_dcf_growth_above_wacc_is_computed() {
        let mut input = sample_dcf_input();
        input.growth = 0.20;
        input.wacc = 0.05;

        let short = dcf(&input).unwrap();
        input.horizon = 20;
        let long = dcf(&input).unwrap();

        assert!(long.breakdown.pv_stage > short.breakdown.pv_stage);
        assert!(long.equity_value.is_finite());
    }

    #[test]
    fn test_dcf_fails_on_first_field_in_order() {
        let mut input = sample_dcf_input();
        input.fcf0 = -5.0;
        input.wacc = 1.0;

        let err = dcf(&input).unwrap_err();
        assert_eq!(err.field(), Some("fcf0"));
        assert!(err.to_string().contains("fcf0"));
    }

    #[test]
    fn test_dcf_boundaries_rejected() {
        let cases: Vec<(&str, DcfInput)> = vec![
            ("fcf0", DcfInput { fcf0: 0.0, ..sample_dcf_input() }),
            ("growth", DcfInput { growth: -0.5, ..sample_dcf_input() }),
            ("growth", DcfInput { growth: 1.0, ..sample_dcf_input() }),
            ("wacc", DcfInput { wacc: 0.0, ..sample_dcf_input() }),
            ("wacc", DcfInput { wacc: 1.0, ..sample_dcf_input() }),
            ("horizon", DcfInput { horizon: 0, ..sample_dcf_input() }),
            ("terminalMultiple", DcfInput { terminal_multiple: 0.0, ..sample_dcf_input() }),
            ("shares", DcfInput { shares: 0.0, ..sample_dcf_input() }),
        ];

        for (field, input) in cases {
            match dcf(&input) {
                Err(ValuationError::InvalidInput { field: f, .. }) => assert_eq!(f, field),
                other => panic!("expected {field} to be rejected, got {other:?}"),
            }
        }
    }

    #[test]
    fn test_dcf_non_finite_rejected() {
        let mut input = sample_dcf_input();
        input.terminal_multiple = f64::INFINITY;
        assert_eq!(dcf(&input).unwrap_err().field(), Some("terminalMultiple"));
    }

    #[test]
    fn test_projection_schedule_matches_stage_sum() {
        let input = sample_dcf_input();
        let schedule = project_cash_flows(&input).unwrap();
        let out = dcf(&input).unwrap();

        assert_eq!(schedule.len(), 5);
        assert_eq!(schedule[0].year, 1);
        assert_eq!(schedule[0].cash_flow, 100.0 * 1.03_f64.powf(1.0));

        let mut sum = 0.0;
        for year in &schedule {
            sum += year.present_value;
        }
        assert_eq!(sum, out.breakdown.pv_stage);
    }

    #[test]
    fn test_dcf_overflow_rejected() {
        // both compounding factors overflow long before year 2000
        let input = DcfInput {
            growth: 0.5,
            wacc: 0.6,
            horizon: 2000,
            ..sample_dcf_input()
        };
        let err = dcf(&input).unwrap_err();
        assert_eq!(err.field(), Some(""));
        assert!(err.to_string().contains(NON_FINITE_RESULT));
    }

    #[test]
    fn test_dcf_long_horizon_still_finite() {
        let input = DcfInput {
            growth: 0.0,
            wacc: 0.01,
            horizon: 100_000,
            ..sample_dcf_input()
        };
        let out = dcf(&input).unwrap();
        assert!(out.equity_value.is_finite());
    }

    #[test]
    fn test_projection_schedule_capped() {
        for horizon in [MAX_SCHEDULE_YEARS + 1, u32::MAX] {
            let input = DcfInput {
                horizon,
                ..sample_dcf_input()
            };
            let err = project_cash_flows(&input).unwrap_err();
            assert_eq!(err.field(), Some("horizon"));
        }
    }

    #[test]
    fn test_projection_schedule_overflow_rejected() {
        let input = DcfInput {
            growth: 0.9,
            wacc: 0.5,
            horizon: 5_000,
            ..sample_dcf_input()
        };
        assert_eq!(project_cash_flows(&input).unwrap_err().field(), Some(""));
    }

    #[test]
    fn test_parse_horizon_float_rejected() {
        let err = parse_dcf_input(&json!({
            "fcf0": 100, "growth": 0.03, "wacc": 0.1,
            "horizon": 1.5, "terminalMultiple": 10, "shares": 100
        }))
        .unwrap_err();
        assert_eq!(err.len(), 1);
        assert_eq!(err.issues[0].path, "horizon");
        assert_eq!(err.issues[0].msg, "Expected integer, received float");
    }

    #[test]
    fn test_parse_camel_case_fields() {
        let input = parse_dcf_input(&json!({
            "fcf0": 100, "growth": 0.03, "wacc": 0.1,
            "horizon": 5, "terminalMultiple": 10, "shares": 100
        }))
        .unwrap();
        assert_eq!(input, sample_dcf_input());
    }

    #[test]
    fn test_warnings() {
        let input = sample_dcf_input();
        let out = dcf(&input).unwrap();
        // TV share here is ~63%, growth below WACC
        assert!(dcf_warnings(&input, &out).is_empty());

        let mut hot = input;
        hot.growth = 0.12;
        hot.terminal_multiple = 40.0;
        let out = dcf(&hot).unwrap();
        assert_eq!(dcf_warnings(&hot, &out).len(), 2);
    }
}
