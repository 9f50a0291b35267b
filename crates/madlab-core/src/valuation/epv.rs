use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::types::{Money, Rate, Shares};
use crate::validation::{Bound, FieldRule, Validate, ValidationIssues};
use crate::ValuationResult;

use super::dcf::NON_FINITE_RESULT;

/// Input parameters for an Earnings Power Value estimate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EpvInput {
    /// Earnings before interest and taxes
    pub ebit: Money,
    /// Marginal tax rate on operating income, in [0, 1)
    pub tax_rate: Rate,
    /// Share of after-tax operating income reinvested, in [0, 1)
    pub reinvestment_rate: Rate,
    /// Capitalisation rate
    pub wacc: Rate,
    pub shares: Shares,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EpvResult {
    pub epv: Money,
    pub per_share: Money,
}

const POSITIVE: [Bound; 1] = [Bound::Gt(0.0)];
const FRACTION: [Bound; 2] = [Bound::Gte(0.0), Bound::Lt(1.0)];
const WACC: [Bound; 2] = [Bound::Gt(0.0), Bound::Lt(1.0)];

impl Validate for EpvInput {
    const RULES: &'static [FieldRule] = &[
        FieldRule::finite("ebit", &POSITIVE),
        FieldRule::finite("taxRate", &FRACTION),
        FieldRule::finite("reinvestmentRate", &FRACTION),
        FieldRule::finite("wacc", &WACC),
        FieldRule::finite("shares", &POSITIVE),
    ];

    fn values(&self) -> Vec<f64> {
        vec![
            self.ebit,
            self.tax_rate,
            self.reinvestment_rate,
            self.wacc,
            self.shares,
        ]
    }

    fn from_values(values: &[f64]) -> Self {
        EpvInput {
            ebit: values[0],
            tax_rate: values[1],
            reinvestment_rate: values[2],
            wacc: values[3],
            shares: values[4],
        }
    }
}

/// Narrow an untyped value into an `EpvInput`, reporting every violation.
pub fn parse_epv_input(input: &Value) -> Result<EpvInput, ValidationIssues> {
    EpvInput::parse(input)
}

/// Capitalise after-tax, post-reinvestment operating income at WACC.
///
/// Fails on the first violated constraint, checked in the order
/// `ebit`, `taxRate`, `reinvestmentRate`, `wacc`, `shares`.
pub fn epv(input: &EpvInput) -> ValuationResult<EpvResult> {
    input.validate()?;
    Ok(value_epv(input)?)
}

pub(crate) fn value_epv(input: &EpvInput) -> Result<EpvResult, ValidationIssues> {
    let after_tax_operating_income = input.ebit * (1.0 - input.tax_rate);
    let free_cash_flow_proxy = after_tax_operating_income * (1.0 - input.reinvestment_rate);
    // wacc > 0 once validated
    let epv_value = free_cash_flow_proxy / input.wacc;

    let per_share = epv_value / input.shares;

    if !(epv_value.is_finite() && per_share.is_finite()) {
        return Err(ValidationIssues::single("", NON_FINITE_RESULT));
    }
    Ok(EpvResult {
        epv: epv_value,
        per_share,
    })
}
