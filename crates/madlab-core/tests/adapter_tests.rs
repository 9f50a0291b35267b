use madlab_core::adapter::{compute_dcf, compute_dcf_json, compute_epv, Computation};
use madlab_core::valuation::{dcf, DcfInput};
use pretty_assertions::assert_eq;
use serde_json::{json, Value};

fn valid_dcf_json() -> Value {
    json!({
        "fcf0": 100,
        "growth": 0.03,
        "wacc": 0.10,
        "horizon": 5,
        "terminalMultiple": 10,
        "shares": 100
    })
}

#[test]
fn test_compute_dcf_matches_imperative_path() {
    let outcome = compute_dcf(&valid_dcf_json());
    let imperative = dcf(&DcfInput {
        fcf0: 100.0,
        growth: 0.03,
        wacc: 0.10,
        horizon: 5,
        terminal_multiple: 10.0,
        shares: 100.0,
    })
    .unwrap();

    assert_eq!(outcome, Computation::Ok(imperative));
}

#[test]
fn test_malformed_inputs_never_throw() {
    let inputs = [
        Value::Null,
        json!("not an object"),
        json!({}),
        json!([]),
        json!(42),
        json!(true),
    ];
    for input in &inputs {
        match compute_dcf(input) {
            Computation::Err(report) => assert!(!report.is_empty(), "no issues for {input}"),
            Computation::Ok(v) => panic!("{input} unexpectedly valued at {v:?}"),
        }
        assert!(!compute_epv(input).is_ok());
    }
}

#[test]
fn test_null_input_issue() {
    let v = serde_json::to_value(compute_dcf(&Value::Null)).unwrap();
    assert_eq!(
        v,
        json!({
            "ok": false,
            "error": { "issues": [ { "path": "", "msg": "Expected object, received null" } ] }
        })
    );
}

#[test]
fn test_aggregate_issue_reporting() {
    let outcome = compute_dcf(&json!({ "fcf0": -1, "wacc": 2, "horizon": 0 }));
    let report = outcome.issues().expect("expected failure");

    assert!(report.len() >= 3);
    assert!(report.mentions("fcf0"));
    assert!(report.mentions("wacc"));
    assert!(report.mentions("horizon"));

    let paths: Vec<&str> = report.issues.iter().map(|i| i.path.as_str()).collect();
    assert_eq!(
        paths,
        vec!["fcf0", "growth", "wacc", "horizon", "terminalMultiple", "shares"]
    );
}

#[test]
fn test_boundary_rejections_through_adapter() {
    let cases = [
        ("fcf0", json!(0)),
        ("wacc", json!(1)),
        ("horizon", json!(0)),
        ("horizon", json!(1.5)),
    ];
    for (field, bad) in cases {
        let mut input = valid_dcf_json();
        input[field] = bad.clone();
        let report = compute_dcf(&input)
            .into_result()
            .expect_err("boundary value must be rejected");
        assert!(
            report.issues.iter().all(|i| i.path == field),
            "{field}={bad} produced {report}"
        );
    }

    let epv_input = json!({
        "ebit": 1000, "taxRate": 1, "reinvestmentRate": 0.1, "wacc": 0.08, "shares": 50
    });
    assert!(compute_epv(&epv_input).issues().unwrap().mentions("taxRate"));
}

#[test]
fn test_wrong_types_reported_per_field() {
    let outcome = compute_epv(&json!({
        "ebit": "1000",
        "taxRate": null,
        "reinvestmentRate": [0.1],
        "wacc": 0.08,
        "shares": 50
    }));
    let msgs: Vec<String> = outcome
        .issues()
        .unwrap()
        .issues
        .iter()
        .map(|i| i.to_string())
        .collect();
    assert_eq!(
        msgs,
        vec![
            "ebit: Expected number, received string",
            "taxRate: Expected number, received null",
            "reinvestmentRate: Expected number, received array",
        ]
    );
}

#[test]
fn test_extra_fields_ignored() {
    let mut input = valid_dcf_json();
    input["ticker"] = json!("ACME");
    assert!(compute_dcf(&input).is_ok());
}

#[test]
fn test_json_bridge_output_parses() {
    let out: Value = serde_json::from_str(&compute_dcf_json(&valid_dcf_json().to_string())).unwrap();
    assert_eq!(out["ok"], json!(true));
    let value = &out["value"];
    let stage = value["breakdown"]["pvStage"].as_f64().unwrap();
    let terminal = value["breakdown"]["pvTerminal"].as_f64().unwrap();
    let equity = value["equityValue"].as_f64().unwrap();
    assert!((equity - (stage + terminal)).abs() < 1e-9);
}

#[test]
fn test_overflowing_valuation_is_an_issue() {
    let input = json!({
        "fcf0": 100, "growth": 0.5, "wacc": 0.6,
        "horizon": 2000, "terminalMultiple": 10, "shares": 100
    });
    let report = compute_dcf(&input).into_result().unwrap_err();
    assert_eq!(report.len(), 1);
    assert_eq!(report.issues[0].path, "");

    let out: Value = serde_json::from_str(&compute_dcf_json(&input.to_string())).unwrap();
    assert_eq!(out["ok"], json!(false));
    assert!(out.get("value").is_none());

    let epv_input = json!({
        "ebit": 1e308, "taxRate": 0, "reinvestmentRate": 0, "wacc": 1e-10, "shares": 1
    });
    assert!(!compute_epv(&epv_input).is_ok());
}
