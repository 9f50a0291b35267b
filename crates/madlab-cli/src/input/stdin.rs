use serde_json::Value;
use std::io::{self, Read};

/// Read piped input. JSON is tried first, then YAML.
/// Returns None if stdin is a TTY (interactive) or empty.
pub fn read_stdin() -> Result<Option<Value>, Box<dyn std::error::Error>> {
    if atty::is(atty::Stream::Stdin) {
        return Ok(None);
    }

    let mut buffer = String::new();
    io::stdin().read_to_string(&mut buffer)?;
    parse_piped(&buffer)
}

fn parse_piped(buffer: &str) -> Result<Option<Value>, Box<dyn std::error::Error>> {
    let trimmed = buffer.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }

    match serde_json::from_str(trimmed) {
        Ok(value) => Ok(Some(value)),
        Err(json_err) => match serde_yaml::from_str::<Value>(trimmed) {
            // a bare scalar means the text was neither a JSON nor a YAML document
            Ok(value) if value.is_object() => Ok(Some(value)),
            _ => Err(format!("Failed to parse stdin: {json_err}").into()),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_empty_stdin_is_none() {
        assert!(parse_piped("  \n").unwrap().is_none());
    }

    #[test]
    fn test_json_stdin() {
        let v = parse_piped(r#"{"ebit": 1000}"#).unwrap().unwrap();
        assert_eq!(v, json!({ "ebit": 1000 }));
    }

    #[test]
    fn test_yaml_stdin() {
        let v = parse_piped("ebit: 1000\nwacc: 0.08\n").unwrap().unwrap();
        assert_eq!(v["wacc"], json!(0.08));
    }

    #[test]
    fn test_garbage_stdin_errors() {
        assert!(parse_piped("not valid at all").is_err());
    }
}
