pub mod file;
pub mod stdin;

use serde_json::Value;

/// Pick the input source: `--input` file first, then piped stdin, then
/// whatever the command builds from its own flags.
pub fn resolve<F>(path: Option<&str>, from_flags: F) -> Result<Value, Box<dyn std::error::Error>>
where
    F: FnOnce() -> Value,
{
    if let Some(path) = path {
        tracing::debug!(path, "reading input file");
        return file::read_value(path);
    }
    if let Some(data) = stdin::read_stdin()? {
        tracing::debug!("read input from stdin");
        return Ok(data);
    }
    Ok(from_flags())
}
