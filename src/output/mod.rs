//! JSON output formatting

use crate::core::error::Result;
use serde::Serialize;
use std::io::Write;
use std::path::Path;

/// Serialize `value` as pretty or compact JSON
pub fn to_json<T: Serialize>(value: &T, pretty: bool) -> Result<String> {
    let json = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    Ok(json)
}

/// Write `value` as JSON to `path`, or to stdout when `None`
pub fn write_json<T: Serialize>(value: &T, pretty: bool, path: Option<&Path>) -> Result<()> {
    let json = to_json(value, pretty)?;
    match path {
        Some(path) => std::fs::write(path, json + "\n")?,
        None => {
            let stdout = std::io::stdout();
            let mut handle = stdout.lock();
            writeln!(handle, "{}", json)?;
        }
    }
    Ok(())
}
