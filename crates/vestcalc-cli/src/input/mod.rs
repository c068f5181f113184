pub mod file;

use serde::de::DeserializeOwned;
use std::io::{self, Read};

use vestcalc_core::GrantInput;

/// Grant fields from `--input <file.json>`, else from piped stdin, else none.
pub fn read_grant_input(
    path: Option<&str>,
) -> Result<Option<GrantInput>, Box<dyn std::error::Error>> {
    match path {
        Some(path) => Ok(Some(file::read_json(path)?)),
        None => read_piped(io::stdin()),
    }
}

/// Deserialise a record piped on stdin. An interactive terminal is never
/// read, and whitespace-only input counts as no record.
fn read_piped<T: DeserializeOwned>(
    stdin: io::Stdin,
) -> Result<Option<T>, Box<dyn std::error::Error>> {
    if atty::is(atty::Stream::Stdin) {
        return Ok(None);
    }
    let mut raw = String::new();
    stdin.lock().read_to_string(&mut raw)?;
    parse_record(&raw)
}

fn parse_record<T: DeserializeOwned>(raw: &str) -> Result<Option<T>, Box<dyn std::error::Error>> {
    if raw.trim().is_empty() {
        return Ok(None);
    }
    let record = serde_json::from_str(raw)
        .map_err(|e| format!("Failed to parse grant record from stdin: {e}"))?;
    Ok(Some(record))
}
