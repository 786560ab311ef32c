//! Output variables read from a JSON document.
//!
//! Accepts the shape printed by `terraform output -json`
//! (`{"key": {"value": ..., "type": ...}}`) as well as a flat
//! `{"key": "value"}` map.

use super::Terraformer;
use crate::error::{InfraError, Result, ToolError};
use serde_json::Value;
use std::collections::HashMap;
use std::path::PathBuf;

fn value_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// Parse tool outputs and keep the requested keys.
///
/// Keys not present in the document are left out of the result.
pub fn parse_output_variables(json: &str, keys: &[String]) -> Result<HashMap<String, String>> {
    let document: Value = serde_json::from_str(json)?;
    let Value::Object(outputs) = document else {
        return Err(InfraError::MalformedToolOutput(
            "tool outputs are not a JSON object".to_string(),
        ));
    };

    let mut vars = HashMap::with_capacity(keys.len());
    for key in keys {
        let Some(entry) = outputs.get(key) else {
            log::debug!("output variable {key} not present");
            continue;
        };
        let value = match entry {
            Value::Object(wrapped) => wrapped.get("value").map(value_to_string).ok_or_else(|| {
                InfraError::MalformedToolOutput(format!("output variable {key} has no value"))
            })?,
            other => value_to_string(other),
        };
        vars.insert(key.clone(), value);
    }
    Ok(vars)
}

/// Reads output variables from a JSON file written after the tool ran.
#[derive(Debug, Clone)]
pub struct OutputFile {
    pub path: PathBuf,
}

impl OutputFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        OutputFile { path: path.into() }
    }
}

impl Terraformer for OutputFile {
    fn state_output_variables(
        &self,
        keys: &[String],
    ) -> std::result::Result<HashMap<String, String>, ToolError> {
        log::info!("reading output variables from {}", self.path.display());
        let json = std::fs::read_to_string(&self.path)?;
        Ok(parse_output_variables(&json, keys)?)
    }
}
