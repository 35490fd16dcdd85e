//! JSON Output

use std::path::Path;

use crate::RenderError;
use crate::result_set::ResultSet;

/// Serialize the full result set as prettified JSON.
pub fn generate_json_report(results: &ResultSet) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(results)
}

/// Load a result set written by [`generate_json_report`].
pub fn load_json_report(path: &Path) -> Result<ResultSet, RenderError> {
    let content = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}
