//! Field selector support for list and delete-collection requests
//!
//! Only the fields every resource supports without an index are available:
//! `metadata.name` and `metadata.namespace`.

use crate::{Error, Result};
use serde_json::Value;

/// Helper to extract a string field at a given path (e.g., "metadata", "name")
fn get_string_field<'a>(obj: &'a Value, parent: &str, field: &str) -> Option<&'a str> {
    obj.get(parent)
        .and_then(|p| p.get(field))
        .and_then(|v| v.as_str())
}

fn field_value<'a>(obj: &'a Value, field: &str) -> Result<&'a str> {
    match field {
        "metadata.name" => Ok(get_string_field(obj, "metadata", "name").unwrap_or_default()),
        "metadata.namespace" => {
            Ok(get_string_field(obj, "metadata", "namespace").unwrap_or_default())
        }
        other => Err(Error::InvalidRequest(format!(
            "field label not supported: {}",
            other
        ))),
    }
}

/// Check an object against a field selector such as `metadata.name=foo,metadata.namespace!=bar`.
///
/// An empty selector matches everything.
pub fn matches_field_selector(obj: &Value, selector: &str) -> Result<bool> {
    for requirement in selector.split(',').map(str::trim).filter(|r| !r.is_empty()) {
        let (field, expected, negated) = if let Some((f, v)) = requirement.split_once("!=") {
            (f, v, true)
        } else if let Some((f, v)) = requirement.split_once("==") {
            (f, v, false)
        } else if let Some((f, v)) = requirement.split_once('=') {
            (f, v, false)
        } else {
            return Err(Error::InvalidRequest(format!(
                "invalid field selector requirement: {}",
                requirement
            )));
        };

        let actual = field_value(obj, field.trim())?;
        if (actual == expected.trim()) == negated {
            return Ok(false);
        }
    }
    Ok(true)
}
