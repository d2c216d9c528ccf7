//! Conversions between serde state models and Terraform values
//!
//! Terraform treats an empty string or list differently from an unset one,
//! and the marketplace API never distinguishes the two. Empty values are
//! therefore stored as null.

use serde::de::DeserializeOwned;
use serde::Serialize;
use tfplug::types::{AttributePath, Diagnostic, DynamicValue};

pub fn string_or_null(value: String) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value)
    }
}

pub fn list_or_null<T>(items: Vec<T>) -> Option<Vec<T>> {
    if items.is_empty() {
        None
    } else {
        Some(items)
    }
}

/// Strip the stray double quotes some values arrive with
pub fn sanitize(value: Option<String>) -> Option<String> {
    value.map(|v| v.replace('"', ""))
}

pub fn decode_model<T: DeserializeOwned>(value: &DynamicValue, what: &str) -> Result<T, Diagnostic> {
    value.deserialize_into().map_err(|e| {
        Diagnostic::error(
            format!("Couldn't read {}", what),
            format!("error: {}", e),
        )
    })
}

pub fn encode_model<T: Serialize>(model: &T) -> Result<DynamicValue, Diagnostic> {
    DynamicValue::from_serialize(model)
        .map_err(|e| Diagnostic::error("Couldn't write state", format!("error: {}", e)))
}

/// Unwrap a planned value that must be set
pub fn require<T>(value: Option<T>, name: &str) -> Result<T, Diagnostic> {
    value.ok_or_else(|| {
        Diagnostic::error(
            format!("{} needs to be set", name),
            format!("{} is either null or unknown", name),
        )
        .with_attribute(AttributePath::new(name))
    })
}

/// Read a string attribute from configuration, treating null, unknown and
/// empty as missing
pub fn required_string(config: &DynamicValue, name: &str) -> Result<String, Diagnostic> {
    let value = config
        .get_optional_string(&AttributePath::new(name))
        .ok()
        .flatten()
        .filter(|value| !value.is_empty());
    require(value, name)
}
