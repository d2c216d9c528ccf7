//! Normalization of the polymorphic `configuration[].default_value` field
//!
//! The product revision endpoints send `default_value` as a string for
//! `text`/`selection` inputs and as a boolean for `switch` inputs. The local
//! model always holds a string, so responses are rewritten to strings before
//! decoding and request bodies are rewritten back to booleans for `switch`
//! entries before sending.

use serde_json::{Map, Value};
use thiserror::Error;

const CONFIGURATION: &str = "configuration";
const INPUT_TYPE: &str = "input_type";
const DEFAULT_VALUE: &str = "default_value";
const SWITCH: &str = "switch";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum NormalizeError {
    #[error("schema violation: {0}")]
    SchemaViolation(String),

    #[error("cannot convert default_value {original} (sanitized: {sanitized}) to a bool")]
    Coercion { original: String, sanitized: String },
}

/// What to do with a document that has no `configuration` key (or a null one)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MissingConfiguration {
    #[default]
    PassThrough,
    Reject,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Normalizer {
    missing_configuration: MissingConfiguration,
}

impl Normalizer {
    pub fn new(missing_configuration: MissingConfiguration) -> Self {
        Self {
            missing_configuration,
        }
    }

    pub fn missing_configuration(&self) -> MissingConfiguration {
        self.missing_configuration
    }

    /// Rewrite `switch` entries so that `default_value` is a native bool.
    /// Other input types are left as the caller supplied them.
    pub fn outbound(&self, document: Value) -> Result<Value, NormalizeError> {
        self.rewrite_entries(document, |index, input_type, entry| {
            if input_type != SWITCH {
                return Ok(());
            }

            let Some(current) = entry.get(DEFAULT_VALUE) else {
                return Ok(());
            };
            if current.is_boolean() {
                return Ok(());
            }

            let coerced = coerce_to_bool(current)?;
            tracing::warn!(
                "Forcing conversion of configuration[{}].default_value {} to bool {} before sending",
                index,
                current,
                coerced
            );
            entry.insert(DEFAULT_VALUE.to_string(), Value::Bool(coerced));
            Ok(())
        })
    }

    /// Rewrite every entry so that `default_value` is a string. A missing key
    /// stays missing and an explicit null stays null.
    pub fn inbound(&self, document: Value) -> Result<Value, NormalizeError> {
        self.rewrite_entries(document, |index, _input_type, entry| {
            let text = match entry.get(DEFAULT_VALUE) {
                None | Some(Value::Null) | Some(Value::String(_)) => return Ok(()),
                Some(other) => render(other),
            };

            tracing::warn!(
                "Forcing conversion of configuration[{}].default_value to string {:?} before decoding",
                index,
                text
            );
            entry.insert(DEFAULT_VALUE.to_string(), Value::String(text));
            Ok(())
        })
    }

    fn rewrite_entries<F>(&self, document: Value, mut rewrite: F) -> Result<Value, NormalizeError>
    where
        F: FnMut(usize, &str, &mut Map<String, Value>) -> Result<(), NormalizeError>,
    {
        let mut object = match document {
            Value::Object(object) => object,
            other => {
                return Err(NormalizeError::SchemaViolation(format!(
                    "expected a JSON object, found {}",
                    kind(&other)
                )))
            }
        };

        let present = object
            .get(CONFIGURATION)
            .is_some_and(|configuration| !configuration.is_null());
        if !present {
            return match self.missing_configuration {
                MissingConfiguration::PassThrough => Ok(Value::Object(object)),
                MissingConfiguration::Reject => Err(NormalizeError::SchemaViolation(
                    "configuration is missing".to_string(),
                )),
            };
        }

        let entries = match object.get_mut(CONFIGURATION) {
            Some(Value::Array(entries)) => entries,
            other => {
                return Err(NormalizeError::SchemaViolation(format!(
                    "configuration is not an array, found {}",
                    other.map_or("nothing", |value| kind(value))
                )))
            }
        };

        for (index, element) in entries.iter_mut().enumerate() {
            let entry = match element {
                Value::Object(entry) => entry,
                other => {
                    return Err(NormalizeError::SchemaViolation(format!(
                        "configuration[{}] is not an object, found {}",
                        index,
                        kind(other)
                    )))
                }
            };

            let input_type = match entry.get(INPUT_TYPE) {
                Some(Value::String(input_type)) => input_type.clone(),
                Some(other) => {
                    return Err(NormalizeError::SchemaViolation(format!(
                        "configuration[{}].input_type is not a string, found {}",
                        index,
                        kind(other)
                    )))
                }
                None => {
                    return Err(NormalizeError::SchemaViolation(format!(
                        "configuration[{}].input_type is missing",
                        index
                    )))
                }
            };

            rewrite(index, &input_type, entry)?;
        }

        Ok(Value::Object(object))
    }
}

fn coerce_to_bool(value: &Value) -> Result<bool, NormalizeError> {
    let original = render(value);
    let sanitized: String = original.chars().filter(|c| *c != '"' && *c != '\'').collect();

    match sanitized.to_ascii_lowercase().as_str() {
        "true" | "1" | "t" => Ok(true),
        "false" | "0" | "f" => Ok(false),
        _ => Err(NormalizeError::Coercion {
            original,
            sanitized,
        }),
    }
}

/// Strings verbatim, floats in shortest form (`1.0` is `1`), everything else
/// as compact JSON text
fn render(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) if n.is_f64() => n.as_f64().map_or_else(|| n.to_string(), |f| f.to_string()),
        other => other.to_string(),
    }
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
