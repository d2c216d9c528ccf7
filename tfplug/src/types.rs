//! Core value types shared between Terraform and providers
//!
//! Configuration, plans and state all travel as [`DynamicValue`]. Providers
//! either walk them with [`AttributePath`] accessors or bridge them to serde
//! models with [`DynamicValue::from_serialize`] and
//! [`DynamicValue::deserialize_into`].

use crate::error::{Result, TfplugError};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

const UNKNOWN_MARKER: &str = "__unknown__";

// Whole numbers up to 2^53 survive the f64 round trip exactly.
const MAX_EXACT_INTEGER: f64 = 9_007_199_254_740_992.0;

/// Dynamic represents Terraform values that can be of any type
#[derive(Debug, Clone, PartialEq)]
pub enum Dynamic {
    Null,
    Bool(bool),
    /// All numbers are f64 to match Terraform
    Number(f64),
    String(String),
    /// Ordered, allows duplicates
    List(Vec<Dynamic>),
    /// Objects are represented as maps
    Map(HashMap<String, Dynamic>),
    /// Value not yet known (during planning)
    Unknown,
}

impl Dynamic {
    pub fn type_name(&self) -> &'static str {
        match self {
            Dynamic::Null => "null",
            Dynamic::Bool(_) => "bool",
            Dynamic::Number(_) => "number",
            Dynamic::String(_) => "string",
            Dynamic::List(_) => "list",
            Dynamic::Map(_) => "map",
            Dynamic::Unknown => "unknown",
        }
    }

    pub fn from_json(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => Dynamic::Null,
            serde_json::Value::Bool(b) => Dynamic::Bool(b),
            serde_json::Value::Number(n) => n.as_f64().map(Dynamic::Number).unwrap_or(Dynamic::Null),
            serde_json::Value::String(s) => Dynamic::String(s),
            serde_json::Value::Array(items) => {
                Dynamic::List(items.into_iter().map(Dynamic::from_json).collect())
            }
            serde_json::Value::Object(fields) => Dynamic::Map(
                fields
                    .into_iter()
                    .map(|(k, v)| (k, Dynamic::from_json(v)))
                    .collect(),
            ),
        }
    }

    /// Unknown values become null; whole numbers become JSON integers so
    /// integer fields of serde models decode cleanly.
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Dynamic::Null | Dynamic::Unknown => serde_json::Value::Null,
            Dynamic::Bool(b) => serde_json::Value::Bool(*b),
            Dynamic::Number(n) => number_to_json(*n),
            Dynamic::String(s) => serde_json::Value::String(s.clone()),
            Dynamic::List(items) => {
                serde_json::Value::Array(items.iter().map(Dynamic::to_json).collect())
            }
            Dynamic::Map(fields) => serde_json::Value::Object(
                fields
                    .iter()
                    .map(|(k, v)| (k.clone(), v.to_json()))
                    .collect(),
            ),
        }
    }
}

fn is_exact_integer(n: f64) -> bool {
    n.is_finite() && n.fract() == 0.0 && n.abs() <= MAX_EXACT_INTEGER
}

fn number_to_json(n: f64) -> serde_json::Value {
    if is_exact_integer(n) {
        serde_json::Value::from(n as i64)
    } else {
        serde_json::Number::from_f64(n)
            .map(serde_json::Value::Number)
            .unwrap_or(serde_json::Value::Null)
    }
}

impl Serialize for Dynamic {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        match self {
            Dynamic::Null => serializer.serialize_unit(),
            Dynamic::Bool(b) => serializer.serialize_bool(*b),
            Dynamic::Number(n) if is_exact_integer(*n) => serializer.serialize_i64(*n as i64),
            Dynamic::Number(n) => serializer.serialize_f64(*n),
            Dynamic::String(s) => serializer.serialize_str(s),
            Dynamic::List(l) => l.serialize(serializer),
            Dynamic::Map(m) => m.serialize(serializer),
            Dynamic::Unknown => serializer.serialize_str(UNKNOWN_MARKER),
        }
    }
}

impl<'de> Deserialize<'de> for Dynamic {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        use serde::de::{self, Visitor};
        use std::fmt;

        struct DynamicVisitor;

        impl<'de> Visitor<'de> for DynamicVisitor {
            type Value = Dynamic;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("a valid Dynamic value")
            }

            fn visit_unit<E: de::Error>(self) -> std::result::Result<Dynamic, E> {
                Ok(Dynamic::Null)
            }

            fn visit_none<E: de::Error>(self) -> std::result::Result<Dynamic, E> {
                Ok(Dynamic::Null)
            }

            fn visit_bool<E: de::Error>(self, value: bool) -> std::result::Result<Dynamic, E> {
                Ok(Dynamic::Bool(value))
            }

            fn visit_i64<E: de::Error>(self, value: i64) -> std::result::Result<Dynamic, E> {
                Ok(Dynamic::Number(value as f64))
            }

            fn visit_u64<E: de::Error>(self, value: u64) -> std::result::Result<Dynamic, E> {
                Ok(Dynamic::Number(value as f64))
            }

            fn visit_f64<E: de::Error>(self, value: f64) -> std::result::Result<Dynamic, E> {
                Ok(Dynamic::Number(value))
            }

            fn visit_str<E: de::Error>(self, value: &str) -> std::result::Result<Dynamic, E> {
                if value == UNKNOWN_MARKER {
                    Ok(Dynamic::Unknown)
                } else {
                    Ok(Dynamic::String(value.to_string()))
                }
            }

            fn visit_string<E: de::Error>(self, value: String) -> std::result::Result<Dynamic, E> {
                if value == UNKNOWN_MARKER {
                    Ok(Dynamic::Unknown)
                } else {
                    Ok(Dynamic::String(value))
                }
            }

            fn visit_seq<V>(self, mut seq: V) -> std::result::Result<Dynamic, V::Error>
            where
                V: de::SeqAccess<'de>,
            {
                let mut vec = Vec::new();
                while let Some(elem) = seq.next_element()? {
                    vec.push(elem);
                }
                Ok(Dynamic::List(vec))
            }

            fn visit_map<V>(self, mut map: V) -> std::result::Result<Dynamic, V::Error>
            where
                V: de::MapAccess<'de>,
            {
                let mut hashmap = HashMap::new();
                while let Some((key, value)) = map.next_entry()? {
                    hashmap.insert(key, value);
                }
                Ok(Dynamic::Map(hashmap))
            }
        }

        deserializer.deserialize_any(DynamicVisitor)
    }
}

/// DynamicValue wraps Dynamic and provides encoding and typed access
#[derive(Debug, Clone, PartialEq)]
pub struct DynamicValue {
    pub value: Dynamic,
}

impl DynamicValue {
    pub fn new(value: Dynamic) -> Self {
        Self { value }
    }

    pub fn null() -> Self {
        Self {
            value: Dynamic::Null,
        }
    }

    /// Encode a serde model as a value, e.g. to build new state.
    pub fn from_serialize<T: Serialize>(model: &T) -> Result<Self> {
        let json = serde_json::to_value(model)
            .map_err(|e| TfplugError::EncodingError(format!("model encoding failed: {}", e)))?;
        Ok(Self::new(Dynamic::from_json(json)))
    }

    /// Decode the value into a serde model. Unknown values decode as null.
    pub fn deserialize_into<T: DeserializeOwned>(&self) -> Result<T> {
        serde_json::from_value(self.value.to_json())
            .map_err(|e| TfplugError::DecodingError(format!("model decoding failed: {}", e)))
    }

    /// Terraform uses msgpack on the wire
    pub fn encode_msgpack(&self) -> Result<Vec<u8>> {
        match &self.value {
            Dynamic::Null => Ok(vec![]),
            value => rmp_serde::encode::to_vec(value)
                .map_err(|e| TfplugError::EncodingError(format!("msgpack encoding failed: {}", e))),
        }
    }

    pub fn decode_msgpack(data: &[u8]) -> Result<Self> {
        if data.is_empty() {
            return Ok(Self::null());
        }

        let value = rmp_serde::decode::from_slice::<Dynamic>(data)
            .map_err(|e| TfplugError::DecodingError(format!("msgpack decoding failed: {}", e)))?;
        Ok(Self { value })
    }

    pub fn get_string(&self, path: &AttributePath) -> Result<String> {
        match self.navigate_path(path)? {
            Dynamic::String(s) => Ok(s.clone()),
            other => Err(mismatch("string", other)),
        }
    }

    /// Like [`get_string`](Self::get_string), but null, unknown and missing
    /// attributes all read as `None`.
    pub fn get_optional_string(&self, path: &AttributePath) -> Result<Option<String>> {
        match self.navigate_path(path) {
            Ok(Dynamic::String(s)) => Ok(Some(s.clone())),
            Ok(Dynamic::Null) | Ok(Dynamic::Unknown) => Ok(None),
            Ok(other) => Err(mismatch("string", other)),
            Err(TfplugError::AttributeNotFound(_)) => Ok(None),
            Err(e) => Err(e),
        }
    }

    pub fn get_number(&self, path: &AttributePath) -> Result<f64> {
        match self.navigate_path(path)? {
            Dynamic::Number(n) => Ok(*n),
            other => Err(mismatch("number", other)),
        }
    }

    pub fn get_bool(&self, path: &AttributePath) -> Result<bool> {
        match self.navigate_path(path)? {
            Dynamic::Bool(b) => Ok(*b),
            other => Err(mismatch("bool", other)),
        }
    }

    pub fn get_list(&self, path: &AttributePath) -> Result<Vec<Dynamic>> {
        match self.navigate_path(path)? {
            Dynamic::List(l) => Ok(l.clone()),
            other => Err(mismatch("list", other)),
        }
    }

    pub fn set_string(&mut self, path: &AttributePath, value: String) -> Result<()> {
        self.set_value(path, Dynamic::String(value))
    }

    pub fn set_number(&mut self, path: &AttributePath, value: f64) -> Result<()> {
        self.set_value(path, Dynamic::Number(value))
    }

    pub fn set_bool(&mut self, path: &AttributePath, value: bool) -> Result<()> {
        self.set_value(path, Dynamic::Bool(value))
    }

    pub fn set_list(&mut self, path: &AttributePath, value: Vec<Dynamic>) -> Result<()> {
        self.set_value(path, Dynamic::List(value))
    }

    pub fn set_null(&mut self, path: &AttributePath) -> Result<()> {
        self.set_value(path, Dynamic::Null)
    }

    pub fn is_null(&self) -> bool {
        matches!(self.value, Dynamic::Null)
    }

    fn navigate_path<'a>(&'a self, path: &AttributePath) -> Result<&'a Dynamic> {
        let mut current = &self.value;

        for step in &path.steps {
            current = match (current, step) {
                (Dynamic::Map(m), AttributePathStep::AttributeName(name)) => m
                    .get(name)
                    .ok_or_else(|| TfplugError::AttributeNotFound(name.clone()))?,
                (Dynamic::List(l), AttributePathStep::ElementKeyInt(idx)) => {
                    let idx = *idx as usize;
                    l.get(idx).ok_or_else(|| {
                        TfplugError::InvalidPath(format!("list index {} out of bounds", idx))
                    })?
                }
                (Dynamic::Null, AttributePathStep::AttributeName(name)) => {
                    return Err(TfplugError::AttributeNotFound(name.clone()))
                }
                (other, _) => {
                    return Err(TfplugError::InvalidPath(format!(
                        "cannot step into {}",
                        other.type_name()
                    )))
                }
            };
        }

        Ok(current)
    }

    fn set_value(&mut self, path: &AttributePath, new_value: Dynamic) -> Result<()> {
        let Some((last, parents)) = path.steps.split_last() else {
            self.value = new_value;
            return Ok(());
        };

        if !matches!(self.value, Dynamic::Map(_)) {
            self.value = Dynamic::Map(HashMap::new());
        }

        let mut current = &mut self.value;
        for (idx, step) in parents.iter().enumerate() {
            let next_is_index = matches!(
                path.steps.get(idx + 1),
                Some(AttributePathStep::ElementKeyInt(_))
            );

            current = match (current, step) {
                (Dynamic::Map(m), AttributePathStep::AttributeName(name)) => {
                    m.entry(name.clone()).or_insert_with(|| {
                        if next_is_index {
                            Dynamic::List(Vec::new())
                        } else {
                            Dynamic::Map(HashMap::new())
                        }
                    })
                }
                (Dynamic::List(l), AttributePathStep::ElementKeyInt(idx)) => {
                    let idx = *idx as usize;
                    let len = l.len();
                    l.get_mut(idx).ok_or_else(|| {
                        TfplugError::InvalidPath(format!(
                            "list index {} out of bounds (len {})",
                            idx, len
                        ))
                    })?
                }
                (other, _) => {
                    return Err(TfplugError::InvalidPath(format!(
                        "cannot step into {}",
                        other.type_name()
                    )))
                }
            };
        }

        match (current, last) {
            (Dynamic::Map(m), AttributePathStep::AttributeName(name)) => {
                m.insert(name.clone(), new_value);
                Ok(())
            }
            (Dynamic::List(l), AttributePathStep::ElementKeyInt(idx)) => {
                let idx = *idx as usize;
                match l.get_mut(idx) {
                    Some(slot) => {
                        *slot = new_value;
                        Ok(())
                    }
                    None => Err(TfplugError::InvalidPath(format!(
                        "list index {} out of bounds",
                        idx
                    ))),
                }
            }
            (other, _) => Err(TfplugError::InvalidPath(format!(
                "cannot set a value inside {}",
                other.type_name()
            ))),
        }
    }
}

fn mismatch(expected: &str, actual: &Dynamic) -> TfplugError {
    TfplugError::TypeMismatch {
        expected: expected.to_string(),
        actual: actual.type_name().to_string(),
    }
}

/// AttributePath represents a path to an attribute within a DynamicValue
#[derive(Debug, Clone, PartialEq)]
pub struct AttributePath {
    pub steps: Vec<AttributePathStep>,
}

impl AttributePath {
    pub fn new(name: &str) -> Self {
        Self {
            steps: vec![AttributePathStep::AttributeName(name.to_string())],
        }
    }

    pub fn attribute(mut self, name: &str) -> Self {
        self.steps
            .push(AttributePathStep::AttributeName(name.to_string()));
        self
    }

    pub fn index(mut self, idx: i64) -> Self {
        self.steps.push(AttributePathStep::ElementKeyInt(idx));
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum AttributePathStep {
    AttributeName(String),
    ElementKeyInt(i64),
}

/// Diagnostic represents a warning or error reported back to Terraform
#[derive(Debug, Clone)]
pub struct Diagnostic {
    pub severity: DiagnosticSeverity,
    pub summary: String,
    pub detail: String,
    pub attribute: Option<AttributePath>,
}

impl Diagnostic {
    pub fn error(summary: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            severity: DiagnosticSeverity::Error,
            summary: summary.into(),
            detail: detail.into(),
            attribute: None,
        }
    }

    pub fn warning(summary: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            severity: DiagnosticSeverity::Warning,
            summary: summary.into(),
            detail: detail.into(),
            attribute: None,
        }
    }

    pub fn with_attribute(mut self, path: AttributePath) -> Self {
        self.attribute = Some(path);
        self
    }

    pub fn is_error(&self) -> bool {
        self.severity == DiagnosticSeverity::Error
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DiagnosticSeverity {
    Invalid,
    Error,
    Warning,
}

/// True when any diagnostic in the slice is an error
pub fn has_errors(diagnostics: &[Diagnostic]) -> bool {
    diagnostics.iter().any(Diagnostic::is_error)
}

/// ServerCapabilities indicates provider capabilities
#[derive(Debug, Clone, Default)]
pub struct ServerCapabilities {
    pub plan_destroy: bool,
    pub get_provider_schema_optional: bool,
}
