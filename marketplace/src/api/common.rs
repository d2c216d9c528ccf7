//! Helpers shared by the endpoint modules

use serde::de::DeserializeOwned;
use serde_json::Value;

use super::ApiError;

#[derive(Debug, Clone, Default)]
pub struct ApiQueryParams {
    params: Vec<(String, String)>,
}

impl ApiQueryParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add<K: Into<String>, V: ToString>(mut self, key: K, value: V) -> Self {
        self.params.push((key.into(), value.to_string()));
        self
    }

    pub fn add_optional<K: Into<String>, V: ToString>(mut self, key: K, value: Option<V>) -> Self {
        if let Some(v) = value {
            self.params.push((key.into(), v.to_string()));
        }
        self
    }

    pub fn to_query_string(&self) -> String {
        if self.params.is_empty() {
            String::new()
        } else {
            format!(
                "?{}",
                self.params
                    .iter()
                    .map(|(k, v)| format!("{}={}", k, urlencoding::encode(v)))
                    .collect::<Vec<_>>()
                    .join("&")
            )
        }
    }
}

/// Ids coming out of state sometimes carry stray double quotes
pub fn sanitize_segment(value: &str) -> String {
    value.replace('"', "")
}

/// `/{collection}/{id}` with the id sanitized and percent-encoded
pub fn resource_path(collection: &str, id: &str) -> String {
    format!(
        "{}/{}",
        collection,
        urlencoding::encode(&sanitize_segment(id))
    )
}

/// Decode a response document into a wire model. The API sends `null` for
/// unset members, which decodes the same as a missing key (the zero value).
pub fn decode_document<T: DeserializeOwned + Default>(mut document: Value) -> Result<T, ApiError> {
    if document.is_null() {
        return Ok(T::default());
    }
    drop_nulls(&mut document);
    serde_json::from_value(document).map_err(ApiError::Decode)
}

fn drop_nulls(value: &mut Value) {
    match value {
        Value::Object(members) => {
            members.retain(|_, member| !member.is_null());
            members.values_mut().for_each(drop_nulls);
        }
        Value::Array(items) => items.iter_mut().for_each(drop_nulls),
        _ => {}
    }
}

#[cfg(test)]
#[allow(clippy::disallowed_methods)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use serde_json::json;

    #[derive(Debug, Default, Deserialize)]
    #[serde(default)]
    struct Outer {
        name: String,
        tags: Vec<String>,
        inner: Inner,
        items: Vec<Inner>,
    }

    #[derive(Debug, Default, Deserialize)]
    #[serde(default)]
    struct Inner {
        flag: bool,
        hint: String,
    }

    #[test]
    fn null_members_decode_as_zero_values() {
        let outer: Outer = decode_document(json!({
            "name": null,
            "tags": null,
            "inner": null,
            "items": [{"flag": true, "hint": null}]
        }))
        .unwrap();

        assert_eq!(outer.name, "");
        assert!(outer.tags.is_empty());
        assert!(!outer.inner.flag);
        assert!(outer.items[0].flag);
        assert_eq!(outer.items[0].hint, "");
    }

    #[test]
    fn null_document_is_default() {
        let outer: Outer = decode_document(Value::Null).unwrap();
        assert_eq!(outer.name, "");
    }

    #[test]
    fn wrong_types_still_fail() {
        let result = decode_document::<Outer>(json!({"name": 3}));
        assert!(matches!(result, Err(ApiError::Decode(_))));
    }

    #[test]
    fn query_string_encodes_values() {
        let params = ApiQueryParams::new()
            .add("project_id", "p 1")
            .add_optional("cluster_id", None::<String>)
            .add_optional("namespace", Some("a&b"));
        assert_eq!(params.to_query_string(), "?project_id=p%201&namespace=a%26b");
    }

    #[test]
    fn empty_query_string() {
        assert_eq!(ApiQueryParams::new().to_query_string(), "");
    }

    #[test]
    fn resource_path_strips_quotes() {
        assert_eq!(resource_path("/products", "\"abc-1\""), "/products/abc-1");
        assert_eq!(resource_path("/products", "a/b"), "/products/a%2Fb");
    }
}
