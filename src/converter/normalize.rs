//! Coercion of union-typed exchange fields into canonical JSON objects, and
//! the reverse mapping used on export.

use std::collections::BTreeMap;

use serde_json::{json, Value};

use super::exchange::{KeyValuePair, PostmanUrl};
use super::warning::CoercionError;
use crate::models::JsonObject;

/// Key under which list-shaped blobs are wrapped to stay canonical objects
pub const LIST_KEY: &str = "entries";

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Normalize a field that must always exist; absence becomes an empty object
pub fn normalize(raw: Option<&Value>) -> Result<JsonObject, CoercionError> {
    match raw {
        None | Some(Value::Null) => Ok(JsonObject::new()),
        Some(value) => serde_json::from_value(value.clone()).map_err(|_| CoercionError {
            expected: "object",
            found: kind(value),
        }),
    }
}

/// `"s"` becomes `{"raw": "s"}`, objects keep every key, absence is empty
pub fn normalize_url(url: Option<&PostmanUrl>) -> Result<JsonObject, CoercionError> {
    match url {
        None => Ok(JsonObject::new()),
        Some(PostmanUrl::Raw(raw)) if raw.is_empty() => Ok(JsonObject::new()),
        Some(PostmanUrl::Raw(raw)) => {
            let mut map = JsonObject::new();
            map.insert("raw".to_string(), Value::String(raw.clone()));
            Ok(map)
        }
        Some(PostmanUrl::Structured(map)) => Ok(map.clone()),
        Some(PostmanUrl::Other(other)) => normalize(Some(other)).map_err(|_| CoercionError {
            expected: "string or object",
            found: kind(other),
        }),
    }
}

/// Opaque blob (body, auth, events, responses); lists are wrapped under [`LIST_KEY`]
pub fn normalize_blob(raw: Option<&Value>) -> Result<Option<JsonObject>, CoercionError> {
    match raw {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Array(entries)) if entries.is_empty() => Ok(None),
        Some(Value::Array(entries)) => Ok(Some(wrap_list(entries.clone()))),
        Some(value) => normalize(Some(value))
            .map(Some)
            .map_err(|_| CoercionError {
                expected: "object or list",
                found: kind(value),
            }),
    }
}

/// Header list into a mapping; a repeated key keeps its last value
pub fn normalize_headers(raw: Option<&Value>) -> Result<BTreeMap<String, String>, CoercionError> {
    match raw {
        None | Some(Value::Null) => Ok(BTreeMap::new()),
        // Some exporters emit the raw header block as one string
        Some(Value::String(block)) => Ok(block
            .lines()
            .filter_map(|line| line.split_once(':'))
            .map(|(key, value)| (key.trim().to_string(), value.trim().to_string()))
            .filter(|(key, _)| !key.is_empty())
            .collect()),
        Some(value) => {
            let pairs: Vec<KeyValuePair> =
                serde_json::from_value(value.clone()).map_err(|_| CoercionError {
                    expected: "list of key/value objects",
                    found: kind(value),
                })?;
            Ok(pairs
                .iter()
                .map(|pair| (pair.key.clone(), pair.value_text()))
                .collect())
        }
    }
}

/// Query parameters of a structured URL as `key -> value`, last occurrence wins
pub fn params_from_url(url: &JsonObject) -> Option<JsonObject> {
    let query = url.get("query")?.as_array()?;
    let params: JsonObject = query
        .iter()
        .filter_map(|entry| {
            let key = entry.get("key")?.as_str()?;
            let value = entry.get("value").cloned().unwrap_or(Value::Null);
            Some((key.to_string(), value))
        })
        .collect();

    (!params.is_empty()).then_some(params)
}

/// Collection variables as `key -> value`, last occurrence wins
pub fn variables_to_object(variables: &[KeyValuePair]) -> JsonObject {
    variables
        .iter()
        .map(|pair| (pair.key.clone(), pair.value.clone()))
        .collect()
}

/// Descriptions arrive as plain strings or as `{content, type}` objects
pub fn description_text(raw: Option<&Value>) -> Option<String> {
    match raw? {
        Value::Null => None,
        Value::String(text) if text.is_empty() => None,
        Value::String(text) => Some(text.clone()),
        Value::Object(map) => map
            .get("content")
            .and_then(Value::as_str)
            .filter(|text| !text.is_empty())
            .map(str::to_string),
        other => Some(other.to_string()),
    }
}

pub fn wrap_list(entries: Vec<Value>) -> JsonObject {
    let mut map = JsonObject::new();
    map.insert(LIST_KEY.to_string(), Value::Array(entries));
    map
}

// ============ Export direction ============

/// Stored URL back to exchange shape; an empty object becomes `""`
pub fn url_to_exchange(url: &JsonObject) -> PostmanUrl {
    if url.is_empty() {
        PostmanUrl::Raw(String::new())
    } else {
        PostmanUrl::Structured(url.clone())
    }
}

/// Header mapping back to a key/value list, `None` when there are no headers
pub fn headers_to_list(headers: &BTreeMap<String, String>) -> Option<Value> {
    if headers.is_empty() {
        return None;
    }

    Some(Value::Array(
        headers
            .iter()
            .map(|(key, value)| json!({ "key": key, "value": value }))
            .collect(),
    ))
}

/// Unwrap a list blob; a bare object is exported as a one-entry list
pub fn blob_to_list(blob: &JsonObject) -> Value {
    match blob.get(LIST_KEY) {
        Some(Value::Array(entries)) if blob.len() == 1 => Value::Array(entries.clone()),
        _ => Value::Array(vec![Value::Object(blob.clone())]),
    }
}

/// Variable mapping back to a list; descriptions are not kept
pub fn variables_to_list(variables: &JsonObject) -> Vec<KeyValuePair> {
    variables
        .iter()
        .map(|(key, value)| KeyValuePair::new(key.clone(), value.clone()))
        .collect()
}
