//! Collection v2.1 exchange document types.
//!
//! Fields whose shape varies between exporters (bodies, auth blocks, event and
//! response lists, header lists) are kept as raw [`Value`]s here and coerced by
//! the normalizer, so an odd field never rejects the whole document.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Schema URI stamped on every exported document
pub const SCHEMA_URL: &str = "https://schema.getpostman.com/json/collection/v2.1.0/collection.json";

/// Suffix of the suggested download filename
pub const FILE_SUFFIX: &str = "postman_collection.json";

/// Root of an exchange document
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PostmanCollection {
    #[serde(default)]
    pub info: CollectionInfo,
    #[serde(default)]
    pub item: Vec<PostmanItem>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub variable: Vec<KeyValuePair>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auth: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CollectionInfo {
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<String>,
    #[serde(rename = "_postman_id", default, skip_serializing_if = "Option::is_none")]
    pub postman_id: Option<String>,
    #[serde(rename = "_exporter_id", default, skip_serializing_if = "Option::is_none")]
    pub exporter_id: Option<String>,
    #[serde(rename = "_collection_link", default, skip_serializing_if = "Option::is_none")]
    pub collection_link: Option<String>,
}

/// A folder (non-empty `item`) or a request leaf
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PostmanItem {
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub item: Option<Vec<PostmanItem>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request: Option<PostmanRequest>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variable: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auth: Option<Value>,
    #[serde(rename = "id", default, skip_serializing_if = "Option::is_none")]
    pub postman_id: Option<String>,
}

impl PostmanItem {
    /// A folder is any node with at least one nested item
    pub fn is_folder(&self) -> bool {
        self.item.as_ref().is_some_and(|items| !items.is_empty())
    }

    /// Build a folder node around `items`
    pub fn folder(name: impl Into<String>, items: Vec<PostmanItem>) -> Self {
        Self {
            name: name.into(),
            item: Some(items),
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PostmanRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<PostmanUrl>,
    #[serde(default)]
    pub method: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub header: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auth: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<Value>,
}

/// A request URL is either a bare string or a structured object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PostmanUrl {
    Raw(String),
    Structured(Map<String, Value>),
    /// Anything else an exporter produced; normalized to an empty URL
    Other(Value),
}

impl PostmanUrl {
    /// The `raw` URL text, if one is present
    pub fn raw(&self) -> Option<&str> {
        match self {
            Self::Raw(raw) => Some(raw),
            Self::Structured(map) => map.get("raw").and_then(Value::as_str),
            Self::Other(_) => None,
        }
    }
}

/// Header, query parameter or variable entry
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct KeyValuePair {
    #[serde(default)]
    pub key: String,
    #[serde(default)]
    pub value: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<Value>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub disabled: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl KeyValuePair {
    pub fn new(key: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
            ..Default::default()
        }
    }

    /// Value rendered as text; strings verbatim, null as empty, others as JSON
    pub fn value_text(&self) -> String {
        match &self.value {
            Value::String(s) => s.clone(),
            Value::Null => String::new(),
            other => other.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_url_variants() {
        let raw: PostmanUrl = serde_json::from_value(json!("https://example.com")).unwrap();
        assert_eq!(raw, PostmanUrl::Raw("https://example.com".to_string()));
        assert_eq!(raw.raw(), Some("https://example.com"));

        let structured: PostmanUrl =
            serde_json::from_value(json!({"raw": "https://x.io/a", "host": ["x", "io"]})).unwrap();
        assert!(matches!(structured, PostmanUrl::Structured(_)));
        assert_eq!(structured.raw(), Some("https://x.io/a"));

        let other: PostmanUrl = serde_json::from_value(json!(42)).unwrap();
        assert_eq!(other, PostmanUrl::Other(json!(42)));
        assert_eq!(other.raw(), None);
    }

    #[test]
    fn test_folder_detection() {
        let folder: PostmanItem = serde_json::from_value(json!({
            "name": "Auth",
            "item": [{"name": "Login", "request": {"method": "POST", "url": "/login"}}]
        }))
        .unwrap();
        assert!(folder.is_folder());

        let empty: PostmanItem =
            serde_json::from_value(json!({"name": "Empty", "item": []})).unwrap();
        assert!(!empty.is_folder());
    }

    #[test]
    fn test_lenient_document() {
        let doc: PostmanCollection = serde_json::from_value(json!({
            "info": {"name": "Demo", "description": {"content": "Docs", "type": "text/markdown"}},
            "item": [],
            "variable": [{"key": "port", "value": 8080}],
            "event": "not-a-list"
        }))
        .unwrap();

        assert_eq!(doc.info.name, "Demo");
        assert_eq!(doc.variable[0].value_text(), "8080");
        assert_eq!(doc.event, Some(json!("not-a-list")));
    }
}
