pub mod collection;
pub mod request;

pub use collection::*;
pub use request::*;

use serde_json::Value;

/// Canonical representation of every JSON sub-document once normalized
pub type JsonObject = serde_json::Map<String, Value>;

/// Coerce a stored JSON column into an object, treating any other shape as empty
pub fn json_to_object(value: Value) -> JsonObject {
    match value {
        Value::Object(map) => map,
        _ => JsonObject::new(),
    }
}

/// Like [`json_to_object`] but keeps absence (SQL NULL or JSON null) distinct
pub fn json_to_optional_object(value: Option<Value>) -> Option<JsonObject> {
    match value {
        Some(Value::Object(map)) => Some(map),
        _ => None,
    }
}
