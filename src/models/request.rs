use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use super::JsonObject;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Request {
    pub id: Uuid,
    pub collection_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    /// Slash-joined ancestor folder names, empty for top-level requests
    pub folder_path: String,
    pub url: JsonObject,
    pub method: String,
    pub headers: BTreeMap<String, String>,
    pub params: Option<JsonObject>,
    pub body: Option<JsonObject>,
    pub auth: Option<JsonObject>,
    pub events: Option<JsonObject>,
    pub responses: Option<JsonObject>,
    pub postman_id: Option<String>,
    /// Encounter order inside the owning collection
    pub position: i32,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct CreateRequest {
    pub collection_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    #[serde(default)]
    pub folder_path: String,
    #[serde(default)]
    pub url: JsonObject,
    pub method: String,
    #[serde(default)]
    pub headers: BTreeMap<String, String>,
    pub params: Option<JsonObject>,
    pub body: Option<JsonObject>,
    pub auth: Option<JsonObject>,
    pub events: Option<JsonObject>,
    pub responses: Option<JsonObject>,
    pub postman_id: Option<String>,
    /// Appended after the collection's existing requests when unset
    pub position: Option<i32>,
}

/// Partial update; `None` leaves the stored value untouched
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub folder_path: Option<String>,
    pub url: Option<JsonObject>,
    pub method: Option<String>,
    pub headers: Option<BTreeMap<String, String>>,
    pub params: Option<JsonObject>,
    pub body: Option<JsonObject>,
    pub auth: Option<JsonObject>,
    pub events: Option<JsonObject>,
    pub responses: Option<JsonObject>,
}
