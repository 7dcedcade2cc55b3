use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use super::JsonObject;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Collection {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub schema: Option<String>,
    pub variables: JsonObject,
    pub auth: Option<JsonObject>,
    pub events: Option<JsonObject>,
    /// Original item tree captured at import time, cleared by any request mutation
    pub items: Option<JsonObject>,
    pub postman_id: Option<String>,
    pub exporter_id: Option<String>,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateCollection {
    pub name: String,
    pub description: Option<String>,
    pub schema: Option<String>,
    #[serde(default)]
    pub variables: JsonObject,
    pub auth: Option<JsonObject>,
    pub events: Option<JsonObject>,
    pub items: Option<JsonObject>,
    pub postman_id: Option<String>,
    pub exporter_id: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateCollection {
    pub name: Option<String>,
    pub description: Option<String>,
    pub schema: Option<String>,
    pub variables: Option<JsonObject>,
    pub auth: Option<JsonObject>,
    pub events: Option<JsonObject>,
}
