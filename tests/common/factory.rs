use std::collections::BTreeMap;

use serde_json::json;
use uuid::Uuid;

use collection_vault::models::{Collection, CreateCollection, CreateRequest, Request};
use collection_vault::state::AppState;

/// Three-level document used by the import/export tests
#[allow(dead_code)]
pub const SHOP_COLLECTION: &str = r#"{
    "info": {
        "_postman_id": "5a1e7c9d-0000-4000-8000-000000000001",
        "name": "Shop API",
        "description": {"content": "Storefront endpoints", "type": "text/markdown"},
        "schema": "https://schema.getpostman.com/json/collection/v2.1.0/collection.json"
    },
    "variable": [
        {"key": "base", "value": "https://shop.test"},
        {"key": "token", "value": "secret"}
    ],
    "item": [
        {
            "name": "Catalog",
            "item": [
                {"name": "List products", "request": {"method": "GET", "url": "{{base}}/products"}},
                {
                    "name": "Admin",
                    "item": [
                        {
                            "name": "Create product",
                            "request": {
                                "method": "POST",
                                "url": {
                                    "raw": "{{base}}/products?draft=true",
                                    "host": ["{{base}}"],
                                    "path": ["products"],
                                    "query": [{"key": "draft", "value": "true"}]
                                },
                                "header": [
                                    {"key": "Content-Type", "value": "text/plain"},
                                    {"key": "Content-Type", "value": "application/json"}
                                ],
                                "body": {"mode": "raw", "raw": "{\"name\": \"Mug\"}"}
                            },
                            "event": [{"listen": "test", "script": {"exec": ["pm.response.to.have.status(201)"]}}]
                        }
                    ]
                }
            ]
        },
        {"name": "Health", "request": {"method": "GET", "url": "{{base}}/health"}}
    ]
}"#;

/// Factory for creating test data
pub struct Factory<'a> {
    state: &'a AppState,
}

#[allow(dead_code)]
impl<'a> Factory<'a> {
    pub fn new(state: &'a AppState) -> Self {
        Self { state }
    }

    /// Create a test collection
    pub async fn create_collection(&self) -> Collection {
        let input = CreateCollection {
            name: format!("Collection {}", Uuid::new_v4()),
            description: Some("Test collection".to_string()),
            ..Default::default()
        };

        self.state.store.create_collection(&input).await.unwrap()
    }

    /// Create a test request inside a collection folder
    pub async fn create_request(&self, collection_id: Uuid, folder_path: &str) -> Request {
        let mut headers = BTreeMap::new();
        headers.insert("Accept".to_string(), "application/json".to_string());

        let url = json!({"raw": "https://api.test/ping"});
        let input = CreateRequest {
            collection_id,
            name: format!("Request {}", Uuid::new_v4()),
            description: Some("Test request".to_string()),
            folder_path: folder_path.to_string(),
            url: url.as_object().cloned().unwrap_or_default(),
            method: "GET".to_string(),
            headers,
            ..Default::default()
        };

        self.state.store.create_request(&input).await.unwrap()
    }

    /// Import a document through the service layer and return the collection
    pub async fn import(&self, document: &str) -> Collection {
        self.state
            .collection_service()
            .import(document.as_bytes(), false)
            .await
            .unwrap()
            .collection
    }
}
