use std::collections::BTreeMap;
use std::sync::Arc;

use serde_json::Value;
use uuid::Uuid;

use crate::converter::normalize::{normalize_url, params_from_url};
use crate::converter::PostmanUrl;
use crate::error::{AppError, AppResult};
use crate::models::{CreateRequest, JsonObject, Request, UpdateRequest};
use crate::store::CollectionStore;

const CLONE_SUFFIX: &str = "(Cloned)";

/// Request record management
pub struct RequestService {
    store: Arc<dyn CollectionStore>,
}

impl RequestService {
    pub fn new(store: Arc<dyn CollectionStore>) -> Self {
        Self { store }
    }

    /// Create a request in an existing collection. Query parameters are
    /// derived from a structured URL when none are given.
    pub async fn create(&self, mut input: CreateRequest) -> AppResult<Request> {
        if input.params.is_none() {
            input.params = params_from_url(&input.url);
        }

        let request = self.store.create_request(&input).await?;
        tracing::info!(
            request_id = %request.id,
            collection_id = %request.collection_id,
            "Request created"
        );
        Ok(request)
    }

    pub async fn get(&self, id: Uuid) -> AppResult<Request> {
        self.store.get_request(id).await
    }

    pub async fn list(&self, limit: u64, offset: u64) -> AppResult<(Vec<Request>, u64)> {
        let requests = self.store.list_requests(limit, offset).await?;
        let total = self.store.count_requests().await?;
        Ok((requests, total))
    }

    pub async fn list_by_collection(
        &self,
        collection_id: Uuid,
        limit: u64,
        offset: u64,
    ) -> AppResult<(Vec<Request>, u64)> {
        // 404 for an unknown collection rather than an empty page
        self.store.get_collection(collection_id).await?;

        let requests = self
            .store
            .list_requests_by_collection(collection_id, limit, offset)
            .await?;
        let total = self.store.count_requests_by_collection(collection_id).await?;
        Ok((requests, total))
    }

    pub async fn delete(&self, id: Uuid) -> AppResult<()> {
        self.store.delete_request(id).await?;
        tracing::info!(request_id = %id, "Request deleted");
        Ok(())
    }

    pub async fn update_payload(&self, id: Uuid, body: Option<JsonObject>) -> AppResult<Request> {
        let body = body.ok_or_else(|| AppError::Validation("payload cannot be null".into()))?;
        let update = UpdateRequest {
            body: Some(body),
            ..Default::default()
        };
        self.store.update_request(id, &update).await
    }

    pub async fn update_headers(
        &self,
        id: Uuid,
        headers: Option<BTreeMap<String, String>>,
    ) -> AppResult<Request> {
        let headers = headers.ok_or_else(|| AppError::Validation("headers cannot be null".into()))?;
        let update = UpdateRequest {
            headers: Some(headers),
            ..Default::default()
        };
        self.store.update_request(id, &update).await
    }

    pub async fn update_params(&self, id: Uuid, params: Option<JsonObject>) -> AppResult<Request> {
        let params = params.ok_or_else(|| AppError::Validation("params cannot be null".into()))?;
        let update = UpdateRequest {
            params: Some(params),
            ..Default::default()
        };
        self.store.update_request(id, &update).await
    }

    /// Copy a request under a new name into the same collection and folder
    pub async fn clone_request(&self, id: Uuid, name: String) -> AppResult<Request> {
        let original = self.store.get_request(id).await?;

        let description = match original.description.as_deref() {
            Some(text) if !text.is_empty() => format!("{} {}", text, CLONE_SUFFIX),
            _ => CLONE_SUFFIX.to_string(),
        };

        let input = CreateRequest {
            collection_id: original.collection_id,
            name,
            description: Some(description),
            folder_path: original.folder_path,
            url: original.url,
            method: original.method,
            headers: original.headers,
            params: original.params,
            body: original.body,
            auth: original.auth,
            events: original.events,
            responses: original.responses,
            postman_id: None,
            position: None,
        };

        let cloned = self.store.create_request(&input).await?;
        tracing::info!(source_id = %id, request_id = %cloned.id, "Request cloned");
        Ok(cloned)
    }
}

/// Normalize a URL given over the API the same way imports do
pub fn url_from_value(value: Option<Value>) -> AppResult<JsonObject> {
    let url = value.map(|v| {
        serde_json::from_value::<PostmanUrl>(v.clone()).unwrap_or(PostmanUrl::Other(v))
    });
    normalize_url(url.as_ref()).map_err(|e| AppError::Validation(format!("url: {}", e)))
}
