use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::models::{
    Collection, CreateCollection, CreateRequest, Request, UpdateCollection, UpdateRequest,
};
use crate::store::CollectionStore;

/// In-memory store for tests and local experiments
#[derive(Clone, Default)]
pub struct InMemoryStore {
    inner: Arc<Mutex<InMemoryStoreInner>>,
}

/// Records are kept in insertion order, which breaks ties between equal
/// timestamps or positions
#[derive(Default)]
struct InMemoryStoreInner {
    collections: Vec<Collection>,
    requests: Vec<Request>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl InMemoryStoreInner {
    fn collection_mut(&mut self, id: Uuid) -> AppResult<&mut Collection> {
        self.collections
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or_else(|| AppError::NotFound("Collection".to_string()))
    }

    fn clear_items(&mut self, collection_id: Uuid) {
        if let Ok(collection) = self.collection_mut(collection_id) {
            if collection.items.take().is_some() {
                collection.updated_at = time::OffsetDateTime::now_utc();
            }
        }
    }

    fn next_position(&self, collection_id: Uuid) -> i32 {
        self.requests
            .iter()
            .filter(|r| r.collection_id == collection_id)
            .map(|r| r.position + 1)
            .max()
            .unwrap_or(0)
    }

    fn by_collection(&self, collection_id: Uuid) -> Vec<Request> {
        let mut requests: Vec<Request> = self
            .requests
            .iter()
            .filter(|r| r.collection_id == collection_id)
            .cloned()
            .collect();
        requests.sort_by_key(|r| r.position);
        requests
    }
}

fn new_collection(id: Uuid, input: &CreateCollection) -> Collection {
    let now = time::OffsetDateTime::now_utc();
    Collection {
        id,
        name: input.name.clone(),
        description: input.description.clone(),
        schema: input.schema.clone(),
        variables: input.variables.clone(),
        auth: input.auth.clone(),
        events: input.events.clone(),
        items: input.items.clone(),
        postman_id: input.postman_id.clone(),
        exporter_id: input.exporter_id.clone(),
        created_at: now,
        updated_at: now,
    }
}

fn new_request(input: &CreateRequest, position: i32) -> Request {
    let now = time::OffsetDateTime::now_utc();
    Request {
        id: Uuid::new_v4(),
        collection_id: input.collection_id,
        name: input.name.clone(),
        description: input.description.clone(),
        folder_path: input.folder_path.clone(),
        url: input.url.clone(),
        method: input.method.clone(),
        headers: input.headers.clone(),
        params: input.params.clone(),
        body: input.body.clone(),
        auth: input.auth.clone(),
        events: input.events.clone(),
        responses: input.responses.clone(),
        postman_id: input.postman_id.clone(),
        position,
        created_at: now,
        updated_at: now,
    }
}

fn page<T>(items: impl Iterator<Item = T>, limit: u64, offset: u64) -> Vec<T> {
    items.skip(offset as usize).take(limit as usize).collect()
}

#[async_trait]
impl CollectionStore for InMemoryStore {
    async fn create_collection(&self, input: &CreateCollection) -> AppResult<Collection> {
        let collection = new_collection(Uuid::new_v4(), input);
        let mut inner = self.inner.lock().await;
        inner.collections.push(collection.clone());
        Ok(collection)
    }

    async fn import_collection(
        &self,
        id: Uuid,
        collection: &CreateCollection,
        requests: &[CreateRequest],
    ) -> AppResult<Collection> {
        let mut inner = self.inner.lock().await;

        if inner.collections.iter().any(|c| c.id == id) {
            return Err(AppError::Database(format!("duplicate collection id {}", id)));
        }

        // Validate every row before touching shared state
        let created = new_collection(id, collection);
        let mut records = Vec::with_capacity(requests.len());
        for (index, request) in requests.iter().enumerate() {
            if request.collection_id != id {
                return Err(AppError::Database(format!(
                    "foreign key violation: collection {} does not exist",
                    request.collection_id
                ))
                .context(format!("request {} ({})", index, request.name)));
            }
            records.push(new_request(request, request.position.unwrap_or(index as i32)));
        }

        inner.collections.push(created.clone());
        inner.requests.extend(records);
        Ok(created)
    }

    async fn get_collection(&self, id: Uuid) -> AppResult<Collection> {
        let mut inner = self.inner.lock().await;
        inner.collection_mut(id).map(|c| c.clone())
    }

    async fn list_collections(&self, limit: u64, offset: u64) -> AppResult<Vec<Collection>> {
        let inner = self.inner.lock().await;
        Ok(page(inner.collections.iter().rev().cloned(), limit, offset))
    }

    async fn count_collections(&self) -> AppResult<u64> {
        let inner = self.inner.lock().await;
        Ok(inner.collections.len() as u64)
    }

    async fn update_collection(
        &self,
        id: Uuid,
        input: &UpdateCollection,
    ) -> AppResult<Collection> {
        let mut inner = self.inner.lock().await;
        let collection = inner.collection_mut(id)?;

        if let Some(name) = &input.name {
            collection.name = name.clone();
        }
        if let Some(description) = &input.description {
            collection.description = Some(description.clone());
        }
        if let Some(schema) = &input.schema {
            collection.schema = Some(schema.clone());
        }
        if let Some(variables) = &input.variables {
            collection.variables = variables.clone();
        }
        if let Some(auth) = &input.auth {
            collection.auth = Some(auth.clone());
        }
        if let Some(events) = &input.events {
            collection.events = Some(events.clone());
        }
        collection.updated_at = time::OffsetDateTime::now_utc();

        Ok(collection.clone())
    }

    async fn delete_collection(&self, id: Uuid) -> AppResult<()> {
        let mut inner = self.inner.lock().await;
        inner.collection_mut(id)?;

        inner.requests.retain(|r| r.collection_id != id);
        inner.collections.retain(|c| c.id != id);
        Ok(())
    }

    async fn create_request(&self, input: &CreateRequest) -> AppResult<Request> {
        let mut inner = self.inner.lock().await;
        inner.collection_mut(input.collection_id)?;

        let position = input
            .position
            .unwrap_or_else(|| inner.next_position(input.collection_id));
        let request = new_request(input, position);

        inner.requests.push(request.clone());
        inner.clear_items(input.collection_id);
        Ok(request)
    }

    async fn get_request(&self, id: Uuid) -> AppResult<Request> {
        let inner = self.inner.lock().await;
        inner
            .requests
            .iter()
            .find(|r| r.id == id)
            .cloned()
            .ok_or_else(|| AppError::NotFound("Request".to_string()))
    }

    async fn list_requests(&self, limit: u64, offset: u64) -> AppResult<Vec<Request>> {
        let inner = self.inner.lock().await;
        Ok(page(inner.requests.iter().rev().cloned(), limit, offset))
    }

    async fn count_requests(&self) -> AppResult<u64> {
        let inner = self.inner.lock().await;
        Ok(inner.requests.len() as u64)
    }

    async fn list_requests_by_collection(
        &self,
        collection_id: Uuid,
        limit: u64,
        offset: u64,
    ) -> AppResult<Vec<Request>> {
        let inner = self.inner.lock().await;
        Ok(page(
            inner.by_collection(collection_id).into_iter(),
            limit,
            offset,
        ))
    }

    async fn all_requests_by_collection(&self, collection_id: Uuid) -> AppResult<Vec<Request>> {
        let inner = self.inner.lock().await;
        Ok(inner.by_collection(collection_id))
    }

    async fn count_requests_by_collection(&self, collection_id: Uuid) -> AppResult<u64> {
        let inner = self.inner.lock().await;
        Ok(inner
            .requests
            .iter()
            .filter(|r| r.collection_id == collection_id)
            .count() as u64)
    }

    async fn update_request(&self, id: Uuid, input: &UpdateRequest) -> AppResult<Request> {
        let mut inner = self.inner.lock().await;
        let request = inner
            .requests
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or_else(|| AppError::NotFound("Request".to_string()))?;

        if let Some(name) = &input.name {
            request.name = name.clone();
        }
        if let Some(description) = &input.description {
            request.description = Some(description.clone());
        }
        if let Some(folder_path) = &input.folder_path {
            request.folder_path = folder_path.clone();
        }
        if let Some(url) = &input.url {
            request.url = url.clone();
        }
        if let Some(method) = &input.method {
            request.method = method.clone();
        }
        if let Some(headers) = &input.headers {
            request.headers = headers.clone();
        }
        if let Some(params) = &input.params {
            request.params = Some(params.clone());
        }
        if let Some(body) = &input.body {
            request.body = Some(body.clone());
        }
        if let Some(auth) = &input.auth {
            request.auth = Some(auth.clone());
        }
        if let Some(events) = &input.events {
            request.events = Some(events.clone());
        }
        if let Some(responses) = &input.responses {
            request.responses = Some(responses.clone());
        }
        request.updated_at = time::OffsetDateTime::now_utc();

        let updated = request.clone();
        inner.clear_items(updated.collection_id);
        Ok(updated)
    }

    async fn delete_request(&self, id: Uuid) -> AppResult<()> {
        let mut inner = self.inner.lock().await;
        let index = inner
            .requests
            .iter()
            .position(|r| r.id == id)
            .ok_or_else(|| AppError::NotFound("Request".to_string()))?;

        let removed = inner.requests.remove(index);
        inner.clear_items(removed.collection_id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::JsonObject;

    fn collection_input(name: &str) -> CreateCollection {
        CreateCollection {
            name: name.to_string(),
            ..Default::default()
        }
    }

    fn request_input(collection_id: Uuid, name: &str) -> CreateRequest {
        CreateRequest {
            collection_id,
            name: name.to_string(),
            method: "GET".to_string(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_request_mutations_clear_cached_tree() {
        let store = InMemoryStore::new();
        let mut cached = collection_input("Cached");
        cached.items = Some(JsonObject::new());

        let id = Uuid::new_v4();
        store.import_collection(id, &cached, &[]).await.unwrap();
        assert!(store.get_collection(id).await.unwrap().items.is_some());

        store
            .create_request(&request_input(id, "Added"))
            .await
            .unwrap();
        assert!(store.get_collection(id).await.unwrap().items.is_none());
    }

    #[tokio::test]
    async fn test_positions_append_and_order() {
        let store = InMemoryStore::new();
        let collection = store
            .create_collection(&collection_input("Ordered"))
            .await
            .unwrap();

        let first = store
            .create_request(&request_input(collection.id, "first"))
            .await
            .unwrap();
        let mut pinned = request_input(collection.id, "pinned");
        pinned.position = Some(-1);
        store.create_request(&pinned).await.unwrap();
        let last = store
            .create_request(&request_input(collection.id, "last"))
            .await
            .unwrap();

        assert_eq!(first.position, 0);
        assert_eq!(last.position, 1);

        let names: Vec<_> = store
            .all_requests_by_collection(collection.id)
            .await
            .unwrap()
            .into_iter()
            .map(|r| r.name)
            .collect();
        assert_eq!(names, vec!["pinned", "first", "last"]);
    }

    #[tokio::test]
    async fn test_delete_collection_removes_requests() {
        let store = InMemoryStore::new();
        let collection = store
            .create_collection(&collection_input("Doomed"))
            .await
            .unwrap();
        let request = store
            .create_request(&request_input(collection.id, "child"))
            .await
            .unwrap();

        store.delete_collection(collection.id).await.unwrap();

        assert!(matches!(
            store.get_request(request.id).await,
            Err(AppError::NotFound(_))
        ));
        assert_eq!(store.count_requests().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_failed_import_leaves_nothing_behind() {
        let store = InMemoryStore::new();
        let id = Uuid::new_v4();
        let requests = vec![
            request_input(id, "ok"),
            request_input(Uuid::new_v4(), "stray"),
        ];

        let err = store
            .import_collection(id, &collection_input("Broken"), &requests)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("request 1 (stray)"));

        assert!(store.get_collection(id).await.is_err());
        assert_eq!(store.count_requests().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_request_for_unknown_collection() {
        let store = InMemoryStore::new();
        let result = store
            .create_request(&request_input(Uuid::new_v4(), "orphan"))
            .await;
        assert!(matches!(result, Err(AppError::NotFound(ref what)) if what == "Collection"));
    }
}
