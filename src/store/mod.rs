pub mod memory_store;
pub mod sea_orm_store;

pub use memory_store::InMemoryStore;
pub use sea_orm_store::SeaOrmStore;

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::AppResult;
use crate::models::{
    Collection, CreateCollection, CreateRequest, Request, UpdateCollection, UpdateRequest,
};

/// Persistence boundary for collections and their request records.
///
/// Every mutation of a request (create, update, delete) also clears the
/// owning collection's cached item tree, so exports never serve stale data.
#[async_trait]
pub trait CollectionStore: Send + Sync {
    /// Insert a collection with a freshly generated id
    async fn create_collection(&self, input: &CreateCollection) -> AppResult<Collection>;

    /// Insert a collection and all of its requests atomically; on any failure
    /// nothing is persisted
    async fn import_collection(
        &self,
        id: Uuid,
        collection: &CreateCollection,
        requests: &[CreateRequest],
    ) -> AppResult<Collection>;

    async fn get_collection(&self, id: Uuid) -> AppResult<Collection>;

    /// Newest first
    async fn list_collections(&self, limit: u64, offset: u64) -> AppResult<Vec<Collection>>;

    async fn count_collections(&self) -> AppResult<u64>;

    async fn update_collection(&self, id: Uuid, input: &UpdateCollection)
        -> AppResult<Collection>;

    /// Delete a collection together with its requests
    async fn delete_collection(&self, id: Uuid) -> AppResult<()>;

    /// Insert a request; a missing position appends it to the collection
    async fn create_request(&self, input: &CreateRequest) -> AppResult<Request>;

    async fn get_request(&self, id: Uuid) -> AppResult<Request>;

    /// Newest first, across all collections
    async fn list_requests(&self, limit: u64, offset: u64) -> AppResult<Vec<Request>>;

    async fn count_requests(&self) -> AppResult<u64>;

    /// One page of a collection's requests in position order
    async fn list_requests_by_collection(
        &self,
        collection_id: Uuid,
        limit: u64,
        offset: u64,
    ) -> AppResult<Vec<Request>>;

    /// Every request of a collection in position order
    async fn all_requests_by_collection(&self, collection_id: Uuid) -> AppResult<Vec<Request>>;

    async fn count_requests_by_collection(&self, collection_id: Uuid) -> AppResult<u64>;

    async fn update_request(&self, id: Uuid, input: &UpdateRequest) -> AppResult<Request>;

    async fn delete_request(&self, id: Uuid) -> AppResult<()>;
}
