use async_trait::async_trait;
use sea_orm::{DatabaseConnection, TransactionTrait};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::models::{
    Collection, CreateCollection, CreateRequest, Request, UpdateCollection, UpdateRequest,
};
use crate::repositories::{CollectionRepository, Repository, RequestRepository};
use crate::store::CollectionStore;

/// PostgreSQL-backed store
#[derive(Clone)]
pub struct SeaOrmStore {
    db: DatabaseConnection,
}

impl SeaOrmStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl CollectionStore for SeaOrmStore {
    async fn create_collection(&self, input: &CreateCollection) -> AppResult<Collection> {
        CollectionRepository::create(&self.db, Uuid::new_v4(), input).await
    }

    async fn import_collection(
        &self,
        id: Uuid,
        collection: &CreateCollection,
        requests: &[CreateRequest],
    ) -> AppResult<Collection> {
        // Dropping the transaction without commit rolls everything back
        let txn = self.db.begin().await?;

        let created = CollectionRepository::create(&txn, id, collection).await?;

        for (index, request) in requests.iter().enumerate() {
            let position = request.position.unwrap_or(index as i32);
            RequestRepository::create(&txn, request, position)
                .await
                .map_err(|e| e.context(format!("request {} ({})", index, request.name)))?;
        }

        txn.commit().await?;

        tracing::debug!(
            collection_id = %id,
            requests = requests.len(),
            "Collection import committed"
        );

        Ok(created)
    }

    async fn get_collection(&self, id: Uuid) -> AppResult<Collection> {
        CollectionRepository::find_by_id(&self.db, id).await
    }

    async fn list_collections(&self, limit: u64, offset: u64) -> AppResult<Vec<Collection>> {
        CollectionRepository::list(&self.db, limit, offset).await
    }

    async fn count_collections(&self) -> AppResult<u64> {
        CollectionRepository::count(&self.db).await
    }

    async fn update_collection(
        &self,
        id: Uuid,
        input: &UpdateCollection,
    ) -> AppResult<Collection> {
        CollectionRepository::update(&self.db, id, input).await
    }

    async fn delete_collection(&self, id: Uuid) -> AppResult<()> {
        let txn = self.db.begin().await?;

        let removed = RequestRepository::delete_by_collection(&txn, id).await?;
        CollectionRepository::remove(&txn, id).await?;

        txn.commit().await?;

        tracing::debug!(collection_id = %id, requests = removed, "Collection deleted");
        Ok(())
    }

    async fn create_request(&self, input: &CreateRequest) -> AppResult<Request> {
        let txn = self.db.begin().await?;

        if !CollectionRepository::exists(&txn, input.collection_id).await? {
            return Err(AppError::NotFound("Collection".to_string()));
        }

        let position = match input.position {
            Some(position) => position,
            None => RequestRepository::next_position(&txn, input.collection_id).await?,
        };
        let created = RequestRepository::create(&txn, input, position).await?;
        CollectionRepository::clear_items(&txn, input.collection_id).await?;

        txn.commit().await?;
        Ok(created)
    }

    async fn get_request(&self, id: Uuid) -> AppResult<Request> {
        RequestRepository::find_by_id(&self.db, id).await
    }

    async fn list_requests(&self, limit: u64, offset: u64) -> AppResult<Vec<Request>> {
        RequestRepository::list(&self.db, limit, offset).await
    }

    async fn count_requests(&self) -> AppResult<u64> {
        RequestRepository::count(&self.db).await
    }

    async fn list_requests_by_collection(
        &self,
        collection_id: Uuid,
        limit: u64,
        offset: u64,
    ) -> AppResult<Vec<Request>> {
        RequestRepository::list_by_collection(&self.db, collection_id, limit, offset).await
    }

    async fn all_requests_by_collection(&self, collection_id: Uuid) -> AppResult<Vec<Request>> {
        RequestRepository::all_by_collection(&self.db, collection_id).await
    }

    async fn count_requests_by_collection(&self, collection_id: Uuid) -> AppResult<u64> {
        RequestRepository::count_by_collection(&self.db, collection_id).await
    }

    async fn update_request(&self, id: Uuid, input: &UpdateRequest) -> AppResult<Request> {
        let txn = self.db.begin().await?;

        let updated = RequestRepository::update(&txn, id, input).await?;
        CollectionRepository::clear_items(&txn, updated.collection_id).await?;

        txn.commit().await?;
        Ok(updated)
    }

    async fn delete_request(&self, id: Uuid) -> AppResult<()> {
        let txn = self.db.begin().await?;

        let existing = RequestRepository::fetch(&txn, id).await?;
        RequestRepository::remove(&txn, id).await?;
        CollectionRepository::clear_items(&txn, existing.collection_id).await?;

        txn.commit().await?;
        Ok(())
    }
}
