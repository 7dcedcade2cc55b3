use std::collections::BTreeMap;

use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set,
};
use serde_json::Value;
use uuid::Uuid;

use crate::entity::request::{self, ActiveModel, Column, Entity as RequestEntity};
use crate::error::{AppError, AppResult};
use crate::models::{
    json_to_object, json_to_optional_object, CreateRequest, Request, UpdateRequest,
};
use crate::repositories::Repository;

/// Request repository for database operations
pub struct RequestRepository;

#[async_trait]
impl Repository<Request> for RequestRepository {
    async fn find_by_id(db: &DatabaseConnection, id: Uuid) -> AppResult<Request> {
        Self::fetch(db, id).await
    }

    async fn delete(db: &DatabaseConnection, id: Uuid) -> AppResult<()> {
        let result = RequestEntity::delete_by_id(id).exec(db).await?;

        if result.rows_affected == 0 {
            return Err(AppError::NotFound("Request".to_string()));
        }

        Ok(())
    }

    async fn list(db: &DatabaseConnection, limit: u64, offset: u64) -> AppResult<Vec<Request>> {
        let models = RequestEntity::find()
            .order_by_desc(Column::CreatedAt)
            .offset(offset)
            .limit(limit)
            .all(db)
            .await?;

        Ok(models.into_iter().map(|m| m.into()).collect())
    }

    async fn count(db: &DatabaseConnection) -> AppResult<u64> {
        let count = RequestEntity::find().count(db).await?;
        Ok(count)
    }
}

impl RequestRepository {
    /// Insert a request at an explicit position
    pub async fn create<C: ConnectionTrait>(
        db: &C,
        input: &CreateRequest,
        position: i32,
    ) -> AppResult<Request> {
        let now = time::OffsetDateTime::now_utc();
        let model = ActiveModel {
            id: Set(Uuid::new_v4()),
            collection_id: Set(input.collection_id),
            name: Set(input.name.clone()),
            description: Set(input.description.clone()),
            folder_path: Set(input.folder_path.clone()),
            url: Set(Value::Object(input.url.clone())),
            method: Set(input.method.clone()),
            headers: Set(headers_to_json(&input.headers)),
            params: Set(input.params.clone().map(Value::Object)),
            body: Set(input.body.clone().map(Value::Object)),
            auth: Set(input.auth.clone().map(Value::Object)),
            events: Set(input.events.clone().map(Value::Object)),
            responses: Set(input.responses.clone().map(Value::Object)),
            postman_id: Set(input.postman_id.clone()),
            position: Set(position),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let result = model.insert(db).await?;
        Ok(result.into())
    }

    pub async fn fetch<C: ConnectionTrait>(db: &C, id: Uuid) -> AppResult<Request> {
        let model = RequestEntity::find_by_id(id)
            .one(db)
            .await?
            .ok_or_else(|| AppError::NotFound("Request".to_string()))?;

        Ok(model.into())
    }

    /// Position just after the last request of a collection
    pub async fn next_position<C: ConnectionTrait>(db: &C, collection_id: Uuid) -> AppResult<i32> {
        let last = RequestEntity::find()
            .filter(Column::CollectionId.eq(collection_id))
            .order_by_desc(Column::Position)
            .one(db)
            .await?;

        Ok(last.map_or(0, |m| m.position + 1))
    }

    /// List a page of a collection's requests in tree order
    pub async fn list_by_collection(
        db: &DatabaseConnection,
        collection_id: Uuid,
        limit: u64,
        offset: u64,
    ) -> AppResult<Vec<Request>> {
        let models = RequestEntity::find()
            .filter(Column::CollectionId.eq(collection_id))
            .order_by_asc(Column::Position)
            .order_by_asc(Column::CreatedAt)
            .offset(offset)
            .limit(limit)
            .all(db)
            .await?;

        Ok(models.into_iter().map(|m| m.into()).collect())
    }

    /// Every request of a collection in tree order, for export
    pub async fn all_by_collection(
        db: &DatabaseConnection,
        collection_id: Uuid,
    ) -> AppResult<Vec<Request>> {
        let models = RequestEntity::find()
            .filter(Column::CollectionId.eq(collection_id))
            .order_by_asc(Column::Position)
            .order_by_asc(Column::CreatedAt)
            .all(db)
            .await?;

        Ok(models.into_iter().map(|m| m.into()).collect())
    }

    pub async fn count_by_collection(
        db: &DatabaseConnection,
        collection_id: Uuid,
    ) -> AppResult<u64> {
        let count = RequestEntity::find()
            .filter(Column::CollectionId.eq(collection_id))
            .count(db)
            .await?;

        Ok(count)
    }

    pub async fn update<C: ConnectionTrait>(
        db: &C,
        id: Uuid,
        input: &UpdateRequest,
    ) -> AppResult<Request> {
        let model = RequestEntity::find_by_id(id)
            .one(db)
            .await?
            .ok_or_else(|| AppError::NotFound("Request".to_string()))?;

        let mut active: ActiveModel = model.into();

        if let Some(name) = &input.name {
            active.name = Set(name.clone());
        }
        if let Some(description) = &input.description {
            active.description = Set(Some(description.clone()));
        }
        if let Some(folder_path) = &input.folder_path {
            active.folder_path = Set(folder_path.clone());
        }
        if let Some(url) = &input.url {
            active.url = Set(Value::Object(url.clone()));
        }
        if let Some(method) = &input.method {
            active.method = Set(method.clone());
        }
        if let Some(headers) = &input.headers {
            active.headers = Set(headers_to_json(headers));
        }
        if let Some(params) = &input.params {
            active.params = Set(Some(Value::Object(params.clone())));
        }
        if let Some(body) = &input.body {
            active.body = Set(Some(Value::Object(body.clone())));
        }
        if let Some(auth) = &input.auth {
            active.auth = Set(Some(Value::Object(auth.clone())));
        }
        if let Some(events) = &input.events {
            active.events = Set(Some(Value::Object(events.clone())));
        }
        if let Some(responses) = &input.responses {
            active.responses = Set(Some(Value::Object(responses.clone())));
        }
        active.updated_at = Set(time::OffsetDateTime::now_utc());

        let result = active.update(db).await?;
        Ok(result.into())
    }

    pub async fn remove<C: ConnectionTrait>(db: &C, id: Uuid) -> AppResult<()> {
        let result = RequestEntity::delete_by_id(id).exec(db).await?;

        if result.rows_affected == 0 {
            return Err(AppError::NotFound("Request".to_string()));
        }

        Ok(())
    }

    pub async fn delete_by_collection<C: ConnectionTrait>(
        db: &C,
        collection_id: Uuid,
    ) -> AppResult<u64> {
        let result = RequestEntity::delete_many()
            .filter(Column::CollectionId.eq(collection_id))
            .exec(db)
            .await?;

        Ok(result.rows_affected)
    }
}

fn headers_to_json(headers: &BTreeMap<String, String>) -> Value {
    Value::Object(
        headers
            .iter()
            .map(|(k, v)| (k.clone(), Value::String(v.clone())))
            .collect(),
    )
}

fn headers_from_json(value: Value) -> BTreeMap<String, String> {
    json_to_object(value)
        .into_iter()
        .map(|(k, v)| match v {
            Value::String(s) => (k, s),
            other => (k, other.to_string()),
        })
        .collect()
}

// Conversion from SeaORM model to our domain model
impl From<request::Model> for Request {
    fn from(m: request::Model) -> Self {
        Self {
            id: m.id,
            collection_id: m.collection_id,
            name: m.name,
            description: m.description,
            folder_path: m.folder_path,
            url: json_to_object(m.url),
            method: m.method,
            headers: headers_from_json(m.headers),
            params: json_to_optional_object(m.params),
            body: json_to_optional_object(m.body),
            auth: json_to_optional_object(m.auth),
            events: json_to_optional_object(m.events),
            responses: json_to_optional_object(m.responses),
            postman_id: m.postman_id,
            position: m.position,
            created_at: m.created_at,
            updated_at: m.updated_at,
        }
    }
}
