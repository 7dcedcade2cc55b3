use async_trait::async_trait;
use sea_orm::{
    sea_query::Expr, ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection,
    EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set,
};
use serde_json::Value;
use uuid::Uuid;

use crate::entity::collection::{self, ActiveModel, Column, Entity as CollectionEntity};
use crate::error::{AppError, AppResult};
use crate::models::{
    json_to_object, json_to_optional_object, Collection, CreateCollection, UpdateCollection,
};
use crate::repositories::Repository;

/// Collection repository for database operations
pub struct CollectionRepository;

#[async_trait]
impl Repository<Collection> for CollectionRepository {
    async fn find_by_id(db: &DatabaseConnection, id: Uuid) -> AppResult<Collection> {
        Self::fetch(db, id).await
    }

    async fn delete(db: &DatabaseConnection, id: Uuid) -> AppResult<()> {
        Self::remove(db, id).await
    }

    async fn list(db: &DatabaseConnection, limit: u64, offset: u64) -> AppResult<Vec<Collection>> {
        let models = CollectionEntity::find()
            .order_by_desc(Column::CreatedAt)
            .offset(offset)
            .limit(limit)
            .all(db)
            .await?;

        Ok(models.into_iter().map(|m| m.into()).collect())
    }

    async fn count(db: &DatabaseConnection) -> AppResult<u64> {
        let count = CollectionEntity::find().count(db).await?;
        Ok(count)
    }
}

impl CollectionRepository {
    /// Insert a collection under a caller-chosen id
    pub async fn create<C: ConnectionTrait>(
        db: &C,
        id: Uuid,
        input: &CreateCollection,
    ) -> AppResult<Collection> {
        let now = time::OffsetDateTime::now_utc();
        let model = ActiveModel {
            id: Set(id),
            name: Set(input.name.clone()),
            description: Set(input.description.clone()),
            schema: Set(input.schema.clone()),
            variables: Set(Value::Object(input.variables.clone())),
            auth: Set(input.auth.clone().map(Value::Object)),
            events: Set(input.events.clone().map(Value::Object)),
            items: Set(input.items.clone().map(Value::Object)),
            postman_id: Set(input.postman_id.clone()),
            exporter_id: Set(input.exporter_id.clone()),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let result = model.insert(db).await?;
        Ok(result.into())
    }

    pub async fn fetch<C: ConnectionTrait>(db: &C, id: Uuid) -> AppResult<Collection> {
        let model = CollectionEntity::find_by_id(id)
            .one(db)
            .await?
            .ok_or_else(|| AppError::NotFound("Collection".to_string()))?;

        Ok(model.into())
    }

    pub async fn exists<C: ConnectionTrait>(db: &C, id: Uuid) -> AppResult<bool> {
        let count = CollectionEntity::find_by_id(id).count(db).await?;
        Ok(count > 0)
    }

    pub async fn remove<C: ConnectionTrait>(db: &C, id: Uuid) -> AppResult<()> {
        let result = CollectionEntity::delete_by_id(id).exec(db).await?;

        if result.rows_affected == 0 {
            return Err(AppError::NotFound("Collection".to_string()));
        }

        Ok(())
    }

    /// Update metadata; the cached item tree is left as it is
    pub async fn update(
        db: &DatabaseConnection,
        id: Uuid,
        input: &UpdateCollection,
    ) -> AppResult<Collection> {
        let model = CollectionEntity::find_by_id(id)
            .one(db)
            .await?
            .ok_or_else(|| AppError::NotFound("Collection".to_string()))?;

        let mut active: ActiveModel = model.into();

        if let Some(name) = &input.name {
            active.name = Set(name.clone());
        }
        if let Some(description) = &input.description {
            active.description = Set(Some(description.clone()));
        }
        if let Some(schema) = &input.schema {
            active.schema = Set(Some(schema.clone()));
        }
        if let Some(variables) = &input.variables {
            active.variables = Set(Value::Object(variables.clone()));
        }
        if let Some(auth) = &input.auth {
            active.auth = Set(Some(Value::Object(auth.clone())));
        }
        if let Some(events) = &input.events {
            active.events = Set(Some(Value::Object(events.clone())));
        }
        active.updated_at = Set(time::OffsetDateTime::now_utc());

        let result = active.update(db).await?;
        Ok(result.into())
    }

    /// Drop the cached item tree so the next export rebuilds from requests
    pub async fn clear_items<C: ConnectionTrait>(db: &C, id: Uuid) -> AppResult<()> {
        CollectionEntity::update_many()
            .col_expr(Column::Items, Expr::value(Option::<Value>::None))
            .col_expr(Column::UpdatedAt, Expr::value(time::OffsetDateTime::now_utc()))
            .filter(Column::Id.eq(id))
            .filter(Column::Items.is_not_null())
            .exec(db)
            .await?;

        Ok(())
    }
}

// Conversion from SeaORM model to our domain model
impl From<collection::Model> for Collection {
    fn from(m: collection::Model) -> Self {
        Self {
            id: m.id,
            name: m.name,
            description: m.description,
            schema: m.schema,
            variables: json_to_object(m.variables),
            auth: json_to_optional_object(m.auth),
            events: json_to_optional_object(m.events),
            items: json_to_optional_object(m.items),
            postman_id: m.postman_id,
            exporter_id: m.exporter_id,
            created_at: m.created_at,
            updated_at: m.updated_at,
        }
    }
}
