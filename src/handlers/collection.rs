use axum::{
    extract::{Multipart, Path, Query, State},
    http::{header, HeaderName, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::converter::ConversionWarning;
use crate::error::{AppError, AppResult};
use crate::handlers::request::RequestResponse;
use crate::handlers::{validate_optional, validate_required, PaginationParams};
use crate::models::{Collection, CreateCollection, JsonObject, UpdateCollection};
use crate::state::AppState;

/// Multipart field carrying the uploaded document
const UPLOAD_FIELD: &str = "file";

/// Number of conversion warnings produced by an export
pub const WARNINGS_HEADER: HeaderName = HeaderName::from_static("x-conversion-warnings");

// ============ Request/Response DTOs ============

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateCollectionRequest {
    pub name: String,
    pub description: Option<String>,
    pub schema: Option<String>,
    #[schema(value_type = Option<Object>)]
    pub variables: Option<JsonObject>,
    #[schema(value_type = Option<Object>)]
    pub auth: Option<JsonObject>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateCollectionRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub schema: Option<String>,
    #[schema(value_type = Option<Object>)]
    pub variables: Option<JsonObject>,
    #[schema(value_type = Option<Object>)]
    pub auth: Option<JsonObject>,
    #[schema(value_type = Option<Object>)]
    pub events: Option<JsonObject>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CollectionResponse {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub schema: Option<String>,
    #[schema(value_type = Object)]
    pub variables: JsonObject,
    #[schema(value_type = Option<Object>)]
    pub auth: Option<JsonObject>,
    #[schema(value_type = Option<Object>)]
    pub events: Option<JsonObject>,
    pub postman_id: Option<String>,
    pub exporter_id: Option<String>,
    /// Whether export will replay the tree captured at import time
    pub has_cached_tree: bool,
    #[schema(value_type = String)]
    pub created_at: time::OffsetDateTime,
    #[schema(value_type = String)]
    pub updated_at: time::OffsetDateTime,
}

impl From<Collection> for CollectionResponse {
    fn from(c: Collection) -> Self {
        Self {
            id: c.id,
            name: c.name,
            description: c.description,
            schema: c.schema,
            variables: c.variables,
            auth: c.auth,
            events: c.events,
            postman_id: c.postman_id,
            exporter_id: c.exporter_id,
            has_cached_tree: c.items.is_some(),
            created_at: c.created_at,
            updated_at: c.updated_at,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CollectionListResponse {
    pub data: Vec<CollectionResponse>,
    pub total: u64,
    pub limit: u64,
    pub offset: u64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CollectionWithRequestsResponse {
    pub collection: CollectionResponse,
    pub requests: Vec<RequestResponse>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct WarningResponse {
    pub path: String,
    pub field: String,
    pub message: String,
    /// `info` or `warning`
    pub severity: String,
}

impl From<ConversionWarning> for WarningResponse {
    fn from(w: ConversionWarning) -> Self {
        Self {
            path: w.path,
            field: w.field,
            message: w.message,
            severity: w.severity.to_string(),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ImportResponse {
    pub id: Uuid,
    pub name: String,
    pub requests_imported: usize,
    pub warnings: Vec<WarningResponse>,
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct ImportParams {
    /// Reject the upload when any field had to be dropped
    #[param(default = false)]
    pub strict: Option<bool>,
}

/// Multipart upload body, documented for the OpenAPI schema only
#[derive(ToSchema)]
#[allow(dead_code)]
pub struct ImportUpload {
    #[schema(value_type = String, format = Binary)]
    pub file: Vec<u8>,
}

// ============ Handlers ============

/// Create an empty collection
#[utoipa::path(
    post,
    path = "/api/v1/collections",
    request_body = CreateCollectionRequest,
    responses(
        (status = 201, description = "Collection created successfully", body = CollectionResponse),
        (status = 400, description = "Validation error")
    ),
    tag = "Collections"
)]
pub async fn create_collection(
    State(state): State<AppState>,
    Json(payload): Json<CreateCollectionRequest>,
) -> AppResult<(StatusCode, Json<CollectionResponse>)> {
    validate_required(&payload.name, "Name", 255)?;
    validate_optional(&payload.description, "Description", 10_000)?;

    let create_collection = CreateCollection {
        name: payload.name,
        description: payload.description,
        schema: payload.schema,
        variables: payload.variables.unwrap_or_default(),
        auth: payload.auth,
        ..Default::default()
    };

    let collection = state.collection_service().create(&create_collection).await?;
    Ok((StatusCode::CREATED, Json(collection.into())))
}

/// List collections, newest first
#[utoipa::path(
    get,
    path = "/api/v1/collections",
    params(PaginationParams),
    responses(
        (status = 200, description = "List of collections", body = CollectionListResponse)
    ),
    tag = "Collections"
)]
pub async fn list_collections(
    State(state): State<AppState>,
    Query(params): Query<PaginationParams>,
) -> AppResult<Json<CollectionListResponse>> {
    let (limit, offset) = params.resolve();

    let (collections, total) = state.collection_service().list(limit, offset).await?;

    Ok(Json(CollectionListResponse {
        data: collections.into_iter().map(|c| c.into()).collect(),
        total,
        limit,
        offset,
    }))
}

/// Get a collection by ID
#[utoipa::path(
    get,
    path = "/api/v1/collections/{id}",
    params(
        ("id" = Uuid, Path, description = "Collection ID")
    ),
    responses(
        (status = 200, description = "Collection details", body = CollectionResponse),
        (status = 404, description = "Collection not found")
    ),
    tag = "Collections"
)]
pub async fn get_collection(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<CollectionResponse>> {
    let collection = state.collection_service().get(id).await?;
    Ok(Json(collection.into()))
}

/// Get a collection together with all of its requests
#[utoipa::path(
    get,
    path = "/api/v1/collections/{id}/with-requests",
    params(
        ("id" = Uuid, Path, description = "Collection ID")
    ),
    responses(
        (status = 200, description = "Collection and requests", body = CollectionWithRequestsResponse),
        (status = 404, description = "Collection not found")
    ),
    tag = "Collections"
)]
pub async fn get_collection_with_requests(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<CollectionWithRequestsResponse>> {
    let (collection, requests) = state.collection_service().get_with_requests(id).await?;

    Ok(Json(CollectionWithRequestsResponse {
        collection: collection.into(),
        requests: requests.into_iter().map(|r| r.into()).collect(),
    }))
}

/// Update collection metadata
#[utoipa::path(
    put,
    path = "/api/v1/collections/{id}",
    params(
        ("id" = Uuid, Path, description = "Collection ID")
    ),
    request_body = UpdateCollectionRequest,
    responses(
        (status = 200, description = "Collection updated successfully", body = CollectionResponse),
        (status = 404, description = "Collection not found"),
        (status = 400, description = "Validation error")
    ),
    tag = "Collections"
)]
pub async fn update_collection(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateCollectionRequest>,
) -> AppResult<Json<CollectionResponse>> {
    if let Some(name) = &payload.name {
        validate_required(name, "Name", 255)?;
    }
    validate_optional(&payload.description, "Description", 10_000)?;

    let update_collection = UpdateCollection {
        name: payload.name,
        description: payload.description,
        schema: payload.schema,
        variables: payload.variables,
        auth: payload.auth,
        events: payload.events,
    };

    let collection = state
        .collection_service()
        .update(id, &update_collection)
        .await?;
    Ok(Json(collection.into()))
}

/// Delete a collection and all of its requests
#[utoipa::path(
    delete,
    path = "/api/v1/collections/{id}",
    params(
        ("id" = Uuid, Path, description = "Collection ID")
    ),
    responses(
        (status = 204, description = "Collection deleted successfully"),
        (status = 404, description = "Collection not found")
    ),
    tag = "Collections"
)]
pub async fn delete_collection(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<StatusCode> {
    state.collection_service().delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Import a collection document from a multipart upload
#[utoipa::path(
    post,
    path = "/api/v1/collections/import",
    params(ImportParams),
    request_body(content = ImportUpload, content_type = "multipart/form-data"),
    responses(
        (status = 201, description = "Collection imported", body = ImportResponse),
        (status = 400, description = "Invalid document, missing file or strict-mode rejection")
    ),
    tag = "Import/Export"
)]
pub async fn import_collection(
    State(state): State<AppState>,
    Query(params): Query<ImportParams>,
    mut multipart: Multipart,
) -> AppResult<(StatusCode, Json<ImportResponse>)> {
    let mut upload = None;
    while let Some(field) = multipart.next_field().await? {
        if field.name() == Some(UPLOAD_FIELD) {
            upload = Some(field.bytes().await?);
            break;
        }
    }

    let bytes = upload.ok_or_else(|| {
        AppError::Validation(format!("multipart field '{}' is required", UPLOAD_FIELD))
    })?;

    let outcome = state
        .collection_service()
        .import(&bytes, params.strict.unwrap_or(false))
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(ImportResponse {
            id: outcome.collection.id,
            name: outcome.collection.name,
            requests_imported: outcome.requests_imported,
            warnings: outcome.warnings.into_iter().map(|w| w.into()).collect(),
        }),
    ))
}

/// Download a collection as an exchange document
#[utoipa::path(
    get,
    path = "/api/v1/collections/{id}/export",
    params(
        ("id" = Uuid, Path, description = "Collection ID")
    ),
    responses(
        (status = 200, description = "Exchange document as a JSON attachment",
            headers(("x-conversion-warnings" = u32, description = "Number of conversion warnings"))),
        (status = 404, description = "Collection not found")
    ),
    tag = "Import/Export"
)]
pub async fn export_collection(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Response> {
    let outcome = state.collection_service().export(id).await?;

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "application/json".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", outcome.filename),
            ),
            (WARNINGS_HEADER, outcome.warnings.len().to_string()),
        ],
        outcome.body,
    )
        .into_response())
}
