use std::collections::BTreeMap;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::handlers::{validate_optional, validate_required, PaginationParams};
use crate::models::{CreateRequest, JsonObject, Request};
use crate::services::request::url_from_value;
use crate::state::AppState;

const DEFAULT_METHOD: &str = "GET";

// ============ Request/Response DTOs ============

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateRequestRequest {
    pub collection_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    /// Slash-joined folder names; empty or absent for the collection root
    pub folder_path: Option<String>,
    /// Bare URL string or structured URL object
    #[schema(value_type = Option<Object>)]
    pub url: Option<Value>,
    /// Defaults to GET
    pub method: Option<String>,
    pub headers: Option<BTreeMap<String, String>>,
    #[schema(value_type = Option<Object>)]
    pub params: Option<JsonObject>,
    #[schema(value_type = Option<Object>)]
    pub body: Option<JsonObject>,
    #[schema(value_type = Option<Object>)]
    pub auth: Option<JsonObject>,
    #[schema(value_type = Option<Object>)]
    pub events: Option<JsonObject>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CloneRequestRequest {
    pub name: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct RequestResponse {
    pub id: Uuid,
    pub collection_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub folder_path: String,
    #[schema(value_type = Object)]
    pub url: JsonObject,
    pub method: String,
    pub headers: BTreeMap<String, String>,
    #[schema(value_type = Option<Object>)]
    pub params: Option<JsonObject>,
    #[schema(value_type = Option<Object>)]
    pub body: Option<JsonObject>,
    #[schema(value_type = Option<Object>)]
    pub auth: Option<JsonObject>,
    #[schema(value_type = Option<Object>)]
    pub events: Option<JsonObject>,
    #[schema(value_type = Option<Object>)]
    pub responses: Option<JsonObject>,
    pub postman_id: Option<String>,
    pub position: i32,
    #[schema(value_type = String)]
    pub created_at: time::OffsetDateTime,
    #[schema(value_type = String)]
    pub updated_at: time::OffsetDateTime,
}

impl From<Request> for RequestResponse {
    fn from(r: Request) -> Self {
        Self {
            id: r.id,
            collection_id: r.collection_id,
            name: r.name,
            description: r.description,
            folder_path: r.folder_path,
            url: r.url,
            method: r.method,
            headers: r.headers,
            params: r.params,
            body: r.body,
            auth: r.auth,
            events: r.events,
            responses: r.responses,
            postman_id: r.postman_id,
            position: r.position,
            created_at: r.created_at,
            updated_at: r.updated_at,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct RequestListResponse {
    pub data: Vec<RequestResponse>,
    pub total: u64,
    pub limit: u64,
    pub offset: u64,
}

/// JSON `null` means "missing"; anything but an object is rejected
fn optional_object(value: Value, what: &str) -> AppResult<Option<JsonObject>> {
    match value {
        Value::Null => Ok(None),
        Value::Object(map) => Ok(Some(map)),
        _ => Err(AppError::Validation(format!("{} must be a JSON object", what))),
    }
}

fn optional_headers(value: Value) -> AppResult<Option<BTreeMap<String, String>>> {
    let Some(map) = optional_object(value, "headers")? else {
        return Ok(None);
    };

    map.into_iter()
        .map(|(key, value)| match value {
            Value::String(text) => Ok((key, text)),
            _ => Err(AppError::Validation(format!(
                "header '{}' must be a string",
                key
            ))),
        })
        .collect::<AppResult<BTreeMap<_, _>>>()
        .map(Some)
}

// ============ Handlers ============

/// Create a request inside an existing collection
#[utoipa::path(
    post,
    path = "/api/v1/requests",
    request_body = CreateRequestRequest,
    responses(
        (status = 201, description = "Request created successfully", body = RequestResponse),
        (status = 404, description = "Collection not found"),
        (status = 400, description = "Validation error")
    ),
    tag = "Requests"
)]
pub async fn create_request(
    State(state): State<AppState>,
    Json(payload): Json<CreateRequestRequest>,
) -> AppResult<(StatusCode, Json<RequestResponse>)> {
    validate_required(&payload.name, "Name", 255)?;
    validate_optional(&payload.description, "Description", 10_000)?;
    validate_optional(&payload.method, "Method", 32)?;

    let create_request = CreateRequest {
        collection_id: payload.collection_id,
        name: payload.name,
        description: payload.description,
        folder_path: payload.folder_path.unwrap_or_default(),
        url: url_from_value(payload.url)?,
        method: payload
            .method
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_METHOD.to_string()),
        headers: payload.headers.unwrap_or_default(),
        params: payload.params,
        body: payload.body,
        auth: payload.auth,
        events: payload.events,
        ..Default::default()
    };

    let request = state.request_service().create(create_request).await?;
    Ok((StatusCode::CREATED, Json(request.into())))
}

/// List all requests, newest first
#[utoipa::path(
    get,
    path = "/api/v1/requests",
    params(PaginationParams),
    responses(
        (status = 200, description = "List of requests", body = RequestListResponse)
    ),
    tag = "Requests"
)]
pub async fn list_requests(
    State(state): State<AppState>,
    Query(params): Query<PaginationParams>,
) -> AppResult<Json<RequestListResponse>> {
    let (limit, offset) = params.resolve();

    let (requests, total) = state.request_service().list(limit, offset).await?;

    Ok(Json(RequestListResponse {
        data: requests.into_iter().map(|r| r.into()).collect(),
        total,
        limit,
        offset,
    }))
}

/// List the requests of one collection in tree order
#[utoipa::path(
    get,
    path = "/api/v1/collections/{id}/requests",
    params(
        ("id" = Uuid, Path, description = "Collection ID"),
        PaginationParams
    ),
    responses(
        (status = 200, description = "List of requests", body = RequestListResponse),
        (status = 404, description = "Collection not found")
    ),
    tag = "Requests"
)]
pub async fn list_collection_requests(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(params): Query<PaginationParams>,
) -> AppResult<Json<RequestListResponse>> {
    let (limit, offset) = params.resolve();

    let (requests, total) = state
        .request_service()
        .list_by_collection(id, limit, offset)
        .await?;

    Ok(Json(RequestListResponse {
        data: requests.into_iter().map(|r| r.into()).collect(),
        total,
        limit,
        offset,
    }))
}

/// Get a request by ID
#[utoipa::path(
    get,
    path = "/api/v1/requests/{id}",
    params(
        ("id" = Uuid, Path, description = "Request ID")
    ),
    responses(
        (status = 200, description = "Request details", body = RequestResponse),
        (status = 404, description = "Request not found")
    ),
    tag = "Requests"
)]
pub async fn get_request(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<RequestResponse>> {
    let request = state.request_service().get(id).await?;
    Ok(Json(request.into()))
}

/// Delete a request
#[utoipa::path(
    delete,
    path = "/api/v1/requests/{id}",
    params(
        ("id" = Uuid, Path, description = "Request ID")
    ),
    responses(
        (status = 204, description = "Request deleted successfully"),
        (status = 404, description = "Request not found")
    ),
    tag = "Requests"
)]
pub async fn delete_request(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<StatusCode> {
    state.request_service().delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Replace the body of a request; the JSON body must be an object
#[utoipa::path(
    put,
    path = "/api/v1/requests/{id}/payload",
    params(
        ("id" = Uuid, Path, description = "Request ID")
    ),
    responses(
        (status = 200, description = "Request updated", body = RequestResponse),
        (status = 404, description = "Request not found"),
        (status = 400, description = "Body missing or not an object")
    ),
    tag = "Requests"
)]
pub async fn update_request_payload(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<Value>,
) -> AppResult<Json<RequestResponse>> {
    let body = optional_object(payload, "payload")?;
    let request = state.request_service().update_payload(id, body).await?;
    Ok(Json(request.into()))
}

/// Replace the headers of a request with a `name -> value` object
#[utoipa::path(
    put,
    path = "/api/v1/requests/{id}/headers",
    params(
        ("id" = Uuid, Path, description = "Request ID")
    ),
    responses(
        (status = 200, description = "Request updated", body = RequestResponse),
        (status = 404, description = "Request not found"),
        (status = 400, description = "Headers missing or malformed")
    ),
    tag = "Requests"
)]
pub async fn update_request_headers(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<Value>,
) -> AppResult<Json<RequestResponse>> {
    let headers = optional_headers(payload)?;
    let request = state.request_service().update_headers(id, headers).await?;
    Ok(Json(request.into()))
}

/// Replace the query parameters of a request with a JSON object
#[utoipa::path(
    put,
    path = "/api/v1/requests/{id}/params",
    params(
        ("id" = Uuid, Path, description = "Request ID")
    ),
    responses(
        (status = 200, description = "Request updated", body = RequestResponse),
        (status = 404, description = "Request not found"),
        (status = 400, description = "Params missing or not an object")
    ),
    tag = "Requests"
)]
pub async fn update_request_params(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<Value>,
) -> AppResult<Json<RequestResponse>> {
    let params = optional_object(payload, "params")?;
    let request = state.request_service().update_params(id, params).await?;
    Ok(Json(request.into()))
}

/// Clone a request under a new name
#[utoipa::path(
    post,
    path = "/api/v1/requests/{id}/clone",
    params(
        ("id" = Uuid, Path, description = "Request ID")
    ),
    request_body = CloneRequestRequest,
    responses(
        (status = 201, description = "Request cloned", body = RequestResponse),
        (status = 404, description = "Request not found"),
        (status = 400, description = "Validation error")
    ),
    tag = "Requests"
)]
pub async fn clone_request(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<CloneRequestRequest>,
) -> AppResult<(StatusCode, Json<RequestResponse>)> {
    validate_required(&payload.name, "Name", 255)?;

    let request = state
        .request_service()
        .clone_request(id, payload.name)
        .await?;
    Ok((StatusCode::CREATED, Json(request.into())))
}
