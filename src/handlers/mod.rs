pub mod collection;
pub mod common;
pub mod health;
pub mod request;

pub use collection::{
    create_collection, delete_collection, export_collection, get_collection,
    get_collection_with_requests, import_collection, list_collections, update_collection,
    CollectionListResponse, CollectionResponse, CollectionWithRequestsResponse,
    CreateCollectionRequest, ImportResponse, ImportUpload, UpdateCollectionRequest,
    WarningResponse,
};
pub use common::{validate_optional, validate_required, PaginationParams};
pub use health::{health, HealthResponse};
pub use request::{
    clone_request, create_request, delete_request, get_request, list_collection_requests,
    list_requests, update_request_headers, update_request_params, update_request_payload,
    CloneRequestRequest, CreateRequestRequest, RequestListResponse, RequestResponse,
};
