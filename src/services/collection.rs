use std::sync::Arc;

use uuid::Uuid;

use crate::converter::{export_filename, CollectionConverter, ConversionWarning, WarningSeverity};
use crate::error::{AppError, AppResult};
use crate::models::{Collection, CreateCollection, Request, UpdateCollection};
use crate::store::CollectionStore;

/// Result of a successful import
#[derive(Debug)]
pub struct ImportOutcome {
    pub collection: Collection,
    pub requests_imported: usize,
    pub warnings: Vec<ConversionWarning>,
}

/// Serialized exchange document ready for download
#[derive(Debug)]
pub struct ExportOutcome {
    pub filename: String,
    pub body: Vec<u8>,
    pub warnings: Vec<ConversionWarning>,
}

/// Collection management plus import/export
pub struct CollectionService {
    store: Arc<dyn CollectionStore>,
    converter: CollectionConverter,
}

impl CollectionService {
    pub fn new(store: Arc<dyn CollectionStore>, converter: CollectionConverter) -> Self {
        Self { store, converter }
    }

    pub async fn create(&self, input: &CreateCollection) -> AppResult<Collection> {
        let collection = self.store.create_collection(input).await?;
        tracing::info!(collection_id = %collection.id, name = %collection.name, "Collection created");
        Ok(collection)
    }

    pub async fn get(&self, id: Uuid) -> AppResult<Collection> {
        self.store.get_collection(id).await
    }

    pub async fn get_with_requests(&self, id: Uuid) -> AppResult<(Collection, Vec<Request>)> {
        let collection = self.store.get_collection(id).await?;
        let requests = self.store.all_requests_by_collection(id).await?;
        Ok((collection, requests))
    }

    /// One page of collections plus the total count
    pub async fn list(&self, limit: u64, offset: u64) -> AppResult<(Vec<Collection>, u64)> {
        let collections = self.store.list_collections(limit, offset).await?;
        let total = self.store.count_collections().await?;
        Ok((collections, total))
    }

    pub async fn update(&self, id: Uuid, input: &UpdateCollection) -> AppResult<Collection> {
        self.store.update_collection(id, input).await
    }

    pub async fn delete(&self, id: Uuid) -> AppResult<()> {
        self.store.delete_collection(id).await?;
        tracing::info!(collection_id = %id, "Collection deleted");
        Ok(())
    }

    /// Convert an uploaded document and persist it in one transaction.
    /// With `strict`, any field-level coercion failure rejects the upload.
    pub async fn import(&self, bytes: &[u8], strict: bool) -> AppResult<ImportOutcome> {
        let plan = self.converter.plan_import(bytes)?;

        for warning in &plan.warnings {
            tracing::warn!(
                path = %warning.path,
                field = %warning.field,
                severity = %warning.severity,
                "Import conversion: {}",
                warning.message
            );
        }

        if strict {
            if let Some(first) = plan
                .warnings
                .iter()
                .find(|w| w.severity == WarningSeverity::Warning)
            {
                return Err(AppError::Validation(format!(
                    "strict import rejected: {}",
                    first
                )));
            }
        }

        let collection = self
            .store
            .import_collection(plan.collection_id, &plan.collection, &plan.requests)
            .await?;

        tracing::info!(
            collection_id = %collection.id,
            name = %collection.name,
            requests = plan.requests.len(),
            warnings = plan.warnings.len(),
            "Collection imported"
        );

        Ok(ImportOutcome {
            collection,
            requests_imported: plan.requests.len(),
            warnings: plan.warnings,
        })
    }

    /// Rebuild (or replay from cache) the exchange document for a collection
    pub async fn export(&self, id: Uuid) -> AppResult<ExportOutcome> {
        let collection = self.store.get_collection(id).await?;
        let requests = self.store.all_requests_by_collection(id).await?;

        let exported = self.converter.export(&collection, &requests);
        for warning in &exported.warnings {
            tracing::warn!(
                collection_id = %id,
                field = %warning.field,
                "Export conversion: {}",
                warning.message
            );
        }

        let body = serde_json::to_vec_pretty(&exported.document)
            .map_err(|e| AppError::Internal(format!("Failed to serialize export: {}", e)))?;

        tracing::info!(
            collection_id = %id,
            requests = requests.len(),
            from_cache = exported.from_cache,
            "Collection exported"
        );

        Ok(ExportOutcome {
            filename: export_filename(&collection.name),
            body,
            warnings: exported.warnings,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FolderLayout;
    use crate::store::InMemoryStore;

    fn service() -> CollectionService {
        CollectionService::new(
            Arc::new(InMemoryStore::new()),
            CollectionConverter::new(32, FolderLayout::Nested),
        )
    }

    const ODD_URL: &str = r#"{
        "info": {"name": "Odd"},
        "item": [{"name": "Weird", "request": {"method": "GET", "url": 12}}]
    }"#;

    #[tokio::test]
    async fn test_lenient_import_keeps_request() {
        let service = service();
        let outcome = service.import(ODD_URL.as_bytes(), false).await.unwrap();

        assert_eq!(outcome.requests_imported, 1);
        assert_eq!(outcome.warnings.len(), 1);
        assert_eq!(outcome.warnings[0].field, "url");
    }

    #[tokio::test]
    async fn test_strict_import_rejects_warnings() {
        let service = service();
        let err = service.import(ODD_URL.as_bytes(), true).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));

        let (collections, total) = service.list(20, 0).await.unwrap();
        assert!(collections.is_empty());
        assert_eq!(total, 0);
    }

    #[tokio::test]
    async fn test_missing_name_persists_nothing() {
        let service = service();
        let err = service
            .import(br#"{"info": {}, "item": []}"#, false)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::InvalidDocument(_)));
        assert_eq!(service.list(20, 0).await.unwrap().1, 0);
    }

    #[tokio::test]
    async fn test_export_of_empty_collection() {
        let service = service();
        let collection = service
            .create(&CreateCollection {
                name: "Empty".to_string(),
                ..Default::default()
            })
            .await
            .unwrap();

        let outcome = service.export(collection.id).await.unwrap();
        assert_eq!(outcome.filename, "Empty.postman_collection.json");

        let document: serde_json::Value = serde_json::from_slice(&outcome.body).unwrap();
        assert_eq!(document["item"], serde_json::json!([]));
        assert_eq!(
            document["info"]["schema"],
            serde_json::json!(crate::converter::SCHEMA_URL)
        );
    }
}
