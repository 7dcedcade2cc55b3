//! Conversion between collection exchange documents and flat request records.
//!
//! Import parses an uploaded document, flattens its folder tree into
//! [`CreateRequest`] records and normalizes every union-typed field. Export
//! does the reverse, either from the item tree cached at import time or by
//! regrouping records on their folder paths.

pub mod build;
pub mod exchange;
pub mod flatten;
pub mod normalize;
pub mod warning;

pub use build::TreeBuilder;
pub use exchange::{PostmanCollection, PostmanItem, PostmanUrl, FILE_SUFFIX, SCHEMA_URL};
pub use flatten::TreeFlattener;
pub use warning::{ConversionWarning, WarningSeverity, Warnings};

use serde_json::Value;
use uuid::Uuid;

use crate::config::{Config, FolderLayout};
use crate::models::{Collection, CreateCollection, CreateRequest, Request};

#[derive(Debug, thiserror::Error)]
pub enum ConvertError {
    #[error("document is not valid JSON: {0}")]
    InvalidJson(#[source] serde_json::Error),

    #[error("document does not match the collection format: {0}")]
    InvalidStructure(#[source] serde_json::Error),

    #[error("collection name is required")]
    MissingName,

    #[error("folder nesting under '{path}' exceeds the maximum depth of {max_depth}")]
    TooDeep { path: String, max_depth: usize },
}

/// Everything needed to persist one import
#[derive(Debug)]
pub struct ImportPlan {
    /// Assigned before any record is built so every request can reference it
    pub collection_id: Uuid,
    pub collection: CreateCollection,
    pub requests: Vec<CreateRequest>,
    pub warnings: Vec<ConversionWarning>,
}

#[derive(Debug)]
pub struct ExportedCollection {
    pub document: PostmanCollection,
    pub warnings: Vec<ConversionWarning>,
    /// True when the tree came from the import-time cache
    pub from_cache: bool,
}

pub struct CollectionConverter {
    flattener: TreeFlattener,
    builder: TreeBuilder,
}

impl CollectionConverter {
    pub fn new(max_depth: usize, layout: FolderLayout) -> Self {
        Self {
            flattener: TreeFlattener::new(max_depth),
            builder: TreeBuilder::new(layout),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.max_import_depth, config.folder_layout)
    }

    /// Parse and flatten an uploaded document. Nothing is persisted here.
    pub fn plan_import(&self, bytes: &[u8]) -> Result<ImportPlan, ConvertError> {
        let value: Value = serde_json::from_slice(bytes).map_err(ConvertError::InvalidJson)?;
        let raw_items = value.get("item").cloned();
        let document: PostmanCollection =
            serde_json::from_value(value).map_err(ConvertError::InvalidStructure)?;

        if document.info.name.trim().is_empty() {
            return Err(ConvertError::MissingName);
        }

        let mut warnings = Warnings::new();
        let collection_id = Uuid::new_v4();

        let auth = warnings.recover(
            "",
            "auth",
            normalize::normalize_blob(document.auth.as_ref()),
            None,
        );
        let events = warnings.recover(
            "",
            "event",
            normalize::normalize_blob(document.event.as_ref()),
            None,
        );
        let items = match raw_items {
            Some(Value::Array(entries)) if !entries.is_empty() => {
                Some(normalize::wrap_list(entries))
            }
            _ => None,
        };

        let requests =
            self.flattener
                .flatten(&document.item, collection_id, "", &mut warnings)?;

        let collection = CreateCollection {
            name: document.info.name.clone(),
            description: normalize::description_text(document.info.description.as_ref()),
            schema: document.schema.clone().or_else(|| document.info.schema.clone()),
            variables: normalize::variables_to_object(&document.variable),
            auth,
            events,
            items,
            postman_id: document.info.postman_id.clone(),
            exporter_id: document.info.exporter_id.clone(),
        };

        Ok(ImportPlan {
            collection_id,
            collection,
            requests,
            warnings: warnings.into_vec(),
        })
    }

    /// Produce the exchange document for a collection. A cached tree that
    /// cannot be decoded is reported and the tree is rebuilt from `requests`.
    pub fn export(&self, collection: &Collection, requests: &[Request]) -> ExportedCollection {
        let mut warnings = Warnings::new();

        let cached = collection
            .items
            .as_ref()
            .and_then(|items| match build::cached_items(items) {
                Ok(tree) => Some(tree),
                Err(err) => {
                    warnings.warn(
                        "",
                        "items",
                        format!("cached item tree unusable ({}); rebuilt from requests", err),
                    );
                    None
                }
            });

        let from_cache = cached.is_some();
        let item = match cached {
            Some(tree) => tree,
            None => self.builder.build_items(requests),
        };

        ExportedCollection {
            document: self.builder.document(collection, item),
            warnings: warnings.into_vec(),
            from_cache,
        }
    }
}

/// Suggested download filename, `<name>.postman_collection.json`
pub fn export_filename(name: &str) -> String {
    let stem: String = name
        .chars()
        .map(|c| match c {
            '/' | '\\' | '"' | ':' | '*' | '?' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();
    let stem = stem.trim();
    let stem = if stem.is_empty() { "collection" } else { stem };

    format!("{}.{}", stem, FILE_SUFFIX)
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use serde_json::json;
    use time::OffsetDateTime;

    use super::*;

    const FIXTURE: &str = r#"{
        "info": {
            "_postman_id": "c0ffee",
            "name": "Shop API",
            "description": "Storefront endpoints",
            "schema": "https://schema.getpostman.com/json/collection/v2.1.0/collection.json"
        },
        "variable": [
            {"key": "base", "value": "https://shop.test"},
            {"key": "base", "value": "https://shop.local"}
        ],
        "event": [{"listen": "prerequest", "script": {"exec": [""]}}],
        "item": [
            {"name": "Catalog", "item": [
                {"name": "List products", "request": {"method": "GET", "url": "{{base}}/products"}},
                {"name": "Admin", "item": [
                    {"name": "Create product", "request": {
                        "method": "POST",
                        "url": {"raw": "{{base}}/products", "host": ["{{base}}"], "path": ["products"]},
                        "header": [{"key": "Content-Type", "value": "application/json"}],
                        "body": {"mode": "raw", "raw": "{\"name\": \"Mug\"}"}
                    }}
                ]}
            ]},
            {"name": "Health", "request": {"method": "GET", "url": "{{base}}/health"}}
        ]
    }"#;

    fn converter() -> CollectionConverter {
        CollectionConverter::new(32, FolderLayout::Nested)
    }

    fn stored(plan: &ImportPlan) -> (Collection, Vec<Request>) {
        let now = OffsetDateTime::now_utc();
        let c = &plan.collection;
        let collection = Collection {
            id: plan.collection_id,
            name: c.name.clone(),
            description: c.description.clone(),
            schema: c.schema.clone(),
            variables: c.variables.clone(),
            auth: c.auth.clone(),
            events: c.events.clone(),
            items: c.items.clone(),
            postman_id: c.postman_id.clone(),
            exporter_id: c.exporter_id.clone(),
            created_at: now,
            updated_at: now,
        };
        let requests = plan
            .requests
            .iter()
            .map(|r| Request {
                id: Uuid::new_v4(),
                collection_id: r.collection_id,
                name: r.name.clone(),
                description: r.description.clone(),
                folder_path: r.folder_path.clone(),
                url: r.url.clone(),
                method: r.method.clone(),
                headers: r.headers.clone(),
                params: r.params.clone(),
                body: r.body.clone(),
                auth: r.auth.clone(),
                events: r.events.clone(),
                responses: r.responses.clone(),
                postman_id: r.postman_id.clone(),
                position: r.position.unwrap_or_default(),
                created_at: now,
                updated_at: now,
            })
            .collect();
        (collection, requests)
    }

    /// (folder path, name, method, raw url) for every leaf of a tree
    fn leaves(items: &[PostmanItem], parent: &str, out: &mut BTreeSet<(String, String, String, String)>) {
        for item in items {
            match &item.item {
                Some(children) if !children.is_empty() => {
                    let path = if parent.is_empty() {
                        item.name.clone()
                    } else {
                        format!("{}/{}", parent, item.name)
                    };
                    leaves(children, &path, out);
                }
                _ => {
                    if let Some(request) = &item.request {
                        let raw = request
                            .url
                            .as_ref()
                            .and_then(PostmanUrl::raw)
                            .unwrap_or_default()
                            .to_string();
                        out.insert((parent.to_string(), item.name.clone(), request.method.clone(), raw));
                    }
                }
            }
        }
    }

    #[test]
    fn test_plan_import() {
        let plan = converter().plan_import(FIXTURE.as_bytes()).unwrap();

        assert_eq!(plan.collection.name, "Shop API");
        assert_eq!(plan.collection.description.as_deref(), Some("Storefront endpoints"));
        assert_eq!(plan.collection.postman_id.as_deref(), Some("c0ffee"));
        assert_eq!(plan.collection.schema.as_deref(), Some(SCHEMA_URL));
        assert_eq!(plan.collection.variables["base"], json!("https://shop.local"));
        assert!(plan.collection.events.is_some());
        assert_eq!(
            plan.collection.items.as_ref().unwrap()["entries"]
                .as_array()
                .unwrap()
                .len(),
            2
        );

        assert_eq!(plan.requests.len(), 3);
        assert!(plan
            .requests
            .iter()
            .all(|r| r.collection_id == plan.collection_id));
        assert_eq!(plan.requests[1].folder_path, "Catalog/Admin");
        assert_eq!(plan.requests[0].url, json!({"raw": "{{base}}/products"}).as_object().unwrap().clone());
        assert!(plan.warnings.is_empty());
    }

    #[test]
    fn test_import_rejects_bad_documents() {
        let c = converter();
        assert!(matches!(c.plan_import(b"{not json"), Err(ConvertError::InvalidJson(_))));
        assert!(matches!(
            c.plan_import(br#"{"info": {"name": "  "}, "item": []}"#),
            Err(ConvertError::MissingName)
        ));
        assert!(matches!(c.plan_import(br#"{"item": []}"#), Err(ConvertError::MissingName)));
        assert!(matches!(
            c.plan_import(br#"{"info": {"name": "X"}, "item": {"name": "not a list"}}"#),
            Err(ConvertError::InvalidStructure(_))
        ));
    }

    #[test]
    fn test_round_trip_preserves_leaves() {
        let c = converter();
        let plan = c.plan_import(FIXTURE.as_bytes()).unwrap();
        let (mut collection, requests) = stored(&plan);
        collection.items = None;

        let exported = c.export(&collection, &requests);
        assert!(!exported.from_cache);

        let source: PostmanCollection = serde_json::from_str(FIXTURE).unwrap();
        let mut before = BTreeSet::new();
        let mut after = BTreeSet::new();
        leaves(&source.item, "", &mut before);
        leaves(&exported.document.item, "", &mut after);
        assert_eq!(before, after);
        assert_eq!(before.len(), 3);
    }

    #[test]
    fn test_export_prefers_cached_tree() {
        let c = converter();
        let plan = c.plan_import(FIXTURE.as_bytes()).unwrap();
        let (collection, _) = stored(&plan);

        let exported = c.export(&collection, &[]);
        assert!(exported.from_cache);
        assert_eq!(exported.document.item.len(), 2);
        assert_eq!(exported.document.schema.as_deref(), Some(SCHEMA_URL));
        assert_eq!(exported.document.variable.len(), 1);
    }

    #[test]
    fn test_broken_cache_falls_back_with_warning() {
        let c = converter();
        let plan = c.plan_import(FIXTURE.as_bytes()).unwrap();
        let (mut collection, requests) = stored(&plan);
        collection.items = Some(normalize::wrap_list(vec![json!(42)]));

        let exported = c.export(&collection, &requests);
        assert!(!exported.from_cache);
        assert_eq!(exported.warnings.len(), 1);
        assert_eq!(exported.warnings[0].field, "items");
        assert_eq!(exported.document.item.len(), 2);
    }

    #[test]
    fn test_export_filename() {
        assert_eq!(export_filename("Shop API"), "Shop API.postman_collection.json");
        assert_eq!(export_filename("a/b:c"), "a_b_c.postman_collection.json");
        assert_eq!(export_filename("  "), "collection.postman_collection.json");
    }
}
