//! Depth-first flattening of the item tree into request records.

use std::collections::BTreeMap;

use uuid::Uuid;

use super::exchange::{PostmanItem, PostmanRequest};
use super::normalize::{
    description_text, normalize_blob, normalize_headers, normalize_url, params_from_url,
};
use super::warning::Warnings;
use super::ConvertError;
use crate::models::{CreateRequest, JsonObject};

const DEFAULT_METHOD: &str = "GET";

pub struct TreeFlattener {
    max_depth: usize,
}

impl TreeFlattener {
    pub fn new(max_depth: usize) -> Self {
        Self { max_depth }
    }

    /// Flatten `items` in encounter order. Leaves become records carrying the
    /// slash-joined names of their ancestor folders; folders are not recorded.
    pub fn flatten(
        &self,
        items: &[PostmanItem],
        collection_id: Uuid,
        parent_path: &str,
        warnings: &mut Warnings,
    ) -> Result<Vec<CreateRequest>, ConvertError> {
        let mut records = Vec::new();
        self.walk(items, collection_id, parent_path, 0, &mut records, warnings)?;
        Ok(records)
    }

    fn walk(
        &self,
        items: &[PostmanItem],
        collection_id: Uuid,
        parent_path: &str,
        depth: usize,
        records: &mut Vec<CreateRequest>,
        warnings: &mut Warnings,
    ) -> Result<(), ConvertError> {
        if depth > self.max_depth {
            return Err(ConvertError::TooDeep {
                path: parent_path.to_string(),
                max_depth: self.max_depth,
            });
        }

        for item in items {
            let current_path = join_path(parent_path, &item.name);

            if let Some(children) = item.item.as_deref().filter(|c| !c.is_empty()) {
                self.walk(
                    children,
                    collection_id,
                    &current_path,
                    depth + 1,
                    records,
                    warnings,
                )?;
                continue;
            }

            let Some(request) = &item.request else {
                warnings.info(&current_path, "request", "item has no request; skipped");
                continue;
            };

            let position = records.len() as i32;
            records.push(to_record(
                item,
                request,
                collection_id,
                parent_path,
                &current_path,
                position,
                warnings,
            ));
        }

        Ok(())
    }
}

fn join_path(parent: &str, name: &str) -> String {
    if parent.is_empty() {
        name.to_string()
    } else {
        format!("{}/{}", parent, name)
    }
}

fn to_record(
    item: &PostmanItem,
    request: &PostmanRequest,
    collection_id: Uuid,
    folder_path: &str,
    path: &str,
    position: i32,
    warnings: &mut Warnings,
) -> CreateRequest {
    if item.name.is_empty() {
        warnings.info(path, "name", "request has an empty name");
    }

    let url = warnings.recover(path, "url", normalize_url(request.url.as_ref()), JsonObject::new());
    let headers = warnings.recover(
        path,
        "headers",
        normalize_headers(request.header.as_ref()),
        BTreeMap::new(),
    );
    let body = warnings.recover(path, "body", normalize_blob(request.body.as_ref()), None);
    let auth = warnings.recover(
        path,
        "auth",
        normalize_blob(request.auth.as_ref().or(item.auth.as_ref())),
        None,
    );
    let events = warnings.recover(path, "event", normalize_blob(item.event.as_ref()), None);
    let responses = warnings.recover(
        path,
        "response",
        normalize_blob(item.response.as_ref()),
        None,
    );

    let method = if request.method.trim().is_empty() {
        warnings.info(path, "method", "no method given; defaulted to GET");
        DEFAULT_METHOD.to_string()
    } else {
        request.method.clone()
    };

    CreateRequest {
        collection_id,
        name: item.name.clone(),
        description: description_text(item.description.as_ref())
            .or_else(|| description_text(request.description.as_ref())),
        folder_path: folder_path.to_string(),
        params: params_from_url(&url),
        url,
        method,
        headers,
        body,
        auth,
        events,
        responses,
        postman_id: item.postman_id.clone(),
        position: Some(position),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn items(value: serde_json::Value) -> Vec<PostmanItem> {
        serde_json::from_value(value).unwrap()
    }

    fn flatten(items: &[PostmanItem]) -> (Vec<CreateRequest>, Warnings) {
        let mut warnings = Warnings::new();
        let records = TreeFlattener::new(32)
            .flatten(items, Uuid::new_v4(), "", &mut warnings)
            .unwrap();
        (records, warnings)
    }

    #[test]
    fn test_folder_paths_and_order() {
        let tree = items(json!([
            {"name": "Auth", "item": [
                {"name": "Login", "request": {"method": "POST", "url": "https://x/login"}},
                {"name": "Tokens", "item": [
                    {"name": "Refresh", "request": {"method": "POST", "url": "https://x/refresh"}}
                ]}
            ]},
            {"name": "Ping", "request": {"method": "GET", "url": "https://x/ping"}}
        ]));

        let (records, warnings) = flatten(&tree);
        assert!(warnings.is_empty());

        let summary: Vec<_> = records
            .iter()
            .map(|r| (r.name.as_str(), r.folder_path.as_str(), r.position))
            .collect();
        assert_eq!(
            summary,
            vec![
                ("Login", "Auth", Some(0)),
                ("Refresh", "Auth/Tokens", Some(1)),
                ("Ping", "", Some(2)),
            ]
        );
    }

    #[test]
    fn test_leaf_without_request_is_skipped() {
        let tree = items(json!([
            {"name": "Notes"},
            {"name": "Empty folder", "item": []},
            {"name": "Ping", "request": {"method": "GET", "url": "/ping"}}
        ]));

        let (records, warnings) = flatten(&tree);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].name, "Ping");
        assert_eq!(warnings.len(), 2);
        assert!(!warnings.has_warnings());
    }

    #[test]
    fn test_leaf_fields_are_normalized() {
        let tree = items(json!([{
            "name": "Search",
            "id": "abc-123",
            "description": {"content": "Find things"},
            "event": [{"listen": "test", "script": {"exec": ["pm.test()"]}}],
            "response": [],
            "request": {
                "method": "GET",
                "url": {
                    "raw": "https://x/search?q=rust",
                    "query": [{"key": "q", "value": "rust"}]
                },
                "header": [{"key": "Accept", "value": "text/html"}, {"key": "Accept", "value": "application/json"}],
                "body": {"mode": "raw", "raw": ""}
            }
        }]));

        let (records, _) = flatten(&tree);
        let record = &records[0];
        assert_eq!(record.postman_id.as_deref(), Some("abc-123"));
        assert_eq!(record.description.as_deref(), Some("Find things"));
        assert_eq!(record.headers["Accept"], "application/json");
        assert_eq!(record.params.as_ref().unwrap()["q"], json!("rust"));
        assert_eq!(record.url["raw"], json!("https://x/search?q=rust"));
        assert!(record.events.as_ref().unwrap().contains_key("entries"));
        assert_eq!(record.responses, None);
        assert_eq!(record.body.as_ref().unwrap()["mode"], json!("raw"));
    }

    #[test]
    fn test_bad_field_shape_is_recovered() {
        let tree = items(json!([
            {"name": "Odd", "request": {"method": "GET", "url": 7, "header": {"A": "1"}}}
        ]));

        let (records, warnings) = flatten(&tree);
        assert_eq!(records.len(), 1);
        assert!(records[0].url.is_empty());
        assert!(records[0].headers.is_empty());
        assert!(warnings.has_warnings());

        let fields: Vec<_> = warnings.into_vec().into_iter().map(|w| w.field).collect();
        assert_eq!(fields, vec!["url", "headers"]);
    }

    #[test]
    fn test_missing_method_defaults_to_get() {
        let tree = items(json!([{"name": "Bare", "request": {"url": "/bare"}}]));
        let (records, _) = flatten(&tree);
        assert_eq!(records[0].method, "GET");
    }

    #[test]
    fn test_depth_limit() {
        let tree = items(json!([
            {"name": "A", "item": [
                {"name": "B", "item": [
                    {"name": "C", "item": [
                        {"name": "Deep", "request": {"method": "GET", "url": "/deep"}}
                    ]}
                ]}
            ]}
        ]));

        let mut warnings = Warnings::new();
        assert!(TreeFlattener::new(3)
            .flatten(&tree, Uuid::new_v4(), "", &mut warnings)
            .is_ok());

        let err = TreeFlattener::new(2)
            .flatten(&tree, Uuid::new_v4(), "", &mut warnings)
            .unwrap_err();
        assert!(matches!(err, ConvertError::TooDeep { ref path, max_depth: 2 } if path == "A/B/C"));
    }
}
