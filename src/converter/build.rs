//! Rebuilding an exchange document from stored records.

use serde_json::Value;

use super::exchange::{
    CollectionInfo, PostmanCollection, PostmanItem, PostmanRequest, SCHEMA_URL,
};
use super::normalize::{
    blob_to_list, headers_to_list, url_to_exchange, variables_to_list, LIST_KEY,
};
use super::warning::CoercionError;
use crate::config::FolderLayout;
use crate::models::{Collection, JsonObject, Request};

pub struct TreeBuilder {
    layout: FolderLayout,
}

impl TreeBuilder {
    pub fn new(layout: FolderLayout) -> Self {
        Self { layout }
    }

    /// Build the full document for `collection` from its request records
    pub fn build(&self, collection: &Collection, requests: &[Request]) -> PostmanCollection {
        self.document(collection, self.build_items(requests))
    }

    /// Wrap an item tree with the collection's metadata
    pub fn document(&self, collection: &Collection, item: Vec<PostmanItem>) -> PostmanCollection {
        PostmanCollection {
            info: CollectionInfo {
                name: collection.name.clone(),
                description: collection.description.clone().map(Value::String),
                schema: Some(SCHEMA_URL.to_string()),
                postman_id: collection.postman_id.clone(),
                exporter_id: collection.exporter_id.clone(),
                collection_link: None,
            },
            item,
            variable: variables_to_list(&collection.variables),
            auth: collection.auth.clone().map(Value::Object),
            event: collection.events.as_ref().map(blob_to_list),
            schema: Some(SCHEMA_URL.to_string()),
        }
    }

    /// Group records by folder path. Within every level, requests come first
    /// in position order, then folders in order of first appearance.
    pub fn build_items(&self, requests: &[Request]) -> Vec<PostmanItem> {
        let mut sorted: Vec<&Request> = requests.iter().collect();
        sorted.sort_by_key(|r| r.position);

        match self.layout {
            FolderLayout::Nested => {
                let mut root = FolderNode::new(String::new());
                for request in sorted {
                    let mut node = &mut root;
                    for segment in request.folder_path.split('/').filter(|s| !s.is_empty()) {
                        node = node.child(segment);
                    }
                    node.leaves.push(to_item(request));
                }
                root.into_items()
            }
            FolderLayout::Flat => {
                let mut items = Vec::new();
                let mut folders: Vec<(String, Vec<PostmanItem>)> = Vec::new();
                for request in sorted {
                    if request.folder_path.is_empty() {
                        items.push(to_item(request));
                        continue;
                    }
                    match folders.iter().position(|(path, _)| *path == request.folder_path) {
                        Some(index) => folders[index].1.push(to_item(request)),
                        None => folders.push((request.folder_path.clone(), vec![to_item(request)])),
                    }
                }
                items.extend(
                    folders
                        .into_iter()
                        .map(|(path, leaves)| PostmanItem::folder(path, leaves)),
                );
                items
            }
        }
    }
}

/// Decode the item tree cached at import time
pub fn cached_items(items: &JsonObject) -> Result<Vec<PostmanItem>, CoercionError> {
    let not_a_tree = |found: &'static str| CoercionError {
        expected: "list of items",
        found,
    };

    match items.get(LIST_KEY) {
        Some(entries @ Value::Array(_)) => {
            serde_json::from_value(entries.clone()).map_err(|_| not_a_tree("malformed items"))
        }
        Some(_) => Err(not_a_tree("non-list entries")),
        None => Err(not_a_tree("no entries")),
    }
}

struct FolderNode {
    name: String,
    leaves: Vec<PostmanItem>,
    folders: Vec<FolderNode>,
}

impl FolderNode {
    fn new(name: String) -> Self {
        Self {
            name,
            leaves: Vec::new(),
            folders: Vec::new(),
        }
    }

    fn child(&mut self, name: &str) -> &mut FolderNode {
        let index = match self.folders.iter().position(|f| f.name == name) {
            Some(index) => index,
            None => {
                self.folders.push(FolderNode::new(name.to_string()));
                self.folders.len() - 1
            }
        };
        &mut self.folders[index]
    }

    fn into_items(self) -> Vec<PostmanItem> {
        let mut items = self.leaves;
        for folder in self.folders {
            let name = folder.name.clone();
            items.push(PostmanItem::folder(name, folder.into_items()));
        }
        items
    }
}

fn to_item(request: &Request) -> PostmanItem {
    let description = request.description.clone().map(Value::String);

    PostmanItem {
        name: request.name.clone(),
        description: description.clone(),
        request: Some(PostmanRequest {
            url: Some(url_to_exchange(&request.url)),
            method: request.method.clone(),
            header: headers_to_list(&request.headers),
            body: request.body.clone().map(Value::Object),
            auth: request.auth.clone().map(Value::Object),
            description,
        }),
        event: request.events.as_ref().map(blob_to_list),
        response: request.responses.as_ref().map(blob_to_list),
        postman_id: request.postman_id.clone(),
        ..Default::default()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use serde_json::json;
    use time::OffsetDateTime;
    use uuid::Uuid;

    use super::*;
    use crate::converter::exchange::PostmanUrl;

    fn request(name: &str, folder_path: &str, position: i32) -> Request {
        let mut url = JsonObject::new();
        url.insert("raw".into(), json!(format!("https://x/{}", name)));
        Request {
            id: Uuid::new_v4(),
            collection_id: Uuid::nil(),
            name: name.to_string(),
            description: None,
            folder_path: folder_path.to_string(),
            url,
            method: "GET".to_string(),
            headers: BTreeMap::new(),
            params: None,
            body: None,
            auth: None,
            events: None,
            responses: None,
            postman_id: None,
            position,
            created_at: OffsetDateTime::now_utc(),
            updated_at: OffsetDateTime::now_utc(),
        }
    }

    fn collection() -> Collection {
        Collection {
            id: Uuid::nil(),
            name: "Demo".to_string(),
            description: Some("Docs".to_string()),
            schema: None,
            variables: JsonObject::new(),
            auth: None,
            events: None,
            items: None,
            postman_id: None,
            exporter_id: None,
            created_at: OffsetDateTime::now_utc(),
            updated_at: OffsetDateTime::now_utc(),
        }
    }

    fn names(items: &[PostmanItem]) -> Vec<&str> {
        items.iter().map(|i| i.name.as_str()).collect()
    }

    #[test]
    fn test_nested_layout() {
        let requests = vec![
            request("Refresh", "Auth/Tokens", 1),
            request("Login", "Auth", 0),
            request("Ping", "", 2),
        ];

        let items = TreeBuilder::new(FolderLayout::Nested).build_items(&requests);
        assert_eq!(names(&items), vec!["Ping", "Auth"]);

        let auth = items[1].item.as_ref().unwrap();
        assert_eq!(names(auth), vec!["Login", "Tokens"]);
        assert_eq!(names(auth[1].item.as_ref().unwrap()), vec!["Refresh"]);
    }

    #[test]
    fn test_flat_layout_uses_full_path() {
        let requests = vec![
            request("Login", "Auth", 0),
            request("Refresh", "Auth/Tokens", 1),
            request("Logout", "Auth", 2),
        ];

        let items = TreeBuilder::new(FolderLayout::Flat).build_items(&requests);
        assert_eq!(names(&items), vec!["Auth", "Auth/Tokens"]);
        assert_eq!(names(items[0].item.as_ref().unwrap()), vec!["Login", "Logout"]);
    }

    #[test]
    fn test_empty_collection_document() {
        let doc = TreeBuilder::new(FolderLayout::Nested).build(&collection(), &[]);
        let value = serde_json::to_value(&doc).unwrap();

        assert_eq!(value["item"], json!([]));
        assert_eq!(value["schema"], json!(SCHEMA_URL));
        assert_eq!(value["info"]["schema"], json!(SCHEMA_URL));
        assert_eq!(value["info"]["name"], json!("Demo"));
        assert_eq!(value["info"]["description"], json!("Docs"));
        assert!(value.get("variable").is_none());
    }

    #[test]
    fn test_leaf_export_shape() {
        let mut record = request("Login", "", 0);
        record.url = JsonObject::new();
        record.headers.insert("A".into(), "2".into());
        record.events = Some(crate::converter::normalize::wrap_list(vec![json!({"listen": "test"})]));

        let item = to_item(&record);
        let req = item.request.as_ref().unwrap();
        assert_eq!(req.url, Some(PostmanUrl::Raw(String::new())));
        assert_eq!(req.header, Some(json!([{"key": "A", "value": "2"}])));
        assert_eq!(item.event, Some(json!([{"listen": "test"}])));
    }

    #[test]
    fn test_cached_items() {
        let mut cache = JsonObject::new();
        cache.insert(
            LIST_KEY.into(),
            json!([{"name": "Ping", "request": {"method": "GET", "url": "/ping"}}]),
        );
        assert_eq!(names(&cached_items(&cache).unwrap()), vec!["Ping"]);

        cache.insert(LIST_KEY.into(), json!("nope"));
        assert!(cached_items(&cache).is_err());
        assert!(cached_items(&JsonObject::new()).is_err());
    }
}
