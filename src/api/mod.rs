//! API Layer - External Collaborator Contract
//!
//! Defines the abstract interface the sync engine consumes.
//! Implementations can use HTTP, IPC, in-memory mocks, etc.

mod http;

pub use http::HttpApiClient;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::{CollectionName, Item, ItemId};

/// Errors from the API collaborator.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("http request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("unexpected response: {0}")]
    Unexpected(String),
}

/// Per-domain item count within one collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupInfo {
    #[serde(rename = "Domain")]
    pub domain: String,
    #[serde(rename = "Count")]
    pub count: u64,
}

/// Unfiltered counts for one collection.
///
/// Always reflects the whole collection; domain filters never narrow it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggregateInfo {
    #[serde(rename = "totalCount")]
    pub total_count: u64,
    #[serde(rename = "groupInfos")]
    pub group_infos: Vec<GroupInfo>,
}

impl AggregateInfo {
    /// Count to display: the matching group count when a domain filter is
    /// active, the unfiltered total otherwise.
    pub fn displayed_total(&self, domain_filter: Option<&str>) -> u64 {
        match domain_filter {
            Some(domain) => self
                .group_infos
                .iter()
                .find(|g| g.domain == domain)
                .map(|g| g.count)
                .unwrap_or(0),
            None => self.total_count,
        }
    }
}

/// A destination collection in the external tagging bookmark service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RaindropCollection {
    pub id: String,
    pub title: String,
}

/// Contract the sync engine consumes from the server side.
///
/// All operations are async; they are the engine's only suspension points.
#[async_trait]
pub trait ApiClient: Send + Sync {
    /// Fetch one page of a collection starting at `cursor`.
    /// An empty result signals exhaustion.
    async fn fetch_page(
        &self,
        collection: &CollectionName,
        cursor: u64,
        domain_filter: Option<&str>,
        path_filter: Option<&str>,
    ) -> Result<Vec<Item>, ApiError>;

    /// Fetch unfiltered counts for a collection.
    async fn fetch_info(&self, collection: &CollectionName) -> Result<AggregateInfo, ApiError>;

    /// Move an item to `trash`.
    async fn move_to_trash(&self, item: &Item) -> Result<(), ApiError>;

    /// Permanently delete an item by id.
    async fn delete_permanently(
        &self,
        item_id: &ItemId,
        collection: &CollectionName,
    ) -> Result<(), ApiError>;

    /// Move an item to `keep`.
    async fn move_to_keep(&self, item: &Item) -> Result<(), ApiError>;

    /// Return a trashed item to its pre-trash collection (inferred server-side).
    async fn restore(&self, item: &Item) -> Result<(), ApiError>;

    /// Create a record in the bookmark service's destination collection.
    async fn export_to_bookmark_collection(
        &self,
        item: &Item,
        collection_id: &str,
    ) -> Result<(), ApiError>;

    /// Create a record in the tagging service (Raindrop) destination collection.
    async fn export_to_tag_service(&self, item: &Item, collection_id: &str)
        -> Result<(), ApiError>;

    /// Copy a file into the cloud-storage drop folder.
    async fn save_to_drop_folder(&self, path: &str, url: &str) -> Result<(), ApiError>;

    /// List destination collections available in the tagging service.
    async fn list_raindrop_collections(&self) -> Result<Vec<RaindropCollection>, ApiError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_info_wire_field_names() {
        let json = r#"{"totalCount":25,"groupInfos":[{"Domain":"example.com","Count":7}]}"#;
        let info: AggregateInfo = serde_json::from_str(json).unwrap();
        assert_eq!(info.total_count, 25);
        assert_eq!(info.group_infos[0].domain, "example.com");
        assert_eq!(info.group_infos[0].count, 7);
    }

    #[test]
    fn test_displayed_total() {
        let info = AggregateInfo {
            total_count: 25,
            group_infos: vec![
                GroupInfo {
                    domain: "example.com".to_string(),
                    count: 7,
                },
                GroupInfo {
                    domain: "other.net".to_string(),
                    count: 18,
                },
            ],
        };
        assert_eq!(info.displayed_total(None), 25);
        assert_eq!(info.displayed_total(Some("other.net")), 18);
        assert_eq!(info.displayed_total(Some("missing.org")), 0);
    }
}
