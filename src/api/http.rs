//! HTTP API Client
//!
//! reqwest-backed implementation of the Applemint server's REST surface.

use async_trait::async_trait;
use percent_encoding::{utf8_percent_encode, NON_ALPHANUMERIC};
use serde_json::json;

use super::{AggregateInfo, ApiClient, ApiError, RaindropCollection};
use crate::domain::{CollectionName, Item, ItemId};

/// HTTP implementation of [`ApiClient`].
pub struct HttpApiClient {
    base_url: String,
    client: reqwest::Client,
}

impl HttpApiClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            base_url,
            client: reqwest::Client::new(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

fn encode(value: &str) -> String {
    utf8_percent_encode(value, NON_ALPHANUMERIC).to_string()
}

#[async_trait]
impl ApiClient for HttpApiClient {
    async fn fetch_page(
        &self,
        collection: &CollectionName,
        cursor: u64,
        domain_filter: Option<&str>,
        path_filter: Option<&str>,
    ) -> Result<Vec<Item>, ApiError> {
        let mut url = format!(
            "{}/collection/{}?cursor={}",
            self.base_url,
            collection.as_str(),
            cursor
        );
        if let Some(domain) = domain_filter {
            url.push_str(&format!("&domain={}", encode(domain)));
        }
        if let Some(path) = path_filter {
            url.push_str(&format!("&path={}", encode(path)));
        }

        let items = self
            .client
            .get(&url)
            .send()
            .await?
            .error_for_status()?
            .json::<Vec<Item>>()
            .await?;
        Ok(items)
    }

    async fn fetch_info(&self, collection: &CollectionName) -> Result<AggregateInfo, ApiError> {
        let url = self.url(&format!("/collection/info/{}", collection.as_str()));
        let info = self
            .client
            .get(&url)
            .send()
            .await?
            .error_for_status()?
            .json::<AggregateInfo>()
            .await?;
        Ok(info)
    }

    async fn move_to_trash(&self, item: &Item) -> Result<(), ApiError> {
        self.client
            .post(self.url("/item/trash"))
            .json(item)
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }

    async fn delete_permanently(
        &self,
        item_id: &ItemId,
        collection: &CollectionName,
    ) -> Result<(), ApiError> {
        let url = self.url(&format!(
            "/item/{}/{}",
            collection.as_str(),
            encode(item_id)
        ));
        self.client
            .delete(&url)
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }

    async fn move_to_keep(&self, item: &Item) -> Result<(), ApiError> {
        self.client
            .post(self.url("/item/keep"))
            .json(item)
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }

    async fn restore(&self, item: &Item) -> Result<(), ApiError> {
        self.client
            .post(self.url("/item/restore"))
            .json(item)
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }

    async fn export_to_bookmark_collection(
        &self,
        item: &Item,
        collection_id: &str,
    ) -> Result<(), ApiError> {
        self.client
            .post(self.url("/bookmark"))
            .json(&json!({ "item": item, "collection": collection_id }))
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }

    async fn export_to_tag_service(
        &self,
        item: &Item,
        collection_id: &str,
    ) -> Result<(), ApiError> {
        self.client
            .post(self.url("/raindrop"))
            .json(&json!({ "item": item, "collection": collection_id }))
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }

    async fn save_to_drop_folder(&self, path: &str, url: &str) -> Result<(), ApiError> {
        let request_url = self.url(&format!(
            "/dropbox?path={}&url={}",
            encode(path),
            encode(url)
        ));
        self.client
            .get(&request_url)
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }

    async fn list_raindrop_collections(&self) -> Result<Vec<RaindropCollection>, ApiError> {
        let collections = self
            .client
            .get(self.url("/raindrop/collections"))
            .send()
            .await?
            .error_for_status()?
            .json::<Vec<RaindropCollection>>()
            .await?;
        Ok(collections)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let client = HttpApiClient::new("https://api.example.com/");
        assert_eq!(client.url("/item/trash"), "https://api.example.com/item/trash");
    }

    #[test]
    fn test_query_values_are_encoded() {
        assert_eq!(encode("news.ycombinator.com"), "news%2Eycombinator%2Ecom");
        assert_eq!(encode("a b"), "a%20b");
    }
}
