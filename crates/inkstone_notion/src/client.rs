//! HTTP transport for the official Notion API.

use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use tracing::debug;

use crate::api::{
    ApiErrorBody, ExternalBlock, ExternalPage, ExternalUser, Paginated, SearchHit,
};
use crate::config::NotionConfig;
use crate::error::{NotionError, Result};

/// Version header the vendor requires on every request.
const NOTION_VERSION: &str = "2022-06-28";

/// Abstraction over the upstream API, so the adapter can be driven by a
/// fake in tests instead of the network.
#[async_trait]
pub trait NotionTransport: Send + Sync {
    async fn retrieve_page(&self, page_id: &str) -> Result<ExternalPage>;

    async fn list_block_children(
        &self,
        block_id: &str,
        cursor: Option<&str>,
    ) -> Result<Paginated<ExternalBlock>>;

    async fn retrieve_user(&self, user_id: &str) -> Result<ExternalUser>;

    async fn query_database(
        &self,
        database_id: &str,
        cursor: Option<&str>,
    ) -> Result<Paginated<ExternalPage>>;

    async fn search(&self, query: &str, limit: usize) -> Result<Paginated<SearchHit>>;
}

/// Reqwest-backed production transport.
#[derive(Debug, Clone)]
pub struct NotionHttpClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    page_size: usize,
}

impl NotionHttpClient {
    /// Build a client from config. Fails fast on a missing credential.
    pub fn new(config: &NotionConfig) -> Result<Self> {
        if config.api_key.is_empty() {
            return Err(NotionError::Configuration {
                field: "api_key".to_string(),
                reason: format!("no API key configured (set {})", crate::config::API_KEY_ENV),
            });
        }
        Ok(Self {
            http: default_http_client(config),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            page_size: config.page_size,
        })
    }

    /// Use an already-built `reqwest::Client` (shared pools, test setups).
    pub fn with_http_client(mut self, http: reqwest::Client) -> Self {
        self.http = http;
        self
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn execute<T: DeserializeOwned>(
        &self,
        operation: &'static str,
        request: reqwest::RequestBuilder,
    ) -> Result<T> {
        let response = request
            .bearer_auth(&self.api_key)
            .header("Notion-Version", NOTION_VERSION)
            .send()
            .await
            .map_err(|cause| NotionError::Http {
                operation: operation.to_string(),
                cause,
            })?;

        let status = response.status();
        let body = response.text().await.map_err(|cause| NotionError::Http {
            operation: operation.to_string(),
            cause,
        })?;

        if !status.is_success() {
            let parsed: ApiErrorBody = serde_json::from_str(&body).unwrap_or_default();
            return Err(NotionError::Api {
                operation: operation.to_string(),
                status: status.as_u16(),
                code: parsed.code,
                message: parsed.message.unwrap_or_else(|| status.to_string()),
            });
        }

        serde_json::from_str(&body).map_err(|cause| NotionError::Serialization {
            data_type: operation.to_string(),
            cause,
        })
    }
}

#[async_trait]
impl NotionTransport for NotionHttpClient {
    async fn retrieve_page(&self, page_id: &str) -> Result<ExternalPage> {
        debug!("retrieving page {}", page_id);
        let url = self.url(&format!("/v1/pages/{page_id}"));
        self.execute("retrieve_page", self.http.get(url)).await
    }

    async fn list_block_children(
        &self,
        block_id: &str,
        cursor: Option<&str>,
    ) -> Result<Paginated<ExternalBlock>> {
        let url = self.url(&format!("/v1/blocks/{block_id}/children"));
        let mut request = self
            .http
            .get(url)
            .query(&[("page_size", self.page_size.to_string())]);
        if let Some(cursor) = cursor {
            request = request.query(&[("start_cursor", cursor)]);
        }
        self.execute("list_block_children", request).await
    }

    async fn retrieve_user(&self, user_id: &str) -> Result<ExternalUser> {
        let url = self.url(&format!("/v1/users/{user_id}"));
        self.execute("retrieve_user", self.http.get(url)).await
    }

    async fn query_database(
        &self,
        database_id: &str,
        cursor: Option<&str>,
    ) -> Result<Paginated<ExternalPage>> {
        let url = self.url(&format!("/v1/databases/{database_id}/query"));
        let mut body = json!({ "page_size": self.page_size });
        if let Some(cursor) = cursor {
            body["start_cursor"] = Value::String(cursor.to_string());
        }
        self.execute("query_database", self.http.post(url).json(&body))
            .await
    }

    async fn search(&self, query: &str, limit: usize) -> Result<Paginated<SearchHit>> {
        let url = self.url("/v1/search");
        let body = json!({
            "query": query,
            "page_size": limit,
            "filter": { "property": "object", "value": "page" },
        });
        self.execute("search", self.http.post(url).json(&body)).await
    }
}

/// Shared reqwest client with our service defaults: versioned user agent and
/// conservative timeouts.
pub fn default_http_client(config: &NotionConfig) -> reqwest::Client {
    reqwest::Client::builder()
        .user_agent(concat!("inkstone/", env!("CARGO_PKG_VERSION")))
        .timeout(config.request_timeout())
        .connect_timeout(Duration::from_secs(5))
        .build()
        .unwrap() // panics for the same reasons Client::new() would: https://docs.rs/reqwest/latest/reqwest/struct.Client.html#panics
}
