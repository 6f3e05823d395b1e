//! Pagination, partial-failure and memoization behavior of the adapter.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use pretty_assertions::assert_eq;
use serde_json::{json, Value};

use inkstone_notion::api::{ExternalBlock, ExternalPage, ExternalUser, Paginated, SearchHit};
use inkstone_notion::{CachedAdapter, NotionAdapter, NotionError, NotionTransport, Result};

const PAGE_ID: &str = "59833787-2cf9-4fdf-8782-e53db20768a5";
const BLOCK_A: &str = "11111111-1111-1111-1111-111111111111";
const BLOCK_B: &str = "22222222-2222-2222-2222-222222222222";
const BROKEN: &str = "33333333-3333-3333-3333-333333333333";

fn upstream_error(operation: &str) -> NotionError {
    NotionError::Api {
        operation: operation.to_string(),
        status: 500,
        code: Some("internal_server_error".to_string()),
        message: "boom".to_string(),
    }
}

fn page() -> ExternalPage {
    serde_json::from_value(json!({
        "id": PAGE_ID,
        "created_time": "2024-01-15T09:00:00.000Z",
        "last_edited_time": "2024-01-15T09:00:00.000Z",
        "properties": {
            "title": { "type": "title", "title": [{ "plain_text": "Paged" }] }
        }
    }))
    .unwrap()
}

fn block(id: &str, has_children: bool) -> Value {
    json!({
        "id": id,
        "type": "paragraph",
        "created_time": "2024-01-15T09:00:00.000Z",
        "last_edited_time": "2024-01-15T09:00:00.000Z",
        "has_children": has_children,
        "paragraph": { "rich_text": [{ "plain_text": id }] }
    })
}

/// Fake that serves canned children pages keyed by (block id, cursor) and
/// records every listing call it sees.
struct PagingFake {
    page: ExternalPage,
    listings: HashMap<(String, Option<String>), Paginated<ExternalBlock>>,
    calls: Mutex<Vec<(String, Option<String>)>>,
    page_fetches: AtomicUsize,
    fail_children_of: Option<String>,
}

impl PagingFake {
    fn new() -> Self {
        Self {
            page: page(),
            listings: HashMap::new(),
            calls: Mutex::new(Vec::new()),
            page_fetches: AtomicUsize::new(0),
            fail_children_of: None,
        }
    }

    fn with_listing(
        mut self,
        block_id: &str,
        cursor: Option<&str>,
        results: Value,
        next_cursor: Option<&str>,
    ) -> Self {
        self.listings.insert(
            (block_id.to_string(), cursor.map(String::from)),
            Paginated {
                results: serde_json::from_value(results).unwrap(),
                has_more: next_cursor.is_some(),
                next_cursor: next_cursor.map(String::from),
            },
        );
        self
    }

    fn failing_children_of(mut self, block_id: &str) -> Self {
        self.fail_children_of = Some(block_id.to_string());
        self
    }

    fn recorded_calls(&self) -> Vec<(String, Option<String>)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl NotionTransport for PagingFake {
    async fn retrieve_page(&self, _page_id: &str) -> Result<ExternalPage> {
        self.page_fetches.fetch_add(1, Ordering::SeqCst);
        Ok(self.page.clone())
    }

    async fn list_block_children(
        &self,
        block_id: &str,
        cursor: Option<&str>,
    ) -> Result<Paginated<ExternalBlock>> {
        self.calls
            .lock()
            .unwrap()
            .push((block_id.to_string(), cursor.map(String::from)));

        if self.fail_children_of.as_deref() == Some(block_id) {
            return Err(upstream_error("list_block_children"));
        }

        Ok(self
            .listings
            .get(&(block_id.to_string(), cursor.map(String::from)))
            .cloned()
            .unwrap_or(Paginated {
                results: Vec::new(),
                has_more: false,
                next_cursor: None,
            }))
    }

    async fn retrieve_user(&self, _user_id: &str) -> Result<ExternalUser> {
        Err(upstream_error("retrieve_user"))
    }

    async fn query_database(
        &self,
        _database_id: &str,
        _cursor: Option<&str>,
    ) -> Result<Paginated<ExternalPage>> {
        Err(upstream_error("query_database"))
    }

    async fn search(&self, _query: &str, _limit: usize) -> Result<Paginated<SearchHit>> {
        Ok(Paginated {
            results: vec![serde_json::from_value(json!({
                "id": PAGE_ID,
                "url": "https://notion.so/Paged",
                "properties": {
                    "title": { "type": "title", "title": [{ "plain_text": "Paged" }] }
                }
            }))
            .unwrap()],
            has_more: false,
            next_cursor: None,
        })
    }
}

#[tokio::test]
async fn has_more_cursor_drives_a_second_listing_call() {
    let fake = Arc::new(
        PagingFake::new()
            .with_listing(PAGE_ID, None, json!([block(BLOCK_A, false)]), Some("cursor-2"))
            .with_listing(PAGE_ID, Some("cursor-2"), json!([block(BLOCK_B, false)]), None),
    );
    let adapter = NotionAdapter::new(fake.clone());

    let map = adapter.get_page(PAGE_ID).await.unwrap();

    // Both pages of results were concatenated, in order.
    let page_compact = PAGE_ID.replace('-', "");
    assert_eq!(
        map.block[&page_compact].value.content,
        vec![BLOCK_A.replace('-', ""), BLOCK_B.replace('-', "")]
    );

    // The second call carried the cursor from the first response.
    assert_eq!(
        fake.recorded_calls(),
        vec![
            (PAGE_ID.to_string(), None),
            (PAGE_ID.to_string(), Some("cursor-2".to_string())),
        ]
    );
}

#[tokio::test]
async fn failed_child_subtree_degrades_to_a_childless_block() {
    let fake = Arc::new(
        PagingFake::new()
            .with_listing(PAGE_ID, None, json!([block(BROKEN, true)]), None)
            .failing_children_of(BROKEN),
    );
    let adapter = NotionAdapter::new(fake.clone());

    let map = adapter.get_page(PAGE_ID).await.unwrap();

    // The page fetch succeeded and the broken block is present, childless.
    let broken_compact = BROKEN.replace('-', "");
    assert!(map.block.contains_key(&broken_compact));
    assert!(map.block[&broken_compact].value.content.is_empty());

    // The children fetch was attempted.
    assert!(fake
        .recorded_calls()
        .iter()
        .any(|(id, _)| id.as_str() == BROKEN));
}

#[tokio::test]
async fn root_listing_failure_fails_the_page_fetch() {
    let fake = Arc::new(PagingFake::new().failing_children_of(PAGE_ID));
    let adapter = NotionAdapter::new(fake);

    assert!(adapter.get_page(PAGE_ID).await.is_err());
}

#[tokio::test]
async fn cached_adapter_memoizes_within_the_ttl() {
    let fake = Arc::new(PagingFake::new());
    let adapter = CachedAdapter::new(
        NotionAdapter::new(fake.clone()),
        Duration::from_secs(300),
    );

    let first = adapter.get_page(PAGE_ID).await.unwrap();
    let second = adapter.get_page(PAGE_ID).await.unwrap();

    assert_eq!(fake.page_fetches.load(Ordering::SeqCst), 1);
    assert!(Arc::ptr_eq(&first, &second));
}

#[tokio::test]
async fn expired_cache_entries_refetch() {
    let fake = Arc::new(PagingFake::new());
    let adapter = CachedAdapter::new(NotionAdapter::new(fake.clone()), Duration::ZERO);

    adapter.get_page(PAGE_ID).await.unwrap();
    adapter.get_page(PAGE_ID).await.unwrap();

    assert_eq!(fake.page_fetches.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn search_results_take_the_legacy_shape() {
    let fake = Arc::new(PagingFake::new());
    let adapter = NotionAdapter::new(fake);

    let results = adapter.search("paged", 20).await.unwrap();
    assert_eq!(results.total, 1);

    let rendered = serde_json::to_value(&results).unwrap();
    assert_eq!(rendered["results"][0]["id"], json!(PAGE_ID.replace('-', "")));
    assert_eq!(rendered["results"][0]["isNavigable"], json!(true));
    assert_eq!(rendered["results"][0]["score"], json!(1.0));
    assert_eq!(
        rendered["results"][0]["highlight"]["pathText"],
        json!("https://notion.so/Paged")
    );
    assert_eq!(rendered["results"][0]["highlight"]["text"], json!("Paged"));
    assert!(rendered["recordMap"]["block"].as_object().unwrap().is_empty());
}
