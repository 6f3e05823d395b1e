//! Content service behavior against a fake upstream.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use pretty_assertions::assert_eq;
use serde_json::{json, Value};

use inkstone_content::model::DEFAULT_CATEGORY;
use inkstone_content::ContentService;
use inkstone_notion::api::{ExternalBlock, ExternalPage, ExternalUser, Paginated, SearchHit};
use inkstone_notion::{NotionConfig, NotionError, NotionTransport, Result};

const POSTS_DB: &str = "aaaaaaaa-aaaa-aaaa-aaaa-aaaaaaaaaaaa";
const PROJECTS_DB: &str = "bbbbbbbb-bbbb-bbbb-bbbb-bbbbbbbbbbbb";
const PAGE_ID: &str = "59833787-2cf9-4fdf-8782-e53db20768a5";

fn upstream_error(operation: &str) -> NotionError {
    NotionError::Api {
        operation: operation.to_string(),
        status: 502,
        code: None,
        message: "upstream down".to_string(),
    }
}

#[derive(Default)]
struct FakeNotion {
    databases: HashMap<String, Vec<ExternalPage>>,
    page: Option<ExternalPage>,
    query_calls: AtomicUsize,
    fail_queries: bool,
}

impl FakeNotion {
    fn with_database(mut self, id: &str, pages: Value) -> Self {
        self.databases
            .insert(id.to_string(), serde_json::from_value(pages).unwrap());
        self
    }

    fn with_page(mut self, page: Value) -> Self {
        self.page = Some(serde_json::from_value(page).unwrap());
        self
    }

    fn failing(mut self) -> Self {
        self.fail_queries = true;
        self
    }
}

#[async_trait]
impl NotionTransport for FakeNotion {
    async fn retrieve_page(&self, _page_id: &str) -> Result<ExternalPage> {
        self.page.clone().ok_or_else(|| upstream_error("retrieve_page"))
    }

    async fn list_block_children(
        &self,
        _block_id: &str,
        _cursor: Option<&str>,
    ) -> Result<Paginated<ExternalBlock>> {
        Ok(Paginated {
            results: Vec::new(),
            has_more: false,
            next_cursor: None,
        })
    }

    async fn retrieve_user(&self, _user_id: &str) -> Result<ExternalUser> {
        Err(upstream_error("retrieve_user"))
    }

    async fn query_database(
        &self,
        database_id: &str,
        _cursor: Option<&str>,
    ) -> Result<Paginated<ExternalPage>> {
        self.query_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_queries {
            return Err(upstream_error("query_database"));
        }
        Ok(Paginated {
            results: self.databases.get(database_id).cloned().unwrap_or_default(),
            has_more: false,
            next_cursor: None,
        })
    }

    async fn search(&self, _query: &str, _limit: usize) -> Result<Paginated<SearchHit>> {
        Ok(Paginated {
            results: Vec::new(),
            has_more: false,
            next_cursor: None,
        })
    }
}

fn config() -> NotionConfig {
    NotionConfig {
        post_database_id: Some(POSTS_DB.to_string()),
        project_database_id: Some(PROJECTS_DB.to_string()),
        ..NotionConfig::default()
    }
}

fn post_page(id: &str, title: &str, category: &str, date: &str) -> Value {
    json!({
        "id": id,
        "created_time": "2024-01-01T00:00:00.000Z",
        "last_edited_time": "2024-01-01T00:00:00.000Z",
        "properties": {
            "title": { "type": "title", "title": [{ "plain_text": title }] },
            "Category": { "type": "select", "select": { "name": category } },
            "Date": { "type": "date", "date": { "start": date } },
            "Tags": { "type": "multi_select", "multi_select": [{ "name": "rust" }] },
            "Views": { "type": "number", "number": 42 }
        }
    })
}

#[tokio::test]
async fn posts_are_sorted_newest_first() {
    let fake = FakeNotion::default().with_database(
        POSTS_DB,
        json!([
            post_page("11111111-1111-1111-1111-111111111111", "Old", "Rust", "2023-01-05"),
            post_page("22222222-2222-2222-2222-222222222222", "New", "Web", "2024-06-01"),
        ]),
    );
    let service = ContentService::new(Arc::new(fake), config());

    let posts = service.posts().await;
    let titles: Vec<&str> = posts.iter().map(|p| p.title.as_str()).collect();
    assert_eq!(titles, vec!["New", "Old"]);
    assert_eq!(posts[0].date, "2024.06.01");
    assert_eq!(posts[0].category, "Web");
    assert_eq!(posts[0].tags, vec!["rust".to_string()]);
    assert_eq!(posts[0].views, 42);
}

#[tokio::test]
async fn posts_use_created_time_when_no_date_property() {
    let page = json!({
        "id": PAGE_ID,
        "created_time": "2024-03-10T12:00:00.000Z",
        "last_edited_time": "2024-03-10T12:00:00.000Z",
        "properties": {
            "title": { "type": "title", "title": [{ "plain_text": "Dateless" }] }
        }
    });
    let fake = FakeNotion::default().with_database(POSTS_DB, json!([page]));
    let service = ContentService::new(Arc::new(fake), config());

    let posts = service.posts().await;
    assert_eq!(posts[0].date, "2024.03.10");
    assert_eq!(posts[0].category, DEFAULT_CATEGORY);
    assert!(posts[0].tags.is_empty());
}

#[tokio::test]
async fn post_list_is_memoized_within_the_ttl() {
    let fake = Arc::new(FakeNotion::default().with_database(
        POSTS_DB,
        json!([post_page(PAGE_ID, "Only", "Rust", "2024-01-01")]),
    ));
    let service = ContentService::new(fake.clone(), config());

    let first = service.posts().await;
    let second = service.posts().await;
    assert_eq!(first, second);
    assert_eq!(fake.query_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn upstream_failure_degrades_to_empty() {
    let fake = FakeNotion::default().failing();
    let service = ContentService::new(Arc::new(fake), config());

    assert!(service.posts().await.is_empty());
    assert!(service.projects().await.is_empty());
    // Categories still include the synthetic "all" entry.
    let categories = service.categories().await;
    assert_eq!(categories.len(), 1);
    assert_eq!(categories[0].id, "all");
}

#[tokio::test]
async fn missing_database_id_degrades_to_empty() {
    let fake = FakeNotion::default();
    let service = ContentService::new(
        Arc::new(fake),
        NotionConfig {
            post_database_id: None,
            ..NotionConfig::default()
        },
    );
    assert!(service.posts().await.is_empty());
}

#[tokio::test]
async fn numeric_id_lookup_finds_the_post() {
    let fake = FakeNotion::default().with_database(
        POSTS_DB,
        json!([post_page(PAGE_ID, "Target", "Rust", "2024-01-01")]),
    );
    let service = ContentService::new(Arc::new(fake), config());

    let post = service.post_by_numeric_id(0xb20768a5).await.unwrap();
    assert_eq!(post.title, "Target");

    assert!(service.post_by_numeric_id(1).await.is_none());
}

#[tokio::test]
async fn page_id_lookup_builds_a_basic_post_from_the_title() {
    let fake = FakeNotion::default().with_page(json!({
        "id": PAGE_ID,
        "created_time": "2024-01-01T00:00:00.000Z",
        "last_edited_time": "2024-01-01T00:00:00.000Z",
        "properties": {
            "title": { "type": "title", "title": [{ "plain_text": "Direct" }] }
        }
    }));
    let service = ContentService::new(Arc::new(fake), config());

    let post = service.post_by_page_id(PAGE_ID).await.unwrap();
    assert_eq!(post.title, "Direct");
    assert_eq!(post.id, 0xb20768a5);

    // A failing page fetch yields None, not an error.
    let service = ContentService::new(Arc::new(FakeNotion::default()), config());
    assert!(service.post_by_page_id(PAGE_ID).await.is_none());
}

#[tokio::test]
async fn projects_carry_role_and_category() {
    let page = json!({
        "id": PAGE_ID,
        "created_time": "2024-01-01T00:00:00.000Z",
        "last_edited_time": "2024-01-01T00:00:00.000Z",
        "properties": {
            "Name": { "type": "title", "title": [{ "plain_text": "Inkstone" }] },
            "Category": { "type": "select", "select": { "name": "Tooling" } },
            "Role": { "type": "rich_text", "rich_text": [{ "plain_text": "Maintainer" }] }
        }
    });
    let fake = FakeNotion::default().with_database(PROJECTS_DB, json!([page]));
    let service = ContentService::new(Arc::new(fake), config());

    let projects = service.projects().await;
    assert_eq!(projects[0].name, "Inkstone");
    assert_eq!(projects[0].role, "Maintainer");

    let categories = service.project_categories().await;
    let ids: Vec<&str> = categories.iter().map(|c| c.id.as_str()).collect();
    assert_eq!(ids, vec!["all", "tooling"]);
}
