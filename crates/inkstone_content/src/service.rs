//! Content service: cached, degrade-to-empty access to posts and projects.
//!
//! Every operation follows the same failure contract: upstream errors are
//! logged and surfaced as an empty list or `None`, never propagated. The UI
//! renders its own "not found" state from that.

use std::sync::Arc;

use tracing::{error, warn};

use inkstone_notion::api::ExternalPage;
use inkstone_notion::{
    CachedAdapter, NotionAdapter, NotionConfig, NotionTransport, PageId, Result, TtlCache,
};

use crate::extract;
use crate::model::{
    Category, Post, Project, DEFAULT_CATEGORY, DEFAULT_ROLE, POST_THUMBNAIL_PLACEHOLDER,
    PROJECT_THUMBNAIL_PLACEHOLDER,
};

/// Id of the synthetic "show everything" category entry.
const ALL_CATEGORY_ID: &str = "all";
const ALL_CATEGORY_NAME: &str = "All";

pub struct ContentService {
    transport: Arc<dyn NotionTransport>,
    adapter: CachedAdapter,
    config: NotionConfig,
    posts: TtlCache<String, Arc<Vec<Post>>>,
    projects: TtlCache<String, Arc<Vec<Project>>>,
}

impl ContentService {
    pub fn new(transport: Arc<dyn NotionTransport>, config: NotionConfig) -> Self {
        let adapter = CachedAdapter::new(
            NotionAdapter::new(transport.clone())
                .with_child_concurrency(config.child_fetch_concurrency),
            config.cache_ttl(),
        );
        Self {
            transport,
            adapter,
            posts: TtlCache::new(config.cache_ttl()),
            projects: TtlCache::new(config.cache_ttl()),
            config,
        }
    }

    pub fn adapter(&self) -> &CachedAdapter {
        &self.adapter
    }

    /// All posts, newest first. Failures degrade to an empty list.
    pub async fn posts(&self) -> Vec<Post> {
        let Some(database_id) = self.config.post_database_id.clone() else {
            warn!("post database id not configured");
            return Vec::new();
        };

        if let Some(hit) = self.posts.get(&database_id) {
            return hit.as_ref().clone();
        }

        match self.query_all_pages(&database_id).await {
            Ok(pages) => {
                let posts = build_posts(&pages);
                self.posts.insert(database_id, Arc::new(posts.clone()));
                posts
            }
            Err(e) => {
                error!("failed to fetch posts: {}", e);
                Vec::new()
            }
        }
    }

    /// Look up a post by its derived numeric id.
    pub async fn post_by_numeric_id(&self, id: u32) -> Option<Post> {
        self.posts().await.into_iter().find(|post| post.id == id)
    }

    /// Fetch a single page and shape a minimal post from its title.
    /// Returns `None` when the page cannot be fetched.
    pub async fn post_by_page_id(&self, page_id: &str) -> Option<Post> {
        let title = match self.page_title(page_id).await {
            Ok(title) => title,
            Err(e) => {
                error!("failed to fetch post {}: {}", page_id, e);
                return None;
            }
        };
        Some(Post {
            id: extract::derive_numeric_id(page_id),
            category: DEFAULT_CATEGORY.to_string(),
            title: title.clone(),
            date: chrono::Utc::now().format("%Y.%m.%d").to_string(),
            content_preview: format!("Preview of {title}"),
            tags: Vec::new(),
            thumbnail_url: POST_THUMBNAIL_PLACEHOLDER.to_string(),
            content: format!("Contents of {title}"),
            views: 0,
        })
    }

    /// All projects, newest first. Failures degrade to an empty list.
    pub async fn projects(&self) -> Vec<Project> {
        let Some(database_id) = self.config.project_database_id.clone() else {
            warn!("project database id not configured");
            return Vec::new();
        };

        if let Some(hit) = self.projects.get(&database_id) {
            return hit.as_ref().clone();
        }

        match self.query_all_pages(&database_id).await {
            Ok(pages) => {
                let projects = build_projects(&pages);
                self.projects.insert(database_id, Arc::new(projects.clone()));
                projects
            }
            Err(e) => {
                error!("failed to fetch projects: {}", e);
                Vec::new()
            }
        }
    }

    pub async fn project_by_numeric_id(&self, id: u32) -> Option<Project> {
        self.projects()
            .await
            .into_iter()
            .find(|project| project.id == id)
    }

    /// Post categories, with the synthetic "all" entry first.
    pub async fn categories(&self) -> Vec<Category> {
        categories_of(self.posts().await.iter().map(|post| post.category.as_str()))
    }

    /// Project categories, with the synthetic "all" entry first.
    pub async fn project_categories(&self) -> Vec<Category> {
        categories_of(
            self.projects()
                .await
                .iter()
                .map(|project| project.category.as_str()),
        )
    }

    async fn page_title(&self, page_id: &str) -> Result<String> {
        let key = PageId::parse(page_id)?.compact();
        let map = self.adapter.get_page(page_id).await?;
        Ok(map.title_of(&key).unwrap_or_else(|| "Untitled".to_string()))
    }

    /// Drain every page of a database query.
    async fn query_all_pages(&self, database_id: &str) -> Result<Vec<ExternalPage>> {
        let mut pages = Vec::new();
        let mut cursor: Option<String> = None;

        loop {
            let batch = self
                .transport
                .query_database(database_id, cursor.as_deref())
                .await?;
            pages.extend(batch.results);

            match (batch.has_more, batch.next_cursor) {
                (true, Some(next)) => cursor = Some(next),
                _ => break,
            }
        }

        Ok(pages)
    }
}

fn build_posts(pages: &[ExternalPage]) -> Vec<Post> {
    let mut posts: Vec<Post> = pages.iter().map(post_from_page).collect();
    posts.sort_by(|a, b| b.date.cmp(&a.date));
    posts
}

fn post_from_page(page: &ExternalPage) -> Post {
    let title = extract::title_text(page, &["title", "Name"], "Untitled");
    let category = extract::text_like(page, &["Category", "category"])
        .unwrap_or_else(|| DEFAULT_CATEGORY.to_string());
    let date = extract::display_date(
        extract::date_start(page, &["Date", "date"]).as_deref(),
        page.created_time,
    );

    Post {
        id: extract::derive_numeric_id(&page.id),
        category,
        date,
        content_preview: format!("Preview of {title}"),
        tags: extract::multi_select_names(page, &["Tags", "tags"]),
        thumbnail_url: extract::url_or_file(page, &["Thumbnail", "thumbnail"])
            .unwrap_or_else(|| POST_THUMBNAIL_PLACEHOLDER.to_string()),
        content: format!("Contents of {title}"),
        views: extract::number_value(page, &["Views", "views"])
            .map(|n| n.max(0.0) as u32)
            .unwrap_or(0),
        title,
    }
}

fn build_projects(pages: &[ExternalPage]) -> Vec<Project> {
    let mut projects: Vec<Project> = pages.iter().map(project_from_page).collect();
    projects.sort_by(|a, b| b.date.cmp(&a.date));
    projects
}

fn project_from_page(page: &ExternalPage) -> Project {
    let name = extract::title_text(page, &["Name", "name", "title"], "Untitled");
    let category = extract::text_like(page, &["Category", "category"])
        .unwrap_or_else(|| DEFAULT_CATEGORY.to_string());
    let role = extract::text_like(page, &["Role", "role"])
        .unwrap_or_else(|| DEFAULT_ROLE.to_string());
    let date = extract::display_date(
        extract::date_start(page, &["Date", "date"]).as_deref(),
        page.created_time,
    );

    Project {
        id: extract::derive_numeric_id(&page.id),
        category,
        role,
        content_preview: format!("Preview of {name}"),
        tags: extract::multi_select_names(page, &["Tags", "tags"]),
        thumbnail_url: extract::url_or_file(page, &["Thumbnail", "thumbnail"])
            .unwrap_or_else(|| PROJECT_THUMBNAIL_PLACEHOLDER.to_string()),
        date,
        content: format!("Contents of {name}"),
        views: extract::number_value(page, &["Views", "views"])
            .map(|n| n.max(0.0) as u32)
            .unwrap_or(0),
        name,
    }
}

/// Distinct non-default categories, in first-seen order, behind the
/// synthetic "all" entry.
fn categories_of<'a>(names: impl Iterator<Item = &'a str>) -> Vec<Category> {
    let mut categories = vec![Category {
        id: ALL_CATEGORY_ID.to_string(),
        name: ALL_CATEGORY_NAME.to_string(),
    }];

    for name in names {
        if name == DEFAULT_CATEGORY || categories.iter().any(|c| c.name == name) {
            continue;
        }
        categories.push(Category {
            id: category_id(name),
            name: name.to_string(),
        });
    }

    categories
}

/// Slug form of a category name: lowercased, whitespace runs become dashes.
fn category_id(name: &str) -> String {
    name.to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("-")
}
