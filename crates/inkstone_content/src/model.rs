//! Blog-domain models surfaced to the front end.

use serde::{Deserialize, Serialize};

/// Category used when a record carries none.
pub const DEFAULT_CATEGORY: &str = "Uncategorized";
/// Role used when a project record carries none.
pub const DEFAULT_ROLE: &str = "Unspecified";
/// Placeholder thumbnails, matching the front end's card dimensions.
pub const POST_THUMBNAIL_PLACEHOLDER: &str = "https://picsum.photos/400/300";
pub const PROJECT_THUMBNAIL_PLACEHOLDER: &str = "https://picsum.photos/500/400";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub id: u32,
    pub category: String,
    pub title: String,
    /// Display date, `YYYY.MM.DD`.
    pub date: String,
    pub content_preview: String,
    pub tags: Vec<String>,
    pub thumbnail_url: String,
    pub content: String,
    pub views: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: u32,
    pub category: String,
    pub name: String,
    pub role: String,
    pub content_preview: String,
    pub tags: Vec<String>,
    pub thumbnail_url: String,
    /// Display date, `YYYY.MM.DD`.
    pub date: String,
    pub content: String,
    pub views: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: String,
    pub name: String,
}

pub type ProjectCategory = Category;
