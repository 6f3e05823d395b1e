//! Wire types for the official Notion REST API.
//!
//! Only the slice of the API surface the adapter consumes is modeled.
//! Unknown block kinds and property kinds land in explicit fallback variants
//! so new vendor types degrade instead of erroring.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

/// One span of vendor rich text.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RichTextSpan {
    #[serde(default)]
    pub plain_text: String,
    #[serde(default)]
    pub href: Option<String>,
    #[serde(default)]
    pub annotations: Annotations,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Annotations {
    pub bold: bool,
    pub italic: bool,
    pub strikethrough: bool,
    pub underline: bool,
    pub code: bool,
    pub color: String,
}

impl Default for Annotations {
    fn default() -> Self {
        Self {
            bold: false,
            italic: false,
            strikethrough: false,
            underline: false,
            code: false,
            color: "default".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExternalFile {
    pub url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HostedFile {
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiry_time: Option<DateTime<Utc>>,
}

/// External-vs-hosted file union used by image, file and cover payloads.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FileSource {
    External { external: ExternalFile },
    File { file: HostedFile },
}

impl FileSource {
    pub fn url(&self) -> &str {
        match self {
            FileSource::External { external } => &external.url,
            FileSource::File { file } => &file.url,
        }
    }
}

/// Page or callout icon union. The vendor grows new icon kinds over time;
/// those fall into `Unknown` and contribute no hint downstream.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Icon {
    Emoji { emoji: String },
    External { external: ExternalFile },
    File { file: HostedFile },
    #[serde(other)]
    Unknown,
}

/// Parent pointer on pages and blocks.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Parent {
    PageId { page_id: String },
    DatabaseId { database_id: String },
    BlockId { block_id: String },
    Workspace {
        #[serde(default)]
        workspace: bool,
    },
}

/// The id-only user stub attached to `created_by` / `last_edited_by`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PartialUser {
    pub id: String,
}

/// A full user record from the users endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct ExternalUser {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub avatar_url: Option<String>,
}

/// Cursor-paginated list envelope shared by every listing endpoint.
#[derive(Debug, Clone, Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
pub struct Paginated<T> {
    #[serde(default)]
    pub results: Vec<T>,
    #[serde(default)]
    pub has_more: bool,
    #[serde(default)]
    pub next_cursor: Option<String>,
}

/// A block object as returned by the official API.
///
/// The type-specific payload stays as raw JSON until [`ExternalBlock::payload`]
/// resolves it into a [`BlockPayload`]. Blocks with no mapping keep their
/// vendor type string and contribute no properties.
#[derive(Debug, Clone, Deserialize)]
pub struct ExternalBlock {
    pub id: String,
    #[serde(rename = "type")]
    pub block_type: String,
    pub created_time: DateTime<Utc>,
    pub last_edited_time: DateTime<Utc>,
    #[serde(default)]
    pub created_by: Option<PartialUser>,
    #[serde(default)]
    pub last_edited_by: Option<PartialUser>,
    #[serde(default)]
    pub parent: Option<Parent>,
    #[serde(default)]
    pub has_children: bool,
    #[serde(flatten)]
    pub rest: BTreeMap<String, Value>,
}

/// Resolved type-specific payloads for the block kinds the adapter reads.
#[derive(Debug, Clone)]
pub enum BlockPayload {
    /// paragraph, headings, list items, toggle, quote
    Text(TextPayload),
    Todo(TodoPayload),
    Callout(CalloutPayload),
    Code(CodePayload),
    Image(AttachmentPayload),
    File(AttachmentPayload),
    Bookmark(BookmarkPayload),
    Table(TablePayload),
    TableRow(TableRowPayload),
    /// Kinds with no properties or format contribution.
    Other,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TextPayload {
    #[serde(default)]
    pub rich_text: Vec<RichTextSpan>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TodoPayload {
    #[serde(default)]
    pub rich_text: Vec<RichTextSpan>,
    #[serde(default)]
    pub checked: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CalloutPayload {
    #[serde(default)]
    pub rich_text: Vec<RichTextSpan>,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub icon: Option<Icon>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CodePayload {
    #[serde(default)]
    pub rich_text: Vec<RichTextSpan>,
    #[serde(default)]
    pub language: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AttachmentPayload {
    #[serde(flatten)]
    pub source: Option<FileSource>,
    #[serde(default)]
    pub caption: Vec<RichTextSpan>,
}

impl AttachmentPayload {
    pub fn url(&self) -> Option<&str> {
        self.source.as_ref().map(FileSource::url)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct BookmarkPayload {
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub caption: Vec<RichTextSpan>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TablePayload {
    #[serde(default)]
    pub table_width: u32,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TableRowPayload {
    #[serde(default)]
    pub cells: Vec<Vec<RichTextSpan>>,
}

impl ExternalBlock {
    /// Resolve the type-named payload object into a typed union.
    ///
    /// A payload that fails to decode is treated as absent rather than an
    /// error; the block then contributes no properties or format.
    pub fn payload(&self) -> BlockPayload {
        let raw = match self.rest.get(self.block_type.as_str()) {
            Some(value) => value.clone(),
            None => return BlockPayload::Other,
        };

        match self.block_type.as_str() {
            "paragraph" | "heading_1" | "heading_2" | "heading_3" | "bulleted_list_item"
            | "numbered_list_item" | "toggle" | "quote" => {
                self.decode(raw).map(BlockPayload::Text)
            }
            "to_do" => self.decode(raw).map(BlockPayload::Todo),
            "callout" => self.decode(raw).map(BlockPayload::Callout),
            "code" => self.decode(raw).map(BlockPayload::Code),
            "image" => self.decode(raw).map(BlockPayload::Image),
            "file" => self.decode(raw).map(BlockPayload::File),
            "bookmark" => self.decode(raw).map(BlockPayload::Bookmark),
            "table" => self.decode(raw).map(BlockPayload::Table),
            "table_row" => self.decode(raw).map(BlockPayload::TableRow),
            _ => None,
        }
        .unwrap_or(BlockPayload::Other)
    }

    fn decode<T: DeserializeOwned>(&self, raw: Value) -> Option<T> {
        match serde_json::from_value(raw) {
            Ok(payload) => Some(payload),
            Err(e) => {
                debug!(
                    "undecodable {} payload on block {}: {}",
                    self.block_type, self.id, e
                );
                None
            }
        }
    }
}

/// A page object from the pages or database-query endpoints.
#[derive(Debug, Clone, Deserialize)]
pub struct ExternalPage {
    pub id: String,
    pub created_time: DateTime<Utc>,
    pub last_edited_time: DateTime<Utc>,
    #[serde(default)]
    pub created_by: Option<PartialUser>,
    #[serde(default)]
    pub last_edited_by: Option<PartialUser>,
    #[serde(default)]
    pub icon: Option<Icon>,
    #[serde(default)]
    pub cover: Option<FileSource>,
    #[serde(default)]
    pub parent: Option<Parent>,
    #[serde(default)]
    pub properties: BTreeMap<String, PropertyValue>,
    #[serde(default)]
    pub url: Option<String>,
}

/// Typed page property values. Kinds the content layer does not read fall
/// back to [`PropertyValue::Other`].
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PropertyValue {
    Title {
        #[serde(default)]
        title: Vec<RichTextSpan>,
    },
    RichText {
        #[serde(default)]
        rich_text: Vec<RichTextSpan>,
    },
    Select {
        #[serde(default)]
        select: Option<SelectOption>,
    },
    MultiSelect {
        #[serde(default)]
        multi_select: Vec<SelectOption>,
    },
    Date {
        #[serde(default)]
        date: Option<DateValue>,
    },
    Number {
        #[serde(default)]
        number: Option<f64>,
    },
    Url {
        #[serde(default)]
        url: Option<String>,
    },
    Files {
        #[serde(default)]
        files: Vec<FileAttachment>,
    },
    Checkbox {
        #[serde(default)]
        checkbox: bool,
    },
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SelectOption {
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DateValue {
    #[serde(default)]
    pub start: Option<String>,
    #[serde(default)]
    pub end: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct FileAttachment {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(flatten)]
    pub source: Option<FileSource>,
}

impl FileAttachment {
    pub fn url(&self) -> Option<&str> {
        self.source.as_ref().map(FileSource::url)
    }
}

/// One hit from the search endpoint. Pages and databases share the fields
/// the adapter reads.
#[derive(Debug, Clone, Deserialize)]
pub struct SearchHit {
    pub id: String,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub properties: BTreeMap<String, PropertyValue>,
}

/// Error body the API returns on non-2xx responses.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ApiErrorBody {
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}
