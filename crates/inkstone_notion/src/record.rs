//! The legacy "record map" data model the rendering component consumes.
//!
//! Shapes here are serialization-driven: the renderer is an external
//! collaborator with a fixed schema, so field names, tag strings and the
//! tuple encodings below are load-bearing.

use std::collections::BTreeMap;

use serde::ser::{SerializeSeq, Serializer};
use serde::Serialize;
use serde_json::Value;

/// Strip the dashes from a vendor UUID, yielding the legacy id form.
pub fn compact_id(id: &str) -> String {
    id.chars().filter(|c| *c != '-').collect()
}

/// One formatting mark on a decoration span.
///
/// Serializes as the legacy single-letter tuples: `["b"]`, `["i"]`, `["s"]`,
/// `["_"]`, `["c"]`, `["a", href]`, `["h", color]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mark {
    Bold,
    Italic,
    Strikethrough,
    Underline,
    Code,
    Link(String),
    Color(String),
}

impl Mark {
    fn tag(&self) -> &'static str {
        match self {
            Mark::Bold => "b",
            Mark::Italic => "i",
            Mark::Strikethrough => "s",
            Mark::Underline => "_",
            Mark::Code => "c",
            Mark::Link(_) => "a",
            Mark::Color(_) => "h",
        }
    }
}

impl Serialize for Mark {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Mark::Link(href) => {
                let mut seq = serializer.serialize_seq(Some(2))?;
                seq.serialize_element(self.tag())?;
                seq.serialize_element(href)?;
                seq.end()
            }
            Mark::Color(color) => {
                let mut seq = serializer.serialize_seq(Some(2))?;
                seq.serialize_element(self.tag())?;
                seq.serialize_element(color)?;
                seq.end()
            }
            _ => {
                let mut seq = serializer.serialize_seq(Some(1))?;
                seq.serialize_element(self.tag())?;
                seq.end()
            }
        }
    }
}

/// One legacy decoration: `[text]` or `[text, marks]`.
#[derive(Debug, Clone, PartialEq)]
pub struct Decoration {
    pub text: String,
    pub marks: Vec<Mark>,
}

impl Decoration {
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            marks: Vec::new(),
        }
    }

    /// The `[[""]]` placeholder the renderer expects for empty rich text.
    pub fn empty() -> Vec<Decoration> {
        vec![Decoration::plain("")]
    }
}

impl Serialize for Decoration {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        if self.marks.is_empty() {
            let mut seq = serializer.serialize_seq(Some(1))?;
            seq.serialize_element(&self.text)?;
            seq.end()
        } else {
            let mut seq = serializer.serialize_seq(Some(2))?;
            seq.serialize_element(&self.text)?;
            seq.serialize_element(&self.marks)?;
            seq.end()
        }
    }
}

/// Sparse keyed bag of decoration lists.
pub type PropertyMap = BTreeMap<String, Vec<Decoration>>;

/// Stub permission entry the renderer expects on every block.
#[derive(Debug, Clone, Serialize)]
pub struct Permission {
    pub role: &'static str,
    #[serde(rename = "type")]
    pub permission_type: &'static str,
}

impl Default for Permission {
    fn default() -> Self {
        Self {
            role: "editor",
            permission_type: "user_permission",
        }
    }
}

/// The `value` payload of one legacy block record.
#[derive(Debug, Clone, Serialize)]
pub struct BlockValue {
    pub id: String,
    pub version: u32,
    #[serde(rename = "type")]
    pub block_type: String,
    pub properties: PropertyMap,
    pub format: serde_json::Map<String, Value>,
    pub content: Vec<String>,
    pub permissions: Vec<Permission>,
    pub created_time: i64,
    pub last_edited_time: i64,
    pub parent_id: String,
    pub parent_table: String,
    pub alive: bool,
    pub created_by_table: String,
    pub created_by_id: String,
    pub last_edited_by_table: String,
    pub last_edited_by_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub space_id: Option<String>,
}

/// Minimal legacy user record value.
#[derive(Debug, Clone, Serialize)]
pub struct UserValue {
    pub id: String,
    pub version: u32,
    pub given_name: Option<String>,
    pub profile_photo: Option<String>,
}

/// A role-wrapped record map entry.
#[derive(Debug, Clone, Serialize)]
pub struct Record<T> {
    pub role: &'static str,
    pub value: T,
}

impl<T> Record<T> {
    pub fn editor(value: T) -> Self {
        Self {
            role: "editor",
            value,
        }
    }
}

pub type BlockRecord = Record<BlockValue>;
pub type UserRecord = Record<UserValue>;

/// The aggregate map-of-maps structure the renderer consumes.
///
/// Every id referenced from a `content` list has a `block` entry for
/// subtrees that fetched successfully; failed subtrees degrade to an empty
/// `content` list upstream of this type.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RecordMap {
    pub block: BTreeMap<String, BlockRecord>,
    pub collection: BTreeMap<String, Value>,
    pub collection_view: BTreeMap<String, Value>,
    pub notion_user: BTreeMap<String, UserRecord>,
    pub collection_query: BTreeMap<String, Value>,
    pub signed_urls: BTreeMap<String, String>,
}

impl RecordMap {
    /// Plain-text title of the block with the given legacy id, if it has one.
    pub fn title_of(&self, block_id: &str) -> Option<String> {
        let record = self.block.get(block_id)?;
        let title = record.value.properties.get("title")?;
        Some(title.iter().map(|d| d.text.as_str()).collect())
    }
}

/// Legacy search response shape.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResults {
    pub record_map: RecordMap,
    pub results: Vec<SearchResultEntry>,
    pub total: usize,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResultEntry {
    pub id: String,
    pub is_navigable: bool,
    pub score: f64,
    pub highlight: SearchHighlight,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchHighlight {
    pub path_text: String,
    pub text: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn plain_decoration_serializes_as_single_tuple() {
        let value = serde_json::to_value(Decoration::plain("hello")).unwrap();
        assert_eq!(value, json!(["hello"]));
    }

    #[test]
    fn marked_decoration_serializes_with_mark_list() {
        let decoration = Decoration {
            text: "hello".to_string(),
            marks: vec![Mark::Bold, Mark::Link("https://example.com".to_string())],
        };
        let value = serde_json::to_value(decoration).unwrap();
        assert_eq!(value, json!(["hello", [["b"], ["a", "https://example.com"]]]));
    }

    #[test]
    fn color_mark_carries_color_name() {
        let value = serde_json::to_value(Mark::Color("red".to_string())).unwrap();
        assert_eq!(value, json!(["h", "red"]));
    }

    #[test]
    fn empty_placeholder_is_single_empty_decoration() {
        let value = serde_json::to_value(Decoration::empty()).unwrap();
        assert_eq!(value, json!([[""]]));
    }

    #[test]
    fn compact_id_strips_dashes() {
        assert_eq!(
            compact_id("0fa1fcd4-5d4a-4a23-b6b3-5ea9a3c4e2a1"),
            "0fa1fcd45d4a4a23b6b35ea9a3c4e2a1"
        );
    }
}
