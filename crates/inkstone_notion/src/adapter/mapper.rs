//! Vendor block to legacy block conversion.
//!
//! Type names translate through a fixed table; properties and format are
//! extracted per payload kind. Unknown vendor types pass through unchanged
//! with empty properties (permissive, not fail-closed).

use serde_json::{json, Map, Value};

use super::richtext::convert_rich_text;
use crate::api::{BlockPayload, ExternalBlock, Icon, Parent, PartialUser};
use crate::record::{compact_id, BlockValue, Decoration, Permission, PropertyMap};

/// Renderer default column width for tables without explicit sizing.
const TABLE_COLUMN_WIDTH: u32 = 120;

/// Translate an official block type name into the legacy vocabulary.
/// Unmapped names come back unchanged.
pub fn map_block_type(vendor: &str) -> &str {
    match vendor {
        "paragraph" => "text",
        "heading_1" => "header",
        "heading_2" => "sub_header",
        "heading_3" => "sub_sub_header",
        "bulleted_list_item" => "bulleted_list",
        "numbered_list_item" => "numbered_list",
        "child_page" => "page",
        "child_database" => "collection_view_page",
        "synced_block" => "transclusion_container",
        "link_to_page" => "alias",
        other => other,
    }
}

/// Convert one vendor block (children already resolved to legacy ids) into
/// the legacy block value.
pub fn convert_block(block: &ExternalBlock, content: Vec<String>) -> BlockValue {
    let payload = block.payload();

    BlockValue {
        id: compact_id(&block.id),
        version: 1,
        block_type: map_block_type(&block.block_type).to_string(),
        properties: properties_for(&payload),
        format: format_for(&payload),
        content,
        permissions: vec![Permission::default()],
        created_time: block.created_time.timestamp_millis(),
        last_edited_time: block.last_edited_time.timestamp_millis(),
        parent_id: block_parent_id(block),
        parent_table: "block".to_string(),
        alive: true,
        created_by_table: "notion_user".to_string(),
        created_by_id: user_id_or_unknown(&block.created_by),
        last_edited_by_table: "notion_user".to_string(),
        last_edited_by_id: user_id_or_unknown(&block.last_edited_by),
        space_id: None,
    }
}

/// Legacy user id for an optional user stub, with the renderer's
/// `unknown_user` placeholder when the vendor omitted it.
pub(crate) fn user_id_or_unknown(user: &Option<PartialUser>) -> String {
    user.as_ref()
        .map(|u| compact_id(&u.id))
        .unwrap_or_else(|| "unknown_user".to_string())
}

fn block_parent_id(block: &ExternalBlock) -> String {
    match &block.parent {
        Some(Parent::PageId { page_id }) => compact_id(page_id),
        _ => "parent".to_string(),
    }
}

fn properties_for(payload: &BlockPayload) -> PropertyMap {
    let mut properties = PropertyMap::new();

    match payload {
        BlockPayload::Text(text) => {
            properties.insert("title".to_string(), convert_rich_text(&text.rich_text));
        }
        BlockPayload::Todo(todo) => {
            properties.insert("title".to_string(), convert_rich_text(&todo.rich_text));
            let checked = if todo.checked { "Yes" } else { "No" };
            properties.insert("checked".to_string(), vec![Decoration::plain(checked)]);
        }
        BlockPayload::Callout(callout) => {
            properties.insert("title".to_string(), convert_rich_text(&callout.rich_text));
        }
        BlockPayload::Code(code) => {
            properties.insert("title".to_string(), convert_rich_text(&code.rich_text));
            let language = code.language.as_deref().unwrap_or("plain text");
            properties.insert("language".to_string(), vec![Decoration::plain(language)]);
        }
        BlockPayload::Image(attachment) | BlockPayload::File(attachment) => {
            if let Some(url) = attachment.url() {
                if !url.is_empty() {
                    properties.insert("source".to_string(), vec![Decoration::plain(url)]);
                }
            }
            if !attachment.caption.is_empty() {
                properties.insert("caption".to_string(), convert_rich_text(&attachment.caption));
            }
        }
        BlockPayload::Bookmark(bookmark) => {
            properties.insert(
                "link".to_string(),
                vec![Decoration::plain(bookmark.url.as_str())],
            );
            if !bookmark.caption.is_empty() {
                properties.insert("caption".to_string(), convert_rich_text(&bookmark.caption));
            }
        }
        BlockPayload::TableRow(row) => {
            for (index, cell) in row.cells.iter().enumerate() {
                // Empty cells become the placeholder decoration, never an
                // absent key.
                let value = if cell.is_empty() {
                    Decoration::empty()
                } else {
                    convert_rich_text(cell)
                };
                properties.insert(index.to_string(), value);
            }
        }
        BlockPayload::Table(_) | BlockPayload::Other => {}
    }

    properties
}

fn format_for(payload: &BlockPayload) -> Map<String, Value> {
    let mut format = Map::new();

    match payload {
        BlockPayload::Callout(callout) => {
            if let Some(color) = callout.color.as_deref() {
                if color != "default" {
                    format.insert("block_color".to_string(), json!(color));
                }
            }
            match &callout.icon {
                Some(Icon::Emoji { emoji }) => {
                    format.insert("page_icon".to_string(), json!(emoji));
                }
                Some(Icon::External { external }) => {
                    format.insert("page_icon".to_string(), json!(external.url));
                }
                // The legacy shape has no slot for signed hosted-file icon
                // URLs, so those are skipped along with unknown kinds.
                Some(Icon::File { .. }) | Some(Icon::Unknown) | None => {}
            }
        }
        BlockPayload::Code(_) => {
            format.insert("code_wrap".to_string(), json!(true));
        }
        BlockPayload::Table(table) => {
            if table.table_width > 0 {
                let order: Vec<String> = (0..table.table_width).map(|i| i.to_string()).collect();
                format.insert("table_block_column_order".to_string(), json!(order));

                let mut column_format = Map::new();
                for index in 0..table.table_width {
                    column_format.insert(
                        index.to_string(),
                        json!({ "width": TABLE_COLUMN_WIDTH }),
                    );
                }
                format.insert(
                    "table_block_column_format".to_string(),
                    Value::Object(column_format),
                );
            }
        }
        _ => {}
    }

    format
}
