//! Record map assembly from fetched page data.

use std::collections::BTreeSet;

use serde_json::{json, Map, Value};

use super::fetch::FetchedBlock;
use super::mapper;
use super::richtext::convert_rich_text;
use crate::api::{ExternalPage, Icon, PropertyValue};
use crate::record::{compact_id, BlockValue, Decoration, Permission, PropertyMap, Record, RecordMap};

/// Build the record map for one page: a synthetic page block plus the
/// converted block tree. Collections stay empty; this adapter does not
/// reimplement them.
pub(super) fn record_map(page: &ExternalPage, blocks: &[FetchedBlock]) -> RecordMap {
    let mut map = RecordMap::default();

    let page_block = page_block(page, blocks);
    map.block
        .insert(page_block.id.clone(), Record::editor(page_block));

    insert_blocks(&mut map, blocks);
    map
}

fn page_block(page: &ExternalPage, blocks: &[FetchedBlock]) -> BlockValue {
    let mut properties = PropertyMap::new();
    properties.insert("title".to_string(), extract_title(page));

    let mut format = Map::new();
    // The renderer distinguishes an absent key from an explicit null; icon
    // and cover must be present either way.
    put_format(&mut format, "page_icon", extract_icon(page).map(Value::String));
    put_format(&mut format, "page_cover", extract_cover(page).map(Value::String));
    format.insert("page_cover_position".to_string(), json!(0.5));

    BlockValue {
        id: compact_id(&page.id),
        version: 1,
        block_type: "page".to_string(),
        properties,
        format,
        content: blocks.iter().map(|b| compact_id(&b.block.id)).collect(),
        permissions: vec![Permission::default()],
        created_time: page.created_time.timestamp_millis(),
        last_edited_time: page.last_edited_time.timestamp_millis(),
        parent_id: page_parent_id(page),
        parent_table: "space".to_string(),
        alive: true,
        created_by_table: "notion_user".to_string(),
        created_by_id: mapper::user_id_or_unknown(&page.created_by),
        last_edited_by_table: "notion_user".to_string(),
        last_edited_by_id: mapper::user_id_or_unknown(&page.last_edited_by),
        space_id: Some("workspace".to_string()),
    }
}

/// Depth-first insertion of the converted block tree.
fn insert_blocks(map: &mut RecordMap, blocks: &[FetchedBlock]) {
    for fetched in blocks {
        let content = fetched
            .children
            .iter()
            .map(|child| compact_id(&child.block.id))
            .collect();
        let value = mapper::convert_block(&fetched.block, content);
        map.block.insert(value.id.clone(), Record::editor(value));

        if !fetched.children.is_empty() {
            insert_blocks(map, &fetched.children);
        }
    }
}

/// Title fallback chain: explicit `title` property, then `Name`, then a
/// literal `Untitled`.
fn extract_title(page: &ExternalPage) -> Vec<Decoration> {
    for key in ["title", "Name"] {
        if let Some(PropertyValue::Title { title }) = page.properties.get(key) {
            return convert_rich_text(title);
        }
    }
    vec![Decoration::plain("Untitled")]
}

fn extract_icon(page: &ExternalPage) -> Option<String> {
    match page.icon.as_ref()? {
        Icon::Emoji { emoji } => Some(emoji.clone()),
        Icon::External { external } => Some(external.url.clone()),
        Icon::File { file } => Some(file.url.clone()),
        Icon::Unknown => None,
    }
}

fn extract_cover(page: &ExternalPage) -> Option<String> {
    page.cover.as_ref().map(|cover| cover.url().to_string())
}

fn page_parent_id(page: &ExternalPage) -> String {
    use crate::api::Parent;
    match &page.parent {
        Some(Parent::PageId { page_id }) => page_id.clone(),
        Some(Parent::DatabaseId { database_id }) => database_id.clone(),
        _ => "workspace".to_string(),
    }
}

/// Insert a format entry, writing an explicit `null` for an absent value.
fn put_format(format: &mut Map<String, Value>, key: &str, value: Option<Value>) {
    format.insert(key.to_string(), value.unwrap_or(Value::Null));
}

/// Distinct dashed user ids referenced by the page and its block tree.
pub(super) fn collect_user_ids(page: &ExternalPage, blocks: &[FetchedBlock]) -> BTreeSet<String> {
    let mut ids = BTreeSet::new();

    for user in [&page.created_by, &page.last_edited_by].into_iter().flatten() {
        ids.insert(user.id.clone());
    }
    collect_block_user_ids(&mut ids, blocks);
    ids
}

fn collect_block_user_ids(ids: &mut BTreeSet<String>, blocks: &[FetchedBlock]) {
    for fetched in blocks {
        for user in [&fetched.block.created_by, &fetched.block.last_edited_by]
            .into_iter()
            .flatten()
        {
            ids.insert(user.id.clone());
        }
        collect_block_user_ids(ids, &fetched.children);
    }
}
