//! Property extraction from vendor pages.
//!
//! Database schemas drift (capitalized vs lowercase names, select vs rich
//! text), so every accessor takes a fallback key list and returns an Option.

use chrono::{DateTime, NaiveDate, Utc};

use inkstone_notion::adapter::plain_text;
use inkstone_notion::api::{ExternalPage, PropertyValue};

/// Numeric id derived from the tail of a page id: the last 8 hex characters
/// parsed base 16. Stable across dashed and compact renderings.
pub fn derive_numeric_id(page_id: &str) -> u32 {
    let hex: Vec<char> = page_id.chars().filter(|c| c.is_ascii_hexdigit()).collect();
    let tail: String = hex[hex.len().saturating_sub(8)..].iter().collect();
    u32::from_str_radix(&tail, 16).unwrap_or(0)
}

/// Title text through a fallback key chain, then a literal fallback.
pub fn title_text(page: &ExternalPage, keys: &[&str], fallback: &str) -> String {
    for key in keys {
        if let Some(PropertyValue::Title { title }) = page.properties.get(*key) {
            let text = plain_text(title);
            if !text.is_empty() {
                return text;
            }
        }
    }
    fallback.to_string()
}

/// First non-empty select name or rich-text rendering among the keys.
pub fn text_like(page: &ExternalPage, keys: &[&str]) -> Option<String> {
    for key in keys {
        match page.properties.get(*key) {
            Some(PropertyValue::Select { select: Some(option) }) if !option.name.is_empty() => {
                return Some(option.name.clone());
            }
            Some(PropertyValue::RichText { rich_text }) => {
                let text = plain_text(rich_text);
                if !text.is_empty() {
                    return Some(text);
                }
            }
            _ => {}
        }
    }
    None
}

/// Multi-select option names for the first key that has any.
pub fn multi_select_names(page: &ExternalPage, keys: &[&str]) -> Vec<String> {
    for key in keys {
        if let Some(PropertyValue::MultiSelect { multi_select }) = page.properties.get(*key) {
            if !multi_select.is_empty() {
                return multi_select.iter().map(|option| option.name.clone()).collect();
            }
        }
    }
    Vec::new()
}

/// Start of the first populated date property among the keys.
pub fn date_start(page: &ExternalPage, keys: &[&str]) -> Option<String> {
    for key in keys {
        if let Some(PropertyValue::Date { date: Some(date) }) = page.properties.get(*key) {
            if let Some(start) = &date.start {
                return Some(start.clone());
            }
        }
    }
    None
}

/// First populated number property among the keys.
pub fn number_value(page: &ExternalPage, keys: &[&str]) -> Option<f64> {
    for key in keys {
        if let Some(PropertyValue::Number { number: Some(number) }) = page.properties.get(*key) {
            return Some(*number);
        }
    }
    None
}

/// First URL-ish property among the keys: a url property, or the first file
/// attachment of a files property.
pub fn url_or_file(page: &ExternalPage, keys: &[&str]) -> Option<String> {
    for key in keys {
        match page.properties.get(*key) {
            Some(PropertyValue::Url { url: Some(url) }) if !url.is_empty() => {
                return Some(url.clone());
            }
            Some(PropertyValue::Files { files }) => {
                if let Some(url) = files.iter().find_map(|file| file.url()) {
                    return Some(url.to_string());
                }
            }
            _ => {}
        }
    }
    None
}

/// Render a date property start (date or datetime string) as `YYYY.MM.DD`,
/// falling back to the page's created time.
pub fn display_date(start: Option<&str>, fallback: DateTime<Utc>) -> String {
    if let Some(start) = start {
        let head = start.get(..10).unwrap_or(start);
        if let Ok(date) = NaiveDate::parse_from_str(head, "%Y-%m-%d") {
            return date.format("%Y.%m.%d").to_string();
        }
    }
    fallback.format("%Y.%m.%d").to_string()
}
