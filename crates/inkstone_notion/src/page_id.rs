//! Notion page id parsing and normalization.

use uuid::Uuid;

use crate::error::{NotionError, Result};

/// A validated Notion page identifier.
///
/// Held in canonical UUID form. The REST API wants the dashed rendering,
/// the legacy record map wants the dash-stripped one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PageId(Uuid);

impl PageId {
    /// Parse a page id from a raw UUID (dashed or not) or a Notion URL.
    pub fn parse(input: &str) -> Result<Self> {
        extract_uuid(input)
            .map(PageId)
            .ok_or_else(|| NotionError::InvalidPageId {
                input: input.to_string(),
            })
    }

    /// Dashed form, as the REST API expects.
    pub fn dashed(&self) -> String {
        self.0.hyphenated().to_string()
    }

    /// Dash-stripped form, as the legacy record map expects.
    pub fn compact(&self) -> String {
        self.0.simple().to_string()
    }
}

impl std::fmt::Display for PageId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.hyphenated())
    }
}

fn extract_uuid(input: &str) -> Option<Uuid> {
    let trimmed = input.trim();
    if let Ok(id) = Uuid::try_parse(trimmed) {
        return Some(id);
    }

    // URL or slugged-title form: take the last path segment before any query
    // string, strip dashes, and require a trailing run of 32 hex characters.
    let last_segment = trimmed
        .split(['?', '#'])
        .next()
        .unwrap_or(trimmed)
        .rsplit('/')
        .next()
        .unwrap_or(trimmed);

    let cleaned: Vec<char> = last_segment.chars().filter(|c| *c != '-').collect();
    if cleaned.len() < 32 {
        return None;
    }
    let tail: String = cleaned[cleaned.len() - 32..].iter().collect();
    if !tail.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }

    Uuid::try_parse(&format!(
        "{}-{}-{}-{}-{}",
        &tail[0..8],
        &tail[8..12],
        &tail[12..16],
        &tail[16..20],
        &tail[20..32]
    ))
    .ok()
}
