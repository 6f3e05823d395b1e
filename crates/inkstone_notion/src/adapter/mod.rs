//! Official-API to legacy record map adapter.
//!
//! [`NotionAdapter`] fetches a page through an injected [`NotionTransport`]
//! and reshapes it into the [`RecordMap`] the rendering component consumes.
//! [`CachedAdapter`] memoizes page fetches for a bounded window.

mod assemble;
mod fetch;
mod mapper;
mod richtext;

pub use fetch::FetchedBlock;
pub use mapper::map_block_type;
pub use richtext::{convert_rich_text, plain_text};

use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, warn};

use crate::cache::TtlCache;
use crate::client::NotionTransport;
use crate::error::Result;
use crate::page_id::PageId;
use crate::record::{
    compact_id, Record, RecordMap, SearchHighlight, SearchResultEntry, SearchResults, UserValue,
};

use fetch::TreeFetcher;

/// Default bound on concurrent child-subtree fetches.
const DEFAULT_CHILD_CONCURRENCY: usize = 6;

/// Adapter over an injected transport.
pub struct NotionAdapter {
    transport: Arc<dyn NotionTransport>,
    child_concurrency: usize,
}

impl NotionAdapter {
    pub fn new(transport: Arc<dyn NotionTransport>) -> Self {
        Self {
            transport,
            child_concurrency: DEFAULT_CHILD_CONCURRENCY,
        }
    }

    pub fn with_child_concurrency(mut self, limit: usize) -> Self {
        self.child_concurrency = limit.max(1);
        self
    }

    /// Fetch a page and assemble the legacy record map for it.
    ///
    /// Fails on an invalid id or when the page itself cannot be fetched;
    /// lost child subtrees degrade instead (logged, block left childless).
    pub async fn get_page(&self, page_id: &str) -> Result<RecordMap> {
        let id = PageId::parse(page_id)?;
        let dashed = id.dashed();

        let fetcher = TreeFetcher::new(self.transport.as_ref(), self.child_concurrency);
        let (page, blocks) = tokio::try_join!(
            self.transport.retrieve_page(&dashed),
            fetcher.fetch_tree(&dashed),
        )?;

        let lost = fetch::count_failed_subtrees(&blocks);
        if lost > 0 {
            warn!("page {} is missing {} child subtree(s)", dashed, lost);
        }

        let mut map = assemble::record_map(&page, &blocks);
        self.attach_users(&mut map, assemble::collect_user_ids(&page, &blocks))
            .await;
        Ok(map)
    }

    /// Resolve referenced user records best-effort; failures are logged and
    /// the user skipped.
    async fn attach_users(&self, map: &mut RecordMap, user_ids: BTreeSet<String>) {
        for user_id in user_ids {
            match self.transport.retrieve_user(&user_id).await {
                Ok(user) => {
                    let value = UserValue {
                        id: compact_id(&user.id),
                        version: 1,
                        given_name: user.name,
                        profile_photo: user.avatar_url,
                    };
                    map.notion_user.insert(value.id.clone(), Record::editor(value));
                }
                Err(e) => warn!("failed to fetch user {}: {}", user_id, e),
            }
        }
    }

    /// Search pages, shaping hits into the legacy result format.
    pub async fn search(&self, query: &str, limit: usize) -> Result<SearchResults> {
        let page = self.transport.search(query, limit).await?;

        let results: Vec<SearchResultEntry> = page
            .results
            .iter()
            .map(|hit| SearchResultEntry {
                id: compact_id(&hit.id),
                is_navigable: true,
                score: 1.0,
                highlight: SearchHighlight {
                    path_text: hit.url.clone().unwrap_or_default(),
                    text: search_text(hit),
                },
            })
            .collect();

        let total = results.len();
        Ok(SearchResults {
            record_map: RecordMap::default(),
            results,
            total,
        })
    }
}

fn search_text(hit: &crate::api::SearchHit) -> String {
    use crate::api::PropertyValue;
    for key in ["title", "Name"] {
        if let Some(PropertyValue::Title { title }) = hit.properties.get(key) {
            return plain_text(title);
        }
    }
    "Untitled".to_string()
}

/// Adapter wrapper memoizing page fetches for a bounded window, keyed by the
/// normalized page id.
pub struct CachedAdapter {
    inner: NotionAdapter,
    pages: TtlCache<String, Arc<RecordMap>>,
}

impl CachedAdapter {
    pub fn new(inner: NotionAdapter, ttl: Duration) -> Self {
        Self {
            inner,
            pages: TtlCache::new(ttl),
        }
    }

    pub async fn get_page(&self, page_id: &str) -> Result<Arc<RecordMap>> {
        let key = PageId::parse(page_id)?.compact();

        if let Some(hit) = self.pages.get(&key) {
            debug!("record map cache hit for {}", key);
            return Ok(hit);
        }

        let map = Arc::new(self.inner.get_page(page_id).await?);
        self.pages.insert(key, map.clone());
        Ok(map)
    }

    pub async fn search(&self, query: &str, limit: usize) -> Result<SearchResults> {
        self.inner.search(query, limit).await
    }

    pub fn inner(&self) -> &NotionAdapter {
        &self.inner
    }
}
