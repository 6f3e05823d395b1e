//! Recursive page tree fetching: cursor pagination plus bounded fan-out.

use futures::future::BoxFuture;
use futures::stream::{self, StreamExt};
use tracing::warn;

use crate::api::ExternalBlock;
use crate::client::NotionTransport;
use crate::error::Result;

/// One fetched block with its resolved subtree.
#[derive(Debug, Clone)]
pub struct FetchedBlock {
    pub block: ExternalBlock,
    /// Nested blocks, populated when `has_children` and the fetch succeeded.
    pub children: Vec<FetchedBlock>,
    /// Set when a children fetch failed and the subtree was dropped. The
    /// record map cannot express the distinction, but callers can read it.
    pub children_failed: bool,
}

/// Count of blocks whose subtree was dropped by a failed children fetch.
pub(crate) fn count_failed_subtrees(blocks: &[FetchedBlock]) -> usize {
    blocks
        .iter()
        .map(|b| usize::from(b.children_failed) + count_failed_subtrees(&b.children))
        .sum()
}

pub(crate) struct TreeFetcher<'a> {
    transport: &'a dyn NotionTransport,
    concurrency: usize,
}

impl<'a> TreeFetcher<'a> {
    pub fn new(transport: &'a dyn NotionTransport, concurrency: usize) -> Self {
        Self {
            transport,
            concurrency: concurrency.max(1),
        }
    }

    /// Fetch the complete block tree under `parent_id`.
    ///
    /// All pages of the children listing are drained first; nested subtrees
    /// are then fetched concurrently (bounded), preserving sibling order so
    /// `content` lists stay in document order.
    pub fn fetch_tree(&self, parent_id: &str) -> BoxFuture<'_, Result<Vec<FetchedBlock>>> {
        let parent_id = parent_id.to_string();
        Box::pin(async move {
            let blocks = self.fetch_all_pages(&parent_id).await?;

            let fetched = stream::iter(blocks)
                .map(|block| self.resolve_children(block))
                .buffered(self.concurrency)
                .collect::<Vec<_>>()
                .await;

            Ok(fetched)
        })
    }

    async fn fetch_all_pages(&self, parent_id: &str) -> Result<Vec<ExternalBlock>> {
        let mut all = Vec::new();
        let mut cursor: Option<String> = None;

        loop {
            let page = self
                .transport
                .list_block_children(parent_id, cursor.as_deref())
                .await?;
            all.extend(page.results);

            match (page.has_more, page.next_cursor) {
                (true, Some(next)) => cursor = Some(next),
                _ => break,
            }
        }

        Ok(all)
    }

    /// Attach the subtree of one block. A failed child fetch degrades to a
    /// childless block rather than failing the whole page.
    async fn resolve_children(&self, block: ExternalBlock) -> FetchedBlock {
        if !block.has_children {
            return FetchedBlock {
                block,
                children: Vec::new(),
                children_failed: false,
            };
        }

        match self.fetch_tree(&block.id).await {
            Ok(children) => FetchedBlock {
                block,
                children,
                children_failed: false,
            },
            Err(e) => {
                warn!("failed to fetch children of block {}: {}", block.id, e);
                FetchedBlock {
                    block,
                    children: Vec::new(),
                    children_failed: true,
                }
            }
        }
    }
}
