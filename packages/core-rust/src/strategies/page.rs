//! Page-number strategy over a `(page, size)` loader.

use std::future::Future;

use async_trait::async_trait;

use crate::strategy::{FetchOptions, FetchStrategy};
use crate::types::{Direction, Entry};

/// Strategy for page-served datasets: the loader fetches whole pages by
/// number and the cursor sees absolute keys `page * size + offset`.
///
/// Fetches are page-granular. A cursor key in the middle of a page maps to
/// the adjacent page; overlapping entries at the page seam are expected
/// and removed by the cursor's dedup pass.
pub struct PageStrategy<F> {
    fetch_page: F,
    initial_index: Option<u64>,
}

impl<F> PageStrategy<F> {
    /// Creates a strategy that bootstraps from page 0.
    #[must_use]
    pub fn new(fetch_page: F) -> Self {
        Self {
            fetch_page,
            initial_index: None,
        }
    }

    /// Anchors `bootstrap` after the absolute position `index`.
    #[must_use]
    pub fn starting_after(mut self, index: u64) -> Self {
        self.initial_index = Some(index);
        self
    }
}

#[async_trait]
impl<V, F, Fut> FetchStrategy<u64, V> for PageStrategy<F>
where
    V: Send + 'static,
    F: Fn(u64, usize) -> Fut + Send + Sync,
    Fut: Future<Output = anyhow::Result<Vec<V>>> + Send,
{
    fn initial_key(&self) -> Option<u64> {
        self.initial_index
    }

    async fn fetch(
        &self,
        cursor_key: Option<&u64>,
        opts: &FetchOptions<u64>,
    ) -> anyhow::Result<Vec<Entry<u64, V>>> {
        let limit = opts.limit as u64;
        let page = match (cursor_key, opts.direction) {
            (None, Direction::After) => 0,
            // Nothing precedes page 0.
            (None | Some(&0), Direction::Before) => return Ok(Vec::new()),
            (Some(&key), Direction::After) => key / limit + 1,
            (Some(&key), Direction::Before) => (key / limit).saturating_sub(1),
        };
        let values = (self.fetch_page)(page, opts.limit).await?;
        Ok(values
            .into_iter()
            .enumerate()
            .map(|(i, value)| Entry::new(page * limit + i as u64, value))
            .collect())
    }

    fn index_of(&self, key: &u64) -> Option<u64> {
        Some(*key)
    }

    fn key_at(&self, index: u64) -> Option<u64> {
        Some(index)
    }
}
