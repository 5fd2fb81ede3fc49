//! Absolute-index strategy over a contiguous range loader.

use std::future::Future;

use async_trait::async_trait;

use crate::strategy::{FetchOptions, FetchStrategy};
use crate::types::{Direction, Entry};

/// Strategy for index-dense datasets: keys are absolute `u64` positions
/// and the loader fetches a contiguous `[start, start + count)` slice.
///
/// The loader is an async closure `(start, count) -> Result<Vec<V>>`; it
/// must return fewer than `count` values only when the dataset ends inside
/// the requested slice.
pub struct IndexStrategy<F> {
    fetch_range: F,
    initial_index: Option<u64>,
}

impl<F> IndexStrategy<F> {
    /// Creates a strategy that bootstraps from the dataset start.
    #[must_use]
    pub fn new(fetch_range: F) -> Self {
        Self {
            fetch_range,
            initial_index: None,
        }
    }

    /// Anchors `bootstrap` after `index`: the first loaded entry is
    /// `index + 1`, matching the strictly-after fetch contract.
    #[must_use]
    pub fn starting_after(mut self, index: u64) -> Self {
        self.initial_index = Some(index);
        self
    }
}

#[async_trait]
impl<V, F, Fut> FetchStrategy<u64, V> for IndexStrategy<F>
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
        let start = match (cursor_key, opts.direction) {
            (None, Direction::After) => 0,
            // Nothing precedes index 0.
            (None | Some(&0), Direction::Before) => return Ok(Vec::new()),
            (Some(&key), Direction::After) => key + 1,
            (Some(&key), Direction::Before) => key.saturating_sub(limit),
        };
        let count = match opts.direction {
            Direction::After => opts.limit,
            // Clamped at the dataset start, so a partial leading page
            // reports its true (short) size.
            Direction::Before => {
                usize::try_from(cursor_key.copied().unwrap_or(0) - start).unwrap_or(opts.limit)
            }
        };
        let values = (self.fetch_range)(start, count).await?;
        Ok(values
            .into_iter()
            .enumerate()
            .map(|(i, value)| Entry::new(start + i as u64, value))
            .collect())
    }

    fn index_of(&self, key: &u64) -> Option<u64> {
        Some(*key)
    }

    fn key_at(&self, index: u64) -> Option<u64> {
        Some(index)
    }
}
