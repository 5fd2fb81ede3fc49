//! Timestamp strategy over separate before/after queries.

use std::future::Future;

use async_trait::async_trait;

use crate::strategy::{FetchOptions, FetchStrategy};
use crate::types::{Direction, Entry};

/// Strategy for time-ordered datasets where `before`/`after` are resolved
/// by key value rather than position (e.g., event logs keyed by instant).
///
/// Built from two async closures:
/// - `fetch_before(instant, limit)` — up to `limit` pairs strictly before
///   `instant`, the newest ones, handed over ascending (oldest first).
/// - `fetch_after(instant, limit)` — up to `limit` pairs strictly after
///   `instant` (`None` = from the dataset start), ascending.
///
/// The key space is not index-dense, so this strategy provides no
/// index mapping and range fills are rejected for cursors built on it.
pub struct TimestampStrategy<B, A, K> {
    fetch_before: B,
    fetch_after: A,
    initial: Option<K>,
}

impl<B, A, K> TimestampStrategy<B, A, K> {
    /// Creates a strategy that bootstraps from the dataset start.
    #[must_use]
    pub fn new(fetch_before: B, fetch_after: A) -> Self {
        Self {
            fetch_before,
            fetch_after,
            initial: None,
        }
    }

    /// Anchors `bootstrap` strictly after `instant` (commonly "now" to
    /// tail a live feed, or an event of interest to open a view around it).
    #[must_use]
    pub fn starting_at(mut self, instant: K) -> Self {
        self.initial = Some(instant);
        self
    }
}

#[async_trait]
impl<K, V, B, A, BFut, AFut> FetchStrategy<K, V> for TimestampStrategy<B, A, K>
where
    K: Ord + Clone + Send + Sync + 'static,
    V: Send + 'static,
    B: Fn(K, usize) -> BFut + Send + Sync,
    BFut: Future<Output = anyhow::Result<Vec<(K, V)>>> + Send,
    A: Fn(Option<K>, usize) -> AFut + Send + Sync,
    AFut: Future<Output = anyhow::Result<Vec<(K, V)>>> + Send,
{
    fn initial_key(&self) -> Option<K> {
        self.initial.clone()
    }

    async fn fetch(
        &self,
        cursor_key: Option<&K>,
        opts: &FetchOptions<K>,
    ) -> anyhow::Result<Vec<Entry<K, V>>> {
        let pairs = match opts.direction {
            Direction::Before => match cursor_key {
                // No anchor means nothing precedes the dataset start.
                None => return Ok(Vec::new()),
                Some(key) => (self.fetch_before)(key.clone(), opts.limit).await?,
            },
            Direction::After => (self.fetch_after)(cursor_key.cloned(), opts.limit).await?,
        };
        Ok(pairs
            .into_iter()
            .map(|(key, value)| Entry::new(key, value))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio_util::sync::CancellationToken;

    const BASE_MS: u64 = 1_700_000_000_000;

    fn event_times() -> Vec<u64> {
        (0..10).map(|i| BASE_MS + i * 1_000).collect()
    }

    fn strategy() -> impl FetchStrategy<u64, String> {
        let before_times = event_times();
        let after_times = event_times();
        TimestampStrategy::new(
            move |cutoff: u64, limit: usize| {
                let batch: Vec<(u64, String)> = before_times
                    .iter()
                    .filter(|&&ts| ts < cutoff)
                    .map(|&ts| (ts, format!("evt{}", (ts - BASE_MS) / 1_000)))
                    .collect();
                let skip = batch.len().saturating_sub(limit);
                std::future::ready(Ok::<_, anyhow::Error>(
                    batch.into_iter().skip(skip).collect(),
                ))
            },
            move |cutoff: Option<u64>, limit: usize| {
                let batch: Vec<(u64, String)> = after_times
                    .iter()
                    .filter(|&&ts| cutoff.is_none_or(|c| ts > c))
                    .take(limit)
                    .map(|&ts| (ts, format!("evt{}", (ts - BASE_MS) / 1_000)))
                    .collect();
                std::future::ready(Ok::<_, anyhow::Error>(batch))
            },
        )
    }

    fn opts(direction: Direction) -> FetchOptions<u64> {
        FetchOptions {
            direction,
            limit: 3,
            current_start_key: None,
            current_end_key: None,
            cancel: CancellationToken::new(),
        }
    }

    #[tokio::test]
    async fn after_without_anchor_starts_at_dataset_start() {
        let batch = strategy().fetch(None, &opts(Direction::After)).await.unwrap();
        let values: Vec<&str> = batch.iter().map(|e| e.value.as_str()).collect();
        assert_eq!(values, vec!["evt0", "evt1", "evt2"]);
    }

    #[tokio::test]
    async fn after_is_strictly_newer() {
        let times = event_times();
        let batch = strategy()
            .fetch(Some(&times[5]), &opts(Direction::After))
            .await
            .unwrap();
        let values: Vec<&str> = batch.iter().map(|e| e.value.as_str()).collect();
        assert_eq!(values, vec!["evt6", "evt7", "evt8"]);
    }

    #[tokio::test]
    async fn before_returns_newest_older_events_ascending() {
        let times = event_times();
        let batch = strategy()
            .fetch(Some(&times[6]), &opts(Direction::Before))
            .await
            .unwrap();
        let values: Vec<&str> = batch.iter().map(|e| e.value.as_str()).collect();
        assert_eq!(values, vec!["evt3", "evt4", "evt5"]);
    }

    #[tokio::test]
    async fn before_without_anchor_is_empty() {
        let batch = strategy()
            .fetch(None, &opts(Direction::Before))
            .await
            .unwrap();
        assert!(batch.is_empty());
    }

    #[test]
    fn no_index_mapping() {
        let s = strategy();
        assert_eq!(s.key_at(0), None);
        assert_eq!(s.index_of(&BASE_MS), None);
    }
}
