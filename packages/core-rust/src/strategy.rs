//! The pluggable fetch contract between the cursor and a data source.
//!
//! A [`FetchStrategy`] knows how to fetch a batch of entries adjacent to a
//! given key, in a given direction. Concrete adapters for index-, page-,
//! and timestamp-keyed sources live in [`crate::strategies`]; the cursor
//! itself never depends on a particular key space.

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::types::{Direction, Entry};

/// Options passed to every [`FetchStrategy::fetch`] call.
#[derive(Debug, Clone)]
pub struct FetchOptions<K> {
    /// Which side of the cursor key to fetch.
    pub direction: Direction,
    /// Number of entries requested. Returning fewer signals the dataset edge.
    pub limit: usize,
    /// Key of the first entry currently in the window, if any.
    pub current_start_key: Option<K>,
    /// Key of the last entry currently in the window, if any.
    pub current_end_key: Option<K>,
    /// Cooperative cancellation. A fetch observing cancellation may return
    /// early with any result; the cursor discards the batch without
    /// touching its state.
    pub cancel: CancellationToken,
}

/// A pluggable policy translating an opaque cursor key into source-specific
/// fetch parameters.
///
/// # Contract
///
/// - `direction == After`: returned keys are strictly greater than
///   `cursor_key` (or start from the beginning of the dataset when
///   `cursor_key` is `None`), sorted ascending.
/// - `direction == Before`: returned keys are strictly less than
///   `cursor_key`, handed over sorted ascending (oldest first). Reordering
///   from a descending wire format is the strategy's responsibility.
/// - Return fewer than `opts.limit` entries if and only if the
///   corresponding end of the dataset has been reached. This is the sole
///   boundary signal the cursor uses: a transient short page latches the
///   boundary flag until a successful fetch in the opposite direction
///   clears it (never, under [`BoundaryReset::Sticky`]).
///
/// Implementations may hold their own state (a network client, a database
/// handle) but must not assume any call ordering beyond the per-cursor
/// serialization the engine guarantees. Fetches issued by independent
/// cursor instances may run in parallel; nothing is shared between them.
///
/// [`BoundaryReset::Sticky`]: crate::cursor::BoundaryReset::Sticky
#[async_trait]
pub trait FetchStrategy<K, V>: Send + Sync {
    /// Key to anchor [`bootstrap`](crate::BufferedCursor::bootstrap) on.
    ///
    /// `None` means dataset start for the `after` direction and
    /// nothing-before for the `before` direction. Entries returned by the
    /// bootstrap fetch are strictly greater than this key.
    fn initial_key(&self) -> Option<K> {
        None
    }

    /// Fetches up to `opts.limit` entries adjacent to `cursor_key`.
    async fn fetch(
        &self,
        cursor_key: Option<&K>,
        opts: &FetchOptions<K>,
    ) -> anyhow::Result<Vec<Entry<K, V>>>;

    /// Absolute index of `key` in the dataset, for index-addressable key
    /// spaces. `None` (the default) when the key space is not index-dense.
    fn index_of(&self, key: &K) -> Option<u64> {
        let _ = key;
        None
    }

    /// Key occupying absolute position `index`, for index-addressable key
    /// spaces.
    ///
    /// Required by [`ensure_range`](crate::BufferedCursor::ensure_range);
    /// strategies returning `None` (the default) reject range fills.
    fn key_at(&self, index: u64) -> Option<K> {
        let _ = index;
        None
    }
}
