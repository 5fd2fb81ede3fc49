//! The windowed cursor engine.
//!
//! [`BufferedCursor`] maintains a capacity-bounded, ascending-ordered
//! window of entries over a much larger dataset and grows it forward or
//! backward on demand through a [`FetchStrategy`]. Loads deduplicate
//! overlapping batches, detect the dataset edges from short batches, and
//! hand the window to a [`TrimPolicy`] to enforce the capacity bound.
//!
//! # Locking
//!
//! Every mutating operation (`bootstrap`, `load_*`, `ensure_range`) holds
//! an async operation lock from before it reads state until after eviction,
//! so overlapping callers serialize in arrival order and at most one
//! mutation is in flight per cursor. Window state itself sits behind a
//! `parking_lot::Mutex` that is only taken for short, non-suspending
//! sections; read accessors take it directly and observe pre- or
//! post-operation state, never a partially applied batch.
//!
//! # Cancellation
//!
//! The token in [`CursorConfig::cancel`] is raced against every strategy
//! fetch. A cancelled load surfaces [`CursorError::Cancelled`] and leaves
//! the window, the boundary flags, and `window_start` untouched — batch
//! application is all-or-nothing.

use std::collections::VecDeque;

use tokio_util::sync::CancellationToken;

use crate::strategy::{FetchOptions, FetchStrategy};
use crate::trim::{DirectionalTrim, TrimParams, TrimPolicy};
use crate::types::{Direction, Entry};

/// Rounds of jump-plus-walk the range fill attempts before settling for
/// best effort. Breaks alignment stalemates where a capacity-sized window
/// cannot hold the requested span and the directional walks would
/// otherwise ping-pong.
const FILL_ROUNDS: usize = 4;

/// Errors returned by cursor operations.
#[derive(Debug, thiserror::Error)]
pub enum CursorError {
    /// The strategy's fetch failed. The window and boundary flags are
    /// unchanged.
    #[error("strategy fetch failed: {0}")]
    Fetch(#[from] anyhow::Error),
    /// `ensure_range` was called over a key space the strategy cannot
    /// address by index. No state change.
    #[error("range [{start}, {stop}] is outside the addressable index space")]
    InvalidRange {
        /// Normalized lower bound of the rejected range.
        start: u64,
        /// Normalized upper bound of the rejected range.
        stop: u64,
    },
    /// The cancellation token fired before the batch was applied. The
    /// window and boundary flags are unchanged.
    #[error("operation cancelled before the batch was applied")]
    Cancelled,
}

/// What a successful fetch does to the boundary flag of the opposite
/// direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BoundaryReset {
    /// Extending one direction clears the opposite flag: moving away from
    /// an edge invalidates a stale edge observation. The right choice for
    /// sources that may grow during a session.
    #[default]
    ClearOpposite,
    /// A confirmed boundary stays confirmed. Appropriate when the dataset
    /// is immutable for the lifetime of the cursor. Note the flags are
    /// plain booleans: a latched end flag keeps suppressing `load_after`
    /// even after eviction has slid the window away from that edge, so
    /// interactive back-and-forth scrolling wants [`ClearOpposite`].
    ///
    /// [`ClearOpposite`]: BoundaryReset::ClearOpposite
    Sticky,
}

/// Construction-time configuration for [`BufferedCursor`].
#[derive(Debug, Clone)]
pub struct CursorConfig {
    /// Number of entries requested per fetch (one page).
    pub page_size: usize,
    /// Number of pages retained in memory. Window capacity is
    /// `retention_pages * page_size`.
    pub retention_pages: usize,
    /// Boundary flag behavior on opposite-direction extension.
    pub boundary_reset: BoundaryReset,
    /// Token observed before applying every fetched batch. Cancel it to
    /// abandon in-flight loads without touching the window.
    pub cancel: CancellationToken,
}

impl Default for CursorConfig {
    fn default() -> Self {
        Self {
            page_size: 50,
            retention_pages: 2,
            boundary_reset: BoundaryReset::default(),
            cancel: CancellationToken::new(),
        }
    }
}

impl CursorConfig {
    /// Total number of entries the window may hold.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.retention_pages.max(1) * self.page_size
    }
}

/// Window state guarded by the cursor's state mutex.
struct WindowState<K, V> {
    window: VecDeque<Entry<K, V>>,
    reached_start: bool,
    reached_end: bool,
    window_start: u64,
}

impl<K: Ord, V> WindowState<K, V> {
    fn new() -> Self {
        Self {
            window: VecDeque::new(),
            reached_start: false,
            reached_end: false,
            window_start: 0,
        }
    }

    fn reset(&mut self) {
        self.window.clear();
        self.reached_start = false;
        self.reached_end = false;
        self.window_start = 0;
    }

    fn contains_key(&self, key: &K) -> bool {
        self.window.binary_search_by(|e| e.key.cmp(key)).is_ok()
    }

    /// Absolute index of the last entry; equals `window_start` when empty.
    fn window_end(&self) -> u64 {
        self.window_start + self.window.len().saturating_sub(1) as u64
    }
}

/// Compact view of the window bounds used by the range-fill loop to detect
/// coverage and progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct RangeSnapshot {
    window_start: u64,
    window_end: u64,
    len: usize,
    reached_start: bool,
    reached_end: bool,
}

impl RangeSnapshot {
    fn covers(&self, start: u64, stop: u64) -> bool {
        self.len > 0 && self.window_start <= start && stop <= self.window_end
    }
}

/// A bidirectional, memory-bounded pagination buffer.
///
/// Owns the in-memory window (ordered ascending by key, no duplicates),
/// the two boundary flags, and orchestrates all loads through the
/// configured [`FetchStrategy`] and [`TrimPolicy`].
pub struct BufferedCursor<K, V> {
    strategy: Box<dyn FetchStrategy<K, V>>,
    trim: Box<dyn TrimPolicy<K, V>>,
    config: CursorConfig,
    op_lock: tokio::sync::Mutex<()>,
    state: parking_lot::Mutex<WindowState<K, V>>,
}

impl<K, V> BufferedCursor<K, V>
where
    K: Ord + Clone + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    /// Creates a cursor with the default eviction policy
    /// ([`DirectionalTrim`]).
    #[must_use]
    pub fn new(strategy: impl FetchStrategy<K, V> + 'static, config: CursorConfig) -> Self {
        Self::with_trim(strategy, config, DirectionalTrim)
    }

    /// Creates a cursor with an explicit eviction policy.
    #[must_use]
    pub fn with_trim(
        strategy: impl FetchStrategy<K, V> + 'static,
        config: CursorConfig,
        trim: impl TrimPolicy<K, V> + 'static,
    ) -> Self {
        Self {
            strategy: Box::new(strategy),
            trim: Box::new(trim),
            config,
            op_lock: tokio::sync::Mutex::new(()),
            state: parking_lot::Mutex::new(WindowState::new()),
        }
    }

    /// The configuration this cursor was built with.
    #[must_use]
    pub fn config(&self) -> &CursorConfig {
        &self.config
    }

    /// Seeds the window from the strategy's initial key (or the dataset
    /// start) in the `after` direction.
    ///
    /// A strategy returning zero items leaves the window empty without an
    /// error. Re-invocation resets the window and boundary flags.
    ///
    /// # Errors
    ///
    /// [`CursorError::Fetch`] if the strategy fetch fails,
    /// [`CursorError::Cancelled`] if the cancellation token fires first.
    pub async fn bootstrap(&self) -> Result<(), CursorError> {
        let _op = self.op_lock.lock().await;
        self.state.lock().reset();
        let anchor = self.strategy.initial_key();
        self.load_locked(Direction::After, anchor).await?;
        // Re-anchor the absolute start from the strategy's index mapping;
        // arithmetic takes over from here.
        let mut state = self.state.lock();
        let anchored = state
            .window
            .front()
            .and_then(|e| self.strategy.index_of(&e.key));
        if let Some(index) = anchored {
            state.window_start = index;
        }
        Ok(())
    }

    /// Extends the window by one page toward smaller keys, using the
    /// current front key as the cursor.
    ///
    /// No-op once the start of the dataset has been observed.
    ///
    /// # Errors
    ///
    /// [`CursorError::Fetch`] if the strategy fetch fails,
    /// [`CursorError::Cancelled`] if the cancellation token fires first.
    pub async fn load_before(&self) -> Result<(), CursorError> {
        let _op = self.op_lock.lock().await;
        let key = self.front_key();
        self.load_locked(Direction::Before, key).await
    }

    /// Extends the window by one page toward smaller keys from an explicit
    /// cursor key.
    ///
    /// # Errors
    ///
    /// Same as [`load_before`](Self::load_before).
    pub async fn load_before_from(&self, key: K) -> Result<(), CursorError> {
        let _op = self.op_lock.lock().await;
        self.load_locked(Direction::Before, Some(key)).await
    }

    /// Extends the window by one page toward larger keys, using the
    /// current back key as the cursor.
    ///
    /// No-op once the end of the dataset has been observed.
    ///
    /// # Errors
    ///
    /// [`CursorError::Fetch`] if the strategy fetch fails,
    /// [`CursorError::Cancelled`] if the cancellation token fires first.
    pub async fn load_after(&self) -> Result<(), CursorError> {
        let _op = self.op_lock.lock().await;
        let key = self.back_key();
        self.load_locked(Direction::After, key).await
    }

    /// Extends the window by one page toward larger keys from an explicit
    /// cursor key.
    ///
    /// # Errors
    ///
    /// Same as [`load_after`](Self::load_after).
    pub async fn load_after_from(&self, key: K) -> Result<(), CursorError> {
        let _op = self.op_lock.lock().await;
        self.load_locked(Direction::After, Some(key)).await
    }

    /// Guarantees, best-effort, that every absolute index in
    /// `[start, stop]` is present in the window afterwards.
    ///
    /// Reversed bounds are normalized. Already-covered ranges return
    /// without issuing any fetch, so the operation is idempotent. Gaps
    /// adjacent to the window are closed by incremental loads; a range
    /// disjoint from the window by more than one page is served by a
    /// single fetch anchored at the page containing `start`, sacrificing
    /// contiguity with the previous window contents. Returns early when a
    /// dataset boundary makes the remainder unreachable.
    ///
    /// # Errors
    ///
    /// [`CursorError::InvalidRange`] when the strategy has no index
    /// mapping (e.g., timestamp keys); fetch errors and cancellation as
    /// for the load operations.
    pub async fn ensure_range(&self, start: u64, stop: u64) -> Result<(), CursorError> {
        let _op = self.op_lock.lock().await;
        let (start, stop) = if start <= stop {
            (start, stop)
        } else {
            (stop, start)
        };
        if self.strategy.key_at(start).is_none() {
            return Err(CursorError::InvalidRange { start, stop });
        }
        let page = self.config.page_size as u64;

        for _ in 0..FILL_ROUNDS {
            let before = self.range_snapshot();
            if before.covers(start, stop) {
                return Ok(());
            }

            let disjoint = before.len == 0
                || start > before.window_end + page
                || stop + page < before.window_start;
            if disjoint {
                self.jump_to(start).await?;
                if self.range_snapshot() == before {
                    break;
                }
                continue;
            }

            // Close the gap ahead, then the gap behind.
            loop {
                let snap = self.range_snapshot();
                if snap.window_end >= stop || snap.reached_end {
                    break;
                }
                let key = self.back_key();
                self.load_locked(Direction::After, key).await?;
                if self.range_snapshot() == snap {
                    break;
                }
            }
            loop {
                let snap = self.range_snapshot();
                if snap.window_start <= start || snap.reached_start {
                    break;
                }
                let key = self.front_key();
                self.load_locked(Direction::Before, key).await?;
                if self.range_snapshot() == snap {
                    break;
                }
            }

            if self.range_snapshot() == before {
                break;
            }
        }
        Ok(())
    }

    /// Point lookup by key; `None` means "not loaded", not an error.
    #[must_use]
    pub fn get_item(&self, key: &K) -> Option<Entry<K, V>> {
        let state = self.state.lock();
        state
            .window
            .binary_search_by(|e| e.key.cmp(key))
            .ok()
            .map(|i| state.window[i].clone())
    }

    /// Whether `key` is currently present in the window.
    #[must_use]
    pub fn is_key_loaded(&self, key: &K) -> bool {
        self.state.lock().contains_key(key)
    }

    /// Lookup by absolute index through `window_start`, for renderers that
    /// address rows by position.
    #[must_use]
    pub fn entry_at(&self, index: u64) -> Option<Entry<K, V>> {
        let state = self.state.lock();
        let offset = index.checked_sub(state.window_start)?;
        usize::try_from(offset)
            .ok()
            .and_then(|i| state.window.get(i).cloned())
    }

    /// Owned snapshot of the window, ascending by key.
    #[must_use]
    pub fn snapshot(&self) -> Vec<Entry<K, V>> {
        self.state.lock().window.iter().cloned().collect()
    }

    /// Whether a fetch toward smaller keys has observed the dataset start.
    #[must_use]
    pub fn is_at_start(&self) -> bool {
        self.state.lock().reached_start
    }

    /// Whether a fetch toward larger keys has observed the dataset end.
    #[must_use]
    pub fn is_at_end(&self) -> bool {
        self.state.lock().reached_end
    }

    /// Absolute index of the first window entry (index-addressable
    /// strategies).
    #[must_use]
    pub fn window_start(&self) -> u64 {
        self.state.lock().window_start
    }

    /// Absolute index of the last window entry; equals
    /// [`window_start`](Self::window_start) when the window is empty.
    #[must_use]
    pub fn window_end(&self) -> u64 {
        self.state.lock().window_end()
    }

    /// Number of entries currently held.
    #[must_use]
    pub fn len(&self) -> usize {
        self.state.lock().window.len()
    }

    /// Whether the window holds no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.state.lock().window.is_empty()
    }

    fn front_key(&self) -> Option<K> {
        self.state.lock().window.front().map(|e| e.key.clone())
    }

    fn back_key(&self) -> Option<K> {
        self.state.lock().window.back().map(|e| e.key.clone())
    }

    fn range_snapshot(&self) -> RangeSnapshot {
        let state = self.state.lock();
        RangeSnapshot {
            window_start: state.window_start,
            window_end: state.window_end(),
            len: state.window.len(),
            reached_start: state.reached_start,
            reached_end: state.reached_end,
        }
    }

    /// One fetch of one page in `direction`, applied atomically. Caller
    /// must hold the operation lock.
    async fn load_locked(
        &self,
        direction: Direction,
        cursor_key: Option<K>,
    ) -> Result<(), CursorError> {
        let (bounded, current_start_key, current_end_key) = {
            let state = self.state.lock();
            let bounded = match direction {
                Direction::Before => state.reached_start,
                Direction::After => state.reached_end,
            };
            (
                bounded,
                state.window.front().map(|e| e.key.clone()),
                state.window.back().map(|e| e.key.clone()),
            )
        };
        if bounded {
            tracing::trace!(?direction, "load skipped: dataset edge already observed");
            return Ok(());
        }

        let opts = FetchOptions {
            direction,
            limit: self.config.page_size,
            current_start_key,
            current_end_key,
            cancel: self.config.cancel.clone(),
        };
        let batch = self.fetch_guarded(cursor_key.as_ref(), &opts).await?;
        self.apply_batch(direction, batch);
        Ok(())
    }

    /// Races the strategy fetch against the cancellation token.
    async fn fetch_guarded(
        &self,
        cursor_key: Option<&K>,
        opts: &FetchOptions<K>,
    ) -> Result<Vec<Entry<K, V>>, CursorError> {
        let batch = tokio::select! {
            res = self.strategy.fetch(cursor_key, opts) => res?,
            () = self.config.cancel.cancelled() => return Err(CursorError::Cancelled),
        };
        if self.config.cancel.is_cancelled() {
            return Err(CursorError::Cancelled);
        }
        Ok(batch)
    }

    /// Applies a fetched batch: boundary bookkeeping on the raw size,
    /// dedup, insertion at the correct end, trim, `window_start` upkeep.
    fn apply_batch(&self, direction: Direction, batch: Vec<Entry<K, V>>) {
        let raw_len = batch.len();
        let page_size = self.config.page_size;
        let mut state = self.state.lock();

        if self.config.boundary_reset == BoundaryReset::ClearOpposite {
            match direction {
                Direction::After => state.reached_start = false,
                Direction::Before => state.reached_end = false,
            }
        }
        // The raw size is the boundary signal; duplicates removed below do
        // not count against it.
        if raw_len < page_size {
            match direction {
                Direction::Before => state.reached_start = true,
                Direction::After => state.reached_end = true,
            }
        }

        let mut inserted = 0usize;
        match direction {
            Direction::After => {
                for entry in batch {
                    if state.contains_key(&entry.key) {
                        continue;
                    }
                    debug_assert!(state.window.back().is_none_or(|b| b.key < entry.key));
                    state.window.push_back(entry);
                    inserted += 1;
                }
            }
            Direction::Before => {
                for entry in batch.into_iter().rev() {
                    if state.contains_key(&entry.key) {
                        continue;
                    }
                    debug_assert!(state.window.front().is_none_or(|f| entry.key < f.key));
                    state.window.push_front(entry);
                    inserted += 1;
                }
                state.window_start = state.window_start.saturating_sub(inserted as u64);
            }
        }

        let params = TrimParams {
            capacity: self.config.capacity(),
            page_size,
            fresh: inserted,
        };
        let report = self.trim.trim(&mut state.window, direction, &params);
        state.window_start += report.dropped_front as u64;

        tracing::debug!(
            ?direction,
            raw_len,
            inserted,
            dropped_front = report.dropped_front,
            dropped_back = report.dropped_back,
            window_len = state.window.len(),
            window_start = state.window_start,
            "batch applied"
        );
    }

    /// Single fetch anchored at the page containing `start`, replacing the
    /// window. Caller must hold the operation lock.
    async fn jump_to(&self, start: u64) -> Result<(), CursorError> {
        let page = self.config.page_size as u64;
        let anchor = (start / page) * page;
        let cursor_key = if anchor == 0 {
            None
        } else {
            self.strategy.key_at(anchor - 1)
        };
        let opts = FetchOptions {
            direction: Direction::After,
            limit: self.config.page_size,
            current_start_key: None,
            current_end_key: None,
            cancel: self.config.cancel.clone(),
        };
        let batch = self.fetch_guarded(cursor_key.as_ref(), &opts).await?;
        if batch.is_empty() {
            tracing::debug!(anchor, "jump fetch returned no entries; window left unchanged");
            return Ok(());
        }

        let raw_len = batch.len();
        let mut state = self.state.lock();
        state.window.clear();
        state.reached_start = false;
        state.reached_end = raw_len < self.config.page_size;
        state.window.extend(batch);
        state.window_start = state
            .window
            .front()
            .and_then(|e| self.strategy.index_of(&e.key))
            .unwrap_or(anchor);
        tracing::debug!(
            anchor,
            raw_len,
            window_start = state.window_start,
            "window re-anchored by jump"
        );
        Ok(())
    }
}
