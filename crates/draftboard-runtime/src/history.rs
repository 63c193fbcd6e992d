#![forbid(unsafe_code)]

//! Linear undo/redo history of immutable draft snapshots.
//!
//! [`DraftHistory`] stores every version of a draft as an [`Arc`] and marks
//! the current one with a cursor. Snapshot 0 is the baseline (the last
//! persisted state).
//!
//! # Architecture
//!
//! ```text
//! push(s3)
//! ┌──────────────────────────────────────────────┐
//! │ Snapshots: [base, s1, s2, s3]                 │
//! │ Cursor:                    ^                  │
//! └──────────────────────────────────────────────┘
//!
//! undo() x2
//! ┌──────────────────────────────────────────────┐
//! │ Snapshots: [base, s1, s2, s3]                 │
//! │ Cursor:           ^                           │
//! └──────────────────────────────────────────────┘
//!
//! push(s4): truncates the undone branch
//! ┌──────────────────────────────────────────────┐
//! │ Snapshots: [base, s1, s4]                     │
//! │ Cursor:               ^                       │
//! └──────────────────────────────────────────────┘
//! ```
//!
//! # Invariants
//!
//! 1. The history is never empty: `0 <= cursor < len`.
//! 2. `len <= max(config.max_depth, 2)` after any operation.
//! 3. Eviction never removes the baseline; the oldest intermediate
//!    snapshot (index 1) goes first.
//! 4. No operation mutates a stored snapshot.

use std::collections::VecDeque;
use std::fmt;
use std::sync::Arc;

use draftboard_core::SnapshotEq;

use crate::dirty::{DirtyMode, is_dirty};

/// Smallest bound that can hold a baseline and one edit.
pub const MIN_DEPTH: usize = 2;

/// Configuration for a draft history.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryConfig {
    /// Maximum number of snapshots retained, baseline included.
    /// Values below [`MIN_DEPTH`] behave as [`MIN_DEPTH`].
    pub max_depth: usize,
    /// How [`DraftHistory::is_dirty`] decides.
    pub dirty_mode: DirtyMode,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            max_depth: 100,
            dirty_mode: DirtyMode::default(),
        }
    }
}

impl HistoryConfig {
    /// Create a configuration with the given depth limit.
    #[must_use]
    pub fn new(max_depth: usize) -> Self {
        Self {
            max_depth,
            ..Self::default()
        }
    }

    /// Create an unlimited configuration (for testing).
    #[must_use]
    pub fn unlimited() -> Self {
        Self::new(usize::MAX)
    }

    /// Set the dirty mode.
    #[must_use]
    pub fn with_dirty_mode(mut self, mode: DirtyMode) -> Self {
        self.dirty_mode = mode;
        self
    }

    fn effective_depth(&self) -> usize {
        self.max_depth.max(MIN_DEPTH)
    }
}

/// Cursor-based snapshot history for one draft.
pub struct DraftHistory<T> {
    snapshots: VecDeque<Arc<T>>,
    cursor: usize,
    config: HistoryConfig,
}

impl<T> Clone for DraftHistory<T> {
    fn clone(&self) -> Self {
        Self {
            snapshots: self.snapshots.clone(),
            cursor: self.cursor,
            config: self.config.clone(),
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for DraftHistory<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DraftHistory")
            .field("len", &self.snapshots.len())
            .field("cursor", &self.cursor)
            .field("config", &self.config)
            .finish()
    }
}

impl<T> DraftHistory<T> {
    /// Seed a history with its baseline.
    #[must_use]
    pub fn new(baseline: T, config: HistoryConfig) -> Self {
        Self::from_arc(Arc::new(baseline), config)
    }

    /// Seed a history with an already shared baseline.
    #[must_use]
    pub fn from_arc(baseline: Arc<T>, config: HistoryConfig) -> Self {
        let mut snapshots = VecDeque::new();
        snapshots.push_back(baseline);
        Self {
            snapshots,
            cursor: 0,
            config,
        }
    }

    /// Seed a history with the default configuration.
    #[must_use]
    pub fn with_default_config(baseline: T) -> Self {
        Self::new(baseline, HistoryConfig::default())
    }

    // ====================================================================
    // Core Operations
    // ====================================================================

    /// Record a new current snapshot, discarding any undone branch.
    pub fn push(&mut self, snapshot: T) {
        self.push_arc(Arc::new(snapshot));
    }

    /// Push a pre-wrapped `Arc<T>` snapshot.
    pub fn push_arc(&mut self, snapshot: Arc<T>) {
        self.snapshots.truncate(self.cursor + 1);
        self.snapshots.push_back(snapshot);
        self.cursor = self.snapshots.len() - 1;
        self.enforce_depth();
        tracing::trace!(
            target: "draftboard.history",
            len = self.snapshots.len(),
            cursor = self.cursor,
            "snapshot pushed"
        );
    }

    /// Step back one snapshot.
    ///
    /// Returns the new current snapshot, or `None` at the baseline.
    pub fn undo(&mut self) -> Option<Arc<T>> {
        if self.cursor == 0 {
            return None;
        }
        self.cursor -= 1;
        Some(Arc::clone(&self.snapshots[self.cursor]))
    }

    /// Step forward one snapshot.
    ///
    /// Returns the new current snapshot, or `None` at the newest snapshot.
    pub fn redo(&mut self) -> Option<Arc<T>> {
        if self.cursor + 1 >= self.snapshots.len() {
            return None;
        }
        self.cursor += 1;
        Some(Arc::clone(&self.snapshots[self.cursor]))
    }

    /// Collapse the history to a single baseline.
    pub fn reset(&mut self, snapshot: T) {
        self.reset_arc(Arc::new(snapshot));
    }

    /// Collapse the history to a single, already shared baseline.
    pub fn reset_arc(&mut self, snapshot: Arc<T>) {
        self.snapshots.clear();
        self.snapshots.push_back(snapshot);
        self.cursor = 0;
        tracing::trace!(target: "draftboard.history", "history reset to baseline");
    }

    /// The snapshot under the cursor.
    #[must_use]
    pub fn current(&self) -> &Arc<T> {
        &self.snapshots[self.cursor]
    }

    /// Snapshot 0, the last persisted state.
    #[must_use]
    pub fn baseline(&self) -> &Arc<T> {
        &self.snapshots[0]
    }

    /// Snapshot at `index`, oldest first.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Arc<T>> {
        self.snapshots.get(index)
    }

    // ====================================================================
    // Query
    // ====================================================================

    #[must_use]
    pub fn can_undo(&self) -> bool {
        self.cursor > 0
    }

    #[must_use]
    pub fn can_redo(&self) -> bool {
        self.cursor + 1 < self.snapshots.len()
    }

    /// Number of stored snapshots, baseline included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    /// Always `false`; kept for API symmetry with `len`.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    #[must_use]
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Snapshots ahead of the cursor.
    #[must_use]
    pub fn redo_depth(&self) -> usize {
        self.snapshots.len() - 1 - self.cursor
    }

    #[must_use]
    pub fn config(&self) -> &HistoryConfig {
        &self.config
    }

    // ====================================================================
    // Maintenance
    // ====================================================================

    /// Enforce the depth limit by evicting the oldest non-baseline snapshots.
    fn enforce_depth(&mut self) {
        let limit = self.config.effective_depth();
        let mut evicted = 0usize;
        while self.snapshots.len() > limit {
            self.snapshots.remove(1);
            self.cursor -= 1;
            evicted += 1;
        }
        if evicted > 0 {
            tracing::debug!(
                target: "draftboard.history",
                evicted,
                max_depth = limit,
                "history depth limit reached"
            );
        }
    }
}

impl<T: SnapshotEq> DraftHistory<T> {
    /// Whether unsaved changes exist, per the configured [`DirtyMode`].
    #[must_use]
    pub fn is_dirty(&self) -> bool {
        is_dirty(self, self.config.dirty_mode)
    }
}

// ============================================================================
// Tests
// ============================================================================
