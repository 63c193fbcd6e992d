#![forbid(unsafe_code)]

//! Dirty check: does the current draft differ from the persisted baseline?
//!
//! Two modes exist because "unsaved" has two reasonable readings once undo
//! is involved:
//!
//! - [`DirtyMode::Content`] compares content only. Undoing back to the
//!   baseline makes the draft clean again without a save.
//! - [`DirtyMode::CursorOrContent`] also treats a cursor that is not at the
//!   newest snapshot as dirty, so any pending redo keeps Save enabled.

use serde::{Deserialize, Serialize};

use draftboard_core::SnapshotEq;

use crate::history::DraftHistory;

/// Rule used to derive the dirty flag.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DirtyMode {
    /// Dirty iff current content differs from the baseline.
    #[default]
    Content,
    /// Dirty iff the cursor is not at the newest snapshot, or content differs.
    CursorOrContent,
}

/// Derive the dirty flag of `history`.
#[must_use]
pub fn is_dirty<T: SnapshotEq>(history: &DraftHistory<T>, mode: DirtyMode) -> bool {
    let content_differs = !history.current().snapshot_eq(history.baseline());
    match mode {
        DirtyMode::Content => content_differs,
        DirtyMode::CursorOrContent => history.can_redo() || content_differs,
    }
}
