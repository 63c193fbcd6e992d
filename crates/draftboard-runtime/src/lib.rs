#![forbid(unsafe_code)]

//! Draftboard Runtime
//!
//! Stateful machinery wrapped around the pure snapshot values of
//! `draftboard-core`.
//!
//! # Key Components
//!
//! - [`DraftHistory`] - Bounded linear undo/redo stack with a cursor
//! - [`is_dirty`] - Dirty check against the persisted baseline
//! - [`reduce_drop`] - Turns a drag payload into a bucketed draft mutation
//! - [`Persist`] / [`WireEncode`] - Boundary to the external update operation
//! - [`DraftSession`] - Per-record state machine driven by [`DraftAction`]s
//! - [`DraftConfig`] - History bound, dirty mode, and save policy
//!
//! # How it fits in the system
//! A UI controller owns one [`DraftSession`]. Every user action computes a
//! new snapshot with a core operator and dispatches it; the session pushes
//! it onto history and answers `can_save`, `can_undo`, and `can_redo`.

pub mod config;
pub mod dirty;
pub mod drop_reducer;
pub mod history;
pub mod persist;
pub mod session;

pub use config::{DraftConfig, DraftConfigError, HistoryPolicyConfig, SavePolicy};
pub use dirty::{DirtyMode, is_dirty};
pub use drop_reducer::{DropReduction, reduce_drop};
pub use history::{DraftHistory, HistoryConfig};
pub use persist::{
    AccessScope, BucketAssignment, FieldGrant, Persist, PersistError, SaveTicket, WireEncode,
};
pub use session::{
    DraftAction, DraftSession, Phase, RecordId, SaveOutcome, SessionError, Transition,
};
