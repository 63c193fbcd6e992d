#![forbid(unsafe_code)]

//! Core: draft snapshot values, selection operators, and drag payloads.
//!
//! # Role in Draftboard
//! `draftboard-core` is the value layer. Every type here is an immutable
//! snapshot or a pure operator producing a new snapshot from an old one.
//! Nothing in this crate owns history, logs, or talks to a backend.
//!
//! # Primary responsibilities
//! - **Equality**: deep, content-based comparison of snapshots ([`equality`]).
//! - **Flat drafts**: entity/field pickers ([`selection`]).
//! - **Bucketed drafts**: items grouped under fixed tiers ([`bucket`]).
//! - **Drag payloads**: typed parsing of transfer data ([`drag`]).
//!
//! # How it fits in the system
//! The runtime (`draftboard-runtime`) stores these snapshots in a bounded
//! history, derives the dirty flag from [`SnapshotEq`], and hands the current
//! snapshot to the persistence boundary.

pub mod bucket;
pub mod drag;
pub mod equality;
pub mod selection;

pub use bucket::{BucketItem, Buckets, ItemDescriptor, Tier};
pub use drag::{DropZoneTracker, TransferError, TransferParse, TransferPayload, parse_transfer};
pub use equality::SnapshotEq;
pub use selection::FieldSelection;
