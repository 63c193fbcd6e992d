#![forbid(unsafe_code)]

//! Draftboard public facade crate.
//!
//! Re-exports the snapshot values of `draftboard-core` and the session
//! machinery of `draftboard-runtime`, plus a single [`Error`] type for
//! applications that drive a draft editor end to end.
//!
//! ```rust,ignore
//! use draftboard::prelude::*;
//!
//! let mut session = DraftSession::<Buckets>::new(DraftConfig::default());
//! session.load(17u64, Buckets::new());
//! session.drop_into(Tier::Rare, Some(payload))?;
//! session.save_with(&mut backend)?;
//! ```

use std::fmt;

#[cfg(feature = "tracing-json")]
pub mod logging;

// --- Core re-exports -------------------------------------------------------

pub use draftboard_core::{
    BucketItem, Buckets, DropZoneTracker, FieldSelection, ItemDescriptor, SnapshotEq, Tier,
    TransferError, TransferParse, TransferPayload, parse_transfer,
};

// --- Runtime re-exports ----------------------------------------------------

pub use draftboard_runtime::{
    AccessScope, BucketAssignment, DirtyMode, DraftAction, DraftConfig, DraftConfigError,
    DraftHistory, DraftSession, DropReduction, FieldGrant, HistoryConfig, HistoryPolicyConfig,
    Persist, PersistError, Phase, RecordId, SaveOutcome, SavePolicy, SaveTicket, SessionError,
    Transition, WireEncode, is_dirty, reduce_drop,
};

// --- Errors ---------------------------------------------------------------

/// Top-level error type for draftboard apps.
#[derive(Debug)]
pub enum Error {
    /// Configuration could not be loaded or failed validation.
    Config(DraftConfigError),
    /// A session operation was rejected.
    Session(SessionError),
    /// A drag payload could not be decoded or encoded.
    Transfer(TransferError),
    /// Logging could not be installed.
    Logging(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config(err) => write!(f, "{err}"),
            Self::Session(err) => write!(f, "{err}"),
            Self::Transfer(err) => write!(f, "{err}"),
            Self::Logging(msg) => write!(f, "logging setup failed: {msg}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Config(err) => Some(err),
            Self::Session(err) => Some(err),
            Self::Transfer(err) => Some(err),
            Self::Logging(_) => None,
        }
    }
}

impl From<DraftConfigError> for Error {
    fn from(err: DraftConfigError) -> Self {
        Self::Config(err)
    }
}

impl From<SessionError> for Error {
    fn from(err: SessionError) -> Self {
        Self::Session(err)
    }
}

impl From<PersistError> for Error {
    fn from(err: PersistError) -> Self {
        Self::Session(SessionError::Persist(err))
    }
}

impl From<TransferError> for Error {
    fn from(err: TransferError) -> Self {
        Self::Transfer(err)
    }
}

/// Standard result type for draftboard APIs.
pub type Result<T> = std::result::Result<T, Error>;

// --- Prelude --------------------------------------------------------------

pub mod prelude {
    pub use crate::{
        Buckets, DraftAction, DraftConfig, DraftSession, DropReduction, Error, FieldSelection,
        ItemDescriptor, Persist, PersistError, Phase, Result, SaveOutcome, SnapshotEq, Tier,
    };

    pub use crate::{core, runtime};
}

pub use draftboard_core as core;
pub use draftboard_runtime as runtime;
