#![forbid(unsafe_code)]

//! Drag transfer payloads and drop-zone hover tracking.
//!
//! A drag carries a serialized JSON string in one of two shapes:
//!
//! ```text
//! {"kind":"list","items":[{"id":5,"name":"Aria"},{"id":7,"name":"Bram"}]}
//! {"kind":"single","item":{"id":5,"name":"Aria"}}
//! ```
//!
//! [`parse_transfer`] never panics and never silently discards input: the
//! result is [`TransferParse::Absent`], [`TransferParse::Malformed`], or
//! [`TransferParse::Valid`], and each caller decides what to report.
//!
//! [`DropZoneTracker`] is presentation state only ("which zone is lit").
//! It never touches a draft.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::bucket::{ItemDescriptor, Tier};

// ---------------------------------------------------------------------------
// Payload
// ---------------------------------------------------------------------------

/// Decoded transfer payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TransferPayload {
    /// Several items dragged together.
    List { items: Vec<ItemDescriptor> },
    /// One item.
    Single { item: ItemDescriptor },
}

impl TransferPayload {
    /// Flatten either shape into a list of descriptors.
    #[must_use]
    pub fn into_items(self) -> Vec<ItemDescriptor> {
        match self {
            Self::List { items } => items,
            Self::Single { item } => vec![item],
        }
    }

    /// Serialize for placement on a drag event.
    pub fn to_transfer_string(&self) -> Result<String, TransferError> {
        serde_json::to_string(self).map_err(|err| TransferError::Json(err.to_string()))
    }
}

/// Why a present payload could not be decoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransferError {
    /// Not valid JSON, or JSON of the wrong shape.
    Json(String),
}

impl fmt::Display for TransferError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Json(msg) => write!(f, "malformed transfer payload: {msg}"),
        }
    }
}

impl std::error::Error for TransferError {}

/// Outcome of decoding the data attached to a drop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransferParse {
    /// The drop carried no payload (or only whitespace).
    Absent,
    /// A payload was present but could not be decoded.
    Malformed(TransferError),
    /// A decoded payload.
    Valid(TransferPayload),
}

/// Decode the raw transfer string of a drop event.
#[must_use]
pub fn parse_transfer(raw: Option<&str>) -> TransferParse {
    let Some(raw) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
        return TransferParse::Absent;
    };
    match serde_json::from_str::<TransferPayload>(raw) {
        Ok(payload) => TransferParse::Valid(payload),
        Err(err) => TransferParse::Malformed(TransferError::Json(err.to_string())),
    }
}

// ---------------------------------------------------------------------------
// Hover indicator
// ---------------------------------------------------------------------------

/// Tracks which drop zone, if any, is the active drag-over target.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DropZoneTracker {
    active: Option<Tier>,
}

impl DropZoneTracker {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A drag entered (or moved over) `tier`'s zone.
    pub fn enter(&mut self, tier: Tier) {
        self.active = Some(tier);
    }

    /// A drag left `tier`'s zone.
    ///
    /// Leaving a zone that is not the active one changes nothing, since
    /// enter/leave pairs for adjacent zones can arrive out of order.
    pub fn leave(&mut self, tier: Tier) {
        if self.active == Some(tier) {
            self.active = None;
        }
    }

    /// The drag ended with a drop (or was cancelled).
    pub fn finish(&mut self) {
        self.active = None;
    }

    #[must_use]
    pub fn active(&self) -> Option<Tier> {
        self.active
    }

    #[must_use]
    pub fn is_active(&self, tier: Tier) -> bool {
        self.active == Some(tier)
    }
}
