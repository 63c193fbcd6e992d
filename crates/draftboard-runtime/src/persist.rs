#![forbid(unsafe_code)]

//! Persistence boundary: wire shapes, the update operation, save tickets.
//!
//! A draft snapshot is turned into a request with [`WireEncode`] and handed
//! to a [`Persist`] implementation. The only contract relied on is that the
//! operation either succeeds or fails with a displayable [`PersistError`].
//!
//! Saving is two-phase so that a pending request can be modelled without an
//! async runtime: `DraftSession::begin_save` issues a [`SaveTicket`]
//! carrying the captured snapshot and its encoded request, and the caller
//! resolves it later with `DraftSession::complete_save`.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use draftboard_core::{Buckets, FieldSelection, Tier};

use crate::session::RecordId;

// ---------------------------------------------------------------------------
// Wire shapes
// ---------------------------------------------------------------------------

/// Whether a grant covers a whole entity or specific fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccessScope {
    /// The key is selected with no field restriction.
    Entity,
    /// Only the listed subkeys are selected.
    Fields,
}

/// One selected key of a flat draft.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldGrant {
    pub key: String,
    pub scope: AccessScope,
    pub subkeys: Vec<String>,
}

/// Member ids of one tier of a bucketed draft.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BucketAssignment {
    pub category: Tier,
    pub member_ids: Vec<u64>,
}

/// Conversion of a snapshot into its persistence request.
pub trait WireEncode {
    type Request: Serialize + fmt::Debug;

    fn to_request(&self) -> Self::Request;
}

impl WireEncode for FieldSelection {
    type Request = Vec<FieldGrant>;

    fn to_request(&self) -> Self::Request {
        self.selected_keys()
            .iter()
            .map(|key| match self.subkeys_for(key) {
                Some(subkeys) => FieldGrant {
                    key: key.clone(),
                    scope: AccessScope::Fields,
                    subkeys: subkeys.iter().cloned().collect(),
                },
                None => FieldGrant {
                    key: key.clone(),
                    scope: AccessScope::Entity,
                    subkeys: Vec::new(),
                },
            })
            .collect()
    }
}

impl WireEncode for Buckets {
    type Request = Vec<BucketAssignment>;

    fn to_request(&self) -> Self::Request {
        self.iter()
            .map(|(category, items)| BucketAssignment {
                category,
                member_ids: items.iter().map(|item| item.id).collect(),
            })
            .collect()
    }
}

// ---------------------------------------------------------------------------
// Boundary
// ---------------------------------------------------------------------------

/// Rejection reported by the external update operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistError {
    message: String,
}

impl PersistError {
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// Message suitable for showing to the user.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for PersistError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "save rejected: {}", self.message)
    }
}

impl std::error::Error for PersistError {}

/// The external update operation.
pub trait Persist<R> {
    fn persist(&mut self, request: &R) -> Result<(), PersistError>;
}

impl<R, F> Persist<R> for F
where
    F: FnMut(&R) -> Result<(), PersistError>,
{
    fn persist(&mut self, request: &R) -> Result<(), PersistError> {
        self(request)
    }
}

// ---------------------------------------------------------------------------
// Tickets
// ---------------------------------------------------------------------------

/// A save that has been issued but not yet resolved.
#[derive(Debug)]
pub struct SaveTicket<T: WireEncode> {
    pub(crate) id: u64,
    pub(crate) record_id: RecordId,
    pub(crate) captured: Arc<T>,
    pub(crate) request: T::Request,
}

impl<T: WireEncode> SaveTicket<T> {
    /// Monotonic id of this save within its session.
    #[must_use]
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Record the save belongs to.
    #[must_use]
    pub fn record_id(&self) -> &RecordId {
        &self.record_id
    }

    /// Snapshot that was current when the save was issued.
    #[must_use]
    pub fn captured(&self) -> &Arc<T> {
        &self.captured
    }

    /// Request to deliver to the update operation.
    #[must_use]
    pub fn request(&self) -> &T::Request {
        &self.request
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use draftboard_core::ItemDescriptor;

    #[test]
    fn flat_request_derives_scope() {
        let draft = FieldSelection::from_grants([
            ("Lesson", vec!["title", "id"]),
            ("User", Vec::new()),
        ]);
        let request = draft.to_request();
        assert_eq!(
            request,
            vec![
                FieldGrant {
                    key: "Lesson".into(),
                    scope: AccessScope::Fields,
                    subkeys: vec!["id".into(), "title".into()],
                },
                FieldGrant {
                    key: "User".into(),
                    scope: AccessScope::Entity,
                    subkeys: Vec::new(),
                },
            ]
        );
    }

    #[test]
    fn bucket_request_lists_every_tier_in_order() {
        let draft = Buckets::from_assignments([(
            Tier::Rare,
            vec![ItemDescriptor::new(7, "b"), ItemDescriptor::new(5, "a")],
        )]);
        let request = draft.to_request();
        assert_eq!(request.len(), 5);
        assert_eq!(request[0].category, Tier::Common);
        assert!(request[0].member_ids.is_empty());
        assert_eq!(request[2].category, Tier::Rare);
        assert_eq!(request[2].member_ids, vec![7, 5]);
    }

    #[test]
    fn bucket_request_serializes_camel_case() {
        let json = serde_json::to_value(BucketAssignment {
            category: Tier::Epic,
            member_ids: vec![1, 2],
        })
        .unwrap();
        assert_eq!(json["category"], "EPIC");
        assert_eq!(json["memberIds"], serde_json::json!([1, 2]));
    }

    #[test]
    fn flat_request_serializes_scope_snake_case() {
        let json = serde_json::to_value(FieldGrant {
            key: "User".into(),
            scope: AccessScope::Entity,
            subkeys: Vec::new(),
        })
        .unwrap();
        assert_eq!(json["scope"], "entity");
    }

    #[test]
    fn closures_implement_persist() {
        let mut calls = 0;
        let mut sink = |_request: &Vec<FieldGrant>| -> Result<(), PersistError> {
            calls += 1;
            Err(PersistError::new("offline"))
        };
        let err = sink.persist(&Vec::new()).unwrap_err();
        assert_eq!(err.message(), "offline");
        assert_eq!(err.to_string(), "save rejected: offline");
        drop(sink);
        assert_eq!(calls, 1);
    }
}
