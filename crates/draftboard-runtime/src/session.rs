#![forbid(unsafe_code)]

//! Per-record draft session: an explicit state machine over one history.
//!
//! A [`DraftSession`] is owned by the single UI surface editing a record.
//! Every user action becomes a [`DraftAction`] passed to
//! [`dispatch`](DraftSession::dispatch); saving is a ticketed two-step
//! ([`begin_save`](DraftSession::begin_save) then
//! [`complete_save`](DraftSession::complete_save)).
//!
//! # State Machine
//!
//! ```text
//!                 Load                 Commit / cursor move
//! Uninitialized ───────► Loaded ◄──────────────────────────► Dirty
//!                          ▲        undo/redo back to base      │
//!                          │                                    │ begin_save
//!                          │ success (history collapsed)        ▼
//!                          └──────────────────────────────── Saving
//!                                 failure: history untouched ──► Dirty
//! ```
//!
//! `Teardown`, or `Load` of a different record, discards the history and
//! any pending save. There is no persistence of the draft itself.
//!
//! # Invariants
//!
//! 1. At most one save is in flight per session.
//! 2. A save failure leaves the history exactly as it was.
//! 3. Under [`SavePolicy::LockEditing`] the history cannot change while a
//!    save is in flight.
//! 4. A ticket issued for one record never touches another record's history.

use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

use draftboard_core::{Buckets, FieldSelection, SnapshotEq, Tier};
use web_time::Instant;

use crate::config::{DraftConfig, SavePolicy};
use crate::drop_reducer::{DropReduction, reduce_drop};
use crate::history::DraftHistory;
use crate::persist::{Persist, PersistError, SaveTicket, WireEncode};

// ---------------------------------------------------------------------------
// Identity and actions
// ---------------------------------------------------------------------------

/// Identity of the record owning a draft.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RecordId(String);

impl RecordId {
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RecordId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for RecordId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<u64> for RecordId {
    fn from(id: u64) -> Self {
        Self(id.to_string())
    }
}

/// Inputs to the session state machine.
#[derive(Debug, Clone)]
pub enum DraftAction<T> {
    /// A record arrived; seed a history from its baseline.
    Load { record_id: RecordId, baseline: T },
    /// A mutation produced the next snapshot.
    Commit(T),
    Undo,
    Redo,
    /// The editing surface went away.
    Teardown,
}

/// What a dispatched action did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// A fresh history was created.
    Seeded,
    /// `Load` of the record already being edited; the draft was kept.
    Kept,
    /// A snapshot was pushed.
    Pushed,
    /// The cursor moved.
    Moved,
    /// Undo at the baseline or redo at the head.
    Unchanged,
    /// The history was discarded.
    Discarded,
}

/// Observable phase of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Uninitialized,
    Loaded,
    Dirty,
    Saving,
}

/// How a successful save was applied to the history.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveOutcome {
    /// History collapsed to the saved snapshot.
    Collapsed,
    /// History rebased: saved snapshot as baseline, later edits on top.
    Reconciled,
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors returned by session operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    /// No record has been loaded.
    NotLoaded,
    /// Editing is locked while a save is in flight.
    EditingLocked,
    /// A save is already in flight.
    SaveInFlight,
    /// The draft equals its baseline.
    NothingToSave,
    /// The ticket does not match the pending save (record switched,
    /// session torn down, or already resolved).
    StaleTicket { ticket: u64 },
    /// The update operation rejected the save; history is unchanged.
    Persist(PersistError),
}

impl fmt::Display for SessionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotLoaded => write!(f, "no record loaded"),
            Self::EditingLocked => write!(f, "editing is locked while a save is in flight"),
            Self::SaveInFlight => write!(f, "a save is already in flight"),
            Self::NothingToSave => write!(f, "draft has no unsaved changes"),
            Self::StaleTicket { ticket } => write!(f, "save ticket {ticket} is stale"),
            Self::Persist(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for SessionError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Persist(e) => Some(e),
            _ => None,
        }
    }
}

impl From<PersistError> for SessionError {
    fn from(err: PersistError) -> Self {
        Self::Persist(err)
    }
}

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

struct PendingSave<T> {
    ticket: u64,
    captured: Arc<T>,
    started: Instant,
}

struct ActiveDraft<T> {
    record_id: RecordId,
    history: DraftHistory<T>,
    pending: Option<PendingSave<T>>,
}

/// Draft state machine for one editing surface.
pub struct DraftSession<T> {
    config: DraftConfig,
    active: Option<ActiveDraft<T>>,
    next_ticket: u64,
}

impl<T> fmt::Debug for DraftSession<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut s = f.debug_struct("DraftSession");
        s.field("config", &self.config);
        match &self.active {
            Some(active) => s
                .field("record_id", &active.record_id)
                .field("len", &active.history.len())
                .field("cursor", &active.history.cursor())
                .field("saving", &active.pending.is_some()),
            None => s.field("record_id", &Option::<RecordId>::None),
        };
        s.finish()
    }
}

impl<T: SnapshotEq> Default for DraftSession<T> {
    fn default() -> Self {
        Self::new(DraftConfig::default())
    }
}

impl<T: SnapshotEq> DraftSession<T> {
    #[must_use]
    pub fn new(config: DraftConfig) -> Self {
        Self {
            config,
            active: None,
            next_ticket: 1,
        }
    }

    // ====================================================================
    // Dispatch
    // ====================================================================

    /// Advance the state machine by one action.
    pub fn dispatch(&mut self, action: DraftAction<T>) -> Result<Transition, SessionError> {
        match action {
            DraftAction::Load {
                record_id,
                baseline,
            } => Ok(self.load(record_id, baseline)),
            DraftAction::Commit(snapshot) => self.commit(snapshot),
            DraftAction::Undo => self.undo(),
            DraftAction::Redo => self.redo(),
            DraftAction::Teardown => Ok(self.teardown()),
        }
    }

    /// Seed a history for `record_id`, unless that record is already loaded.
    pub fn load(&mut self, record_id: impl Into<RecordId>, baseline: T) -> Transition {
        let record_id = record_id.into();
        if let Some(active) = &self.active {
            if active.record_id == record_id {
                tracing::debug!(
                    target: "draftboard.session",
                    record_id = %record_id,
                    "record reloaded; keeping draft"
                );
                return Transition::Kept;
            }
            if let Some(pending) = &active.pending {
                tracing::warn!(
                    target: "draftboard.session",
                    record_id = %active.record_id,
                    ticket = pending.ticket,
                    "record switched with a save in flight; its result will be ignored"
                );
            }
        }
        tracing::debug!(
            target: "draftboard.session",
            record_id = %record_id,
            "draft seeded from record"
        );
        self.active = Some(ActiveDraft {
            record_id,
            history: DraftHistory::new(baseline, self.config.to_history_config()),
            pending: None,
        });
        Transition::Seeded
    }

    /// Push the next snapshot.
    pub fn commit(&mut self, snapshot: T) -> Result<Transition, SessionError> {
        let active = self.editable()?;
        active.history.push(snapshot);
        Ok(Transition::Pushed)
    }

    /// Compute the next snapshot from the current one and push it.
    pub fn edit<F>(&mut self, f: F) -> Result<Transition, SessionError>
    where
        F: FnOnce(&T) -> T,
    {
        let active = self.editable()?;
        let current: &T = active.history.current();
        let next = f(current);
        active.history.push(next);
        Ok(Transition::Pushed)
    }

    pub fn undo(&mut self) -> Result<Transition, SessionError> {
        let active = self.editable()?;
        Ok(match active.history.undo() {
            Some(_) => Transition::Moved,
            None => Transition::Unchanged,
        })
    }

    pub fn redo(&mut self) -> Result<Transition, SessionError> {
        let active = self.editable()?;
        Ok(match active.history.redo() {
            Some(_) => Transition::Moved,
            None => Transition::Unchanged,
        })
    }

    /// Discard the history and any pending save.
    pub fn teardown(&mut self) -> Transition {
        match self.active.take() {
            Some(active) => {
                tracing::debug!(
                    target: "draftboard.session",
                    record_id = %active.record_id,
                    len = active.history.len(),
                    "draft discarded"
                );
                Transition::Discarded
            }
            None => Transition::Unchanged,
        }
    }

    // ====================================================================
    // Query
    // ====================================================================

    #[must_use]
    pub fn phase(&self) -> Phase {
        match &self.active {
            None => Phase::Uninitialized,
            Some(active) if active.pending.is_some() => Phase::Saving,
            Some(active) if active.history.is_dirty() => Phase::Dirty,
            Some(_) => Phase::Loaded,
        }
    }

    #[must_use]
    pub fn record_id(&self) -> Option<&RecordId> {
        self.active.as_ref().map(|active| &active.record_id)
    }

    #[must_use]
    pub fn current(&self) -> Option<&Arc<T>> {
        self.active.as_ref().map(|active| active.history.current())
    }

    #[must_use]
    pub fn history(&self) -> Option<&DraftHistory<T>> {
        self.active.as_ref().map(|active| &active.history)
    }

    #[must_use]
    pub fn is_dirty(&self) -> bool {
        self.active
            .as_ref()
            .is_some_and(|active| active.history.is_dirty())
    }

    #[must_use]
    pub fn is_saving(&self) -> bool {
        self.active
            .as_ref()
            .is_some_and(|active| active.pending.is_some())
    }

    /// Save control enabled: dirty and no save in flight.
    #[must_use]
    pub fn can_save(&self) -> bool {
        self.is_dirty() && !self.is_saving()
    }

    #[must_use]
    pub fn can_undo(&self) -> bool {
        self.editable_ref()
            .is_some_and(|active| active.history.can_undo())
    }

    #[must_use]
    pub fn can_redo(&self) -> bool {
        self.editable_ref()
            .is_some_and(|active| active.history.can_redo())
    }

    #[must_use]
    pub fn config(&self) -> &DraftConfig {
        &self.config
    }

    // ====================================================================
    // Internals
    // ====================================================================

    fn editing_locked(&self, active: &ActiveDraft<T>) -> bool {
        active.pending.is_some() && self.config.save == SavePolicy::LockEditing
    }

    fn editable_ref(&self) -> Option<&ActiveDraft<T>> {
        self.active
            .as_ref()
            .filter(|active| !self.editing_locked(active))
    }

    fn editable(&mut self) -> Result<&mut ActiveDraft<T>, SessionError> {
        let locked = match &self.active {
            None => return Err(SessionError::NotLoaded),
            Some(active) => self.editing_locked(active),
        };
        if locked {
            tracing::warn!(
                target: "draftboard.session",
                "edit rejected while save is in flight"
            );
            return Err(SessionError::EditingLocked);
        }
        self.active.as_mut().ok_or(SessionError::NotLoaded)
    }
}

// ---------------------------------------------------------------------------
// Saving
// ---------------------------------------------------------------------------

impl<T: SnapshotEq + WireEncode> DraftSession<T> {
    /// Capture the current snapshot and issue a save ticket.
    pub fn begin_save(&mut self) -> Result<SaveTicket<T>, SessionError> {
        let ticket = self.next_ticket;
        let active = self.active.as_mut().ok_or(SessionError::NotLoaded)?;
        if active.pending.is_some() {
            return Err(SessionError::SaveInFlight);
        }
        if !active.history.is_dirty() {
            return Err(SessionError::NothingToSave);
        }

        let captured = Arc::clone(active.history.current());
        let request = captured.to_request();
        active.pending = Some(PendingSave {
            ticket,
            captured: Arc::clone(&captured),
            started: Instant::now(),
        });
        self.next_ticket += 1;

        tracing::debug!(
            target: "draftboard.persist",
            record_id = %active.record_id,
            ticket,
            cursor = active.history.cursor(),
            "save started"
        );

        Ok(SaveTicket {
            id: ticket,
            record_id: active.record_id.clone(),
            captured,
            request,
        })
    }

    /// Resolve a save previously issued by [`begin_save`](Self::begin_save).
    ///
    /// On failure the history is left untouched and the error is returned
    /// as [`SessionError::Persist`].
    pub fn complete_save(
        &mut self,
        ticket: SaveTicket<T>,
        result: Result<(), PersistError>,
    ) -> Result<SaveOutcome, SessionError> {
        let policy = self.config.save;
        let stale = SessionError::StaleTicket { ticket: ticket.id };
        let Some(active) = self.active.as_mut() else {
            tracing::debug!(target: "draftboard.persist", ticket = ticket.id, "save resolved after teardown");
            return Err(stale);
        };
        if active.record_id != ticket.record_id {
            tracing::debug!(target: "draftboard.persist", ticket = ticket.id, "save resolved for a previous record");
            return Err(stale);
        }
        let pending = match active.pending.take() {
            Some(pending) if pending.ticket == ticket.id => pending,
            other => {
                active.pending = other;
                return Err(stale);
            }
        };
        let duration_us = pending.started.elapsed().as_micros() as u64;

        if let Err(err) = result {
            tracing::error!(
                target: "draftboard.persist",
                record_id = %active.record_id,
                ticket = ticket.id,
                duration_us,
                error = %err,
                "save failed; draft kept"
            );
            return Err(SessionError::Persist(err));
        }

        let current = Arc::clone(active.history.current());
        let edited_during_save = !current.snapshot_eq(&pending.captured);
        active.history.reset_arc(pending.captured);

        let outcome = match policy {
            SavePolicy::Reconcile if edited_during_save => {
                active.history.push_arc(current);
                SaveOutcome::Reconciled
            }
            _ => SaveOutcome::Collapsed,
        };

        tracing::debug!(
            target: "draftboard.persist",
            record_id = %active.record_id,
            ticket = ticket.id,
            duration_us,
            outcome = ?outcome,
            "save succeeded"
        );
        Ok(outcome)
    }

    /// Issue, deliver, and resolve a save against a synchronous boundary.
    pub fn save_with<P>(&mut self, persist: &mut P) -> Result<SaveOutcome, SessionError>
    where
        P: Persist<T::Request>,
    {
        let ticket = self.begin_save()?;
        let result = persist.persist(ticket.request());
        self.complete_save(ticket, result)
    }
}

// ---------------------------------------------------------------------------
// Flat drafts
// ---------------------------------------------------------------------------

impl DraftSession<FieldSelection> {
    pub fn set_selected_keys(&mut self, keys: BTreeSet<String>) -> Result<Transition, SessionError> {
        self.edit(|draft| draft.with_selected_keys(keys))
    }

    pub fn toggle_key(&mut self, key: &str, checked: bool) -> Result<Transition, SessionError> {
        self.edit(|draft| draft.with_key_toggled(key, checked))
    }

    pub fn set_all_subkeys<S: AsRef<str>>(
        &mut self,
        key: &str,
        available: &[S],
        checked: bool,
    ) -> Result<Transition, SessionError> {
        self.edit(|draft| draft.with_all_subkeys(key, available, checked))
    }

    pub fn toggle_subkey(
        &mut self,
        key: &str,
        subkey: &str,
        checked: bool,
    ) -> Result<Transition, SessionError> {
        self.edit(|draft| draft.with_subkey_toggled(key, subkey, checked))
    }
}

// ---------------------------------------------------------------------------
// Bucketed drafts
// ---------------------------------------------------------------------------

impl DraftSession<Buckets> {
    /// Remove an item; always records an undo point.
    pub fn remove_item(&mut self, tier: Tier, id: u64) -> Result<Transition, SessionError> {
        self.edit(|draft| draft.without_item(tier, id))
    }

    /// Reduce a drop onto `target` and push the result if anything was added.
    ///
    /// Malformed payloads are logged by the reducer and returned so the
    /// caller can surface them.
    pub fn drop_into(
        &mut self,
        target: Tier,
        payload: Option<&str>,
    ) -> Result<DropReduction, SessionError> {
        let active = self.editable()?;
        let reduction = reduce_drop(active.history.current(), target, payload);
        if let DropReduction::Applied(next) = &reduction {
            active.history.push(next.clone());
        }
        Ok(reduction)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn loaded() -> DraftSession<FieldSelection> {
        let mut session = DraftSession::default();
        session.load("policy-1", FieldSelection::new());
        session
    }

    #[test]
    fn new_session_is_uninitialized() {
        let session = DraftSession::<FieldSelection>::default();
        assert_eq!(session.phase(), Phase::Uninitialized);
        assert!(!session.can_save());
        assert!(!session.can_undo());
        assert!(session.current().is_none());
    }

    #[test]
    fn edits_before_load_are_rejected() {
        let mut session = DraftSession::<FieldSelection>::default();
        assert_eq!(
            session.dispatch(DraftAction::Undo),
            Err(SessionError::NotLoaded)
        );
        assert_eq!(
            session.commit(FieldSelection::new()),
            Err(SessionError::NotLoaded)
        );
    }

    #[test]
    fn load_then_edit_reaches_dirty() {
        let mut session = loaded();
        assert_eq!(session.phase(), Phase::Loaded);
        session.toggle_key("User", true).unwrap();
        assert_eq!(session.phase(), Phase::Dirty);
        assert!(session.can_save());
    }

    #[test]
    fn reloading_same_record_keeps_draft() {
        let mut session = loaded();
        session.toggle_key("User", true).unwrap();
        assert_eq!(
            session.load("policy-1", FieldSelection::new()),
            Transition::Kept
        );
        assert!(session.is_dirty());
    }

    #[test]
    fn switching_record_discards_history() {
        let mut session = loaded();
        session.toggle_key("User", true).unwrap();
        assert_eq!(
            session.load("policy-2", FieldSelection::new()),
            Transition::Seeded
        );
        assert_eq!(session.history().map(DraftHistory::len), Some(1));
        assert!(!session.is_dirty());
    }

    #[test]
    fn undo_redo_report_bounds() {
        let mut session = loaded();
        assert_eq!(session.undo(), Ok(Transition::Unchanged));
        session.toggle_key("User", true).unwrap();
        assert_eq!(session.undo(), Ok(Transition::Moved));
        assert_eq!(session.redo(), Ok(Transition::Moved));
        assert_eq!(session.redo(), Ok(Transition::Unchanged));
    }

    #[test]
    fn teardown_returns_to_uninitialized() {
        let mut session = loaded();
        assert_eq!(session.dispatch(DraftAction::Teardown), Ok(Transition::Discarded));
        assert_eq!(session.phase(), Phase::Uninitialized);
        assert_eq!(session.teardown(), Transition::Unchanged);
    }

    #[test]
    fn begin_save_on_clean_draft_is_rejected() {
        let mut session = loaded();
        assert_eq!(session.begin_save().unwrap_err(), SessionError::NothingToSave);
    }

    #[test]
    fn second_begin_save_is_rejected() {
        let mut session = loaded();
        session.toggle_key("User", true).unwrap();
        let _ticket = session.begin_save().unwrap();
        assert_eq!(session.phase(), Phase::Saving);
        assert!(!session.can_save());
        assert_eq!(session.begin_save().unwrap_err(), SessionError::SaveInFlight);
    }

    #[test]
    fn session_error_display() {
        assert_eq!(SessionError::NotLoaded.to_string(), "no record loaded");
        assert_eq!(
            SessionError::StaleTicket { ticket: 4 }.to_string(),
            "save ticket 4 is stale"
        );
        let err = SessionError::from(PersistError::new("conflict"));
        assert_eq!(err.to_string(), "save rejected: conflict");
    }

    #[test]
    fn record_id_conversions() {
        assert_eq!(RecordId::from(42u64).as_str(), "42");
        assert_eq!(RecordId::from("banner-7").to_string(), "banner-7");
    }
}
