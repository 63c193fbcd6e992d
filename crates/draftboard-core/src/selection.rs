#![forbid(unsafe_code)]

//! Flat selection draft: entities and, per entity, selected fields.
//!
//! A [`FieldSelection`] gates a map of per-key subkeys behind a set of
//! selected keys. Operators never mutate `self`; each returns the next
//! snapshot so the caller can push it onto history.
//!
//! # Invariants
//!
//! 1. After `with_selected_keys`, every key in `selected_subkeys` is also in
//!    `selected_keys`. Subkey operators do not select their parent key.
//! 2. No entry in `selected_subkeys` holds an empty set.
//!
//! Invariant 2 makes `toggle on` followed by `toggle off` of the same subkey
//! restore the exact prior shape, including absence of the entry.

use std::collections::{BTreeMap, BTreeSet};

use crate::equality::{SnapshotEq, set_maps_equal, sets_equal};

/// Entity/field picker state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldSelection {
    selected_keys: BTreeSet<String>,
    selected_subkeys: BTreeMap<String, BTreeSet<String>>,
}

impl FieldSelection {
    /// An empty selection.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a baseline from a loaded record.
    ///
    /// Each grant is a selected key plus its selected subkeys. Empty subkey
    /// lists select the key alone.
    #[must_use]
    pub fn from_grants<K, S, I>(grants: I) -> Self
    where
        K: Into<String>,
        S: Into<String>,
        I: IntoIterator<Item = (K, Vec<S>)>,
    {
        let mut selection = Self::default();
        for (key, subkeys) in grants {
            let key = key.into();
            let subkeys: BTreeSet<String> = subkeys.into_iter().map(Into::into).collect();
            if !subkeys.is_empty() {
                selection.selected_subkeys.insert(key.clone(), subkeys);
            }
            selection.selected_keys.insert(key);
        }
        selection
    }

    // ====================================================================
    // Query
    // ====================================================================

    /// Selected top-level keys.
    #[must_use]
    pub fn selected_keys(&self) -> &BTreeSet<String> {
        &self.selected_keys
    }

    /// Per-key selected subkeys; only keys with at least one subkey appear.
    #[must_use]
    pub fn selected_subkeys(&self) -> &BTreeMap<String, BTreeSet<String>> {
        &self.selected_subkeys
    }

    #[must_use]
    pub fn is_key_selected(&self, key: &str) -> bool {
        self.selected_keys.contains(key)
    }

    /// Subkeys selected under `key`, if any.
    #[must_use]
    pub fn subkeys_for(&self, key: &str) -> Option<&BTreeSet<String>> {
        self.selected_subkeys.get(key)
    }

    #[must_use]
    pub fn is_subkey_selected(&self, key: &str, subkey: &str) -> bool {
        self.selected_subkeys
            .get(key)
            .is_some_and(|subkeys| subkeys.contains(subkey))
    }

    // ====================================================================
    // Operators
    // ====================================================================

    /// Replace the selected keys, dropping subkeys whose key left the set.
    #[must_use]
    pub fn with_selected_keys(&self, keys: BTreeSet<String>) -> Self {
        let selected_subkeys = self
            .selected_subkeys
            .iter()
            .filter(|(key, _)| keys.contains(*key))
            .map(|(key, subkeys)| (key.clone(), subkeys.clone()))
            .collect();
        Self {
            selected_keys: keys,
            selected_subkeys,
        }
    }

    /// Check or uncheck a single key.
    #[must_use]
    pub fn with_key_toggled(&self, key: &str, checked: bool) -> Self {
        let mut keys = self.selected_keys.clone();
        if checked {
            keys.insert(key.to_string());
        } else {
            keys.remove(key);
        }
        self.with_selected_keys(keys)
    }

    /// Select every available subkey of `key`, or clear the entry entirely.
    ///
    /// An empty `available` list clears the entry even when `checked`.
    #[must_use]
    pub fn with_all_subkeys<S: AsRef<str>>(&self, key: &str, available: &[S], checked: bool) -> Self {
        let mut next = self.clone();
        let subkeys: BTreeSet<String> = available.iter().map(|s| s.as_ref().to_string()).collect();
        if checked && !subkeys.is_empty() {
            next.selected_subkeys.insert(key.to_string(), subkeys);
        } else {
            next.selected_subkeys.remove(key);
        }
        next
    }

    /// Add or remove one subkey; an emptied entry is deleted.
    #[must_use]
    pub fn with_subkey_toggled(&self, key: &str, subkey: &str, checked: bool) -> Self {
        let mut next = self.clone();
        if checked {
            next.selected_subkeys
                .entry(key.to_string())
                .or_default()
                .insert(subkey.to_string());
        } else if let Some(subkeys) = next.selected_subkeys.get_mut(key) {
            subkeys.remove(subkey);
            if subkeys.is_empty() {
                next.selected_subkeys.remove(key);
            }
        }
        next
    }
}

impl SnapshotEq for FieldSelection {
    fn snapshot_eq(&self, other: &Self) -> bool {
        sets_equal(&self.selected_keys, &other.selected_keys)
            && set_maps_equal(&self.selected_subkeys, &other.selected_subkeys)
    }
}
