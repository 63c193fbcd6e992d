#![forbid(unsafe_code)]

//! Draft editing configuration.
//!
//! Captures the tunables of a draft session as a single [`DraftConfig`]
//! that can be loaded from TOML or JSON at startup.
//!
//! # Loading
//!
//! ```toml
//! # draftboard.toml
//! dirty = "content"
//! save = "lock_editing"
//!
//! [history]
//! max_depth = 100
//! ```
//!
//! ```rust,ignore
//! let config = DraftConfig::from_toml_file("draftboard.toml")?;
//! let config = DraftConfig::from_json_str(json)?;
//! ```
//!
//! # Defaults
//!
//! `DraftConfig::default()` keeps 100 snapshots, uses content-only dirty
//! checks, and locks editing while a save is in flight.

#[cfg(feature = "config-file")]
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::dirty::DirtyMode;
use crate::history::{HistoryConfig, MIN_DEPTH};

// ---------------------------------------------------------------------------
// Top-level DraftConfig
// ---------------------------------------------------------------------------

/// Top-level configuration for a draft session.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DraftConfig {
    /// History bound.
    pub history: HistoryPolicyConfig,

    /// Dirty-check rule.
    pub dirty: DirtyMode,

    /// Behaviour of edits made while a save is in flight.
    pub save: SavePolicy,
}

impl DraftConfig {
    /// Load from a TOML string.
    #[cfg(feature = "config-file")]
    pub fn from_toml_str(s: &str) -> Result<Self, DraftConfigError> {
        toml::from_str(s).map_err(DraftConfigError::Toml)
    }

    /// Load from a TOML file on disk.
    #[cfg(feature = "config-file")]
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, DraftConfigError> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(DraftConfigError::Io)?;
        Self::from_toml_str(&content)
    }

    /// Load from a JSON string.
    #[cfg(feature = "config-file")]
    pub fn from_json_str(s: &str) -> Result<Self, DraftConfigError> {
        serde_json::from_str(s).map_err(DraftConfigError::Json)
    }

    /// Load from a JSON file on disk.
    #[cfg(feature = "config-file")]
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, DraftConfigError> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(DraftConfigError::Io)?;
        Self::from_json_str(&content)
    }

    /// Load from a TOML file and reject invalid values.
    #[cfg(feature = "config-file")]
    pub fn load_validated_toml(path: impl AsRef<Path>) -> Result<Self, DraftConfigError> {
        Self::from_toml_file(path)?.validated()
    }

    /// Load from a JSON file and reject invalid values.
    #[cfg(feature = "config-file")]
    pub fn load_validated_json(path: impl AsRef<Path>) -> Result<Self, DraftConfigError> {
        Self::from_json_file(path)?.validated()
    }

    /// Validate all parameters are within acceptable ranges.
    ///
    /// Returns a list of validation errors. An empty list means the config
    /// is valid.
    #[must_use]
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        if self.history.max_depth < MIN_DEPTH {
            errors.push(format!(
                "history.max_depth must be >= {MIN_DEPTH}, got {}",
                self.history.max_depth
            ));
        }

        errors
    }

    /// Return `self` if valid, otherwise the validation errors.
    pub fn validated(self) -> Result<Self, DraftConfigError> {
        let errors = self.validate();
        if errors.is_empty() {
            Ok(self)
        } else {
            Err(DraftConfigError::Validation(errors))
        }
    }

    /// Build a [`HistoryConfig`] from this configuration.
    #[must_use]
    pub fn to_history_config(&self) -> HistoryConfig {
        HistoryConfig::new(self.history.max_depth).with_dirty_mode(self.dirty)
    }
}

// ---------------------------------------------------------------------------
// Sub-configs
// ---------------------------------------------------------------------------

/// History bound.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HistoryPolicyConfig {
    /// Snapshots retained per record, baseline included (default: 100).
    pub max_depth: usize,
}

impl Default for HistoryPolicyConfig {
    fn default() -> Self {
        Self {
            max_depth: HistoryConfig::default().max_depth,
        }
    }
}

/// What happens to edits made while a save is pending.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SavePolicy {
    /// Reject commits, undo, and redo until the save resolves.
    #[default]
    LockEditing,
    /// Keep accepting edits; on success, rebase them onto the saved snapshot.
    Reconcile,
}

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

/// Errors that can occur when loading a draft configuration.
#[derive(Debug)]
pub enum DraftConfigError {
    /// I/O error reading a file.
    Io(std::io::Error),
    /// TOML parse error.
    #[cfg(feature = "config-file")]
    Toml(toml::de::Error),
    /// JSON parse error.
    #[cfg(feature = "config-file")]
    Json(serde_json::Error),
    /// Validation errors.
    Validation(Vec<String>),
}

impl std::fmt::Display for DraftConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(e) => write!(f, "I/O error: {e}"),
            #[cfg(feature = "config-file")]
            Self::Toml(e) => write!(f, "TOML parse error: {e}"),
            #[cfg(feature = "config-file")]
            Self::Json(e) => write!(f, "JSON parse error: {e}"),
            Self::Validation(errors) => {
                write!(f, "validation errors: {}", errors.join("; "))
            }
        }
    }
}

impl std::error::Error for DraftConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            #[cfg(feature = "config-file")]
            Self::Toml(e) => Some(e),
            #[cfg(feature = "config-file")]
            Self::Json(e) => Some(e),
            Self::Validation(_) => None,
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
