//! Error types for the Warband domain.
//!
//! Uses `thiserror` for ergonomic error definitions.
//! Each bounded context has its own error variant.
//!
//! The vault projection engine has no error type at all: it degrades
//! every malformed input to an empty slot or a named fallback value.

use thiserror::Error;

/// The top-level error type for all Warband operations.
#[derive(Debug, Error)]
pub enum Error {
    // --- Storage errors ---
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    // --- Roster (domain rule) errors ---
    #[error("Roster error: {0}")]
    Roster(#[from] RosterError),

    // --- Configuration errors ---
    #[error("Configuration error: {message}")]
    Config { message: String },

    // --- Serialization ---
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    // --- Generic ---
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type alias using our Error.
pub type Result<T> = std::result::Result<T, Error>;

// --- Bounded context errors ---

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Query failed: {0}")]
    QueryFailed(String),

    #[error("Migration failed: {0}")]
    MigrationFailed(String),

    #[error("Corrupt roster data: {0}")]
    Corrupt(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RosterError {
    #[error("Character not found: {0}")]
    CharacterNotFound(u32),

    #[error("BiS item {bis_id} not found on character {character_id}")]
    BisItemNotFound { character_id: u32, bis_id: u32 },

    #[error("Talent build {talent_id} not found on character {character_id}")]
    TalentBuildNotFound { character_id: u32, talent_id: u32 },

    #[error("Week {0} is outside the season calendar (0-12)")]
    InvalidWeek(i64),

    #[error("{0} is required")]
    MissingField(&'static str),

    #[error("Unknown crest type: {0}")]
    UnknownCrest(String),
}

impl RosterError {
    /// Whether the error refers to something that does not exist
    /// (as opposed to a malformed request).
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::CharacterNotFound(_)
                | Self::BisItemNotFound { .. }
                | Self::TalentBuildNotFound { .. }
        )
    }
}
