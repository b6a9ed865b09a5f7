//! Core error types.
//!
//! Parse-time, validation-time and scheduling failures share one enum so the
//! CLI can report them uniformly. IO and configuration plumbing use `anyhow`.

use thiserror::Error;

/// Errors raised by the transcript model, the alias table and the scheduler.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ReplicatorError {
    /// A block header is inconsistent (stage direction mixed with other labels, no speaker).
    #[error("invalid block at line {line} ({header:?}): {reason}")]
    InvalidBlock {
        line: usize,
        header: String,
        reason: String,
    },

    /// A speaker label is neither a character alias nor a stage direction.
    #[error("unknown character label {label:?} in scene {scene:?}")]
    UnknownLabel { label: String, scene: String },

    /// The same label was declared for two owners.
    #[error("label {label:?} is present twice in {first} and {second}")]
    ConflictingLabel {
        label: String,
        first: String,
        second: String,
    },

    /// A character was declared without any label.
    #[error("character {index} has no labels")]
    EmptyCharacter { index: usize },

    /// The PRNG was asked to pick among zero candidates.
    #[error("domain error: {0}")]
    Domain(String),

    /// The requested character is not a main label of the play.
    #[error("unknown character: {0}")]
    UnknownCharacter(String),

    /// The requested scene index does not exist.
    #[error("scene index {index} out of range ({count} scenes)")]
    SceneOutOfRange { index: usize, count: usize },

    /// The scene is declared in the play but its script is not available.
    #[error("scene {name:?} is missing")]
    MissingScene { name: String },

    /// The character has nothing to recite in the scene.
    #[error("{character} has no lines in scene {scene:?}")]
    NoDrillUnits { character: String, scene: String },

    /// A scheduler operation was called in the wrong state.
    #[error("cannot {action} while in state {state}")]
    InvalidTransition { state: String, action: String },
}

impl ReplicatorError {
    /// Returns `true` for errors caused by the script or the play file, as
    /// opposed to misuse of the session API.
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            ReplicatorError::InvalidBlock { .. }
                | ReplicatorError::UnknownLabel { .. }
                | ReplicatorError::ConflictingLabel { .. }
                | ReplicatorError::EmptyCharacter { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, ReplicatorError>;
