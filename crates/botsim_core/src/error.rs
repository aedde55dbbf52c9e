//! Error types for the gameplay core.
//!
//! Two layers, deliberately separate:
//!
//! - [`GameError`] - hard failures: configuration/content bugs, malformed
//!   persisted data, operations on objects that do not exist. These are
//!   `Result` errors and never reach a running script as a plain value.
//! - [`ErrorCode`] - soft, script-visible result codes produced by tasks
//!   and automatons. Whether a code becomes a script exception is the
//!   bridge's decision (error-mode), not the core's.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::object::ObjectId;

/// Result type alias using [`GameError`].
pub type Result<T> = std::result::Result<T, GameError>;

/// Top-level error type for hard failures in the gameplay core.
#[derive(Debug, Error)]
pub enum GameError {
    /// Object reference did not resolve.
    #[error("object not found: {0}")]
    ObjectNotFound(ObjectId),

    /// The geometry factory could not build the requested type.
    ///
    /// This indicates a content/configuration bug, not a runtime gameplay
    /// condition, so it is an error rather than a soft code.
    #[error("object creation failed: {0}")]
    CreateFailed(String),

    /// The neutral team (0) was passed where a real team is required.
    #[error("team 0 cannot be targeted")]
    NeutralTeam,

    /// A persisted `name=value` info pair did not parse.
    #[error("malformed info parameter '{param}': '{value}'")]
    MalformedInfo {
        /// The level-file key the bad pair was stored under.
        param: String,
        /// The raw pair text.
        value: String,
    },

    /// Serialization/deserialization failure.
    #[error("invalid state: {0}")]
    InvalidState(String),
}

/// Soft result codes surfaced to scripts.
///
/// `Ok` and `Stop` are success-class: a graceful early stop is not a
/// failure and pollers normalize `Stop` to `Ok`. Everything else is a
/// failure whose severity the bridge decides, except the two codes the
/// protocol always escalates ([`WrongObject`](Self::WrongObject),
/// [`EnemyObject`](Self::EnemyObject)) and the one it never does
/// ([`AimImpossible`](Self::AimImpossible)).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorCode {
    /// Completed normally.
    Ok,
    /// Stopped early without failing.
    Stop,
    /// A foreground action is already in flight on the object.
    Busy,
    /// The implicit or explicit target is missing, or lacks the
    /// capability the verb requires.
    WrongObject,
    /// The resolved target belongs to a different non-neutral team.
    EnemyObject,
    /// A required resource (raw material, cargo, ...) is missing.
    NoResource,
    /// Another object is too close for the action to proceed.
    TooClose,
    /// The required research has not been completed.
    NotResearched,
    /// The building type is disabled for this mission.
    BuildDisabled,
    /// Not enough energy to perform the action.
    NoEnergy,
    /// The object is not carrying anything to drop or use.
    NoCargo,
    /// The requested aim angle is outside the turret's range.
    AimImpossible,
    /// The action is impossible in the current situation.
    Impossible,
}

impl ErrorCode {
    /// Success-class codes: `Ok` and the graceful `Stop`.
    #[must_use]
    pub const fn is_success(self) -> bool {
        matches!(self, Self::Ok | Self::Stop)
    }

    /// Codes the dispatch protocol escalates to a hard script exception
    /// regardless of the script's error-mode.
    #[must_use]
    pub const fn is_always_hard(self) -> bool {
        matches!(self, Self::WrongObject | Self::EnemyObject)
    }

    /// Codes the dispatch protocol never escalates, regardless of
    /// error-mode.
    #[must_use]
    pub const fn is_never_hard(self) -> bool {
        matches!(self, Self::AimImpossible) || self.is_success()
    }

    /// Stable numeric value delivered to scripts as the call's result.
    #[must_use]
    pub const fn code(self) -> u16 {
        match self {
            Self::Ok => 0,
            Self::Stop => 1,
            Self::Busy => 100,
            Self::WrongObject => 101,
            Self::EnemyObject => 102,
            Self::NoResource => 110,
            Self::TooClose => 111,
            Self::NotResearched => 112,
            Self::BuildDisabled => 113,
            Self::NoEnergy => 114,
            Self::NoCargo => 115,
            Self::AimImpossible => 120,
            Self::Impossible => 121,
        }
    }
}
