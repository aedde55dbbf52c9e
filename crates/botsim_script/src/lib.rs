//! # Botsim Script Bridge
//!
//! The native-function boundary between the embedded script language
//! and the gameplay core. The language's parser and type-checker are a
//! black box; it reaches the simulation exclusively through the verbs
//! here, each with a compile-time signature check and a runtime
//! executor following one dispatch protocol.
//!
//! ## Crate Structure
//!
//! - [`value`] - Script values and boundary unit conversions
//! - [`signature`] - Verb table and compile-time argument checking
//! - [`bridge`] - The per-script execution context and verb executors

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]

pub mod bridge;
pub mod signature;
pub mod value;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::bridge::{ErrorMode, ScriptContext, ScriptPoll};
    pub use crate::signature::{check, ArgSpec, ScriptError, Verb};
    pub use crate::value::{ScriptPoint, Value};
}
