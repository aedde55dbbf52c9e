//! Commands and events crossing the per-object boundary.
//!
//! Tasks and automatons own only their object's state. Anything they
//! want done to the rest of the world - spawning, despawning, cargo
//! transfer - is emitted as a [`SimCommand`] and applied by the
//! simulation driver after that object's advance, in order. The driver
//! in turn reports what happened during a tick as [`TickEvents`] for the
//! presentation layer.

use serde::{Deserialize, Serialize};

use crate::automaton::FactoryPhase;
use crate::error::ErrorCode;
use crate::math::Vec3Fixed;
use crate::object::{ObjectCreateParams, ObjectId};

/// How an object should be destroyed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DestructionKind {
    /// Explosion effect, then removal.
    Explosion,
    /// Burn down, leaving a wreck where the type has one.
    Burning,
}

/// A deferred world mutation requested by a task or automaton.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum SimCommand {
    /// Create a new object.
    Spawn(ObjectCreateParams),
    /// Remove an object outright.
    Despawn(ObjectId),
    /// Destroy an object with an effect.
    Destroy(ObjectId, DestructionKind),
    /// Load `cargo` into `carrier`.
    Attach {
        /// The carrying object.
        carrier: ObjectId,
        /// The object being picked up.
        cargo: ObjectId,
    },
    /// Unload the carrier's cargo at a position.
    Detach {
        /// The carrying object.
        carrier: ObjectId,
        /// Where the cargo is put down.
        position: Vec3Fixed,
    },
    /// Clear the locked flag (manufacture finished).
    Unlock(ObjectId),
    /// Enable or disable an object's activity.
    SetActivity(ObjectId, bool),
}

/// Events generated during one simulation tick.
///
/// Consumed by the presentation layer to trigger effects, sounds and UI;
/// the core only records that they happened.
#[derive(Debug, Clone, Default)]
pub struct TickEvents {
    /// Objects created this tick.
    pub spawned: Vec<ObjectId>,
    /// Objects removed this tick.
    pub removed: Vec<ObjectId>,
    /// Objects destroyed with an effect this tick.
    pub destroyed: Vec<(ObjectId, DestructionKind)>,
    /// Foreground tasks that finished this tick, with their result.
    pub finished_tasks: Vec<(ObjectId, ErrorCode)>,
    /// Automaton phase transitions this tick.
    pub phase_changes: Vec<(ObjectId, FactoryPhase)>,
    /// On-screen messages posted this tick, tied to the acting object.
    pub messages: Vec<(ObjectId, String)>,
}
