//! # Botsim Core
//!
//! Deterministic gameplay-object core for the programmable-robot game.
//!
//! This crate contains **only** deterministic logic:
//! - No rendering
//! - No IO
//! - No system randomness
//! - No floating-point math in simulation state (uses fixed-point)
//!
//! It owns the object registry, the radar spatial-query engine, the
//! foreground/background task executor and the building automatons. The
//! rendering engine, sound system and geometry factory are external
//! collaborators reached through the traits in [`effects`]; the script
//! language binds through the separate bridge crate.
//!
//! ## Crate Structure
//!
//! - [`math`] - Fixed-point math utilities
//! - [`object`] / [`object_type`] - The object model and its type tags
//! - [`registry`] - Object ownership, identity, deferred compaction
//! - [`radar`] - Spatial queries
//! - [`task`] - Foreground/background action slots
//! - [`automaton`] - Building behaviors
//! - [`simulation`] - The per-tick driver
//! - [`persist`] - Level save/load param lines

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]

pub mod automaton;
pub mod effects;
pub mod error;
pub mod events;
pub mod math;
pub mod object;
pub mod object_type;
pub mod persist;
pub mod radar;
pub mod registry;
pub mod research;
pub mod simulation;
pub mod task;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::automaton::{Auto, ExchangePostAuto, FactoryAuto, FactoryPhase};
    pub use crate::effects::{
        GeometryFactory, NullGeometry, NullParticles, NullSound, ParticleSink, SoundSink,
    };
    pub use crate::error::{ErrorCode, GameError, Result};
    pub use crate::events::{DestructionKind, SimCommand, TickEvents};
    pub use crate::math::{Fixed, Vec3Fixed, G_UNIT};
    pub use crate::object::{Capabilities, Object, ObjectCreateParams, ObjectId};
    pub use crate::object_type::{ObjectType, TypeSelector};
    pub use crate::radar::{RadarFilter, RadarQuery};
    pub use crate::registry::ObjectRegistry;
    pub use crate::research::{ResearchKind, ResearchState};
    pub use crate::simulation::Simulation;
    pub use crate::task::{Task, TaskExecutor, TaskResult};
}
