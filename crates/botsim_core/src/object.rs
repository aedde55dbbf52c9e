//! The simulated object and its capability set.
//!
//! Objects are plain data plus two owned per-object machines: the task
//! executor (script/player ordered actions) and the optional automaton
//! (building behavior). Everything else that refers to an object holds
//! its [`ObjectId`] and re-resolves through the registry.

use serde::{Deserialize, Serialize};

use crate::automaton::Auto;
use crate::math::{fixed_serde, Fixed, Vec3Fixed};
use crate::object_type::ObjectType;
use crate::task::TaskExecutor;

/// Unique identifier for objects.
///
/// Assigned monotonically by the registry and never reused while any
/// reference to it might still be live.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ObjectId(pub u32);

impl ObjectId {
    /// Create an object ID from its raw value.
    #[must_use]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    /// Get the raw numeric value.
    #[must_use]
    pub const fn as_u32(self) -> u32 {
        self.0
    }
}

impl std::fmt::Display for ObjectId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Bitflags for the optional behaviors an object implements.
///
/// Resolved once from the [`ObjectType`] at construction, then queried
/// with O(1) flag tests instead of runtime type inspection.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Capabilities(u32);

impl Capabilities {
    /// Can move under its own power.
    pub const MOVABLE: Self = Self(1 << 0);
    /// Can run scripts.
    pub const PROGRAMMABLE: Self = Self(1 << 1);
    /// Stores scripts across saves.
    pub const PROGRAM_STORAGE: Self = Self(1 << 2);
    /// Can be destroyed with an effect (vs. plain removal).
    pub const DESTROYABLE: Self = Self(1 << 3);
    /// Projects a protective shield.
    pub const SHIELDED: Self = Self(1 << 4);
    /// Flies on jets.
    pub const JET_FLYING: Self = Self(1 << 5);
    /// Has equipment slots (power cell, cargo bay).
    pub const SLOTTED: Self = Self(1 << 6);
    /// Can draw traces on the ground.
    pub const TRACE_DRAWING: Self = Self(1 << 7);
    /// Can pick up and carry other objects.
    pub const CARRIER: Self = Self(1 << 8);
    /// Consumes energy from a power cell.
    pub const POWERED: Self = Self(1 << 9);
    /// Can be picked up and carried.
    pub const TRANSPORTABLE: Self = Self(1 << 10);
    /// Carries a weapon.
    pub const ARMED: Self = Self(1 << 11);

    /// Empty capability set.
    #[must_use]
    pub const fn empty() -> Self {
        Self(0)
    }

    /// Check if all flags in `other` are set in `self`.
    #[inline]
    #[must_use]
    pub const fn contains(self, other: Self) -> bool {
        (self.0 & other.0) == other.0
    }

    /// Check if any flags in `other` are set in `self`.
    #[inline]
    #[must_use]
    pub const fn intersects(self, other: Self) -> bool {
        (self.0 & other.0) != 0
    }

    /// Combine two capability sets.
    #[inline]
    #[must_use]
    pub const fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }

    /// Get raw bits for serialization.
    #[must_use]
    pub const fn bits(self) -> u32 {
        self.0
    }

    /// Create from raw bits.
    #[must_use]
    pub const fn from_bits(bits: u32) -> Self {
        Self(bits)
    }
}

impl std::ops::BitOr for Capabilities {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self::Output {
        self.union(rhs)
    }
}

impl std::ops::BitOrAssign for Capabilities {
    fn bitor_assign(&mut self, rhs: Self) {
        *self = self.union(rhs);
    }
}

/// Pen state for trace-drawing objects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PenState {
    /// Whether the pen is touching the ground.
    pub down: bool,
    /// Trace color index.
    pub color: u8,
    /// Trace width in world units.
    #[serde(with = "fixed_serde")]
    pub width: Fixed,
}

impl Default for PenState {
    fn default() -> Self {
        Self {
            down: false,
            color: 0,
            width: Fixed::from_num(0.5),
        }
    }
}

/// Parameters for creating a new object.
///
/// All fields except the type are optional; use struct-update syntax
/// with [`Default`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObjectCreateParams {
    /// Explicit id to adopt (e.g. on load). `None` assigns the next id.
    pub id: Option<ObjectId>,
    /// The type of object to create.
    pub object_type: ObjectType,
    /// Initial world position.
    pub position: Vec3Fixed,
    /// Initial heading, radians.
    #[serde(with = "fixed_serde")]
    pub rotation: Fixed,
    /// Owning team; 0 is neutral/shared.
    pub team: u8,
    /// Initial energy fraction. Clamped into [0, 1] by the registry.
    #[serde(with = "fixed_serde")]
    pub energy: Fixed,
    /// Trainer variant (no real weapons, used in exercises).
    pub trainer: bool,
    /// Model option index forwarded to the geometry factory.
    pub option: u8,
    /// Whether the object's own activity (scripts, automaton) starts
    /// enabled.
    pub activity: bool,
    /// Query-proxy flag; proxies never appear in spatial scans.
    pub proxy: bool,
    /// Whether the object starts locked (mid-manufacture spawns, or
    /// restoring a saved world).
    pub locked: bool,
}

impl Default for ObjectCreateParams {
    fn default() -> Self {
        Self {
            id: None,
            object_type: ObjectType::Marker,
            position: Vec3Fixed::ZERO,
            rotation: Fixed::ZERO,
            team: 0,
            energy: Fixed::from_num(1),
            trainer: false,
            option: 0,
            activity: true,
            proxy: false,
            locked: false,
        }
    }
}

impl ObjectCreateParams {
    /// Create params for the given type with every other field default.
    #[must_use]
    pub fn of(object_type: ObjectType) -> Self {
        Self {
            object_type,
            ..Self::default()
        }
    }
}

/// A simulated entity: robot, building, resource or decoration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Object {
    /// Unique identifier, stable for the object's lifetime.
    pub id: ObjectId,
    /// The enumerated kind tag.
    pub object_type: ObjectType,
    /// Owning team; 0 is neutral/shared.
    pub team: u8,
    /// World position.
    pub position: Vec3Fixed,
    /// Heading, radians, clockwise around the vertical axis.
    #[serde(with = "fixed_serde")]
    pub rotation: Fixed,
    /// Capability set resolved from the type at construction.
    pub caps: Capabilities,
    /// True while the object is mid-transformation (cargo being
    /// consumed, vehicle still being manufactured).
    pub locked: bool,
    /// False hides the object from every spatial scan.
    pub detectable: bool,
    /// Query-proxy flag; proxies never appear in spatial scans.
    pub proxy: bool,
    /// Whether the object's activity (scripts, automaton) is enabled.
    pub activity: bool,
    /// The carrier currently transporting this object, if any.
    pub transporter: Option<ObjectId>,
    /// The object currently carried, for carriers.
    pub cargo: Option<ObjectId>,
    /// Energy fraction in [0, 1].
    #[serde(with = "fixed_serde")]
    pub energy: Fixed,
    /// Physics "is landed" flag, meaningful for movable objects.
    pub landed: bool,
    /// Pen state for trace-drawing objects.
    pub pen: PenState,
    /// Foreground/background action slots.
    pub tasks: TaskExecutor,
    /// Building behavior, for object types that have one.
    pub auto: Option<Auto>,
}

impl Object {
    /// Construct an object from creation parameters.
    ///
    /// The id must already have been chosen by the registry; energy is
    /// expected pre-clamped.
    #[must_use]
    pub fn from_params(id: ObjectId, params: &ObjectCreateParams) -> Self {
        Self {
            id,
            object_type: params.object_type,
            team: params.team,
            position: params.position,
            rotation: params.rotation,
            caps: params.object_type.capabilities(),
            locked: params.locked,
            detectable: true,
            proxy: params.proxy,
            activity: params.activity,
            transporter: None,
            cargo: None,
            energy: params.energy,
            landed: true,
            pen: PenState::default(),
            tasks: TaskExecutor::default(),
            auto: Auto::for_type(params.object_type),
        }
    }

    /// Check a capability flag.
    #[must_use]
    pub const fn implements(&self, caps: Capabilities) -> bool {
        self.caps.contains(caps)
    }

    /// Busy means an automaton out of its idle phase or a foreground
    /// task in flight; scripts observe this via `isbusy()`.
    #[must_use]
    pub fn is_busy(&self) -> bool {
        self.tasks.foreground_active() || self.auto.as_ref().is_some_and(Auto::is_busy)
    }

    /// True while another object is transporting this one.
    #[must_use]
    pub const fn is_transported(&self) -> bool {
        self.transporter.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capability_flags() {
        let set = Capabilities::MOVABLE | Capabilities::CARRIER;
        assert!(set.contains(Capabilities::MOVABLE));
        assert!(set.intersects(Capabilities::CARRIER));
        assert!(!set.contains(Capabilities::ARMED));
        assert_eq!(Capabilities::from_bits(set.bits()), set);
    }

    #[test]
    fn test_from_params_resolves_caps() {
        let params = ObjectCreateParams::of(ObjectType::WheeledGrabber);
        let obj = Object::from_params(ObjectId::new(7), &params);
        assert_eq!(obj.id, ObjectId::new(7));
        assert!(obj.implements(Capabilities::CARRIER));
        assert!(obj.detectable);
        assert!(!obj.locked);
        assert!(!obj.is_busy());
    }

    #[test]
    fn test_factory_gets_an_automaton() {
        let obj = Object::from_params(
            ObjectId::new(0),
            &ObjectCreateParams::of(ObjectType::BotFactory),
        );
        assert!(obj.auto.is_some());

        let obj = Object::from_params(
            ObjectId::new(1),
            &ObjectCreateParams::of(ObjectType::WheeledGrabber),
        );
        assert!(obj.auto.is_none());
    }
}
