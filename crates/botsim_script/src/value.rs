//! Script-side values and the unit conversions at the boundary.
//!
//! Scripts speak game units and degrees; the core speaks world units
//! and radians. Every length is scaled by `G_UNIT` crossing in and the
//! inverse crossing out; every angle converts through degrees with a
//! sign flip on the horizontal turn axis. Script points also swap axes:
//! the point's second field is the engine's depth and its third the
//! height, in both directions.

use serde::{Deserialize, Serialize};

use botsim_core::math::{fixed_serde, Fixed, Vec3Fixed, DEG, G_UNIT};
use botsim_core::object::ObjectId;
use botsim_core::object_type::{expand_selector, ObjectType, TypeSelector};
use botsim_core::research::ResearchKind;

/// A position as scripts see it: game units, script axis order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ScriptPoint {
    /// X, game units.
    #[serde(with = "fixed_serde")]
    pub x: Fixed,
    /// Second field; maps to the engine's depth axis.
    #[serde(with = "fixed_serde")]
    pub y: Fixed,
    /// Third field; maps to the engine's height axis.
    #[serde(with = "fixed_serde")]
    pub z: Fixed,
}

impl ScriptPoint {
    /// Build a script point from components in game units.
    #[must_use]
    pub const fn new(x: Fixed, y: Fixed, z: Fixed) -> Self {
        Self { x, y, z }
    }
}

/// One script-visible value crossing the native-function ABI.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
    /// No value.
    Void,
    /// Number (all script numbers are fixed-point here).
    Number(#[serde(with = "fixed_serde")] Fixed),
    /// Boolean.
    Bool(bool),
    /// String.
    Str(String),
    /// Position in script space.
    Point(ScriptPoint),
    /// Object handle.
    Object(ObjectId),
    /// Type selector (or an array of them via [`Value::Array`]).
    Type(TypeSelector),
    /// Research program selector.
    Research(ResearchKind),
    /// Array of values.
    Array(Vec<Value>),
}

impl Value {
    /// Number extraction.
    #[must_use]
    pub fn as_number(&self) -> Option<Fixed> {
        match self {
            Self::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Bool extraction.
    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// String extraction.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Point extraction.
    #[must_use]
    pub fn as_point(&self) -> Option<ScriptPoint> {
        match self {
            Self::Point(p) => Some(*p),
            _ => None,
        }
    }

    /// Object handle extraction.
    #[must_use]
    pub fn as_object(&self) -> Option<ObjectId> {
        match self {
            Self::Object(id) => Some(*id),
            _ => None,
        }
    }

    /// Research selector extraction.
    #[must_use]
    pub fn as_research(&self) -> Option<ResearchKind> {
        match self {
            Self::Research(r) => Some(*r),
            _ => None,
        }
    }

    /// Expand a type argument (single selector or array of selectors)
    /// into the concrete type list a query filters on.
    ///
    /// Every query entry point goes through here, so the "any ground
    /// vehicle" pseudo-type expands identically everywhere.
    #[must_use]
    pub fn as_type_filter(&self) -> Option<Vec<ObjectType>> {
        match self {
            Self::Type(selector) => Some(expand_selector(*selector)),
            Self::Array(items) => {
                let mut expanded = Vec::new();
                for item in items {
                    match item {
                        Self::Type(selector) => expanded.extend(expand_selector(*selector)),
                        _ => return None,
                    }
                }
                Some(expanded)
            }
            _ => None,
        }
    }
}

/// Script point (game units, script axes) to world position.
#[must_use]
pub fn point_to_world(p: ScriptPoint) -> Vec3Fixed {
    Vec3Fixed {
        x: p.x * G_UNIT,
        y: p.z * G_UNIT,
        z: p.y * G_UNIT,
    }
}

/// World position to script point; exact inverse of [`point_to_world`].
#[must_use]
pub fn point_from_world(v: Vec3Fixed) -> ScriptPoint {
    ScriptPoint {
        x: v.x / G_UNIT,
        y: v.z / G_UNIT,
        z: v.y / G_UNIT,
    }
}

/// Script length (game units) to world units.
#[must_use]
pub fn length_to_world(n: Fixed) -> Fixed {
    n * G_UNIT
}

/// World length to script game units.
#[must_use]
pub fn length_from_world(n: Fixed) -> Fixed {
    n / G_UNIT
}

/// Script angle (degrees, script-positive) to core radians.
///
/// The sign flips on the horizontal turn axis.
#[must_use]
pub fn angle_to_world(degrees: Fixed) -> Fixed {
    -(degrees * DEG)
}

/// Core radians to script degrees; exact inverse of [`angle_to_world`].
#[must_use]
pub fn angle_from_world(radians: Fixed) -> Fixed {
    -(radians / DEG)
}
