//! Test fixtures and helpers.
//!
//! Pre-built worlds and object configurations for consistent testing.

use fixed::types::I32F32;

use botsim_core::math::Vec3Fixed;
use botsim_core::object::{ObjectCreateParams, ObjectId};
use botsim_core::object_type::ObjectType;
use botsim_core::simulation::Simulation;

/// Create a fixed-point number from an integer.
#[must_use]
pub fn fixed(n: i32) -> I32F32 {
    I32F32::from_num(n)
}

/// Create a fixed-point number from a float (for tests only).
///
/// Note: In real simulation code, never use floats.
/// This is only for convenient test setup.
#[must_use]
pub fn fixed_f(n: f64) -> I32F32 {
    I32F32::from_num(n)
}

/// A world position on the ground plane.
#[must_use]
pub fn ground(x: i32, z: i32) -> Vec3Fixed {
    Vec3Fixed::new(fixed(x), I32F32::ZERO, fixed(z))
}

/// Spawn an object of a type for a team at a ground position.
///
/// # Panics
///
/// Panics if creation fails; fixtures are for tests that assume a
/// working geometry factory.
pub fn spawn_at(
    sim: &mut Simulation,
    object_type: ObjectType,
    team: u8,
    x: i32,
    z: i32,
) -> ObjectId {
    sim.create_object(ObjectCreateParams {
        team,
        position: ground(x, z),
        ..ObjectCreateParams::of(object_type)
    })
    .expect("fixture spawn failed")
}

/// Spawn two facing bots a given distance apart on the x axis, for
/// radar and combat scenarios. Returns `(left, right)`; the left bot
/// faces +x, the right bot faces -x.
pub fn facing_pair(
    sim: &mut Simulation,
    object_type: ObjectType,
    left_team: u8,
    right_team: u8,
    distance: i32,
) -> (ObjectId, ObjectId) {
    let left = spawn_at(sim, object_type, left_team, 0, 0);
    let right = spawn_at(sim, object_type, right_team, distance, 0);
    if let Some(obj) = sim.registry_mut().get_mut(right) {
        obj.rotation = botsim_core::math::PI;
    }
    (left, right)
}
