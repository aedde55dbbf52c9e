//! Asynchronous in-world actions and the per-object task slots.
//!
//! An object runs at most one *foreground* task (move, grab, build, ...)
//! and at most one *background* task (shield, aim) at a time. Tasks are
//! plain data advanced once per tick; "still running" is the
//! [`TaskResult::Pending`] variant, never a magic code. World mutations
//! beyond the owning object are emitted as [`SimCommand`]s.

use serde::{Deserialize, Serialize};

use crate::error::ErrorCode;
use crate::events::SimCommand;
use crate::math::{self, fixed_serde, Fixed, Vec3Fixed};
use crate::object::{Object, ObjectCreateParams, ObjectId};
use crate::object_type::ObjectType;

/// Outcome of advancing a task by one tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskResult {
    /// Still running; advance again next tick.
    Pending,
    /// Finished with the given result code.
    Done(ErrorCode),
}

/// Travel speed for movement tasks, world units per second.
const MOVE_SPEED: f32 = 20.0;
/// Rotation speed for turn tasks, radians per second.
const TURN_SPEED: f32 = 2.0;
/// Arrival tolerance for movement tasks, world units.
const ARRIVE_EPSILON: f32 = 0.1;
/// Energy drained per second of continuous fire.
const FIRE_DRAIN: f32 = 0.25;
/// Energy drained per second of an active shield.
const SHIELD_DRAIN: f32 = 0.05;

/// One in-flight action. Each variant carries its own progress state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Task {
    /// Move to a world position.
    Goto {
        /// Destination, world units.
        target: Vec3Fixed,
    },
    /// Move a signed distance along the current heading.
    Move {
        /// Remaining distance, world units; negative moves backward.
        #[serde(with = "fixed_serde")]
        remaining: Fixed,
    },
    /// Rotate by a signed angle.
    Turn {
        /// Remaining rotation, radians, clockwise positive.
        #[serde(with = "fixed_serde")]
        remaining: Fixed,
    },
    /// Do nothing for a while.
    Wait {
        /// Remaining time, seconds.
        #[serde(with = "fixed_serde")]
        remaining: Fixed,
    },
    /// Pick up a transportable object.
    Grab {
        /// The object being picked up.
        target: ObjectId,
        /// Animation progress fraction.
        #[serde(with = "fixed_serde")]
        progress: Fixed,
    },
    /// Put the carried object down.
    Drop {
        /// Where the cargo lands.
        position: Vec3Fixed,
        /// Animation progress fraction.
        #[serde(with = "fixed_serde")]
        progress: Fixed,
    },
    /// Fire the weapon for a duration.
    Fire {
        /// Remaining burst time, seconds.
        #[serde(with = "fixed_serde")]
        remaining: Fixed,
    },
    /// Erect a building, consuming a titanium cube.
    Build {
        /// The building type going up.
        building: ObjectType,
        /// The cube consumed on completion.
        resource: ObjectId,
        /// Construction progress fraction.
        #[serde(with = "fixed_serde")]
        progress: Fixed,
    },
    /// Leave the ground (jet-flying objects only).
    TakeOff {
        /// Lift-off progress fraction.
        #[serde(with = "fixed_serde")]
        progress: Fixed,
    },
    /// Convert a bot wreck back into a titanium cube.
    Recycle {
        /// The wreck being recycled.
        target: ObjectId,
        /// Where the cube appears (captured at start; wrecks don't move).
        position: Vec3Fixed,
        /// Progress fraction.
        #[serde(with = "fixed_serde")]
        progress: Fixed,
    },
    /// Probe the ground, planting a marker on completion.
    Sniff {
        /// Progress fraction.
        #[serde(with = "fixed_serde")]
        progress: Fixed,
    },
    /// Strike the ground.
    Thump {
        /// Progress fraction.
        #[serde(with = "fixed_serde")]
        progress: Fixed,
    },
    /// Background: protective shield with a ramp-up radius.
    Shield {
        /// Full radius, world units.
        #[serde(with = "fixed_serde")]
        radius: Fixed,
        /// Ramp-up fraction; refreshing keeps this, restarting would not.
        #[serde(with = "fixed_serde")]
        ramp: Fixed,
        /// Explicit down request; completes on the next advance.
        lower: bool,
    },
    /// Background: swing the turret toward an angle.
    Aim {
        /// Target angle relative to the chassis, radians.
        #[serde(with = "fixed_serde")]
        toward: Fixed,
        /// Swing progress fraction.
        #[serde(with = "fixed_serde")]
        progress: Fixed,
        /// False when the requested angle is outside the turret's range.
        possible: bool,
    },
}

impl Task {
    /// Advance by `elapsed` seconds, mutating the owning object and
    /// emitting world mutations into `commands`.
    pub fn advance(
        &mut self,
        body: &mut Object,
        elapsed: Fixed,
        commands: &mut Vec<SimCommand>,
    ) -> TaskResult {
        match self {
            Task::Goto { target } => {
                let step = Fixed::from_num(MOVE_SPEED) * elapsed;
                let dist = body.position.horizontal_distance(*target);
                if dist <= step || dist <= Fixed::from_num(ARRIVE_EPSILON) {
                    body.position.x = target.x;
                    body.position.z = target.z;
                    return TaskResult::Done(ErrorCode::Ok);
                }
                body.rotation = body.position.horizontal_bearing_to(*target);
                let dir = math::heading_vector(body.rotation);
                body.position.x += dir.x * step;
                body.position.z += dir.z * step;
                TaskResult::Pending
            }
            Task::Move { remaining } => {
                let step = Fixed::from_num(MOVE_SPEED) * elapsed;
                let dir = math::heading_vector(body.rotation);
                let (advanced, done) = if remaining.abs() <= step {
                    (*remaining, true)
                } else if *remaining < Fixed::ZERO {
                    (-step, false)
                } else {
                    (step, false)
                };
                body.position.x += dir.x * advanced;
                body.position.z += dir.z * advanced;
                *remaining -= advanced;
                if done {
                    TaskResult::Done(ErrorCode::Ok)
                } else {
                    TaskResult::Pending
                }
            }
            Task::Turn { remaining } => {
                let step = Fixed::from_num(TURN_SPEED) * elapsed;
                if remaining.abs() <= step {
                    body.rotation = math::normalize_angle(body.rotation + *remaining);
                    return TaskResult::Done(ErrorCode::Ok);
                }
                let signed = if *remaining < Fixed::ZERO { -step } else { step };
                body.rotation = math::normalize_angle(body.rotation + signed);
                *remaining -= signed;
                TaskResult::Pending
            }
            Task::Wait { remaining } => {
                *remaining -= elapsed;
                if *remaining <= Fixed::ZERO {
                    TaskResult::Done(ErrorCode::Ok)
                } else {
                    TaskResult::Pending
                }
            }
            Task::Grab { target, progress } => {
                *progress += elapsed;
                if *progress >= Fixed::from_num(1) {
                    commands.push(SimCommand::Attach {
                        carrier: body.id,
                        cargo: *target,
                    });
                    TaskResult::Done(ErrorCode::Ok)
                } else {
                    TaskResult::Pending
                }
            }
            Task::Drop { position, progress } => {
                *progress += elapsed;
                if *progress >= Fixed::from_num(1) {
                    commands.push(SimCommand::Detach {
                        carrier: body.id,
                        position: *position,
                    });
                    TaskResult::Done(ErrorCode::Ok)
                } else {
                    TaskResult::Pending
                }
            }
            Task::Fire { remaining } => {
                *remaining -= elapsed;
                body.energy = (body.energy - Fixed::from_num(FIRE_DRAIN) * elapsed)
                    .max(Fixed::ZERO);
                if *remaining <= Fixed::ZERO || body.energy == Fixed::ZERO {
                    TaskResult::Done(ErrorCode::Ok)
                } else {
                    TaskResult::Pending
                }
            }
            Task::Build {
                building,
                resource,
                progress,
            } => {
                // Buildings go up in a fixed ten seconds.
                *progress += elapsed / Fixed::from_num(10);
                if *progress >= Fixed::from_num(1) {
                    let dir = math::heading_vector(body.rotation);
                    let site = Vec3Fixed::new(
                        body.position.x + dir.x * Fixed::from_num(10),
                        body.position.y,
                        body.position.z + dir.z * Fixed::from_num(10),
                    );
                    commands.push(SimCommand::Despawn(*resource));
                    commands.push(SimCommand::Spawn(ObjectCreateParams {
                        object_type: *building,
                        position: site,
                        rotation: body.rotation,
                        team: body.team,
                        ..ObjectCreateParams::default()
                    }));
                    TaskResult::Done(ErrorCode::Ok)
                } else {
                    TaskResult::Pending
                }
            }
            Task::TakeOff { progress } => {
                *progress += elapsed / Fixed::from_num(2);
                if *progress >= Fixed::from_num(1) {
                    body.landed = false;
                    body.position.y += Fixed::from_num(5);
                    TaskResult::Done(ErrorCode::Ok)
                } else {
                    TaskResult::Pending
                }
            }
            Task::Recycle {
                target,
                position,
                progress,
            } => {
                *progress += elapsed / Fixed::from_num(2);
                if *progress >= Fixed::from_num(1) {
                    commands.push(SimCommand::Despawn(*target));
                    commands.push(SimCommand::Spawn(ObjectCreateParams {
                        object_type: ObjectType::TitaniumCube,
                        position: *position,
                        ..ObjectCreateParams::default()
                    }));
                    TaskResult::Done(ErrorCode::Ok)
                } else {
                    TaskResult::Pending
                }
            }
            Task::Sniff { progress } => {
                *progress += elapsed / Fixed::from_num(1.5);
                if *progress >= Fixed::from_num(1) {
                    commands.push(SimCommand::Spawn(ObjectCreateParams {
                        object_type: ObjectType::Marker,
                        position: body.position,
                        ..ObjectCreateParams::default()
                    }));
                    TaskResult::Done(ErrorCode::Ok)
                } else {
                    TaskResult::Pending
                }
            }
            Task::Thump { progress } => {
                *progress += elapsed / Fixed::from_num(2);
                if *progress >= Fixed::from_num(1) {
                    TaskResult::Done(ErrorCode::Ok)
                } else {
                    TaskResult::Pending
                }
            }
            Task::Shield { ramp, lower, .. } => {
                if *lower {
                    return TaskResult::Done(ErrorCode::Ok);
                }
                if *ramp < Fixed::from_num(1) {
                    *ramp = (*ramp + elapsed).min(Fixed::from_num(1));
                }
                body.energy =
                    (body.energy - Fixed::from_num(SHIELD_DRAIN) * elapsed).max(Fixed::ZERO);
                if body.energy == Fixed::ZERO {
                    TaskResult::Done(ErrorCode::Ok)
                } else {
                    TaskResult::Pending
                }
            }
            Task::Aim {
                progress, possible, ..
            } => {
                if !*possible {
                    return TaskResult::Done(ErrorCode::AimImpossible);
                }
                *progress += elapsed / Fixed::from_num(0.5);
                if *progress >= Fixed::from_num(1) {
                    TaskResult::Done(ErrorCode::Ok)
                } else {
                    TaskResult::Pending
                }
            }
        }
    }

    /// True for the shield background task.
    #[must_use]
    pub const fn is_shield(&self) -> bool {
        matches!(self, Task::Shield { .. })
    }
}

/// The two per-object action slots.
///
/// Invariants: starting a foreground task while one is active never
/// changes the running task and reports [`ErrorCode::Busy`]; the
/// background slot is fully independent of the foreground slot.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TaskExecutor {
    foreground: Option<Task>,
    fg_result: Option<ErrorCode>,
    background: Option<Task>,
    bg_result: Option<ErrorCode>,
}

impl TaskExecutor {
    /// Start a foreground task. Fails with `Busy` while one is active,
    /// leaving the running task untouched.
    pub fn start_foreground(&mut self, task: Task) -> ErrorCode {
        if self.foreground.is_some() {
            return ErrorCode::Busy;
        }
        self.fg_result = None;
        self.foreground = Some(task);
        ErrorCode::Ok
    }

    /// Start or refresh a background task.
    ///
    /// Refreshing a running shield updates its radius without restarting
    /// the ramp-up; any other combination replaces the slot.
    pub fn start_background(&mut self, task: Task) -> ErrorCode {
        if let (
            Some(Task::Shield { radius, .. }),
            Task::Shield {
                radius: new_radius, ..
            },
        ) = (&mut self.background, &task)
        {
            *radius = *new_radius;
            return ErrorCode::Ok;
        }
        self.bg_result = None;
        self.background = Some(task);
        ErrorCode::Ok
    }

    /// Request the background task to come down.
    ///
    /// Distinct from completion: a lowered shield finishes with `Ok` on
    /// its next advance; a non-shield background task is dropped with a
    /// `Stop` result.
    pub fn request_background_down(&mut self) {
        match &mut self.background {
            Some(Task::Shield { lower, .. }) => *lower = true,
            Some(_) => {
                self.background = None;
                self.bg_result = Some(ErrorCode::Stop);
            }
            None => {}
        }
    }

    /// Whether a foreground task is in flight.
    #[must_use]
    pub const fn foreground_active(&self) -> bool {
        self.foreground.is_some()
    }

    /// Whether a background task is in flight.
    #[must_use]
    pub const fn background_active(&self) -> bool {
        self.background.is_some()
    }

    /// The in-flight foreground task, if any.
    #[must_use]
    pub const fn foreground(&self) -> Option<&Task> {
        self.foreground.as_ref()
    }

    /// The in-flight background task, if any.
    #[must_use]
    pub const fn background(&self) -> Option<&Task> {
        self.background.as_ref()
    }

    /// Consume the result of the last finished foreground task.
    pub fn take_foreground_result(&mut self) -> Option<ErrorCode> {
        self.fg_result.take()
    }

    /// Consume the result of the last finished background task.
    pub fn take_background_result(&mut self) -> Option<ErrorCode> {
        self.bg_result.take()
    }
}

/// Advance both task slots of one object by one tick.
///
/// The tasks are temporarily taken out of the executor so they can
/// mutate the object body they belong to. Returns the foreground result
/// if the foreground task finished this tick.
pub fn advance_tasks(
    body: &mut Object,
    elapsed: Fixed,
    commands: &mut Vec<SimCommand>,
) -> Option<ErrorCode> {
    let mut finished = None;

    if let Some(mut task) = body.tasks.foreground.take() {
        match task.advance(body, elapsed, commands) {
            TaskResult::Pending => body.tasks.foreground = Some(task),
            TaskResult::Done(code) => {
                tracing::debug!(object = %body.id, ?code, "foreground task finished");
                body.tasks.fg_result = Some(code);
                finished = Some(code);
            }
        }
    }

    if let Some(mut task) = body.tasks.background.take() {
        match task.advance(body, elapsed, commands) {
            TaskResult::Pending => body.tasks.background = Some(task),
            TaskResult::Done(code) => {
                body.tasks.bg_result = Some(code);
            }
        }
    }

    finished
}
