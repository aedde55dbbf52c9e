//! Building behaviors: multi-frame finite-state machines attached to
//! objects at construction.
//!
//! An automaton animates its building over many ticks (factory doors,
//! manufacturing, ...) and exposes a busy flag scripts poll through
//! `isbusy()`. Phase timing is driven by a progress fraction that
//! accumulates `elapsed * speed` per tick; visual and audio side effects
//! are delegated to the injected sinks at transition points.

use serde::{Deserialize, Serialize};

use crate::effects::{ParticleKind, ParticleSink, SoundKind, SoundSink};
use crate::error::{ErrorCode, GameError, Result};
use crate::events::SimCommand;
use crate::math::{fixed_serde, Fixed, Vec3Fixed};
use crate::object::{Object, ObjectCreateParams, ObjectId};
use crate::object_type::ObjectType;
use crate::persist::Line;

/// Phases of the vehicle factory cycle.
///
/// The machine is cyclic: a completed job re-enters `Wait`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum FactoryPhase {
    /// Idle, accepting orders.
    #[default]
    Wait,
    /// Lower the entry shell.
    CloseShell,
    /// Close the roof.
    CloseTop,
    /// Manufacture the vehicle.
    Build,
    /// Reopen the roof.
    OpenTop,
    /// Raise the entry shell.
    OpenShell,
}

impl FactoryPhase {
    /// Target duration of this phase, seconds.
    fn duration(self) -> Fixed {
        let secs = match self {
            Self::Wait => 0,
            Self::CloseShell => 2,
            Self::CloseTop => 1,
            Self::Build => 10,
            Self::OpenTop => 1,
            Self::OpenShell => 2,
        };
        Fixed::from_num(secs)
    }

    /// The phase entered when this one completes.
    fn next(self) -> Self {
        match self {
            Self::Wait => Self::Wait,
            Self::CloseShell => Self::CloseTop,
            Self::CloseTop => Self::Build,
            Self::Build => Self::OpenTop,
            Self::OpenTop => Self::OpenShell,
            Self::OpenShell => Self::Wait,
        }
    }

    /// Stable numeric code for persistence.
    #[must_use]
    pub const fn code(self) -> i64 {
        match self {
            Self::Wait => 0,
            Self::CloseShell => 1,
            Self::CloseTop => 2,
            Self::Build => 3,
            Self::OpenTop => 4,
            Self::OpenShell => 5,
        }
    }

    /// Inverse of [`code`](Self::code).
    #[must_use]
    pub const fn from_code(code: i64) -> Option<Self> {
        match code {
            0 => Some(Self::Wait),
            1 => Some(Self::CloseShell),
            2 => Some(Self::CloseTop),
            3 => Some(Self::Build),
            4 => Some(Self::OpenTop),
            5 => Some(Self::OpenShell),
            _ => None,
        }
    }
}

/// How far in front of the factory a finished vehicle appears.
const EXIT_OFFSET: f32 = 12.0;
/// Spark cadence while manufacturing, seconds.
const SPARK_PERIOD: f32 = 0.4;

/// The vehicle factory controller.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FactoryAuto {
    phase: FactoryPhase,
    #[serde(with = "fixed_serde")]
    progress: Fixed,
    #[serde(with = "fixed_serde")]
    speed: Fixed,
    /// Vehicle type being manufactured, while busy.
    building: Option<ObjectType>,
    /// Titanium cube locked for the current job.
    resource: Option<ObjectId>,
    /// The vehicle spawned mid-cycle, unlocked when the cycle ends.
    pending_vehicle: Option<ObjectId>,
    /// Particle cadence timer. Derived state, reset on level load.
    #[serde(with = "fixed_serde")]
    fx_timer: Fixed,
}

impl FactoryAuto {
    /// Current phase.
    #[must_use]
    pub const fn phase(&self) -> FactoryPhase {
        self.phase
    }

    /// Busy for every phase except `Wait`.
    #[must_use]
    pub fn is_busy(&self) -> bool {
        self.phase != FactoryPhase::Wait
    }

    /// Begin manufacturing.
    ///
    /// The caller has already validated the preconditions (resource in
    /// reach and locked, exit clear, research done); this only enforces
    /// the busy contract. Repeated calls while busy are rejected without
    /// side effects.
    pub fn begin(&mut self, vehicle: ObjectType, resource: ObjectId) -> ErrorCode {
        if self.is_busy() {
            return ErrorCode::Busy;
        }
        self.building = Some(vehicle);
        self.resource = Some(resource);
        self.enter(FactoryPhase::CloseShell);
        ErrorCode::Ok
    }

    fn enter(&mut self, phase: FactoryPhase) {
        self.phase = phase;
        self.progress = Fixed::ZERO;
        let duration = phase.duration();
        self.speed = if duration == Fixed::ZERO {
            Fixed::ZERO
        } else {
            Fixed::from_num(1) / duration
        };
    }

    /// Advance by one tick. Returns the phase entered this tick, if a
    /// transition happened.
    pub fn advance(
        &mut self,
        body: &Object,
        elapsed: Fixed,
        particles: &mut dyn ParticleSink,
        sound: &mut dyn SoundSink,
        commands: &mut Vec<SimCommand>,
    ) -> Option<FactoryPhase> {
        if self.phase == FactoryPhase::Wait {
            return None;
        }

        if self.phase == FactoryPhase::Build {
            self.fx_timer += elapsed;
            if self.fx_timer >= Fixed::from_num(SPARK_PERIOD) {
                self.fx_timer = Fixed::ZERO;
                particles.create_particle(
                    body.position,
                    Vec3Fixed::ZERO,
                    Fixed::from_num(1),
                    ParticleKind::Spark,
                    Fixed::from_num(0.5),
                );
            }
        }

        self.progress += elapsed * self.speed;
        if self.progress < Fixed::from_num(1) {
            return None;
        }

        // Phase complete: fire its exit effects, then move on.
        match self.phase {
            FactoryPhase::Build => {
                if let (Some(vehicle), Some(resource)) = (self.building, self.resource) {
                    commands.push(SimCommand::Despawn(resource));
                    let dir = crate::math::heading_vector(body.rotation);
                    commands.push(SimCommand::Spawn(ObjectCreateParams {
                        object_type: vehicle,
                        position: Vec3Fixed::new(
                            body.position.x + dir.x * Fixed::from_num(EXIT_OFFSET),
                            body.position.y,
                            body.position.z + dir.z * Fixed::from_num(EXIT_OFFSET),
                        ),
                        rotation: body.rotation,
                        team: body.team,
                        locked: true,
                        ..ObjectCreateParams::default()
                    }));
                }
            }
            FactoryPhase::OpenShell => {
                if let Some(vehicle) = self.pending_vehicle.take() {
                    commands.push(SimCommand::Unlock(vehicle));
                }
                self.building = None;
                self.resource = None;
            }
            _ => {}
        }

        let next = self.phase.next();
        let channel = sound.play(
            SoundKind::Factory,
            body.position,
            Fixed::from_num(1),
            Fixed::from_num(1),
            false,
        );
        // Fade the machinery out over the phase it accompanies.
        sound.add_envelope(channel, Fixed::ZERO, Fixed::from_num(1), next.duration());
        self.enter(next);
        tracing::debug!(object = %body.id, phase = ?next, "factory phase change");
        Some(next)
    }

    /// Whether the factory spawned a vehicle and is waiting to learn its
    /// id.
    #[must_use]
    pub fn awaiting_vehicle(&self) -> bool {
        self.building.is_some()
            && self.pending_vehicle.is_none()
            && matches!(self.phase, FactoryPhase::OpenTop | FactoryPhase::OpenShell)
    }

    /// Record the id of the vehicle spawned for the current job.
    pub fn set_pending_vehicle(&mut self, id: ObjectId) {
        self.pending_vehicle = Some(id);
    }

    /// Persist phase, progress and speed. Nothing to persist in `Wait`.
    pub fn write_line(&self, line: &mut Line) -> bool {
        if self.phase == FactoryPhase::Wait {
            return false;
        }
        line.add_param("aExist", true);
        line.add_param("aPhase", self.phase.code());
        line.add_param("aProgress", self.progress);
        line.add_param("aSpeed", self.speed);
        true
    }

    /// Inverse of [`write_line`]. Derived fields (particle timer, job
    /// bookkeeping) are re-seeded to their defaults, not read.
    pub fn read_line(&mut self, line: &Line) -> Result<()> {
        if !line.param("aExist").as_bool(false) {
            return Ok(());
        }
        let code = line.param("aPhase").as_int(0);
        self.phase = FactoryPhase::from_code(code).ok_or_else(|| GameError::InvalidState(
            format!("unknown factory phase {code}"),
        ))?;
        self.progress = line.param("aProgress").as_number(Fixed::ZERO);
        self.speed = line.param("aSpeed").as_number(Fixed::ZERO);
        self.fx_timer = Fixed::ZERO;
        self.building = None;
        self.resource = None;
        self.pending_vehicle = None;
        Ok(())
    }
}

/// Maximum number of info pairs an exchange post stores.
pub const MAX_INFO: usize = 10;

/// One stored name/value pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InfoEntry {
    /// Key, never empty.
    pub name: String,
    /// Stored value.
    #[serde(with = "fixed_serde")]
    pub value: Fixed,
}

/// The information exchange post controller.
///
/// Nearby bots `send` and `receive` named values through it. It has no
/// animated phases; it is never busy.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExchangePostAuto {
    info: Vec<InfoEntry>,
}

impl ExchangePostAuto {
    /// Store or overwrite a named value. Fails with `Impossible` when
    /// the store is full and the name is new.
    pub fn set_info(&mut self, name: &str, value: Fixed) -> ErrorCode {
        if let Some(entry) = self.info.iter_mut().find(|e| e.name == name) {
            entry.value = value;
            return ErrorCode::Ok;
        }
        if self.info.len() >= MAX_INFO {
            return ErrorCode::Impossible;
        }
        self.info.push(InfoEntry {
            name: name.to_owned(),
            value,
        });
        ErrorCode::Ok
    }

    /// Look up a named value.
    #[must_use]
    pub fn get_info(&self, name: &str) -> Option<Fixed> {
        self.info.iter().find(|e| e.name == name).map(|e| e.value)
    }

    /// Remove a named value; true if it existed.
    pub fn delete_info(&mut self, name: &str) -> bool {
        let before = self.info.len();
        self.info.retain(|e| e.name != name);
        self.info.len() != before
    }

    /// Whether a named value exists.
    #[must_use]
    pub fn test_info(&self, name: &str) -> bool {
        self.info.iter().any(|e| e.name == name)
    }

    /// Number of stored pairs.
    #[must_use]
    pub fn len(&self) -> usize {
        self.info.len()
    }

    /// Whether the store is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.info.is_empty()
    }

    /// Persist the store as `info1..info10` `name=value` params.
    pub fn write_line(&self, line: &mut Line) -> bool {
        if self.info.is_empty() {
            return false;
        }
        for (i, entry) in self.info.iter().enumerate() {
            line.add_param(format!("info{}", i + 1), format!("{}={}", entry.name, entry.value));
        }
        true
    }

    /// Inverse of [`write_line`]. A pair that does not split into a
    /// non-empty name and a parseable value fails, naming the offending
    /// param.
    pub fn read_line(&mut self, line: &Line) -> Result<()> {
        self.info.clear();
        for i in 1..=MAX_INFO {
            let key = format!("info{i}");
            if !line.param(&key).is_present() {
                continue;
            }
            let raw = line.param(&key).as_text("");
            let malformed = || GameError::MalformedInfo {
                param: key.clone(),
                value: raw.clone(),
            };
            let (name, value) = raw.split_once('=').ok_or_else(malformed)?;
            if name.is_empty() {
                return Err(malformed());
            }
            let value: Fixed = value.parse().map_err(|_| malformed())?;
            self.info.push(InfoEntry {
                name: name.to_owned(),
                value,
            });
        }
        Ok(())
    }
}

/// The automaton attached to an object, when its type has one.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Auto {
    /// Vehicle factory controller.
    Factory(FactoryAuto),
    /// Information exchange post controller.
    ExchangePost(ExchangePostAuto),
}

impl Auto {
    /// The automaton a freshly constructed object of this type carries.
    #[must_use]
    pub fn for_type(object_type: ObjectType) -> Option<Self> {
        match object_type {
            ObjectType::BotFactory => Some(Self::Factory(FactoryAuto::default())),
            ObjectType::ExchangePost => Some(Self::ExchangePost(ExchangePostAuto::default())),
            _ => None,
        }
    }

    /// Busy for every non-idle phase.
    #[must_use]
    pub fn is_busy(&self) -> bool {
        match self {
            Self::Factory(auto) => auto.is_busy(),
            Self::ExchangePost(_) => false,
        }
    }

    /// Advance by one tick.
    pub fn advance(
        &mut self,
        body: &Object,
        elapsed: Fixed,
        particles: &mut dyn ParticleSink,
        sound: &mut dyn SoundSink,
        commands: &mut Vec<SimCommand>,
    ) -> Option<FactoryPhase> {
        match self {
            Self::Factory(auto) => auto.advance(body, elapsed, particles, sound, commands),
            Self::ExchangePost(_) => None,
        }
    }

    /// Persist non-idle state; false means nothing was written.
    pub fn write_line(&self, line: &mut Line) -> bool {
        match self {
            Self::Factory(auto) => auto.write_line(line),
            Self::ExchangePost(auto) => auto.write_line(line),
        }
    }

    /// Restore from a persisted line.
    pub fn read_line(&mut self, line: &Line) -> Result<()> {
        match self {
            Self::Factory(auto) => auto.read_line(line),
            Self::ExchangePost(auto) => auto.read_line(line),
        }
    }

    /// Downcast to the factory controller.
    #[must_use]
    pub fn as_factory_mut(&mut self) -> Option<&mut FactoryAuto> {
        match self {
            Self::Factory(auto) => Some(auto),
            Self::ExchangePost(_) => None,
        }
    }

    /// Downcast to the exchange post controller.
    #[must_use]
    pub fn as_exchange_post_mut(&mut self) -> Option<&mut ExchangePostAuto> {
        match self {
            Self::Factory(_) => None,
            Self::ExchangePost(auto) => Some(auto),
        }
    }

    /// Shared-reference downcast to the exchange post controller.
    #[must_use]
    pub fn as_exchange_post(&self) -> Option<&ExchangePostAuto> {
        match self {
            Self::Factory(_) => None,
            Self::ExchangePost(auto) => Some(auto),
        }
    }
}
