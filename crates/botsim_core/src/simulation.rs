//! The frame-stepped simulation driver.
//!
//! Single-threaded, cooperative: one logical tick per rendered frame, in
//! which every live object's automaton and task slots advance exactly
//! once, in registry iteration order. Ticks run inside a scan guard so
//! same-tick deletions tombstone instead of compacting; world mutations
//! requested mid-advance go through a command buffer applied in order.

use crate::automaton::Auto;
use crate::effects::{GeometryFactory, NullGeometry, NullParticles, NullSound, ParticleSink, SoundSink};
use crate::error::{ErrorCode, Result};
use crate::events::{SimCommand, TickEvents};
use crate::math::{Fixed, Vec3Fixed, G_UNIT};
use crate::object::{ObjectCreateParams, ObjectId};
use crate::object_type::ObjectType;
use crate::radar::RadarQuery;
use crate::registry::ObjectRegistry;
use crate::research::{ResearchKind, ResearchState};
use crate::task::{advance_tasks, Task};

/// How close a titanium cube must be for a factory to use it, game
/// units.
const FACTORY_REACH: f32 = 8.0;
/// Clearance a factory needs around its exit, game units.
const FACTORY_CLEARANCE: f32 = 6.0;

/// The simulation: registry, mission state and the tick loop.
pub struct Simulation {
    registry: ObjectRegistry,
    research: ResearchState,
    tick: u64,
    time: Fixed,
    geometry: Box<dyn GeometryFactory>,
    particles: Box<dyn ParticleSink>,
    sound: Box<dyn SoundSink>,
    pending_messages: Vec<(ObjectId, String)>,
    mission_result: Option<i64>,
}

impl Simulation {
    /// Create a simulation wired to real presentation collaborators.
    #[must_use]
    pub fn new(
        geometry: Box<dyn GeometryFactory>,
        particles: Box<dyn ParticleSink>,
        sound: Box<dyn SoundSink>,
    ) -> Self {
        Self {
            registry: ObjectRegistry::new(),
            research: ResearchState::new(),
            tick: 0,
            time: Fixed::ZERO,
            geometry,
            particles,
            sound,
            pending_messages: Vec::new(),
            mission_result: None,
        }
    }

    /// Create a simulation with null collaborators (tests, servers).
    #[must_use]
    pub fn headless() -> Self {
        Self::new(
            Box::new(NullGeometry),
            Box::new(NullParticles),
            Box::new(NullSound),
        )
    }

    /// The object registry.
    #[must_use]
    pub fn registry(&self) -> &ObjectRegistry {
        &self.registry
    }

    /// The object registry, mutably.
    pub fn registry_mut(&mut self) -> &mut ObjectRegistry {
        &mut self.registry
    }

    /// Mission research/build state.
    #[must_use]
    pub fn research(&self) -> &ResearchState {
        &self.research
    }

    /// Mission research/build state, mutably.
    pub fn research_mut(&mut self) -> &mut ResearchState {
        &mut self.research
    }

    /// The sound collaborator (music control goes straight through).
    pub fn sound_mut(&mut self) -> &mut dyn SoundSink {
        self.sound.as_mut()
    }

    /// Number of completed ticks.
    #[must_use]
    pub const fn tick_count(&self) -> u64 {
        self.tick
    }

    /// Absolute simulation time, seconds.
    #[must_use]
    pub const fn time(&self) -> Fixed {
        self.time
    }

    /// Mission end result, once a script ended the mission.
    #[must_use]
    pub const fn mission_result(&self) -> Option<i64> {
        self.mission_result
    }

    /// End the mission with a result code.
    pub fn end_mission(&mut self, result: i64) {
        self.mission_result = Some(result);
    }

    /// Post an on-screen message tied to an object; surfaces in the
    /// next tick's events.
    pub fn post_message(&mut self, object: ObjectId, text: impl Into<String>) {
        self.pending_messages.push((object, text.into()));
    }

    /// Create an object through the geometry factory.
    pub fn create_object(&mut self, params: ObjectCreateParams) -> Result<ObjectId> {
        self.registry.create_object(params, self.geometry.as_mut())
    }

    /// Delete an object (cascading to cargo). False for unknown ids.
    pub fn delete_object(&mut self, id: ObjectId) -> bool {
        self.registry.delete_object(id)
    }

    /// Create an object the way the scripted `produce` does.
    ///
    /// Egg-laying creatures also get one inert egg at the same spot, and
    /// start with their activity suspended.
    pub fn produce(&mut self, params: ObjectCreateParams) -> Result<ObjectId> {
        let egg_layer = params.object_type.is_egg_layer();
        let mut params = params;
        if egg_layer {
            params.activity = false;
        }
        let position = params.position;
        let team = params.team;
        let id = self.create_object(params)?;

        if egg_layer {
            self.create_object(ObjectCreateParams {
                object_type: ObjectType::AlienEgg,
                position,
                team,
                activity: false,
                ..ObjectCreateParams::default()
            })?;
        }
        Ok(id)
    }

    /// Start a foreground task on an object.
    pub fn start_task(&mut self, id: ObjectId, task: Task) -> ErrorCode {
        match self.registry.get_mut(id) {
            Some(obj) => obj.tasks.start_foreground(task),
            None => ErrorCode::WrongObject,
        }
    }

    /// Start or refresh a background task on an object.
    pub fn start_background_task(&mut self, id: ObjectId, task: Task) -> ErrorCode {
        match self.registry.get_mut(id) {
            Some(obj) => obj.tasks.start_background(task),
            None => ErrorCode::WrongObject,
        }
    }

    /// Request an object's background task to come down.
    pub fn cancel_background(&mut self, id: ObjectId) {
        if let Some(obj) = self.registry.get_mut(id) {
            obj.tasks.request_background_down();
        }
    }

    /// Order a factory to manufacture a vehicle.
    ///
    /// Validates the full precondition set before touching anything: the
    /// target must be an idle factory, the type researched, a free
    /// titanium cube in reach, and the exit clear of in-progress
    /// vehicles. On success the cube is locked and the cycle starts; on
    /// any failure nothing changes.
    pub fn start_factory(&mut self, factory_id: ObjectId, vehicle: ObjectType) -> ErrorCode {
        let Some(factory) = self.registry.get(factory_id) else {
            return ErrorCode::WrongObject;
        };
        if factory.object_type != ObjectType::BotFactory {
            return ErrorCode::WrongObject;
        }
        if factory.is_busy() {
            return ErrorCode::Busy;
        }
        if !vehicle.is_vehicle() {
            return ErrorCode::WrongObject;
        }
        if !self.research.can_build(vehicle) {
            return ErrorCode::NotResearched;
        }

        let position = factory.position;
        let facing = factory.rotation;

        let cube = self
            .registry
            .radar_all(&RadarQuery {
                origin: Some(factory_id),
                origin_position: position,
                origin_facing: facing,
                type_filter: vec![ObjectType::TitaniumCube],
                max_dist: Fixed::from_num(FACTORY_REACH),
                ..RadarQuery::default()
            })
            .into_iter()
            .find(|&id| self.registry.get(id).is_some_and(|o| !o.locked));
        let Some(cube) = cube else {
            return ErrorCode::NoResource;
        };

        let blocked = self
            .registry
            .radar_all(&RadarQuery {
                origin: Some(factory_id),
                origin_position: position,
                origin_facing: facing,
                type_filter: vec![vehicle],
                max_dist: Fixed::from_num(FACTORY_CLEARANCE),
                ..RadarQuery::default()
            })
            .into_iter()
            .any(|id| self.registry.get(id).is_some_and(|o| o.locked));
        if blocked {
            return ErrorCode::TooClose;
        }

        // Preconditions hold; lock the cube and start the cycle.
        if let Some(cube_obj) = self.registry.get_mut(cube) {
            cube_obj.locked = true;
        }
        let auto = self
            .registry
            .get_mut(factory_id)
            .and_then(|o| o.auto.as_mut())
            .and_then(Auto::as_factory_mut);
        match auto {
            Some(auto) => auto.begin(vehicle, cube),
            None => ErrorCode::WrongObject,
        }
    }

    /// Complete a research program on a research center.
    pub fn start_research(&mut self, center_id: ObjectId, kind: ResearchKind) -> ErrorCode {
        let Some(center) = self.registry.get(center_id) else {
            return ErrorCode::WrongObject;
        };
        if center.object_type != ObjectType::ResearchCenter {
            return ErrorCode::WrongObject;
        }
        if self.research.is_done(kind) {
            return ErrorCode::Ok;
        }
        self.research.mark_done(kind);
        ErrorCode::Ok
    }

    /// Find a free spot near `center` with `clearance` game units of
    /// space around it, probing outward on a deterministic square
    /// spiral.
    #[must_use]
    pub fn flat_space(&self, center: Vec3Fixed, clearance: Fixed) -> Vec3Fixed {
        let clearance_world = clearance * G_UNIT;
        let step = clearance_world.max(Fixed::from_num(4));

        for ring in 0..16 {
            let radius = step * Fixed::from_num(ring);
            let offsets: [(i32, i32); 8] = [
                (1, 0),
                (1, 1),
                (0, 1),
                (-1, 1),
                (-1, 0),
                (-1, -1),
                (0, -1),
                (1, -1),
            ];
            let candidates: Vec<Vec3Fixed> = if ring == 0 {
                vec![center]
            } else {
                offsets
                    .iter()
                    .map(|&(ox, oz)| {
                        Vec3Fixed::new(
                            center.x + radius * Fixed::from_num(ox),
                            center.y,
                            center.z + radius * Fixed::from_num(oz),
                        )
                    })
                    .collect()
            };

            for candidate in candidates {
                let clearance_sq = clearance_world.saturating_mul(clearance_world);
                let occupied = self.registry.iter().any(|o| {
                    o.position.horizontal_distance_squared(candidate) < clearance_sq
                });
                if !occupied {
                    return candidate;
                }
            }
        }

        // Crowded beyond the probe horizon; give the caller the center.
        center
    }

    /// Advance the whole world by one tick.
    ///
    /// Every active object's automaton and tasks advance exactly once,
    /// in registry order. Objects deleted mid-tick stay safely
    /// addressable (tombstoned) until the tick ends.
    pub fn tick(&mut self, elapsed: Fixed) -> TickEvents {
        let mut events = TickEvents::default();
        events.messages = std::mem::take(&mut self.pending_messages);

        self.registry.begin_scan();
        let ids = self.registry.live_ids();

        for id in ids {
            let Some(obj) = self.registry.get(id) else {
                // Deleted earlier this same tick.
                continue;
            };
            if !obj.activity {
                continue;
            }

            self.advance_automaton(id, elapsed, &mut events);

            let mut commands = Vec::new();
            if let Some(obj) = self.registry.get_mut(id) {
                if let Some(code) = advance_tasks(obj, elapsed, &mut commands) {
                    events.finished_tasks.push((id, code));
                }
            }
            self.apply_commands(commands, &mut events);
        }

        self.registry.end_scan();
        self.tick += 1;
        self.time += elapsed;

        #[cfg(debug_assertions)]
        {
            let hash = self.registry.state_hash();
            tracing::trace!(tick = self.tick, state_hash = hash, "tick complete");
        }

        events
    }

    fn advance_automaton(&mut self, id: ObjectId, elapsed: Fixed, events: &mut TickEvents) {
        let Some(mut auto) = self.registry.get_mut(id).and_then(|o| o.auto.take()) else {
            return;
        };

        // The automaton is out of its object for the duration of the
        // advance, so the body can be read while commands mutate the
        // registry afterwards.
        let body = match self.registry.get(id) {
            Some(obj) => obj.clone(),
            None => {
                return;
            }
        };

        let mut commands = Vec::new();
        let phase = auto.advance(
            &body,
            elapsed,
            self.particles.as_mut(),
            self.sound.as_mut(),
            &mut commands,
        );
        if let Some(phase) = phase {
            events.phase_changes.push((id, phase));
        }

        let spawned = self.apply_commands(commands, events);
        if let Some(factory) = auto.as_factory_mut() {
            if factory.awaiting_vehicle() {
                if let Some(&vehicle) = spawned.first() {
                    factory.set_pending_vehicle(vehicle);
                }
            }
        }

        if let Some(obj) = self.registry.get_mut(id) {
            obj.auto = Some(auto);
        }
    }

    fn apply_commands(
        &mut self,
        commands: Vec<SimCommand>,
        events: &mut TickEvents,
    ) -> Vec<ObjectId> {
        let mut spawned = Vec::new();
        for command in commands {
            match command {
                SimCommand::Spawn(params) => {
                    match self.registry.create_object(params, self.geometry.as_mut()) {
                        Ok(id) => {
                            spawned.push(id);
                            events.spawned.push(id);
                        }
                        Err(error) => {
                            tracing::warn!(%error, "deferred spawn failed");
                        }
                    }
                }
                SimCommand::Despawn(id) => {
                    if self.registry.delete_object(id) {
                        events.removed.push(id);
                    }
                }
                SimCommand::Destroy(id, kind) => {
                    if self.registry.delete_object(id) {
                        events.destroyed.push((id, kind));
                    }
                }
                SimCommand::Attach { carrier, cargo } => {
                    if self.registry.get(cargo).is_some() {
                        if let Some(obj) = self.registry.get_mut(carrier) {
                            obj.cargo = Some(cargo);
                        }
                        if let Some(obj) = self.registry.get_mut(cargo) {
                            obj.transporter = Some(carrier);
                        }
                    }
                }
                SimCommand::Detach { carrier, position } => {
                    let cargo = self
                        .registry
                        .get_mut(carrier)
                        .and_then(|obj| obj.cargo.take());
                    if let Some(cargo) = cargo {
                        if let Some(obj) = self.registry.get_mut(cargo) {
                            obj.transporter = None;
                            obj.position = position;
                        }
                    }
                }
                SimCommand::Unlock(id) => {
                    if let Some(obj) = self.registry.get_mut(id) {
                        obj.locked = false;
                    }
                }
                SimCommand::SetActivity(id, active) => {
                    if let Some(obj) = self.registry.get_mut(id) {
                        obj.activity = active;
                    }
                }
            }
        }
        spawned
    }
}

impl Default for Simulation {
    fn default() -> Self {
        Self::headless()
    }
}
