//! The native-function bridge: where script calls become world actions.
//!
//! Every verb follows one protocol. A fresh call validates its
//! arguments, resolves an implicit target if none was given, and starts
//! the underlying task or automaton action; the cooperative interpreter
//! then re-invokes the same call each tick, which polls the in-flight
//! action until it reports a result. Failures surface as a hard script
//! exception or as a plain result code depending on the script's
//! error-mode, except for the codes the protocol pins: missing/wrong
//! targets and enemy targets always escalate, an impossible aim never
//! does, and a graceful stop counts as success.

use botsim_core::error::ErrorCode;
use botsim_core::math::{self, Fixed, Vec3Fixed};
use botsim_core::object::{Capabilities, Object, ObjectCreateParams, ObjectId};
use botsim_core::object_type::ObjectType;
use botsim_core::radar::RadarQuery;
use botsim_core::simulation::Simulation;
use botsim_core::task::Task;

use crate::signature::{self, ScriptError, Verb};
use crate::value::{
    angle_from_world, angle_to_world, length_from_world, length_to_world, point_from_world,
    point_to_world, ScriptPoint, Value,
};

/// How soft failure codes reach the script.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ErrorMode {
    /// Soft failures become ordinary return values.
    Continue,
    /// Soft failures raise script exceptions.
    #[default]
    Stop,
}

/// Result of one native call, per tick.
#[derive(Debug, Clone, PartialEq)]
pub enum ScriptPoll {
    /// Still running; re-invoke next tick.
    Pending,
    /// Finished with a value.
    Done(Value),
    /// Hard failure; the script raises an exception.
    Failed(ErrorCode),
    /// The script must stop executing immediately (its object is gone).
    Ended,
}

/// Reach of an implicit grab target, game units.
const GRAB_REACH: f32 = 3.0;
/// Reach of an implicit recycle target, game units.
const RECYCLE_REACH: f32 = 5.0;
/// Reach of a build site's titanium cube, game units.
const BUILD_REACH: f32 = 10.0;
/// Reach of the nearest exchange post, game units.
const INFO_REACH: f32 = 10.0;
/// Detection cone range, game units.
const DETECT_RANGE: f32 = 100.0;
/// Turret swing limit, radians.
const AIM_LIMIT: f32 = 0.7;

/// Per-script execution context bound to one object.
///
/// Holds only the script-side state (error-mode, the in-flight verb);
/// all world state stays in the simulation and is re-resolved by id on
/// every call.
#[derive(Debug)]
pub struct ScriptContext {
    object: ObjectId,
    error_mode: ErrorMode,
    in_flight: Option<Verb>,
    instructions_per_frame: u32,
    music_channel: Option<u32>,
}

impl ScriptContext {
    /// Bind a context to the object running the script.
    #[must_use]
    pub fn new(object: ObjectId) -> Self {
        Self {
            object,
            error_mode: ErrorMode::default(),
            in_flight: None,
            instructions_per_frame: 100,
            music_channel: None,
        }
    }

    /// The bound object's id.
    #[must_use]
    pub const fn object(&self) -> ObjectId {
        self.object
    }

    /// Current error-mode.
    #[must_use]
    pub const fn error_mode(&self) -> ErrorMode {
        self.error_mode
    }

    /// Configured instruction budget per frame.
    #[must_use]
    pub const fn instructions_per_frame(&self) -> u32 {
        self.instructions_per_frame
    }

    /// Execute one native call.
    ///
    /// Returns [`ScriptPoll::Pending`] while an asynchronous verb is in
    /// flight; the interpreter re-invokes the same call next tick.
    /// Signature errors are compile-phase bugs and come back as
    /// [`ScriptError`], separate from in-world failures.
    pub fn invoke(
        &mut self,
        sim: &mut Simulation,
        verb: Verb,
        args: &[Value],
    ) -> Result<ScriptPoll, ScriptError> {
        signature::check(verb, args)?;

        // A call already in flight means this is the cooperative
        // re-invocation: poll it instead of starting anything.
        if self.in_flight.is_some() {
            return Ok(self.resume(sim));
        }

        let Some(me) = sim.registry().get(self.object).cloned() else {
            return Ok(ScriptPoll::Ended);
        };

        Ok(match verb {
            Verb::Goto => self.foreground(sim, &me, verb, Task::Goto {
                target: world_position(args),
            }),
            Verb::Move => {
                let dist = number(args, 0);
                self.foreground(sim, &me, verb, Task::Move {
                    remaining: length_to_world(dist),
                })
            }
            Verb::Turn => {
                let degrees = number(args, 0);
                self.foreground(sim, &me, verb, Task::Turn {
                    remaining: angle_to_world(degrees),
                })
            }
            Verb::Wait => self.foreground(sim, &me, verb, Task::Wait {
                remaining: number(args, 0),
            }),
            Verb::Grab => self.grab(sim, &me),
            Verb::Drop => self.drop_cargo(sim, &me),
            Verb::Sniff => {
                if !is_sniffer(me.object_type) {
                    return Ok(self.surface(sim, ErrorCode::WrongObject));
                }
                self.foreground(sim, &me, verb, Task::Sniff {
                    progress: Fixed::ZERO,
                })
            }
            Verb::Thump => {
                if me.object_type != ObjectType::Thumper {
                    return Ok(self.surface(sim, ErrorCode::WrongObject));
                }
                self.foreground(sim, &me, verb, Task::Thump {
                    progress: Fixed::ZERO,
                })
            }
            Verb::Recycle => self.recycle(sim, &me),
            Verb::Fire => self.fire(sim, &me, args),
            Verb::Aim => self.aim(sim, args),
            Verb::Shield => self.shield(sim, &me, args),
            Verb::Build => self.build(sim, &me, args),
            Verb::TakeOff => {
                if !me.implements(Capabilities::JET_FLYING) {
                    return Ok(self.surface(sim, ErrorCode::WrongObject));
                }
                self.foreground(sim, &me, verb, Task::TakeOff {
                    progress: Fixed::ZERO,
                })
            }
            Verb::CanBuild => {
                let Some(t) = exact_type(args, 0) else {
                    return Ok(self.surface(sim, ErrorCode::WrongObject));
                };
                let ok = sim.research().building_enabled(t) && sim.research().can_build(t);
                ScriptPoll::Done(Value::Bool(ok))
            }
            Verb::CanResearch => {
                let kind = args[0].as_research().expect("checked signature");
                ScriptPoll::Done(Value::Bool(!sim.research().is_done(kind)))
            }
            Verb::Researched => {
                let kind = args[0].as_research().expect("checked signature");
                ScriptPoll::Done(Value::Bool(sim.research().is_done(kind)))
            }
            Verb::BuildingEnabled => {
                let Some(t) = exact_type(args, 0) else {
                    return Ok(self.surface(sim, ErrorCode::WrongObject));
                };
                ScriptPoll::Done(Value::Bool(sim.research().building_enabled(t)))
            }
            Verb::Research => self.research(sim, &me, args),
            Verb::Factory => self.factory(sim, &me, args),
            Verb::Produce => self.produce(sim, &me, args),
            Verb::Destroy => self.destroy(sim, &me, args),
            Verb::Search => {
                let found = self.query(sim, &me, args, false).into_iter().next();
                ScriptPoll::Done(found.map_or(Value::Void, Value::Object))
            }
            Verb::SearchAll => {
                let found = self.query(sim, &me, args, false);
                ScriptPoll::Done(Value::Array(
                    found.into_iter().map(Value::Object).collect(),
                ))
            }
            Verb::Radar => {
                let found = self.query(sim, &me, args, true).into_iter().next();
                ScriptPoll::Done(found.map_or(Value::Void, Value::Object))
            }
            Verb::RadarAll => {
                let found = self.query(sim, &me, args, true);
                ScriptPoll::Done(Value::Array(
                    found.into_iter().map(Value::Object).collect(),
                ))
            }
            Verb::Detect => {
                let filter = args[0].as_type_filter().unwrap_or_default();
                let found = sim.registry().radar_first(&RadarQuery {
                    type_filter: filter,
                    sector_focus: Fixed::from_num(0.785),
                    max_dist: Fixed::from_num(DETECT_RANGE),
                    ..RadarQuery::around(&me)
                });
                ScriptPoll::Done(Value::Bool(found.is_some()))
            }
            Verb::Direction => {
                let target = world_position(args);
                let bearing = me.position.horizontal_bearing_to(target);
                let diff = math::angle_diff(bearing, me.rotation);
                ScriptPoll::Done(Value::Number(angle_from_world(diff)))
            }
            Verb::Distance => {
                let (a, b) = two_points(args);
                ScriptPoll::Done(Value::Number(length_from_world(a.distance(b))))
            }
            Verb::Distance2d => {
                let (a, b) = two_points(args);
                ScriptPoll::Done(Value::Number(length_from_world(
                    a.horizontal_distance(b),
                )))
            }
            Verb::Space => {
                let center = args
                    .first()
                    .and_then(Value::as_point)
                    .map_or(me.position, point_to_world);
                let spot = sim.flat_space(center, Fixed::from_num(2));
                ScriptPoll::Done(Value::Point(point_from_world(spot)))
            }
            Verb::FlatSpace | Verb::FlatGround => {
                let center = point_to_world(args[0].as_point().expect("checked signature"));
                let clearance = number(args, 1);
                let spot = sim.flat_space(center, clearance);
                ScriptPoll::Done(Value::Point(point_from_world(spot)))
            }
            Verb::RetObject => {
                let rank = number(args, 0).to_num::<i64>();
                let found = usize::try_from(rank)
                    .ok()
                    .and_then(|rank| sim.registry().get_by_rank(rank))
                    .map(|o| o.id);
                ScriptPoll::Done(found.map_or(Value::Void, Value::Object))
            }
            Verb::RetObjectById => {
                let id = ObjectId::new(number(args, 0).to_num::<i64>() as u32);
                let found = sim.registry().get(id).map(|o| o.id);
                ScriptPoll::Done(found.map_or(Value::Void, Value::Object))
            }
            Verb::Delete => {
                let id = ObjectId::new(number(args, 0).to_num::<i64>() as u32);
                sim.delete_object(id);
                if id == self.object {
                    // Our own object is gone; this script stops now.
                    ScriptPoll::Ended
                } else {
                    ScriptPoll::Done(Value::Number(Fixed::ZERO))
                }
            }
            Verb::IsBusy => {
                let target = args.first().and_then(Value::as_object).unwrap_or(self.object);
                match sim.registry().get(target) {
                    Some(obj) => ScriptPoll::Done(Value::Bool(obj.is_busy())),
                    None => self.surface(sim, ErrorCode::WrongObject),
                }
            }
            Verb::ErrMode => {
                self.error_mode = if number(args, 0) == Fixed::ZERO {
                    ErrorMode::Continue
                } else {
                    ErrorMode::Stop
                };
                ScriptPoll::Done(Value::Number(Fixed::ZERO))
            }
            Verb::AbsTime => ScriptPoll::Done(Value::Number(sim.time())),
            Verb::Send => self.send(sim, &me, args),
            Verb::Receive => match self.exchange_post(sim, &me) {
                Ok(post) => {
                    let value = sim
                        .registry()
                        .get(post)
                        .and_then(|o| o.auto.as_ref())
                        .and_then(|a| a.as_exchange_post())
                        .and_then(|p| p.get_info(args[0].as_str().expect("checked signature")));
                    ScriptPoll::Done(value.map_or(Value::Void, Value::Number))
                }
                Err(code) => self.surface(sim, code),
            },
            Verb::DeleteInfo => match self.exchange_post(sim, &me) {
                Ok(post) => {
                    let name = args[0].as_str().expect("checked signature").to_owned();
                    let deleted = sim
                        .registry_mut()
                        .get_mut(post)
                        .and_then(|o| o.auto.as_mut())
                        .and_then(|a| a.as_exchange_post_mut())
                        .is_some_and(|p| p.delete_info(&name));
                    ScriptPoll::Done(Value::Bool(deleted))
                }
                Err(code) => self.surface(sim, code),
            },
            Verb::TestInfo => match self.exchange_post(sim, &me) {
                Ok(post) => {
                    let present = sim
                        .registry()
                        .get(post)
                        .and_then(|o| o.auto.as_ref())
                        .and_then(|a| a.as_exchange_post())
                        .is_some_and(|p| p.test_info(args[0].as_str().expect("checked signature")));
                    ScriptPoll::Done(Value::Bool(present))
                }
                Err(code) => self.surface(sim, code),
            },
            Verb::Message => {
                sim.post_message(self.object, args[0].as_str().expect("checked signature"));
                ScriptPoll::Done(Value::Number(Fixed::ZERO))
            }
            Verb::PenDown => {
                let color = args.first().and_then(Value::as_number);
                self.pen(sim, &me, move |pen| {
                    pen.down = true;
                    if let Some(color) = color {
                        pen.color = color.to_num::<i64>().clamp(0, 255) as u8;
                    }
                })
            }
            Verb::PenUp => self.pen(sim, &me, |pen| pen.down = false),
            Verb::PenColor => {
                let color = number(args, 0).to_num::<i64>().clamp(0, 255) as u8;
                self.pen(sim, &me, move |pen| pen.color = color)
            }
            Verb::PenWidth => {
                let width = length_to_world(number(args, 0));
                self.pen(sim, &me, move |pen| pen.width = width)
            }
            Verb::EndMission => {
                sim.end_mission(number(args, 0).to_num());
                ScriptPoll::Done(Value::Number(Fixed::ZERO))
            }
            Verb::PlayMusic => {
                let looped = args.get(1).and_then(Value::as_bool).unwrap_or(false);
                let channel = sim.sound_mut().play(
                    botsim_core::effects::SoundKind::Music,
                    Vec3Fixed::ZERO,
                    Fixed::from_num(1),
                    Fixed::from_num(1),
                    looped,
                );
                self.music_channel = Some(channel);
                ScriptPoll::Done(Value::Number(Fixed::ZERO))
            }
            Verb::StopMusic => {
                if let Some(channel) = self.music_channel.take() {
                    sim.sound_mut().flush_envelope(channel);
                }
                ScriptPoll::Done(Value::Number(Fixed::ZERO))
            }
            Verb::Ipf => {
                self.instructions_per_frame = number(args, 0).to_num::<i64>().max(1) as u32;
                ScriptPoll::Done(Value::Number(Fixed::ZERO))
            }
        })
    }

    /// Poll the in-flight verb.
    ///
    /// `Pending` while the underlying task runs; otherwise the task's
    /// result code surfaces the same way a start failure would, with
    /// `Stop` normalized to success.
    pub fn resume(&mut self, sim: &mut Simulation) -> ScriptPoll {
        let Some(verb) = self.in_flight else {
            return ScriptPoll::Done(Value::Void);
        };
        let Some(me) = sim.registry().get(self.object) else {
            self.in_flight = None;
            return ScriptPoll::Ended;
        };

        let background = matches!(verb, Verb::Aim);
        let active = if background {
            me.tasks.background_active()
        } else {
            me.tasks.foreground_active()
        };
        if active {
            return ScriptPoll::Pending;
        }

        self.in_flight = None;
        let code = sim.registry_mut().get_mut(self.object).and_then(|obj| {
            if background {
                obj.tasks.take_background_result()
            } else {
                obj.tasks.take_foreground_result()
            }
        });
        match code {
            Some(code) => self.surface(sim, code),
            // The task slot was cleared under us (object rebuilt); treat
            // as a graceful stop.
            None => ScriptPoll::Done(Value::Number(Fixed::ZERO)),
        }
    }

    /// Surface a result code per the protocol: success-class codes
    /// return 0, the two target errors always escalate, `AimImpossible`
    /// never does, everything else follows the error-mode.
    fn surface(&self, sim: &mut Simulation, code: ErrorCode) -> ScriptPoll {
        if code.is_success() {
            return ScriptPoll::Done(Value::Number(Fixed::ZERO));
        }
        let hard = code.is_always_hard()
            || (self.error_mode == ErrorMode::Stop && !code.is_never_hard());
        if hard {
            sim.post_message(self.object, format!("error: {code:?}"));
            ScriptPoll::Failed(code)
        } else {
            ScriptPoll::Done(Value::Number(Fixed::from_num(code.code())))
        }
    }

    fn foreground(
        &mut self,
        sim: &mut Simulation,
        me: &Object,
        verb: Verb,
        task: Task,
    ) -> ScriptPoll {
        if me.tasks.foreground_active() {
            return self.surface(sim, ErrorCode::Busy);
        }
        let code = sim.start_task(self.object, task);
        if code != ErrorCode::Ok {
            return self.surface(sim, code);
        }
        self.in_flight = Some(verb);
        ScriptPoll::Pending
    }

    fn grab(&mut self, sim: &mut Simulation, me: &Object) -> ScriptPoll {
        if !me.implements(Capabilities::CARRIER) {
            return self.surface(sim, ErrorCode::WrongObject);
        }
        if me.cargo.is_some() {
            return self.surface(sim, ErrorCode::Impossible);
        }
        let target = sim
            .registry()
            .radar_all(&RadarQuery {
                max_dist: Fixed::from_num(GRAB_REACH),
                ..RadarQuery::around(me)
            })
            .into_iter()
            .find(|&id| {
                sim.registry().get(id).is_some_and(|o| {
                    o.implements(Capabilities::TRANSPORTABLE) && !o.locked
                })
            });
        let Some(target) = target else {
            return self.surface(sim, ErrorCode::WrongObject);
        };
        self.foreground(sim, me, Verb::Grab, Task::Grab {
            target,
            progress: Fixed::ZERO,
        })
    }

    fn drop_cargo(&mut self, sim: &mut Simulation, me: &Object) -> ScriptPoll {
        if !me.implements(Capabilities::CARRIER) {
            return self.surface(sim, ErrorCode::WrongObject);
        }
        if me.cargo.is_none() {
            return self.surface(sim, ErrorCode::NoCargo);
        }
        let ahead = math::heading_vector(me.rotation);
        let position = Vec3Fixed::new(
            me.position.x + ahead.x * Fixed::from_num(6),
            me.position.y,
            me.position.z + ahead.z * Fixed::from_num(6),
        );
        self.foreground(sim, me, Verb::Drop, Task::Drop {
            position,
            progress: Fixed::ZERO,
        })
    }

    fn recycle(&mut self, sim: &mut Simulation, me: &Object) -> ScriptPoll {
        if me.object_type != ObjectType::Recycler {
            return self.surface(sim, ErrorCode::WrongObject);
        }
        let target = sim.registry().radar_first(&RadarQuery {
            type_filter: vec![ObjectType::WreckBot1],
            max_dist: Fixed::from_num(RECYCLE_REACH),
            ..RadarQuery::around(me)
        });
        let Some(target) = target else {
            return self.surface(sim, ErrorCode::WrongObject);
        };
        let position = sim
            .registry()
            .get(target)
            .map_or(me.position, |o| o.position);
        self.foreground(sim, me, Verb::Recycle, Task::Recycle {
            target,
            position,
            progress: Fixed::ZERO,
        })
    }

    fn fire(&mut self, sim: &mut Simulation, me: &Object, args: &[Value]) -> ScriptPoll {
        if !me.implements(Capabilities::ARMED) {
            return self.surface(sim, ErrorCode::WrongObject);
        }
        if me.energy <= Fixed::ZERO {
            return self.surface(sim, ErrorCode::NoEnergy);
        }
        let duration = args
            .first()
            .and_then(Value::as_number)
            .unwrap_or(Fixed::from_num(1));
        self.foreground(sim, me, Verb::Fire, Task::Fire {
            remaining: duration,
        })
    }

    fn aim(&mut self, sim: &mut Simulation, args: &[Value]) -> ScriptPoll {
        let toward = angle_to_world(number(args, 0));
        let possible = toward.abs() <= Fixed::from_num(AIM_LIMIT);
        let code = sim.start_background_task(
            self.object,
            Task::Aim {
                toward,
                progress: Fixed::ZERO,
                possible,
            },
        );
        if code != ErrorCode::Ok {
            return self.surface(sim, code);
        }
        self.in_flight = Some(Verb::Aim);
        ScriptPoll::Pending
    }

    fn shield(&mut self, sim: &mut Simulation, me: &Object, args: &[Value]) -> ScriptPoll {
        if !me.implements(Capabilities::SHIELDED) {
            return self.surface(sim, ErrorCode::WrongObject);
        }
        let raise = number(args, 0) > Fixed::ZERO;
        if raise {
            let radius = args
                .get(1)
                .and_then(Value::as_number)
                .unwrap_or(Fixed::from_num(10));
            // Starting is also refreshing: an up shield keeps its ramp.
            let code = sim.start_background_task(
                self.object,
                Task::Shield {
                    radius: length_to_world(radius),
                    ramp: Fixed::ZERO,
                    lower: false,
                },
            );
            self.surface(sim, code)
        } else {
            sim.cancel_background(self.object);
            ScriptPoll::Done(Value::Number(Fixed::ZERO))
        }
    }

    fn build(&mut self, sim: &mut Simulation, me: &Object, args: &[Value]) -> ScriptPoll {
        if !me.implements(Capabilities::CARRIER) {
            return self.surface(sim, ErrorCode::WrongObject);
        }
        let Some(building) = exact_type(args, 0) else {
            return self.surface(sim, ErrorCode::WrongObject);
        };
        if !building.is_building() {
            return self.surface(sim, ErrorCode::WrongObject);
        }
        if !sim.research().building_enabled(building) {
            return self.surface(sim, ErrorCode::BuildDisabled);
        }
        if !sim.research().can_build(building) {
            return self.surface(sim, ErrorCode::NotResearched);
        }
        let cube = sim
            .registry()
            .radar_all(&RadarQuery {
                type_filter: vec![ObjectType::TitaniumCube],
                max_dist: Fixed::from_num(BUILD_REACH),
                ..RadarQuery::around(me)
            })
            .into_iter()
            .find(|&id| sim.registry().get(id).is_some_and(|o| !o.locked));
        let Some(cube) = cube else {
            return self.surface(sim, ErrorCode::NoResource);
        };
        self.foreground(sim, me, Verb::Build, Task::Build {
            building,
            resource: cube,
            progress: Fixed::ZERO,
        })
    }

    fn research(&mut self, sim: &mut Simulation, me: &Object, args: &[Value]) -> ScriptPoll {
        let kind = args[0].as_research().expect("checked signature");
        let center = if me.object_type == ObjectType::ResearchCenter {
            Some(me.id)
        } else {
            sim.registry().radar_first(&RadarQuery {
                type_filter: vec![ObjectType::ResearchCenter],
                ..RadarQuery::around(me)
            })
        };
        let Some(center) = center else {
            return self.surface(sim, ErrorCode::WrongObject);
        };
        if let Err(code) = team_check(sim, me, center) {
            return self.surface(sim, code);
        }
        let code = sim.start_research(center, kind);
        self.surface(sim, code)
    }

    fn factory(&mut self, sim: &mut Simulation, me: &Object, args: &[Value]) -> ScriptPoll {
        let Some(vehicle) = exact_type(args, 0) else {
            return self.surface(sim, ErrorCode::WrongObject);
        };
        let factory = if me.object_type == ObjectType::BotFactory {
            Some(me.id)
        } else {
            sim.registry().radar_first(&RadarQuery {
                type_filter: vec![ObjectType::BotFactory],
                ..RadarQuery::around(me)
            })
        };
        let Some(factory) = factory else {
            return self.surface(sim, ErrorCode::WrongObject);
        };
        if let Err(code) = team_check(sim, me, factory) {
            return self.surface(sim, code);
        }
        let code = sim.start_factory(factory, vehicle);
        self.surface(sim, code)
    }

    fn produce(&mut self, sim: &mut Simulation, me: &Object, args: &[Value]) -> ScriptPoll {
        let position = point_to_world(args[0].as_point().expect("checked signature"));
        let rotation = angle_to_world(number(args, 1));
        let Some(object_type) = exact_type(args, 2) else {
            return self.surface(sim, ErrorCode::WrongObject);
        };
        let energy = args
            .get(3)
            .and_then(Value::as_number)
            .unwrap_or(Fixed::from_num(1));

        let created = sim.produce(ObjectCreateParams {
            object_type,
            position,
            rotation,
            team: me.team,
            energy,
            ..ObjectCreateParams::default()
        });
        match created {
            Ok(_) => ScriptPoll::Done(Value::Number(Fixed::ZERO)),
            Err(error) => {
                tracing::debug!(%error, "produce failed");
                self.surface(sim, ErrorCode::Impossible)
            }
        }
    }

    fn destroy(&mut self, sim: &mut Simulation, me: &Object, args: &[Value]) -> ScriptPoll {
        let target = match args.first().and_then(Value::as_object) {
            Some(id) => sim.registry().get(id).map(|o| o.id),
            None => sim
                .registry()
                .radar_all(&RadarQuery {
                    max_dist: Fixed::from_num(BUILD_REACH),
                    ..RadarQuery::around(me)
                })
                .into_iter()
                .find(|&id| {
                    sim.registry()
                        .get(id)
                        .is_some_and(|o| o.implements(Capabilities::DESTROYABLE))
                }),
        };
        let Some(target) = target else {
            return self.surface(sim, ErrorCode::WrongObject);
        };
        if !sim
            .registry()
            .get(target)
            .is_some_and(|o| o.implements(Capabilities::DESTROYABLE))
        {
            return self.surface(sim, ErrorCode::WrongObject);
        }
        if let Err(code) = team_check(sim, me, target) {
            return self.surface(sim, code);
        }
        sim.delete_object(target);
        ScriptPoll::Done(Value::Number(Fixed::ZERO))
    }

    /// Shared executor for `search`/`searchall`/`radar`/`radarall`.
    ///
    /// The sectored variants read angle/focus/band/order arguments; the
    /// search variants scan the full circle from an optional position.
    fn query(
        &self,
        sim: &Simulation,
        me: &Object,
        args: &[Value],
        sectored: bool,
    ) -> Vec<ObjectId> {
        let type_filter = args[0].as_type_filter().unwrap_or_default();
        let mut query = RadarQuery {
            type_filter,
            ..RadarQuery::around(me)
        };

        if sectored {
            if let Some(angle) = args.get(1).and_then(Value::as_number) {
                query.sector_angle = angle_to_world(angle);
            }
            if let Some(focus) = args.get(2).and_then(Value::as_number) {
                query.sector_focus = focus * math::DEG;
            }
            if let Some(min) = args.get(3).and_then(Value::as_number) {
                query.min_dist = min;
            }
            if let Some(max) = args.get(4).and_then(Value::as_number) {
                query.max_dist = max;
            }
            if let Some(furthest) = args.get(5).and_then(Value::as_bool) {
                query.furthest_first = furthest;
            }
        } else if let Some(from) = args.get(1).and_then(Value::as_point) {
            query.origin_position = point_to_world(from);
        }

        sim.registry().radar_all(&query)
    }

    fn send(&mut self, sim: &mut Simulation, me: &Object, args: &[Value]) -> ScriptPoll {
        match self.exchange_post(sim, me) {
            Ok(post) => {
                let name = args[0].as_str().expect("checked signature").to_owned();
                let value = number(args, 1);
                let code = sim
                    .registry_mut()
                    .get_mut(post)
                    .and_then(|o| o.auto.as_mut())
                    .and_then(|a| a.as_exchange_post_mut())
                    .map_or(ErrorCode::WrongObject, |p| p.set_info(&name, value));
                self.surface(sim, code)
            }
            Err(code) => self.surface(sim, code),
        }
    }

    /// The exchange post `send`/`receive` talk to: the nearest one in
    /// reach, with the protocol's team rule applied.
    fn exchange_post(&self, sim: &Simulation, me: &Object) -> Result<ObjectId, ErrorCode> {
        let post = sim
            .registry()
            .radar_first(&RadarQuery {
                type_filter: vec![ObjectType::ExchangePost],
                max_dist: Fixed::from_num(INFO_REACH),
                ..RadarQuery::around(me)
            })
            .ok_or(ErrorCode::WrongObject)?;
        team_check(sim, me, post)?;
        Ok(post)
    }

    fn pen(
        &mut self,
        sim: &mut Simulation,
        me: &Object,
        apply: impl FnOnce(&mut botsim_core::object::PenState),
    ) -> ScriptPoll {
        if !me.implements(Capabilities::TRACE_DRAWING) {
            return self.surface(sim, ErrorCode::WrongObject);
        }
        if let Some(obj) = sim.registry_mut().get_mut(self.object) {
            apply(&mut obj.pen);
        }
        ScriptPoll::Done(Value::Number(Fixed::ZERO))
    }
}

/// The protocol's team rule: a resolved target on a different
/// non-neutral team is an enemy, unconditionally.
fn team_check(sim: &Simulation, me: &Object, target: ObjectId) -> Result<(), ErrorCode> {
    let team = sim
        .registry()
        .get(target)
        .map(|o| o.team)
        .ok_or(ErrorCode::WrongObject)?;
    if team != 0 && team != me.team {
        return Err(ErrorCode::EnemyObject);
    }
    Ok(())
}

fn number(args: &[Value], index: usize) -> Fixed {
    args.get(index).and_then(Value::as_number).unwrap_or(Fixed::ZERO)
}

/// Resolve the polymorphic position argument: one point, or an x/y
/// coordinate pair.
fn world_position(args: &[Value]) -> Vec3Fixed {
    match args {
        [Value::Point(p), ..] => point_to_world(*p),
        [Value::Number(x), Value::Number(y), ..] => {
            point_to_world(ScriptPoint::new(*x, *y, Fixed::ZERO))
        }
        _ => Vec3Fixed::ZERO,
    }
}

fn two_points(args: &[Value]) -> (Vec3Fixed, Vec3Fixed) {
    let a = args
        .first()
        .and_then(Value::as_point)
        .map_or(Vec3Fixed::ZERO, point_to_world);
    let b = args
        .get(1)
        .and_then(Value::as_point)
        .map_or(Vec3Fixed::ZERO, point_to_world);
    (a, b)
}

/// A single concrete type from a type argument; `None` for selectors
/// that expand to several types (a factory can't build "any vehicle").
fn exact_type(args: &[Value], index: usize) -> Option<ObjectType> {
    let filter = args.get(index)?.as_type_filter()?;
    match filter.as_slice() {
        [single] => Some(*single),
        _ => None,
    }
}

fn is_sniffer(object_type: ObjectType) -> bool {
    matches!(
        object_type,
        ObjectType::WheeledSniffer
            | ObjectType::TrackedSniffer
            | ObjectType::WingedSniffer
            | ObjectType::LeggedSniffer
    )
}
