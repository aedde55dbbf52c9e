//! Scenario tests for the scripted-verb dispatch protocol.
//!
//! These drive the bridge the way the cooperative interpreter does:
//! invoke a verb, and while it reports `Pending`, tick the world and
//! re-invoke the same call.

use botsim_core::automaton::FactoryPhase;
use botsim_core::error::ErrorCode;
use botsim_core::math::Fixed;
use botsim_core::object::Capabilities;
use botsim_core::object_type::{ObjectType, TypeSelector};
use botsim_core::simulation::Simulation;
use botsim_script::prelude::*;
use botsim_test_utils::fixtures::{facing_pair, fixed, fixed_f, spawn_at};

fn num(n: i32) -> Value {
    Value::Number(fixed(n))
}

fn ty(t: ObjectType) -> Value {
    Value::Type(TypeSelector::Exact(t))
}

/// Run one native call to completion, ticking between polls.
fn drive(
    sim: &mut Simulation,
    ctx: &mut ScriptContext,
    verb: Verb,
    args: &[Value],
) -> ScriptPoll {
    let mut poll = ctx.invoke(sim, verb, args).unwrap();
    for _ in 0..2000 {
        match poll {
            ScriptPoll::Pending => {
                sim.tick(fixed_f(0.05));
                poll = ctx.invoke(sim, verb, args).unwrap();
            }
            other => return other,
        }
    }
    panic!("{} never completed", verb.name());
}

// Scenario: two teams 50 game units apart; radar from one sees the
// other as the first element.
#[test]
fn radar_returns_facing_enemy_first() {
    let mut sim = Simulation::headless();
    let (a, b) = facing_pair(&mut sim, ObjectType::WheeledShooter, 1, 2, 200);

    let mut ctx = ScriptContext::new(a);
    let poll = ctx
        .invoke(
            &mut sim,
            Verb::Radar,
            &[
                Value::Type(TypeSelector::AnyVehicle),
                num(0),
                num(360),
                num(0),
                num(100),
            ],
        )
        .unwrap();
    assert_eq!(poll, ScriptPoll::Done(Value::Object(b)));
}

// Scenario: a second goto in the same tick fails busy and leaves the
// first task running.
#[test]
fn second_goto_same_tick_is_busy() {
    let mut sim = Simulation::headless();
    let bot = spawn_at(&mut sim, ObjectType::WheeledGrabber, 1, 0, 0);

    let mut first = ScriptContext::new(bot);
    let mut second = ScriptContext::new(bot);

    let poll = first
        .invoke(&mut sim, Verb::Goto, &[num(20), num(0)])
        .unwrap();
    assert_eq!(poll, ScriptPoll::Pending);

    let poll = second
        .invoke(&mut sim, Verb::Goto, &[num(-20), num(0)])
        .unwrap();
    assert_eq!(poll, ScriptPoll::Failed(ErrorCode::Busy));

    // The original task survives untouched and completes where the
    // first call asked.
    let done = drive(&mut sim, &mut first, Verb::Goto, &[num(20), num(0)]);
    assert_eq!(done, ScriptPoll::Done(Value::Number(Fixed::ZERO)));
    assert_eq!(
        sim.registry().get(bot).unwrap().position.x,
        fixed(20) * botsim_core::math::G_UNIT
    );
}

// Scenario: two objects at exactly equal distance both appear.
#[test]
fn equal_distance_candidates_both_survive() {
    let mut sim = Simulation::headless();
    let bot = spawn_at(&mut sim, ObjectType::WheeledShooter, 1, 0, 0);
    spawn_at(&mut sim, ObjectType::TitaniumCube, 0, 120, 0);
    spawn_at(&mut sim, ObjectType::TitaniumCube, 0, -120, 0);

    let mut ctx = ScriptContext::new(bot);
    let poll = ctx
        .invoke(
            &mut sim,
            Verb::RadarAll,
            &[ty(ObjectType::TitaniumCube)],
        )
        .unwrap();
    match poll {
        ScriptPoll::Done(Value::Array(items)) => assert_eq!(items.len(), 2),
        other => panic!("unexpected result: {other:?}"),
    }
}

// Scenario: producing an egg-laying creature creates exactly two
// objects, and the creature starts suspended.
#[test]
fn produce_egg_layer_creates_creature_and_egg() {
    let mut sim = Simulation::headless();
    let bot = spawn_at(&mut sim, ObjectType::WheeledGrabber, 1, 0, 0);
    let before = sim.registry().len();

    let mut ctx = ScriptContext::new(bot);
    let poll = ctx
        .invoke(
            &mut sim,
            Verb::Produce,
            &[
                Value::Point(ScriptPoint::new(fixed(30), fixed(0), fixed(0))),
                num(0),
                ty(ObjectType::AlienAnt),
            ],
        )
        .unwrap();
    assert_eq!(poll, ScriptPoll::Done(Value::Number(Fixed::ZERO)));
    assert_eq!(sim.registry().len(), before + 2);

    let ant = sim
        .registry()
        .iter()
        .find(|o| o.object_type == ObjectType::AlienAnt)
        .unwrap();
    assert!(!ant.activity);
    let eggs = sim
        .registry()
        .iter()
        .filter(|o| o.object_type == ObjectType::AlienEgg)
        .count();
    assert_eq!(eggs, 1);
}

// Scenario: a factory ordered mid-Build rejects with busy and stays in
// Build.
#[test]
fn factory_rejects_orders_mid_build() {
    let mut sim = Simulation::headless();
    let factory = spawn_at(&mut sim, ObjectType::BotFactory, 1, 0, 0);
    spawn_at(&mut sim, ObjectType::TitaniumCube, 0, 10, 0);

    let mut ctx = ScriptContext::new(factory);
    ctx.invoke(&mut sim, Verb::ErrMode, &[num(0)]).unwrap();

    let poll = ctx
        .invoke(&mut sim, Verb::Factory, &[ty(ObjectType::WheeledGrabber)])
        .unwrap();
    assert_eq!(poll, ScriptPoll::Done(Value::Number(Fixed::ZERO)));

    let phase_of = |sim: &Simulation| match sim.registry().get(factory).unwrap().auto {
        Some(botsim_core::automaton::Auto::Factory(ref auto)) => auto.phase(),
        _ => panic!("factory lost its automaton"),
    };

    for _ in 0..2000 {
        sim.tick(fixed_f(0.05));
        if phase_of(&sim) == FactoryPhase::Build {
            break;
        }
    }
    assert_eq!(phase_of(&sim), FactoryPhase::Build);

    let poll = ctx
        .invoke(&mut sim, Verb::Factory, &[ty(ObjectType::WheeledGrabber)])
        .unwrap();
    assert_eq!(
        poll,
        ScriptPoll::Done(Value::Number(Fixed::from_num(ErrorCode::Busy.code())))
    );
    assert_eq!(phase_of(&sim), FactoryPhase::Build);
}

// Scenario: deleting your own object ends the script immediately;
// deleting another object lets it continue.
#[test]
fn delete_self_ends_script() {
    let mut sim = Simulation::headless();
    let bot = spawn_at(&mut sim, ObjectType::WheeledGrabber, 1, 0, 0);
    let other = spawn_at(&mut sim, ObjectType::TitaniumCube, 0, 40, 0);

    let mut ctx = ScriptContext::new(bot);
    let poll = ctx
        .invoke(&mut sim, Verb::Delete, &[num(other.as_u32() as i32)])
        .unwrap();
    assert_eq!(poll, ScriptPoll::Done(Value::Number(Fixed::ZERO)));
    assert!(sim.registry().get(other).is_none());

    let poll = ctx
        .invoke(&mut sim, Verb::Delete, &[num(bot.as_u32() as i32)])
        .unwrap();
    assert_eq!(poll, ScriptPoll::Ended);
    assert!(sim.registry().get(bot).is_none());

    // Any further call on the dead object also ends the script.
    let poll = ctx.invoke(&mut sim, Verb::AbsTime, &[]).unwrap();
    assert_eq!(poll, ScriptPoll::Ended);
}

#[test]
fn errmode_controls_soft_failures() {
    let mut sim = Simulation::headless();
    let bot = spawn_at(&mut sim, ObjectType::WheeledShooter, 1, 0, 0);
    sim.registry_mut().get_mut(bot).unwrap().energy = Fixed::ZERO;

    // Default stop-mode: a precondition failure raises.
    let mut ctx = ScriptContext::new(bot);
    let poll = ctx.invoke(&mut sim, Verb::Fire, &[]).unwrap();
    assert_eq!(poll, ScriptPoll::Failed(ErrorCode::NoEnergy));

    // Continue-mode: the same failure is an ordinary return value.
    ctx.invoke(&mut sim, Verb::ErrMode, &[num(0)]).unwrap();
    let poll = ctx.invoke(&mut sim, Verb::Fire, &[]).unwrap();
    assert_eq!(
        poll,
        ScriptPoll::Done(Value::Number(Fixed::from_num(ErrorCode::NoEnergy.code())))
    );
}

#[test]
fn wrong_object_escalates_regardless_of_errmode() {
    let mut sim = Simulation::headless();
    // A shooter is no carrier; grab must raise even in continue-mode.
    let bot = spawn_at(&mut sim, ObjectType::WheeledShooter, 1, 0, 0);

    let mut ctx = ScriptContext::new(bot);
    ctx.invoke(&mut sim, Verb::ErrMode, &[num(0)]).unwrap();
    let poll = ctx.invoke(&mut sim, Verb::Grab, &[]).unwrap();
    assert_eq!(poll, ScriptPoll::Failed(ErrorCode::WrongObject));
}

#[test]
fn enemy_target_escalates_regardless_of_errmode() {
    let mut sim = Simulation::headless();
    let bot = spawn_at(&mut sim, ObjectType::WheeledGrabber, 1, 0, 0);
    let post = spawn_at(&mut sim, ObjectType::ExchangePost, 2, 20, 0);

    let mut ctx = ScriptContext::new(bot);
    ctx.invoke(&mut sim, Verb::ErrMode, &[num(0)]).unwrap();
    let poll = ctx
        .invoke(
            &mut sim,
            Verb::Send,
            &[Value::Str("target".into()), num(7)],
        )
        .unwrap();
    assert_eq!(poll, ScriptPoll::Failed(ErrorCode::EnemyObject));
    let _ = post;
}

#[test]
fn aim_impossible_never_raises() {
    let mut sim = Simulation::headless();
    let bot = spawn_at(&mut sim, ObjectType::WheeledShooter, 1, 0, 0);

    // Stop-mode on purpose: even then the impossible aim stays soft.
    let mut ctx = ScriptContext::new(bot);
    let poll = drive(&mut sim, &mut ctx, Verb::Aim, &[num(90)]);
    assert_eq!(
        poll,
        ScriptPoll::Done(Value::Number(Fixed::from_num(
            ErrorCode::AimImpossible.code()
        )))
    );
}

#[test]
fn aim_within_limits_completes_ok() {
    let mut sim = Simulation::headless();
    let bot = spawn_at(&mut sim, ObjectType::WheeledShooter, 1, 0, 0);

    let mut ctx = ScriptContext::new(bot);
    let poll = drive(&mut sim, &mut ctx, Verb::Aim, &[num(10)]);
    assert_eq!(poll, ScriptPoll::Done(Value::Number(Fixed::ZERO)));
}

#[test]
fn cancelled_background_counts_as_graceful_stop() {
    let mut sim = Simulation::headless();
    let bot = spawn_at(&mut sim, ObjectType::WheeledShooter, 1, 0, 0);

    let mut ctx = ScriptContext::new(bot);
    let poll = ctx.invoke(&mut sim, Verb::Aim, &[num(10)]).unwrap();
    assert_eq!(poll, ScriptPoll::Pending);

    // The player tears the background task down mid-flight; the script
    // sees a plain success, not a failure.
    sim.cancel_background(bot);
    let poll = ctx.invoke(&mut sim, Verb::Aim, &[num(10)]).unwrap();
    assert_eq!(poll, ScriptPoll::Done(Value::Number(Fixed::ZERO)));
}

#[test]
fn shield_runs_in_background_while_moving() {
    let mut sim = Simulation::headless();
    let bot = spawn_at(&mut sim, ObjectType::Shielder, 1, 0, 0);

    let mut ctx = ScriptContext::new(bot);
    let poll = ctx
        .invoke(&mut sim, Verb::Shield, &[num(1), num(10)])
        .unwrap();
    // Shield raising does not block the script.
    assert_eq!(poll, ScriptPoll::Done(Value::Number(Fixed::ZERO)));
    assert!(sim.registry().get(bot).unwrap().tasks.background_active());

    // A foreground order coexists with the shield.
    let poll = ctx.invoke(&mut sim, Verb::Move, &[num(5)]).unwrap();
    assert_eq!(poll, ScriptPoll::Pending);
    assert!(sim.registry().get(bot).unwrap().tasks.background_active());
    assert!(sim.registry().get(bot).unwrap().tasks.foreground_active());

    // Shield down.
    let poll = drive(&mut sim, &mut ctx, Verb::Move, &[num(5)]);
    assert_eq!(poll, ScriptPoll::Done(Value::Number(Fixed::ZERO)));
    ctx.invoke(&mut sim, Verb::Shield, &[num(0)]).unwrap();
    sim.tick(fixed_f(0.05));
    assert!(!sim.registry().get(bot).unwrap().tasks.background_active());
}

#[test]
fn vehicle_pseudo_type_expands_identically_everywhere() {
    let mut sim = Simulation::headless();
    let bot = spawn_at(&mut sim, ObjectType::WheeledShooter, 1, 0, 0);
    spawn_at(&mut sim, ObjectType::TrackedGrabber, 1, 40, 0);
    spawn_at(&mut sim, ObjectType::Recycler, 2, 80, 0);
    spawn_at(&mut sim, ObjectType::TitaniumCube, 0, 60, 0);

    let mut ctx = ScriptContext::new(bot);
    let vehicles = Value::Type(TypeSelector::AnyVehicle);

    let searched = match ctx
        .invoke(&mut sim, Verb::SearchAll, &[vehicles.clone()])
        .unwrap()
    {
        ScriptPoll::Done(Value::Array(items)) => items,
        other => panic!("unexpected: {other:?}"),
    };
    let scanned = match ctx
        .invoke(&mut sim, Verb::RadarAll, &[vehicles.clone()])
        .unwrap()
    {
        ScriptPoll::Done(Value::Array(items)) => items,
        other => panic!("unexpected: {other:?}"),
    };
    assert_eq!(searched, scanned);
    assert_eq!(searched.len(), 2);

    let detected = ctx.invoke(&mut sim, Verb::Detect, &[vehicles]).unwrap();
    assert_eq!(detected, ScriptPoll::Done(Value::Bool(true)));
}

#[test]
fn goto_applies_axis_swap_and_units() {
    let mut sim = Simulation::headless();
    let bot = spawn_at(&mut sim, ObjectType::WheeledGrabber, 1, 0, 0);

    let mut ctx = ScriptContext::new(bot);
    let target = Value::Point(ScriptPoint::new(fixed(10), fixed(5), fixed(0)));
    let poll = drive(&mut sim, &mut ctx, Verb::Goto, &[target]);
    assert_eq!(poll, ScriptPoll::Done(Value::Number(Fixed::ZERO)));

    let pos = sim.registry().get(bot).unwrap().position;
    // 10 game units along x, and the script's second field landed on
    // the engine depth axis.
    assert_eq!(pos.x, fixed(40));
    assert_eq!(pos.z, fixed(20));
}

#[test]
fn distance_speaks_game_units() {
    let mut sim = Simulation::headless();
    let bot = spawn_at(&mut sim, ObjectType::WheeledGrabber, 1, 0, 0);

    let mut ctx = ScriptContext::new(bot);
    let a = Value::Point(ScriptPoint::new(fixed(0), fixed(0), fixed(0)));
    let b = Value::Point(ScriptPoint::new(fixed(3), fixed(4), fixed(0)));
    let poll = ctx
        .invoke(&mut sim, Verb::Distance, &[a.clone(), b.clone()])
        .unwrap();
    match poll {
        ScriptPoll::Done(Value::Number(d)) => {
            assert!((d - fixed(5)).abs() < fixed_f(0.01));
        }
        other => panic!("unexpected: {other:?}"),
    }

    // distance2d ignores the height field.
    let c = Value::Point(ScriptPoint::new(fixed(3), fixed(4), fixed(100)));
    let poll = ctx.invoke(&mut sim, Verb::Distance2d, &[a, c]).unwrap();
    match poll {
        ScriptPoll::Done(Value::Number(d)) => {
            assert!((d - fixed(5)).abs() < fixed_f(0.01));
        }
        other => panic!("unexpected: {other:?}"),
    }
}

#[test]
fn direction_round_trips_through_turn() {
    let mut sim = Simulation::headless();
    let bot = spawn_at(&mut sim, ObjectType::WheeledGrabber, 1, 0, 0);

    let mut ctx = ScriptContext::new(bot);
    let target = Value::Point(ScriptPoint::new(fixed(0), fixed(50), fixed(0)));

    let before = match ctx
        .invoke(&mut sim, Verb::Direction, &[target.clone()])
        .unwrap()
    {
        ScriptPoll::Done(Value::Number(d)) => d,
        other => panic!("unexpected: {other:?}"),
    };
    assert!(before.abs() > fixed(1));

    // Turning by the reported direction must face the target.
    let poll = drive(
        &mut sim,
        &mut ctx,
        Verb::Turn,
        &[Value::Number(before)],
    );
    assert_eq!(poll, ScriptPoll::Done(Value::Number(Fixed::ZERO)));

    let after = match ctx.invoke(&mut sim, Verb::Direction, &[target]).unwrap() {
        ScriptPoll::Done(Value::Number(d)) => d,
        other => panic!("unexpected: {other:?}"),
    };
    assert!(after.abs() < fixed(1), "still off by {after} degrees");
}

#[test]
fn grab_and_drop_move_cargo() {
    let mut sim = Simulation::headless();
    let bot = spawn_at(&mut sim, ObjectType::WheeledGrabber, 1, 0, 0);
    let ore = spawn_at(&mut sim, ObjectType::TitaniumOre, 0, 8, 0);

    let mut ctx = ScriptContext::new(bot);
    let poll = drive(&mut sim, &mut ctx, Verb::Grab, &[]);
    assert_eq!(poll, ScriptPoll::Done(Value::Number(Fixed::ZERO)));
    assert_eq!(sim.registry().get(bot).unwrap().cargo, Some(ore));
    assert_eq!(sim.registry().get(ore).unwrap().transporter, Some(bot));

    // Transported objects vanish from scans.
    let scan = ctx
        .invoke(&mut sim, Verb::SearchAll, &[ty(ObjectType::TitaniumOre)])
        .unwrap();
    assert_eq!(scan, ScriptPoll::Done(Value::Array(Vec::new())));

    let poll = drive(&mut sim, &mut ctx, Verb::Drop, &[]);
    assert_eq!(poll, ScriptPoll::Done(Value::Number(Fixed::ZERO)));
    assert_eq!(sim.registry().get(bot).unwrap().cargo, None);
    assert_eq!(sim.registry().get(ore).unwrap().transporter, None);
}

#[test]
fn exchange_post_conversation() {
    let mut sim = Simulation::headless();
    let bot = spawn_at(&mut sim, ObjectType::WheeledGrabber, 1, 0, 0);
    spawn_at(&mut sim, ObjectType::ExchangePost, 1, 20, 0);

    let mut ctx = ScriptContext::new(bot);
    let name = || Value::Str("rendezvous".into());

    let poll = ctx.invoke(&mut sim, Verb::TestInfo, &[name()]).unwrap();
    assert_eq!(poll, ScriptPoll::Done(Value::Bool(false)));

    let poll = ctx
        .invoke(&mut sim, Verb::Send, &[name(), num(42)])
        .unwrap();
    assert_eq!(poll, ScriptPoll::Done(Value::Number(Fixed::ZERO)));

    let poll = ctx.invoke(&mut sim, Verb::Receive, &[name()]).unwrap();
    assert_eq!(poll, ScriptPoll::Done(Value::Number(fixed(42))));

    let poll = ctx.invoke(&mut sim, Verb::DeleteInfo, &[name()]).unwrap();
    assert_eq!(poll, ScriptPoll::Done(Value::Bool(true)));
    let poll = ctx.invoke(&mut sim, Verb::Receive, &[name()]).unwrap();
    assert_eq!(poll, ScriptPoll::Done(Value::Void));
}

#[test]
fn build_gates_then_erects_building() {
    let mut sim = Simulation::headless();
    let bot = spawn_at(&mut sim, ObjectType::WheeledGrabber, 1, 0, 0);

    let mut ctx = ScriptContext::new(bot);
    ctx.invoke(&mut sim, Verb::ErrMode, &[num(0)]).unwrap();

    // Disabled building type.
    sim.research_mut().disable_building(ObjectType::RadarStation);
    let poll = ctx
        .invoke(&mut sim, Verb::Build, &[ty(ObjectType::RadarStation)])
        .unwrap();
    assert_eq!(
        poll,
        ScriptPoll::Done(Value::Number(Fixed::from_num(
            ErrorCode::BuildDisabled.code()
        )))
    );

    // Unresearched building type.
    let poll = ctx
        .invoke(&mut sim, Verb::Build, &[ty(ObjectType::DefenseTower)])
        .unwrap();
    assert_eq!(
        poll,
        ScriptPoll::Done(Value::Number(Fixed::from_num(
            ErrorCode::NotResearched.code()
        )))
    );

    // No titanium cube in reach.
    let poll = ctx
        .invoke(&mut sim, Verb::Build, &[ty(ObjectType::PowerPlant)])
        .unwrap();
    assert_eq!(
        poll,
        ScriptPoll::Done(Value::Number(Fixed::from_num(ErrorCode::NoResource.code())))
    );

    // With a cube: the building goes up and the cube is consumed.
    let cube = spawn_at(&mut sim, ObjectType::TitaniumCube, 0, 10, 0);
    let poll = drive(&mut sim, &mut ctx, Verb::Build, &[ty(ObjectType::PowerPlant)]);
    assert_eq!(poll, ScriptPoll::Done(Value::Number(Fixed::ZERO)));
    assert!(sim.registry().get(cube).is_none());
    assert!(sim
        .registry()
        .iter()
        .any(|o| o.object_type == ObjectType::PowerPlant && o.team == 1));
}

#[test]
fn isbusy_and_retobject_queries() {
    let mut sim = Simulation::headless();
    let factory = spawn_at(&mut sim, ObjectType::BotFactory, 1, 0, 0);
    let bot = spawn_at(&mut sim, ObjectType::WheeledGrabber, 1, 30, 0);
    spawn_at(&mut sim, ObjectType::TitaniumCube, 0, 10, 0);

    let mut ctx = ScriptContext::new(bot);
    let poll = ctx
        .invoke(&mut sim, Verb::IsBusy, &[Value::Object(factory)])
        .unwrap();
    assert_eq!(poll, ScriptPoll::Done(Value::Bool(false)));

    sim.start_factory(factory, ObjectType::WheeledGrabber);
    let poll = ctx
        .invoke(&mut sim, Verb::IsBusy, &[Value::Object(factory)])
        .unwrap();
    assert_eq!(poll, ScriptPoll::Done(Value::Bool(true)));

    // Rank 0 is the first object created.
    let poll = ctx.invoke(&mut sim, Verb::RetObject, &[num(0)]).unwrap();
    assert_eq!(poll, ScriptPoll::Done(Value::Object(factory)));
    let poll = ctx
        .invoke(&mut sim, Verb::RetObjectById, &[num(bot.as_u32() as i32)])
        .unwrap();
    assert_eq!(poll, ScriptPoll::Done(Value::Object(bot)));
}

#[test]
fn pen_verbs_require_the_capability() {
    let mut sim = Simulation::headless();
    let grabber = spawn_at(&mut sim, ObjectType::WheeledGrabber, 1, 0, 0);
    let factory = spawn_at(&mut sim, ObjectType::BotFactory, 1, 50, 0);
    assert!(sim
        .registry()
        .get(grabber)
        .unwrap()
        .implements(Capabilities::TRACE_DRAWING));

    let mut ctx = ScriptContext::new(grabber);
    let poll = ctx.invoke(&mut sim, Verb::PenDown, &[num(3)]).unwrap();
    assert_eq!(poll, ScriptPoll::Done(Value::Number(Fixed::ZERO)));
    let pen = sim.registry().get(grabber).unwrap().pen;
    assert!(pen.down);
    assert_eq!(pen.color, 3);

    let poll = ctx.invoke(&mut sim, Verb::PenUp, &[]).unwrap();
    assert_eq!(poll, ScriptPoll::Done(Value::Number(Fixed::ZERO)));
    assert!(!sim.registry().get(grabber).unwrap().pen.down);

    let mut factory_ctx = ScriptContext::new(factory);
    let poll = factory_ctx.invoke(&mut sim, Verb::PenDown, &[]).unwrap();
    assert_eq!(poll, ScriptPoll::Failed(ErrorCode::WrongObject));
}

#[test]
fn signature_errors_are_compile_phase() {
    let mut sim = Simulation::headless();
    let bot = spawn_at(&mut sim, ObjectType::WheeledGrabber, 1, 0, 0);

    let mut ctx = ScriptContext::new(bot);
    let err = ctx
        .invoke(&mut sim, Verb::Goto, &[Value::Bool(true)])
        .unwrap_err();
    assert!(matches!(err, ScriptError::ArgType { .. }));

    let err = ctx.invoke(&mut sim, Verb::Turn, &[]).unwrap_err();
    assert!(matches!(err, ScriptError::Arity { .. }));
}
