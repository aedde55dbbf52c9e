//! Compile-time argument checking for the native-function ABI.
//!
//! Every native verb is checked in two phases: the script compiler
//! validates arity and types against the table here before the script
//! ever runs, and the runtime executor then only deals with semantics.
//! A verb with several acceptable shapes (positions as a point or as a
//! coordinate pair, optional trailing arguments) lists one alternative
//! per shape.

use thiserror::Error;

use crate::value::Value;

/// Errors from the compile-time signature check.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ScriptError {
    /// No signature alternative with this argument count.
    #[error("wrong number of arguments for {verb}(): got {got}")]
    Arity {
        /// Verb name.
        verb: &'static str,
        /// Argument count supplied.
        got: usize,
    },
    /// An argument has the wrong type for every matching-arity
    /// alternative.
    #[error("argument {index} of {verb}() has the wrong type")]
    ArgType {
        /// Verb name.
        verb: &'static str,
        /// Zero-based argument index.
        index: usize,
    },
}

/// Expected argument classes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArgSpec {
    /// Any number.
    Number,
    /// Boolean.
    Bool,
    /// String.
    Str,
    /// Script point.
    Point,
    /// Object handle.
    Object,
    /// Type selector, or an array of type selectors.
    Type,
    /// Research program selector.
    Research,
}

/// Every scripted verb the bridge implements.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Verb {
    /// Move to a position.
    Goto,
    /// Move a distance along the heading.
    Move,
    /// Rotate by an angle.
    Turn,
    /// Idle for a duration.
    Wait,
    /// Pick up the nearest transportable object.
    Grab,
    /// Put the carried object down.
    Drop,
    /// Probe the ground.
    Sniff,
    /// Strike the ground.
    Thump,
    /// Recycle a wreck.
    Recycle,
    /// Fire the weapon.
    Fire,
    /// Swing the turret.
    Aim,
    /// Raise, refresh or lower the shield.
    Shield,
    /// Erect a building.
    Build,
    /// Query build permission for a type.
    CanBuild,
    /// Query whether a research can still be performed.
    CanResearch,
    /// Query whether a research is done.
    Researched,
    /// Query mission building enablement.
    BuildingEnabled,
    /// Run a research program.
    Research,
    /// Order a factory to manufacture a vehicle.
    Factory,
    /// Create an object outright.
    Produce,
    /// Leave the ground.
    TakeOff,
    /// Destroy a target object.
    Destroy,
    /// Nearest object of a type.
    Search,
    /// All objects of a type, nearest first.
    SearchAll,
    /// Sector/band scan, first hit.
    Radar,
    /// Sector/band scan, all hits.
    RadarAll,
    /// Anything of a type in the cone ahead?
    Detect,
    /// Bearing to a position, degrees.
    Direction,
    /// 3D distance between two positions.
    Distance,
    /// Horizontal distance between two positions.
    Distance2d,
    /// Free spot near a position.
    Space,
    /// Free spot with explicit clearance.
    FlatSpace,
    /// Flat terrain spot near a position.
    FlatGround,
    /// Object by registry rank.
    RetObject,
    /// Object by id.
    RetObjectById,
    /// Delete an object by id.
    Delete,
    /// Busy state of the bound (or another) object.
    IsBusy,
    /// Set the script error-mode.
    ErrMode,
    /// Absolute mission time.
    AbsTime,
    /// Store a value on the nearest exchange post.
    Send,
    /// Read a value from the nearest exchange post.
    Receive,
    /// Delete a value from the nearest exchange post.
    DeleteInfo,
    /// Test a value on the nearest exchange post.
    TestInfo,
    /// Post an on-screen message.
    Message,
    /// Lower the drawing pen.
    PenDown,
    /// Raise the drawing pen.
    PenUp,
    /// Set the pen color.
    PenColor,
    /// Set the pen width.
    PenWidth,
    /// End the mission.
    EndMission,
    /// Start background music.
    PlayMusic,
    /// Stop background music.
    StopMusic,
    /// Set instructions-per-frame.
    Ipf,
}

impl Verb {
    /// Script-visible name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Goto => "goto",
            Self::Move => "move",
            Self::Turn => "turn",
            Self::Wait => "wait",
            Self::Grab => "grab",
            Self::Drop => "drop",
            Self::Sniff => "sniff",
            Self::Thump => "thump",
            Self::Recycle => "recycle",
            Self::Fire => "fire",
            Self::Aim => "aim",
            Self::Shield => "shield",
            Self::Build => "build",
            Self::CanBuild => "canbuild",
            Self::CanResearch => "canresearch",
            Self::Researched => "researched",
            Self::BuildingEnabled => "buildingenabled",
            Self::Research => "research",
            Self::Factory => "factory",
            Self::Produce => "produce",
            Self::TakeOff => "takeoff",
            Self::Destroy => "destroy",
            Self::Search => "search",
            Self::SearchAll => "searchall",
            Self::Radar => "radar",
            Self::RadarAll => "radarall",
            Self::Detect => "detect",
            Self::Direction => "direction",
            Self::Distance => "distance",
            Self::Distance2d => "distance2d",
            Self::Space => "space",
            Self::FlatSpace => "flatspace",
            Self::FlatGround => "flatground",
            Self::RetObject => "retobject",
            Self::RetObjectById => "retobjectbyid",
            Self::Delete => "delete",
            Self::IsBusy => "isbusy",
            Self::ErrMode => "errmode",
            Self::AbsTime => "abstime",
            Self::Send => "send",
            Self::Receive => "receive",
            Self::DeleteInfo => "deleteinfo",
            Self::TestInfo => "testinfo",
            Self::Message => "message",
            Self::PenDown => "pendown",
            Self::PenUp => "penup",
            Self::PenColor => "pencolor",
            Self::PenWidth => "penwidth",
            Self::EndMission => "endmission",
            Self::PlayMusic => "playmusic",
            Self::StopMusic => "stopmusic",
            Self::Ipf => "ipf",
        }
    }

    /// Acceptable argument shapes, one slice per alternative.
    #[must_use]
    pub const fn signatures(self) -> &'static [&'static [ArgSpec]] {
        use ArgSpec::*;
        match self {
            Self::Goto => &[&[Point], &[Number, Number]],
            Self::Move | Self::Turn | Self::Wait => &[&[Number]],
            Self::Grab | Self::Drop | Self::Sniff | Self::Thump | Self::Recycle
            | Self::TakeOff | Self::PenUp | Self::StopMusic | Self::AbsTime => &[&[]],
            Self::Fire => &[&[], &[Number]],
            Self::Aim => &[&[Number], &[Number, Number]],
            Self::Shield => &[&[Number], &[Number, Number]],
            Self::Build | Self::CanBuild | Self::BuildingEnabled => &[&[Type]],
            Self::CanResearch | Self::Researched | Self::Research => &[&[Research]],
            Self::Factory => &[&[Type]],
            Self::Produce => &[&[Point, Number, Type], &[Point, Number, Type, Number]],
            Self::Destroy => &[&[], &[Object]],
            Self::Search | Self::SearchAll => &[&[Type], &[Type, Point]],
            Self::Radar | Self::RadarAll => &[
                &[Type],
                &[Type, Number],
                &[Type, Number, Number],
                &[Type, Number, Number, Number],
                &[Type, Number, Number, Number, Number],
                &[Type, Number, Number, Number, Number, Bool],
            ],
            Self::Detect => &[&[Type]],
            Self::Direction => &[&[Point], &[Number, Number]],
            Self::Distance | Self::Distance2d => &[&[Point, Point]],
            Self::Space => &[&[], &[Point]],
            Self::FlatSpace => &[&[Point, Number]],
            Self::FlatGround => &[&[Point, Number]],
            Self::RetObject | Self::RetObjectById | Self::Delete => &[&[Number]],
            Self::IsBusy => &[&[], &[Object]],
            Self::ErrMode | Self::PenColor | Self::PenWidth | Self::Ipf => &[&[Number]],
            Self::EndMission => &[&[Number], &[Number, Number]],
            Self::Send => &[&[Str, Number]],
            Self::Receive | Self::DeleteInfo | Self::TestInfo => &[&[Str]],
            Self::Message => &[&[Str]],
            Self::PenDown => &[&[], &[Number]],
            Self::PlayMusic => &[&[Str], &[Str, Bool]],
        }
    }
}

fn arg_matches(spec: ArgSpec, value: &Value) -> bool {
    match (spec, value) {
        (ArgSpec::Number, Value::Number(_))
        | (ArgSpec::Bool, Value::Bool(_))
        | (ArgSpec::Str, Value::Str(_))
        | (ArgSpec::Point, Value::Point(_))
        | (ArgSpec::Object, Value::Object(_))
        | (ArgSpec::Type, Value::Type(_))
        | (ArgSpec::Research, Value::Research(_)) => true,
        (ArgSpec::Type, Value::Array(items)) => {
            !items.is_empty() && items.iter().all(|v| matches!(v, Value::Type(_)))
        }
        _ => false,
    }
}

/// Validate an argument list against a verb's signature alternatives.
///
/// This is the compile-time phase: it runs before the script does and
/// never touches world state.
pub fn check(verb: Verb, args: &[Value]) -> Result<(), ScriptError> {
    let alternatives = verb.signatures();

    let mut any_arity = false;
    let mut first_mismatch = None;

    for alt in alternatives {
        if alt.len() != args.len() {
            continue;
        }
        any_arity = true;
        match alt
            .iter()
            .zip(args)
            .position(|(spec, value)| !arg_matches(*spec, value))
        {
            None => return Ok(()),
            Some(index) => {
                first_mismatch.get_or_insert(index);
            }
        }
    }

    if !any_arity {
        return Err(ScriptError::Arity {
            verb: verb.name(),
            got: args.len(),
        });
    }
    Err(ScriptError::ArgType {
        verb: verb.name(),
        index: first_mismatch.unwrap_or(0),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::ScriptPoint;
    use botsim_core::math::Fixed;
    use botsim_core::object_type::{ObjectType, TypeSelector};

    #[test]
    fn test_arity_errors() {
        assert_eq!(
            check(Verb::Move, &[]),
            Err(ScriptError::Arity {
                verb: "move",
                got: 0
            })
        );
        assert!(check(Verb::Move, &[Value::Number(Fixed::from_num(5))]).is_ok());
    }

    #[test]
    fn test_position_polymorphism() {
        let point = Value::Point(ScriptPoint::default());
        let n = Value::Number(Fixed::ZERO);
        assert!(check(Verb::Goto, &[point]).is_ok());
        assert!(check(Verb::Goto, &[n.clone(), n.clone()]).is_ok());
        assert_eq!(
            check(Verb::Goto, &[n, Value::Bool(true)]),
            Err(ScriptError::ArgType {
                verb: "goto",
                index: 1
            })
        );
    }

    #[test]
    fn test_type_arg_accepts_arrays() {
        let single = Value::Type(TypeSelector::Exact(ObjectType::TitaniumOre));
        let array = Value::Array(vec![
            Value::Type(TypeSelector::Exact(ObjectType::TitaniumOre)),
            Value::Type(TypeSelector::Exact(ObjectType::UraniumOre)),
        ]);
        assert!(check(Verb::Radar, &[single]).is_ok());
        assert!(check(Verb::Radar, &[array]).is_ok());
        assert!(check(Verb::Radar, &[Value::Array(vec![])]).is_err());
    }

    #[test]
    fn test_optional_trailing_args() {
        let t = Value::Type(TypeSelector::Exact(ObjectType::TitaniumOre));
        let n = Value::Number(Fixed::ZERO);
        assert!(check(Verb::Radar, &[t.clone()]).is_ok());
        assert!(check(
            Verb::Radar,
            &[t.clone(), n.clone(), n.clone(), n.clone(), n.clone()]
        )
        .is_ok());
        assert!(check(
            Verb::Radar,
            &[t, n.clone(), n.clone(), n.clone(), n, Value::Bool(true)]
        )
        .is_ok());
    }
}
