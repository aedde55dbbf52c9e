//! The closed set of simulated object types.
//!
//! Everything the registry can own is one of these tags. Alias
//! normalization folds families of near-identical decoration sub-types
//! into one canonical representative so scripts can say "find a
//! barrier" without enumerating every barrier variant.

use serde::{Deserialize, Serialize};

use crate::object::Capabilities;

/// Enumerated tag for every vehicle, building, resource and decoration
/// kind the simulation knows about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ObjectType {
    // Ground vehicles
    /// Wheeled grabber bot.
    WheeledGrabber,
    /// Tracked grabber bot.
    TrackedGrabber,
    /// Winged grabber bot.
    WingedGrabber,
    /// Legged grabber bot.
    LeggedGrabber,
    /// Wheeled cannon bot.
    WheeledShooter,
    /// Tracked cannon bot.
    TrackedShooter,
    /// Winged cannon bot.
    WingedShooter,
    /// Legged cannon bot.
    LeggedShooter,
    /// Wheeled organic-cannon bot.
    WheeledOrgaShooter,
    /// Tracked organic-cannon bot.
    TrackedOrgaShooter,
    /// Winged organic-cannon bot.
    WingedOrgaShooter,
    /// Legged organic-cannon bot.
    LeggedOrgaShooter,
    /// Wheeled ground sensor bot.
    WheeledSniffer,
    /// Tracked ground sensor bot.
    TrackedSniffer,
    /// Winged ground sensor bot.
    WingedSniffer,
    /// Legged ground sensor bot.
    LeggedSniffer,
    /// Wreck recycler bot.
    Recycler,
    /// Mobile shield generator bot.
    Shielder,
    /// Ground thumper bot.
    Thumper,

    // Buildings
    /// Vehicle manufacturing plant.
    BotFactory,
    /// Research center.
    ResearchCenter,
    /// Power cell plant.
    PowerPlant,
    /// Power recharge station.
    PowerStation,
    /// Repair center.
    RepairCenter,
    /// Radar station.
    RadarStation,
    /// Information exchange post.
    ExchangePost,
    /// Automatic defense tower.
    DefenseTower,
    /// Locked vault.
    Vault,
    /// Derelict silo.
    Silo,

    // Resources
    /// Raw titanium ore.
    TitaniumOre,
    /// Refined titanium cube.
    TitaniumCube,
    /// Raw uranium ore.
    UraniumOre,
    /// Standard power cell.
    PowerCell,
    /// Nuclear fuel cell.
    FuelCell,
    /// Flight recorder.
    BlackBox,
    /// Organic matter.
    OrgaMatter,

    // Flora
    /// Bush, first variant. Canonical for the family.
    Bush1,
    /// Bush, second variant.
    Bush2,
    /// Bush, third variant.
    Bush3,
    /// Bush, fourth variant.
    Bush4,

    // Terrain litter
    /// Barrier, first variant. Canonical for the family.
    Barrier1,
    /// Barrier, second variant.
    Barrier2,
    /// Barrier, third variant.
    Barrier3,
    /// Barrier, fourth variant.
    Barrier4,
    /// Bot wreck, first variant. Canonical for the family.
    WreckBot1,
    /// Bot wreck, second variant.
    WreckBot2,
    /// Bot wreck, third variant.
    WreckBot3,
    /// Bot wreck, fourth variant.
    WreckBot4,
    /// Ruin, first variant. Canonical for the family.
    Ruin1,
    /// Ruin, second variant.
    Ruin2,
    /// Ruin, third variant.
    Ruin3,

    // Crystals
    /// Crystal, smallest size. Canonical for the family.
    Crystal1,
    /// Crystal, second size.
    Crystal2,
    /// Crystal, third size.
    Crystal3,
    /// Crystal, largest size.
    Crystal4,

    // Alien fauna
    /// Alien ant.
    AlienAnt,
    /// Alien spider.
    AlienSpider,
    /// Alien wasp.
    AlienWasp,
    /// Alien worm.
    AlienWorm,
    /// Alien queen.
    AlienQueen,
    /// Alien egg.
    AlienEgg,

    // Pseudo-types
    /// Way-point flag. Only matches scans that ask for it by exact type.
    Marker,
    /// Invisible mission controller. Only matches scans that ask for it
    /// by exact type.
    MissionController,
}

/// Script-level type selector, before expansion into concrete types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TypeSelector {
    /// Match any type (with the pseudo-type exclusion).
    Any,
    /// Match one concrete type (after alias normalization).
    Exact(ObjectType),
    /// Match any drivable ground vehicle.
    AnyVehicle,
}

/// Concrete drivable vehicle types the `AnyVehicle` selector expands to.
///
/// Every script query entry point expands the selector through this same
/// list, so `search`, `radar` and `detect` can never disagree about what
/// counts as a vehicle.
pub const GROUND_VEHICLES: [ObjectType; 19] = [
    ObjectType::WheeledGrabber,
    ObjectType::TrackedGrabber,
    ObjectType::WingedGrabber,
    ObjectType::LeggedGrabber,
    ObjectType::WheeledShooter,
    ObjectType::TrackedShooter,
    ObjectType::WingedShooter,
    ObjectType::LeggedShooter,
    ObjectType::WheeledOrgaShooter,
    ObjectType::TrackedOrgaShooter,
    ObjectType::WingedOrgaShooter,
    ObjectType::LeggedOrgaShooter,
    ObjectType::WheeledSniffer,
    ObjectType::TrackedSniffer,
    ObjectType::WingedSniffer,
    ObjectType::LeggedSniffer,
    ObjectType::Recycler,
    ObjectType::Shielder,
    ObjectType::Thumper,
];

/// Expand a script-level selector into the concrete type list a spatial
/// query filters on. An empty list means "any type".
#[must_use]
pub fn expand_selector(selector: TypeSelector) -> Vec<ObjectType> {
    match selector {
        TypeSelector::Any => Vec::new(),
        TypeSelector::Exact(t) => vec![t],
        TypeSelector::AnyVehicle => GROUND_VEHICLES.to_vec(),
    }
}

impl ObjectType {
    /// Fold alias families into their canonical representative.
    ///
    /// Normalizing an already-canonical type is a no-op, so the fold is
    /// idempotent.
    #[must_use]
    pub const fn normalize_alias(self) -> Self {
        match self {
            Self::Bush2 | Self::Bush3 | Self::Bush4 => Self::Bush1,
            Self::Barrier2 | Self::Barrier3 | Self::Barrier4 => Self::Barrier1,
            Self::WreckBot2 | Self::WreckBot3 | Self::WreckBot4 => Self::WreckBot1,
            Self::Ruin2 | Self::Ruin3 => Self::Ruin1,
            Self::Crystal2 | Self::Crystal3 | Self::Crystal4 => Self::Crystal1,
            other => other,
        }
    }

    /// True for the pseudo-types excluded from unfiltered scans.
    #[must_use]
    pub const fn is_scan_pseudo(self) -> bool {
        matches!(self, Self::Marker | Self::MissionController)
    }

    /// True for drivable vehicles.
    #[must_use]
    pub fn is_vehicle(self) -> bool {
        GROUND_VEHICLES.contains(&self)
    }

    /// True for stationary buildings.
    #[must_use]
    pub const fn is_building(self) -> bool {
        matches!(
            self,
            Self::BotFactory
                | Self::ResearchCenter
                | Self::PowerPlant
                | Self::PowerStation
                | Self::RepairCenter
                | Self::RadarStation
                | Self::ExchangePost
                | Self::DefenseTower
                | Self::Vault
                | Self::Silo
        )
    }

    /// True for carryable resources.
    #[must_use]
    pub const fn is_resource(self) -> bool {
        matches!(
            self,
            Self::TitaniumOre
                | Self::TitaniumCube
                | Self::UraniumOre
                | Self::PowerCell
                | Self::FuelCell
                | Self::BlackBox
                | Self::OrgaMatter
        )
    }

    /// True for alien creatures that hatch from eggs.
    ///
    /// Producing one of these also produces an inert egg next to it.
    #[must_use]
    pub const fn is_egg_layer(self) -> bool {
        matches!(
            self,
            Self::AlienAnt | Self::AlienSpider | Self::AlienWasp | Self::AlienWorm | Self::AlienQueen
        )
    }

    /// Capability set for this type, resolved once at construction.
    #[must_use]
    pub fn capabilities(self) -> Capabilities {
        use ObjectType::*;

        let mut caps = Capabilities::empty();

        if self.is_vehicle() || self.is_egg_layer() {
            caps |= Capabilities::MOVABLE | Capabilities::DESTROYABLE;
        }
        if self.is_vehicle() {
            caps |= Capabilities::PROGRAMMABLE | Capabilities::PROGRAM_STORAGE | Capabilities::POWERED;
        }
        if self.is_building() {
            caps |= Capabilities::DESTROYABLE;
        }
        if self.is_resource() {
            caps |= Capabilities::TRANSPORTABLE;
        }

        // A type can belong to several of these groups (a winged grabber
        // both flies and carries), so these are not match arms.
        if matches!(
            self,
            WingedGrabber | WingedShooter | WingedOrgaShooter | WingedSniffer | AlienWasp
        ) {
            caps |= Capabilities::JET_FLYING;
        }
        if matches!(
            self,
            WheeledGrabber | TrackedGrabber | WingedGrabber | LeggedGrabber
        ) {
            caps |= Capabilities::CARRIER | Capabilities::TRACE_DRAWING;
        }
        if matches!(
            self,
            WheeledShooter
                | TrackedShooter
                | WingedShooter
                | LeggedShooter
                | WheeledOrgaShooter
                | TrackedOrgaShooter
                | WingedOrgaShooter
                | LeggedOrgaShooter
                | DefenseTower
        ) {
            caps |= Capabilities::ARMED;
        }
        if matches!(
            self,
            WheeledSniffer | TrackedSniffer | WingedSniffer | LeggedSniffer
        ) {
            caps |= Capabilities::TRACE_DRAWING;
        }
        if self == Shielder {
            caps |= Capabilities::SHIELDED;
        }
        if matches!(
            self,
            BotFactory | PowerPlant | ResearchCenter | PowerStation | RepairCenter
        ) {
            caps |= Capabilities::SLOTTED;
        }

        caps
    }
}
