//! Research progression and building enablement.
//!
//! Mission state shared by every gating query: which technologies have
//! been researched, and which building types the mission allows at all.
//! `build`, `canbuild`, `factory` and `produce` consult this through the
//! same two predicates so they can never disagree.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::object_type::ObjectType;

/// Technologies a research center can complete.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ResearchKind {
    /// Tracked drive trains.
    TrackedBots,
    /// Winged drive trains.
    WingedBots,
    /// Legged drive trains.
    LeggedBots,
    /// The standard cannon.
    Shooter,
    /// The organic cannon.
    OrgaShooter,
    /// Ground sensors.
    Sniffer,
    /// The thumper.
    Thumper,
    /// Mobile shields.
    Shielder,
    /// Defense towers.
    DefenseTower,
    /// Nuclear power.
    AtomicEnergy,
}

/// The mission's research and build-permission state.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ResearchState {
    done: HashSet<ResearchKind>,
    disabled_buildings: HashSet<ObjectType>,
}

impl ResearchState {
    /// Fresh state: nothing researched, every building enabled.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark a technology as researched.
    pub fn mark_done(&mut self, kind: ResearchKind) {
        self.done.insert(kind);
    }

    /// Whether a technology has been researched.
    #[must_use]
    pub fn is_done(&self, kind: ResearchKind) -> bool {
        self.done.contains(&kind)
    }

    /// Disable a building type for this mission.
    pub fn disable_building(&mut self, building: ObjectType) {
        self.disabled_buildings.insert(building);
    }

    /// Re-enable a building type.
    pub fn enable_building(&mut self, building: ObjectType) {
        self.disabled_buildings.remove(&building);
    }

    /// Whether the mission allows this building type at all,
    /// independent of research.
    #[must_use]
    pub fn building_enabled(&self, building: ObjectType) -> bool {
        !self.disabled_buildings.contains(&building)
    }

    /// The research an object type requires, if any.
    #[must_use]
    pub fn required_research(object_type: ObjectType) -> Option<ResearchKind> {
        use ObjectType::*;
        match object_type {
            TrackedGrabber | TrackedShooter | TrackedOrgaShooter | TrackedSniffer => {
                Some(ResearchKind::TrackedBots)
            }
            WingedGrabber | WingedShooter | WingedOrgaShooter | WingedSniffer => {
                Some(ResearchKind::WingedBots)
            }
            LeggedGrabber | LeggedShooter | LeggedOrgaShooter | LeggedSniffer => {
                Some(ResearchKind::LeggedBots)
            }
            WheeledShooter => Some(ResearchKind::Shooter),
            WheeledOrgaShooter => Some(ResearchKind::OrgaShooter),
            WheeledSniffer => Some(ResearchKind::Sniffer),
            Thumper => Some(ResearchKind::Thumper),
            Shielder => Some(ResearchKind::Shielder),
            DefenseTower => Some(ResearchKind::DefenseTower),
            _ => None,
        }
    }

    /// Whether the research prerequisites for a type are met.
    #[must_use]
    pub fn can_build(&self, object_type: ObjectType) -> bool {
        match Self::required_research(object_type) {
            Some(kind) => self.is_done(kind),
            None => true,
        }
    }
}
