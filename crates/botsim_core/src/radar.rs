//! Spatial queries over the registry: the radar family.
//!
//! A radar query scans every live object and filters by type (with
//! optional alias normalization), team, friend/foe classification,
//! flight state, a distance band and an angular sector, then orders the
//! survivors by projected distance. Equal distances survive as a stable
//! multiset in encounter order; nothing is ever silently dropped.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::math::{self, fixed_serde, Fixed, Vec3Fixed, G_UNIT, TAU};
use crate::object::{Capabilities, Object, ObjectId};
use crate::object_type::ObjectType;
use crate::registry::ObjectRegistry;

/// Bitflags refining a radar query beyond the type filter.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct RadarFilter(u16);

impl RadarFilter {
    /// Accept objects on the origin's own (non-neutral) team.
    pub const FRIENDLY: Self = Self(1 << 0);
    /// Accept objects on a different non-neutral team.
    pub const ENEMY: Self = Self(1 << 1);
    /// Accept neutral (team 0) objects.
    pub const NEUTRAL: Self = Self(1 << 2);
    /// Accept only objects sitting on the ground.
    pub const ONLY_LANDED: Self = Self(1 << 3);
    /// Accept only objects in the air.
    pub const ONLY_FLYING: Self = Self(1 << 4);

    /// No refinement.
    #[must_use]
    pub const fn empty() -> Self {
        Self(0)
    }

    /// Check if all flags in `other` are set in `self`.
    #[inline]
    #[must_use]
    pub const fn contains(self, other: Self) -> bool {
        (self.0 & other.0) == other.0
    }

    /// Check if any flags in `other` are set in `self`.
    #[inline]
    #[must_use]
    pub const fn intersects(self, other: Self) -> bool {
        (self.0 & other.0) != 0
    }

    /// Combine two filters.
    #[inline]
    #[must_use]
    pub const fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }
}

impl std::ops::BitOr for RadarFilter {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self::Output {
        self.union(rhs)
    }
}

impl std::ops::BitOrAssign for RadarFilter {
    fn bitor_assign(&mut self, rhs: Self) {
        *self = self.union(rhs);
    }
}

/// Parameters for one radar scan.
///
/// Distances are in game units (scaled internally); angles are radians.
/// Use struct-update syntax with [`Default`] and fill in what the call
/// site cares about.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RadarQuery {
    /// The querying object. Skipped as a candidate and used for
    /// friend/foe classification. `None` for disembodied queries.
    pub origin: Option<ObjectId>,
    /// Scan center, world units.
    pub origin_position: Vec3Fixed,
    /// The origin's facing; the sector angle is relative to this.
    #[serde(with = "fixed_serde")]
    pub origin_facing: Fixed,
    /// Acceptable types after normalization; empty means any type
    /// (pseudo-types excepted).
    pub type_filter: Vec<ObjectType>,
    /// Sector center relative to the facing, radians.
    #[serde(with = "fixed_serde")]
    pub sector_angle: Fixed,
    /// Sector width, radians. Anything >= 2*pi disables the sector test.
    #[serde(with = "fixed_serde")]
    pub sector_focus: Fixed,
    /// Inner edge of the distance band, game units.
    #[serde(with = "fixed_serde")]
    pub min_dist: Fixed,
    /// Outer edge of the distance band, game units.
    #[serde(with = "fixed_serde")]
    pub max_dist: Fixed,
    /// Order the result farthest-first instead of nearest-first.
    pub furthest_first: bool,
    /// Exact team requirement; 0 accepts any team.
    pub team: u8,
    /// Friend/enemy/neutral and landed/flying refinements.
    pub filter: RadarFilter,
    /// Fold alias families before the type filter (script-facing
    /// queries do; engine-internal ones don't).
    pub normalize_aliases: bool,
}

impl Default for RadarQuery {
    fn default() -> Self {
        Self {
            origin: None,
            origin_position: Vec3Fixed::ZERO,
            origin_facing: Fixed::ZERO,
            type_filter: Vec::new(),
            sector_angle: Fixed::ZERO,
            sector_focus: TAU,
            min_dist: Fixed::ZERO,
            max_dist: Fixed::from_num(1000),
            furthest_first: false,
            team: 0,
            filter: RadarFilter::empty(),
            normalize_aliases: true,
        }
    }
}

impl RadarQuery {
    /// A full-circle query centered on an object.
    #[must_use]
    pub fn around(origin: &Object) -> Self {
        Self {
            origin: Some(origin.id),
            origin_position: origin.position,
            origin_facing: origin.rotation,
            ..Self::default()
        }
    }
}

impl ObjectRegistry {
    /// Run a radar scan and return matching ids ordered by projected
    /// distance.
    ///
    /// Pure query: no registry state changes, fresh result list each
    /// call. Repeated calls over unchanged state return identical
    /// sequences.
    #[must_use]
    pub fn radar_all(&self, query: &RadarQuery) -> Vec<ObjectId> {
        let min_world = query.min_dist * G_UNIT;
        let max_world = query.max_dist * G_UNIT;
        let min_sq = min_world.saturating_mul(min_world);
        let max_sq = max_world.saturating_mul(max_world);

        let scan_angle = math::normalize_angle(query.origin_facing + query.sector_angle);
        let full_circle = query.sector_focus >= TAU;
        let half_focus = query.sector_focus / Fixed::from_num(2);

        let origin_team = query.origin.and_then(|id| self.get(id)).map(|o| o.team);
        let team_mask = query.filter.intersects(
            RadarFilter::FRIENDLY | RadarFilter::ENEMY | RadarFilter::NEUTRAL,
        );

        // Multiset keyed by squared distance: equal distances collect in
        // encounter order instead of overwriting each other.
        let mut ranked: BTreeMap<i64, Vec<ObjectId>> = BTreeMap::new();

        for candidate in self.iter() {
            if Some(candidate.id) == query.origin {
                continue;
            }
            if candidate.is_transported() || !candidate.detectable || candidate.proxy {
                continue;
            }

            let mut candidate_type = candidate.object_type;
            if query.normalize_aliases {
                candidate_type = candidate_type.normalize_alias();
                // Pseudo-types only answer to their exact name.
                if query.type_filter.is_empty() && candidate_type.is_scan_pseudo() {
                    continue;
                }
            }

            if !query.type_filter.is_empty() && !query.type_filter.contains(&candidate_type) {
                continue;
            }

            // Landed/flying refinement. The fallbacks for objects without
            // movement are deliberately asymmetric; scripts depend on it.
            if query.filter.contains(RadarFilter::ONLY_LANDED)
                && candidate.implements(Capabilities::MOVABLE)
                && !candidate.landed
            {
                continue;
            }
            if query.filter.contains(RadarFilter::ONLY_FLYING)
                && (!candidate.implements(Capabilities::MOVABLE) || candidate.landed)
            {
                continue;
            }

            if query.team != 0 && candidate.team != query.team {
                continue;
            }

            if team_mask {
                if let Some(origin_team) = origin_team {
                    let class = if candidate.team == 0 {
                        RadarFilter::NEUTRAL
                    } else if candidate.team == origin_team {
                        RadarFilter::FRIENDLY
                    } else {
                        RadarFilter::ENEMY
                    };
                    if !query.filter.contains(class) {
                        continue;
                    }
                }
            }

            let dist_sq = query
                .origin_position
                .horizontal_distance_squared(candidate.position);
            if dist_sq < min_sq || dist_sq > max_sq {
                continue;
            }

            if !full_circle {
                let bearing = query
                    .origin_position
                    .horizontal_bearing_to(candidate.position);
                if math::angle_diff(bearing, scan_angle).abs() > half_focus {
                    continue;
                }
            }

            ranked
                .entry(dist_sq.to_bits())
                .or_default()
                .push(candidate.id);
        }

        let mut result: Vec<ObjectId> = ranked.into_values().flatten().collect();
        if query.furthest_first {
            result.reverse();
        }
        result
    }

    /// Single-result convenience wrapper: the first element of the
    /// ordered scan.
    #[must_use]
    pub fn radar_first(&self, query: &RadarQuery) -> Option<ObjectId> {
        self.radar_all(query).into_iter().next()
    }
}
