//! Generative properties of the registry and the radar.

use proptest::prelude::*;

use botsim_core::effects::NullGeometry;
use botsim_core::math::{Fixed, Vec3Fixed, G_UNIT, TAU};
use botsim_core::object::{ObjectCreateParams, ObjectId};
use botsim_core::object_type::ObjectType;
use botsim_core::radar::RadarQuery;
use botsim_core::registry::ObjectRegistry;

const TYPE_POOL: [ObjectType; 8] = [
    ObjectType::WheeledGrabber,
    ObjectType::TitaniumCube,
    ObjectType::UraniumOre,
    ObjectType::Barrier1,
    ObjectType::Barrier3,
    ObjectType::Bush2,
    ObjectType::AlienAnt,
    ObjectType::RadarStation,
];

fn arb_object() -> impl Strategy<Value = (usize, i32, i32, u8)> {
    (0..TYPE_POOL.len(), -500i32..500, -500i32..500, 0u8..3)
}

fn build_registry(objects: &[(usize, i32, i32, u8)]) -> ObjectRegistry {
    let mut registry = ObjectRegistry::new();
    for &(type_index, x, z, team) in objects {
        registry
            .create_object(
                ObjectCreateParams {
                    team,
                    position: Vec3Fixed::new(Fixed::from_num(x), Fixed::ZERO, Fixed::from_num(z)),
                    ..ObjectCreateParams::of(TYPE_POOL[type_index])
                },
                &mut NullGeometry,
            )
            .unwrap();
    }
    registry
}

proptest! {
    /// Every radar result lies inside the requested distance band.
    #[test]
    fn radar_band_membership(
        objects in prop::collection::vec(arb_object(), 0..40),
        min in 0i32..60,
        width in 0i32..120,
    ) {
        let registry = build_registry(&objects);
        let query = RadarQuery {
            min_dist: Fixed::from_num(min),
            max_dist: Fixed::from_num(min + width),
            ..RadarQuery::default()
        };

        let min_world = Fixed::from_num(min) * G_UNIT;
        let max_world = Fixed::from_num(min + width) * G_UNIT;

        for id in registry.radar_all(&query) {
            let candidate = registry.get(id).unwrap();
            let dist = Vec3Fixed::ZERO.horizontal_distance(candidate.position);
            // Compare against the band with a hair of sqrt slack.
            prop_assert!(dist >= min_world - Fixed::from_num(0.001));
            prop_assert!(dist <= max_world + Fixed::from_num(0.001));
        }
    }

    /// Every radar result lies inside the requested sector, unless the
    /// focus covers the full circle.
    #[test]
    fn radar_sector_membership(
        objects in prop::collection::vec(arb_object(), 0..40),
        sector_milli in -6283i32..6283,
        focus_milli in 0i32..7000,
    ) {
        let registry = build_registry(&objects);
        let sector = Fixed::from_num(sector_milli) / Fixed::from_num(1000);
        let focus = Fixed::from_num(focus_milli) / Fixed::from_num(1000);
        let query = RadarQuery {
            sector_angle: sector,
            sector_focus: focus,
            ..RadarQuery::default()
        };

        let full_circle = focus >= TAU;
        for id in registry.radar_all(&query) {
            if full_circle {
                continue;
            }
            let candidate = registry.get(id).unwrap();
            let bearing = Vec3Fixed::ZERO.horizontal_bearing_to(candidate.position);
            let diff = botsim_core::math::angle_diff(bearing, botsim_core::math::normalize_angle(sector));
            // Polynomial atan2 is good to well under a hundredth of a
            // radian; allow that much slack at the sector edge.
            prop_assert!(diff.abs() <= focus / Fixed::from_num(2) + Fixed::from_num(0.01));
        }
    }

    /// Reversing the order flag reverses the sequence exactly.
    #[test]
    fn radar_furthest_first_reverses(objects in prop::collection::vec(arb_object(), 0..40)) {
        let registry = build_registry(&objects);
        let nearest = registry.radar_all(&RadarQuery::default());
        let furthest = registry.radar_all(&RadarQuery {
            furthest_first: true,
            ..RadarQuery::default()
        });

        let mut reversed = furthest;
        reversed.reverse();
        prop_assert_eq!(nearest, reversed);
    }

    /// Alias normalization is idempotent and stable inside a family.
    #[test]
    fn alias_normalization_idempotent(type_index in 0..TYPE_POOL.len()) {
        let t = TYPE_POOL[type_index];
        let once = t.normalize_alias();
        prop_assert_eq!(once.normalize_alias(), once);
    }

    /// No two simultaneously-live objects ever share an id, and deleted
    /// ids stay dead, across arbitrary create/delete interleavings.
    #[test]
    fn id_uniqueness_under_churn(ops in prop::collection::vec(prop::option::of(0u32..64), 1..80)) {
        let mut registry = ObjectRegistry::new();
        let mut ever_deleted: Vec<ObjectId> = Vec::new();

        for op in ops {
            match op {
                // Create.
                None => {
                    registry
                        .create_object(
                            ObjectCreateParams::of(ObjectType::TitaniumCube),
                            &mut NullGeometry,
                        )
                        .unwrap();
                }
                // Delete the op-th live object, if it exists.
                Some(rank) => {
                    if let Some(id) = registry.get_by_rank(rank as usize).map(|o| o.id) {
                        registry.delete_object(id);
                        ever_deleted.push(id);
                    }
                }
            }

            let mut live: Vec<ObjectId> = registry.iter().map(|o| o.id).collect();
            live.sort_unstable();
            live.dedup();
            prop_assert_eq!(live.len(), registry.len());

            for &dead in &ever_deleted {
                prop_assert!(registry.get(dead).is_none());
            }
        }
    }
}
