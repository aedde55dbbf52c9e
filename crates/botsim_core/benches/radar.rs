//! Radar scan benchmarks for botsim_core.
//!
//! Run with: `cargo bench -p botsim_core`

// Benchmark binaries don't need docs on macro-generated functions
#![allow(missing_docs)]

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use botsim_core::effects::NullGeometry;
use botsim_core::math::{Fixed, Vec3Fixed};
use botsim_core::object::ObjectCreateParams;
use botsim_core::object_type::ObjectType;
use botsim_core::radar::RadarQuery;
use botsim_core::registry::ObjectRegistry;

fn populated_registry(count: i32) -> ObjectRegistry {
    let mut registry = ObjectRegistry::new();
    for i in 0..count {
        let object_type = match i % 4 {
            0 => ObjectType::TitaniumCube,
            1 => ObjectType::WheeledGrabber,
            2 => ObjectType::Barrier2,
            _ => ObjectType::AlienAnt,
        };
        registry
            .create_object(
                ObjectCreateParams {
                    team: (i % 3) as u8,
                    position: Vec3Fixed::new(
                        Fixed::from_num((i * 17) % 500),
                        Fixed::ZERO,
                        Fixed::from_num((i * 31) % 500),
                    ),
                    ..ObjectCreateParams::of(object_type)
                },
                &mut NullGeometry,
            )
            .unwrap();
    }
    registry
}

pub fn radar_benchmark(c: &mut Criterion) {
    let registry = populated_registry(1000);

    c.bench_function("radar_full_circle_1000", |b| {
        b.iter(|| black_box(registry.radar_all(&RadarQuery::default())))
    });

    c.bench_function("radar_typed_sector_1000", |b| {
        let query = RadarQuery {
            type_filter: vec![ObjectType::TitaniumCube],
            sector_focus: Fixed::from_num(1),
            max_dist: Fixed::from_num(100),
            ..RadarQuery::default()
        };
        b.iter(|| black_box(registry.radar_all(&query)))
    });
}

criterion_group!(benches, radar_benchmark);
criterion_main!(benches);
