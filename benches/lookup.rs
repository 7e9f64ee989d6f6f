use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use quadtile::{CachedDeclination, MagneticModel, Quad, QuadLookup};

fn benchmark_quad_algebra(c: &mut Criterion) {
    let mut group = c.benchmark_group("quad_algebra");

    group.bench_function("from_lat_lon_z16", |b| {
        let mut counter = 0u64;
        b.iter(|| {
            let lat = 40.0 + ((counter % 1000) as f64 * 0.001);
            let lon = -74.0 + ((counter % 1000) as f64 * 0.001);
            counter += 1;
            Quad::from_lat_lon(black_box(lat), black_box(lon), 16)
        })
    });

    let quad = Quad::from_lat_lon(47.458, 8.548, 16);
    group.bench_function("neighbor_ring_9", |b| b.iter(|| black_box(quad).around9()));

    group.bench_function("to_string_z16", |b| b.iter(|| black_box(quad).to_string()));

    let key = quad.to_string();
    group.bench_function("parse_z16", |b| {
        b.iter(|| black_box(key.as_str()).parse::<Quad>().unwrap())
    });

    let coarse = quad.at_zoom(6);
    group.bench_function("includes", |b| {
        b.iter(|| black_box(coarse).includes(black_box(quad)))
    });

    group.finish();
}

fn synthetic_quads(n: usize, zoom: u8) -> Vec<Quad> {
    // a lat/lon sweep concentrated over one continent, like real traffic data
    (0..n)
        .map(|i| {
            let lat = 35.0 + ((i * 7) % 2000) as f64 * 0.01;
            let lon = -10.0 + ((i * 13) % 4000) as f64 * 0.01;
            Quad::from_lat_lon(lat, lon, zoom)
        })
        .collect()
}

fn benchmark_lookup_tree(c: &mut Criterion) {
    let mut group = c.benchmark_group("lookup_tree");

    for size in [1_000usize, 10_000, 100_000] {
        group.bench_with_input(BenchmarkId::new("add", size), &size, |b, &size| {
            let quads = synthetic_quads(size, 14);
            b.iter(|| {
                let mut tree: QuadLookup<usize> = QuadLookup::new(4, 14, 16);
                for (i, q) in quads.iter().enumerate() {
                    tree.add(*q, i).unwrap();
                }
                tree.len()
            })
        });
    }

    let quads = synthetic_quads(100_000, 14);
    let mut tree: QuadLookup<usize> = QuadLookup::new(4, 14, 16);
    for (i, q) in quads.iter().enumerate() {
        tree.add(*q, i).unwrap();
    }

    group.bench_function("item_containing_100k", |b| {
        let mut counter = 0usize;
        b.iter(|| {
            let q = quads[counter % quads.len()];
            counter += 1;
            tree.item_containing(black_box(q)).unwrap()
        })
    });

    group.bench_function("items_within_z6_100k", |b| {
        let area = quads[0].at_zoom(6);
        b.iter(|| tree.items_within(black_box(area)).unwrap().len())
    });

    group.finish();
}

struct SlowModel;

impl MagneticModel for SlowModel {
    fn declination_rad(&self, lat: f64, lon: f64, _height_km: f64, _epoch_year: f64) -> f64 {
        // stand-in for a spherical-harmonics evaluation
        let mut acc = 0.0f64;
        for n in 1..200 {
            acc += ((lat * n as f64).to_radians().sin() * (lon * n as f64).to_radians().cos())
                / n as f64;
        }
        acc * 0.01
    }
}

fn benchmark_declination_cache(c: &mut Criterion) {
    let mut group = c.benchmark_group("declination");

    let model = SlowModel;
    group.bench_function("direct_model", |b| {
        let mut counter = 0u64;
        b.iter(|| {
            let lat = 40.0 + ((counter % 100) as f64 * 0.0001);
            counter += 1;
            model.declination_rad(black_box(lat), 8.5, 3.0, 2026.5)
        })
    });

    let cached = CachedDeclination::new(SlowModel, 2026.5);
    group.bench_function("cached", |b| {
        let mut counter = 0u64;
        b.iter(|| {
            let lat = 40.0 + ((counter % 100) as f64 * 0.0001);
            counter += 1;
            cached.declination_rad(black_box(lat), 8.5)
        })
    });

    group.finish();
}

criterion_group!(
    benches,
    benchmark_quad_algebra,
    benchmark_lookup_tree,
    benchmark_declination_cache
);
criterion_main!(benches);
