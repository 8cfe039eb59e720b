//! Benchmarks for the two lookup engines.
//!
//! Run with:
//!   cargo bench --bench locate_and_interpolate
//!   cargo bench --bench locate_and_interpolate -- sorted_key

use std::{fs, hint::black_box};

use astrokit::{
    catalog::locator::{KeyPolicy, RecordLocator},
    data_paths::DataPaths,
    grid::{
        family::{ModelFamily, ModelParameters},
        provider::EvolutionTrackProvider,
    },
};
use camino::Utf8PathBuf;
use criterion::{criterion_group, criterion_main, Criterion};
use rand::{rngs::StdRng, Rng, SeedableRng};

#[path = "../tests/common/bintable.rs"]
mod bintable;

use bintable::bintable_bytes;

const ROWS: i64 = 200_000;

/// Keyed table `KEY (K) | MAG (D)` with keys 0, 2, 4, ...
fn write_keyed_table(dir: &Utf8PathBuf) -> Utf8PathBuf {
    let rows: Vec<Vec<u8>> = (0..ROWS)
        .map(|i| {
            let mut row = (2 * i).to_be_bytes().to_vec();
            row.extend_from_slice(&(i as f64 * 1e-4).to_be_bytes());
            row
        })
        .collect();
    let path = dir.join("keyed.fits");
    fs::write(&path, bintable_bytes(&[("KEY", "1K"), ("MAG", "1D")], &rows))
        .expect("write benchmark table");
    path
}

/// Geneva buckets with smooth synthetic tracks.
fn write_geneva_buckets(paths: &DataPaths) {
    let grid = ModelFamily::Geneva.default_grid().expect("Geneva grid");
    let dir = paths.track_dir(ModelFamily::Geneva);
    fs::create_dir_all(&dir).expect("create track dir");

    for &log_z in &grid.axes[1].nodes {
        let mut content = String::from("columns logTeff logL age\n");
        for &mass in &grid.axes[0].nodes {
            content.push_str(&format!("mass {mass:.2}\n"));
            for i in 0..80 {
                let t = i as f64 / 79.0;
                content.push_str(&format!(
                    "{} {} {}\n",
                    3.6 + 0.1 * mass.ln() - 0.02 * log_z + 0.05 * t * t,
                    mass.powf(3.5).log10() + t,
                    1e10 * mass.powf(-2.5) * t
                ));
            }
        }
        let name = ModelFamily::Geneva
            .bucket_file_name(&[log_z])
            .expect("bucket name");
        fs::write(dir.join(name), content).expect("write bucket");
    }
}

fn bench_sorted_key(c: &mut Criterion) {
    let guard = tempfile::tempdir().expect("tempdir");
    let dir = Utf8PathBuf::from_path_buf(guard.path().to_path_buf()).expect("utf8 tempdir");
    let path = write_keyed_table(&dir);
    let locator = RecordLocator::open(&path, 1).expect("open table");
    let policy = KeyPolicy {
        sentinel_row: Some(0),
        companion_check: true,
    };
    let mut rng = StdRng::seed_from_u64(1);

    c.bench_function("sorted_key/locate_key", |b| {
        b.iter(|| {
            let key = rng.random_range(0..2 * ROWS);
            black_box(locator.locate_key("KEY", black_box(key), &policy).expect("locate"))
        })
    });

    c.bench_function("direct_index/locate_index", |b| {
        b.iter(|| {
            let id = rng.random_range(1..=ROWS as u64);
            black_box(locator.locate_index(black_box(id)).expect("locate"))
        })
    });
}

fn bench_get_track(c: &mut Criterion) {
    let guard = tempfile::tempdir().expect("tempdir");
    let root = Utf8PathBuf::from_path_buf(guard.path().to_path_buf()).expect("utf8 tempdir");
    let paths = DataPaths::new(root);
    write_geneva_buckets(&paths);
    let provider = EvolutionTrackProvider::from_data_paths(paths).expect("provider");

    // warm the bucket cache
    let request = ModelParameters::Geneva { mass: 1.42, z: 0.011 };
    provider.get_track(&request, None).expect("warm-up");

    c.bench_function("get_track/geneva_off_grid", |b| {
        b.iter(|| black_box(provider.get_track(black_box(&request), None).expect("track")))
    });

    c.bench_function("get_track/geneva_smoothed", |b| {
        b.iter(|| black_box(provider.get_track(black_box(&request), Some(400)).expect("track")))
    });
}

criterion_group!(benches, bench_sorted_key, bench_get_track);
criterion_main!(benches);
