#![allow(dead_code)]

use std::{fs, io::Write};

use approx::assert_relative_eq;
use astrokit::{
    data_paths::DataPaths,
    grid::{family::ModelFamily, track::Track},
};
use camino::{Utf8Path, Utf8PathBuf};

mod bintable;

pub use bintable::{bintable_bytes, header_block, int_card, text_card};

pub fn write_bintable(
    dir: &Utf8Path,
    file_name: &str,
    columns: &[(&str, &str)],
    rows: &[Vec<u8>],
) -> Utf8PathBuf {
    fs::create_dir_all(dir).unwrap();
    let path = dir.join(file_name);
    fs::File::create(&path)
        .unwrap()
        .write_all(&bintable_bytes(columns, rows))
        .unwrap();
    path
}

pub fn utf8_tempdir() -> (tempfile::TempDir, Utf8PathBuf) {
    let dir = tempfile::tempdir().unwrap();
    let path = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).unwrap();
    (dir, path)
}

/// Write the bucket file of `family` with outer node values `bucket`, one track per mass.
pub fn write_bucket<F>(paths: &DataPaths, family: ModelFamily, bucket: &[f64], masses: &[f64], track: F)
where
    F: Fn(f64) -> Track,
{
    let dir = paths.track_dir(family);
    fs::create_dir_all(&dir).unwrap();

    let mut content = format!("# {family} bucket {bucket:?}\n");
    for (i, &mass) in masses.iter().enumerate() {
        let t = track(mass);
        if i == 0 {
            content.push_str(&format!("columns {}\n", t.labels().join(" ")));
        }
        content.push_str(&format!("mass {mass:.2}\n"));
        for row in t.data().row_iter() {
            let values: Vec<String> = row.iter().map(|v| format!("{v:.17e}")).collect();
            content.push_str(&values.join(" "));
            content.push('\n');
        }
    }

    let path = dir.join(family.bucket_file_name(bucket).unwrap());
    fs::write(path, content).unwrap();
}

pub fn assert_track_close(actual: &Track, expected: &Track, epsilon: f64) {
    assert_eq!(actual.labels(), expected.labels());
    assert_eq!(actual.len(), expected.len());
    for (a, e) in actual.data().iter().zip(expected.data().iter()) {
        assert_relative_eq!(*a, *e, epsilon = epsilon);
    }
}
