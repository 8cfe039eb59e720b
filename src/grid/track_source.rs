//! # Track storage
//!
//! Tracks are read one *bucket* at a time: all mass tracks sharing the outer node values of
//! a family. [`TrackSource`] is the storage seam; [`DirectoryTrackSource`] reads plain text
//! bucket files from the data directory:
//!
//! ```text
//! # Y2 Z=0.02 alpha=0.3
//! columns logTeff logL age mass
//! mass 1.00
//! 3.7617  0.0012  0.0100  1.00
//! 3.7620  0.0150  0.5000  1.00
//! ...
//! mass 1.10
//! ...
//! ```
//!
//! `#` lines and blank lines are ignored, the `columns` line must precede the first
//! `mass` block, and every data row has one value per column.
use std::fs;

use camino::Utf8PathBuf;
use log::debug;
use nalgebra::DMatrix;
use nom::{
    branch::alt,
    bytes::complete::{is_not, tag},
    character::complete::{space0, space1},
    combinator::all_consuming,
    multi::separated_list1,
    number::complete::double,
    sequence::{preceded, terminated},
    IResult, Parser,
};

use crate::{astrokit_errors::AstroKitError, data_paths::DataPaths};

use super::{family::ModelFamily, track::Track};

/// All tracks of one bucket, ascending by mass.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TrackBucket {
    tracks: Vec<(f64, Track)>,
}

fn same_mass(a: f64, b: f64) -> bool {
    (a - b).abs() <= 1e-9 * a.abs().max(b.abs())
}

impl TrackBucket {
    /// Sorts `tracks` by mass; duplicate masses are rejected.
    pub fn new(mut tracks: Vec<(f64, Track)>) -> Result<Self, AstroKitError> {
        tracks.sort_by(|a, b| a.0.total_cmp(&b.0));
        if let Some(w) = tracks.windows(2).find(|w| same_mass(w[0].0, w[1].0)) {
            return Err(AstroKitError::InvalidRequest(format!(
                "mass {} appears twice in a bucket",
                w[0].0
            )));
        }
        Ok(TrackBucket { tracks })
    }

    pub fn get(&self, mass: f64) -> Option<&Track> {
        self.tracks
            .iter()
            .find(|(m, _)| same_mass(*m, mass))
            .map(|(_, t)| t)
    }

    pub fn contains(&self, mass: f64) -> bool {
        self.get(mass).is_some()
    }

    pub fn masses(&self) -> impl Iterator<Item = f64> + '_ {
        self.tracks.iter().map(|(m, _)| *m)
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }
}

pub trait TrackSource {
    /// Load every mass track of the bucket with outer node values `bucket` (inner → outer).
    fn load_bucket(&self, family: ModelFamily, bucket: &[f64])
        -> Result<TrackBucket, AstroKitError>;
}

#[derive(Debug, Clone, PartialEq)]
enum TrackLine<'a> {
    Columns(Vec<&'a str>),
    Mass(f64),
    Row(Vec<f64>),
}

fn columns_line(input: &str) -> IResult<&str, Vec<&str>> {
    preceded((tag("columns"), space1), separated_list1(space1, is_not(" \t"))).parse(input)
}

fn mass_line(input: &str) -> IResult<&str, f64> {
    preceded((tag("mass"), space1), double).parse(input)
}

fn data_row(input: &str) -> IResult<&str, Vec<f64>> {
    separated_list1(space1, double).parse(input)
}

fn track_line(input: &str) -> IResult<&str, TrackLine<'_>> {
    all_consuming(terminated(
        alt((
            columns_line.map(TrackLine::Columns),
            mass_line.map(TrackLine::Mass),
            data_row.map(TrackLine::Row),
        )),
        space0,
    ))
    .parse(input)
}

/// Parse the text of one bucket file; `origin` only names the file in errors.
pub fn parse_bucket(content: &str, origin: &str) -> Result<TrackBucket, AstroKitError> {
    let fail = |line: usize, reason: String| AstroKitError::TrackFileParseError {
        path: origin.to_string(),
        reason: format!("line {line}: {reason}"),
    };

    let mut labels: Option<Vec<String>> = None;
    let mut blocks: Vec<(f64, Vec<f64>)> = Vec::new();

    for (n, raw) in content.lines().enumerate() {
        let line_number = n + 1;
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let (_, parsed) = track_line(line).map_err(|e| fail(line_number, e.to_string()))?;
        match parsed {
            TrackLine::Columns(names) => {
                if labels.is_some() {
                    return Err(fail(line_number, "second columns line".to_string()));
                }
                labels = Some(names.into_iter().map(str::to_string).collect());
            }
            TrackLine::Mass(mass) => {
                if labels.is_none() {
                    return Err(fail(line_number, "mass block before columns line".to_string()));
                }
                blocks.push((mass, Vec::new()));
            }
            TrackLine::Row(values) => {
                let width = labels.as_ref().map_or(0, Vec::len);
                let Some((_, rows)) = blocks.last_mut() else {
                    return Err(fail(line_number, "data row outside a mass block".to_string()));
                };
                if values.len() != width {
                    return Err(fail(
                        line_number,
                        format!("{} values for {width} columns", values.len()),
                    ));
                }
                rows.extend(values);
            }
        }
    }

    let labels = labels.ok_or_else(|| fail(0, "no columns line".to_string()))?;
    let width = labels.len();
    let tracks = blocks
        .into_iter()
        .map(|(mass, flat)| {
            if flat.is_empty() {
                return Err(fail(0, format!("empty track for mass {mass}")));
            }
            let data = DMatrix::from_row_slice(flat.len() / width, width, &flat);
            Ok((mass, Track::new(labels.clone(), data)?))
        })
        .collect::<Result<Vec<_>, AstroKitError>>()?;

    TrackBucket::new(tracks).map_err(|e| fail(0, e.to_string()))
}

/// Bucket files under `<data root>/tracks/<family>/`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectoryTrackSource {
    paths: DataPaths,
}

impl DirectoryTrackSource {
    pub fn new(paths: DataPaths) -> Self {
        DirectoryTrackSource { paths }
    }

    pub fn bucket_path(
        &self,
        family: ModelFamily,
        bucket: &[f64],
    ) -> Result<Utf8PathBuf, AstroKitError> {
        Ok(self
            .paths
            .track_dir(family)
            .join(family.bucket_file_name(bucket)?))
    }
}

impl TrackSource for DirectoryTrackSource {
    fn load_bucket(
        &self,
        family: ModelFamily,
        bucket: &[f64],
    ) -> Result<TrackBucket, AstroKitError> {
        let path = self.bucket_path(family, bucket)?;
        let content = fs::read_to_string(&path)?;
        let parsed = parse_bucket(&content, path.as_str())?;
        debug!("Loaded {} tracks from {path}", parsed.len());
        Ok(parsed)
    }
}
