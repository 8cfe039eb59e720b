//! # Evolution track provider
//!
//! [`EvolutionTrackProvider::get_track`] turns a continuous [`ModelParameters`] request into
//! a single [`Track`] by nested interpolation over the family grid.
//!
//! ## Resolution
//!
//! Axes are walked from the outermost inwards. On each axis:
//!
//! 1. if the target rounds to a usable node, that node is used directly;
//! 2. otherwise a window of four usable nodes is selected
//!    ([`GridAxis::select_window`]) and the four sub-results are combined with
//!    [`interpolate_tracks`].
//!
//! On the mass axis the stored tracks of the bucket fixed by the outer node values are used,
//! each brought to the canonical length of the family with a linear resample. A mass node
//! with no track in the loaded bucket counts as excluded for that bucket.
//!
//! When a point count is requested, the result is finally resampled with a natural cubic
//! spline.
//!
//! ## Caching
//!
//! Buckets are loaded from the [`TrackSource`] on first use and kept for the lifetime of
//! the provider.
use std::{cell::RefCell, collections::HashMap, rc::Rc};

use ahash::RandomState;
use log::debug;

use crate::{astrokit_errors::AstroKitError, data_paths::DataPaths};

use super::{
    axis::GridAxis,
    family::{FamilyGrid, ModelFamily, ModelParameters},
    newton::interpolate_tracks,
    resample::{resample, SplineDegree},
    track::Track,
    track_source::{DirectoryTrackSource, TrackBucket, TrackSource},
};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct BucketId {
    family: ModelFamily,
    /// Outer node values rounded to their axis resolution.
    keys: Vec<i64>,
}

pub struct EvolutionTrackProvider<S: TrackSource = DirectoryTrackSource> {
    source: S,
    grids: HashMap<ModelFamily, FamilyGrid, RandomState>,
    buckets: RefCell<HashMap<BucketId, Rc<TrackBucket>, RandomState>>,
}

impl EvolutionTrackProvider<DirectoryTrackSource> {
    /// Provider reading bucket files under `paths`, with the published family grids.
    pub fn from_data_paths(paths: DataPaths) -> Result<Self, AstroKitError> {
        EvolutionTrackProvider::new(DirectoryTrackSource::new(paths))
    }
}

impl<S: TrackSource> EvolutionTrackProvider<S> {
    pub fn new(source: S) -> Result<Self, AstroKitError> {
        let mut grids = HashMap::with_hasher(RandomState::new());
        for family in [ModelFamily::Y2, ModelFamily::Geneva, ModelFamily::Yapsi] {
            grids.insert(family, family.default_grid()?);
        }
        Ok(EvolutionTrackProvider {
            source,
            grids,
            buckets: RefCell::new(HashMap::with_hasher(RandomState::new())),
        })
    }

    /// Replace the grid of `grid.family` (e.g. to add exclusions).
    pub fn with_grid(mut self, grid: FamilyGrid) -> Self {
        self.grids.insert(grid.family, grid);
        self
    }

    pub fn grid(&self, family: ModelFamily) -> Option<&FamilyGrid> {
        self.grids.get(&family)
    }

    /// Number of buckets loaded so far.
    pub fn cached_buckets(&self) -> usize {
        self.buckets.borrow().len()
    }

    /// Interpolated track for `params`.
    ///
    /// Arguments
    /// -----------------
    /// * `params`: the requested model point.
    /// * `point_count`: optional output length; the track is then smoothed with a natural
    ///   cubic resample. Without it, the track has the canonical length of the family.
    ///
    /// Return
    /// ----------
    /// * The track, or:
    ///   - [`AstroKitError::InvalidRequest`] for invalid parameters,
    ///   - [`AstroKitError::NoValidWindow`] if an axis has fewer than four usable nodes,
    ///   - [`AstroKitError::ExcludedNodeInWindow`] if a window contains an excluded node,
    ///   - I/O and parse errors from the track source.
    ///
    /// See also
    /// ------------
    /// * [`GridAxis::select_window`] – Node window selection.
    /// * [`interpolate_tracks`] – Cubic Newton interpolation between four tracks.
    /// * [`resample`] – Canonicalisation and final smoothing.
    pub fn get_track(
        &self,
        params: &ModelParameters,
        point_count: Option<usize>,
    ) -> Result<Track, AstroKitError> {
        let family = params.family();
        let targets = params.axis_targets()?;
        let grid = self.grids.get(&family).ok_or_else(|| {
            AstroKitError::InvalidRequest(format!("no grid configured for {family}"))
        })?;
        if grid.axes.len() != targets.len() {
            return Err(AstroKitError::InvalidRequest(format!(
                "{family} grid has {} axes, request has {} parameters",
                grid.axes.len(),
                targets.len()
            )));
        }

        let track = self.resolve_axis(grid, &targets, grid.axes.len() - 1, &[])?;
        match point_count {
            Some(n) => resample(&track, n, SplineDegree::Cubic),
            None => Ok(track),
        }
    }

    /// Track at `targets[..=level]` with the axes above `level` fixed to `outer`
    /// (node values of axes `level + 1 ..`, inner first).
    fn resolve_axis(
        &self,
        grid: &FamilyGrid,
        targets: &[f64],
        level: usize,
        outer: &[f64],
    ) -> Result<Track, AstroKitError> {
        if level == 0 {
            return self.resolve_mass(grid, targets[0], outer);
        }

        let axis = &grid.axes[level];
        let target = targets[level];
        let companion = outer.first().copied();
        let with_node = |node: f64| -> Vec<f64> {
            std::iter::once(node).chain(outer.iter().copied()).collect()
        };

        if let Some(i) = axis.exact_node(target) {
            if !axis.is_excluded(i, companion) {
                return self.resolve_axis(grid, targets, level - 1, &with_node(axis.nodes[i]));
            }
        }

        let window = axis.select_window(target, companion)?;
        axis.ensure_clean(&window, companion)?;
        debug!(
            "{} axis {}: target {target} interpolated from {:?}",
            grid.family,
            axis.name,
            window.values(axis)
        );

        let nodes = window
            .values(axis)
            .iter()
            .map(|&node| Ok((node, self.resolve_axis(grid, targets, level - 1, &with_node(node))?)))
            .collect::<Result<Vec<_>, AstroKitError>>()?;
        interpolate_tracks(&nodes, target)
    }

    fn resolve_mass(
        &self,
        grid: &FamilyGrid,
        target: f64,
        outer: &[f64],
    ) -> Result<Track, AstroKitError> {
        let axis = &grid.axes[0];
        let companion = outer.first().copied();
        let bucket = self.bucket(grid, outer)?;
        let usable = |i: usize| !axis.is_excluded(i, companion) && bucket.contains(axis.nodes[i]);

        let canonical = |node: f64| -> Result<Track, AstroKitError> {
            let stored = bucket
                .get(node)
                .ok_or_else(|| AstroKitError::MissingGridTrack {
                    node,
                    bucket: format!("{:?}", outer),
                })?;
            resample(stored, grid.canonical_length, SplineDegree::Linear)
        };

        if let Some(i) = axis.exact_node(target) {
            if usable(i) {
                return canonical(axis.nodes[i]);
            }
        }

        let window = axis
            .select_window_where(target, usable)
            .map_err(|e| match e {
                AstroKitError::NoValidWindow { axis, target, .. } => {
                    AstroKitError::NoValidWindow {
                        axis,
                        target,
                        companion,
                    }
                }
                other => other,
            })?;
        axis.ensure_clean(&window, companion)?;
        debug!(
            "{} mass {target} interpolated from {:?} in bucket {:?}",
            grid.family,
            window.values(axis),
            outer
        );

        let nodes = window
            .values(axis)
            .iter()
            .map(|&node| Ok((node, canonical(node)?)))
            .collect::<Result<Vec<_>, AstroKitError>>()?;
        interpolate_tracks(&nodes, target)
    }

    /// Cached bucket for the outer node values `outer` (inner first).
    fn bucket(&self, grid: &FamilyGrid, outer: &[f64]) -> Result<Rc<TrackBucket>, AstroKitError> {
        let keys = grid.axes[1..]
            .iter()
            .zip(outer)
            .map(|(axis, &node): (&GridAxis, &f64)| axis.node_key(node))
            .collect();
        let id = BucketId {
            family: grid.family,
            keys,
        };

        if let Some(bucket) = self.buckets.borrow().get(&id) {
            return Ok(Rc::clone(bucket));
        }

        let bucket = Rc::new(self.source.load_bucket(grid.family, outer)?);
        debug!(
            "{} bucket {:?} loaded with {} tracks",
            grid.family,
            outer,
            bucket.len()
        );
        self.buckets.borrow_mut().insert(id, Rc::clone(&bucket));
        Ok(bucket)
    }
}
