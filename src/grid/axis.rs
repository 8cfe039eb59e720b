//! # Grid axes and node windows
//!
//! A [`GridAxis`] is the strictly ascending list of node values of one model parameter
//! (mass, Z, alpha, [Fe/H], Y …) together with:
//!
//! * a rounding resolution in decimal places: a target that rounds to a node value is
//!   treated as *exactly* on that node and no interpolation happens along the axis;
//! * an exclusion list of nodes known to be missing or numerically unusable, optionally
//!   only for one value of the enclosing (companion) axis.
//!
//! ## Window selection
//!
//! Off-node targets are interpolated from a window of [`WINDOW_SIZE`] contiguous usable
//! nodes. Excluded nodes are removed first, then, over the surviving list of length `L`,
//!
//! ```text
//! i     = index of the greatest node <= target (0 when target is below every node)
//! start = clamp(i - 2, 0, L - 4)
//! ```
//!
//! and the window is `survivors[start..start + 4]`, reported as indices into the full axis.
//! A target outside the axis range still gets the first or last window (extrapolation).
use itertools::Itertools;
use serde::Serialize;

use crate::{astrokit_errors::AstroKitError, constants::WINDOW_SIZE};

/// A node that must not be used, for every companion value or only for one.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Exclusion {
    pub node: f64,
    pub companion: Option<f64>,
}

/// Four indices into a [`GridAxis`], ascending.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NodeWindow {
    pub indices: [usize; WINDOW_SIZE],
}

impl NodeWindow {
    pub fn values(&self, axis: &GridAxis) -> [f64; WINDOW_SIZE] {
        self.indices.map(|i| axis.nodes[i])
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GridAxis {
    pub name: String,
    pub nodes: Vec<f64>,
    /// Rounding resolution in decimal places.
    pub decimals: u32,
    pub exclusions: Vec<Exclusion>,
}

fn same_companion(a: f64, b: f64) -> bool {
    (a - b).abs() <= 1e-9 * a.abs().max(b.abs()).max(1.0)
}

impl GridAxis {
    /// Arguments
    /// -----------------
    /// * `name`: axis name used in error messages.
    /// * `nodes`: finite, strictly ascending node values.
    /// * `decimals`: rounding resolution of the exactness rule.
    pub fn new(name: &str, nodes: Vec<f64>, decimals: u32) -> Result<Self, AstroKitError> {
        if nodes.is_empty() || nodes.iter().any(|n| !n.is_finite()) {
            return Err(AstroKitError::InvalidRequest(format!(
                "axis {name} needs finite nodes"
            )));
        }
        if let Some((a, b)) = nodes.iter().tuple_windows().find(|(a, b)| a >= b) {
            return Err(AstroKitError::InvalidRequest(format!(
                "axis {name} is not strictly ascending ({a} then {b})"
            )));
        }
        Ok(GridAxis {
            name: name.to_string(),
            nodes,
            decimals,
            exclusions: Vec::new(),
        })
    }

    pub fn with_exclusions(mut self, exclusions: Vec<Exclusion>) -> Self {
        self.exclusions = exclusions;
        self
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Half a unit of the last kept decimal.
    pub fn tolerance(&self) -> f64 {
        0.5 * 10f64.powi(-(self.decimals as i32))
    }

    /// Node value scaled and rounded to the axis resolution.
    pub fn node_key(&self, value: f64) -> i64 {
        (value * 10f64.powi(self.decimals as i32)).round() as i64
    }

    /// Index of the node `target` rounds to, if any.
    pub fn exact_node(&self, target: f64) -> Option<usize> {
        let key = self.node_key(target);
        self.nodes.iter().position(|&n| self.node_key(n) == key)
    }

    pub fn is_excluded(&self, index: usize, companion: Option<f64>) -> bool {
        let key = self.node_key(self.nodes[index]);
        self.exclusions.iter().any(|e| {
            self.node_key(e.node) == key
                && match (e.companion, companion) {
                    (None, _) => true,
                    (Some(a), Some(b)) => same_companion(a, b),
                    (Some(_), None) => false,
                }
        })
    }

    /// Window of four usable nodes around `target`, among the nodes accepted by `keep`.
    ///
    /// Arguments
    /// -----------------
    /// * `target`: the off-node value to interpolate at.
    /// * `keep`: node-index predicate; rejected nodes are skipped.
    ///
    /// Return
    /// ----------
    /// * A [`NodeWindow`] of indices into the full axis, or [`AstroKitError::NoValidWindow`] if
    ///   fewer than four nodes survive.
    pub fn select_window_where<F>(&self, target: f64, keep: F) -> Result<NodeWindow, AstroKitError>
    where
        F: Fn(usize) -> bool,
    {
        let survivors: Vec<usize> = (0..self.nodes.len()).filter(|&i| keep(i)).collect();
        if survivors.len() < WINDOW_SIZE {
            return Err(AstroKitError::NoValidWindow {
                axis: self.name.clone(),
                target,
                companion: None,
            });
        }

        let below = survivors.partition_point(|&i| self.nodes[i] <= target);
        let insertion = below.saturating_sub(1);
        let start = insertion
            .saturating_sub(2)
            .min(survivors.len() - WINDOW_SIZE);

        let mut indices = [0usize; WINDOW_SIZE];
        indices.copy_from_slice(&survivors[start..start + WINDOW_SIZE]);
        Ok(NodeWindow { indices })
    }

    /// Window around `target` skipping nodes excluded for `companion`.
    ///
    /// See also
    /// ------------
    /// * [`GridAxis::select_window_where`] – Same selection with an arbitrary node filter.
    pub fn select_window(
        &self,
        target: f64,
        companion: Option<f64>,
    ) -> Result<NodeWindow, AstroKitError> {
        self.select_window_where(target, |i| !self.is_excluded(i, companion))
            .map_err(|e| match e {
                AstroKitError::NoValidWindow { axis, target, .. } => AstroKitError::NoValidWindow {
                    axis,
                    target,
                    companion,
                },
                other => other,
            })
    }

    /// Fail if any node of `window` is excluded for `companion`.
    pub fn ensure_clean(
        &self,
        window: &NodeWindow,
        companion: Option<f64>,
    ) -> Result<(), AstroKitError> {
        match window
            .indices
            .iter()
            .find(|&&i| self.is_excluded(i, companion))
        {
            Some(&i) => Err(AstroKitError::ExcludedNodeInWindow {
                axis: self.name.clone(),
                node: self.nodes[i],
            }),
            None => Ok(()),
        }
    }
}
