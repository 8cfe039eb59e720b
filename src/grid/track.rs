use std::fmt;

use nalgebra::{DMatrix, DVectorView};

use crate::astrokit_errors::AstroKitError;

/// One evolutionary track: `N` points × `K` labelled quantities.
///
/// Row `i` is the `i`-th point along the track, column `j` the quantity `labels[j]`
/// (e.g. `logTeff`, `logL`, `age`, `mass`). All tracks of a family share their labels.
#[derive(Debug, Clone, PartialEq)]
pub struct Track {
    labels: Vec<String>,
    data: DMatrix<f64>,
}

impl Track {
    pub fn new(labels: Vec<String>, data: DMatrix<f64>) -> Result<Self, AstroKitError> {
        if labels.len() != data.ncols() {
            return Err(AstroKitError::InvalidRequest(format!(
                "{} labels for a track of {} columns",
                labels.len(),
                data.ncols()
            )));
        }
        Ok(Track { labels, data })
    }

    /// Build a track from equal-length columns.
    pub fn from_columns(labels: &[&str], columns: &[Vec<f64>]) -> Result<Self, AstroKitError> {
        let len = columns.first().map_or(0, Vec::len);
        if columns.iter().any(|c| c.len() != len) {
            return Err(AstroKitError::InvalidRequest(
                "track columns have different lengths".to_string(),
            ));
        }
        let data = DMatrix::from_fn(len, columns.len(), |i, j| columns[j][i]);
        Track::new(labels.iter().map(|l| l.to_string()).collect(), data)
    }

    /// Number of points.
    pub fn len(&self) -> usize {
        self.data.nrows()
    }

    pub fn is_empty(&self) -> bool {
        self.data.nrows() == 0
    }

    /// Number of quantities.
    pub fn width(&self) -> usize {
        self.data.ncols()
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    pub fn column(&self, label: &str) -> Option<DVectorView<'_, f64>> {
        self.labels
            .iter()
            .position(|l| l == label)
            .map(|j| self.data.column(j))
    }

    pub fn data(&self) -> &DMatrix<f64> {
        &self.data
    }

    /// Same labels, other data.
    pub(crate) fn with_data(&self, data: DMatrix<f64>) -> Self {
        Track {
            labels: self.labels.clone(),
            data,
        }
    }

    pub(crate) fn same_shape(&self, other: &Track) -> bool {
        self.labels == other.labels && self.data.shape() == other.data.shape()
    }
}

impl fmt::Display for Track {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Track of {} points", self.len())?;
        for (j, label) in self.labels.iter().enumerate() {
            let column = self.data.column(j);
            writeln!(
                f,
                "  {label:<10} [{:.6} .. {:.6}]",
                column.min(),
                column.max()
            )?;
        }
        Ok(())
    }
}
