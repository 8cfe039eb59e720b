//! # Track resampling
//!
//! Brings a [`Track`] to a given number of points. One parametric curve is fitted through
//! all quantities of the track at once, with the uniform index parameter
//! `t_i = i / (n - 1)` in `[0, 1]`, and evaluated at `N` evenly spaced parameters.
//!
//! * [`SplineDegree::Linear`] – piecewise linear, used to bring every stored track to the
//!   canonical length of its family before interpolation.
//! * [`SplineDegree::Cubic`] – natural cubic spline (zero second derivative at both ends),
//!   used for the final smoothing to a caller-chosen point count.
//!
//! Both curves pass through the input points, so the first and last rows are reproduced
//! exactly. A track that already has `N` points is returned unchanged.
use nalgebra::{DMatrix, RowDVector};

use crate::astrokit_errors::AstroKitError;

use super::track::Track;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SplineDegree {
    Linear,
    Cubic,
}

impl TryFrom<u8> for SplineDegree {
    type Error = AstroKitError;

    fn try_from(degree: u8) -> Result<Self, Self::Error> {
        match degree {
            1 => Ok(SplineDegree::Linear),
            3 => Ok(SplineDegree::Cubic),
            other => Err(AstroKitError::InvalidRequest(format!(
                "unsupported spline degree {other}, expected 1 or 3"
            ))),
        }
    }
}

/// Piecewise polynomial over the uniform parameter grid, one row vector per coefficient.
struct ParametricCurve {
    step: f64,
    /// `[a, b, c, d]` of each segment; `b = c = d = 0` rows are never built for linear curves.
    segments: Vec<[RowDVector<f64>; 4]>,
}

impl ParametricCurve {
    fn linear(points: &DMatrix<f64>) -> Self {
        let m = points.nrows();
        let step = 1.0 / (m - 1) as f64;
        let zero = RowDVector::zeros(points.ncols());
        let segments = (0..m - 1)
            .map(|j| {
                let a = points.row(j).into_owned();
                let b = (points.row(j + 1) - points.row(j)) / step;
                [a, b, zero.clone(), zero.clone()]
            })
            .collect();
        ParametricCurve { step, segments }
    }

    /// Natural cubic spline, tridiagonal system solved with the Thomas algorithm.
    fn natural_cubic(points: &DMatrix<f64>) -> Self {
        let m = points.nrows();
        let k = points.ncols();
        let h = 1.0 / (m - 1) as f64;
        let y = |i: usize| points.row(i).into_owned();

        let mut mu = vec![0.0; m];
        let mut z = vec![RowDVector::zeros(k); m];
        for i in 1..m - 1 {
            let alpha = (y(i + 1) - y(i)) * (3.0 / h) - (y(i) - y(i - 1)) * (3.0 / h);
            let l = 4.0 * h - h * mu[i - 1];
            mu[i] = h / l;
            z[i] = (alpha - &z[i - 1] * h) / l;
        }

        let mut c = vec![RowDVector::zeros(k); m];
        let mut segments = Vec::with_capacity(m - 1);
        for j in (0..m - 1).rev() {
            c[j] = &z[j] - &c[j + 1] * mu[j];
            let b = (y(j + 1) - y(j)) / h - (&c[j + 1] + &c[j] * 2.0) * (h / 3.0);
            let d = (&c[j + 1] - &c[j]) / (3.0 * h);
            segments.push([y(j), b, c[j].clone(), d]);
        }
        segments.reverse();

        ParametricCurve { step: h, segments }
    }

    fn evaluate(&self, t: f64) -> RowDVector<f64> {
        let last = self.segments.len() - 1;
        let j = ((t / self.step).floor().max(0.0) as usize).min(last);
        let dx = t - j as f64 * self.step;
        let [a, b, c, d] = &self.segments[j];
        a + b * dx + c * (dx * dx) + d * (dx * dx * dx)
    }
}

/// Resample `track` to `n` points.
///
/// Arguments
/// -----------------
/// * `track`: at least 2 points.
/// * `n`: output point count, at least 2.
/// * `degree`: linear or natural cubic curve.
///
/// Return
/// ----------
/// * A track with the same labels and `n` rows; `track` itself (cloned) if it already has
///   `n` rows.
pub fn resample(track: &Track, n: usize, degree: SplineDegree) -> Result<Track, AstroKitError> {
    if n < 2 {
        return Err(AstroKitError::InvalidRequest(format!(
            "cannot resample to {n} points"
        )));
    }
    if track.len() < 2 {
        return Err(AstroKitError::InvalidRequest(format!(
            "cannot resample a track of {} points",
            track.len()
        )));
    }
    if track.len() == n {
        return Ok(track.clone());
    }

    let curve = match degree {
        SplineDegree::Linear => ParametricCurve::linear(track.data()),
        SplineDegree::Cubic => ParametricCurve::natural_cubic(track.data()),
    };

    let mut data = DMatrix::zeros(n, track.width());
    for i in 0..n {
        let t = i as f64 / (n - 1) as f64;
        data.set_row(i, &curve.evaluate(t));
    }
    // endpoints are nodes of the curve
    data.set_row(0, &track.data().row(0));
    data.set_row(n - 1, &track.data().row(track.len() - 1));

    Ok(track.with_data(data))
}

#[cfg(test)]
mod test_resample {
    use approx::assert_relative_eq;

    use super::*;

    fn quadratic(points: usize) -> Track {
        let t: Vec<f64> = (0..points).map(|i| i as f64 / (points - 1) as f64).collect();
        let y: Vec<f64> = t.iter().map(|x| 1.0 + 2.0 * x).collect();
        let z: Vec<f64> = t.iter().map(|x| x * x).collect();
        Track::from_columns(&["y", "z"], &[y, z]).unwrap()
    }

    #[test]
    fn test_same_length_is_identity() {
        let track = quadratic(7);
        assert_eq!(resample(&track, 7, SplineDegree::Cubic).unwrap(), track);
        assert_eq!(resample(&track, 7, SplineDegree::Linear).unwrap(), track);
    }

    #[test]
    fn test_linear_reproduces_lines() {
        let track = quadratic(5);
        let out = resample(&track, 9, SplineDegree::Linear).unwrap();
        assert_eq!(out.len(), 9);
        for i in 0..9 {
            let t = i as f64 / 8.0;
            assert_relative_eq!(out.column("y").unwrap()[i], 1.0 + 2.0 * t, epsilon = 1e-12);
        }
        // every other output point is an input node
        for i in (0..9).step_by(2) {
            assert_relative_eq!(
                out.column("z").unwrap()[i],
                track.column("z").unwrap()[i / 2],
                epsilon = 1e-12
            );
        }
    }

    #[test]
    fn test_cubic_passes_through_nodes() {
        let track = quadratic(6);
        let out = resample(&track, 11, SplineDegree::Cubic).unwrap();
        for i in (0..11).step_by(2) {
            assert_relative_eq!(
                out.column("z").unwrap()[i],
                track.column("z").unwrap()[i / 2],
                epsilon = 1e-12
            );
            assert_relative_eq!(
                out.column("y").unwrap()[i],
                track.column("y").unwrap()[i / 2],
                epsilon = 1e-12
            );
        }
        // natural spline of a straight line is the line itself
        for i in 0..11 {
            assert_relative_eq!(
                out.column("y").unwrap()[i],
                1.0 + 2.0 * i as f64 / 10.0,
                epsilon = 1e-12
            );
        }
    }

    #[test]
    fn test_invalid_requests() {
        let single = Track::from_columns(&["y"], &[vec![1.0]]).unwrap();
        assert!(resample(&single, 10, SplineDegree::Linear).is_err());
        assert!(resample(&quadratic(4), 1, SplineDegree::Cubic).is_err());
        assert!(SplineDegree::try_from(2).is_err());
        assert_eq!(SplineDegree::try_from(3).unwrap(), SplineDegree::Cubic);
    }
}
