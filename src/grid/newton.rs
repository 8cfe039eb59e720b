use itertools::Itertools;
use nalgebra::DMatrix;

use crate::{astrokit_errors::AstroKitError, constants::WINDOW_SIZE};

use super::track::Track;

/// Cubic Newton interpolation between four tracks sampled at four axis values.
///
/// Each entry of the divided-difference table is a whole `N × K` matrix, so every point of
/// every quantity is interpolated with the same polynomial weights.
///
/// Arguments
/// -----------------
/// * `nodes`: exactly four `(axis value, track)` pairs, distinct axis values, tracks of
///   identical labels and shape (i.e. already at the canonical length).
/// * `target`: the axis value to evaluate at. Values outside the node span extrapolate.
///
/// Return
/// ----------
/// * The interpolated track, or [`AstroKitError::InvalidRequest`] if the inputs violate
///   the constraints above.
pub fn interpolate_tracks(nodes: &[(f64, Track)], target: f64) -> Result<Track, AstroKitError> {
    if nodes.len() != WINDOW_SIZE {
        return Err(AstroKitError::InvalidRequest(format!(
            "Newton interpolation needs {WINDOW_SIZE} tracks, got {}",
            nodes.len()
        )));
    }
    let reference = &nodes[0].1;
    if nodes.iter().any(|(_, t)| !t.same_shape(reference)) {
        return Err(AstroKitError::InvalidRequest(
            "tracks to interpolate have different shapes".to_string(),
        ));
    }

    let x: Vec<f64> = nodes.iter().map(|(x, _)| *x).collect();
    if let Some((a, _)) = x.iter().tuple_combinations().find(|(a, b)| a == b) {
        return Err(AstroKitError::InvalidRequest(format!(
            "duplicate interpolation node {a}"
        )));
    }

    let mut coefficients: Vec<DMatrix<f64>> = nodes.iter().map(|(_, t)| t.data().clone()).collect();
    for order in 1..WINDOW_SIZE {
        for i in (order..WINDOW_SIZE).rev() {
            let divided = (&coefficients[i] - &coefficients[i - 1]) / (x[i] - x[i - order]);
            coefficients[i] = divided;
        }
    }

    let mut result = coefficients[WINDOW_SIZE - 1].clone();
    for i in (0..WINDOW_SIZE - 1).rev() {
        result = result * (target - x[i]) + &coefficients[i];
    }

    Ok(reference.with_data(result))
}

#[cfg(test)]
mod test_newton {
    use approx::assert_relative_eq;

    use super::*;

    fn constant_track(values: [f64; 2]) -> Track {
        Track::from_columns(&["a", "b"], &[vec![values[0]; 3], vec![values[1]; 3]]).unwrap()
    }

    #[test]
    fn test_cubic_is_exact() {
        let f = |x: f64| 2.0 - x + 0.5 * x * x - 0.25 * x * x * x;
        let g = |x: f64| 3.0 * x;
        let nodes: Vec<(f64, Track)> = [0.8, 0.9, 1.1, 1.4]
            .iter()
            .map(|&x| (x, constant_track([f(x), g(x)])))
            .collect();

        for target in [0.8, 0.95, 1.05, 1.3, 1.6] {
            let track = interpolate_tracks(&nodes, target).unwrap();
            assert_relative_eq!(track.data()[(1, 0)], f(target), epsilon = 1e-12);
            assert_relative_eq!(track.data()[(2, 1)], g(target), epsilon = 1e-12);
        }
    }

    #[test]
    fn test_node_is_reproduced() {
        let nodes: Vec<(f64, Track)> = [1.0f64, 2.0, 3.0, 4.0]
            .iter()
            .map(|&x| (x, constant_track([x.sqrt(), x.ln()])))
            .collect();
        let track = interpolate_tracks(&nodes, 3.0).unwrap();
        assert_relative_eq!(track.data()[(0, 0)], 3.0f64.sqrt(), epsilon = 1e-12);
        assert_relative_eq!(track.data()[(0, 1)], 3.0f64.ln(), epsilon = 1e-12);
    }

    #[test]
    fn test_rejects_bad_inputs() {
        let t = constant_track([1.0, 2.0]);
        let three: Vec<(f64, Track)> = (0..3).map(|i| (i as f64, t.clone())).collect();
        assert!(interpolate_tracks(&three, 0.5).is_err());

        let duplicate: Vec<(f64, Track)> =
            [0.0, 1.0, 1.0, 2.0].iter().map(|&x| (x, t.clone())).collect();
        assert!(interpolate_tracks(&duplicate, 0.5).is_err());

        let mut mixed: Vec<(f64, Track)> = (0..4).map(|i| (i as f64, t.clone())).collect();
        mixed[2].1 = Track::from_columns(&["a", "b"], &[vec![1.0; 4], vec![2.0; 4]]).unwrap();
        assert!(interpolate_tracks(&mixed, 0.5).is_err());
    }
}
