//! # Stellar model families
//!
//! Every supported family of precomputed evolutionary tracks has its own parameter space,
//! axis nesting and canonical track length:
//!
//! | Family | Axes (inner → outer)     | Canonical length | Bucket file                  |
//! |--------|--------------------------|------------------|------------------------------|
//! | Y²     | mass ⊂ Z ⊂ α_MLT         | 150              | `y2_z0.02000_a0.3.trk`       |
//! | Geneva | mass ⊂ log₁₀ Z           | 51               | `geneva_z0.0140.trk`         |
//! | YaPSI  | mass ⊂ [Fe/H] ⊂ Y        | 500              | `yapsi_feh+0.0_y0.28.trk`    |
//!
//! A *bucket* groups all mass tracks that share the outer node values; it is the unit that
//! is stored in one file, loaded and cached.
use std::fmt;

use serde::Serialize;

use crate::astrokit_errors::AstroKitError;

use super::axis::GridAxis;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum ModelFamily {
    Y2,
    Geneva,
    Yapsi,
}

impl ModelFamily {
    pub fn dir_name(&self) -> &'static str {
        match self {
            ModelFamily::Y2 => "y2",
            ModelFamily::Geneva => "geneva",
            ModelFamily::Yapsi => "yapsi",
        }
    }

    pub fn canonical_length(&self) -> usize {
        match self {
            ModelFamily::Y2 => 150,
            ModelFamily::Geneva => 51,
            ModelFamily::Yapsi => 500,
        }
    }

    /// Number of axes above mass.
    pub fn bucket_arity(&self) -> usize {
        match self {
            ModelFamily::Geneva => 1,
            ModelFamily::Y2 | ModelFamily::Yapsi => 2,
        }
    }

    /// File name of the bucket with the given outer node values (inner → outer).
    pub fn bucket_file_name(&self, bucket: &[f64]) -> Result<String, AstroKitError> {
        match (self, bucket) {
            (ModelFamily::Y2, [z, alpha]) => Ok(format!("y2_z{z:.5}_a{alpha:.1}.trk")),
            (ModelFamily::Geneva, [log_z]) => Ok(format!("geneva_z{:.4}.trk", 10f64.powf(*log_z))),
            (ModelFamily::Yapsi, [feh, y]) => Ok(format!("yapsi_feh{feh:+.1}_y{y:.2}.trk")),
            _ => Err(AstroKitError::InvalidRequest(format!(
                "{self} buckets have {} node values, got {}",
                self.bucket_arity(),
                bucket.len()
            ))),
        }
    }

    /// Published node layout of the family.
    pub fn default_grid(&self) -> Result<FamilyGrid, AstroKitError> {
        let axes = match self {
            ModelFamily::Y2 => {
                let masses = (4..=20)
                    .map(|i| i as f64 / 10.0)
                    .chain((11..=26).map(|i| i as f64 / 5.0))
                    .collect();
                vec![
                    GridAxis::new("mass", masses, 2)?,
                    GridAxis::new(
                        "Z",
                        vec![
                            0.00001, 0.0001, 0.0004, 0.001, 0.004, 0.007, 0.01, 0.02, 0.04, 0.06,
                            0.08,
                        ],
                        5,
                    )?,
                    GridAxis::new("alpha", vec![0.0, 0.3, 0.6], 1)?,
                ]
            }
            ModelFamily::Geneva => {
                let masses = vec![
                    0.8, 0.9, 1.0, 1.1, 1.25, 1.35, 1.5, 1.7, 2.0, 2.5, 3.0, 4.0, 5.0, 7.0, 9.0,
                    12.0, 15.0, 20.0, 25.0, 32.0, 40.0, 60.0, 85.0, 120.0,
                ];
                let log_z = [0.0004, 0.002, 0.006, 0.014, 0.020]
                    .iter()
                    .map(|z: &f64| z.log10())
                    .collect();
                vec![
                    GridAxis::new("mass", masses, 2)?,
                    GridAxis::new("log10 Z", log_z, 3)?,
                ]
            }
            ModelFamily::Yapsi => {
                let masses = (3..=100).map(|i| i as f64 / 20.0).collect();
                vec![
                    GridAxis::new("mass", masses, 2)?,
                    GridAxis::new("[Fe/H]", vec![-1.5, -1.0, -0.5, 0.0, 0.3], 1)?,
                    GridAxis::new("Y", vec![0.25, 0.28, 0.31, 0.34, 0.37], 2)?,
                ]
            }
        };

        Ok(FamilyGrid {
            family: *self,
            canonical_length: self.canonical_length(),
            axes,
        })
    }
}

impl fmt::Display for ModelFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ModelFamily::Y2 => "Y2",
            ModelFamily::Geneva => "Geneva",
            ModelFamily::Yapsi => "YaPSI",
        };
        write!(f, "{name}")
    }
}

/// Axes of one family, innermost (mass) first.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FamilyGrid {
    pub family: ModelFamily,
    pub canonical_length: usize,
    pub axes: Vec<GridAxis>,
}

/// A point of a family's parameter space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum ModelParameters {
    /// Mass in solar masses, metal mass fraction Z, mixing-length alpha.
    ///
    /// The alpha axis only has the nodes 0.0, 0.3 and 0.6, too few for a four-node window:
    /// `alpha` must be one of them, any other value is a
    /// [`AstroKitError::NoValidWindow`] range error.
    Y2 { mass: f64, z: f64, alpha: f64 },
    /// Mass in solar masses, metal mass fraction Z.
    Geneva { mass: f64, z: f64 },
    /// Mass in solar masses, [Fe/H] in dex, helium mass fraction Y.
    Yapsi { mass: f64, feh: f64, y: f64 },
}

fn require(ok: bool, what: &str, value: f64) -> Result<(), AstroKitError> {
    if ok {
        Ok(())
    } else {
        Err(AstroKitError::InvalidRequest(format!(
            "invalid {what}: {value}"
        )))
    }
}

impl ModelParameters {
    pub fn family(&self) -> ModelFamily {
        match self {
            ModelParameters::Y2 { .. } => ModelFamily::Y2,
            ModelParameters::Geneva { .. } => ModelFamily::Geneva,
            ModelParameters::Yapsi { .. } => ModelFamily::Yapsi,
        }
    }

    /// Targets along the family axes, innermost first, in axis units (Geneva Z as log₁₀ Z).
    ///
    /// Return
    /// ----------
    /// * The validated targets, or [`AstroKitError::InvalidRequest`] for non-finite values,
    ///   non-positive masses or abundances, or a helium fraction outside `(0, 1)`.
    pub fn axis_targets(&self) -> Result<Vec<f64>, AstroKitError> {
        match *self {
            ModelParameters::Y2 { mass, z, alpha } => {
                require(mass.is_finite() && mass > 0.0, "mass", mass)?;
                require(z.is_finite() && z > 0.0, "Z", z)?;
                require(alpha.is_finite() && alpha >= 0.0, "alpha", alpha)?;
                Ok(vec![mass, z, alpha])
            }
            ModelParameters::Geneva { mass, z } => {
                require(mass.is_finite() && mass > 0.0, "mass", mass)?;
                require(z.is_finite() && z > 0.0, "Z", z)?;
                Ok(vec![mass, z.log10()])
            }
            ModelParameters::Yapsi { mass, feh, y } => {
                require(mass.is_finite() && mass > 0.0, "mass", mass)?;
                require(feh.is_finite(), "[Fe/H]", feh)?;
                require(y.is_finite() && y > 0.0 && y < 1.0, "Y", y)?;
                Ok(vec![mass, feh, y])
            }
        }
    }
}
