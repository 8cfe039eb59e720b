//! # Proper-motion propagation
//!
//! Moves a catalog position from its catalog epoch to a requested epoch using the
//! catalog proper motions. Only the position changes; the motion itself is kept constant
//! (no radial velocity, no parallax, no light-time).
//!
//! ## Conventions
//!
//! * `ra`, `dec` in degrees.
//! * `pmra` is μα* = μα·cos δ and `pmdec` is μδ, both in mas/yr.
//! * Epochs are Julian years; [`julian_year`] converts a [`hifitime::Epoch`] (TT).
//!
//! The displacement is applied along the local tangent plane of the unit position vector
//! and the result is renormalised, so the formula stays well-behaved close to the poles.
use hifitime::Epoch;
use nalgebra::Vector3;
use serde::Serialize;

use crate::{
    astrokit_errors::AstroKitError,
    binary_table::record::{CatalogRecord, CatalogValue},
    constants::{
        Degree, JulianYear, MasPerYear, DAYS_PER_JULIAN_YEAR, J2000_YEAR, MAS_PER_DEGREE, RADEG,
        T2000,
    },
};

use super::catalog_id::AstrometryColumns;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Astrometry {
    pub ra: Degree,
    pub dec: Degree,
    pub pmra: MasPerYear,
    pub pmdec: MasPerYear,
}

/// Julian year (TT) of `epoch`, e.g. 2000.0 for J2000.0.
pub fn julian_year(epoch: &Epoch) -> JulianYear {
    J2000_YEAR + (epoch.to_mjd_tt_days() - T2000) / DAYS_PER_JULIAN_YEAR
}

impl Astrometry {
    /// Read the astrometric columns of `record`.
    pub fn from_record(
        record: &CatalogRecord,
        columns: &AstrometryColumns,
    ) -> Result<Self, AstroKitError> {
        let field = |name: &str| -> Result<f64, AstroKitError> {
            record
                .get(name)
                .ok_or_else(|| AstroKitError::UnknownColumn(name.to_string()))?
                .as_f64()
                .ok_or_else(|| {
                    AstroKitError::RowDecodeError(format!("column {name} is not numeric"))
                })
        };
        Ok(Astrometry {
            ra: field(&columns.ra)?,
            dec: field(&columns.dec)?,
            pmra: field(&columns.pmra)?,
            pmdec: field(&columns.pmdec)?,
        })
    }

    /// Position moved from epoch `from` to epoch `to`.
    ///
    /// Arguments
    /// -----------------
    /// * `from`: catalog epoch in Julian years.
    /// * `to`: target epoch in Julian years.
    ///
    /// Return
    /// ----------
    /// * A new [`Astrometry`] with `ra` in `[0, 360)` and the same proper motion.
    pub fn propagate(&self, from: JulianYear, to: JulianYear) -> Astrometry {
        let dt = to - from;
        if dt == 0.0 || (self.pmra == 0.0 && self.pmdec == 0.0) {
            return *self;
        }

        let (sin_ra, cos_ra) = (self.ra * RADEG).sin_cos();
        let (sin_dec, cos_dec) = (self.dec * RADEG).sin_cos();

        let position = Vector3::new(cos_dec * cos_ra, cos_dec * sin_ra, sin_dec);
        let east = Vector3::new(-sin_ra, cos_ra, 0.0);
        let north = Vector3::new(-sin_dec * cos_ra, -sin_dec * sin_ra, cos_dec);

        let scale = dt / MAS_PER_DEGREE * RADEG;
        let moved = (position + (east * self.pmra + north * self.pmdec) * scale).normalize();

        let ra = moved.y.atan2(moved.x) / RADEG;
        let dec = moved.z.clamp(-1.0, 1.0).asin() / RADEG;

        Astrometry {
            ra: ra.rem_euclid(360.0),
            dec,
            ..*self
        }
    }
}

/// Copy of `record` with its position columns propagated to `target`.
///
/// See also
/// ------------
/// * [`Astrometry::propagate`] – The position update itself.
pub fn propagate_record(
    record: &CatalogRecord,
    columns: &AstrometryColumns,
    target: &Epoch,
) -> Result<CatalogRecord, AstroKitError> {
    let moved = Astrometry::from_record(record, columns)?.propagate(columns.epoch, julian_year(target));
    record
        .with_value(&columns.ra, CatalogValue::Double(moved.ra))?
        .with_value(&columns.dec, CatalogValue::Double(moved.dec))
}
