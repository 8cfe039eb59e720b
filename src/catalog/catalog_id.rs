//! Static description of every supported catalog.
//!
//! A [`CatalogSpec`] tells the accessor where a catalog lives, which extension holds the
//! table, how a record is located ([`AccessMode`]), which null-row and companion
//! conventions apply, and which columns carry astrometry for epoch propagation.
//!
//! | Catalog | File           | Mode             | Null row | Companion | Astrometry epoch |
//! |---------|----------------|------------------|----------|-----------|------------------|
//! | HIP     | `hip_main.fits`| direct index     | –        | –         | J1991.25         |
//! | HIP2    | `hip2.fits`    | direct index     | –        | –         | J1991.25         |
//! | KIC     | `kic.fits`     | direct index     | –        | –         | –                |
//! | HD      | `hd.fits`      | direct index     | –        | –         | –                |
//! | SAO     | `sao.fits`     | direct index     | –        | –         | –                |
//! | BSC     | `bsc5.fits`    | direct index     | –        | –         | –                |
//! | EPIC    | `epic.fits`    | sorted `EPIC`    | row 0    | –         | J2000.0          |
//! | TYC     | `tyc_main.fits`| sorted `TYCKEY`  | row 0    | yes       | J1991.25         |
//! | TYC2    | `tyc2.fits`    | sorted `TYCKEY`  | row 0    | yes       | J2000.0          |
use std::{fmt, str::FromStr};

use serde::Serialize;

use crate::{
    astrokit_errors::AstroKitError,
    constants::{JulianYear, RowIndex},
};

use super::locator::KeyPolicy;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum CatalogId {
    Hip,
    Hip2,
    Kic,
    Hd,
    Sao,
    Bsc,
    Epic,
    Tyc,
    Tyc2,
}

/// How a record is found inside the catalog table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum AccessMode {
    /// The identifier is the 1-based row number.
    DirectIndex,
    /// Rows are ascending by the integer column `key_column`.
    SortedKey { key_column: String },
}

/// Column names holding the position and proper motion, and the epoch they refer to.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AstrometryColumns {
    pub ra: String,
    pub dec: String,
    pub pmra: String,
    pub pmdec: String,
    pub epoch: JulianYear,
}

impl AstrometryColumns {
    fn standard(epoch: JulianYear) -> Self {
        AstrometryColumns {
            ra: "RA".to_string(),
            dec: "DEC".to_string(),
            pmra: "PMRA".to_string(),
            pmdec: "PMDEC".to_string(),
            epoch,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CatalogSpec {
    pub file_name: String,
    /// 1-based extension index of the table.
    pub extension: usize,
    pub mode: AccessMode,
    pub sentinel_row: Option<RowIndex>,
    pub companion_check: bool,
    pub astrometry: Option<AstrometryColumns>,
}

impl CatalogSpec {
    pub fn key_policy(&self) -> KeyPolicy {
        KeyPolicy {
            sentinel_row: self.sentinel_row,
            companion_check: self.companion_check,
        }
    }
}

impl CatalogId {
    pub const ALL: [CatalogId; 9] = [
        CatalogId::Hip,
        CatalogId::Hip2,
        CatalogId::Kic,
        CatalogId::Hd,
        CatalogId::Sao,
        CatalogId::Bsc,
        CatalogId::Epic,
        CatalogId::Tyc,
        CatalogId::Tyc2,
    ];

    /// Default layout of this catalog on disk.
    pub fn spec(&self) -> CatalogSpec {
        let direct = |file_name: &str, astrometry: Option<AstrometryColumns>| CatalogSpec {
            file_name: file_name.to_string(),
            extension: 1,
            mode: AccessMode::DirectIndex,
            sentinel_row: None,
            companion_check: false,
            astrometry,
        };
        let keyed = |file_name: &str, key_column: &str, companion_check: bool, epoch| {
            CatalogSpec {
                file_name: file_name.to_string(),
                extension: 1,
                mode: AccessMode::SortedKey {
                    key_column: key_column.to_string(),
                },
                sentinel_row: Some(0),
                companion_check,
                astrometry: Some(AstrometryColumns::standard(epoch)),
            }
        };

        match self {
            CatalogId::Hip => direct("hip_main.fits", Some(AstrometryColumns::standard(1991.25))),
            CatalogId::Hip2 => direct("hip2.fits", Some(AstrometryColumns::standard(1991.25))),
            CatalogId::Kic => direct("kic.fits", None),
            CatalogId::Hd => direct("hd.fits", None),
            CatalogId::Sao => direct("sao.fits", None),
            CatalogId::Bsc => direct("bsc5.fits", None),
            CatalogId::Epic => keyed("epic.fits", "EPIC", false, 2000.0),
            CatalogId::Tyc => keyed("tyc_main.fits", "TYCKEY", true, 1991.25),
            CatalogId::Tyc2 => keyed("tyc2.fits", "TYCKEY", true, 2000.0),
        }
    }

    pub fn is_tycho(&self) -> bool {
        matches!(self, CatalogId::Tyc | CatalogId::Tyc2)
    }
}

impl FromStr for CatalogId {
    type Err = AstroKitError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "HIP" => Ok(CatalogId::Hip),
            "HIP2" => Ok(CatalogId::Hip2),
            "KIC" => Ok(CatalogId::Kic),
            "HD" => Ok(CatalogId::Hd),
            "SAO" => Ok(CatalogId::Sao),
            "BSC" | "HR" => Ok(CatalogId::Bsc),
            "EPIC" => Ok(CatalogId::Epic),
            "TYC" => Ok(CatalogId::Tyc),
            "TYC2" => Ok(CatalogId::Tyc2),
            other => Err(AstroKitError::InvalidRequest(format!(
                "unknown catalog {other}"
            ))),
        }
    }
}

impl fmt::Display for CatalogId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CatalogId::Hip => "HIP",
            CatalogId::Hip2 => "HIP2",
            CatalogId::Kic => "KIC",
            CatalogId::Hd => "HD",
            CatalogId::Sao => "SAO",
            CatalogId::Bsc => "BSC",
            CatalogId::Epic => "EPIC",
            CatalogId::Tyc => "TYC",
            CatalogId::Tyc2 => "TYC2",
        };
        write!(f, "{name}")
    }
}

#[cfg(test)]
mod test_catalog_id {
    use super::*;

    #[test]
    fn test_round_trip_names() {
        for id in CatalogId::ALL {
            assert_eq!(id.to_string().parse::<CatalogId>().unwrap(), id);
        }
        assert_eq!("hr".parse::<CatalogId>().unwrap(), CatalogId::Bsc);
        assert!("GAIA".parse::<CatalogId>().is_err());
    }

    #[test]
    fn test_keyed_catalogs_reserve_row_zero() {
        for id in CatalogId::ALL {
            let spec = id.spec();
            match spec.mode {
                AccessMode::DirectIndex => assert_eq!(spec.sentinel_row, None),
                AccessMode::SortedKey { .. } => assert_eq!(spec.sentinel_row, Some(0)),
            }
            assert_eq!(spec.companion_check, id.is_tycho());
        }
    }

    #[test]
    fn test_astrometry_epochs() {
        assert_eq!(CatalogId::Hip.spec().astrometry.map(|a| a.epoch), Some(1991.25));
        assert_eq!(CatalogId::Tyc2.spec().astrometry.map(|a| a.epoch), Some(2000.0));
        assert_eq!(CatalogId::Kic.spec().astrometry, None);
    }
}
