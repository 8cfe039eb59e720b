use std::fmt;

use serde::Serialize;

use crate::{
    astrokit_errors::AstroKitError,
    constants::{PackedKey, RowIndex},
};

const TYC2_BITS: u32 = 14;
const TYC3_BITS: u32 = 3;

/// Native key of a star inside one catalog.
///
/// * `Index` — dense 1-based row number (HIP, HIP2, KIC, HD, SAO, BSC).
/// * `Sorted` — integer stored in the sorted key column (EPIC identifier, packed Tycho key).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum StarKey {
    Index(RowIndex),
    Sorted(PackedKey),
}

impl StarKey {
    /// Pack a Tycho designation `TYC tyc1-tyc2-tyc3` as `tyc1<<18 | tyc2<<4 | tyc3<<1`.
    ///
    /// Arguments
    /// -----------------
    /// * `tyc1`: GSC region number.
    /// * `tyc2`: running number inside the region (< 2^14).
    /// * `tyc3`: component identifier (< 8).
    ///
    /// Return
    /// ----------
    /// * A [`StarKey::Sorted`] whose ordering follows `(tyc1, tyc2, tyc3)`, or
    ///   [`AstroKitError::InvalidRequest`] if a part does not fit its bit field.
    pub fn tycho(tyc1: u32, tyc2: u32, tyc3: u32) -> Result<Self, AstroKitError> {
        if tyc2 >= 1 << TYC2_BITS || tyc3 >= 1 << TYC3_BITS {
            return Err(AstroKitError::InvalidRequest(format!(
                "TYC {tyc1}-{tyc2}-{tyc3} does not fit the packed key layout"
            )));
        }
        let packed = ((tyc1 as i64) << 18) | ((tyc2 as i64) << 4) | ((tyc3 as i64) << 1);
        Ok(StarKey::Sorted(packed))
    }

    /// Inverse of [`StarKey::tycho`]; the low bit is ignored.
    pub fn unpack_tycho(key: PackedKey) -> (u32, u32, u32) {
        let tyc1 = (key >> 18) as u32;
        let tyc2 = ((key >> 4) & ((1 << TYC2_BITS) - 1)) as u32;
        let tyc3 = ((key >> 1) & ((1 << TYC3_BITS) - 1)) as u32;
        (tyc1, tyc2, tyc3)
    }
}

impl fmt::Display for StarKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StarKey::Index(i) => write!(f, "#{i}"),
            StarKey::Sorted(k) => write!(f, "key {k}"),
        }
    }
}

#[cfg(test)]
mod test_star_key {
    use super::*;

    #[test]
    fn test_tycho_packing() {
        let key = StarKey::tycho(4684, 2191, 1).unwrap();
        assert_eq!(key, StarKey::Sorted((4684 << 18) | (2191 << 4) | (1 << 1)));

        let StarKey::Sorted(packed) = key else {
            panic!("tycho keys are sorted keys")
        };
        assert_eq!(StarKey::unpack_tycho(packed), (4684, 2191, 1));
    }

    #[test]
    fn test_tycho_ordering() {
        let a = StarKey::tycho(1, 12000, 3).unwrap();
        let b = StarKey::tycho(2, 1, 1).unwrap();
        let c = StarKey::tycho(2, 1, 2).unwrap();
        assert!(a < b);
        assert!(b < c);
    }

    #[test]
    fn test_tycho_overflow() {
        assert!(StarKey::tycho(1, 1 << 14, 1).is_err());
        assert!(StarKey::tycho(1, 1, 8).is_err());
    }
}
