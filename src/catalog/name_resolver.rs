//! Turning a free-form star name into a catalog-native [`StarKey`].
//!
//! Full cross-identification between catalogs (e.g. "Vega" → HIP 91262) is an external
//! concern; the accessor only needs something implementing [`NameResolver`].
//! [`DesignationResolver`] is the built-in implementation: it understands plain catalog
//! designations such as `HIP 91262`, `HD 172167`, `EPIC 201000001`, `TYC 4684-2191-1` or a
//! bare number, and declines everything else.
use once_cell::sync::OnceCell;
use regex::Regex;

use crate::astrokit_errors::AstroKitError;

use super::{catalog_id::CatalogId, star_key::StarKey};

pub trait NameResolver {
    /// Resolve `name` to the native key of `catalog`.
    ///
    /// Return
    /// ----------
    /// * `Ok(None)` when the name does not designate a star of this catalog.
    fn resolve(&self, catalog: CatalogId, name: &str) -> Result<Option<StarKey>, AstroKitError>;
}

static DESIGNATION: OnceCell<Regex> = OnceCell::new();

fn designation_regex() -> Result<&'static Regex, AstroKitError> {
    DESIGNATION.get_or_try_init(|| {
        Regex::new(r"^(?:(?P<prefix>[A-Z]+)\s*)?(?P<body>[0-9]+(?:-[0-9]+)*)$")
            .map_err(|e| AstroKitError::InvalidRequest(format!("designation pattern: {e}")))
    })
}

/// Accepted designation prefixes per catalog.
fn prefixes(catalog: CatalogId) -> &'static [&'static str] {
    match catalog {
        CatalogId::Hip | CatalogId::Hip2 => &["HIP"],
        CatalogId::Kic => &["KIC"],
        CatalogId::Hd => &["HD"],
        CatalogId::Sao => &["SAO"],
        CatalogId::Bsc => &["HR", "BSC"],
        CatalogId::Epic => &["EPIC"],
        CatalogId::Tyc | CatalogId::Tyc2 => &["TYC"],
    }
}

fn parse_number<T: std::str::FromStr>(part: &str, name: &str) -> Result<T, AstroKitError> {
    part.parse::<T>()
        .map_err(|_| AstroKitError::InvalidRequest(format!("number out of range in {name:?}")))
}

#[derive(Debug, Clone, Copy, Default)]
pub struct DesignationResolver;

impl NameResolver for DesignationResolver {
    fn resolve(&self, catalog: CatalogId, name: &str) -> Result<Option<StarKey>, AstroKitError> {
        let normalized = name.trim().to_ascii_uppercase();
        let Some(caps) = designation_regex()?.captures(&normalized) else {
            return Ok(None);
        };

        if let Some(prefix) = caps.name("prefix") {
            if !prefixes(catalog).contains(&prefix.as_str()) {
                return Ok(None);
            }
        }

        let body = &caps["body"];
        let parts: Vec<&str> = body.split('-').collect();

        match (catalog.is_tycho(), parts.as_slice()) {
            (true, [tyc1, tyc2, tyc3]) => StarKey::tycho(
                parse_number(tyc1, name)?,
                parse_number(tyc2, name)?,
                parse_number(tyc3, name)?,
            )
            .map(Some),
            (false, [number]) => match catalog {
                CatalogId::Epic => Ok(Some(StarKey::Sorted(parse_number(number, name)?))),
                _ => Ok(Some(StarKey::Index(parse_number(number, name)?))),
            },
            _ => Err(AstroKitError::InvalidRequest(format!(
                "{name:?} is not a valid {catalog} designation"
            ))),
        }
    }
}
