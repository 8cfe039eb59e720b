//! # Catalog accessor
//!
//! [`CatalogAccessor`] is the long-lived entry point for star lookups in one catalog. It
//! owns the catalog layout ([`CatalogSpec`]), a [`NameResolver`], and a lazily built
//! [`RecordLocator`] whose schema is read once on first use and then reused.
//!
//! ## Lookup pipeline
//!
//! ```text
//! ObjectRequest ──► StarKey ──► RecordLocator ──► [propagation] ──► CatalogMatch
//!   name | id        resolver     index / key        target epoch      Raw | Named
//! ```
//!
//! ## Example
//!
//! ```rust,no_run
//! use astrokit::catalog::{accessor::{CatalogAccessor, ObjectRequest}, catalog_id::CatalogId, output::OutputShape};
//! use astrokit::data_paths::DataPaths;
//!
//! let paths = DataPaths::resolve(None)?;
//! let hip = CatalogAccessor::new(CatalogId::Hip, &paths);
//! if let Some(found) = hip.find_object(&ObjectRequest::by_name("HIP 91262"), OutputShape::Named)? {
//!     println!("{found}");
//! }
//! # Ok::<(), astrokit::astrokit_errors::AstroKitError>(())
//! ```
use camino::{Utf8Path, Utf8PathBuf};
use hifitime::Epoch;
use log::{debug, warn};
use once_cell::sync::OnceCell;

use crate::{astrokit_errors::AstroKitError, data_paths::DataPaths};

use super::{
    catalog_id::{AccessMode, CatalogId, CatalogSpec},
    locator::{Located, RecordLocator},
    name_resolver::{DesignationResolver, NameResolver},
    output::{CatalogMatch, FoundObject, MatchKind, OutputShape},
    propagation::propagate_record,
    star_key::StarKey,
};

/// What to look up: exactly one of `name` / `id`, plus an optional target epoch.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ObjectRequest {
    pub name: Option<String>,
    pub id: Option<u64>,
    pub epoch: Option<Epoch>,
}

impl ObjectRequest {
    pub fn by_name(name: &str) -> Self {
        ObjectRequest {
            name: Some(name.to_string()),
            ..Default::default()
        }
    }

    pub fn by_id(id: u64) -> Self {
        ObjectRequest {
            id: Some(id),
            ..Default::default()
        }
    }

    pub fn at_epoch(mut self, epoch: Epoch) -> Self {
        self.epoch = Some(epoch);
        self
    }
}

#[derive(Debug)]
pub struct CatalogAccessor<R: NameResolver = DesignationResolver> {
    catalog: CatalogId,
    spec: CatalogSpec,
    path: Utf8PathBuf,
    resolver: R,
    locator: OnceCell<RecordLocator>,
}

impl CatalogAccessor<DesignationResolver> {
    /// Accessor on the default layout of `catalog` under `paths`.
    pub fn new(catalog: CatalogId, paths: &DataPaths) -> Self {
        let spec = catalog.spec();
        let path = paths.catalog_file(&spec.file_name);
        CatalogAccessor::with_spec(catalog, spec, &path, DesignationResolver)
    }
}

impl<R: NameResolver> CatalogAccessor<R> {
    /// Accessor with an explicit layout, table path and resolver.
    pub fn with_spec(catalog: CatalogId, spec: CatalogSpec, path: &Utf8Path, resolver: R) -> Self {
        CatalogAccessor {
            catalog,
            spec,
            path: path.to_path_buf(),
            resolver,
            locator: OnceCell::new(),
        }
    }

    pub fn catalog(&self) -> CatalogId {
        self.catalog
    }

    pub fn spec(&self) -> &CatalogSpec {
        &self.spec
    }

    /// The locator, reading the table schema on first call.
    pub fn locator(&self) -> Result<&RecordLocator, AstroKitError> {
        self.locator.get_or_try_init(|| {
            debug!("Reading schema of {} from {}", self.catalog, self.path);
            RecordLocator::open(&self.path, self.spec.extension)
        })
    }

    fn key_from_id(&self, id: u64) -> Result<StarKey, AstroKitError> {
        match self.spec.mode {
            AccessMode::DirectIndex => Ok(StarKey::Index(id)),
            AccessMode::SortedKey { .. } => i64::try_from(id).map(StarKey::Sorted).map_err(|_| {
                AstroKitError::InvalidRequest(format!("id {id} exceeds the key range"))
            }),
        }
    }

    fn request_key(&self, request: &ObjectRequest) -> Result<Option<StarKey>, AstroKitError> {
        match (&request.name, request.id) {
            (Some(name), None) => self.resolver.resolve(self.catalog, name),
            (None, Some(id)) => self.key_from_id(id).map(Some),
            (Some(name), Some(id)) => Err(AstroKitError::InvalidRequest(format!(
                "both name {name:?} and id {id} given"
            ))),
            (None, None) => Err(AstroKitError::InvalidRequest(
                "request needs a name or an id".to_string(),
            )),
        }
    }

    /// Look one star up.
    ///
    /// Arguments
    /// -----------------
    /// * `request`: a name or a numeric id (not both), and an optional epoch. With an
    ///   epoch, the position columns of an exact match are propagated to it.
    /// * `shape`: raw record or name-keyed map.
    ///
    /// Return
    /// ----------
    /// * `Ok(None)` if the name is not a designation of this catalog or the star is absent
    ///   from a catalog without a reserved null row.
    /// * `Ok(Some(match))` otherwise; keyed catalogs return their null row with
    ///   [`MatchKind::NullRow`] when the key is absent.
    /// * [`AstroKitError::InvalidRequest`] for contradictory input, or for an epoch on a
    ///   catalog without astrometry.
    ///
    /// See also
    /// ------------
    /// * [`RecordLocator::locate_key`] – Sorted-key search with null row and companion check.
    /// * [`propagate_record`] – Epoch propagation.
    pub fn find_object(
        &self,
        request: &ObjectRequest,
        shape: OutputShape,
    ) -> Result<Option<CatalogMatch>, AstroKitError> {
        if request.epoch.is_some() && self.spec.astrometry.is_none() {
            return Err(AstroKitError::InvalidRequest(format!(
                "{} has no astrometry to propagate",
                self.catalog
            )));
        }

        let Some(key) = self.request_key(request)? else {
            return Ok(None);
        };
        let locator = self.locator()?;

        let (record, kind, possible_companion) = match (&self.spec.mode, key) {
            (AccessMode::DirectIndex, StarKey::Index(id)) => match locator.locate_index(id)? {
                Some(record) => (record, MatchKind::Exact, None),
                None => return Ok(None),
            },
            (AccessMode::SortedKey { key_column }, StarKey::Sorted(packed)) => {
                match locator.locate_key(key_column, packed, &self.spec.key_policy())? {
                    Located::Found {
                        record, companion, ..
                    } => (
                        record,
                        MatchKind::Exact,
                        companion
                            .and(packed.checked_add(1))
                            .map(StarKey::Sorted),
                    ),
                    Located::Sentinel { record, .. } => {
                        warn!("{} {key} not found, null row returned", self.catalog);
                        (record, MatchKind::NullRow, None)
                    }
                    Located::NotFound => return Ok(None),
                }
            }
            (_, key) => {
                return Err(AstroKitError::InvalidRequest(format!(
                    "{key} does not match the access mode of {}",
                    self.catalog
                )))
            }
        };

        let record = match (&request.epoch, &self.spec.astrometry, kind) {
            (Some(epoch), Some(columns), MatchKind::Exact) => {
                propagate_record(&record, columns, epoch)?
            }
            _ => record,
        };

        Ok(Some(CatalogMatch {
            catalog: self.catalog,
            key,
            kind,
            object: FoundObject::shape(record, shape),
            possible_companion,
        }))
    }
}

#[cfg(test)]
mod test_accessor {
    use std::{fs::File, io::Write};

    use super::*;
    use crate::unit_test_global::bintable_bytes;

    fn hip_like(dir: &tempfile::TempDir) -> Utf8PathBuf {
        let rows: Vec<Vec<u8>> = (1..=3i32)
            .map(|hip| {
                let mut row = hip.to_be_bytes().to_vec();
                row.extend_from_slice(&(hip as f64 * 10.0).to_be_bytes());
                row
            })
            .collect();
        let bytes = bintable_bytes(&[("HIP", "1J"), ("VMAG", "1D")], &rows);
        let path = Utf8PathBuf::from_path_buf(dir.path().join("hip.fits")).unwrap();
        File::create(&path).unwrap().write_all(&bytes).unwrap();
        path
    }

    fn accessor(path: &Utf8Path) -> CatalogAccessor {
        let spec = CatalogSpec {
            astrometry: None,
            ..CatalogId::Hip.spec()
        };
        CatalogAccessor::with_spec(CatalogId::Hip, spec, path, DesignationResolver)
    }

    #[test]
    fn test_find_by_name_and_id() {
        let dir = tempfile::tempdir().unwrap();
        let hip = accessor(&hip_like(&dir));

        let by_name = hip
            .find_object(&ObjectRequest::by_name("HIP 2"), OutputShape::Raw)
            .unwrap()
            .unwrap();
        let by_id = hip
            .find_object(&ObjectRequest::by_id(2), OutputShape::Raw)
            .unwrap()
            .unwrap();
        assert_eq!(by_name, by_id);
        assert!(by_name.is_exact());
        assert_eq!(by_name.object.get("VMAG").and_then(|v| v.as_f64()), Some(20.0));

        assert_eq!(
            hip.find_object(&ObjectRequest::by_id(4), OutputShape::Raw)
                .unwrap(),
            None
        );
        assert_eq!(
            hip.find_object(&ObjectRequest::by_name("Vega"), OutputShape::Raw)
                .unwrap(),
            None
        );
    }

    #[test]
    fn test_contradictory_requests() {
        let dir = tempfile::tempdir().unwrap();
        let hip = accessor(&hip_like(&dir));

        let both = ObjectRequest {
            name: Some("HIP 1".to_string()),
            id: Some(1),
            epoch: None,
        };
        assert!(matches!(
            hip.find_object(&both, OutputShape::Raw),
            Err(AstroKitError::InvalidRequest(_))
        ));
        assert!(matches!(
            hip.find_object(&ObjectRequest::default(), OutputShape::Raw),
            Err(AstroKitError::InvalidRequest(_))
        ));

        let epoch = Epoch::from_mjd_in_time_scale(60000.0, hifitime::TimeScale::TT);
        assert!(matches!(
            hip.find_object(&ObjectRequest::by_id(1).at_epoch(epoch), OutputShape::Raw),
            Err(AstroKitError::InvalidRequest(_))
        ));
    }

    #[test]
    fn test_companion_check_at_largest_key() {
        let dir = tempfile::tempdir().unwrap();
        let rows: Vec<Vec<u8>> = [0i64, 3, 4, i64::MAX]
            .iter()
            .map(|k| k.to_be_bytes().to_vec())
            .collect();
        let bytes = bintable_bytes(&[("EPIC", "1K")], &rows);
        let path = Utf8PathBuf::from_path_buf(dir.path().join("epic.fits")).unwrap();
        File::create(&path).unwrap().write_all(&bytes).unwrap();

        let spec = CatalogSpec {
            companion_check: true,
            astrometry: None,
            ..CatalogId::Epic.spec()
        };
        let epic = CatalogAccessor::with_spec(CatalogId::Epic, spec, &path, DesignationResolver);

        let last = epic
            .find_object(&ObjectRequest::by_id(i64::MAX as u64), OutputShape::Raw)
            .unwrap()
            .unwrap();
        assert_eq!(last.kind, MatchKind::Exact);
        assert_eq!(last.possible_companion, None);

        let paired = epic
            .find_object(&ObjectRequest::by_id(3), OutputShape::Raw)
            .unwrap()
            .unwrap();
        assert_eq!(paired.possible_companion, Some(StarKey::Sorted(4)));
    }

    #[test]
    fn test_missing_table() {
        let hip = accessor(Utf8Path::new("/no/such/hip.fits"));
        assert!(matches!(
            hip.find_object(&ObjectRequest::by_id(1), OutputShape::Raw),
            Err(AstroKitError::IoError(_))
        ));
    }
}
