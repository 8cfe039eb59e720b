//! # Reference data locations
//!
//! All catalog tables and evolutionary track buckets are read-only reference files living
//! under one data root:
//!
//! ```text
//! <root>/
//! ├── catalogs/          binary tables (hip_main.fits, tyc2.fits, ...)
//! └── tracks/
//!     ├── y2/            one bucket file per (Z, alpha)
//!     ├── geneva/        one bucket file per Z
//!     └── yapsi/         one bucket file per ([Fe/H], Y)
//! ```
//!
//! The root is either given explicitly by the caller or defaults to the platform data
//! directory (e.g. `~/.local/share/astrokit` on Linux) resolved with
//! [`directories::BaseDirs`].
use camino::{Utf8Path, Utf8PathBuf};
use directories::BaseDirs;

use crate::{astrokit_errors::AstroKitError, grid::family::ModelFamily};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataPaths {
    root: Utf8PathBuf,
}

impl DataPaths {
    /// Use `root` as the data root without checking that it exists.
    pub fn new(root: impl Into<Utf8PathBuf>) -> Self {
        DataPaths { root: root.into() }
    }

    /// Resolve the data root.
    ///
    /// Arguments
    /// -----------------
    /// * `user_path`: an optional user-provided root. When given, it must exist.
    ///
    /// Return
    /// ----------
    /// * The resolved [`DataPaths`], or [`AstroKitError::DataDirNotFound`] if the user
    ///   path does not exist, or an error if no platform data directory is available.
    ///
    /// See also
    /// ------------
    /// * [`DataPaths::platform_default`] – Fallback used when `user_path` is `None`.
    pub fn resolve(user_path: Option<&str>) -> Result<Self, AstroKitError> {
        if let Some(path_str) = user_path {
            let path = Utf8Path::new(path_str);
            if path.is_dir() {
                return Ok(DataPaths::new(path));
            }
            return Err(AstroKitError::DataDirNotFound(path_str.to_string()));
        }
        DataPaths::platform_default()
    }

    /// `<platform data dir>/astrokit`
    pub fn platform_default() -> Result<Self, AstroKitError> {
        let base_dir = BaseDirs::new().ok_or_else(|| {
            AstroKitError::DataDirNotFound("no home directory for this user".to_string())
        })?;
        let data_dir = Utf8Path::from_path(base_dir.data_dir()).ok_or_else(|| {
            AstroKitError::Utf8PathError(format!("{:?}", base_dir.data_dir()))
        })?;
        Ok(DataPaths::new(data_dir.join("astrokit")))
    }

    pub fn root(&self) -> &Utf8Path {
        &self.root
    }

    pub fn catalog_dir(&self) -> Utf8PathBuf {
        self.root.join("catalogs")
    }

    pub fn catalog_file(&self, file_name: &str) -> Utf8PathBuf {
        self.catalog_dir().join(file_name)
    }

    pub fn track_dir(&self, family: ModelFamily) -> Utf8PathBuf {
        self.root.join("tracks").join(family.dir_name())
    }
}

#[cfg(test)]
mod test_data_paths {
    use super::*;

    #[test]
    fn test_layout() {
        let paths = DataPaths::new("/data/astro");
        assert_eq!(paths.catalog_dir(), Utf8PathBuf::from("/data/astro/catalogs"));
        assert_eq!(
            paths.catalog_file("hip_main.fits"),
            Utf8PathBuf::from("/data/astro/catalogs/hip_main.fits")
        );
        assert_eq!(
            paths.track_dir(ModelFamily::Geneva),
            Utf8PathBuf::from("/data/astro/tracks/geneva")
        );
    }

    #[test]
    fn test_missing_user_path() {
        let result = DataPaths::resolve(Some("/definitely/not/a/data/root"));
        assert_eq!(
            result,
            Err(AstroKitError::DataDirNotFound(
                "/definitely/not/a/data/root".to_string()
            ))
        );
    }

    #[test]
    fn test_existing_user_path() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().to_str().unwrap();
        let paths = DataPaths::resolve(Some(root)).unwrap();
        assert_eq!(paths.root(), Utf8Path::new(root));
    }
}
