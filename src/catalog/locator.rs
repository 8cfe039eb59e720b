//! Single-record access into a binary table.
//!
//! Two access modes share one [`RecordLocator`]:
//!
//! * **Direct offset** ([`RecordLocator::locate_index`]) — the star identifier *is* the
//!   1-based row number, so the record lives at `data_offset + (id - 1) * row_bytes`.
//! * **Sorted key** ([`RecordLocator::search_key`] / [`RecordLocator::locate_key`]) — rows
//!   are ascending by an integer key column; a binary search reads only the key field of
//!   each probed row, so a lookup costs O(log row_count) seeks.
//!
//! The generic search reports a miss as `None`. Catalog-specific conventions (a reserved
//! null row, the Tycho companion check) are layered on top by [`KeyPolicy`].
//!
//! Every call opens the table, performs its seeks and reads, and closes it on return.
use std::{
    cmp::Ordering,
    fs::File,
    io::{BufReader, Read, Seek, SeekFrom},
    sync::Arc,
};

use camino::{Utf8Path, Utf8PathBuf};
use log::{debug, warn};

use crate::{
    astrokit_errors::AstroKitError,
    binary_table::{
        record::{decode_value, CatalogRecord},
        schema::{CatalogSchema, ColumnSpec},
    },
    constants::{PackedKey, RowIndex},
};

/// Outcome of a sorted-key lookup once the catalog policy has been applied.
#[derive(Debug, Clone, PartialEq)]
pub enum Located {
    /// Exact key match. `companion` is the row of a possible companion entry.
    Found {
        row: RowIndex,
        record: CatalogRecord,
        companion: Option<RowIndex>,
    },
    /// No exact match; the catalog's reserved null row is returned instead.
    Sentinel { row: RowIndex, record: CatalogRecord },
    NotFound,
}

/// Result of the raw binary search.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeySearch {
    /// Zero-based row of the exact match, if any.
    pub row: Option<RowIndex>,
    /// Number of key fields read during the search.
    pub probes: u32,
}

/// Catalog-specific behaviour wrapped around the generic key search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct KeyPolicy {
    /// Zero-based row returned when the key is absent.
    pub sentinel_row: Option<RowIndex>,
    /// Check whether the row after a match holds `key + 1`.
    pub companion_check: bool,
}

#[derive(Debug, Clone)]
pub struct RecordLocator {
    path: Utf8PathBuf,
    schema: Arc<CatalogSchema>,
}

impl RecordLocator {
    /// Read the schema of `path[extension]` and build a locator over it.
    pub fn open(path: &Utf8Path, extension: usize) -> Result<Self, AstroKitError> {
        let schema = CatalogSchema::read(path, extension)?;
        Ok(RecordLocator::new(path, Arc::new(schema)))
    }

    pub fn new(path: &Utf8Path, schema: Arc<CatalogSchema>) -> Self {
        RecordLocator {
            path: path.to_path_buf(),
            schema,
        }
    }

    pub fn schema(&self) -> &Arc<CatalogSchema> {
        &self.schema
    }

    pub fn path(&self) -> &Utf8Path {
        &self.path
    }

    fn open_table(&self) -> Result<BufReader<File>, AstroKitError> {
        Ok(BufReader::new(File::open(&self.path)?))
    }

    fn read_row_from<R: Read + Seek>(
        &self,
        reader: &mut R,
        row: RowIndex,
    ) -> Result<CatalogRecord, AstroKitError> {
        if row >= self.schema.row_count {
            return Err(AstroKitError::InvalidRequest(format!(
                "row {row} outside table of {} rows",
                self.schema.row_count
            )));
        }
        let mut buffer = vec![0u8; self.schema.row_bytes];
        reader.seek(SeekFrom::Start(self.schema.row_offset(row)))?;
        reader.read_exact(&mut buffer)?;
        self.schema.decode(&buffer)
    }

    /// Decode the zero-based `row`.
    pub fn read_row(&self, row: RowIndex) -> Result<CatalogRecord, AstroKitError> {
        let mut reader = self.open_table()?;
        self.read_row_from(&mut reader, row)
    }

    /// Direct-offset access by dense 1-based identifier.
    ///
    /// Arguments
    /// -----------------
    /// * `id`: the catalog number, equal to the 1-based row number.
    ///
    /// Return
    /// ----------
    /// * `Ok(None)` when `id` is 0 or greater than the row count, the decoded record otherwise.
    pub fn locate_index(&self, id: u64) -> Result<Option<CatalogRecord>, AstroKitError> {
        if id == 0 || id > self.schema.row_count {
            return Ok(None);
        }
        self.read_row(id - 1).map(Some)
    }

    fn key_column(&self, key_column: &str) -> Result<&ColumnSpec, AstroKitError> {
        let column = self
            .schema
            .column(key_column)
            .ok_or_else(|| AstroKitError::UnknownColumn(key_column.to_string()))?;
        if !column.column_type.is_integer() {
            return Err(AstroKitError::InvalidRequest(format!(
                "key column {key_column} has non-integer type {}",
                column.column_type
            )));
        }
        Ok(column)
    }

    /// Read only the key field of `row`.
    fn read_key<R: Read + Seek>(
        &self,
        reader: &mut R,
        column: &ColumnSpec,
        row: RowIndex,
    ) -> Result<PackedKey, AstroKitError> {
        let mut buffer = [0u8; 8];
        let field = &mut buffer[..column.byte_width()];
        reader.seek(SeekFrom::Start(
            self.schema.row_offset(row) + column.offset as u64,
        ))?;
        reader.read_exact(field)?;

        let (_, value) = decode_value(column.column_type, field)
            .map_err(|e| AstroKitError::RowDecodeError(format!("key {}: {e}", column.name)))?;
        value.as_i64().ok_or_else(|| {
            AstroKitError::RowDecodeError(format!("key {} is not an integer", column.name))
        })
    }

    fn binary_search<R: Read + Seek>(
        &self,
        reader: &mut R,
        column: &ColumnSpec,
        key: PackedKey,
    ) -> Result<KeySearch, AstroKitError> {
        let mut low: RowIndex = 0;
        let mut high: RowIndex = self.schema.row_count;
        let mut probes = 0u32;

        while low < high {
            let mid = low + (high - low) / 2;
            let probe = self.read_key(reader, column, mid)?;
            probes += 1;
            match probe.cmp(&key) {
                Ordering::Less => low = mid + 1,
                Ordering::Greater => high = mid,
                Ordering::Equal => {
                    return Ok(KeySearch {
                        row: Some(mid),
                        probes,
                    })
                }
            }
        }

        Ok(KeySearch { row: None, probes })
    }

    /// Binary search of `key` over the ascending integer column `key_column`.
    ///
    /// Arguments
    /// -----------------
    /// * `key_column`: name of an integer column sorted in ascending order.
    /// * `key`: the value to look for.
    ///
    /// Return
    /// ----------
    /// * A [`KeySearch`] with the matching row (or `None`) and the number of key reads,
    ///   at most ⌊log₂ row_count⌋ + 1.
    ///
    /// See also
    /// ------------
    /// * [`RecordLocator::locate_key`] – Applies the catalog policy on top of this search.
    pub fn search_key(&self, key_column: &str, key: PackedKey) -> Result<KeySearch, AstroKitError> {
        let column = self.key_column(key_column)?;
        let mut reader = self.open_table()?;
        let search = self.binary_search(&mut reader, column, key)?;
        debug!(
            "Key {key} in {}: {:?} after {} probes",
            self.path, search.row, search.probes
        );
        Ok(search)
    }

    /// Sorted-key lookup with the catalog's sentinel and companion conventions.
    ///
    /// Arguments
    /// -----------------
    /// * `key_column`: ascending integer key column.
    /// * `key`: the value to look for.
    /// * `policy`: sentinel row and companion check for this catalog.
    ///
    /// Return
    /// ----------
    /// * [`Located::Found`] on an exact match. With `policy.companion_check`, the next row
    ///   is inspected and its index reported as `companion` if it holds `key + 1`.
    /// * [`Located::Sentinel`] on a miss when the policy reserves a null row the table holds.
    /// * [`Located::NotFound`] on a miss otherwise.
    pub fn locate_key(
        &self,
        key_column: &str,
        key: PackedKey,
        policy: &KeyPolicy,
    ) -> Result<Located, AstroKitError> {
        let column = self.key_column(key_column)?;
        let mut reader = self.open_table()?;
        let search = self.binary_search(&mut reader, column, key)?;

        match search.row {
            Some(row) => {
                let record = self.read_row_from(&mut reader, row)?;
                let companion = match key.checked_add(1) {
                    Some(successor)
                        if policy.companion_check && row + 1 < self.schema.row_count =>
                    {
                        let next = self.read_key(&mut reader, column, row + 1)?;
                        (next == successor).then_some(row + 1)
                    }
                    _ => None,
                };
                if let Some(companion_row) = companion {
                    warn!(
                        "Key {key} in {} has a possible companion at row {companion_row}",
                        self.path
                    );
                }
                Ok(Located::Found {
                    row,
                    record,
                    companion,
                })
            }
            None => match policy.sentinel_row {
                Some(row) if row < self.schema.row_count => {
                    warn!(
                        "Key {key} absent from {}, returning reserved row {row}",
                        self.path
                    );
                    let record = self.read_row_from(&mut reader, row)?;
                    Ok(Located::Sentinel { row, record })
                }
                _ => Ok(Located::NotFound),
            },
        }
    }
}

#[cfg(test)]
mod test_locator {
    use std::io::Write;

    use super::*;
    use crate::unit_test_global::bintable_bytes;

    fn write_table(dir: &tempfile::TempDir, keys: &[i64]) -> Utf8PathBuf {
        let rows: Vec<Vec<u8>> = keys
            .iter()
            .map(|k| {
                let mut row = k.to_be_bytes().to_vec();
                row.extend_from_slice(&((*k as f64) * 0.5).to_be_bytes());
                row
            })
            .collect();
        let bytes = bintable_bytes(&[("KEY", "1K"), ("MAG", "1D")], &rows);
        let path = Utf8PathBuf::from_path_buf(dir.path().join("keyed.fits")).unwrap();
        File::create(&path).unwrap().write_all(&bytes).unwrap();
        path
    }

    #[test]
    fn test_direct_offset_bounds() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_table(&dir, &[10, 20, 30]);
        let locator = RecordLocator::open(&path, 1).unwrap();

        assert_eq!(locator.locate_index(0).unwrap(), None);
        assert_eq!(locator.locate_index(4).unwrap(), None);
        let second = locator.locate_index(2).unwrap().unwrap();
        assert_eq!(second.get("KEY").and_then(|v| v.as_i64()), Some(20));
    }

    #[test]
    fn test_companion_signal() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_table(&dir, &[0, 4, 8, 9, 12]);
        let locator = RecordLocator::open(&path, 1).unwrap();
        let policy = KeyPolicy {
            sentinel_row: Some(0),
            companion_check: true,
        };

        match locator.locate_key("KEY", 8, &policy).unwrap() {
            Located::Found { row, companion, .. } => {
                assert_eq!(row, 2);
                assert_eq!(companion, Some(3));
            }
            other => panic!("expected a match, got {other:?}"),
        }

        match locator.locate_key("KEY", 4, &policy).unwrap() {
            Located::Found { companion, .. } => assert_eq!(companion, None),
            other => panic!("expected a match, got {other:?}"),
        }
    }

    #[test]
    fn test_sentinel_and_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_table(&dir, &[0, 4, 8, 12]);
        let locator = RecordLocator::open(&path, 1).unwrap();

        let with_sentinel = KeyPolicy {
            sentinel_row: Some(0),
            companion_check: false,
        };
        match locator.locate_key("KEY", 6, &with_sentinel).unwrap() {
            Located::Sentinel { row, record } => {
                assert_eq!(row, 0);
                assert_eq!(record.get("KEY").and_then(|v| v.as_i64()), Some(0));
            }
            other => panic!("expected the sentinel row, got {other:?}"),
        }

        assert_eq!(
            locator.locate_key("KEY", 6, &KeyPolicy::default()).unwrap(),
            Located::NotFound
        );
        assert_eq!(locator.search_key("KEY", 100).unwrap().row, None);
    }

    #[test]
    fn test_miss_on_empty_table() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_table(&dir, &[]);
        let locator = RecordLocator::open(&path, 1).unwrap();
        let policy = KeyPolicy {
            sentinel_row: Some(0),
            companion_check: true,
        };

        assert_eq!(locator.locate_key("KEY", 5, &policy).unwrap(), Located::NotFound);
    }

    #[test]
    fn test_largest_key_has_no_companion() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_table(&dir, &[0, 7, i64::MAX]);
        let locator = RecordLocator::open(&path, 1).unwrap();
        let policy = KeyPolicy {
            sentinel_row: Some(0),
            companion_check: true,
        };

        match locator.locate_key("KEY", i64::MAX, &policy).unwrap() {
            Located::Found { row, companion, .. } => {
                assert_eq!(row, 2);
                assert_eq!(companion, None);
            }
            other => panic!("expected a match, got {other:?}"),
        }
    }

    #[test]
    fn test_key_column_checks() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_table(&dir, &[1, 2]);
        let locator = RecordLocator::open(&path, 1).unwrap();

        assert_eq!(
            locator.search_key("NOPE", 1),
            Err(AstroKitError::UnknownColumn("NOPE".to_string()))
        );
        assert!(matches!(
            locator.search_key("MAG", 1),
            Err(AstroKitError::InvalidRequest(_))
        ));
    }
}
