//! # Sorted cross-reference files
//!
//! Cross-identification tables (e.g. `HD → HIP`, `TYC → HIP`) ship as delimited text files
//! sorted ascending by the key in column 0, one row per line, with rows of nearly constant
//! length:
//!
//! ```text
//! # HD|HIP
//! 1|422
//! 2|...
//! 10|...
//! ```
//!
//! [`SortedIndex`] searches such a file without loading it. The key and value are
//! extracted from each parsed row by caller-supplied closures, so the same search serves
//! every cross-reference layout.
//!
//! ## Search variants
//!
//! * **Linear** ([`SortedIndex::linear_search`]) – scan from the top, stop as soon as the
//!   keys pass the target. Cheap for keys near the start of the file.
//! * **Binary** ([`SortedIndex::binary_search`]) – infer the row length from the first data
//!   row, bisect over byte offsets `data_start + i · row_len`, resynchronise each probe on the
//!   next line start, and finish with a short forward scan. Rows shorter or longer than the
//!   first one shift the probes but never hide a match.
//!
//! [`SortedIndex::lookup`] picks linear search for keys at or below the configured
//! threshold and binary search otherwise.
//!
//! Lines starting with the comment byte, blank lines, and lines for which the key closure
//! returns `None` are treated as header lines and skipped.
use std::{
    fs::File,
    io::{BufRead, BufReader, Seek, SeekFrom},
};

use camino::{Utf8Path, Utf8PathBuf};
use csv::{ReaderBuilder, StringRecord, Trim};
use log::debug;

use crate::astrokit_errors::AstroKitError;

pub struct SortedIndex<K, V, KF, VF>
where
    KF: Fn(&StringRecord) -> Option<K>,
    VF: Fn(&StringRecord) -> V,
{
    path: Utf8PathBuf,
    key_fn: KF,
    value_fn: VF,
    delimiter: u8,
    comment: Option<u8>,
    linear_threshold: Option<K>,
}

/// A parsed data line and its starting offset.
struct Line<K> {
    key: K,
    record: StringRecord,
    start: u64,
}

impl<K, V, KF, VF> SortedIndex<K, V, KF, VF>
where
    K: Ord,
    KF: Fn(&StringRecord) -> Option<K>,
    VF: Fn(&StringRecord) -> V,
{
    /// Index over `path` with `|` as delimiter and `#` as comment byte.
    pub fn new(path: &Utf8Path, key_fn: KF, value_fn: VF) -> Self {
        SortedIndex {
            path: path.to_path_buf(),
            key_fn,
            value_fn,
            delimiter: b'|',
            comment: Some(b'#'),
            linear_threshold: None,
        }
    }

    pub fn delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    pub fn comment(mut self, comment: Option<u8>) -> Self {
        self.comment = comment;
        self
    }

    /// Keys `<= threshold` are searched linearly by [`SortedIndex::lookup`].
    pub fn linear_threshold(mut self, threshold: K) -> Self {
        self.linear_threshold = Some(threshold);
        self
    }

    pub fn path(&self) -> &Utf8Path {
        &self.path
    }

    fn open(&self) -> Result<BufReader<File>, AstroKitError> {
        Ok(BufReader::new(File::open(&self.path)?))
    }

    /// Parse one raw line; `None` for blank and comment lines.
    fn parse_line(&self, raw: &[u8]) -> Result<Option<StringRecord>, AstroKitError> {
        let line = raw.strip_suffix(b"\n").unwrap_or(raw);
        let line = line.strip_suffix(b"\r").unwrap_or(line);
        if line.iter().all(u8::is_ascii_whitespace) {
            return Ok(None);
        }
        if self.comment.is_some_and(|c| line.first() == Some(&c)) {
            return Ok(None);
        }

        let mut reader = ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .trim(Trim::All)
            .delimiter(self.delimiter)
            .from_reader(line);
        let mut record = StringRecord::new();
        if reader.read_record(&mut record)? {
            Ok(Some(record))
        } else {
            Ok(None)
        }
    }

    /// Next data line starting at the current reader position, skipping header lines.
    fn next_line<R: BufRead + Seek>(
        &self,
        reader: &mut R,
    ) -> Result<Option<Line<K>>, AstroKitError> {
        let mut raw = Vec::new();
        loop {
            raw.clear();
            let start = reader.stream_position()?;
            if reader.read_until(b'\n', &mut raw)? == 0 {
                return Ok(None);
            }
            if let Some(record) = self.parse_line(&raw)? {
                if let Some(key) = (self.key_fn)(&record) {
                    return Ok(Some(Line { key, record, start }));
                }
            }
        }
    }

    /// First data line whose start is at or after `offset`.
    fn line_at_or_after<R: BufRead + Seek>(
        &self,
        reader: &mut R,
        offset: u64,
    ) -> Result<Option<Line<K>>, AstroKitError> {
        if offset == 0 {
            reader.seek(SeekFrom::Start(0))?;
        } else {
            // the byte before `offset` tells whether `offset` already starts a line
            reader.seek(SeekFrom::Start(offset - 1))?;
            let mut partial = Vec::new();
            reader.read_until(b'\n', &mut partial)?;
        }
        self.next_line(reader)
    }

    /// Scan forward from `offset` until the keys pass `key`.
    fn scan_from<R: BufRead + Seek>(
        &self,
        reader: &mut R,
        offset: u64,
        key: &K,
    ) -> Result<Option<V>, AstroKitError> {
        let mut current = self.line_at_or_after(reader, offset)?;
        while let Some(line) = current {
            match line.key.cmp(key) {
                std::cmp::Ordering::Less => current = self.next_line(reader)?,
                std::cmp::Ordering::Equal => return Ok(Some((self.value_fn)(&line.record))),
                std::cmp::Ordering::Greater => return Ok(None),
            }
        }
        Ok(None)
    }

    /// Scan the file from the top.
    ///
    /// Return
    /// ----------
    /// * `value_fn` of the first row whose key equals `key`, or `None` once a larger key
    ///   (or the end of file) is reached.
    pub fn linear_search(&self, key: &K) -> Result<Option<V>, AstroKitError> {
        let mut reader = self.open()?;
        self.scan_from(&mut reader, 0, key)
    }

    /// Byte-offset bisection over the file.
    ///
    /// Return
    /// ----------
    /// * `value_fn` of the row whose key equals `key`, or `None`.
    ///
    /// See also
    /// ------------
    /// * [`SortedIndex::linear_search`] – Same result, O(n) reads.
    pub fn binary_search(&self, key: &K) -> Result<Option<V>, AstroKitError> {
        let mut reader = self.open()?;
        let file_len = reader.get_ref().metadata()?.len();

        let Some(first) = self.line_at_or_after(&mut reader, 0)? else {
            return Ok(None);
        };

        let data_start = first.start;
        let mut first_row = Vec::new();
        reader.seek(SeekFrom::Start(data_start))?;
        let row_len = (reader.read_until(b'\n', &mut first_row)? as u64).max(1);
        let row_count = ((file_len - data_start) / row_len).max(1);

        let mut low = 0u64;
        let mut high = row_count;
        let mut probes = 0u32;
        while low < high {
            let mid = low + (high - low) / 2;
            probes += 1;
            match self.line_at_or_after(&mut reader, data_start + mid * row_len)? {
                Some(line) if line.key < *key => low = mid + 1,
                _ => high = mid,
            }
        }
        debug!(
            "Cross-reference {}: {row_count} rows of ~{row_len} bytes, {probes} probes",
            self.path
        );

        let restart = data_start + low.saturating_sub(1) * row_len;
        self.scan_from(&mut reader, restart, key)
    }

    /// Linear search for keys at or below the threshold, binary search otherwise.
    pub fn lookup(&self, key: &K) -> Result<Option<V>, AstroKitError> {
        match &self.linear_threshold {
            Some(threshold) if key <= threshold => self.linear_search(key),
            _ => self.binary_search(key),
        }
    }
}

#[cfg(test)]
mod test_xref {
    use std::io::Write;

    use super::*;

    fn write_file(dir: &tempfile::TempDir, content: &str) -> Utf8PathBuf {
        let path = Utf8PathBuf::from_path_buf(dir.path().join("xref.dat")).unwrap();
        File::create(&path)
            .unwrap()
            .write_all(content.as_bytes())
            .unwrap();
        path
    }

    fn key(record: &StringRecord) -> Option<u64> {
        record.get(0)?.parse().ok()
    }

    fn value(record: &StringRecord) -> String {
        record.get(1).unwrap_or_default().to_string()
    }

    #[test]
    fn test_both_variants_agree() {
        let dir = tempfile::tempdir().unwrap();
        let mut content = String::from("# HD|HIP\nHD|HIP\n");
        for hd in (1..400u64).step_by(3) {
            content.push_str(&format!("{hd}|{}\n", hd * 7));
        }
        let path = write_file(&dir, &content);
        let index = SortedIndex::new(&path, key, value);

        for hd in 0..402u64 {
            let expected = (hd % 3 == 1 && hd < 400).then(|| (hd * 7).to_string());
            assert_eq!(index.linear_search(&hd).unwrap(), expected, "linear {hd}");
            assert_eq!(index.binary_search(&hd).unwrap(), expected, "binary {hd}");
        }
    }

    #[test]
    fn test_uneven_rows() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(
            &dir,
            "1|a\n2|bbbbbbbbbbbbbbbbbbbbbbbb\n3|c\n40|d\n500|eeeeeeeeeeeee\n6000|f\n70000|g\n",
        );
        let index = SortedIndex::new(&path, key, value).linear_threshold(2);

        assert_eq!(index.lookup(&2).unwrap(), Some("bbbbbbbbbbbbbbbbbbbbbbbb".to_string()));
        assert_eq!(index.lookup(&500).unwrap(), Some("eeeeeeeeeeeee".to_string()));
        assert_eq!(index.lookup(&70000).unwrap(), Some("g".to_string()));
        assert_eq!(index.lookup(&41).unwrap(), None);
        assert_eq!(index.lookup(&80000).unwrap(), None);
    }

    #[test]
    fn test_other_delimiter_and_empty_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(&dir, "10, x\n20, y\n");
        let index = SortedIndex::new(&path, key, value).delimiter(b',');
        assert_eq!(index.binary_search(&20).unwrap(), Some("y".to_string()));

        let empty = write_file(&dir, "# nothing\n");
        let index = SortedIndex::new(&empty, key, value);
        assert_eq!(index.binary_search(&1).unwrap(), None);
        assert_eq!(index.linear_search(&1).unwrap(), None);
    }
}
