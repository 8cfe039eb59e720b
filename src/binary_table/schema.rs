//! Binary table schema reader.
//!
//! A table file is a sequence of header-data units (HDUs). Each header is a run of
//! 2880-byte blocks holding 36 cards of 80 bytes, terminated by an `END` card; the data
//! unit follows immediately and is itself padded to a whole number of blocks.
//!
//! ```text
//! +-------------------------------+  offset 0
//! | primary header (HDU 0)        |
//! +-------------------------------+
//! | primary data (usually empty)  |
//! +-------------------------------+
//! | extension 1 header            |  XTENSION = 'BINTABLE', NAXIS1, NAXIS2, TFIELDS,
//! |                               |  TTYPEn / TFORMn
//! +-------------------------------+  <- data_offset
//! | row 0 | row 1 | ... | row N-1 |  row_bytes each, big-endian numerics
//! +-------------------------------+
//! | extension 2 ...               |
//! ```
//!
//! [`CatalogSchema::read`] walks the HDUs until the requested 1-based extension and turns
//! its header into a [`CatalogSchema`]: the row layout plus the column list that drives
//! [`CatalogRecord`] decoding. The schema is built once per file and shared behind an
//! [`Arc`] by every record decoded from it.
use std::{
    collections::HashMap,
    fs::File,
    io::{BufReader, ErrorKind, Read, Seek, SeekFrom},
    sync::Arc,
};

use ahash::RandomState;
use camino::Utf8Path;
use log::debug;
use serde::Serialize;

use crate::{
    astrokit_errors::AstroKitError,
    constants::{BLOCK_SIZE, CARD_SIZE, MAX_TABLE_FIELDS},
};

use super::{column_type::ColumnType, header_card::HeaderCard, record::CatalogRecord};

/// One column of a binary table row.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnSpec {
    pub name: String,
    pub column_type: ColumnType,
    /// Byte offset of the column inside a row.
    pub offset: usize,
}

impl ColumnSpec {
    pub fn byte_width(&self) -> usize {
        self.column_type.byte_width()
    }

    pub fn byte_range(&self) -> std::ops::Range<usize> {
        self.offset..self.offset + self.byte_width()
    }
}

/// Row layout of one binary table extension.
#[derive(Debug, Clone, PartialEq)]
pub struct CatalogSchema {
    pub row_bytes: usize,
    pub row_count: u64,
    pub column_count: usize,
    /// Absolute file offset of the first row.
    pub data_offset: u64,
    pub columns: Vec<ColumnSpec>,
    index: HashMap<String, usize, RandomState>,
}

/// Keyword → card lookup over one header unit, first occurrence wins.
struct HeaderUnit {
    cards: HashMap<String, HeaderCard, RandomState>,
}

impl HeaderUnit {
    fn new(cards: Vec<HeaderCard>) -> Self {
        let mut map = HashMap::with_hasher(RandomState::new());
        for card in cards {
            map.entry(card.keyword.clone()).or_insert(card);
        }
        HeaderUnit { cards: map }
    }

    fn integer(&self, keyword: &str) -> Option<i64> {
        self.cards.get(keyword).and_then(HeaderCard::as_integer)
    }

    fn required_integer(&self, keyword: &str) -> Result<i64, AstroKitError> {
        self.integer(keyword).ok_or_else(|| {
            AstroKitError::HeaderParseError(format!("missing or non-integer {keyword} card"))
        })
    }

    fn text(&self, keyword: &str) -> Option<&str> {
        self.cards.get(keyword).and_then(HeaderCard::as_text)
    }

    /// Size in bytes of the data unit, before block padding.
    fn data_size(&self) -> Result<u64, AstroKitError> {
        let naxis = self.integer("NAXIS").unwrap_or(0);
        if naxis <= 0 {
            return Ok(0);
        }
        let bitpix = self.required_integer("BITPIX")?;
        let mut elements: u64 = 1;
        for axis in 1..=naxis {
            let length = self.required_integer(&format!("NAXIS{axis}"))?;
            elements = elements
                .checked_mul(length.max(0) as u64)
                .ok_or_else(|| oversized("NAXISn product"))?;
        }
        let pcount = self.integer("PCOUNT").unwrap_or(0).max(0) as u64;
        let gcount = self.integer("GCOUNT").unwrap_or(1).max(0) as u64;
        (bitpix.unsigned_abs() / 8)
            .checked_mul(gcount)
            .and_then(|size| size.checked_mul(pcount.checked_add(elements)?))
            .ok_or_else(|| oversized("data unit"))
    }
}

fn oversized(what: &str) -> AstroKitError {
    AstroKitError::HeaderParseError(format!("{what} does not fit in a 64-bit byte count"))
}

/// Read until `buffer` is full or the reader is exhausted, returning the byte count.
fn read_block<R: Read>(reader: &mut R, buffer: &mut [u8]) -> Result<usize, AstroKitError> {
    let mut filled = 0;
    while filled < buffer.len() {
        match reader.read(&mut buffer[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(e.into()),
        }
    }
    Ok(filled)
}

/// Read the cards of one header unit, up to and excluding `END`.
///
/// Returns `Ok(None)` when the reader is already at end of file.
fn read_header_unit<R: Read>(reader: &mut R) -> Result<Option<Vec<HeaderCard>>, AstroKitError> {
    let mut cards = Vec::new();
    let mut block = [0u8; BLOCK_SIZE];
    let mut first_block = true;

    loop {
        let n = read_block(reader, &mut block)?;
        if n == 0 && first_block {
            return Ok(None);
        }
        if n < BLOCK_SIZE {
            return Err(AstroKitError::MissingEndCard);
        }
        first_block = false;

        for raw in block.chunks_exact(CARD_SIZE) {
            let card = HeaderCard::parse(raw)?;
            if card.is_end() {
                return Ok(Some(cards));
            }
            cards.push(card);
        }
    }
}

fn padded_to_block(size: u64) -> Result<u64, AstroKitError> {
    size.div_ceil(BLOCK_SIZE as u64)
        .checked_mul(BLOCK_SIZE as u64)
        .ok_or_else(|| oversized("padded data unit"))
}

impl CatalogSchema {
    /// Open `path` and read the schema of its `extension`-th extension (1-based).
    ///
    /// The file is closed before returning, whatever the outcome.
    ///
    /// See also
    /// ------------
    /// * [`CatalogSchema::from_reader`] – Same parser over any seekable reader.
    pub fn read(path: &Utf8Path, extension: usize) -> Result<Self, AstroKitError> {
        let mut reader = BufReader::new(File::open(path)?);
        let schema = CatalogSchema::from_reader(&mut reader, extension)?;
        debug!(
            "Schema of {path}[{extension}]: {} rows x {} bytes, {} columns, data at {}",
            schema.row_count, schema.row_bytes, schema.column_count, schema.data_offset
        );
        Ok(schema)
    }

    /// Walk the header-data units of `reader` and decode the requested extension header.
    ///
    /// Arguments
    /// -----------------
    /// * `reader`: positioned at the start of the file.
    /// * `extension`: 1-based extension index (the primary HDU is index 0 and never a table).
    ///
    /// Return
    /// ----------
    /// * The decoded schema with `data_offset` set to the absolute start of the rows.
    ///
    /// Errors
    /// ----------
    /// * [`AstroKitError::MissingEndCard`] if a header runs to end of file without `END`.
    /// * [`AstroKitError::ExtensionNotFound`] if the file has fewer extensions.
    /// * [`AstroKitError::UnknownColumnFormat`] for a `TFORMn` outside the enumeration.
    /// * [`AstroKitError::HeaderParseError`] for a missing required card, a non-table
    ///   extension, or column widths that do not add up to the row length.
    pub fn from_reader<R: Read + Seek>(
        reader: &mut R,
        extension: usize,
    ) -> Result<Self, AstroKitError> {
        if extension == 0 {
            return Err(AstroKitError::InvalidRequest(
                "extension index is 1-based, HDU 0 is the primary header".to_string(),
            ));
        }

        let mut hdu = 0usize;
        loop {
            let Some(cards) = read_header_unit(reader)? else {
                return Err(AstroKitError::ExtensionNotFound(extension));
            };
            let unit = HeaderUnit::new(cards);
            let data_start = reader.stream_position()?;

            if hdu == extension {
                return CatalogSchema::from_header(&unit, data_start);
            }

            let next = data_start
                .checked_add(padded_to_block(unit.data_size()?)?)
                .ok_or_else(|| oversized("next header offset"))?;
            reader.seek(SeekFrom::Start(next))?;
            hdu += 1;
        }
    }

    fn from_header(unit: &HeaderUnit, data_offset: u64) -> Result<Self, AstroKitError> {
        match unit.text("XTENSION") {
            Some("BINTABLE") => {}
            Some(other) => {
                return Err(AstroKitError::HeaderParseError(format!(
                    "extension type {other} is not a binary table"
                )))
            }
            None => {
                return Err(AstroKitError::HeaderParseError(
                    "missing XTENSION card".to_string(),
                ))
            }
        }

        let row_bytes = unit.required_integer("NAXIS1")?;
        let row_count = unit.required_integer("NAXIS2")?;
        let column_count = unit.required_integer("TFIELDS")?;
        if row_bytes <= 0 || row_count < 0 || !(1..=MAX_TABLE_FIELDS).contains(&column_count) {
            return Err(AstroKitError::HeaderParseError(format!(
                "invalid table geometry NAXIS1={row_bytes} NAXIS2={row_count} TFIELDS={column_count}"
            )));
        }

        (row_bytes as u64)
            .checked_mul(row_count as u64)
            .and_then(|size| size.checked_add(data_offset))
            .ok_or_else(|| oversized("table data"))?;

        let mut columns = Vec::with_capacity(column_count as usize);
        let mut index = HashMap::with_hasher(RandomState::new());
        let mut offset = 0usize;
        for i in 1..=column_count {
            let name = unit.text(&format!("TTYPE{i}")).ok_or_else(|| {
                AstroKitError::HeaderParseError(format!("missing TTYPE{i} card"))
            })?;
            let tform = unit.text(&format!("TFORM{i}")).ok_or_else(|| {
                AstroKitError::HeaderParseError(format!("missing TFORM{i} card"))
            })?;
            let column_type = ColumnType::from_tform(tform)?;

            index.entry(name.to_string()).or_insert(columns.len());
            columns.push(ColumnSpec {
                name: name.to_string(),
                column_type,
                offset,
            });
            offset = offset
                .checked_add(column_type.byte_width())
                .ok_or_else(|| oversized("row width"))?;
        }

        if offset != row_bytes as usize {
            return Err(AstroKitError::HeaderParseError(format!(
                "column widths sum to {offset} bytes but NAXIS1 = {row_bytes}"
            )));
        }

        Ok(CatalogSchema {
            row_bytes: row_bytes as usize,
            row_count: row_count as u64,
            column_count: column_count as usize,
            data_offset,
            columns,
            index,
        })
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }

    pub fn column(&self, name: &str) -> Option<&ColumnSpec> {
        self.column_index(name).map(|i| &self.columns[i])
    }

    /// Absolute file offset of the zero-based `row`.
    pub fn row_offset(&self, row: u64) -> u64 {
        self.data_offset + row * self.row_bytes as u64
    }

    /// Decode one raw row into a [`CatalogRecord`] sharing this schema.
    pub fn decode(self: &Arc<Self>, row: &[u8]) -> Result<CatalogRecord, AstroKitError> {
        CatalogRecord::decode(self, row)
    }
}
