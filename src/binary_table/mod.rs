//! Read-only access to fixed-row binary tables.
//!
//! - [`schema`] — walks the 2880-byte header blocks of a table file and builds a
//!   [`CatalogSchema`](schema::CatalogSchema) (row length, row count, data offset, columns).
//! - [`header_card`] — decodes a single 80-byte header card.
//! - [`column_type`] — the enumeration of supported column formats and their widths.
//! - [`record`] — decodes a raw row into a [`CatalogRecord`](record::CatalogRecord).
//!
//! There is deliberately no writer: tables are immutable reference data.
pub mod column_type;
pub mod header_card;
pub mod record;
pub mod schema;
