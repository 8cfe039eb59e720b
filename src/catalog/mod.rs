//! # Star catalog lookups
//!
//! Single-star access into large, immutable binary catalog tables.
//!
//! ## Modules
//!
//! - [`catalog_id`] — the supported catalogs and their on-disk layout ([`CatalogSpec`](catalog_id::CatalogSpec)).
//! - [`star_key`] — native keys: dense row numbers or sorted integer keys (packed Tycho ids).
//! - [`locator`] — direct-offset and sorted-key binary search over a table file.
//! - [`name_resolver`] — designation parsing (`HIP 91262`, `TYC 4684-2191-1`, …).
//! - [`propagation`] — proper-motion propagation of catalog positions to another epoch.
//! - [`output`] — the shape of a lookup result.
//! - [`accessor`] — [`CatalogAccessor`](accessor::CatalogAccessor), tying everything together.
//!
//! ## Absent stars
//!
//! Not finding a star is never an error. Direct-index catalogs return `None`; keyed
//! catalogs (EPIC, TYC, TYC2) reserve row 0 as a null row and return it flagged as
//! [`MatchKind::NullRow`](output::MatchKind::NullRow).
pub mod accessor;
pub mod catalog_id;
pub mod locator;
pub mod name_resolver;
pub mod output;
pub mod propagation;
pub mod star_key;
