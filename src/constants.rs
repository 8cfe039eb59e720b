//! # Constants and type definitions for astrokit
//!
//! This module centralizes the **binary table layout constants**, the **time and angle
//! conversion factors** used by epoch propagation, and the **type aliases** shared by the
//! catalog and grid engines.
//!
//! ## Overview
//!
//! - Header block geometry of the binary table format (2880-byte blocks of 80-byte cards)
//! - Interpolation window size used by the grid node selector
//! - Epoch and angle conversions (MJD ↔ Julian year, mas ↔ degrees)
//! - Unit-carrying type aliases

// -------------------------------------------------------------------------------------------------
// Binary table layout
// -------------------------------------------------------------------------------------------------

/// Size in bytes of one header or data block
pub const BLOCK_SIZE: usize = 2880;

/// Size in bytes of one header card
pub const CARD_SIZE: usize = 80;

/// Number of header cards in a block
pub const CARDS_PER_BLOCK: usize = BLOCK_SIZE / CARD_SIZE;

/// Largest `TFIELDS` value a binary table header may declare
pub const MAX_TABLE_FIELDS: i64 = 999;

// -------------------------------------------------------------------------------------------------
// Grid interpolation
// -------------------------------------------------------------------------------------------------

/// Number of nodes used by one Newton interpolation on a single axis (cubic)
pub const WINDOW_SIZE: usize = 4;

// -------------------------------------------------------------------------------------------------
// Time and angle conversions
// -------------------------------------------------------------------------------------------------

/// MJD epoch of J2000.0 (2000-01-01 12:00:00 TT)
pub const T2000: f64 = 51544.5;

/// Julian year expressed as J2000.0
pub const J2000_YEAR: f64 = 2000.0;

/// Number of days in a Julian year
pub const DAYS_PER_JULIAN_YEAR: f64 = 365.25;

/// Milliarcseconds in one degree
pub const MAS_PER_DEGREE: f64 = 3_600_000.0;

/// Degrees → radians
pub const RADEG: f64 = std::f64::consts::PI / 180.0;

// -------------------------------------------------------------------------------------------------
// Type aliases
// -------------------------------------------------------------------------------------------------

/// Angle in degrees
pub type Degree = f64;
/// Proper motion in milliarcseconds per year
pub type MasPerYear = f64;
/// Epoch expressed in Julian years (e.g. 1991.25)
pub type JulianYear = f64;
/// Zero-based row position inside a binary table
pub type RowIndex = u64;
/// Sorted integer key stored in a keyed catalog
pub type PackedKey = i64;
