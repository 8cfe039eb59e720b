//! # Stellar evolution track grids
//!
//! Interpolation of precomputed evolutionary tracks over sparse, irregular and partially
//! incomplete model grids.
//!
//! - [`track`] — the [`Track`](track::Track) matrix type.
//! - [`axis`] — grid axes, exclusions, exactness rule and 4-node window selection.
//! - [`resample`] — linear / natural cubic parametric resampling.
//! - [`newton`] — cubic Newton interpolation between four tracks.
//! - [`family`] — per-family parameters, axes and bucket naming.
//! - [`track_source`] — bucket storage and the text bucket file parser.
//! - [`provider`] — [`EvolutionTrackProvider`](provider::EvolutionTrackProvider), the entry point.
pub mod axis;
pub mod family;
pub mod newton;
pub mod provider;
pub mod resample;
pub mod track;
pub mod track_source;
