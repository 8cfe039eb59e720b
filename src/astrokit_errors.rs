use thiserror::Error;

/// Coarse classification of an [`AstroKitError`].
///
/// Lookups that simply find nothing are never errors: they come back as `None`
/// or [`Located::NotFound`](crate::catalog::locator::Located::NotFound).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Malformed reference data (table header, column format, track file).
    Parse,
    /// A grid request that cannot be served by any valid node window.
    Range,
    /// Contradictory or invalid caller input.
    Request,
    /// Filesystem or environment failure.
    Io,
}

#[derive(Error, Debug)]
pub enum AstroKitError {
    #[error("Unable to parse binary table header: {0}")]
    HeaderParseError(String),

    #[error("Missing END card in binary table header")]
    MissingEndCard,

    #[error("Unknown binary table column format: {0}")]
    UnknownColumnFormat(String),

    #[error("Extension {0} not found in binary table file")]
    ExtensionNotFound(usize),

    #[error("Unable to decode table row: {0}")]
    RowDecodeError(String),

    #[error("Unable to parse track file {path}: {reason}")]
    TrackFileParseError { path: String, reason: String },

    #[error("No valid 4-node window on axis {axis} for target {target} (companion {companion:?})")]
    NoValidWindow {
        axis: String,
        target: f64,
        companion: Option<f64>,
    },

    #[error("Excluded node {node} selected on axis {axis}")]
    ExcludedNodeInWindow { axis: String, node: f64 },

    #[error("Track for node {node} missing from bucket {bucket}")]
    MissingGridTrack { node: f64, bucket: String },

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Unknown column: {0}")]
    UnknownColumn(String),

    #[error("Unable to perform file operation: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Cross-reference file error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("UTF-8 Path error: {0}")]
    Utf8PathError(String),

    #[error("Data directory not found at: {0}")]
    DataDirNotFound(String),
}

impl AstroKitError {
    pub fn category(&self) -> ErrorCategory {
        use AstroKitError::*;
        match self {
            HeaderParseError(_)
            | MissingEndCard
            | UnknownColumnFormat(_)
            | ExtensionNotFound(_)
            | RowDecodeError(_)
            | TrackFileParseError { .. } => ErrorCategory::Parse,
            NoValidWindow { .. } | ExcludedNodeInWindow { .. } | MissingGridTrack { .. } => {
                ErrorCategory::Range
            }
            InvalidRequest(_) | UnknownColumn(_) => ErrorCategory::Request,
            IoError(_) | CsvError(_) | Utf8PathError(_) | DataDirNotFound(_) => ErrorCategory::Io,
        }
    }
}

impl PartialEq for AstroKitError {
    fn eq(&self, other: &Self) -> bool {
        use AstroKitError::*;
        match (self, other) {
            (HeaderParseError(a), HeaderParseError(b)) => a == b,
            (UnknownColumnFormat(a), UnknownColumnFormat(b)) => a == b,
            (ExtensionNotFound(a), ExtensionNotFound(b)) => a == b,
            (RowDecodeError(a), RowDecodeError(b)) => a == b,
            (
                TrackFileParseError {
                    path: pa,
                    reason: ra,
                },
                TrackFileParseError {
                    path: pb,
                    reason: rb,
                },
            ) => pa == pb && ra == rb,
            (
                NoValidWindow {
                    axis: aa,
                    target: ta,
                    companion: ca,
                },
                NoValidWindow {
                    axis: ab,
                    target: tb,
                    companion: cb,
                },
            ) => aa == ab && ta == tb && ca == cb,
            (
                ExcludedNodeInWindow { axis: aa, node: na },
                ExcludedNodeInWindow { axis: ab, node: nb },
            ) => aa == ab && na == nb,
            (
                MissingGridTrack {
                    node: na,
                    bucket: ba,
                },
                MissingGridTrack {
                    node: nb,
                    bucket: bb,
                },
            ) => na == nb && ba == bb,
            (InvalidRequest(a), InvalidRequest(b)) => a == b,
            (UnknownColumn(a), UnknownColumn(b)) => a == b,
            (Utf8PathError(a), Utf8PathError(b)) => a == b,
            (DataDirNotFound(a), DataDirNotFound(b)) => a == b,

            // wrapped foreign errors compare by variant only
            (IoError(_), IoError(_)) => true,
            (CsvError(_), CsvError(_)) => true,

            (MissingEndCard, MissingEndCard) => true,

            _ => false,
        }
    }
}
