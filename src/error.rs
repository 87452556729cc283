use thiserror::Error;

/// Errors produced by the pixel pipeline, template store, and file I/O.
///
/// Per-frame failures in the benchmark driver are caught and classified
/// (see [`crate::driver`]) rather than propagated; this enum exists for the
/// cases where classification is the caller's job, and for the small set of
/// setup errors (bad dimensions, empty enrollment set) that do abort a run.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FpError {
    #[error("I/O error reading {path}: {reason}")]
    Io { path: String, reason: String },

    #[error("raw frame {path} has {got} bytes, expected {expected}")]
    RawSizeMismatch {
        path: String,
        got: usize,
        expected: usize,
    },

    #[error("frame buffer has {actual} samples, expected {expected}")]
    FrameShapeMismatch { expected: usize, actual: usize },

    #[error("not a binary PGM (P5): {path}")]
    NotBinaryPgm { path: String },

    #[error("malformed PGM header in {path}")]
    MalformedPgmHeader { path: String },

    #[error("unsupported PGM maxval {maxval} in {path} (only 255 is supported)")]
    UnsupportedPgmMaxval { path: String, maxval: u32 },

    #[error("short read in {path}: expected {expected} pixel bytes, got {got}")]
    PgmShortRead {
        path: String,
        expected: usize,
        got: usize,
    },

    #[error("feature extraction failed")]
    ExtractionFailed,

    #[error("match score computation failed")]
    MatchFailed,

    #[error("template is at capacity ({capacity} slots)")]
    TemplateFull { capacity: usize },

    #[error("slot index {index} out of range (template has {count} entries)")]
    SlotOutOfRange { index: usize, count: usize },
}
