//! Raw 16-bit little-endian sensor frame files.

use std::path::Path;

use crate::error::FpError;

/// Reads a raw frame (or calibration frame, same format) as little-endian
/// `u16` samples. `expected_len` is the sample count the caller expects
/// (`scan_width * height`); a mismatch is reported with the file path
/// attached so the caller doesn't need to re-derive it for the error.
pub fn read_raw_frame(path: &Path, expected_len: usize) -> Result<Vec<u16>, FpError> {
    let bytes = std::fs::read(path).map_err(|e| FpError::Io {
        path: path.display().to_string(),
        reason: e.to_string(),
    })?;

    if bytes.len() != expected_len * 2 {
        return Err(FpError::RawSizeMismatch {
            path: path.display().to_string(),
            got: bytes.len(),
            expected: expected_len * 2,
        });
    }

    Ok(bytes
        .chunks_exact(2)
        .map(|c| u16::from_le_bytes([c[0], c[1]]))
        .collect())
}
