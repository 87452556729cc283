//! Orchestrates the four preprocessing stages over one raw frame.

use crate::config::PreprocessConfig;
use crate::error::FpError;

use super::calibration::linear_subtract;
use super::crop::center_crop;
use super::squash::squash_percentile;
use super::unsharp::unsharp_mask;

/// An 8-bit grayscale image plus its final dimensions, ready for feature
/// extraction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessedImage {
    pub data: Vec<u8>,
    pub width: usize,
    pub height: usize,
}

/// Runs the raw frame through calibration subtract (if `cal` is supplied),
/// percentile squash, unsharp mask, and center crop, in that order.
///
/// `raw` must have exactly `config.scan_width * config.height` samples.
/// When `cal` is `None`, stage 1 is skipped and a warning is logged. The
/// frame proceeds un-calibrated rather than failing outright, since a
/// missing calibration frame is common for first-time enrollment.
pub fn preprocess(
    raw: &[u16],
    cal: Option<&[u16]>,
    config: &PreprocessConfig,
) -> Result<ProcessedImage, FpError> {
    let expected = config.scan_width * config.height;
    if raw.len() != expected {
        return Err(FpError::FrameShapeMismatch {
            expected,
            actual: raw.len(),
        });
    }

    let mut working = raw.to_vec();
    match cal {
        Some(cal) if cal.len() == expected => linear_subtract(&mut working, cal),
        Some(cal) => {
            return Err(FpError::FrameShapeMismatch {
                expected,
                actual: cal.len(),
            })
        }
        None => {
            tracing::warn!("no calibration frame supplied; skipping calibration subtract");
        }
    }

    let mut squashed = squash_percentile(&working);

    if config.do_unsharp {
        unsharp_mask(&mut squashed, config.scan_width, config.height, config.boost);
    }

    let (data, width) = if config.do_crop {
        center_crop(&squashed, config.scan_width, config.height, config.crop_width)
    } else {
        (squashed, config.scan_width)
    };

    Ok(ProcessedImage {
        data,
        width,
        height: config.height,
    })
}
