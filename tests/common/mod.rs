//! Shared test fixtures: a deterministic stand-in for the real `sigfm`
//! feature extractor, used by every end-to-end scenario and property test
//! so none of them depend on a native matcher.

use fpbench::driver::Frame;
use fpbench::FeatureExtractor;

/// Descriptor is just the image's own pixel bytes. Keypoint count is the
/// number of pixels above `kp_floor`; match score is 100 minus the mean
/// absolute pixel difference, so identical frames score 100 and maximally
/// different 8-bit frames score close to -155.
pub struct FakeExtractor {
    pub kp_floor: u8,
}

impl Default for FakeExtractor {
    fn default() -> Self {
        Self { kp_floor: 32 }
    }
}

impl FeatureExtractor for FakeExtractor {
    type Descriptor = Vec<u8>;

    fn extract(&self, pixels: &[u8], _width: usize, _height: usize) -> Option<Self::Descriptor> {
        if pixels.is_empty() {
            None
        } else {
            Some(pixels.to_vec())
        }
    }

    fn keypoint_count(&self, descriptor: &Self::Descriptor) -> usize {
        descriptor.iter().filter(|&&p| p > self.kp_floor).count()
    }

    fn match_score(&self, a: &Self::Descriptor, b: &Self::Descriptor) -> i32 {
        let n = a.len().min(b.len());
        if n == 0 {
            return 0;
        }
        let sum: i64 = a
            .iter()
            .zip(b.iter())
            .take(n)
            .map(|(x, y)| (*x as i64 - *y as i64).abs())
            .sum();
        100 - (sum / n as i64) as i32
    }
}

/// A frame with high pixel variance (alternating `lo`/`hi`), and enough
/// bright pixels to clear a keypoint gate at the default threshold (25).
pub fn rich_frame(label: &str, lo: u8, hi: u8) -> Frame {
    let pixels: Vec<u8> = (0..64).map(|i| if i % 2 == 0 { lo } else { hi }).collect();
    Frame {
        label: label.to_string(),
        pixels,
    }
}

/// A flat, low-contrast frame: fails the stddev gate at its default (25).
pub fn flat_frame(label: &str, value: u8) -> Frame {
    Frame {
        label: label.to_string(),
        pixels: vec![value; 64],
    }
}

/// High variance like [`rich_frame`], but with too few bright pixels to
/// clear the default keypoint gate (25) even though pixel stddev is high.
pub fn sparse_keypoint_frame(label: &str) -> Frame {
    let mut pixels = vec![0u8; 64];
    for p in pixels.iter_mut().take(10) {
        *p = 200;
    }
    Frame {
        label: label.to_string(),
        pixels,
    }
}
