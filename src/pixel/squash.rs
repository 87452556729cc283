//! Stage 2: percentile-based histogram stretch, 16-bit to 8-bit.

/// Outlier-robust auto-leveling: maps the 0.1st–99th percentile range of
/// the high byte of each 16-bit sample onto 0–255. Falls back to a linear
/// min/max stretch when the histogram is too narrow to produce a usable
/// percentile window (the degenerate case, e.g. a constant frame).
pub fn squash_percentile(frame: &[u16]) -> Vec<u8> {
    let n = frame.len();
    let mut hist = [0u32; 256];
    for &sample in frame {
        hist[(sample >> 8) as usize] += 1;
    }

    // Lower cutoff: smallest bin whose cumulative count from the bottom
    // reaches ceil(n * 0.001).
    let target_lo = ((n as u64) + 999) / 1000;
    let mut bin_lo = 0usize;
    let mut cumulative = 0u64;
    for (b, &count) in hist.iter().enumerate() {
        cumulative += count as u64;
        if cumulative >= target_lo {
            bin_lo = b;
            break;
        }
    }

    // Upper cutoff: largest bin whose cumulative count from the top
    // satisfies n - cumulative <= floor(n * 0.99).
    let target_hi = (n as u64 * 99) / 100;
    let mut bin_hi = 255usize;
    let mut cumulative = 0u64;
    for b in (0..256).rev() {
        cumulative += hist[b] as u64;
        if (n as u64) - cumulative <= target_hi {
            bin_hi = b;
            break;
        }
    }

    if bin_hi <= bin_lo {
        return squash_linear(frame);
    }

    let plo = (bin_lo as i32) << 8;
    let phi = (bin_hi as i32) << 8;
    let range = phi - plo;

    frame
        .iter()
        .map(|&sample| {
            let v = sample as i32 - plo;
            if v <= 0 {
                0
            } else if v >= range {
                255
            } else {
                (v * 255 / range) as u8
            }
        })
        .collect()
}

/// Linear min/max stretch, used as the degenerate-case fallback above and
/// directly testable on its own.
pub fn squash_linear(frame: &[u16]) -> Vec<u8> {
    let mn = frame.iter().copied().min().unwrap_or(0);
    let mx = frame.iter().copied().max().unwrap_or(0);
    let range = mx as i32 - mn as i32;

    frame
        .iter()
        .map(|&sample| {
            if range == 0 {
                0
            } else {
                (((sample as i32 - mn as i32) * 0xff) / range) as u8
            }
        })
        .collect()
}
