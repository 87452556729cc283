//! Stage 1: linear subtract against a dark/background calibration frame.

/// Subtracts `cal` from `frame` in place, saturating at both ends.
///
/// The sensor's raw samples use an inverted (dark-is-high) convention; the
/// textbook form is `MX - ((MX - src) - (MX - cal))` for `MX = 0xFFFF`,
/// which is algebraically `src - cal` with saturation. We compute it
/// directly as a saturating subtract widened through `i32` so both the
/// "no negative wrap" and "no overflow above MX" ends of the original
/// formulation are preserved exactly.
///
/// Panics if `frame.len() != cal.len()`. This is a programmer error
/// (mismatched frame shapes), not a data condition.
pub fn linear_subtract(frame: &mut [u16], cal: &[u16]) {
    assert_eq!(
        frame.len(),
        cal.len(),
        "calibration frame shape does not match raw frame"
    );
    for (sample, &c) in frame.iter_mut().zip(cal.iter()) {
        let diff = *sample as i32 - c as i32;
        *sample = diff.max(0) as u16;
    }
}
