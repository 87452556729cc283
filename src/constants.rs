//! Default thresholds and frame dimensions, as used by the production
//! benchmark tool. These are not arbitrary; they are mirrored into
//! [`crate::config`]'s `Default` impls, and changing one here changes the
//! documented default everywhere.

/// Raw sensor frame width in samples (before crop).
pub const DEFAULT_SCAN_WIDTH: usize = 88;
/// Raw sensor frame height in samples.
pub const DEFAULT_HEIGHT: usize = 80;
/// Center-crop target width.
pub const DEFAULT_CROP_WIDTH: usize = 64;
/// Unsharp mask boost factor.
pub const DEFAULT_BOOST: i32 = 2;

/// Minimum pixel stddev for a processed frame to reach feature extraction.
pub const DEFAULT_STDDEV_GATE: i32 = 25;
/// Minimum keypoint count for a frame to survive the post-extraction gate.
pub const DEFAULT_KP_GATE: i32 = 25;

/// Match score threshold above which a verification attempt is a MATCH.
///
/// Historical note: an earlier, superseded variant used 40 here (the same
/// value bozorth3 used as a match threshold for a different matcher). The
/// production default is 6; 40 is never used as a default in this crate.
pub const DEFAULT_SCORE_THRESHOLD: i32 = 6;

/// Template capacity (maximum sub-templates per enrolled identity).
pub const DEFAULT_TEMPLATE_CAPACITY: usize = 128;
/// Default target size after post-enrollment curation.
pub const DEFAULT_MAX_SUBTEMPLATES: usize = 20;

/// Multi-layer study: number of consecutive failed update attempts that
/// permanently trips the degradation lock.
pub const STUDY_FAILED_MAX: u32 = 20;
/// Multi-layer study: minimum accepted matches observed before study may run.
pub const STUDY_MIN_OBSERVATIONS: u32 = 5;
/// Multi-layer study: minimum probe keypoint count to be considered at all.
pub const STUDY_MIN_KP: i32 = 15;
