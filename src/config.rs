//! Configuration layer.
//!
//! There is no persisted configuration file. Templates are never carried
//! across runs and there is no live-sensor deployment to configure, so the
//! entire configuration surface is the CLI's tunable thresholds and flags.
//! These structs hold that surface with documented defaults; each binary's
//! `clap::Parser` struct is a thin CLI-shaped mirror that gets converted
//! into one of these before any library code runs, keeping CLI parsing and
//! configuration as separate concerns.

use crate::constants::*;

/// Configuration for the pixel preprocessor (`fp-preprocess`, and the
/// benchmark driver when fed raw frames instead of pre-processed PGMs).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PreprocessConfig {
    pub scan_width: usize,
    pub height: usize,
    pub crop_width: usize,
    pub boost: i32,
    pub do_crop: bool,
    pub do_unsharp: bool,
}

impl Default for PreprocessConfig {
    fn default() -> Self {
        Self {
            scan_width: DEFAULT_SCAN_WIDTH,
            height: DEFAULT_HEIGHT,
            crop_width: DEFAULT_CROP_WIDTH,
            boost: DEFAULT_BOOST,
            do_crop: true,
            do_unsharp: true,
        }
    }
}

/// Whether, and how, enrollment admits descriptors into the template, and
/// whether the study engine runs during verification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdmissionPolicy {
    /// Append until capacity; refuse once full.
    Plain,
    /// Quality-ranked: see spec section 4.3.
    QualityRanked { min_fill: usize },
}

/// Post-enrollment curation, applied once after the enrollment loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CurationPolicy {
    None,
    SortTruncate,
    DiversityPrune,
}

/// Which study engine variant runs during verification, if any.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StudyMode {
    Disabled,
    Naive,
    MultiLayer,
}

/// Configuration for the benchmark driver (`fpbench`).
#[derive(Debug, Clone)]
pub struct BenchmarkConfig {
    pub stddev_gate: i32,
    pub kp_gate: i32,
    pub score_threshold: i32,
    pub study_threshold: i32,
    pub admission: AdmissionPolicy,
    pub curation: CurationPolicy,
    pub max_subtemplates: usize,
    pub template_capacity: usize,
    pub study: StudyMode,
    pub preprocess: PreprocessConfig,
}

impl Default for BenchmarkConfig {
    fn default() -> Self {
        let max_subtemplates = DEFAULT_MAX_SUBTEMPLATES;
        Self {
            stddev_gate: DEFAULT_STDDEV_GATE,
            kp_gate: DEFAULT_KP_GATE,
            score_threshold: DEFAULT_SCORE_THRESHOLD,
            study_threshold: DEFAULT_SCORE_THRESHOLD,
            admission: AdmissionPolicy::Plain,
            curation: CurationPolicy::None,
            max_subtemplates,
            template_capacity: DEFAULT_TEMPLATE_CAPACITY,
            study: StudyMode::Disabled,
            preprocess: PreprocessConfig::default(),
        }
    }
}

impl BenchmarkConfig {
    /// The open-question default for quality-ranked admission's `min_fill`:
    /// half of the curation target, per spec section 9.
    pub fn default_min_fill(max_subtemplates: usize) -> usize {
        max_subtemplates / 2
    }
}
