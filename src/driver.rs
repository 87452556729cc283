//! Benchmark driver: orchestrates enrollment, optional curation, and
//! verification over one identity, and reports FRR and per-attempt
//! classification.

use crate::config::{AdmissionPolicy, BenchmarkConfig, CurationPolicy, StudyMode};
use crate::feature::FeatureExtractor;
use crate::gates::{passes_keypoint_gate, passes_stddev_gate};
use crate::template::curation::{diversity_prune, sort_truncate};
use crate::template::store::Template;
use crate::template::study::{StudiedTemplate, StudyOutcome};

/// One input to the driver: processed 8-bit pixels plus dimensions. The
/// driver does not itself read files or run the pixel pipeline; callers
/// (the CLI binaries) hand it already-processed images, keeping the
/// driver testable without any file I/O.
#[derive(Debug, Clone)]
pub struct Frame {
    pub label: String,
    pub pixels: Vec<u8>,
}

/// Classification of a single verification attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Match,
    Fail,
    Skip,
    Error,
}

/// Per-attempt report row, matching the CSV columns the CLI prints.
#[derive(Debug, Clone)]
pub struct AttemptReport {
    pub label: String,
    pub outcome: Outcome,
    pub score: Option<i32>,
    pub keypoint_count: Option<usize>,
    pub study_updated: bool,
}

/// Aggregate statistics over a verification run.
#[derive(Debug, Clone, Default)]
pub struct Summary {
    pub matches: u64,
    pub fails: u64,
    pub skips: u64,
    pub errors: u64,
    pub score_min: Option<i32>,
    pub score_max: Option<i32>,
    pub score_sum: i64,
    pub score_count: u64,
    pub template_updates: u64,
}

impl Summary {
    /// `FAIL / (MATCH + FAIL)`; `None` when the denominator is zero.
    pub fn frr(&self) -> Option<f64> {
        let denom = self.matches + self.fails;
        if denom == 0 {
            None
        } else {
            Some(self.fails as f64 / denom as f64)
        }
    }

    pub fn score_mean(&self) -> Option<f64> {
        if self.score_count == 0 {
            None
        } else {
            Some(self.score_sum as f64 / self.score_count as f64)
        }
    }

    fn record(&mut self, report: &AttemptReport) {
        match report.outcome {
            Outcome::Match => self.matches += 1,
            Outcome::Fail => self.fails += 1,
            Outcome::Skip => self.skips += 1,
            Outcome::Error => self.errors += 1,
        }
        if let Some(score) = report.score {
            self.score_min = Some(self.score_min.map_or(score, |m| m.min(score)));
            self.score_max = Some(self.score_max.map_or(score, |m| m.max(score)));
            self.score_sum += score as i64;
            self.score_count += 1;
        }
        if report.study_updated {
            self.template_updates += 1;
        }
    }
}

/// Result of enrolling a set of frames: the populated, studied template,
/// and a count of rejected (gate-failed or extraction-failed) frames.
pub struct EnrollmentResult<D> {
    pub studied: StudiedTemplate<D>,
    pub rejections: u64,
}

/// Runs enrollment over `frames`: gate, extract, gate, admit.
pub fn enroll<E: FeatureExtractor>(
    extractor: &E,
    frames: &[Frame],
    width: usize,
    height: usize,
    config: &BenchmarkConfig,
) -> EnrollmentResult<E::Descriptor> {
    let mut template: Template<E::Descriptor> = Template::new(config.template_capacity);
    let mut rejections = 0u64;

    for frame in frames {
        if !passes_stddev_gate(&frame.pixels, config.stddev_gate) {
            tracing::debug!(file = %frame.label, "enrollment: stddev gate rejected frame");
            rejections += 1;
            continue;
        }

        let descriptor = match extractor.extract(&frame.pixels, width, height) {
            Some(d) => d,
            None => {
                tracing::debug!(file = %frame.label, "enrollment: extraction produced no descriptor");
                rejections += 1;
                continue;
            }
        };
        let kp = extractor.keypoint_count(&descriptor);

        if !passes_keypoint_gate(kp, config.kp_gate) {
            tracing::debug!(file = %frame.label, kp, "enrollment: keypoint gate rejected frame");
            rejections += 1;
            continue;
        }

        let admitted = match config.admission {
            AdmissionPolicy::Plain => template.add_plain(descriptor),
            AdmissionPolicy::QualityRanked { min_fill } => {
                template.add_quality_ranked(extractor, descriptor, kp, min_fill)
            }
        };
        if admitted.is_err() {
            tracing::debug!(file = %frame.label, "enrollment: template admission refused frame");
            rejections += 1;
        }
    }

    match config.curation {
        CurationPolicy::None => {}
        CurationPolicy::SortTruncate => sort_truncate(&mut template, extractor, config.max_subtemplates),
        CurationPolicy::DiversityPrune => {
            diversity_prune(&mut template, extractor, config.max_subtemplates)
        }
    }

    let mut studied = StudiedTemplate::new(template);
    studied.finalize(extractor);

    tracing::info!(
        enrolled = studied.template.len(),
        rejections,
        "enrollment complete"
    );

    EnrollmentResult { studied, rejections }
}

/// Runs verification of `frames` against `studied`, mutating it in place
/// via the configured study engine, and returns per-attempt reports plus
/// the aggregate summary.
pub fn verify<E: FeatureExtractor>(
    extractor: &E,
    studied: &mut StudiedTemplate<E::Descriptor>,
    frames: &[Frame],
    width: usize,
    height: usize,
    config: &BenchmarkConfig,
) -> (Vec<AttemptReport>, Summary) {
    let mut reports = Vec::with_capacity(frames.len());
    let mut summary = Summary::default();

    for frame in frames {
        let report = verify_one(extractor, studied, frame, width, height, config);
        summary.record(&report);
        reports.push(report);
    }

    tracing::info!(
        matches = summary.matches,
        fails = summary.fails,
        skips = summary.skips,
        errors = summary.errors,
        frr = ?summary.frr(),
        "verification complete"
    );

    (reports, summary)
}

fn verify_one<E: FeatureExtractor>(
    extractor: &E,
    studied: &mut StudiedTemplate<E::Descriptor>,
    frame: &Frame,
    width: usize,
    height: usize,
    config: &BenchmarkConfig,
) -> AttemptReport {
    if !passes_stddev_gate(&frame.pixels, config.stddev_gate) {
        tracing::debug!(file = %frame.label, "verification: stddev gate rejected frame");
        return AttemptReport {
            label: frame.label.clone(),
            outcome: Outcome::Skip,
            score: None,
            keypoint_count: None,
            study_updated: false,
        };
    }

    let descriptor = match extractor.extract(&frame.pixels, width, height) {
        Some(d) => d,
        None => {
            tracing::debug!(file = %frame.label, "verification: extraction produced no descriptor");
            return AttemptReport {
                label: frame.label.clone(),
                outcome: Outcome::Skip,
                score: None,
                keypoint_count: None,
                study_updated: false,
            };
        }
    };
    let kp = extractor.keypoint_count(&descriptor);

    if !passes_keypoint_gate(kp, config.kp_gate) {
        tracing::debug!(file = %frame.label, kp, "verification: keypoint gate rejected frame");
        return AttemptReport {
            label: frame.label.clone(),
            outcome: Outcome::Skip,
            score: None,
            keypoint_count: Some(kp),
            study_updated: false,
        };
    }

    let (best_idx, score) = match studied.template.match_probe(extractor, &descriptor) {
        Some(v) => v,
        None => {
            tracing::error!(file = %frame.label, "verification: empty template cannot be matched");
            return AttemptReport {
                label: frame.label.clone(),
                outcome: Outcome::Error,
                score: None,
                keypoint_count: Some(kp),
                study_updated: false,
            };
        }
    };

    if score < 0 {
        tracing::error!(file = %frame.label, score, "verification: matcher reported an internal error");
        return AttemptReport {
            label: frame.label.clone(),
            outcome: Outcome::Error,
            score: Some(score),
            keypoint_count: Some(kp),
            study_updated: false,
        };
    }

    if score < config.score_threshold {
        tracing::debug!(file = %frame.label, score, "verification: below match threshold");
        return AttemptReport {
            label: frame.label.clone(),
            outcome: Outcome::Fail,
            score: Some(score),
            keypoint_count: Some(kp),
            study_updated: false,
        };
    }

    studied.record_hit(best_idx);

    let mut study_updated = false;
    if config.study != StudyMode::Disabled && score >= config.study_threshold {
        let outcome = match config.study {
            StudyMode::Naive => studied.naive_study(extractor, &descriptor, kp),
            StudyMode::MultiLayer => studied.multilayer_study(extractor, &descriptor, kp),
            StudyMode::Disabled => unreachable!(),
        };
        study_updated = outcome == StudyOutcome::Updated;
    }

    AttemptReport {
        label: frame.label.clone(),
        outcome: Outcome::Match,
        score: Some(score),
        keypoint_count: Some(kp),
        study_updated,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PreprocessConfig;

    /// Descriptor is the frame's own pixel byte; scores are 100 minus the
    /// absolute difference, and keypoint count is fixed at 30 (above every
    /// gate used in these tests) unless the pixel value encodes otherwise.
    struct FakeExtractor;

    impl FeatureExtractor for FakeExtractor {
        type Descriptor = u8;

        fn extract(&self, pixels: &[u8], _w: usize, _h: usize) -> Option<u8> {
            pixels.first().copied()
        }

        fn keypoint_count(&self, _d: &u8) -> usize {
            30
        }

        fn match_score(&self, a: &u8, b: &u8) -> i32 {
            100 - (*a as i32 - *b as i32).abs()
        }
    }

    fn frame(label: &str, value: u8) -> Frame {
        Frame {
            label: label.to_string(),
            pixels: vec![value; 64],
        }
    }

    fn high_variance_frame(label: &str, value: u8) -> Frame {
        // Alternating extremes so the stddev gate (computed on real pixel
        // statistics, not the fake descriptor) always passes.
        let pixels: Vec<u8> = (0..64)
            .map(|i| if i % 2 == 0 { value } else { 255 - value })
            .collect();
        Frame {
            label: label.to_string(),
            pixels,
        }
    }

    fn bench_config() -> BenchmarkConfig {
        BenchmarkConfig {
            stddev_gate: 1,
            kp_gate: 1,
            score_threshold: 6,
            study_threshold: 6,
            admission: AdmissionPolicy::Plain,
            curation: CurationPolicy::None,
            max_subtemplates: 20,
            template_capacity: 128,
            study: StudyMode::Disabled,
            preprocess: PreprocessConfig::default(),
        }
    }

    #[test]
    fn s1_matching_probes_score_zero_frr() {
        let ext = FakeExtractor;
        let cfg = bench_config();
        let enroll_frames = vec![
            high_variance_frame("e0", 10),
            high_variance_frame("e1", 60),
            high_variance_frame("e2", 110),
            high_variance_frame("e3", 160),
        ];
        let result = enroll(&ext, &enroll_frames, 8, 8, &cfg);
        assert_eq!(result.rejections, 0);

        let mut studied = result.studied;
        let verify_frames = vec![
            high_variance_frame("v0", 10),
            high_variance_frame("v1", 60),
        ];
        let (reports, summary) = verify(&ext, &mut studied, &verify_frames, 8, 8, &cfg);
        assert!(reports.iter().all(|r| r.outcome == Outcome::Match));
        assert_eq!(summary.matches, 2);
        assert_eq!(summary.fails, 0);
        assert_eq!(summary.frr(), Some(0.0));
    }

    #[test]
    fn s2_unrelated_probes_fail_with_strict_threshold() {
        let ext = FakeExtractor;
        let mut cfg = bench_config();
        cfg.score_threshold = 100;
        let enroll_frames = vec![high_variance_frame("e0", 10)];
        let result = enroll(&ext, &enroll_frames, 8, 8, &cfg);
        let mut studied = result.studied;

        let verify_frames = vec![
            high_variance_frame("v0", 200),
            high_variance_frame("v1", 210),
            high_variance_frame("v2", 220),
        ];
        let (_, summary) = verify(&ext, &mut studied, &verify_frames, 8, 8, &cfg);
        assert_eq!(summary.fails, 3);
        assert_eq!(summary.matches, 0);
        assert_eq!(summary.frr(), Some(1.0));
    }

    #[test]
    fn s3_enrollment_rejected_by_stddev_gate_yields_empty_template() {
        let ext = FakeExtractor;
        let mut cfg = bench_config();
        cfg.stddev_gate = 1000; // unreachable by any 8-bit frame
        let enroll_frames = vec![frame("e0", 10)];
        let result = enroll(&ext, &enroll_frames, 8, 8, &cfg);
        assert_eq!(result.rejections, 1);
        assert_eq!(result.studied.template.len(), 0);
    }

    #[test]
    fn gate_rejections_are_skipped_not_failed() {
        let ext = FakeExtractor;
        let mut cfg = bench_config();
        let enroll_frames = vec![high_variance_frame("e0", 10)];
        let result = enroll(&ext, &enroll_frames, 8, 8, &cfg);
        let mut studied = result.studied;

        cfg.kp_gate = 1000; // unreachable: fake extractor always reports 30
        let verify_frames = vec![high_variance_frame("v0", 10)];
        let (reports, summary) = verify(&ext, &mut studied, &verify_frames, 8, 8, &cfg);
        assert_eq!(reports[0].outcome, Outcome::Skip);
        assert_eq!(summary.skips, 1);
        assert_eq!(summary.matches, 0);
        assert_eq!(summary.fails, 0);
        assert_eq!(summary.frr(), None);
    }
}
