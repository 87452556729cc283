//! fpbench CLI - offline fingerprint enrollment/verification benchmark.

use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use fpbench::config::{AdmissionPolicy, BenchmarkConfig, CurationPolicy, PreprocessConfig, StudyMode};
use fpbench::driver::{enroll, verify, Frame, Outcome};
use fpbench::io::{read_pgm, read_raw_frame};
use fpbench::pixel::preprocess;

/// Offline enrollment/verification benchmark for the fingerprint pipeline.
#[derive(Parser, Debug)]
#[command(name = "fpbench", version, about = "Enrollment/verification benchmark driver")]
struct Cli {
    /// Enrollment frame files (PGM, or raw with --raw-input).
    #[arg(long = "enroll", num_args = 1.., required = true)]
    enroll: Vec<PathBuf>,

    /// Verification frame files (PGM, or raw with --raw-input).
    #[arg(long = "verify", num_args = 1.., required = true)]
    verify: Vec<PathBuf>,

    /// Treat inputs as raw 16-bit frames and run them through the preprocessor first.
    #[arg(long = "raw-input")]
    raw_input: bool,

    /// Calibration frame for raw input (ignored for PGM input).
    #[arg(long = "cal")]
    cal: Option<PathBuf>,

    #[arg(long = "scan-width", default_value_t = fpbench::constants::DEFAULT_SCAN_WIDTH)]
    scan_width: usize,

    #[arg(long = "height", default_value_t = fpbench::constants::DEFAULT_HEIGHT)]
    height: usize,

    #[arg(long = "stddev-gate", default_value_t = fpbench::constants::DEFAULT_STDDEV_GATE)]
    stddev_gate: i32,

    #[arg(long = "quality-gate", default_value_t = fpbench::constants::DEFAULT_KP_GATE)]
    quality_gate: i32,

    #[arg(long = "score-threshold", default_value_t = fpbench::constants::DEFAULT_SCORE_THRESHOLD)]
    score_threshold: i32,

    #[arg(long = "study-threshold")]
    study_threshold: Option<i32>,

    #[arg(long = "template-study")]
    template_study: bool,

    #[arg(long = "study-v2")]
    study_v2: bool,

    #[arg(long = "quality-enroll")]
    quality_enroll: bool,

    #[arg(long = "diversity-prune")]
    diversity_prune: bool,

    #[arg(long = "sort-subtemplates")]
    sort_subtemplates: bool,

    #[arg(long = "max-subtemplates", default_value_t = fpbench::constants::DEFAULT_MAX_SUBTEMPLATES)]
    max_subtemplates: usize,

    /// Print machine-readable CSV to stdout instead of a human-readable report.
    #[arg(long = "csv")]
    csv: bool,
}

impl Cli {
    fn to_benchmark_config(&self) -> BenchmarkConfig {
        let study_v2 = self.study_v2;
        let study = if study_v2 || self.template_study {
            if study_v2 {
                StudyMode::MultiLayer
            } else {
                StudyMode::Naive
            }
        } else {
            StudyMode::Disabled
        };

        let admission = if self.quality_enroll {
            AdmissionPolicy::QualityRanked {
                min_fill: BenchmarkConfig::default_min_fill(self.max_subtemplates),
            }
        } else {
            AdmissionPolicy::Plain
        };

        let curation = if self.diversity_prune {
            CurationPolicy::DiversityPrune
        } else if self.sort_subtemplates {
            CurationPolicy::SortTruncate
        } else {
            CurationPolicy::None
        };

        BenchmarkConfig {
            stddev_gate: self.stddev_gate,
            kp_gate: self.quality_gate,
            score_threshold: self.score_threshold,
            study_threshold: self.study_threshold.unwrap_or(self.score_threshold),
            admission,
            curation,
            max_subtemplates: self.max_subtemplates,
            template_capacity: fpbench::constants::DEFAULT_TEMPLATE_CAPACITY,
            study,
            preprocess: PreprocessConfig {
                scan_width: self.scan_width,
                height: self.height,
                ..PreprocessConfig::default()
            },
        }
    }
}

/// A placeholder feature extractor. The real `sigfm` binding is out of
/// scope for this crate (see the library's crate-level docs); this exists
/// so the binary links and runs end-to-end against synthetic or replayed
/// data, and is the natural seam for wiring in a real FFI extractor later.
struct StubExtractor;

impl fpbench::FeatureExtractor for StubExtractor {
    type Descriptor = Vec<u8>;

    fn extract(&self, pixels: &[u8], _width: usize, _height: usize) -> Option<Self::Descriptor> {
        if pixels.is_empty() {
            None
        } else {
            Some(pixels.to_vec())
        }
    }

    fn keypoint_count(&self, descriptor: &Self::Descriptor) -> usize {
        descriptor.iter().filter(|&&p| p > 32).count()
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
            .map(|(x, y)| 255 - (*x as i64 - *y as i64).abs())
            .sum();
        (sum / n as i64 / 2) as i32
    }
}

fn load_frame(path: &PathBuf, raw_input: bool, cal: Option<&[u16]>, cfg: &PreprocessConfig) -> Result<Frame> {
    let label = path.display().to_string();
    let pixels = if raw_input {
        let raw = read_raw_frame(path, cfg.scan_width * cfg.height)
            .with_context(|| format!("reading raw frame {label}"))?;
        let processed = preprocess(&raw, cal, cfg).with_context(|| format!("preprocessing {label}"))?;
        processed.data
    } else {
        let (pixels, _w, _h) = read_pgm(path).with_context(|| format!("reading PGM {label}"))?;
        pixels
    };
    Ok(Frame { label, pixels })
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = cli.to_benchmark_config();

    let cal = match &cli.cal {
        Some(path) => Some(read_raw_frame(path, config.preprocess.scan_width * config.preprocess.height)
            .with_context(|| format!("reading calibration frame {}", path.display()))?),
        None => None,
    };

    let extractor = StubExtractor;

    let enroll_frames: Vec<Frame> = cli
        .enroll
        .iter()
        .map(|p| load_frame(p, cli.raw_input, cal.as_deref(), &config.preprocess))
        .collect::<Result<_>>()?;

    let result = enroll(
        &extractor,
        &enroll_frames,
        config.preprocess.scan_width,
        config.preprocess.height,
        &config,
    );
    if result.studied.template.is_empty() {
        anyhow::bail!("No frames enrolled");
    }

    let mut studied = result.studied;

    let verify_frames: Vec<Frame> = cli
        .verify
        .iter()
        .map(|p| load_frame(p, cli.raw_input, cal.as_deref(), &config.preprocess))
        .collect::<Result<_>>()?;

    let (reports, summary) = verify(
        &extractor,
        &mut studied,
        &verify_frames,
        config.preprocess.scan_width,
        config.preprocess.height,
        &config,
    );

    if cli.csv {
        let stdout = std::io::stdout();
        let mut out = stdout.lock();
        writeln!(out, "idx,file,result,score,kp,study_updated")?;
        for (idx, report) in reports.iter().enumerate() {
            writeln!(
                out,
                "{},{},{},{},{},{}",
                idx,
                report.label,
                outcome_str(report.outcome),
                report.score.map(|s| s.to_string()).unwrap_or_default(),
                report.keypoint_count.map(|k| k.to_string()).unwrap_or_default(),
                report.study_updated,
            )?;
        }
    } else {
        let stderr = std::io::stderr();
        let mut out = stderr.lock();
        writeln!(out, "enrolled: {}", studied.template.len())?;
        writeln!(out, "matches: {}", summary.matches)?;
        writeln!(out, "fails: {}", summary.fails)?;
        writeln!(out, "skips: {}", summary.skips)?;
        writeln!(out, "errors: {}", summary.errors)?;
        if let Some(frr) = summary.frr() {
            writeln!(out, "frr: {:.2}%", frr * 100.0)?;
        } else {
            writeln!(out, "frr: n/a (no matches or fails)")?;
        }
        if let Some(mean) = summary.score_mean() {
            writeln!(
                out,
                "score min/max/mean: {}/{}/{:.1}",
                summary.score_min.unwrap_or(0),
                summary.score_max.unwrap_or(0),
                mean
            )?;
        }
        writeln!(out, "template updates: {}", summary.template_updates)?;
    }

    if summary.fails > 0 {
        std::process::exit(1);
    }
    Ok(())
}

fn outcome_str(outcome: Outcome) -> &'static str {
    match outcome {
        Outcome::Match => "MATCH",
        Outcome::Fail => "FAIL",
        Outcome::Skip => "SKIP",
        Outcome::Error => "ERROR",
    }
}
