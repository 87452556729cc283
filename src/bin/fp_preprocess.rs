//! fp-preprocess CLI - standalone pixel-pipeline replay tool.
//!
//! Converts one or more raw 16-bit sensor frames into binary PGM images by
//! running them through the same four-stage preprocessor the benchmark
//! driver uses internally.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;

use fpbench::config::PreprocessConfig;
use fpbench::io::{read_raw_frame, write_pgm};
use fpbench::pixel::preprocess;

/// Replay the sensor pixel pipeline over raw frames.
#[derive(Parser, Debug)]
#[command(name = "fp-preprocess", version, about = "Fingerprint pixel-pipeline replay tool")]
struct Cli {
    /// Raw 16-bit frame to preprocess.
    #[arg(long = "raw")]
    raw: Option<PathBuf>,

    /// Calibration frame (same shape as --raw).
    #[arg(long = "cal")]
    cal: Option<PathBuf>,

    /// Output PGM path (single-file mode).
    #[arg(short = 'o', long = "output")]
    output: Option<PathBuf>,

    /// Batch mode: process every `raw_*.bin` in DIR, writing `<stem>.pgm`
    /// beside it. Auto-detects `calibration.bin` in the same directory
    /// unless --cal was given explicitly.
    #[arg(long = "batch")]
    batch: Option<PathBuf>,

    #[arg(long = "boost", default_value_t = fpbench::constants::DEFAULT_BOOST)]
    boost: i32,

    #[arg(long = "scan-width", default_value_t = fpbench::constants::DEFAULT_SCAN_WIDTH)]
    scan_width: usize,

    #[arg(long = "height", default_value_t = fpbench::constants::DEFAULT_HEIGHT)]
    height: usize,

    #[arg(long = "width", default_value_t = fpbench::constants::DEFAULT_CROP_WIDTH)]
    width: usize,

    #[arg(long = "no-crop")]
    no_crop: bool,

    #[arg(long = "no-unsharp")]
    no_unsharp: bool,
}

impl Cli {
    fn to_preprocess_config(&self) -> PreprocessConfig {
        PreprocessConfig {
            scan_width: self.scan_width,
            height: self.height,
            crop_width: self.width,
            boost: self.boost,
            do_crop: !self.no_crop,
            do_unsharp: !self.no_unsharp,
        }
    }
}

fn process_one(raw_path: &Path, cal: Option<&[u16]>, out_path: &Path, config: &PreprocessConfig) -> Result<()> {
    let raw = read_raw_frame(raw_path, config.scan_width * config.height)
        .with_context(|| format!("reading raw frame {}", raw_path.display()))?;
    let processed =
        preprocess(&raw, cal, config).with_context(|| format!("preprocessing {}", raw_path.display()))?;
    write_pgm(out_path, &processed.data, processed.width, processed.height)
        .with_context(|| format!("writing {}", out_path.display()))?;
    tracing::info!(
        input = %raw_path.display(),
        output = %out_path.display(),
        width = processed.width,
        height = processed.height,
        "preprocessed frame"
    );
    Ok(())
}

fn run_batch(dir: &Path, explicit_cal: Option<&Path>, config: &PreprocessConfig) -> Result<()> {
    let auto_cal_path = dir.join("calibration.bin");
    let cal_path = explicit_cal.map(Path::to_path_buf).or_else(|| {
        if auto_cal_path.is_file() {
            Some(auto_cal_path.clone())
        } else {
            None
        }
    });

    let cal = match &cal_path {
        Some(p) => Some(
            read_raw_frame(p, config.scan_width * config.height)
                .with_context(|| format!("reading calibration frame {}", p.display()))?,
        ),
        None => {
            tracing::warn!(dir = %dir.display(), "no calibration frame found for batch run");
            None
        }
    };

    let mut processed_count = 0usize;
    for entry in std::fs::read_dir(dir).with_context(|| format!("reading directory {}", dir.display()))? {
        let entry = entry?;
        let path = entry.path();
        let file_name = match path.file_name().and_then(|n| n.to_str()) {
            Some(n) => n.to_string(),
            None => continue,
        };
        if !file_name.starts_with("raw_") || !file_name.ends_with(".bin") {
            continue;
        }
        let stem = &file_name[4..file_name.len() - 4];
        let out_path = dir.join(format!("{stem}.pgm"));
        process_one(&path, cal.as_deref(), &out_path, config)?;
        processed_count += 1;
    }

    tracing::info!(dir = %dir.display(), processed_count, "batch preprocessing complete");
    Ok(())
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = cli.to_preprocess_config();

    if let Some(dir) = &cli.batch {
        return run_batch(dir, cli.cal.as_deref(), &config);
    }

    let raw_path = cli.raw.as_ref().context("--raw is required outside --batch mode")?;
    let out_path = cli.output.as_ref().context("-o/--output is required outside --batch mode")?;

    let cal = match &cli.cal {
        Some(p) => Some(
            read_raw_frame(p, config.scan_width * config.height)
                .with_context(|| format!("reading calibration frame {}", p.display()))?,
        ),
        None => None,
    };

    process_one(raw_path, cal.as_deref(), out_path, &config)
}
