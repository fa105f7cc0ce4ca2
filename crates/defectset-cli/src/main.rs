// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Defectset — segmentation dataset builder.
//
// Entry point. Parses arguments, initialises logging, runs the dataset build,
// and reports failures in plain language.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use defectset_core::error::Result;
use defectset_core::human_errors::humanize_error;
use defectset_core::{DEFAULT_OUTPUT_DIR, DEFAULT_SEED, DatasetConfig, DetectorConfig};
use defectset_dataset::{DatasetBuilder, RunSummary};

/// Generate a semantic segmentation dataset from clean/noisy image pairs.
#[derive(Debug, Parser)]
#[command(name = "defectset")]
#[command(version)]
struct Cli {
    /// Input image root directories, each containing `clean/` and `noisy/`.
    #[arg(required = true, value_name = "IMGS_DIRS")]
    imgs_dirs: Vec<PathBuf>,

    /// Ratio of validation set.
    #[arg(short = 'v', long = "val", default_value_t = 0.1)]
    val: f64,

    /// Ratio of test set.
    #[arg(short = 't', long = "test", default_value_t = 0.1)]
    test: f64,

    /// Limit number of output images.
    #[arg(short = 'l', long)]
    limit: Option<usize>,

    /// Random seed.
    #[arg(short = 's', long, default_value_t = DEFAULT_SEED)]
    seed: u64,

    /// Output directory.
    #[arg(short = 'o', long, default_value = DEFAULT_OUTPUT_DIR)]
    output: PathBuf,

    /// Worker threads used to annotate pairs within a split.
    #[arg(short = 'j', long, default_value_t = 1)]
    workers: usize,

    /// Minimum grayscale difference (0-255) counted as a defect pixel.
    #[arg(long, default_value_t = DetectorConfig::default().diff_threshold)]
    diff_threshold: u8,

    /// Gaussian blur sigma applied before differencing (0 disables).
    #[arg(long, default_value_t = DetectorConfig::default().blur_sigma)]
    blur_sigma: f32,

    /// Drop defect contours enclosing less than this many square pixels.
    #[arg(long, default_value_t = DetectorConfig::default().min_area)]
    min_area: f32,

    /// Also write a JSON run summary to this path.
    #[arg(long)]
    summary: Option<PathBuf>,

    /// Only log warnings and errors (overridden by RUST_LOG) and hide
    /// progress bars.
    #[arg(short = 'q', long)]
    quiet: bool,
}

impl Cli {
    fn dataset_config(&self) -> DatasetConfig {
        DatasetConfig {
            val_ratio: self.val,
            test_ratio: self.test,
            limit: self.limit,
            seed: self.seed,
            output_dir: self.output.clone(),
            workers: self.workers,
            progress: !self.quiet,
            detector: DetectorConfig {
                diff_threshold: self.diff_threshold,
                blur_sigma: self.blur_sigma,
                min_area: self.min_area,
            },
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let default_level = if cli.quiet { "warn" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    match run(&cli) {
        Ok(summary) => {
            for split in &summary.splits {
                println!(
                    "{:<5}  {:>6} pairs  {:>6} defects  {}",
                    split.split.as_str(),
                    split.pairs,
                    split.defects,
                    split.manifest.display()
                );
            }
            println!("Results saved in {}", summary.output_root.display());
            ExitCode::SUCCESS
        }
        Err(err) => {
            tracing::error!(error = %err, "dataset build failed");
            let human = humanize_error(&err);
            eprintln!("error: {}", human.message);
            eprintln!("  {}", human.suggestion);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<RunSummary> {
    let builder = DatasetBuilder::new(cli.dataset_config());
    tracing::info!(
        roots = cli.imgs_dirs.len(),
        output = %builder.config().output_dir.display(),
        workers = builder.config().workers,
        "Defectset starting"
    );

    let summary = builder.run(&cli.imgs_dirs)?;
    if let Some(path) = &cli.summary {
        summary.save(path)?;
        tracing::info!(path = %path.display(), "Run summary written");
    }
    Ok(summary)
}
