//! socialfx CLI tool
//!
//! Command-line interface for applying outline strokes and face blur to
//! single images or whole folders.

use super::config::CliConfigBuilder;
use crate::{
    backends::{OnnxFaceParser, OnnxSegmenter},
    processor::EffectProcessor,
    services::{
        BatchJob, BatchReport, BatchRunner, ConsoleProgressReporter, ImageIOService,
        ProcessingStage, ProgressReporter,
    },
    tracing_config::{init_cli_tracing, spans},
    types::{EffectResult, ProcessingTimings},
};
use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use image::RgbImage;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Outline stroke and face blur effects for social media images
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
#[command(name = "socialfx")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose logging (-v: DEBUG, -vv: TRACE)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Paint a colored outline around the person in each image
    Stroke(StrokeArgs),
    /// Blur the face region in each image
    Blur(BlurArgs),
}

/// Arguments shared by every subcommand
#[derive(Args, Debug, Clone)]
pub struct CommonArgs {
    /// Single image to process
    #[arg(
        short = 'i',
        long,
        value_name = "FILE",
        conflicts_with = "input_folder",
        required_unless_present = "input_folder"
    )]
    pub input_file: Option<PathBuf>,

    /// Folder of png/jpg/jpeg images to process
    #[arg(short = 'd', long, value_name = "DIR")]
    pub input_folder: Option<PathBuf>,

    /// Descend into subfolders of --input-folder
    #[arg(short, long)]
    pub recursive: bool,

    /// Output folder [default: current timestamp, e.g. 20240131-235959]
    #[arg(short, long, value_name = "DIR")]
    pub output_folder: Option<PathBuf>,

    /// ONNX Runtime execution provider (auto, cpu, cuda, coreml)
    #[arg(short, long)]
    pub execution_provider: Option<String>,

    /// JSON configuration file; flags given explicitly override its values
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// JPEG quality (0-100) for .jpg/.jpeg outputs
    #[arg(long)]
    pub jpeg_quality: Option<u8>,

    /// Write intermediate images to the debug folder
    #[arg(short = 'p', long)]
    pub debug: bool,

    /// Debug folder (implies --debug)
    #[arg(long, value_name = "DIR")]
    pub debug_dir: Option<PathBuf>,
}

#[derive(Args, Debug, Clone)]
pub struct StrokeArgs {
    #[command(flatten)]
    pub common: CommonArgs,

    /// Human segmentation model (u2net family)
    #[arg(short, long, value_name = "MODEL", default_value = "models/u2net_human_seg.onnx")]
    pub model: PathBuf,

    /// Stroke color: W3C name, #rrggbb, #rgb or r,g,b [default: yellow]
    #[arg(short, long)]
    pub color: Option<String>,

    /// Scale factor of the outer outline edge [default: 1.03]
    #[arg(short, long)]
    pub zoom_factor: Option<f32>,

    /// Rotation of the scaled mask in degrees [default: 0]
    #[arg(long, allow_hyphen_values = true)]
    pub angle: Option<f32>,

    /// Mask scaling algorithm (rotate_scale, crop_resize) [default: rotate_scale]
    #[arg(short, long)]
    pub algorithm: Option<String>,

    /// Replace everything outside the stroked subject with this image
    #[arg(short, long, value_name = "FILE")]
    pub background: Option<PathBuf>,
}

#[derive(Args, Debug, Clone)]
pub struct BlurArgs {
    #[command(flatten)]
    pub common: CommonArgs,

    /// Face parsing model (BiSeNet)
    #[arg(short, long, value_name = "MODEL", default_value = "models/parsing_bisenet.onnx")]
    pub model: PathBuf,

    /// Box blur kernel size, positive and odd [default: 33]
    #[arg(short, long)]
    pub blur_factor: Option<u32>,

    /// Square input resolution of the face parser [default: 512]
    #[arg(long)]
    pub parse_size: Option<u32>,
}

pub fn main() -> Result<()> {
    let cli = Cli::parse();

    let session_id = init_cli_tracing(cli.verbose).context("Failed to initialize tracing")?;

    match &cli.command {
        Command::Stroke(args) => run_stroke(args, &session_id, cli.verbose),
        Command::Blur(args) => run_blur(args, &session_id, cli.verbose),
    }
}

fn run_stroke(args: &StrokeArgs, session_id: &str, verbose: u8) -> Result<()> {
    let _session = spans::session(session_id, "stroke").entered();

    let config = CliConfigBuilder::from_stroke_args(args)?;
    if let Some(background) = &args.background {
        if !background.is_file() {
            anyhow::bail!("Background image {} does not exist", background.display());
        }
    }

    let jobs = prepare_jobs(&args.common, args.background.as_deref())?;
    if jobs.is_empty() {
        warn!("No png/jpg/jpeg images found in the provided inputs");
        return Ok(());
    }
    info!(
        "Stroke color {}, zoom factor {}, algorithm {}",
        config.stroke.color, config.stroke.scale.factor, config.stroke.scale.algorithm
    );

    let mut segmenter = {
        let _span =
            spans::model_loading(&args.model, &config.execution_provider.to_string()).entered();
        OnnxSegmenter::from_file(&args.model, config.execution_provider)
            .with_context(|| format!("Failed to load model {}", args.model.display()))?
    };

    let processor = EffectProcessor::new(config).context("Invalid configuration")?;
    let report = run_batch(
        &jobs,
        processor.config().jpeg_quality,
        verbose,
        |image, background| match background {
            Some(background) => processor.stroke_with_background(image, background, &mut segmenter),
            None => processor.stroke(image, &mut segmenter),
        },
    )?;
    finish(&report)
}

fn run_blur(args: &BlurArgs, session_id: &str, verbose: u8) -> Result<()> {
    let _session = spans::session(session_id, "blur").entered();

    let config = CliConfigBuilder::from_blur_args(args)?;
    let jobs = prepare_jobs(&args.common, None)?;
    if jobs.is_empty() {
        warn!("No png/jpg/jpeg images found in the provided inputs");
        return Ok(());
    }
    info!("Blur kernel {}", config.blur.kernel_size);

    let mut parser = {
        let _span =
            spans::model_loading(&args.model, &config.execution_provider.to_string()).entered();
        OnnxFaceParser::from_file(&args.model, config.execution_provider)
            .with_context(|| format!("Failed to load model {}", args.model.display()))?
            .with_input_size(config.blur.parse_size)
    };

    let processor = EffectProcessor::new(config).context("Invalid configuration")?;
    let report = run_batch(
        &jobs,
        processor.config().jpeg_quality,
        verbose,
        |image, _| processor.face_blur(image, &mut parser),
    )?;
    finish(&report)
}

fn run_batch<F>(jobs: &[BatchJob], jpeg_quality: u8, verbose: u8, effect: F) -> Result<BatchReport>
where
    F: FnMut(&RgbImage, Option<&RgbImage>) -> crate::Result<EffectResult>,
{
    let _span = spans::batch_processing(jobs.len()).entered();
    let reporter = CliProgressReporter::new(jobs.len(), verbose > 0)?;
    Ok(BatchRunner::new(&reporter, jpeg_quality).run(jobs, effect))
}

fn finish(report: &BatchReport) -> Result<()> {
    if report.is_success() {
        return Ok(());
    }
    for failure in &report.failures {
        warn!(
            input = %failure.input.display(),
            kind = ?failure.kind,
            "{}",
            failure.message
        );
    }
    anyhow::bail!(
        "{} of {} images failed",
        report.failed(),
        report.failed() + report.processed()
    )
}

/// Build one job per input image, mirroring the input layout under the output folder
fn prepare_jobs(common: &CommonArgs, background: Option<&Path>) -> Result<Vec<BatchJob>> {
    let inputs = collect_inputs(common)?;
    let output_dir = common
        .output_folder
        .clone()
        .unwrap_or_else(default_output_folder);
    std::fs::create_dir_all(&output_dir)
        .with_context(|| format!("Failed to create output folder {}", output_dir.display()))?;
    info!(
        "Found {} image(s), writing results to {}",
        inputs.len(),
        output_dir.display()
    );

    let root = common.input_folder.as_deref();
    Ok(inputs
        .into_iter()
        .map(|input| {
            let output = output_path(&input, root, &output_dir);
            let job = BatchJob::new(input, output);
            match background {
                Some(background) => job.with_background(background),
                None => job,
            }
        })
        .collect())
}

/// Resolve the input images named by `--input-file` or `--input-folder`
fn collect_inputs(common: &CommonArgs) -> Result<Vec<PathBuf>> {
    if let Some(file) = &common.input_file {
        if !file.is_file() {
            anyhow::bail!("Input file {} does not exist", file.display());
        }
        return Ok(vec![file.clone()]);
    }

    let Some(folder) = &common.input_folder else {
        anyhow::bail!("Either --input-file or --input-folder is required");
    };
    if !folder.is_dir() {
        anyhow::bail!("Input folder {} does not exist", folder.display());
    }

    let max_depth = if common.recursive { usize::MAX } else { 1 };
    let mut files = Vec::new();
    for entry in walkdir::WalkDir::new(folder).max_depth(max_depth) {
        let entry = entry.with_context(|| format!("Failed to read {}", folder.display()))?;
        if entry.file_type().is_file() && ImageIOService::is_supported_input(entry.path()) {
            files.push(entry.into_path());
        }
    }

    // Sort files alphanumerically for consistent processing order
    files.sort();
    Ok(files)
}

fn output_path(input: &Path, input_root: Option<&Path>, output_dir: &Path) -> PathBuf {
    input_root
        .and_then(|root| input.strip_prefix(root).ok())
        .map_or_else(
            || BatchJob::output_path_for(input, output_dir),
            |relative| output_dir.join(relative),
        )
}

fn default_output_folder() -> PathBuf {
    PathBuf::from(chrono::Local::now().format("%Y%m%d-%H%M%S").to_string())
}

/// Console reporter with an indicatif bar for multi-image runs
struct CliProgressReporter {
    console: ConsoleProgressReporter,
    bar: Option<ProgressBar>,
}

impl CliProgressReporter {
    fn new(total: usize, verbose: bool) -> Result<Self> {
        let bar = if total > 1 {
            let pb = ProgressBar::new(total as u64);
            pb.set_style(
                ProgressStyle::default_bar()
                    .template(
                        "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}",
                    )
                    .context("Invalid progress bar template")?
                    .progress_chars("#>-"),
            );
            Some(pb)
        } else {
            None
        };
        Ok(Self {
            console: ConsoleProgressReporter::new(verbose),
            bar,
        })
    }

    fn log(&self, f: impl FnOnce()) {
        match &self.bar {
            Some(bar) => bar.suspend(f),
            None => f(),
        }
    }
}

impl ProgressReporter for CliProgressReporter {
    fn report_item_started(&self, index: usize, total: usize, input: &Path) {
        if let Some(bar) = &self.bar {
            bar.set_message(format!("Processing {}", input.display()));
        }
        self.log(|| self.console.report_item_started(index, total, input));
    }

    fn report_item_completed(&self, input: &Path, timings: &ProcessingTimings) {
        self.log(|| self.console.report_item_completed(input, timings));
        if let Some(bar) = &self.bar {
            bar.inc(1);
        }
    }

    fn report_item_failed(&self, input: &Path, stage: Option<ProcessingStage>, error: &str) {
        self.log(|| self.console.report_item_failed(input, stage, error));
        if let Some(bar) = &self.bar {
            bar.inc(1);
        }
    }

    fn report_batch_finished(&self, processed: usize, failed: usize) {
        if let Some(bar) = &self.bar {
            bar.finish_with_message(format!("{processed} processed, {failed} failed"));
        }
        self.console.report_batch_finished(processed, failed);
    }
}
