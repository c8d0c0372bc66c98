//! Batch processing with per-image failure isolation
//!
//! Each job is loaded, processed and saved on its own. A failure is
//! reported with the stage that raised it and the batch moves on.

use crate::error::{EffectError, ErrorKind, Result};
use crate::services::{ImageIOService, ProcessingStage, ProgressReporter};
use crate::types::EffectResult;
use image::RgbImage;
use std::path::{Path, PathBuf};

/// One unit of batch work
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchJob {
    pub input: PathBuf,
    pub output: PathBuf,
    /// Replacement background, when the effect uses one
    pub background: Option<PathBuf>,
}

impl BatchJob {
    #[must_use]
    pub fn new<I: Into<PathBuf>, O: Into<PathBuf>>(input: I, output: O) -> Self {
        Self {
            input: input.into(),
            output: output.into(),
            background: None,
        }
    }

    #[must_use]
    pub fn with_background<P: Into<PathBuf>>(mut self, background: P) -> Self {
        self.background = Some(background.into());
        self
    }

    /// Output path for `input` inside `output_dir`, keeping the file name
    #[must_use]
    pub fn output_path_for(input: &Path, output_dir: &Path) -> PathBuf {
        match input.file_name() {
            Some(name) => output_dir.join(name),
            None => output_dir.join("output.png"),
        }
    }
}

/// A job that did not produce an output
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchFailure {
    pub input: PathBuf,
    pub stage: Option<ProcessingStage>,
    pub kind: ErrorKind,
    pub message: String,
}

/// Outcome of a batch run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchReport {
    /// Output files written
    pub written: Vec<PathBuf>,
    pub failures: Vec<BatchFailure>,
}

impl BatchReport {
    #[must_use]
    pub fn processed(&self) -> usize {
        self.written.len()
    }

    #[must_use]
    pub fn failed(&self) -> usize {
        self.failures.len()
    }

    #[must_use]
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Runs an effect over many images
pub struct BatchRunner<'a> {
    reporter: &'a dyn ProgressReporter,
    jpeg_quality: u8,
}

impl<'a> BatchRunner<'a> {
    #[must_use]
    pub fn new(reporter: &'a dyn ProgressReporter, jpeg_quality: u8) -> Self {
        Self {
            reporter,
            jpeg_quality,
        }
    }

    /// Process every job with `effect`, isolating failures
    ///
    /// `effect` receives the decoded input and, when the job names one, the
    /// decoded background.
    pub fn run<F>(&self, jobs: &[BatchJob], mut effect: F) -> BatchReport
    where
        F: FnMut(&RgbImage, Option<&RgbImage>) -> Result<EffectResult>,
    {
        let mut report = BatchReport::default();
        let total = jobs.len();

        for (index, job) in jobs.iter().enumerate() {
            self.reporter.report_item_started(index, total, &job.input);

            match self.run_job(job, &mut effect) {
                Ok(result) => {
                    self.reporter.report_item_completed(&job.input, &result.timings);
                    report.written.push(job.output.clone());
                },
                Err(e) => {
                    let message = e.to_string();
                    self.reporter.report_item_failed(&job.input, e.stage(), &message);
                    report.failures.push(BatchFailure {
                        input: job.input.clone(),
                        stage: e.stage(),
                        kind: e.kind(),
                        message,
                    });
                },
            }
        }

        self.reporter
            .report_batch_finished(report.processed(), report.failed());
        report
    }

    fn run_job<F>(&self, job: &BatchJob, effect: &mut F) -> Result<EffectResult>
    where
        F: FnMut(&RgbImage, Option<&RgbImage>) -> Result<EffectResult>,
    {
        let image = ImageIOService::load_image(&job.input)
            .map_err(|e| e.at_stage(ProcessingStage::ImageLoading))?;
        let background = job
            .background
            .as_ref()
            .map(ImageIOService::load_image)
            .transpose()
            .map_err(|e| e.at_stage(ProcessingStage::ImageLoading))?;

        let result = effect(&image, background.as_ref())?;

        result
            .save(&job.output, self.jpeg_quality)
            .map_err(|e: EffectError| e.at_stage(ProcessingStage::FileSaving))?;
        Ok(result)
    }
}
