//! Processing stages and progress reporting
//!
//! Stages double as error context: every failure raised by the effect
//! pipeline is tagged with the stage that produced it.

use crate::types::ProcessingTimings;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Stages of the effect pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProcessingStage {
    /// Loading and decoding an input image
    ImageLoading,
    /// Running the segmentation provider
    Segmentation,
    /// Scaling the subject mask about its center
    MaskScaling,
    /// Extracting the outline band
    BandExtraction,
    /// Running the face-parsing provider
    FaceParsing,
    /// Building a region mask from a class map
    RegionMask,
    /// Generating fill or blurred content
    ContentGeneration,
    /// Resizing the replacement background
    BackgroundPreparation,
    /// Compositing layers into the output image
    Compositing,
    /// Encoding and writing the output image
    FileSaving,
    /// Processing completed
    Completed,
}

impl ProcessingStage {
    /// Get a human-readable description of the processing stage
    #[must_use]
    pub fn description(&self) -> &'static str {
        match self {
            ProcessingStage::ImageLoading => "Loading input image",
            ProcessingStage::Segmentation => "Segmenting subject",
            ProcessingStage::MaskScaling => "Scaling subject mask",
            ProcessingStage::BandExtraction => "Extracting outline band",
            ProcessingStage::FaceParsing => "Parsing face regions",
            ProcessingStage::RegionMask => "Building region mask",
            ProcessingStage::ContentGeneration => "Generating effect content",
            ProcessingStage::BackgroundPreparation => "Preparing background",
            ProcessingStage::Compositing => "Compositing layers",
            ProcessingStage::FileSaving => "Saving result",
            ProcessingStage::Completed => "Processing completed",
        }
    }

    /// Short stage name used in error messages and span fields
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            ProcessingStage::ImageLoading => "image loading",
            ProcessingStage::Segmentation => "segmentation",
            ProcessingStage::MaskScaling => "mask scaling",
            ProcessingStage::BandExtraction => "band extraction",
            ProcessingStage::FaceParsing => "face parsing",
            ProcessingStage::RegionMask => "region mask",
            ProcessingStage::ContentGeneration => "content generation",
            ProcessingStage::BackgroundPreparation => "background preparation",
            ProcessingStage::Compositing => "compositing",
            ProcessingStage::FileSaving => "file saving",
            ProcessingStage::Completed => "completed",
        }
    }
}

impl std::fmt::Display for ProcessingStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Trait for reporting progress of batch runs
pub trait ProgressReporter {
    /// An item is about to be processed
    fn report_item_started(&self, index: usize, total: usize, input: &Path);

    /// An item finished successfully
    fn report_item_completed(&self, input: &Path, timings: &ProcessingTimings);

    /// An item failed; processing continues with the next one
    fn report_item_failed(&self, input: &Path, stage: Option<ProcessingStage>, error: &str);

    /// The whole batch finished
    fn report_batch_finished(&self, processed: usize, failed: usize) {
        let _ = (processed, failed);
    }
}

/// No-op progress reporter that discards all progress updates
pub struct NoOpProgressReporter;

impl ProgressReporter for NoOpProgressReporter {
    fn report_item_started(&self, _index: usize, _total: usize, _input: &Path) {}

    fn report_item_completed(&self, _input: &Path, _timings: &ProcessingTimings) {}

    fn report_item_failed(&self, _input: &Path, _stage: Option<ProcessingStage>, _error: &str) {}
}

/// Progress reporter that emits tracing events
pub struct ConsoleProgressReporter {
    verbose: bool,
}

impl ConsoleProgressReporter {
    #[must_use]
    pub fn new(verbose: bool) -> Self {
        Self { verbose }
    }
}

impl ProgressReporter for ConsoleProgressReporter {
    fn report_item_started(&self, index: usize, total: usize, input: &Path) {
        tracing::info!(
            "Started processing file named {} {}/{}",
            input.display(),
            index + 1,
            total
        );
    }

    fn report_item_completed(&self, input: &Path, timings: &ProcessingTimings) {
        if self.verbose {
            tracing::info!(
                input = %input.display(),
                "Completed in {}ms ({})",
                timings.total_ms,
                timings.summary()
            );
        } else {
            tracing::info!(input = %input.display(), "Completed in {}ms", timings.total_ms);
        }
    }

    fn report_item_failed(&self, input: &Path, stage: Option<ProcessingStage>, error: &str) {
        let stage = stage.map_or("unknown stage", |s| s.name());
        tracing::error!(input = %input.display(), stage, "Skipping output: {}", error);
    }

    fn report_batch_finished(&self, processed: usize, failed: usize) {
        tracing::info!(processed, failed, "Batch finished");
    }
}
