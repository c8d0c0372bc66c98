//! Stage-numbered debug image dumps
//!
//! A `DebugSink` is created from [`DebugConfig`] and handed to each
//! processor, so separate pipelines in one process can dump into separate
//! directories. A disabled sink ignores every write.

use crate::config::DebugConfig;
use crate::types::Mask;
use image::{GrayImage, ImageFormat, RgbImage};
use std::path::{Path, PathBuf};

/// Destination for intermediate stage images
#[derive(Debug, Clone, Default)]
pub struct DebugSink {
    directory: Option<PathBuf>,
}

impl DebugSink {
    /// A sink that discards everything
    #[must_use]
    pub fn disabled() -> Self {
        Self { directory: None }
    }

    /// A sink writing into `directory`, creating it if needed
    ///
    /// A directory that cannot be created is logged; later writes then fail
    /// and are logged individually.
    pub fn enabled<P: Into<PathBuf>>(directory: P) -> Self {
        let directory = directory.into();
        if let Err(e) = std::fs::create_dir_all(&directory) {
            tracing::warn!(
                "Could not create debug directory {}: {}",
                directory.display(),
                e
            );
        }
        Self {
            directory: Some(directory),
        }
    }

    #[must_use]
    pub fn from_config(config: &DebugConfig) -> Self {
        if config.enabled {
            Self::enabled(config.directory.clone())
        } else {
            Self::disabled()
        }
    }

    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.directory.is_some()
    }

    #[must_use]
    pub fn directory(&self) -> Option<&Path> {
        self.directory.as_deref()
    }

    pub fn write_rgb(&self, name: &str, image: &RgbImage) {
        if let Some(path) = self.path_for(name) {
            log_failure(&path, image.save_with_format(&path, ImageFormat::Png));
        }
    }

    pub fn write_gray(&self, name: &str, image: &GrayImage) {
        if let Some(path) = self.path_for(name) {
            log_failure(&path, image.save_with_format(&path, ImageFormat::Png));
        }
    }

    /// Write a mask as a `0/255` grayscale PNG
    pub fn write_mask(&self, name: &str, mask: &Mask) {
        if self.is_enabled() {
            self.write_gray(name, &mask.to_gray());
        }
    }

    fn path_for(&self, name: &str) -> Option<PathBuf> {
        self.directory.as_ref().map(|dir| dir.join(name))
    }
}

fn log_failure(path: &Path, result: image::ImageResult<()>) {
    match result {
        Ok(()) => tracing::trace!("Wrote debug image {}", path.display()),
        Err(e) => tracing::warn!("Failed to write debug image {}: {}", path.display(), e),
    }
}
