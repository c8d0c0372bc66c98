//! Image I/O operations service
//!
//! Keeps file access out of the compositing code so that every transform
//! stays a pure function of in-memory images.

use crate::error::{EffectError, Result};
use image::{codecs::jpeg::JpegEncoder, ImageFormat, RgbImage};
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

/// File extensions accepted as effect inputs
pub const SUPPORTED_INPUT_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg"];

/// Service for handling image file input/output operations
pub struct ImageIOService;

impl ImageIOService {
    /// Load an image from a file path as 8-bit RGB
    ///
    /// Falls back to content sniffing when the extension does not match the
    /// encoded format.
    ///
    /// # Examples
    /// ```rust,no_run
    /// use socialfx::services::ImageIOService;
    ///
    /// let image = ImageIOService::load_image("input.jpg")?;
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    ///
    /// # Errors
    /// - Missing file
    /// - Undecodable content
    pub fn load_image<P: AsRef<Path>>(path: P) -> Result<RgbImage> {
        let path_ref = path.as_ref();

        if !path_ref.exists() {
            return Err(EffectError::file_io_error(
                "read image file",
                path_ref,
                &std::io::Error::new(std::io::ErrorKind::NotFound, "file does not exist"),
            ));
        }

        match image::open(path_ref) {
            Ok(img) => Ok(img.to_rgb8()),
            Err(e) => {
                tracing::debug!(
                    "Extension-based loading failed for {}: {}. Attempting content-based detection.",
                    path_ref.display(),
                    e
                );

                let data = std::fs::read(path_ref).map_err(|io_err| {
                    EffectError::file_io_error("read image data", path_ref, &io_err)
                })?;

                image::load_from_memory(&data)
                    .map(|img| img.to_rgb8())
                    .map_err(|content_err| {
                        EffectError::invalid_input(format!(
                            "Failed to decode '{}' ({} bytes). Extension error: {e}. Content error: {content_err}",
                            path_ref.display(),
                            data.len()
                        ))
                    })
            },
        }
    }

    /// Save an image, choosing the encoder from the file extension
    ///
    /// JPEG output uses `jpeg_quality`; other formats ignore it. Missing
    /// parent directories are created.
    ///
    /// # Errors
    /// - Unknown or unsupported extension
    /// - File system or encoder failures
    pub fn save_image<P: AsRef<Path>>(image: &RgbImage, path: P, jpeg_quality: u8) -> Result<()> {
        let path_ref = path.as_ref();
        let format = ImageFormat::from_path(path_ref).map_err(|_| {
            EffectError::invalid_input(format!(
                "Cannot infer an image format from '{}'",
                path_ref.display()
            ))
        })?;

        if let Some(parent) = path_ref.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .map_err(|e| EffectError::file_io_error("create output directory", parent, &e))?;
        }

        match format {
            ImageFormat::Jpeg => {
                let file = File::create(path_ref)
                    .map_err(|e| EffectError::file_io_error("create output file", path_ref, &e))?;
                let mut writer = BufWriter::new(file);
                let encoder = JpegEncoder::new_with_quality(&mut writer, jpeg_quality.clamp(1, 100));
                image.write_with_encoder(encoder)?;
            },
            other => image.save_with_format(path_ref, other)?,
        }

        tracing::debug!("Saved {}x{} image to {}", image.width(), image.height(), path_ref.display());
        Ok(())
    }

    /// Whether `path` has one of the accepted input extensions
    #[must_use]
    pub fn is_supported_input(path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| {
                SUPPORTED_INPUT_EXTENSIONS
                    .iter()
                    .any(|supported| supported.eq_ignore_ascii_case(ext))
            })
    }
}
