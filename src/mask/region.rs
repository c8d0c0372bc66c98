//! Region masks from class maps, and segmentation mask cleanup

use crate::config::FACE_CLASS_IDS;
use crate::error::Result;
use crate::types::{ClassMap, Mask};
use crate::utils::ParameterValidator;
use image::GrayImage;
use imageproc::distance_transform::Norm;

/// Gaussian sigma used when smoothing soft segmentation output
const POST_PROCESS_SIGMA: f32 = 2.0;

/// Values at or above this survive the post-processing threshold
const POST_PROCESS_THRESHOLD: u8 = 127;

/// Builds binary masks by testing class-map membership in an allow-list
#[derive(Debug, Clone)]
pub struct RegionMaskBuilder {
    allowed: [bool; 256],
}

impl RegionMaskBuilder {
    /// Builder for an arbitrary allow-list
    ///
    /// # Errors
    /// - Empty allow-list
    pub fn new(class_ids: &[u8]) -> Result<Self> {
        ParameterValidator::validate_class_ids(class_ids)?;
        let mut allowed = [false; 256];
        for &id in class_ids {
            allowed[usize::from(id)] = true;
        }
        Ok(Self { allowed })
    }

    /// Builder for the face/skin classes of the BiSeNet face parser
    #[must_use]
    pub fn face() -> Self {
        let mut allowed = [false; 256];
        for id in FACE_CLASS_IDS {
            allowed[usize::from(id)] = true;
        }
        Self { allowed }
    }

    /// Whether `class_id` is in the allow-list
    #[must_use]
    pub fn allows(&self, class_id: u8) -> bool {
        self.allowed[usize::from(class_id)]
    }

    /// Mask of every pixel whose class id is in the allow-list
    #[must_use]
    pub fn build(&self, class_map: &ClassMap) -> Mask {
        Mask::from_array(class_map.as_array().mapv(|id| self.allows(id)))
    }
}

impl Default for RegionMaskBuilder {
    fn default() -> Self {
        Self::face()
    }
}

/// Clean up a soft `0..=255` segmentation map into a binary mask
///
/// Applies a morphological opening with a 3x3 cross, a Gaussian blur and a
/// threshold at 127. Removes speckles and smooths jagged silhouettes.
#[must_use]
pub fn post_process_mask(soft: &GrayImage) -> Mask {
    let opened = imageproc::morphology::open(soft, Norm::L1, 1);
    let blurred = imageproc::filter::gaussian_blur_f32(&opened, POST_PROCESS_SIGMA);
    Mask::from_gray_threshold(&blurred, POST_PROCESS_THRESHOLD - 1)
}
