//! Binary mask transforms
//!
//! - [`MaskScaler`]: center-pivoted rotate/scale or crop/resize
//! - [`OutlineBandExtractor`]: XOR band between a mask and its scaled copy
//! - [`RegionMaskBuilder`]: class-map allow-list membership
//! - [`post_process_mask`]: cleanup for soft segmentation output

pub mod band;
pub mod region;
pub mod scaler;

pub use band::{OutlineBandExtractor, OutlineMasks};
pub use region::{post_process_mask, RegionMaskBuilder};
pub use scaler::MaskScaler;
