//! Center-pivoted mask scaling
//!
//! Two algorithms are supported:
//!
//! - [`ScaleAlgorithm::RotateScale`] warps the mask through an affine
//!   rotate + scale transform pivoted on the mask center, resampling with an
//!   8-tap Lanczos kernel. Factors above 1 dilate the silhouette in place.
//! - [`ScaleAlgorithm::CropResize`] crops a window derived from the factor and
//!   stretches it back to full size with bilinear filtering. Factors above 1
//!   zoom into the mask content rather than dilating it.
//!
//! Both return a binary mask with the input's dimensions. Interpolated
//! coverage is thresholded at one half.

use crate::config::{ScaleAlgorithm, ScaleSpec};
use crate::error::{EffectError, Result};
use crate::types::Mask;
use image::imageops::{self, FilterType};
use ndarray::Array2;
use tracing::{debug, instrument};

/// Number of Lanczos taps per axis
const LANCZOS_TAPS: usize = 8;

/// Coverage at or above this value is treated as set after resampling
const COVERAGE_THRESHOLD: f32 = 0.5;

/// 2x3 affine matrix mapping source coordinates to destination coordinates
pub type AffineMatrix = [[f64; 3]; 2];

/// Scales binary masks about their center
pub struct MaskScaler;

impl MaskScaler {
    /// Scale `mask` according to `spec`
    ///
    /// # Errors
    /// - `InvalidInput` for a mask with a zero dimension
    /// - `InvalidParameter` for a non-positive or non-finite factor, a
    ///   non-finite angle, or a crop window that collapses to nothing
    #[instrument(level = "debug", skip(mask), fields(width = mask.width(), height = mask.height()))]
    pub fn scale(mask: &Mask, spec: &ScaleSpec) -> Result<Mask> {
        spec.validate()?;
        ensure_non_degenerate(mask)?;

        let scaled = match spec.algorithm {
            ScaleAlgorithm::RotateScale => Self::rotate_scale(mask, spec.factor, spec.angle)?,
            ScaleAlgorithm::CropResize => Self::crop_resize(mask, spec.factor)?,
        };
        debug!(
            algorithm = %spec.algorithm,
            factor = spec.factor,
            before = mask.count(),
            after = scaled.count(),
            "Scaled mask"
        );
        Ok(scaled)
    }

    /// Rotate by `angle` degrees and scale by `factor` around the mask center
    ///
    /// Samples falling outside the source are zero, so newly exposed area is
    /// unset. `factor == 1, angle == 0` reproduces the input exactly.
    ///
    /// # Errors
    /// - `InvalidInput` for a mask with a zero dimension
    /// - `InvalidParameter` for a singular transform
    pub fn rotate_scale(mask: &Mask, factor: f32, angle: f32) -> Result<Mask> {
        ensure_non_degenerate(mask)?;
        let (width, height) = mask.dimensions();
        let center = (f64::from(width) / 2.0, f64::from(height) / 2.0);
        let forward = rotation_matrix(center, f64::from(angle), f64::from(factor));
        let inverse = invert_affine(&forward)?;

        let source = mask.as_array().mapv(|v| if v { 1.0_f32 } else { 0.0 });
        let (rows, cols) = source.dim();

        let data = Array2::from_shape_fn((rows, cols), |(y, x)| {
            let (xf, yf) = (x as f64, y as f64);
            let sx = inverse[0][0] * xf + inverse[0][1] * yf + inverse[0][2];
            let sy = inverse[1][0] * xf + inverse[1][1] * yf + inverse[1][2];
            sample_lanczos(&source, sx, sy) >= COVERAGE_THRESHOLD
        });
        Ok(Mask::from_array(data))
    }

    /// Crop the center window implied by `factor` and resize it back
    ///
    /// With `c = dim / 2` (truncated) and `r = factor * c` (truncated), the
    /// window spans `|c - r| .. min(|c + r|, dim)` on each axis.
    ///
    /// # Errors
    /// - `InvalidInput` for a mask with a zero dimension
    /// - `InvalidParameter` when the window is empty
    pub fn crop_resize(mask: &Mask, factor: f32) -> Result<Mask> {
        ensure_non_degenerate(mask)?;
        let (width, height) = mask.dimensions();
        let (row_start, row_end) = crop_window(height, factor);
        let (col_start, col_end) = crop_window(width, factor);

        if row_end <= row_start || col_end <= col_start {
            return Err(EffectError::invalid_parameter(format!(
                "Zoom factor {factor} leaves an empty crop window for a {width}x{height} mask"
            )));
        }

        let gray = mask.to_gray();
        let cropped = imageops::crop_imm(
            &gray,
            col_start,
            row_start,
            col_end - col_start,
            row_end - row_start,
        )
        .to_image();
        let resized = imageops::resize(&cropped, width, height, FilterType::Triangle);
        Ok(Mask::from_gray(&resized))
    }
}

/// Affine matrix rotating by `angle_deg` (counter-clockwise) and scaling by
/// `scale` about `center = (cx, cy)`
#[must_use]
pub fn rotation_matrix(center: (f64, f64), angle_deg: f64, scale: f64) -> AffineMatrix {
    let theta = angle_deg.to_radians();
    let alpha = scale * theta.cos();
    let beta = scale * theta.sin();
    let (cx, cy) = center;
    [
        [alpha, beta, (1.0 - alpha) * cx - beta * cy],
        [-beta, alpha, beta * cx + (1.0 - alpha) * cy],
    ]
}

/// Invert a 2x3 affine matrix
///
/// # Errors
/// - `InvalidParameter` when the linear part is singular
pub fn invert_affine(m: &AffineMatrix) -> Result<AffineMatrix> {
    let [[a, b, tx], [c, d, ty]] = *m;
    let det = a * d - b * c;
    if det.abs() < f64::EPSILON {
        return Err(EffectError::invalid_parameter(
            "Mask transform is singular and cannot be inverted",
        ));
    }
    let (ia, ib, ic, id) = (d / det, -b / det, -c / det, a / det);
    Ok([
        [ia, ib, -(ia * tx + ib * ty)],
        [ic, id, -(ic * tx + id * ty)],
    ])
}

fn ensure_non_degenerate(mask: &Mask) -> Result<()> {
    let (width, height) = mask.dimensions();
    if width == 0 || height == 0 {
        return Err(EffectError::invalid_input(format!(
            "Cannot scale a {width}x{height} mask"
        )));
    }
    Ok(())
}

fn crop_window(extent: u32, factor: f32) -> (u32, u32) {
    let center = i64::from(extent / 2);
    let radius = (f64::from(factor) * center as f64) as i64;
    let start = (center - radius).unsigned_abs();
    let end = (center + radius).unsigned_abs().min(u64::from(extent));
    (
        u32::try_from(start).unwrap_or(u32::MAX),
        u32::try_from(end).unwrap_or(u32::MAX),
    )
}

/// Normalized Lanczos weights for a sample at fractional offset `frac`
///
/// Tap `i` corresponds to the source pixel at `floor + i - 3`.
fn lanczos_weights(frac: f64) -> [f64; LANCZOS_TAPS] {
    let mut weights = [0.0; LANCZOS_TAPS];
    if frac < f64::from(f32::EPSILON) {
        weights[3] = 1.0;
        return weights;
    }

    let mut sum = 0.0;
    for (i, weight) in weights.iter_mut().enumerate() {
        let distance = frac + 3.0 - i as f64;
        *weight = sinc(distance) * sinc(distance / 4.0);
        sum += *weight;
    }
    for weight in &mut weights {
        *weight /= sum;
    }
    weights
}

fn sinc(x: f64) -> f64 {
    if x.abs() < 1e-12 {
        1.0
    } else {
        let px = std::f64::consts::PI * x;
        px.sin() / px
    }
}

/// Interpolate `source` at `(sx, sy)`, treating out-of-bounds pixels as zero
fn sample_lanczos(source: &Array2<f32>, sx: f64, sy: f64) -> f32 {
    let (rows, cols) = source.dim();
    let x0 = sx.floor();
    let y0 = sy.floor();

    // All taps outside the image
    if x0 + 4.0 < 0.0 || y0 + 4.0 < 0.0 || x0 - 3.0 >= cols as f64 || y0 - 3.0 >= rows as f64 {
        return 0.0;
    }

    let wx = lanczos_weights(sx - x0);
    let wy = lanczos_weights(sy - y0);
    let (x0, y0) = (x0 as i64, y0 as i64);

    let mut acc = 0.0;
    for (j, wy) in wy.iter().enumerate() {
        let y = y0 + j as i64 - 3;
        if y < 0 || y >= rows as i64 {
            continue;
        }
        for (i, wx) in wx.iter().enumerate() {
            let x = x0 + i as i64 - 3;
            if x < 0 || x >= cols as i64 {
                continue;
            }
            if let Some(&value) = source.get((y as usize, x as usize)) {
                acc += f64::from(value) * wx * wy;
            }
        }
    }
    acc as f32
}
