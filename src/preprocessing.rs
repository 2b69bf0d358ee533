// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! Image preprocessing for YOLO inference.
//!
//! Letterboxes an image into the model input size: aspect-preserving bilinear
//! resize, centred grey padding, `[0, 1]` normalisation and NCHW layout.

use fast_image_resize::images::Image;
use fast_image_resize::{FilterType, PixelType, ResizeAlg, ResizeOptions, Resizer};
use image::DynamicImage;
use ndarray::Array4;

use crate::error::{InferenceError, Result};

/// Letterbox padding color (gray).
pub const LETTERBOX_COLOR: [u8; 3] = [114, 114, 114];

/// Normalized letterbox padding value.
const LETTERBOX_NORM: f32 = LETTERBOX_COLOR[0] as f32 / 255.0;

/// Result of preprocessing an image, containing the tensor and transform info.
#[derive(Debug, Clone)]
pub struct PreprocessResult {
    /// Preprocessed image tensor in NCHW format, normalized to [0, 1].
    pub tensor: Array4<f32>,
    /// Original image dimensions (height, width).
    pub orig_shape: (u32, u32),
    /// Scale factors applied (`scale_y`, `scale_x`).
    pub scale: (f32, f32),
    /// Padding applied (`pad_top`, `pad_left`).
    pub padding: (f32, f32),
}

/// Letterbox geometry for one image.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LetterboxParams {
    /// Resized width before padding.
    pub new_w: u32,
    /// Resized height before padding.
    pub new_h: u32,
    /// Left padding in pixels.
    pub pad_left: u32,
    /// Top padding in pixels.
    pub pad_top: u32,
    /// Scale factors (`scale_y`, `scale_x`).
    pub scale: (f32, f32),
}

/// Preprocess an image for YOLO inference.
///
/// # Arguments
///
/// * `image` - Input image.
/// * `target_size` - Target size as (height, width).
///
/// # Errors
///
/// Returns [`InferenceError::ImageError`] for zero-sized images or a failed resize.
pub fn preprocess_image(image: &DynamicImage, target_size: (usize, usize)) -> Result<PreprocessResult> {
    let rgb = image.to_rgb8();
    let (orig_w, orig_h) = rgb.dimensions();
    if orig_w == 0 || orig_h == 0 {
        return Err(InferenceError::ImageError(format!(
            "Image has no pixels ({orig_w}x{orig_h})"
        )));
    }

    let params = calculate_letterbox_params(orig_w, orig_h, target_size);

    let resized = if (params.new_w, params.new_h) == (orig_w, orig_h) {
        rgb.into_raw()
    } else {
        let src = Image::from_vec_u8(orig_w, orig_h, rgb.into_raw(), PixelType::U8x3)
            .map_err(|e| InferenceError::ImageError(format!("Failed to wrap image buffer: {e}")))?;
        let mut dst = Image::new(params.new_w, params.new_h, PixelType::U8x3);
        let options =
            ResizeOptions::new().resize_alg(ResizeAlg::Convolution(FilterType::Bilinear));
        Resizer::new()
            .resize(&src, &mut dst, &options)
            .map_err(|e| InferenceError::ImageError(format!("Failed to resize image: {e}")))?;
        dst.into_vec()
    };

    let tensor = letterbox_tensor(&resized, &params, target_size);

    #[allow(clippy::cast_precision_loss)]
    let padding = (params.pad_top as f32, params.pad_left as f32);

    Ok(PreprocessResult {
        tensor,
        orig_shape: (orig_h, orig_w),
        scale: params.scale,
        padding,
    })
}

/// Compute the resize and centre padding for a letterbox.
#[must_use]
#[allow(
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss
)]
pub fn calculate_letterbox_params(
    orig_width: u32,
    orig_height: u32,
    target_size: (usize, usize),
) -> LetterboxParams {
    let (target_h, target_w) = (target_size.0 as f32, target_size.1 as f32);
    let (orig_h, orig_w) = (orig_height as f32, orig_width as f32);

    let scale = (target_h / orig_h).min(target_w / orig_w);

    // Never collapse a dimension to zero for extreme aspect ratios
    let new_w = ((orig_w * scale).round() as u32).max(1).min(target_size.1 as u32);
    let new_h = ((orig_h * scale).round() as u32).max(1).min(target_size.0 as u32);

    let pad_left = (target_size.1 as u32).saturating_sub(new_w) / 2;
    let pad_top = (target_size.0 as u32).saturating_sub(new_h) / 2;

    LetterboxParams {
        new_w,
        new_h,
        pad_left,
        pad_top,
        scale: (new_h as f32 / orig_h, new_w as f32 / orig_w),
    }
}

/// Place resized RGB pixels into a grey NCHW canvas.
fn letterbox_tensor(pixels: &[u8], params: &LetterboxParams, target_size: (usize, usize)) -> Array4<f32> {
    let (th, tw) = target_size;
    let mut tensor = Array4::from_elem((1, 3, th, tw), LETTERBOX_NORM);

    let (new_w, new_h) = (params.new_w as usize, params.new_h as usize);
    let (left, top) = (params.pad_left as usize, params.pad_top as usize);

    for (i, px) in pixels.chunks_exact(3).enumerate().take(new_w * new_h) {
        let (y, x) = (top + i / new_w, left + i % new_w);
        for c in 0..3 {
            tensor[[0, c, y, x]] = f32::from(px[c]) / 255.0;
        }
    }

    tensor
}

/// Scale coordinates from model output space back to original image space.
///
/// # Arguments
///
/// * `coords` - Coordinates in model space (after letterbox).
/// * `scale` - Scale factors (`scale_y`, `scale_x`) from preprocessing.
/// * `padding` - Padding (`pad_top`, `pad_left`) from preprocessing.
#[must_use]
pub fn scale_coords(coords: &[f32; 4], scale: (f32, f32), padding: (f32, f32)) -> [f32; 4] {
    let (scale_y, scale_x) = scale;
    let (pad_top, pad_left) = padding;

    [
        (coords[0] - pad_left) / scale_x,
        (coords[1] - pad_top) / scale_y,
        (coords[2] - pad_left) / scale_x,
        (coords[3] - pad_top) / scale_y,
    ]
}

/// Clip box coordinates to image bounds given as (height, width).
#[must_use]
pub fn clip_coords(coords: &[f32; 4], shape: (u32, u32)) -> [f32; 4] {
    #[allow(clippy::cast_precision_loss)]
    let (h, w) = (shape.0 as f32, shape.1 as f32);
    [
        coords[0].clamp(0.0, w),
        coords[1].clamp(0.0, h),
        coords[2].clamp(0.0, w),
        coords[3].clamp(0.0, h),
    ]
}
