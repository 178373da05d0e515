use crate::core::{ColorImageView, DepthImage, PixelFormat, RgbImage};
use crate::detector::{draw_rejected, FrameError, TagDetectionResult, TagDetector};
use std::path::Path;

#[cfg(feature = "tracing")]
use tracing::instrument;

/// Errors produced by the `image`-based helpers.
#[derive(thiserror::Error, Debug)]
pub enum DetectError {
    #[error(transparent)]
    Image(#[from] ::image::ImageError),

    #[error("unsupported depth image format {color:?} (expected 8- or 16-bit gray)")]
    UnsupportedDepth { color: ::image::ColorType },

    #[error("image dimensions {width}x{height} do not fit the target buffer")]
    InvalidDimensions { width: usize, height: usize },

    #[error(transparent)]
    Frame(#[from] FrameError),
}

/// Borrow an `image::RgbaImage` as a color view.
pub fn rgba_view(img: &::image::RgbaImage) -> ColorImageView<'_> {
    ColorImageView {
        width: img.width() as usize,
        height: img.height() as usize,
        format: PixelFormat::Rgba,
        data: img.as_raw(),
    }
}

/// Borrow an `image::RgbImage` as a color view.
pub fn rgb_view(img: &::image::RgbImage) -> ColorImageView<'_> {
    ColorImageView {
        width: img.width() as usize,
        height: img.height() as usize,
        format: PixelFormat::Rgb,
        data: img.as_raw(),
    }
}

/// Convert a gray depth image to `f32` depth; pixel values are depth units.
pub fn depth_from_image(img: &::image::DynamicImage) -> Result<DepthImage, DetectError> {
    let data: Vec<f32> = match img {
        ::image::DynamicImage::ImageLuma16(buf) => {
            buf.as_raw().iter().map(|&v| f32::from(v)).collect()
        }
        ::image::DynamicImage::ImageLuma8(buf) => {
            buf.as_raw().iter().map(|&v| f32::from(v)).collect()
        }
        other => {
            return Err(DetectError::UnsupportedDepth {
                color: other.color(),
            })
        }
    };
    Ok(DepthImage {
        width: img.width() as usize,
        height: img.height() as usize,
        data,
    })
}

/// Load a depth PNG (16-bit or 8-bit gray) from disk.
pub fn load_depth(path: impl AsRef<Path>) -> Result<DepthImage, DetectError> {
    let img = ::image::open(path)?;
    depth_from_image(&img)
}

/// Run the full pipeline on an RGBA frame and its depth map.
#[cfg_attr(
    feature = "tracing",
    instrument(level = "info", skip_all, fields(width = color.width(), height = color.height()))
)]
pub fn detect_tags(
    detector: &TagDetector,
    color: &::image::RgbaImage,
    depth: &DepthImage,
) -> Result<TagDetectionResult, DetectError> {
    Ok(detector.detect_with_diagnostics(&rgba_view(color), &depth.view())?)
}

/// Convert a workspace RGB image into an `image::RgbImage`.
pub fn to_image_rgb(img: &RgbImage) -> Result<::image::RgbImage, DetectError> {
    let invalid = || DetectError::InvalidDimensions {
        width: img.width,
        height: img.height,
    };
    let w = u32::try_from(img.width).map_err(|_| invalid())?;
    let h = u32::try_from(img.height).map_err(|_| invalid())?;
    ::image::RgbImage::from_raw(w, h, img.data.clone()).ok_or_else(invalid)
}

/// Depth-filtered frame with a white box drawn over every rejected candidate.
pub fn rejected_overlay(res: &TagDetectionResult) -> Result<::image::RgbImage, DetectError> {
    to_image_rgb(&draw_rejected(
        &res.preprocessed.filtered,
        &res.candidates.rejected,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use ::image::{DynamicImage, ImageBuffer, Luma, Rgb, Rgba};

    #[test]
    fn sixteen_bit_depth_keeps_raw_values() {
        let buf: ImageBuffer<Luma<u16>, Vec<u16>> =
            ImageBuffer::from_raw(3, 1, vec![0, 1500, 9000]).expect("buffer");
        let depth = depth_from_image(&DynamicImage::ImageLuma16(buf)).expect("depth");
        assert_eq!((depth.width, depth.height), (3, 1));
        assert_eq!(depth.data, vec![0.0, 1500.0, 9000.0]);
    }

    #[test]
    fn eight_bit_depth_is_accepted() {
        let buf = ::image::GrayImage::from_pixel(2, 2, Luma([200u8]));
        let depth = depth_from_image(&DynamicImage::ImageLuma8(buf)).expect("depth");
        assert_eq!(depth.data, vec![200.0; 4]);
    }

    #[test]
    fn color_depth_is_rejected() {
        let buf = ::image::RgbImage::from_pixel(2, 2, Rgb([1, 2, 3]));
        let err = depth_from_image(&DynamicImage::ImageRgb8(buf)).unwrap_err();
        assert!(matches!(err, DetectError::UnsupportedDepth { .. }));
    }

    #[test]
    fn views_share_the_image_buffers() {
        let rgba = ::image::RgbaImage::from_pixel(4, 2, Rgba([10, 20, 30, 255]));
        let view = rgba_view(&rgba);
        assert_eq!((view.width, view.height), (4, 2));
        assert_eq!(view.rgb_at(3, 1), [10, 20, 30]);

        let rgb = ::image::RgbImage::from_pixel(2, 2, Rgb([7, 8, 9]));
        assert_eq!(rgb_view(&rgb).to_rgb().data, rgb.as_raw().clone());
    }

    #[test]
    fn rgb_round_trips_into_image_buffer() {
        let mut img = RgbImage::new_filled(3, 2, [0, 0, 0]);
        img.set_pixel(2, 1, [255, 128, 1]);
        let out = to_image_rgb(&img).expect("convert");
        assert_eq!(out.get_pixel(2, 1), &Rgb([255, 128, 1]));
    }
}
