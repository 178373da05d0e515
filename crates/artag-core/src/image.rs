//! Plain row-major image containers.
//!
//! Views borrow caller-owned buffers for the duration of one call; owned
//! images are produced by the frame pipeline and never outlive it.

use serde::{Deserialize, Serialize};

/// Errors raised when wrapping raw buffers.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ImageError {
    #[error("invalid image dimensions (width={width}, height={height})")]
    InvalidDimensions { width: usize, height: usize },
    #[error("invalid image buffer length (expected {expected} elements, got {got})")]
    BufferSize { expected: usize, got: usize },
}

fn expected_len(width: usize, height: usize, channels: usize) -> Result<usize, ImageError> {
    width
        .checked_mul(height)
        .and_then(|n| n.checked_mul(channels))
        .ok_or(ImageError::InvalidDimensions { width, height })
}

fn check_len(width: usize, height: usize, channels: usize, got: usize) -> Result<(), ImageError> {
    let expected = expected_len(width, height, channels)?;
    if got != expected {
        return Err(ImageError::BufferSize { expected, got });
    }
    Ok(())
}

/// BT.601 luma, rounded to the nearest integer.
#[inline]
fn luma(rgb: [u8; 3]) -> u8 {
    let [r, g, b] = rgb.map(u32::from);
    ((299 * r + 587 * g + 114 * b + 500) / 1000) as u8
}

#[derive(Clone, Copy, Debug)]
pub struct GrayImageView<'a> {
    pub width: usize,
    pub height: usize,
    pub data: &'a [u8], // row-major, len = w*h
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GrayImage {
    pub width: usize,
    pub height: usize,
    pub data: Vec<u8>,
}

impl GrayImage {
    pub fn new_filled(width: usize, height: usize, value: u8) -> Self {
        Self {
            width,
            height,
            data: vec![value; width * height],
        }
    }

    #[inline]
    pub fn view(&self) -> GrayImageView<'_> {
        GrayImageView {
            width: self.width,
            height: self.height,
            data: &self.data,
        }
    }
}

/// Channel layout of a borrowed color buffer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PixelFormat {
    Gray,
    Rgb,
    Rgba,
    Bgr,
    Bgra,
}

impl PixelFormat {
    /// Interleaved bytes per pixel.
    #[inline]
    pub fn channels(self) -> usize {
        match self {
            PixelFormat::Gray => 1,
            PixelFormat::Rgb | PixelFormat::Bgr => 3,
            PixelFormat::Rgba | PixelFormat::Bgra => 4,
        }
    }

    /// Read one pixel as RGB, dropping alpha.
    #[inline]
    fn rgb(self, px: &[u8]) -> [u8; 3] {
        match self {
            PixelFormat::Gray => [px[0]; 3],
            PixelFormat::Rgb | PixelFormat::Rgba => [px[0], px[1], px[2]],
            PixelFormat::Bgr | PixelFormat::Bgra => [px[2], px[1], px[0]],
        }
    }
}

/// Borrowed color frame in any supported channel layout.
#[derive(Clone, Copy, Debug)]
pub struct ColorImageView<'a> {
    pub width: usize,
    pub height: usize,
    pub format: PixelFormat,
    pub data: &'a [u8],
}

impl<'a> ColorImageView<'a> {
    /// Wrap an interleaved buffer, checking its length against the layout.
    pub fn new(
        width: usize,
        height: usize,
        format: PixelFormat,
        data: &'a [u8],
    ) -> Result<Self, ImageError> {
        let view = Self {
            width,
            height,
            format,
            data,
        };
        view.check()?;
        Ok(view)
    }

    /// Re-check the buffer length; views built as struct literals skip `new`.
    pub fn check(&self) -> Result<(), ImageError> {
        check_len(self.width, self.height, self.format.channels(), self.data.len())
    }

    #[inline]
    pub fn rgb_at(&self, x: usize, y: usize) -> [u8; 3] {
        let c = self.format.channels();
        let idx = (y * self.width + x) * c;
        self.format.rgb(&self.data[idx..idx + c])
    }

    /// Convert to a packed 3-channel RGB image.
    pub fn to_rgb(&self) -> RgbImage {
        let c = self.format.channels();
        let mut data = Vec::with_capacity(self.width * self.height * 3);
        for px in self.data.chunks_exact(c) {
            data.extend_from_slice(&self.format.rgb(px));
        }
        RgbImage {
            width: self.width,
            height: self.height,
            data,
        }
    }

    /// Grayscale conversion without an intermediate RGB copy.
    pub fn to_gray(&self) -> GrayImage {
        let c = self.format.channels();
        let data = self
            .data
            .chunks_exact(c)
            .map(|px| luma(self.format.rgb(px)))
            .collect();
        GrayImage {
            width: self.width,
            height: self.height,
            data,
        }
    }
}

/// Owned packed RGB image (3 bytes per pixel, row-major).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RgbImage {
    pub width: usize,
    pub height: usize,
    pub data: Vec<u8>,
}

impl RgbImage {
    pub fn new_filled(width: usize, height: usize, rgb: [u8; 3]) -> Self {
        let mut data = Vec::with_capacity(width * height * 3);
        for _ in 0..width * height {
            data.extend_from_slice(&rgb);
        }
        Self {
            width,
            height,
            data,
        }
    }

    #[inline]
    pub fn pixel(&self, x: usize, y: usize) -> [u8; 3] {
        let idx = (y * self.width + x) * 3;
        [self.data[idx], self.data[idx + 1], self.data[idx + 2]]
    }

    #[inline]
    pub fn set_pixel(&mut self, x: usize, y: usize, rgb: [u8; 3]) {
        let idx = (y * self.width + x) * 3;
        self.data[idx..idx + 3].copy_from_slice(&rgb);
    }

    #[inline]
    pub fn view(&self) -> ColorImageView<'_> {
        ColorImageView {
            width: self.width,
            height: self.height,
            format: PixelFormat::Rgb,
            data: &self.data,
        }
    }

    pub fn to_gray(&self) -> GrayImage {
        self.view().to_gray()
    }
}

/// Borrowed depth map, one `f32` per pixel. Non-finite values mean "no depth".
#[derive(Clone, Copy, Debug)]
pub struct DepthImageView<'a> {
    pub width: usize,
    pub height: usize,
    pub data: &'a [f32],
}

impl<'a> DepthImageView<'a> {
    pub fn new(width: usize, height: usize, data: &'a [f32]) -> Result<Self, ImageError> {
        let view = Self {
            width,
            height,
            data,
        };
        view.check()?;
        Ok(view)
    }

    /// Re-check the buffer length; views built as struct literals skip `new`.
    pub fn check(&self) -> Result<(), ImageError> {
        check_len(self.width, self.height, 1, self.data.len())
    }

    #[inline]
    pub fn get(&self, x: usize, y: usize) -> f32 {
        self.data[y * self.width + x]
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct DepthImage {
    pub width: usize,
    pub height: usize,
    pub data: Vec<f32>,
}

impl DepthImage {
    pub fn new_filled(width: usize, height: usize, value: f32) -> Self {
        Self {
            width,
            height,
            data: vec![value; width * height],
        }
    }

    #[inline]
    pub fn view(&self) -> DepthImageView<'_> {
        DepthImageView {
            width: self.width,
            height: self.height,
            data: &self.data,
        }
    }
}
