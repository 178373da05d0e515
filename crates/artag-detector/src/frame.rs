use crate::FrameError;
use artag_core::{ColorImageView, DepthImageView, PixelFormat};

/// A synchronized color + depth pair over the same pixel grid.
///
/// Borrowed read-only for the duration of one detection call.
#[derive(Clone, Copy, Debug)]
pub struct Frame<'a> {
    color: ColorImageView<'a>,
    depth: DepthImageView<'a>,
}

impl<'a> Frame<'a> {
    pub fn new(color: ColorImageView<'a>, depth: DepthImageView<'a>) -> Result<Self, FrameError> {
        if color.width != depth.width || color.height != depth.height {
            return Err(FrameError::DimensionMismatch {
                color_width: color.width,
                color_height: color.height,
                depth_width: depth.width,
                depth_height: depth.height,
            });
        }
        if color.width == 0 || color.height == 0 {
            return Err(FrameError::EmptyFrame);
        }
        color.check()?;
        depth.check()?;
        Ok(Self { color, depth })
    }

    /// Wrap raw interleaved color and depth buffers.
    pub fn from_raw(
        width: usize,
        height: usize,
        format: PixelFormat,
        color: &'a [u8],
        depth: &'a [f32],
    ) -> Result<Self, FrameError> {
        let color = ColorImageView::new(width, height, format, color)?;
        let depth = DepthImageView::new(width, height, depth)?;
        Self::new(color, depth)
    }

    #[inline]
    pub fn color(&self) -> &ColorImageView<'a> {
        &self.color
    }

    #[inline]
    pub fn depth(&self) -> &DepthImageView<'a> {
        &self.depth
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.color.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.color.height
    }
}
