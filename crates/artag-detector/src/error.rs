use artag_aruco::{DictionaryError, ParamsError};
use artag_core::ImageError;

/// Errors raised while building a [`crate::TagDetector`]. All are fatal at startup.
#[derive(thiserror::Error, Debug)]
pub enum TagDetectorError {
    #[error(transparent)]
    Dictionary(#[from] DictionaryError),
    #[error("horizontal field of view must lie in (0, 180) degrees (got {degrees})")]
    InvalidFieldOfView { degrees: f64 },
    #[error("depth threshold must not be NaN")]
    InvalidDepthThreshold,
    #[error(transparent)]
    InvalidParams(#[from] ParamsError),
}

/// Per-frame precondition violations.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum FrameError {
    #[error(
        "color frame is {color_width}x{color_height} but depth frame is {depth_width}x{depth_height}"
    )]
    DimensionMismatch {
        color_width: usize,
        color_height: usize,
        depth_width: usize,
        depth_height: usize,
    },
    #[error("frame has no pixels")]
    EmptyFrame,
    #[error(transparent)]
    Image(#[from] ImageError),
}

#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum BearingError {
    #[error("frame width is zero")]
    ZeroWidth,
}
