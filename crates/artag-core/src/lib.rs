//! Core types and utilities for rover AR-tag localization.
//!
//! This crate is intentionally small and purely geometric. It owns the plain
//! image containers shared by the marker decoder and the frame pipeline, the
//! 4-point homography used to sample marker cells, and logger setup. It does
//! *not* depend on any concrete image I/O library.

mod geometry;
mod homography;
mod image;
mod logger;

pub use geometry::{polygon_perimeter, quad_center, quad_contains_point, signed_area};
pub use homography::{homography_from_4pt, Homography};
pub use image::{
    ColorImageView, DepthImage, DepthImageView, GrayImage, GrayImageView, ImageError,
    PixelFormat, RgbImage,
};

#[cfg(feature = "tracing")]
pub use logger::init_tracing;

pub use logger::{init_with_level, level_from_env, LOG_ENV};
