//! High-level facade crate for the `artag-*` workspace.
//!
//! This crate provides:
//! - stable, convenient re-exports of the underlying crates
//! - (feature-gated) adapters from `image` buffers and PNG files to the
//!   lightweight views the detector consumes
//! - (feature `cli`) the `artag` command-line tool
//!
//! ## Quickstart
//!
//! ```no_run
//! use artag::detect;
//! use artag::{TagDetector, TagDetectorParams};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let detector = TagDetector::from_dictionary_file("alvar_dict.json", TagDetectorParams::new(78.0))?;
//! let color = image::open("color.png")?.to_rgba8();
//! let depth = detect::load_depth("depth.png")?;
//!
//! let res = detect::detect_tags(&detector, &color, &depth)?;
//! println!("first: {:?}, second: {:?}", res.first, res.second);
//! # Ok(())
//! # }
//! ```
//!
//! ## API map
//! - `artag::core`: image containers, homography, logger setup.
//! - `artag::aruco`: marker dictionaries, quad extraction and bit decoding.
//! - `artag::detector`: depth preprocessing, tag selection, bearings, config/report JSON.
//! - `artag::detect` (feature `image`): end-to-end helpers from `image` buffers.

pub use artag_aruco as aruco;
pub use artag_core as core;
pub use artag_detector as detector;

pub use artag_aruco::{Dictionary, DetectorParameters, MarkerDetection};
pub use artag_detector::{
    BearingError, FrameError, Tag, TagDetectionResult, TagDetector, TagDetectorError,
    TagDetectorParams,
};

#[cfg(feature = "image")]
pub mod detect;
