//! ArUco/Alvar-style marker dictionaries and decoding.
//!
//! This crate focuses on:
//! - loading a marker dictionary from a JSON resource once at startup,
//! - matching observed marker codes against that dictionary,
//! - extracting quadrilateral candidates from a grayscale image,
//! - decoding each candidate into an accepted detection or a rejected quad.
//!
//! It knows nothing about depth or about which detections the rover should
//! steer towards; that policy lives in `artag-detector`.

mod decode;
mod detect;
mod dictionary;
mod matcher;
mod params;
mod quad;
mod threshold;

pub use decode::decode_marker_in_quad;
pub use detect::{MarkerCandidates, MarkerDetection, MarkerDetector};
pub use dictionary::{Dictionary, DictionaryError};
pub use matcher::{rotate_code_u64, Match, Matcher};
pub use params::{DetectorParameters, ParamsError};
pub use quad::{find_quad_candidates, Quad};
