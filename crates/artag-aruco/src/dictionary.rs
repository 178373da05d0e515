//! Dictionary metadata and packed marker codes.
//!
//! A dictionary is loaded once from a JSON resource:
//!
//! ```json
//! { "name": "alvar", "marker_size": 5, "max_correction_bits": 3, "codes": [123, 456] }
//! ```
//!
//! Instead of `codes`, a `bits` table may list each marker as a row-major
//! sequence of `0`/`1` entries (black = 1), `marker_size²` entries per marker.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Largest side length whose bit grid still fits in a `u64`.
const MAX_MARKER_SIZE: usize = 8;

/// Errors raised while loading or validating a dictionary.
///
/// All of them are fatal at startup.
#[derive(thiserror::Error, Debug)]
pub enum DictionaryError {
    #[error("failed to read dictionary {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    #[error("dictionary has no codes")]
    EmptyCodes,
    #[error("marker_size {marker_size} is unsupported (expected 1..={max})", max = MAX_MARKER_SIZE)]
    InvalidMarkerSize { marker_size: usize },
    #[error("code #{index} has bits set beyond marker_size^2")]
    CodeOutOfRange { index: usize },
    #[error("bit row #{index} is invalid (expected {expected} entries of 0/1, got {got})")]
    InvalidBitRow {
        index: usize,
        expected: usize,
        got: usize,
    },
    #[error("dictionary lists both `codes` and `bits`")]
    AmbiguousCodes,
}

/// A validated marker dictionary.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "DictionaryFile")]
pub struct Dictionary {
    name: String,
    marker_size: usize,
    max_correction_bits: u8,
    /// One `u64` per marker id, inner bits row-major with **black = 1**.
    codes: Vec<u64>,
}

#[derive(Deserialize)]
struct DictionaryFile {
    #[serde(default)]
    name: Option<String>,
    marker_size: usize,
    max_correction_bits: u8,
    #[serde(default)]
    codes: Vec<u64>,
    #[serde(default)]
    bits: Vec<Vec<u8>>,
}

impl TryFrom<DictionaryFile> for Dictionary {
    type Error = DictionaryError;

    fn try_from(file: DictionaryFile) -> Result<Self, Self::Error> {
        let codes = match (file.codes.is_empty(), file.bits.is_empty()) {
            (false, false) => return Err(DictionaryError::AmbiguousCodes),
            (true, false) => pack_bit_rows(&file.bits, file.marker_size)?,
            _ => file.codes,
        };
        Dictionary::new(
            file.name.unwrap_or_else(|| "custom".to_string()),
            file.marker_size,
            file.max_correction_bits,
            codes,
        )
    }
}

fn pack_bit_rows(rows: &[Vec<u8>], marker_size: usize) -> Result<Vec<u64>, DictionaryError> {
    if marker_size == 0 || marker_size > MAX_MARKER_SIZE {
        return Err(DictionaryError::InvalidMarkerSize { marker_size });
    }
    let expected = marker_size * marker_size;
    rows.iter()
        .enumerate()
        .map(|(index, row)| {
            if row.len() != expected || row.iter().any(|&b| b > 1) {
                return Err(DictionaryError::InvalidBitRow {
                    index,
                    expected,
                    got: row.len(),
                });
            }
            Ok(row
                .iter()
                .enumerate()
                .fold(0u64, |code, (i, &b)| code | (u64::from(b) << i)))
        })
        .collect()
}

impl Dictionary {
    /// Validate and build a dictionary.
    pub fn new(
        name: impl Into<String>,
        marker_size: usize,
        max_correction_bits: u8,
        codes: Vec<u64>,
    ) -> Result<Self, DictionaryError> {
        if marker_size == 0 || marker_size > MAX_MARKER_SIZE {
            return Err(DictionaryError::InvalidMarkerSize { marker_size });
        }
        if codes.is_empty() {
            return Err(DictionaryError::EmptyCodes);
        }
        let bits = marker_size * marker_size;
        if bits < 64 {
            if let Some(index) = codes.iter().position(|&c| c >> bits != 0) {
                return Err(DictionaryError::CodeOutOfRange { index });
            }
        }
        Ok(Self {
            name: name.into(),
            marker_size,
            max_correction_bits,
            codes,
        })
    }

    /// Parse a dictionary from a JSON string.
    pub fn from_json_str(raw: &str) -> Result<Self, DictionaryError> {
        Ok(serde_json::from_str(raw)?)
    }

    /// Load a dictionary resource from disk.
    pub fn load_json(path: impl AsRef<Path>) -> Result<Self, DictionaryError> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path).map_err(|source| DictionaryError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let dict = Self::from_json_str(&raw)?;
        log::info!(
            "loaded dictionary '{}' from {}: {} markers, {}x{} bits, max correction {}",
            dict.name,
            path.display(),
            dict.codes.len(),
            dict.marker_size,
            dict.marker_size,
            dict.max_correction_bits
        );
        Ok(dict)
    }

    /// Human-readable name (for debugging/logging).
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Marker side length (number of inner bits per side).
    #[inline]
    pub fn marker_size(&self) -> usize {
        self.marker_size
    }

    /// Maximum error-correcting Hamming distance supported by the dictionary.
    #[inline]
    pub fn max_correction_bits(&self) -> u8 {
        self.max_correction_bits
    }

    #[inline]
    pub fn codes(&self) -> &[u64] {
        &self.codes
    }

    /// Total number of inner bits per marker.
    #[inline]
    pub fn bit_count(&self) -> usize {
        self.marker_size * self.marker_size
    }
}
