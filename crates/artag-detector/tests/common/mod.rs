#![allow(dead_code)]

use artag_aruco::{Dictionary, MarkerDetection};
use nalgebra::Point2;
use std::path::Path;

/// Ten 5x5 codes, pairwise at least 6 bits apart under every rotation.
pub const CODES: [u64; 10] = [
    0x0a5_cd68, 0x1e5_4e9b, 0x04d_3c1a, 0x0ca_264e, 0x018_b8ff, 0x025_165e, 0x1a4_7e10, 0x112_5f20,
    0x030_31d0, 0x0bb_3b93,
];

pub fn dictionary() -> Dictionary {
    Dictionary::new("test10", 5, 3, CODES.to_vec()).expect("dictionary")
}

/// Write the test dictionary as a JSON resource and return its path.
pub fn write_dictionary(dir: &Path) -> std::path::PathBuf {
    let path = dir.join("dict.json");
    let json = serde_json::to_string_pretty(&dictionary()).expect("serialize");
    std::fs::write(&path, json).expect("write dictionary");
    path
}

/// RGBA canvas filled with a light gray.
pub struct Canvas {
    pub width: usize,
    pub height: usize,
    pub rgba: Vec<u8>,
    pub depth: Vec<f32>,
}

impl Canvas {
    pub fn new(width: usize, height: usize, depth: f32) -> Self {
        let mut rgba = Vec::with_capacity(width * height * 4);
        for _ in 0..width * height {
            rgba.extend_from_slice(&[220, 220, 220, 255]);
        }
        Self {
            width,
            height,
            rgba,
            depth: vec![depth; width * height],
        }
    }

    fn paint(&mut self, x: usize, y: usize, v: u8) {
        let idx = (y * self.width + x) * 4;
        self.rgba[idx..idx + 3].copy_from_slice(&[v, v, v]);
    }

    /// Draw dictionary marker `id` (2-cell black border) centered at `center`.
    pub fn draw_marker(&mut self, id: usize, center: (usize, usize), cell: usize) {
        let cells = 9;
        let x0 = center.0 - cells * cell / 2;
        let y0 = center.1 - cells * cell / 2;
        let code = CODES[id];
        for cy in 0..cells {
            for cx in 0..cells {
                let inner = (2..7).contains(&cx) && (2..7).contains(&cy);
                let black = !inner || (code >> ((cy - 2) * 5 + (cx - 2))) & 1 == 1;
                if !black {
                    continue;
                }
                for y in 0..cell {
                    for x in 0..cell {
                        self.paint(x0 + cx * cell + x, y0 + cy * cell + y, 0);
                    }
                }
            }
        }
    }

    pub fn set_depth_columns(&mut self, xs: std::ops::Range<usize>, depth: f32) {
        for y in 0..self.height {
            for x in xs.clone() {
                self.depth[y * self.width + x] = depth;
            }
        }
    }
}

/// A synthetic accepted detection: a 20 px square around `(cx, cy)`.
pub fn detection(id: u32, cx: f32, cy: f32) -> MarkerDetection {
    let h = 10.0;
    MarkerDetection {
        id,
        corners: [
            Point2::new(cx - h, cy - h),
            Point2::new(cx + h, cy - h),
            Point2::new(cx + h, cy + h),
            Point2::new(cx - h, cy + h),
        ],
        rotation: 0,
        hamming: 0,
        border_score: 1.0,
        code: CODES[id as usize % CODES.len()],
    }
}
