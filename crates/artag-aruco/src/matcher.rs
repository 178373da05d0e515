//! Hamming matching of observed codes against a dictionary in all four rotations.

use crate::Dictionary;

/// A dictionary match for an observed marker code.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Match {
    pub id: u32,
    /// Quarter turns such that `observed ≈ rotate_code_u64(code, n, rotation)`.
    pub rotation: u8,
    /// Bit errors against the rotated dictionary code.
    pub hamming: u8,
}

/// Matcher owning its dictionary, with every rotation precomputed.
#[derive(Clone, Debug)]
pub struct Matcher {
    dict: Dictionary,
    max_hamming: u8,
    /// `rotations[id][r]` is code `id` turned by `r` quarter turns.
    rotations: Vec<[u64; 4]>,
}

impl Matcher {
    pub fn new(dict: Dictionary, max_hamming: u8) -> Self {
        let n = dict.marker_size();
        let rotations = dict
            .codes()
            .iter()
            .map(|&code| std::array::from_fn(|r| rotate_code_u64(code, n, r as u8)))
            .collect();
        Self {
            dict,
            max_hamming,
            rotations,
        }
    }

    #[inline]
    pub fn dictionary(&self) -> &Dictionary {
        &self.dict
    }

    /// Largest accepted Hamming distance.
    #[inline]
    pub fn max_hamming(&self) -> u8 {
        self.max_hamming
    }

    /// Closest dictionary code within `max_hamming`.
    ///
    /// Returns `None` when nothing is close enough, or when two different ids
    /// are equally close. Among rotations of one id the lowest rotation wins.
    pub fn match_code(&self, observed: u64) -> Option<Match> {
        let mut best: Option<Match> = None;
        let mut ambiguous = false;

        for (id, rots) in self.rotations.iter().enumerate() {
            for (rotation, &code) in rots.iter().enumerate() {
                let hamming = (observed ^ code).count_ones();
                if hamming > u32::from(self.max_hamming) {
                    continue;
                }
                let cand = Match {
                    id: id as u32,
                    rotation: rotation as u8,
                    hamming: hamming as u8,
                };
                match best {
                    Some(prev) if cand.hamming > prev.hamming => {}
                    Some(prev) if cand.hamming == prev.hamming => {
                        ambiguous |= prev.id != cand.id;
                    }
                    _ => {
                        best = Some(cand);
                        ambiguous = false;
                    }
                }
            }
        }

        if ambiguous {
            log::trace!("code {observed:#x} is equally close to several ids");
            return None;
        }
        best
    }
}

/// Rotate a row-major bit grid (`idx = y * n + x`) by `rot` quarter turns.
pub fn rotate_code_u64(code: u64, n: usize, rot: u8) -> u64 {
    (0..rot & 3).fold(code, |c, _| quarter_turn(c, n))
}

fn quarter_turn(code: u64, n: usize) -> u64 {
    let mut out = 0u64;
    for y in 0..n {
        for x in 0..n {
            let src = (n - 1 - x) * n + y;
            out |= ((code >> src) & 1) << (y * n + x);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dict5() -> Dictionary {
        Dictionary::new("t5", 5, 3, vec![0x0123_4567, 0x00ab_cdef & 0x1ff_ffff]).expect("dict")
    }

    #[test]
    fn four_quarter_turns_restore_the_code() {
        let code = 0x1a4_7e10;
        assert_eq!(rotate_code_u64(code, 5, 4), code);
        assert_eq!(rotate_code_u64(rotate_code_u64(code, 5, 1), 5, 3), code);
        assert_ne!(rotate_code_u64(code, 5, 1), code);
    }

    #[test]
    fn quarter_turn_moves_top_left_bit_to_top_right() {
        // 3x3 grid with only (x=0, y=0) set.
        assert_eq!(rotate_code_u64(0b1, 3, 1), 0b100);
        assert_eq!(rotate_code_u64(0b1, 3, 2), 1 << 8);
    }

    #[test]
    fn finds_rotated_code() {
        let dict = dict5();
        let observed = rotate_code_u64(dict.codes()[0], 5, 1);
        let m = Matcher::new(dict, 0).match_code(observed).expect("match");
        assert_eq!(
            m,
            Match {
                id: 0,
                rotation: 1,
                hamming: 0
            }
        );
    }

    #[test]
    fn respects_hamming_budget() {
        let dict = dict5();
        let observed = dict.codes()[1] ^ 0b101;
        assert!(Matcher::new(dict.clone(), 1).match_code(observed).is_none());

        let m = Matcher::new(dict, 2).match_code(observed).expect("match");
        assert_eq!((m.id, m.rotation, m.hamming), (1, 0, 2));
    }

    #[test]
    fn equally_close_ids_are_rejected() {
        let dict = Dictionary::new("t3", 3, 1, vec![0b011, 0b110]).expect("dict");
        let matcher = Matcher::new(dict, 1);
        assert!(matcher.match_code(0b010).is_none());
        assert_eq!(matcher.match_code(0b011).map(|m| m.id), Some(0));
    }

    #[test]
    fn symmetric_code_keeps_lowest_rotation() {
        let dict = Dictionary::new("t3", 3, 0, vec![1 << 4]).expect("dict");
        let m = Matcher::new(dict, 0).match_code(1 << 4).expect("match");
        assert_eq!((m.id, m.rotation), (0, 0));
    }
}
