//! Otsu thresholding over 8-bit samples.
//!
//! Both candidate extraction (whole frame) and bit decoding (cell means of one
//! quad) split intensities with the same rule: the dark class is `<= t`.

/// 256-bin intensity histogram with the observed range.
struct Histogram {
    bins: [u32; 256],
    count: usize,
    lo: u8,
    hi: u8,
}

impl Histogram {
    fn from_samples(samples: &[u8]) -> Self {
        let mut bins = [0u32; 256];
        let (mut lo, mut hi) = (u8::MAX, u8::MIN);
        for &v in samples {
            bins[usize::from(v)] += 1;
            lo = lo.min(v);
            hi = hi.max(v);
        }
        Self {
            bins,
            count: samples.len(),
            lo,
            hi,
        }
    }

    fn occupied_bins(&self) -> usize {
        self.bins.iter().filter(|&&n| n > 0).count()
    }

    /// Level maximizing the between-class variance. Ties keep the lowest level.
    fn otsu_level(&self) -> u8 {
        let total = self.count as f64;
        let weighted: f64 = self
            .bins
            .iter()
            .enumerate()
            .map(|(v, &n)| v as f64 * f64::from(n))
            .sum();

        let mut dark_n = 0f64;
        let mut dark_sum = 0f64;
        let mut best_var = f64::NEG_INFINITY;
        let mut best_level = 127u8;
        for (v, &n) in self.bins.iter().enumerate() {
            dark_n += f64::from(n);
            dark_sum += v as f64 * f64::from(n);
            if dark_n < 1.0 {
                continue;
            }
            let light_n = total - dark_n;
            if light_n < 1.0 {
                break;
            }
            let diff = dark_sum / dark_n - (weighted - dark_sum) / light_n;
            let var = dark_n * light_n * diff * diff;
            if var > best_var {
                best_var = var;
                best_level = v as u8;
            }
        }
        best_level
    }
}

/// Otsu threshold of `samples`; samples `<=` the result form the dark class.
///
/// Degenerate inputs: no samples gives 127, a single level gives that level
/// and two levels split at their midpoint.
pub(crate) fn otsu_threshold(samples: &[u8]) -> u8 {
    if samples.is_empty() {
        return 127;
    }
    let hist = Histogram::from_samples(samples);
    if hist.lo == hist.hi {
        return hist.lo;
    }
    if hist.occupied_bins() <= 2 {
        return ((u16::from(hist.lo) + u16::from(hist.hi)) / 2) as u8;
    }
    hist.otsu_level()
}

/// Intensity range `max - min` of the samples.
pub(crate) fn contrast(samples: &[u8]) -> u8 {
    let (lo, hi) = samples
        .iter()
        .fold((u8::MAX, u8::MIN), |(lo, hi), &v| (lo.min(v), hi.max(v)));
    hi.saturating_sub(lo)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn degenerate_inputs() {
        assert_eq!(otsu_threshold(&[]), 127);
        assert_eq!(otsu_threshold(&[90u8; 5]), 90);
        assert_eq!(otsu_threshold(&[0u8, 0, 255, 255, 255]), 127);
        assert_eq!(otsu_threshold(&[20u8, 100]), 60);
    }

    #[test]
    fn middle_level_joins_the_closer_class() {
        let mut samples = vec![0u8; 40];
        samples.extend(std::iter::repeat(60u8).take(5));
        samples.extend(std::iter::repeat(255u8).take(55));
        let t = otsu_threshold(&samples);
        assert!((60..255).contains(&t), "threshold {t}");
        assert_eq!(samples.iter().filter(|&&v| v <= t).count(), 45);
    }

    #[test]
    fn noisy_bimodal_samples_split_between_modes() {
        let samples: Vec<u8> = (0..200)
            .map(|i| if i % 2 == 0 { 30 + (i % 7) as u8 } else { 200 + (i % 11) as u8 })
            .collect();
        let t = otsu_threshold(&samples);
        assert!((36..200).contains(&t), "threshold {t}");
    }

    #[test]
    fn contrast_of_flat_samples_is_zero() {
        assert_eq!(contrast(&[42u8; 8]), 0);
        assert_eq!(contrast(&[10u8, 200, 30]), 190);
        assert_eq!(contrast(&[]), 0);
    }
}
