// THEORY:
// The Global Threshold Selector implements Otsu's method. It looks at the whole
// intensity histogram once, picks the single cutoff `T` that maximizes the
// between-class variance, and classifies every pixel against it.
//
// Key architectural principles & algorithm steps:
// 1.  **Histogram First**: Pixel intensities are binned into 256 counts. Every candidate
//     is then scored from the bins alone. Bin sums are exact integers in `f64`, so the
//     class means (and therefore the winner) match a full per-pixel rescan.
// 2.  **Exhaustive Search**: All `T` in `0..=255` are scored. A candidate whose
//     foreground (`>= T`) or background (`< T`) class is empty is skipped.
// 3.  **First Wins**: Only a strictly larger variance replaces the current best, so
//     ties keep the smaller `T`.
// 4.  **Label Polarity**: Pixels with intensity `< T` are labeled `1`, all others `0`.
//     The raster sink draws label `1` black.
// 5.  **Raw Intensity**: By default the selector reads the red channel of the decoded
//     raster, not the converted luma. `OtsuSource::Luma` opts into luma instead.

use crate::core_modules::pixel::pixel::Channel;
use crate::core_modules::raster::raster::{
    BACKGROUND, Classification, FOREGROUND, Label, LumaRaster, RgbRaster,
};

const LEVELS: usize = 256;

pub type Histogram = [u64; LEVELS];
pub type Threshold = u8;
pub type Variance = f64;

/// Which precursor buffer the selector reads intensities from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OtsuSource {
    /// Raw red-channel intensity of the decoded raster.
    #[default]
    RedChannel,
    /// Luma from the grayscale converter.
    Luma,
}

/// The outcome of a threshold search.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OtsuSelection {
    /// The selected cutoff. `0` when no candidate produced two non-empty classes.
    pub threshold: Threshold,
    /// Between-class variance at `threshold`, or `None` if every candidate was skipped.
    pub variance: Option<Variance>,
}

pub fn histogram<I>(intensities: I) -> Histogram
where
    I: IntoIterator<Item = Channel>,
{
    let mut bins = [0u64; LEVELS];
    for intensity in intensities {
        bins[intensity as usize] += 1;
    }
    bins
}

/// Scores every candidate threshold and returns the first one with maximal
/// between-class variance.
pub fn select_threshold(bins: &Histogram) -> OtsuSelection {
    let total: u64 = bins.iter().sum();
    let weighted_total: u64 = bins
        .iter()
        .enumerate()
        .map(|(level, &count)| level as u64 * count)
        .sum();

    let mut best = OtsuSelection {
        threshold: 0,
        variance: None,
    };
    let mut max_sigma: Variance = -1.0;

    // Running sums of the background class (< T).
    let mut count_back = 0u64;
    let mut sum_back = 0u64;

    for t in 0..LEVELS {
        if t > 0 {
            count_back += bins[t - 1];
            sum_back += (t as u64 - 1) * bins[t - 1];
        }
        let count_fore = total - count_back;
        let sum_fore = weighted_total - sum_back;

        if count_fore == 0 || count_back == 0 {
            continue;
        }

        let mean_fore = sum_fore as f64 / count_fore as f64;
        let mean_back = sum_back as f64 / count_back as f64;
        let weight_fore = count_fore as f64 / total as f64;
        let weight_back = count_back as f64 / total as f64;
        let sigma = weight_fore * weight_back * (mean_fore - mean_back) * (mean_fore - mean_back);

        if sigma > max_sigma {
            max_sigma = sigma;
            best = OtsuSelection {
                threshold: t as Threshold,
                variance: Some(sigma),
            };
        }
    }

    best
}

/// Labels `1` every intensity strictly below `threshold`, `0` otherwise.
pub fn classify<I>(width: u32, height: u32, intensities: I, threshold: Threshold) -> Classification
where
    I: IntoIterator<Item = Channel>,
{
    let labels: Vec<Label> = intensities
        .into_iter()
        .map(|intensity| if intensity < threshold { FOREGROUND } else { BACKGROUND })
        .collect();
    Classification::from_labels(width, height, labels)
}

/// Runs the full selector on the decoded raster (and its luma when requested).
pub fn binarize(
    raster: &RgbRaster,
    luma: &LumaRaster,
    source: OtsuSource,
) -> (OtsuSelection, Classification) {
    let (width, height) = (raster.width(), raster.height());
    match source {
        OtsuSource::RedChannel => {
            let reds = || raster.pixels().iter().map(|pixel| pixel.red);
            let selection = select_threshold(&histogram(reds()));
            let classification = classify(width, height, reds(), selection.threshold);
            (selection, classification)
        }
        OtsuSource::Luma => {
            let samples = || luma.samples().iter().map(|&sample| sample as Channel);
            let selection = select_threshold(&histogram(samples()));
            let classification = classify(luma.width(), luma.height(), samples(), selection.threshold);
            (selection, classification)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core_modules::grayscale::to_luma;
    use crate::core_modules::pixel::pixel::Pixel;

    /// The direct O(256 * N) rescan, used to cross-check the histogram search.
    fn rescan(intensities: &[Channel]) -> Threshold {
        let n = intensities.len() as f64;
        let mut max_sigma = -1.0;
        let mut final_t = 0;
        for t in 0..=255u16 {
            let (mut cnt_fore, mut cnt_back) = (0u32, 0u32);
            let (mut sum_fore, mut sum_back) = (0.0f64, 0.0f64);
            for &v in intensities {
                if v as u16 >= t {
                    cnt_fore += 1;
                    sum_fore += v as f64;
                } else {
                    cnt_back += 1;
                    sum_back += v as f64;
                }
            }
            if cnt_fore == 0 || cnt_back == 0 {
                continue;
            }
            let uf = sum_fore / cnt_fore as f64;
            let ub = sum_back / cnt_back as f64;
            let sigma = (cnt_fore as f64 / n) * (cnt_back as f64 / n) * (uf - ub) * (uf - ub);
            if sigma > max_sigma {
                max_sigma = sigma;
                final_t = t as Threshold;
            }
        }
        final_t
    }

    #[test]
    fn separates_two_intensities() {
        for (low, high) in [(40u8, 180u8), (0, 255), (0, 1), (127, 128), (254, 255), (10, 12)] {
            let mut values = vec![low; 30];
            values.extend(std::iter::repeat_n(high, 10));
            let selection = select_threshold(&histogram(values.iter().copied()));

            assert!(selection.threshold > low && selection.threshold <= high);
            // Every candidate in (low, high] scores the same; the first one wins.
            assert_eq!(selection.threshold, low + 1, "pair ({low}, {high})");

            let classification = classify(8, 5, values.iter().copied(), selection.threshold);
            for (value, label) in values.iter().zip(classification.labels()) {
                let expected = if *value == low { FOREGROUND } else { BACKGROUND };
                assert_eq!(*label, expected, "pair ({low}, {high})");
            }
        }
    }

    #[test]
    fn constant_input_skips_every_candidate() {
        let selection = select_threshold(&histogram(std::iter::repeat_n(77u8, 16)));
        assert_eq!(selection.threshold, 0);
        assert_eq!(selection.variance, None);

        let classification = classify(4, 4, std::iter::repeat_n(77u8, 16), selection.threshold);
        assert_eq!(classification.foreground_count(), 0);
    }

    #[test]
    fn matches_direct_rescan() {
        let values: Vec<Channel> = (0..4096u32)
            .map(|i| (i.wrapping_mul(2654435761) >> 24) as u8 / 3 + if i % 5 == 0 { 150 } else { 0 })
            .collect();
        let selection = select_threshold(&histogram(values.iter().copied()));
        assert_eq!(selection.threshold, rescan(&values));
    }

    #[test]
    fn red_channel_source_ignores_green_and_blue() {
        // Red splits the image in half; green/blue would give a different luma split.
        let pixels: Vec<Pixel> = (0..16)
            .map(|i| if i < 8 { Pixel::new(20, 250, 250) } else { Pixel::new(220, 0, 0) })
            .collect();
        let raster = RgbRaster::new(4, 4, pixels).unwrap();
        let luma = to_luma(&raster);

        let (selection, classification) = binarize(&raster, &luma, OtsuSource::RedChannel);
        assert_eq!(selection.threshold, 21);
        assert_eq!(&classification.labels()[..8], &[FOREGROUND; 8]);
        assert_eq!(&classification.labels()[8..], &[BACKGROUND; 8]);
    }

    #[test]
    fn repeated_runs_are_identical() {
        let pixels: Vec<Pixel> = (0..100u32).map(|i| Pixel::splat((i * 37 % 256) as u8)).collect();
        let raster = RgbRaster::new(10, 10, pixels).unwrap();
        let luma = to_luma(&raster);
        let first = binarize(&raster, &luma, OtsuSource::Luma);
        let second = binarize(&raster, &luma, OtsuSource::Luma);
        assert_eq!(first, second);
    }
}
