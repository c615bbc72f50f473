// THEORY:
// The adaptive threshold engines replace Otsu's single global cutoff with a
// per-pixel one: each pixel is compared against the mean of its own square
// neighborhood, lowered by a bias offset.
//
// Key architectural principles:
// 1.  **Clamped Window**: The scalar engine sums only the neighbors that lie inside
//     the raster and divides by how many it found. Nothing is padded.
// 2.  **Independent Pixels**: Every pixel re-sums its own window. No running sums are
//     carried between pixels, so any pixel can be checked in isolation.
// 3.  **Pluggable Engines**: `AdaptiveEngine` is the seam between the scalar reference
//     and the vectorized engine in `adaptive_simd`. The timing harness and the pipeline
//     only ever see the trait.

use crate::core_modules::pixel::pixel::LumaSample;
use crate::core_modules::raster::raster::{BACKGROUND, Classification, FOREGROUND, Label, LumaRaster};
use crate::error::{BinarizeError, Result};

pub type Radius = u32;
pub type Offset = i32;
/// Window sums and local thresholds are carried in 32 bits on both engines.
pub type WindowSum = i32;

const MAX_SAMPLE: i64 = 255;

/// Region radius `r` and bias offset `o` of one adaptive threshold call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NeighborhoodParams {
    radius: Radius,
    offset: Offset,
}

impl NeighborhoodParams {
    /// Fails if a full window of 8-bit samples could overflow a `WindowSum`.
    pub fn new(radius: Radius, offset: Offset) -> Result<Self> {
        let side = 2 * radius as i64 + 1;
        if side * side * MAX_SAMPLE > WindowSum::MAX as i64 {
            return Err(BinarizeError::RadiusTooLarge(radius));
        }
        Ok(Self { radius, offset })
    }

    pub fn radius(&self) -> Radius {
        self.radius
    }

    pub fn offset(&self) -> Offset {
        self.offset
    }

    /// Side length `2r + 1` of the square window.
    pub fn side(&self) -> u32 {
        2 * self.radius + 1
    }

    /// Nominal window area `(2r + 1)^2`.
    pub fn area(&self) -> WindowSum {
        (self.side() * self.side()) as WindowSum
    }
}

impl Default for NeighborhoodParams {
    fn default() -> Self {
        Self {
            radius: 4,
            offset: 10,
        }
    }
}

/// A local-threshold classifier over a luma raster.
pub trait AdaptiveEngine {
    /// Short human-readable name used in timing reports.
    fn name(&self) -> &'static str;

    fn classify(&self, luma: &LumaRaster, params: &NeighborhoodParams) -> Classification;
}

#[inline]
pub(crate) fn label_for(sample: LumaSample, local_threshold: WindowSum) -> Label {
    if (sample as WindowSum) < local_threshold {
        FOREGROUND
    } else {
        BACKGROUND
    }
}

/// Local threshold of pixel `(x, y)` using the clamped window.
pub(crate) fn clamped_threshold(luma: &LumaRaster, x: u32, y: u32, params: &NeighborhoodParams) -> WindowSum {
    let r = params.radius();
    let y_start = y.saturating_sub(r);
    let y_end = (y + r).min(luma.height() - 1);
    let x_start = x.saturating_sub(r);
    let x_end = (x + r).min(luma.width() - 1);

    let mut sum: WindowSum = 0;
    for ny in y_start..=y_end {
        let row = luma.row(ny);
        for &sample in &row[x_start as usize..=x_end as usize] {
            sum += sample as WindowSum;
        }
    }
    let count = ((y_end - y_start + 1) * (x_end - x_start + 1)) as WindowSum;
    sum / count - params.offset()
}

/// The reference engine: one clamped-window sum per pixel.
#[derive(Debug, Clone, Copy, Default)]
pub struct ScalarEngine;

impl ScalarEngine {
    pub fn new() -> Self {
        Self
    }

    /// Classifies the pixels `x_range` of row `y` into `out`.
    pub(crate) fn classify_span(
        luma: &LumaRaster,
        params: &NeighborhoodParams,
        y: u32,
        x_range: std::ops::Range<u32>,
        out: &mut [Label],
    ) {
        let row = luma.row(y);
        for (x, label) in x_range.zip(out.iter_mut()) {
            let threshold = clamped_threshold(luma, x, y, params);
            *label = label_for(row[x as usize], threshold);
        }
    }
}

impl AdaptiveEngine for ScalarEngine {
    fn name(&self) -> &'static str {
        "Scalar"
    }

    fn classify(&self, luma: &LumaRaster, params: &NeighborhoodParams) -> Classification {
        let (width, height) = (luma.width(), luma.height());
        let mut labels = vec![BACKGROUND; width as usize * height as usize];

        for (y, out_row) in labels.chunks_exact_mut(width as usize).enumerate() {
            Self::classify_span(luma, params, y as u32, 0..width, out_row);
        }

        Classification::from_labels(width, height, labels)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raster(width: u32, height: u32, samples: &[LumaSample]) -> LumaRaster {
        LumaRaster::new(width, height, samples.to_vec()).unwrap()
    }

    #[test]
    fn bright_center_on_dark_field() {
        #[rustfmt::skip]
        let luma = raster(3, 3, &[
            10, 10, 10,
            10, 200, 10,
            10, 10, 10,
        ]);
        let params = NeighborhoodParams::new(1, 5).unwrap();

        // Center: (8 * 10 + 200) / 9 = 31, minus 5 = 26.
        assert_eq!(clamped_threshold(&luma, 1, 1, &params), 26);
        // Corner: 2x2 window (10 + 10 + 10 + 200) / 4 = 57, minus 5 = 52.
        assert_eq!(clamped_threshold(&luma, 0, 0, &params), 52);
        // Edge: 3x2 window (5 * 10 + 200) / 6 = 41, minus 5 = 36.
        assert_eq!(clamped_threshold(&luma, 1, 0, &params), 36);
        assert_eq!(clamped_threshold(&luma, 0, 1, &params), 36);

        let classification = ScalarEngine.classify(&luma, &params);
        #[rustfmt::skip]
        let expected = vec![
            FOREGROUND, FOREGROUND, FOREGROUND,
            FOREGROUND, BACKGROUND, FOREGROUND,
            FOREGROUND, FOREGROUND, FOREGROUND,
        ];
        assert_eq!(classification.labels(), expected.as_slice());
    }

    #[test]
    fn constant_raster_gives_one_uniform_label() {
        let luma = raster(7, 5, &[120; 35]);

        // Mean minus a positive offset sits below every sample.
        let params = NeighborhoodParams::new(2, 3).unwrap();
        let classification = ScalarEngine.classify(&luma, &params);
        assert!(classification.labels().iter().all(|&label| label == BACKGROUND));

        // A negative offset lifts the threshold above every sample.
        let params = NeighborhoodParams::new(2, -3).unwrap();
        assert_eq!(ScalarEngine.classify(&luma, &params).foreground_count(), 35);
    }

    #[test]
    fn zero_radius_compares_each_pixel_with_itself() {
        let luma = raster(4, 1, &[0, 50, 100, 255]);
        let params = NeighborhoodParams::new(0, -1).unwrap();
        // threshold = sample + 1, so every sample is below its own threshold.
        assert_eq!(ScalarEngine.classify(&luma, &params).foreground_count(), 4);

        let params = NeighborhoodParams::new(0, 0).unwrap();
        assert_eq!(ScalarEngine.classify(&luma, &params).foreground_count(), 0);
    }

    #[test]
    fn window_larger_than_raster_uses_every_pixel() {
        let luma = raster(2, 2, &[0, 40, 80, 120]);
        let params = NeighborhoodParams::new(5, 0).unwrap();
        // Every window covers the full raster: mean 60.
        let classification = ScalarEngine.classify(&luma, &params);
        assert_eq!(
            classification.labels(),
            &[FOREGROUND, FOREGROUND, BACKGROUND, BACKGROUND]
        );
    }

    #[test]
    fn rejects_radius_that_overflows_the_accumulator() {
        assert!(NeighborhoodParams::new(1000, 0).is_ok());
        assert!(matches!(
            NeighborhoodParams::new(2000, 0),
            Err(BinarizeError::RadiusTooLarge(2000))
        ));
    }

    #[test]
    fn repeated_runs_are_identical() {
        let samples: Vec<LumaSample> = (0..96u16).map(|i| (i * 53) % 256).collect();
        let luma = raster(12, 8, &samples);
        let params = NeighborhoodParams::default();
        assert_eq!(
            ScalarEngine.classify(&luma, &params),
            ScalarEngine.classify(&luma, &params)
        );
    }
}
