// THEORY:
// The vectorized engine computes the same sliding-window threshold as
// `ScalarEngine`, but turns the loop inside out: instead of one pixel visiting
// every neighbor, a batch of horizontally adjacent pixels visits every neighbor
// offset together, and each offset adds one shifted vector of samples to a set
// of running accumulators.
//
// Key architectural principles & algorithm steps:
// 1.  **Zero-Padded Rows**: Each luma row is copied once into a buffer with `r` zero
//     samples on either side. A shifted load then reads zeros for out-of-bounds
//     columns, so no lane ever branches on its own position.
// 2.  **Whole-Batch Row Skip**: A neighbor row outside the raster is skipped for the
//     entire batch. It contributes zero, exactly like a padded column.
// 3.  **Nominal Divisor**: Every lane divides by the full window area `(2r + 1)^2`,
//     regardless of how many neighbors were really inside the raster. Near the
//     borders this differs from the clamped window of the scalar engine; away from
//     them (distance > r) the two engines agree exactly.
// 4.  **Configurable Batch**: The batch width is any positive multiple of `LANES`. The
//     trailing `width mod batch` pixels of each row go through the scalar engine.

use multiversion::multiversion;
use wide::i32x8;

use crate::core_modules::adaptive::{AdaptiveEngine, NeighborhoodParams, ScalarEngine, WindowSum, label_for};
use crate::core_modules::pixel::pixel::LumaSample;
use crate::core_modules::raster::raster::{BACKGROUND, Classification, Label, LumaRaster};
use crate::error::{BinarizeError, Result};

/// Lanes in one vector accumulator.
pub const LANES: usize = 8;

pub const DEFAULT_BATCH_WIDTH: usize = 16;

/// Luma rows widened to `i32` with `radius` zero columns on both sides.
struct PaddedLuma {
    samples: Vec<WindowSum>,
    stride: usize,
    radius: usize,
    height: usize,
}

impl PaddedLuma {
    fn new(luma: &LumaRaster, radius: usize) -> Self {
        let width = luma.width() as usize;
        let stride = width + 2 * radius;
        let mut samples = vec![0; stride * luma.height() as usize];
        for (y, padded_row) in samples.chunks_exact_mut(stride).enumerate() {
            let src = luma.row(y as u32);
            for (dst, &sample) in padded_row[radius..radius + width].iter_mut().zip(src) {
                *dst = sample as WindowSum;
            }
        }
        Self {
            samples,
            stride,
            radius,
            height: luma.height() as usize,
        }
    }

    fn row(&self, y: usize) -> &[WindowSum] {
        &self.samples[y * self.stride..(y + 1) * self.stride]
    }
}

/// Adds the `side` horizontally shifted loads of one padded row into `sums`.
/// `x` is the batch start in raster columns, which is also the padded index
/// of its leftmost neighbor.
#[multiversion(targets(
    "x86_64+avx2+bmi1+bmi2+popcnt+lzcnt",
    "x86_64+sse4.1",
    "aarch64+neon"
))]
fn accumulate_row(padded_row: &[WindowSum], x: usize, side: usize, sums: &mut [i32x8]) {
    for dx in 0..side {
        let shifted = &padded_row[x + dx..];
        for (group, sum) in sums.iter_mut().enumerate() {
            let mut lanes = [0; LANES];
            lanes.copy_from_slice(&shifted[group * LANES..(group + 1) * LANES]);
            *sum = *sum + i32x8::from(lanes);
        }
    }
}

/// The batched engine. See the module notes for how it treats raster borders.
#[derive(Debug, Clone, Copy)]
pub struct VectorizedEngine {
    batch_width: usize,
}

impl VectorizedEngine {
    pub fn new(batch_width: usize) -> Result<Self> {
        if batch_width == 0 || batch_width % LANES != 0 {
            return Err(BinarizeError::InvalidBatchWidth(batch_width));
        }
        Ok(Self { batch_width })
    }

    pub fn batch_width(&self) -> usize {
        self.batch_width
    }

    /// Number of leading pixels per row handled by full batches.
    pub fn vectorized_span(&self, width: u32) -> u32 {
        (width as usize / self.batch_width * self.batch_width) as u32
    }

    /// Labels the batch starting at column `x` of row `y` into `out`.
    fn classify_batch(
        padded: &PaddedLuma,
        params: &NeighborhoodParams,
        (x, y): (usize, usize),
        sums: &mut [i32x8],
        out: &mut [Label],
    ) {
        let r = padded.radius;
        let side = params.side() as usize;

        sums.fill(i32x8::splat(0));

        // Rows outside the raster stay zero for the whole batch.
        let y_start = y.saturating_sub(r);
        let y_end = (y + r).min(padded.height - 1);
        for ny in y_start..=y_end {
            accumulate_row(padded.row(ny), x, side, sums);
        }

        let area = params.area();
        let offset = params.offset();
        let centers = &padded.row(y)[r + x..];
        for (group, sum) in sums.iter().enumerate() {
            for (lane, lane_sum) in sum.to_array().into_iter().enumerate() {
                let i = group * LANES + lane;
                let threshold = lane_sum / area - offset;
                out[i] = label_for(centers[i] as LumaSample, threshold);
            }
        }
    }
}

impl Default for VectorizedEngine {
    fn default() -> Self {
        Self {
            batch_width: DEFAULT_BATCH_WIDTH,
        }
    }
}

impl AdaptiveEngine for VectorizedEngine {
    fn name(&self) -> &'static str {
        "SIMD"
    }

    fn classify(&self, luma: &LumaRaster, params: &NeighborhoodParams) -> Classification {
        let (width, height) = (luma.width(), luma.height());
        let mut labels = vec![BACKGROUND; width as usize * height as usize];

        let padded = PaddedLuma::new(luma, params.radius() as usize);
        let mut sums = vec![i32x8::splat(0); self.batch_width / LANES];
        let span = self.vectorized_span(width);

        for (y, out_row) in labels.chunks_exact_mut(width as usize).enumerate() {
            let (batched, tail) = out_row.split_at_mut(span as usize);
            for (batch, out) in batched.chunks_exact_mut(self.batch_width).enumerate() {
                let x = batch * self.batch_width;
                Self::classify_batch(&padded, params, (x, y), &mut sums, out);
            }
            ScalarEngine::classify_span(luma, params, y as u32, span..width, tail);
        }

        Classification::from_labels(width, height, labels)
    }
}
