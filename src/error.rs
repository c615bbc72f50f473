use std::path::PathBuf;

use thiserror::Error;

/// Errors raised by the binarization engine and its raster I/O.
#[derive(Debug, Error)]
pub enum BinarizeError {
    #[error("Raster has zero area ({width}x{height})")]
    EmptyRaster { width: u32, height: u32 },

    #[error("Buffer of {actual} samples does not match {width}x{height}x{channels} = {expected}")]
    BufferLength {
        width: u32,
        height: u32,
        channels: usize,
        expected: usize,
        actual: usize,
    },

    #[error("Luma sample {value} at index {index} exceeds {max}", max = crate::core_modules::pixel::pixel::MAX_LUMA)]
    SampleOutOfRange { index: usize, value: u16 },

    #[error("Raster dimensions differ: {left_width}x{left_height} vs {right_width}x{right_height}")]
    DimensionMismatch {
        left_width: u32,
        left_height: u32,
        right_width: u32,
        right_height: u32,
    },

    #[error("Batch width {0} must be a positive multiple of {lanes}", lanes = crate::core_modules::adaptive_simd::LANES)]
    InvalidBatchWidth(usize),

    #[error("Region radius {0} overflows the window accumulator")]
    RadiusTooLarge(u32),

    #[error("Failed to read raster '{path}': {source}")]
    Read {
        path: PathBuf,
        source: image::ImageError,
    },

    #[error("Failed to write raster '{path}': {source}")]
    Write {
        path: PathBuf,
        source: image::ImageError,
    },
}

pub type Result<T> = std::result::Result<T, BinarizeError>;
