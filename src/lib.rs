// THEORY:
// This file is the main entry point for the `binarize` library crate. It exports
// the `BinarizationPipeline` and its configuration as the high-level interface,
// while the individual stages (`core_modules`) stay available for callers that
// want a single algorithm: the grayscale converter, Otsu's global threshold, and
// the scalar and vectorized adaptive threshold engines.

pub mod core_modules;
pub mod error;
pub mod logging;
pub mod pipeline;

pub use core_modules::adaptive::{AdaptiveEngine, NeighborhoodParams, ScalarEngine};
pub use core_modules::adaptive_simd::VectorizedEngine;
pub use core_modules::otsu::OtsuSource;
pub use core_modules::raster::raster::{BACKGROUND, Classification, FOREGROUND, Label, LumaRaster, RgbRaster};
pub use error::BinarizeError;
pub use pipeline::{Algorithm, BinarizationPipeline, OutputMode, PipelineConfig, PipelineError, PipelineReport, Stage};
