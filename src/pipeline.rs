// THEORY:
// The `pipeline` module is the top-level API of the binarization engine. It runs
// the fixed sequence read -> convert -> threshold -> write and packages every
// intermediate buffer into a single `PipelineReport`.
//
// Key architectural principles:
// 1.  **Stage Attribution**: Every failure is wrapped in a `PipelineError` naming the
//     stage it came from, so a caller sees "read stage failed: ..." rather than a
//     bare decoder error.
// 2.  **Shared Luma**: The luma raster is produced once and read by both adaptive
//     engines. Otsu reads the red channel of the decoded raster unless configured
//     to read luma.
// 3.  **Side-by-Side Timing**: Both adaptive engines always run with the same
//     parameters, and each run is wrapped by the timing harness.

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use thiserror::Error;
use tracing::{debug, info, warn};

use crate::core_modules::adaptive::{AdaptiveEngine, NeighborhoodParams, Offset, Radius, ScalarEngine};
use crate::core_modules::adaptive_simd::{DEFAULT_BATCH_WIDTH, VectorizedEngine};
use crate::core_modules::grayscale;
use crate::core_modules::otsu::{self, OtsuSelection, OtsuSource};
use crate::core_modules::raster::raster::{Classification, LumaRaster, RgbRaster};
use crate::core_modules::timing::{self, Timing};
use crate::core_modules::utils::image_helper::image_helper::{self, RasterOutput};
use crate::error::BinarizeError;

pub use crate::core_modules::timing::Milliseconds;

const ENV_REGION_RADIUS: &str = "BINARIZE_REGION_RADIUS";
const ENV_OFFSET: &str = "BINARIZE_OFFSET";
const ENV_BATCH_WIDTH: &str = "BINARIZE_BATCH_WIDTH";

/// Configuration for the BinarizationPipeline.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Neighborhood radius `r` of the adaptive window `(2r + 1) x (2r + 1)`.
    pub region_radius: Radius,
    /// Bias subtracted from the local mean.
    pub offset: Offset,
    /// Pixels per vectorized batch. Must be a positive multiple of 8.
    pub batch_width: usize,
    /// Which buffer Otsu's method reads.
    pub otsu_source: OtsuSource,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            region_radius: 4,
            offset: 10,
            batch_width: DEFAULT_BATCH_WIDTH,
            otsu_source: OtsuSource::RedChannel,
        }
    }
}

impl PipelineConfig {
    /// Defaults overlaid with `BINARIZE_*` environment variables.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Some(radius) = env_override(ENV_REGION_RADIUS) {
            config.region_radius = radius;
        }
        if let Some(offset) = env_override(ENV_OFFSET) {
            config.offset = offset;
        }
        if let Some(batch_width) = env_override(ENV_BATCH_WIDTH) {
            config.batch_width = batch_width;
        }
        config
    }
}

fn env_override<T: FromStr>(key: &str) -> Option<T> {
    let raw = std::env::var(key).ok()?;
    match raw.trim().parse() {
        Ok(value) => Some(value),
        Err(_) => {
            warn!("Ignoring {key}={raw:?}: not a valid value");
            None
        }
    }
}

/// The three classifiers the pipeline runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Algorithm {
    Otsu,
    AdaptiveScalar,
    AdaptiveVectorized,
}

/// What the sink should draw for one output file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    Color,
    Gray,
    Binary(Algorithm),
}

/// The step of the pipeline a failure came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Read,
    Convert,
    Threshold,
    Write,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Read => "read",
            Stage::Convert => "convert",
            Stage::Threshold => "threshold",
            Stage::Write => "write",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Error)]
#[error("{stage} stage failed: {source}")]
pub struct PipelineError {
    pub stage: Stage,
    #[source]
    pub source: BinarizeError,
}

impl PipelineError {
    fn at(stage: Stage) -> impl FnOnce(BinarizeError) -> Self {
        move |source| Self { stage, source }
    }
}

/// Every buffer and timing produced by one pipeline run.
#[derive(Debug, Clone)]
pub struct PipelineReport {
    pub raster: RgbRaster,
    pub luma: LumaRaster,
    pub otsu: OtsuSelection,
    pub otsu_classification: Classification,
    pub scalar: Classification,
    pub vectorized: Classification,
    pub timings: Vec<Timing>,
}

impl PipelineReport {
    pub fn classification(&self, algorithm: Algorithm) -> &Classification {
        match algorithm {
            Algorithm::Otsu => &self.otsu_classification,
            Algorithm::AdaptiveScalar => &self.scalar,
            Algorithm::AdaptiveVectorized => &self.vectorized,
        }
    }

    /// The buffer the sink draws for `mode`.
    pub fn output(&self, mode: OutputMode) -> RasterOutput<'_> {
        match mode {
            OutputMode::Color => RasterOutput::Color(&self.raster),
            OutputMode::Gray => RasterOutput::Gray(&self.luma),
            OutputMode::Binary(algorithm) => RasterOutput::Binary(self.classification(algorithm)),
        }
    }

    pub fn timing(&self, label: &str) -> Option<Milliseconds> {
        self.timings.iter().find(|t| t.label == label).map(Timing::millis)
    }

    /// Number of pixels on which the two adaptive engines disagree.
    pub fn adaptive_disagreements(&self) -> usize {
        self.scalar
            .labels()
            .iter()
            .zip(self.vectorized.labels())
            .filter(|(a, b)| a != b)
            .count()
    }
}

impl fmt::Display for PipelineReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}*{}", self.raster.width(), self.raster.height())?;
        writeln!(f, "Otsu threshold: {}", self.otsu.threshold)?;
        for timing in &self.timings {
            writeln!(f, "{timing}")?;
        }
        write!(f, "Adaptive disagreements: {}", self.adaptive_disagreements())
    }
}

/// The main, top-level struct for the binarization engine.
pub struct BinarizationPipeline {
    config: PipelineConfig,
    params: NeighborhoodParams,
    scalar: ScalarEngine,
    vectorized: VectorizedEngine,
}

impl BinarizationPipeline {
    pub fn new(config: PipelineConfig) -> Result<Self, PipelineError> {
        let params =
            NeighborhoodParams::new(config.region_radius, config.offset).map_err(PipelineError::at(Stage::Threshold))?;
        let vectorized = VectorizedEngine::new(config.batch_width).map_err(PipelineError::at(Stage::Threshold))?;
        Ok(Self {
            config,
            params,
            scalar: ScalarEngine::new(),
            vectorized,
        })
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn params(&self) -> &NeighborhoodParams {
        &self.params
    }

    /// Decodes `path` and runs every classifier on it.
    pub fn process_file(&self, path: impl AsRef<Path>) -> Result<PipelineReport, PipelineError> {
        let path = path.as_ref();
        let raster = image_helper::load(path).map_err(PipelineError::at(Stage::Read))?;
        info!("{}*{}", raster.width(), raster.height());
        self.analyze(raster)
    }

    /// Converts `raster` to luma and runs every classifier.
    pub fn analyze(&self, raster: RgbRaster) -> Result<PipelineReport, PipelineError> {
        let (luma, convert_timing) = timing::time("Grayscale", || grayscale::to_luma(&raster));
        let mut report = self.analyze_with_luma(raster, luma)?;
        report.timings.insert(0, convert_timing);
        Ok(report)
    }

    /// Runs every classifier against a luma raster prepared by the caller.
    pub fn analyze_with_luma(&self, raster: RgbRaster, luma: LumaRaster) -> Result<PipelineReport, PipelineError> {
        if (raster.width(), raster.height()) != (luma.width(), luma.height()) {
            return Err(PipelineError {
                stage: Stage::Convert,
                source: BinarizeError::DimensionMismatch {
                    left_width: raster.width(),
                    left_height: raster.height(),
                    right_width: luma.width(),
                    right_height: luma.height(),
                },
            });
        }

        let ((otsu, otsu_classification), otsu_timing) =
            timing::time("Otsu", || otsu::binarize(&raster, &luma, self.config.otsu_source));
        debug!(threshold = otsu.threshold, source = ?self.config.otsu_source, "otsu threshold selected");

        let (scalar, scalar_timing) = timing::time_engine(&self.scalar, &luma, &self.params);
        let (vectorized, vectorized_timing) = timing::time_engine(&self.vectorized, &luma, &self.params);

        Ok(PipelineReport {
            raster,
            luma,
            otsu,
            otsu_classification,
            scalar,
            vectorized,
            timings: vec![otsu_timing, scalar_timing, vectorized_timing],
        })
    }

    /// Hands one buffer of `report` to the sink.
    pub fn write(&self, report: &PipelineReport, path: impl AsRef<Path>, mode: OutputMode) -> Result<(), PipelineError> {
        let path = path.as_ref();
        image_helper::save(path, report.output(mode)).map_err(PipelineError::at(Stage::Write))?;
        debug!(path = %path.display(), ?mode, "raster written");
        Ok(())
    }

    /// Name of the engine whose timing is reported under `algorithm`.
    pub fn engine_name(&self, algorithm: Algorithm) -> &'static str {
        match algorithm {
            Algorithm::Otsu => "Otsu",
            Algorithm::AdaptiveScalar => self.scalar.name(),
            Algorithm::AdaptiveVectorized => self.vectorized.name(),
        }
    }
}
