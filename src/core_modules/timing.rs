// THEORY:
// The timing harness is a thin wrapper around one engine call. It starts
// the clock right before the call and stops it right after. Only the caller's
// inputs (decoded raster, luma) are excluded; anything the engine prepares
// internally, such as padded rows, counts against it. It never inspects the result.

use std::fmt;
use std::time::{Duration, Instant};

use tracing::info;

use crate::core_modules::adaptive::{AdaptiveEngine, NeighborhoodParams};
use crate::core_modules::raster::raster::{Classification, LumaRaster};

pub type Milliseconds = f64;

/// Elapsed wall-clock time of one labeled invocation.
#[derive(Debug, Clone, PartialEq)]
pub struct Timing {
    pub label: String,
    pub elapsed: Duration,
}

impl Timing {
    /// Elapsed time as fractional milliseconds.
    pub fn millis(&self) -> Milliseconds {
        self.elapsed.as_secs_f64() * 1_000.0
    }
}

impl fmt::Display for Timing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} time taken: {:.3} ms", self.label, self.millis())
    }
}

/// Times `work` and logs a human-readable line for it.
pub fn time<T>(label: &str, work: impl FnOnce() -> T) -> (T, Timing) {
    let start = Instant::now();
    let output = work();
    let elapsed = start.elapsed();

    let timing = Timing {
        label: label.to_string(),
        elapsed,
    };
    info!("{timing}");
    (output, timing)
}

/// Times a single adaptive engine run on an already prepared luma raster.
pub fn time_engine<E: AdaptiveEngine + ?Sized>(
    engine: &E,
    luma: &LumaRaster,
    params: &NeighborhoodParams,
) -> (Classification, Timing) {
    let _span = tracing::info_span!("adaptive_threshold", engine = engine.name()).entered();
    time(engine.name(), || engine.classify(luma, params))
}
