// Example runner: decode one image, time both adaptive engines, and write the
// color, gray, and binary renderings next to each other.

use std::env;
use std::path::PathBuf;

use anyhow::{Context, Result};
use binarize::{Algorithm, BinarizationPipeline, OutputMode, PipelineConfig};
use tracing::info;

const OUTPUTS: [(&str, OutputMode); 5] = [
    ("binary.bmp", OutputMode::Binary(Algorithm::AdaptiveVectorized)),
    ("binary_scalar.bmp", OutputMode::Binary(Algorithm::AdaptiveScalar)),
    ("otsu.bmp", OutputMode::Binary(Algorithm::Otsu)),
    ("gray.bmp", OutputMode::Gray),
    ("color.bmp", OutputMode::Color),
];

fn main() -> Result<()> {
    binarize::logging::init("info");

    let args: Vec<String> = env::args().collect();
    if args.len() < 3 {
        println!("Usage: binarize <input_image> <output_dir>");
        return Ok(());
    }
    let input_path = PathBuf::from(&args[1]);
    let output_dir = PathBuf::from(&args[2]);

    let config = PipelineConfig::from_env();
    info!(?config, "starting binarization");
    let pipeline = BinarizationPipeline::new(config).context("Invalid pipeline configuration")?;

    let report = pipeline
        .process_file(&input_path)
        .with_context(|| format!("Failed to process {}", input_path.display()))?;
    println!("{report}");

    std::fs::create_dir_all(&output_dir)
        .with_context(|| format!("Failed to create output directory {}", output_dir.display()))?;
    for (name, mode) in OUTPUTS {
        let path = output_dir.join(name);
        pipeline
            .write(&report, &path, mode)
            .with_context(|| format!("Failed to save {}", path.display()))?;
    }

    println!("Processing complete. Output saved to {}", output_dir.display());
    Ok(())
}
