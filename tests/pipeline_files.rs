use binarize::core_modules::pixel::pixel::Pixel;
use binarize::core_modules::utils::image_helper::image_helper::{self, RasterOutput};
use binarize::{Algorithm, BinarizationPipeline, BinarizeError, OutputMode, PipelineConfig, RgbRaster, Stage};

fn scene(width: u32, height: u32) -> RgbRaster {
    // Dark text-like strokes on a bright, slowly varying background.
    let pixels = (0..height)
        .flat_map(|y| {
            (0..width).map(move |x| {
                let background = 150 + ((x + y) % 60) as u8;
                if x % 11 == 3 || y % 9 == 4 {
                    Pixel::new(20, 25, 30)
                } else {
                    Pixel::new(background, background, background.saturating_sub(10))
                }
            })
        })
        .collect();
    RgbRaster::new(width, height, pixels).unwrap()
}

#[test]
fn processes_a_bmp_end_to_end() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("input.bmp");
    let raster = scene(37, 21);
    image_helper::save(&input, RasterOutput::Color(&raster)).unwrap();

    let pipeline = BinarizationPipeline::new(PipelineConfig::default()).unwrap();
    let report = pipeline.process_file(&input).unwrap();
    assert_eq!(report.raster, raster);
    assert_eq!(report.luma.width(), 37);

    let color = dir.path().join("color.bmp");
    pipeline.write(&report, &color, OutputMode::Color).unwrap();
    assert_eq!(image_helper::load(&color).unwrap(), raster);

    let binary = dir.path().join("binary.png");
    pipeline
        .write(&report, &binary, OutputMode::Binary(Algorithm::AdaptiveVectorized))
        .unwrap();
    let reloaded = image_helper::load(&binary).unwrap();
    for (pixel, &label) in reloaded.pixels().iter().zip(report.vectorized.labels()) {
        let expected = if label == binarize::FOREGROUND { 0 } else { 255 };
        assert_eq!(*pixel, Pixel::splat(expected));
    }

    let gray = dir.path().join("gray.bmp");
    pipeline.write(&report, &gray, OutputMode::Gray).unwrap();
    let reloaded = image_helper::load(&gray).unwrap();
    for (pixel, &sample) in reloaded.pixels().iter().zip(report.luma.samples()) {
        assert_eq!(*pixel, Pixel::splat(sample as u8));
    }
}

#[test]
fn strokes_are_foreground_for_every_algorithm() {
    let pipeline = BinarizationPipeline::new(PipelineConfig::default()).unwrap();
    let report = pipeline.analyze(scene(48, 36)).unwrap();

    // (14, 13) is a stroke pixel away from every border.
    for algorithm in [Algorithm::Otsu, Algorithm::AdaptiveScalar, Algorithm::AdaptiveVectorized] {
        assert_eq!(report.classification(algorithm).label(14, 13), binarize::FOREGROUND, "{algorithm:?}");
    }
}

#[test]
fn missing_input_fails_in_read_stage() {
    let dir = tempfile::tempdir().unwrap();
    let pipeline = BinarizationPipeline::new(PipelineConfig::default()).unwrap();
    let err = pipeline.process_file(dir.path().join("missing.bmp")).unwrap_err();

    assert_eq!(err.stage, Stage::Read);
    assert!(matches!(err.source, BinarizeError::Read { .. }));
    assert!(err.to_string().starts_with("read stage failed"));
}

#[test]
fn unknown_extension_fails_in_write_stage() {
    let dir = tempfile::tempdir().unwrap();
    let pipeline = BinarizationPipeline::new(PipelineConfig::default()).unwrap();
    let report = pipeline.analyze(scene(8, 8)).unwrap();
    let err = pipeline
        .write(&report, dir.path().join("out.unknownext"), OutputMode::Color)
        .unwrap_err();
    assert_eq!(err.stage, Stage::Write);
}
