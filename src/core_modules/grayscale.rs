// THEORY:
// The grayscale converter is the leaf of the engine: it maps every pixel of an
// `RgbRaster` to its truncated Rec. 601 luma and hands the resulting `LumaRaster`
// to the adaptive threshold engines. It never fails for a well-formed raster.

use crate::core_modules::pixel::pixel::LumaSample;
use crate::core_modules::raster::raster::{LumaRaster, RgbRaster};

/// Converts a three-channel raster into a luma raster of identical dimensions.
pub fn to_luma(raster: &RgbRaster) -> LumaRaster {
    let samples: Vec<LumaSample> = raster.pixels().iter().map(|pixel| pixel.luma()).collect();
    LumaRaster::derived_from(raster, samples)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core_modules::pixel::pixel::Pixel;

    #[test]
    fn keeps_dimensions_and_byte_range() {
        let pixels: Vec<Pixel> = (0..60u32)
            .map(|i| Pixel::new((i * 7 % 256) as u8, (i * 13 % 256) as u8, (i * 29 % 256) as u8))
            .collect();
        let raster = RgbRaster::new(10, 6, pixels).unwrap();
        let luma = to_luma(&raster);

        assert_eq!(luma.width(), 10);
        assert_eq!(luma.height(), 6);
        assert_eq!(luma.samples().len(), 60);
        assert!(luma.samples().iter().all(|&s| s <= 255));
    }

    #[test]
    fn applies_weighted_sum_per_pixel() {
        let raster = RgbRaster::new(
            2,
            1,
            vec![Pixel::new(100, 150, 200), Pixel::new(255, 255, 255)],
        )
        .unwrap();
        let luma = to_luma(&raster);
        // 29.9 + 88.05 + 22.8 = 140.75
        assert_eq!(luma.sample(0, 0), 140);
        assert!(luma.sample(1, 0) >= 254);
    }
}
