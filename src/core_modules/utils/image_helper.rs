// THEORY:
// `image_helper` is the raster source and sink of the engine. Decoding, row
// padding, and container headers are left entirely to the `image` crate; this
// module only turns its RGB8 buffers into `RgbRaster`s and back.
//
// The sink takes a tagged `RasterOutput` instead of a mode flag, so each output
// kind carries exactly the buffer it needs:
// - `Color` writes the decoded raster unchanged.
// - `Gray` broadcasts luma into all three channels.
// - `Binary` draws label `1` black and label `0` white.
// The container format follows the destination extension (`.bmp`, `.png`, ...).

pub mod image_helper {
    use std::fs::File;
    use std::io::{BufWriter, Write};
    use std::path::Path;

    use image::{ExtendedColorType, ImageError, ImageFormat};

    use crate::core_modules::pixel::pixel::{Byte, Bytes, CHANNELS};
    use crate::core_modules::raster::raster::{Classification, FOREGROUND, LumaRaster, RgbRaster};
    use crate::error::{BinarizeError, Result};

    const BLACK: [Byte; CHANNELS] = [0, 0, 0];
    const WHITE: [Byte; CHANNELS] = [255, 255, 255];

    /// One buffer handed to the sink, tagged with how it should be drawn.
    #[derive(Debug, Clone, Copy)]
    pub enum RasterOutput<'a> {
        Color(&'a RgbRaster),
        Gray(&'a LumaRaster),
        Binary(&'a Classification),
    }

    impl RasterOutput<'_> {
        pub fn dimensions(&self) -> (u32, u32) {
            match self {
                RasterOutput::Color(raster) => (raster.width(), raster.height()),
                RasterOutput::Gray(luma) => (luma.width(), luma.height()),
                RasterOutput::Binary(classification) => (classification.width(), classification.height()),
            }
        }

        /// Interleaved RGB8 bytes ready for an encoder.
        pub fn to_rgb_bytes(&self) -> Bytes {
            match self {
                RasterOutput::Color(raster) => raster.to_rgb_bytes(),
                RasterOutput::Gray(luma) => luma
                    .samples()
                    .iter()
                    .flat_map(|&sample| [sample as Byte; CHANNELS])
                    .collect(),
                RasterOutput::Binary(classification) => classification
                    .labels()
                    .iter()
                    .flat_map(|&label| if label == FOREGROUND { BLACK } else { WHITE })
                    .collect(),
            }
        }
    }

    /// Decodes the file at `path` into an RGB raster.
    pub fn load(path: impl AsRef<Path>) -> Result<RgbRaster> {
        let path = path.as_ref();
        let decoded = image::open(path)
            .map_err(|source| BinarizeError::Read {
                path: path.to_path_buf(),
                source,
            })?
            .to_rgb8();
        RgbRaster::from_rgb_bytes(decoded.width(), decoded.height(), decoded.as_raw())
    }

    /// Encodes `output` into the file at `path`.
    pub fn save(path: impl AsRef<Path>, output: RasterOutput<'_>) -> Result<()> {
        let path = path.as_ref();
        let (width, height) = output.dimensions();
        write_rgb(path, width, height, &output.to_rgb_bytes()).map_err(|source| BinarizeError::Write {
            path: path.to_path_buf(),
            source,
        })
    }

    fn write_rgb(path: &Path, width: u32, height: u32, buffer: &[Byte]) -> std::result::Result<(), ImageError> {
        let format = ImageFormat::from_path(path)?;
        let mut output = BufWriter::new(File::create(path)?);

        image::write_buffer_with_format(&mut output, buffer, width, height, ExtendedColorType::Rgb8, format)?;
        output.flush()?;

        Ok(())
    }
}
