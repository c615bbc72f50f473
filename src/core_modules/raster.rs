// THEORY:
// The `raster` module holds the three buffers that flow through the engine:
// the decoded three-channel `RgbRaster`, the derived single-channel `LumaRaster`,
// and the per-pixel `Classification` produced by each threshold algorithm.
//
// Key architectural principles:
// 1.  **Validated Construction**: Every raster checks `len == width * height` (and a
//     non-zero area) when it is built. The threshold engines never re-check.
// 2.  **Read-Only After Production**: A `Classification` exposes its labels through a
//     shared slice only. Recomputing means building a new one.
// 3.  **Row-Major Layout**: Sample `(x, y)` lives at index `y * width + x` everywhere.

pub mod raster {
    use crate::core_modules::pixel::pixel::{Byte, CHANNELS, LumaSample, MAX_LUMA, Pixel};
    use crate::error::{BinarizeError, Result};

    /// Per-pixel binary label. `FOREGROUND` is drawn black by the raster sink.
    pub type Label = u8;

    pub const FOREGROUND: Label = 1;
    pub const BACKGROUND: Label = 0;

    fn check_dimensions(width: u32, height: u32, channels: usize, actual: usize) -> Result<()> {
        if width == 0 || height == 0 {
            return Err(BinarizeError::EmptyRaster { width, height });
        }
        let expected = width as usize * height as usize * channels;
        if actual != expected {
            return Err(BinarizeError::BufferLength {
                width,
                height,
                channels,
                expected,
                actual,
            });
        }
        Ok(())
    }

    /// Row-major offset of `(x, y)`, widened before multiplying.
    #[inline]
    pub(crate) fn index(width: u32, x: u32, y: u32) -> usize {
        y as usize * width as usize + x as usize
    }

    fn check_samples(samples: &[LumaSample]) -> Result<()> {
        match samples.iter().position(|&value| value > MAX_LUMA) {
            Some(index) => Err(BinarizeError::SampleOutOfRange {
                index,
                value: samples[index],
            }),
            None => Ok(()),
        }
    }

    /// A decoded three-channel raster with any container row padding already stripped.
    #[derive(Debug, Clone, PartialEq)]
    pub struct RgbRaster {
        width: u32,
        height: u32,
        pixels: Vec<Pixel>,
    }

    impl RgbRaster {
        pub fn new(width: u32, height: u32, pixels: Vec<Pixel>) -> Result<Self> {
            check_dimensions(width, height, 1, pixels.len())?;
            Ok(Self { width, height, pixels })
        }

        /// Builds a raster from interleaved `R, G, B` bytes.
        pub fn from_rgb_bytes(width: u32, height: u32, bytes: &[Byte]) -> Result<Self> {
            check_dimensions(width, height, CHANNELS, bytes.len())?;
            let pixels = bytes.chunks_exact(CHANNELS).map(Pixel::from).collect();
            Ok(Self { width, height, pixels })
        }

        pub fn width(&self) -> u32 {
            self.width
        }

        pub fn height(&self) -> u32 {
            self.height
        }

        /// Bits per pixel of the raster. The engine only handles 8-bit RGB.
        pub fn bit_depth(&self) -> u16 {
            (CHANNELS * 8) as u16
        }

        pub fn pixels(&self) -> &[Pixel] {
            &self.pixels
        }

        pub fn pixel(&self, x: u32, y: u32) -> Pixel {
            self.pixels[index(self.width, x, y)]
        }

        /// Flattens back to interleaved `R, G, B` bytes.
        pub fn to_rgb_bytes(&self) -> Vec<Byte> {
            let mut bytes = Vec::with_capacity(self.pixels.len() * CHANNELS);
            for pixel in &self.pixels {
                bytes.extend_from_slice(&<[Byte; CHANNELS]>::from(*pixel));
            }
            bytes
        }
    }

    /// Single-channel luma derived from an `RgbRaster` of the same dimensions.
    #[derive(Debug, Clone, PartialEq)]
    pub struct LumaRaster {
        width: u32,
        height: u32,
        samples: Vec<LumaSample>,
    }

    impl LumaRaster {
        /// Every sample must fit in 8 bits, which bounds the adaptive window sums.
        pub fn new(width: u32, height: u32, samples: Vec<LumaSample>) -> Result<Self> {
            check_dimensions(width, height, 1, samples.len())?;
            check_samples(&samples)?;
            Ok(Self { width, height, samples })
        }

        /// Pairs samples with the dimensions of the raster they were derived from.
        pub(crate) fn derived_from(source: &RgbRaster, samples: Vec<LumaSample>) -> Self {
            debug_assert_eq!(samples.len(), source.pixels.len());
            Self {
                width: source.width,
                height: source.height,
                samples,
            }
        }

        pub fn width(&self) -> u32 {
            self.width
        }

        pub fn height(&self) -> u32 {
            self.height
        }

        pub fn samples(&self) -> &[LumaSample] {
            &self.samples
        }

        pub fn sample(&self, x: u32, y: u32) -> LumaSample {
            self.samples[index(self.width, x, y)]
        }

        pub fn row(&self, y: u32) -> &[LumaSample] {
            let start = index(self.width, 0, y);
            &self.samples[start..start + self.width as usize]
        }
    }

    /// A `width x height` grid of labels written once by a threshold algorithm.
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub struct Classification {
        width: u32,
        height: u32,
        labels: Vec<Label>,
    }

    impl Classification {
        pub(crate) fn from_labels(width: u32, height: u32, labels: Vec<Label>) -> Self {
            debug_assert_eq!(labels.len(), width as usize * height as usize);
            Self { width, height, labels }
        }

        pub fn width(&self) -> u32 {
            self.width
        }

        pub fn height(&self) -> u32 {
            self.height
        }

        pub fn labels(&self) -> &[Label] {
            &self.labels
        }

        pub fn label(&self, x: u32, y: u32) -> Label {
            self.labels[index(self.width, x, y)]
        }

        /// Number of pixels labeled `FOREGROUND`.
        pub fn foreground_count(&self) -> usize {
            self.labels.iter().filter(|&&label| label == FOREGROUND).count()
        }
    }
}
