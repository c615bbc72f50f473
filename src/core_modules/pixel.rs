// THEORY:
// The `Pixel` module is the smallest unit of the binarization engine. It is a
// "dumb" data container for one decoded three-channel pixel plus the single
// heuristic the engine needs from it: Rec. 601 luma.
//
// Key architectural principles:
// 1.  **Data Purity**: It holds the raw `u8` channel values without interpretation.
// 2.  **Intrinsic Knowledge**: `luminance` is computed from this pixel alone. Anything
//     that needs neighbors (local means, histograms) lives in the threshold modules.
// 3.  **Deterministic Luma**: `luma` truncates the weighted sum toward zero instead
//     of rounding, so the same input always maps to the same 8-bit sample.

pub mod pixel {
    pub type Byte = u8;
    pub type Bytes = Vec<Byte>;
    pub type Channel = Byte;
    pub type Luminance = f64;
    /// Luma is 8-bit but widened so vector accumulation never overflows a lane.
    pub type LumaSample = u16;

    /// Largest luma sample a raster may hold.
    pub const MAX_LUMA: LumaSample = 255;

    pub const CHANNELS: usize = 3;

    const RED_WEIGHT: Luminance = 0.299;
    const GREEN_WEIGHT: Luminance = 0.587;
    const BLUE_WEIGHT: Luminance = 0.114;

    /// A "dumb" data container representing a single RGB pixel.
    #[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
    pub struct Pixel {
        /// The red channel value (0-255).
        pub red: Channel,
        /// The green channel value (0-255).
        pub green: Channel,
        /// The blue channel value (0-255).
        pub blue: Channel,
    }

    impl Pixel {
        pub fn new(red: Channel, green: Channel, blue: Channel) -> Self {
            Pixel { red, green, blue }
        }

        /// A pixel whose three channels all carry the same intensity.
        pub fn splat(intensity: Channel) -> Self {
            Pixel::new(intensity, intensity, intensity)
        }

        /// Luminance estimate (Rec. 601 luma) on the 0..255 scale.
        pub fn luminance(&self) -> Luminance {
            RED_WEIGHT * self.red as f64 + GREEN_WEIGHT * self.green as f64 + BLUE_WEIGHT * self.blue as f64
        }

        /// Luma truncated to an integer sample. Always lies in 0..=255 since the
        /// weights sum to 1.0.
        pub fn luma(&self) -> LumaSample {
            self.luminance() as LumaSample
        }
    }

    impl From<&[Byte]> for Pixel {
        fn from(bytes: &[Byte]) -> Self {
            if bytes.len() != CHANNELS {
                panic!("Cannot convert {} bytes into pixel.", bytes.len());
            }
            Pixel::new(bytes[0], bytes[1], bytes[2])
        }
    }

    impl From<Pixel> for [Byte; CHANNELS] {
        fn from(pixel: Pixel) -> Self {
            [pixel.red, pixel.green, pixel.blue]
        }
    }

    impl From<Pixel> for Bytes {
        fn from(pixel: Pixel) -> Self {
            vec![pixel.red, pixel.green, pixel.blue]
        }
    }
}
