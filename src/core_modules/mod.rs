pub mod adaptive;
pub mod adaptive_simd;
pub mod grayscale;
pub mod otsu;
pub mod pixel;
pub mod raster;
pub mod timing;
pub mod utils;
