pub mod bit_utils;
pub mod codec;
pub mod color;
pub mod ec;
pub mod galois;
pub mod layout;
pub mod metadata;
pub mod raster;
pub mod utils;

