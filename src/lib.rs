//! # chromabar
//!
//! A Rust library for generating and reading colored optical symbols protected by Reed-Solomon
//! error correction. Two symbol geometries share one codec and one layout engine:
//!
//! - **Linear**: a row of bars. Each data bar carries a whole byte as a hue.
//! - **Hex**: a hexagonal lattice of black and white cells, one bit per cell.
//!
//! ## Features
//!
//! - **Symbol Generation**: Build symbols with configurable length or radius, error correction strength and module size
//! - **Symbol Reading**: Recover payloads from rasters at any of the four axis-aligned rotations
//! - **Reed-Solomon Error Correction**: Errors and erasures over GF(2^c), with erasures fed from cells missing in the raster
//! - **Overlay Reservation**: Keep a block of a linear symbol free for a logo or caption
//!
//! ## Quick Start
//!
//! ### Simple Symbol Generation
//!
//! ```rust
//! use chromabar::SymbolBuilder;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! // 150 bars, 10 parity bytes, 20px modules
//! let symbol = SymbolBuilder::new(b"HELLO").build()?;
//!
//! let img = symbol.to_image();
//! img.save("simple_symbol.png")?;
//! # Ok(())
//! # }
//! ```
//!
//! ### Full Configuration
//!
//! ```rust
//! use chromabar::{Geometry, SymbolBuilder};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let symbol = SymbolBuilder::text("Hexagon")
//!     .geometry(Geometry::hex(10))  // Lattice radius, finder rings 3 cells in from the corners
//!     .ecc(4)                       // Parity symbols per chunk, 0 disables error correction
//!     .module_size(12)              // Hexagon side in pixels
//!     .calibration_strip(true)      // Alternating squares in the top margin
//!     .build()?;
//!
//! let img = symbol.to_image();
//! img.save("hex_symbol.png")?;
//! # Ok(())
//! # }
//! ```
//!
//! ### Reading a Symbol
//!
//! ```rust
//! use chromabar::{SymbolBuilder, SymbolConfig, SymbolReader};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let img = SymbolBuilder::new(b"HELLO").build()?.to_image();
//!
//! let decoded = SymbolReader::new(SymbolConfig::default()).read(&img)?;
//! assert_eq!(decoded.payload(), b"HELLO");
//! assert_eq!(decoded.ecc_level(), 10);
//! # Ok(())
//! # }
//! ```
//!
//! ## Symbol Layout
//!
//! ### Linear
//! - Bars 0, 2 and the last bar are black finders
//! - Bar 1 is the ECC level marker, drawn as the hue of the parity symbol count
//! - An optional overlay block follows bar 2
//! - Data bars hold one byte each. 0 and 255 are drawn white and read back as 0.
//!
//! ### Hex
//! - Three finder clusters sit inward from alternating corners. Each is a ring plus its center.
//! - Data cells are black for 1 and white for 0
//! - The ECC level isn't drawn and must be known to the reader
//!
//! ## Error Handling
//!
//! Every failure is a [`SymbolError`]. [`SymbolError::kind`] groups them into configuration,
//! capacity, correction and geometry failures.

#![allow(clippy::items_after_test_module)]

pub mod builder;
pub(crate) mod common;
pub mod reader;

use image::RgbImage;

pub use builder::{Symbol, SymbolBuilder};
pub use common::codec::PayloadCodec;
pub use common::ec::{CodecParams, Decoded, RSCodec};
pub use common::galois::{GaloisField, Gf};
pub use common::layout::{Coord, Layout, Module, Role};
pub use common::metadata::{Geometry, SymbolConfig};
pub use common::utils::{ErrorKind, SymbolError, SymbolResult};
pub use common::{color, galois, layout, raster};
pub use reader::{DecodedSymbol, SymbolReader};

/// Renders `payload` as a symbol of the given geometry with `ecc` parity symbols per chunk and
/// default styling. Trailing 0x00 bytes of the payload don't survive a round trip.
pub fn encode_symbol(payload: &[u8], geometry: Geometry, ecc: usize) -> SymbolResult<RgbImage> {
    let symbol = SymbolBuilder::new(payload).geometry(geometry).ecc(ecc).build()?;
    Ok(symbol.to_image())
}

/// Reads a symbol rendered with default styling. Linear symbols report their ECC level through
/// the marker bar; hex symbols need `expected_ecc`.
pub fn decode_symbol(
    raster: &RgbImage,
    geometry: Geometry,
    expected_ecc: Option<u8>,
) -> SymbolResult<DecodedSymbol> {
    let config = SymbolConfig { geometry, ..Default::default() };
    let mut reader = SymbolReader::new(config);
    if let Some(ecc) = expected_ecc {
        reader.expected_ecc(ecc);
    }
    reader.read(raster)
}

#[cfg(test)]
mod lib_tests {
    use super::{decode_symbol, encode_symbol, Geometry};

    #[test]
    fn test_entry_points() {
        let img = encode_symbol(b"HELLO", Geometry::linear(150), 10).unwrap();
        assert_eq!(img.dimensions(), (3000, 100));
        let decoded = decode_symbol(&img, Geometry::linear(150), None).unwrap();
        assert_eq!(decoded.payload(), b"HELLO");
        assert_eq!(decoded.ecc_level(), 10);
        assert_eq!(decoded.corrected(), 0);

        let img = encode_symbol(b"hex", Geometry::hex(8), 4).unwrap();
        let decoded = decode_symbol(&img, Geometry::hex(8), Some(4)).unwrap();
        assert_eq!(decoded.payload(), b"hex");
    }

    #[test]
    fn test_trailing_zeros_dropped() {
        let cases: [(&[u8], &[u8]); 3] =
            [(&[0x41, 0x00, 0x00], &[0x41]), (&[0x00], &[]), (&[0x00, 0x07], &[0x00, 0x07])];
        for (inp, exp) in cases {
            let img = encode_symbol(inp, Geometry::linear(40), 6).unwrap();
            let decoded = decode_symbol(&img, Geometry::linear(40), None).unwrap();
            assert_eq!(decoded.payload(), exp);
        }
    }
}
