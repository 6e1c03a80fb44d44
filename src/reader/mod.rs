mod orient;
mod sample;

pub use orient::{normalize_hex, normalize_linear, Normalized, ROTATIONS};
pub use sample::{hex_bit, linear_value, sample_hex, sample_linear, Sampled};

use std::sync::Arc;

use encoding_rs::WINDOWS_1252;
use image::RgbImage;
use tracing::{debug, warn};

use crate::common::{
    codec::PayloadCodec,
    layout::{Layout, Module},
    metadata::{Geometry, SymbolConfig},
    utils::SymbolResult,
};

// Reader
//------------------------------------------------------------------------------

/// Decodes rendered symbols. The configuration must describe the same geometry and field the
/// symbol was built with.
#[derive(Debug, Clone)]
pub struct SymbolReader {
    config: SymbolConfig,
    expected_ecc: Option<u8>,
    expected_module_size: Option<u32>,
}

impl SymbolReader {
    pub fn new(config: SymbolConfig) -> Self {
        Self { config, expected_ecc: None, expected_module_size: None }
    }

    /// Overrides the ECC level read from the marker. Hex symbols carry no marker and fall back
    /// to the configured level without this.
    pub fn expected_ecc(&mut self, ecc: u8) -> &mut Self {
        self.expected_ecc = Some(ecc);
        self
    }

    /// Module pitch of linear symbols, or hexagon side of hex symbols. Linear pitch is inferred
    /// from the finder span when unset.
    pub fn expected_module_size(&mut self, px: u32) -> &mut Self {
        self.expected_module_size = Some(px);
        self
    }

    /// Samples the raster into modules in layout scan order
    pub fn read_canvas(&self, img: &RgbImage) -> SymbolResult<Vec<Module>> {
        let (_, sampled) = self.sample(img)?;
        Ok(sampled.modules)
    }

    pub fn read(&self, img: &RgbImage) -> SymbolResult<DecodedSymbol> {
        let (layout, sampled) = self.sample(img)?;

        let ecc_level = self.resolve_ecc(sampled.marker);
        debug!(ecc_level, "Resolved ECC level");
        let config = SymbolConfig { ecc: ecc_level as usize, ..self.config };
        let codec = PayloadCodec::new(&layout, &config)?;

        debug!("Unpacking modules");
        let codeword = layout.unpack(&sampled.modules)?;
        let mut erasures =
            sampled.missing.iter().map(|&n| layout.byte_of_data_cell(n)).collect::<Vec<_>>();
        erasures.dedup();

        debug!(erasures = erasures.len(), "Decoding payload");
        let (payload, corrected) = codec.decode(&codeword, &erasures)?;

        Ok(DecodedSymbol { payload, ecc_level, corrected })
    }

    fn sample(&self, img: &RgbImage) -> SymbolResult<(Arc<Layout>, Sampled)> {
        self.config.validate()?;
        debug!("Reading symbol {}", self.config);

        let layout = Layout::shared(self.config.geometry)?;
        let sampled = match self.config.geometry {
            Geometry::Linear { .. } => {
                debug!("Locating bars");
                let norm = normalize_linear(img, layout.len(), self.expected_module_size)?;
                debug!("Sampling bars");
                sample_linear(&norm.img, &layout, norm.pitch)
            }
            Geometry::Hex { radius, level } => {
                let side = self.expected_module_size.unwrap_or(self.config.module_size);
                debug!("Locating finders");
                let canon = normalize_hex(img, radius, level, side)?;
                debug!("Sampling cells");
                sample_hex(&canon, &layout, side as f64)
            }
        };
        Ok((layout, sampled))
    }

    fn resolve_ecc(&self, marker: Option<u8>) -> u8 {
        match (self.expected_ecc, marker) {
            (Some(exp), Some(m)) if exp != m => {
                warn!(expected = exp, marker = m, "ECC marker disagrees, using expected level");
                exp
            }
            (Some(exp), _) => exp,
            (None, Some(m)) => m,
            (None, None) => self.config.ecc as u8,
        }
    }
}

// Decoded symbol
//------------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedSymbol {
    payload: Vec<u8>,
    ecc_level: u8,
    corrected: usize,
}

impl DecodedSymbol {
    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    pub fn into_payload(self) -> Vec<u8> {
        self.payload
    }

    /// ECC level the payload was decoded with
    pub fn ecc_level(&self) -> u8 {
        self.ecc_level
    }

    /// Codeword positions the decoder repaired
    pub fn corrected(&self) -> usize {
        self.corrected
    }

    /// Payload read as Windows-1252 text
    pub fn text(&self) -> String {
        let (text, _) = WINDOWS_1252.decode_without_bom_handling(&self.payload);
        text.into_owned()
    }
}
