mod render;

pub use render::{hex_color, linear_color, render};

use std::{borrow::Cow, sync::Arc};

use encoding_rs::WINDOWS_1252;
use image::RgbImage;
use tracing::{debug, warn};

use crate::common::{
    codec::PayloadCodec,
    layout::{Coord, Layout, Module},
    metadata::{Geometry, SymbolConfig},
    utils::SymbolResult,
};

// Builder
//------------------------------------------------------------------------------

pub struct SymbolBuilder<'a> {
    data: Cow<'a, [u8]>,
    config: SymbolConfig,
    overlay_px: Option<u32>,
}

impl<'a> SymbolBuilder<'a> {
    /// Payload bytes. Unused capacity is zero padded and readers strip trailing zeros, so a
    /// payload ending in 0x00 reads back without those bytes.
    pub fn new(data: &'a [u8]) -> Self {
        Self { data: Cow::Borrowed(data), config: SymbolConfig::default(), overlay_px: None }
    }

    /// Payload from text, stored as Windows-1252. Unmappable characters become numeric
    /// character references.
    pub fn text(text: &'a str) -> Self {
        let (data, _, lossy) = WINDOWS_1252.encode(text);
        if lossy {
            warn!("Text has characters outside Windows-1252");
        }
        Self { data, config: SymbolConfig::default(), overlay_px: None }
    }

    pub fn data(&mut self, data: &'a [u8]) -> &mut Self {
        self.data = Cow::Borrowed(data);
        self
    }

    pub fn geometry(&mut self, geometry: Geometry) -> &mut Self {
        self.config.geometry = geometry;
        self
    }

    pub fn ecc(&mut self, ecc: usize) -> &mut Self {
        self.config.ecc = ecc;
        self
    }

    pub fn field_exp(&mut self, field_exp: u32) -> &mut Self {
        self.config.field_exp = field_exp;
        self
    }

    pub fn module_size(&mut self, px: u32) -> &mut Self {
        self.config.module_size = px;
        self
    }

    pub fn bar_height(&mut self, px: u32) -> &mut Self {
        self.config.bar_height = px;
        self
    }

    /// Reserves room for an overlay `px` pixels wide after the second finder of a linear
    /// symbol. Resolved against the module size at build time.
    pub fn overlay_width(&mut self, px: u32) -> &mut Self {
        self.overlay_px = Some(px);
        self
    }

    pub fn calibration_strip(&mut self, enabled: bool) -> &mut Self {
        self.config.calibration_strip = enabled;
        self
    }

    pub fn config(&mut self, config: SymbolConfig) -> &mut Self {
        self.config = config;
        self
    }

    /// Configuration with the overlay width applied
    pub fn resolved_config(&self) -> SymbolConfig {
        let mut config = self.config;
        match (self.overlay_px, config.geometry) {
            (Some(px), Geometry::Linear { len, .. }) => {
                config.geometry = Geometry::Linear { len, overlay: config.overlay_width(px) };
            }
            (Some(_), Geometry::Hex { .. }) => warn!("Overlay is only supported on linear symbols"),
            (None, _) => {}
        }
        config
    }

    pub fn metadata(&self) -> String {
        self.resolved_config().to_string()
    }
}


impl SymbolBuilder<'_> {
    pub fn build(&self) -> SymbolResult<Symbol> {
        let config = self.resolved_config();
        config.validate()?;
        debug!("Generating symbol {config}");

        let layout = Layout::shared(config.geometry)?;
        let codec = PayloadCodec::new(&layout, &config)?;

        debug!("Encoding payload");
        let codeword = codec.encode(&self.data)?;

        debug!("Packing modules");
        let modules = layout.pack(&codeword, config.ecc as u8);

        Ok(Symbol { layout, config, modules, codeword })
    }
}

// Symbol
//------------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct Symbol {
    layout: Arc<Layout>,
    config: SymbolConfig,
    modules: Vec<Module>,
    codeword: Vec<u8>,
}

impl Symbol {
    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    pub fn config(&self) -> &SymbolConfig {
        &self.config
    }

    /// Modules in layout scan order
    pub fn modules(&self) -> &[Module] {
        &self.modules
    }

    pub fn codeword(&self) -> &[u8] {
        &self.codeword
    }

    pub fn ecc_level(&self) -> u8 {
        self.config.ecc as u8
    }

    pub fn to_image(&self) -> RgbImage {
        render(&self.layout, &self.modules, &self.config)
    }

    /// One character per module in scan order: f finder, e ecc marker, . blank, d or D data.
    /// Hex symbols break the line at every new q column.
    pub fn to_debug_str(&self) -> String {
        let mut res = String::with_capacity(self.modules.len() * 2);
        res.push('\n');
        let mut last_q = None;
        for (c, m) in self.layout.coords().iter().zip(&self.modules) {
            if let Coord::Axial(q, _) = *c {
                if last_q.is_some_and(|lq| lq != q) {
                    res.push('\n');
                }
                last_q = Some(q);
            }
            res.push(match m {
                Module::Finder => 'f',
                Module::EccLevel(_) => 'e',
                Module::Blank => '.',
                Module::Data(0) => 'd',
                Module::Data(_) => 'D',
            });
        }
        res.push('\n');
        res
    }
}
