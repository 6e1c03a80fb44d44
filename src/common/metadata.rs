use std::fmt::{Display, Error, Formatter};

use super::utils::{SymbolError, SymbolResult};

// Geometry
//------------------------------------------------------------------------------

pub const DEFAULT_LINEAR_LEN: usize = 150;
pub const DEFAULT_HEX_LEVEL: usize = 3;
pub const MIN_LINEAR_LEN: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Geometry {
    /// Bar sequence of `len` logical positions plus `overlay` reserved cells after the
    /// second finder.
    Linear { len: usize, overlay: usize },
    /// Hex lattice of the given radius with finder rings at distance `level`. The level must
    /// stay below the radius or the three finders meet at the center.
    Hex { radius: usize, level: usize },
}

impl Geometry {
    pub const fn linear(len: usize) -> Self {
        Self::Linear { len, overlay: 0 }
    }

    pub const fn hex(radius: usize) -> Self {
        Self::Hex { radius, level: DEFAULT_HEX_LEVEL }
    }

    pub fn validate(&self) -> SymbolResult<()> {
        match *self {
            Self::Linear { len, .. } if len < MIN_LINEAR_LEN => Err(SymbolError::InvalidSize),
            Self::Hex { radius: 0, .. } => Err(SymbolError::InvalidSize),
            Self::Hex { radius, level } if level == 0 || level >= radius => {
                Err(SymbolError::InvalidFinderLevel)
            }
            _ => Ok(()),
        }
    }

    /// Bits carried by one data module
    pub fn bits_per_module(&self) -> usize {
        match self {
            Self::Linear { .. } => 8,
            Self::Hex { .. } => 1,
        }
    }
}

impl Display for Geometry {
    fn fmt(&self, f: &mut Formatter) -> Result<(), Error> {
        match self {
            Self::Linear { len, overlay } => write!(f, "Linear {len} (+{overlay})"),
            Self::Hex { radius, level } => write!(f, "Hex R{radius} L{level}"),
        }
    }
}

// Symbol configuration
//------------------------------------------------------------------------------

pub const DEFAULT_ECC: usize = 10;
pub const DEFAULT_FIELD_EXP: u32 = 8;
pub const DEFAULT_MODULE_SIZE: u32 = 20;
pub const DEFAULT_BAR_HEIGHT: u32 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SymbolConfig {
    pub geometry: Geometry,
    /// Parity symbols per chunk. 0 disables error correction.
    pub ecc: usize,
    pub field_exp: u32,
    /// Module pixel size. For hex symbols this is the hexagon side.
    pub module_size: u32,
    /// Pixel height of linear bars
    pub bar_height: u32,
    /// Draw the hex calibration strip
    pub calibration_strip: bool,
}

impl Default for SymbolConfig {
    fn default() -> Self {
        Self {
            geometry: Geometry::linear(DEFAULT_LINEAR_LEN),
            ecc: DEFAULT_ECC,
            field_exp: DEFAULT_FIELD_EXP,
            module_size: DEFAULT_MODULE_SIZE,
            bar_height: DEFAULT_BAR_HEIGHT,
            calibration_strip: false,
        }
    }
}

impl SymbolConfig {
    pub fn validate(&self) -> SymbolResult<()> {
        self.geometry.validate()?;
        if !(2..=8).contains(&self.field_exp) {
            return Err(SymbolError::InvalidFieldExponent);
        }
        if self.module_size == 0 || self.bar_height == 0 {
            return Err(SymbolError::InvalidModuleSize);
        }
        if self.ecc > u8::MAX as usize {
            return Err(SymbolError::InvalidEccSymbols);
        }
        Ok(())
    }

    /// Reserved overlay cells for an overlay `px` pixels wide
    pub fn overlay_width(&self, px: u32) -> usize {
        match self.module_size {
            0 => 0,
            m => px.div_ceil(m) as usize,
        }
    }
}

impl Display for SymbolConfig {
    fn fmt(&self, f: &mut Formatter) -> Result<(), Error> {
        write!(
            f,
            "{{ Geometry: {}, Ecc: {}, Field: GF(2^{}), Module: {}px }}",
            self.geometry, self.ecc, self.field_exp, self.module_size
        )
    }
}
