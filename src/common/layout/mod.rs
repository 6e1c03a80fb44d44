//! Module layout shared by the encode and decode paths. A [`Layout`] fixes the scan order of
//! every cell and which of them are reserved. Packing and unpacking walk that single order.

pub mod hex;
pub mod linear;

use std::{
    collections::HashSet,
    num::NonZeroUsize,
    sync::{Arc, Mutex, OnceLock},
};

use lru::LruCache;
use tracing::debug;

use super::{
    bit_utils::BitStream,
    metadata::Geometry,
    utils::{SymbolError, SymbolResult},
};

const LAYOUT_CACHE_SIZE: usize = 32;

// Coordinates, roles & modules
//------------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Coord {
    /// Physical bar index
    Bar(usize),
    /// Axial hex coordinate (q, r). The third coordinate is s = -q - r.
    Axial(i32, i32),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Finder,
    EccLevel,
    /// Reserved but drawn empty, e.g. the overlay block
    Blank,
    Data,
}

impl Role {
    pub fn is_reserved(self) -> bool {
        self != Role::Data
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Module {
    Finder,
    EccLevel(u8),
    Blank,
    Data(u8),
}

impl Module {
    pub fn role(self) -> Role {
        match self {
            Module::Finder => Role::Finder,
            Module::EccLevel(_) => Role::EccLevel,
            Module::Blank => Role::Blank,
            Module::Data(_) => Role::Data,
        }
    }
}

// Layout
//------------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layout {
    geometry: Geometry,
    coords: Vec<Coord>,
    roles: Vec<Role>,
    // Scan indices of data cells
    data: Vec<usize>,
}

impl Layout {
    pub fn new(geometry: Geometry) -> SymbolResult<Self> {
        geometry.validate()?;

        let cells = match geometry {
            Geometry::Linear { len, overlay } => linear::cells(len, overlay),
            Geometry::Hex { radius, level } => hex::cells(radius, level),
        };
        let (coords, roles): (Vec<_>, Vec<_>) = cells.into_iter().unzip();
        let data = roles.iter().enumerate().filter(|(_, r)| !r.is_reserved()).map(|(i, _)| i);
        let data = data.collect::<Vec<_>>();

        debug!(%geometry, cells = coords.len(), data = data.len(), "Built layout");
        Ok(Self { geometry, coords, roles, data })
    }

    /// Memoized layout for the geometry
    pub fn shared(geometry: Geometry) -> SymbolResult<Arc<Self>> {
        static LAYOUTS: OnceLock<Mutex<LruCache<Geometry, Arc<Layout>>>> = OnceLock::new();

        let cache = LAYOUTS.get_or_init(|| {
            Mutex::new(LruCache::new(NonZeroUsize::new(LAYOUT_CACHE_SIZE).unwrap()))
        });
        let mut cache = cache.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(layout) = cache.get(&geometry) {
            return Ok(Arc::clone(layout));
        }

        let layout = Arc::new(Self::new(geometry)?);
        cache.put(geometry, Arc::clone(&layout));
        Ok(layout)
    }

    pub fn geometry(&self) -> Geometry {
        self.geometry
    }

    pub fn len(&self) -> usize {
        self.coords.len()
    }

    pub fn is_empty(&self) -> bool {
        self.coords.is_empty()
    }

    /// Every cell in scan order
    pub fn coords(&self) -> &[Coord] {
        &self.coords
    }

    pub fn roles(&self) -> &[Role] {
        &self.roles
    }

    pub fn reserved(&self) -> HashSet<Coord> {
        self.coords
            .iter()
            .zip(&self.roles)
            .filter(|(_, r)| r.is_reserved())
            .map(|(&c, _)| c)
            .collect()
    }

    pub fn ecc_index(&self) -> Option<usize> {
        self.roles.iter().position(|&r| r == Role::EccLevel)
    }

    /// Scan index of the n-th data cell
    pub fn data_index(&self, n: usize) -> usize {
        self.data[n]
    }

    pub fn bits_per_module(&self) -> usize {
        self.geometry.bits_per_module()
    }

    /// Number of data cells
    pub fn capacity(&self) -> usize {
        self.data.len()
    }

    /// Whole bytes the data cells can carry
    pub fn data_capacity_bytes(&self) -> usize {
        self.capacity() * self.bits_per_module() / 8
    }

    /// Symbol slots of the canvas. Parity symbols are charged against this count.
    pub fn slots(&self) -> usize {
        match self.geometry {
            Geometry::Linear { len, .. } => len,
            Geometry::Hex { .. } => self.len() / 8,
        }
    }

    /// Codeword bytes the canvas holds when `nsym` parity bytes are in use
    pub fn codeword_budget(&self, nsym: usize) -> usize {
        self.data_capacity_bytes().min(self.slots().saturating_sub(nsym))
    }

    /// Codeword byte carried by the n-th data cell
    pub fn byte_of_data_cell(&self, n: usize) -> usize {
        n * self.bits_per_module() / 8
    }
}

// Pack & unpack
//------------------------------------------------------------------------------

impl Layout {
    /// Spreads `data` over the data cells, `bits_per_module` bits per cell, most significant
    /// first. Cells past the end of the data are zero.
    pub fn pack(&self, data: &[u8], ecc: u8) -> Vec<Module> {
        let bpm = self.bits_per_module();
        debug_assert!(
            data.len() * 8 <= self.capacity() * bpm,
            "Data overflows layout: Bits {}, Capacity {}",
            data.len() * 8,
            self.capacity() * bpm
        );

        let mut bits = BitStream::from(data);
        self.roles
            .iter()
            .map(|role| match role {
                Role::Finder => Module::Finder,
                Role::EccLevel => Module::EccLevel(ecc),
                Role::Blank => Module::Blank,
                Role::Data => {
                    let take = |v: u8, _: usize| (v << 1) | bits.take().unwrap_or(false) as u8;
                    Module::Data((0..bpm).fold(0, take))
                }
            })
            .collect()
    }

    /// Reads the data cells back in scan order and regroups their bits into bytes. A trailing
    /// partial byte is dropped.
    pub fn unpack(&self, canvas: &[Module]) -> SymbolResult<Vec<u8>> {
        if canvas.len() != self.len() {
            return Err(SymbolError::LayoutMismatch);
        }

        let bpm = self.bits_per_module();
        let mask = ((1u16 << bpm) - 1) as u8;
        let mut bits = BitStream::new(self.capacity() * bpm);
        for (&module, &role) in canvas.iter().zip(&self.roles) {
            match (module, role) {
                (Module::Data(v), Role::Data) => bits.push_bits(v & mask, bpm),
                (Module::Data(_), _) | (_, Role::Data) => return Err(SymbolError::LayoutMismatch),
                _ => {}
            }
        }
        Ok(bits.whole_bytes().to_vec())
    }
}
