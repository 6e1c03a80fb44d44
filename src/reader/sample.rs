use image::{Rgb, RgbImage};
use tracing::warn;

use crate::common::{
    color::{classify, rgb_to_hsv},
    layout::{
        hex::{self, Axial},
        Coord, Layout, Module, Role,
    },
    raster::{mean_disk, mean_rect},
};

/// Modules read off a normalized raster
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sampled {
    pub modules: Vec<Module>,
    /// Ordinals of data cells that fell outside the raster
    pub missing: Vec<usize>,
    /// Value of the ECC level marker, if the layout has one
    pub marker: Option<u8>,
}

// Linear
//------------------------------------------------------------------------------

/// Samples bar `i` over the inner half of its footprint. The raster starts at the first finder
/// and every module is `pitch` pixels wide.
pub fn linear_value(img: &RgbImage, i: usize, pitch: u32) -> Option<u8> {
    let (p, h) = (pitch as i64, img.height() as i64);
    let x0 = i as i64 * p;
    let (dx, dy) = (p / 4, h / 4);
    if x0 >= img.width() as i64 {
        return None;
    }
    mean_rect(img, x0 + dx, dy, x0 + p - dx, h - dy).map(classify)
}

pub fn sample_linear(img: &RgbImage, layout: &Layout, pitch: u32) -> Sampled {
    sample_with(layout, |c| match c {
        Coord::Bar(i) => linear_value(img, i, pitch),
        Coord::Axial(..) => None,
    })
}

// Hex
//------------------------------------------------------------------------------

/// Bit of one hex cell: 1 when the disk around its center is dark
pub fn hex_bit(img: &RgbImage, c: Axial, side: f64) -> Option<u8> {
    let (w, h) = img.dimensions();
    let (cx, cy) = hex::pixel_center(c, side, w, h);
    let Rgb([r, g, b]) = mean_disk(img, cx, cy, 0.5 * side)?;
    let (_, _, v) = rgb_to_hsv(r / 255.0, g / 255.0, b / 255.0);
    Some((v < 0.5) as u8)
}

pub fn sample_hex(img: &RgbImage, layout: &Layout, side: f64) -> Sampled {
    sample_with(layout, |c| match c {
        Coord::Axial(q, r) => hex_bit(img, (q, r), side),
        Coord::Bar(_) => None,
    })
}

// Walks the layout once, building modules by role and recording data cells `read_cell`
// can't see
fn sample_with(layout: &Layout, read_cell: impl Fn(Coord) -> Option<u8>) -> Sampled {
    let mut modules = Vec::with_capacity(layout.len());
    let mut missing = Vec::new();
    let mut marker = None;
    let mut n = 0;

    for (&c, &role) in layout.coords().iter().zip(layout.roles()) {
        let module = match role {
            Role::Finder => Module::Finder,
            Role::Blank => Module::Blank,
            Role::EccLevel => {
                marker = read_cell(c);
                Module::EccLevel(marker.unwrap_or(0))
            }
            Role::Data => {
                let v = read_cell(c).unwrap_or_else(|| {
                    missing.push(n);
                    0
                });
                n += 1;
                Module::Data(v)
            }
        };
        modules.push(module);
    }

    if !missing.is_empty() {
        warn!(count = missing.len(), "Data cells outside raster, treating as erasures");
    }
    Sampled { modules, missing, marker }
}
