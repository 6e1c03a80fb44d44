use image::{Rgb, RgbImage};
use imageproc::point::Point;

use crate::common::{
    color::{hue_color, BLACK, WHITE},
    layout::{hex, Coord, Layout, Module},
    metadata::{Geometry, SymbolConfig},
    raster::{blank, fill_polygon, fill_rect},
};

// Module colors
//------------------------------------------------------------------------------

/// Linear bars carry a byte as hue. The sentinels 0 and 255 are drawn white.
pub fn linear_color(module: Module) -> Rgb<u8> {
    match module {
        Module::Finder => BLACK,
        Module::EccLevel(v) => hue_color(v),
        Module::Data(0 | 255) | Module::Blank => WHITE,
        Module::Data(v) => hue_color(v),
    }
}

/// Hex cells carry a single bit: black is 1.
pub fn hex_color(module: Module) -> Rgb<u8> {
    match module {
        Module::Finder | Module::Data(1) => BLACK,
        Module::EccLevel(v) => hue_color(v),
        _ => WHITE,
    }
}

// Render
//------------------------------------------------------------------------------

/// Draws modules laid out by `layout` into a fresh raster
pub fn render(layout: &Layout, modules: &[Module], config: &SymbolConfig) -> RgbImage {
    debug_assert_eq!(layout.len(), modules.len(), "Module count doesn't match layout");

    match layout.geometry() {
        Geometry::Linear { .. } => render_linear(layout, modules, config),
        Geometry::Hex { radius, level } => render_hex(layout, modules, config, radius, level),
    }
}

fn render_linear(layout: &Layout, modules: &[Module], config: &SymbolConfig) -> RgbImage {
    let px = config.module_size;
    let (w, h) = (layout.len() as u32 * px, config.bar_height);
    let mut canvas = blank(w, h, WHITE);

    for (c, &m) in layout.coords().iter().zip(modules) {
        if let Coord::Bar(i) = *c {
            let x = (i as u32 * px) as i32;
            fill_rect(&mut canvas, x, 0, x + px as i32, h as i32, linear_color(m));
        }
    }
    canvas
}

fn render_hex(
    layout: &Layout,
    modules: &[Module],
    config: &SymbolConfig,
    radius: usize,
    level: usize,
) -> RgbImage {
    let side = config.module_size as f64;
    let (w, h) = hex::raster_size(radius, side);
    let mut canvas = blank(w, h, WHITE);

    for (c, &m) in layout.coords().iter().zip(modules) {
        let Coord::Axial(q, r) = *c else { continue };
        let color = hex_color(m);
        if color == WHITE {
            continue;
        }
        let center = hex::pixel_center((q, r), side, w, h);
        let poly = hex::corners(center, side)
            .map(|(x, y)| Point::new(x.round() as i32, y.round() as i32));
        fill_polygon(&mut canvas, &poly, color);
    }

    if config.calibration_strip && config.module_size >= 2 {
        draw_calibration_strip(&mut canvas, radius, level, config.module_size);
    }
    canvas
}

// Alternating squares of side s/2 in the top margin, spanning the x range between the first two
// finder centers
fn draw_calibration_strip(canvas: &mut RgbImage, radius: usize, level: usize, side: u32) {
    let (w, h) = canvas.dimensions();
    let [left, right, _] = hex::finder_centers(radius, level);
    let x0 = hex::pixel_center(left, side as f64, w, h).0.round() as i32;
    let x1 = hex::pixel_center(right, side as f64, w, h).0.round() as i32;
    let sq = (side / 2) as i32;
    let y0 = (side / 4) as i32;

    for (i, x) in (x0..x1).step_by(sq as usize).enumerate() {
        let color = if i % 2 == 0 { BLACK } else { WHITE };
        fill_rect(canvas, x, y0, (x + sq).min(x1), y0 + sq, color);
    }
}
