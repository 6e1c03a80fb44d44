//! Orientation search and geometric normalization. The raster is tried at the four axis-aligned
//! rotations and the first that shows the expected finder pattern is rescaled to a known pitch.

use image::RgbImage;
use tracing::{debug, warn};

use super::sample::hex_bit;
use crate::common::{
    color::{is_black, is_colored},
    layout::hex,
    raster::{crop, mean_rect, resize, rotate},
    utils::{SymbolError, SymbolResult},
};

pub const ROTATIONS: [u32; 4] = [0, 90, 180, 270];

// Relative aspect ratio deviation a hex raster may show
const ASPECT_TOLERANCE: f64 = 0.05;

// Pixels the span estimate of the pitch may differ from the first finder run
const PITCH_TOLERANCE: f64 = 1.5;

// Linear
//------------------------------------------------------------------------------

/// Linear raster cropped to start at the first finder, with modules `pitch` pixels wide
#[derive(Debug, Clone)]
pub struct Normalized {
    pub img: RgbImage,
    pub pitch: u32,
}

// Black run of the first finder on the scan band
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct BarRun {
    row: u32,
    start: u32,
    pitch: u32,
    // One past the last black column
    end: u32,
}

pub fn normalize_linear(
    img: &RgbImage,
    total: usize,
    expected_pitch: Option<u32>,
) -> SymbolResult<Normalized> {
    for deg in ROTATIONS {
        let rotated = rotate(img, deg);
        if let Some(run) = locate_bars(&rotated) {
            debug!(deg, start = run.start, pitch = run.pitch, "Found orientation");
            return rectify_linear(&rotated, run, total, expected_pitch);
        }
    }
    Err(SymbolError::OrientationNotFound)
}

// Central half of the raster height. Columns are averaged over it so stray pixels can't break
// a finder run.
fn scan_band(h: u32) -> (i64, i64) {
    let h = h as i64;
    (h / 4, h - h / 4)
}

fn locate_bars(img: &RgbImage) -> Option<BarRun> {
    let (w, h) = img.dimensions();
    if w == 0 || h == 0 {
        return None;
    }

    let (y0, y1) = scan_band(h);
    let black = (0..w as i64)
        .map(|x| mean_rect(img, x, y0, x + 1, y1).is_some_and(is_black))
        .collect::<Vec<_>>();
    let start = black.iter().position(|&b| b)?;
    let pitch = black[start..].iter().position(|&b| !b)?;
    let end = black.iter().rposition(|&b| b)? + 1;

    // First three modules must read black, colored, black
    let module_mean = |k: i64| {
        let p = pitch as i64;
        let cx = start as i64 + k * p + p / 2;
        mean_rect(img, cx - p / 4, y0, cx + p / 4 + 1, y1)
    };
    let ok = module_mean(0).is_some_and(is_black)
        && module_mean(1).is_some_and(is_colored)
        && module_mean(2).is_some_and(is_black);

    let (start, pitch, end) = (start as u32, pitch as u32, end as u32);
    ok.then_some(BarRun { row: h / 2, start, pitch, end })
}

fn rectify_linear(
    img: &RgbImage,
    run: BarRun,
    total: usize,
    expected_pitch: Option<u32>,
) -> SymbolResult<Normalized> {
    // Spreading the finder span over every module beats a single rounded run width, unless the
    // closing finder is gone
    let span_pitch = (run.end - run.start) as f64 / total as f64;
    let measured = match (span_pitch - run.pitch as f64).abs() <= PITCH_TOLERANCE {
        true => span_pitch,
        false => {
            warn!(span_pitch, run = run.pitch, "Closing finder not found, using first finder");
            run.pitch as f64
        }
    };
    let pitch = expected_pitch.unwrap_or_else(|| (measured.round() as u32).max(1));
    let scale = pitch as f64 / measured;
    debug!(pitch, scale, "Rescaling raster");

    let (w, h) = img.dimensions();
    let sw = ((w as f64 * scale).round() as u32).max(1);
    let sh = ((h as f64 * scale).round() as u32).max(1);
    let scaled = resize(img, sw, sh);
    let start = ((run.start as f64 * scale).round() as u32).min(sw - 1);

    // Vertical extent of the first finder
    let (x0, x1) = ((start + pitch / 4) as i64, (start + pitch - pitch / 4) as i64);
    let mid = ((run.row as f64 * scale) as u32).min(sh - 1);
    let black = |y: u32| mean_rect(&scaled, x0, y as i64, x1, y as i64 + 1).is_some_and(is_black);
    let top = (0..=mid).rev().take_while(|&y| black(y)).last().unwrap_or(mid);
    let bottom = (mid..sh).take_while(|&y| black(y)).last().map_or(mid + 1, |y| y + 1);

    let modules = (sw - start) / pitch;
    if modules < 3 {
        return Err(SymbolError::InsufficientWidth);
    }
    debug!(modules, top, bottom, "Cropping to symbol");

    let img = crop(&scaled, start, top, modules * pitch, bottom - top);
    Ok(Normalized { img, pitch })
}

// Hex
//------------------------------------------------------------------------------

/// Rotates and resizes a hex raster to the canonical dimensions for hexagon side `side`
pub fn normalize_hex(
    img: &RgbImage,
    radius: usize,
    level: usize,
    side: u32,
) -> SymbolResult<RgbImage> {
    let s = side as f64;
    let (cw, ch) = hex::raster_size(radius, s);
    let target = cw as f64 / ch as f64;
    let mut too_small = false;

    for deg in ROTATIONS {
        let rotated = rotate(img, deg);
        let (w, h) = rotated.dimensions();
        if w == 0 || h == 0 {
            continue;
        }
        let aspect = w as f64 / h as f64;
        if (aspect - target).abs() > ASPECT_TOLERANCE * target {
            continue;
        }
        // Hexagon side the raster actually shows
        if w as f64 / cw as f64 * s < 1.0 {
            too_small = true;
            continue;
        }

        let canon = resize(&rotated, cw, ch);
        if finders_visible(&canon, radius, level, s) {
            debug!(deg, w, h, "Found orientation");
            return Ok(canon);
        }
    }

    match too_small {
        true => Err(SymbolError::InsufficientWidth),
        false => Err(SymbolError::OrientationNotFound),
    }
}

// Every finder center is dark and at most one cell of each ring is not
fn finders_visible(img: &RgbImage, radius: usize, level: usize, side: f64) -> bool {
    let dark = |c: hex::Axial| hex_bit(img, c, side) == Some(1);
    hex::finder_centers(radius, level).into_iter().all(|center| {
        let cells = hex::finder_cells(center, level, radius);
        let ring = &cells[1..];
        dark(center) && ring.iter().filter(|&&c| dark(c)).count() + 1 >= ring.len()
    })
}

#[cfg(test)]
mod orient_tests {
    use super::{normalize_hex, normalize_linear};
    use crate::builder::SymbolBuilder;
    use crate::common::{
        color::WHITE,
        layout::hex,
        metadata::Geometry,
        raster::{blank, crop, pixel, resize, rotate},
        utils::{ErrorKind, SymbolError},
    };

    #[test]
    fn test_linear_rotations() {
        let symbol = SymbolBuilder::new(b"HELLO").build().unwrap();
        let img = symbol.to_image();
        for deg in [0, 90, 180, 270] {
            let norm = normalize_linear(&rotate(&img, deg), 150, None).unwrap();
            assert_eq!(norm.pitch, 20);
            assert_eq!(norm.img.dimensions(), (3000, 100), "rotation {deg}");
            assert_eq!(norm.img, img, "rotation {deg}");
        }
    }

    #[test]
    fn test_linear_rescale() {
        let mut builder = SymbolBuilder::new(b"HELLO");
        let img = builder.module_size(4).bar_height(30).build().unwrap().to_image();
        let big = resize(&img, 1800, 90);

        let norm = normalize_linear(&big, 150, None).unwrap();
        assert_eq!(norm.pitch, 12);
        assert_eq!(norm.img.width(), 1800);

        let norm = normalize_linear(&big, 150, Some(4)).unwrap();
        assert_eq!(norm.pitch, 4);
        assert_eq!(norm.img, img);
    }

    #[test]
    fn test_linear_margin() {
        let img = SymbolBuilder::new(b"HELLO").build().unwrap().to_image();
        let mut padded = blank(3100, 160, WHITE);
        image::imageops::replace(&mut padded, &img, 40, 30);

        let norm = normalize_linear(&padded, 150, Some(20)).unwrap();
        assert_eq!(norm.img.dimensions(), (3060, 100));
        assert_eq!(crop(&norm.img, 0, 0, 3000, 100), img);
    }

    #[test]
    fn test_linear_stray_pixel() {
        let img = SymbolBuilder::new(b"HELLO").build().unwrap().to_image();
        let mut noisy = img.clone();
        noisy.put_pixel(3, 50, WHITE);

        let norm = normalize_linear(&noisy, 150, None).unwrap();
        assert_eq!(norm.pitch, 20);
        assert_eq!(norm.img, noisy);
    }

    #[test]
    fn test_linear_lost_closing_finder() {
        let img = SymbolBuilder::new(b"HELLO").build().unwrap().to_image();
        let norm = normalize_linear(&crop(&img, 0, 0, 1000, 100), 150, None).unwrap();
        assert_eq!(norm.pitch, 20);
        assert_eq!(norm.img.dimensions(), (1000, 100));
    }

    #[test]
    fn test_linear_not_found() {
        let err = normalize_linear(&blank(200, 50, WHITE), 150, None).unwrap_err();
        assert_eq!(err, SymbolError::OrientationNotFound);
        assert_eq!(err.kind(), ErrorKind::Geometry);
    }

    #[test]
    fn test_hex_rotations() {
        let mut builder = SymbolBuilder::new(b"hex!");
        builder.geometry(Geometry::hex(6)).ecc(2).module_size(10);
        let img = builder.build().unwrap().to_image();
        for deg in [0, 90, 180, 270] {
            let canon = normalize_hex(&rotate(&img, deg), 6, 3, 10).unwrap();
            let (w, h) = canon.dimensions();
            assert_eq!((w, h), img.dimensions());
            for c in hex::scan(6) {
                let (x, y) = hex::pixel_center(c, 10.0, w, h);
                let (x, y) = (x as u32, y as u32);
                assert_eq!(pixel(&canon, x, y), pixel(&img, x, y), "rotation {deg} cell {c:?}");
            }
        }
    }

    #[test]
    fn test_hex_errors() {
        let mut builder = SymbolBuilder::new(b"hex!");
        let img = builder.geometry(Geometry::hex(6)).ecc(2).build().unwrap().to_image();
        // Same aspect ratio, hexagon side under one pixel
        let tiny = resize(&img, 14, 16);
        assert_eq!(normalize_hex(&tiny, 6, 3, 20), Err(SymbolError::InsufficientWidth));

        let (cw, ch) = hex::raster_size(6, 20.0);
        let empty = blank(cw, ch, WHITE);
        assert_eq!(normalize_hex(&empty, 6, 3, 20), Err(SymbolError::OrientationNotFound));
    }
}
