//! Thin raster canvas over `image` and `imageproc`. The symbol core only ever touches pixels
//! through these helpers.

use std::path::Path;

use image::{
    imageops::{self, FilterType},
    ImageResult, Rgb, RgbImage,
};
use imageproc::{
    drawing::{draw_filled_rect_mut, draw_polygon_mut},
    point::Point,
    rect::Rect,
};

pub fn blank(w: u32, h: u32, bg: Rgb<u8>) -> RgbImage {
    RgbImage::from_pixel(w, h, bg)
}

/// Fills the half-open box [x0, x1) x [y0, y1). Empty boxes are ignored.
pub fn fill_rect(img: &mut RgbImage, x0: i32, y0: i32, x1: i32, y1: i32, color: Rgb<u8>) {
    if x1 <= x0 || y1 <= y0 {
        return;
    }
    let rect = Rect::at(x0, y0).of_size((x1 - x0) as u32, (y1 - y0) as u32);
    draw_filled_rect_mut(img, rect, color);
}

pub fn fill_polygon(img: &mut RgbImage, poly: &[Point<i32>], color: Rgb<u8>) {
    if poly.len() < 3 || poly.first() == poly.last() {
        return;
    }
    draw_polygon_mut(img, poly, color);
}

pub fn load<P: AsRef<Path>>(path: P) -> ImageResult<RgbImage> {
    Ok(image::open(path)?.to_rgb8())
}

pub fn save<P: AsRef<Path>>(img: &RgbImage, path: P) -> ImageResult<()> {
    img.save(path)
}

pub fn pixel(img: &RgbImage, x: u32, y: u32) -> Option<Rgb<u8>> {
    img.get_pixel_checked(x, y).copied()
}

/// Clockwise rotation by a multiple of 90 degrees. The canvas grows to fit.
pub fn rotate(img: &RgbImage, degrees: u32) -> RgbImage {
    match degrees % 360 {
        90 => imageops::rotate90(img),
        180 => imageops::rotate180(img),
        270 => imageops::rotate270(img),
        _ => img.clone(),
    }
}

/// Nearest neighbour keeps module colors exact
pub fn resize(img: &RgbImage, w: u32, h: u32) -> RgbImage {
    if img.dimensions() == (w, h) {
        return img.clone();
    }
    imageops::resize(img, w, h, FilterType::Nearest)
}

pub fn crop(img: &RgbImage, x: u32, y: u32, w: u32, h: u32) -> RgbImage {
    imageops::crop_imm(img, x, y, w, h).to_image()
}

/// Mean color over the pixels of `[x0, x1) x [y0, y1)` clipped to the raster
pub fn mean_rect(img: &RgbImage, x0: i64, y0: i64, x1: i64, y1: i64) -> Option<Rgb<f64>> {
    let (w, h) = img.dimensions();
    let (x0, x1) = (x0.max(0), x1.min(w as i64));
    let (y0, y1) = (y0.max(0), y1.min(h as i64));
    mean_of(img, (y0..y1).flat_map(|y| (x0..x1).map(move |x| (x, y))))
}

/// Mean color over the pixels whose centers lie within `radius` of (cx, cy)
pub fn mean_disk(img: &RgbImage, cx: f64, cy: f64, radius: f64) -> Option<Rgb<f64>> {
    let (w, h) = img.dimensions();
    let x0 = (cx - radius).floor().max(0.0) as i64;
    let y0 = (cy - radius).floor().max(0.0) as i64;
    let x1 = ((cx + radius).ceil() as i64 + 1).min(w as i64);
    let y1 = ((cy + radius).ceil() as i64 + 1).min(h as i64);
    let r2 = radius * radius;
    let pts = (y0..y1).flat_map(|y| (x0..x1).map(move |x| (x, y))).filter(|&(x, y)| {
        let dx = x as f64 + 0.5 - cx;
        let dy = y as f64 + 0.5 - cy;
        dx * dx + dy * dy <= r2
    });
    mean_of(img, pts)
}

fn mean_of(img: &RgbImage, pts: impl Iterator<Item = (i64, i64)>) -> Option<Rgb<f64>> {
    let mut sum = [0f64; 3];
    let mut n = 0usize;
    for (x, y) in pts {
        let Rgb(px) = img.get_pixel(x as u32, y as u32);
        sum.iter_mut().zip(px).for_each(|(s, &c)| *s += c as f64);
        n += 1;
    }
    if n == 0 {
        return None;
    }
    Some(Rgb(sum.map(|s| s / n as f64)))
}

#[cfg(test)]
mod raster_tests {
    use super::{blank, crop, fill_polygon, fill_rect, mean_disk, mean_rect, pixel, resize, rotate};
    use crate::common::color::{BLACK, WHITE};
    use image::Rgb;
    use imageproc::point::Point;

    #[test]
    fn test_fill_rect_half_open() {
        let mut img = blank(10, 10, WHITE);
        fill_rect(&mut img, 2, 3, 5, 4, BLACK);
        assert_eq!(pixel(&img, 2, 3), Some(BLACK));
        assert_eq!(pixel(&img, 4, 3), Some(BLACK));
        assert_eq!(pixel(&img, 5, 3), Some(WHITE));
        assert_eq!(pixel(&img, 2, 4), Some(WHITE));
        assert_eq!(pixel(&img, 10, 0), None);
    }

    #[test]
    fn test_fill_polygon() {
        let mut img = blank(20, 20, WHITE);
        let poly = [Point::new(2, 2), Point::new(17, 2), Point::new(17, 17), Point::new(2, 17)];
        fill_polygon(&mut img, &poly, BLACK);
        assert_eq!(pixel(&img, 10, 10), Some(BLACK));
        assert_eq!(pixel(&img, 0, 0), Some(WHITE));
    }

    #[test]
    fn test_rotate() {
        let mut img = blank(4, 2, WHITE);
        fill_rect(&mut img, 0, 0, 1, 1, BLACK);
        let r90 = rotate(&img, 90);
        assert_eq!(r90.dimensions(), (2, 4));
        assert_eq!(pixel(&r90, 1, 0), Some(BLACK));
        let r180 = rotate(&img, 180);
        assert_eq!(pixel(&r180, 3, 1), Some(BLACK));
        let r270 = rotate(&img, 270);
        assert_eq!(pixel(&r270, 0, 3), Some(BLACK));
        assert_eq!(rotate(&img, 360), img);
    }

    #[test]
    fn test_resize_crop() {
        let mut img = blank(4, 4, WHITE);
        fill_rect(&mut img, 0, 0, 2, 4, BLACK);
        let big = resize(&img, 8, 8);
        assert_eq!(pixel(&big, 3, 7), Some(BLACK));
        assert_eq!(pixel(&big, 4, 0), Some(WHITE));
        let c = crop(&big, 2, 0, 4, 2);
        assert_eq!(c.dimensions(), (4, 2));
        assert_eq!(pixel(&c, 1, 0), Some(BLACK));
        assert_eq!(pixel(&c, 2, 0), Some(WHITE));
    }

    #[test]
    fn test_means() {
        let mut img = blank(10, 10, WHITE);
        fill_rect(&mut img, 0, 0, 5, 10, Rgb([0, 0, 0]));
        assert_eq!(mean_rect(&img, 0, 0, 10, 10), Some(Rgb([127.5, 127.5, 127.5])));
        assert_eq!(mean_rect(&img, -3, -3, 2, 2), Some(Rgb([0.0, 0.0, 0.0])));
        assert_eq!(mean_rect(&img, 20, 20, 30, 30), None);
        assert_eq!(mean_disk(&img, 7.5, 5.0, 1.5), Some(Rgb([255.0, 255.0, 255.0])));
    }
}
