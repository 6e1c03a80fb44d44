//! Hexagonal lattice in axial coordinates. Three finder clusters sit `level` cells inward from
//! alternating corners of the lattice. Each cluster is the ring at distance `level` around its
//! center together with the center cell.
//!
//! Pixel geometry is flat-top: a cell of side `s` at (q, r) is centered at
//! `(W/2 + 1.5 s q, H/2 + sqrt(3) s (r + q/2))`.

use std::collections::HashSet;

use super::{Coord, Role};

pub type Axial = (i32, i32);

// Lattice
//------------------------------------------------------------------------------

pub fn cell_count(radius: usize) -> usize {
    1 + 3 * radius * (radius + 1)
}

pub fn distance(a: Axial, b: Axial) -> i32 {
    let dq = a.0 - b.0;
    let dr = a.1 - b.1;
    (dq.abs() + dr.abs() + (dq + dr).abs()) / 2
}

/// Axial coordinates in scan order: q ascending, then r ascending
pub fn scan(radius: usize) -> impl Iterator<Item = Axial> {
    let r = radius as i32;
    (-r..=r).flat_map(move |q| ((-r).max(-q - r)..=r.min(-q + r)).map(move |rr| (q, rr)))
}

pub fn finder_centers(radius: usize, level: usize) -> [Axial; 3] {
    let (r, l) = (radius as i32, level as i32);
    [(-r + l, 0), (r - l, -r + l), (0, r - l)]
}

/// Cells of one finder cluster: the center followed by its ring
pub fn finder_cells(center: Axial, level: usize, radius: usize) -> Vec<Axial> {
    let l = level as i32;
    let mut res = vec![center];
    res.extend(scan(radius).filter(|&c| distance(c, center) == l));
    res
}

pub fn reserved(radius: usize, level: usize) -> HashSet<Axial> {
    let centers = finder_centers(radius, level);
    centers.iter().flat_map(|&c| finder_cells(c, level, radius)).collect()
}

pub(super) fn cells(radius: usize, level: usize) -> Vec<(Coord, Role)> {
    let reserved = reserved(radius, level);
    scan(radius)
        .map(|c| {
            let role = if reserved.contains(&c) { Role::Finder } else { Role::Data };
            (Coord::Axial(c.0, c.1), role)
        })
        .collect()
}

// Pixel geometry
//------------------------------------------------------------------------------

const SQRT_3: f64 = 1.732_050_807_568_877_2;

/// Raster size of a lattice with hexagon side `side`
pub fn raster_size(radius: usize, side: f64) -> (u32, u32) {
    let n = (2 * radius + 1) as f64;
    let w = n * 1.5 * side + 2.0 * side;
    let h = n * SQRT_3 * side + 2.0 * side;
    (w as u32, h as u32)
}

pub fn pixel_center(c: Axial, side: f64, w: u32, h: u32) -> (f64, f64) {
    let (q, r) = (c.0 as f64, c.1 as f64);
    let x = (w / 2) as f64 + 1.5 * side * q;
    let y = (h / 2) as f64 + SQRT_3 * side * (r + q / 2.0);
    (x, y)
}

/// Flat-top hexagon corners around a pixel center
pub fn corners(center: (f64, f64), side: f64) -> [(f64, f64); 6] {
    let (cx, cy) = center;
    std::array::from_fn(|i| {
        let a = std::f64::consts::FRAC_PI_3 * i as f64;
        (cx + side * a.cos(), cy + side * a.sin())
    })
}

#[cfg(test)]
mod hex_tests {
    use std::collections::HashSet;

    use super::{cell_count, distance, finder_centers, pixel_center, raster_size, reserved, scan};

    #[test]
    fn test_scan_order() {
        let cells = scan(1).collect::<Vec<_>>();
        assert_eq!(cells, vec![(-1, 0), (-1, 1), (0, -1), (0, 0), (0, 1), (1, -1), (1, 0)]);
        for r in 0..12 {
            let cells = scan(r).collect::<Vec<_>>();
            assert_eq!(cells.len(), cell_count(r));
            assert_eq!(cells.iter().collect::<HashSet<_>>().len(), cells.len());
            assert!(cells.iter().all(|&c| distance(c, (0, 0)) <= r as i32));
        }
    }

    #[test]
    fn test_finder_centers() {
        assert_eq!(finder_centers(10, 3), [(-7, 0), (7, -7), (0, 7)]);
        for c in finder_centers(10, 3) {
            assert_eq!(distance(c, (0, 0)), 7);
        }
    }

    #[test]
    fn test_reserved_is_annulus() {
        let res = reserved(10, 3);
        let center = (-7, 0);
        assert!(res.contains(&center));
        assert!(res.contains(&(-10, 0)));
        // Interior of the ring stays free
        assert!(!res.contains(&(-6, 0)));
        assert!(!res.contains(&(-8, 1)));
    }

    #[test]
    fn test_reserved_count() {
        // Three disjoint clusters of 1 + 6 L cells
        assert_eq!(reserved(10, 3).len(), 57);
        assert_eq!(reserved(10, 1).len(), 21);
        // Coincident centers share one cluster
        assert_eq!(reserved(3, 3).len(), 19);
    }

    #[test]
    fn test_pixel_geometry() {
        let (w, h) = raster_size(10, 10.0);
        assert_eq!((w, h), (335, 383));
        assert_eq!(pixel_center((0, 0), 10.0, w, h), (167.0, 191.0));
        let (x, y) = pixel_center((2, -1), 10.0, w, h);
        assert_eq!(x, 197.0);
        assert!((y - 191.0).abs() < 1e-9);
    }
}
