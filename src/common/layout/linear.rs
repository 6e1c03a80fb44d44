use super::{Coord, Role};

// Reserved bar positions: finder, ECC level marker, finder, overlay block, ..., finder
pub const FIRST_FINDER: usize = 0;
pub const ECC_MARKER: usize = 1;
pub const SECOND_FINDER: usize = 2;
pub const OVERLAY_START: usize = 3;

/// Physical bar count of a symbol with `len` logical positions and `overlay` extra cells
pub fn physical_len(len: usize, overlay: usize) -> usize {
    len + overlay
}

pub(super) fn cells(len: usize, overlay: usize) -> Vec<(Coord, Role)> {
    let n = physical_len(len, overlay);
    (0..n).map(|i| (Coord::Bar(i), role(i, n, overlay))).collect()
}

fn role(i: usize, n: usize, overlay: usize) -> Role {
    match i {
        FIRST_FINDER | SECOND_FINDER => Role::Finder,
        ECC_MARKER => Role::EccLevel,
        i if i == n - 1 => Role::Finder,
        i if i < OVERLAY_START + overlay => Role::Blank,
        _ => Role::Data,
    }
}
