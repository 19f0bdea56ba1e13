use ndarray::{Array2, ArrayView2};

use crate::shared::frame::Frame;

const R_WEIGHT: u32 = 4899;
const G_WEIGHT: u32 = 9617;
const B_WEIGHT: u32 = 1868;
const SHIFT: u32 = 14;

/// BT.601 luma in 14-bit fixed point, rounded to 8 bits.
pub fn bt601_luma(r: u8, g: u8, b: u8) -> u8 {
    let weighted = r as u32 * R_WEIGHT + g as u32 * G_WEIGHT + b as u32 * B_WEIGHT;
    ((weighted + (1 << (SHIFT - 1))) >> SHIFT) as u8
}

/// Converts an RGB frame to a single-channel luminance plane of shape (height, width).
pub fn luma_plane(frame: &Frame) -> Array2<u8> {
    let rgb = frame.as_ndarray();
    let (h, w) = (frame.height() as usize, frame.width() as usize);
    Array2::from_shape_fn((h, w), |(y, x)| {
        bt601_luma(rgb[[y, x, 0]], rgb[[y, x, 1]], rgb[[y, x, 2]])
    })
}

/// Mirrors an out-of-range index across the edge without repeating the edge
/// sample (`-1 -> 1`, `n -> n - 2`). Only handles offsets of one.
pub fn reflect_101(i: isize, n: usize) -> usize {
    if n == 1 {
        return 0;
    }
    let last = n as isize - 1;
    let mirrored = if i < 0 {
        -i
    } else if i > last {
        2 * last - i
    } else {
        i
    };
    mirrored as usize
}

/// 4-neighbour discrete Laplacian (`[0 1 0; 1 -4 1; 0 1 0]`) with reflect-101 borders.
pub fn laplacian(plane: ArrayView2<'_, u8>) -> Array2<f64> {
    let (h, w) = plane.dim();
    Array2::from_shape_fn((h, w), |(y, x)| {
        let at = |dy: isize, dx: isize| {
            let yy = reflect_101(y as isize + dy, h);
            let xx = reflect_101(x as isize + dx, w);
            plane[[yy, xx]] as f64
        };
        at(-1, 0) + at(1, 0) + at(0, -1) + at(0, 1) - 4.0 * at(0, 0)
    })
}
