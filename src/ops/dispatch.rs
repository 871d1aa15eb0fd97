// ============================================================================
// DISPATCH — data-parallel map of a per-pixel kernel over an image
// ============================================================================
//
// Rows are handed to rayon workers; each worker reads only its own input
// pixels and the shared, immutable kernel.  Output is identical regardless
// of scheduling order.

use image::RgbaImage;
use rayon::prelude::*;

use crate::ops::shadow::PixelKernel;
use crate::pixel::Pixel;

/// Apply `kernel` to every pixel of `src`, returning a new image.
pub fn dispatch<K: PixelKernel + ?Sized>(kernel: &K, src: &RgbaImage) -> RgbaImage {
    let mut out = src.clone();
    dispatch_in_place(kernel, &mut out);
    out
}

/// Apply `kernel` to every pixel of `img` in place.
pub fn dispatch_in_place<K: PixelKernel + ?Sized>(kernel: &K, img: &mut RgbaImage) {
    let w = img.width() as usize;
    if w == 0 || img.height() == 0 {
        return;
    }
    let stride = w * 4;
    let raw: &mut [u8] = img.as_mut();

    raw.par_chunks_mut(stride).enumerate().for_each(|(y, row)| {
        for (x, px) in row.chunks_exact_mut(4).enumerate() {
            let input = Pixel([px[0], px[1], px[2], px[3]]);
            let out = kernel.root(input, x as u32, y as u32);
            px.copy_from_slice(&out.0);
        }
    });
}

/// Apply `kernel` to a raw packed RGBA8 buffer of `width` pixels per row.
/// Trailing bytes that do not form a whole pixel are left untouched.
pub fn dispatch_raw<K: PixelKernel + ?Sized>(kernel: &K, data: &mut [u8], width: u32) {
    let stride = width as usize * 4;
    if stride == 0 {
        return;
    }
    data.par_chunks_mut(stride).enumerate().for_each(|(y, row)| {
        for (x, px) in row.chunks_exact_mut(4).enumerate() {
            let out = kernel.root(Pixel([px[0], px[1], px[2], px[3]]), x as u32, y as u32);
            px.copy_from_slice(&out.0);
        }
    });
}
