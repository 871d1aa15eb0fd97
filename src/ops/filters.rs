// ============================================================================
// BLUR — rayon-parallel separable Gaussian blur for shadow softening
// ============================================================================

use image::RgbaImage;
use rayon::prelude::*;

/// Largest blur radius the shadow pipeline accepts.
pub const MAX_BLUR_RADIUS: f32 = 25.0;

/// Convert a blur radius (in pixels, 0..=25) to a Gaussian sigma.
/// Uses the conventional `0.4 * r + 0.6` mapping of platform blur intrinsics.
pub fn radius_to_sigma(radius: f32) -> f32 {
    0.4 * radius + 0.6
}

/// Blur by radius.  A radius of zero (or less) returns the source unchanged.
pub fn blur_radius(src: &RgbaImage, radius: f32) -> RgbaImage {
    if radius <= 0.0 || !radius.is_finite() {
        return src.clone();
    }
    parallel_gaussian_blur(src, radius_to_sigma(radius.min(MAX_BLUR_RADIUS)))
}

/// Build a 1-D Gaussian kernel truncated at ceil(3*sigma).
fn build_gaussian_kernel(sigma: f32) -> Vec<f32> {
    let radius = (sigma * 3.0).ceil() as usize;
    if radius == 0 {
        return vec![1.0];
    }
    let len = radius * 2 + 1;
    let mut kernel = vec![0.0f32; len];
    let s2 = 2.0 * sigma * sigma;
    let mut sum = 0.0f32;
    for (i, item) in kernel.iter_mut().enumerate() {
        let x = i as f32 - radius as f32;
        let v = (-x * x / s2).exp();
        *item = v;
        sum += v;
    }
    let inv = 1.0 / sum;
    for v in &mut kernel {
        *v *= inv;
    }
    kernel
}

/// Separable Gaussian blur, edges clamped.  Each pass is parallel by row.
///
/// Colour is blurred premultiplied by alpha, so transparent neighbours
/// fade a pixel out without darkening it.
pub fn parallel_gaussian_blur(src: &RgbaImage, sigma: f32) -> RgbaImage {
    let w = src.width() as usize;
    let h = src.height() as usize;
    if w == 0 || h == 0 || sigma <= 0.0 {
        return src.clone();
    }

    let kernel = build_gaussian_kernel(sigma);
    let radius = kernel.len() / 2;
    let stride = w * 4;
    let mut buf_in = Vec::with_capacity(src.as_raw().len());
    for px in src.as_raw().chunks_exact(4) {
        let a = px[3] as f32;
        let k = a / 255.0;
        buf_in.extend_from_slice(&[px[0] as f32 * k, px[1] as f32 * k, px[2] as f32 * k, a]);
    }

    // --- Horizontal pass ---
    let mut buf_h = vec![0.0f32; buf_in.len()];
    buf_h.par_chunks_mut(stride).enumerate().for_each(|(y, row_out)| {
        let row_in = &buf_in[y * stride..(y + 1) * stride];
        for x in 0..w {
            let mut acc = [0.0f32; 4];
            for (ki, &kv) in kernel.iter().enumerate() {
                let sx = (x + ki).saturating_sub(radius).min(w - 1);
                let px = &row_in[sx * 4..sx * 4 + 4];
                for c in 0..4 {
                    acc[c] += px[c] * kv;
                }
            }
            row_out[x * 4..x * 4 + 4].copy_from_slice(&acc);
        }
    });

    // --- Vertical pass ---
    let mut dst_raw = vec![0u8; buf_in.len()];
    dst_raw.par_chunks_mut(stride).enumerate().for_each(|(y, row_out)| {
        for x in 0..w {
            let mut acc = [0.0f32; 4];
            for (ki, &kv) in kernel.iter().enumerate() {
                let sy = (y + ki).saturating_sub(radius).min(h - 1);
                let idx = sy * stride + x * 4;
                for c in 0..4 {
                    acc[c] += buf_h[idx + c] * kv;
                }
            }
            let a = acc[3];
            let unpremul = if a > 0.0 { 255.0 / a } else { 0.0 };
            for c in 0..3 {
                row_out[x * 4 + c] = (acc[c] * unpremul).round().clamp(0.0, 255.0) as u8;
            }
            row_out[x * 4 + 3] = a.round().clamp(0.0, 255.0) as u8;
        }
    });

    // Buffer length always equals w * h * 4.
    RgbaImage::from_raw(w as u32, h as u32, dst_raw).unwrap_or_else(|| src.clone())
}
