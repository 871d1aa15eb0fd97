// ============================================================================
// ELEVATION SHADOW — pad, tint, blur, and composite a drop shadow
// ============================================================================
//
// Geometry follows the elevation-image-view convention:
//   blur_radius = min(25 * elevation / (24dp * density), 25)
//   canvas      = image size + 2 * blur_radius on each axis
//   shadow drawn at (-blur_radius, -blur_radius / 2) relative to the image,
//   i.e. shifted down by half the blur radius.

use image::{GenericImage, RgbaImage};
use rayon::prelude::*;

use crate::error::ShadowError;
use crate::gpu::GpuShadowRenderer;
use crate::ops::dispatch::dispatch_in_place;
use crate::ops::filters::{self, MAX_BLUR_RADIUS};
use crate::settings::ShadowSettings;
use crate::{log_info, log_warn};

/// Elevation (in dp) at which the shadow reaches its maximum blur.
pub const MAX_ELEVATION_DP: f32 = 24.0;

/// Convert density-independent pixels to physical pixels.
pub fn dp_to_px(dp: f32, density: f32) -> f32 {
    dp * sanitize_density(density)
}

fn sanitize_density(density: f32) -> f32 {
    if density.is_finite() && density > 0.0 { density } else { 1.0 }
}

/// Blur radius (0..=25 px) for an elevation given in physical pixels.
pub fn blur_radius(elevation_px: f32, density: f32) -> f32 {
    if !(elevation_px > 0.0) || !elevation_px.is_finite() {
        return 0.0;
    }
    let max_elevation_px = dp_to_px(MAX_ELEVATION_DP, density);
    (MAX_BLUR_RADIUS * (elevation_px / max_elevation_px)).min(MAX_BLUR_RADIUS)
}

/// Whole-pixel padding added on each side of the shadow canvas.
#[inline]
pub fn padding(blur_radius: f32) -> u32 {
    blur_radius.max(0.0) as u32
}

/// Copy `src` into a transparent canvas enlarged by the blur padding.
/// Never returns an empty image: a degenerate canvas becomes 1x1.
pub fn shadow_canvas(src: &RgbaImage, blur_radius: f32) -> Result<RgbaImage, ShadowError> {
    let pad = padding(blur_radius);
    let w = src.width() + 2 * pad;
    let h = src.height() + 2 * pad;
    if w == 0 || h == 0 {
        return Ok(RgbaImage::new(1, 1));
    }
    let mut canvas = RgbaImage::new(w, h);
    if src.width() > 0 && src.height() > 0 {
        canvas.copy_from(src, pad, pad)?;
    }
    Ok(canvas)
}

/// Build the blurred shadow bitmap for `src`.
///
/// The tint runs on the GPU when a renderer is supplied and falls back to
/// the rayon dispatcher otherwise.
pub fn generate_shadow(
    src: &RgbaImage,
    settings: &ShadowSettings,
    gpu: Option<&GpuShadowRenderer>,
) -> Result<RgbaImage, ShadowError> {
    let tint = settings.tint();
    let radius = settings.blur_radius();
    let mut canvas = shadow_canvas(src, radius)?;

    let mut tinted_on_gpu = false;
    if let Some(gpu) = gpu {
        match gpu.apply(&tint, &canvas) {
            Ok(out) => {
                canvas = out;
                tinted_on_gpu = true;
            }
            Err(e) => log_warn!("GPU tint failed, using CPU path: {}", e),
        }
    }
    if !tinted_on_gpu {
        dispatch_in_place(&tint, &mut canvas);
    }

    log_info!(
        "shadow {}x{} tint={} radius={:.2} gpu={}",
        canvas.width(),
        canvas.height(),
        tint.name(),
        radius,
        tinted_on_gpu
    );

    Ok(filters::blur_radius(&canvas, radius))
}

/// Place `src` on the padded canvas and draw `shadow` underneath it.
///
/// `shadow` must come from [`generate_shadow`] with the same radius; pass
/// `None` to get the image alone (clipped shadow).
pub fn composite_with_shadow(
    src: &RgbaImage,
    shadow: Option<&RgbaImage>,
    blur_radius: f32,
) -> Result<RgbaImage, ShadowError> {
    let mut out = shadow_canvas(&RgbaImage::new(src.width(), src.height()), blur_radius)?;
    let pad = padding(blur_radius) as i64;

    if let Some(shadow) = shadow {
        // Image sits at (pad, pad); shadow origin is (image - r, image - r/2).
        let sx = pad - blur_radius as i64;
        let sy = pad - (blur_radius / 2.0) as i64;
        draw_over(&mut out, shadow, sx, sy);
    }
    draw_over(&mut out, src, pad, pad);
    Ok(out)
}

/// Full pipeline for one image: shadow alone, or image over its shadow.
pub fn render(
    src: &RgbaImage,
    settings: &ShadowSettings,
    composite: bool,
    gpu: Option<&GpuShadowRenderer>,
) -> Result<RgbaImage, ShadowError> {
    if settings.force_clip {
        log_info!("force_clip set: shadow is always clipped to the output canvas");
    }
    if composite {
        let radius = settings.blur_radius();
        if settings.clip_shadow || radius <= 0.0 {
            return composite_with_shadow(src, None, radius);
        }
        let shadow = generate_shadow(src, settings, gpu)?;
        return composite_with_shadow(src, Some(&shadow), radius);
    }
    generate_shadow(src, settings, gpu)
}

/// Non-premultiplied source-over of `top` onto `dst` at offset (ox, oy).
/// Parts of `top` outside `dst` are clipped.
fn draw_over(dst: &mut RgbaImage, top: &RgbaImage, ox: i64, oy: i64) {
    let dw = dst.width() as i64;
    let tw = top.width() as i64;
    let th = top.height() as i64;
    if dw == 0 || tw == 0 || th == 0 {
        return;
    }
    let stride = dw as usize * 4;
    let top_raw = top.as_raw();
    let top_stride = tw as usize * 4;
    let dst_raw: &mut [u8] = dst.as_mut();

    dst_raw.par_chunks_mut(stride).enumerate().for_each(|(y, row_out)| {
        let ty = y as i64 - oy;
        if ty < 0 || ty >= th {
            return;
        }
        let x_start = ox.max(0);
        let x_end = (ox + tw).min(dw);
        for x in x_start..x_end {
            let tx = (x - ox) as usize;
            let si = ty as usize * top_stride + tx * 4;
            let di = x as usize * 4;
            let sa = top_raw[si + 3] as f32 / 255.0;
            if sa <= 0.0 {
                continue;
            }
            let da = row_out[di + 3] as f32 / 255.0;
            let out_a = sa + da * (1.0 - sa);
            for c in 0..3 {
                let sc = top_raw[si + c] as f32;
                let dc = row_out[di + c] as f32;
                let v = (sc * sa + dc * da * (1.0 - sa)) / out_a;
                row_out[di + c] = v.round().clamp(0.0, 255.0) as u8;
            }
            row_out[di + 3] = (out_a * 255.0).round().clamp(0.0, 255.0) as u8;
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::FilterKind;
    use image::Rgba;

    fn settings(elevation_dp: f32, filter: FilterKind, is_translucent: bool) -> ShadowSettings {
        ShadowSettings {
            elevation_dp,
            filter,
            is_translucent,
            ..ShadowSettings::default()
        }
    }

    #[test]
    fn blur_radius_scales_with_elevation_and_caps_at_25() {
        assert_eq!(blur_radius(0.0, 1.0), 0.0);
        assert_eq!(blur_radius(-4.0, 1.0), 0.0);
        assert!((blur_radius(12.0, 1.0) - 12.5).abs() < 1e-5);
        assert!((blur_radius(24.0, 2.0) - 12.5).abs() < 1e-5);
        assert_eq!(blur_radius(96.0, 1.0), 25.0);
    }

    #[test]
    fn bad_density_falls_back_to_one() {
        assert_eq!(dp_to_px(10.0, 0.0), 10.0);
        assert_eq!(dp_to_px(10.0, f32::NAN), 10.0);
        assert_eq!(dp_to_px(10.0, 3.0), 30.0);
    }

    #[test]
    fn canvas_is_padded_and_image_translated() {
        let src = RgbaImage::from_pixel(4, 3, Rgba([1, 2, 3, 255]));
        let canvas = shadow_canvas(&src, 5.7).unwrap();
        assert_eq!(canvas.dimensions(), (14, 13));
        assert_eq!(canvas.get_pixel(5, 5).0, [1, 2, 3, 255]);
        assert_eq!(canvas.get_pixel(4, 5).0, [0, 0, 0, 0]);
        assert_eq!(canvas.get_pixel(9, 8).0, [0, 0, 0, 0]);
    }

    #[test]
    fn empty_canvas_becomes_one_pixel() {
        let canvas = shadow_canvas(&RgbaImage::new(0, 0), 0.0).unwrap();
        assert_eq!(canvas.dimensions(), (1, 1));
    }

    #[test]
    fn zero_elevation_shadow_is_plain_tint() {
        let src = RgbaImage::from_pixel(3, 3, Rgba([200, 100, 50, 128]));
        let s = settings(0.0, FilterKind::Translucent, true);
        let shadow = generate_shadow(&src, &s, None).unwrap();
        assert_eq!(shadow.dimensions(), (3, 3));
        assert!(shadow.pixels().all(|p| p.0 == [80, 40, 20, 77]));
    }

    #[test]
    fn opaque_shadow_is_black_and_soft() {
        let src = RgbaImage::from_pixel(8, 8, Rgba([255, 255, 255, 255]));
        let s = settings(6.0, FilterKind::ShadowAlpha, true); // radius 6.25
        let shadow = generate_shadow(&src, &s, None).unwrap();
        assert_eq!(shadow.dimensions(), (20, 20));
        assert!(shadow.pixels().all(|p| p[0] == 0 && p[1] == 0 && p[2] == 0));
        // Centre stays below the tinted alpha, edges fade further.
        let centre = shadow.get_pixel(10, 10)[3];
        assert!(centre <= 102 && centre > 30, "centre alpha {centre}");
        assert!(shadow.get_pixel(0, 0)[3] < centre);
    }

    #[test]
    fn translucent_shadow_edge_keeps_its_colour() {
        let src = RgbaImage::from_pixel(40, 40, Rgba([250, 0, 0, 255]));
        let s = settings(6.0, FilterKind::Translucent, true);
        let shadow = generate_shadow(&src, &s, None).unwrap();
        let centre = shadow.get_pixel(26, 26).0;
        assert_eq!(centre, [100, 0, 0, 153]);
        let edge = shadow.get_pixel(3, 26).0;
        assert!(edge[3] > 0 && edge[3] < centre[3], "edge {:?}", edge);
        assert_eq!(edge[0], centre[0]);
        for px in shadow.pixels().filter(|p| p[3] > 0) {
            assert_eq!(px.0[..3], [100, 0, 0], "{:?}", px.0);
        }
    }

    #[test]
    fn clipped_composite_is_image_on_padded_canvas() {
        let src = RgbaImage::from_pixel(2, 2, Rgba([9, 8, 7, 255]));
        let mut s = settings(6.0, FilterKind::ShadowAlpha, false);
        s.clip_shadow = true;
        let out = render(&src, &s, true, None).unwrap();
        assert_eq!(out.dimensions(), (14, 14));
        assert_eq!(out.get_pixel(6, 6).0, [9, 8, 7, 255]);
        assert!(out.pixels().filter(|p| p[3] != 0).count() == 4);
    }

    #[test]
    fn composite_keeps_opaque_image_and_drops_shadow_below() {
        let src = RgbaImage::from_pixel(6, 6, Rgba([200, 10, 10, 255]));
        let s = settings(6.0, FilterKind::Translucent, false);
        let out = render(&src, &s, true, None).unwrap();
        assert_eq!(out.dimensions(), (18, 18));
        let pad = 6;
        // Opaque image pixels are untouched by the shadow underneath.
        assert_eq!(out.get_pixel(pad, pad).0, [200, 10, 10, 255]);
        assert_eq!(out.get_pixel(pad + 5, pad + 5).0, [200, 10, 10, 255]);
        // Shadow is shifted down: more shadow just below than just above.
        let below = out.get_pixel(pad + 3, pad + 6)[3];
        let above = out.get_pixel(pad + 3, pad - 1)[3];
        assert!(below > above, "below {below} above {above}");
        let px = out.get_pixel(pad + 3, pad + 6);
        assert_eq!((px[0], px[1], px[2]), (0, 0, 0));
    }

    #[test]
    fn draw_over_clips_negative_offsets() {
        let mut dst = RgbaImage::new(3, 3);
        let top = RgbaImage::from_pixel(3, 3, Rgba([1, 1, 1, 255]));
        draw_over(&mut dst, &top, -2, -2);
        assert_eq!(dst.get_pixel(0, 0).0, [1, 1, 1, 255]);
        assert_eq!(dst.get_pixel(1, 1).0, [0, 0, 0, 0]);
    }
}
