// ============================================================================
// SHADOW FILTERS — per-pixel kernels that turn an image into its shadow
// ============================================================================
//
// Both kernels are pure: the output depends only on the input pixel and on
// the filter value itself, which is fixed for a whole dispatch batch.  The
// (x, y) coordinates are part of the kernel calling convention but unused.

use crate::pixel::{Color4f, Pixel};

/// Colour/alpha multiplier for the translucent shadow.
const TRANSLUCENT_COLOR_SCALE: f32 = 0.4;
const TRANSLUCENT_ALPHA_SCALE: f32 = 0.6;
/// Alpha multiplier for the opaque (black) shadow.
const SHADOW_ALPHA_SCALE: f32 = 0.4;

/// A pure per-pixel kernel, invoked once for every pixel of an image.
///
/// Implementations must be `Sync`: a single instance is shared read-only by
/// every worker of a dispatch batch.
pub trait PixelKernel: Sync {
    fn root(&self, pixel: Pixel, x: u32, y: u32) -> Pixel;
}

/// A kernel that is exactly a diagonal colour matrix: each channel scaled
/// independently, then clamped.  Only these can run on the GPU tint shader.
pub trait DiagonalKernel: PixelKernel {
    /// Per-channel factors for (r, g, b, a).
    fn channel_scale(&self) -> [f32; 4];
}

/// Dimmed semi-transparent copy of the source when `is_translucent`,
/// otherwise a black silhouette at 40% of the source alpha.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct TranslucentShadowFilter {
    pub is_translucent: bool,
}

impl TranslucentShadowFilter {
    pub fn new(is_translucent: bool) -> Self {
        Self { is_translucent }
    }

    #[inline]
    pub fn apply(&self, pixel: Pixel) -> Pixel {
        translucent_shadow(pixel, self.is_translucent)
    }
}

impl PixelKernel for TranslucentShadowFilter {
    #[inline]
    fn root(&self, pixel: Pixel, _x: u32, _y: u32) -> Pixel {
        self.apply(pixel)
    }
}

impl DiagonalKernel for TranslucentShadowFilter {
    fn channel_scale(&self) -> [f32; 4] {
        if self.is_translucent {
            [
                TRANSLUCENT_COLOR_SCALE,
                TRANSLUCENT_COLOR_SCALE,
                TRANSLUCENT_COLOR_SCALE,
                TRANSLUCENT_ALPHA_SCALE,
            ]
        } else {
            [0.0, 0.0, 0.0, SHADOW_ALPHA_SCALE]
        }
    }
}

/// Black pixel carrying 40% of the source alpha.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct ShadowAlphaFilter;

impl ShadowAlphaFilter {
    #[inline]
    pub fn apply(&self, pixel: Pixel) -> Pixel {
        shadow_alpha(pixel)
    }
}

impl PixelKernel for ShadowAlphaFilter {
    #[inline]
    fn root(&self, pixel: Pixel, _x: u32, _y: u32) -> Pixel {
        self.apply(pixel)
    }
}

impl DiagonalKernel for ShadowAlphaFilter {
    fn channel_scale(&self) -> [f32; 4] {
        [0.0, 0.0, 0.0, SHADOW_ALPHA_SCALE]
    }
}

/// Translucent shadow kernel as a free function.
#[inline]
pub fn translucent_shadow(pixel: Pixel, is_translucent: bool) -> Pixel {
    let f = pixel.unpack();
    let out = if is_translucent {
        Color4f::new(
            TRANSLUCENT_COLOR_SCALE * f.r,
            TRANSLUCENT_COLOR_SCALE * f.g,
            TRANSLUCENT_COLOR_SCALE * f.b,
            TRANSLUCENT_ALPHA_SCALE * f.a,
        )
    } else {
        Color4f::new(0.0, 0.0, 0.0, SHADOW_ALPHA_SCALE * f.a)
    };
    out.pack()
}

/// Shadow-alpha kernel as a free function.
#[inline]
pub fn shadow_alpha(pixel: Pixel) -> Pixel {
    let alpha = pixel.unpack().a * SHADOW_ALPHA_SCALE;
    Color4f::new(0.0, 0.0, 0.0, alpha).pack()
}

/// The kernel chosen for a batch, built from [`crate::settings::ShadowSettings`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ShadowTint {
    /// `TranslucentShadowFilter`, honouring the translucent flag.
    Translucent { is_translucent: bool },
    /// `ShadowAlphaFilter`.
    ShadowAlpha,
}

impl ShadowTint {
    pub fn from_translucent(is_translucent: bool) -> Self {
        ShadowTint::Translucent { is_translucent }
    }

    pub fn name(self) -> &'static str {
        match self {
            ShadowTint::Translucent { .. } => "translucent",
            ShadowTint::ShadowAlpha => "shadow-alpha",
        }
    }
}

impl PixelKernel for ShadowTint {
    #[inline]
    fn root(&self, pixel: Pixel, x: u32, y: u32) -> Pixel {
        match self {
            ShadowTint::Translucent { is_translucent } => {
                TranslucentShadowFilter::new(*is_translucent).root(pixel, x, y)
            }
            ShadowTint::ShadowAlpha => ShadowAlphaFilter.root(pixel, x, y),
        }
    }
}

impl DiagonalKernel for ShadowTint {
    fn channel_scale(&self) -> [f32; 4] {
        match self {
            ShadowTint::Translucent { is_translucent } => {
                TranslucentShadowFilter::new(*is_translucent).channel_scale()
            }
            ShadowTint::ShadowAlpha => ShadowAlphaFilter.channel_scale(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn round_scaled(v: u8, s: f64) -> u8 {
        (v as f64 * s).round() as u8
    }

    #[test]
    fn opaque_branch_matches_formula_for_every_alpha() {
        let filter = TranslucentShadowFilter::new(false);
        for a in 0..=255u8 {
            let out = filter.apply(Pixel::new(17, 200, 99, a));
            assert_eq!(out, Pixel::new(0, 0, 0, round_scaled(a, 0.4)), "alpha {a}");
        }
    }

    #[test]
    fn translucent_branch_matches_formula_for_every_value() {
        let filter = TranslucentShadowFilter::new(true);
        for v in 0..=255u8 {
            let px = Pixel::new(v, 255 - v, v / 3, v);
            let expected = Pixel::new(
                round_scaled(v, 0.4),
                round_scaled(255 - v, 0.4),
                round_scaled(v / 3, 0.4),
                round_scaled(v, 0.6),
            );
            assert_eq!(filter.apply(px), expected, "value {v}");
        }
    }

    #[test]
    fn shadow_alpha_equals_opaque_translucent_branch() {
        for a in 0..=255u8 {
            let px = Pixel::new(a, 3, 250, a);
            assert_eq!(shadow_alpha(px), translucent_shadow(px, false));
        }
    }

    #[test]
    fn documented_scenarios() {
        let white = Pixel::new(255, 255, 255, 255);
        assert_eq!(translucent_shadow(white, false), Pixel::new(0, 0, 0, 102));
        assert_eq!(translucent_shadow(white, true), Pixel::new(102, 102, 102, 153));
        assert_eq!(
            translucent_shadow(Pixel::new(200, 100, 50, 128), true),
            Pixel::new(80, 40, 20, 77)
        );
        assert_eq!(shadow_alpha(Pixel::new(0, 0, 0, 255)), Pixel::new(0, 0, 0, 102));
    }

    #[test]
    fn zero_alpha_stays_zero_in_every_mode() {
        let px = Pixel::new(255, 128, 7, 0);
        assert_eq!(translucent_shadow(px, true).a(), 0);
        assert_eq!(translucent_shadow(px, false).a(), 0);
        assert_eq!(shadow_alpha(px).a(), 0);
    }

    #[test]
    fn kernels_ignore_coordinates() {
        let px = Pixel::new(90, 60, 30, 200);
        let tint = ShadowTint::from_translucent(true);
        let at_origin = tint.root(px, 0, 0);
        for (x, y) in [(1, 0), (0, 1), (4095, 17), (u32::MAX, u32::MAX)] {
            assert_eq!(tint.root(px, x, y), at_origin);
            assert_eq!(ShadowAlphaFilter.root(px, x, y), ShadowAlphaFilter.root(px, 0, 0));
        }
    }

    #[test]
    fn reapplying_shadow_alpha_keeps_shrinking_alpha() {
        let once = shadow_alpha(Pixel::new(0, 0, 0, 255));
        let twice = shadow_alpha(once);
        assert_eq!(twice.a(), 41);
    }

    #[test]
    fn channel_scale_reproduces_kernel() {
        fn check<K: DiagonalKernel>(kernel: &K, label: &str) {
            for v in 0..=255u8 {
                let px = Pixel::new(v, 255 - v, v / 3, v);
                let via_scale = px.unpack().scale(kernel.channel_scale()).pack();
                assert_eq!(via_scale, kernel.root(px, 0, 0), "{label} value {v}");
            }
        }
        check(&TranslucentShadowFilter::new(true), "translucent");
        check(&TranslucentShadowFilter::new(false), "opaque");
        check(&ShadowAlphaFilter, "shadow-alpha");
        for tint in [ShadowTint::from_translucent(true), ShadowTint::ShadowAlpha] {
            check(&tint, tint.name());
        }
    }
}
