// ============================================================================
// PIXEL — packed RGBA8 values and their normalized float form
// ============================================================================

use image::Rgba;

/// A packed 8-bit RGBA pixel, channels in (R, G, B, A) order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub struct Pixel(pub [u8; 4]);

impl Pixel {
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Pixel([r, g, b, a])
    }

    #[inline]
    pub fn r(self) -> u8 {
        self.0[0]
    }

    #[inline]
    pub fn g(self) -> u8 {
        self.0[1]
    }

    #[inline]
    pub fn b(self) -> u8 {
        self.0[2]
    }

    #[inline]
    pub fn a(self) -> u8 {
        self.0[3]
    }

    /// Expand to four normalized channels in [0, 1].
    #[inline]
    pub fn unpack(self) -> Color4f {
        const INV: f32 = 1.0 / 255.0;
        Color4f {
            r: self.0[0] as f32 * INV,
            g: self.0[1] as f32 * INV,
            b: self.0[2] as f32 * INV,
            a: self.0[3] as f32 * INV,
        }
    }
}

impl From<Rgba<u8>> for Pixel {
    fn from(px: Rgba<u8>) -> Self {
        Pixel(px.0)
    }
}

impl From<Pixel> for Rgba<u8> {
    fn from(px: Pixel) -> Self {
        Rgba(px.0)
    }
}

/// Normalized float form of a [`Pixel`].
#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct Color4f {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color4f {
    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Quantize back to 8 bits. Channels are clamped to [0, 1] and rounded
    /// half-up, so NaN and out-of-range values never fail.
    #[inline]
    pub fn pack(self) -> Pixel {
        Pixel([
            quantize(self.r),
            quantize(self.g),
            quantize(self.b),
            quantize(self.a),
        ])
    }

    /// Component-wise multiply by a per-channel scale.
    #[inline]
    pub fn scale(self, s: [f32; 4]) -> Self {
        Self {
            r: self.r * s[0],
            g: self.g * s[1],
            b: self.b * s[2],
            a: self.a * s[3],
        }
    }
}

#[inline]
fn quantize(v: f32) -> u8 {
    // `as u8` saturates and maps NaN to 0.
    (v.clamp(0.0, 1.0) * 255.0 + 0.5) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unpack_pack_is_identity_for_every_channel_value() {
        for v in 0..=255u8 {
            let px = Pixel::new(v, 255 - v, v / 2, v);
            assert_eq!(px.unpack().pack(), px);
        }
    }

    #[test]
    fn pack_clamps_out_of_range_channels() {
        let c = Color4f::new(-0.5, 1.7, f32::NAN, 0.5);
        assert_eq!(c.pack(), Pixel::new(0, 255, 0, 128));
    }

    #[test]
    fn rgba_conversion_keeps_channel_order() {
        let px = Pixel::new(1, 2, 3, 4);
        let rgba: Rgba<u8> = px.into();
        assert_eq!(rgba.0, [1, 2, 3, 4]);
        assert_eq!(Pixel::from(rgba), px);
    }
}
