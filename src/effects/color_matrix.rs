use crate::foundation::core::Rgba8;
use crate::foundation::error::{OverlayError, OverlayResult};

/// A 4x5 affine color matrix over normalized `[0, 1]` channels.
///
/// Rows produce `r, g, b, a`; each row is `[cr, cg, cb, ca, bias]` and is applied as
/// `out = M * [r, g, b, a, 1]` on straight (non-premultiplied) color. Buffers are stored
/// premultiplied, so the buffer passes unpremultiply, transform and premultiply again.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ColorMatrix(pub [f32; 20]);

impl ColorMatrix {
    /// Leaves every pixel unchanged.
    pub const IDENTITY: Self = Self([
        1.0, 0.0, 0.0, 0.0, 0.0, //
        0.0, 1.0, 0.0, 0.0, 0.0, //
        0.0, 0.0, 1.0, 0.0, 0.0, //
        0.0, 0.0, 0.0, 1.0, 0.0, //
    ]);

    /// Inverts RGB and keeps alpha: `(1 - r, 1 - g, 1 - b, a)`.
    pub const INVERT: Self = Self([
        -1.0, 0.0, 0.0, 0.0, 1.0, //
        0.0, -1.0, 0.0, 0.0, 1.0, //
        0.0, 0.0, -1.0, 0.0, 1.0, //
        0.0, 0.0, 0.0, 1.0, 0.0, //
    ]);

    /// Build a matrix whose bias column is expressed in 0..=255 byte units.
    pub fn from_byte_units(mut m: [f32; 20]) -> Self {
        for row in 0..4 {
            m[row * 5 + 4] /= 255.0;
        }
        Self(m)
    }

    /// Compose so that `self` runs first and `next` runs on its output.
    pub fn then(self, next: Self) -> Self {
        let (a, b) = (next.0, self.0);
        let mut out = [0.0f32; 20];
        for row in 0..4 {
            let base = row * 5;
            for col in 0..4 {
                let mut v = 0.0f32;
                for k in 0..4 {
                    v += a[base + k] * b[k * 5 + col];
                }
                out[base + col] = v;
            }
            // bias term: a * b_bias + a_bias
            out[base + 4] = a[base + 4]
                + a[base] * b[4]
                + a[base + 1] * b[9]
                + a[base + 2] * b[14]
                + a[base + 3] * b[19];
        }
        Self(out)
    }

    /// Return `true` when the matrix is (numerically) the identity.
    pub fn is_identity(&self) -> bool {
        approx_eq(&self.0, &Self::IDENTITY.0)
    }

    /// Return `true` when the matrix is (numerically) the RGB inversion.
    pub fn is_invert(&self) -> bool {
        approx_eq(&self.0, &Self::INVERT.0)
    }

    /// Transform one straight-alpha pixel.
    pub fn apply_straight(&self, px: Rgba8) -> Rgba8 {
        if self.is_invert() {
            return invert_rgba8(px);
        }
        let [r, g, b, a] = self.apply_unit([
            f32::from(px.r) / 255.0,
            f32::from(px.g) / 255.0,
            f32::from(px.b) / 255.0,
            f32::from(px.a) / 255.0,
        ]);
        Rgba8::new(unit_to_u8(r), unit_to_u8(g), unit_to_u8(b), unit_to_u8(a))
    }

    /// Transform one premultiplied pixel.
    pub fn apply_premul_px(&self, px: [u8; 4]) -> [u8; 4] {
        if self.is_invert() {
            return invert_premul_px(px);
        }

        let pa = f32::from(px[3]) / 255.0;
        // Convert premul -> straight for matrix application.
        let inv_a = if pa > 0.0 { 1.0 / pa } else { 0.0 };
        let straight = [
            f32::from(px[0]) / 255.0 * inv_a,
            f32::from(px[1]) / 255.0 * inv_a,
            f32::from(px[2]) / 255.0 * inv_a,
            pa,
        ];
        let [r, g, b, a] = self.apply_unit(straight);

        // Convert straight -> premul.
        [
            unit_to_u8(r * a),
            unit_to_u8(g * a),
            unit_to_u8(b * a),
            unit_to_u8(a),
        ]
    }

    /// Transform a premultiplied RGBA8 buffer into `dst` in one pass.
    pub fn apply_premul(&self, src: &[u8], dst: &mut [u8]) -> OverlayResult<()> {
        if src.len() != dst.len() || !src.len().is_multiple_of(4) {
            return Err(OverlayError::validation(
                "color matrix pass expects equal-length rgba8 buffers",
            ));
        }
        if self.is_identity() {
            dst.copy_from_slice(src);
            return Ok(());
        }
        let invert = self.is_invert();
        for (s, d) in src.chunks_exact(4).zip(dst.chunks_exact_mut(4)) {
            let px = [s[0], s[1], s[2], s[3]];
            let out = if invert {
                invert_premul_px(px)
            } else {
                self.apply_premul_px(px)
            };
            d.copy_from_slice(&out);
        }
        Ok(())
    }

    /// Transform a premultiplied RGBA8 buffer in place.
    pub fn apply_premul_in_place(&self, buf: &mut [u8]) {
        if self.is_identity() {
            return;
        }
        for px in buf.chunks_exact_mut(4) {
            let out = self.apply_premul_px([px[0], px[1], px[2], px[3]]);
            px.copy_from_slice(&out);
        }
    }

    fn apply_unit(&self, [r, g, b, a]: [f32; 4]) -> [f32; 4] {
        let m = &self.0;
        [
            (m[0] * r + m[1] * g + m[2] * b + m[3] * a + m[4]).clamp(0.0, 1.0),
            (m[5] * r + m[6] * g + m[7] * b + m[8] * a + m[9]).clamp(0.0, 1.0),
            (m[10] * r + m[11] * g + m[12] * b + m[13] * a + m[14]).clamp(0.0, 1.0),
            (m[15] * r + m[16] * g + m[17] * b + m[18] * a + m[19]).clamp(0.0, 1.0),
        ]
    }
}

impl Default for ColorMatrix {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// Invert the color channels of a straight-alpha pixel, keeping alpha.
pub fn invert_rgba8(px: Rgba8) -> Rgba8 {
    Rgba8::new(255 - px.r, 255 - px.g, 255 - px.b, px.a)
}

// Premultiplying `255 - c` by `a` gives `a - c * a / 255`, i.e. `a - premul(c)`.
fn invert_premul_px([r, g, b, a]: [u8; 4]) -> [u8; 4] {
    [a.saturating_sub(r), a.saturating_sub(g), a.saturating_sub(b), a]
}

fn unit_to_u8(v: f32) -> u8 {
    (v * 255.0).round().clamp(0.0, 255.0) as u8
}

fn approx_eq(a: &[f32; 20], b: &[f32; 20]) -> bool {
    let eps = 1.0e-6;
    a.iter().zip(b.iter()).all(|(x, y)| (*x - *y).abs() <= eps)
}

#[cfg(test)]
#[path = "../../tests/unit/effects/color_matrix.rs"]
mod tests;
