use crate::effects::color_matrix::ColorMatrix;
use crate::foundation::math::{add_sat_u8, mul_div255_u8, opacity_to_u8};

/// Premultiplied RGBA8 pixel.
pub type PremulRgba8 = [u8; 4];

/// One raster to draw at the destination origin.
#[derive(Clone, Copy)]
pub struct OverlayLayer<'a> {
    /// Source pixels (premultiplied).
    pub pixels: &'a vello_cpu::Pixmap,
    /// Color filter applied to each source pixel before blending.
    pub filter: Option<&'a ColorMatrix>,
    /// Layer opacity in `[0, 1]`.
    pub opacity: f32,
}

/// Source-over of `src` onto `dst`, with `src` scaled by `opacity`.
pub fn over(dst: PremulRgba8, src: PremulRgba8, opacity: f32) -> PremulRgba8 {
    let op = opacity_to_u8(opacity);
    if op == 0 || src[3] == 0 {
        return dst;
    }
    over_u8(dst, src, op)
}

fn over_u8(dst: PremulRgba8, src: PremulRgba8, op: u16) -> PremulRgba8 {
    let sa = mul_div255_u8(u16::from(src[3]), op);
    if sa == 0 {
        return dst;
    }
    let inv = 255u16 - u16::from(sa);

    let mut out = [0u8; 4];
    out[3] = add_sat_u8(sa, mul_div255_u8(u16::from(dst[3]), inv));
    for i in 0..3 {
        let sc = mul_div255_u8(u16::from(src[i]), op);
        let dc = mul_div255_u8(u16::from(dst[i]), inv);
        out[i] = add_sat_u8(sc, dc);
    }
    out
}

/// Draw `layer` onto `dst` at offset (0, 0), clipped to the overlap of both rasters.
///
/// Returns the number of destination pixels touched.
pub fn composite_layer(dst: &mut vello_cpu::Pixmap, layer: OverlayLayer<'_>) -> usize {
    let op = opacity_to_u8(layer.opacity);
    if op == 0 {
        return 0;
    }

    let src = layer.pixels;
    let w = usize::from(dst.width().min(src.width()));
    let h = usize::from(dst.height().min(src.height()));
    if w == 0 || h == 0 {
        return 0;
    }

    let src_stride = usize::from(src.width()) * 4;
    let dst_stride = usize::from(dst.width()) * 4;
    let src_bytes = src.data_as_u8_slice();
    let dst_bytes = dst.data_as_u8_slice_mut();

    for y in 0..h {
        let s_row = &src_bytes[y * src_stride..y * src_stride + w * 4];
        let d_row = &mut dst_bytes[y * dst_stride..y * dst_stride + w * 4];
        for (d, s) in d_row.chunks_exact_mut(4).zip(s_row.chunks_exact(4)) {
            let mut px = [s[0], s[1], s[2], s[3]];
            if let Some(m) = layer.filter {
                px = m.apply_premul_px(px);
            }
            if px[3] == 0 {
                continue;
            }
            let out = over_u8([d[0], d[1], d[2], d[3]], px, op);
            d.copy_from_slice(&out);
        }
    }
    w * h
}

#[cfg(test)]
#[path = "../../tests/unit/render/composite.rs"]
mod tests;
