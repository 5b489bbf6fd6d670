use super::*;

fn filled(w: u16, h: u16, px: [u8; 4]) -> vello_cpu::Pixmap {
    let mut p = vello_cpu::Pixmap::new(w, h);
    for c in p.data_as_u8_slice_mut().chunks_exact_mut(4) {
        c.copy_from_slice(&px);
    }
    p
}

fn pixel(p: &vello_cpu::Pixmap, x: usize, y: usize) -> [u8; 4] {
    let i = (y * usize::from(p.width()) + x) * 4;
    let d = p.data_as_u8_slice();
    [d[i], d[i + 1], d[i + 2], d[i + 3]]
}

#[test]
fn over_opacity_0_is_noop() {
    let dst = [1, 2, 3, 4];
    let src = [200, 200, 200, 200];
    assert_eq!(over(dst, src, 0.0), dst);
}

#[test]
fn over_src_opaque_replaces_dst() {
    let dst = [0, 0, 0, 255];
    let src = [255, 0, 0, 255];
    assert_eq!(over(dst, src, 1.0), src);
}

#[test]
fn over_half_opacity_blends() {
    let out = over([0, 0, 0, 255], [255, 255, 255, 255], 0.5);
    assert_eq!(out, [128, 128, 128, 255]);
}

#[test]
fn inverting_layer_turns_red_into_cyan() {
    let src = filled(4, 3, [255, 0, 0, 255]);
    let mut dst = filled(4, 3, [255, 0, 0, 255]);
    let touched = composite_layer(
        &mut dst,
        OverlayLayer {
            pixels: &src,
            filter: Some(&ColorMatrix::INVERT),
            opacity: 1.0,
        },
    );
    assert_eq!(touched, 12);
    for px in dst.data_as_u8_slice().chunks_exact(4) {
        assert_eq!(px, [0, 255, 255, 255]);
    }
}

#[test]
fn layer_is_clipped_to_destination() {
    let src = filled(2, 2, [0, 0, 255, 255]);
    let mut dst = filled(3, 1, [10, 10, 10, 255]);
    let touched = composite_layer(
        &mut dst,
        OverlayLayer {
            pixels: &src,
            filter: None,
            opacity: 1.0,
        },
    );
    assert_eq!(touched, 2);
    assert_eq!(pixel(&dst, 0, 0), [0, 0, 255, 255]);
    assert_eq!(pixel(&dst, 1, 0), [0, 0, 255, 255]);
    assert_eq!(pixel(&dst, 2, 0), [10, 10, 10, 255]);
}

#[test]
fn zero_opacity_layer_draws_nothing() {
    let src = filled(2, 2, [255, 255, 255, 255]);
    let mut dst = filled(2, 2, [0, 0, 0, 255]);
    let touched = composite_layer(
        &mut dst,
        OverlayLayer {
            pixels: &src,
            filter: Some(&ColorMatrix::INVERT),
            opacity: 0.0,
        },
    );
    assert_eq!(touched, 0);
    assert_eq!(pixel(&dst, 1, 1), [0, 0, 0, 255]);
}
