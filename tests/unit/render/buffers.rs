use super::*;

fn dims(p: &vello_cpu::Pixmap) -> (u16, u16) {
    (p.width(), p.height())
}

#[test]
fn ensure_capacity_allocates_both_buffers_at_exact_size() {
    for (w, h) in [(1u32, 1u32), (100, 50), (3, 700)] {
        let mut b = RasterBuffers::new();
        assert!(b.ensure_capacity(SurfaceSize::new(w, h)).unwrap());
        assert_eq!(dims(b.capture().unwrap()), (w as u16, h as u16));
        assert_eq!(dims(b.presentation().unwrap()), (w as u16, h as u16));
        assert_eq!(b.size(), Some(SurfaceSize::new(w, h)));
    }
}

#[test]
fn same_size_keeps_the_allocation() {
    let mut b = RasterBuffers::new();
    b.ensure_capacity(SurfaceSize::new(10, 10)).unwrap();
    let g = b.generation();
    assert!(!b.ensure_capacity(SurfaceSize::new(10, 10)).unwrap());
    assert_eq!(b.generation(), g);
    assert_eq!(b.stats().allocations, 1);
}

#[test]
fn resize_replaces_the_allocation() {
    let mut b = RasterBuffers::new();
    b.ensure_capacity(SurfaceSize::new(100, 50)).unwrap();
    let g0 = b.generation().unwrap();
    assert!(b.ensure_capacity(SurfaceSize::new(200, 50)).unwrap());
    let g1 = b.generation().unwrap();
    assert_ne!(g0, g1);
    assert_eq!(dims(b.capture().unwrap()), (200, 50));
    assert_eq!(b.stats().allocations, 2);
    assert_eq!(b.stats().retained_bytes, 200 * 50 * 4 * 2);
}

#[test]
fn zero_dimension_clears_buffers() {
    let mut b = RasterBuffers::new();
    b.ensure_capacity(SurfaceSize::new(8, 8)).unwrap();
    assert!(!b.ensure_capacity(SurfaceSize::new(0, 8)).unwrap());
    assert!(b.capture().is_none());
    assert!(b.presentation().is_none());

    b.ensure_capacity(SurfaceSize::new(8, 8)).unwrap();
    b.ensure_capacity(SurfaceSize::new(8, 0)).unwrap();
    assert!(b.capture().is_none());

    let mut fresh = RasterBuffers::new();
    fresh.ensure_capacity(SurfaceSize::new(0, 0)).unwrap();
    assert!(fresh.capture().is_none());
    assert_eq!(fresh.stats().releases, 0);
}

#[test]
fn release_is_idempotent() {
    let mut b = RasterBuffers::new();
    b.ensure_capacity(SurfaceSize::new(4, 4)).unwrap();
    b.release();
    assert!(!b.is_allocated());
    assert!(b.presentation().is_none());
    assert_eq!(b.generation(), None);
    let after_once = b.stats();

    b.release();
    assert!(!b.is_allocated());
    assert_eq!(b.stats(), after_once);
    assert_eq!(after_once.releases, 1);
    assert_eq!(after_once.retained_bytes, 0);
}

#[test]
fn oversized_request_fails_without_touching_buffers() {
    let mut b = RasterBuffers::new();
    b.ensure_capacity(SurfaceSize::new(4, 4)).unwrap();
    assert!(b.ensure_capacity(SurfaceSize::new(1, 100_000)).is_err());
    assert_eq!(b.size(), Some(SurfaceSize::new(4, 4)));
}
