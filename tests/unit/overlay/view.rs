use std::cell::Cell;

use super::*;
use crate::animation::clock::ManualClock;
use crate::host::notifier::DrawNotifier;
use crate::overlay::state::RetoggleMode;

struct Host {
    size: SurfaceSize,
    notifier: DrawNotifier,
    subscribe_calls: Cell<u32>,
}

impl Host {
    fn new(w: u32, h: u32) -> Rc<Self> {
        Rc::new(Self {
            size: SurfaceSize::new(w, h),
            notifier: DrawNotifier::new(),
            subscribe_calls: Cell::new(0),
        })
    }
}

impl HostSurface for Host {
    fn size(&self) -> SurfaceSize {
        self.size
    }

    fn draw(&self, ctx: &mut vello_cpu::RenderContext) -> OverlayResult<()> {
        ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(255, 0, 0, 255));
        ctx.fill_rect(&vello_cpu::kurbo::Rect::new(
            0.0,
            0.0,
            f64::from(self.size.width),
            f64::from(self.size.height),
        ));
        Ok(())
    }

    fn on_after_draw(&self, listener: Box<dyn FnMut()>) -> DrawSubscription {
        self.subscribe_calls.set(self.subscribe_calls.get() + 1);
        self.notifier.subscribe(listener)
    }
}

fn overlay(initially_inverted: bool) -> (InvertOverlay, ManualClock) {
    let clock = ManualClock::new();
    let config = OverlayConfig {
        initially_inverted,
        ease: crate::animation::ease::Ease::Linear,
        retoggle: RetoggleMode::FromEndpoint,
        ..OverlayConfig::default()
    };
    let o = InvertOverlay::with_clock(config, Rc::new(clock.clone())).unwrap();
    (o, clock)
}

#[test]
fn invalid_config_is_rejected() {
    let config = OverlayConfig {
        fade_duration_ms: 0,
        ..OverlayConfig::default()
    };
    assert!(InvertOverlay::new(config).is_err());
}

#[test]
fn attaching_same_host_twice_keeps_single_subscription() {
    let host = Host::new(10, 10);
    let (mut o, _clock) = overlay(true);
    o.attach(host.clone());
    o.attach(host.clone());
    assert_eq!(host.subscribe_calls.get(), 1);
    assert_eq!(host.notifier.listener_count(), 1);
}

#[test]
fn rebinding_drops_previous_listener() {
    let a = Host::new(10, 10);
    let b = Host::new(20, 10);
    let (mut o, _clock) = overlay(true);
    o.attach(a.clone());
    o.attach(b.clone());
    assert_eq!(a.notifier.listener_count(), 0);
    assert_eq!(b.notifier.listener_count(), 1);

    a.notifier.notify();
    assert_eq!(o.stats().captures, 0);
    b.notifier.notify();
    assert_eq!(o.stats().captures, 1);
    assert_eq!(o.buffer_size(), Some(SurfaceSize::new(20, 10)));
}

#[test]
fn detach_and_drop_unsubscribe() {
    let host = Host::new(10, 10);
    let (mut o, _clock) = overlay(true);
    o.attach(host.clone());
    o.detach();
    assert!(!o.is_attached());
    assert_eq!(host.notifier.listener_count(), 0);

    o.attach(host.clone());
    drop(o);
    assert_eq!(host.notifier.listener_count(), 0);
}

#[test]
fn repaint_callback_fires_on_toggle_and_new_content() {
    let host = Host::new(10, 10);
    let (mut o, _clock) = overlay(true);
    let fired = Rc::new(Cell::new(0u32));
    let counter = fired.clone();
    o.set_repaint_callback(move || counter.set(counter.get() + 1));
    o.attach(host.clone());

    host.notifier.notify();
    assert_eq!(fired.get(), 1);
    host.notifier.notify();
    assert_eq!(fired.get(), 1);

    o.toggle_inversion();
    assert_eq!(fired.get(), 2);
    assert_eq!(o.stats().repaint_requests, 2);
}

#[test]
fn paint_consumes_repaint_request() {
    let host = Host::new(4, 4);
    let (mut o, _clock) = overlay(true);
    o.attach(host.clone());
    host.notifier.notify();

    let mut dst = vello_cpu::Pixmap::new(4, 4);
    assert!(o.paint(&mut dst));
    assert!(!o.take_repaint_request());
    assert_eq!(o.stats().paints, 1);
}

#[test]
fn paint_before_first_capture_draws_nothing() {
    let (o, _clock) = overlay(true);
    let mut dst = vello_cpu::Pixmap::new(4, 4);
    assert!(!o.paint(&mut dst));
    assert!(dst.data_as_u8_slice().iter().all(|&b| b == 0));
}

#[test]
fn dormant_overlay_counts_skipped_ticks() {
    let host = Host::new(10, 10);
    let (mut o, _clock) = overlay(false);
    o.attach(host.clone());
    host.notifier.notify();
    host.notifier.notify();

    let stats = o.stats();
    assert_eq!(stats.captures, 0);
    assert_eq!(stats.skipped_dormant, 2);
    assert_eq!(stats.buffers.allocations, 0);
}

#[test]
fn capture_now_without_host_is_dormant() {
    let (mut o, _clock) = overlay(true);
    assert_eq!(
        o.capture_now().unwrap(),
        CaptureOutcome::Skipped(SkipReason::Dormant)
    );
}

#[test]
fn fade_out_completion_releases_buffers() {
    let host = Host::new(10, 10);
    let (mut o, clock) = overlay(true);
    o.attach(host.clone());
    host.notifier.notify();
    assert!(o.with_buffers(|b| b.is_allocated()));

    o.toggle_inversion();
    clock.advance_ms(700);
    assert_eq!(o.advance(), Some(FadeEvent::Hidden));
    assert!(!o.with_buffers(|b| b.is_allocated()));
    assert_eq!(o.stats().buffers.releases, 1);
    assert_eq!(o.visibility(), Visibility::Hidden);

    let mut dst = vello_cpu::Pixmap::new(10, 10);
    dst.data_as_u8_slice_mut().fill(7);
    assert!(!o.paint(&mut dst));
    assert!(dst.data_as_u8_slice().iter().all(|&b| b == 7));
}

#[test]
fn redraw_after_elapsed_fade_out_does_not_capture() {
    let host = Host::new(10, 10);
    let (mut o, clock) = overlay(true);
    o.attach(host.clone());
    host.notifier.notify();
    assert_eq!(o.stats().captures, 1);

    o.toggle_inversion();
    clock.advance_ms(5000);
    host.notifier.notify();
    host.notifier.notify();

    let stats = o.stats();
    assert_eq!(stats.captures, 1);
    assert_eq!(stats.skipped_dormant, 2);
    assert!(!o.with_buffers(|b| b.is_allocated()));
    assert_eq!(o.visibility(), Visibility::Hidden);
    assert_eq!(o.opacity(), 0.0);

    assert_eq!(o.advance(), Some(FadeEvent::Hidden));
    assert_eq!(o.advance(), None);
}

#[test]
fn toggle_discards_fade_event_settled_during_redraw() {
    let host = Host::new(10, 10);
    let (mut o, clock) = overlay(true);
    o.attach(host.clone());
    o.toggle_inversion();
    clock.advance_ms(700);
    host.notifier.notify();

    o.toggle_inversion();
    assert_eq!(o.advance(), None);
    clock.advance_ms(700);
    assert_eq!(o.advance(), Some(FadeEvent::ShownFully));
}
