use std::cell::RefCell;
use std::rc::{Rc, Weak};

use crate::animation::clock::{Clock, SystemClock};
use crate::foundation::core::SurfaceSize;
use crate::foundation::error::OverlayResult;
use crate::host::notifier::DrawSubscription;
use crate::host::surface::{HostSurface, SurfaceLookup};
use crate::overlay::config::OverlayConfig;
use crate::overlay::state::{FadeEvent, InversionMachine, InversionState, Visibility};
use crate::render::buffers::{BufferStats, RasterBuffers};
use crate::render::capture::{CaptureOutcome, CapturePipeline, SkipReason, TransformStage};
use crate::render::composite::{OverlayLayer, composite_layer};

type RepaintCallback = Rc<RefCell<Option<Box<dyn FnMut()>>>>;

/// Counters describing what the overlay has done so far.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct OverlayStats {
    /// Capture ticks that rendered the host.
    pub captures: u64,
    /// Ticks skipped because the host had a zero dimension.
    pub skipped_degenerate: u64,
    /// Ticks skipped because the overlay was hidden and idle.
    pub skipped_dormant: u64,
    /// Ticks where the host failed to render.
    pub failed_captures: u64,
    /// Repaints requested from the host.
    pub repaint_requests: u64,
    /// Paint passes that drew pixels.
    pub paints: u64,
    /// Buffer allocation counters.
    pub buffers: BufferStats,
}

struct OverlayCore {
    clock: Rc<dyn Clock>,
    machine: InversionMachine,
    settled: Option<FadeEvent>,
    buffers: RasterBuffers,
    pipeline: CapturePipeline,
    repaint_pending: bool,
    stats: OverlayStats,
}

impl OverlayCore {
    /// Settle a fade that has run out, releasing the buffers once hidden.
    fn settle(&mut self) -> Option<FadeEvent> {
        let event = self.machine.advance(self.clock.now())?;
        if event == FadeEvent::Hidden {
            self.release();
        }
        Some(event)
    }

    /// One host redraw.
    fn on_host_draw(&mut self, host: &dyn HostSurface) -> OverlayResult<CaptureOutcome> {
        // Held until the next `InvertOverlay::advance` so the event still reaches the host.
        if let Some(event) = self.settle() {
            self.settled = Some(event);
        }
        if !self.machine.needs_capture(self.clock.now()) {
            self.stats.skipped_dormant = self.stats.skipped_dormant.saturating_add(1);
            return Ok(CaptureOutcome::Skipped(SkipReason::Dormant));
        }

        let outcome = match self.pipeline.capture(host, &mut self.buffers) {
            Ok(outcome) => outcome,
            Err(e) => {
                self.stats.failed_captures = self.stats.failed_captures.saturating_add(1);
                return Err(e);
            }
        };
        match outcome {
            CaptureOutcome::Skipped(SkipReason::DegenerateGeometry) => {
                self.stats.skipped_degenerate = self.stats.skipped_degenerate.saturating_add(1);
            }
            CaptureOutcome::Skipped(SkipReason::Dormant) => {
                self.stats.skipped_dormant = self.stats.skipped_dormant.saturating_add(1);
            }
            CaptureOutcome::Captured { repaint, .. } => {
                self.stats.captures = self.stats.captures.saturating_add(1);
                if repaint {
                    self.mark_repaint();
                }
            }
        }
        Ok(outcome)
    }

    fn mark_repaint(&mut self) {
        self.repaint_pending = true;
        self.stats.repaint_requests = self.stats.repaint_requests.saturating_add(1);
    }

    fn release(&mut self) {
        self.buffers.release();
        self.pipeline.release();
    }
}

struct Attachment {
    host: Rc<dyn HostSurface>,
    _subscription: DrawSubscription,
}

/// Overlay that mirrors a host surface, inverts it and fades it in and out.
///
/// All work happens on the thread driving the host: the overlay captures the host from the
/// host's after-draw notification, paints from [`InvertOverlay::paint`] and settles fades in
/// [`InvertOverlay::advance`].
///
/// ```no_run
/// # use std::rc::Rc;
/// # fn demo(host: Rc<dyn invert_overlay::HostSurface>) -> invert_overlay::OverlayResult<()> {
/// let mut overlay = invert_overlay::InvertOverlay::new(invert_overlay::OverlayConfig::default())?;
/// overlay.attach(host);
/// overlay.toggle_inversion();
/// assert!(!overlay.is_inverted());
/// # Ok(())
/// # }
/// ```
pub struct InvertOverlay {
    core: Rc<RefCell<OverlayCore>>,
    repaint_callback: RepaintCallback,
    attachment: Option<Attachment>,
    clock: Rc<dyn Clock>,
}

impl InvertOverlay {
    /// Create an unattached overlay driven by the system clock.
    pub fn new(config: OverlayConfig) -> OverlayResult<Self> {
        Self::with_clock(config, Rc::new(SystemClock::new()))
    }

    /// Create an unattached overlay driven by `clock`.
    pub fn with_clock(config: OverlayConfig, clock: Rc<dyn Clock>) -> OverlayResult<Self> {
        config.validate()?;
        let core = OverlayCore {
            clock: Rc::clone(&clock),
            settled: None,
            machine: InversionMachine::new(
                config.initially_inverted,
                config.fade_duration(),
                config.ease,
                config.retoggle,
            ),
            buffers: RasterBuffers::new(),
            pipeline: CapturePipeline::new(config.transform_stage, config.fallback_background),
            repaint_pending: false,
            stats: OverlayStats::default(),
        };
        Ok(Self {
            core: Rc::new(RefCell::new(core)),
            repaint_callback: Rc::new(RefCell::new(None)),
            attachment: None,
            clock,
        })
    }

    /// Create an overlay and resolve `config.attach_to` through `lookup`.
    ///
    /// An identifier that does not resolve leaves the overlay unattached.
    pub fn from_config(
        config: OverlayConfig,
        clock: Rc<dyn Clock>,
        lookup: &dyn SurfaceLookup,
    ) -> OverlayResult<Self> {
        let target = config.attach_to.clone();
        let mut overlay = Self::with_clock(config, clock)?;
        if let Some(id) = target {
            match lookup.find_surface(&id) {
                Some(host) => overlay.attach(host),
                None => tracing::debug!(id = %id, "attach_to did not resolve; overlay unattached"),
            }
        }
        Ok(overlay)
    }

    /// Bind the overlay to `host` and subscribe to its redraws.
    ///
    /// Rebinding drops the previous subscription. Binding the surface that is already attached
    /// does nothing.
    pub fn attach(&mut self, host: Rc<dyn HostSurface>) {
        if let Some(current) = &self.attachment
            && std::ptr::addr_eq(Rc::as_ptr(&current.host), Rc::as_ptr(&host))
        {
            return;
        }

        // Drop the old listener before installing the new one.
        self.attachment = None;

        let listener = capture_listener(
            Rc::downgrade(&self.core),
            Rc::downgrade(&host),
            Rc::clone(&self.repaint_callback),
        );
        let subscription = host.on_after_draw(listener);
        tracing::debug!(size = ?host.size(), "overlay attached to host surface");
        self.attachment = Some(Attachment {
            host,
            _subscription: subscription,
        });
    }

    /// Unbind from the current host surface, if any.
    pub fn detach(&mut self) {
        if self.attachment.take().is_some() {
            tracing::debug!("overlay detached from host surface");
        }
    }

    /// Currently attached host surface.
    pub fn attached(&self) -> Option<&Rc<dyn HostSurface>> {
        self.attachment.as_ref().map(|a| &a.host)
    }

    /// Return `true` while attached to a host surface.
    pub fn is_attached(&self) -> bool {
        self.attachment.is_some()
    }

    /// Flip between inverted and plain, starting the fade. Returns the new logical state.
    pub fn toggle_inversion(&mut self) -> bool {
        let now = self.clock.now();
        let inverted = {
            let mut core = self.core.borrow_mut();
            let state = core.machine.toggle(now);
            core.settled = None;
            core.mark_repaint();
            state == InversionState::Inverted
        };
        self.fire_repaint_callback();
        inverted
    }

    /// Logical inversion state, independent of fade progress.
    pub fn is_inverted(&self) -> bool {
        self.core.borrow().machine.is_inverted()
    }

    /// Logical inversion state as an enum.
    pub fn inversion_state(&self) -> InversionState {
        self.core.borrow().machine.state()
    }

    /// Opacity the overlay would paint with right now.
    pub fn opacity(&self) -> f32 {
        self.core.borrow().machine.opacity(self.clock.now())
    }

    /// Whether the overlay takes part in painting.
    pub fn visibility(&self) -> Visibility {
        self.core.borrow().machine.visibility()
    }

    /// Return `true` while a fade is running.
    pub fn is_animating(&self) -> bool {
        self.core.borrow().machine.is_animating()
    }

    /// Settle the fade against the clock. Call once per host frame.
    ///
    /// When a fade-out completes the overlay is hidden and its buffers are released. A fade that
    /// already ran out during a host redraw is reported here as well.
    pub fn advance(&mut self) -> Option<FadeEvent> {
        let mut core = self.core.borrow_mut();
        let pending = core.settled.take();
        core.settle().or(pending)
    }

    /// Run one capture tick against the attached host, as its redraw listener would.
    ///
    /// Unlike the listener, errors are returned instead of logged.
    pub fn capture_now(&mut self) -> OverlayResult<CaptureOutcome> {
        let Some(host) = self.attachment.as_ref().map(|a| Rc::clone(&a.host)) else {
            return Ok(CaptureOutcome::Skipped(SkipReason::Dormant));
        };
        let outcome = self.core.borrow_mut().on_host_draw(host.as_ref())?;
        if matches!(outcome, CaptureOutcome::Captured { repaint: true, .. }) {
            self.fire_repaint_callback();
        }
        Ok(outcome)
    }

    /// Draw the inverted capture onto `dst` at its origin.
    ///
    /// Draws nothing while hidden or before the first capture. Clears any pending repaint
    /// request. Returns `true` when pixels were drawn.
    pub fn paint(&self, dst: &mut vello_cpu::Pixmap) -> bool {
        let opacity = self.opacity();
        let mut core = self.core.borrow_mut();
        core.repaint_pending = false;
        if core.machine.visibility() == Visibility::Hidden {
            return false;
        }

        let core = &mut *core;
        let layer = match core.pipeline.stage() {
            TransformStage::Capture => core.buffers.presentation().map(|pixels| OverlayLayer {
                pixels,
                filter: None,
                opacity,
            }),
            TransformStage::Paint => core.buffers.capture().map(|pixels| OverlayLayer {
                pixels,
                filter: Some(core.pipeline.transform()),
                opacity,
            }),
        };
        let Some(layer) = layer else {
            return false;
        };
        let drawn = composite_layer(dst, layer) > 0;
        if drawn {
            core.stats.paints = core.stats.paints.saturating_add(1);
        }
        drawn
    }

    /// Return and clear the pending repaint request.
    pub fn take_repaint_request(&self) -> bool {
        std::mem::take(&mut self.core.borrow_mut().repaint_pending)
    }

    /// Install a callback run whenever the overlay needs the host to repaint it.
    ///
    /// The callback runs after the overlay's internal state is released, so it may call back
    /// into the overlay.
    pub fn set_repaint_callback(&self, callback: impl FnMut() + 'static) {
        *self.repaint_callback.borrow_mut() = Some(Box::new(callback));
    }

    /// Size of the current buffers, if allocated.
    pub fn buffer_size(&self) -> Option<SurfaceSize> {
        self.core.borrow().buffers.size()
    }

    /// Inspect the raster buffers.
    pub fn with_buffers<R>(&self, f: impl FnOnce(&RasterBuffers) -> R) -> R {
        f(&self.core.borrow().buffers)
    }

    /// Snapshot of the overlay counters.
    pub fn stats(&self) -> OverlayStats {
        let core = self.core.borrow();
        OverlayStats {
            buffers: core.buffers.stats(),
            ..core.stats
        }
    }

    fn fire_repaint_callback(&self) {
        fire(&self.repaint_callback);
    }
}

impl Drop for InvertOverlay {
    fn drop(&mut self) {
        self.detach();
    }
}

fn fire(callback: &RepaintCallback) {
    match callback.try_borrow_mut() {
        Ok(mut slot) => {
            if let Some(cb) = slot.as_mut() {
                cb();
            }
        }
        Err(_) => tracing::debug!("repaint callback already running; request dropped"),
    }
}

fn capture_listener(
    core: Weak<RefCell<OverlayCore>>,
    host: Weak<dyn HostSurface>,
    repaint: RepaintCallback,
) -> Box<dyn FnMut()> {
    Box::new(move || {
        let (Some(core), Some(host)) = (core.upgrade(), host.upgrade()) else {
            return;
        };
        let outcome = match core.try_borrow_mut() {
            Ok(mut core) => core.on_host_draw(host.as_ref()),
            Err(_) => {
                tracing::debug!("overlay busy during host redraw; capture skipped");
                return;
            }
        };
        match outcome {
            Ok(CaptureOutcome::Captured { repaint: true, .. }) => fire(&repaint),
            Ok(_) => {}
            Err(e) => tracing::warn!(error = %e, "host capture failed; tick skipped"),
        }
    })
}

#[cfg(test)]
#[path = "../../tests/unit/overlay/view.rs"]
mod tests;
