use std::collections::HashMap;
use std::rc::Rc;
use std::sync::Arc;

use crate::foundation::core::{Rgba8, SurfaceSize};
use crate::foundation::error::OverlayResult;
use crate::host::notifier::DrawSubscription;

/// Background paint a host surface draws beneath its content.
#[derive(Clone, Debug)]
pub enum Background {
    /// Uniform straight-alpha color.
    Solid(Rgba8),
    /// Premultiplied raster drawn unscaled at the surface origin, over the fallback color.
    Image(Arc<vello_cpu::Pixmap>),
}

/// The external visual element whose rendered content the overlay mirrors.
///
/// A host surface is referenced, never owned, by the overlay. It must be able to report its
/// size, render itself into a drawing target the overlay provides, and notify listeners after
/// every one of its own redraws.
pub trait HostSurface {
    /// Current size in pixels. A zero dimension suspends capture.
    fn size(&self) -> SurfaceSize;

    /// Background paint, if the surface has one. Capture falls back to opaque white otherwise.
    fn background(&self) -> Option<Background> {
        None
    }

    /// Render the surface content (without its background) into `ctx`.
    ///
    /// `ctx` is sized to [`HostSurface::size`] and already holds the background.
    fn draw(&self, ctx: &mut vello_cpu::RenderContext) -> OverlayResult<()>;

    /// Register `listener` to run after each redraw of this surface.
    fn on_after_draw(&self, listener: Box<dyn FnMut()>) -> DrawSubscription;
}

/// Resolves a surface identifier to a host surface, for declarative attachment.
pub trait SurfaceLookup {
    /// Return the surface registered under `id`, if any.
    fn find_surface(&self, id: &str) -> Option<Rc<dyn HostSurface>>;
}

impl SurfaceLookup for HashMap<String, Rc<dyn HostSurface>> {
    fn find_surface(&self, id: &str) -> Option<Rc<dyn HostSurface>> {
        self.get(id).cloned()
    }
}

/// Lookup that never resolves anything.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoSurfaces;

impl SurfaceLookup for NoSurfaces {
    fn find_surface(&self, _id: &str) -> Option<Rc<dyn HostSurface>> {
        None
    }
}
