//! A color-inverting overlay for a host rendering surface.
//!
//! The overlay attaches to a [`HostSurface`], re-renders it into an offscreen raster after every
//! host redraw, inverts that raster with a [`ColorMatrix`] and composites the result over the
//! host's output. Toggling cross-fades the overlay in or out (700 ms by default).
//!
//! - Build an [`InvertOverlay`] from an [`OverlayConfig`]
//! - [`InvertOverlay::attach`] it to a host surface
//! - Call [`InvertOverlay::advance`] and [`InvertOverlay::paint`] once per host frame
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod foundation;

pub(crate) mod animation;
pub(crate) mod effects;
pub(crate) mod host;
pub(crate) mod overlay;
pub(crate) mod render;

pub use crate::foundation::core::{Rgba8, SurfaceSize};
pub use crate::foundation::error::{OverlayError, OverlayResult};

pub use crate::animation::clock::{Clock, ManualClock, SystemClock};
pub use crate::animation::ease::Ease;
pub use crate::animation::fade::OpacityFade;
pub use crate::effects::color_matrix::{ColorMatrix, invert_rgba8};
pub use crate::host::notifier::{DrawNotifier, DrawSubscription};
pub use crate::host::surface::{Background, HostSurface, NoSurfaces, SurfaceLookup};
pub use crate::overlay::config::{DEFAULT_FADE_MS, OverlayConfig};
pub use crate::overlay::state::{FadeEvent, InversionState, RetoggleMode, Visibility};
pub use crate::overlay::view::{InvertOverlay, OverlayStats};
pub use crate::render::buffers::{BufferGeneration, BufferStats, RasterBuffers};
pub use crate::render::capture::{CaptureOutcome, SkipReason, TransformStage};
pub use crate::render::composite::{OverlayLayer, PremulRgba8, composite_layer, over};

/// Re-export of the raster backend the host draws into.
pub use vello_cpu;
