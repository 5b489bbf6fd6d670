use crate::foundation::core::SurfaceSize;
use crate::foundation::error::OverlayResult;

/// Identity of one buffer allocation.
///
/// Every fresh allocation gets a new generation, so comparing generations before and after a
/// capture tells whether the buffers were replaced.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BufferGeneration(pub u64);

/// Allocation counters for the raster buffers.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BufferStats {
    /// Number of buffer-pair allocations.
    pub allocations: u64,
    /// Number of times a present buffer pair was freed (release or zero-size request).
    pub releases: u64,
    /// Bytes currently held by both buffers.
    pub retained_bytes: usize,
}

/// Owns the capture and presentation rasters.
///
/// Both buffers are premultiplied RGBA8 pixmaps that are always allocated, resized and freed
/// together, so they share dimensions whenever present.
#[derive(Default)]
pub struct RasterBuffers {
    capture: Option<vello_cpu::Pixmap>,
    presentation: Option<vello_cpu::Pixmap>,
    size: Option<SurfaceSize>,
    generation: Option<BufferGeneration>,
    next_generation: u64,
    stats: BufferStats,
}

impl RasterBuffers {
    /// Manager with no buffers allocated.
    pub fn new() -> Self {
        Self::default()
    }

    /// Make sure both buffers exist with exactly `size`.
    ///
    /// Allocates when no buffer exists or the size differs; the previous pair is dropped. A zero
    /// width or height frees the buffers instead. Returns `true` when a fresh pair was allocated.
    pub fn ensure_capacity(&mut self, size: SurfaceSize) -> OverlayResult<bool> {
        if size.is_empty() {
            self.clear();
            return Ok(false);
        }
        if self.size == Some(size) && self.capture.is_some() {
            return Ok(false);
        }

        let (w, h) = size.to_raster_dims()?;
        let replaced = self.size;
        self.capture = Some(vello_cpu::Pixmap::new(w, h));
        self.presentation = Some(vello_cpu::Pixmap::new(w, h));
        self.size = Some(size);

        let generation = BufferGeneration(self.next_generation);
        self.next_generation = self.next_generation.wrapping_add(1);
        self.generation = Some(generation);

        self.stats.allocations = self.stats.allocations.saturating_add(1);
        self.stats.retained_bytes = size.rgba8_len().saturating_mul(2);

        tracing::debug!(
            width = size.width,
            height = size.height,
            generation = generation.0,
            ?replaced,
            "allocated raster buffers"
        );
        Ok(true)
    }

    /// Free both buffers. Calling it with nothing allocated does nothing.
    pub fn release(&mut self) {
        if self.capture.is_none() && self.presentation.is_none() {
            return;
        }
        tracing::debug!(size = ?self.size, "released raster buffers");
        self.clear();
    }

    fn clear(&mut self) {
        if self.capture.is_some() || self.presentation.is_some() {
            self.stats.releases = self.stats.releases.saturating_add(1);
        }
        self.capture = None;
        self.presentation = None;
        self.size = None;
        self.generation = None;
        self.stats.retained_bytes = 0;
    }

    /// Return `true` while buffers are allocated.
    pub fn is_allocated(&self) -> bool {
        self.capture.is_some()
    }

    /// Dimensions of the current buffers.
    pub fn size(&self) -> Option<SurfaceSize> {
        self.size
    }

    /// Identity of the current allocation.
    pub fn generation(&self) -> Option<BufferGeneration> {
        self.generation
    }

    /// Most recent snapshot of the host surface.
    pub fn capture(&self) -> Option<&vello_cpu::Pixmap> {
        self.capture.as_ref()
    }

    /// Transformed copy of the capture buffer.
    pub fn presentation(&self) -> Option<&vello_cpu::Pixmap> {
        self.presentation.as_ref()
    }

    /// Allocation counters.
    pub fn stats(&self) -> BufferStats {
        self.stats
    }

    pub(crate) fn pair_mut(&mut self) -> Option<(&mut vello_cpu::Pixmap, &mut vello_cpu::Pixmap)> {
        match (self.capture.as_mut(), self.presentation.as_mut()) {
            (Some(c), Some(p)) => Some((c, p)),
            _ => None,
        }
    }
}

impl std::fmt::Debug for RasterBuffers {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RasterBuffers")
            .field("size", &self.size)
            .field("generation", &self.generation)
            .field("stats", &self.stats)
            .finish()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/buffers.rs"]
mod tests;
