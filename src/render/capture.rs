use crate::effects::color_matrix::ColorMatrix;
use crate::foundation::core::{Rgba8, SurfaceSize};
use crate::foundation::error::OverlayResult;
use crate::foundation::math::Fnv1a64;
use crate::host::surface::{Background, HostSurface};
use crate::render::buffers::RasterBuffers;

/// Where the color transform is applied.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum TransformStage {
    /// Capture writes the transformed image into the presentation buffer; painting copies it.
    #[default]
    Capture,
    /// Painting draws the capture buffer through the transform; the presentation buffer is unused.
    Paint,
}

/// Why a capture tick did not render.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SkipReason {
    /// The host reported a zero width or height.
    DegenerateGeometry,
    /// The overlay is fully hidden, so there is nothing to mirror.
    Dormant,
}

/// Result of one capture tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CaptureOutcome {
    /// Nothing was touched.
    Skipped(SkipReason),
    /// The host was rendered into the capture buffer.
    Captured {
        /// Size that was captured.
        size: SurfaceSize,
        /// The buffers were reallocated or their content changed, so the overlay must repaint.
        repaint: bool,
    },
}

/// Renders a host surface into the raster buffers on each host redraw.
pub(crate) struct CapturePipeline {
    ctx: Option<vello_cpu::RenderContext>,
    stage: TransformStage,
    transform: ColorMatrix,
    fallback_background: Rgba8,
    last_fingerprint: Option<u64>,
    needs_repaint: bool,
}

impl CapturePipeline {
    pub(crate) fn new(stage: TransformStage, fallback_background: Rgba8) -> Self {
        Self {
            ctx: None,
            stage,
            transform: ColorMatrix::INVERT,
            fallback_background,
            last_fingerprint: None,
            needs_repaint: false,
        }
    }

    pub(crate) fn stage(&self) -> TransformStage {
        self.stage
    }

    pub(crate) fn transform(&self) -> &ColorMatrix {
        &self.transform
    }

    /// Drop the cached render context along with the buffers it targets.
    pub(crate) fn release(&mut self) {
        self.ctx = None;
        self.last_fingerprint = None;
        self.needs_repaint = false;
    }

    #[tracing::instrument(level = "trace", skip(self, host, buffers))]
    pub(crate) fn capture(
        &mut self,
        host: &dyn HostSurface,
        buffers: &mut RasterBuffers,
    ) -> OverlayResult<CaptureOutcome> {
        let size = host.size();
        if size.width < 1 || size.height < 1 {
            return Ok(CaptureOutcome::Skipped(SkipReason::DegenerateGeometry));
        }

        let before = buffers.generation();
        buffers.ensure_capacity(size)?;
        let (w, h) = size.to_raster_dims()?;

        let mut ctx = match self.ctx.take() {
            Some(ctx) if ctx.width() == w && ctx.height() == h => ctx,
            _ => vello_cpu::RenderContext::new(w, h),
        };
        ctx.reset();
        paint_background(&mut ctx, host.background(), size, self.fallback_background);
        let drawn = host.draw(&mut ctx);
        ctx.flush();

        if buffers.generation() != before {
            self.needs_repaint = true;
        }

        if drawn.is_ok()
            && let Some((capture, presentation)) = buffers.pair_mut()
        {
            ctx.render_to_pixmap(capture);
            let fingerprint = fingerprint_pixels(capture.data_as_u8_slice());
            if self.last_fingerprint != Some(fingerprint) {
                self.last_fingerprint = Some(fingerprint);
                self.needs_repaint = true;
            }
            if self.stage == TransformStage::Capture {
                self.transform.apply_premul(
                    capture.data_as_u8_slice(),
                    presentation.data_as_u8_slice_mut(),
                )?;
            }
        }
        self.ctx = Some(ctx);
        // A failed draw keeps the repaint mark for the next successful tick.
        drawn?;

        let repaint = std::mem::take(&mut self.needs_repaint);
        Ok(CaptureOutcome::Captured { size, repaint })
    }
}

fn fingerprint_pixels(bytes: &[u8]) -> u64 {
    let mut h = Fnv1a64::new_default();
    h.write_u64(bytes.len() as u64);
    h.write_bytes(bytes);
    h.finish()
}

fn paint_background(
    ctx: &mut vello_cpu::RenderContext,
    background: Option<Background>,
    size: SurfaceSize,
    fallback: Rgba8,
) {
    ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
    ctx.set_paint_transform(vello_cpu::kurbo::Affine::IDENTITY);
    match background {
        Some(Background::Image(pixmap)) => {
            // Area outside the image shows the fallback.
            fill_solid(ctx, fallback, size);
            let (w, h) = (f64::from(pixmap.width()), f64::from(pixmap.height()));
            ctx.set_paint(vello_cpu::Image {
                image: vello_cpu::ImageSource::Pixmap(pixmap),
                sampler: vello_cpu::peniko::ImageSampler::default(),
            });
            ctx.fill_rect(&vello_cpu::kurbo::Rect::new(0.0, 0.0, w, h));
        }
        Some(Background::Solid(c)) => fill_solid(ctx, c, size),
        None => fill_solid(ctx, fallback, size),
    }
}

fn fill_solid(ctx: &mut vello_cpu::RenderContext, c: Rgba8, size: SurfaceSize) {
    ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(c.r, c.g, c.b, c.a));
    ctx.fill_rect(&vello_cpu::kurbo::Rect::new(
        0.0,
        0.0,
        f64::from(size.width),
        f64::from(size.height),
    ));
}

#[cfg(test)]
#[path = "../../tests/unit/render/capture.rs"]
mod tests;
