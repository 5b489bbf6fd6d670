use std::path::Path;
use std::time::Duration;

use anyhow::Context as _;

use crate::animation::ease::Ease;
use crate::foundation::core::Rgba8;
use crate::foundation::error::{OverlayError, OverlayResult};
use crate::overlay::state::RetoggleMode;
use crate::render::capture::TransformStage;

/// Default fade duration between the inverted and plain states.
pub const DEFAULT_FADE_MS: u64 = 700;

/// Overlay construction options.
///
/// Every field has a default, so a JSON document only needs the fields it changes. Unknown
/// fields are rejected.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OverlayConfig {
    /// Identifier of the host surface to attach to at construction, resolved through a
    /// [`SurfaceLookup`](crate::SurfaceLookup).
    pub attach_to: Option<String>,
    /// Start in the inverted (visible) state.
    pub initially_inverted: bool,
    /// Length of the fade when toggling, in milliseconds.
    pub fade_duration_ms: u64,
    /// Easing of the fade.
    pub ease: Ease,
    /// Behavior of a toggle issued while a fade is running.
    pub retoggle: RetoggleMode,
    /// Where the color inversion is applied.
    pub transform_stage: TransformStage,
    /// Capture background used when the host has none.
    pub fallback_background: Rgba8,
}

impl Default for OverlayConfig {
    fn default() -> Self {
        Self {
            attach_to: None,
            initially_inverted: true,
            fade_duration_ms: DEFAULT_FADE_MS,
            ease: Ease::default(),
            retoggle: RetoggleMode::default(),
            transform_stage: TransformStage::default(),
            fallback_background: Rgba8::WHITE,
        }
    }
}

impl OverlayConfig {
    /// Parse and validate a JSON document.
    pub fn from_json_str(json: &str) -> OverlayResult<Self> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| OverlayError::config(format!("invalid overlay config: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a JSON file.
    pub fn from_json_path(path: &Path) -> OverlayResult<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("read overlay config '{}'", path.display()))?;
        Self::from_json_str(&text)
    }

    /// Check field ranges.
    pub fn validate(&self) -> OverlayResult<()> {
        if self.fade_duration_ms == 0 {
            return Err(OverlayError::config("fade_duration_ms must be > 0"));
        }
        if let Some(id) = &self.attach_to
            && id.trim().is_empty()
        {
            return Err(OverlayError::config("attach_to must be non-empty when set"));
        }
        Ok(())
    }

    /// Fade duration as a [`Duration`].
    pub fn fade_duration(&self) -> Duration {
        Duration::from_millis(self.fade_duration_ms)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/overlay/config.rs"]
mod tests;
