use std::time::Duration;

use crate::animation::ease::Ease;
use crate::animation::fade::OpacityFade;

/// Logical inversion state.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum InversionState {
    /// The overlay shows (or is fading in) the inverted host.
    Inverted,
    /// The overlay is hidden (or fading out).
    NotInverted,
}

/// Whether the overlay takes part in the host's paint pass.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Visibility {
    /// Painted at the current opacity.
    Visible,
    /// Not painted; buffers are released.
    Hidden,
}

/// Where a toggle issued mid-fade starts the new fade from.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum RetoggleMode {
    /// Restart from the nominal endpoint (0 or 1). The opacity may jump.
    #[default]
    FromEndpoint,
    /// Continue from the current interpolated opacity, scaling the duration by the remaining
    /// distance so the fade speed stays constant.
    FromCurrent,
}

/// Completion of a fade, delivered from [`InvertOverlay::advance`](crate::InvertOverlay::advance).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FadeEvent {
    /// The fade to full opacity finished.
    ShownFully,
    /// The fade to zero opacity finished; the overlay is now hidden and its buffers released.
    Hidden,
}

pub(crate) struct InversionMachine {
    state: InversionState,
    visibility: Visibility,
    fade: Option<OpacityFade>,
    settled_opacity: f32,
    duration: Duration,
    ease: Ease,
    retoggle: RetoggleMode,
}

impl InversionMachine {
    pub(crate) fn new(
        initially_inverted: bool,
        duration: Duration,
        ease: Ease,
        retoggle: RetoggleMode,
    ) -> Self {
        let (state, visibility, settled_opacity) = if initially_inverted {
            (InversionState::Inverted, Visibility::Visible, 1.0)
        } else {
            (InversionState::NotInverted, Visibility::Hidden, 0.0)
        };
        Self {
            state,
            visibility,
            fade: None,
            settled_opacity,
            duration,
            ease,
            retoggle,
        }
    }

    pub(crate) fn state(&self) -> InversionState {
        self.state
    }

    pub(crate) fn is_inverted(&self) -> bool {
        self.state == InversionState::Inverted
    }

    pub(crate) fn visibility(&self) -> Visibility {
        self.visibility
    }

    #[cfg(test)]
    pub(crate) fn fade(&self) -> Option<&OpacityFade> {
        self.fade.as_ref()
    }

    pub(crate) fn is_animating(&self) -> bool {
        self.fade.is_some()
    }

    /// Capture only matters while something may be shown. A fade that has run out counts as over
    /// even before [`InversionMachine::advance`] settles it.
    pub(crate) fn needs_capture(&self, now: Duration) -> bool {
        self.is_inverted() || self.fade.is_some_and(|f| !f.is_finished(now))
    }

    pub(crate) fn opacity(&self, now: Duration) -> f32 {
        match &self.fade {
            Some(f) => f.sample(now),
            None => self.settled_opacity,
        }
    }

    /// Flip the logical state and start the matching fade. Returns the new state.
    pub(crate) fn toggle(&mut self, now: Duration) -> InversionState {
        let current = self.opacity(now);
        self.state = match self.state {
            InversionState::Inverted => InversionState::NotInverted,
            InversionState::NotInverted => InversionState::Inverted,
        };

        let (from, to) = match self.state {
            InversionState::Inverted => (0.0, 1.0),
            InversionState::NotInverted => (1.0, 0.0),
        };
        let (from, duration) = match self.retoggle {
            RetoggleMode::FromEndpoint => (from, self.duration),
            RetoggleMode::FromCurrent if self.fade.is_some() => {
                let remaining = f64::from((to - current).abs());
                (current, self.duration.mul_f64(remaining))
            }
            RetoggleMode::FromCurrent => (from, self.duration),
        };

        if self.state == InversionState::Inverted {
            self.visibility = Visibility::Visible;
        }
        self.fade = Some(OpacityFade::new(from, to, now, duration, self.ease));
        tracing::debug!(
            state = ?self.state,
            from,
            to,
            duration_ms = duration.as_millis() as u64,
            "inversion fade started"
        );
        self.state
    }

    /// Settle a finished fade. Returns the completion event, if one happened.
    pub(crate) fn advance(&mut self, now: Duration) -> Option<FadeEvent> {
        let fade = self.fade?;
        if !fade.is_finished(now) {
            return None;
        }
        self.fade = None;
        self.settled_opacity = fade.target();

        let event = match self.state {
            InversionState::Inverted => FadeEvent::ShownFully,
            InversionState::NotInverted => {
                self.visibility = Visibility::Hidden;
                FadeEvent::Hidden
            }
        };
        tracing::debug!(?event, "inversion fade finished");
        Some(event)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/overlay/state.rs"]
mod tests;
