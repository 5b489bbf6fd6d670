/// Convenience result type used across the overlay crate.
pub type OverlayResult<T> = Result<T, OverlayError>;

/// Top-level error taxonomy used by overlay APIs.
///
/// The capture/composite hot path never surfaces these to the host draw cycle: failures there are
/// logged and the tick is skipped. Errors are returned from explicit setup calls (buffer sizing,
/// configuration, host rendering invoked directly).
#[derive(thiserror::Error, Debug)]
pub enum OverlayError {
    /// Invalid user-provided sizes or parameters.
    #[error("validation error: {0}")]
    Validation(String),

    /// A host surface failed to render itself into the capture target.
    #[error("render error: {0}")]
    Render(String),

    /// Invalid or unreadable overlay configuration.
    #[error("config error: {0}")]
    Config(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl OverlayError {
    /// Build an [`OverlayError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build an [`OverlayError::Render`] value.
    pub fn render(msg: impl Into<String>) -> Self {
        Self::Render(msg.into())
    }

    /// Build an [`OverlayError::Config`] value.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
