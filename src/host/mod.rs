//! Host-side collaborators: the surface being mirrored and its after-draw notifications.

pub(crate) mod notifier;
pub(crate) mod surface;
