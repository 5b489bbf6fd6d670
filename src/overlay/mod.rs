//! The overlay component: inversion state, construction options and the facade that binds
//! capture, fade and paint to a host surface.

pub(crate) mod config;
pub(crate) mod state;
pub(crate) mod view;
