//! Raster side of the overlay: buffer lifecycle, host capture and compositing.

pub(crate) mod buffers;
pub(crate) mod capture;
pub(crate) mod composite;
