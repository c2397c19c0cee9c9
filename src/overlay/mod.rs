//! Detector-space boxes to on-screen overlays.
//!
//! [`mapper`] scales boxes from the detector's native pixel grid onto the
//! rendered image, [`viewport`] applies pan/zoom afterwards, and [`renderer`]
//! turns the result into coloured, labelled overlays.

pub mod mapper;
pub mod renderer;
pub mod viewport;

pub use mapper::{map_box, map_boxes, scale_factors, RenderedSize, Scale, ScreenRect};
pub use renderer::{category_color, paint, OverlayBox, OverlayRenderer};
pub use viewport::ViewTransform;
