use serde::Serialize;

use super::mapper::{RenderedSize, ScreenRect};

pub const MIN_SCALE: f64 = 0.5;
pub const MAX_SCALE: f64 = 4.0;
pub const ZOOM_STEP: f64 = 0.1;

/// Content and viewport sizes the transform is kept within.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Bounds {
    content: RenderedSize,
    viewport: RenderedSize,
}

/// Pan/zoom applied on top of the rendered image.
///
/// Overlay rectangles are mapped against the unzoomed rendered size first and
/// projected through this transform afterwards, so they move with the image.
/// Once bounds are known the content can never be panned out of the viewport.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewTransform {
    pub scale: f64,
    pub translate_x: f64,
    pub translate_y: f64,
    #[serde(skip)]
    bounds: Option<Bounds>,
}

impl Default for ViewTransform {
    fn default() -> Self {
        Self {
            scale: 1.0,
            translate_x: 0.0,
            translate_y: 0.0,
            bounds: None,
        }
    }
}

impl ViewTransform {
    /// Unzoomed content centred in the viewport, bounded by it.
    pub fn centered(content: RenderedSize, viewport: RenderedSize) -> Self {
        let mut view = Self {
            scale: 1.0,
            translate_x: (viewport.width - content.width) / 2.0,
            translate_y: (viewport.height - content.height) / 2.0,
            bounds: None,
        };
        view.set_bounds(content, viewport);
        view
    }

    /// Keeps every later pan and zoom within `viewport`.
    pub fn set_bounds(&mut self, content: RenderedSize, viewport: RenderedSize) {
        self.bounds = Some(Bounds { content, viewport });
        self.limit_to_bounds();
    }

    pub fn zoom_in(&mut self) {
        self.zoom_to(self.scale + ZOOM_STEP);
    }

    pub fn zoom_out(&mut self) {
        self.zoom_to(self.scale - ZOOM_STEP);
    }

    /// Sets the scale, keeping the translation.
    pub fn zoom_to(&mut self, scale: f64) {
        self.scale = clamp_scale(scale);
        self.limit_to_bounds();
    }

    /// Zooms around a screen-space anchor; the content point under the anchor
    /// stays put unless that would leave the bounds.
    pub fn zoom_at(&mut self, anchor: (f64, f64), scale: f64) {
        let content = self.unproject_point(anchor);
        self.scale = clamp_scale(scale);
        self.translate_x = anchor.0 - content.0 * self.scale;
        self.translate_y = anchor.1 - content.1 * self.scale;
        self.limit_to_bounds();
    }

    pub fn pan_by(&mut self, dx: f64, dy: f64) {
        self.translate_x += dx;
        self.translate_y += dy;
        self.limit_to_bounds();
    }

    /// Back to unzoomed and unpanned. Bounds are kept.
    pub fn reset(&mut self) {
        *self = Self {
            bounds: self.bounds,
            ..Self::default()
        };
        self.limit_to_bounds();
    }

    pub fn project_point(&self, point: (f64, f64)) -> (f64, f64) {
        (
            point.0 * self.scale + self.translate_x,
            point.1 * self.scale + self.translate_y,
        )
    }

    pub fn unproject_point(&self, point: (f64, f64)) -> (f64, f64) {
        (
            (point.0 - self.translate_x) / self.scale,
            (point.1 - self.translate_y) / self.scale,
        )
    }

    pub fn project_rect(&self, rect: ScreenRect) -> ScreenRect {
        let (left, top) = self.project_point((rect.left, rect.top));
        ScreenRect {
            left,
            top,
            width: rect.width * self.scale,
            height: rect.height * self.scale,
        }
    }

    fn limit_to_bounds(&mut self) {
        let Some(Bounds { content, viewport }) = self.bounds else {
            return;
        };
        self.translate_x = limit_axis(self.translate_x, content.width * self.scale, viewport.width);
        self.translate_y =
            limit_axis(self.translate_y, content.height * self.scale, viewport.height);
    }
}

/// Content larger than the viewport must cover it; smaller content must stay
/// inside it.
fn limit_axis(translate: f64, scaled: f64, viewport: f64) -> f64 {
    if !scaled.is_finite() || !viewport.is_finite() {
        return translate;
    }
    let slack = viewport - scaled;
    let (low, high) = if slack < 0.0 { (slack, 0.0) } else { (0.0, slack) };
    translate.clamp(low, high)
}

fn clamp_scale(scale: f64) -> f64 {
    if scale.is_finite() {
        scale.clamp(MIN_SCALE, MAX_SCALE)
    } else {
        1.0
    }
}
