use image::{Rgba, RgbaImage};
use serde::Serialize;

use crate::models::{ImageDimensions, PredictionBox, ProcessingResult};

use super::{
    mapper::{map_box, RenderedSize, ScreenRect},
    viewport::ViewTransform,
};

pub const CAVITY_COLOR: [u8; 3] = [255, 0, 0];
pub const LESION_COLOR: [u8; 3] = [0, 0, 255];
pub const DEFAULT_COLOR: [u8; 3] = [0, 255, 0];

/// Label text sits this far above the box's top-left corner.
pub const LABEL_OFFSET: f64 = 20.0;
const BORDER_WIDTH: f64 = 2.0;
const LABEL_CHAR_WIDTH: f64 = 7.0;
const LABEL_PADDING: f64 = 4.0;

pub fn category_color(class_label: &str) -> [u8; 3] {
    match class_label.trim().to_ascii_lowercase().as_str() {
        "cavity" => CAVITY_COLOR,
        "periapical lesion" => LESION_COLOR,
        _ => DEFAULT_COLOR,
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OverlayBox {
    pub rect: ScreenRect,
    pub label: String,
    pub label_anchor: (f64, f64),
    pub confidence_percent: i64,
    pub category: String,
    pub color: [u8; 3],
}

impl OverlayBox {
    fn from_prediction(prediction: &PredictionBox, rect: ScreenRect) -> Self {
        Self {
            rect,
            label: prediction.label(),
            label_anchor: (rect.left, rect.top - LABEL_OFFSET),
            confidence_percent: prediction.confidence_percent(),
            category: prediction.class_label.clone(),
            color: category_color(&prediction.class_label),
        }
    }

    /// The label offset lives in image space, so it scales with the zoom.
    fn projected(&self, view: &ViewTransform) -> Self {
        Self {
            rect: view.project_rect(self.rect),
            label_anchor: view.project_point(self.label_anchor),
            ..self.clone()
        }
    }
}

/// Remembers the image's last laid-out size and recomputes overlays from it.
///
/// Nothing else is cached: each `render` call maps the predictions it is given
/// against the native dimensions it is given.
#[derive(Debug, Clone, Default)]
pub struct OverlayRenderer {
    rendered: Option<RenderedSize>,
}

impl OverlayRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Called once the image element has its natural size.
    pub fn on_image_load(
        &mut self,
        natural: ImageDimensions,
        container_width: Option<f64>,
    ) -> RenderedSize {
        let rendered = RenderedSize::fit_width(container_width, natural);
        self.rendered = Some(rendered);
        rendered
    }

    pub fn set_rendered_size(&mut self, rendered: RenderedSize) {
        self.rendered = Some(rendered);
    }

    pub fn rendered_size(&self) -> Option<RenderedSize> {
        self.rendered
    }

    pub fn render(
        &self,
        predictions: Option<&[PredictionBox]>,
        native: Option<ImageDimensions>,
    ) -> Vec<OverlayBox> {
        let Some(predictions) = predictions else {
            return Vec::new();
        };
        // Before the image loads the mapper falls back to identity scaling.
        let rendered = self.rendered.unwrap_or(RenderedSize::new(0.0, 0.0));

        predictions
            .iter()
            .map(|prediction| {
                OverlayBox::from_prediction(prediction, map_box(prediction, native, rendered))
            })
            .collect()
    }

    pub fn render_in_view(
        &self,
        predictions: Option<&[PredictionBox]>,
        native: Option<ImageDimensions>,
        view: &ViewTransform,
    ) -> Vec<OverlayBox> {
        self.render(predictions, native)
            .iter()
            .map(|overlay| overlay.projected(view))
            .collect()
    }

    /// Overlays for a result card; empty unless the result succeeded.
    pub fn render_result(&self, result: &ProcessingResult) -> Vec<OverlayBox> {
        self.render(result.predictions(), result.image_dimensions())
    }
}

/// Burns overlays into a raster: a border inside each rectangle and a solid
/// label tab above it. Everything is clipped to the raster bounds.
pub fn paint(raster: &mut RgbaImage, boxes: &[OverlayBox]) {
    for overlay in boxes {
        let [r, g, b] = overlay.color;
        let color = Rgba([r, g, b, 255]);
        let rect = overlay.rect;
        let border = BORDER_WIDTH.min(rect.width / 2.0).min(rect.height / 2.0);

        fill_rect(raster, rect.left, rect.top, rect.right(), rect.top + border, color);
        fill_rect(raster, rect.left, rect.bottom() - border, rect.right(), rect.bottom(), color);
        fill_rect(raster, rect.left, rect.top, rect.left + border, rect.bottom(), color);
        fill_rect(raster, rect.right() - border, rect.top, rect.right(), rect.bottom(), color);

        // No font rasterizer here; the tab is sized to the label text.
        let tab_width = overlay.label.chars().count() as f64 * LABEL_CHAR_WIDTH + LABEL_PADDING * 2.0;
        let (tab_left, tab_top) = overlay.label_anchor;
        fill_rect(raster, tab_left, tab_top, tab_left + tab_width, rect.top, color);
    }
}

fn fill_rect(raster: &mut RgbaImage, left: f64, top: f64, right: f64, bottom: f64, color: Rgba<u8>) {
    let (width, height) = (i64::from(raster.width()), i64::from(raster.height()));
    let x0 = (left.floor() as i64).clamp(0, width);
    let x1 = (right.ceil() as i64).clamp(0, width);
    let y0 = (top.floor() as i64).clamp(0, height);
    let y1 = (bottom.ceil() as i64).clamp(0, height);

    for y in y0..y1 {
        for x in x0..x1 {
            raster.put_pixel(x as u32, y as u32, color);
        }
    }
}
