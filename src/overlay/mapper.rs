use serde::Serialize;

use crate::models::{ImageDimensions, PredictionBox};

/// Size of the image as laid out on screen, in CSS-style pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RenderedSize {
    pub width: f64,
    pub height: f64,
}

impl RenderedSize {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Width-constrained layout: the image fills `container_width` and keeps
    /// its aspect ratio. Without a container width the natural size is used.
    pub fn fit_width(container_width: Option<f64>, natural: ImageDimensions) -> Self {
        let natural_size = Self::new(f64::from(natural.width), f64::from(natural.height));
        match container_width {
            Some(width) if width.is_finite() && width > 0.0 && natural.width > 0 => Self::new(
                width,
                f64::from(natural.height) * width / f64::from(natural.width),
            ),
            _ => natural_size,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ScreenRect {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl ScreenRect {
    pub fn right(&self) -> f64 {
        self.left + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.top + self.height
    }

    pub fn is_finite(&self) -> bool {
        self.left.is_finite()
            && self.top.is_finite()
            && self.width.is_finite()
            && self.height.is_finite()
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Scale {
    pub x: f64,
    pub y: f64,
}

impl Scale {
    pub const IDENTITY: Scale = Scale { x: 1.0, y: 1.0 };
}

/// Per-axis scale from native detector pixels to rendered pixels.
///
/// An axis falls back to 1.0 when it cannot be computed: no native dimensions,
/// a zero native axis, or a rendered axis that is zero, negative or not finite
/// (the image has not laid out yet).
pub fn scale_factors(native: Option<ImageDimensions>, rendered: RenderedSize) -> Scale {
    let Some(native) = native else {
        return Scale::IDENTITY;
    };
    Scale {
        x: axis_scale(rendered.width, native.width),
        y: axis_scale(rendered.height, native.height),
    }
}

fn axis_scale(rendered: f64, native: u32) -> f64 {
    if native == 0 || !rendered.is_finite() || rendered <= 0.0 {
        return 1.0;
    }
    rendered / f64::from(native)
}

/// Center-based detector box to a top-left anchored screen rectangle.
pub fn map_box(
    prediction: &PredictionBox,
    native: Option<ImageDimensions>,
    rendered: RenderedSize,
) -> ScreenRect {
    let scale = scale_factors(native, rendered);
    ScreenRect {
        left: (prediction.center_x - prediction.width / 2.0) * scale.x,
        top: (prediction.center_y - prediction.height / 2.0) * scale.y,
        width: prediction.width * scale.x,
        height: prediction.height * scale.y,
    }
}

pub fn map_boxes(
    predictions: &[PredictionBox],
    native: Option<ImageDimensions>,
    rendered: RenderedSize,
) -> Vec<ScreenRect> {
    predictions
        .iter()
        .map(|prediction| map_box(prediction, native, rendered))
        .collect()
}
