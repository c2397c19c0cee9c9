use serde::{Deserialize, Serialize};

/// One detection in the native pixel space of the processed image.
///
/// The detector reports centre-based boxes; the wire names are kept via
/// `serde(rename)` so the JSON from `/api/predict` deserializes directly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionBox {
    #[serde(rename = "class")]
    pub class_label: String,
    pub confidence: f64,
    #[serde(rename = "x")]
    pub center_x: f64,
    #[serde(rename = "y")]
    pub center_y: f64,
    pub width: f64,
    pub height: f64,
}

impl PredictionBox {
    /// Confidence as a whole percentage, rounded half-up.
    pub fn confidence_percent(&self) -> i64 {
        (self.confidence * 100.0).round() as i64
    }

    pub fn label(&self) -> String {
        format!("{} - {}%", self.class_label, self.confidence_percent())
    }
}

/// Native pixel size of the processed image. Authoritative for all scaling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageDimensions {
    pub width: u32,
    pub height: u32,
}

impl ImageDimensions {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn is_degenerate(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}
