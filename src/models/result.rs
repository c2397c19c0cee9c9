//! Per-file processing results.
//!
//! A result's payload lives inside its state variant, so a terminal entry
//! carries either the analysis or an error message, never both.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{ImageDimensions, PredictionBox};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum ResultStatus {
    Pending,
    Loading,
    Success,
    Failed,
}

impl ResultStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResultStatus::Pending => "Pending",
            ResultStatus::Loading => "Loading",
            ResultStatus::Success => "Success",
            ResultStatus::Failed => "Failed",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, ResultStatus::Success | ResultStatus::Failed)
    }
}

/// What the detection service returned for one file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisPayload {
    /// Absolute URL of the processed PNG.
    pub image_url: String,
    pub predictions: Vec<PredictionBox>,
    pub image_dimensions: Option<ImageDimensions>,
    pub report: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", content = "data", rename_all = "camelCase")]
pub enum ResultState {
    Pending,
    Loading,
    Success(AnalysisPayload),
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessingResult {
    pub id: Uuid,
    pub file_name: String,
    pub state: ResultState,
}

impl ProcessingResult {
    pub fn pending(id: Uuid, file_name: impl Into<String>) -> Self {
        Self {
            id,
            file_name: file_name.into(),
            state: ResultState::Pending,
        }
    }

    pub fn status(&self) -> ResultStatus {
        match self.state {
            ResultState::Pending => ResultStatus::Pending,
            ResultState::Loading => ResultStatus::Loading,
            ResultState::Success(_) => ResultStatus::Success,
            ResultState::Failed(_) => ResultStatus::Failed,
        }
    }

    pub fn is_loading(&self) -> bool {
        self.status() == ResultStatus::Loading
    }

    pub fn payload(&self) -> Option<&AnalysisPayload> {
        match &self.state {
            ResultState::Success(payload) => Some(payload),
            _ => None,
        }
    }

    pub fn image_url(&self) -> Option<&str> {
        self.payload().map(|payload| payload.image_url.as_str())
    }

    pub fn predictions(&self) -> Option<&[PredictionBox]> {
        self.payload().map(|payload| payload.predictions.as_slice())
    }

    pub fn image_dimensions(&self) -> Option<ImageDimensions> {
        self.payload().and_then(|payload| payload.image_dimensions)
    }

    pub fn report(&self) -> Option<&str> {
        self.payload().map(|payload| payload.report.as_str())
    }

    pub fn error(&self) -> Option<&str> {
        match &self.state {
            ResultState::Failed(message) => Some(message),
            _ => None,
        }
    }
}
