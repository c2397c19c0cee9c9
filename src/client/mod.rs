//! Transport seam between the batch processor and the detection service.

pub mod http;

use async_trait::async_trait;

use crate::{error::TransportError, models::AnalysisPayload};

pub use http::HttpPredictionClient;

/// Sends one file for analysis. Implementations make exactly one attempt.
#[async_trait]
pub trait PredictionService: Send + Sync {
    async fn predict(&self, file_name: &str, bytes: Vec<u8>)
        -> Result<AnalysisPayload, TransportError>;
}
