use std::time::Duration;

use async_trait::async_trait;
use log::{debug, info};
use reqwest::{
    multipart::{Form, Part},
    Client, Url,
};
use serde::Deserialize;

use crate::{
    error::{TransportError, GENERIC_REJECTION},
    models::{AnalysisPayload, ImageDimensions, PredictionBox},
};

use super::PredictionService;

const PREDICT_PATH: &str = "/api/predict";
const HEALTH_PATH: &str = "/api/health";

#[derive(Debug, Deserialize)]
struct PredictResponse {
    png_url: Option<String>,
    predictions: Option<Vec<PredictionBox>>,
    image_dimensions: Option<ImageDimensions>,
    report: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    detail: Option<String>,
}

#[derive(Debug, Deserialize)]
struct HealthBody {
    status: String,
}

/// `reqwest` client for the detection service.
#[derive(Clone)]
pub struct HttpPredictionClient {
    client: Client,
    base_url: Url,
}

impl HttpPredictionClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, TransportError> {
        let base_url = Url::parse(base_url)
            .map_err(|err| TransportError::InvalidUrl(format!("{base_url}: {err}")))?;
        if base_url.cannot_be_a_base() {
            return Err(TransportError::InvalidUrl(base_url.to_string()));
        }

        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { client, base_url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Resolves a service-relative path (such as a `png_url`) to an absolute URL.
    pub fn resolve(&self, path: &str) -> Result<Url, TransportError> {
        self.base_url
            .join(path)
            .map_err(|err| TransportError::InvalidUrl(format!("{path}: {err}")))
    }

    pub async fn health(&self) -> Result<bool, TransportError> {
        let response = self.client.get(self.resolve(HEALTH_PATH)?).send().await?;
        if !response.status().is_success() {
            return Ok(false);
        }
        let body: HealthBody = response
            .json()
            .await
            .map_err(|err| TransportError::Malformed(err.to_string()))?;
        Ok(body.status == "healthy")
    }

    /// Downloads the processed image behind an absolute URL.
    pub async fn fetch_image(&self, url: &str) -> Result<Vec<u8>, TransportError> {
        let url =
            Url::parse(url).map_err(|err| TransportError::InvalidUrl(format!("{url}: {err}")))?;
        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(TransportError::Rejected {
                status: status.as_u16(),
                detail: format!("Could not fetch processed image ({status})"),
            });
        }
        Ok(response.bytes().await?.to_vec())
    }

    fn payload_from(&self, response: PredictResponse) -> Result<AnalysisPayload, TransportError> {
        let png_url = response
            .png_url
            .ok_or_else(|| TransportError::Malformed("missing png_url".into()))?;
        let predictions = response
            .predictions
            .ok_or_else(|| TransportError::Malformed("missing predictions".into()))?;
        let report = response
            .report
            .ok_or_else(|| TransportError::Malformed("missing report".into()))?;

        Ok(AnalysisPayload {
            image_url: self.resolve(&png_url)?.to_string(),
            predictions,
            image_dimensions: response.image_dimensions,
            report,
        })
    }
}

#[async_trait]
impl PredictionService for HttpPredictionClient {
    async fn predict(
        &self,
        file_name: &str,
        bytes: Vec<u8>,
    ) -> Result<AnalysisPayload, TransportError> {
        let size = bytes.len();
        let part = Part::bytes(bytes)
            .file_name(file_name.to_string())
            .mime_str("application/octet-stream")?;
        let form = Form::new().part("file", part);

        debug!("POST {PREDICT_PATH} {file_name} ({size} bytes)");
        let response = self
            .client
            .post(self.resolve(PREDICT_PATH)?)
            .multipart(form)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let detail = response
                .json::<ErrorBody>()
                .await
                .ok()
                .and_then(|body| body.detail)
                .filter(|detail| !detail.trim().is_empty())
                .unwrap_or_else(|| GENERIC_REJECTION.to_string());
            return Err(TransportError::Rejected {
                status: status.as_u16(),
                detail,
            });
        }

        let body = response.bytes().await?;
        let parsed: PredictResponse = serde_json::from_slice(&body)
            .map_err(|err| TransportError::Malformed(err.to_string()))?;
        let payload = self.payload_from(parsed)?;

        info!(
            "{file_name}: {} finding(s), image {}",
            payload.predictions.len(),
            payload.image_url
        );
        Ok(payload)
    }
}
