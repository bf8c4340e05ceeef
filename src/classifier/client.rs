use std::time::Duration;

use async_trait::async_trait;
use log::debug;
use reqwest::multipart::{Form, Part};
use serde::Deserialize;

use crate::models::{ClassScore, PredictionResult};
use crate::settings::ApiSettings;

use super::{Classifier, ClassifierError, ImageUpload};

/// Body returned by `POST /predict`.
#[derive(Debug, Clone, Deserialize)]
pub struct PredictionResponse {
    pub prediction: String,
    pub confidence: f64,
    #[serde(default)]
    pub all_results: Vec<WireScore>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WireScore {
    pub label: String,
    pub score: f64,
}

impl TryFrom<PredictionResponse> for PredictionResult {
    type Error = ClassifierError;

    fn try_from(response: PredictionResponse) -> Result<Self, Self::Error> {
        if response.prediction.trim().is_empty() {
            return Err(ClassifierError::InvalidResponse("empty prediction label".into()));
        }
        if !response.confidence.is_finite() || !(0.0..=1.0).contains(&response.confidence) {
            return Err(ClassifierError::InvalidResponse(format!(
                "confidence {} outside [0, 1]",
                response.confidence
            )));
        }

        Ok(PredictionResult {
            label: response.prediction,
            confidence: response.confidence,
            per_class_scores: response
                .all_results
                .into_iter()
                .map(|entry| ClassScore {
                    label: entry.label,
                    score: entry.score,
                })
                .collect(),
        })
    }
}

pub struct HttpClassifier {
    client: reqwest::Client,
    predict_url: String,
    health_url: String,
}

impl HttpClassifier {
    pub fn new(settings: &ApiSettings) -> Result<Self, ClassifierError> {
        Self::with_timeout(settings, settings.request_timeout())
    }

    pub fn with_timeout(settings: &ApiSettings, timeout: Duration) -> Result<Self, ClassifierError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            predict_url: settings.predict_url(),
            health_url: settings.health_url(),
        })
    }

    pub fn predict_url(&self) -> &str {
        &self.predict_url
    }
}

#[async_trait]
impl Classifier for HttpClassifier {
    async fn classify(&self, upload: ImageUpload) -> Result<PredictionResult, ClassifierError> {
        let size = upload.bytes.len();
        let form = Form::new().part(
            "file",
            Part::bytes(upload.bytes)
                .file_name(upload.file_name)
                .mime_str(&upload.mime)?,
        );

        debug!("POST {} ({} bytes)", self.predict_url, size);
        let resp = self
            .client
            .post(&self.predict_url)
            .multipart(form)
            .send()
            .await?;

        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let body = resp.text().await.unwrap_or_default();
            return Err(ClassifierError::Status { status, body });
        }

        let body = resp.bytes().await?;
        let parsed: PredictionResponse = serde_json::from_slice(&body)
            .map_err(|err| ClassifierError::Decode(err.to_string()))?;
        PredictionResult::try_from(parsed)
    }

    async fn health(&self) -> bool {
        match self.client.get(&self.health_url).send().await {
            Ok(resp) => resp.status().is_success(),
            Err(err) => {
                debug!("health check failed: {err}");
                false
            }
        }
    }
}
