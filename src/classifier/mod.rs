//! Prediction API adapter.
//!
//! `Classifier` is the seam the capture controller and the upload path talk
//! to; `HttpClassifier` is the real implementation against the prediction
//! service (`POST /predict` multipart, `GET /health`).

mod client;

pub use client::{HttpClassifier, PredictionResponse, WireScore};

use async_trait::async_trait;
use thiserror::Error;

use crate::models::PredictionResult;

#[derive(Debug, Error)]
pub enum ClassifierError {
    #[error("prediction service unreachable: {0}")]
    Network(#[from] reqwest::Error),

    #[error("prediction failed with status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("could not decode prediction response: {0}")]
    Decode(String),

    #[error("prediction response rejected: {0}")]
    InvalidResponse(String),

    #[error("select a valid image file (jpg, png, webp)")]
    InvalidImage,
}

/// Image bytes plus the name and MIME type the multipart part is sent with.
#[derive(Debug, Clone)]
pub struct ImageUpload {
    pub bytes: Vec<u8>,
    pub file_name: String,
    pub mime: String,
}

impl ImageUpload {
    pub fn jpeg(bytes: Vec<u8>, file_name: impl Into<String>) -> Self {
        Self {
            bytes,
            file_name: file_name.into(),
            mime: "image/jpeg".into(),
        }
    }

    /// Sniffs the format from the bytes; anything `image` cannot recognise is
    /// rejected before it reaches the network.
    pub fn sniffed(bytes: Vec<u8>, file_name: impl Into<String>) -> Result<Self, ClassifierError> {
        let format = image::guess_format(&bytes).map_err(|_| ClassifierError::InvalidImage)?;
        Ok(Self {
            bytes,
            file_name: file_name.into(),
            mime: format.to_mime_type().to_string(),
        })
    }
}

#[async_trait]
pub trait Classifier: Send + Sync {
    async fn classify(&self, upload: ImageUpload) -> Result<PredictionResult, ClassifierError>;

    /// `true` when the service answered its health endpoint with a success status.
    async fn health(&self) -> bool;
}
