use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::PredictionResult;

/// A persisted past prediction. Never mutated after creation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    pub id: String,
    /// `data:<mime>;base64,...` URL of the submitted image.
    pub image_preview: String,
    pub result: PredictionResult,
    pub timestamp: DateTime<Utc>,
}
