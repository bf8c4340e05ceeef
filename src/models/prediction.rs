//! Classifier output as the rest of the crate sees it.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ClassScore {
    pub label: String,
    pub score: f64,
}

/// One classifier verdict. `per_class_scores` keeps the order the API sent
/// (highest score first).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PredictionResult {
    pub label: String,
    pub confidence: f64,
    pub per_class_scores: Vec<ClassScore>,
}

impl PredictionResult {
    /// Confidence as a whole percentage, the way it is displayed.
    pub fn confidence_percent(&self) -> u8 {
        (self.confidence.clamp(0.0, 1.0) * 100.0).round() as u8
    }

    /// Scores other than the winning label.
    pub fn alternatives(&self) -> impl Iterator<Item = &ClassScore> {
        self.per_class_scores
            .iter()
            .filter(move |entry| entry.label != self.label)
    }
}
