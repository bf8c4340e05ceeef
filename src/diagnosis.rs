//! What the front end shows for one prediction.

use serde::Serialize;

use crate::labels::{advice_for, parse_label, DiseaseAdvice};
use crate::models::PredictionResult;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Alternative {
    pub name: String,
    pub percent: u8,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Diagnosis {
    pub plant: String,
    pub condition: String,
    pub confidence_percent: u8,
    pub advice: &'static DiseaseAdvice,
    pub alternatives: Vec<Alternative>,
}

impl Diagnosis {
    pub fn from_result(result: &PredictionResult) -> Self {
        let parsed = parse_label(&result.label);
        let alternatives = result
            .alternatives()
            .map(|entry| Alternative {
                name: parse_label(&entry.label).display_name(),
                percent: (entry.score.clamp(0.0, 1.0) * 100.0).round() as u8,
            })
            .collect();

        Self {
            advice: advice_for(&parsed.condition),
            plant: parsed.plant,
            condition: parsed.condition,
            confidence_percent: result.confidence_percent(),
            alternatives,
        }
    }

    pub fn is_healthy(&self) -> bool {
        self.condition == "Sana"
    }

    /// Plain-text rendering for the terminal.
    pub fn render(&self) -> String {
        let mut out = format!(
            "{} - {} ({}%)\n",
            self.plant, self.condition, self.confidence_percent
        );
        push_section(&mut out, "Causas", self.advice.causes);
        push_section(&mut out, "Tratamiento", self.advice.treatment);
        push_section(&mut out, "Prevención", self.advice.prevention);

        if !self.alternatives.is_empty() {
            out.push_str("Otras posibilidades:\n");
            for alt in &self.alternatives {
                out.push_str(&format!("  - {} ({}%)\n", alt.name, alt.percent));
            }
        }
        out
    }
}

fn push_section(out: &mut String, title: &str, lines: &[&str]) {
    if lines.is_empty() {
        return;
    }
    out.push_str(title);
    out.push_str(":\n");
    for line in lines {
        out.push_str("  - ");
        out.push_str(line);
        out.push('\n');
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ClassScore;

    #[test]
    fn test_diagnosis_for_rust_infection() {
        let result = PredictionResult {
            label: "Corn_(maize)___Common_rust_".into(),
            confidence: 0.912,
            per_class_scores: vec![
                ClassScore { label: "Corn_(maize)___Common_rust_".into(), score: 0.912 },
                ClassScore { label: "Corn_(maize)___healthy".into(), score: 0.07 },
            ],
        };

        let diagnosis = Diagnosis::from_result(&result);
        assert_eq!(diagnosis.plant, "Maíz");
        assert_eq!(diagnosis.condition, "Roya Común");
        assert_eq!(diagnosis.confidence_percent, 91);
        assert!(!diagnosis.is_healthy());
        assert_eq!(diagnosis.alternatives.len(), 1);
        assert_eq!(diagnosis.alternatives[0].name, "Maíz - Sana");
        assert_eq!(diagnosis.alternatives[0].percent, 7);
        assert!(diagnosis.advice.causes.contains(&"Hongo Puccinia sorghi"));
    }

    #[test]
    fn test_render_skips_empty_sections() {
        let result = PredictionResult {
            label: "Tomato___healthy".into(),
            confidence: 1.0,
            per_class_scores: Vec::new(),
        };
        let text = Diagnosis::from_result(&result).render();
        assert!(text.starts_with("Tomate - Sana (100%)"));
        assert!(!text.contains("Causas"));
        assert!(text.contains("Prevención"));
    }
}
