//! Analysis models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::recommendations::{display_name, recommendation_for};

/// One class reported by the classifier
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Condition {
    pub name: String,
    /// Percentage in [0, 100]
    pub probability: f64,
}

/// Result of classifying one eye image
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub diagnosis: String,
    /// Percentage in [0, 100]
    pub confidence: f64,
    /// Ordered by probability, highest first
    pub conditions: Vec<Condition>,
    pub recommendations: String,
}

/// Raw response of `POST /predict/`
#[derive(Debug, Clone, Deserialize)]
pub struct PredictionResponse {
    #[serde(alias = "prediction", alias = "class")]
    pub predicted_class: String,
    /// Per-class scores, either fractions or percentages
    #[serde(default, alias = "confidences", alias = "probabilities")]
    pub confidence: HashMap<String, f64>,
}

impl From<PredictionResponse> for AnalysisResult {
    fn from(prediction: PredictionResponse) -> Self {
        let scale = if prediction.confidence.values().all(|value| *value <= 1.0) {
            100.0
        } else {
            1.0
        };

        let mut conditions: Vec<Condition> = prediction
            .confidence
            .iter()
            .map(|(name, value)| Condition {
                name: display_name(name),
                probability: (value * scale).clamp(0.0, 100.0),
            })
            .collect();
        conditions.sort_by(|a, b| {
            b.probability
                .total_cmp(&a.probability)
                .then_with(|| a.name.cmp(&b.name))
        });

        let confidence = prediction
            .confidence
            .get(&prediction.predicted_class)
            .map(|value| (value * scale).clamp(0.0, 100.0))
            .or_else(|| conditions.first().map(|condition| condition.probability))
            .unwrap_or(0.0);

        AnalysisResult {
            diagnosis: display_name(&prediction.predicted_class),
            confidence,
            conditions,
            recommendations: recommendation_for(&prediction.predicted_class).to_string(),
        }
    }
}

/// One entry of the user's analysis history
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisRecord {
    #[serde(default, alias = "_id")]
    pub id: Option<serde_json::Value>,
    #[serde(default, alias = "path")]
    pub file_path: Option<String>,
    #[serde(default)]
    pub file_name: Option<String>,
    #[serde(default, alias = "prediction", alias = "predictedClass")]
    pub diagnosis: Option<String>,
    #[serde(default)]
    pub confidence: Option<f64>,
    #[serde(
        default,
        alias = "uploadedAt",
        deserialize_with = "common::timestamp::deserialize_optional"
    )]
    pub created_at: Option<DateTime<Utc>>,
}

/// History payload: either a bare list or wrapped in `files`
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum HistoryResponse {
    List(Vec<AnalysisRecord>),
    Wrapped { files: Vec<AnalysisRecord> },
}

impl From<HistoryResponse> for Vec<AnalysisRecord> {
    fn from(response: HistoryResponse) -> Self {
        match response {
            HistoryResponse::List(records) | HistoryResponse::Wrapped { files: records } => {
                records
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn prediction(json: &str) -> AnalysisResult {
        serde_json::from_str::<PredictionResponse>(json)
            .unwrap()
            .into()
    }

    #[test]
    fn test_fractions_become_percentages() {
        let result = prediction(
            r#"{"predicted_class":"glaucoma","confidence":{"normal":0.06,"glaucoma":0.91,"cataract":0.03}}"#,
        );

        assert_eq!(result.diagnosis, "Glaucoma");
        assert!((result.confidence - 91.0).abs() < 1e-9);
        let names: Vec<&str> = result.conditions.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["Glaucoma", "Normal", "Cataract"]);
        assert!(result.recommendations.contains("intraocular pressure"));
    }

    #[test]
    fn test_percentages_kept() {
        let result = prediction(
            r#"{"prediction":"diabetic_retinopathy","confidences":{"diabetic_retinopathy":72.5,"normal":27.5}}"#,
        );

        assert_eq!(result.diagnosis, "Diabetic Retinopathy");
        assert!((result.confidence - 72.5).abs() < 1e-9);
        assert!(result.recommendations.contains("blood sugar"));
    }

    #[test]
    fn test_missing_scores() {
        let result = prediction(r#"{"predicted_class":"normal"}"#);
        assert_eq!(result.confidence, 0.0);
        assert!(result.conditions.is_empty());
    }

    #[test]
    fn test_history_shapes() {
        let list: HistoryResponse =
            serde_json::from_str(r#"[{"filePath":"a.jpg","diagnosis":"normal"}]"#).unwrap();
        let wrapped: HistoryResponse = serde_json::from_str(
            r#"{"files":[{"path":"b.jpg","createdAt":"2024-03-01 10:00:00"}]}"#,
        )
        .unwrap();

        let list: Vec<AnalysisRecord> = list.into();
        let wrapped: Vec<AnalysisRecord> = wrapped.into();
        assert_eq!(list[0].file_path.as_deref(), Some("a.jpg"));
        assert_eq!(wrapped[0].file_path.as_deref(), Some("b.jpg"));
        assert!(wrapped[0].created_at.is_some());
    }
}
