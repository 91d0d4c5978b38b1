//! Reading-plan types: recommendation records parsed from model output and
//! the fixed-shape monthly plan distributed to parents.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::reader::ReaderProfile;

/// One book entry inside the current-month list or a monthly bucket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanBook {
    pub title: String,
    pub author: String,
    #[serde(default)]
    pub explanation: String,
    #[serde(default)]
    pub link: String,
}

/// A month bucket of the reading plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthPlan {
    pub month: String,
    pub books: Vec<PlanBook>,
}

/// A sample title inside a recommendation record. The catalog does not track
/// the true author of model-suggested titles, so the author label is the
/// series/author name itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SampleBook {
    pub title: String,
    pub author: String,
}

fn default_confidence() -> u8 {
    8
}

/// A ranked series/author recommendation derived from model output.
/// The list is always sorted descending by confidence, stable on ties.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecommendationRecord {
    pub name: String,
    #[serde(default)]
    pub justbookify_link: String,
    #[serde(default)]
    pub rationale: String,
    #[serde(default = "default_confidence")]
    pub confidence_score: u8,
    #[serde(default)]
    pub sample_books: Vec<SampleBook>,
}

/// Response body for plan generation. Always structurally valid; failures
/// past request validation surface through `error`, never as HTTP errors.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanResponse {
    pub current: Vec<PlanBook>,
    pub future: Vec<MonthPlan>,
    pub recommendations: Vec<RecommendationRecord>,
    #[serde(rename = "planId", default, skip_serializing_if = "Option::is_none")]
    pub plan_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Persisted snapshot of one successful generation call.
/// Immutable identity after creation; deletable singly or in bulk.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanDocument {
    pub id: String,
    pub reader: ReaderProfile,
    pub recommendations: Vec<RecommendationRecord>,
    pub current: Vec<PlanBook>,
    pub future: Vec<MonthPlan>,
    pub generated_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_defaults_for_missing_fields() {
        let json = r#"{"name": "Zed Saga"}"#;
        let record: RecommendationRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.confidence_score, 8);
        assert!(record.rationale.is_empty());
        assert!(record.sample_books.is_empty());
        assert!(record.justbookify_link.is_empty());
    }

    #[test]
    fn test_plan_response_omits_optional_fields() {
        let response = PlanResponse {
            current: vec![],
            future: vec![],
            recommendations: vec![],
            plan_id: None,
            error: None,
        };
        let value = serde_json::to_value(&response).unwrap();
        assert!(value.get("planId").is_none());
        assert!(value.get("error").is_none());
    }

    #[test]
    fn test_plan_response_serializes_plan_id_camel_case() {
        let response = PlanResponse {
            current: vec![],
            future: vec![],
            recommendations: vec![],
            plan_id: Some("p-1".to_string()),
            error: Some("LLM error".to_string()),
        };
        let value = serde_json::to_value(&response).unwrap();
        assert_eq!(value["planId"], "p-1");
        assert_eq!(value["error"], "LLM error");
    }

    #[test]
    fn test_plan_book_deserializes_without_link() {
        let json = r#"{"title": "Zed 1", "author": "Zed Saga"}"#;
        let book: PlanBook = serde_json::from_str(json).unwrap();
        assert!(book.link.is_empty());
        assert!(book.explanation.is_empty());
    }
}
