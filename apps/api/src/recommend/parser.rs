//! Response Parser — normalizes free-form model output into recommendation
//! records. Never fails the caller: unrecoverable input yields an empty
//! record list plus a diagnostic.

use regex::Regex;
use serde_json::Value;
use thiserror::Error;
use tracing::warn;

use crate::models::plan::SampleBook;

/// Score assigned when the model omits `likely_score`.
const DEFAULT_CONFIDENCE: u8 = 8;

/// Why a model response produced no usable records.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseFailure {
    #[error("no JSON array found in model output")]
    NoJsonFound,

    #[error("malformed JSON in model output: {0}")]
    MalformedJson(String),

    #[error("model output did not match the expected schema: {0}")]
    SchemaViolation(String),
}

/// One recommendation as parsed, before link synthesis.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedRecommendation {
    pub name: String,
    pub confidence_score: u8,
    pub rationale: String,
    pub sample_books: Vec<SampleBook>,
}

/// Result of a parse pass. `failure` is only set when zero records could be
/// recovered; dropped individual elements are a degraded success.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseOutcome {
    pub records: Vec<ParsedRecommendation>,
    pub failure: Option<ParseFailure>,
}

impl ParseOutcome {
    fn failed(failure: ParseFailure) -> Self {
        warn!("recommendation parse failed: {failure}");
        ParseOutcome {
            records: Vec::new(),
            failure: Some(failure),
        }
    }
}

/// Parses raw model text into ranked recommendation records.
pub fn parse(raw: &str) -> ParseOutcome {
    let trimmed = raw.trim();

    let located = locate_array(trimmed);
    let candidate = located.unwrap_or(trimmed);

    let value = match parse_with_repair(candidate) {
        Ok(value) => value,
        Err(err) => {
            let failure = if located.is_some() {
                ParseFailure::MalformedJson(err.to_string())
            } else {
                ParseFailure::NoJsonFound
            };
            return ParseOutcome::failed(failure);
        }
    };

    let items = match value.as_array() {
        Some(items) => items,
        None => {
            return ParseOutcome::failed(ParseFailure::SchemaViolation(
                "expected a JSON array of recommendation objects".to_string(),
            ))
        }
    };

    let mut records = Vec::with_capacity(items.len());
    let mut dropped = 0usize;
    for item in items {
        match extract_record(item) {
            Some(record) => records.push(record),
            None => dropped += 1,
        }
    }
    if dropped > 0 {
        warn!("dropped {dropped} recommendation entries missing a name or sample books");
    }

    // Stable sort keeps the model's ordering within equal scores.
    records.sort_by(|a, b| b.confidence_score.cmp(&a.confidence_score));

    ParseOutcome {
        records,
        failure: None,
    }
}

/// Finds the outermost `[ { ... } ]` span. Models often wrap the array in
/// prose or code fences.
fn locate_array(text: &str) -> Option<&str> {
    let re = Regex::new(r"(?s)\[\s*\{.*\}\s*\]").expect("array pattern compiles");
    re.find(text).map(|m| m.as_str())
}

/// Strict parse, then one retry after stripping trailing commas before
/// closing braces and brackets.
fn parse_with_repair(candidate: &str) -> Result<Value, serde_json::Error> {
    match serde_json::from_str(candidate) {
        Ok(value) => Ok(value),
        Err(first_err) => {
            let repaired = strip_trailing_commas(candidate);
            if repaired == candidate {
                return Err(first_err);
            }
            serde_json::from_str(&repaired)
        }
    }
}

fn strip_trailing_commas(text: &str) -> String {
    let before_brace = Regex::new(r",\s*\}").expect("brace pattern compiles");
    let before_bracket = Regex::new(r",\s*\]").expect("bracket pattern compiles");
    before_bracket
        .replace_all(&before_brace.replace_all(text, "}"), "]")
        .into_owned()
}

fn extract_record(item: &Value) -> Option<ParsedRecommendation> {
    let name = item
        .get("name")
        .and_then(Value::as_str)
        .unwrap_or("")
        .trim();
    if name.is_empty() {
        return None;
    }

    let titles: Vec<&str> = item
        .get("books")
        .and_then(Value::as_array)
        .map(|books| {
            books
                .iter()
                .filter_map(Value::as_str)
                .filter(|t| !t.trim().is_empty())
                .collect()
        })
        .unwrap_or_default();
    if titles.is_empty() {
        return None;
    }

    let confidence_score = item
        .get("likely_score")
        .and_then(|v| v.as_i64().or_else(|| v.as_f64().map(|f| f.round() as i64)))
        .map(|s| s.clamp(1, 10) as u8)
        .unwrap_or(DEFAULT_CONFIDENCE);

    let rationale = item
        .get("rationale")
        .and_then(Value::as_str)
        .unwrap_or("")
        .to_string();

    // The inventory does not track true authors for model-suggested titles;
    // the series/author name stands in.
    let sample_books = titles
        .into_iter()
        .map(|title| SampleBook {
            title: title.to_string(),
            author: name.to_string(),
        })
        .collect();

    Some(ParsedRecommendation {
        name: name.to_string(),
        confidence_score,
        rationale,
        sample_books,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const VALID: &str = r#"[
        {"name": "Zed Saga", "likely_score": 9, "books": ["Zed 1", "Zed 2"], "rationale": "fits"},
        {"name": "Moon Tales", "likely_score": 7, "books": ["Moon 1"], "rationale": "close match"}
    ]"#;

    #[test]
    fn test_parses_valid_array() {
        let outcome = parse(VALID);
        assert!(outcome.failure.is_none());
        assert_eq!(outcome.records.len(), 2);
        assert_eq!(outcome.records[0].name, "Zed Saga");
        assert_eq!(outcome.records[0].sample_books.len(), 2);
        assert_eq!(outcome.records[0].sample_books[0].author, "Zed Saga");
    }

    #[test]
    fn test_trailing_comma_recovers_to_same_records() {
        let with_comma =
            r#"[{"name":"Zed Saga","likely_score":9,"books":["Zed 1","Zed 2"],"rationale":"fits"},]"#;
        let corrected =
            r#"[{"name":"Zed Saga","likely_score":9,"books":["Zed 1","Zed 2"],"rationale":"fits"}]"#;
        let repaired = parse(with_comma);
        let clean = parse(corrected);
        assert!(repaired.failure.is_none());
        assert_eq!(repaired.records, clean.records);
        assert_eq!(repaired.records[0].confidence_score, 9);
        assert_eq!(repaired.records[0].sample_books.len(), 2);
    }

    #[test]
    fn test_trailing_comma_inside_object_recovers() {
        let text = r#"[{"name": "Zed Saga", "books": ["Zed 1"], "rationale": "fits",}]"#;
        let outcome = parse(text);
        assert!(outcome.failure.is_none());
        assert_eq!(outcome.records.len(), 1);
    }

    #[test]
    fn test_json_wrapped_in_prose_and_fences() {
        let text = format!("Here are my picks:\n```json\n{VALID}\n```\nEnjoy!");
        let outcome = parse(&text);
        assert!(outcome.failure.is_none());
        assert_eq!(outcome.records.len(), 2);
    }

    #[test]
    fn test_no_json_at_all_is_no_json_found() {
        let outcome = parse("I'm sorry, I can't provide recommendations right now.");
        assert!(outcome.records.is_empty());
        assert_eq!(outcome.failure, Some(ParseFailure::NoJsonFound));
    }

    #[test]
    fn test_unrepairable_array_is_malformed_json() {
        let outcome = parse(r#"[{"name": "Zed Saga", "books": ["Zed 1" "Zed 2"]}]"#);
        assert!(outcome.records.is_empty());
        assert!(matches!(
            outcome.failure,
            Some(ParseFailure::MalformedJson(_))
        ));
    }

    #[test]
    fn test_top_level_object_is_schema_violation() {
        let outcome = parse(r#"{"name": "Zed Saga", "books": ["Zed 1"]}"#);
        assert!(outcome.records.is_empty());
        assert!(matches!(
            outcome.failure,
            Some(ParseFailure::SchemaViolation(_))
        ));
    }

    #[test]
    fn test_invalid_elements_dropped_without_aborting() {
        let text = r#"[
            {"name": "", "books": ["Ghost 1"]},
            {"name": "No Books", "books": []},
            {"name": "Kept", "books": ["Kept 1"]}
        ]"#;
        let outcome = parse(text);
        assert!(outcome.failure.is_none());
        assert_eq!(outcome.records.len(), 1);
        assert_eq!(outcome.records[0].name, "Kept");
    }

    #[test]
    fn test_missing_score_and_rationale_defaults() {
        let outcome = parse(r#"[{"name": "Zed Saga", "books": ["Zed 1"]}]"#);
        let record = &outcome.records[0];
        assert_eq!(record.confidence_score, 8);
        assert!(record.rationale.is_empty());
    }

    #[test]
    fn test_fractional_score_rounds() {
        let outcome = parse(r#"[{"name": "Zed Saga", "likely_score": 8.6, "books": ["Zed 1"]}]"#);
        assert_eq!(outcome.records[0].confidence_score, 9);
    }

    #[test]
    fn test_out_of_range_score_clamped() {
        let outcome = parse(r#"[{"name": "Zed Saga", "likely_score": 14, "books": ["Zed 1"]}]"#);
        assert_eq!(outcome.records[0].confidence_score, 10);
    }

    #[test]
    fn test_sorted_descending_with_stable_ties() {
        let text = r#"[
            {"name": "Low", "likely_score": 7, "books": ["L"]},
            {"name": "First Nine", "likely_score": 9, "books": ["A"]},
            {"name": "Second Nine", "likely_score": 9, "books": ["B"]}
        ]"#;
        let outcome = parse(text);
        let names: Vec<_> = outcome.records.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["First Nine", "Second Nine", "Low"]);
    }

    #[test]
    fn test_empty_array_is_empty_success() {
        let outcome = parse("[]");
        assert!(outcome.records.is_empty());
        assert!(outcome.failure.is_none());
    }
}
