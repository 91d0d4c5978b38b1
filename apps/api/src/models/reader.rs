//! Reader records built incrementally by the quiz flow, and the validated
//! profile view consumed by the recommendation pipeline.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Reader reaction to a known book series, captured by the quiz.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SeriesReaction {
    Love,
    Like,
    Neutral,
    DidNotEnjoy,
    DontReadAnymore,
}

/// One quiz answer about a book series the reader may have read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeriesResponse {
    pub series_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub series_name: Option<String>,
    pub has_read: bool,
    #[serde(default)]
    pub response: Option<SeriesReaction>,
}

impl SeriesResponse {
    /// Display name used in the prompt's exclude/prioritize lists.
    pub fn display_name(&self) -> &str {
        self.series_name.as_deref().unwrap_or(&self.series_id)
    }
}

/// Per-step completion flags for the quiz flow.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizProgress {
    pub parent_consent: bool,
    pub basic_info: bool,
    pub parent_reading: bool,
    pub genres: bool,
    pub interests: bool,
    pub book_series: bool,
    pub completed: bool,
}

/// Quiz step markers; flipping one marks the matching progress flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuizStep {
    BasicInfo,
    ParentReading,
    Genres,
    Interests,
    BookSeries,
    Completed,
}

/// A quiz reader as stored: created at parent consent, mutated per step,
/// finalized once every step reports done.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReaderRecord {
    pub id: String,
    pub parent_email: String,
    pub parent_phone: String,
    pub consent_timestamp: String,
    pub status: String,
    pub quiz_progress: QuizProgress,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub age: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_reading: Option<Value>,
    #[serde(default)]
    pub selected_genres: Vec<String>,
    #[serde(default)]
    pub top_three_genres: Vec<String>,
    #[serde(default)]
    pub fiction_genres: Vec<String>,
    #[serde(default)]
    pub non_fiction_genres: Vec<String>,
    #[serde(default)]
    pub additional_genres: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fiction_non_fiction_ratio: Option<Value>,
    #[serde(default)]
    pub selected_interests: Vec<String>,
    #[serde(default)]
    pub non_fiction_interests: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prefers_series: Option<bool>,
    #[serde(default)]
    pub book_series: Vec<SeriesResponse>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recommendations: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recommendations_generated_at: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<String>,
}

impl ReaderRecord {
    /// Initial record written when parent consent is given.
    pub fn from_consent(
        id: String,
        email: String,
        phone: String,
        timestamp: Option<String>,
        now: DateTime<Utc>,
    ) -> Self {
        ReaderRecord {
            id,
            parent_email: email,
            parent_phone: phone,
            consent_timestamp: timestamp.unwrap_or_else(|| now.to_rfc3339()),
            status: "consent_given".to_string(),
            quiz_progress: QuizProgress {
                parent_consent: true,
                ..QuizProgress::default()
            },
            name: None,
            age: None,
            parent_reading: None,
            selected_genres: Vec::new(),
            top_three_genres: Vec::new(),
            fiction_genres: Vec::new(),
            non_fiction_genres: Vec::new(),
            additional_genres: Vec::new(),
            fiction_non_fiction_ratio: None,
            selected_interests: Vec::new(),
            non_fiction_interests: Vec::new(),
            prefers_series: None,
            book_series: Vec::new(),
            recommendations: None,
            recommendations_generated_at: None,
            created_at: now,
            updated_at: now,
            completed_at: None,
        }
    }

    /// Merges an incremental quiz update into the record.
    pub fn apply(&mut self, patch: ReaderPatch, now: DateTime<Utc>) {
        if let Some(name) = patch.name {
            self.name = Some(name);
        }
        if let Some(age) = patch.age {
            self.age = Some(age);
        }
        if let Some(parent_reading) = patch.parent_reading {
            self.parent_reading = Some(parent_reading);
        }
        if let Some(genres) = patch.selected_genres {
            self.selected_genres = genres;
        }
        if let Some(genres) = patch.top_three_genres {
            self.top_three_genres = genres;
        }
        if let Some(genres) = patch.fiction_genres {
            self.fiction_genres = genres;
        }
        if let Some(genres) = patch.non_fiction_genres {
            self.non_fiction_genres = genres;
        }
        if let Some(genres) = patch.additional_genres {
            self.additional_genres = genres;
        }
        if let Some(ratio) = patch.fiction_non_fiction_ratio {
            self.fiction_non_fiction_ratio = Some(ratio);
        }
        if let Some(interests) = patch.selected_interests {
            self.selected_interests = interests;
        }
        if let Some(interests) = patch.non_fiction_interests {
            self.non_fiction_interests = interests;
        }
        if let Some(prefers) = patch.prefers_series {
            self.prefers_series = Some(prefers);
        }
        if let Some(series) = patch.book_series {
            self.book_series = series;
        }
        if let Some(email) = patch.parent_email {
            self.parent_email = email;
        }
        if let Some(phone) = patch.parent_phone {
            self.parent_phone = phone;
        }
        if let Some(status) = patch.status {
            self.status = status;
        }
        if let Some(completed_at) = patch.completed_at {
            self.completed_at = Some(completed_at);
        }
        if let Some(recommendations) = patch.recommendations {
            self.recommendations = Some(recommendations);
        }
        if let Some(at) = patch.recommendations_generated_at {
            self.recommendations_generated_at = Some(at);
        }
        if let Some(step) = patch.step {
            match step {
                QuizStep::BasicInfo => self.quiz_progress.basic_info = true,
                QuizStep::ParentReading => self.quiz_progress.parent_reading = true,
                QuizStep::Genres => self.quiz_progress.genres = true,
                QuizStep::Interests => self.quiz_progress.interests = true,
                QuizStep::BookSeries => self.quiz_progress.book_series = true,
                QuizStep::Completed => {
                    self.quiz_progress.completed = true;
                    self.status = "completed".to_string();
                }
            }
        }
        self.updated_at = now;
    }
}

/// Incremental update to a stored reader. Every field is optional; handlers
/// attach the quiz step so the store flips the right progress flag.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReaderPatch {
    pub name: Option<String>,
    pub age: Option<u8>,
    pub parent_reading: Option<Value>,
    pub selected_genres: Option<Vec<String>>,
    pub top_three_genres: Option<Vec<String>>,
    pub fiction_genres: Option<Vec<String>>,
    pub non_fiction_genres: Option<Vec<String>>,
    pub additional_genres: Option<Vec<String>>,
    pub fiction_non_fiction_ratio: Option<Value>,
    pub selected_interests: Option<Vec<String>>,
    pub non_fiction_interests: Option<Vec<String>>,
    pub prefers_series: Option<bool>,
    pub book_series: Option<Vec<SeriesResponse>>,
    pub parent_email: Option<String>,
    pub parent_phone: Option<String>,
    pub status: Option<String>,
    pub completed_at: Option<String>,
    pub recommendations: Option<Value>,
    pub recommendations_generated_at: Option<String>,
    #[serde(skip)]
    pub step: Option<QuizStep>,
}

/// Fully validated reader view consumed by the recommendation pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReaderProfile {
    pub name: String,
    pub age: u8,
    pub selected_genres: Vec<String>,
    pub selected_interests: Vec<String>,
    pub non_fiction_interests: Vec<String>,
    #[serde(default)]
    pub prefers_series: bool,
    #[serde(default)]
    pub book_series: Vec<SeriesResponse>,
    pub parent_email: String,
    pub parent_phone: String,
}

impl ReaderProfile {
    /// Series the reader read and reacted against; never recommended again.
    pub fn exclude_list(&self) -> Vec<String> {
        self.book_series
            .iter()
            .filter(|r| {
                r.has_read
                    && matches!(
                        r.response,
                        Some(SeriesReaction::DidNotEnjoy) | Some(SeriesReaction::DontReadAnymore)
                    )
            })
            .map(|r| r.display_name().to_string())
            .collect()
    }

    /// Series the reader read and loved or liked; ranked ahead of peers.
    pub fn prioritize_list(&self) -> Vec<String> {
        self.book_series
            .iter()
            .filter(|r| {
                r.has_read
                    && matches!(
                        r.response,
                        Some(SeriesReaction::Love) | Some(SeriesReaction::Like)
                    )
            })
            .map(|r| r.display_name().to_string())
            .collect()
    }
}
