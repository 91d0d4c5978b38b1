//! Axum route handlers for the quiz flow. Each step validates its own
//! fields, patches the stored reader, and flips the matching progress flag.

use axum::{
    extract::{Path, State},
    Json,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;
use uuid::Uuid;

use crate::catalog::brackets::bracket_for_age;
use crate::errors::AppError;
use crate::models::reader::{
    QuizStep, ReaderPatch, ReaderRecord, SeriesReaction, SeriesResponse,
};
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct ConsentRequest {
    pub email: Option<String>,
    pub phone: Option<String>,
    pub timestamp: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsentResponse {
    pub success: bool,
    pub user_id: String,
    pub message: String,
}

#[derive(Debug, Deserialize)]
pub struct BasicInfoRequest {
    pub name: Option<String>,
    pub age: Option<u8>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParentReadingRequest {
    pub parent_reading: Option<Value>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenresRequest {
    pub selected_genres: Option<Vec<String>>,
    pub top_three_genres: Option<Vec<String>>,
    pub fiction_genres: Option<Vec<String>>,
    pub non_fiction_genres: Option<Vec<String>>,
    pub additional_genres: Option<Vec<String>>,
    pub fiction_non_fiction_ratio: Option<Value>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InterestsRequest {
    #[serde(default)]
    pub selected_interests: Vec<String>,
    #[serde(default)]
    pub non_fiction_interests: Vec<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookSeriesRequest {
    #[serde(default)]
    pub book_series: Vec<SeriesResponse>,
    pub prefers_series: Option<bool>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeriesResponseRequest {
    pub series_id: Option<String>,
    pub series_name: Option<String>,
    pub has_read: Option<bool>,
    pub response: Option<SeriesReaction>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompleteQuizRequest {
    pub user_id: Option<String>,
    #[serde(flatten)]
    pub fields: ReaderPatch,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveRecommendationsRequest {
    pub recommendations: Option<Value>,
    pub generated_at: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ReaderEnvelope {
    pub success: bool,
    pub user: ReaderRecord,
}

#[derive(Debug, Serialize)]
pub struct ReadersEnvelope {
    pub success: bool,
    pub users: Vec<ReaderRecord>,
}

#[derive(Debug, Serialize)]
pub struct MessageEnvelope {
    pub success: bool,
    pub message: String,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /quiz/parent-consent
///
/// Creates the initial reader record; every later step patches it.
pub async fn handle_parent_consent(
    State(state): State<AppState>,
    Json(request): Json<ConsentRequest>,
) -> Result<Json<ConsentResponse>, AppError> {
    let email = request
        .email
        .filter(|e| !e.trim().is_empty())
        .ok_or_else(|| AppError::Validation("Email and phone are required".to_string()))?;
    let phone = request
        .phone
        .filter(|p| !p.trim().is_empty())
        .ok_or_else(|| AppError::Validation("Email and phone are required".to_string()))?;

    let reader = ReaderRecord::from_consent(
        Uuid::new_v4().to_string(),
        email,
        phone,
        request.timestamp,
        Utc::now(),
    );
    let user_id = reader.id.clone();
    state
        .store
        .insert_reader(reader)
        .await
        .map_err(AppError::Internal)?;

    Ok(Json(ConsentResponse {
        success: true,
        user_id,
        message: "Parent consent saved and user created successfully".to_string(),
    }))
}

/// PUT /quiz/users/:id/basic-info
pub async fn handle_basic_info(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    Json(request): Json<BasicInfoRequest>,
) -> Result<Json<ReaderEnvelope>, AppError> {
    let name = request
        .name
        .filter(|n| !n.trim().is_empty())
        .ok_or_else(|| AppError::Validation("Name and age are required".to_string()))?;
    let age = request
        .age
        .ok_or_else(|| AppError::Validation("Name and age are required".to_string()))?;
    debug!(
        "reader {user_id} aged {age} falls in bracket {}",
        bracket_for_age(age).label
    );

    apply_patch(
        &state,
        &user_id,
        ReaderPatch {
            name: Some(name),
            age: Some(age),
            step: Some(QuizStep::BasicInfo),
            ..ReaderPatch::default()
        },
    )
    .await
}

/// PUT /quiz/users/:id/parent-reading
pub async fn handle_parent_reading(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    Json(request): Json<ParentReadingRequest>,
) -> Result<Json<ReaderEnvelope>, AppError> {
    let parent_reading = request.parent_reading.ok_or_else(|| {
        AppError::Validation("Parent reading habits are required".to_string())
    })?;

    apply_patch(
        &state,
        &user_id,
        ReaderPatch {
            parent_reading: Some(parent_reading),
            step: Some(QuizStep::ParentReading),
            ..ReaderPatch::default()
        },
    )
    .await
}

/// PUT /quiz/users/:id/genres
pub async fn handle_genres(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    Json(request): Json<GenresRequest>,
) -> Result<Json<ReaderEnvelope>, AppError> {
    apply_patch(
        &state,
        &user_id,
        ReaderPatch {
            selected_genres: request.selected_genres,
            top_three_genres: request.top_three_genres,
            fiction_genres: request.fiction_genres,
            non_fiction_genres: request.non_fiction_genres,
            additional_genres: request.additional_genres,
            fiction_non_fiction_ratio: request.fiction_non_fiction_ratio,
            step: Some(QuizStep::Genres),
            ..ReaderPatch::default()
        },
    )
    .await
}

/// PUT /quiz/users/:id/interests
pub async fn handle_interests(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    Json(request): Json<InterestsRequest>,
) -> Result<Json<ReaderEnvelope>, AppError> {
    apply_patch(
        &state,
        &user_id,
        ReaderPatch {
            selected_interests: Some(request.selected_interests),
            non_fiction_interests: Some(request.non_fiction_interests),
            step: Some(QuizStep::Interests),
            ..ReaderPatch::default()
        },
    )
    .await
}

/// PUT /quiz/users/:id/book-series
pub async fn handle_book_series(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    Json(request): Json<BookSeriesRequest>,
) -> Result<Json<ReaderEnvelope>, AppError> {
    apply_patch(
        &state,
        &user_id,
        ReaderPatch {
            book_series: Some(request.book_series),
            prefers_series: request.prefers_series,
            step: Some(QuizStep::BookSeries),
            ..ReaderPatch::default()
        },
    )
    .await
}

/// POST /quiz/users/:id/book-series/response
///
/// Saves one series answer, replacing any earlier answer for the same
/// series.
pub async fn handle_series_response(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    Json(request): Json<SeriesResponseRequest>,
) -> Result<Json<MessageEnvelope>, AppError> {
    let series_id = request
        .series_id
        .filter(|s| !s.trim().is_empty())
        .ok_or_else(|| AppError::Validation("Series ID and hasRead are required".to_string()))?;
    let has_read = request
        .has_read
        .ok_or_else(|| AppError::Validation("Series ID and hasRead are required".to_string()))?;

    let response = SeriesResponse {
        series_id,
        series_name: request.series_name,
        has_read,
        response: request.response,
    };

    state
        .store
        .upsert_series_response(&user_id, response)
        .await
        .map_err(AppError::Internal)?
        .ok_or_else(|| AppError::NotFound(format!("User {user_id} not found")))?;

    Ok(Json(MessageEnvelope {
        success: true,
        message: "Book series response saved successfully".to_string(),
    }))
}

/// POST /quiz/complete
///
/// Accepts the final quiz payload in one shot and marks the reader
/// completed.
pub async fn handle_complete_quiz(
    State(state): State<AppState>,
    Json(request): Json<CompleteQuizRequest>,
) -> Result<Json<ReaderEnvelope>, AppError> {
    let user_id = request
        .user_id
        .filter(|id| !id.trim().is_empty())
        .ok_or_else(|| AppError::Validation("Valid user ID is required".to_string()))?;

    let mut patch = request.fields;
    patch
        .completed_at
        .get_or_insert_with(|| Utc::now().to_rfc3339());
    patch.step = Some(QuizStep::Completed);

    apply_patch(&state, &user_id, patch).await
}

/// GET /quiz/users/:id
pub async fn handle_get_reader(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<ReaderEnvelope>, AppError> {
    let user = state
        .store
        .get_reader(&user_id)
        .await
        .map_err(AppError::Internal)?
        .ok_or_else(|| AppError::NotFound(format!("User {user_id} not found")))?;
    Ok(Json(ReaderEnvelope {
        success: true,
        user,
    }))
}

/// PUT /quiz/users/:id
///
/// Free-form incremental update: any subset of reader fields.
pub async fn handle_update_reader(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    Json(patch): Json<ReaderPatch>,
) -> Result<Json<ReaderEnvelope>, AppError> {
    apply_patch(&state, &user_id, patch).await
}

/// GET /quiz/users
pub async fn handle_list_readers(
    State(state): State<AppState>,
) -> Result<Json<ReadersEnvelope>, AppError> {
    let users = state
        .store
        .list_readers()
        .await
        .map_err(AppError::Internal)?;
    Ok(Json(ReadersEnvelope {
        success: true,
        users,
    }))
}

/// POST /quiz/users/:id/recommendations
///
/// Saves a generated recommendation payload back onto the reader.
pub async fn handle_save_recommendations(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    Json(request): Json<SaveRecommendationsRequest>,
) -> Result<Json<MessageEnvelope>, AppError> {
    let recommendations = request
        .recommendations
        .ok_or_else(|| AppError::Validation("Recommendations are required".to_string()))?;

    let patch = ReaderPatch {
        recommendations: Some(recommendations),
        recommendations_generated_at: Some(
            request
                .generated_at
                .unwrap_or_else(|| Utc::now().to_rfc3339()),
        ),
        ..ReaderPatch::default()
    };

    state
        .store
        .update_reader(&user_id, patch)
        .await
        .map_err(AppError::Internal)?
        .ok_or_else(|| AppError::NotFound(format!("User {user_id} not found")))?;

    Ok(Json(MessageEnvelope {
        success: true,
        message: "Recommendations saved successfully".to_string(),
    }))
}

async fn apply_patch(
    state: &AppState,
    user_id: &str,
    patch: ReaderPatch,
) -> Result<Json<ReaderEnvelope>, AppError> {
    let user = state
        .store
        .update_reader(user_id, patch)
        .await
        .map_err(AppError::Internal)?
        .ok_or_else(|| AppError::NotFound(format!("User {user_id} not found")))?;
    Ok(Json(ReaderEnvelope {
        success: true,
        user,
    }))
}
