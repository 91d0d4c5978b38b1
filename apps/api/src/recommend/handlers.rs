//! Axum route handlers for plan generation and plan administration.

use axum::{
    extract::{Path, State},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::models::plan::{PlanDocument, PlanResponse};
use crate::models::reader::{ReaderProfile, ReaderRecord, SeriesResponse};
use crate::recommend::generator::generate_plan;
use crate::state::AppState;
use crate::store::Store;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

/// Request body for plan generation. Either `userId` referencing a stored
/// quiz reader, or the profile fields inline. All fields optional at the
/// wire level; validation reports every missing field at once.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanRequest {
    pub user_id: Option<String>,
    pub name: Option<String>,
    pub age: Option<u8>,
    pub selected_genres: Option<Vec<String>>,
    pub selected_interests: Option<Vec<String>>,
    pub non_fiction_interests: Option<Vec<String>>,
    pub prefers_series: Option<bool>,
    pub book_series: Option<Vec<SeriesResponse>>,
    pub parent_email: Option<String>,
    pub parent_phone: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct DeletedResponse {
    pub deleted: usize,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /recommendation-plan
///
/// Validation failures are the only HTTP errors here; every downstream
/// degradation returns HTTP 200 with a structurally valid plan.
pub async fn handle_generate_plan(
    State(state): State<AppState>,
    Json(request): Json<PlanRequest>,
) -> Result<Json<PlanResponse>, AppError> {
    let profile = resolve_profile(state.store.as_ref(), request).await?;
    let response = generate_plan(state.store.as_ref(), &state.llm, profile).await?;
    Ok(Json(response))
}

/// GET /plans
pub async fn handle_list_plans(
    State(state): State<AppState>,
) -> Result<Json<Vec<PlanDocument>>, AppError> {
    let plans = state.store.list_plans().await.map_err(AppError::Internal)?;
    Ok(Json(plans))
}

/// GET /plans/:id
pub async fn handle_get_plan(
    State(state): State<AppState>,
    Path(plan_id): Path<String>,
) -> Result<Json<PlanDocument>, AppError> {
    let plan = state
        .store
        .get_plan(&plan_id)
        .await
        .map_err(AppError::Internal)?
        .ok_or_else(|| AppError::NotFound(format!("Plan {plan_id} not found")))?;
    Ok(Json(plan))
}

/// DELETE /plans/:id
pub async fn handle_delete_plan(
    State(state): State<AppState>,
    Path(plan_id): Path<String>,
) -> Result<Json<DeletedResponse>, AppError> {
    let deleted = state
        .store
        .delete_plan(&plan_id)
        .await
        .map_err(AppError::Internal)?;
    if !deleted {
        return Err(AppError::NotFound(format!("Plan {plan_id} not found")));
    }
    Ok(Json(DeletedResponse { deleted: 1 }))
}

/// DELETE /plans
pub async fn handle_delete_all_plans(
    State(state): State<AppState>,
) -> Result<Json<DeletedResponse>, AppError> {
    let deleted = state
        .store
        .delete_all_plans()
        .await
        .map_err(AppError::Internal)?;
    Ok(Json(DeletedResponse { deleted }))
}

// ────────────────────────────────────────────────────────────────────────────
// Profile resolution
// ────────────────────────────────────────────────────────────────────────────

/// Resolves the request to a validated profile. A known `userId` pulls the
/// stored reader; an unknown one falls through to inline-field validation.
pub(crate) async fn resolve_profile(
    store: &dyn Store,
    request: PlanRequest,
) -> Result<ReaderProfile, AppError> {
    let request = match &request.user_id {
        Some(user_id) => match store
            .get_reader(user_id)
            .await
            .map_err(AppError::Internal)?
        {
            Some(reader) => PlanRequest::from_reader(reader),
            None => request,
        },
        None => request,
    };
    request.into_profile()
}

impl PlanRequest {
    fn from_reader(reader: ReaderRecord) -> Self {
        PlanRequest {
            user_id: None,
            name: reader.name,
            age: reader.age,
            selected_genres: Some(reader.selected_genres),
            selected_interests: Some(reader.selected_interests),
            non_fiction_interests: Some(reader.non_fiction_interests),
            prefers_series: reader.prefers_series,
            book_series: Some(reader.book_series),
            parent_email: Some(reader.parent_email),
            parent_phone: Some(reader.parent_phone),
        }
    }

    fn into_profile(self) -> Result<ReaderProfile, AppError> {
        let mut missing = Vec::new();
        if self.name.is_none() {
            missing.push("name");
        }
        if self.age.is_none() {
            missing.push("age");
        }
        if self.selected_genres.is_none() {
            missing.push("selectedGenres");
        }
        if self.selected_interests.is_none() {
            missing.push("selectedInterests");
        }
        if self.non_fiction_interests.is_none() {
            missing.push("nonFictionInterests");
        }
        if self.book_series.is_none() {
            missing.push("bookSeries");
        }
        if self.parent_email.is_none() {
            missing.push("parentEmail");
        }
        if self.parent_phone.is_none() {
            missing.push("parentPhone");
        }
        if !missing.is_empty() {
            return Err(AppError::Validation(format!(
                "Missing required fields: {}",
                missing.join(", ")
            )));
        }

        let selected_genres = self.selected_genres.unwrap_or_default();
        if selected_genres.is_empty() {
            return Err(AppError::Validation(
                "Selected genres must be a non-empty list".to_string(),
            ));
        }

        let book_series = self.book_series.unwrap_or_default();
        Ok(ReaderProfile {
            name: self.name.unwrap_or_default(),
            age: self.age.unwrap_or_default(),
            selected_genres,
            selected_interests: self.selected_interests.unwrap_or_default(),
            non_fiction_interests: self.non_fiction_interests.unwrap_or_default(),
            // When the quiz never asked, a reader with series history is
            // treated as a series reader.
            prefers_series: self.prefers_series.unwrap_or(!book_series.is_empty()),
            book_series,
            parent_email: self.parent_email.unwrap_or_default(),
            parent_phone: self.parent_phone.unwrap_or_default(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::reader::{QuizStep, ReaderPatch};
    use crate::store::memory::MemoryStore;
    use chrono::Utc;

    fn full_request() -> PlanRequest {
        PlanRequest {
            user_id: None,
            name: Some("Maya".to_string()),
            age: Some(9),
            selected_genres: Some(vec!["Fantasy".to_string()]),
            selected_interests: Some(vec!["Dragons".to_string()]),
            non_fiction_interests: Some(vec![]),
            prefers_series: Some(true),
            book_series: Some(vec![]),
            parent_email: Some("parent@example.com".to_string()),
            parent_phone: Some("5551234567".to_string()),
        }
    }

    #[tokio::test]
    async fn test_resolve_inline_profile() {
        let store = MemoryStore::new();
        let profile = resolve_profile(&store, full_request()).await.unwrap();
        assert_eq!(profile.name, "Maya");
        assert_eq!(profile.age, 9);
        assert!(profile.prefers_series);
    }

    #[tokio::test]
    async fn test_missing_fields_reported_together() {
        let store = MemoryStore::new();
        let err = resolve_profile(&store, PlanRequest::default())
            .await
            .unwrap_err();
        match err {
            AppError::Validation(msg) => {
                assert!(msg.contains("Missing required fields"));
                assert!(msg.contains("name"));
                assert!(msg.contains("selectedGenres"));
                assert!(msg.contains("parentPhone"));
            }
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_empty_genres_rejected() {
        let store = MemoryStore::new();
        let mut request = full_request();
        request.selected_genres = Some(vec![]);
        let err = resolve_profile(&store, request).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn test_stored_reader_supplies_profile() {
        let store = MemoryStore::new();
        let reader = ReaderRecord::from_consent(
            "r1".to_string(),
            "parent@example.com".to_string(),
            "5551234567".to_string(),
            None,
            Utc::now(),
        );
        store.insert_reader(reader).await.unwrap();
        store
            .update_reader(
                "r1",
                ReaderPatch {
                    name: Some("Maya".to_string()),
                    age: Some(9),
                    selected_genres: Some(vec!["Fantasy".to_string()]),
                    selected_interests: Some(vec![]),
                    non_fiction_interests: Some(vec![]),
                    step: Some(QuizStep::Genres),
                    ..ReaderPatch::default()
                },
            )
            .await
            .unwrap();

        let request = PlanRequest {
            user_id: Some("r1".to_string()),
            ..PlanRequest::default()
        };
        let profile = resolve_profile(&store, request).await.unwrap();
        assert_eq!(profile.name, "Maya");
        assert_eq!(profile.selected_genres, vec!["Fantasy"]);
    }

    #[tokio::test]
    async fn test_unknown_user_id_falls_back_to_inline_fields() {
        let store = MemoryStore::new();
        let mut request = full_request();
        request.user_id = Some("missing".to_string());
        let profile = resolve_profile(&store, request).await.unwrap();
        assert_eq!(profile.name, "Maya");
    }

    #[test]
    fn test_prefers_series_derived_from_history_when_unset() {
        let mut request = full_request();
        request.prefers_series = None;
        request.book_series = Some(vec![SeriesResponse {
            series_id: "dog-man".to_string(),
            series_name: Some("Dog Man".to_string()),
            has_read: true,
            response: None,
        }]);
        let profile = request.into_profile().unwrap();
        assert!(profile.prefers_series);

        let mut request = full_request();
        request.prefers_series = None;
        let profile = request.into_profile().unwrap();
        assert!(!profile.prefers_series);
    }
}
