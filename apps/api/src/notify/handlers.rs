//! Axum route handlers for outbound notifications.

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::models::plan::{MonthPlan, PlanBook, RecommendationRecord};
use crate::notify::email::build_recommendations_html;
use crate::notify::whatsapp::{format_recommendation_messages, DeliveryReport};
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmailRequest {
    pub email: String,
    pub name: String,
    /// Current-month picks.
    pub recommendations: Vec<PlanBook>,
    #[serde(default)]
    pub series_recommendations: Vec<RecommendationRecord>,
    pub reading_plan: Vec<MonthPlan>,
}

#[derive(Debug, Serialize)]
pub struct EmailSentResponse {
    pub message: String,
}

#[derive(Debug, Deserialize)]
pub struct WhatsAppRequest {
    pub phone: String,
    pub name: String,
    pub recommendations: Vec<RecommendationRecord>,
    pub current: Vec<PlanBook>,
    pub future: Vec<MonthPlan>,
}

#[derive(Debug, Serialize)]
pub struct WhatsAppSentResponse {
    pub message: String,
    #[serde(flatten)]
    pub report: DeliveryReport,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /send-recommendations/email
pub async fn handle_send_email(
    State(state): State<AppState>,
    Json(request): Json<EmailRequest>,
) -> Result<Json<EmailSentResponse>, AppError> {
    if request.email.trim().is_empty() || request.name.trim().is_empty() {
        return Err(AppError::Validation(
            "Email and name are required".to_string(),
        ));
    }
    if !state.mailer.is_configured() {
        return Err(AppError::Notification(
            "Email service not configured. Missing SendGrid API credentials.".to_string(),
        ));
    }

    let html = build_recommendations_html(
        &request.name,
        &request.recommendations,
        &request.series_recommendations,
        &request.reading_plan,
    );
    let subject = format!("Book Recommendations for {}", request.name);

    state
        .mailer
        .send(&request.email, &subject, &html)
        .await
        .map_err(|e| AppError::Notification(e.to_string()))?;

    Ok(Json(EmailSentResponse {
        message: "Recommendations sent successfully to email".to_string(),
    }))
}

/// POST /send-recommendations/whatsapp
pub async fn handle_send_whatsapp(
    State(state): State<AppState>,
    Json(request): Json<WhatsAppRequest>,
) -> Result<Json<WhatsAppSentResponse>, AppError> {
    if request.phone.trim().is_empty() || request.name.trim().is_empty() {
        return Err(AppError::Validation(
            "Phone and name are required".to_string(),
        ));
    }
    if !state.whatsapp.is_configured() {
        return Err(AppError::Notification(
            "WhatsApp service not configured. Missing Facebook API credentials.".to_string(),
        ));
    }

    let messages = format_recommendation_messages(
        &request.name,
        &request.current,
        &request.recommendations,
        &request.future,
    );
    if messages.is_empty() {
        return Err(AppError::Validation("No messages to send".to_string()));
    }

    let report = state
        .whatsapp
        .send_messages(&request.phone, &messages)
        .await
        .map_err(|e| AppError::Notification(e.to_string()))?;

    Ok(Json(WhatsAppSentResponse {
        message: format!(
            "Successfully sent {} out of {} messages",
            report.successful_messages, report.total_messages
        ),
        report,
    }))
}
