//! Axum route handlers for catalog CRUD and CSV import.

use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;

use crate::catalog::import::{import_csv, ImportOutcome};
use crate::errors::AppError;
use crate::models::book::{Book, BookInput};
use crate::state::AppState;
use crate::store::BookFilter;

#[derive(Serialize)]
pub struct MessageResponse {
    pub message: String,
}

/// GET /books
pub async fn handle_list_books(
    State(state): State<AppState>,
) -> Result<Json<Vec<Book>>, AppError> {
    let books = state
        .store
        .find_books(&BookFilter::default())
        .await
        .map_err(AppError::Internal)?;
    Ok(Json(books))
}

/// POST /books
pub async fn handle_add_book(
    State(state): State<AppState>,
    Json(input): Json<BookInput>,
) -> Result<(StatusCode, Json<Book>), AppError> {
    validate_book_input(&input)?;
    let book = state
        .store
        .insert_book(input)
        .await
        .map_err(AppError::Internal)?;
    Ok((StatusCode::CREATED, Json(book)))
}

/// PUT /books/:id
pub async fn handle_update_book(
    State(state): State<AppState>,
    Path(book_id): Path<String>,
    Json(input): Json<BookInput>,
) -> Result<Json<Book>, AppError> {
    validate_book_input(&input)?;
    let book = state
        .store
        .update_book(&book_id, input)
        .await
        .map_err(AppError::Internal)?
        .ok_or_else(|| AppError::NotFound(format!("Book {book_id} not found")))?;
    Ok(Json(book))
}

/// DELETE /books/:id
///
/// Also removes the book from every per-bracket shelf snapshot.
pub async fn handle_delete_book(
    State(state): State<AppState>,
    Path(book_id): Path<String>,
) -> Result<Json<MessageResponse>, AppError> {
    let deleted = state
        .store
        .delete_book(&book_id)
        .await
        .map_err(AppError::Internal)?;
    if !deleted {
        return Err(AppError::NotFound(format!("Book {book_id} not found")));
    }
    state
        .store
        .remove_book_from_shelves(&book_id)
        .await
        .map_err(AppError::Internal)?;
    Ok(Json(MessageResponse {
        message: "Book deleted successfully".to_string(),
    }))
}

/// POST /books/import
///
/// Multipart upload with a single `file` field holding a CSV export.
pub async fn handle_import_books(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<ImportOutcome>, AppError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Invalid multipart payload: {e}")))?
    {
        if field.name() != Some("file") {
            continue;
        }
        let filename = field.file_name().unwrap_or_default().to_string();
        if !filename.ends_with(".csv") {
            return Err(AppError::Validation(
                "Invalid file format. Please upload a CSV file.".to_string(),
            ));
        }
        let bytes = field
            .bytes()
            .await
            .map_err(|e| AppError::Validation(format!("Failed to read upload: {e}")))?;
        let text = String::from_utf8(bytes.to_vec())
            .map_err(|_| AppError::Validation("CSV file must be valid UTF-8".to_string()))?;

        let outcome = import_csv(state.store.as_ref(), &text)
            .await
            .map_err(AppError::Validation)?;
        return Ok(Json(outcome));
    }

    Err(AppError::Validation("No file uploaded".to_string()))
}

fn validate_book_input(input: &BookInput) -> Result<(), AppError> {
    if input.title.trim().is_empty() {
        return Err(AppError::Validation("Book title is required".to_string()));
    }
    if input.author.trim().is_empty() {
        return Err(AppError::Validation("Book author is required".to_string()));
    }
    if input.age_range.min > input.age_range.max {
        return Err(AppError::Validation(
            "Invalid age range: min must not exceed max".to_string(),
        ));
    }
    Ok(())
}
