//! Per-bracket shelf snapshots: the hand-curated "current recommendations"
//! list maintained per age bracket, denormalized to full books on read.

use axum::{
    extract::{Path, State},
    Json,
};
use serde::Deserialize;
use serde_json::{Map, Value};

use crate::catalog::brackets::{is_valid_label, labels_joined, AGE_BRACKETS};
use crate::errors::AppError;
use crate::models::book::Book;
use crate::state::AppState;
use crate::store::Store;

#[derive(Debug, Deserialize)]
pub struct ShelfEntry {
    pub id: String,
}

/// GET /recommendations
///
/// Every bracket's shelf, hydrated to full book objects, keyed by label.
pub async fn handle_get_all_shelves(
    State(state): State<AppState>,
) -> Result<Json<Value>, AppError> {
    let mut shelves = Map::new();
    for bracket in &AGE_BRACKETS {
        let books = hydrate_shelf(state.store.as_ref(), bracket.label).await?;
        shelves.insert(
            bracket.label.to_string(),
            serde_json::to_value(books).map_err(|e| AppError::Internal(e.into()))?,
        );
    }
    Ok(Json(Value::Object(shelves)))
}

/// GET /recommendations/:age_group
pub async fn handle_get_shelf(
    State(state): State<AppState>,
    Path(age_group): Path<String>,
) -> Result<Json<Vec<Book>>, AppError> {
    validate_label(&age_group)?;
    let books = hydrate_shelf(state.store.as_ref(), &age_group).await?;
    Ok(Json(books))
}

/// PUT /recommendations/:age_group
///
/// Replaces the bracket's shelf with the given book ids, rejecting unknown
/// books, then returns the hydrated list.
pub async fn handle_set_shelf(
    State(state): State<AppState>,
    Path(age_group): Path<String>,
    Json(entries): Json<Vec<ShelfEntry>>,
) -> Result<Json<Vec<Book>>, AppError> {
    validate_label(&age_group)?;

    let mut ids = Vec::with_capacity(entries.len());
    for entry in entries {
        let exists = state
            .store
            .get_book(&entry.id)
            .await
            .map_err(AppError::Internal)?
            .is_some();
        if !exists {
            return Err(AppError::NotFound(format!("Book not found: {}", entry.id)));
        }
        ids.push(entry.id);
    }

    state
        .store
        .set_shelf(&age_group, ids)
        .await
        .map_err(AppError::Internal)?;

    let books = hydrate_shelf(state.store.as_ref(), &age_group).await?;
    Ok(Json(books))
}

fn validate_label(label: &str) -> Result<(), AppError> {
    if is_valid_label(label) {
        Ok(())
    } else {
        Err(AppError::Validation(format!(
            "Invalid age group. Must be one of: {}",
            labels_joined()
        )))
    }
}

/// Resolves a shelf's book ids to books, silently skipping ids whose book
/// has since been deleted.
async fn hydrate_shelf(store: &dyn Store, label: &str) -> Result<Vec<Book>, AppError> {
    let ids = store
        .shelf_book_ids(label)
        .await
        .map_err(AppError::Internal)?;
    let mut books = Vec::with_capacity(ids.len());
    for id in ids {
        if let Some(book) = store.get_book(&id).await.map_err(AppError::Internal)? {
            books.push(book);
        }
    }
    Ok(books)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_label_accepts_bracket_labels() {
        assert!(validate_label("4-7").is_ok());
        assert!(validate_label("8-10").is_ok());
        assert!(validate_label("11+").is_ok());
    }

    #[test]
    fn test_validate_label_rejects_unknown() {
        let err = validate_label("5-9").unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }
}
