//! Catalog Query Engine — progressively relaxes filters so the candidate
//! pool handed to the model is never starved by a narrow profile.

use anyhow::Result;
use tracing::debug;

use crate::models::book::Book;
use crate::store::{BookFilter, Store};

/// Minimum candidate pool size before a tier is considered satisfied.
pub const MIN_CANDIDATES: usize = 15;

/// Finds candidate books for a reader with three-tier relaxation:
///
/// 1. Strict: genre overlap AND age within range.
/// 2. Age-only: drop the genre predicate.
/// 3. Unfiltered: the whole catalog.
///
/// Each tier is only attempted when the prior one returned fewer than
/// `min_count` books. An empty result after tier 3 means the catalog itself
/// is empty; callers must skip the model call entirely in that case.
pub async fn find_candidates(
    store: &dyn Store,
    age: u8,
    genres: &[String],
    min_count: usize,
) -> Result<Vec<Book>> {
    let strict = store
        .find_books(&BookFilter {
            genres: Some(genres.to_vec()),
            age: Some(age),
        })
        .await?;
    debug!("strict filter found {} books", strict.len());
    if strict.len() >= min_count {
        return Ok(strict);
    }

    let by_age = store
        .find_books(&BookFilter {
            genres: None,
            age: Some(age),
        })
        .await?;
    debug!("age-only filter found {} books", by_age.len());
    if by_age.len() >= min_count {
        return Ok(by_age);
    }

    let all = store.find_books(&BookFilter::default()).await?;
    debug!("unfiltered catalog holds {} books", all.len());
    Ok(all)
}
