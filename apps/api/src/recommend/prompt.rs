//! Prompt Builder — serializes the candidate pool, reader profile, and
//! exclude/prioritize lists into the recommendation instruction.
//!
//! Pure string construction: no I/O, fully deterministic for identical
//! inputs.

use crate::models::book::Book;
use crate::models::reader::ReaderProfile;
use crate::recommend::prompts::{RECOMMENDATION_PROMPT_TEMPLATE, RECOMMENDER_SYSTEM};

/// Description sentinel for catalog rows without one.
const NO_DESCRIPTION: &str = "No description available.";

/// A system/user instruction pair ready for the LLM client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prompt {
    pub system: &'static str,
    pub user: String,
}

/// Builds the full recommendation prompt.
pub fn build_prompt(
    profile: &ReaderProfile,
    candidates: &[Book],
    exclude: &[String],
    prioritize: &[String],
) -> Prompt {
    let book_text = candidates
        .iter()
        .enumerate()
        .map(|(idx, book)| format_candidate(idx + 1, book))
        .collect::<Vec<_>>()
        .join("\n");

    let series_phrase = if profile.prefers_series {
        "enjoy"
    } else {
        "do not prefer"
    };

    let user = RECOMMENDATION_PROMPT_TEMPLATE
        .replace("{age}", &profile.age.to_string())
        .replace("{genres}", &profile.selected_genres.join(", "))
        .replace("{interests}", &profile.selected_interests.join(", "))
        .replace("{non_fiction}", &profile.non_fiction_interests.join(", "))
        .replace("{series_phrase}", series_phrase)
        .replace("{exclude_block}", &list_block(exclude))
        .replace("{prioritize_block}", &list_block(prioritize))
        .replace("{book_text}", &book_text);

    Prompt {
        system: RECOMMENDER_SYSTEM,
        user,
    }
}

/// Fixed-format inventory block for one candidate book.
fn format_candidate(idx: usize, book: &Book) -> String {
    let desc = book.description.as_deref().unwrap_or(NO_DESCRIPTION);
    format!(
        "Book {idx}:\nTitle: {}\nAuthor: {}\nGenres: {}\nDescription: {desc}\nAge Range: {}-{}\n---",
        book.title,
        book.author,
        book.genres.join(", "),
        book.age_range.min,
        book.age_range.max,
    )
}

/// Line-delimited list block. Empty lists render as the literal `None`.
fn list_block(items: &[String]) -> String {
    if items.is_empty() {
        "None".to_string()
    } else {
        items.join("\n")
    }
}
