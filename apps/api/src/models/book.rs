use serde::{Deserialize, Serialize};

/// Inclusive age range a book is suitable for.
/// Catalog rows missing the field fall back to the wide-open 0-99 range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgeRange {
    pub min: u8,
    pub max: u8,
}

impl Default for AgeRange {
    fn default() -> Self {
        AgeRange { min: 0, max: 99 }
    }
}

impl AgeRange {
    pub fn contains(&self, age: u8) -> bool {
        self.min <= age && age <= self.max
    }
}

/// A catalog book. Referenced by id from shelf snapshots; embedded by value
/// only in the per-bracket shelf responses.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Book {
    pub id: String,
    pub title: String,
    pub author: String,
    #[serde(default)]
    pub genres: Vec<String>,
    #[serde(default)]
    pub age_range: AgeRange,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

/// Payload for creating or replacing a catalog book.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookInput {
    pub title: String,
    pub author: String,
    pub genres: Vec<String>,
    #[serde(default)]
    pub age_range: AgeRange,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub image: Option<String>,
}

impl BookInput {
    pub fn into_book(self, id: String) -> Book {
        Book {
            id,
            title: self.title,
            author: self.author,
            genres: self.genres,
            age_range: self.age_range,
            description: self.description,
            tags: self.tags,
            image: self.image,
        }
    }
}
