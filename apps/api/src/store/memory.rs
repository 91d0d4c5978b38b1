//! In-memory document store. Collections are plain vectors so query results
//! keep insertion order, matching what the catalog tiers expect.

use anyhow::Result;
use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::catalog::brackets::AGE_BRACKETS;
use crate::models::book::{Book, BookInput};
use crate::models::plan::PlanDocument;
use crate::models::reader::{ReaderPatch, ReaderRecord, SeriesResponse};
use crate::store::{BookFilter, Store};

use std::collections::HashMap;

#[derive(Default)]
struct Collections {
    books: Vec<Book>,
    readers: Vec<ReaderRecord>,
    plans: Vec<PlanDocument>,
    shelves: HashMap<String, Vec<String>>,
}

pub struct MemoryStore {
    inner: RwLock<Collections>,
}

impl MemoryStore {
    /// Creates an empty store with one empty shelf per age bracket.
    pub fn new() -> Self {
        let mut shelves = HashMap::new();
        for bracket in &AGE_BRACKETS {
            shelves.insert(bracket.label.to_string(), Vec::new());
        }
        MemoryStore {
            inner: RwLock::new(Collections {
                shelves,
                ..Collections::default()
            }),
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

fn matches(book: &Book, filter: &BookFilter) -> bool {
    if let Some(age) = filter.age {
        if !book.age_range.contains(age) {
            return false;
        }
    }
    if let Some(genres) = &filter.genres {
        if !book.genres.iter().any(|g| genres.contains(g)) {
            return false;
        }
    }
    true
}

#[async_trait]
impl Store for MemoryStore {
    async fn insert_book(&self, input: BookInput) -> Result<Book> {
        let book = input.into_book(Uuid::new_v4().to_string());
        let mut inner = self.inner.write().await;
        inner.books.push(book.clone());
        Ok(book)
    }

    async fn upsert_book(&self, input: BookInput) -> Result<Book> {
        let mut inner = self.inner.write().await;
        if let Some(existing) = inner
            .books
            .iter_mut()
            .find(|b| b.title == input.title && b.author == input.author)
        {
            let id = existing.id.clone();
            *existing = input.into_book(id);
            return Ok(existing.clone());
        }
        let book = input.into_book(Uuid::new_v4().to_string());
        inner.books.push(book.clone());
        Ok(book)
    }

    async fn get_book(&self, id: &str) -> Result<Option<Book>> {
        let inner = self.inner.read().await;
        Ok(inner.books.iter().find(|b| b.id == id).cloned())
    }

    async fn find_books(&self, filter: &BookFilter) -> Result<Vec<Book>> {
        let inner = self.inner.read().await;
        Ok(inner
            .books
            .iter()
            .filter(|b| matches(b, filter))
            .cloned()
            .collect())
    }

    async fn update_book(&self, id: &str, input: BookInput) -> Result<Option<Book>> {
        let mut inner = self.inner.write().await;
        match inner.books.iter_mut().find(|b| b.id == id) {
            Some(existing) => {
                *existing = input.into_book(id.to_string());
                Ok(Some(existing.clone()))
            }
            None => Ok(None),
        }
    }

    async fn delete_book(&self, id: &str) -> Result<bool> {
        let mut inner = self.inner.write().await;
        let before = inner.books.len();
        inner.books.retain(|b| b.id != id);
        Ok(inner.books.len() < before)
    }

    async fn count_books(&self) -> Result<usize> {
        let inner = self.inner.read().await;
        Ok(inner.books.len())
    }

    async fn shelf_book_ids(&self, bracket: &str) -> Result<Vec<String>> {
        let inner = self.inner.read().await;
        Ok(inner.shelves.get(bracket).cloned().unwrap_or_default())
    }

    async fn set_shelf(&self, bracket: &str, book_ids: Vec<String>) -> Result<()> {
        let mut inner = self.inner.write().await;
        inner.shelves.insert(bracket.to_string(), book_ids);
        Ok(())
    }

    async fn remove_book_from_shelves(&self, book_id: &str) -> Result<()> {
        let mut inner = self.inner.write().await;
        for ids in inner.shelves.values_mut() {
            ids.retain(|id| id != book_id);
        }
        Ok(())
    }

    async fn insert_reader(&self, reader: ReaderRecord) -> Result<()> {
        let mut inner = self.inner.write().await;
        inner.readers.push(reader);
        Ok(())
    }

    async fn get_reader(&self, id: &str) -> Result<Option<ReaderRecord>> {
        let inner = self.inner.read().await;
        Ok(inner.readers.iter().find(|r| r.id == id).cloned())
    }

    async fn list_readers(&self) -> Result<Vec<ReaderRecord>> {
        let inner = self.inner.read().await;
        Ok(inner.readers.clone())
    }

    async fn update_reader(&self, id: &str, patch: ReaderPatch) -> Result<Option<ReaderRecord>> {
        let mut inner = self.inner.write().await;
        match inner.readers.iter_mut().find(|r| r.id == id) {
            Some(reader) => {
                reader.apply(patch, Utc::now());
                Ok(Some(reader.clone()))
            }
            None => Ok(None),
        }
    }

    async fn upsert_series_response(
        &self,
        reader_id: &str,
        response: SeriesResponse,
    ) -> Result<Option<ReaderRecord>> {
        let mut inner = self.inner.write().await;
        match inner.readers.iter_mut().find(|r| r.id == reader_id) {
            Some(reader) => {
                match reader
                    .book_series
                    .iter_mut()
                    .find(|s| s.series_id == response.series_id)
                {
                    Some(existing) => *existing = response,
                    None => reader.book_series.push(response),
                }
                reader.updated_at = Utc::now();
                Ok(Some(reader.clone()))
            }
            None => Ok(None),
        }
    }

    async fn insert_plan(&self, plan: PlanDocument) -> Result<()> {
        let mut inner = self.inner.write().await;
        inner.plans.push(plan);
        Ok(())
    }

    async fn get_plan(&self, id: &str) -> Result<Option<PlanDocument>> {
        let inner = self.inner.read().await;
        Ok(inner.plans.iter().find(|p| p.id == id).cloned())
    }

    async fn list_plans(&self) -> Result<Vec<PlanDocument>> {
        let inner = self.inner.read().await;
        Ok(inner.plans.clone())
    }

    async fn delete_plan(&self, id: &str) -> Result<bool> {
        let mut inner = self.inner.write().await;
        let before = inner.plans.len();
        inner.plans.retain(|p| p.id != id);
        Ok(inner.plans.len() < before)
    }

    async fn delete_all_plans(&self) -> Result<usize> {
        let mut inner = self.inner.write().await;
        let deleted = inner.plans.len();
        inner.plans.clear();
        Ok(deleted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::book::AgeRange;
    use crate::models::reader::SeriesReaction;

    fn book_input(title: &str, genres: &[&str], min: u8, max: u8) -> BookInput {
        BookInput {
            title: title.to_string(),
            author: "Test Author".to_string(),
            genres: genres.iter().map(|g| g.to_string()).collect(),
            age_range: AgeRange { min, max },
            description: None,
            tags: Vec::new(),
            image: None,
        }
    }

    #[tokio::test]
    async fn test_find_books_applies_genre_and_age_predicates() {
        let store = MemoryStore::new();
        store
            .insert_book(book_input("Fantasy In Range", &["Fantasy"], 8, 12))
            .await
            .unwrap();
        store
            .insert_book(book_input("Fantasy Too Old", &["Fantasy"], 12, 15))
            .await
            .unwrap();
        store
            .insert_book(book_input("Mystery In Range", &["Mystery"], 8, 12))
            .await
            .unwrap();

        let filter = BookFilter {
            genres: Some(vec!["Fantasy".to_string()]),
            age: Some(9),
        };
        let found = store.find_books(&filter).await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].title, "Fantasy In Range");
    }

    #[tokio::test]
    async fn test_find_books_preserves_insertion_order() {
        let store = MemoryStore::new();
        for title in ["First", "Second", "Third"] {
            store
                .insert_book(book_input(title, &["Fantasy"], 6, 10))
                .await
                .unwrap();
        }
        let found = store.find_books(&BookFilter::default()).await.unwrap();
        let titles: Vec<_> = found.iter().map(|b| b.title.as_str()).collect();
        assert_eq!(titles, vec!["First", "Second", "Third"]);
    }

    #[tokio::test]
    async fn test_upsert_book_replaces_by_title_and_author() {
        let store = MemoryStore::new();
        store
            .insert_book(book_input("Same Title", &["Fantasy"], 6, 10))
            .await
            .unwrap();
        store
            .upsert_book(book_input("Same Title", &["Adventure"], 7, 11))
            .await
            .unwrap();

        assert_eq!(store.count_books().await.unwrap(), 1);
        let all = store.find_books(&BookFilter::default()).await.unwrap();
        assert_eq!(all[0].genres, vec!["Adventure"]);
    }

    #[tokio::test]
    async fn test_shelves_initialized_per_bracket() {
        let store = MemoryStore::new();
        for bracket in &AGE_BRACKETS {
            let ids = store.shelf_book_ids(bracket.label).await.unwrap();
            assert!(ids.is_empty());
        }
    }

    #[tokio::test]
    async fn test_deleting_book_removes_it_from_shelves() {
        let store = MemoryStore::new();
        let book = store
            .insert_book(book_input("Shelved", &["Fantasy"], 6, 10))
            .await
            .unwrap();
        store
            .set_shelf("8-10", vec![book.id.clone()])
            .await
            .unwrap();

        store.delete_book(&book.id).await.unwrap();
        store.remove_book_from_shelves(&book.id).await.unwrap();
        assert!(store.shelf_book_ids("8-10").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_upsert_series_response_replaces_same_series() {
        let store = MemoryStore::new();
        let reader = ReaderRecord::from_consent(
            "r1".to_string(),
            "parent@example.com".to_string(),
            "5551234567".to_string(),
            None,
            Utc::now(),
        );
        store.insert_reader(reader).await.unwrap();

        let first = SeriesResponse {
            series_id: "dog-man".to_string(),
            series_name: Some("Dog Man".to_string()),
            has_read: true,
            response: Some(SeriesReaction::Like),
        };
        let second = SeriesResponse {
            response: Some(SeriesReaction::Love),
            ..first.clone()
        };

        store.upsert_series_response("r1", first).await.unwrap();
        let updated = store
            .upsert_series_response("r1", second)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.book_series.len(), 1);
        assert_eq!(
            updated.book_series[0].response,
            Some(SeriesReaction::Love)
        );
    }

    #[tokio::test]
    async fn test_delete_all_plans_reports_count() {
        let store = MemoryStore::new();
        for i in 0..3 {
            store
                .insert_plan(PlanDocument {
                    id: format!("p{i}"),
                    reader: crate::models::reader::ReaderProfile {
                        name: "Maya".to_string(),
                        age: 9,
                        selected_genres: vec!["Fantasy".to_string()],
                        selected_interests: vec![],
                        non_fiction_interests: vec![],
                        prefers_series: false,
                        book_series: vec![],
                        parent_email: "parent@example.com".to_string(),
                        parent_phone: "5551234567".to_string(),
                    },
                    recommendations: vec![],
                    current: vec![],
                    future: vec![],
                    generated_at: Utc::now(),
                })
                .await
                .unwrap();
        }
        assert_eq!(store.delete_all_plans().await.unwrap(), 3);
        assert!(store.list_plans().await.unwrap().is_empty());
    }
}
