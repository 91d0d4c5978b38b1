//! Document-store collaborator interface.
//!
//! Persistence is an external concern: the pipeline only depends on this
//! trait. The in-memory implementation backs the binary and the tests.

use anyhow::Result;
use async_trait::async_trait;

use crate::models::book::{Book, BookInput};
use crate::models::plan::PlanDocument;
use crate::models::reader::{ReaderPatch, ReaderRecord, SeriesResponse};

pub mod memory;

/// Predicate for catalog queries. `None` fields match everything, so the
/// relaxation tiers are expressed by dropping fields.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BookFilter {
    /// Match books sharing at least one genre with this list.
    pub genres: Option<Vec<String>>,
    /// Match books whose age range contains this age.
    pub age: Option<u8>,
}

#[async_trait]
pub trait Store: Send + Sync {
    // Catalog
    async fn insert_book(&self, input: BookInput) -> Result<Book>;
    /// Upsert keyed on (title, author); used by CSV import.
    async fn upsert_book(&self, input: BookInput) -> Result<Book>;
    async fn get_book(&self, id: &str) -> Result<Option<Book>>;
    async fn find_books(&self, filter: &BookFilter) -> Result<Vec<Book>>;
    async fn update_book(&self, id: &str, input: BookInput) -> Result<Option<Book>>;
    async fn delete_book(&self, id: &str) -> Result<bool>;
    async fn count_books(&self) -> Result<usize>;

    // Per-bracket shelf snapshots
    async fn shelf_book_ids(&self, bracket: &str) -> Result<Vec<String>>;
    async fn set_shelf(&self, bracket: &str, book_ids: Vec<String>) -> Result<()>;
    async fn remove_book_from_shelves(&self, book_id: &str) -> Result<()>;

    // Quiz readers
    async fn insert_reader(&self, reader: ReaderRecord) -> Result<()>;
    async fn get_reader(&self, id: &str) -> Result<Option<ReaderRecord>>;
    async fn list_readers(&self) -> Result<Vec<ReaderRecord>>;
    async fn update_reader(&self, id: &str, patch: ReaderPatch) -> Result<Option<ReaderRecord>>;
    /// Replaces the response for the same series id, or appends a new one.
    async fn upsert_series_response(
        &self,
        reader_id: &str,
        response: SeriesResponse,
    ) -> Result<Option<ReaderRecord>>;

    // Reading plans
    async fn insert_plan(&self, plan: PlanDocument) -> Result<()>;
    async fn get_plan(&self, id: &str) -> Result<Option<PlanDocument>>;
    async fn list_plans(&self) -> Result<Vec<PlanDocument>>;
    async fn delete_plan(&self, id: &str) -> Result<bool>;
    async fn delete_all_plans(&self) -> Result<usize>;
}
