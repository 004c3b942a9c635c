//! Book record store
//!
//! The catalog talks to its storage through the [`BookStore`] trait. Two
//! implementations exist: [`PgBookStore`] on PostgreSQL and
//! [`MemoryBookStore`], an in-process map used by tests and local runs.

pub mod books;
pub mod memory;

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::models::{Book, BookField, BookFilter, NewBook};

pub use books::PgBookStore;
pub use memory::MemoryBookStore;

/// Failures surfaced by a book store
#[derive(Error, Debug)]
pub enum StoreError {
    /// The identifier is not a valid book id
    #[error("Cast to book id failed for value \"{0}\"")]
    MalformedId(String),

    /// A text value the store cannot represent
    #[error("Cast to text failed for book {field}")]
    MalformedValue { field: &'static str },

    /// Adding copies would exceed the largest storable count
    #[error("Available copies overflow for book {0}")]
    CopiesOverflow(Uuid),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Store lock poisoned during {0}")]
    LockPoisoned(&'static str),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Persistence primitives for book records.
///
/// Identifiers arrive as raw strings and are cast by the store, so a
/// malformed id surfaces as [`StoreError::MalformedId`].
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BookStore: Send + Sync {
    /// Every book, in insertion order
    async fn find_all(&self) -> StoreResult<Vec<Book>>;

    /// Books matching every set field of the filter
    async fn find_matching(&self, filter: &BookFilter) -> StoreResult<Vec<Book>>;

    async fn find_by_id(&self, id: &str) -> StoreResult<Option<Book>>;

    /// First book with exactly this title and author
    async fn find_by_title_and_author(&self, title: &str, author: &str)
        -> StoreResult<Option<Book>>;

    async fn insert(&self, book: &NewBook) -> StoreResult<Book>;

    /// Add `amount` to the stored copy count, returning the updated record
    async fn increment_copies(&self, id: Uuid, amount: i64) -> StoreResult<Option<Book>>;

    /// Overwrite every field of the record with `book.id`
    async fn replace(&self, book: &Book) -> StoreResult<Option<Book>>;

    /// Set one field; returns the number of records actually modified
    /// (0 when the record is gone or already holds that value)
    async fn update_field(&self, id: &str, field: &BookField) -> StoreResult<u64>;

    async fn count(&self) -> StoreResult<i64>;

    async fn count_by_title(&self, title: &str) -> StoreResult<i64>;

    /// Remove one book, returning what was removed
    async fn delete_by_id(&self, id: &str) -> StoreResult<Option<Book>>;

    async fn delete_all(&self) -> StoreResult<u64>;

    /// Remove the book with this exact title, but only while it is the sole
    /// record holding that title; returns the number removed (0 or 1)
    async fn delete_unique_title(&self, title: &str) -> StoreResult<u64>;

    async fn delete_by_author(&self, author: &str) -> StoreResult<u64>;
}

/// Cast a raw identifier to a book id
pub fn parse_book_id(raw: &str) -> StoreResult<Uuid> {
    Uuid::parse_str(raw).map_err(|_| StoreError::MalformedId(raw.to_string()))
}

/// Reject text the store cannot hold (PostgreSQL text refuses NUL bytes)
pub fn check_text(field: &'static str, value: &str) -> StoreResult<()> {
    if value.contains('\0') {
        return Err(StoreError::MalformedValue { field });
    }
    Ok(())
}
