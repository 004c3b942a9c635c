//! Book catalog operations

use std::sync::Arc;

use futures::future::try_join_all;
use serde_json::Value;

use super::validation::{
    check_copies, check_genre_length, merge_update, require_text, validate_new_book,
};
use crate::{
    error::{AppError, AppResult},
    models::{Book, BookField, BookFilter, BookPayload, NewBook, SearchQuery},
    repository::BookStore,
};

/// Result of adding a book: a fresh record, or more copies of an existing one
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AddOutcome {
    Created(Book),
    Incremented(Book),
}

impl AddOutcome {
    pub fn book(&self) -> &Book {
        match self {
            AddOutcome::Created(book) | AddOutcome::Incremented(book) => book,
        }
    }

    pub fn is_created(&self) -> bool {
        matches!(self, AddOutcome::Created(_))
    }
}

fn require_id(id: &str) -> AppResult<()> {
    if id.is_empty() {
        return Err(AppError::Validation("Book ID is required".to_string()));
    }
    Ok(())
}

fn no_title_match() -> AppError {
    AppError::NotFound("No matching book found to delete".to_string())
}

/// A title-based delete needs exactly one book holding the title
fn check_unique_title(matches: i64) -> AppResult<()> {
    match matches {
        0 => Err(no_title_match()),
        1 => Ok(()),
        _ => Err(AppError::Validation(
            "More than one book found with the same title. Please delete by ID instead"
                .to_string(),
        )),
    }
}

#[derive(Clone)]
pub struct BookService {
    store: Arc<dyn BookStore>,
}

impl BookService {
    pub fn new(store: Arc<dyn BookStore>) -> Self {
        Self { store }
    }

    /// Check that the store answers queries
    pub async fn ready(&self) -> AppResult<()> {
        self.store.count().await?;
        Ok(())
    }

    /// List every book in the catalog
    pub async fn list(&self) -> AppResult<Vec<Book>> {
        let books = self.store.find_all().await?;
        if books.is_empty() {
            return Err(AppError::NotFound("No books found".to_string()));
        }
        Ok(books)
    }

    /// Add copies of a book, creating the record when (title, author) is new
    pub async fn add(&self, payload: &BookPayload) -> AppResult<AddOutcome> {
        let book = validate_new_book(payload)?;
        self.add_validated(book).await
    }

    async fn add_validated(&self, book: NewBook) -> AppResult<AddOutcome> {
        if let Some(existing) = self
            .store
            .find_by_title_and_author(&book.title, &book.author)
            .await?
        {
            if existing
                .available_copies
                .checked_add(book.available_copies)
                .is_none()
            {
                return Err(AppError::Validation(
                    "Number of available copies is too large".to_string(),
                ));
            }

            if let Some(updated) = self
                .store
                .increment_copies(existing.id, book.available_copies)
                .await?
            {
                tracing::info!(
                    "Added {} copies to book id={} ({} on shelf)",
                    book.available_copies,
                    updated.id,
                    updated.available_copies
                );
                return Ok(AddOutcome::Incremented(updated));
            }
            tracing::debug!("Book id={} vanished before increment, inserting", existing.id);
        }

        let created = self.store.insert(&book).await?;
        tracing::info!("Created book id={} '{}'", created.id, created.title);
        Ok(AddOutcome::Created(created))
    }

    /// Add a batch of books; returns how many records were created or updated.
    ///
    /// Every element is validated before anything is written. Elements are
    /// then added concurrently, without ordering or all-or-nothing guarantees.
    pub async fn add_many(&self, body: &Value) -> AppResult<usize> {
        let items = body.as_array().ok_or_else(|| {
            AppError::Validation("Request body should contain an array of books".to_string())
        })?;

        let books = items
            .iter()
            .enumerate()
            .map(|(index, item)| {
                let payload: BookPayload = serde_json::from_value(item.clone()).map_err(|e| {
                    AppError::Validation(format!("Invalid book at index {}: {}", index, e))
                })?;
                validate_new_book(&payload).map_err(|e| match e {
                    AppError::Validation(msg) => {
                        AppError::Validation(format!("Book at index {}: {}", index, msg))
                    }
                    other => other,
                })
            })
            .collect::<AppResult<Vec<_>>>()?;

        let outcomes = try_join_all(books.into_iter().map(|book| self.add_validated(book))).await?;
        Ok(outcomes.len())
    }

    pub async fn get(&self, id: &str) -> AppResult<Book> {
        require_id(id)?;
        self.store
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("No book found with this ID: {}", id)))
    }

    /// Case-insensitive substring search; unset parameters match everything
    pub async fn search(&self, query: SearchQuery) -> AppResult<Vec<Book>> {
        let filter = BookFilter::from(query);
        tracing::debug!("Searching books with {:?}", filter);
        let books = self.store.find_matching(&filter).await?;
        if books.is_empty() {
            return Err(AppError::NotFound(
                "No books found matching the criteria".to_string(),
            ));
        }
        Ok(books)
    }

    pub async fn count(&self) -> AppResult<i64> {
        let count = self.store.count().await?;
        if count == 0 {
            return Err(AppError::NotFound("No books found in the library".to_string()));
        }
        Ok(count)
    }

    async fn find_for_update(&self, id: &str) -> AppResult<Book> {
        self.store
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound("No book found to update".to_string()))
    }

    /// Replace the fields present in `changes`, keeping the rest
    pub async fn update(&self, id: &str, changes: &BookPayload) -> AppResult<Book> {
        require_id(id)?;
        let existing = self.find_for_update(id).await?;
        let merged = merge_update(&existing, changes)?;

        let updated = self
            .store
            .replace(&merged)
            .await?
            .ok_or_else(|| AppError::Validation("Failed to update book".to_string()))?;
        tracing::info!("Updated book id={}", updated.id);
        Ok(updated)
    }

    async fn update_single_field(
        &self,
        id: &str,
        label: &str,
        field: Option<BookField>,
    ) -> AppResult<Book> {
        require_id(id)?;
        let mut book = self.find_for_update(id).await?;
        let field =
            field.ok_or_else(|| AppError::Validation(format!("Book {} is required", label)))?;

        match &field {
            BookField::Genre(genre) => check_genre_length(genre)?,
            BookField::AvailableCopies(copies) => check_copies(*copies)?,
            BookField::Title(_) | BookField::Author(_) => {}
        }

        if self.store.update_field(id, &field).await? == 0 {
            return Err(AppError::Validation(format!("Book {} is not updating", label)));
        }

        field.apply(&mut book);
        tracing::info!("Updated {} of book id={}", label, book.id);
        Ok(book)
    }

    pub async fn update_title(&self, id: &str, title: Option<String>) -> AppResult<Book> {
        let field = title.filter(|t| !t.is_empty()).map(BookField::Title);
        self.update_single_field(id, "title", field).await
    }

    pub async fn update_author(&self, id: &str, author: Option<String>) -> AppResult<Book> {
        let field = author.filter(|a| !a.is_empty()).map(BookField::Author);
        self.update_single_field(id, "author", field).await
    }

    pub async fn update_genre(&self, id: &str, genre: Option<String>) -> AppResult<Book> {
        let field = genre.filter(|g| !g.is_empty()).map(BookField::Genre);
        self.update_single_field(id, "genre", field).await
    }

    /// Set the copy count. Zero is rejected like a missing value.
    pub async fn update_copies(&self, id: &str, copies: Option<i64>) -> AppResult<Book> {
        let field = copies.filter(|c| *c != 0).map(BookField::AvailableCopies);
        self.update_single_field(id, "available copies", field).await
    }

    /// Remove one book, returning it
    pub async fn delete(&self, id: &str) -> AppResult<Book> {
        require_id(id)?;
        let deleted = self
            .store
            .delete_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Book not found".to_string()))?;
        tracing::info!("Deleted book id={} '{}'", deleted.id, deleted.title);
        Ok(deleted)
    }

    /// Remove every book; returns how many were removed
    pub async fn delete_all(&self) -> AppResult<u64> {
        let deleted = self.store.delete_all().await?;
        if deleted == 0 {
            return Err(AppError::NotFound("No book found to delete".to_string()));
        }
        tracing::info!("Deleted all {} books", deleted);
        Ok(deleted)
    }

    /// Remove the single book with this exact title.
    /// Refuses when the title is shared, since the caller cannot tell which one goes.
    pub async fn delete_by_title(&self, title: &str) -> AppResult<()> {
        let title = require_text(Some(title.to_string()), "Book title is required")?;

        check_unique_title(self.store.count_by_title(&title).await?)?;

        // The title may have been removed or duplicated since it was counted.
        if self.store.delete_unique_title(&title).await? == 0 {
            check_unique_title(self.store.count_by_title(&title).await?)?;
            return Err(no_title_match());
        }
        tracing::info!("Deleted book titled '{}'", title);
        Ok(())
    }

    /// Remove every book by this exact author; returns how many were removed
    pub async fn delete_by_author(&self, author: &str) -> AppResult<u64> {
        let author = require_text(Some(author.to_string()), "Book author is required")?;

        let deleted = self.store.delete_by_author(&author).await?;
        if deleted == 0 {
            return Err(AppError::NotFound(format!(
                "No books by {} found to delete",
                author
            )));
        }
        tracing::info!("Deleted {} books by '{}'", deleted, author);
        Ok(deleted)
    }
}
