//! Book model and request payloads

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

/// Maximum length of a genre, in characters
pub const GENRE_MAX_LEN: usize = 50;

/// Book record as stored in the catalog
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Book {
    pub id: Uuid,
    pub title: String,
    pub author: String,
    pub genre: String,
    /// Number of copies on the shelf (never negative)
    pub available_copies: i64,
}

/// Validated field set for a book that does not exist yet
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewBook {
    pub title: String,
    pub author: String,
    pub genre: String,
    pub available_copies: i64,
}

impl NewBook {
    pub fn into_book(self, id: Uuid) -> Book {
        Book {
            id,
            title: self.title,
            author: self.author,
            genre: self.genre,
            available_copies: self.available_copies,
        }
    }
}

/// Book request body (create, full update and single-field updates).
/// Every field is optional; each operation decides which ones it requires.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct BookPayload {
    pub title: Option<String>,
    pub author: Option<String>,
    pub genre: Option<String>,
    pub available_copies: Option<i64>,
}

/// Search query parameters
#[derive(Debug, Clone, Default, Deserialize, ToSchema, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct SearchQuery {
    /// Case-insensitive substring of the title
    pub title: Option<String>,
    /// Case-insensitive substring of the author
    pub author: Option<String>,
    /// Case-insensitive substring of the genre
    pub genre: Option<String>,
}

/// Normalized search filter handed to the store; `None` leaves a field unconstrained
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BookFilter {
    pub title: Option<String>,
    pub author: Option<String>,
    pub genre: Option<String>,
}

impl BookFilter {
    /// Check a book against the filter (case-insensitive substring on each set field)
    pub fn matches(&self, book: &Book) -> bool {
        fn contains(haystack: &str, needle: &Option<String>) -> bool {
            needle
                .as_ref()
                .map_or(true, |n| haystack.to_lowercase().contains(&n.to_lowercase()))
        }

        contains(&book.title, &self.title)
            && contains(&book.author, &self.author)
            && contains(&book.genre, &self.genre)
    }
}

impl From<SearchQuery> for BookFilter {
    fn from(query: SearchQuery) -> Self {
        let keep = |v: Option<String>| v.filter(|s| !s.is_empty());
        Self {
            title: keep(query.title),
            author: keep(query.author),
            genre: keep(query.genre),
        }
    }
}

/// A single-field change applied by the partial update operations
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BookField {
    Title(String),
    Author(String),
    Genre(String),
    AvailableCopies(i64),
}

impl BookField {
    /// Write the field into `book`, returning whether the value changed
    pub fn apply(&self, book: &mut Book) -> bool {
        fn set<T: PartialEq + Clone>(slot: &mut T, value: &T) -> bool {
            if slot == value {
                return false;
            }
            *slot = value.clone();
            true
        }

        match self {
            BookField::Title(v) => set(&mut book.title, v),
            BookField::Author(v) => set(&mut book.author, v),
            BookField::Genre(v) => set(&mut book.genre, v),
            BookField::AvailableCopies(v) => set(&mut book.available_copies, v),
        }
    }
}
