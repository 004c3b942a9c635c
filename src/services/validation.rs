//! Request payload validation
//!
//! Checks run in a fixed order and stop at the first failure:
//! title, author, genre (presence then length), copies presence, copies sign.

use crate::{
    error::{AppError, AppResult},
    models::{book::GENRE_MAX_LEN, Book, BookPayload, NewBook},
};

/// Empty strings count as absent
fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|s| !s.is_empty())
}

fn invalid(message: &str) -> AppError {
    AppError::Validation(message.to_string())
}

pub fn check_genre_length(genre: &str) -> AppResult<()> {
    if genre.chars().count() > GENRE_MAX_LEN {
        return Err(AppError::Validation(format!(
            "Genre cannot exceed {} characters",
            GENRE_MAX_LEN
        )));
    }
    Ok(())
}

pub fn check_copies(copies: i64) -> AppResult<()> {
    if copies < 0 {
        return Err(invalid("Number of available copies cannot be negative"));
    }
    Ok(())
}

/// Validate a create payload into a complete field set
pub fn validate_new_book(payload: &BookPayload) -> AppResult<NewBook> {
    let title = present(&payload.title).ok_or_else(|| invalid("Book title is required"))?;
    let author = present(&payload.author).ok_or_else(|| invalid("Author name is required"))?;
    let genre = present(&payload.genre).ok_or_else(|| invalid("Genre is required"))?;
    check_genre_length(genre)?;
    let available_copies = payload
        .available_copies
        .ok_or_else(|| invalid("Number of available copies is required"))?;
    check_copies(available_copies)?;

    Ok(NewBook {
        title: title.to_string(),
        author: author.to_string(),
        genre: genre.to_string(),
        available_copies,
    })
}

/// Merge a full-update payload over the stored record.
///
/// Non-empty text fields replace the stored value; `available_copies`
/// replaces it whenever present, zero included.
pub fn merge_update(existing: &Book, changes: &BookPayload) -> AppResult<Book> {
    let pick = |new: &Option<String>, old: &str| present(new).unwrap_or(old).to_string();

    let merged = Book {
        id: existing.id,
        title: pick(&changes.title, &existing.title),
        author: pick(&changes.author, &existing.author),
        genre: pick(&changes.genre, &existing.genre),
        available_copies: changes
            .available_copies
            .unwrap_or(existing.available_copies),
    };

    check_genre_length(&merged.genre)?;
    check_copies(merged.available_copies)?;
    Ok(merged)
}

/// Extract a required non-empty text value
pub fn require_text(value: Option<String>, message: &str) -> AppResult<String> {
    value.filter(|s| !s.is_empty()).ok_or_else(|| invalid(message))
}
