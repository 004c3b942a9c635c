//! Data models for Libris

pub mod book;

pub use book::{Book, BookField, BookFilter, BookPayload, NewBook, SearchQuery};
