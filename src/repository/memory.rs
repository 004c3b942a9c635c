//! In-process book store backed by an insertion-ordered map

use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;
use indexmap::IndexMap;
use uuid::Uuid;

use super::{check_text, parse_book_id, BookStore, StoreError, StoreResult};
use crate::models::{Book, BookField, BookFilter, NewBook};

#[derive(Clone, Default)]
pub struct MemoryBookStore {
    books: Arc<RwLock<IndexMap<Uuid, Book>>>,
}

impl MemoryBookStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> StoreResult<RwLockReadGuard<'_, IndexMap<Uuid, Book>>> {
        self.books
            .read()
            .map_err(|_| StoreError::LockPoisoned("read"))
    }

    fn write(&self) -> StoreResult<RwLockWriteGuard<'_, IndexMap<Uuid, Book>>> {
        self.books
            .write()
            .map_err(|_| StoreError::LockPoisoned("write"))
    }

    fn delete_where(&self, predicate: impl Fn(&Book) -> bool) -> StoreResult<u64> {
        let mut books = self.write()?;
        let before = books.len();
        books.retain(|_, book| !predicate(book));
        Ok((before - books.len()) as u64)
    }
}

#[async_trait]
impl BookStore for MemoryBookStore {
    async fn find_all(&self) -> StoreResult<Vec<Book>> {
        Ok(self.read()?.values().cloned().collect())
    }

    async fn find_matching(&self, filter: &BookFilter) -> StoreResult<Vec<Book>> {
        for (field, value) in [
            ("title", &filter.title),
            ("author", &filter.author),
            ("genre", &filter.genre),
        ] {
            if let Some(value) = value {
                check_text(field, value)?;
            }
        }

        Ok(self
            .read()?
            .values()
            .filter(|book| filter.matches(book))
            .cloned()
            .collect())
    }

    async fn find_by_id(&self, id: &str) -> StoreResult<Option<Book>> {
        let id = parse_book_id(id)?;
        Ok(self.read()?.get(&id).cloned())
    }

    async fn find_by_title_and_author(
        &self,
        title: &str,
        author: &str,
    ) -> StoreResult<Option<Book>> {
        check_text("title", title)?;
        check_text("author", author)?;
        Ok(self
            .read()?
            .values()
            .find(|book| book.title == title && book.author == author)
            .cloned())
    }

    async fn insert(&self, book: &NewBook) -> StoreResult<Book> {
        check_text("title", &book.title)?;
        check_text("author", &book.author)?;
        check_text("genre", &book.genre)?;
        let book = book.clone().into_book(Uuid::new_v4());
        self.write()?.insert(book.id, book.clone());
        Ok(book)
    }

    async fn increment_copies(&self, id: Uuid, amount: i64) -> StoreResult<Option<Book>> {
        let mut books = self.write()?;
        let Some(book) = books.get_mut(&id) else {
            return Ok(None);
        };
        book.available_copies = book
            .available_copies
            .checked_add(amount)
            .ok_or(StoreError::CopiesOverflow(id))?;
        Ok(Some(book.clone()))
    }

    async fn replace(&self, book: &Book) -> StoreResult<Option<Book>> {
        check_text("title", &book.title)?;
        check_text("author", &book.author)?;
        check_text("genre", &book.genre)?;
        let mut books = self.write()?;
        Ok(books.get_mut(&book.id).map(|stored| {
            *stored = book.clone();
            stored.clone()
        }))
    }

    async fn update_field(&self, id: &str, field: &BookField) -> StoreResult<u64> {
        let id = parse_book_id(id)?;
        match field {
            BookField::Title(v) => check_text("title", v)?,
            BookField::Author(v) => check_text("author", v)?,
            BookField::Genre(v) => check_text("genre", v)?,
            BookField::AvailableCopies(_) => {}
        }

        let mut books = self.write()?;
        let modified = books
            .get_mut(&id)
            .map_or(false, |book| field.apply(book));
        Ok(u64::from(modified))
    }

    async fn count(&self) -> StoreResult<i64> {
        Ok(self.read()?.len() as i64)
    }

    async fn count_by_title(&self, title: &str) -> StoreResult<i64> {
        check_text("title", title)?;
        Ok(self
            .read()?
            .values()
            .filter(|book| book.title == title)
            .count() as i64)
    }

    async fn delete_by_id(&self, id: &str) -> StoreResult<Option<Book>> {
        let id = parse_book_id(id)?;
        Ok(self.write()?.shift_remove(&id))
    }

    async fn delete_all(&self) -> StoreResult<u64> {
        let mut books = self.write()?;
        let removed = books.len() as u64;
        books.clear();
        Ok(removed)
    }

    async fn delete_unique_title(&self, title: &str) -> StoreResult<u64> {
        check_text("title", title)?;
        let mut books = self.write()?;
        let id = {
            let mut matches = books.iter().filter(|(_, book)| book.title == title);
            match (matches.next(), matches.next()) {
                (Some((id, _)), None) => *id,
                _ => return Ok(0),
            }
        };
        books.shift_remove(&id);
        Ok(1)
    }

    async fn delete_by_author(&self, author: &str) -> StoreResult<u64> {
        check_text("author", author)?;
        self.delete_where(|book| book.author == author)
    }
}
