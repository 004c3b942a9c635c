//! PostgreSQL book store

use async_trait::async_trait;
use sqlx::{Pool, Postgres, QueryBuilder};
use uuid::Uuid;

use super::{check_text, parse_book_id, BookStore, StoreError, StoreResult};
use crate::models::{Book, BookField, BookFilter, NewBook};

/// SQLSTATE raised when `available_copies + n` leaves the bigint range
const NUMERIC_VALUE_OUT_OF_RANGE: &str = "22003";

/// Escape LIKE metacharacters and wrap the needle for a substring match
fn like_pattern(needle: &str) -> String {
    let mut pattern = String::with_capacity(needle.len() + 2);
    pattern.push('%');
    for c in needle.chars() {
        if matches!(c, '\\' | '%' | '_') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

#[derive(Clone)]
pub struct PgBookStore {
    pool: Pool<Postgres>,
}

impl PgBookStore {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BookStore for PgBookStore {
    async fn find_all(&self) -> StoreResult<Vec<Book>> {
        let rows = sqlx::query_as::<_, Book>(
            "SELECT id, title, author, genre, available_copies FROM books ORDER BY created_at, id",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn find_matching(&self, filter: &BookFilter) -> StoreResult<Vec<Book>> {
        let mut builder = QueryBuilder::<Postgres>::new(
            "SELECT id, title, author, genre, available_copies FROM books WHERE TRUE",
        );

        let columns = [
            ("title", &filter.title),
            ("author", &filter.author),
            ("genre", &filter.genre),
        ];
        for (column, value) in columns {
            if let Some(value) = value {
                check_text(column, value)?;
                builder
                    .push(" AND ")
                    .push(column)
                    .push(" ILIKE ")
                    .push_bind(like_pattern(value))
                    .push(" ESCAPE '\\'");
            }
        }
        builder.push(" ORDER BY created_at, id");

        let rows = builder
            .build_query_as::<Book>()
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    async fn find_by_id(&self, id: &str) -> StoreResult<Option<Book>> {
        let id = parse_book_id(id)?;
        let row = sqlx::query_as::<_, Book>(
            "SELECT id, title, author, genre, available_copies FROM books WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    async fn find_by_title_and_author(
        &self,
        title: &str,
        author: &str,
    ) -> StoreResult<Option<Book>> {
        check_text("title", title)?;
        check_text("author", author)?;
        let row = sqlx::query_as::<_, Book>(
            r#"
            SELECT id, title, author, genre, available_copies FROM books
            WHERE title = $1 AND author = $2
            ORDER BY created_at, id
            LIMIT 1
            "#,
        )
        .bind(title)
        .bind(author)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    async fn insert(&self, book: &NewBook) -> StoreResult<Book> {
        check_text("title", &book.title)?;
        check_text("author", &book.author)?;
        check_text("genre", &book.genre)?;
        let row = sqlx::query_as::<_, Book>(
            r#"
            INSERT INTO books (id, title, author, genre, available_copies)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, title, author, genre, available_copies
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&book.title)
        .bind(&book.author)
        .bind(&book.genre)
        .bind(book.available_copies)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    async fn increment_copies(&self, id: Uuid, amount: i64) -> StoreResult<Option<Book>> {
        let row = sqlx::query_as::<_, Book>(
            r#"
            UPDATE books SET available_copies = available_copies + $2
            WHERE id = $1
            RETURNING id, title, author, genre, available_copies
            "#,
        )
        .bind(id)
        .bind(amount)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            let out_of_range = matches!(
                &e,
                sqlx::Error::Database(db) if db.code().as_deref() == Some(NUMERIC_VALUE_OUT_OF_RANGE)
            );
            if out_of_range {
                StoreError::CopiesOverflow(id)
            } else {
                StoreError::Database(e)
            }
        })?;
        Ok(row)
    }

    async fn replace(&self, book: &Book) -> StoreResult<Option<Book>> {
        check_text("title", &book.title)?;
        check_text("author", &book.author)?;
        check_text("genre", &book.genre)?;
        let row = sqlx::query_as::<_, Book>(
            r#"
            UPDATE books SET title = $2, author = $3, genre = $4, available_copies = $5
            WHERE id = $1
            RETURNING id, title, author, genre, available_copies
            "#,
        )
        .bind(book.id)
        .bind(&book.title)
        .bind(&book.author)
        .bind(&book.genre)
        .bind(book.available_copies)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    async fn update_field(&self, id: &str, field: &BookField) -> StoreResult<u64> {
        let id = parse_book_id(id)?;

        // Rows already holding the value are not counted as modified.
        let result = match field {
            BookField::Title(title) => {
                check_text("title", title)?;
                sqlx::query("UPDATE books SET title = $2 WHERE id = $1 AND title <> $2")
                    .bind(id)
                    .bind(title)
                    .execute(&self.pool)
                    .await?
            }
            BookField::Author(author) => {
                check_text("author", author)?;
                sqlx::query("UPDATE books SET author = $2 WHERE id = $1 AND author <> $2")
                    .bind(id)
                    .bind(author)
                    .execute(&self.pool)
                    .await?
            }
            BookField::Genre(genre) => {
                check_text("genre", genre)?;
                sqlx::query("UPDATE books SET genre = $2 WHERE id = $1 AND genre <> $2")
                    .bind(id)
                    .bind(genre)
                    .execute(&self.pool)
                    .await?
            }
            BookField::AvailableCopies(copies) => {
                sqlx::query(
                    "UPDATE books SET available_copies = $2 WHERE id = $1 AND available_copies <> $2",
                )
                .bind(id)
                .bind(copies)
                .execute(&self.pool)
                .await?
            }
        };

        Ok(result.rows_affected())
    }

    async fn count(&self) -> StoreResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM books")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    async fn count_by_title(&self, title: &str) -> StoreResult<i64> {
        check_text("title", title)?;
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM books WHERE title = $1")
            .bind(title)
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    async fn delete_by_id(&self, id: &str) -> StoreResult<Option<Book>> {
        let id = parse_book_id(id)?;
        let row = sqlx::query_as::<_, Book>(
            "DELETE FROM books WHERE id = $1 RETURNING id, title, author, genre, available_copies",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    async fn delete_all(&self) -> StoreResult<u64> {
        let result = sqlx::query("DELETE FROM books")
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    async fn delete_unique_title(&self, title: &str) -> StoreResult<u64> {
        check_text("title", title)?;
        // Count and delete share one statement snapshot.
        let result = sqlx::query(
            r#"
            DELETE FROM books
            WHERE title = $1
              AND (SELECT COUNT(*) FROM books WHERE title = $1) = 1
            "#,
        )
        .bind(title)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected())
    }

    async fn delete_by_author(&self, author: &str) -> StoreResult<u64> {
        check_text("author", author)?;
        let result = sqlx::query("DELETE FROM books WHERE author = $1")
            .bind(author)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }
}
