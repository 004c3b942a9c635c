//! Book catalog endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;
use serde_json::Value;
use utoipa::ToSchema;

use super::ApiJson;
use crate::{
    error::{AppResult, ErrorResponse},
    models::{Book, BookPayload, SearchQuery},
    AppState,
};

/// Outcome message returned by mutating endpoints
#[derive(Debug, Serialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    fn ok(message: String) -> AppResult<(StatusCode, Json<Self>)> {
        Ok((StatusCode::OK, Json(Self { message })))
    }
}

/// List every book
#[utoipa::path(
    get,
    path = "/api/book",
    tag = "books",
    responses(
        (status = 200, description = "All books", body = Vec<Book>),
        (status = 404, description = "Catalog is empty", body = ErrorResponse)
    )
)]
pub async fn list_books(State(state): State<AppState>) -> AppResult<Json<Vec<Book>>> {
    let books = state.services.books.list().await?;
    Ok(Json(books))
}

/// Add a book, or more copies of an existing (title, author)
#[utoipa::path(
    post,
    path = "/api/book",
    tag = "books",
    request_body = BookPayload,
    responses(
        (status = 201, description = "Book created", body = MessageResponse),
        (status = 200, description = "Copies added to an existing book", body = MessageResponse),
        (status = 400, description = "Missing or invalid field", body = ErrorResponse)
    )
)]
pub async fn add_book(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<BookPayload>,
) -> AppResult<(StatusCode, Json<MessageResponse>)> {
    let outcome = state.services.books.add(&payload).await?;
    let status = if outcome.is_created() {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };
    Ok((
        status,
        Json(MessageResponse {
            message: format!("{} book copy is added!", outcome.book().title),
        }),
    ))
}

/// Add a batch of books
#[utoipa::path(
    post,
    path = "/api/book/addManyBooks",
    tag = "books",
    request_body = Vec<BookPayload>,
    responses(
        (status = 201, description = "Books added or updated", body = MessageResponse),
        (status = 400, description = "Body is not an array, or an element is invalid", body = ErrorResponse)
    )
)]
pub async fn add_many_books(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<Value>,
) -> AppResult<(StatusCode, Json<MessageResponse>)> {
    let count = state.services.books.add_many(&body).await?;
    Ok((
        StatusCode::CREATED,
        Json(MessageResponse {
            message: format!("{} books are added!", count),
        }),
    ))
}

/// Search books by title, author and genre
#[utoipa::path(
    get,
    path = "/api/book/search",
    tag = "books",
    params(SearchQuery),
    responses(
        (status = 200, description = "Matching books", body = Vec<Book>),
        (status = 404, description = "Nothing matched", body = ErrorResponse)
    )
)]
pub async fn search_books(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> AppResult<Json<Vec<Book>>> {
    let books = state.services.books.search(query).await?;
    Ok(Json(books))
}

/// Count books in the catalog
#[utoipa::path(
    get,
    path = "/api/book/count",
    tag = "books",
    responses(
        (status = 200, description = "Book count", body = MessageResponse),
        (status = 404, description = "Catalog is empty", body = ErrorResponse)
    )
)]
pub async fn count_books(
    State(state): State<AppState>,
) -> AppResult<(StatusCode, Json<MessageResponse>)> {
    let count = state.services.books.count().await?;
    MessageResponse::ok(format!("There are {} books in the library.", count))
}

/// Get a book by ID
#[utoipa::path(
    get,
    path = "/api/book/{id}",
    tag = "books",
    params(("id" = String, Path, description = "Book ID")),
    responses(
        (status = 200, description = "Book details", body = Book),
        (status = 400, description = "Malformed ID", body = ErrorResponse),
        (status = 404, description = "Book not found", body = ErrorResponse)
    )
)]
pub async fn get_book(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<Book>> {
    let book = state.services.books.get(&id).await?;
    Ok(Json(book))
}

/// Replace the provided fields of a book
#[utoipa::path(
    put,
    path = "/api/book/update/{id}",
    tag = "books",
    params(("id" = String, Path, description = "Book ID")),
    request_body = BookPayload,
    responses(
        (status = 200, description = "Book updated", body = MessageResponse),
        (status = 400, description = "Malformed ID or invalid field", body = ErrorResponse),
        (status = 404, description = "Book not found", body = ErrorResponse)
    )
)]
pub async fn update_book(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ApiJson(payload): ApiJson<BookPayload>,
) -> AppResult<(StatusCode, Json<MessageResponse>)> {
    let book = state.services.books.update(&id, &payload).await?;
    MessageResponse::ok(format!("{} book is updated.", book.title))
}

/// Update the title of a book
#[utoipa::path(
    patch,
    path = "/api/book/updateBookTitle/{id}",
    tag = "books",
    params(("id" = String, Path, description = "Book ID")),
    request_body = BookPayload,
    responses(
        (status = 200, description = "Title updated", body = MessageResponse),
        (status = 400, description = "Missing, unchanged or malformed value", body = ErrorResponse),
        (status = 404, description = "Book not found", body = ErrorResponse)
    )
)]
pub async fn update_book_title(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ApiJson(payload): ApiJson<BookPayload>,
) -> AppResult<(StatusCode, Json<MessageResponse>)> {
    let book = state.services.books.update_title(&id, payload.title).await?;
    MessageResponse::ok(format!("{} book title is updated", book.title))
}

/// Update the author of a book
#[utoipa::path(
    patch,
    path = "/api/book/updateBookAuthor/{id}",
    tag = "books",
    params(("id" = String, Path, description = "Book ID")),
    request_body = BookPayload,
    responses(
        (status = 200, description = "Author updated", body = MessageResponse),
        (status = 400, description = "Missing, unchanged or malformed value", body = ErrorResponse),
        (status = 404, description = "Book not found", body = ErrorResponse)
    )
)]
pub async fn update_book_author(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ApiJson(payload): ApiJson<BookPayload>,
) -> AppResult<(StatusCode, Json<MessageResponse>)> {
    let book = state.services.books.update_author(&id, payload.author).await?;
    MessageResponse::ok(format!("{} book author is updated", book.title))
}

/// Update the genre of a book
#[utoipa::path(
    patch,
    path = "/api/book/updateBookGenre/{id}",
    tag = "books",
    params(("id" = String, Path, description = "Book ID")),
    request_body = BookPayload,
    responses(
        (status = 200, description = "Genre updated", body = MessageResponse),
        (status = 400, description = "Missing, unchanged or malformed value", body = ErrorResponse),
        (status = 404, description = "Book not found", body = ErrorResponse)
    )
)]
pub async fn update_book_genre(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ApiJson(payload): ApiJson<BookPayload>,
) -> AppResult<(StatusCode, Json<MessageResponse>)> {
    let book = state.services.books.update_genre(&id, payload.genre).await?;
    MessageResponse::ok(format!("{} book genre is updated", book.title))
}

/// Update the number of available copies of a book
#[utoipa::path(
    patch,
    path = "/api/book/updateBookCopies/{id}",
    tag = "books",
    params(("id" = String, Path, description = "Book ID")),
    request_body = BookPayload,
    responses(
        (status = 200, description = "Copies updated", body = MessageResponse),
        (status = 400, description = "Missing, zero, unchanged or malformed value", body = ErrorResponse),
        (status = 404, description = "Book not found", body = ErrorResponse)
    )
)]
pub async fn update_book_copies(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ApiJson(payload): ApiJson<BookPayload>,
) -> AppResult<(StatusCode, Json<MessageResponse>)> {
    let book = state
        .services
        .books
        .update_copies(&id, payload.available_copies)
        .await?;
    MessageResponse::ok(format!("{} book available copies is updated", book.title))
}

/// Delete a book by ID
#[utoipa::path(
    delete,
    path = "/api/book/delete/{id}",
    tag = "books",
    params(("id" = String, Path, description = "Book ID")),
    responses(
        (status = 200, description = "Book deleted", body = MessageResponse),
        (status = 400, description = "Malformed ID", body = ErrorResponse),
        (status = 404, description = "Book not found", body = ErrorResponse)
    )
)]
pub async fn delete_book(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<(StatusCode, Json<MessageResponse>)> {
    let book = state.services.books.delete(&id).await?;
    MessageResponse::ok(format!("{} book is deleted.", book.title))
}

/// Delete every book
#[utoipa::path(
    delete,
    path = "/api/book/delete",
    tag = "books",
    responses(
        (status = 200, description = "Books deleted", body = MessageResponse),
        (status = 404, description = "Nothing to delete", body = ErrorResponse)
    )
)]
pub async fn delete_all_books(
    State(state): State<AppState>,
) -> AppResult<(StatusCode, Json<MessageResponse>)> {
    let deleted = state.services.books.delete_all().await?;
    let message = if deleted == 1 {
        "1 book was deleted.".to_string()
    } else {
        format!("{} books were deleted.", deleted)
    };
    MessageResponse::ok(message)
}

/// Delete the single book with this exact title
#[utoipa::path(
    delete,
    path = "/api/book/deleteBookByTitle/{title}",
    tag = "books",
    params(("title" = String, Path, description = "Exact book title")),
    responses(
        (status = 200, description = "Book deleted", body = MessageResponse),
        (status = 400, description = "Title shared by several books, or malformed", body = ErrorResponse),
        (status = 404, description = "No book with this title", body = ErrorResponse)
    )
)]
pub async fn delete_book_by_title(
    State(state): State<AppState>,
    Path(title): Path<String>,
) -> AppResult<(StatusCode, Json<MessageResponse>)> {
    state.services.books.delete_by_title(&title).await?;
    MessageResponse::ok(format!("{} book is deleted", title))
}

/// Delete every book by this exact author
#[utoipa::path(
    delete,
    path = "/api/book/deleteBookByAuthor/{author}",
    tag = "books",
    params(("author" = String, Path, description = "Exact author name")),
    responses(
        (status = 200, description = "Books deleted", body = MessageResponse),
        (status = 400, description = "Malformed author", body = ErrorResponse),
        (status = 404, description = "No book by this author", body = ErrorResponse)
    )
)]
pub async fn delete_books_by_author(
    State(state): State<AppState>,
    Path(author): Path<String>,
) -> AppResult<(StatusCode, Json<MessageResponse>)> {
    state.services.books.delete_by_author(&author).await?;
    MessageResponse::ok(format!("All books by {} are deleted", author))
}
