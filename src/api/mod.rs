//! API handlers and routing for the Libris REST endpoints

pub mod books;
pub mod health;
pub mod openapi;

use axum::{
    extract::FromRequest,
    routing::{delete, get, patch, post, put},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::{error::AppError, AppState};

/// JSON body extractor whose rejections become `400 {"message": ...}`
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct ApiJson<T>(pub T);

/// Book catalog routes, mounted under `/api/book`.
///
/// `/search` and `/count` are literal segments; the router prefers them over
/// the `/:id` capture regardless of registration order.
pub fn book_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(books::list_books).post(books::add_book))
        .route("/addManyBooks", post(books::add_many_books))
        .route("/search", get(books::search_books))
        .route("/delete/:id", delete(books::delete_book))
        .route("/delete", delete(books::delete_all_books))
        .route("/update/:id", put(books::update_book))
        .route("/count", get(books::count_books))
        .route("/:id", get(books::get_book))
        .route("/deleteBookByTitle/:title", delete(books::delete_book_by_title))
        .route("/deleteBookByAuthor/:author", delete(books::delete_books_by_author))
        .route("/updateBookTitle/:id", patch(books::update_book_title))
        .route("/updateBookAuthor/:id", patch(books::update_book_author))
        .route("/updateBookGenre/:id", patch(books::update_book_genre))
        .route("/updateBookCopies/:id", patch(books::update_book_copies))
}

/// Create the application router with all routes
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api = Router::new()
        .route("/health", get(health::health_check))
        .route("/ready", get(health::readiness_check))
        .nest("/api/book", book_routes())
        .with_state(state);

    Router::new()
        .merge(api)
        .merge(openapi::create_openapi_router())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}
