//! OpenAPI documentation

use axum::Router;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::api::{books, health};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Libris API",
        version = "0.1.0",
        description = "Library catalog REST API"
    ),
    paths(
        // Health
        health::health_check,
        health::readiness_check,
        // Books
        books::list_books,
        books::add_book,
        books::add_many_books,
        books::search_books,
        books::count_books,
        books::get_book,
        books::update_book,
        books::update_book_title,
        books::update_book_author,
        books::update_book_genre,
        books::update_book_copies,
        books::delete_book,
        books::delete_all_books,
        books::delete_book_by_title,
        books::delete_books_by_author,
    ),
    components(
        schemas(
            crate::models::book::Book,
            crate::models::book::BookPayload,
            crate::models::book::SearchQuery,
            books::MessageResponse,
            health::HealthResponse,
            health::ReadinessResponse,
            crate::config::StoreBackend,
            crate::error::ErrorResponse,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "books", description = "Book catalog management")
    )
)]
pub struct ApiDoc;

/// Create the OpenAPI documentation router
pub fn create_openapi_router() -> Router {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}
