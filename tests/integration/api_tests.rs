//! API integration tests against an in-process router on the memory store

use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;

use libris_server::{
    api,
    config::{AppConfig, StoreBackend},
    repository::MemoryBookStore,
    AppState,
};

const BASE: &str = "/api/book";

fn app() -> Router {
    let mut config = AppConfig::default();
    config.database.backend = StoreBackend::Memory;
    let state = AppState::new(config, Arc::new(MemoryBookStore::new()));
    api::create_router(state)
}

async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string())),
        None => builder.body(Body::empty()),
    }
    .expect("Failed to build request");

    let response = app
        .clone()
        .oneshot(request)
        .await
        .expect("Failed to send request");

    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("Failed to read body");
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

fn dune(copies: i64) -> Value {
    json!({
        "title": "Dune",
        "author": "Herbert",
        "genre": "SciFi",
        "available_copies": copies
    })
}

async fn first_book_id(app: &Router) -> String {
    let (_, body) = send(app, "GET", BASE, None).await;
    body[0]["id"].as_str().expect("No book ID").to_string()
}

#[tokio::test]
async fn test_health_check() {
    let app = app();
    let (status, body) = send(&app, "GET", "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");

    let (status, body) = send(&app, "GET", "/ready", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ready");
    assert_eq!(body["store"], "memory");
}

#[tokio::test]
async fn test_list_empty_then_one() {
    let app = app();
    let (status, body) = send(&app, "GET", BASE, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "No books found");

    let (status, _) = send(&app, "POST", BASE, Some(dune(2))).await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = send(&app, "GET", BASE, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().map(Vec::len), Some(1));
    assert_eq!(body[0]["title"], "Dune");
    assert!(body[0]["id"].is_string());
}

#[tokio::test]
async fn test_add_same_book_twice_increments_copies() {
    let app = app();
    let (status, body) = send(&app, "POST", BASE, Some(dune(2))).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["message"], "Dune book copy is added!");

    let (status, body) = send(&app, "POST", BASE, Some(dune(3))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Dune book copy is added!");

    let (_, body) = send(&app, "GET", BASE, None).await;
    assert_eq!(body.as_array().map(Vec::len), Some(1));
    assert_eq!(body[0]["available_copies"], 5);
}

#[tokio::test]
async fn test_add_validation_precedence() {
    let app = app();
    let cases = [
        (json!({}), "Book title is required"),
        (json!({"title": "Dune"}), "Author name is required"),
        (json!({"title": "Dune", "author": "Herbert"}), "Genre is required"),
        (
            json!({"title": "Dune", "author": "Herbert", "genre": "SciFi"}),
            "Number of available copies is required",
        ),
        (
            json!({"title": "Dune", "author": "Herbert", "genre": "SciFi", "available_copies": -1}),
            "Number of available copies cannot be negative",
        ),
    ];

    for (payload, expected) in cases {
        let (status, body) = send(&app, "POST", BASE, Some(payload)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], expected);
    }
}

#[tokio::test]
async fn test_malformed_json_is_bad_request() {
    let app = app();
    let request = Request::builder()
        .method("POST")
        .uri(BASE)
        .header("content-type", "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_add_many_books() {
    let app = app();
    let (status, body) = send(
        &app,
        "POST",
        &format!("{}/addManyBooks", BASE),
        Some(json!({"title": "Dune"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Request body should contain an array of books");

    let (status, body) = send(
        &app,
        "POST",
        &format!("{}/addManyBooks", BASE),
        Some(json!([
            dune(1),
            {"title": "Emma", "author": "Austen", "genre": "Classic", "available_copies": 2},
            {"title": "Persuasion", "author": "Austen", "genre": "Classic", "available_copies": 1}
        ])),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["message"], "3 books are added!");

    let (_, body) = send(&app, "GET", &format!("{}/count", BASE), None).await;
    assert_eq!(body["message"], "There are 3 books in the library.");
}

#[tokio::test]
async fn test_literal_routes_win_over_id() {
    let app = app();
    let (status, body) = send(&app, "GET", &format!("{}/count", BASE), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "No books found in the library");

    let (status, body) = send(&app, "GET", &format!("{}/search", BASE), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "No books found matching the criteria");
}

#[tokio::test]
async fn test_search() {
    let app = app();
    send(&app, "POST", BASE, Some(dune(2))).await;
    send(
        &app,
        "POST",
        BASE,
        Some(json!({"title": "Emma", "author": "Austen", "genre": "Classic", "available_copies": 1})),
    )
    .await;

    let (status, body) = send(&app, "GET", &format!("{}/search?genre=sci", BASE), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().map(Vec::len), Some(1));
    assert_eq!(body[0]["genre"], "SciFi");

    let (status, body) = send(&app, "GET", &format!("{}/search", BASE), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().map(Vec::len), Some(2));

    let (status, _) = send(
        &app,
        "GET",
        &format!("{}/search?title=emma&author=herbert", BASE),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_get_by_id() {
    let app = app();
    let (status, body) = send(&app, "GET", &format!("{}/not-a-valid-id", BASE), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Invalid book ID format");

    send(&app, "POST", BASE, Some(dune(2))).await;
    let id = first_book_id(&app).await;

    let (status, body) = send(&app, "GET", &format!("{}/{}", BASE, id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["id"], id.as_str());
    assert_eq!(body["author"], "Herbert");

    let missing = uuid::Uuid::new_v4();
    let (status, body) = send(&app, "GET", &format!("{}/{}", BASE, missing), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], format!("No book found with this ID: {}", missing));
}

#[tokio::test]
async fn test_full_update() {
    let app = app();
    send(&app, "POST", BASE, Some(dune(2))).await;
    let id = first_book_id(&app).await;

    let (status, body) = send(
        &app,
        "PUT",
        &format!("{}/update/{}", BASE, id),
        Some(json!({"title": "Dune Messiah", "available_copies": 0})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Dune Messiah book is updated.");

    let (_, body) = send(&app, "GET", &format!("{}/{}", BASE, id), None).await;
    assert_eq!(body["title"], "Dune Messiah");
    assert_eq!(body["genre"], "SciFi");
    assert_eq!(body["available_copies"], 0);

    let (status, _) = send(
        &app,
        "PUT",
        &format!("{}/update/{}", BASE, uuid::Uuid::new_v4()),
        Some(json!({"title": "Nope"})),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_partial_updates() {
    let app = app();
    send(&app, "POST", BASE, Some(dune(2))).await;
    let id = first_book_id(&app).await;

    let (status, body) = send(
        &app,
        "PATCH",
        &format!("{}/updateBookAuthor/{}", BASE, id),
        Some(json!({"author": "Frank Herbert"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Dune book author is updated");

    let (status, body) = send(
        &app,
        "PATCH",
        &format!("{}/updateBookTitle/{}", BASE, id),
        Some(json!({"title": "Dune Messiah"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Dune Messiah book title is updated");

    let (status, body) = send(
        &app,
        "PATCH",
        &format!("{}/updateBookGenre/{}", BASE, id),
        Some(json!({"genre": "SciFi"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Book genre is not updating");

    let (status, body) = send(
        &app,
        "PATCH",
        &format!("{}/updateBookCopies/{}", BASE, id),
        Some(json!({"available_copies": 7})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Dune Messiah book available copies is updated");

    let (status, _) = send(
        &app,
        "PATCH",
        &format!("{}/updateBookTitle/{}", BASE, uuid::Uuid::new_v4()),
        Some(json!({"title": "Ghost"})),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = send(
        &app,
        "PATCH",
        &format!("{}/updateBookTitle/12345", BASE),
        Some(json!({"title": "Ghost"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Invalid book ID format");
}

#[tokio::test]
async fn test_update_copies_to_zero_is_rejected() {
    let app = app();
    send(&app, "POST", BASE, Some(dune(2))).await;
    let id = first_book_id(&app).await;

    let (status, body) = send(
        &app,
        "PATCH",
        &format!("{}/updateBookCopies/{}", BASE, id),
        Some(json!({"available_copies": 0})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Book available copies is required");
}

#[tokio::test]
async fn test_delete_by_id() {
    let app = app();
    send(&app, "POST", BASE, Some(dune(2))).await;
    let id = first_book_id(&app).await;

    let (status, body) = send(&app, "DELETE", &format!("{}/delete/{}", BASE, id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Dune book is deleted.");

    let (status, body) = send(&app, "DELETE", &format!("{}/delete/{}", BASE, id), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Book not found");

    let (status, _) = send(&app, "DELETE", &format!("{}/delete/xyz", BASE), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_delete_all_phrasing() {
    let app = app();
    let (status, body) = send(&app, "DELETE", &format!("{}/delete", BASE), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "No book found to delete");

    send(&app, "POST", BASE, Some(dune(2))).await;
    let (status, body) = send(&app, "DELETE", &format!("{}/delete", BASE), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "1 book was deleted.");

    send(&app, "POST", BASE, Some(dune(2))).await;
    send(
        &app,
        "POST",
        BASE,
        Some(json!({"title": "Emma", "author": "Austen", "genre": "Classic", "available_copies": 1})),
    )
    .await;
    let (status, body) = send(&app, "DELETE", &format!("{}/delete", BASE), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "2 books were deleted.");
}

#[tokio::test]
async fn test_delete_by_title_and_author() {
    let app = app();
    for author in ["Keats", "Byron"] {
        send(
            &app,
            "POST",
            BASE,
            Some(json!({"title": "Poems", "author": author, "genre": "Poetry", "available_copies": 1})),
        )
        .await;
    }

    let (status, body) = send(
        &app,
        "DELETE",
        &format!("{}/deleteBookByTitle/Poems", BASE),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body["message"],
        "More than one book found with the same title. Please delete by ID instead"
    );
    let (_, body) = send(&app, "GET", BASE, None).await;
    assert_eq!(body.as_array().map(Vec::len), Some(2));

    let (status, body) = send(
        &app,
        "DELETE",
        &format!("{}/deleteBookByAuthor/Keats", BASE),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "All books by Keats are deleted");

    let (status, body) = send(
        &app,
        "DELETE",
        &format!("{}/deleteBookByTitle/Poems", BASE),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Poems book is deleted");

    let (status, body) = send(
        &app,
        "DELETE",
        &format!("{}/deleteBookByAuthor/Keats", BASE),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "No books by Keats found to delete");
}

#[tokio::test]
async fn test_path_params_are_percent_decoded() {
    let app = app();
    send(
        &app,
        "POST",
        BASE,
        Some(json!({"title": "War and Peace", "author": "Leo Tolstoy", "genre": "Classic", "available_copies": 1})),
    )
    .await;

    let (status, body) = send(
        &app,
        "DELETE",
        &format!("{}/deleteBookByTitle/War%20and%20Peace", BASE),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "War and Peace book is deleted");
}

#[tokio::test]
async fn test_copy_overflow_is_rejected_and_store_keeps_serving() {
    let app = app();
    let (status, _) = send(&app, "POST", BASE, Some(dune(i64::MAX))).await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = send(&app, "POST", BASE, Some(dune(i64::MAX))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Number of available copies is too large");

    let (status, body) = send(&app, "GET", BASE, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body[0]["available_copies"], i64::MAX);
}
