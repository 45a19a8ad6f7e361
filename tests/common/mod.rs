#![allow(dead_code)]

use std::path::PathBuf;

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;
use sqlx::sqlite::{SqlitePool, SqlitePoolOptions};
use tower::ServiceExt;
use trivia_api::db::queries::categories::import_categories;
use trivia_api::db::queries::questions::import_questions;
use trivia_api::db::{self, Category, Question};
use trivia_api::server::app::build_router;

pub const CATEGORIES: [&str; 6] = [
    "Science",
    "Art",
    "Geography",
    "History",
    "Entertainment",
    "Sports",
];

pub async fn empty_pool() -> SqlitePool {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect("sqlite::memory:")
        .await
        .expect("in-memory database");
    db::run_migrations(&pool).await.expect("migrations");
    pool
}

fn read_seed<T: DeserializeOwned>(file: &str) -> Vec<T> {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("data")
        .join(file);
    csv::Reader::from_path(path)
        .expect("seed file")
        .deserialize()
        .collect::<Result<_, _>>()
        .expect("seed rows")
}

pub fn seed_categories() -> Vec<Category> {
    read_seed("categories.csv")
}

pub fn seed_questions() -> Vec<Question> {
    read_seed("questions.csv")
}

/// Six categories and nineteen questions.
pub async fn seeded_pool() -> SqlitePool {
    let pool = empty_pool().await;
    import_categories(&pool, seed_categories()).await.unwrap();
    import_questions(&pool, seed_questions()).await.unwrap();
    pool
}

pub async fn send(
    pool: &SqlitePool,
    method: Method,
    uri: &str,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string())),
        None => builder.body(Body::empty()),
    }
    .unwrap();

    let response = build_router(pool.clone()).oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
}

pub async fn get(pool: &SqlitePool, uri: &str) -> (StatusCode, Value) {
    send(pool, Method::GET, uri, None).await
}

pub async fn post(pool: &SqlitePool, uri: &str, body: Value) -> (StatusCode, Value) {
    send(pool, Method::POST, uri, Some(body)).await
}

pub async fn delete(pool: &SqlitePool, uri: &str) -> (StatusCode, Value) {
    send(pool, Method::DELETE, uri, None).await
}

pub fn assert_error(response: &(StatusCode, Value), status: StatusCode, message: &str) {
    assert_eq!(response.0, status, "body: {}", response.1);
    assert_eq!(response.1["success"], false);
    assert_eq!(response.1["error"], status.as_u16());
    assert_eq!(response.1["message"], message);
}
