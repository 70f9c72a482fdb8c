use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, put},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tokio::{net::TcpListener, sync::RwLock};
use uuid::Uuid;

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Book {
    #[serde(rename = "_id")]
    pub id: String,
    pub title: String,
    pub author: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub genre: Option<String>,
    pub price: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub published_year: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub in_stock: bool,
}

/// Body of both POST and PUT. Every field is optional at the JSON level;
/// create enforces the required ones, update merges whatever is present.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookInput {
    pub title: Option<String>,
    pub author: Option<String>,
    pub genre: Option<String>,
    pub price: Option<f64>,
    pub published_year: Option<i64>,
    pub description: Option<String>,
    pub in_stock: Option<bool>,
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Issue {
    pub msg: String,
    pub path: String,
}

impl Issue {
    fn new(path: &str, msg: &str) -> Self {
        Self {
            msg: msg.to_string(),
            path: path.to_string(),
        }
    }
}

/// Newest first, like the real backend's default sort.
pub type Db = Arc<RwLock<Vec<Book>>>;

pub fn app() -> Router {
    let db: Db = Arc::new(RwLock::new(Vec::new()));
    Router::new()
        .route("/books", get(list_books).post(create_book))
        .route("/books/{id}", put(update_book).delete(delete_book))
        .with_state(db)
}

/// Serves the API under `/api`, matching the default client base URL.
pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, Router::new().nest("/api", app())).await
}

/// Serves the API at the root, for tests that build their own base URL.
pub async fn run_at_root(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

async fn list_books(State(db): State<Db>) -> Json<serde_json::Value> {
    let books = db.read().await;
    Json(json!({ "data": &*books }))
}

async fn create_book(State(db): State<Db>, Json(input): Json<BookInput>) -> Response {
    let issues = validate(&input, true);
    if !issues.is_empty() {
        return rejected(issues);
    }
    let book = Book {
        id: Uuid::new_v4().simple().to_string(),
        title: input.title.unwrap_or_default().trim().to_string(),
        author: input.author.unwrap_or_default().trim().to_string(),
        genre: input.genre.and_then(blank_as_none),
        price: input.price.unwrap_or_default(),
        published_year: input.published_year,
        description: input.description.and_then(blank_as_none),
        in_stock: input.in_stock.unwrap_or(true),
    };
    tracing::info!(id = %book.id, title = %book.title, "book created");
    db.write().await.insert(0, book.clone());
    (StatusCode::CREATED, Json(json!({ "data": book }))).into_response()
}

async fn update_book(
    State(db): State<Db>,
    Path(id): Path<String>,
    Json(input): Json<BookInput>,
) -> Response {
    let issues = validate(&input, false);
    if !issues.is_empty() {
        return rejected(issues);
    }
    let mut books = db.write().await;
    let Some(book) = books.iter_mut().find(|b| b.id == id) else {
        return not_found();
    };
    if let Some(title) = input.title {
        book.title = title.trim().to_string();
    }
    if let Some(author) = input.author {
        book.author = author.trim().to_string();
    }
    if let Some(genre) = input.genre {
        book.genre = blank_as_none(genre);
    }
    if let Some(price) = input.price {
        book.price = price;
    }
    if let Some(year) = input.published_year {
        book.published_year = Some(year);
    }
    if let Some(description) = input.description {
        book.description = blank_as_none(description);
    }
    if let Some(in_stock) = input.in_stock {
        book.in_stock = in_stock;
    }
    tracing::info!(%id, "book updated");
    (StatusCode::OK, Json(json!({ "data": book.clone() }))).into_response()
}

async fn delete_book(State(db): State<Db>, Path(id): Path<String>) -> Response {
    let mut books = db.write().await;
    let before = books.len();
    books.retain(|b| b.id != id);
    if books.len() == before {
        return not_found();
    }
    tracing::info!(%id, "book deleted");
    StatusCode::NO_CONTENT.into_response()
}

/// Server-side rules. `creating` makes title, author and price mandatory.
pub fn validate(input: &BookInput, creating: bool) -> Vec<Issue> {
    let mut issues = Vec::new();
    match input.title.as_deref().map(str::trim) {
        Some(title) if title.chars().count() < 2 => {
            issues.push(Issue::new("title", "Title must be at least 2 characters"))
        }
        None if creating => issues.push(Issue::new("title", "Title is required")),
        _ => {}
    }
    match input.author.as_deref().map(str::trim) {
        Some("") => issues.push(Issue::new("author", "Author is required")),
        None if creating => issues.push(Issue::new("author", "Author is required")),
        _ => {}
    }
    match input.price {
        Some(price) if price < 0.0 => {
            issues.push(Issue::new("price", "Price must be a non-negative number"))
        }
        None if creating => issues.push(Issue::new("price", "Price is required")),
        _ => {}
    }
    if let Some(year) = input.published_year {
        if !(0..=3000_i64).contains(&year) {
            issues.push(Issue::new(
                "publishedYear",
                "Published year must be between 0 and 3000",
            ));
        }
    }
    issues
}

/// An explicit empty string clears an optional text field.
fn blank_as_none(value: String) -> Option<String> {
    (!value.trim().is_empty()).then_some(value)
}

fn rejected(issues: Vec<Issue>) -> Response {
    tracing::debug!(count = issues.len(), "request rejected by validation");
    (StatusCode::BAD_REQUEST, Json(json!({ "errors": issues }))).into_response()
}

fn not_found() -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(json!({ "message": "Book not found" })),
    )
        .into_response()
}
