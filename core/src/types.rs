//! Wire types for the books API.
//!
//! # Design
//! Field names follow the backend's JSON: camelCase, with the identifier
//! under `_id` (plain `id` is accepted too). These types are defined
//! independently from the mock-server crate; integration tests catch drift.

use serde::{Deserialize, Serialize};

fn default_in_stock() -> bool {
    true
}

/// A book as stored in the remote collection.
///
/// `id` is assigned by the server and never generated locally. A record that
/// arrives without one deserializes with an empty `id` and cannot be updated
/// or deleted.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", from = "BookRecord")]
pub struct Book {
    #[serde(rename = "_id")]
    pub id: String,
    pub title: String,
    pub author: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub genre: Option<String>,
    pub price: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub published_year: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub in_stock: bool,
}

/// Incoming shape of a `Book`. Some backends send a virtual `id` next to
/// `_id`; `_id` wins when both are present.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct BookRecord {
    #[serde(rename = "_id", default)]
    mongo_id: Option<String>,
    #[serde(default)]
    id: Option<String>,
    title: String,
    author: String,
    #[serde(default)]
    genre: Option<String>,
    price: f64,
    #[serde(default)]
    published_year: Option<u16>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default = "default_in_stock")]
    in_stock: bool,
}

impl From<BookRecord> for Book {
    fn from(record: BookRecord) -> Self {
        Book {
            id: record.mongo_id.or(record.id).unwrap_or_default(),
            title: record.title,
            author: record.author,
            genre: record.genre,
            price: record.price,
            published_year: record.published_year,
            description: record.description,
            in_stock: record.in_stock,
        }
    }
}

/// Request body for create and update: a book without its identifier.
/// Absent optional fields are omitted from the JSON entirely.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BookPayload {
    pub title: String,
    pub author: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub genre: Option<String>,
    pub price: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub published_year: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default = "default_in_stock")]
    pub in_stock: bool,
}

impl BookPayload {
    /// Update bodies spell out blank text fields as `""`: the backend merges
    /// partial updates, so an omitted key would keep the stored value.
    /// `publishedYear` stays omitted when blank.
    pub fn with_blank_text_cleared(&self) -> BookPayload {
        BookPayload {
            genre: Some(self.genre.clone().unwrap_or_default()),
            description: Some(self.description.clone().unwrap_or_default()),
            ..self.clone()
        }
    }
}

/// `{ "data": ... }` wrapper used by every successful response.
#[derive(Debug, Deserialize)]
pub struct Envelope<T> {
    pub data: Option<T>,
}

/// One entry of an express-validator style `errors` array.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct ValidationIssue {
    pub msg: String,
    #[serde(default)]
    pub path: Option<String>,
}

/// Error response body. Both keys are optional.
#[derive(Debug, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub errors: Vec<ValidationIssue>,
    #[serde(default)]
    pub message: Option<String>,
}
