//! Stateless HTTP request builder and response parser for the books API.
//!
//! # Design
//! `BookClient` holds only a `base_url`. Each remote operation is a
//! `build_*` method producing an `HttpRequest` and a `parse_*` method
//! consuming the settled `HttpResponse`. The synchronizer sits on top and
//! owns all state; this layer only knows the wire contract.

use serde::de::DeserializeOwned;

use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::types::{Book, BookPayload, Envelope};

#[derive(Debug, Clone)]
pub struct BookClient {
    base_url: String,
}

impl BookClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn build_list_books(&self) -> HttpRequest {
        HttpRequest {
            method: HttpMethod::Get,
            path: format!("{}/books", self.base_url),
            headers: Vec::new(),
            body: None,
        }
    }

    pub fn build_create_book(&self, payload: &BookPayload) -> Result<HttpRequest, ApiError> {
        Ok(HttpRequest {
            method: HttpMethod::Post,
            path: format!("{}/books", self.base_url),
            headers: json_headers(),
            body: Some(to_json(payload)?),
        })
    }

    pub fn build_update_book(
        &self,
        id: &str,
        payload: &BookPayload,
    ) -> Result<HttpRequest, ApiError> {
        Ok(HttpRequest {
            method: HttpMethod::Put,
            path: format!("{}/books/{id}", self.base_url),
            headers: json_headers(),
            body: Some(to_json(payload)?),
        })
    }

    pub fn build_delete_book(&self, id: &str) -> HttpRequest {
        HttpRequest {
            method: HttpMethod::Delete,
            path: format!("{}/books/{id}", self.base_url),
            headers: Vec::new(),
            body: None,
        }
    }

    /// A list response without `data` yields an empty collection.
    pub fn parse_list_books(&self, response: HttpResponse) -> Result<Vec<Book>, ApiError> {
        check_status(&response)?;
        let envelope: Envelope<Vec<Book>> = from_json(&response.body)?;
        Ok(envelope.data.unwrap_or_default())
    }

    pub fn parse_create_book(&self, response: HttpResponse) -> Result<Book, ApiError> {
        check_status(&response)?;
        single_book(&response.body)
    }

    pub fn parse_update_book(&self, response: HttpResponse) -> Result<Book, ApiError> {
        check_status(&response)?;
        single_book(&response.body)
    }

    /// The body of a successful delete is ignored.
    pub fn parse_delete_book(&self, response: HttpResponse) -> Result<(), ApiError> {
        check_status(&response)
    }
}

fn json_headers() -> Vec<(String, String)> {
    vec![("content-type".to_string(), "application/json".to_string())]
}

fn to_json(payload: &BookPayload) -> Result<String, ApiError> {
    serde_json::to_string(payload).map_err(|e| ApiError::Serialization(e.to_string()))
}

fn from_json<T: DeserializeOwned>(body: &str) -> Result<T, ApiError> {
    serde_json::from_str(body).map_err(|e| ApiError::Deserialization(e.to_string()))
}

fn single_book(body: &str) -> Result<Book, ApiError> {
    let envelope: Envelope<Book> = from_json(body)?;
    envelope
        .data
        .ok_or_else(|| ApiError::Deserialization("response carried no data".to_string()))
}

/// Any 2xx is success; 404 gets its own variant.
fn check_status(response: &HttpResponse) -> Result<(), ApiError> {
    if response.is_success() {
        return Ok(());
    }
    if response.status == 404 {
        return Err(ApiError::NotFound);
    }
    Err(ApiError::Http {
        status: response.status,
        body: response.body.clone(),
    })
}
