//! HTTP requests and responses as plain data, plus the `Transport` seam.
//!
//! # Design
//! The core never opens a socket. `BookClient` produces `HttpRequest` values,
//! the host executes them however it likes, and hands back an `HttpResponse`.
//! `Transport` is the optional blocking seam used by `Synchronizer`'s
//! convenience methods; the CLI implements it with ureq, tests implement it
//! with closures.
//!
//! All fields are owned so values can be moved across the FFI boundary.

use crate::error::ApiError;

/// HTTP method for a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
}

impl HttpMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Delete => "DELETE",
        }
    }
}

/// A request built by `BookClient`. `path` is the absolute URL.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub path: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<String>,
}

/// A settled response handed back by the host.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl HttpResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            headers: Vec::new(),
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Executes one request and waits for it to settle.
///
/// Non-2xx statuses are *not* transport errors: implementations must return
/// them as `Ok(HttpResponse)` so the client can read the error body. Only
/// failures to get any response at all (connect, timeout, TLS) map to
/// `ApiError::Transport`.
pub trait Transport {
    fn execute(&self, request: HttpRequest) -> Result<HttpResponse, ApiError>;
}

impl<F> Transport for F
where
    F: Fn(HttpRequest) -> Result<HttpResponse, ApiError>,
{
    fn execute(&self, request: HttpRequest) -> Result<HttpResponse, ApiError> {
        self(request)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_covers_the_whole_2xx_range() {
        assert!(HttpResponse::new(200, "").is_success());
        assert!(HttpResponse::new(201, "").is_success());
        assert!(HttpResponse::new(204, "").is_success());
        assert!(!HttpResponse::new(199, "").is_success());
        assert!(!HttpResponse::new(300, "").is_success());
        assert!(!HttpResponse::new(404, "").is_success());
    }

    #[test]
    fn closures_are_transports() {
        let transport = |req: HttpRequest| -> Result<HttpResponse, ApiError> {
            Ok(HttpResponse::new(200, req.path))
        };
        let resp = transport
            .execute(HttpRequest {
                method: HttpMethod::Get,
                path: "http://x/books".to_string(),
                headers: Vec::new(),
                body: None,
            })
            .unwrap();
        assert_eq!(resp.body, "http://x/books");
    }
}
