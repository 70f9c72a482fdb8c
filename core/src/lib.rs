//! Sans-IO client core for a remote book collection.
//!
//! # Overview
//! Keeps an in-memory list of books in step with a REST collection
//! (`GET/POST /books`, `PUT/DELETE /books/{id}`), validates book forms before
//! anything is sent, and tracks the transient state a front-end needs around
//! that: request in flight, edit target, deletion awaiting confirmation, and
//! a short-lived notification.
//!
//! # Design
//! - `BookClient` is stateless: `build_*` produces an `HttpRequest`,
//!   `parse_*` consumes an `HttpResponse`. The host does the I/O.
//! - `Synchronizer` owns the local mirror. Its `begin_*` / `complete` pairs
//!   keep it I/O-free too; the `Transport` trait lets blocking hosts drive a
//!   whole operation in one call.
//! - DTOs are defined independently from the mock-server crate; integration
//!   tests catch schema drift.

pub mod client;
pub mod error;
pub mod http;
pub mod notification;
pub mod sync;
pub mod types;
pub mod validation;

pub use client::BookClient;
pub use error::{ApiError, SyncError};
pub use http::{HttpMethod, HttpRequest, HttpResponse, Transport};
pub use notification::{Notification, NotificationKind, NOTIFICATION_LIFETIME};
pub use sync::{Applied, Operation, PendingDeletion, Synchronizer};
pub use types::{Book, BookPayload};
pub use validation::{BookForm, Field, FieldErrors};
