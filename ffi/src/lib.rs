//! C-ABI wrapper around the `books-core` synchronizer.
//!
//! # Overview
//! A host UI written in any language with a C FFI can keep a local book list
//! in step with the remote collection without linking an HTTP stack into
//! Rust: the library hands out requests, the host executes them and reports
//! the responses back.
//!
//! # Design
//! - Every `extern "C"` function wraps its body in `catch_unwind` so panics
//!   never cross the FFI boundary.
//! - One `books_sync_begin_*` per operation returns the request to execute;
//!   a single `books_sync_complete` (or `books_sync_fail` when no response
//!   arrived) settles whichever request is in flight.
//! - All data and errors travel in the `FfiResult` envelope. The caller owns
//!   every returned pointer and releases it with `books_free_result`.

pub mod types;

use std::os::raw::c_char;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::time::Instant;

use books_core::{ApiError, HttpResponse, Synchronizer};

use types::*;

/// Run `f` against a live handle, converting null handles and panics into
/// error results.
fn with_sync(
    sync: *mut FfiSync,
    context: &str,
    f: impl FnOnce(&mut Synchronizer) -> *mut FfiResult,
) -> *mut FfiResult {
    if sync.is_null() {
        return FfiResult::null_arg("sync");
    }
    catch_unwind(AssertUnwindSafe(|| {
        let sync = unsafe { &mut *sync };
        f(&mut sync.inner)
    }))
    .unwrap_or_else(|_| FfiResult::panic(&format!("panic in {context}")))
}

/// Read a required string argument or bail out with `NullArg`.
macro_rules! required_str {
    ($ptr:expr, $name:literal) => {
        match unsafe { read_str($ptr) } {
            Some(value) => value,
            None => return FfiResult::null_arg($name),
        }
    };
}

// ---------------------------------------------------------------------------
// Lifecycle
// ---------------------------------------------------------------------------

/// Create a synchronizer bound to `base_url`.
///
/// Returns null if `base_url` is null or if an internal panic occurs.
/// The caller must free the handle with `books_sync_free`.
#[unsafe(no_mangle)]
pub extern "C" fn books_sync_new(base_url: *const c_char) -> *mut FfiSync {
    catch_unwind(|| {
        let Some(url) = (unsafe { read_str(base_url) }) else {
            return std::ptr::null_mut();
        };
        let inner = Synchronizer::new(&url);
        Box::into_raw(Box::new(FfiSync { inner }))
    })
    .unwrap_or(std::ptr::null_mut())
}

/// Free a handle created by `books_sync_new`. Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn books_sync_free(sync: *mut FfiSync) {
    if !sync.is_null() {
        let _ = catch_unwind(|| {
            drop(unsafe { Box::from_raw(sync) });
        });
    }
}

// ---------------------------------------------------------------------------
// Begin a remote operation
// ---------------------------------------------------------------------------

/// Begin reloading the whole collection. Data: `Request`.
#[unsafe(no_mangle)]
pub extern "C" fn books_sync_begin_load(sync: *mut FfiSync) -> *mut FfiResult {
    with_sync(sync, "books_sync_begin_load", |s| match s.begin_load() {
        Ok(req) => FfiResult::ok_request(req),
        Err(e) => FfiResult::from_error(e),
    })
}

/// Validate `form` and begin a create, or an update when a book is being
/// edited. Data: `Request`, or `FieldErrors` with code `Invalid`.
#[unsafe(no_mangle)]
pub extern "C" fn books_sync_begin_submit(
    sync: *mut FfiSync,
    form: *const FfiBookForm,
) -> *mut FfiResult {
    if form.is_null() {
        return FfiResult::null_arg("form");
    }
    with_sync(sync, "books_sync_begin_submit", |s| {
        let form = unsafe { (*form).to_core() };
        match s.begin_submit(&form) {
            Ok(req) => FfiResult::ok_request(req),
            Err(e) => FfiResult::from_error(e),
        }
    })
}

/// Begin deleting the book with identifier `id`. Data: `Request`.
#[unsafe(no_mangle)]
pub extern "C" fn books_sync_begin_delete(sync: *mut FfiSync, id: *const c_char) -> *mut FfiResult {
    with_sync(sync, "books_sync_begin_delete", |s| {
        let id = required_str!(id, "id");
        match s.begin_delete(&id) {
            Ok(req) => FfiResult::ok_request(req),
            Err(e) => FfiResult::from_error(e),
        }
    })
}

/// Begin deleting the staged book. Data: `Request`.
#[unsafe(no_mangle)]
pub extern "C" fn books_sync_begin_confirmed_deletion(sync: *mut FfiSync) -> *mut FfiResult {
    with_sync(sync, "books_sync_begin_confirmed_deletion", |s| {
        match s.begin_confirmed_deletion() {
            Ok(req) => FfiResult::ok_request(req),
            Err(e) => FfiResult::from_error(e),
        }
    })
}

// ---------------------------------------------------------------------------
// Settle the operation in flight
// ---------------------------------------------------------------------------

/// Report the response to the request in flight. A null body reads as empty.
#[unsafe(no_mangle)]
pub extern "C" fn books_sync_complete(
    sync: *mut FfiSync,
    response: *const FfiHttpResponse,
) -> *mut FfiResult {
    if response.is_null() {
        return FfiResult::null_arg("response");
    }
    with_sync(sync, "books_sync_complete", |s| {
        let resp = unsafe { &*response };
        let body = unsafe { read_str(resp.body) }.unwrap_or_default();
        match s.complete(Ok(HttpResponse::new(resp.status, body))) {
            Ok(_) => FfiResult::ok_empty(),
            Err(e) => FfiResult::from_error_reported(e, s.notification().map(|n| n.message())),
        }
    })
}

/// Report that the request in flight got no response at all. `message` is
/// what the user will see; null uses a generic text.
#[unsafe(no_mangle)]
pub extern "C" fn books_sync_fail(sync: *mut FfiSync, message: *const c_char) -> *mut FfiResult {
    with_sync(sync, "books_sync_fail", |s| {
        let message = unsafe { read_str(message) }.unwrap_or_else(|| "Network Error".to_string());
        match s.complete(Err(ApiError::Transport(message))) {
            Ok(_) => FfiResult::ok_empty(),
            Err(e) => FfiResult::from_error_reported(e, s.notification().map(|n| n.message())),
        }
    })
}

// ---------------------------------------------------------------------------
// Local state
// ---------------------------------------------------------------------------

/// Snapshot of the local list. Data: `BookList`.
#[unsafe(no_mangle)]
pub extern "C" fn books_sync_books(sync: *mut FfiSync) -> *mut FfiResult {
    with_sync(sync, "books_sync_books", |s| FfiResult::ok_book_list(s.books()))
}

/// The visible notification, if any. Data: `Notification` or `None`.
#[unsafe(no_mangle)]
pub extern "C" fn books_sync_notification(sync: *mut FfiSync) -> *mut FfiResult {
    with_sync(sync, "books_sync_notification", |s| {
        let now = Instant::now();
        match s.notification_at(now) {
            Some(n) => {
                let remaining = n.expires_at().saturating_duration_since(now);
                FfiResult::ok_notification(n, remaining.as_millis() as u64)
            }
            None => FfiResult::ok_empty(),
        }
    })
}

/// True while a request is in flight. False for a null handle.
#[unsafe(no_mangle)]
pub extern "C" fn books_sync_is_loading(sync: *const FfiSync) -> bool {
    if sync.is_null() {
        return false;
    }
    catch_unwind(AssertUnwindSafe(|| unsafe { &*sync }.inner.is_loading())).unwrap_or(false)
}

/// Target a book for editing. Data: `Form`, the edit form prefilled from
/// the book with price and year rendered as text.
#[unsafe(no_mangle)]
pub extern "C" fn books_sync_begin_edit(sync: *mut FfiSync, id: *const c_char) -> *mut FfiResult {
    with_sync(sync, "books_sync_begin_edit", |s| {
        let id = required_str!(id, "id");
        match s.begin_edit(&id) {
            Ok(form) => FfiResult::ok_form(&form),
            Err(e) => FfiResult::from_error(e),
        }
    })
}

#[unsafe(no_mangle)]
pub extern "C" fn books_sync_cancel_edit(sync: *mut FfiSync) -> *mut FfiResult {
    with_sync(sync, "books_sync_cancel_edit", |s| {
        s.cancel_edit();
        FfiResult::ok_empty()
    })
}

/// Stage a book for deletion. Data: `Text`, the confirmation prompt.
#[unsafe(no_mangle)]
pub extern "C" fn books_sync_stage_deletion(sync: *mut FfiSync, id: *const c_char) -> *mut FfiResult {
    with_sync(sync, "books_sync_stage_deletion", |s| {
        let id = required_str!(id, "id");
        match s.stage_deletion(&id) {
            Ok(pending) => FfiResult::ok_text(pending.prompt()),
            Err(e) => FfiResult::from_error(e),
        }
    })
}

#[unsafe(no_mangle)]
pub extern "C" fn books_sync_cancel_deletion(sync: *mut FfiSync) -> *mut FfiResult {
    with_sync(sync, "books_sync_cancel_deletion", |s| {
        s.cancel_deletion();
        FfiResult::ok_empty()
    })
}

// ---------------------------------------------------------------------------
// Free functions
// ---------------------------------------------------------------------------

/// Free any `FfiResult` returned by this library. Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn books_free_result(result: *mut FfiResult) {
    if result.is_null() {
        return;
    }
    let _ = catch_unwind(|| {
        let result = unsafe { Box::from_raw(result) };
        unsafe {
            free_c_string(result.error_message);
            result.free_data();
        }
    });
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
