//! `#[repr(C)]` types for the FFI boundary.
//!
//! # Design
//! Each type mirrors a core type with C-compatible fields: `*mut c_char`
//! instead of `String`, pointer + length instead of `Vec`, explicit enum
//! discriminants. Everything returned to C is wrapped in one `FfiResult`
//! envelope whose `data_tag` says what `data` points to, so a single
//! `books_free_result` can release any of it.

use std::ffi::{c_void, CStr, CString};
use std::os::raw::c_char;

use books_core::{
    ApiError, Book, BookForm, FieldErrors, HttpMethod, HttpRequest, Notification,
    NotificationKind, SyncError, Synchronizer,
};

/// Opaque handle to a `Synchronizer`.
pub struct FfiSync {
    pub(crate) inner: Synchronizer,
}

// ---------------------------------------------------------------------------
// String helpers
// ---------------------------------------------------------------------------

/// Allocate a C string. Interior NULs are dropped rather than failing.
pub(crate) fn c_string(s: impl Into<String>) -> *mut c_char {
    let mut s: String = s.into();
    s.retain(|c| c != '\0');
    CString::new(s).unwrap_or_default().into_raw()
}

pub(crate) fn c_string_opt(s: Option<&str>) -> *mut c_char {
    s.map(|s| c_string(s)).unwrap_or(std::ptr::null_mut())
}

/// Read a caller-owned C string. Null reads as `None`; invalid UTF-8 is
/// replaced rather than rejected.
///
/// # Safety
/// `ptr` must be null or point to a NUL-terminated string.
pub(crate) unsafe fn read_str(ptr: *const c_char) -> Option<String> {
    if ptr.is_null() {
        return None;
    }
    Some(unsafe { CStr::from_ptr(ptr) }.to_string_lossy().into_owned())
}

/// # Safety
/// `ptr` must be null or have come from `c_string`.
pub(crate) unsafe fn free_c_string(ptr: *mut c_char) {
    if !ptr.is_null() {
        drop(unsafe { CString::from_raw(ptr) });
    }
}

// ---------------------------------------------------------------------------
// Requests
// ---------------------------------------------------------------------------

#[repr(C)]
pub enum FfiHttpMethod {
    Get = 0,
    Post = 1,
    Put = 2,
    Delete = 3,
}

impl From<HttpMethod> for FfiHttpMethod {
    fn from(m: HttpMethod) -> Self {
        match m {
            HttpMethod::Get => FfiHttpMethod::Get,
            HttpMethod::Post => FfiHttpMethod::Post,
            HttpMethod::Put => FfiHttpMethod::Put,
            HttpMethod::Delete => FfiHttpMethod::Delete,
        }
    }
}

#[repr(C)]
pub struct FfiHeader {
    pub key: *mut c_char,
    pub value: *mut c_char,
}

/// A request the host must execute, then report back through
/// `books_sync_complete` or `books_sync_fail`.
#[repr(C)]
pub struct FfiHttpRequest {
    pub method: FfiHttpMethod,
    pub path: *mut c_char,
    pub headers: *mut FfiHeader,
    pub headers_len: u32,
    pub body: *mut c_char,
}

impl FfiHttpRequest {
    pub(crate) fn from_core(req: HttpRequest) -> Self {
        let headers_len = req.headers.len() as u32;
        let headers: Vec<FfiHeader> = req
            .headers
            .into_iter()
            .map(|(k, v)| FfiHeader {
                key: c_string(k),
                value: c_string(v),
            })
            .collect();
        FfiHttpRequest {
            method: req.method.into(),
            path: c_string(req.path),
            headers: leak_vec(headers),
            headers_len,
            body: c_string_opt(req.body.as_deref()),
        }
    }

    /// # Safety
    /// Must only be called once, on a value built by `from_core`.
    pub(crate) unsafe fn free_fields(&self) {
        unsafe {
            free_c_string(self.path);
            free_c_string(self.body);
            for header in take_vec(self.headers, self.headers_len) {
                free_c_string(header.key);
                free_c_string(header.value);
            }
        }
    }
}

/// A settled response, built by the host on its own stack. Read, never freed.
#[repr(C)]
pub struct FfiHttpResponse {
    pub status: u16,
    pub body: *const c_char,
}

// ---------------------------------------------------------------------------
// Books and forms
// ---------------------------------------------------------------------------

/// Raw form input. Null fields read as empty text.
#[repr(C)]
pub struct FfiBookForm {
    pub title: *const c_char,
    pub author: *const c_char,
    pub genre: *const c_char,
    pub price: *const c_char,
    pub published_year: *const c_char,
    pub description: *const c_char,
    pub in_stock: bool,
}

impl FfiBookForm {
    /// # Safety
    /// Every non-null field must point to a NUL-terminated string.
    pub(crate) unsafe fn to_core(&self) -> BookForm {
        let text = |ptr| unsafe { read_str(ptr) }.unwrap_or_default();
        BookForm {
            title: text(self.title),
            author: text(self.author),
            genre: text(self.genre),
            price: text(self.price),
            published_year: text(self.published_year),
            description: text(self.description),
            in_stock: self.in_stock,
        }
    }
}

/// A form prefilled from an existing book, owned by the library. Every field
/// is non-null text, with price and year already rendered; a missing year or
/// genre is an empty string.
#[repr(C)]
pub struct FfiEditForm {
    pub title: *mut c_char,
    pub author: *mut c_char,
    pub genre: *mut c_char,
    pub price: *mut c_char,
    pub published_year: *mut c_char,
    pub description: *mut c_char,
    pub in_stock: bool,
}

impl FfiEditForm {
    pub(crate) fn from_core(form: &BookForm) -> Self {
        FfiEditForm {
            title: c_string(form.title.as_str()),
            author: c_string(form.author.as_str()),
            genre: c_string(form.genre.as_str()),
            price: c_string(form.price.as_str()),
            published_year: c_string(form.published_year.as_str()),
            description: c_string(form.description.as_str()),
            in_stock: form.in_stock,
        }
    }

    /// # Safety
    /// Must only be called once, on a value built by `from_core`.
    pub(crate) unsafe fn free_fields(&self) {
        unsafe {
            free_c_string(self.title);
            free_c_string(self.author);
            free_c_string(self.genre);
            free_c_string(self.price);
            free_c_string(self.published_year);
            free_c_string(self.description);
        }
    }
}

/// A book exposed to C. Absent optionals are null; absent year is -1.
#[repr(C)]
pub struct FfiBook {
    pub id: *mut c_char,
    pub title: *mut c_char,
    pub author: *mut c_char,
    pub genre: *mut c_char,
    pub price: f64,
    pub published_year: i32,
    pub description: *mut c_char,
    pub in_stock: bool,
}

impl FfiBook {
    pub(crate) fn from_core(book: &Book) -> Self {
        FfiBook {
            id: c_string(book.id.as_str()),
            title: c_string(book.title.as_str()),
            author: c_string(book.author.as_str()),
            genre: c_string_opt(book.genre.as_deref()),
            price: book.price,
            published_year: book.published_year.map(i32::from).unwrap_or(-1),
            description: c_string_opt(book.description.as_deref()),
            in_stock: book.in_stock,
        }
    }

    /// # Safety
    /// Must only be called once, on a value built by `from_core`.
    pub(crate) unsafe fn free_fields(&self) {
        unsafe {
            free_c_string(self.id);
            free_c_string(self.title);
            free_c_string(self.author);
            free_c_string(self.genre);
            free_c_string(self.description);
        }
    }
}

#[repr(C)]
pub struct FfiBookList {
    pub items: *mut FfiBook,
    pub len: u32,
}

#[repr(C)]
pub struct FfiFieldError {
    pub field: *mut c_char,
    pub message: *mut c_char,
}

#[repr(C)]
pub struct FfiFieldErrorList {
    pub items: *mut FfiFieldError,
    pub len: u32,
}

#[repr(C)]
pub enum FfiNotificationKind {
    Success = 0,
    Error = 1,
}

#[repr(C)]
pub struct FfiNotification {
    pub kind: FfiNotificationKind,
    pub message: *mut c_char,
    /// Milliseconds until the notification should disappear.
    pub remaining_ms: u64,
}

// ---------------------------------------------------------------------------
// Result envelope
// ---------------------------------------------------------------------------

#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FfiErrorCode {
    Ok = 0,
    NotFound = 1,
    Http = 2,
    Deserialization = 3,
    Serialization = 4,
    Transport = 5,
    Busy = 6,
    NothingInFlight = 7,
    MissingIdentifier = 8,
    UnknownBook = 9,
    EditInProgress = 10,
    NoPendingDeletion = 11,
    Invalid = 12,
    Panic = 13,
    NullArg = 14,
}

/// Tells `books_free_result` what `FfiResult::data` points to.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FfiDataTag {
    None = 0,
    Request = 1,
    Form = 2,
    BookList = 3,
    FieldErrors = 4,
    Notification = 5,
    Text = 6,
}

/// Envelope for every call that can fail or return data.
///
/// On success `error_code` is `Ok` and `error_message` is null. On failure
/// `error_message` is a human-readable string; for failures settled by
/// `books_sync_complete` or `books_sync_fail` it is the same text the
/// synchronizer put in its notification. `Invalid` failures carry the
/// per-field messages as `FieldErrors` data.
#[repr(C)]
pub struct FfiResult {
    pub error_code: FfiErrorCode,
    pub error_message: *mut c_char,
    pub http_status: u16,
    pub data_tag: FfiDataTag,
    pub data: *mut c_void,
}

impl FfiResult {
    fn boxed(
        error_code: FfiErrorCode,
        error_message: *mut c_char,
        http_status: u16,
        data_tag: FfiDataTag,
        data: *mut c_void,
    ) -> *mut Self {
        Box::into_raw(Box::new(FfiResult {
            error_code,
            error_message,
            http_status,
            data_tag,
            data,
        }))
    }

    fn ok(data_tag: FfiDataTag, data: *mut c_void) -> *mut Self {
        Self::boxed(FfiErrorCode::Ok, std::ptr::null_mut(), 0, data_tag, data)
    }

    pub(crate) fn ok_empty() -> *mut Self {
        Self::ok(FfiDataTag::None, std::ptr::null_mut())
    }

    pub(crate) fn ok_request(req: HttpRequest) -> *mut Self {
        let data = Box::into_raw(Box::new(FfiHttpRequest::from_core(req)));
        Self::ok(FfiDataTag::Request, data as *mut c_void)
    }

    pub(crate) fn ok_form(form: &BookForm) -> *mut Self {
        let data = Box::into_raw(Box::new(FfiEditForm::from_core(form)));
        Self::ok(FfiDataTag::Form, data as *mut c_void)
    }

    pub(crate) fn ok_book_list(books: &[Book]) -> *mut Self {
        let items: Vec<FfiBook> = books.iter().map(FfiBook::from_core).collect();
        let list = FfiBookList {
            len: items.len() as u32,
            items: leak_vec(items),
        };
        let data = Box::into_raw(Box::new(list));
        Self::ok(FfiDataTag::BookList, data as *mut c_void)
    }

    pub(crate) fn ok_notification(notification: &Notification, remaining_ms: u64) -> *mut Self {
        let kind = match notification.kind() {
            NotificationKind::Success => FfiNotificationKind::Success,
            NotificationKind::Error => FfiNotificationKind::Error,
        };
        let data = Box::into_raw(Box::new(FfiNotification {
            kind,
            message: c_string(notification.message()),
            remaining_ms,
        }));
        Self::ok(FfiDataTag::Notification, data as *mut c_void)
    }

    pub(crate) fn ok_text(text: String) -> *mut Self {
        Self::ok(FfiDataTag::Text, c_string(text) as *mut c_void)
    }

    pub(crate) fn from_error(err: SyncError) -> *mut Self {
        Self::from_error_reported(err, None)
    }

    /// `reported` is the text the user was already shown for a remote
    /// failure, if any. Without it the generic error text is used.
    pub(crate) fn from_error_reported(err: SyncError, reported: Option<&str>) -> *mut Self {
        let message = c_string(match (&err, reported) {
            (SyncError::Remote(_), Some(text)) => text.to_string(),
            (other, _) => other.to_string(),
        });
        let (code, status) = match &err {
            SyncError::Remote(api) => (api_error_code(api), api.status().unwrap_or(0)),
            SyncError::Busy => (FfiErrorCode::Busy, 0),
            SyncError::NothingInFlight => (FfiErrorCode::NothingInFlight, 0),
            SyncError::MissingIdentifier => (FfiErrorCode::MissingIdentifier, 0),
            SyncError::UnknownBook(_) => (FfiErrorCode::UnknownBook, 0),
            SyncError::EditInProgress => (FfiErrorCode::EditInProgress, 0),
            SyncError::NoPendingDeletion => (FfiErrorCode::NoPendingDeletion, 0),
            SyncError::Invalid(errors) => {
                let data = field_error_list(errors);
                return Self::boxed(
                    FfiErrorCode::Invalid,
                    message,
                    0,
                    FfiDataTag::FieldErrors,
                    data as *mut c_void,
                );
            }
        };
        Self::boxed(code, message, status, FfiDataTag::None, std::ptr::null_mut())
    }

    pub(crate) fn null_arg(name: &str) -> *mut Self {
        Self::boxed(
            FfiErrorCode::NullArg,
            c_string(format!("null argument: {name}")),
            0,
            FfiDataTag::None,
            std::ptr::null_mut(),
        )
    }

    pub(crate) fn panic(msg: &str) -> *mut Self {
        Self::boxed(
            FfiErrorCode::Panic,
            c_string(msg),
            0,
            FfiDataTag::None,
            std::ptr::null_mut(),
        )
    }

    /// Release `data` according to `data_tag`.
    ///
    /// # Safety
    /// Must only be called once, on a result built by this module.
    pub(crate) unsafe fn free_data(&self) {
        if self.data.is_null() {
            return;
        }
        unsafe {
            match self.data_tag {
                FfiDataTag::None => {}
                FfiDataTag::Request => {
                    let req = Box::from_raw(self.data as *mut FfiHttpRequest);
                    req.free_fields();
                }
                FfiDataTag::BookList => {
                    let list = Box::from_raw(self.data as *mut FfiBookList);
                    for book in take_vec(list.items, list.len) {
                        book.free_fields();
                    }
                }
                FfiDataTag::FieldErrors => {
                    let list = Box::from_raw(self.data as *mut FfiFieldErrorList);
                    for item in take_vec(list.items, list.len) {
                        free_c_string(item.field);
                        free_c_string(item.message);
                    }
                }
                FfiDataTag::Notification => {
                    let notification = Box::from_raw(self.data as *mut FfiNotification);
                    free_c_string(notification.message);
                }
                FfiDataTag::Text => free_c_string(self.data as *mut c_char),
                FfiDataTag::Form => {
                    let form = Box::from_raw(self.data as *mut FfiEditForm);
                    form.free_fields();
                }
            }
        }
    }
}

fn api_error_code(err: &ApiError) -> FfiErrorCode {
    match err {
        ApiError::NotFound => FfiErrorCode::NotFound,
        ApiError::Http { .. } => FfiErrorCode::Http,
        ApiError::Deserialization(_) => FfiErrorCode::Deserialization,
        ApiError::Serialization(_) => FfiErrorCode::Serialization,
        ApiError::Transport(_) => FfiErrorCode::Transport,
    }
}

fn field_error_list(errors: &FieldErrors) -> *mut FfiFieldErrorList {
    let items: Vec<FfiFieldError> = errors
        .iter()
        .map(|(field, message)| FfiFieldError {
            field: c_string(field.name()),
            message: c_string(message),
        })
        .collect();
    Box::into_raw(Box::new(FfiFieldErrorList {
        len: items.len() as u32,
        items: leak_vec(items),
    }))
}

// ---------------------------------------------------------------------------
// Vec <-> pointer + length
// ---------------------------------------------------------------------------

/// Hand a vector to C as an exact-size buffer. Empty vectors become null.
fn leak_vec<T>(items: Vec<T>) -> *mut T {
    if items.is_empty() {
        return std::ptr::null_mut();
    }
    Box::into_raw(items.into_boxed_slice()) as *mut T
}

/// # Safety
/// `ptr`/`len` must come from `leak_vec` and not have been reclaimed.
unsafe fn take_vec<T>(ptr: *mut T, len: u32) -> Vec<T> {
    if ptr.is_null() || len == 0 {
        return Vec::new();
    }
    let slice = std::ptr::slice_from_raw_parts_mut(ptr, len as usize);
    unsafe { Box::from_raw(slice) }.into_vec()
}
