//! Local mirror of the remote book collection.
//!
//! # Design
//! `Synchronizer` owns the in-memory list plus the transient UI state around
//! it: the request in flight, the edit target, the deletion awaiting
//! confirmation, and the latest notification.
//!
//! Like `BookClient` it never performs I/O. Every remote operation is a
//! `begin_*` call that checks local state and returns the `HttpRequest` to
//! execute, followed by one `complete` call with whatever the host got back.
//! The local list is only mutated inside `complete`, and only on success, so
//! a failed request leaves nothing to roll back.
//!
//! Requests are serialized: while one is in flight every `begin_*` returns
//! `SyncError::Busy` without touching state. Hosts that can block may use
//! `load`/`create`/`update`/`delete`/`submit`/`confirm_deletion`, which run
//! begin, `Transport::execute` and `complete` back to back.

use std::time::Instant;

use tracing::{debug, info, warn};

use crate::client::BookClient;
use crate::error::{ApiError, SyncError};
use crate::http::{HttpRequest, HttpResponse, Transport};
use crate::notification::Notification;
use crate::types::{Book, BookPayload};
use crate::validation::BookForm;

pub const CREATED_MESSAGE: &str = "Book added successfully";
pub const UPDATED_MESSAGE: &str = "Book updated";
pub const DELETED_MESSAGE: &str = "Book deleted";

/// The remote operation currently awaiting its response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operation {
    Load,
    Create,
    Update { id: String },
    Delete { id: String },
}

/// What a successful `complete` changed locally.
#[derive(Debug, Clone, PartialEq)]
pub enum Applied {
    /// The list was replaced; carries the new length.
    Loaded(usize),
    /// The book now at index 0.
    Created(Book),
    /// The canonical record that replaced the local one.
    Updated(Book),
    /// Identifier of the removed book.
    Deleted(String),
}

/// A book staged for deletion, waiting for the user to confirm.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingDeletion {
    book: Book,
}

impl PendingDeletion {
    pub fn book(&self) -> &Book {
        &self.book
    }

    pub fn prompt(&self) -> String {
        format!("Are you sure you want to delete \"{}\"?", self.book.title)
    }
}

#[derive(Debug)]
pub struct Synchronizer {
    client: BookClient,
    books: Vec<Book>,
    in_flight: Option<Operation>,
    editing: Option<Book>,
    pending_deletion: Option<PendingDeletion>,
    notification: Option<Notification>,
}

impl Synchronizer {
    pub fn new(base_url: &str) -> Self {
        Self::with_client(BookClient::new(base_url))
    }

    pub fn with_client(client: BookClient) -> Self {
        Self {
            client,
            books: Vec::new(),
            in_flight: None,
            editing: None,
            pending_deletion: None,
            notification: None,
        }
    }

    pub fn client(&self) -> &BookClient {
        &self.client
    }

    pub fn books(&self) -> &[Book] {
        &self.books
    }

    pub fn find(&self, id: &str) -> Option<&Book> {
        self.books.iter().find(|book| book.id == id)
    }

    pub fn in_flight(&self) -> Option<&Operation> {
        self.in_flight.as_ref()
    }

    pub fn is_loading(&self) -> bool {
        self.in_flight.is_some()
    }

    pub fn editing(&self) -> Option<&Book> {
        self.editing.as_ref()
    }

    pub fn pending_deletion(&self) -> Option<&PendingDeletion> {
        self.pending_deletion.as_ref()
    }

    /// The latest notification, if it has not expired yet.
    pub fn notification(&self) -> Option<&Notification> {
        self.notification_at(Instant::now())
    }

    pub fn notification_at(&self, now: Instant) -> Option<&Notification> {
        self.notification
            .as_ref()
            .filter(|notification| notification.is_visible_at(now))
    }

    pub fn dismiss_notification(&mut self) {
        self.notification = None;
    }

    // --- edit target ---

    /// Target `id` for editing and return a form prefilled from it. Replaces
    /// any previous edit target.
    pub fn begin_edit(&mut self, id: &str) -> Result<BookForm, SyncError> {
        let book = self.lookup(id)?.clone();
        let form = BookForm::from(&book);
        debug!(id, "editing book");
        self.editing = Some(book);
        Ok(form)
    }

    pub fn cancel_edit(&mut self) {
        self.editing = None;
    }

    // --- delete confirmation ---

    pub fn stage_deletion(&mut self, id: &str) -> Result<&PendingDeletion, SyncError> {
        let book = self.lookup(id)?.clone();
        Ok(self.pending_deletion.insert(PendingDeletion { book }))
    }

    pub fn cancel_deletion(&mut self) {
        self.pending_deletion = None;
    }

    // --- begin ---

    pub fn begin_load(&mut self) -> Result<HttpRequest, SyncError> {
        self.ensure_idle()?;
        let request = self.client.build_list_books();
        self.start(Operation::Load, request)
    }

    /// Refused while a book is being edited: the create and edit forms are
    /// mutually exclusive.
    pub fn begin_create(&mut self, payload: &BookPayload) -> Result<HttpRequest, SyncError> {
        self.ensure_idle()?;
        if self.editing.is_some() {
            return Err(SyncError::EditInProgress);
        }
        let request = self.client.build_create_book(payload)?;
        self.start(Operation::Create, request)
    }

    pub fn begin_update(
        &mut self,
        id: &str,
        payload: &BookPayload,
    ) -> Result<HttpRequest, SyncError> {
        self.ensure_idle()?;
        require_id(id)?;
        let request = self
            .client
            .build_update_book(id, &payload.with_blank_text_cleared())?;
        self.start(Operation::Update { id: id.to_string() }, request)
    }

    pub fn begin_delete(&mut self, id: &str) -> Result<HttpRequest, SyncError> {
        self.ensure_idle()?;
        require_id(id)?;
        let request = self.client.build_delete_book(id);
        self.start(Operation::Delete { id: id.to_string() }, request)
    }

    /// Validate `form` and begin an update of the edit target, or a create
    /// when nothing is being edited. Invalid forms send nothing.
    pub fn begin_submit(&mut self, form: &BookForm) -> Result<HttpRequest, SyncError> {
        self.ensure_idle()?;
        let payload = form.validate().map_err(SyncError::Invalid)?;
        match self.editing.as_ref().map(|book| book.id.clone()) {
            Some(id) => self.begin_update(&id, &payload),
            None => self.begin_create(&payload),
        }
    }

    pub fn begin_confirmed_deletion(&mut self) -> Result<HttpRequest, SyncError> {
        let id = self
            .pending_deletion
            .as_ref()
            .map(|pending| pending.book.id.clone())
            .ok_or(SyncError::NoPendingDeletion)?;
        self.begin_delete(&id)
    }

    // --- complete ---

    /// Apply the settled response of the operation in flight.
    ///
    /// On failure an error notification is raised and local data is left as
    /// it was. A delete clears the pending deletion either way.
    pub fn complete(
        &mut self,
        response: Result<HttpResponse, ApiError>,
    ) -> Result<Applied, SyncError> {
        let operation = self.in_flight.take().ok_or(SyncError::NothingInFlight)?;
        match operation {
            Operation::Load => {
                match response.and_then(|r| self.client.parse_list_books(r)) {
                    Ok(books) => {
                        info!(count = books.len(), "loaded books");
                        self.books = books;
                        Ok(Applied::Loaded(self.books.len()))
                    }
                    Err(err) => Err(self.fail(err, false)),
                }
            }
            Operation::Create => {
                match response.and_then(|r| self.client.parse_create_book(r)) {
                    Ok(book) => {
                        info!(id = %book.id, "created book");
                        self.books.retain(|existing| existing.id != book.id);
                        self.books.insert(0, book.clone());
                        self.notify(Notification::success(CREATED_MESSAGE));
                        Ok(Applied::Created(book))
                    }
                    Err(err) => Err(self.fail(err, true)),
                }
            }
            Operation::Update { id } => {
                match response.and_then(|r| self.client.parse_update_book(r)) {
                    Ok(book) => {
                        info!(%id, "updated book");
                        if let Some(slot) = self.books.iter_mut().find(|b| b.id == id) {
                            *slot = book.clone();
                        }
                        self.editing = None;
                        self.notify(Notification::success(UPDATED_MESSAGE));
                        Ok(Applied::Updated(book))
                    }
                    Err(err) => Err(self.fail(err, true)),
                }
            }
            Operation::Delete { id } => {
                self.pending_deletion = None;
                match response.and_then(|r| self.client.parse_delete_book(r)) {
                    Ok(()) => {
                        info!(%id, "deleted book");
                        self.books.retain(|book| book.id != id);
                        self.notify(Notification::success(DELETED_MESSAGE));
                        Ok(Applied::Deleted(id))
                    }
                    Err(err) => Err(self.fail(err, false)),
                }
            }
        }
    }

    // --- blocking conveniences ---

    pub fn load<T: Transport + ?Sized>(&mut self, transport: &T) -> Result<Applied, SyncError> {
        let request = self.begin_load()?;
        self.run(transport, request)
    }

    pub fn create<T: Transport + ?Sized>(
        &mut self,
        transport: &T,
        payload: &BookPayload,
    ) -> Result<Applied, SyncError> {
        let request = self.begin_create(payload)?;
        self.run(transport, request)
    }

    pub fn update<T: Transport + ?Sized>(
        &mut self,
        transport: &T,
        id: &str,
        payload: &BookPayload,
    ) -> Result<Applied, SyncError> {
        let request = self.begin_update(id, payload)?;
        self.run(transport, request)
    }

    pub fn delete<T: Transport + ?Sized>(
        &mut self,
        transport: &T,
        id: &str,
    ) -> Result<Applied, SyncError> {
        let request = self.begin_delete(id)?;
        self.run(transport, request)
    }

    pub fn submit<T: Transport + ?Sized>(
        &mut self,
        transport: &T,
        form: &BookForm,
    ) -> Result<Applied, SyncError> {
        let request = self.begin_submit(form)?;
        self.run(transport, request)
    }

    pub fn confirm_deletion<T: Transport + ?Sized>(
        &mut self,
        transport: &T,
    ) -> Result<Applied, SyncError> {
        let request = self.begin_confirmed_deletion()?;
        self.run(transport, request)
    }

    // --- internals ---

    fn run<T: Transport + ?Sized>(
        &mut self,
        transport: &T,
        request: HttpRequest,
    ) -> Result<Applied, SyncError> {
        let response = transport.execute(request);
        self.complete(response)
    }

    fn ensure_idle(&self) -> Result<(), SyncError> {
        match &self.in_flight {
            Some(operation) => {
                debug!(?operation, "refusing request while another is in flight");
                Err(SyncError::Busy)
            }
            None => Ok(()),
        }
    }

    fn start(&mut self, operation: Operation, request: HttpRequest) -> Result<HttpRequest, SyncError> {
        debug!(?operation, method = request.method.as_str(), path = %request.path, "request built");
        self.in_flight = Some(operation);
        Ok(request)
    }

    fn lookup(&self, id: &str) -> Result<&Book, SyncError> {
        require_id(id)?;
        self.find(id)
            .ok_or_else(|| SyncError::UnknownBook(id.to_string()))
    }

    /// Raise the error notification for a failed remote call. Create and
    /// update surface the server's first validation message when present.
    fn fail(&mut self, err: ApiError, prefer_validation: bool) -> SyncError {
        let message = if prefer_validation {
            err.user_message()
        } else {
            err.to_string()
        };
        warn!(error = %err, "remote operation failed");
        self.notify(Notification::error(message));
        SyncError::Remote(err)
    }

    fn notify(&mut self, notification: Notification) {
        self.notification = Some(notification);
    }
}

fn require_id(id: &str) -> Result<(), SyncError> {
    if id.is_empty() {
        return Err(SyncError::MissingIdentifier);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::collections::VecDeque;
    use std::time::Duration;

    use super::*;
    use crate::http::HttpMethod;
    use crate::notification::NotificationKind;

    /// Replays canned responses and records every request it was given.
    #[derive(Default)]
    struct Scripted {
        responses: RefCell<VecDeque<Result<HttpResponse, ApiError>>>,
        requests: RefCell<Vec<HttpRequest>>,
    }

    impl Scripted {
        fn reply(self, status: u16, body: &str) -> Self {
            self.responses
                .borrow_mut()
                .push_back(Ok(HttpResponse::new(status, body)));
            self
        }

        fn fail(self, message: &str) -> Self {
            self.responses
                .borrow_mut()
                .push_back(Err(ApiError::Transport(message.to_string())));
            self
        }

        fn sent(&self) -> Vec<HttpRequest> {
            self.requests.borrow().clone()
        }
    }

    impl Transport for Scripted {
        fn execute(&self, request: HttpRequest) -> Result<HttpResponse, ApiError> {
            self.requests.borrow_mut().push(request);
            self.responses
                .borrow_mut()
                .pop_front()
                .expect("no scripted response left")
        }
    }

    const LIST: &str = r#"{"data":[
        {"_id":"b1","title":"Dune","author":"Herbert","price":9.99},
        {"_id":"b2","title":"Emma","author":"Austen","price":4.5,"publishedYear":1815},
        {"_id":"b3","title":"Ulysses","author":"Joyce","price":12}
    ]}"#;

    fn loaded() -> Synchronizer {
        let mut sync = Synchronizer::new("http://api");
        sync.load(&Scripted::default().reply(200, LIST)).unwrap();
        sync
    }

    fn ids(sync: &Synchronizer) -> Vec<&str> {
        sync.books().iter().map(|b| b.id.as_str()).collect()
    }

    fn dune_form() -> BookForm {
        BookForm {
            title: "Dune".to_string(),
            author: "Herbert".to_string(),
            price: "9.99".to_string(),
            ..BookForm::default()
        }
    }

    fn payload(title: &str) -> BookPayload {
        BookPayload {
            title: title.to_string(),
            author: "Someone".to_string(),
            genre: None,
            price: 1.0,
            published_year: None,
            description: None,
            in_stock: true,
        }
    }

    // --- load ---

    #[test]
    fn load_replaces_list_in_response_order() {
        let sync = loaded();
        assert_eq!(ids(&sync), ["b1", "b2", "b3"]);
        assert!(!sync.is_loading());
        assert!(sync.notification().is_none());
    }

    #[test]
    fn load_without_data_yields_empty_list() {
        let mut sync = loaded();
        let applied = sync.load(&Scripted::default().reply(200, "{}")).unwrap();
        assert_eq!(applied, Applied::Loaded(0));
        assert!(sync.books().is_empty());
    }

    #[test]
    fn failed_load_keeps_previous_list_and_notifies() {
        let mut sync = loaded();
        let err = sync
            .load(&Scripted::default().fail("Network Error"))
            .unwrap_err();
        assert!(matches!(err, SyncError::Remote(ApiError::Transport(_))));
        assert_eq!(ids(&sync), ["b1", "b2", "b3"]);

        let n = sync.notification().unwrap();
        assert_eq!(n.kind(), NotificationKind::Error);
        assert_eq!(n.message(), "Network Error");
    }

    #[test]
    fn failed_first_load_leaves_list_empty() {
        let mut sync = Synchronizer::new("http://api");
        assert!(sync.load(&Scripted::default().reply(500, "oops")).is_err());
        assert!(sync.books().is_empty());
        assert_eq!(
            sync.notification().unwrap().message(),
            "request failed with status code 500"
        );
    }

    // --- create ---

    #[test]
    fn create_prepends_server_record() {
        let mut sync = loaded();
        let transport = Scripted::default().reply(
            201,
            r#"{"data":{"_id":"srv-9","title":"Dune","author":"Herbert","price":9.99,"inStock":true}}"#,
        );
        let applied = sync.submit(&transport, &dune_form()).unwrap();

        assert!(matches!(applied, Applied::Created(ref b) if b.id == "srv-9"));
        assert_eq!(sync.books().len(), 4);
        assert_eq!(sync.books()[0].id, "srv-9");

        let sent = transport.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].method, HttpMethod::Post);
        let body: serde_json::Value = serde_json::from_str(sent[0].body.as_deref().unwrap()).unwrap();
        assert_eq!(body["title"], "Dune");
        assert_eq!(body["author"], "Herbert");
        assert_eq!(body["price"], 9.99);
        assert!(body.get("publishedYear").is_none());

        let n = sync.notification().unwrap();
        assert_eq!(n.kind(), NotificationKind::Success);
        assert_eq!(n.message(), CREATED_MESSAGE);
    }

    #[test]
    fn create_never_duplicates_an_identifier() {
        let mut sync = loaded();
        let transport = Scripted::default().reply(
            201,
            r#"{"data":{"_id":"b3","title":"Ulysses","author":"Joyce","price":12}}"#,
        );
        sync.create(&transport, &payload("Ulysses")).unwrap();
        assert_eq!(ids(&sync), ["b3", "b1", "b2"]);
    }

    #[test]
    fn create_failure_uses_first_validation_message() {
        let mut sync = loaded();
        let transport = Scripted::default().reply(
            400,
            r#"{"errors":[{"msg":"Title must be unique","path":"title"},{"msg":"other"}]}"#,
        );
        let err = sync.create(&transport, &payload("Dune")).unwrap_err();
        assert!(matches!(err, SyncError::Remote(ApiError::Http { status: 400, .. })));
        assert_eq!(sync.books().len(), 3);
        assert_eq!(sync.notification().unwrap().message(), "Title must be unique");
    }

    #[test]
    fn create_failure_without_errors_falls_back_to_generic_message() {
        let mut sync = loaded();
        let transport = Scripted::default().reply(500, r#"{"message":"db down"}"#);
        sync.create(&transport, &payload("Dune")).unwrap_err();
        assert_eq!(
            sync.notification().unwrap().message(),
            "request failed with status code 500"
        );
    }

    #[test]
    fn invalid_form_sends_nothing() {
        let mut sync = loaded();
        let transport = Scripted::default();
        let form = BookForm {
            title: "a".to_string(),
            price: "-1".to_string(),
            ..dune_form()
        };
        let err = sync.submit(&transport, &form).unwrap_err();
        let SyncError::Invalid(errors) = err else {
            panic!("expected validation failure, got {err:?}");
        };
        assert_eq!(errors.len(), 2);
        assert!(transport.sent().is_empty());
        assert!(!sync.is_loading());
        assert!(sync.notification().is_none());
    }

    #[test]
    fn create_is_refused_while_editing() {
        let mut sync = loaded();
        sync.begin_edit("b1").unwrap();
        let err = sync.begin_create(&payload("New")).unwrap_err();
        assert!(matches!(err, SyncError::EditInProgress));
        assert!(!sync.is_loading());
    }

    // --- update ---

    #[test]
    fn update_replaces_only_the_matching_record() {
        let mut sync = loaded();
        let form = sync.begin_edit("b2").unwrap();
        assert_eq!(form.title, "Emma");
        assert_eq!(form.published_year, "1815");

        let edited = BookForm {
            price: "5".to_string(),
            ..form
        };
        let transport = Scripted::default().reply(
            200,
            r#"{"data":{"_id":"b2","title":"Emma","author":"Austen","price":5,"publishedYear":1815}}"#,
        );
        let applied = sync.submit(&transport, &edited).unwrap();
        assert!(matches!(applied, Applied::Updated(ref b) if b.price == 5.0));

        assert_eq!(ids(&sync), ["b1", "b2", "b3"]);
        assert_eq!(sync.books()[1].price, 5.0);
        assert_eq!(sync.books()[0].price, 9.99);
        assert!(sync.editing().is_none());
        assert_eq!(sync.notification().unwrap().message(), UPDATED_MESSAGE);

        let sent = transport.sent();
        assert_eq!(sent[0].method, HttpMethod::Put);
        assert_eq!(sent[0].path, "http://api/books/b2");
    }

    #[test]
    fn update_body_clears_blank_genre_and_description() {
        let mut sync = Synchronizer::new("http://api");
        sync.load(&Scripted::default().reply(
            200,
            r#"{"data":[{"_id":"b1","title":"Dune","author":"Herbert","price":9.99,
                "genre":"SciFi","description":"Desert","publishedYear":1965}]}"#,
        ))
        .unwrap();
        let form = BookForm {
            genre: "  ".to_string(),
            description: String::new(),
            published_year: String::new(),
            ..sync.begin_edit("b1").unwrap()
        };
        let transport = Scripted::default().reply(
            200,
            r#"{"data":{"_id":"b1","title":"Dune","author":"Herbert","price":9.99,"publishedYear":1965}}"#,
        );
        sync.submit(&transport, &form).unwrap();

        let sent = transport.sent();
        let body: serde_json::Value =
            serde_json::from_str(sent[0].body.as_deref().unwrap()).unwrap();
        assert_eq!(body["genre"], "");
        assert_eq!(body["description"], "");
        assert!(body.get("publishedYear").is_none());
        assert_eq!(sync.books()[0].genre, None);
    }

    #[test]
    fn create_body_still_omits_blank_text() {
        let mut sync = loaded();
        let transport = Scripted::default().reply(
            201,
            r#"{"data":{"_id":"n1","title":"Dune","author":"Herbert","price":9.99}}"#,
        );
        sync.submit(&transport, &dune_form()).unwrap();
        let sent = transport.sent();
        let body: serde_json::Value =
            serde_json::from_str(sent[0].body.as_deref().unwrap()).unwrap();
        assert!(body.get("genre").is_none());
        assert!(body.get("description").is_none());
    }

    #[test]
    fn failed_update_keeps_edit_target() {
        let mut sync = loaded();
        sync.begin_edit("b1").unwrap();
        let transport = Scripted::default().reply(
            422,
            r#"{"errors":[{"msg":"Price must be a positive number"}]}"#,
        );
        sync.submit(&transport, &dune_form()).unwrap_err();

        assert_eq!(sync.editing().unwrap().id, "b1");
        assert_eq!(sync.books().len(), 3);
        assert_eq!(
            sync.notification().unwrap().message(),
            "Price must be a positive number"
        );
    }

    #[test]
    fn update_of_unknown_local_id_keeps_length() {
        let mut sync = loaded();
        let transport = Scripted::default().reply(
            200,
            r#"{"data":{"_id":"zz","title":"Ghost","author":"X","price":1}}"#,
        );
        sync.update(&transport, "zz", &payload("Ghost")).unwrap();
        assert_eq!(ids(&sync), ["b1", "b2", "b3"]);
    }

    #[test]
    fn update_requires_identifier() {
        let mut sync = loaded();
        let err = sync.begin_update("", &payload("x")).unwrap_err();
        assert!(matches!(err, SyncError::MissingIdentifier));
    }

    #[test]
    fn cancel_edit_returns_to_create_mode() {
        let mut sync = loaded();
        sync.begin_edit("b1").unwrap();
        sync.cancel_edit();
        assert!(sync.editing().is_none());
        assert!(sync.begin_create(&payload("New")).is_ok());
    }

    #[test]
    fn edit_unknown_book_is_refused() {
        let mut sync = loaded();
        assert!(matches!(
            sync.begin_edit("nope").unwrap_err(),
            SyncError::UnknownBook(id) if id == "nope"
        ));
    }

    // --- delete ---

    #[test]
    fn confirmed_deletion_removes_book_and_clears_pending() {
        let mut sync = loaded();
        let pending = sync.stage_deletion("b2").unwrap();
        assert_eq!(pending.prompt(), "Are you sure you want to delete \"Emma\"?");

        let transport = Scripted::default().reply(204, "");
        let applied = sync.confirm_deletion(&transport).unwrap();
        assert_eq!(applied, Applied::Deleted("b2".to_string()));
        assert_eq!(ids(&sync), ["b1", "b3"]);
        assert!(sync.pending_deletion().is_none());
        assert_eq!(sync.notification().unwrap().message(), DELETED_MESSAGE);
        assert_eq!(transport.sent()[0].method, HttpMethod::Delete);
    }

    #[test]
    fn failed_deletion_still_clears_pending() {
        let mut sync = loaded();
        sync.stage_deletion("b1").unwrap();
        let transport = Scripted::default().reply(
            400,
            r#"{"errors":[{"msg":"should not be shown"}]}"#,
        );
        sync.confirm_deletion(&transport).unwrap_err();

        assert!(sync.pending_deletion().is_none());
        assert_eq!(sync.books().len(), 3);
        let n = sync.notification().unwrap();
        assert_eq!(n.kind(), NotificationKind::Error);
        assert_eq!(n.message(), "request failed with status code 400");
    }

    #[test]
    fn direct_delete_clears_pending_on_transport_failure() {
        let mut sync = loaded();
        sync.stage_deletion("b3").unwrap();
        sync.delete(&Scripted::default().fail("timeout"), "b3").unwrap_err();
        assert!(sync.pending_deletion().is_none());
        assert_eq!(sync.books().len(), 3);
    }

    #[test]
    fn confirm_without_staged_book() {
        let mut sync = loaded();
        assert!(matches!(
            sync.confirm_deletion(&Scripted::default()).unwrap_err(),
            SyncError::NoPendingDeletion
        ));
    }

    #[test]
    fn cancel_deletion_keeps_book() {
        let mut sync = loaded();
        sync.stage_deletion("b1").unwrap();
        sync.cancel_deletion();
        assert!(sync.pending_deletion().is_none());
        assert_eq!(sync.books().len(), 3);
    }

    // --- serialization of requests ---

    #[test]
    fn second_request_is_refused_while_one_is_in_flight() {
        let mut sync = loaded();
        let _req = sync.begin_load().unwrap();
        assert!(sync.is_loading());
        assert!(matches!(sync.begin_delete("b1").unwrap_err(), SyncError::Busy));
        assert!(matches!(sync.begin_load().unwrap_err(), SyncError::Busy));
        assert_eq!(sync.in_flight(), Some(&Operation::Load));

        sync.complete(Ok(HttpResponse::new(200, r#"{"data":[]}"#)))
            .unwrap();
        assert!(!sync.is_loading());
        assert!(sync.books().is_empty());
    }

    #[test]
    fn busy_delete_keeps_pending_deletion() {
        let mut sync = loaded();
        sync.stage_deletion("b1").unwrap();
        let _req = sync.begin_load().unwrap();
        assert!(matches!(
            sync.begin_confirmed_deletion().unwrap_err(),
            SyncError::Busy
        ));
        assert!(sync.pending_deletion().is_some());
    }

    #[test]
    fn complete_without_request() {
        let mut sync = Synchronizer::new("http://api");
        assert!(matches!(
            sync.complete(Ok(HttpResponse::new(200, "{}"))).unwrap_err(),
            SyncError::NothingInFlight
        ));
    }

    // --- notifications ---

    #[test]
    fn newer_notification_supersedes_older() {
        let mut sync = loaded();
        sync.load(&Scripted::default().fail("first")).unwrap_err();
        sync.load(&Scripted::default().fail("second")).unwrap_err();
        assert_eq!(sync.notification().unwrap().message(), "second");
    }

    #[test]
    fn notification_expires_after_lifetime() {
        let mut sync = loaded();
        sync.load(&Scripted::default().fail("gone soon")).unwrap_err();
        let raised = sync.notification().unwrap().raised_at();
        assert!(sync.notification_at(raised + Duration::from_secs(2)).is_some());
        assert!(sync.notification_at(raised + Duration::from_secs(3)).is_none());

        sync.dismiss_notification();
        assert!(sync.notification_at(raised).is_none());
    }
}
