use std::io::{BufRead, Write};

use books_core::{BookForm, Synchronizer, Transport};

use crate::args::Command;
use crate::render::{book_table, notification_line};

/// Execute one command. The collection is always loaded first so ids given
/// on the command line resolve against the current remote state.
///
/// Prompts go to `output` and answers are read from `input`.
pub fn run<T, R, W>(
    command: Command,
    sync: &mut Synchronizer,
    transport: &T,
    input: &mut R,
    output: &mut W,
) -> anyhow::Result<()>
where
    T: Transport + ?Sized,
    R: BufRead,
    W: Write,
{
    let outcome = sync.load(transport).map(|_| ()).and_then(|()| match command {
        Command::List => Ok(()),
        Command::Add(fields) => {
            let mut form = BookForm::default();
            fields.apply(&mut form);
            sync.submit(transport, &form).map(|_| ())
        }
        Command::Edit { id, fields } => {
            let mut form = sync.begin_edit(&id)?;
            fields.apply(&mut form);
            let result = sync.submit(transport, &form).map(|_| ());
            // A rejected form must not leave the edit target behind.
            sync.cancel_edit();
            result
        }
        Command::Delete { id, yes } => {
            let prompt = sync.stage_deletion(&id)?.prompt();
            if !yes && !confirm(&prompt, input, output) {
                sync.cancel_deletion();
                tracing::info!(%id, "deletion cancelled");
                return Ok(());
            }
            sync.confirm_deletion(transport).map(|_| ())
        }
    });

    if let Some(notification) = sync.notification() {
        writeln!(output, "{}", notification_line(notification))?;
    }
    outcome?;
    write!(output, "{}", book_table(sync.books()))?;
    Ok(())
}

/// Ask `prompt` and read a yes/no answer. Anything but `y`/`yes` is a no,
/// including a terminal that cannot be read.
fn confirm<R: BufRead, W: Write>(prompt: &str, input: &mut R, output: &mut W) -> bool {
    let mut answer = String::new();
    let asked = write!(output, "{prompt} [y/N] ")
        .and_then(|()| output.flush())
        .and_then(|()| input.read_line(&mut answer));
    if let Err(e) = asked {
        tracing::warn!(error = %e, "confirmation not read");
        return false;
    }
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::args::FormArgs;
    use books_core::{ApiError, HttpMethod, HttpRequest, HttpResponse};
    use std::cell::RefCell;
    use std::io::Cursor;

    const LIST: &str = r#"{"data":[
        {"_id":"b1","title":"Dune","author":"Herbert","price":9.99,"publishedYear":1965}
    ]}"#;

    /// Answers each request in order and records what was sent.
    struct Scripted {
        responses: RefCell<Vec<Result<HttpResponse, ApiError>>>,
        sent: RefCell<Vec<HttpRequest>>,
    }

    impl Scripted {
        fn new(responses: Vec<Result<HttpResponse, ApiError>>) -> Self {
            Self {
                responses: RefCell::new(responses),
                sent: RefCell::new(Vec::new()),
            }
        }

        fn methods(&self) -> Vec<HttpMethod> {
            self.sent.borrow().iter().map(|r| r.method).collect()
        }
    }

    impl Transport for Scripted {
        fn execute(&self, request: HttpRequest) -> Result<HttpResponse, ApiError> {
            self.sent.borrow_mut().push(request);
            self.responses.borrow_mut().remove(0)
        }
    }

    fn exec(command: Command, transport: &Scripted, answer: &str) -> (anyhow::Result<()>, String) {
        let mut sync = Synchronizer::new("http://api.test");
        let mut input = Cursor::new(answer.as_bytes().to_vec());
        let mut output = Vec::new();
        let result = run(command, &mut sync, transport, &mut input, &mut output);
        (result, String::from_utf8(output).unwrap())
    }

    #[test]
    fn list_prints_table() {
        let transport = Scripted::new(vec![Ok(HttpResponse::new(200, LIST))]);
        let (result, out) = exec(Command::List, &transport, "");
        result.unwrap();
        assert!(out.starts_with("Books (1)\n"));
        assert!(out.contains("Dune"));
    }

    #[test]
    fn add_with_invalid_fields_sends_nothing() {
        let transport = Scripted::new(vec![Ok(HttpResponse::new(200, r#"{"data":[]}"#))]);
        let fields = FormArgs {
            title: Some("D".to_string()),
            ..FormArgs::default()
        };
        let (result, _) = exec(Command::Add(fields), &transport, "");
        let err = result.unwrap_err().to_string();
        assert!(err.contains("Title (min 2 chars) required"), "{err}");
        assert_eq!(transport.methods(), [HttpMethod::Get]);
    }

    #[test]
    fn add_prints_notification_and_new_row() {
        let transport = Scripted::new(vec![
            Ok(HttpResponse::new(200, r#"{"data":[]}"#)),
            Ok(HttpResponse::new(
                201,
                r#"{"data":{"_id":"n1","title":"Emma","author":"Austen","price":4.5}}"#,
            )),
        ]);
        let fields = FormArgs {
            title: Some("Emma".to_string()),
            author: Some("Austen".to_string()),
            price: Some("4.5".to_string()),
            ..FormArgs::default()
        };
        let (result, out) = exec(Command::Add(fields), &transport, "");
        result.unwrap();
        assert!(out.starts_with("[success] Book added successfully\nBooks (1)\n"));
        assert_eq!(transport.methods(), [HttpMethod::Get, HttpMethod::Post]);
    }

    #[test]
    fn edit_sends_merged_form() {
        let transport = Scripted::new(vec![
            Ok(HttpResponse::new(200, LIST)),
            Ok(HttpResponse::new(
                200,
                r#"{"data":{"_id":"b1","title":"Dune","author":"Herbert","price":12}}"#,
            )),
        ]);
        let fields = FormArgs {
            price: Some("12".to_string()),
            ..FormArgs::default()
        };
        let (result, out) = exec(
            Command::Edit {
                id: "b1".to_string(),
                fields,
            },
            &transport,
            "",
        );
        result.unwrap();
        assert!(out.contains("[success] Book updated"));
        let sent = transport.sent.borrow();
        assert_eq!(sent[1].method, HttpMethod::Put);
        assert_eq!(sent[1].path, "http://api.test/books/b1");
        let body = sent[1].body.as_deref().unwrap();
        assert!(body.contains(r#""title":"Dune""#), "{body}");
        assert!(body.contains(r#""publishedYear":1965"#), "{body}");
    }

    #[test]
    fn edit_unknown_id_fails_without_request() {
        let transport = Scripted::new(vec![Ok(HttpResponse::new(200, LIST))]);
        let (result, _) = exec(
            Command::Edit {
                id: "nope".to_string(),
                fields: FormArgs::default(),
            },
            &transport,
            "",
        );
        assert!(result.is_err());
        assert_eq!(transport.methods(), [HttpMethod::Get]);
    }

    #[test]
    fn delete_declined_keeps_book() {
        let transport = Scripted::new(vec![Ok(HttpResponse::new(200, LIST))]);
        let (result, out) = exec(
            Command::Delete {
                id: "b1".to_string(),
                yes: false,
            },
            &transport,
            "n\n",
        );
        result.unwrap();
        assert!(out.starts_with("Are you sure you want to delete \"Dune\"? [y/N] "));
        assert!(out.contains("Books (1)"));
        assert_eq!(transport.methods(), [HttpMethod::Get]);
    }

    #[test]
    fn delete_confirmed_removes_book() {
        let transport = Scripted::new(vec![
            Ok(HttpResponse::new(200, LIST)),
            Ok(HttpResponse::new(204, "")),
        ]);
        let (result, out) = exec(
            Command::Delete {
                id: "b1".to_string(),
                yes: false,
            },
            &transport,
            "Yes\n",
        );
        result.unwrap();
        assert!(out.contains("[success] Book deleted\nBooks (0)\nNo books yet. Add one!\n"));
        assert_eq!(transport.methods(), [HttpMethod::Get, HttpMethod::Delete]);
    }

    #[test]
    fn failed_load_reports_notification() {
        let transport = Scripted::new(vec![Err(ApiError::Transport("Network Error".to_string()))]);
        let (result, out) = exec(Command::List, &transport, "");
        assert!(result.is_err());
        assert_eq!(out, "[error] Network Error\n");
    }
}
