//! Plain-text rendering of the local book list.

use books_core::{Book, Notification};

const EMPTY_MESSAGE: &str = "No books yet. Add one!";
const MISSING: &str = "—";
const HEADINGS: [&str; 7] = ["ID", "Title", "Author", "Genre", "Price", "Year", "Stock"];

fn row(book: &Book) -> [String; 7] {
    [
        book.id.clone(),
        book.title.clone(),
        book.author.clone(),
        book.genre.clone().unwrap_or_else(|| MISSING.to_string()),
        format!("{:.2}", book.price),
        // Year 0 reads as unknown, like a missing one.
        match book.published_year {
            Some(year) if year != 0 => year.to_string(),
            _ => MISSING.to_string(),
        },
        if book.in_stock { "Yes" } else { "No" }.to_string(),
    ]
}

/// `Books (N)` followed by an aligned table, or the empty-list hint.
pub fn book_table(books: &[Book]) -> String {
    let mut out = format!("Books ({})\n", books.len());
    if books.is_empty() {
        out.push_str(EMPTY_MESSAGE);
        out.push('\n');
        return out;
    }

    let rows: Vec<[String; 7]> = books.iter().map(row).collect();
    let mut widths = HEADINGS.map(|h| h.chars().count());
    for cells in &rows {
        for (width, cell) in widths.iter_mut().zip(cells) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let headings = HEADINGS.map(str::to_string);
    for cells in std::iter::once(&headings).chain(&rows) {
        let line: Vec<String> = cells
            .iter()
            .zip(widths)
            .map(|(cell, width)| {
                let pad = width - cell.chars().count();
                format!("{cell}{}", " ".repeat(pad))
            })
            .collect();
        out.push_str(line.join("  ").trim_end());
        out.push('\n');
    }
    out
}

pub fn notification_line(notification: &Notification) -> String {
    format!("[{}] {}", notification.kind().as_str(), notification.message())
}
