//! Book form and its validation.
//!
//! A `BookForm` holds exactly what the user typed. `validate` either turns it
//! into a `BookPayload` ready to send, or reports every failing field. No
//! request may be built from a form that has not passed validation.

use std::collections::BTreeMap;
use std::fmt;

use crate::types::{Book, BookPayload};

pub const MIN_TITLE_CHARS: usize = 2;
pub const MAX_PUBLISHED_YEAR: u16 = 3000;

pub const TITLE_MESSAGE: &str = "Title (min 2 chars) required";
pub const AUTHOR_MESSAGE: &str = "Author required";
pub const PRICE_MESSAGE: &str = "Valid non-negative price required";
pub const YEAR_MESSAGE: &str = "Year must be between 0-3000";

/// A validated form field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Field {
    Title,
    Author,
    Price,
    PublishedYear,
}

impl Field {
    /// JSON name of the field.
    pub fn name(self) -> &'static str {
        match self {
            Field::Title => "title",
            Field::Author => "author",
            Field::Price => "price",
            Field::PublishedYear => "publishedYear",
        }
    }
}

/// Field-level validation messages, at most one per field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldErrors(BTreeMap<Field, &'static str>);

impl FieldErrors {
    pub fn get(&self, field: Field) -> Option<&'static str> {
        self.0.get(&field).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Field, &'static str)> + '_ {
        self.0.iter().map(|(field, msg)| (*field, *msg))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    fn insert(&mut self, field: Field, message: &'static str) {
        self.0.insert(field, message);
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (field, message)) in self.iter().enumerate() {
            if i > 0 {
                write!(f, "; ")?;
            }
            write!(f, "{}: {message}", field.name())?;
        }
        Ok(())
    }
}

/// Raw form input. Numeric fields stay text until validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookForm {
    pub title: String,
    pub author: String,
    pub genre: String,
    pub price: String,
    pub published_year: String,
    pub description: String,
    pub in_stock: bool,
}

impl Default for BookForm {
    fn default() -> Self {
        Self {
            title: String::new(),
            author: String::new(),
            genre: String::new(),
            price: String::new(),
            published_year: String::new(),
            description: String::new(),
            in_stock: true,
        }
    }
}

impl From<&Book> for BookForm {
    fn from(book: &Book) -> Self {
        Self {
            title: book.title.clone(),
            author: book.author.clone(),
            genre: book.genre.clone().unwrap_or_default(),
            price: book.price.to_string(),
            published_year: book
                .published_year
                .map(|year| year.to_string())
                .unwrap_or_default(),
            description: book.description.clone().unwrap_or_default(),
            in_stock: book.in_stock,
        }
    }
}

impl BookForm {
    pub fn validate(&self) -> Result<BookPayload, FieldErrors> {
        let mut errors = FieldErrors::default();

        let title = self.title.trim();
        if title.chars().count() < MIN_TITLE_CHARS {
            errors.insert(Field::Title, TITLE_MESSAGE);
        }

        let author = self.author.trim();
        if author.is_empty() {
            errors.insert(Field::Author, AUTHOR_MESSAGE);
        }

        let price = parse_price(&self.price);
        if price.is_none() {
            errors.insert(Field::Price, PRICE_MESSAGE);
        }

        let published_year = match parse_year(&self.published_year) {
            Ok(year) => year,
            Err(()) => {
                errors.insert(Field::PublishedYear, YEAR_MESSAGE);
                None
            }
        };

        match price {
            Some(price) if errors.is_empty() => Ok(BookPayload {
                title: title.to_string(),
                author: author.to_string(),
                genre: non_blank(&self.genre),
                price,
                published_year,
                description: non_blank(&self.description),
                in_stock: self.in_stock,
            }),
            _ => Err(errors),
        }
    }
}

fn parse_price(raw: &str) -> Option<f64> {
    let price: f64 = raw.trim().parse().ok()?;
    (price.is_finite() && price >= 0.0).then_some(price)
}

/// Blank means "not provided". Anything else must be a whole number in range.
fn parse_year(raw: &str) -> Result<Option<u16>, ()> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(None);
    }
    let year: f64 = raw.parse().map_err(|_| ())?;
    if !year.is_finite() || year.fract() != 0.0 {
        return Err(());
    }
    if !(0.0..=f64::from(MAX_PUBLISHED_YEAR)).contains(&year) {
        return Err(());
    }
    Ok(Some(year as u16))
}

fn non_blank(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}
