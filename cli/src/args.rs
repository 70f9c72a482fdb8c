use clap::{Args, Parser, Subcommand};

use books_core::BookForm;

#[derive(Debug, Parser)]
#[command(name = "books", version, about = "Manage a remote book collection")]
pub struct Cli {
    /// Overrides `api.base_url`.
    #[arg(long, global = true)]
    pub base_url: Option<String>,

    /// Overrides `api.timeout_ms`.
    #[arg(long, global = true)]
    pub timeout_ms: Option<u64>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Show every book in the collection.
    List,
    /// Add a new book.
    Add(FormArgs),
    /// Change fields of an existing book; omitted fields keep their value.
    Edit {
        id: String,
        #[command(flatten)]
        fields: FormArgs,
    },
    /// Delete a book after confirmation.
    Delete {
        id: String,
        /// Skip the confirmation prompt.
        #[arg(short, long)]
        yes: bool,
    },
}

/// Raw field text. Checked by the core validator, not by clap.
#[derive(Debug, Default, Args)]
pub struct FormArgs {
    #[arg(long)]
    pub title: Option<String>,
    #[arg(long)]
    pub author: Option<String>,
    #[arg(long)]
    pub genre: Option<String>,
    #[arg(long, allow_hyphen_values = true)]
    pub price: Option<String>,
    #[arg(long = "year", allow_hyphen_values = true)]
    pub published_year: Option<String>,
    #[arg(long)]
    pub description: Option<String>,
    #[arg(long)]
    pub in_stock: Option<bool>,
}

impl FormArgs {
    /// Overwrite the fields that were given on the command line.
    pub fn apply(self, form: &mut BookForm) {
        let FormArgs {
            title,
            author,
            genre,
            price,
            published_year,
            description,
            in_stock,
        } = self;
        for (value, slot) in [
            (title, &mut form.title),
            (author, &mut form.author),
            (genre, &mut form.genre),
            (price, &mut form.price),
            (published_year, &mut form.published_year),
            (description, &mut form.description),
        ] {
            if let Some(value) = value {
                *slot = value;
            }
        }
        if let Some(in_stock) = in_stock {
            form.in_stock = in_stock;
        }
    }
}
