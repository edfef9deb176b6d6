use std::path::Path;

use thiserror::Error;

use crate::api::Book;

/// Error while importing a local JSON file of books.
#[derive(Error, Debug)]
pub enum ImportError {
    #[error("imported JSON is not an array")]
    NotArray,
    #[error("invalid JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("could not read file: {0}")]
    Io(#[from] std::io::Error),
}

impl ImportError {
    /// User-facing message shown in the status line.
    pub fn user_message(&self) -> String {
        match self {
            ImportError::NotArray => "Uploaded file must be a JSON array.".to_string(),
            ImportError::Parse(_) => "Invalid JSON file.".to_string(),
            ImportError::Io(e) => format!("Could not read file: {e}"),
        }
    }
}

/// Read a `.json` file and parse it as an array of book records.
pub fn load_books(path: &Path) -> Result<Vec<Book>, ImportError> {
    let text = std::fs::read_to_string(path)?;
    parse_books(&text)
}

/// Parse JSON text into book records.
///
/// The top-level value must be an array. Individual records are not
/// validated: anything that does not look like a book decodes to an empty
/// record and renders through the card's absence-tolerant rules.
pub fn parse_books(text: &str) -> Result<Vec<Book>, ImportError> {
    let value: serde_json::Value = serde_json::from_str(text)?;
    match value {
        serde_json::Value::Array(items) => Ok(items
            .into_iter()
            .map(|item| serde_json::from_value(item).unwrap_or_default())
            .collect()),
        _ => Err(ImportError::NotArray),
    }
}
