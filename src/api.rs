use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::mpsc::UnboundedSender;

pub const SEARCH_ENDPOINT: &str = "https://openlibrary.org/search.json";
pub const COVER_ENDPOINT: &str = "https://covers.openlibrary.org/b/id";
pub const PLACEHOLDER_COVER: &str = "https://via.placeholder.com/90x130?text=No+Cover";

/// A single book record, from the search API or an imported file.
///
/// Every field is optional: records are rendered with whatever they carry,
/// and unknown fields are ignored.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Book {
    pub title: Option<String>,
    pub author_name: Option<Vec<String>>,
    pub cover_i: Option<i64>,
}

impl Book {
    /// Display title; an absent title renders as an empty string.
    pub fn title(&self) -> &str {
        self.title.as_deref().unwrap_or("")
    }

    /// Authors joined with ", ", or "Unknown" when absent or empty.
    pub fn authors_label(&self) -> String {
        match &self.author_name {
            Some(names) if !names.is_empty() => names.join(", "),
            _ => "Unknown".to_string(),
        }
    }

    /// Cover image URL, falling back to a fixed placeholder without `cover_i`.
    pub fn cover_url(&self) -> String {
        match self.cover_i {
            Some(id) => format!("{COVER_ENDPOINT}/{id}-M.jpg"),
            None => PLACEHOLDER_COVER.to_string(),
        }
    }
}

/// Response envelope of the search endpoint.
///
/// Both fields are tolerated absent; any other shape decodes to an empty
/// result set rather than an error.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchResponse {
    #[serde(default)]
    pub docs: Vec<Book>,
    #[serde(default, alias = "numFound")]
    pub num_found: u64,
}

/// Error during a search request or response decoding.
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("search request failed: {0}")]
    Http(#[from] reqwest::Error),
}

impl FetchError {
    /// The one user-facing message every fetch failure collapses into.
    pub fn user_message(&self) -> &'static str {
        "Failed to fetch books. Please try again."
    }
}

/// Query the search endpoint.
///
/// The server page is always 1; pagination past the first 25 results
/// re-slices this single response client-side.
pub async fn search(client: &reqwest::Client, query: &str) -> Result<SearchResponse, FetchError> {
    let response = client
        .get(SEARCH_ENDPOINT)
        .query(&[("q", query), ("page", "1")])
        .send()
        .await?;
    Ok(response.json::<SearchResponse>().await?)
}

/// Run a search in the background, delivering the outcome to the event loop.
///
/// In-flight requests are neither deduplicated nor cancelled: if two
/// submissions overlap, whichever completion is drained last wins.
pub fn spawn_search(
    client: reqwest::Client,
    query: String,
    tx: UnboundedSender<Result<SearchResponse, FetchError>>,
) {
    tokio::spawn(async move {
        let result = search(&client, &query).await;
        // Receiver dropped means the app is shutting down.
        let _ = tx.send(result);
    });
}
