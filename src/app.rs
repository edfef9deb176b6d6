use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender, unbounded_channel};

use crate::api::{self, Book, FetchError, SearchResponse};
use crate::import::ImportError;

pub const PAGE_SIZE: usize = 25;
pub const DEFAULT_QUERY: &str = "nature";

/// Input mode for the editable bars.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    EditingQuery,
    EditingImportPath,
}

/// The data source pagination and rendering currently read from.
///
/// Exactly one source is active at a time; an import replaces the API
/// results wholesale and clearing it fetches fresh ones.
#[derive(Debug, Clone)]
pub enum Source {
    Api { docs: Vec<Book>, num_found: u64 },
    Imported { docs: Vec<Book> },
}

impl Source {
    pub fn docs(&self) -> &[Book] {
        match self {
            Source::Api { docs, .. } => docs,
            Source::Imported { docs } => docs,
        }
    }

    /// Count pagination derives from: the API-reported total for API
    /// results, the sequence length for imported ones.
    pub fn count(&self) -> usize {
        match self {
            Source::Api { num_found, .. } => *num_found as usize,
            Source::Imported { docs } => docs.len(),
        }
    }

    pub fn is_imported(&self) -> bool {
        matches!(self, Source::Imported { .. })
    }
}

/// Side effect requested by a state transition, executed by the event loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    None,
    Fetch(String),
}

/// Main application state.
pub struct App {
    client: reqwest::Client,
    fetch_tx: UnboundedSender<Result<SearchResponse, FetchError>>,
    fetch_rx: UnboundedReceiver<Result<SearchResponse, FetchError>>,

    pub source: Source,
    pub page: usize,
    pub scroll: u16,

    // Input bars
    pub query: String,
    pub import_path: String,
    pub input_mode: InputMode,

    pub loading: bool,
    pub error: Option<String>,
    pub status_msg: String,

    pub show_help: bool,
    pub should_quit: bool,
}

impl App {
    pub fn new() -> Self {
        let (fetch_tx, fetch_rx) = unbounded_channel();
        Self {
            client: reqwest::Client::new(),
            fetch_tx,
            fetch_rx,

            source: Source::Api {
                docs: Vec::new(),
                num_found: 0,
            },
            page: 1,
            scroll: 0,

            query: String::new(),
            import_path: String::new(),
            input_mode: InputMode::Normal,

            loading: false,
            error: None,
            status_msg: String::new(),

            show_help: false,
            should_quit: false,
        }
    }

    // ── Pagination ──

    pub fn total_pages(&self) -> usize {
        self.source.count().div_ceil(PAGE_SIZE)
    }

    /// Requested pages outside [1, total_pages] are ignored.
    pub fn set_page(&mut self, page: usize) {
        if page < 1 || page > self.total_pages() {
            return;
        }
        self.page = page;
        self.scroll = 0;
    }

    pub fn scroll_down(&mut self) {
        self.scroll = self.scroll.saturating_add(1);
    }

    pub fn scroll_up(&mut self) {
        self.scroll = self.scroll.saturating_sub(1);
    }

    pub fn scroll_page_down(&mut self) {
        self.scroll = self.scroll.saturating_add(20);
    }

    pub fn scroll_page_up(&mut self) {
        self.scroll = self.scroll.saturating_sub(20);
    }

    pub fn next_page(&mut self) {
        self.set_page(self.page + 1);
    }

    pub fn prev_page(&mut self) {
        self.set_page(self.page.saturating_sub(1));
    }

    pub fn first_page(&mut self) {
        self.set_page(1);
    }

    pub fn last_page(&mut self) {
        self.set_page(self.total_pages());
    }

    /// The single place the Next bound is computed.
    pub fn next_disabled(&self) -> bool {
        self.page >= self.total_pages()
    }

    pub fn prev_disabled(&self) -> bool {
        self.page == 1
    }

    /// The page of records currently on screen. Derived, never stored.
    ///
    /// For API sources the count (and so the page range) comes from the
    /// reported total, while only one server page of documents was ever
    /// fetched; pages past that window are empty by construction.
    pub fn visible_slice(&self) -> &[Book] {
        let docs = self.source.docs();
        let start = (self.page - 1) * PAGE_SIZE;
        if start >= docs.len() {
            return &[];
        }
        let end = (start + PAGE_SIZE).min(docs.len());
        &docs[start..end]
    }

    // ── Search ──

    /// Submit the query bar. A blank query is a no-op; otherwise the raw
    /// text is fetched as typed.
    pub fn submit_search(&self) -> Effect {
        if self.query.trim().is_empty() {
            return Effect::None;
        }
        Effect::Fetch(self.query.clone())
    }

    /// Dispatch a fetch for `query` in the background.
    pub fn begin_fetch(&mut self, query: &str) {
        self.loading = true;
        self.status_msg = format!("Searching for \"{query}\"...");
        api::spawn_search(self.client.clone(), query.to_string(), self.fetch_tx.clone());
    }

    /// Apply completed fetches in arrival order.
    ///
    /// Overlapping fetches are not cancelled or staleness-checked; the last
    /// completion drained here wins.
    pub fn poll_fetches(&mut self) {
        while let Ok(result) = self.fetch_rx.try_recv() {
            self.apply_fetch(result);
        }
    }

    /// Fetch completion. Success replaces the active source (dropping any
    /// import), clears the error and resets to page 1; failure leaves the
    /// displayed data untouched. Loading ends either way.
    pub fn apply_fetch(&mut self, result: Result<SearchResponse, FetchError>) {
        self.loading = false;
        match result {
            Ok(response) => {
                let num_found = response.num_found;
                self.source = Source::Api {
                    docs: response.docs,
                    num_found,
                };
                self.error = None;
                self.page = 1;
                self.scroll = 0;
                self.status_msg = format!("Found {num_found} results");
            }
            Err(err) => {
                self.error = Some(err.user_message().to_string());
            }
        }
    }

    // ── Import ──

    /// Import completion. Success makes the imported records the active
    /// source and resets to page 1; failure changes nothing but the error.
    pub fn apply_import(&mut self, result: Result<Vec<Book>, ImportError>) {
        match result {
            Ok(docs) => {
                let count = docs.len();
                self.source = Source::Imported { docs };
                self.error = None;
                self.page = 1;
                self.scroll = 0;
                self.status_msg = format!("Imported {count} books");
            }
            Err(err) => {
                self.error = Some(err.user_message());
            }
        }
    }

    /// Drop the imported source and go back to searching: refetches the
    /// query bar's text, or the default query if it is empty.
    pub fn clear_import(&mut self) -> Effect {
        if !self.source.is_imported() {
            return Effect::None;
        }
        self.source = Source::Api {
            docs: Vec::new(),
            num_found: 0,
        };
        self.error = None;
        self.page = 1;
        let query = if self.query.is_empty() {
            DEFAULT_QUERY.to_string()
        } else {
            self.query.clone()
        };
        Effect::Fetch(query)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn books(n: usize) -> Vec<Book> {
        (0..n)
            .map(|i| Book {
                title: Some(format!("Book {i}")),
                ..Book::default()
            })
            .collect()
    }

    fn app_with_api_source(n: usize) -> App {
        let mut app = App::new();
        app.apply_fetch(Ok(SearchResponse {
            docs: books(n),
            num_found: n as u64,
        }));
        app
    }

    #[test]
    fn total_pages_is_ceiling_of_count() {
        assert_eq!(app_with_api_source(0).total_pages(), 0);
        assert_eq!(app_with_api_source(1).total_pages(), 1);
        assert_eq!(app_with_api_source(25).total_pages(), 1);
        assert_eq!(app_with_api_source(26).total_pages(), 2);
        assert_eq!(app_with_api_source(100).total_pages(), 4);
    }

    #[test]
    fn out_of_range_pages_are_ignored() {
        let mut app = app_with_api_source(60);
        app.set_page(2);
        assert_eq!(app.page, 2);

        app.set_page(0);
        assert_eq!(app.page, 2);
        app.set_page(app.total_pages() + 1);
        assert_eq!(app.page, 2);
    }

    #[test]
    fn prev_and_next_stop_at_the_bounds() {
        let mut app = app_with_api_source(30);
        assert!(app.prev_disabled());
        app.prev_page();
        assert_eq!(app.page, 1);

        app.next_page();
        assert_eq!(app.page, 2);
        assert!(app.next_disabled());
        app.next_page();
        assert_eq!(app.page, 2);
    }

    #[test]
    fn slice_reads_the_requested_page() {
        let mut app = app_with_api_source(30);
        assert_eq!(app.visible_slice().len(), 25);
        assert_eq!(app.visible_slice()[0].title(), "Book 0");

        app.next_page();
        assert_eq!(app.visible_slice().len(), 5);
        assert_eq!(app.visible_slice()[0].title(), "Book 25");
    }

    #[test]
    fn api_pages_past_the_fetched_window_are_empty() {
        // One server page of 25 docs, but a reported total of 80: pages 2+
        // exist yet have nothing to show.
        let mut app = App::new();
        app.apply_fetch(Ok(SearchResponse {
            docs: books(25),
            num_found: 80,
        }));
        assert_eq!(app.total_pages(), 4);
        app.set_page(2);
        assert!(app.visible_slice().is_empty());
    }

    #[test]
    fn blank_submit_is_a_no_op() {
        let mut app = app_with_api_source(10);

        app.query = String::new();
        assert_eq!(app.submit_search(), Effect::None);
        app.query = "   ".to_string();
        assert_eq!(app.submit_search(), Effect::None);
        assert!(!app.loading);
        assert_eq!(app.visible_slice().len(), 10);
    }

    #[test]
    fn submit_fetches_the_text_as_typed() {
        let mut app = App::new();
        app.query = " moby dick ".to_string();
        assert_eq!(app.submit_search(), Effect::Fetch(" moby dick ".to_string()));
    }

    #[test]
    fn successful_import_replaces_the_source() {
        let mut app = app_with_api_source(50);
        app.set_page(2);
        app.error = Some("old error".to_string());

        app.apply_import(Ok(books(2)));
        assert!(app.source.is_imported());
        assert_eq!(app.source.count(), 2);
        assert_eq!(app.total_pages(), 1);
        assert_eq!(app.page, 1);
        assert_eq!(app.error, None);
    }

    #[test]
    fn failed_import_leaves_the_source_alone() {
        let mut app = app_with_api_source(50);
        app.apply_import(crate::import::parse_books(r#"{"not":"an array"}"#));
        assert!(!app.source.is_imported());
        assert_eq!(app.source.count(), 50);
        assert_eq!(
            app.error.as_deref(),
            Some("Uploaded file must be a JSON array.")
        );

        app.apply_import(crate::import::parse_books("not valid json"));
        assert_eq!(app.error.as_deref(), Some("Invalid JSON file."));
    }

    #[test]
    fn clear_import_refetches_the_typed_or_default_query() {
        let mut app = App::new();
        app.apply_import(Ok(books(3)));
        assert_eq!(app.clear_import(), Effect::Fetch(DEFAULT_QUERY.to_string()));
        assert!(!app.source.is_imported());

        app.apply_import(Ok(books(3)));
        app.query = "whales".to_string();
        assert_eq!(app.clear_import(), Effect::Fetch("whales".to_string()));
    }

    #[test]
    fn clear_import_without_an_import_does_nothing() {
        let mut app = app_with_api_source(5);
        assert_eq!(app.clear_import(), Effect::None);
        assert_eq!(app.source.count(), 5);
    }

    #[test]
    fn failed_fetch_keeps_results_and_stops_loading() {
        let mut app = app_with_api_source(40);
        app.set_page(2);
        app.loading = true;

        let err = reqwest::Client::new().get("not a url").build().unwrap_err();
        app.apply_fetch(Err(err.into()));

        assert!(!app.loading);
        assert_eq!(app.source.count(), 40);
        assert_eq!(app.page, 2);
        assert_eq!(
            app.error.as_deref(),
            Some("Failed to fetch books. Please try again.")
        );
    }

    #[test]
    fn successful_fetch_drops_an_active_import() {
        let mut app = App::new();
        app.apply_import(Ok(books(2)));
        app.apply_fetch(Ok(SearchResponse {
            docs: books(25),
            num_found: 99,
        }));
        assert!(!app.source.is_imported());
        assert_eq!(app.source.count(), 99);
        assert_eq!(app.page, 1);
    }

    proptest! {
        #[test]
        fn slice_never_exceeds_page_size(len in 0usize..400, page in 1usize..40) {
            let mut app = app_with_api_source(len);
            app.set_page(page);
            prop_assert!(app.visible_slice().len() <= PAGE_SIZE);
        }

        #[test]
        fn slice_is_deterministic(len in 0usize..400, page in 1usize..40) {
            let mut app = app_with_api_source(len);
            app.set_page(page);
            let first: Vec<String> =
                app.visible_slice().iter().map(|b| b.title().to_string()).collect();
            let second: Vec<String> =
                app.visible_slice().iter().map(|b| b.title().to_string()).collect();
            prop_assert_eq!(first, second);
        }

        #[test]
        fn page_stays_in_bounds(len in 1usize..400, pages in proptest::collection::vec(0usize..40, 0..12)) {
            let mut app = app_with_api_source(len);
            for p in pages {
                app.set_page(p);
                prop_assert!(app.page >= 1);
                prop_assert!(app.page <= app.total_pages());
            }
        }
    }
}
