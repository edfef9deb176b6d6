mod api;
mod app;
mod import;
mod ui;

use std::path::{Path, PathBuf};
use std::time::Duration;

use app::{App, DEFAULT_QUERY, Effect, InputMode};
use clap::{Parser, Subcommand};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use indicatif::{ProgressBar, ProgressStyle};

/// TUI search client for the Open Library catalog with local JSON import
#[derive(Parser)]
#[command(version, about)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Initial search query (fallback if no subcommand)
    #[arg(short, long)]
    query: Option<String>,

    /// JSON file to use as the starting data source
    #[arg(short, long)]
    import: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the TUI (default)
    Run {
        /// Initial search query
        #[arg(short, long)]
        query: Option<String>,

        /// JSON file to use as the starting data source
        #[arg(short, long)]
        import: Option<PathBuf>,
    },
    /// Query the search API once and print the matches
    Search {
        /// Search term
        query: String,

        /// Print the matched documents as JSON
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Normalize command
    let command = match cli.command {
        Some(c) => c,
        None => Commands::Run {
            query: cli.query,
            import: cli.import,
        },
    };

    match command {
        Commands::Search { query, json } => {
            run_headless_search(&query, json).await?;
        }
        Commands::Run { query, import } => {
            let mut app = App::new();
            if let Some(q) = &query {
                app.query = q.clone();
            }

            // A preloaded import is the starting source; the initial fetch
            // only happens without one (or when loading it fails).
            let mut imported = false;
            if let Some(path) = &import {
                app.apply_import(import::load_books(path));
                imported = app.source.is_imported();
            }
            if !imported {
                let initial = query.unwrap_or_else(|| DEFAULT_QUERY.to_string());
                app.begin_fetch(&initial);
            }

            let mut terminal = ratatui::init();
            let result = run_app(&mut terminal, &mut app).await;
            ratatui::restore();

            if let Err(e) = result {
                eprintln!("Error: {e}");
                std::process::exit(1);
            }
        }
    }

    Ok(())
}

async fn run_app(
    terminal: &mut ratatui::DefaultTerminal,
    app: &mut App,
) -> Result<(), Box<dyn std::error::Error>> {
    loop {
        app.poll_fetches();

        terminal.draw(|frame| ui::render(app, frame))?;

        if app.should_quit {
            return Ok(());
        }

        // Poll for events with a 250ms timeout; fetch completions are
        // drained at the top of the next iteration either way.
        if crossterm::event::poll(Duration::from_millis(250))? {
            match event::read()? {
                Event::Key(key) => {
                    if key.kind != KeyEventKind::Press {
                        continue;
                    }
                    handle_key(app, key);
                }
                _ => {}
            }
        }
    }
}

fn handle_key(app: &mut App, key: KeyEvent) {
    // Help toggle (global)
    if key.code == KeyCode::Char('?') && app.input_mode == InputMode::Normal {
        app.show_help = !app.show_help;
        return;
    }

    // If help is showing, any key closes it
    if app.show_help {
        app.show_help = false;
        return;
    }

    // Ctrl+C always quits
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        app.should_quit = true;
        return;
    }

    match app.input_mode {
        InputMode::EditingQuery => handle_query_input(app, key),
        InputMode::EditingImportPath => handle_import_input(app, key),
        InputMode::Normal => handle_normal_key(app, key),
    }
}

fn handle_normal_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('q') => {
            app.should_quit = true;
        }
        KeyCode::Char('/') => {
            if app.source.is_imported() {
                app.status_msg = "Clear the import (c) to search".to_string();
            } else {
                app.input_mode = InputMode::EditingQuery;
            }
        }
        KeyCode::Char('u') => {
            app.input_mode = InputMode::EditingImportPath;
        }
        KeyCode::Char('c') => {
            let effect = app.clear_import();
            run_effect(app, effect);
        }
        KeyCode::Left | KeyCode::Char('h') => {
            app.prev_page();
        }
        KeyCode::Right | KeyCode::Char('l') => {
            app.next_page();
        }
        KeyCode::Char('g') => {
            app.first_page();
        }
        KeyCode::Char('G') => {
            app.last_page();
        }
        KeyCode::Down | KeyCode::Char('j') => {
            app.scroll_down();
        }
        KeyCode::Up | KeyCode::Char('k') => {
            app.scroll_up();
        }
        KeyCode::PageDown => {
            app.scroll_page_down();
        }
        KeyCode::PageUp => {
            app.scroll_page_up();
        }
        _ => {}
    }
}

fn handle_query_input(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Enter => {
            // A blank query is swallowed and the bar stays open
            let effect = app.submit_search();
            if effect != Effect::None {
                app.input_mode = InputMode::Normal;
                run_effect(app, effect);
            }
        }
        KeyCode::Esc => {
            app.input_mode = InputMode::Normal;
        }
        KeyCode::Backspace => {
            app.query.pop();
        }
        KeyCode::Char(c) => {
            app.query.push(c);
        }
        _ => {}
    }
}

fn handle_import_input(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Enter => {
            if !app.import_path.trim().is_empty() {
                let path = app.import_path.trim().to_string();
                app.apply_import(import::load_books(Path::new(&path)));
                app.input_mode = InputMode::Normal;
            }
        }
        KeyCode::Esc => {
            app.input_mode = InputMode::Normal;
        }
        KeyCode::Backspace => {
            app.import_path.pop();
        }
        KeyCode::Char(c) => {
            app.import_path.push(c);
        }
        _ => {}
    }
}

fn run_effect(app: &mut App, effect: Effect) {
    if let Effect::Fetch(query) = effect {
        app.begin_fetch(&query);
    }
}

async fn run_headless_search(query: &str, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(ProgressStyle::default_spinner().template("{spinner:.green} {msg}")?);
    spinner.set_message(format!("Searching for \"{query}\"..."));
    spinner.enable_steady_tick(Duration::from_millis(80));

    let client = reqwest::Client::new();
    let result = api::search(&client, query).await;
    spinner.finish_and_clear();

    match result {
        Ok(response) => {
            if json {
                println!("{}", serde_json::to_string_pretty(&response.docs)?);
            } else {
                eprintln!("Found {} results", response.num_found);
                for book in &response.docs {
                    println!("{}\t{}", book.title(), book.authors_label());
                }
            }
            Ok(())
        }
        Err(e) => {
            eprintln!("Error: {}", e.user_message());
            std::process::exit(1);
        }
    }
}
