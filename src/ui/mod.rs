mod card;
mod help;
mod results;

use crate::app::App;
use ratatui::Frame;

/// Top-level render dispatch.
pub fn render(app: &App, frame: &mut Frame) {
    results::render(app, frame);

    // Render help overlay on top if active
    if app.show_help {
        help::render(frame);
    }
}
