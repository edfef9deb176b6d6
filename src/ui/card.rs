use ratatui::{
    style::{Color, Modifier, Style},
    text::{Line, Span},
};

use crate::api::Book;

/// Render one book as the lines of a card: title, author list, cover URL.
///
/// Pure function of the record. An absent title renders as an empty line,
/// an absent or empty author list as "Unknown", and a missing cover id as
/// the fixed placeholder URL.
pub fn lines(book: &Book, max_width: usize) -> Vec<Line<'static>> {
    vec![
        Line::from(Span::styled(
            truncate_width(book.title(), max_width),
            Style::default()
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(vec![
            Span::styled("Author: ", Style::default().fg(Color::DarkGray)),
            Span::raw(truncate_width(&book.authors_label(), max_width)),
        ]),
        Line::from(Span::styled(
            book.cover_url(),
            Style::default().fg(Color::Blue),
        )),
    ]
}

/// Truncate a string to `max_width` display columns, adding "…" if truncated.
pub fn truncate_width(s: &str, max_width: usize) -> String {
    use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

    if s.width() <= max_width {
        return s.to_string();
    }
    let mut result = String::new();
    let mut used = 0;
    for c in s.chars() {
        let w = c.width().unwrap_or(0);
        if used + w > max_width.saturating_sub(1) {
            break;
        }
        used += w;
        result.push(c);
    }
    result.push('…');
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::PLACEHOLDER_COVER;

    fn text_of(line: &Line) -> String {
        line.spans.iter().map(|s| s.content.as_ref()).collect()
    }

    #[test]
    fn full_record_renders_all_three_lines() {
        let book = Book {
            title: Some("Walden".to_string()),
            author_name: Some(vec!["Henry David Thoreau".to_string()]),
            cover_i: Some(8305834),
        };
        let card = lines(&book, 80);
        assert_eq!(text_of(&card[0]), "Walden");
        assert_eq!(text_of(&card[1]), "Author: Henry David Thoreau");
        assert_eq!(
            text_of(&card[2]),
            "https://covers.openlibrary.org/b/id/8305834-M.jpg"
        );
    }

    #[test]
    fn empty_record_degrades_gracefully() {
        let card = lines(&Book::default(), 80);
        assert_eq!(text_of(&card[0]), "");
        assert_eq!(text_of(&card[1]), "Author: Unknown");
        assert_eq!(text_of(&card[2]), PLACEHOLDER_COVER);
    }

    #[test]
    fn truncation_respects_display_width() {
        assert_eq!(truncate_width("short", 10), "short");
        assert_eq!(truncate_width("a very long book title", 10), "a very lo…");
        // Wide characters count double
        assert_eq!(truncate_width("日本語のタイトル", 7), "日本語…");
    }
}
