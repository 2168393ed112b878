use std::borrow::Cow;

use ratatui::{
    Frame,
    layout::{Alignment, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Paragraph, Wrap},
};
use unicode_width::UnicodeWidthStr;

mod widget;

pub use widget::Widget;

use crate::widgets::theme::{Theme, Variant};

/// A key binding shown in the footer (`short`) and in the help popup (`long`).
#[derive(Clone, Debug)]
pub struct Entry<'a> {
    pub keys: Cow<'a, str>,
    pub short: Cow<'a, str>,
    pub long: Cow<'a, str>,
}

impl Entry<'static> {
    pub const fn new(keys: &'static str, short: &'static str, long: &'static str) -> Self {
        Self {
            keys: Cow::Borrowed(keys),
            short: Cow::Borrowed(short),
            long: Cow::Borrowed(long),
        }
    }
}

const SEPARATOR: &str = " • ";

fn make_spans<'a>(entries: &'a [Entry<'a>], theme: &Theme) -> Vec<Span<'a>> {
    let mut spans: Vec<_> = entries
        .iter()
        .filter(|entry| !entry.keys.is_empty())
        .flat_map(|entry| {
            [
                Span::styled(
                    format!("[{}]", entry.keys),
                    Style::default().add_modifier(Modifier::BOLD),
                ),
                Span::raw(" "),
                Span::raw(entry.short.as_ref()),
                Span::styled(SEPARATOR, theme.faint()),
            ]
        })
        .collect();
    // Drop the trailing separator
    spans.pop();
    spans
}

/// Rows the footer needs to show every entry at the given width.
pub fn height(entries: &[Entry<'_>], area: Rect) -> u16 {
    if area.width == 0 {
        return 0;
    }
    let theme = Theme::new(Variant::Dark);
    let total_width: usize = make_spans(entries, &theme)
        .iter()
        .map(|span| span.content.width())
        .sum();
    total_width.div_ceil(area.width as usize) as u16
}

pub fn render(entries: &[Entry<'_>], frame: &mut Frame, area: Rect, theme: &Theme) {
    let spans = make_spans(entries, theme);
    let footer = Paragraph::new(Line::from(spans))
        .style(theme.text())
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true });

    frame.render_widget(footer, area);
}

#[cfg(test)]
mod tests {
    use super::*;

    const ENTRIES: [Entry<'static>; 2] = [
        Entry::new("tab", "next", "Next field"),
        Entry::new("esc", "quit", "Quit"),
    ];

    #[test]
    fn spans_skip_trailing_separator() {
        let theme = Theme::new(Variant::Dark);
        let text: String = make_spans(&ENTRIES, &theme)
            .iter()
            .map(|span| span.content.as_ref())
            .collect();
        assert_eq!(text, "[tab] next • [esc] quit");
    }

    #[test]
    fn height_wraps_by_width() {
        // "[tab] next • [esc] quit" is 23 columns wide.
        assert_eq!(height(&ENTRIES, Rect::new(0, 0, 80, 1)), 1);
        assert_eq!(height(&ENTRIES, Rect::new(0, 0, 10, 1)), 3);
        assert_eq!(height(&ENTRIES, Rect::new(0, 0, 0, 1)), 0);
    }
}
