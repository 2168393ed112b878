use crossterm::event::{Event, KeyCode};
use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, BorderType, Clear, Padding, Paragraph, Row, Table},
};

use crate::{
    help::Entry,
    util::{fill_bg, pad},
    widgets::{EnvHandle, Popup, theme::Theme},
};

/// Popup listing every key binding with its long description.
pub struct Widget {
    entries: Vec<Entry<'static>>,
    footnote: Option<String>,
}

impl Widget {
    pub fn new(entries: &[Entry<'_>], footnote: Option<String>) -> Self {
        Self {
            entries: entries
                .iter()
                .map(|entry| Entry {
                    keys: entry.keys.clone().into_owned().into(),
                    short: entry.short.clone().into_owned().into(),
                    long: entry.long.clone().into_owned().into(),
                })
                .collect(),
            footnote,
        }
    }
}

impl crate::widgets::Widget for Widget {
    fn render(&self, frame: &mut Frame, area: Rect, theme: &Theme) {
        frame.render_widget(Clear, area);
        fill_bg(frame.buffer_mut(), area, theme.surface());
        let title = Line::styled(
            pad("Help", 2),
            theme.pane_title(),
        )
        .centered();
        let block = Block::bordered()
            .border_type(BorderType::Rounded)
            .title(title)
            .border_style(theme.border(false))
            .style(theme.pane())
            .padding(Padding::new(2, 2, 1, 1));
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let footnote_height = u16::from(self.footnote.is_some());
        let layout = Layout::vertical([Constraint::Fill(1), Constraint::Length(footnote_height)]);
        let [table_area, footnote_area] = inner.layout(&layout);

        let rows: Vec<_> = self
            .entries
            .chunks(2)
            .map(|chunk| {
                let mut cells = Vec::with_capacity(4);
                for entry in chunk {
                    cells.push(Line::from(display_key(entry, theme)));
                    cells.push(Line::from(Span::styled(
                        entry.long.to_string(),
                        theme.text(),
                    )));
                }
                Row::new(cells)
            })
            .collect();
        let widths = [
            Constraint::Length(12),
            Constraint::Fill(1),
            Constraint::Length(12),
            Constraint::Fill(1),
        ];
        let table = Table::new(rows, widths).style(theme.text());
        frame.render_widget(table, table_area);

        if let Some(footnote) = self.footnote.as_deref() {
            let footnote =
                Paragraph::new(footnote).style(theme.faint());
            frame.render_widget(footnote, footnote_area);
        }
    }

    fn handle_event(&mut self, env: EnvHandle, event: &Event) -> bool {
        let Some(key) = event.as_key_press_event() else {
            return true;
        };
        if matches!(key.code, KeyCode::F(1) | KeyCode::Esc | KeyCode::Enter) {
            env.dismiss_popup();
        }
        true
    }
}

impl Popup for Widget {
    fn rect(&self, area: Rect) -> Rect {
        let width = (area.width * 2 / 3).max(40).min(area.width);
        let height = (area.height / 2).max(10).min(area.height);
        let x = area.x + (area.width - width) / 2;
        let y = area.y + (area.height - height) / 2;
        Rect {
            x,
            y,
            width,
            height,
        }
    }
}

fn display_key(entry: &Entry<'_>, theme: &Theme) -> Span<'static> {
    Span::styled(
        format!("[{}]", entry.keys),
        theme.heading(),
    )
}
