use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Rect},
    text::Line,
    widgets::{
        Block, BorderType, Cell, HighlightSpacing, Paragraph, Row, StatefulWidget, Table,
        TableState, Widget,
    },
};
use unicode_width::UnicodeWidthStr;

use dynaform::{
    posts::Record,
    table::{NO_DATA_LABEL, cells, columns},
};

use crate::widgets::theme::Theme;

const MAX_COLUMN_WIDTH: usize = 32;

/// The records table. Columns follow the shape of the last record.
pub struct RecordsTable<'a> {
    records: &'a [Record],
    theme: &'a Theme,
}

impl<'a> RecordsTable<'a> {
    pub fn new(records: &'a [Record], theme: &'a Theme) -> Self {
        Self { records, theme }
    }

    fn block(&self) -> Block<'static> {
        let title = Line::styled(
            format!(" Records ({}) ", self.records.len()),
            self.theme.pane_title(),
        );
        Block::bordered()
            .border_type(BorderType::Rounded)
            .title(title)
            .border_style(self.theme.border(false))
            .style(self.theme.pane())
    }
}

impl StatefulWidget for RecordsTable<'_> {
    type State = TableState;

    fn render(self, area: Rect, buf: &mut Buffer, state: &mut TableState) {
        let block = self.block();
        if self.records.is_empty() {
            Paragraph::new(NO_DATA_LABEL)
                .style(self.theme.faint())
                .block(block)
                .render(area, buf);
            return;
        }

        let columns = columns(self.records);
        let grid: Vec<Vec<&str>> = self
            .records
            .iter()
            .map(|record| cells(record, &columns))
            .collect();
        let mut widest: Vec<usize> = columns.iter().map(|column| column.width()).collect();
        for row in &grid {
            for (width, cell) in widest.iter_mut().zip(row) {
                *width = (*width).max(cell.width());
            }
        }
        let widths: Vec<_> = widest
            .into_iter()
            .map(|width| Constraint::Length(width.clamp(1, MAX_COLUMN_WIDTH) as u16))
            .collect();

        let header = Row::new(columns.iter().map(|column| Cell::from(*column)))
            .style(self.theme.heading());
        let rows = grid.into_iter().map(Row::new);

        let table = Table::new(rows, widths)
            .header(header)
            .block(block)
            .column_spacing(2)
            .highlight_spacing(HighlightSpacing::Always)
            .highlight_symbol("> ")
            .row_highlight_style(self.theme.selected_row());
        StatefulWidget::render(table, area, buf, state);
    }
}

#[cfg(test)]
mod tests {
    use ratatui::{Terminal, backend::TestBackend};

    use dynaform::{
        FieldMap,
        posts::{RecordId, records_from_json},
    };

    use super::*;
    use crate::widgets::theme::Variant;

    fn draw(records: &[Record]) -> Vec<String> {
        let backend = TestBackend::new(40, 8);
        let mut terminal = Terminal::new(backend).unwrap();
        let theme = Theme::new(Variant::Dark);
        let mut state = TableState::default();
        terminal
            .draw(|frame| {
                frame.render_stateful_widget(
                    RecordsTable::new(records, &theme),
                    frame.area(),
                    &mut state,
                );
            })
            .unwrap();
        let buffer = terminal.backend().buffer();
        (0..buffer.area.height)
            .map(|y| {
                (0..buffer.area.width)
                    .map(|x| buffer[(x, y)].symbol())
                    .collect::<String>()
            })
            .collect()
    }

    fn record(id: i64, pairs: &[(&str, &str)]) -> Record {
        Record::new(RecordId(id), pairs.iter().copied().collect::<FieldMap>())
    }

    #[test]
    fn empty_shows_placeholder_only() {
        let lines = draw(&[]);
        assert!(lines[1].contains(NO_DATA_LABEL));
        assert!(lines.iter().skip(2).all(|line| !line.contains(NO_DATA_LABEL)));
    }

    #[test]
    fn loaded_record_renders_single_column() {
        let records = records_from_json(&serde_json::json!([{"id": 5, "x": "hi"}])).unwrap();
        let lines = draw(&records);
        assert!(lines[1].contains('x'), "header: {:?}", lines[1]);
        assert!(lines[2].contains("hi"), "row: {:?}", lines[2]);
        assert!(!lines.iter().any(|line| line.contains('5') && line.contains("hi")));
    }

    #[test]
    fn columns_come_from_last_record() {
        let records = vec![
            record(1, &[("alpha", "one"), ("beta", "two")]),
            record(2, &[("alpha", "three")]),
        ];
        let lines = draw(&records);
        assert!(lines[1].contains("alpha"));
        assert!(!lines.iter().any(|line| line.contains("beta") || line.contains("two")));
        assert!(lines[2].contains("one"));
        assert!(lines[3].contains("three"));
    }

    #[test]
    fn column_fits_widest_cell_of_any_row() {
        let records = vec![
            record(1, &[("x", "a-very-long-value"), ("y", "tail")]),
            record(2, &[("x", "b"), ("y", "end")]),
        ];
        let lines = draw(&records);
        assert!(lines[2].contains("a-very-long-value  tail"), "row: {:?}", lines[2]);
        assert!(lines[3].contains("b                  end"), "row: {:?}", lines[3]);
    }
}
