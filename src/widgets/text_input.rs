use crossterm::event::{Event, KeyCode, KeyModifiers};
use ratatui::{
    Frame,
    layout::{Position, Rect},
    text::{Line, Span},
    widgets::{Block, Paragraph},
};
use unicode_width::UnicodeWidthStr;

use crate::widgets::theme::Theme;

/// Cursor and focus of one single-line input.
///
/// The text itself lives in the form; the input only edits a copy of it and
/// reports whether anything changed. The cursor counts characters, not bytes.
#[derive(Debug, Default, Clone)]
pub struct TextInput {
    cursor: usize,
    active: bool,
}

impl TextInput {
    pub fn set_active(&mut self, active: bool) {
        self.active = active;
    }

    pub fn reset(&mut self) {
        self.cursor = 0;
    }

    pub fn render(
        &self,
        frame: &mut Frame,
        area: Rect,
        label: &str,
        value: &str,
        theme: &Theme,
    ) {
        let block = Block::bordered()
            .title(label)
            .style(theme.input())
            .border_style(theme.border(self.active));

        let inner_width = area.width.saturating_sub(2) as usize;
        let cursor = self.cursor.min(value.chars().count());
        let before_cursor: String = value.chars().take(cursor).collect();
        let cursor_col = before_cursor.width();
        // Scroll horizontally so the cursor stays inside the box.
        let scroll = cursor_col.saturating_sub(inner_width.saturating_sub(1));
        let input = Paragraph::new(Line::from(Span::styled(value, theme.text())))
        .scroll((0, scroll as u16))
        .block(block);
        frame.render_widget(input, area);

        if self.active && area.width > 2 && area.height > 2 {
            frame.set_cursor_position(Position::new(
                area.x + (cursor_col - scroll) as u16 + 1,
                area.y + 1,
            ));
        }
    }

    /// Applies an editing key to `value`. Returns true if the event was used.
    pub fn handle_event(&mut self, value: &mut String, evt: &Event) -> bool {
        if !self.active {
            return false;
        }
        let Some(key) = evt.as_key_press_event() else {
            return false;
        };
        let len = value.chars().count();
        self.cursor = self.cursor.min(len);
        match key.code {
            KeyCode::Char('a') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.cursor = 0;
            }
            KeyCode::Char('e') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.cursor = len;
            }
            KeyCode::Char(_) if key.modifiers.contains(KeyModifiers::CONTROL) => {
                return false;
            }
            KeyCode::Char(c) => {
                value.insert(byte_index(value, self.cursor), c);
                self.cursor += 1;
            }
            KeyCode::Backspace => {
                if self.cursor > 0 {
                    value.remove(byte_index(value, self.cursor - 1));
                    self.cursor -= 1;
                }
            }
            KeyCode::Delete => {
                if self.cursor < len {
                    value.remove(byte_index(value, self.cursor));
                }
            }
            KeyCode::Left => {
                self.cursor = self.cursor.saturating_sub(1);
            }
            KeyCode::Right => {
                if self.cursor < len {
                    self.cursor += 1;
                }
            }
            KeyCode::Home => {
                self.cursor = 0;
            }
            KeyCode::End => {
                self.cursor = len;
            }
            _ => {
                return false;
            }
        }
        true
    }
}

fn byte_index(value: &str, char_index: usize) -> usize {
    value
        .char_indices()
        .nth(char_index)
        .map(|(idx, _)| idx)
        .unwrap_or(value.len())
}

#[cfg(test)]
mod tests {
    use crossterm::event::{KeyEvent, KeyEventKind, KeyEventState};

    use super::*;

    fn key(code: KeyCode) -> Event {
        key_with(code, KeyModifiers::NONE)
    }

    fn key_with(code: KeyCode, modifiers: KeyModifiers) -> Event {
        Event::Key(KeyEvent {
            code,
            modifiers,
            kind: KeyEventKind::Press,
            state: KeyEventState::NONE,
        })
    }

    fn active() -> TextInput {
        let mut input = TextInput::default();
        input.set_active(true);
        input
    }

    #[test]
    fn typing_inserts_at_cursor() {
        let mut input = active();
        let mut value = String::new();
        for c in "héllo".chars() {
            assert!(input.handle_event(&mut value, &key(KeyCode::Char(c))));
        }
        input.handle_event(&mut value, &key(KeyCode::Home));
        input.handle_event(&mut value, &key(KeyCode::Right));
        input.handle_event(&mut value, &key(KeyCode::Right));
        input.handle_event(&mut value, &key(KeyCode::Backspace));
        assert_eq!(value, "hllo");
        input.handle_event(&mut value, &key(KeyCode::Char('e')));
        assert_eq!(value, "hello");
        input.handle_event(&mut value, &key(KeyCode::Delete));
        assert_eq!(value, "helo");
    }

    #[test]
    fn inactive_input_ignores_keys() {
        let mut input = TextInput::default();
        let mut value = String::new();
        assert!(!input.handle_event(&mut value, &key(KeyCode::Char('x'))));
        assert!(value.is_empty());
    }

    #[test]
    fn control_chords_are_not_text() {
        let mut input = active();
        let mut value = "abc".to_string();
        assert!(input.handle_event(&mut value, &key_with(KeyCode::Char('a'), KeyModifiers::CONTROL)));
        assert!(!input.handle_event(&mut value, &key_with(KeyCode::Char('s'), KeyModifiers::CONTROL)));
        assert_eq!(value, "abc");
    }

    #[test]
    fn cursor_is_clamped_after_external_clear() {
        let mut input = active();
        let mut value = "abc".to_string();
        input.handle_event(&mut value, &key(KeyCode::End));
        let mut cleared = String::new();
        assert!(input.handle_event(&mut cleared, &key(KeyCode::Char('z'))));
        assert_eq!(cleared, "z");
    }
}
