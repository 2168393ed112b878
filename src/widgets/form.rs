use std::{cell::Cell, convert::Infallible};

use crossterm::event::{Event, KeyCode, KeyModifiers};
use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, BorderType, Paragraph},
};

use dynaform::form::{Form, SubmitOutcome};

use crate::{
    help,
    util::pad,
    widgets::{
        EnvHandle,
        text_input::TextInput,
        theme::{ButtonState, Theme},
    },
};

const INPUT_HEIGHT: u16 = 3;
const ERROR_HEIGHT: u16 = 1;

const HELP_ENTRIES: [help::Entry<'static>; 7] = [
    help::Entry::new("tab/shift+tab", "move", "Next/previous field or button"),
    help::Entry::new("enter", "next/press", "Next field, or press the focused button"),
    help::Entry::new("^s", "submit", "Validate and submit the form"),
    help::Entry::new("^n", "add field", "Add a field (up to 15)"),
    help::Entry::new("pgup/pgdn", "scroll", "Scroll the records table"),
    help::Entry::new("f1", "help", "Show all key bindings"),
    help::Entry::new("esc", "quit", "Quit"),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Focus {
    Field(usize),
    Submit,
    AddField,
}

/// The input form: one text input per registered field, then the submit and
/// add-field buttons.
pub struct FormWidget {
    form: Form,
    inputs: Vec<TextInput>,
    focus: Focus,
    scroll_offset: Cell<u16>,
    help_entries: Vec<help::Entry<'static>>,
}

impl FormWidget {
    pub fn new(form: Form) -> Self {
        let inputs = vec![TextInput::default(); form.fields().len()];
        let mut widget = Self {
            form,
            inputs,
            focus: Focus::Field(0),
            scroll_offset: Cell::new(0),
            help_entries: HELP_ENTRIES.to_vec(),
        };
        widget.set_focus(Focus::Field(0));
        widget
    }

    pub fn form(&self) -> &Form {
        &self.form
    }

    /// Called once the coordinator has handled the create request started by
    /// the last submit. Create failures are logged there, so the form always
    /// clears.
    pub fn finish_submit(&mut self) -> SubmitOutcome {
        let outcome = self.form.finish_submit(Ok::<(), Infallible>(()));
        self.inputs.iter_mut().for_each(TextInput::reset);
        outcome
    }

    fn focus_order(&self) -> Vec<Focus> {
        let mut order: Vec<_> = (0..self.inputs.len()).map(Focus::Field).collect();
        order.push(Focus::Submit);
        if self.form.fields().can_add() {
            order.push(Focus::AddField);
        }
        order
    }

    fn set_focus(&mut self, focus: Focus) {
        self.focus = match focus {
            Focus::Field(idx) if idx >= self.inputs.len() => Focus::Submit,
            Focus::AddField if !self.form.fields().can_add() => Focus::Submit,
            other => other,
        };
        for (idx, input) in self.inputs.iter_mut().enumerate() {
            input.set_active(self.focus == Focus::Field(idx));
        }
    }

    fn move_focus(&mut self, forward: bool) {
        let order = self.focus_order();
        let idx = order.iter().position(|f| *f == self.focus).unwrap_or(0);
        let next = if forward {
            order[(idx + 1) % order.len()]
        } else {
            order[(idx + order.len() - 1) % order.len()]
        };
        self.set_focus(next);
    }

    fn submit(&mut self, env: &EnvHandle) {
        if self.form.is_submitting() {
            return;
        }
        match self.form.begin_submit() {
            Some(values) => env.submit(values),
            None => {
                let first_invalid = self
                    .form
                    .fields()
                    .names()
                    .iter()
                    .position(|name| self.form.error(name).is_some());
                if let Some(idx) = first_invalid {
                    self.set_focus(Focus::Field(idx));
                }
            }
        }
        env.invalidate();
    }

    fn add_field(&mut self, env: &EnvHandle) {
        match self.form.add_field() {
            Ok(_) => {
                self.inputs.push(TextInput::default());
                self.set_focus(Focus::Field(self.inputs.len() - 1));
            }
            Err(err) => tracing::debug!(error = %err, "Add field ignored"),
        }
        env.invalidate();
    }

    /// Start and height of every field row, in form coordinates.
    fn rows(&self) -> Vec<(u16, u16)> {
        let mut y: u16 = 0;
        self.form
            .fields()
            .names()
            .iter()
            .map(|name| {
                let height = if self.form.error(name).is_some() {
                    INPUT_HEIGHT + ERROR_HEIGHT
                } else {
                    INPUT_HEIGHT
                };
                let start = y;
                y = y.saturating_add(height);
                (start, height)
            })
            .collect()
    }

    fn ensure_visible(&self, rows: &[(u16, u16)], viewport_height: u16) -> u16 {
        let total_height = rows
            .last()
            .map(|(start, height)| start + height)
            .unwrap_or(0);
        let max_offset = total_height.saturating_sub(viewport_height);
        let mut offset = self.scroll_offset.get().min(max_offset);
        if let Focus::Field(idx) = self.focus
            && let Some(&(start, height)) = rows.get(idx)
        {
            if start < offset {
                offset = start;
            } else if start + height > offset + viewport_height {
                offset = (start + height).saturating_sub(viewport_height).min(max_offset);
            }
        }
        self.scroll_offset.set(offset);
        offset
    }

    fn render_fields(&self, frame: &mut Frame, area: Rect, theme: &Theme) {
        let rows = self.rows();
        let offset = self.ensure_visible(&rows, area.height);
        let view_bottom = offset.saturating_add(area.height);
        for (idx, (name, &(start, height))) in
            self.form.fields().names().iter().zip(rows.iter()).enumerate()
        {
            if start < offset || start + height > view_bottom {
                continue;
            }
            let y = area.y + (start - offset);
            let input_area = Rect::new(area.x, y, area.width, INPUT_HEIGHT);
            self.inputs[idx].render(frame, input_area, name, self.form.value(name), theme);
            if let Some(error) = self.form.error(name) {
                let error_area = Rect::new(area.x, y + INPUT_HEIGHT, area.width, ERROR_HEIGHT);
                let error = Paragraph::new(Span::styled(
                    format!(" {error}"),
                    theme.invalid(),
                ));
                frame.render_widget(error, error_area);
            }
        }
    }

    fn render_buttons(&self, frame: &mut Frame, area: Rect, theme: &Theme) {
        let state = |available: bool, button: Focus| {
            if !available {
                ButtonState::Disabled
            } else if self.focus == button {
                ButtonState::Focused
            } else {
                ButtonState::Idle
            }
        };
        let fields = self.form.fields();
        let submit_style = theme.button(state(!self.form.is_submitting(), Focus::Submit));
        let add_style = theme.button(state(fields.can_add(), Focus::AddField));

        let line = Line::from(vec![
            Span::styled(format!("[{}]", pad(self.form.submit_label(), 1)), submit_style),
            Span::raw("  "),
            Span::styled(format!("[{}]", pad(fields.add_label(), 1)), add_style),
        ]);
        frame.render_widget(Paragraph::new(line).alignment(Alignment::Center), area);
    }
}

impl crate::widgets::Widget for FormWidget {
    fn render(&self, frame: &mut Frame, area: Rect, theme: &Theme) {
        let title = Line::styled(
            format!(" Form ({} fields) ", self.form.fields().len()),
            theme.pane_title(),
        );
        let block = Block::bordered()
            .border_type(BorderType::Rounded)
            .title(title)
            .border_style(theme.border(false))
            .style(theme.pane());
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let layout = Layout::vertical([
            Constraint::Fill(1),
            Constraint::Length(1),
            Constraint::Length(1),
        ]);
        let [fields_area, _, buttons_area] = inner.layout(&layout);
        self.render_fields(frame, fields_area, theme);
        self.render_buttons(frame, buttons_area, theme);
    }

    fn handle_event(&mut self, env: EnvHandle, event: &Event) -> bool {
        let Some(key) = event.as_key_press_event() else {
            return false;
        };

        if key.modifiers.contains(KeyModifiers::CONTROL) {
            match key.code {
                KeyCode::Char('s') => {
                    self.submit(&env);
                    return true;
                }
                KeyCode::Char('n') => {
                    self.add_field(&env);
                    return true;
                }
                _ => {}
            }
        }

        match key.code {
            KeyCode::Tab | KeyCode::Down => {
                self.move_focus(true);
                env.invalidate();
                return true;
            }
            KeyCode::BackTab | KeyCode::Up => {
                self.move_focus(false);
                env.invalidate();
                return true;
            }
            KeyCode::Enter => {
                match self.focus {
                    Focus::Field(_) => {
                        self.move_focus(true);
                        env.invalidate();
                    }
                    Focus::Submit => self.submit(&env),
                    Focus::AddField => self.add_field(&env),
                }
                return true;
            }
            _ => {}
        }

        let Focus::Field(idx) = self.focus else {
            return false;
        };
        let name = self.form.fields().names()[idx].clone();
        let mut value = self.form.value(&name).to_string();
        if !self.inputs[idx].handle_event(&mut value, event) {
            return false;
        }
        if value != self.form.value(&name) {
            self.form.update_value(&name, value);
        }
        env.invalidate();
        true
    }

    fn help(&self) -> Option<&[help::Entry<'_>]> {
        Some(self.help_entries.as_slice())
    }
}
