use std::sync::Arc;

use crossterm::event::Event;
use ratatui::{Frame, layout::Rect};
use theme::Theme;

use dynaform::FieldMap;

mod form;
mod records;
mod text_input;
pub mod theme;

pub use form::FormWidget;
pub use records::RecordsTable;

use crate::help;

/// Requests a widget can make of the application loop.
pub trait Env {
    fn invalidate(&self);
    /// Hands validated form values to the coordinator for creation.
    fn submit(&self, values: FieldMap);
    fn set_popup(&self, popup: Box<dyn Popup + Send>);
    fn dismiss_popup(&self);
}

pub type EnvHandle = Arc<dyn Env + Send + Sync>;

pub trait Widget {
    /// Render the widget's content.
    fn render(&self, frame: &mut Frame, area: Rect, theme: &Theme);

    /// Handle input events. Returns true if the event was handled.
    fn handle_event(&mut self, _env: EnvHandle, _event: &Event) -> bool {
        false
    }

    /// Optional help to display at the bottom while this widget is active
    fn help(&self) -> Option<&[help::Entry<'_>]> {
        None
    }
}

pub trait Popup: Widget {
    fn rect(&self, area: Rect) -> Rect;
}
