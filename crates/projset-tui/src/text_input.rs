//! Key mapping and drawing for single-line `tui-input` editors.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    Frame,
    layout::{Position, Rect},
    text::Span,
    widgets::Paragraph,
};
use tui_input::{Input, InputRequest};

use crate::theme;

/// Translate a key press into an edit, if it is one.
pub fn request(key: KeyEvent) -> Option<InputRequest> {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    match key.code {
        KeyCode::Char('u') if ctrl => Some(InputRequest::DeleteLine),
        KeyCode::Char('w') if ctrl => Some(InputRequest::DeletePrevWord),
        KeyCode::Char('a') if ctrl => Some(InputRequest::GoToStart),
        KeyCode::Char('e') if ctrl => Some(InputRequest::GoToEnd),
        KeyCode::Char(c) if !ctrl => Some(InputRequest::InsertChar(c)),
        KeyCode::Backspace => Some(InputRequest::DeletePrevChar),
        KeyCode::Delete => Some(InputRequest::DeleteNextChar),
        KeyCode::Left => Some(InputRequest::GoToPrevChar),
        KeyCode::Right => Some(InputRequest::GoToNextChar),
        KeyCode::Home => Some(InputRequest::GoToStart),
        KeyCode::End => Some(InputRequest::GoToEnd),
        _ => None,
    }
}

/// Apply a key to the input. Returns whether it was an edit key.
pub fn handle(input: &mut Input, key: KeyEvent) -> bool {
    match request(key) {
        Some(req) => {
            input.handle(req);
            true
        }
        None => false,
    }
}

/// Draw the input's visible window into `area` and place the cursor.
pub fn render(frame: &mut Frame, input: &Input, area: Rect) {
    let width = usize::from(area.width.max(1));
    let scroll = input.visual_scroll(width.saturating_sub(1));
    frame.render_widget(
        Paragraph::new(Span::styled(input.value(), theme::field_value()))
            .scroll((0, u16::try_from(scroll).unwrap_or(u16::MAX))),
        area,
    );
    let offset = input.visual_cursor().saturating_sub(scroll);
    let x = area.x + u16::try_from(offset).unwrap_or(area.width);
    frame.set_cursor_position(Position::new(x.min(area.right().saturating_sub(1)), area.y));
}
