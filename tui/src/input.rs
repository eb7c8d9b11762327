use crossterm::event::{KeyCode, MouseButton, MouseEvent, MouseEventKind};
use ratatui::layout::Rect;

use crate::{state::model::Action, ui::surface};

const ZOOM_STEP: f64 = 1.25;
const WHEEL_STEP: f64 = 1.1;
// Pixels per arrow key press.
const PAN_STEP: f64 = 32.0;

pub fn on_key(code: KeyCode) -> Action {
    match code {
        KeyCode::Char('q') | KeyCode::Esc => Action::Quit,
        KeyCode::Char('s') | KeyCode::Char(' ') => Action::ToggleStream,
        KeyCode::Char('n') => Action::NextNet,
        KeyCode::Tab => Action::NextView,
        KeyCode::Char('a') => Action::AddView,
        KeyCode::Char('x') => Action::CloseView,
        KeyCode::Char('+') | KeyCode::Char('=') => Action::Zoom {
            anchor: None,
            factor: ZOOM_STEP,
        },
        KeyCode::Char('-') => Action::Zoom {
            anchor: None,
            factor: 1.0 / ZOOM_STEP,
        },
        KeyCode::Left => Action::Pan { dx: PAN_STEP, dy: 0.0 },
        KeyCode::Right => Action::Pan { dx: -PAN_STEP, dy: 0.0 },
        KeyCode::Up => Action::Pan { dx: 0.0, dy: PAN_STEP },
        KeyCode::Down => Action::Pan { dx: 0.0, dy: -PAN_STEP },
        KeyCode::Char('0') => Action::ResetViewport,
        KeyCode::Char('f') => Action::Fit,
        _ => Action::None,
    }
}

/// Maps a mouse event to an action on the canvas drawn in `canvas`.
///
/// Presses and wheel turns outside the canvas are ignored; moves and releases
/// are not, so a drag can leave the canvas and still end.
pub fn on_mouse(event: MouseEvent, canvas: Rect) -> Action {
    let inside = event.column >= canvas.x
        && event.column < canvas.x + canvas.width
        && event.row >= canvas.y
        && event.row < canvas.y + canvas.height;
    let at = surface::cell_to_pixels(canvas, event.column, event.row);

    match event.kind {
        MouseEventKind::Down(MouseButton::Left) if inside => Action::PointerDown(at),
        MouseEventKind::Drag(MouseButton::Left) => Action::PointerMove(at),
        MouseEventKind::Up(MouseButton::Left) => Action::PointerUp,
        MouseEventKind::ScrollUp if inside => Action::Zoom {
            anchor: Some(at),
            factor: WHEEL_STEP,
        },
        MouseEventKind::ScrollDown if inside => Action::Zoom {
            anchor: Some(at),
            factor: 1.0 / WHEEL_STEP,
        },
        _ => Action::None,
    }
}
