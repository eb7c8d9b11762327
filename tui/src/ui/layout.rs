use ratatui::layout::{Constraint, Direction, Layout, Margin, Rect};

/// Computes the main layout regions.
///
/// # Returns
/// (tabs, header, body, logs)
pub fn vertical(area: Rect) -> (Rect, Rect, Rect, Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(4),
            Constraint::Length(3),
            Constraint::Min(10),
            Constraint::Length(8),
        ])
        .split(area);

    (chunks[0], chunks[1], chunks[2], chunks[3])
}

/// Splits body into (canvas, layers).
pub fn body(area: Rect) -> (Rect, Rect) {
    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Min(40), Constraint::Length(36)])
        .split(area);

    (cols[0], cols[1])
}

/// The drawable inside of the canvas panel, borders excluded.
///
/// Shared by drawing and mouse mapping so both agree on the pixel origin.
pub fn canvas(area: Rect) -> Rect {
    let (_, _, main, _) = vertical(area);
    let (canvas, _) = body(main);
    canvas.inner(&Margin::new(1, 1))
}
