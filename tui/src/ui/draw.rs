use std::time::Instant;

use ratatui::{widgets::Block, Frame};

use crate::state::session::DashboardState;

use super::{layout, surface::BufferSurface, theme::Theme, widgets};

/// Draws the entire UI.
pub fn draw(f: &mut Frame, state: &DashboardState, now: Instant) {
    let area = f.size();
    f.render_widget(Block::default().style(Theme::base()), area);

    let (tabs_area, header_area, body_area, logs_area) = layout::vertical(area);
    let (canvas_area, layers_area) = layout::body(body_area);

    f.render_widget(widgets::tabs(state), tabs_area);
    f.render_widget(widgets::header(state), header_area);
    f.render_widget(widgets::canvas(state), canvas_area);
    f.render_widget(widgets::layers(state), layers_area);
    f.render_widget(widgets::logs(state), logs_area);

    if let Some(view) = state.visible_view() {
        let inner = layout::canvas(area);
        let mut surface = BufferSurface::new(f.buffer_mut(), inner);
        view.paint(&mut surface, now);
    }
}
