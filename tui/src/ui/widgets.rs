use ratatui::{
    layout::Constraint,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, Wrap},
};

use crate::state::session::DashboardState;

use super::theme::Theme;

fn panel(title: &str) -> Block<'_> {
    Block::default()
        .borders(Borders::ALL)
        .border_style(Theme::border())
        .title(Span::styled(title, Theme::title()))
}

fn tab<'a>(name: &'a str, selected: bool) -> Span<'a> {
    if selected {
        Span::styled(format!(" [{name}] "), Theme::highlight())
    } else {
        Span::styled(format!("  {name}  "), Theme::dim())
    }
}

pub fn tabs(state: &DashboardState) -> Paragraph<'_> {
    let app = state.app();
    let active_net = app.active_net();
    let active_view = app.active_view();

    let mut nets = vec![Span::raw("nets:  ")];
    nets.extend(
        app.nets()
            .map(|(id, net)| tab(net.name(), Some(id) == active_net)),
    );

    let mut views = vec![Span::raw("views: ")];
    if let Some(net) = active_net.and_then(|id| app.net(id)) {
        views.extend(net.views().iter().filter_map(|&id| {
            app.view(id)
                .map(|view| tab(view.name(), Some(id) == active_view))
        }));
    }

    Paragraph::new(vec![Line::from(nets), Line::from(views)]).block(panel("netviz"))
}

pub fn header(state: &DashboardState) -> Paragraph<'_> {
    let Some(view) = state.visible_view() else {
        return Paragraph::new("no view").block(panel("Stream"));
    };

    let stream = if view.stream().is_streaming() {
        Theme::streaming()
    } else {
        Theme::title()
    };
    let elapsed = state.elapsed().as_secs();

    let line = Line::from(vec![
        Span::styled(format!("[s] {}", view.stream_label()), stream),
        Span::raw("  |  "),
        Span::raw(format!(
            "every {} ms",
            view.stream().interval().as_millis()
        )),
        Span::raw("  |  "),
        Span::raw(format!("zoom {:.2}x", view.canvas().viewport().scale())),
        Span::raw("  |  "),
        Span::raw(format!("frames {}", state.frames())),
        Span::raw("  |  "),
        Span::styled(
            format!("{:02}:{:02}", elapsed / 60, elapsed % 60),
            Theme::dim(),
        ),
    ]);

    Paragraph::new(line).block(panel("Stream"))
}

pub fn canvas(state: &DashboardState) -> Block<'_> {
    let title = match state.visible_view() {
        Some(view) => format!("{} / {}", view.net(), view.name()),
        None => "Canvas".to_string(),
    };

    Block::default()
        .borders(Borders::ALL)
        .border_style(Theme::border())
        .title(Span::styled(title, Theme::title()))
        .style(Theme::base())
}

pub fn layers(state: &DashboardState) -> Table<'_> {
    let header = Row::new(vec!["layer", "shape", "projections"])
        .style(Style::default().add_modifier(Modifier::BOLD));

    let app = state.app();
    let spec = app
        .active_net()
        .and_then(|id| app.net(id))
        .map(|net| net.spec());

    let rows = spec
        .into_iter()
        .flat_map(|spec| spec.layers.iter())
        .map(|layer| {
            Row::new(vec![
                Cell::from(layer.name.as_str()),
                Cell::from(layer.shape.to_string()),
                Cell::from(layer.projections.join(", ")),
            ])
        });

    Table::new(
        rows,
        [
            Constraint::Length(10),
            Constraint::Length(7),
            Constraint::Min(8),
        ],
    )
    .header(header)
    .block(panel("Layers"))
}

pub fn logs(state: &DashboardState) -> Paragraph<'_> {
    let tail = state.logs().iter().rev().take(6).rev();

    let lines = tail
        .map(|l| {
            Line::from(vec![
                Span::styled(format!("[{}] ", l.level.as_str()), Theme::level(l.level)),
                Span::raw(l.message.as_str()),
            ])
        })
        .collect::<Vec<_>>();

    Paragraph::new(lines)
        .block(panel("Events"))
        .wrap(Wrap { trim: true })
}
