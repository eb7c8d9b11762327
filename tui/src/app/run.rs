use std::{io, time::Duration};

use anyhow::{Context, Result};
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use log::info;
use netviz::{stream::FetchDriver, DashboardConfig};
use ratatui::{backend::CrosstermBackend, Terminal};

use crate::{
    input,
    state::{host::TabHost, model::Action, session::DashboardState},
    ui::{draw, layout, surface},
};

// Redraw often enough for the 80 ms color transitions to look smooth.
const FRAME: Duration = Duration::from_millis(16);
const SHUTDOWN_GRACE: Duration = Duration::from_millis(250);

struct TerminalGuard;

impl TerminalGuard {
    fn enter() -> Result<Self> {
        enable_raw_mode()?;
        execute!(io::stdout(), EnterAlternateScreen, EnableMouseCapture)?;
        Ok(Self)
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), DisableMouseCapture, LeaveAlternateScreen);
    }
}

/// Runs the TUI application.
///
/// # Errors
/// Returns an error if the configuration is invalid, the start-up net cannot
/// be loaded, or terminal setup or rendering fails.
pub fn run() -> Result<()> {
    let config = DashboardConfig::from_env().context("reading configuration")?;
    let runtime = tokio::runtime::Runtime::new()?;
    let backend = config.backend.connect();

    let _guard = TerminalGuard::enter()?;
    let mut terminal = Terminal::new(CrosstermBackend::new(io::stdout()))?;
    terminal.clear()?;

    let mut canvas = layout::canvas(terminal.size()?);
    let mut host = TabHost::default();
    let app = runtime
        .block_on(netviz::open(
            &config,
            backend.as_ref(),
            surface::area_to_pixels(canvas),
            &mut host,
            &netviz::stream::SystemClock,
        ))
        .with_context(|| format!("opening net '{}'", config.net))?;

    let driver = FetchDriver::new(backend, runtime.handle().clone());
    let mut state = DashboardState::new(app, host, driver);

    loop {
        let area = layout::canvas(terminal.size()?);
        if area != canvas {
            canvas = area;
            state.resize(surface::area_to_pixels(canvas));
        }

        state.tick();
        let now = state.now();
        terminal.draw(|f| draw::draw(f, &state, now))?;

        if !event::poll(FRAME)? {
            continue;
        }
        let action = match event::read()? {
            Event::Key(k) if k.kind == KeyEventKind::Press => input::on_key(k.code),
            Event::Mouse(m) => input::on_mouse(m, canvas),
            _ => Action::None,
        };
        if !state.handle(action) {
            break;
        }
    }

    info!("shutting down");
    state.shutdown();
    drop(state);
    // Blocking HTTP calls cannot be cancelled, only abandoned.
    runtime.shutdown_timeout(SHUTDOWN_GRACE);

    terminal.show_cursor()?;
    Ok(())
}
