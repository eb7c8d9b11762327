use anyhow::Result;

mod app;
mod input;
mod state;
mod ui;

fn main() -> Result<()> {
    app::logging::init()?;
    app::run::run()
}
