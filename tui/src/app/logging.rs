use std::{env, fs::File};

use anyhow::{Context, Result};

/// Name of the variable that points the log at a file.
pub const LOG_VAR: &str = "NETVIZ_LOG";

/// Sends `log` output to the file named by `NETVIZ_LOG`.
///
/// The terminal belongs to the UI, so without that variable nothing is logged.
/// Filtering follows `RUST_LOG` as usual.
pub fn init() -> Result<()> {
    let Ok(path) = env::var(LOG_VAR) else {
        return Ok(());
    };

    let file = File::create(&path).with_context(|| format!("creating log file {path}"))?;
    env_logger::Builder::from_default_env()
        .target(env_logger::Target::Pipe(Box::new(file)))
        .init();

    log::info!("logging to {path}");
    Ok(())
}
