//! File logging, enabled by setting `GMENU_LOG` to a filter directive.
//!
//! The terminal belongs to the UI while the picker runs, so log lines go to
//! `<state dir>/gmenu.log` instead of stderr.

use anyhow::{Context, Result};
use std::fs::OpenOptions;
use std::path::PathBuf;
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;

pub const LOG_ENV: &str = "GMENU_LOG";

/// Install the global subscriber. Returns the log file path, or `None` when
/// logging is off.
pub fn init() -> Result<Option<PathBuf>> {
    let filter = match EnvFilter::try_from_env(LOG_ENV) {
        Ok(f) => f,
        Err(_) => return Ok(None),
    };
    let dir = crate::config::state_dir();
    std::fs::create_dir_all(&dir).with_context(|| format!("creating {}", dir.display()))?;
    let path = dir.join("gmenu.log");
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| format!("opening {}", path.display()))?;
    let installed = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .try_init();
    if installed.is_err() {
        // someone else already owns the global subscriber
        return Ok(None);
    }
    Ok(Some(path))
}
