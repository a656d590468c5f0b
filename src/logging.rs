//! Tracing subscriber setup.
//!
//! `RUST_LOG` wins over `logging.level`. Logs go to `logging.file` when set,
//! otherwise to `$XDG_STATE_HOME/sonance/sonance.log`. The terminal is in raw
//! mode with a redrawn status line, so nothing is written to stderr once the
//! session runs.

use std::ffi::OsString;
use std::fs::{self, OpenOptions};
use std::path::PathBuf;
use std::sync::Mutex;

use tracing_subscriber::EnvFilter;

use crate::config::LoggingSettings;

pub fn init(settings: &LoggingSettings) -> Result<(), Box<dyn std::error::Error>> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&settings.level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(false);

    let path = settings.file.clone().or_else(default_log_path);
    let result = match path {
        Some(path) => {
            if let Some(dir) = path.parent() {
                fs::create_dir_all(dir)?;
            }
            let file = OpenOptions::new().create(true).append(true).open(&path)?;
            builder.with_writer(Mutex::new(file)).try_init()
        }
        // Nowhere safe to write; drop the logs rather than garble the terminal.
        None => builder.with_writer(std::io::sink).try_init(),
    };

    // A subscriber may already be installed (e.g. by a test harness).
    if let Err(e) = result {
        eprintln!("sonance: logging already initialised: {e}");
    }
    Ok(())
}

/// `$XDG_STATE_HOME/sonance/sonance.log`, or `~/.local/state/sonance/sonance.log`.
fn default_log_path() -> Option<PathBuf> {
    log_path_from(
        std::env::var_os("XDG_STATE_HOME"),
        std::env::var_os("HOME"),
    )
}

fn log_path_from(xdg_state_home: Option<OsString>, home: Option<OsString>) -> Option<PathBuf> {
    let state_home = match xdg_state_home.filter(|s| !s.is_empty()) {
        Some(xdg) => PathBuf::from(xdg),
        None => PathBuf::from(home?).join(".local").join("state"),
    };
    Some(state_home.join("sonance").join("sonance.log"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_path_prefers_xdg_state_home() {
        assert_eq!(
            log_path_from(Some("/xdg/state".into()), Some("/home/u".into())),
            Some(PathBuf::from("/xdg/state/sonance/sonance.log"))
        );
    }

    #[test]
    fn log_path_falls_back_to_home_local_state() {
        assert_eq!(
            log_path_from(None, Some("/home/u".into())),
            Some(PathBuf::from("/home/u/.local/state/sonance/sonance.log"))
        );
        assert_eq!(
            log_path_from(Some("".into()), Some("/home/u".into())),
            Some(PathBuf::from("/home/u/.local/state/sonance/sonance.log"))
        );
        assert_eq!(log_path_from(None, None), None);
    }
}
