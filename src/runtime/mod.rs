use std::env;
use std::io::Write;
use std::path::PathBuf;
use std::sync::mpsc;
use std::time::Duration;

use crossterm::cursor::{Hide, Show};
use crossterm::execute;
use crossterm::terminal::{disable_raw_mode, enable_raw_mode};
use tracing::{info, warn};

use crate::mpris::ControlCmd;
use crate::output::RodioOutput;
use crate::playback::{PlaybackController, SessionOptions};

mod event_loop;
mod mpris_sync;
mod settings;
mod startup;
mod status;

#[cfg(test)]
mod tests;

pub fn run() -> Result<(), Box<dyn std::error::Error>> {
    let (settings, settings_warning) = settings::load_settings();
    crate::logging::init(&settings.logging)?;
    if let Some(msg) = settings_warning {
        warn!("{msg}");
    }

    let mut args = env::args().skip(1);
    let target = args
        .next()
        .map(PathBuf::from)
        .or_else(|| env::current_dir().ok())
        .unwrap_or_else(|| PathBuf::from("."));
    let selection = args.next().map(|a| startup::Selection::parse(&a));

    let catalog = startup::load_catalog(&target, selection.as_ref(), &settings.catalog)?;
    info!(tracks = catalog.len(), "catalog ready");

    let output = RodioOutput::spawn();
    let mut controller =
        PlaybackController::new(catalog, output, SessionOptions::from(&settings));

    let (control_tx, control_rx) = mpsc::channel::<ControlCmd>();
    let mpris = crate::mpris::spawn_mpris(control_tx);
    mpris_sync::update_mpris(&mpris, &controller);

    enable_raw_mode()?;
    let mut stdout = std::io::stdout();
    execute!(stdout, Hide)?;

    let run_result =
        event_loop::run(&mut stdout, &settings, &mut controller, &mpris, &control_rx);

    disable_raw_mode()?;
    execute!(stdout, Show)?;
    writeln!(stdout)?;

    controller
        .into_output()
        .quit_softly(Duration::from_millis(settings.audio.quit_fade_out_ms));

    run_result
}
