use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;
use std::time::Duration;

use tracing::debug;

use crate::error::OutputError;

use super::sink::resolve_locator;
use super::thread::{TaggedEvent, spawn_output_thread};
use super::types::{AudioOutput, ClockHandle, OutputClock, OutputCmd, OutputEvent};

/// [`AudioOutput`] backed by `rodio`, running on its own thread.
pub struct RodioOutput {
    tx: Sender<OutputCmd>,
    events: Receiver<TaggedEvent>,
    clock: ClockHandle,
    generation: u64,
    loaded: bool,
    join: Option<JoinHandle<()>>,
}

impl RodioOutput {
    pub fn spawn() -> Self {
        let (tx, rx) = mpsc::channel::<OutputCmd>();
        let (event_tx, event_rx) = mpsc::channel::<TaggedEvent>();
        let clock: ClockHandle = Arc::new(Mutex::new(OutputClock::default()));

        let join = spawn_output_thread(rx, event_tx, clock.clone());

        Self {
            tx,
            events: event_rx,
            clock,
            generation: 0,
            loaded: false,
            join: Some(join),
        }
    }

    /// Wire an output to caller-owned channels instead of a rodio thread.
    #[cfg(test)]
    pub(super) fn from_parts(
        tx: Sender<OutputCmd>,
        events: Receiver<TaggedEvent>,
        clock: ClockHandle,
    ) -> Self {
        Self {
            tx,
            events,
            clock,
            generation: 0,
            loaded: false,
            join: None,
        }
    }

    fn send(&self, cmd: OutputCmd) -> Result<(), OutputError> {
        self.tx.send(cmd).map_err(|_| OutputError::Disconnected)
    }

    /// Fade out whatever is playing and wait for the output thread to exit.
    pub fn quit_softly(&mut self, fade_out: Duration) {
        let _ = self.send(OutputCmd::Quit {
            fade_out_ms: fade_out.as_millis() as u64,
        });

        if let Some(h) = self.join.take() {
            let _ = h.join();
        }
    }
}

impl Drop for RodioOutput {
    fn drop(&mut self) {
        self.quit_softly(Duration::ZERO);
    }
}

impl AudioOutput for RodioOutput {
    fn load(&mut self, locator: &str) -> Result<(), OutputError> {
        // Whatever happens next, the previous source is abandoned: its queued
        // events go stale and play/seek no longer reach it.
        self.generation += 1;
        self.loaded = false;
        if let Ok(mut c) = self.clock.lock() {
            *c = OutputClock::default();
        }

        let path = match resolve_locator(locator) {
            Ok(p) => p,
            Err(e) => {
                if let Err(send_err) = self.send(OutputCmd::Unload) {
                    debug!(error = %send_err, "unload dropped");
                }
                return Err(e);
            }
        };

        self.send(OutputCmd::Load {
            path,
            generation: self.generation,
        })?;
        self.loaded = true;
        Ok(())
    }

    fn play(&mut self) -> Result<(), OutputError> {
        if !self.loaded {
            return Err(OutputError::NothingLoaded);
        }
        self.send(OutputCmd::Play)
    }

    fn pause(&mut self) {
        if let Err(e) = self.send(OutputCmd::Pause) {
            debug!(error = %e, "pause dropped");
        }
    }

    fn seek(&mut self, seconds: f64) -> Result<(), OutputError> {
        if !self.loaded {
            return Err(OutputError::NothingLoaded);
        }
        let target = Duration::try_from_secs_f64(seconds.max(0.0)).unwrap_or_default();
        self.send(OutputCmd::Seek(target))
    }

    fn set_volume(&mut self, volume: f32) {
        if let Err(e) = self.send(OutputCmd::SetVolume(volume)) {
            debug!(error = %e, "volume change dropped");
        }
    }

    fn unload(&mut self) {
        // Bumping the generation drops any events still queued for the old source.
        self.generation += 1;
        self.loaded = false;
        if let Err(e) = self.send(OutputCmd::Unload) {
            debug!(error = %e, "unload dropped");
        }
    }

    fn current_time(&self) -> f64 {
        self.clock
            .lock()
            .map(|c| c.now().as_secs_f64())
            .unwrap_or(0.0)
    }

    fn duration(&self) -> Option<f64> {
        self.clock
            .lock()
            .ok()
            .and_then(|c| c.duration)
            .map(|d| d.as_secs_f64())
    }

    fn poll_event(&mut self) -> Option<OutputEvent> {
        while let Ok((generation, ev)) = self.events.try_recv() {
            if generation == self.generation {
                return Some(ev);
            }
        }
        None
    }
}
