use std::path::PathBuf;
use std::sync::mpsc::{Receiver, RecvTimeoutError, Sender};
use std::thread;
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use rodio::{OutputStream, OutputStreamBuilder, Sink};
use tracing::{debug, error, warn};

use crate::error::OutputError;

use super::sink::create_sink_at;
use super::types::{ClockHandle, OutputClock, OutputCmd, OutputEvent};

/// How often the thread publishes the clock and checks for track end.
const TICK: Duration = Duration::from_millis(100);

pub(super) type TaggedEvent = (u64, OutputEvent);

/// Everything the output thread knows about the current source.
struct Current {
    path: PathBuf,
    generation: u64,
    sink: Sink,
    total: Option<Duration>,
    paused: bool,
    ended: bool,
    // Track start time and accumulated elapsed when paused.
    started_at: Option<Instant>,
    accumulated: Duration,
}

impl Current {
    fn elapsed(&self) -> Duration {
        let e = self.accumulated + self.started_at.map_or(Duration::ZERO, |st| st.elapsed());
        match self.total {
            Some(t) => e.min(t),
            None => e,
        }
    }

    fn pause(&mut self) {
        if self.paused {
            return;
        }
        self.sink.pause();
        self.accumulated = self.elapsed();
        self.started_at = None;
        self.paused = true;
    }

    fn resume(&mut self) {
        if !self.paused {
            return;
        }
        self.sink.play();
        self.started_at = Some(Instant::now());
        self.paused = false;
    }
}

pub(super) fn spawn_output_thread(
    rx: Receiver<OutputCmd>,
    events: Sender<TaggedEvent>,
    clock: ClockHandle,
) -> JoinHandle<()> {
    thread::spawn(move || {
        let mut stream = match OutputStreamBuilder::open_default_stream() {
            Ok(s) => s,
            Err(e) => {
                error!(error = %e, "no audio output device");
                run_without_device(rx, events, e.to_string());
                return;
            }
        };
        // rodio logs to stderr when OutputStream is dropped. That's useful in debugging,
        // but noisy for a terminal app.
        stream.log_on_drop(false);

        let mut current: Option<Current> = None;
        let mut volume: f32 = 1.0;

        loop {
            match rx.recv_timeout(TICK) {
                Ok(cmd) => match cmd {
                    OutputCmd::Load { path, generation } => {
                        if let Some(c) = current.take() {
                            c.sink.stop();
                        }
                        match open(&stream, &path, Duration::ZERO, volume) {
                            Ok((sink, total)) => {
                                debug!(path = %path.display(), "source loaded");
                                publish_at(&clock, Duration::ZERO, total);
                                current = Some(Current {
                                    path,
                                    generation,
                                    sink,
                                    total,
                                    paused: true,
                                    ended: false,
                                    started_at: None,
                                    accumulated: Duration::ZERO,
                                });
                                let duration = total.map(|d| d.as_secs_f64());
                                if !send(&events, generation, OutputEvent::Loaded { duration }) {
                                    break;
                                }
                            }
                            Err(e) => {
                                warn!(error = %e, "failed to load source");
                                publish_at(&clock, Duration::ZERO, None);
                                if !send(&events, generation, OutputEvent::Error(e)) {
                                    break;
                                }
                            }
                        }
                    }

                    OutputCmd::Play => {
                        let Some(c) = current.as_mut() else {
                            continue;
                        };
                        if c.ended {
                            // Played to the end: start over from the top.
                            if let Err(e) = restart_at(&stream, c, Duration::ZERO, volume) {
                                let generation = c.generation;
                                current = None;
                                if !send(&events, generation, OutputEvent::Error(e)) {
                                    break;
                                }
                                continue;
                            }
                        }
                        c.resume();
                        publish(&clock, c);
                    }

                    OutputCmd::Pause => {
                        if let Some(c) = current.as_mut() {
                            c.pause();
                            publish(&clock, c);
                        }
                    }

                    OutputCmd::Seek(target) => {
                        // Scrubbing: rebuild the current sink and skip into the file.
                        let Some(c) = current.as_mut() else {
                            continue;
                        };
                        let target = match c.total {
                            Some(t) => target.min(t),
                            None => target,
                        };
                        let was_paused = c.paused;
                        if let Err(e) = restart_at(&stream, c, target, volume) {
                            let generation = c.generation;
                            current = None;
                            if !send(&events, generation, OutputEvent::Error(e)) {
                                break;
                            }
                            continue;
                        }
                        if !was_paused {
                            c.resume();
                        }
                        publish(&clock, c);
                    }

                    OutputCmd::SetVolume(v) => {
                        volume = v;
                        if let Some(c) = current.as_ref() {
                            c.sink.set_volume(v);
                        }
                    }

                    OutputCmd::Unload => {
                        if let Some(c) = current.take() {
                            c.sink.stop();
                        }
                        publish_at(&clock, Duration::ZERO, None);
                    }

                    OutputCmd::Quit { fade_out_ms } => {
                        if let Some(c) = current.take() {
                            if !c.paused {
                                fade_out_sink(&c.sink, volume, fade_out_ms);
                            }
                            c.sink.stop();
                        }
                        break;
                    }
                },
                Err(RecvTimeoutError::Timeout) => {
                    let Some(c) = current.as_mut() else {
                        continue;
                    };
                    if c.paused {
                        continue;
                    }
                    let generation = c.generation;
                    if c.sink.empty() && !c.ended {
                        c.pause();
                        c.ended = true;
                        if let Some(t) = c.total {
                            c.accumulated = t;
                        }
                        publish(&clock, c);
                        if !send(&events, generation, OutputEvent::Ended) {
                            break;
                        }
                    } else {
                        publish(&clock, c);
                        if !send(&events, generation, OutputEvent::TimeUpdate) {
                            break;
                        }
                    }
                }
                Err(RecvTimeoutError::Disconnected) => break,
            }
        }
    })
}

fn open(
    stream: &OutputStream,
    path: &std::path::Path,
    start_at: Duration,
    volume: f32,
) -> Result<(Sink, Option<Duration>), OutputError> {
    let (sink, total) = create_sink_at(stream, path, start_at)?;
    sink.set_volume(volume);
    Ok((sink, total))
}

/// Replace `c`'s sink with a fresh, paused one positioned at `at`.
fn restart_at(
    stream: &OutputStream,
    c: &mut Current,
    at: Duration,
    volume: f32,
) -> Result<(), OutputError> {
    c.sink.stop();
    let (sink, total) = open(stream, &c.path, at, volume)?;
    c.sink = sink;
    c.total = total.or(c.total);
    c.paused = true;
    c.ended = false;
    c.started_at = None;
    c.accumulated = at;
    Ok(())
}

/// Publish the running state of `c`; readers extrapolate from it.
fn publish(clock: &ClockHandle, c: &Current) {
    if let Ok(mut out) = clock.lock() {
        *out = OutputClock {
            position: c.accumulated,
            since: c.started_at,
            duration: c.total,
        };
    }
}

/// Publish a frozen position.
fn publish_at(clock: &ClockHandle, position: Duration, duration: Option<Duration>) {
    if let Ok(mut out) = clock.lock() {
        *out = OutputClock {
            position,
            since: None,
            duration,
        };
    }
}

/// Returns false once the receiving side is gone.
fn send(events: &Sender<TaggedEvent>, generation: u64, ev: OutputEvent) -> bool {
    events.send((generation, ev)).is_ok()
}

fn fade_out_sink(sink: &Sink, from: f32, fade_out_ms: u64) {
    if fade_out_ms == 0 {
        sink.set_volume(0.0);
        return;
    }
    let steps: u64 = 20;
    let step_ms = (fade_out_ms / steps).max(1);
    for step in 1..=steps {
        let t = step as f32 / steps as f32;
        sink.set_volume(from * (1.0 - t));
        thread::sleep(Duration::from_millis(step_ms));
    }
    sink.set_volume(0.0);
}

/// Without a device every load fails; keep answering until told to quit.
fn run_without_device(rx: Receiver<OutputCmd>, events: Sender<TaggedEvent>, reason: String) {
    while let Ok(cmd) = rx.recv() {
        match cmd {
            OutputCmd::Load { generation, .. } => {
                let ev = OutputEvent::Error(OutputError::Device(reason.clone()));
                if !send(&events, generation, ev) {
                    break;
                }
            }
            OutputCmd::Quit { .. } => break,
            _ => {}
        }
    }
}
