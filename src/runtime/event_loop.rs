use std::io::Write;
use std::sync::mpsc;
use std::time::{Duration, Instant};

use crossterm::cursor::MoveToColumn;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::queue;
use crossterm::style::Print;
use crossterm::terminal::{Clear, ClearType};
use tracing::debug;

use crate::config::{self, ControlsSettings};
use crate::mpris::{ControlCmd, MprisHandle};
use crate::output::AudioOutput;
use crate::playback::{PlaybackController, TransportState};
use crate::runtime::mpris_sync::update_mpris;
use crate::runtime::status::status_line;

/// Something the user asked for, from the keyboard or from MPRIS.
#[derive(Clone, Debug, PartialEq)]
pub enum Intent {
    Control(ControlCmd),
    Select(usize),
    VolumeBy(f32),
    ToggleMute,
    ToggleShuffle,
    CycleRepeat,
}

/// Map a key press to an intent. Unbound keys map to `None`.
pub fn intent_for_key(key: KeyEvent, controls: &ControlsSettings) -> Option<Intent> {
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        return match key.code {
            KeyCode::Char('c') => Some(Intent::Control(ControlCmd::Quit)),
            _ => None,
        };
    }

    let scrub = controls.scrub_seconds.min(i64::MAX as u64 / 1_000_000) as i64 * 1_000_000;
    let intent = match key.code {
        KeyCode::Char('q') | KeyCode::Esc => Intent::Control(ControlCmd::Quit),
        KeyCode::Char(' ') | KeyCode::Char('p') => Intent::Control(ControlCmd::PlayPause),
        KeyCode::Char('l') | KeyCode::Right => Intent::Control(ControlCmd::Next),
        KeyCode::Char('h') | KeyCode::Left => Intent::Control(ControlCmd::Prev),
        KeyCode::Char('L') => Intent::Control(ControlCmd::Seek(scrub)),
        KeyCode::Char('H') => Intent::Control(ControlCmd::Seek(-scrub)),
        KeyCode::Char('x') => Intent::Control(ControlCmd::Stop),
        KeyCode::Char('+') | KeyCode::Char('=') => Intent::VolumeBy(controls.volume_step),
        KeyCode::Char('-') => Intent::VolumeBy(-controls.volume_step),
        KeyCode::Char('m') => Intent::ToggleMute,
        KeyCode::Char('s') => Intent::ToggleShuffle,
        KeyCode::Char('r') => Intent::CycleRepeat,
        KeyCode::Char(c @ '1'..='9') => Intent::Select(c as usize - '1' as usize),
        _ => return None,
    };
    Some(intent)
}

/// Apply one intent to the controller. Returns `true` when the session should end.
pub fn apply_intent<O: AudioOutput>(intent: Intent, controller: &mut PlaybackController<O>) -> bool {
    let result = match intent {
        Intent::Control(cmd) => return apply_control(cmd, controller),
        Intent::Select(i) => controller.select_track(i),
        Intent::VolumeBy(step) => {
            let level = controller.volume().level();
            controller.set_volume(level + step)
        }
        Intent::ToggleMute => {
            controller.toggle_mute();
            Ok(())
        }
        Intent::ToggleShuffle => {
            let on = !controller.shuffle();
            controller.set_shuffle(on);
            Ok(())
        }
        Intent::CycleRepeat => {
            controller.cycle_repeat_mode();
            Ok(())
        }
    };
    if let Err(e) = result {
        debug!(error = %e, "intent not applied");
    }
    false
}

/// Apply a transport command coming from MPRIS or the keyboard.
pub fn apply_control<O: AudioOutput>(cmd: ControlCmd, controller: &mut PlaybackController<O>) -> bool {
    let result = match cmd {
        ControlCmd::Quit => return true,
        ControlCmd::Play => match controller.transport() {
            TransportState::Paused => controller.play_pause(),
            TransportState::Idle => start_from_top(controller),
            TransportState::Loading | TransportState::Playing => Ok(()),
        },
        ControlCmd::Pause => {
            if controller.is_playing() {
                controller.play_pause()
            } else {
                Ok(())
            }
        }
        ControlCmd::PlayPause => match controller.transport() {
            TransportState::Idle => start_from_top(controller),
            _ => controller.play_pause(),
        },
        ControlCmd::Stop => {
            controller.stop();
            Ok(())
        }
        ControlCmd::Next => controller.next(),
        ControlCmd::Prev => controller.previous(),
        ControlCmd::Seek(offset_micros) => {
            let target = controller.position() + offset_micros as f64 / 1_000_000.0;
            controller.seek(target.max(0.0))
        }
        ControlCmd::SetVolume(v) => controller.set_volume(v as f32),
        ControlCmd::SetShuffle(on) => {
            controller.set_shuffle(on);
            Ok(())
        }
        ControlCmd::SetRepeat(mode) => {
            controller.set_repeat_mode(mode);
            Ok(())
        }
    };
    if let Err(e) = result {
        debug!(error = %e, "control command not applied");
    }
    false
}

/// Play/pause from idle starts the first track, if there is one.
fn start_from_top<O: AudioOutput>(
    controller: &mut PlaybackController<O>,
) -> crate::error::Result<()> {
    if controller.catalog().is_empty() {
        return Ok(());
    }
    controller.select_track(0)
}

fn draw<W: Write>(out: &mut W, line: &str) -> std::io::Result<()> {
    queue!(out, MoveToColumn(0), Clear(ClearType::CurrentLine), Print(line))?;
    out.flush()
}

/// Main terminal loop: drains MPRIS commands and output events, re-syncs
/// progress every tick, redraws the status line and MPRIS mirror on change,
/// and handles key presses. Returns `Ok(())` when shutdown is requested.
pub fn run<O: AudioOutput, W: Write>(
    out: &mut W,
    settings: &config::Settings,
    controller: &mut PlaybackController<O>,
    mpris: &MprisHandle,
    control_rx: &mpsc::Receiver<ControlCmd>,
) -> Result<(), Box<dyn std::error::Error>> {
    let tick = Duration::from_millis(settings.audio.tick_ms.max(1));
    let mut last_tick = Instant::now();
    let mut drawn_revision: Option<u64> = None;

    loop {
        while let Ok(cmd) = control_rx.try_recv() {
            if apply_control(cmd, controller) {
                return Ok(());
            }
        }

        controller.pump();
        if last_tick.elapsed() >= tick {
            controller.tick();
            last_tick = Instant::now();
        }

        // Keep the status line and MPRIS in sync even when changes come from
        // media keys or auto-advance.
        if drawn_revision != Some(controller.revision()) {
            let snap = controller.snapshot();
            draw(out, &status_line(&snap, controller.current_track(), &settings.ui))?;
            update_mpris(mpris, controller);
            drawn_revision = Some(snap.revision);
        }

        if event::poll(tick)? {
            if let Event::Key(key) = event::read()? {
                if key.kind != KeyEventKind::Press {
                    continue;
                }
                if let Some(intent) = intent_for_key(key, &settings.controls) {
                    if apply_intent(intent, controller) {
                        return Ok(());
                    }
                }
            }
        }
    }
}
