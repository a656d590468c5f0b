use crate::catalog::{Track, format_time};
use crate::config::{TimeField, TrackDisplayField, UiSettings};
use crate::playback::{RepeatMode, SessionSnapshot, TransportState};

/// Build the "now playing" track text according to `ui` settings.
fn track_text(track: &Track, ui: &UiSettings) -> String {
    let mut parts: Vec<String> = Vec::new();

    for f in &ui.now_playing_track_fields {
        let field = match f {
            TrackDisplayField::Title => track.title.trim().to_string(),
            TrackDisplayField::Artist => track.artist.trim().to_string(),
            TrackDisplayField::Album => track.album.trim().to_string(),
            TrackDisplayField::Id => format!("#{}", track.id),
            TrackDisplayField::Source => track.source.clone(),
        };
        if !field.is_empty() {
            parts.push(field);
        }
    }

    if parts.is_empty() {
        track.title.clone()
    } else {
        parts.join(&ui.now_playing_track_separator)
    }
}

/// Build the time text (elapsed/total/remaining). Total and remaining are
/// skipped until the length is known.
fn time_text(position: f64, duration: f64, ui: &UiSettings) -> Option<String> {
    let mut parts: Vec<String> = Vec::new();
    for f in &ui.now_playing_time_fields {
        match f {
            TimeField::Elapsed => parts.push(format_time(position)),
            TimeField::Total if duration > 0.0 => parts.push(format_time(duration)),
            TimeField::Remaining if duration > 0.0 => {
                parts.push(format!("-{}", format_time((duration - position).max(0.0))))
            }
            TimeField::Total | TimeField::Remaining => {}
        }
    }

    if parts.is_empty() {
        None
    } else {
        Some(parts.join(&ui.now_playing_time_separator))
    }
}

fn transport_glyph(t: TransportState) -> &'static str {
    match t {
        TransportState::Idle => "[stopped]",
        TransportState::Loading => "[loading]",
        TransportState::Playing => "[playing]",
        TransportState::Paused => "[paused]",
    }
}

/// One line summarising the session.
pub fn status_line(snap: &SessionSnapshot, track: Option<&Track>, ui: &UiSettings) -> String {
    let mut parts = vec![transport_glyph(snap.transport).to_string()];

    if let Some(track) = track {
        parts.push(track_text(track, ui));
        if let Some(time) = time_text(snap.position, snap.duration, ui) {
            parts.push(time);
        }
    }

    if snap.is_muted {
        parts.push("vol muted".to_string());
    } else {
        parts.push(format!("vol {:.0}%", snap.volume * 100.0));
    }
    if snap.shuffle {
        parts.push("shuffle".to_string());
    }
    match snap.repeat {
        RepeatMode::Off => {}
        RepeatMode::All => parts.push("repeat all".to_string()),
        RepeatMode::One => parts.push("repeat one".to_string()),
    }

    parts.join("  ")
}
