use std::fs;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use tempfile::tempdir;

use super::event_loop::{Intent, apply_control, apply_intent, intent_for_key};
use super::startup::{Selection, load_catalog};
use super::status::status_line;
use crate::catalog::{Catalog, Track};
use crate::config::{CatalogSettings, ControlsSettings, TimeField, TrackDisplayField, UiSettings};
use crate::error::CatalogError;
use crate::mpris::ControlCmd;
use crate::output::OutputEvent;
use crate::output::mock::{Cmd, MockOutput};
use crate::playback::{PlaybackController, RepeatMode, SessionOptions, TransportState};

fn track(id: u32) -> Track {
    Track {
        id,
        title: format!("Song {id}"),
        artist: "Band".into(),
        album: String::new(),
        source: format!("/music/{id}.mp3"),
        duration_hint: None,
    }
}

fn controller(n: u32) -> PlaybackController<MockOutput> {
    let catalog = Catalog::new((1..=n).map(track).collect()).unwrap();
    PlaybackController::new(
        catalog,
        MockOutput::default(),
        SessionOptions {
            seed: Some(1),
            ..SessionOptions::default()
        },
    )
}

fn key(c: char) -> KeyEvent {
    KeyEvent::new(KeyCode::Char(c), KeyModifiers::NONE)
}

#[test]
fn keys_map_to_intents() {
    let controls = ControlsSettings {
        scrub_seconds: 5,
        volume_step: 0.1,
    };
    let cases = [
        (' ', Intent::Control(ControlCmd::PlayPause)),
        ('p', Intent::Control(ControlCmd::PlayPause)),
        ('l', Intent::Control(ControlCmd::Next)),
        ('h', Intent::Control(ControlCmd::Prev)),
        ('L', Intent::Control(ControlCmd::Seek(5_000_000))),
        ('H', Intent::Control(ControlCmd::Seek(-5_000_000))),
        ('x', Intent::Control(ControlCmd::Stop)),
        ('q', Intent::Control(ControlCmd::Quit)),
        ('+', Intent::VolumeBy(0.1)),
        ('-', Intent::VolumeBy(-0.1)),
        ('m', Intent::ToggleMute),
        ('s', Intent::ToggleShuffle),
        ('r', Intent::CycleRepeat),
        ('1', Intent::Select(0)),
        ('9', Intent::Select(8)),
    ];
    for (c, expected) in cases {
        assert_eq!(intent_for_key(key(c), &controls), Some(expected), "key {c:?}");
    }
    assert_eq!(intent_for_key(key('z'), &controls), None);
    assert_eq!(intent_for_key(key('0'), &controls), None);
    assert_eq!(
        intent_for_key(
            KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL),
            &controls
        ),
        Some(Intent::Control(ControlCmd::Quit))
    );
}

#[test]
fn play_pause_from_idle_starts_the_first_track() {
    let mut c = controller(3);
    assert!(!apply_control(ControlCmd::PlayPause, &mut c));
    assert_eq!(c.current_index(), Some(0));
    assert!(c.is_playing());

    assert!(!apply_control(ControlCmd::PlayPause, &mut c));
    assert_eq!(c.transport(), TransportState::Paused);
}

#[test]
fn play_and_pause_commands_are_idempotent() {
    let mut c = controller(2);
    apply_control(ControlCmd::Pause, &mut c);
    assert_eq!(c.transport(), TransportState::Idle);

    apply_control(ControlCmd::Play, &mut c);
    apply_control(ControlCmd::Play, &mut c);
    assert_eq!(c.output().count(&Cmd::Load("/music/1.mp3".into())), 1);

    apply_control(ControlCmd::Pause, &mut c);
    apply_control(ControlCmd::Pause, &mut c);
    assert!(!c.is_playing());
    assert_eq!(c.output().count(&Cmd::Pause), 1);

    apply_control(ControlCmd::Play, &mut c);
    assert!(c.is_playing());
}

#[test]
fn play_on_an_empty_catalog_does_nothing() {
    let mut c = PlaybackController::new(
        Catalog::default(),
        MockOutput::default(),
        SessionOptions::default(),
    );
    apply_control(ControlCmd::PlayPause, &mut c);
    assert_eq!(c.transport(), TransportState::Idle);
}

#[test]
fn relative_seek_is_floored_at_zero() {
    let mut c = controller(1);
    c.select_track(0).unwrap();
    c.handle_event(OutputEvent::Loaded {
        duration: Some(100.0),
    });

    apply_control(ControlCmd::Seek(30_000_000), &mut c);
    assert_eq!(c.position(), 30.0);
    apply_control(ControlCmd::Seek(-50_000_000), &mut c);
    assert_eq!(c.position(), 0.0);
}

#[test]
fn mpris_setters_reach_the_controller() {
    let mut c = controller(2);
    apply_control(ControlCmd::SetVolume(0.25), &mut c);
    apply_control(ControlCmd::SetShuffle(true), &mut c);
    apply_control(ControlCmd::SetRepeat(RepeatMode::One), &mut c);
    assert_eq!(c.volume().level(), 0.25);
    assert!(c.shuffle());
    assert_eq!(c.repeat_mode(), RepeatMode::One);

    assert!(apply_control(ControlCmd::Quit, &mut c));
}

#[test]
fn volume_and_toggle_intents_apply() {
    let mut c = controller(3);
    apply_intent(Intent::VolumeBy(0.2), &mut c);
    assert!((c.volume().level() - 0.9).abs() < 1e-6);
    apply_intent(Intent::VolumeBy(0.5), &mut c);
    assert_eq!(c.volume().level(), 1.0);

    apply_intent(Intent::ToggleMute, &mut c);
    assert!(c.volume().is_muted());
    apply_intent(Intent::ToggleShuffle, &mut c);
    assert!(c.shuffle());
    apply_intent(Intent::CycleRepeat, &mut c);
    assert_eq!(c.repeat_mode(), RepeatMode::All);

    apply_intent(Intent::Select(2), &mut c);
    assert_eq!(c.current_index(), Some(2));
    // Out of range is rejected, session keeps going.
    assert!(!apply_intent(Intent::Select(7), &mut c));
    assert_eq!(c.current_index(), Some(2));
}

#[test]
fn status_line_shows_transport_track_time_and_modes() {
    let mut c = controller(2);
    let ui = UiSettings::default();
    let idle = status_line(&c.snapshot(), c.current_track(), &ui);
    assert_eq!(idle, "[stopped]  vol 70%");

    c.select_track(1).unwrap();
    c.handle_event(OutputEvent::Loaded {
        duration: Some(228.0),
    });
    c.seek(62.0).unwrap();
    c.set_shuffle(true);
    c.set_repeat_mode(RepeatMode::All);
    let line = status_line(&c.snapshot(), c.current_track(), &ui);
    assert_eq!(
        line,
        "[playing]  Band - Song 2  1:02 / 3:48  vol 70%  shuffle  repeat all"
    );

    c.toggle_mute();
    let line = status_line(&c.snapshot(), c.current_track(), &ui);
    assert!(line.contains("vol muted"));
}

#[test]
fn status_line_honours_field_selection() {
    let mut c = controller(1);
    c.select_track(0).unwrap();
    let ui = UiSettings {
        now_playing_track_fields: vec![TrackDisplayField::Id, TrackDisplayField::Album],
        now_playing_track_separator: " | ".into(),
        now_playing_time_fields: vec![TimeField::Elapsed, TimeField::Remaining],
        now_playing_time_separator: " ".into(),
    };

    // Length unknown: remaining is skipped, blank album is skipped.
    let line = status_line(&c.snapshot(), c.current_track(), &ui);
    assert_eq!(line, "[loading]  #1  0:00  vol 70%");

    c.handle_event(OutputEvent::Loaded {
        duration: Some(90.0),
    });
    c.seek(30.0).unwrap();
    let line = status_line(&c.snapshot(), c.current_track(), &ui);
    assert_eq!(line, "[playing]  #1  0:30 -1:00  vol 70%");
}

#[test]
fn selection_argument_picks_a_grouping() {
    assert_eq!(
        Selection::parse("artist:Katy Perry"),
        Selection::Artist("Katy Perry".into())
    );
    assert_eq!(Selection::parse("album:Native"), Selection::Album("Native".into()));
    assert_eq!(Selection::parse("genre:Pop"), Selection::Genre("Pop".into()));
    assert_eq!(
        Selection::parse("playlist:Top Hits"),
        Selection::Playlist("Top Hits".into())
    );
    assert_eq!(Selection::parse("Mix"), Selection::Playlist("Mix".into()));
    assert_eq!(
        Selection::parse("mood:chill"),
        Selection::Playlist("mood:chill".into())
    );
}

#[test]
fn load_catalog_reads_a_manifest_and_applies_the_selection() {
    let dir = tempdir().unwrap();
    let manifest = dir.path().join("catalog.toml");
    fs::write(
        &manifest,
        r#"
[[track]]
id = 1
title = "One"
artist = "A"
album = "First"
source = "one.mp3"

[[track]]
id = 2
title = "Two"
artist = "B"
album = "Second"
source = "two.mp3"

[[track]]
id = 3
title = "Three"
artist = "A"
album = "Second"
source = "three.mp3"

[[playlist]]
name = "Mix"
tracks = [2]

[[genre]]
name = "Rock"
artists = ["B"]
"#,
    )
    .unwrap();

    let settings = CatalogSettings::default();
    let ids = |sel: &str| -> Vec<u32> {
        load_catalog(&manifest, Some(&Selection::parse(sel)), &settings)
            .unwrap()
            .tracks()
            .iter()
            .map(|t| t.id)
            .collect()
    };

    assert_eq!(load_catalog(&manifest, None, &settings).unwrap().len(), 3);
    assert_eq!(ids("Mix"), vec![2]);
    assert_eq!(ids("artist:A"), vec![1, 3]);
    assert_eq!(ids("album:Second"), vec![2, 3]);
    assert_eq!(ids("genre:Rock"), vec![2]);

    let fails = |sel: &str| load_catalog(&manifest, Some(&Selection::parse(sel)), &settings);
    assert!(matches!(fails("Nope"), Err(CatalogError::UnknownPlaylist(_))));
    assert!(matches!(fails("artist:C"), Err(CatalogError::UnknownArtist(_))));
    assert!(matches!(fails("album:Third"), Err(CatalogError::UnknownAlbum(_))));
    assert!(matches!(fails("genre:Jazz"), Err(CatalogError::UnknownGenre(_))));
}

#[test]
fn load_catalog_scans_directories() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("not-audio.txt"), b"hello").unwrap();
    let c = load_catalog(dir.path(), None, &CatalogSettings::default()).unwrap();
    assert!(c.is_empty());
}
