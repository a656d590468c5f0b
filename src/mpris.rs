//! MPRIS D-Bus surface.
//!
//! Desktop media keys and tools like `playerctl` talk to the player through
//! this surface. It only mirrors session snapshots and forwards intents as
//! [`ControlCmd`]s; the runtime applies them to the controller.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, mpsc::Sender};

use async_io::{Timer, block_on};
use tracing::{debug, warn};
use zbus::{Connection, interface};
use zvariant::{ObjectPath, OwnedValue, Value};

use crate::catalog::Track;
use crate::playback::{RepeatMode, SessionSnapshot, TransportState};

const OBJECT_PATH: &str = "/org/mpris/MediaPlayer2";

#[derive(Clone, Debug, PartialEq)]
pub enum ControlCmd {
    Quit,
    Play,
    Pause,
    PlayPause,
    Stop,
    Next,
    Prev,
    /// Relative seek in microseconds.
    Seek(i64),
    SetVolume(f64),
    SetShuffle(bool),
    SetRepeat(RepeatMode),
}

#[derive(Debug, Default)]
struct SharedState {
    status: &'static str,
    track_id: Option<u32>,
    title: Option<String>,
    artist: Option<String>,
    album: Option<String>,
    url: Option<String>,
    length_micros: Option<i64>,
    position_micros: i64,
    volume: f64,
    shuffle: bool,
    repeat: RepeatMode,
}

pub struct MprisHandle {
    state: Arc<Mutex<SharedState>>,
}

fn status_str(t: TransportState) -> &'static str {
    match t {
        TransportState::Idle => "Stopped",
        TransportState::Loading | TransportState::Playing => "Playing",
        TransportState::Paused => "Paused",
    }
}

fn loop_status_str(r: RepeatMode) -> &'static str {
    match r {
        RepeatMode::Off => "None",
        RepeatMode::All => "Playlist",
        RepeatMode::One => "Track",
    }
}

fn parse_loop_status(s: &str) -> Option<RepeatMode> {
    match s {
        "None" => Some(RepeatMode::Off),
        "Playlist" => Some(RepeatMode::All),
        "Track" => Some(RepeatMode::One),
        _ => None,
    }
}

fn secs_to_micros(secs: f64) -> i64 {
    if secs.is_finite() && secs > 0.0 {
        (secs * 1_000_000.0) as i64
    } else {
        0
    }
}

impl MprisHandle {
    /// Mirror the latest snapshot so property reads reflect it.
    pub fn sync(&self, snapshot: &SessionSnapshot, track: Option<&Track>) {
        let Ok(mut s) = self.state.lock() else {
            return;
        };
        s.status = status_str(snapshot.transport);
        s.track_id = track.map(|t| t.id);
        s.title = track.map(|t| t.title.clone());
        s.artist = track.map(|t| t.artist.clone()).filter(|a| !a.is_empty());
        s.album = track.map(|t| t.album.clone()).filter(|a| !a.is_empty());
        s.url = track.map(|t| t.source.clone());
        s.length_micros = (snapshot.duration > 0.0).then(|| secs_to_micros(snapshot.duration));
        s.position_micros = secs_to_micros(snapshot.position);
        s.volume = f64::from(snapshot.effective_volume());
        s.shuffle = snapshot.shuffle;
        s.repeat = snapshot.repeat;
    }
}

struct RootIface {
    tx: Sender<ControlCmd>,
}

#[interface(name = "org.mpris.MediaPlayer2")]
impl RootIface {
    fn raise(&self) {
        // No window to raise.
    }

    fn quit(&self) {
        let _ = self.tx.send(ControlCmd::Quit);
    }

    #[zbus(property)]
    fn can_quit(&self) -> bool {
        true
    }

    #[zbus(property)]
    fn can_raise(&self) -> bool {
        false
    }

    #[zbus(property)]
    fn has_track_list(&self) -> bool {
        false
    }

    #[zbus(property)]
    fn identity(&self) -> &str {
        "sonance"
    }

    #[zbus(property)]
    fn supported_uri_schemes(&self) -> Vec<String> {
        vec!["file".to_string()]
    }

    #[zbus(property)]
    fn supported_mime_types(&self) -> Vec<String> {
        vec![]
    }
}

struct PlayerIface {
    tx: Sender<ControlCmd>,
    state: Arc<Mutex<SharedState>>,
}

impl PlayerIface {
    fn send(&self, cmd: ControlCmd) {
        if self.tx.send(cmd).is_err() {
            debug!("MPRIS: runtime gone, dropping command");
        }
    }

    fn read<T>(&self, f: impl FnOnce(&SharedState) -> T, fallback: T) -> T {
        self.state.lock().map(|s| f(&s)).unwrap_or(fallback)
    }
}

#[interface(name = "org.mpris.MediaPlayer2.Player")]
impl PlayerIface {
    fn next(&self) {
        self.send(ControlCmd::Next);
    }

    fn previous(&self) {
        self.send(ControlCmd::Prev);
    }

    fn play(&self) {
        self.send(ControlCmd::Play);
    }

    fn pause(&self) {
        self.send(ControlCmd::Pause);
    }

    fn play_pause(&self) {
        self.send(ControlCmd::PlayPause);
    }

    fn stop(&self) {
        self.send(ControlCmd::Stop);
    }

    fn seek(&self, offset: i64) {
        self.send(ControlCmd::Seek(offset));
    }

    #[zbus(property)]
    fn playback_status(&self) -> &str {
        self.read(|s| if s.status.is_empty() { "Stopped" } else { s.status }, "Stopped")
    }

    #[zbus(property)]
    fn loop_status(&self) -> &str {
        self.read(|s| loop_status_str(s.repeat), "None")
    }

    #[zbus(property)]
    fn set_loop_status(&mut self, value: String) {
        match parse_loop_status(&value) {
            Some(mode) => self.send(ControlCmd::SetRepeat(mode)),
            None => warn!(value = %value, "MPRIS: unknown LoopStatus"),
        }
    }

    #[zbus(property)]
    fn shuffle(&self) -> bool {
        self.read(|s| s.shuffle, false)
    }

    #[zbus(property)]
    fn set_shuffle(&mut self, value: bool) {
        self.send(ControlCmd::SetShuffle(value));
    }

    #[zbus(property)]
    fn volume(&self) -> f64 {
        self.read(|s| s.volume, 0.0)
    }

    #[zbus(property)]
    fn set_volume(&mut self, value: f64) {
        self.send(ControlCmd::SetVolume(value));
    }

    #[zbus(property)]
    fn position(&self) -> i64 {
        self.read(|s| s.position_micros, 0)
    }

    #[zbus(property)]
    fn can_control(&self) -> bool {
        true
    }

    #[zbus(property)]
    fn can_play(&self) -> bool {
        true
    }

    #[zbus(property)]
    fn can_pause(&self) -> bool {
        true
    }

    #[zbus(property)]
    fn can_seek(&self) -> bool {
        true
    }

    #[zbus(property)]
    fn can_go_next(&self) -> bool {
        true
    }

    #[zbus(property)]
    fn can_go_previous(&self) -> bool {
        true
    }

    #[zbus(property)]
    fn metadata(&self) -> HashMap<String, OwnedValue> {
        let Ok(s) = self.state.lock() else {
            return HashMap::new();
        };
        metadata_map(&s)
    }
}

fn owned(v: Value<'_>) -> Option<OwnedValue> {
    OwnedValue::try_from(v).ok()
}

fn metadata_map(s: &SharedState) -> HashMap<String, OwnedValue> {
    let mut map = HashMap::new();

    let track_path = match s.track_id {
        Some(id) => format!("{OBJECT_PATH}/track/{id}"),
        None => "/org/mpris/MediaPlayer2/TrackList/NoTrack".to_string(),
    };
    if let Some(v) = ObjectPath::try_from(track_path)
        .ok()
        .and_then(|p| owned(Value::from(p)))
    {
        map.insert("mpris:trackid".to_string(), v);
    }

    if let Some(v) = owned(Value::from(s.title.clone().unwrap_or_default())) {
        map.insert("xesam:title".to_string(), v);
    }
    if let Some(artist) = &s.artist {
        if let Some(v) = owned(Value::from(vec![artist.clone()])) {
            map.insert("xesam:artist".to_string(), v);
        }
    }
    if let Some(album) = &s.album {
        if let Some(v) = owned(Value::from(album.clone())) {
            map.insert("xesam:album".to_string(), v);
        }
    }
    if let Some(url) = &s.url {
        if let Some(v) = owned(Value::from(url.clone())) {
            map.insert("xesam:url".to_string(), v);
        }
    }
    if let Some(len) = s.length_micros {
        if let Some(v) = owned(Value::from(len)) {
            map.insert("mpris:length".to_string(), v);
        }
    }
    map
}

pub fn spawn_mpris(tx: Sender<ControlCmd>) -> MprisHandle {
    let state = Arc::new(Mutex::new(SharedState::default()));

    let state_for_thread = state.clone();
    std::thread::spawn(move || {
        block_on(async move {
            let connection = match Connection::session().await {
                Ok(c) => c,
                Err(e) => {
                    warn!(error = %e, "MPRIS: failed to connect to session bus");
                    return;
                }
            };

            if let Err(e) = connection
                .request_name("org.mpris.MediaPlayer2.sonance")
                .await
            {
                warn!(error = %e, "MPRIS: failed to acquire name");
                return;
            }

            let object_server = connection.object_server();

            if let Err(e) = object_server
                .at(OBJECT_PATH, RootIface { tx: tx.clone() })
                .await
            {
                warn!(error = %e, "MPRIS: failed to register root iface");
                return;
            }

            if let Err(e) = object_server
                .at(
                    OBJECT_PATH,
                    PlayerIface {
                        tx,
                        state: state_for_thread,
                    },
                )
                .await
            {
                warn!(error = %e, "MPRIS: failed to register player iface");
                return;
            }

            // Keep the service alive.
            loop {
                Timer::after(std::time::Duration::from_secs(3600)).await;
            }
        });
    });

    MprisHandle { state }
}
