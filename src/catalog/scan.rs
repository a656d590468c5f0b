use std::path::Path;

use lofty::file::{AudioFile, TaggedFileExt};
use lofty::tag::ItemKey;
use tracing::debug;
use walkdir::WalkDir;

use crate::config::CatalogSettings;

use super::model::{Catalog, Track};
use super::time::format_time;

fn is_audio_file(path: &Path, settings: &CatalogSettings) -> bool {
    let exts: Vec<String> = settings
        .extensions
        .iter()
        .map(|e| e.trim().trim_start_matches('.').to_ascii_lowercase())
        .filter(|e| !e.is_empty())
        .collect();

    path.extension()
        .and_then(|s| s.to_str())
        .map(|ext| {
            let ext = ext.to_ascii_lowercase();
            exts.iter().any(|e| e == &ext)
        })
        .unwrap_or(false)
}

fn is_hidden(path: &Path) -> bool {
    path.file_name()
        .and_then(|s| s.to_str())
        .map(|name| name.starts_with('.'))
        .unwrap_or(false)
}

fn sort_key(t: &Track) -> String {
    if t.artist.is_empty() {
        t.title.to_lowercase()
    } else {
        format!("{} - {}", t.artist, t.title).to_lowercase()
    }
}

/// Build a catalog from the audio files under `dir`.
///
/// Tracks are ordered by "artist - title" (case-insensitive) and numbered
/// from 1 in that order.
pub fn scan(dir: &Path, settings: &CatalogSettings) -> Catalog {
    let mut tracks: Vec<Track> = Vec::new();

    let mut walker = WalkDir::new(dir).follow_links(settings.follow_links);

    // Non-recursive = only the root directory.
    let depth_cap = if settings.recursive {
        settings.max_depth
    } else {
        Some(1)
    };
    if let Some(d) = depth_cap {
        walker = walker.max_depth(d);
    }

    for entry in walker
        .into_iter()
        .filter_entry(|e| settings.include_hidden || e.depth() == 0 || !is_hidden(e.path()))
        .filter_map(Result::ok)
    {
        let path = entry.path();
        if !path.is_file() || !is_audio_file(path, settings) {
            continue;
        }

        let mut title = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("UNKNOWN")
            .to_string();
        let mut artist = String::new();
        let mut album = String::new();
        let mut duration_hint: Option<String> = None;

        match lofty::read_from_path(path) {
            Ok(tagged) => {
                let secs = tagged.properties().duration().as_secs_f64();
                if secs > 0.0 {
                    duration_hint = Some(format_time(secs));
                }

                if let Some(tag) = tagged.primary_tag().or_else(|| tagged.first_tag()) {
                    if let Some(v) = tag.get_string(&ItemKey::TrackTitle) {
                        if !v.trim().is_empty() {
                            title = v.trim().to_string();
                        }
                    }
                    if let Some(v) = tag.get_string(&ItemKey::TrackArtist) {
                        artist = v.trim().to_string();
                    }
                    if let Some(v) = tag.get_string(&ItemKey::AlbumTitle) {
                        album = v.trim().to_string();
                    }
                }
            }
            Err(e) => debug!(path = %path.display(), error = %e, "no readable tags"),
        }

        tracks.push(Track {
            id: 0,
            title,
            artist,
            album,
            source: path.display().to_string(),
            duration_hint,
        });
    }

    tracks.sort_by_key(sort_key);
    for (i, t) in tracks.iter_mut().enumerate() {
        t.id = (i + 1) as u32;
    }

    // Ids were just assigned sequentially, so they are positive and unique.
    Catalog::new(tracks).unwrap_or_default()
}
