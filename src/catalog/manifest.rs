use std::collections::BTreeMap;
use std::path::Path;

use serde::Deserialize;

use crate::error::CatalogError;

use super::model::{Catalog, Playlist, Track};

#[derive(Debug, Deserialize)]
struct Manifest {
    #[serde(default, rename = "track")]
    tracks: Vec<TrackEntry>,
    #[serde(default, rename = "playlist")]
    playlists: Vec<PlaylistEntry>,
    #[serde(default, rename = "genre")]
    genres: Vec<GenreEntry>,
}

#[derive(Debug, Deserialize)]
struct TrackEntry {
    id: u32,
    title: String,
    #[serde(default)]
    artist: String,
    #[serde(default)]
    album: String,
    source: String,
    #[serde(default)]
    duration: Option<String>,
}

#[derive(Debug, Deserialize)]
struct PlaylistEntry {
    name: String,
    #[serde(default)]
    tracks: Vec<u32>,
}

#[derive(Debug, Deserialize)]
struct GenreEntry {
    name: String,
    #[serde(default)]
    artists: Vec<String>,
}

/// Load a catalog from a TOML manifest on disk.
///
/// Relative `source` paths are resolved against the manifest's directory.
pub fn load_manifest(path: &Path) -> Result<Catalog, CatalogError> {
    let text = std::fs::read_to_string(path).map_err(|source| CatalogError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let base = path.parent().unwrap_or_else(|| Path::new("."));
    parse_manifest(&text, base)
}

pub(super) fn parse_manifest(text: &str, base: &Path) -> Result<Catalog, CatalogError> {
    let manifest: Manifest = toml::from_str(text)?;

    let tracks = manifest
        .tracks
        .into_iter()
        .map(|e| Track {
            id: e.id,
            title: e.title,
            artist: e.artist,
            album: e.album,
            source: resolve_source(&e.source, base),
            duration_hint: e.duration.filter(|d| !d.trim().is_empty()),
        })
        .collect();

    let playlists = manifest
        .playlists
        .into_iter()
        .map(|p| Playlist {
            name: p.name,
            track_ids: p.tracks,
        })
        .collect();

    let genres: BTreeMap<String, Vec<String>> = manifest
        .genres
        .into_iter()
        .map(|g| (g.name, g.artists))
        .collect();

    Ok(Catalog::new(tracks)?
        .with_playlists(playlists)
        .with_genres(genres))
}

fn resolve_source(source: &str, base: &Path) -> String {
    // Anything with a scheme is left for the output to interpret.
    if source.contains("://") || Path::new(source).is_absolute() {
        return source.to_string();
    }
    base.join(source).display().to_string()
}
