//! Derived groupings over a catalog (by artist, album, genre, playlist).
//!
//! All groupings return catalog indices so callers can hand them straight to
//! the playback controller.

use std::collections::BTreeMap;

use super::model::Catalog;

/// Group track indices by artist. Blank artists are skipped.
pub fn by_artist(catalog: &Catalog) -> BTreeMap<String, Vec<usize>> {
    group_by(catalog, |t| t.artist.trim())
}

/// Group track indices by album. Blank albums are skipped.
pub fn by_album(catalog: &Catalog) -> BTreeMap<String, Vec<usize>> {
    group_by(catalog, |t| t.album.trim())
}

fn group_by<F>(catalog: &Catalog, key: F) -> BTreeMap<String, Vec<usize>>
where
    F: Fn(&super::Track) -> &str,
{
    let mut groups: BTreeMap<String, Vec<usize>> = BTreeMap::new();
    for (i, t) in catalog.tracks().iter().enumerate() {
        let k = key(t);
        if k.is_empty() {
            continue;
        }
        groups.entry(k.to_string()).or_default().push(i);
    }
    groups
}

/// Indices of tracks whose artist is listed under `genre`.
///
/// Returns `None` for an unknown genre.
pub fn genre_indices(catalog: &Catalog, genre: &str) -> Option<Vec<usize>> {
    let artists = catalog.genres().get(genre)?;
    Some(
        catalog
            .tracks()
            .iter()
            .enumerate()
            .filter(|(_, t)| artists.iter().any(|a| a == &t.artist))
            .map(|(i, _)| i)
            .collect(),
    )
}

/// Indices of tracks that belong to `playlist`, in catalog order.
///
/// Returns `None` for an unknown playlist.
pub fn playlist_indices(catalog: &Catalog, playlist: &str) -> Option<Vec<usize>> {
    let p = catalog.playlists().iter().find(|p| p.name == playlist)?;
    Some(
        catalog
            .tracks()
            .iter()
            .enumerate()
            .filter(|(_, t)| p.track_ids.contains(&t.id))
            .map(|(i, _)| i)
            .collect(),
    )
}
