use std::collections::BTreeMap;

use crate::error::CatalogError;

/// One playable catalog entry.
#[derive(Debug, Clone, PartialEq)]
pub struct Track {
    /// Stable identity key, always positive.
    pub id: u32,
    pub title: String,
    pub artist: String,
    pub album: String,
    /// Opaque locator handed to the audio output.
    pub source: String,
    /// Display-only length such as `"3:48"`.
    pub duration_hint: Option<String>,
}

/// A named, ordered list of track ids.
#[derive(Debug, Clone, PartialEq)]
pub struct Playlist {
    pub name: String,
    pub track_ids: Vec<u32>,
}

/// An ordered, fixed sequence of tracks plus the groupings defined over it.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    tracks: Vec<Track>,
    playlists: Vec<Playlist>,
    genres: BTreeMap<String, Vec<String>>,
}

impl Catalog {
    /// Build a catalog, rejecting non-positive or duplicate ids.
    pub fn new(tracks: Vec<Track>) -> Result<Self, CatalogError> {
        let mut seen = std::collections::HashSet::with_capacity(tracks.len());
        for t in &tracks {
            if t.id == 0 {
                return Err(CatalogError::InvalidId(t.id));
            }
            if !seen.insert(t.id) {
                return Err(CatalogError::DuplicateId(t.id));
            }
        }
        Ok(Self {
            tracks,
            playlists: Vec::new(),
            genres: BTreeMap::new(),
        })
    }

    pub fn with_playlists(mut self, playlists: Vec<Playlist>) -> Self {
        self.playlists = playlists;
        self
    }

    pub fn with_genres(mut self, genres: BTreeMap<String, Vec<String>>) -> Self {
        self.genres = genres;
        self
    }

    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    pub fn get(&self, index: usize) -> Option<&Track> {
        self.tracks.get(index)
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    /// Index of the track with `id`, if present.
    pub fn index_of(&self, id: u32) -> Option<usize> {
        self.tracks.iter().position(|t| t.id == id)
    }

    pub fn playlists(&self) -> &[Playlist] {
        &self.playlists
    }

    pub fn genres(&self) -> &BTreeMap<String, Vec<String>> {
        &self.genres
    }

    /// Narrow the catalog to the tracks that belong to `playlist`.
    ///
    /// Catalog order is kept; ids the catalog lacks are ignored.
    pub fn restrict_to_playlist(&self, playlist: &str) -> Result<Catalog, CatalogError> {
        let indices = super::group::playlist_indices(self, playlist)
            .ok_or_else(|| CatalogError::UnknownPlaylist(playlist.to_string()))?;
        Ok(self.restricted(indices))
    }

    /// Narrow the catalog to one artist's tracks.
    pub fn restrict_to_artist(&self, artist: &str) -> Result<Catalog, CatalogError> {
        let indices = super::group::by_artist(self)
            .remove(artist.trim())
            .ok_or_else(|| CatalogError::UnknownArtist(artist.to_string()))?;
        Ok(self.restricted(indices))
    }

    /// Narrow the catalog to one album's tracks.
    pub fn restrict_to_album(&self, album: &str) -> Result<Catalog, CatalogError> {
        let indices = super::group::by_album(self)
            .remove(album.trim())
            .ok_or_else(|| CatalogError::UnknownAlbum(album.to_string()))?;
        Ok(self.restricted(indices))
    }

    /// Narrow the catalog to the tracks of the artists listed under `genre`.
    pub fn restrict_to_genre(&self, genre: &str) -> Result<Catalog, CatalogError> {
        let indices = super::group::genre_indices(self, genre)
            .ok_or_else(|| CatalogError::UnknownGenre(genre.to_string()))?;
        Ok(self.restricted(indices))
    }

    fn restricted(&self, indices: Vec<usize>) -> Catalog {
        Catalog {
            tracks: indices.into_iter().map(|i| self.tracks[i].clone()).collect(),
            playlists: self.playlists.clone(),
            genres: self.genres.clone(),
        }
    }
}
