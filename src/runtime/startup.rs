use std::path::Path;

use tracing::info;

use crate::catalog::{self, Catalog};
use crate::config::CatalogSettings;
use crate::error::CatalogError;

/// Which part of the catalog a session plays from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    Playlist(String),
    Artist(String),
    Album(String),
    Genre(String),
}

impl Selection {
    /// `artist:NAME`, `album:NAME`, `genre:NAME` or `playlist:NAME`.
    /// A bare name is a playlist.
    pub fn parse(arg: &str) -> Self {
        match arg.split_once(':') {
            Some(("artist", name)) => Selection::Artist(name.to_string()),
            Some(("album", name)) => Selection::Album(name.to_string()),
            Some(("genre", name)) => Selection::Genre(name.to_string()),
            Some(("playlist", name)) => Selection::Playlist(name.to_string()),
            _ => Selection::Playlist(arg.to_string()),
        }
    }

    fn apply(&self, catalog: &Catalog) -> Result<Catalog, CatalogError> {
        match self {
            Selection::Playlist(name) => catalog.restrict_to_playlist(name),
            Selection::Artist(name) => catalog.restrict_to_artist(name),
            Selection::Album(name) => catalog.restrict_to_album(name),
            Selection::Genre(name) => catalog.restrict_to_genre(name),
        }
    }
}

/// Build the session catalog from a manifest file or a directory to scan,
/// optionally narrowed to a playlist, artist, album or genre.
pub fn load_catalog(
    target: &Path,
    selection: Option<&Selection>,
    settings: &CatalogSettings,
) -> Result<Catalog, CatalogError> {
    let catalog = if target.is_file() {
        info!(manifest = %target.display(), "loading catalog manifest");
        catalog::load_manifest(target)?
    } else {
        info!(dir = %target.display(), "scanning music directory");
        catalog::scan(target, settings)
    };

    match selection {
        Some(sel) => {
            let restricted = sel.apply(&catalog)?;
            info!(selection = ?sel, tracks = restricted.len(), "restricted catalog");
            Ok(restricted)
        }
        None => Ok(catalog),
    }
}
