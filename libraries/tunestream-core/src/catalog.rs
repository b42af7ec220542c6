//! Track catalog contract
//!
//! The catalog is the external metadata source. The player never writes to
//! it; it resolves ids to `Track`s when a queue is set or a track is loaded.

use crate::error::{CoreError, Result};
use crate::types::{Track, TrackId};
use std::collections::HashMap;
use std::path::Path;
use tracing::debug;

/// Read-only track metadata source
pub trait CatalogProvider {
    /// Look up a single track
    ///
    /// # Errors
    /// Returns `CoreError::TrackNotFound` if the id is unknown
    fn get_track(&self, id: &TrackId) -> Result<Track>;

    /// Look up several tracks, in request order
    ///
    /// Unknown ids are skipped; the result is used for display only.
    fn get_tracks(&self, ids: &[TrackId]) -> Result<Vec<Track>> {
        let mut tracks = Vec::with_capacity(ids.len());
        for id in ids {
            match self.get_track(id) {
                Ok(track) => tracks.push(track),
                Err(CoreError::TrackNotFound(missing)) => {
                    debug!("Catalog has no track {}, skipping", missing);
                }
                Err(e) => return Err(e),
            }
        }
        Ok(tracks)
    }
}

/// Catalog backed by a hash map
///
/// Used by hosts that already hold the song list in memory (and by tests).
#[derive(Debug, Clone, Default)]
pub struct InMemoryCatalog {
    tracks: HashMap<TrackId, Track>,
}

impl InMemoryCatalog {
    /// Create an empty catalog
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a JSON array of tracks
    pub fn from_json_str(json: &str) -> Result<Self> {
        let tracks: Vec<Track> = serde_json::from_str(json)?;
        Self::from_tracks(tracks)
    }

    /// Load a JSON array of tracks from disk
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    /// Build a catalog, rejecting duplicate ids
    pub fn from_tracks(tracks: impl IntoIterator<Item = Track>) -> Result<Self> {
        let mut catalog = Self::new();
        for track in tracks {
            if catalog.tracks.contains_key(&track.id) {
                return Err(CoreError::invalid_input(format!(
                    "duplicate track id in catalog: {}",
                    track.id
                )));
            }
            catalog.insert(track);
        }
        Ok(catalog)
    }

    /// Insert or replace a track
    pub fn insert(&mut self, track: Track) -> Option<Track> {
        self.tracks.insert(track.id.clone(), track)
    }

    /// Number of tracks
    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    /// Whether the catalog is empty
    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    /// All ids, sorted
    pub fn ids(&self) -> Vec<TrackId> {
        let mut ids: Vec<TrackId> = self.tracks.keys().cloned().collect();
        ids.sort();
        ids
    }
}

impl CatalogProvider for InMemoryCatalog {
    fn get_track(&self, id: &TrackId) -> Result<Track> {
        self.tracks
            .get(id)
            .cloned()
            .ok_or_else(|| CoreError::TrackNotFound(id.clone()))
    }
}

impl<C: CatalogProvider + ?Sized> CatalogProvider for std::rc::Rc<C> {
    fn get_track(&self, id: &TrackId) -> Result<Track> {
        (**self).get_track(id)
    }

    fn get_tracks(&self, ids: &[TrackId]) -> Result<Vec<Track>> {
        (**self).get_tracks(ids)
    }
}
