/// Track domain type
use crate::types::TrackId;
use serde::{Deserialize, Serialize};

/// Song metadata as served by the catalog
///
/// Immutable once fetched. The player only keeps a cached copy for display
/// and the media URL it hands to the engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Track {
    /// Unique track identifier
    pub id: TrackId,

    /// Track title
    pub title: String,

    /// Author (artist) name
    pub author: String,

    /// Location of the audio stream
    pub media_url: String,

    /// Cover artwork location
    #[serde(default)]
    pub artwork_url: Option<String>,
}

impl Track {
    /// Create a track without artwork
    pub fn new(
        id: impl Into<TrackId>,
        title: impl Into<String>,
        author: impl Into<String>,
        media_url: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            author: author.into(),
            media_url: media_url.into(),
            artwork_url: None,
        }
    }

    /// Attach artwork
    #[must_use]
    pub fn with_artwork(mut self, artwork_url: impl Into<String>) -> Self {
        self.artwork_url = Some(artwork_url.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserializes_catalog_json() {
        let json = r#"{
            "id": "s1",
            "title": "Night Drive",
            "author": "Lumen",
            "mediaUrl": "https://cdn.example.com/s1.mp3",
            "artworkUrl": "https://cdn.example.com/s1.jpg"
        }"#;

        let track: Track = serde_json::from_str(json).unwrap();
        assert_eq!(track.id, TrackId::new("s1"));
        assert_eq!(track.author, "Lumen");
        assert_eq!(
            track.artwork_url.as_deref(),
            Some("https://cdn.example.com/s1.jpg")
        );
    }

    #[test]
    fn artwork_is_optional() {
        let json = r#"{"id":"s2","title":"T","author":"A","mediaUrl":"u"}"#;
        let track: Track = serde_json::from_str(json).unwrap();
        assert!(track.artwork_url.is_none());
    }
}
