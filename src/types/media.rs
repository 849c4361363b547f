/// One playable track as the caller knows it
///
/// The controller never mutates a `MediaItem`; it only resolves it into a
/// [`PlayableItem`] against the configured base URL.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MediaItem {
    /// Stable identifier, compared against the session's current item
    pub id: String,

    /// Backend file reference, resolved under `audios/`
    pub file_name: String,

    /// Track title
    pub title: Option<String>,

    /// Artist name
    pub artist: Option<String>,

    /// Album name
    pub album_title: Option<String>,

    /// Backend artwork reference, resolved under `images/`
    pub artwork_uri: Option<String>,

    /// Informational duration; the session's reported duration wins
    pub duration_ms: Option<u64>,
}

impl MediaItem {
    /// Create a new `MediaItem` with required fields
    pub fn new(id: impl Into<String>, file_name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            file_name: file_name.into(),
            ..Default::default()
        }
    }

    /// Builder method to set title
    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Builder method to set artist
    #[must_use]
    pub fn with_artist(mut self, artist: impl Into<String>) -> Self {
        self.artist = Some(artist.into());
        self
    }

    /// Builder method to set album title
    #[must_use]
    pub fn with_album(mut self, album_title: impl Into<String>) -> Self {
        self.album_title = Some(album_title.into());
        self
    }

    /// Builder method to set artwork reference
    #[must_use]
    pub fn with_artwork(mut self, artwork_uri: impl Into<String>) -> Self {
        self.artwork_uri = Some(artwork_uri.into());
        self
    }

    /// Builder method to set duration
    #[must_use]
    pub fn with_duration(mut self, duration_ms: u64) -> Self {
        self.duration_ms = Some(duration_ms);
        self
    }

    /// Resolve into the form handed to the session
    ///
    /// `base_url` is used verbatim: `"<base_url>audios/<file_name>"` and
    /// `"<base_url>images/<artwork_uri>"`.
    #[must_use]
    pub fn to_playable(&self, base_url: &str) -> PlayableItem {
        PlayableItem {
            media_id: self.id.clone(),
            uri: audio_url(base_url, &self.file_name),
            metadata: MediaMetadata {
                title: self.title.clone(),
                artist: self.artist.clone(),
                album_title: self.album_title.clone(),
                artwork_uri: self
                    .artwork_uri
                    .as_deref()
                    .map(|artwork| artwork_url(base_url, artwork)),
            },
        }
    }
}

/// Display metadata attached to a [`PlayableItem`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MediaMetadata {
    /// Track title
    pub title: Option<String>,
    /// Artist name
    pub artist: Option<String>,
    /// Album name
    pub album_title: Option<String>,
    /// Resolved artwork URL
    pub artwork_uri: Option<String>,
}

/// A track resolved against the backend, ready for the session
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlayableItem {
    /// Same value as [`MediaItem::id`]
    pub media_id: String,
    /// Resolved audio URL
    pub uri: String,
    /// Display metadata
    pub metadata: MediaMetadata,
}

/// `"<base_url>audios/<file_name>"`
#[must_use]
pub fn audio_url(base_url: &str, file_name: &str) -> String {
    format!("{base_url}audios/{file_name}")
}

/// `"<base_url>images/<artwork_uri>"`
#[must_use]
pub fn artwork_url(base_url: &str, artwork_uri: &str) -> String {
    format!("{base_url}images/{artwork_uri}")
}
