use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

use crate::error::PlayerError;

/// Well-known identity of the playback service a controller connects to
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SessionToken {
    /// Package or application that hosts the service
    pub package: String,
    /// Service component name
    pub service: String,
}

impl SessionToken {
    /// Create a new session token
    pub fn new(package: impl Into<String>, service: impl Into<String>) -> Self {
        Self {
            package: package.into(),
            service: service.into(),
        }
    }
}

impl Default for SessionToken {
    fn default() -> Self {
        Self::new("app.content", "PlaybackService")
    }
}

impl std::fmt::Display for SessionToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.package, self.service)
    }
}

/// Configuration for controller behavior
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PlayerConfig {
    /// Backend base URL that media file names are resolved against
    pub base_url: String,

    /// Identity of the playback service
    pub session_token: SessionToken,

    /// Interval between progress polls while playing (default: 250ms)
    #[serde(rename = "poll_interval_ms", with = "millis")]
    pub poll_interval: Duration,

    /// Upper bound on a connection attempt (default: 10 seconds, `None` = unbounded)
    #[serde(rename = "connection_timeout_ms", with = "opt_millis")]
    pub connection_timeout: Option<Duration>,

    /// Screen name attached to diagnostic reports
    pub diagnostics_screen: String,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080/".to_string(),
            session_token: SessionToken::default(),
            poll_interval: Duration::from_millis(250),
            connection_timeout: Some(Duration::from_secs(10)),
            diagnostics_screen: "Player".to_string(),
        }
    }
}

impl PlayerConfig {
    /// Create a new config builder
    #[must_use]
    pub fn builder() -> PlayerConfigBuilder {
        PlayerConfigBuilder::default()
    }

    /// Parse configuration from JSON, filling missing fields with defaults
    ///
    /// # Errors
    ///
    /// Returns `PlayerError::Config` if the JSON is malformed.
    pub fn from_json_str(json: &str) -> Result<Self, PlayerError> {
        let config: Self = serde_json::from_str(json).map_err(|e| PlayerError::Config {
            message: format!("failed to parse config: {e}"),
            source: Some(Box::new(e)),
        })?;
        Ok(config.normalized())
    }

    /// Load configuration from a JSON file
    ///
    /// # Errors
    ///
    /// Returns `PlayerError::Config` if the file cannot be read or parsed.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, PlayerError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|e| PlayerError::Config {
            message: format!("failed to read {}: {e}", path.display()),
            source: Some(Box::new(e)),
        })?;
        Self::from_json_str(&json)
    }

    /// Base URLs are concatenated with `audios/` and `images/`, so they must end in `/`
    fn normalized(mut self) -> Self {
        if !self.base_url.ends_with('/') {
            self.base_url.push('/');
        }
        self
    }
}

/// Builder for `PlayerConfig`
#[derive(Debug, Clone, Default)]
pub struct PlayerConfigBuilder {
    config: PlayerConfig,
}

impl PlayerConfigBuilder {
    /// Set backend base URL
    #[must_use]
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.config.base_url = url.into();
        self
    }

    /// Set playback service identity
    #[must_use]
    pub fn session_token(mut self, token: SessionToken) -> Self {
        self.config.session_token = token;
        self
    }

    /// Set progress polling interval
    #[must_use]
    pub fn poll_interval(mut self, interval: Duration) -> Self {
        self.config.poll_interval = interval;
        self
    }

    /// Set connection timeout (`None` disables it)
    #[must_use]
    pub fn connection_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.config.connection_timeout = timeout;
        self
    }

    /// Set screen name used in diagnostic reports
    #[must_use]
    pub fn diagnostics_screen(mut self, screen: impl Into<String>) -> Self {
        self.config.diagnostics_screen = screen.into();
        self
    }

    /// Build the configuration
    #[must_use]
    pub fn build(self) -> PlayerConfig {
        self.config.normalized()
    }
}

mod millis {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer};

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        u64::deserialize(d).map(Duration::from_millis)
    }
}

mod opt_millis {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer};

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<Duration>, D::Error> {
        Option::<u64>::deserialize(d).map(|ms| ms.map(Duration::from_millis))
    }
}
