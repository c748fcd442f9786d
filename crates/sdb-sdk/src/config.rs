//! Client configuration.
//!
//! Read from a TOML file, by default `$HOME/.ngi_config/statusdb.toml`:
//!
//! ```toml
//! [statusdb]
//! url = "localhost"
//! port = 5984
//! username = "user"
//! password = "secret"
//! db = "projects"
//!
//! [matching]
//! extensive = false
//! force = false
//! ```

use std::fmt;
use std::path::{Path, PathBuf};

use sdb_match::MatchOptions;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read configuration file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid configuration: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("configuration is missing '{0}'")]
    Missing(&'static str),

    #[error("no configuration path given and HOME is not set")]
    NoHome,
}

/// Location of the server and credentials.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionSettings {
    pub url: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    /// Default database, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub db: Option<String>,
}

impl ConnectionSettings {
    /// Replace settings with the ones given on the command line.
    pub fn apply_overrides(&mut self, overrides: &ConnectionOverrides) {
        if let Some(url) = &overrides.url {
            self.url = url.clone();
        }
        if let Some(port) = overrides.port {
            self.port = port;
        }
        if let Some(username) = &overrides.username {
            self.username = username.clone();
        }
        if let Some(password) = &overrides.password {
            self.password = password.clone();
        }
        if let Some(db) = &overrides.db {
            self.db = Some(db.clone());
        }
    }

    /// The server URL with credentials.
    pub fn url_string(&self) -> String {
        format!(
            "http://{}:{}@{}:{}",
            self.username, self.password, self.url, self.port
        )
    }

    /// The server URL with the password masked, for logs.
    pub fn display_url(&self) -> String {
        format!("http://{}:*********@{}:{}", self.username, self.url, self.port)
    }
}

impl fmt::Debug for ConnectionSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionSettings")
            .field("url", &self.display_url())
            .field("db", &self.db)
            .finish()
    }
}

/// Command-line replacements for [`ConnectionSettings`].
#[derive(Clone, Debug, Default)]
pub struct ConnectionOverrides {
    pub url: Option<String>,
    pub port: Option<u16>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub db: Option<String>,
}

/// Matching defaults.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchingConfig {
    #[serde(default)]
    pub extensive: bool,
    #[serde(default)]
    pub force: bool,
}

impl From<MatchingConfig> for MatchOptions {
    fn from(config: MatchingConfig) -> Self {
        MatchOptions {
            extensive: config.extensive,
            force: config.force,
        }
    }
}

/// The `[statusdb]` section as written, every key optional.
#[derive(Debug, Default, Deserialize)]
struct RawConnection {
    url: Option<String>,
    port: Option<u16>,
    username: Option<String>,
    password: Option<String>,
    db: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawConfig {
    statusdb: Option<RawConnection>,
    #[serde(default)]
    matching: MatchingConfig,
}

/// Parsed client configuration.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StatusDbConfig {
    pub connection: ConnectionSettings,
    pub matching: MatchingConfig,
}

impl StatusDbConfig {
    /// `$HOME/.ngi_config/statusdb.toml`.
    pub fn default_path() -> Result<PathBuf, ConfigError> {
        let home = std::env::var_os("HOME").ok_or(ConfigError::NoHome)?;
        Ok(PathBuf::from(home).join(".ngi_config").join("statusdb.toml"))
    }

    /// Load from `path`, or from [`Self::default_path`] when `None`.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let path = match path {
            Some(path) => path.to_path_buf(),
            None => Self::default_path()?,
        };
        let text = std::fs::read_to_string(&path).map_err(|source| ConfigError::Io {
            path: path.clone(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let raw: RawConfig = toml::from_str(text)?;
        let section = raw.statusdb.ok_or(ConfigError::Missing("statusdb"))?;
        let connection = ConnectionSettings {
            url: section.url.ok_or(ConfigError::Missing("statusdb.url"))?,
            port: section.port.ok_or(ConfigError::Missing("statusdb.port"))?,
            username: section
                .username
                .ok_or(ConfigError::Missing("statusdb.username"))?,
            password: section
                .password
                .ok_or(ConfigError::Missing("statusdb.password"))?,
            db: section.db,
        };
        Ok(Self {
            connection,
            matching: raw.matching,
        })
    }
}
