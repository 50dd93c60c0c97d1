//! Service configuration
//!
//! Loaded from TOML; every field has a default, so an empty file is valid.
//!
//! ```toml
//! data_root = "data/default-user"
//! bind = "127.0.0.1:8000"
//! cache_capacity = 1000
//! cache_ttl_secs = 600
//! fetch_timeout_ms = 5000
//! ```

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Timeline service configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServiceConfig {
    /// Directory holding `chats/`, `groups/` and `group chats/`
    pub data_root: PathBuf,
    /// HTTP listen address
    pub bind: SocketAddr,
    /// Maximum number of cached timelines
    pub cache_capacity: u64,
    /// Lifetime of a cached timeline in seconds
    pub cache_ttl_secs: u64,
    /// Per-log read timeout in milliseconds
    pub fetch_timeout_ms: u64,
}

impl ServiceConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse from TOML text
    ///
    /// # Errors
    /// Returns error on invalid TOML, unknown keys or zero limits
    pub fn from_toml(input: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(input)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a TOML file
    ///
    /// # Errors
    /// Returns error if the file cannot be read or parsed
    pub async fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = tokio::fs::read_to_string(path).await.map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&raw)
    }

    /// Check limits
    ///
    /// # Errors
    /// Returns error if a limit is zero
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.cache_capacity == 0 {
            return Err(ConfigError::Invalid("cache_capacity must be at least 1".into()));
        }
        if self.cache_ttl_secs == 0 {
            return Err(ConfigError::Invalid("cache_ttl_secs must be at least 1".into()));
        }
        if self.fetch_timeout_ms == 0 {
            return Err(ConfigError::Invalid("fetch_timeout_ms must be at least 1".into()));
        }
        Ok(())
    }

    /// With data root
    #[inline]
    #[must_use]
    pub fn with_data_root(mut self, data_root: impl Into<PathBuf>) -> Self {
        self.data_root = data_root.into();
        self
    }

    /// With listen address
    #[inline]
    #[must_use]
    pub fn with_bind(mut self, bind: SocketAddr) -> Self {
        self.bind = bind;
        self
    }

    /// With cache capacity
    #[inline]
    #[must_use]
    pub fn with_cache_capacity(mut self, capacity: u64) -> Self {
        self.cache_capacity = capacity;
        self
    }

    /// With cache TTL
    #[inline]
    #[must_use]
    pub fn with_cache_ttl(mut self, ttl: Duration) -> Self {
        self.cache_ttl_secs = ttl.as_secs();
        self
    }

    /// With per-log fetch timeout
    #[inline]
    #[must_use]
    pub fn with_fetch_timeout(mut self, timeout: Duration) -> Self {
        self.fetch_timeout_ms = u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX);
        self
    }

    /// Cache TTL as a duration
    #[inline]
    #[must_use]
    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }

    /// Fetch timeout as a duration
    #[inline]
    #[must_use]
    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_millis(self.fetch_timeout_ms)
    }
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            data_root: PathBuf::from("data/default-user"),
            bind: SocketAddr::from(([127, 0, 0, 1], 8000)),
            cache_capacity: braid_cache::DEFAULT_CAPACITY,
            cache_ttl_secs: braid_cache::DEFAULT_TTL.as_secs(),
            fetch_timeout_ms: 5_000,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn empty_file_gives_defaults() {
        assert_eq!(ServiceConfig::from_toml("").unwrap(), ServiceConfig::default());
    }

    #[test]
    fn partial_file_overrides_fields() {
        let config = ServiceConfig::from_toml("data_root = \"/srv/chats\"\nfetch_timeout_ms = 250\n").unwrap();
        assert_eq!(config.data_root, PathBuf::from("/srv/chats"));
        assert_eq!(config.fetch_timeout(), Duration::from_millis(250));
        assert_eq!(config.cache_capacity, braid_cache::DEFAULT_CAPACITY);
    }

    #[test]
    fn unknown_key_is_rejected() {
        assert!(matches!(
            ServiceConfig::from_toml("cache_size = 3"),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn zero_limits_are_rejected() {
        assert!(matches!(
            ServiceConfig::from_toml("cache_ttl_secs = 0"),
            Err(ConfigError::Invalid(_))
        ));
    }

    #[test]
    fn builders_chain() {
        let config = ServiceConfig::new()
            .with_cache_capacity(5)
            .with_cache_ttl(Duration::from_secs(30))
            .with_fetch_timeout(Duration::from_secs(2));
        assert_eq!(config.cache_capacity, 5);
        assert_eq!(config.cache_ttl(), Duration::from_secs(30));
        assert_eq!(config.fetch_timeout_ms, 2_000);
    }

    #[tokio::test]
    async fn loads_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("braid.toml");
        std::fs::write(&path, "bind = \"0.0.0.0:9000\"\n").unwrap();

        let config = ServiceConfig::load(&path).await.unwrap();
        assert_eq!(config.bind.port(), 9000);
    }
}
