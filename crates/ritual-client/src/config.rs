//! Client configuration.
//!
//! Read from a TOML file such as:
//!
//! ```toml
//! socket_path = "/run/user/1000/ritual.sock"
//! timeout = 2.5
//! ```
//!
//! `timeout` is in seconds and may be fractional.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{ClientError, ClientResult};

/// Connection settings of a front-end.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Path to the daemon socket; the daemon's default when unset.
    pub socket_path: Option<PathBuf>,

    /// Connect timeout.
    #[serde(with = "seconds")]
    pub timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            socket_path: None,
            timeout: Duration::from_secs(5),
        }
    }
}

impl ClientConfig {
    /// Loads configuration from a specific path.
    pub fn load_from(path: impl AsRef<Path>) -> ClientResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            ClientError::Config(format!("failed to read {}: {e}", path.display()))
        })?;
        Self::from_toml(&content)
    }

    /// Parses configuration from TOML text.
    pub fn from_toml(content: &str) -> ClientResult<Self> {
        let config: Self = toml::from_str(content)
            .map_err(|e| ClientError::Config(format!("failed to parse config: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Rejects settings no connection could be made with.
    pub fn validate(&self) -> ClientResult<()> {
        if self.timeout.is_zero() {
            return Err(ClientError::Config("timeout must be non-zero".into()));
        }
        Ok(())
    }

    /// Builder: set the socket path.
    pub fn with_socket_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.socket_path = Some(path.into());
        self
    }

    /// Builder: set the timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Returns the socket to connect to.
    pub fn socket_path(&self) -> PathBuf {
        self.socket_path
            .clone()
            .unwrap_or_else(ritual_server::default_socket_path)
    }

    /// Returns the connect timeout.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

/// `Duration` as a number of seconds.
mod seconds {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer, de::Error};

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(value.as_secs_f64())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        let secs = f64::deserialize(deserializer)?;
        Duration::try_from_secs_f64(secs)
            .map_err(|e| D::Error::custom(format!("invalid timeout {secs}: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = ClientConfig::default();
        assert_eq!(config.timeout(), Duration::from_secs(5));
        assert!(config.socket_path().to_string_lossy().ends_with(".sock"));
    }

    #[test]
    fn parse_full_config() {
        let config = ClientConfig::from_toml(
            r#"
            socket_path = "/run/user/1000/ritual.sock"
            timeout = 10
            "#,
        )
        .unwrap();

        assert_eq!(config.socket_path(), PathBuf::from("/run/user/1000/ritual.sock"));
        assert_eq!(config.timeout(), Duration::from_secs(10));
    }

    #[test]
    fn missing_keys_use_defaults() {
        let config = ClientConfig::from_toml("timeout = 2").unwrap();
        assert_eq!(config.socket_path, None);
        assert_eq!(config.timeout, Duration::from_secs(2));
    }

    #[test]
    fn fractional_timeout_is_kept() {
        let config = ClientConfig::from_toml("timeout = 0.25").unwrap();
        assert_eq!(config.timeout(), Duration::from_millis(250));

        let config = ClientConfig::default().with_timeout(Duration::from_millis(500));
        assert_eq!(config.timeout(), Duration::from_millis(500));
    }

    #[test]
    fn zero_or_negative_timeout_is_rejected() {
        for content in ["timeout = 0", "timeout = 0.0", "timeout = -1"] {
            let err = ClientConfig::from_toml(content).unwrap_err();
            assert!(matches!(err, ClientError::Config(_)), "{content}: {err:?}");
        }

        let config = ClientConfig::default().with_timeout(Duration::ZERO);
        assert!(matches!(config.validate(), Err(ClientError::Config(_))));
    }

    #[test]
    fn invalid_toml_is_a_config_error() {
        let err = ClientConfig::from_toml("timeout = \"soon\"").unwrap_err();
        assert!(matches!(err, ClientError::Config(_)));
    }

    #[test]
    fn load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("client.toml");

        let config = ClientConfig::default()
            .with_socket_path(dir.path().join("ritual.sock"))
            .with_timeout(Duration::from_millis(1500));
        std::fs::write(&path, toml::to_string(&config).unwrap()).unwrap();

        assert_eq!(ClientConfig::load_from(&path).unwrap(), config);
    }

    #[test]
    fn load_from_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = ClientConfig::load_from(dir.path().join("absent.toml")).unwrap_err();
        assert!(matches!(err, ClientError::Config(_)));
    }
}
