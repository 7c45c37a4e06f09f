use serde::Deserialize;
use std::net::{IpAddr, Ipv4Addr};
use std::time::Duration;
use tracing::warn;

use crate::error::ConfigError;
use crate::http::HttpVersion;

/// Address the server binds to when the config does not name one.
pub const DEFAULT_ADDRESS: IpAddr = IpAddr::V4(Ipv4Addr::UNSPECIFIED);

/// Port the server binds to when the config does not name one.
pub const DEFAULT_PORT: u16 = 8080;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub address: IpAddr,
    pub port: u16,
    pub buffer_size: usize,

    pub http_version: HttpVersion,
    pub max_path_size: usize,
    pub max_header_size: usize,
    pub max_body_size: usize,

    #[serde(deserialize_with = "deserialize_duration")]
    pub read_timeout: Duration,

    #[serde(deserialize_with = "deserialize_duration")]
    pub write_timeout: Duration,

    pub static_files_root: String,

    pub server_name: String,

    /// Compress in-memory bodies when the client sends `Accept-Encoding`.
    pub compression: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            address: DEFAULT_ADDRESS,
            port: DEFAULT_PORT,
            buffer_size: 4096,

            http_version: HttpVersion::V1_1,
            max_path_size: 1024,
            max_header_size: 8192,
            max_body_size: 1024 * 1024, // 1 MB

            read_timeout: Duration::from_secs(5),
            write_timeout: Duration::from_secs(5),

            static_files_root: "./static".to_string(),

            server_name: "rustyroute/0.1".to_string(),

            compression: false,
        }
    }
}

impl ServerConfig {
    pub fn from_file(path: &str) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_string(),
            source,
        })?;

        toml::from_str::<ServerConfig>(&content).map_err(|source| ConfigError::Parse {
            path: path.to_string(),
            source,
        })
    }

    /// Like [`from_file`](Self::from_file) but falls back to the defaults
    /// when the file is missing or malformed.
    pub fn load(path: &str) -> Self {
        match Self::from_file(path) {
            Ok(config) => config,
            Err(err) => {
                warn!(error = %err, "falling back to default config");
                ServerConfig::default()
            }
        }
    }
}

fn deserialize_duration<'de, D>(deserializer: D) -> Result<Duration, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let secs = f64::deserialize(deserializer)?;
    Duration::try_from_secs_f64(secs).map_err(serde::de::Error::custom)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_bind_all_interfaces() {
        let config = ServerConfig::default();
        assert_eq!(config.address, IpAddr::V4(Ipv4Addr::new(0, 0, 0, 0)));
        assert_eq!(config.port, 8080);
    }

    #[test]
    fn partial_file_keeps_defaults() {
        let config: ServerConfig = toml::from_str(
            r#"
            port = 9090
            read_timeout = 0.5
            http_version = "V1_0"
            "#,
        )
        .unwrap();
        assert_eq!(config.port, 9090);
        assert_eq!(config.read_timeout, Duration::from_millis(500));
        assert_eq!(config.http_version, HttpVersion::V1_0);
        assert_eq!(config.address, DEFAULT_ADDRESS);
        assert_eq!(config.max_header_size, 8192);
    }

    #[test]
    fn negative_duration_is_rejected() {
        let res = toml::from_str::<ServerConfig>("write_timeout = -1.0");
        assert!(res.is_err());
    }

    #[test]
    fn from_file_reports_missing_file() {
        let err = ServerConfig::from_file("/nonexistent/rustyroute.toml").unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }

    #[test]
    fn load_falls_back_on_parse_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"port = \"not a number\"").unwrap();
        let config = ServerConfig::load(file.path().to_str().unwrap());
        assert_eq!(config.port, DEFAULT_PORT);
    }
}
