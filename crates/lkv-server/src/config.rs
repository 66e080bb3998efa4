use std::fs;
use std::net::{Ipv4Addr, SocketAddr};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{ServerError, ServerResult};

/// Configuration file read when no path is given.
pub const DEFAULT_CONFIG_FILE: &str = "levelkv.toml";

/// Port of the Riak HTTP interface.
pub const DEFAULT_PORT: u16 = 8098;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Directory holding one sub-directory per bucket.
    pub database_location: PathBuf,
    pub logging: LoggingMode,
    pub bind_addr: SocketAddr,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            database_location: PathBuf::from("./data"),
            logging: LoggingMode::Stdout,
            bind_addr: SocketAddr::from((Ipv4Addr::LOCALHOST, DEFAULT_PORT)),
        }
    }
}

impl ServerConfig {
    /// Parse a TOML document. Missing fields take their defaults.
    pub fn from_toml_str(raw: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(raw)
    }

    /// Read and parse the file at `path`.
    pub fn load(path: &Path) -> ServerResult<Self> {
        let raw = fs::read_to_string(path).map_err(|source| ServerError::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&raw).map_err(|source| ServerError::ConfigParse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Load `path` if given; otherwise the default file if it exists, or
    /// built-in defaults.
    pub fn resolve(path: Option<&Path>) -> ServerResult<Self> {
        match path {
            Some(path) => Self::load(path),
            None => {
                let default = Path::new(DEFAULT_CONFIG_FILE);
                if default.exists() {
                    Self::load(default)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }
}

/// Where log output goes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LoggingMode {
    #[default]
    Stdout,
    #[serde(rename = "none")]
    Disabled,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let c = ServerConfig::default();
        assert_eq!(c.bind_addr, "127.0.0.1:8098".parse::<SocketAddr>().unwrap());
        assert_eq!(c.database_location, PathBuf::from("./data"));
        assert_eq!(c.logging, LoggingMode::Stdout);
    }

    #[test]
    fn partial_file_keeps_defaults() {
        let c = ServerConfig::from_toml_str("database_location = \"/var/lib/levelkv\"\n").unwrap();
        assert_eq!(c.database_location, PathBuf::from("/var/lib/levelkv"));
        assert_eq!(c.bind_addr, ServerConfig::default().bind_addr);
    }

    #[test]
    fn full_file() {
        let raw = r#"
            database_location = "db"
            logging = "none"
            bind_addr = "0.0.0.0:9000"
        "#;
        let c = ServerConfig::from_toml_str(raw).unwrap();
        assert_eq!(c.logging, LoggingMode::Disabled);
        assert_eq!(c.bind_addr.port(), 9000);
    }

    #[test]
    fn invalid_values_are_rejected() {
        assert!(ServerConfig::from_toml_str("logging = \"syslog\"").is_err());
        assert!(ServerConfig::from_toml_str("bind_addr = \"nowhere\"").is_err());
    }

    #[test]
    fn load_reports_path() {
        let tmp = tempfile::tempdir().unwrap();
        let missing = tmp.path().join("absent.toml");
        let err = ServerConfig::load(&missing).unwrap_err();
        assert!(matches!(err, ServerError::ConfigRead { .. }));

        let bad = tmp.path().join("bad.toml");
        fs::write(&bad, "bind_addr = 12").unwrap();
        assert!(matches!(
            ServerConfig::load(&bad).unwrap_err(),
            ServerError::ConfigParse { .. }
        ));

        let good = tmp.path().join("good.toml");
        fs::write(&good, "logging = \"stdout\"").unwrap();
        assert_eq!(ServerConfig::resolve(Some(&good)).unwrap(), ServerConfig::default());
    }
}
