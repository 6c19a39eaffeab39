use std::fs;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror;

use dockyard_http::RegistryConfig;

#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("unable to read config file {}: {}", .path.display(), .source)]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("config deserialization error: {0}")]
    Parse(#[from] serde_yaml::Error),
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    pub listen: SocketAddr,
    pub data_dir: Option<PathBuf>,
    pub registry: RegistryConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            listen: SocketAddr::from(([0, 0, 0, 0], 3000)),
            data_dir: None,
            registry: RegistryConfig::default(),
        }
    }
}

impl Config {
    /// Loads the YAML config file if one was given, defaults otherwise.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let s = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml(&s)
    }

    pub fn from_yaml(s: &str) -> Result<Self, ConfigError> {
        Ok(serde_yaml::from_str(s)?)
    }
}

#[cfg(test)]
mod test {
    use rstest::*;

    use super::*;

    #[test]
    fn defaults_without_file() {
        let config = Config::load(None).unwrap();
        assert_eq!(config.listen, SocketAddr::from(([0, 0, 0, 0], 3000)));
        assert!(config.data_dir.is_none());
        assert_eq!(config.registry.version, "dockyard-0.1");
        assert_eq!(config.registry.static_prefix, "/static");
    }

    #[test]
    fn full_file() {
        let config = Config::from_yaml(
            r#"
listen: 127.0.0.1:5000
data_dir: /srv/registry
registry:
  version: custom-1.0
  banner: hello
  static_prefix: /files
"#,
        )
        .unwrap();
        assert_eq!(config.listen, SocketAddr::from(([127, 0, 0, 1], 5000)));
        assert_eq!(config.data_dir, Some(PathBuf::from("/srv/registry")));
        assert_eq!(config.registry.version, "custom-1.0");
        assert_eq!(config.registry.banner, "hello");
        assert_eq!(config.registry.static_prefix, "/files");
    }

    #[rstest]
    #[case::listen_only("listen: 127.0.0.1:8080\n", "dockyard-0.1", "/static")]
    #[case::partial_registry("registry:\n  version: v2\n", "v2", "/static")]
    #[case::prefix_only("registry:\n  static_prefix: blobs\n", "dockyard-0.1", "blobs")]
    fn partial_file(#[case] yaml: &str, #[case] version: &str, #[case] prefix: &str) {
        let config = Config::from_yaml(yaml).unwrap();
        assert_eq!(config.registry.version, version);
        assert_eq!(config.registry.static_prefix, prefix);
    }

    #[test]
    fn bad_listen_address() {
        let err = Config::from_yaml("listen: not-an-address\n").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn missing_file() {
        let err = Config::load(Some(Path::new("/does/not/exist.yml"))).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }
}
