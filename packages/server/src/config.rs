//! Server configuration.
//!
//! Settings come from an optional TOML file and are then overridden by
//! environment variables. Every section and field has a default, so an
//! empty file (or no file) yields a working mock-only server on
//! `127.0.0.1:8080`.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use solaris_earth_engine::EarthEngineConfig;
use thiserror::Error;

/// Errors that can occur while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The config file could not be read.
    #[error("Failed to read config file '{path}': {source}")]
    Read {
        /// Path that was read.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The config file is not valid TOML for [`ServerConfig`].
    #[error("Failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),

    /// An environment override could not be parsed.
    #[error("Invalid value for {name}: '{value}'")]
    InvalidEnv {
        /// Variable name.
        name: &'static str,
        /// Offending value.
        value: String,
    },
}

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// HTTP listener.
    pub server: HttpConfig,
    /// Earth Engine gateway.
    pub earth_engine: EarthEngineConfig,
    /// Result cache.
    pub cache: CacheConfig,
    /// Scoring and projection.
    pub analysis: AnalysisConfig,
    /// Synthetic fallback data.
    pub mock: MockConfig,
}

/// `[server]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    /// Address to bind.
    pub bind_addr: String,
    /// Port to bind.
    pub port: u16,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1".to_string(),
            port: 8080,
        }
    }
}

/// `[cache]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Lifetime of cached fetch results, in seconds.
    pub ttl_secs: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl_secs: solaris_cache::DEFAULT_TTL.as_secs(),
        }
    }
}

impl CacheConfig {
    /// Entry lifetime.
    #[must_use]
    pub const fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_secs)
    }
}

/// `[analysis]` section.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Year projections count from. Unset means the current UTC year.
    pub reference_year: Option<i32>,
}

/// `[mock]` section.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MockConfig {
    /// Seed for reproducible synthetic data. Unset means ambient
    /// randomness.
    pub seed: Option<u64>,
}

impl ServerConfig {
    /// Reads and parses the TOML file at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content)
    }

    /// Parses configuration from TOML text.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] if the text is not valid.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Applies overrides from the process environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidEnv`] if a numeric variable does not
    /// parse.
    pub fn apply_env(&mut self) -> Result<(), ConfigError> {
        self.apply_overrides(|name| std::env::var(name).ok())
    }

    /// Applies overrides from `lookup`, which maps a variable name to its
    /// value.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidEnv`] if a numeric variable does not
    /// parse.
    pub fn apply_overrides(
        &mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<(), ConfigError> {
        if let Some(addr) = lookup("BIND_ADDR") {
            self.server.bind_addr = addr;
        }
        if let Some(port) = parse_var(&lookup, "PORT")? {
            self.server.port = port;
        }
        if let Some(url) = lookup("SOLARIS_EE_BASE_URL") {
            self.earth_engine.base_url = Some(url);
        }
        if let Some(project) = lookup("SOLARIS_EE_PROJECT") {
            self.earth_engine.project = project;
        }
        if let Some(token) = lookup("SOLARIS_EE_TOKEN") {
            self.earth_engine.token = Some(token);
        }
        if let Some(seed) = parse_var(&lookup, "SOLARIS_MOCK_SEED")? {
            self.mock.seed = Some(seed);
        }
        if let Some(year) = parse_var(&lookup, "SOLARIS_REFERENCE_YEAR")? {
            self.analysis.reference_year = Some(year);
        }
        Ok(())
    }
}

fn parse_var<T: std::str::FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &'static str,
) -> Result<Option<T>, ConfigError> {
    let Some(value) = lookup(name) else {
        return Ok(None);
    };
    let parsed = value.trim().parse::<T>();

    match parsed {
        Ok(parsed) => Ok(Some(parsed)),
        Err(_) => Err(ConfigError::InvalidEnv { name, value }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: BTreeMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn empty_file_gives_defaults() {
        let config = ServerConfig::from_toml("").unwrap();

        assert_eq!(config.server.bind_addr, "127.0.0.1");
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.cache.ttl(), Duration::from_secs(3600));
        assert!(config.earth_engine.base_url.is_none());
        assert!(config.mock.seed.is_none());
    }

    #[test]
    fn parses_sections() {
        let config = ServerConfig::from_toml(
            r#"
            [server]
            port = 9000

            [earth_engine]
            base_url = "https://ee.example"
            project = "heat-lab"
            timeout_secs = 15

            [cache]
            ttl_secs = 60

            [analysis]
            reference_year = 2024

            [mock]
            seed = 42
            "#,
        )
        .unwrap();

        assert_eq!(config.server.port, 9000);
        assert_eq!(config.server.bind_addr, "127.0.0.1");
        assert_eq!(config.earth_engine.base_url.as_deref(), Some("https://ee.example"));
        assert_eq!(config.earth_engine.project, "heat-lab");
        assert_eq!(config.earth_engine.timeout_secs, 15);
        assert_eq!(config.earth_engine.sample_pixels, 100);
        assert_eq!(config.cache.ttl_secs, 60);
        assert_eq!(config.analysis.reference_year, Some(2024));
        assert_eq!(config.mock.seed, Some(42));
    }

    #[test]
    fn rejects_malformed_toml() {
        assert!(matches!(
            ServerConfig::from_toml("[server]\nport = \"eighty\""),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn environment_overrides_file_values() {
        let mut config = ServerConfig::from_toml("[server]\nport = 9000").unwrap();
        config
            .apply_overrides(env(&[
                ("BIND_ADDR", "0.0.0.0"),
                ("PORT", "3000"),
                ("SOLARIS_EE_TOKEN", "secret"),
                ("SOLARIS_MOCK_SEED", "7"),
                ("SOLARIS_REFERENCE_YEAR", "2030"),
            ]))
            .unwrap();

        assert_eq!(config.server.bind_addr, "0.0.0.0");
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.earth_engine.token.as_deref(), Some("secret"));
        assert_eq!(config.mock.seed, Some(7));
        assert_eq!(config.analysis.reference_year, Some(2030));
    }

    #[test]
    fn invalid_numeric_override_is_an_error() {
        let mut config = ServerConfig::default();
        let err = config
            .apply_overrides(env(&[("PORT", "http")]))
            .unwrap_err();

        assert!(matches!(err, ConfigError::InvalidEnv { name: "PORT", .. }));
    }

    #[test]
    fn missing_file_reports_path() {
        let err = ServerConfig::load(Path::new("/nonexistent/solaris.toml")).unwrap_err();
        assert!(err.to_string().contains("/nonexistent/solaris.toml"));
    }
}
