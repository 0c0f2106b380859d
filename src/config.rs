use serde::Deserialize;

use std::{env, fs, path::Path, time::Duration};

const DEFAULT_PORT: u16 = 8000;
const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    /// Hosted table behind a PostgREST endpoint
    #[default]
    Rest,
    Postgres,
    Memory,
}

/// Keys match the environment variable names (lowercased), so a YAML
/// file and the environment are interchangeable.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Config {
    #[serde(rename = "board_backend", default)]
    pub backend: Backend,
    pub supabase_url: Option<String>,
    pub supabase_anon_key: Option<String>,
    pub pg_dsn: Option<String>,
    #[serde(rename = "board_port", default = "default_port")]
    pub port: u16,
    #[serde(
        rename = "board_request_timeout",
        default = "default_request_timeout",
        with = "humantime_serde"
    )]
    pub request_timeout: Duration,
}

const fn default_port() -> u16 {
    DEFAULT_PORT
}

const fn default_request_timeout() -> Duration {
    DEFAULT_REQUEST_TIMEOUT
}

/// Everything needed to reach the configured note store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreSettings {
    Rest {
        url: String,
        api_key: String,
        timeout: Duration,
    },
    Postgres {
        dsn: String,
    },
    Memory,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} must be set for the {1} backend")]
    Missing(&'static str, &'static str),

    #[error("failed to read config file '{path}': {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },

    #[error("invalid config file: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("invalid environment: {0}")]
    Env(#[from] envy::Error),
}

fn required(
    value: Option<&String>,
    name: &'static str,
    backend: &'static str,
) -> Result<String, ConfigError> {
    value
        .filter(|v| !v.trim().is_empty())
        .cloned()
        .ok_or(ConfigError::Missing(name, backend))
}

impl Config {
    pub fn from_yaml(contents: &str) -> Result<Self, ConfigError> {
        Ok(serde_yaml::from_str(contents)?)
    }

    pub fn from_vars<I>(vars: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        Ok(envy::from_iter(vars)?)
    }

    /// Resolves the backend settings, failing if a required value is absent.
    pub fn store(&self) -> Result<StoreSettings, ConfigError> {
        match self.backend {
            Backend::Rest => Ok(StoreSettings::Rest {
                url: required(self.supabase_url.as_ref(), "SUPABASE_URL", "rest")?,
                api_key: required(self.supabase_anon_key.as_ref(), "SUPABASE_ANON_KEY", "rest")?,
                timeout: self.request_timeout,
            }),
            Backend::Postgres => Ok(StoreSettings::Postgres {
                dsn: required(self.pg_dsn.as_ref(), "PG_DSN", "postgres")?,
            }),
            Backend::Memory => Ok(StoreSettings::Memory),
        }
    }
}

fn read_yaml(path: &str) -> Result<Config, ConfigError> {
    let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_string(),
        source,
    })?;
    Config::from_yaml(&contents)
}

pub fn load_config() -> Result<Config, ConfigError> {
    // Retrieve env variable
    let config_path = env::var("BOARD_CONFIG").unwrap_or_else(|_| "config.yaml".to_string());

    // Try env path
    if Path::new(&config_path).exists() {
        tracing::info!("Loading config from '{}'", config_path);
        return read_yaml(&config_path);
    }

    // Fallback to config.yaml
    if config_path != "config.yaml" && Path::new("config.yaml").exists() {
        tracing::warn!(
            "Config file '{}' not found, falling back to 'config.yaml'",
            config_path
        );
        return read_yaml("config.yaml");
    }

    // Fallback to environment variables
    tracing::info!("No config file found, loading configuration from environment variables");
    Config::from_vars(env::vars())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect()
    }

    #[test]
    fn env_defaults_to_rest_backend() {
        let cfg = Config::from_vars(vars(&[
            ("SUPABASE_URL", "https://abc.supabase.co"),
            ("SUPABASE_ANON_KEY", "anon"),
        ]))
        .unwrap();

        assert_eq!(cfg.backend, Backend::Rest);
        assert_eq!(cfg.port, DEFAULT_PORT);
        assert_eq!(cfg.request_timeout, DEFAULT_REQUEST_TIMEOUT);
        assert_eq!(
            cfg.store().unwrap(),
            StoreSettings::Rest {
                url: "https://abc.supabase.co".into(),
                api_key: "anon".into(),
                timeout: DEFAULT_REQUEST_TIMEOUT,
            }
        );
    }

    #[test]
    fn missing_key_is_fatal_for_rest() {
        let cfg = Config::from_vars(vars(&[("SUPABASE_URL", "https://abc.supabase.co")])).unwrap();

        let err = cfg.store().unwrap_err();
        assert!(matches!(err, ConfigError::Missing("SUPABASE_ANON_KEY", "rest")));
    }

    #[test]
    fn blank_url_counts_as_missing() {
        let cfg = Config::from_vars(vars(&[
            ("SUPABASE_URL", "  "),
            ("SUPABASE_ANON_KEY", "anon"),
        ]))
        .unwrap();

        assert!(matches!(
            cfg.store().unwrap_err(),
            ConfigError::Missing("SUPABASE_URL", "rest")
        ));
    }

    #[test]
    fn env_overrides_parse() {
        let cfg = Config::from_vars(vars(&[
            ("BOARD_BACKEND", "postgres"),
            ("PG_DSN", "postgres://localhost/board"),
            ("BOARD_PORT", "9100"),
            ("BOARD_REQUEST_TIMEOUT", "5s"),
        ]))
        .unwrap();

        assert_eq!(cfg.port, 9100);
        assert_eq!(cfg.request_timeout, Duration::from_secs(5));
        assert_eq!(
            cfg.store().unwrap(),
            StoreSettings::Postgres {
                dsn: "postgres://localhost/board".into()
            }
        );
    }

    #[test]
    fn yaml_memory_backend_needs_nothing_else() {
        let cfg = Config::from_yaml("board_backend: memory\nboard_port: 8080\n").unwrap();

        assert_eq!(cfg.port, 8080);
        assert_eq!(cfg.store().unwrap(), StoreSettings::Memory);
    }

    #[test]
    fn unknown_backend_is_rejected() {
        assert!(Config::from_yaml("board_backend: sqlite\n").is_err());
    }
}
