//! Server configuration read from the environment.

use std::path::PathBuf;

use terminology_engine::LoadConfig;

/// Directory definitions are loaded from when `TERMINOLOGY_DATA_PATH` is unset.
pub const DEFAULT_DATA_PATH: &str = "./data";

/// Environment variable naming the definition directory.
pub const DATA_PATH_VAR: &str = "TERMINOLOGY_DATA_PATH";

/// Port the HTTP server listens on when `TERMINOLOGY_PORT` is unset.
pub const DEFAULT_PORT: u16 = 8080;

/// Environment variable naming the listen port.
pub const PORT_VAR: &str = "TERMINOLOGY_PORT";

/// Environment variable holding the default expansion page size.
pub const DEFAULT_COUNT_VAR: &str = "TERMINOLOGY_DEFAULT_COUNT";

/// Request defaults and load settings for [`TerminologyServer`](crate::TerminologyServer).
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Directory of `*.json` definition files.
    pub data_path: PathBuf,
    /// HTTP listen port.
    pub port: u16,
    /// Page size applied to expansions that do not pass `count`.
    /// `None` returns the whole expansion.
    pub default_count: Option<usize>,
    /// How malformed definition files are handled.
    pub load: LoadConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            data_path: PathBuf::from(DEFAULT_DATA_PATH),
            port: DEFAULT_PORT,
            default_count: None,
            load: LoadConfig::default(),
        }
    }
}

impl ServerConfig {
    /// Reads the configuration from process environment variables.
    pub fn from_env() -> Self {
        Self::from_vars(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from a variable lookup. Unparseable values
    /// fall back to the defaults.
    pub fn from_vars<F>(get: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let data_path = get(DATA_PATH_VAR)
            .filter(|p| !p.is_empty())
            .map(PathBuf::from)
            .unwrap_or(defaults.data_path);

        let port = get(PORT_VAR)
            .and_then(|p| p.trim().parse().ok())
            .unwrap_or(defaults.port);

        let default_count = match get(DEFAULT_COUNT_VAR) {
            Some(raw) => match raw.trim().parse() {
                Ok(count) => Some(count),
                Err(_) => {
                    tracing::warn!("Ignoring invalid {}: {:?}", DEFAULT_COUNT_VAR, raw);
                    defaults.default_count
                }
            },
            None => defaults.default_count,
        };

        Self {
            data_path,
            port,
            default_count,
            load: defaults.load,
        }
    }
}
