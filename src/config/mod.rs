//! Configuration module for the LMS portal backend.
//!
//! All configuration is loaded from `LMS_*` environment variables with defaults.

use std::env;
use std::fmt;
use std::net::SocketAddr;

use crate::viewmodel::{DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};

/// A configuration variable holding a value that does not parse.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigError {
    pub variable: &'static str,
    pub value: String,
    pub reason: String,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid {}={:?}: {}", self.variable, self.value, self.reason)
    }
}

impl std::error::Error for ConfigError {}

/// Output format of the log subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Human-readable lines
    #[default]
    Text,
    /// One JSON object per event
    Json,
}

impl LogFormat {
    fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "text" | "pretty" => Some(LogFormat::Text),
            "json" => Some(LogFormat::Json),
            _ => None,
        }
    }
}

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Pre-shared key for API authentication (required in production)
    pub api_psk: Option<String>,
    /// Address to bind the server to
    pub bind_addr: SocketAddr,
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
    /// Log output format (text or json)
    pub log_format: LogFormat,
    /// Page size used when a list request does not ask for one
    pub default_page_size: usize,
    /// Largest page size a list request may ask for
    pub max_page_size: usize,
    /// Load the built-in demo records at startup
    pub seed_demo_data: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_psk: None,
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 8080)),
            log_level: "info".to_string(),
            log_format: LogFormat::Text,
            default_page_size: DEFAULT_PAGE_SIZE,
            max_page_size: MAX_PAGE_SIZE,
            seed_demo_data: true,
        }
    }
}

impl Config {
    /// Load configuration from the process environment (and `.env`, if present).
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Load configuration through `lookup`, which maps a variable name to its value.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let api_psk = lookup("LMS_API_PSK").filter(|k| !k.is_empty());

        let bind_addr = match lookup("LMS_BIND_ADDR") {
            Some(value) => value.parse().map_err(|e: std::net::AddrParseError| ConfigError {
                variable: "LMS_BIND_ADDR",
                reason: e.to_string(),
                value,
            })?,
            None => defaults.bind_addr,
        };

        let log_level = lookup("LMS_LOG_LEVEL").unwrap_or(defaults.log_level);

        let log_format = match lookup("LMS_LOG_FORMAT") {
            Some(value) => LogFormat::parse(&value).ok_or_else(|| ConfigError {
                variable: "LMS_LOG_FORMAT",
                value,
                reason: "expected text or json".to_string(),
            })?,
            None => defaults.log_format,
        };

        let max_page_size = parse_size(&lookup, "LMS_MAX_PAGE_SIZE", defaults.max_page_size)?;
        let default_page_size =
            parse_size(&lookup, "LMS_DEFAULT_PAGE_SIZE", defaults.default_page_size)?
                .min(max_page_size);

        let seed_demo_data = match lookup("LMS_SEED_DEMO_DATA") {
            Some(value) => parse_bool(&value).ok_or_else(|| ConfigError {
                variable: "LMS_SEED_DEMO_DATA",
                value,
                reason: "expected true or false".to_string(),
            })?,
            None => defaults.seed_demo_data,
        };

        Ok(Self {
            api_psk,
            bind_addr,
            log_level,
            log_format,
            default_page_size,
            max_page_size,
            seed_demo_data,
        })
    }
}

fn parse_size<F>(lookup: &F, variable: &'static str, default: usize) -> Result<usize, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let Some(value) = lookup(variable) else {
        return Ok(default);
    };
    match value.trim().parse::<usize>() {
        Ok(n) if n >= 1 => Ok(n),
        Ok(_) => Err(ConfigError {
            variable,
            value,
            reason: "must be at least 1".to_string(),
        }),
        Err(e) => Err(ConfigError {
            variable,
            reason: e.to_string(),
            value,
        }),
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn load(vars: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|name| vars.get(name).cloned())
    }

    #[test]
    fn test_default_config() {
        let config = load(&[]).unwrap();

        assert!(config.api_psk.is_none());
        assert_eq!(config.bind_addr.to_string(), "127.0.0.1:8080");
        assert_eq!(config.log_level, "info");
        assert_eq!(config.log_format, LogFormat::Text);
        assert_eq!(config.default_page_size, 10);
        assert_eq!(config.max_page_size, 100);
        assert!(config.seed_demo_data);
    }

    #[test]
    fn test_overrides() {
        let config = load(&[
            ("LMS_API_PSK", "secret"),
            ("LMS_BIND_ADDR", "0.0.0.0:9000"),
            ("LMS_LOG_LEVEL", "debug"),
            ("LMS_LOG_FORMAT", "JSON"),
            ("LMS_DEFAULT_PAGE_SIZE", "25"),
            ("LMS_MAX_PAGE_SIZE", "50"),
            ("LMS_SEED_DEMO_DATA", "off"),
        ])
        .unwrap();

        assert_eq!(config.api_psk.as_deref(), Some("secret"));
        assert_eq!(config.bind_addr.port(), 9000);
        assert_eq!(config.log_level, "debug");
        assert_eq!(config.log_format, LogFormat::Json);
        assert_eq!(config.default_page_size, 25);
        assert_eq!(config.max_page_size, 50);
        assert!(!config.seed_demo_data);
    }

    #[test]
    fn test_default_page_size_capped_by_max() {
        let config = load(&[("LMS_DEFAULT_PAGE_SIZE", "40"), ("LMS_MAX_PAGE_SIZE", "20")]).unwrap();
        assert_eq!(config.default_page_size, 20);
    }

    #[test]
    fn test_empty_psk_disables_auth() {
        assert!(load(&[("LMS_API_PSK", "")]).unwrap().api_psk.is_none());
    }

    #[test]
    fn test_invalid_values_are_errors() {
        let err = load(&[("LMS_BIND_ADDR", "not-an-addr")]).unwrap_err();
        assert_eq!(err.variable, "LMS_BIND_ADDR");

        let err = load(&[("LMS_DEFAULT_PAGE_SIZE", "0")]).unwrap_err();
        assert_eq!(err.variable, "LMS_DEFAULT_PAGE_SIZE");

        let err = load(&[("LMS_MAX_PAGE_SIZE", "lots")]).unwrap_err();
        assert_eq!(err.variable, "LMS_MAX_PAGE_SIZE");

        let err = load(&[("LMS_SEED_DEMO_DATA", "maybe")]).unwrap_err();
        assert!(err.to_string().contains("LMS_SEED_DEMO_DATA"));

        let err = load(&[("LMS_LOG_FORMAT", "xml")]).unwrap_err();
        assert_eq!(err.variable, "LMS_LOG_FORMAT");
        assert_eq!(err.value, "xml");
    }
}
