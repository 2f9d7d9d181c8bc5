//! Client configuration loaded from the environment.

use std::path::PathBuf;
use std::time::Duration;

use inventario_observability::LogFormat;

pub const DEFAULT_API_URL: &str = "http://localhost:8000";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Backend base URL, without a trailing slash.
    pub api_url: String,
    /// Where the bearer token survives between runs.
    pub token_path: PathBuf,
    pub timeout: Duration,
    pub log_format: LogFormat,
}

#[derive(Debug, thiserror::Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{var} is invalid: {reason}")]
    Invalid { var: &'static str, reason: String },
}

impl ClientConfig {
    /// Defaults for everything except the backend URL.
    pub fn new(api_url: impl Into<String>) -> Self {
        Self {
            api_url: normalize_url(&api_url.into()),
            token_path: default_token_path(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            log_format: LogFormat::default(),
        }
    }

    /// Load configuration from process environment variables.
    ///
    /// A `.env` file in the working directory is read first when present.
    ///
    /// - `INVENTARIO_API_URL` (default `http://localhost:8000`)
    /// - `INVENTARIO_TOKEN_PATH` (default `<config dir>/inventario/session.json`)
    /// - `INVENTARIO_TIMEOUT_SECS` (default 30)
    /// - `INVENTARIO_LOG_FORMAT` (`text` or `json`, default `text`)
    pub fn from_env() -> Result<Self, ConfigError> {
        if !cfg!(test) {
            let _ = dotenvy::dotenv();
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`ClientConfig::from_env`], reading values through `lookup`.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let api_url = match get("INVENTARIO_API_URL") {
            Some(url) => {
                if !(url.starts_with("http://") || url.starts_with("https://")) {
                    return Err(ConfigError::Invalid {
                        var: "INVENTARIO_API_URL",
                        reason: format!("'{url}' is not an http(s) URL"),
                    });
                }
                normalize_url(&url)
            }
            None => DEFAULT_API_URL.to_string(),
        };

        let token_path = get("INVENTARIO_TOKEN_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(default_token_path);

        let timeout = match get("INVENTARIO_TIMEOUT_SECS") {
            Some(raw) => match raw.parse::<u64>() {
                Ok(secs) if secs > 0 => Duration::from_secs(secs),
                _ => {
                    return Err(ConfigError::Invalid {
                        var: "INVENTARIO_TIMEOUT_SECS",
                        reason: format!("'{raw}' is not a positive number of seconds"),
                    });
                }
            },
            None => Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        };

        let log_format = match get("INVENTARIO_LOG_FORMAT") {
            Some(raw) => raw.parse::<LogFormat>().map_err(|reason| ConfigError::Invalid {
                var: "INVENTARIO_LOG_FORMAT",
                reason,
            })?,
            None => LogFormat::default(),
        };

        Ok(Self {
            api_url,
            token_path,
            timeout,
            log_format,
        })
    }
}

fn normalize_url(url: &str) -> String {
    url.trim().trim_end_matches('/').to_string()
}

fn default_token_path() -> PathBuf {
    dirs::config_dir()
        .map(|dir| dir.join("inventario").join("session.json"))
        .unwrap_or_else(|| PathBuf::from(".inventario-session.json"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_apply_when_nothing_is_set() {
        let config = ClientConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.api_url, DEFAULT_API_URL);
        assert_eq!(config.timeout, Duration::from_secs(30));
        assert_eq!(config.log_format, LogFormat::Text);
        assert!(config.token_path.ends_with("session.json"));
    }

    #[test]
    fn trailing_slash_is_trimmed() {
        let config = ClientConfig::from_lookup(lookup(&[("INVENTARIO_API_URL", "https://inv.example.com/api/")]))
            .unwrap();
        assert_eq!(config.api_url, "https://inv.example.com/api");
    }

    #[test]
    fn non_http_url_is_rejected() {
        let err = ClientConfig::from_lookup(lookup(&[("INVENTARIO_API_URL", "ftp://host")])).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { var: "INVENTARIO_API_URL", .. }));
    }

    #[test]
    fn explicit_values_override_defaults() {
        let config = ClientConfig::from_lookup(lookup(&[
            ("INVENTARIO_TOKEN_PATH", "/tmp/inv/token.json"),
            ("INVENTARIO_TIMEOUT_SECS", "5"),
            ("INVENTARIO_LOG_FORMAT", "json"),
        ]))
        .unwrap();
        assert_eq!(config.token_path, PathBuf::from("/tmp/inv/token.json"));
        assert_eq!(config.timeout, Duration::from_secs(5));
        assert_eq!(config.log_format, LogFormat::Json);
    }

    #[test]
    fn zero_or_garbage_timeout_is_rejected() {
        for raw in ["0", "soon"] {
            let err = ClientConfig::from_lookup(lookup(&[("INVENTARIO_TIMEOUT_SECS", raw)])).unwrap_err();
            assert!(matches!(err, ConfigError::Invalid { var: "INVENTARIO_TIMEOUT_SECS", .. }));
        }
    }

    #[test]
    fn blank_values_count_as_unset() {
        let config = ClientConfig::from_lookup(lookup(&[("INVENTARIO_API_URL", "   ")])).unwrap();
        assert_eq!(config.api_url, DEFAULT_API_URL);
    }
}
