use std::{
    env,
    net::SocketAddr,
    num::NonZeroUsize,
    path::{Path, PathBuf},
    time::Duration,
};

use thiserror::Error;

#[cfg(test)]
use once_cell::sync::Lazy;
#[cfg(test)]
pub(crate) static ENV_MUTEX: Lazy<std::sync::Mutex<()>> = Lazy::new(|| std::sync::Mutex::new(()));

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    http_bind: SocketAddr,
    model_dir: PathBuf,
    max_tokens: NonZeroUsize,
    bookstore_base_url: String,
    max_reviews: NonZeroUsize,
    fetch_page_size: u32,
    fetch_timeout: Option<Duration>,
    otel_exporter_endpoint: Option<String>,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing environment variable: {0}")]
    Missing(&'static str),
    #[error("invalid value for {name}: {source}")]
    Invalid {
        name: &'static str,
        #[source]
        source: anyhow::Error,
    },
}

impl Config {
    /// Loads and validates the service configuration from environment variables.
    ///
    /// # Errors
    /// Returns a [`ConfigError`] when `SENTIMENT_MODEL_DIR` is unset or when a
    /// numeric or address value fails to parse.
    pub fn from_env() -> Result<Self, ConfigError> {
        let model_dir = PathBuf::from(env_var("SENTIMENT_MODEL_DIR")?);
        let http_bind = parse_socket_addr("SENTIMENT_HTTP_BIND", "0.0.0.0:8080")?;
        let max_tokens = parse_non_zero_usize("SENTIMENT_MAX_TOKENS", 128)?;
        let bookstore_base_url = env::var("SENTIMENT_BOOKSTORE_BASE_URL")
            .unwrap_or_else(|_| "https://www.rokomari.com/".to_string());
        let max_reviews = parse_non_zero_usize("SENTIMENT_MAX_REVIEWS", 50)?;
        let fetch_page_size = parse_u32("SENTIMENT_FETCH_PAGE_SIZE", 2000)?;

        // The review endpoint carries no timeout by default; an unset variable
        // means the request is allowed to run until the source answers.
        let fetch_timeout = parse_opt_duration_secs("SENTIMENT_FETCH_TIMEOUT_SECS")?;

        let otel_exporter_endpoint = env::var("OTEL_EXPORTER_OTLP_ENDPOINT").ok();

        Ok(Self {
            http_bind,
            model_dir,
            max_tokens,
            bookstore_base_url,
            max_reviews,
            fetch_page_size,
            fetch_timeout,
            otel_exporter_endpoint,
        })
    }

    #[must_use]
    pub fn http_bind(&self) -> SocketAddr {
        self.http_bind
    }

    #[must_use]
    pub fn model_dir(&self) -> &Path {
        &self.model_dir
    }

    #[must_use]
    pub fn max_tokens(&self) -> NonZeroUsize {
        self.max_tokens
    }

    #[must_use]
    pub fn bookstore_base_url(&self) -> &str {
        &self.bookstore_base_url
    }

    #[must_use]
    pub fn max_reviews(&self) -> NonZeroUsize {
        self.max_reviews
    }

    #[must_use]
    pub fn fetch_page_size(&self) -> u32 {
        self.fetch_page_size
    }

    #[must_use]
    pub fn fetch_timeout(&self) -> Option<Duration> {
        self.fetch_timeout
    }

    #[must_use]
    pub fn otel_exporter_endpoint(&self) -> Option<&str> {
        self.otel_exporter_endpoint.as_deref()
    }
}

fn env_var(name: &'static str) -> Result<String, ConfigError> {
    env::var(name).map_err(|_| ConfigError::Missing(name))
}

fn parse_socket_addr(name: &'static str, default: &str) -> Result<SocketAddr, ConfigError> {
    let raw = env::var(name).unwrap_or_else(|_| default.to_string());

    raw.parse().map_err(|error| ConfigError::Invalid {
        name,
        source: anyhow::Error::new(error),
    })
}

fn parse_non_zero_usize(name: &'static str, default: usize) -> Result<NonZeroUsize, ConfigError> {
    let raw = env::var(name).unwrap_or_else(|_| default.to_string());
    let parsed = raw.parse::<usize>().map_err(|error| ConfigError::Invalid {
        name,
        source: anyhow::Error::new(error),
    })?;
    NonZeroUsize::new(parsed).ok_or_else(|| ConfigError::Invalid {
        name,
        source: anyhow::anyhow!("must be greater than zero"),
    })
}

fn parse_u32(name: &'static str, default: u32) -> Result<u32, ConfigError> {
    let raw = env::var(name).unwrap_or_else(|_| default.to_string());
    raw.parse::<u32>().map_err(|error| ConfigError::Invalid {
        name,
        source: anyhow::Error::new(error),
    })
}

fn parse_opt_duration_secs(name: &'static str) -> Result<Option<Duration>, ConfigError> {
    match env::var(name) {
        Err(_) => Ok(None),
        Ok(raw) => raw
            .parse::<u64>()
            .map(|secs| Some(Duration::from_secs(secs)))
            .map_err(|error| ConfigError::Invalid {
                name,
                source: anyhow::Error::new(error),
            }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set_env(name: &str, value: &str) {
        // SAFETY: tests run sequentially and assign valid UTF-8 values.
        unsafe {
            env::set_var(name, value);
        }
    }

    fn remove_env(name: &str) {
        // SAFETY: tests run sequentially and clean up deterministic keys.
        unsafe {
            env::remove_var(name);
        }
    }

    fn reset_env() {
        remove_env("SENTIMENT_MODEL_DIR");
        remove_env("SENTIMENT_HTTP_BIND");
        remove_env("SENTIMENT_MAX_TOKENS");
        remove_env("SENTIMENT_BOOKSTORE_BASE_URL");
        remove_env("SENTIMENT_MAX_REVIEWS");
        remove_env("SENTIMENT_FETCH_PAGE_SIZE");
        remove_env("SENTIMENT_FETCH_TIMEOUT_SECS");
        remove_env("OTEL_EXPORTER_OTLP_ENDPOINT");
    }

    #[test]
    fn from_env_uses_defaults_when_optional_missing() {
        let _lock = ENV_MUTEX.lock().expect("env mutex");
        reset_env();
        set_env("SENTIMENT_MODEL_DIR", "/srv/models/bangla-sentiment");

        let config = Config::from_env().expect("config should load");

        assert_eq!(
            config.model_dir(),
            Path::new("/srv/models/bangla-sentiment")
        );
        assert_eq!(config.http_bind(), "0.0.0.0:8080".parse().unwrap());
        assert_eq!(config.max_tokens().get(), 128);
        assert_eq!(config.bookstore_base_url(), "https://www.rokomari.com/");
        assert_eq!(config.max_reviews().get(), 50);
        assert_eq!(config.fetch_page_size(), 2000);
        assert!(config.fetch_timeout().is_none());
        assert!(config.otel_exporter_endpoint().is_none());
    }

    #[test]
    fn from_env_overrides_values() {
        let _lock = ENV_MUTEX.lock().expect("env mutex");
        reset_env();
        set_env("SENTIMENT_MODEL_DIR", "/opt/model");
        set_env("SENTIMENT_HTTP_BIND", "127.0.0.1:9100");
        set_env("SENTIMENT_MAX_TOKENS", "256");
        set_env("SENTIMENT_BOOKSTORE_BASE_URL", "http://localhost:8099/");
        set_env("SENTIMENT_MAX_REVIEWS", "10");
        set_env("SENTIMENT_FETCH_PAGE_SIZE", "500");
        set_env("SENTIMENT_FETCH_TIMEOUT_SECS", "30");
        set_env("OTEL_EXPORTER_OTLP_ENDPOINT", "http://otel:4317");

        let config = Config::from_env().expect("config should load");

        assert_eq!(config.model_dir(), Path::new("/opt/model"));
        assert_eq!(config.http_bind(), "127.0.0.1:9100".parse().unwrap());
        assert_eq!(config.max_tokens().get(), 256);
        assert_eq!(config.bookstore_base_url(), "http://localhost:8099/");
        assert_eq!(config.max_reviews().get(), 10);
        assert_eq!(config.fetch_page_size(), 500);
        assert_eq!(config.fetch_timeout(), Some(Duration::from_secs(30)));
        assert_eq!(config.otel_exporter_endpoint(), Some("http://otel:4317"));
    }

    #[test]
    fn from_env_errors_when_model_dir_missing() {
        let _lock = ENV_MUTEX.lock().expect("env mutex");
        reset_env();

        let error = Config::from_env().expect_err("missing model dir should fail");

        assert!(matches!(error, ConfigError::Missing("SENTIMENT_MODEL_DIR")));
    }

    #[test]
    fn from_env_rejects_zero_review_cap() {
        let _lock = ENV_MUTEX.lock().expect("env mutex");
        reset_env();
        set_env("SENTIMENT_MODEL_DIR", "/opt/model");
        set_env("SENTIMENT_MAX_REVIEWS", "0");

        let error = Config::from_env().expect_err("zero cap should fail");

        assert!(matches!(
            error,
            ConfigError::Invalid {
                name: "SENTIMENT_MAX_REVIEWS",
                ..
            }
        ));
    }

    #[test]
    fn from_env_rejects_unparseable_timeout() {
        let _lock = ENV_MUTEX.lock().expect("env mutex");
        reset_env();
        set_env("SENTIMENT_MODEL_DIR", "/opt/model");
        set_env("SENTIMENT_FETCH_TIMEOUT_SECS", "soon");

        let error = Config::from_env().expect_err("unparseable timeout should fail");

        assert!(matches!(
            error,
            ConfigError::Invalid {
                name: "SENTIMENT_FETCH_TIMEOUT_SECS",
                ..
            }
        ));
    }
}
