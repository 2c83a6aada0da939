use std::env;
use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use reqwest::Url;

use crate::error::{CatalogueError, CatalogueResult};

pub const ENV_ENDPOINT: &str = "SERVICE_CATALOGUE_API_ENDPOINT";
pub const ENV_API_KEY: &str = "SERVICE_CATALOGUE_API_KEY";
pub const ENV_FILTER: &str = "SC_FILTER";
pub const ENV_TIMEOUT: &str = "SERVICE_CATALOGUE_TIMEOUT_SECONDS";

/// Request timeout used when none is configured.
pub const DEFAULT_TIMEOUT_SECONDS: u64 = 10;

/// Connection settings for the Service Catalogue.
///
/// `base_url`, `api_key` and `timeout` are required; `filter` is an optional
/// query fragment (e.g. `&filters[name][$contains]=example`) appended to the
/// preset component query.
#[derive(Clone)]
pub struct ClientConfig {
    pub base_url: String,
    pub api_key: String,
    pub filter: String,
    pub timeout: Duration,
}

impl std::fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientConfig")
            .field("base_url", &self.base_url)
            .field("api_key", &"<redacted>")
            .field("filter", &self.filter)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            api_key: api_key.into(),
            filter: String::new(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECONDS),
        }
    }

    pub fn with_filter(mut self, filter: impl Into<String>) -> Self {
        self.filter = filter.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Read the configuration from the process environment.
    ///
    /// `SERVICE_CATALOGUE_API_ENDPOINT` and `SERVICE_CATALOGUE_API_KEY` are
    /// required, `SC_FILTER` and `SERVICE_CATALOGUE_TIMEOUT_SECONDS` are not.
    pub fn from_env() -> CatalogueResult<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build the configuration from any key/value source using the
    /// environment variable names.
    pub fn from_lookup<F>(lookup: F) -> CatalogueResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let base_url = lookup(ENV_ENDPOINT)
            .ok_or_else(|| CatalogueError::config(format!("{} is required", ENV_ENDPOINT)))?;

        let api_key = lookup(ENV_API_KEY)
            .ok_or_else(|| CatalogueError::config(format!("{} is required", ENV_API_KEY)))?;

        let filter = lookup(ENV_FILTER).unwrap_or_default();

        let timeout = match lookup(ENV_TIMEOUT) {
            Some(raw) => raw.trim().parse::<u64>().map_err(|_| {
                CatalogueError::config(format!("{} must be a valid number", ENV_TIMEOUT))
            })?,
            None => DEFAULT_TIMEOUT_SECONDS,
        };

        let config = Self::new(base_url, api_key)
            .with_filter(filter)
            .with_timeout(Duration::from_secs(timeout));
        config.validate()?;
        Ok(config)
    }

    /// Reject configurations the client could never use.
    pub fn validate(&self) -> CatalogueResult<()> {
        if self.base_url.trim().is_empty() {
            return Err(CatalogueError::config("base URL must not be empty"));
        }

        let url = Url::parse(&self.base_url)
            .map_err(|err| CatalogueError::config(format!("invalid base URL: {}", err)))?;
        if url.scheme() != "http" && url.scheme() != "https" {
            return Err(CatalogueError::config(format!(
                "unsupported URL scheme: {}",
                url.scheme()
            )));
        }

        if self.api_key.trim().is_empty() {
            return Err(CatalogueError::config("API key must not be empty"));
        }

        if self.timeout.is_zero() {
            return Err(CatalogueError::config("timeout must be greater than zero"));
        }

        Ok(())
    }

    /// Base URL without a trailing slash.
    pub fn trimmed_base_url(&self) -> &str {
        self.base_url.trim_end_matches('/')
    }

    /// Headers attached to every request: bearer auth plus JSON content type.
    pub fn api_headers(&self) -> CatalogueResult<HeaderMap> {
        let mut auth = HeaderValue::from_str(&format!("Bearer {}", self.api_key))
            .map_err(|_| CatalogueError::config("API key contains invalid header characters"))?;
        auth.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, auth);
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        Ok(headers)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid() -> ClientConfig {
        ClientConfig::new("https://sc.example.com", "secret-key")
    }

    #[test]
    fn new_applies_defaults() {
        let config = valid();
        assert_eq!(config.filter, "");
        assert_eq!(config.timeout, Duration::from_secs(10));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn validate_rejects_empty_base_url() {
        let config = ClientConfig::new("", "secret-key");
        assert!(matches!(config.validate(), Err(CatalogueError::Config { .. })));
    }

    #[test]
    fn validate_rejects_non_http_scheme() {
        let config = ClientConfig::new("ftp://sc.example.com", "secret-key");
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_empty_key() {
        let config = ClientConfig::new("https://sc.example.com", "  ");
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_zero_timeout() {
        let config = valid().with_timeout(Duration::ZERO);
        assert!(config.validate().is_err());
    }

    #[test]
    fn api_headers_carry_bearer_token() {
        let headers = valid().api_headers().unwrap();
        assert_eq!(headers.get(AUTHORIZATION).unwrap(), "Bearer secret-key");
        assert_eq!(headers.get(ACCEPT).unwrap(), "application/json");
        assert_eq!(headers.get(CONTENT_TYPE).unwrap(), "application/json");
    }

    #[test]
    fn api_headers_reject_newlines_in_key() {
        let config = ClientConfig::new("https://sc.example.com", "bad\nkey");
        assert!(config.api_headers().is_err());
    }

    fn lookup<'a>(pairs: &'a [(&'a str, &'a str)]) -> impl Fn(&str) -> Option<String> + 'a {
        move |key: &str| {
            pairs
                .iter()
                .find(|(name, _)| *name == key)
                .map(|(_, value)| value.to_string())
        }
    }

    #[test]
    fn from_lookup_reads_required_and_optional_values() {
        let config = ClientConfig::from_lookup(lookup(&[
            (ENV_ENDPOINT, "https://sc.example.com"),
            (ENV_API_KEY, "k"),
            (ENV_FILTER, "&filters[name][$contains]=api"),
            (ENV_TIMEOUT, "30"),
        ]))
        .unwrap();

        assert_eq!(config.base_url, "https://sc.example.com");
        assert_eq!(config.filter, "&filters[name][$contains]=api");
        assert_eq!(config.timeout, Duration::from_secs(30));
    }

    #[test]
    fn from_lookup_requires_endpoint_and_key() {
        let missing_key = ClientConfig::from_lookup(lookup(&[(ENV_ENDPOINT, "https://sc.example.com")]));
        assert!(matches!(missing_key, Err(CatalogueError::Config { .. })));

        let missing_url = ClientConfig::from_lookup(lookup(&[(ENV_API_KEY, "k")]));
        assert!(missing_url.is_err());
    }

    #[test]
    fn from_lookup_rejects_bad_timeout() {
        let result = ClientConfig::from_lookup(lookup(&[
            (ENV_ENDPOINT, "https://sc.example.com"),
            (ENV_API_KEY, "k"),
            (ENV_TIMEOUT, "soon"),
        ]));
        assert!(result.is_err());
    }

    #[test]
    fn trimmed_base_url_drops_trailing_slash() {
        let config = ClientConfig::new("https://sc.example.com/", "k");
        assert_eq!(config.trimmed_base_url(), "https://sc.example.com");
    }

    #[test]
    fn debug_output_redacts_key() {
        let rendered = format!("{:?}", valid());
        assert!(!rendered.contains("secret-key"));
    }
}
