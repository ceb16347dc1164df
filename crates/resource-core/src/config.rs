//! Client configuration.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::locator::{Endpoint, Locator};

/// Errors raised while loading configuration or resolving locators.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(String),

    #[error("no base URL configured for endpoint '{0}'")]
    MissingEndpoint(Endpoint),

    #[error("invalid URL: {0}")]
    InvalidUrl(String),
}

/// Base URLs for each endpoint.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EndpointUrls {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub distribution: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub submission: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub verification: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_donation: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dcc: Option<String>,
}

impl EndpointUrls {
    /// Get the base URL for an endpoint.
    pub fn get(&self, endpoint: Endpoint) -> Option<&str> {
        let url = match endpoint {
            Endpoint::Distribution => &self.distribution,
            Endpoint::Submission => &self.submission,
            Endpoint::Verification => &self.verification,
            Endpoint::DataDonation => &self.data_donation,
            Endpoint::Dcc => &self.dcc,
        };
        url.as_deref()
    }

    /// Set the base URL for an endpoint.
    pub fn set(&mut self, endpoint: Endpoint, url: impl Into<String>) {
        let slot = match endpoint {
            Endpoint::Distribution => &mut self.distribution,
            Endpoint::Submission => &mut self.submission,
            Endpoint::Verification => &mut self.verification,
            Endpoint::DataDonation => &mut self.data_donation,
            Endpoint::Dcc => &mut self.dcc,
        };
        *slot = Some(url.into());
    }
}

/// Conditional-request contract used for cache revalidation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidatorConfig {
    /// Request header carrying the stored validator tag.
    #[serde(default = "default_request_header")]
    pub request_header: String,
    /// Response header carrying a fresh validator tag.
    #[serde(default = "default_response_header")]
    pub response_header: String,
    /// Status code meaning "not modified".
    #[serde(default = "default_not_modified_status")]
    pub not_modified_status: u16,
}

fn default_request_header() -> String {
    http::header::IF_NONE_MATCH.as_str().to_string()
}

fn default_response_header() -> String {
    http::header::ETAG.as_str().to_string()
}

fn default_not_modified_status() -> u16 {
    http::StatusCode::NOT_MODIFIED.as_u16()
}

impl Default for ValidatorConfig {
    fn default() -> Self {
        Self {
            request_header: default_request_header(),
            response_header: default_response_header(),
            not_modified_status: default_not_modified_status(),
        }
    }
}

/// Configuration shared by the resource client and its transport.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Base URL per endpoint.
    #[serde(default)]
    pub endpoints: EndpointUrls,
    /// Total request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// User agent sent with every request.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_agent: Option<String>,
    /// Revalidation header and status names.
    #[serde(default)]
    pub validation: ValidatorConfig,
}

fn default_timeout_secs() -> u64 {
    30
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            endpoints: EndpointUrls::default(),
            timeout_secs: default_timeout_secs(),
            user_agent: None,
            validation: ValidatorConfig::default(),
        }
    }
}

impl ClientConfig {
    /// Load config from a TOML or JSON file (chosen by extension).
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;

        if path.extension().is_some_and(|ext| ext == "json") {
            serde_json::from_str(&content).map_err(|e| ConfigError::Parse(e.to_string()))
        } else {
            Self::from_toml_str(&content)
        }
    }

    /// Parse config from TOML.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Set the base URL for an endpoint.
    pub fn with_endpoint(mut self, endpoint: Endpoint, url: impl Into<String>) -> Self {
        self.endpoints.set(endpoint, url);
        self
    }

    /// Set the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout_secs = timeout.as_secs();
        self
    }

    /// Get the request timeout.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Resolve a locator to an absolute URL.
    pub fn url_for(&self, locator: &Locator) -> Result<Url, ConfigError> {
        let base = self
            .endpoints
            .get(locator.endpoint())
            .ok_or(ConfigError::MissingEndpoint(locator.endpoint()))?;

        let mut url =
            Url::parse(base).map_err(|e| ConfigError::InvalidUrl(format!("{}: {}", base, e)))?;

        {
            let mut segments = url
                .path_segments_mut()
                .map_err(|_| ConfigError::InvalidUrl(format!("{} cannot be a base URL", base)))?;
            segments.pop_if_empty();
            segments.extend(locator.paths());
        }

        if !locator.query().is_empty() {
            url.query_pairs_mut().extend_pairs(locator.query());
        }

        Ok(url)
    }
}
