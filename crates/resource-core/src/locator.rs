//! Resource locators.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Named server a locator is resolved against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Endpoint {
    /// CDN serving configuration, statistics and key packages.
    Distribution,
    /// Upload of diagnosis keys.
    Submission,
    /// Test result and registration token verification.
    Verification,
    /// Privacy-preserving analytics.
    DataDonation,
    /// Digital certificate services.
    Dcc,
}

impl Endpoint {
    /// Get the configuration name of this endpoint.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Distribution => "distribution",
            Self::Submission => "submission",
            Self::Verification => "verification",
            Self::DataDonation => "data_donation",
            Self::Dcc => "dcc",
        }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// HTTP methods.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Method {
    #[default]
    Get,
    Post,
    Put,
    Patch,
    Delete,
    Head,
}

impl Method {
    /// Convert to HTTP method string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Patch => "PATCH",
            Method::Delete => "DELETE",
            Method::Head => "HEAD",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<Method> for http::Method {
    fn from(method: Method) -> Self {
        match method {
            Method::Get => http::Method::GET,
            Method::Post => http::Method::POST,
            Method::Put => http::Method::PUT,
            Method::Patch => http::Method::PATCH,
            Method::Delete => http::Method::DELETE,
            Method::Head => http::Method::HEAD,
        }
    }
}

/// Endpoint identity of a server-backed resource.
///
/// A locator addresses the network and is the source of the resource's
/// cache key. Headers and query parameters are kept in ordered maps so two
/// locators built in a different order still compare (and hash) equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Locator {
    endpoint: Endpoint,
    paths: Vec<String>,
    #[serde(default)]
    method: Method,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    headers: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    query: BTreeMap<String, String>,
}

impl Locator {
    /// Create a GET locator for the given path segments.
    pub fn new<I, S>(endpoint: Endpoint, paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            endpoint,
            paths: paths.into_iter().map(Into::into).collect(),
            method: Method::Get,
            headers: BTreeMap::new(),
            query: BTreeMap::new(),
        }
    }

    /// Set the HTTP method.
    pub fn with_method(mut self, method: Method) -> Self {
        self.method = method;
        self
    }

    /// Add a required request header.
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    /// Add a query parameter.
    pub fn with_query(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.insert(name.into(), value.into());
        self
    }

    /// Application configuration.
    pub fn app_configuration() -> Self {
        Self::new(Endpoint::Distribution, ["version", "v1", "app_config_ios"])
    }

    /// Key figure statistics.
    pub fn statistics() -> Self {
        Self::new(Endpoint::Distribution, ["version", "v1", "stats"])
    }

    /// Diagnosis key package for one country and day.
    pub fn diagnosis_keys(country: &str, day: chrono::NaiveDate) -> Self {
        Self::new(
            Endpoint::Distribution,
            [
                "version".to_string(),
                "v1".to_string(),
                "diagnosis-keys".to_string(),
                "country".to_string(),
                country.to_string(),
                "date".to_string(),
                day.format("%Y-%m-%d").to_string(),
            ],
        )
    }

    pub fn endpoint(&self) -> Endpoint {
        self.endpoint
    }

    pub fn paths(&self) -> &[String] {
        &self.paths
    }

    pub fn method(&self) -> Method {
        self.method
    }

    pub fn headers(&self) -> &BTreeMap<String, String> {
        &self.headers
    }

    pub fn query(&self) -> &BTreeMap<String, String> {
        &self.query
    }

    /// Get the path relative to the endpoint base URL (e.g. `/version/v1/stats`).
    pub fn path(&self) -> String {
        format!("/{}", self.paths.join("/"))
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}:{}", self.method, self.endpoint, self.path())
    }
}
