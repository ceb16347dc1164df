//! CLI configuration.

use std::collections::BTreeMap;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use resource_cache::{CachePolicy, Freshness};
use resource_client::ServiceType;
use resource_core::{ClientConfig, Endpoint, Locator, Method};
use serde::{Deserialize, Serialize};

use crate::payload::PayloadFormat;

/// Name of the built-in app configuration resource.
pub const APP_CONFIG: &str = "app-config";
/// Name of the built-in statistics resource.
pub const STATISTICS: &str = "statistics";
/// Names that cannot be used for configured resources.
pub const BUILT_IN: [&str; 2] = [APP_CONFIG, STATISTICS];

/// CLI configuration file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CliConfig {
    /// Directory for the persistent cache, relative to the working directory.
    #[serde(default = "default_cache_dir")]
    pub cache_dir: String,

    /// Client configuration.
    #[serde(default)]
    pub client: ClientConfig,

    /// Named resource definitions.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub resources: Vec<ResourceDefinition>,
}

fn default_cache_dir() -> String {
    ".resource-cache".to_string()
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            cache_dir: default_cache_dir(),
            client: ClientConfig::default(),
            resources: Vec::new(),
        }
    }
}

impl CliConfig {
    /// Load config from a file.
    pub fn load(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path))?;

        if path.ends_with(".json") {
            serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse JSON config: {}", path))
        } else {
            toml::from_str(&content)
                .with_context(|| format!("Failed to parse TOML config: {}", path))
        }
    }

    /// Look up a configured resource by name.
    pub fn resource(&self, name: &str) -> Option<&ResourceDefinition> {
        self.resources.iter().find(|r| r.name == name)
    }

    /// Locator of a built-in or configured resource.
    pub fn locator_for(&self, name: &str) -> Result<Locator> {
        match name {
            APP_CONFIG => Ok(Locator::app_configuration()),
            STATISTICS => Ok(Locator::statistics()),
            _ => match self.resource(name) {
                Some(definition) => Ok(definition.locator()),
                None => bail!(
                    "Unknown resource '{}'. Known resources: {}",
                    name,
                    self.resource_names().join(", ")
                ),
            },
        }
    }

    /// Built-in names followed by configured names.
    pub fn resource_names(&self) -> Vec<String> {
        BUILT_IN
            .iter()
            .map(|name| name.to_string())
            .chain(self.resources.iter().map(|r| r.name.clone()))
            .collect()
    }
}

/// A resource declared in the config file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResourceDefinition {
    /// Name used on the command line.
    pub name: String,

    /// Endpoint the path is resolved against.
    pub endpoint: Endpoint,

    /// Path segments below the endpoint base URL.
    pub path: Vec<String>,

    /// HTTP method (default: GET).
    #[serde(default)]
    pub method: Method,

    /// Extra request headers.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub headers: BTreeMap<String, String>,

    /// Query parameters.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub query: BTreeMap<String, String>,

    /// JSON request body.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<serde_json::Value>,

    /// How the response body is interpreted.
    #[serde(default)]
    pub format: PayloadFormat,

    /// Cache settings; uncached when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cache: Option<CacheSettings>,
}

impl ResourceDefinition {
    pub fn locator(&self) -> Locator {
        let mut locator = Locator::new(self.endpoint, &self.path).with_method(self.method);
        for (name, value) in &self.headers {
            locator = locator.with_header(name, value);
        }
        for (name, value) in &self.query {
            locator = locator.with_query(name, value);
        }
        locator
    }

    pub fn service_type(&self) -> ServiceType {
        match &self.cache {
            Some(settings) => ServiceType::Caching(settings.policy()),
            None => ServiceType::Default,
        }
    }
}

/// Cache settings of a configured resource.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheSettings {
    /// Seconds an entry is served without asking the server.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_age_secs: Option<u64>,

    /// Serve entries until the end of the UTC day they were stored on.
    #[serde(default)]
    pub same_day: bool,

    /// Revalidate stale entries with their validator tag.
    #[serde(default = "default_true")]
    pub revalidate: bool,
}

fn default_true() -> bool {
    true
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            max_age_secs: None,
            same_day: false,
            revalidate: default_true(),
        }
    }
}

impl CacheSettings {
    pub fn policy(&self) -> CachePolicy {
        let freshness = if self.same_day {
            Freshness::SameDay
        } else {
            match self.max_age_secs {
                Some(secs) => Freshness::MaxAge(Duration::from_secs(secs)),
                None => Freshness::None,
            }
        };

        CachePolicy {
            freshness,
            revalidate: self.revalidate,
        }
    }
}

/// Generate a default resource.toml config file.
pub fn generate_default_config() -> String {
    r#"# Remote resource client configuration

cache_dir = ".resource-cache"

[client]
timeout_secs = 30
user_agent = "resource-cli"

[client.endpoints]
distribution = "https://svc90.main.px.t-online.de"
# submission = "https://submission.example.org"
# verification = "https://verification.example.org"

[client.validation]
request_header = "If-None-Match"
response_header = "ETag"
not_modified_status = 304

# Built-in resources: app-config, statistics

[[resources]]
name = "local-incidence"
endpoint = "distribution"
path = ["version", "v1", "local_stats_ios"]
format = "raw"

[resources.cache]
same_day = true
revalidate = true
"#
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(content: &str) -> CliConfig {
        toml::from_str(content).unwrap()
    }

    #[test]
    fn test_default_config_parses() {
        let config = parse(&generate_default_config());
        assert_eq!(config.cache_dir, ".resource-cache");
        assert_eq!(config.client.timeout_secs, 30);
        assert_eq!(
            config.client.endpoints.get(Endpoint::Distribution),
            Some("https://svc90.main.px.t-online.de")
        );

        let local = config.resource("local-incidence").unwrap();
        assert_eq!(local.format, PayloadFormat::Raw);
        assert_eq!(
            local.service_type(),
            ServiceType::Caching(CachePolicy::once_a_day())
        );
    }

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = parse("");
        assert_eq!(config.cache_dir, ".resource-cache");
        assert!(config.resources.is_empty());
        assert_eq!(config.client, ClientConfig::default());
    }

    #[test]
    fn test_resource_definition_locator() {
        let config = parse(
            r#"
[[resources]]
name = "submit"
endpoint = "submission"
path = ["version", "v1", "diagnosis-keys"]
method = "POST"
body = { keys = [] }

[resources.headers]
cwa-fake = "0"
"#,
        );

        let definition = config.resource("submit").unwrap();
        let locator = definition.locator();
        assert_eq!(locator.method(), Method::Post);
        assert_eq!(locator.path(), "/version/v1/diagnosis-keys");
        assert_eq!(locator.headers().get("cwa-fake").map(String::as_str), Some("0"));
        assert_eq!(definition.service_type(), ServiceType::Default);
        assert!(definition.body.is_some());
    }

    #[test]
    fn test_cache_settings_policy() {
        let max_age = CacheSettings {
            max_age_secs: Some(60),
            same_day: false,
            revalidate: false,
        };
        assert_eq!(
            max_age.policy(),
            CachePolicy::max_age(Duration::from_secs(60)).without_revalidation()
        );

        let default = CacheSettings::default();
        assert_eq!(default.policy(), CachePolicy::always_revalidate());

        // An empty `[resources.cache]` table means the same as `default()`.
        let parsed: CacheSettings = toml::from_str("").unwrap();
        assert_eq!(parsed.policy(), default.policy());
    }

    #[test]
    fn test_locator_for_builtins_and_unknown() {
        let config = CliConfig::default();
        assert_eq!(
            config.locator_for(APP_CONFIG).unwrap(),
            Locator::app_configuration()
        );
        assert_eq!(config.locator_for(STATISTICS).unwrap(), Locator::statistics());

        let err = config.locator_for("nope").unwrap_err();
        assert!(err.to_string().contains("app-config, statistics"));
    }

    #[test]
    fn test_load_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("resource.json");
        std::fs::write(
            &path,
            r#"{"cache_dir": "/tmp/cache", "client": {"timeout_secs": 5}}"#,
        )
        .unwrap();

        let config = CliConfig::load(path.to_str().unwrap()).unwrap();
        assert_eq!(config.cache_dir, "/tmp/cache");
        assert_eq!(config.client.timeout_secs, 5);
    }
}
