//! Configuration management commands.

use std::collections::HashSet;
use std::fs;

use anyhow::{bail, Result};
use resource_core::Endpoint;

use super::{ConfigArgs, ConfigCommand};
use crate::config::{generate_default_config, CliConfig, BUILT_IN};
use crate::context::{Context, CONFIG_NAMES};

const ENDPOINTS: [Endpoint; 5] = [
    Endpoint::Distribution,
    Endpoint::Submission,
    Endpoint::Verification,
    Endpoint::DataDonation,
    Endpoint::Dcc,
];

/// Run the config command.
pub async fn run(args: ConfigArgs, ctx: &Context) -> Result<()> {
    match args.command {
        ConfigCommand::Show => show_config(ctx).await,
        ConfigCommand::Init { force } => init_config(force, ctx).await,
        ConfigCommand::Validate => validate_config(ctx).await,
    }
}

async fn show_config(ctx: &Context) -> Result<()> {
    if ctx.output.is_json() {
        ctx.output.json(&ctx.config);
        return Ok(());
    }

    ctx.output.header("Current Configuration");
    match &ctx.config_path {
        Some(path) => ctx.output.kv("file", &path.display().to_string()),
        None => ctx.output.kv("file", "(defaults)"),
    }
    ctx.output.kv("cache_dir", &ctx.cache_dir().display().to_string());

    let client = &ctx.config.client;
    ctx.output.info("");
    ctx.output.info("[client]");
    ctx.output.kv("timeout_secs", &client.timeout_secs.to_string());
    if let Some(ref user_agent) = client.user_agent {
        ctx.output.kv("user_agent", user_agent);
    }

    ctx.output.info("");
    ctx.output.info("[client.endpoints]");
    for endpoint in ENDPOINTS {
        if let Some(url) = client.endpoints.get(endpoint) {
            ctx.output.kv(endpoint.as_str(), url);
        }
    }

    ctx.output.info("");
    ctx.output.info("[client.validation]");
    ctx.output.kv("request_header", &client.validation.request_header);
    ctx.output.kv("response_header", &client.validation.response_header);
    ctx.output.kv(
        "not_modified_status",
        &client.validation.not_modified_status.to_string(),
    );

    ctx.output.info("");
    ctx.output.info("Resources:");
    for name in BUILT_IN {
        ctx.output.list_item(&format!("{} (built-in)", name));
    }
    for resource in &ctx.config.resources {
        ctx.output
            .list_item(&format!("{} {}", resource.name, resource.locator()));
    }

    Ok(())
}

async fn init_config(force: bool, ctx: &Context) -> Result<()> {
    let config_path = ctx.cwd.join(CONFIG_NAMES[0]);

    if config_path.exists() && !force {
        bail!(
            "Config file already exists: {}. Use --force to overwrite.",
            config_path.display()
        );
    }

    fs::write(&config_path, generate_default_config())?;

    ctx.output.success(&format!("Created: {}", config_path.display()));

    Ok(())
}

async fn validate_config(ctx: &Context) -> Result<()> {
    ctx.output.header("Validating configuration");

    let (errors, warnings) = check_config(&ctx.config);

    if errors.is_empty() && warnings.is_empty() {
        ctx.output.success("Configuration is valid");
        return Ok(());
    }

    for error in &errors {
        ctx.output.error(&format!("Error: {}", error));
    }

    for warning in &warnings {
        ctx.output.warn(&format!("Warning: {}", warning));
    }

    if !errors.is_empty() {
        bail!("Configuration has {} error(s)", errors.len());
    }

    ctx.output.success("Configuration is valid (with warnings)");

    Ok(())
}

/// Errors and warnings for `config`.
fn check_config(config: &CliConfig) -> (Vec<String>, Vec<String>) {
    let mut errors: Vec<String> = Vec::new();
    let mut warnings: Vec<String> = Vec::new();
    let client = &config.client;

    if client.timeout_secs == 0 {
        errors.push("client.timeout_secs must be greater than 0".to_string());
    }

    if client.endpoints.get(Endpoint::Distribution).is_none() {
        warnings.push(
            "client.endpoints.distribution is not set; built-in resources cannot be fetched"
                .to_string(),
        );
    }

    for endpoint in ENDPOINTS {
        if let Some(url) = client.endpoints.get(endpoint) {
            if !url.starts_with("https://") && !url.starts_with("http://") {
                errors.push(format!(
                    "client.endpoints.{} must be an http(s) URL",
                    endpoint.as_str()
                ));
            } else if url.starts_with("http://") {
                warnings.push(format!(
                    "client.endpoints.{} does not use https",
                    endpoint.as_str()
                ));
            }
        }
    }

    let validation = &client.validation;
    if validation.request_header.trim().is_empty() || validation.response_header.trim().is_empty()
    {
        errors.push("client.validation header names must not be empty".to_string());
    }
    if !(100..600).contains(&validation.not_modified_status) {
        errors.push(format!(
            "client.validation.not_modified_status {} is not an HTTP status",
            validation.not_modified_status
        ));
    } else if (200..300).contains(&validation.not_modified_status) {
        warnings.push(format!(
            "client.validation.not_modified_status {} is a success status",
            validation.not_modified_status
        ));
    }

    let mut seen = HashSet::new();
    for (i, resource) in config.resources.iter().enumerate() {
        if resource.name.is_empty() {
            errors.push(format!("resources[{}].name is required", i));
        } else if BUILT_IN.contains(&resource.name.as_str()) {
            errors.push(format!(
                "resources[{}].name '{}' shadows a built-in resource",
                i, resource.name
            ));
        } else if !seen.insert(resource.name.as_str()) {
            errors.push(format!(
                "resources[{}].name '{}' is defined more than once",
                i, resource.name
            ));
        }

        if resource.path.is_empty() {
            errors.push(format!("resources[{}].path must not be empty", i));
        }

        if let Err(e) = client.url_for(&resource.locator()) {
            errors.push(format!("resources[{}]: {}", i, e));
        }

        if let Some(cache) = &resource.cache {
            if cache.same_day && cache.max_age_secs.is_some() {
                warnings.push(format!(
                    "resources[{}].cache sets both same_day and max_age_secs; same_day wins",
                    i
                ));
            }
            if !cache.revalidate && !cache.same_day && cache.max_age_secs.is_none() {
                warnings.push(format!(
                    "resources[{}].cache is never fresh and never revalidated",
                    i
                ));
            }
        }
    }

    (errors, warnings)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(content: &str) -> CliConfig {
        toml::from_str(content).unwrap()
    }

    #[test]
    fn test_default_config_is_valid() {
        let (errors, warnings) = check_config(&parse(&generate_default_config()));
        assert!(errors.is_empty(), "{:?}", errors);
        assert!(warnings.is_empty(), "{:?}", warnings);
    }

    #[test]
    fn test_missing_endpoint_and_duplicates() {
        let config = parse(
            r#"
[client]
timeout_secs = 0

[[resources]]
name = "statistics"
endpoint = "submission"
path = ["x"]

[[resources]]
name = "keys"
endpoint = "distribution"
path = ["a"]

[[resources]]
name = "keys"
endpoint = "distribution"
path = []
"#,
        );

        let (errors, warnings) = check_config(&config);
        assert!(errors.iter().any(|e| e.contains("timeout_secs")));
        assert!(errors.iter().any(|e| e.contains("shadows a built-in")));
        assert!(errors.iter().any(|e| e.contains("more than once")));
        assert!(errors.iter().any(|e| e.contains("path must not be empty")));
        assert!(errors.iter().any(|e| e.contains("no base URL")));
        assert!(warnings.iter().any(|w| w.contains("distribution is not set")));
    }

    #[test]
    fn test_validation_contract_checks() {
        let config = parse(
            r#"
[client.endpoints]
distribution = "http://localhost:8080"

[client.validation]
not_modified_status = 204
"#,
        );

        let (errors, warnings) = check_config(&config);
        assert!(errors.is_empty(), "{:?}", errors);
        assert!(warnings.iter().any(|w| w.contains("does not use https")));
        assert!(warnings.iter().any(|w| w.contains("success status")));
    }
}
