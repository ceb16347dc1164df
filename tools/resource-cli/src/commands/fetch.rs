//! Fetch command.

use std::collections::BTreeMap;
use std::fs;

use anyhow::{anyhow, Context as _, Result};
use chrono::{DateTime, Utc};
use resource_client::{FetchStatus, Fetched, Resource};
use resource_codec::messages::{ApplicationConfiguration, Statistics};
use resource_codec::Decoded;
use serde::Serialize;

use super::FetchArgs;
use crate::config::{APP_CONFIG, STATISTICS};
use crate::context::Context;
use crate::output::{format_bytes, format_elapsed, status_badge};
use crate::payload::{Payload, PayloadReceiveResource, RequestBody};

/// Outcome of a fetch, as printed.
#[derive(Debug, Serialize)]
struct FetchReport {
    name: String,
    status: String,
    elapsed_ms: u64,
    size: usize,
    summary: BTreeMap<String, String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    payload: Option<serde_json::Value>,
    #[serde(skip)]
    body: Vec<u8>,
    #[serde(skip)]
    pretty: String,
}

impl FetchReport {
    fn new<T>(name: &str, fetched: &Fetched<T>, body: Vec<u8>) -> Self {
        Self {
            name: name.to_string(),
            status: fetched.status.to_string(),
            elapsed_ms: fetched.elapsed.as_millis() as u64,
            size: body.len(),
            summary: BTreeMap::new(),
            payload: None,
            body,
            pretty: String::new(),
        }
    }

    fn with(mut self, key: &str, value: impl ToString) -> Self {
        self.summary.insert(key.to_string(), value.to_string());
        self
    }
}

/// Run the fetch command.
pub async fn run(args: FetchArgs, ctx: &Context) -> Result<()> {
    let client = ctx.client()?;
    let name = args.name.as_str();

    let (report, status) = match name {
        APP_CONFIG => {
            let fetched = client
                .fetch_with_status(&Resource::app_configuration().keeping_bytes())
                .await
                .with_context(|| format!("Failed to fetch {}", name))?;
            (app_config_report(name, &fetched), fetched.status)
        }
        STATISTICS => {
            let fetched = client
                .fetch_with_status(&Resource::statistics().keeping_bytes())
                .await
                .with_context(|| format!("Failed to fetch {}", name))?;
            (statistics_report(name, &fetched), fetched.status)
        }
        _ => {
            let definition = ctx.config.resource(name).ok_or_else(|| {
                anyhow!(
                    "Unknown resource '{}'. Known resources: {}",
                    name,
                    ctx.config.resource_names().join(", ")
                )
            })?;
            let resource = Resource::new(
                definition.locator(),
                definition.service_type(),
                RequestBody::new(definition.body.clone()),
                PayloadReceiveResource::new(definition.format),
            );
            let fetched = client
                .fetch_with_status(&resource)
                .await
                .with_context(|| format!("Failed to fetch {}", name))?;
            (payload_report(name, &fetched), fetched.status)
        }
    };

    if let Some(path) = &args.output {
        let path = ctx.resolve_path(path);
        fs::write(&path, &report.body)
            .with_context(|| format!("Failed to write payload to {}", path.display()))?;
        ctx.output.debug(&format!("Wrote payload to {}", path.display()));
    }

    print_report(&report, status, args.body, ctx);
    Ok(())
}

fn print_report(report: &FetchReport, status: FetchStatus, body: bool, ctx: &Context) {
    if ctx.output.is_json() {
        ctx.output.json(report);
        return;
    }

    ctx.output.header(&report.name);
    ctx.output.kv("status", &status_badge(status));
    ctx.output.kv(
        "elapsed",
        &format_elapsed(std::time::Duration::from_millis(report.elapsed_ms)),
    );
    ctx.output.kv("size", &format_bytes(report.size as u64));
    for (key, value) in &report.summary {
        ctx.output.kv(key, value);
    }

    if body && !report.pretty.is_empty() {
        println!();
        println!("{}", report.pretty);
    }
}

fn app_config_report(
    name: &str,
    fetched: &Fetched<Decoded<ApplicationConfiguration>>,
) -> FetchReport {
    let config = &fetched.value.value;
    let mut report = FetchReport::new(name, fetched, fetched.value.bytes.to_vec())
        .with("supported_countries", config.supported_countries.join(", "))
        .with(
            "features",
            config
                .app_features
                .as_ref()
                .map(|f| f.app_features.len())
                .unwrap_or(0),
        );
    if let Some(version) = &config.min_version {
        report = report.with("min_version", version);
    }
    if let Some(version) = &config.latest_version {
        report = report.with("latest_version", version);
    }
    report.pretty = format!("{:#?}", config);
    report
}

fn statistics_report(name: &str, fetched: &Fetched<Decoded<Statistics>>) -> FetchReport {
    let stats = &fetched.value.value;
    let updated_at = stats
        .key_figure_cards
        .iter()
        .filter_map(|card| card.header.as_ref())
        .map(|header| header.updated_at)
        .max()
        .and_then(|secs| DateTime::<Utc>::from_timestamp(secs, 0));

    let mut report = FetchReport::new(name, fetched, fetched.value.bytes.to_vec())
        .with("cards", stats.key_figure_cards.len())
        .with(
            "card_sequence",
            stats
                .card_id_sequence
                .iter()
                .map(|id| id.to_string())
                .collect::<Vec<_>>()
                .join(", "),
        );
    if let Some(updated_at) = updated_at {
        report = report.with("updated_at", updated_at.to_rfc3339());
    }
    report.pretty = format!("{:#?}", stats);
    report
}

fn payload_report(name: &str, fetched: &Fetched<Payload>) -> FetchReport {
    match &fetched.value {
        Payload::Json(value) => {
            let body = serde_json::to_vec(value).unwrap_or_default();
            let mut report = FetchReport::new(name, fetched, body).with("format", "json");
            report.pretty = serde_json::to_string_pretty(value).unwrap_or_default();
            report.payload = Some(value.clone());
            report
        }
        Payload::Raw(bytes) => {
            FetchReport::new(name, fetched, bytes.to_vec()).with("format", "raw")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;
    use prost::Message;
    use resource_codec::messages::{CardHeader, KeyFigureCard, SemanticVersion};
    use std::time::Duration;

    fn fetched<T>(value: T) -> Fetched<T> {
        Fetched {
            value,
            status: FetchStatus::Hit,
            elapsed: Duration::from_millis(12),
        }
    }

    fn decoded<M: Message>(value: M) -> Fetched<Decoded<M>> {
        fetched(Decoded {
            bytes: Bytes::from(value.encode_to_vec()),
            value,
        })
    }

    #[test]
    fn test_app_config_report() {
        let config = ApplicationConfiguration {
            min_version: Some(SemanticVersion {
                major: 1,
                minor: 2,
                patch: 3,
            }),
            latest_version: None,
            supported_countries: vec!["DE".to_string(), "IT".to_string()],
            app_features: None,
        };
        let report = app_config_report(APP_CONFIG, &decoded(config));

        assert_eq!(report.status, "HIT");
        assert_eq!(report.elapsed_ms, 12);
        assert_eq!(report.summary["min_version"], "1.2.3");
        assert_eq!(report.summary["supported_countries"], "DE, IT");
        assert_eq!(report.summary["features"], "0");
        assert!(!report.summary.contains_key("latest_version"));
    }

    #[test]
    fn test_statistics_report_uses_latest_update() {
        let card = |id, updated_at| KeyFigureCard {
            header: Some(CardHeader {
                card_id: id,
                updated_at,
            }),
            key_figures: Vec::new(),
        };
        let stats = Statistics {
            card_id_sequence: vec![1, 2],
            key_figure_cards: vec![card(1, 1_622_505_600), card(2, 1_622_592_000)],
        };
        let report = statistics_report(STATISTICS, &decoded(stats));

        assert_eq!(report.summary["cards"], "2");
        assert_eq!(report.summary["card_sequence"], "1, 2");
        assert_eq!(report.summary["updated_at"], "2021-06-02T00:00:00+00:00");
    }

    #[test]
    fn test_report_keeps_server_bytes() {
        let config = ApplicationConfiguration {
            supported_countries: vec!["DE".to_string()],
            ..Default::default()
        };
        let mut body = config.encode_to_vec();
        // Field 9, varint 1: unknown to this client.
        body.extend_from_slice(&[0x48, 0x01]);
        let value = ApplicationConfiguration::decode(body.as_slice()).unwrap();
        assert_eq!(value, config);

        let report = app_config_report(
            APP_CONFIG,
            &fetched(Decoded {
                bytes: Bytes::from(body.clone()),
                value,
            }),
        );
        assert_eq!(report.body, body);
        assert_eq!(report.size, body.len());
    }

    #[test]
    fn test_payload_report() {
        let json = payload_report(
            "custom",
            &fetched(Payload::Json(serde_json::json!({ "ok": true }))),
        );
        assert_eq!(json.summary["format"], "json");
        assert_eq!(json.payload, Some(serde_json::json!({ "ok": true })));

        let raw = payload_report(
            "custom",
            &fetched(Payload::Raw(Bytes::from_static(b"abc"))),
        );
        assert_eq!(raw.size, 3);
        assert!(raw.payload.is_none());
        assert!(raw.pretty.is_empty());
    }
}
