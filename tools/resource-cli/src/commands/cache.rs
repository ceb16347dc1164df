//! Cache inspection commands.

use anyhow::{Context as _, Result};
use chrono::Utc;
use resource_cache::{Cache, CacheEntry, CacheKey, FileBackend};
use serde::Serialize;

use super::{CacheArgs, CacheCommand};
use crate::context::Context;
use crate::output::{format_age, format_bytes};

/// Cached entry metadata, as printed.
#[derive(Debug, Serialize)]
struct EntryInfo {
    name: String,
    key: String,
    cached: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    size: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    stored_at: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    expires_at: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    validator_tag: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    age_secs: Option<i64>,
}

impl EntryInfo {
    fn new(name: &str, key: &CacheKey, entry: Option<&CacheEntry>) -> Self {
        let now = Utc::now();
        Self {
            name: name.to_string(),
            key: key.to_string(),
            cached: entry.is_some(),
            size: entry.map(CacheEntry::size),
            stored_at: entry.map(|e| e.stored_at.to_rfc3339()),
            expires_at: entry.and_then(|e| e.expires_at).map(|t| t.to_rfc3339()),
            validator_tag: entry.and_then(|e| e.validator_tag.clone()),
            age_secs: entry.map(|e| e.age(now).num_seconds()),
        }
    }
}

/// Run the cache command.
pub async fn run(args: CacheArgs, ctx: &Context) -> Result<()> {
    let cache = ctx.cache();
    match args.command {
        CacheCommand::List => list_entries(&cache, ctx).await,
        CacheCommand::Show { name } => show_entry(&name, &cache, ctx).await,
        CacheCommand::Invalidate { name } => invalidate_entry(&name, &cache, ctx).await,
        CacheCommand::Clear => clear_cache(&cache, ctx).await,
    }
}

async fn lookup(name: &str, cache: &Cache<FileBackend>, ctx: &Context) -> Result<EntryInfo> {
    let key = CacheKey::from_locator(&ctx.config.locator_for(name)?);
    let entry = cache
        .get(&key)
        .await
        .with_context(|| format!("Failed to read cache entry for {}", name))?;
    Ok(EntryInfo::new(name, &key, entry.as_ref()))
}

async fn list_entries(cache: &Cache<FileBackend>, ctx: &Context) -> Result<()> {
    let mut infos = Vec::new();
    for name in ctx.config.resource_names() {
        infos.push(lookup(&name, cache, ctx).await?);
    }

    let stored = cache.keys().await.context("Failed to list cache entries")?;
    let unknown = stored
        .iter()
        .filter(|key| !infos.iter().any(|info| info.key == key.as_str()))
        .count();

    if ctx.output.is_json() {
        ctx.output.json(&infos);
        return Ok(());
    }

    ctx.output.header(&format!("Cache at {}", ctx.cache_dir().display()));
    let widths = [20, 8, 10, 12];
    ctx.output.table_row(&["NAME", "CACHED", "SIZE", "AGE"], &widths);
    for info in &infos {
        let size = info.size.map(|s| format_bytes(s as u64)).unwrap_or_default();
        let age = info.age_secs.map(format_age).unwrap_or_default();
        let cached = if info.cached { "yes" } else { "no" };
        ctx.output.table_row(
            &[info.name.as_str(), cached, size.as_str(), age.as_str()],
            &widths,
        );
    }

    if unknown > 0 {
        ctx.output.info(&format!(
            "{} entr{} not matching a known resource",
            unknown,
            if unknown == 1 { "y" } else { "ies" }
        ));
    }

    Ok(())
}

async fn show_entry(name: &str, cache: &Cache<FileBackend>, ctx: &Context) -> Result<()> {
    let info = lookup(name, cache, ctx).await?;

    if ctx.output.is_json() {
        ctx.output.json(&info);
        return Ok(());
    }

    ctx.output.header(name);
    ctx.output.kv("key", &info.key);
    if !info.cached {
        ctx.output.info("Not cached");
        return Ok(());
    }

    if let Some(size) = info.size {
        ctx.output.kv("size", &format_bytes(size as u64));
    }
    if let Some(stored_at) = &info.stored_at {
        ctx.output.kv("stored_at", stored_at);
    }
    if let Some(age) = info.age_secs {
        ctx.output.kv("age", &format_age(age));
    }
    ctx.output.kv(
        "expires_at",
        info.expires_at.as_deref().unwrap_or("stale"),
    );
    ctx.output.kv(
        "validator_tag",
        info.validator_tag.as_deref().unwrap_or("none"),
    );

    Ok(())
}

async fn invalidate_entry(name: &str, cache: &Cache<FileBackend>, ctx: &Context) -> Result<()> {
    let key = CacheKey::from_locator(&ctx.config.locator_for(name)?);
    cache
        .invalidate(&key)
        .await
        .with_context(|| format!("Failed to invalidate {}", name))?;

    ctx.output.success(&format!("Invalidated {}", name));
    Ok(())
}

async fn clear_cache(cache: &Cache<FileBackend>, ctx: &Context) -> Result<()> {
    let count = cache.keys().await.context("Failed to list cache entries")?.len();
    cache.clear().await.context("Failed to clear cache")?;

    ctx.output.success(&format!(
        "Cleared {} entr{} from {}",
        count,
        if count == 1 { "y" } else { "ies" },
        ctx.cache_dir().display()
    ));
    Ok(())
}
