//! File-based persistent backend.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::fs;
use tracing::{debug, warn};

use super::PersistenceBackend;
use crate::entry::CacheEntry;
use crate::error::{CacheError, CacheResult};
use crate::key::CacheKey;

const ENTRY_EXTENSION: &str = "entry";
const TEMP_EXTENSION: &str = "tmp";

/// Entry metadata stored in front of the body.
#[derive(Debug, Serialize, Deserialize)]
struct EntryMetadata {
    key: CacheKey,
    stored_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    validator_tag: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    expires_at: Option<DateTime<Utc>>,
    size: u64,
}

/// One file per key under a cache directory.
///
/// Each file holds a 4-byte big-endian metadata length, the JSON metadata and
/// the raw body. Writes go to a uniquely named temporary file that is then
/// renamed over the entry, so readers never observe a partial entry and
/// concurrent writers of the same key resolve to whichever rename ran last.
#[derive(Debug)]
pub struct FileBackend {
    dir: PathBuf,
    temp_counter: AtomicU64,
}

impl FileBackend {
    /// Create a backend storing entries in `dir`. The directory is created
    /// on first write.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            temp_counter: AtomicU64::new(0),
        }
    }

    /// Cache directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn entry_path(&self, key: &CacheKey) -> CacheResult<PathBuf> {
        let name = key.as_str();
        if name.is_empty() || name.contains(['/', '\\']) || name.starts_with('.') {
            return Err(CacheError::Storage(format!(
                "invalid cache key for file storage: {:?}",
                name
            )));
        }
        Ok(self.dir.join(format!("{}.{}", name, ENTRY_EXTENSION)))
    }

    fn temp_path(&self, key: &CacheKey) -> PathBuf {
        let n = self.temp_counter.fetch_add(1, Ordering::Relaxed);
        self.dir.join(format!(
            "{}.{}-{}.{}",
            key.as_str(),
            std::process::id(),
            n,
            TEMP_EXTENSION
        ))
    }

    async fn discard(&self, path: &Path) {
        if let Err(e) = fs::remove_file(path).await {
            if e.kind() != ErrorKind::NotFound {
                warn!(path = ?path, error = %e, "Failed to remove cache file");
            }
        }
    }

    async fn read_dir_paths(&self) -> CacheResult<Vec<PathBuf>> {
        let mut dir = match fs::read_dir(&self.dir).await {
            Ok(dir) => dir,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut paths = Vec::new();
        while let Some(item) = dir.next_entry().await? {
            paths.push(item.path());
        }
        Ok(paths)
    }
}

fn encode_entry(entry: &CacheEntry) -> CacheResult<Vec<u8>> {
    let metadata = EntryMetadata {
        key: entry.key.clone(),
        stored_at: entry.stored_at,
        validator_tag: entry.validator_tag.clone(),
        expires_at: entry.expires_at,
        size: entry.data.len() as u64,
    };
    let metadata = serde_json::to_vec(&metadata)?;
    let len = u32::try_from(metadata.len())
        .map_err(|_| CacheError::Serialization("entry metadata too large".to_string()))?;

    let mut bytes = Vec::with_capacity(4 + metadata.len() + entry.data.len());
    bytes.extend_from_slice(&len.to_be_bytes());
    bytes.extend_from_slice(&metadata);
    bytes.extend_from_slice(&entry.data);
    Ok(bytes)
}

fn decode_entry(bytes: Vec<u8>) -> CacheResult<CacheEntry> {
    let corrupt = |reason: &str| CacheError::Serialization(format!("corrupt cache file: {}", reason));

    let header: [u8; 4] = bytes
        .get(..4)
        .and_then(|h| h.try_into().ok())
        .ok_or_else(|| corrupt("missing header"))?;
    let metadata_end = 4 + u32::from_be_bytes(header) as usize;
    let metadata_bytes = bytes
        .get(4..metadata_end)
        .ok_or_else(|| corrupt("truncated metadata"))?;
    let metadata: EntryMetadata = serde_json::from_slice(metadata_bytes)?;

    let data = Bytes::from(bytes).slice(metadata_end..);
    if data.len() as u64 != metadata.size {
        return Err(corrupt("body size mismatch"));
    }

    Ok(CacheEntry {
        key: metadata.key,
        data,
        stored_at: metadata.stored_at,
        validator_tag: metadata.validator_tag,
        expires_at: metadata.expires_at,
    })
}

#[async_trait]
impl PersistenceBackend for FileBackend {
    async fn get(&self, key: &CacheKey) -> CacheResult<Option<CacheEntry>> {
        let path = self.entry_path(key)?;

        let bytes = match fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        match decode_entry(bytes) {
            Ok(entry) if entry.key == *key => Ok(Some(entry)),
            Ok(entry) => {
                warn!(path = ?path, stored_key = %entry.key, "Cache file holds a different key, discarding");
                self.discard(&path).await;
                Ok(None)
            }
            Err(e) => {
                warn!(path = ?path, error = %e, "Failed to parse cache file, discarding");
                self.discard(&path).await;
                Ok(None)
            }
        }
    }

    async fn put(&self, key: &CacheKey, entry: CacheEntry) -> CacheResult<()> {
        let path = self.entry_path(key)?;
        let bytes = encode_entry(&entry)?;

        fs::create_dir_all(&self.dir).await?;

        let temp_path = self.temp_path(key);
        if let Err(e) = fs::write(&temp_path, &bytes).await {
            warn!(path = ?temp_path, error = %e, "Failed to write cache file");
            self.discard(&temp_path).await;
            return Err(e.into());
        }

        if let Err(e) = fs::rename(&temp_path, &path).await {
            warn!(path = ?path, error = %e, "Failed to move cache file into place");
            self.discard(&temp_path).await;
            return Err(e.into());
        }

        debug!(key = %key, size = entry.data.len(), "Stored cache file");
        Ok(())
    }

    async fn remove(&self, key: &CacheKey) -> CacheResult<()> {
        let path = self.entry_path(key)?;
        match fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    async fn clear(&self) -> CacheResult<()> {
        for path in self.read_dir_paths().await? {
            let ours = path
                .extension()
                .is_some_and(|ext| ext == ENTRY_EXTENSION || ext == TEMP_EXTENSION);
            if ours {
                self.discard(&path).await;
            }
        }
        Ok(())
    }

    async fn keys(&self) -> CacheResult<Vec<CacheKey>> {
        let mut keys: Vec<CacheKey> = self
            .read_dir_paths()
            .await?
            .into_iter()
            .filter(|path| path.extension().is_some_and(|ext| ext == ENTRY_EXTENSION))
            .filter_map(|path| {
                path.file_stem()
                    .and_then(|stem| stem.to_str())
                    .map(CacheKey::new)
            })
            .collect();
        keys.sort();
        Ok(keys)
    }
}
