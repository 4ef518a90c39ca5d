//! Local cache of query responses.
//!
//! Responses are verified against their stored digest on read.
//!
//! # Cache Structure
//!
//! ```text
//! <cache_dir>/<schema>/<query>/
//!   response.json    # Query response
//!   metadata.json    # Cache metadata
//! ```

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::{debug, info, warn};

use crate::error::{BoardError, BoardResult};

use super::{validate_query_name, QueryResponse, RecordSource};

const RESPONSE_FILE: &str = "response.json";
const METADATA_FILE: &str = "metadata.json";

/// Cache metadata stored alongside the response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheMeta {
    pub query: String,

    /// When the response was fetched.
    pub fetched_at: DateTime<Utc>,

    /// Content digest (sha256:...).
    pub digest: String,

    /// Number of data rows.
    pub rows: usize,

    /// Source the response was fetched from.
    #[serde(default)]
    pub source: Option<String>,
}

#[derive(Debug, Clone)]
pub struct CacheEntry {
    pub response: QueryResponse,
    pub metadata: CacheMeta,
}

/// Query response cache for one schema.
#[derive(Debug, Clone)]
pub struct QueryCache {
    cache_dir: PathBuf,
}

pub fn compute_digest(content: &str) -> String {
    let mut h = Sha256::new();
    h.update(content.as_bytes());
    format!("sha256:{}", hex::encode(h.finalize()))
}

fn cache_err(action: &str, e: impl std::fmt::Display) -> BoardError {
    BoardError::Cache {
        message: format!("failed to {}: {}", action, e),
    }
}

fn write_atomic(path: &Path, content: &str) -> BoardResult<()> {
    let temp_path = path.with_extension("tmp");
    std::fs::write(&temp_path, content).map_err(|e| cache_err("write temp file", e))?;
    std::fs::rename(&temp_path, path).map_err(|e| cache_err("rename temp file", e))?;
    Ok(())
}

impl QueryCache {
    /// Cache rooted at `<root>/<schema>`.
    pub fn new(root: impl AsRef<Path>, schema: &str) -> BoardResult<Self> {
        validate_query_name(schema)?;
        Ok(Self::with_dir(root.as_ref().join(schema)))
    }

    pub fn with_dir(cache_dir: impl Into<PathBuf>) -> Self {
        Self {
            cache_dir: cache_dir.into(),
        }
    }

    pub fn cache_dir(&self) -> &Path {
        &self.cache_dir
    }

    fn query_dir(&self, query: &str) -> PathBuf {
        self.cache_dir.join(query)
    }

    /// Cached response for `query`, or `None` on a miss.
    ///
    /// Returns `Err` if the entry is unreadable or fails its digest check;
    /// the caller should evict and re-fetch.
    pub fn get(&self, query: &str) -> BoardResult<Option<CacheEntry>> {
        validate_query_name(query)?;
        let dir = self.query_dir(query);
        let response_path = dir.join(RESPONSE_FILE);
        let meta_path = dir.join(METADATA_FILE);

        if !response_path.exists() || !meta_path.exists() {
            debug!(query, "query not in cache");
            return Ok(None);
        }

        let meta_content =
            std::fs::read_to_string(&meta_path).map_err(|e| cache_err("read cache metadata", e))?;
        let metadata: CacheMeta = serde_json::from_str(&meta_content)
            .map_err(|e| cache_err("parse cache metadata", e))?;

        let content = std::fs::read_to_string(&response_path)
            .map_err(|e| cache_err("read cached response", e))?;
        let actual = compute_digest(&content);
        if actual != metadata.digest {
            warn!(
                query,
                expected = %metadata.digest,
                actual = %actual,
                "cache integrity check failed"
            );
            return Err(BoardError::Cache {
                message: format!(
                    "digest mismatch for cached query '{}': expected {}, got {}",
                    query, metadata.digest, actual
                ),
            });
        }

        let response: QueryResponse = serde_json::from_str(&content)
            .map_err(|e| cache_err("parse cached response", e))?;

        debug!(query, rows = response.data.len(), "cache hit");
        Ok(Some(CacheEntry { response, metadata }))
    }

    pub fn put(&self, query: &str, response: &QueryResponse, source: Option<&str>) -> BoardResult<()> {
        validate_query_name(query)?;
        let dir = self.query_dir(query);
        std::fs::create_dir_all(&dir).map_err(|e| cache_err("create cache directory", e))?;

        let content =
            serde_json::to_string(response).map_err(|e| cache_err("serialize response", e))?;
        let metadata = CacheMeta {
            query: query.to_string(),
            fetched_at: Utc::now(),
            digest: compute_digest(&content),
            rows: response.data.len(),
            source: source.map(String::from),
        };
        let meta_json =
            serde_json::to_string_pretty(&metadata).map_err(|e| cache_err("serialize metadata", e))?;

        write_atomic(&dir.join(RESPONSE_FILE), &content)?;
        write_atomic(&dir.join(METADATA_FILE), &meta_json)?;

        debug!(query, rows = metadata.rows, "cached query response");
        Ok(())
    }

    pub fn is_cached(&self, query: &str) -> bool {
        validate_query_name(query).is_ok()
            && self.query_dir(query).join(METADATA_FILE).exists()
            && self.query_dir(query).join(RESPONSE_FILE).exists()
    }

    pub fn evict(&self, query: &str) -> BoardResult<()> {
        validate_query_name(query)?;
        let dir = self.query_dir(query);
        if dir.exists() {
            std::fs::remove_dir_all(&dir).map_err(|e| cache_err("evict cache entry", e))?;
            debug!(query, "evicted query from cache");
        }
        Ok(())
    }

    pub fn clear(&self) -> BoardResult<()> {
        if self.cache_dir.exists() {
            std::fs::remove_dir_all(&self.cache_dir).map_err(|e| cache_err("clear cache", e))?;
        }
        Ok(())
    }

    /// Metadata of every readable entry, sorted by query name.
    pub fn list(&self) -> BoardResult<Vec<CacheMeta>> {
        if !self.cache_dir.exists() {
            return Ok(Vec::new());
        }
        let mut entries = Vec::new();
        let dir = std::fs::read_dir(&self.cache_dir).map_err(|e| cache_err("read cache directory", e))?;
        for entry in dir {
            let entry = entry.map_err(|e| cache_err("read cache directory", e))?;
            let meta_path = entry.path().join(METADATA_FILE);
            let Ok(content) = std::fs::read_to_string(&meta_path) else {
                continue;
            };
            match serde_json::from_str::<CacheMeta>(&content) {
                Ok(meta) => entries.push(meta),
                Err(e) => warn!(path = %meta_path.display(), error = %e, "skipping unreadable cache metadata"),
            }
        }
        entries.sort_by(|a, b| a.query.cmp(&b.query));
        Ok(entries)
    }
}

/// Serves responses from a [`QueryCache`] in front of another source.
///
/// With `use_cache` set, a cached response is returned when present; a miss
/// or a corrupt entry falls through to the inner source. Every live fetch
/// refreshes the cache.
#[derive(Debug, Clone)]
pub struct CachedSource<S> {
    inner: S,
    cache: QueryCache,
    use_cache: bool,
}

impl<S: RecordSource> CachedSource<S> {
    pub fn new(inner: S, cache: QueryCache, use_cache: bool) -> Self {
        Self {
            inner,
            cache,
            use_cache,
        }
    }

    pub fn cache(&self) -> &QueryCache {
        &self.cache
    }
}

impl<S: RecordSource> RecordSource for CachedSource<S> {
    fn describe(&self) -> String {
        format!("cached({}) -> {}", self.cache.cache_dir.display(), self.inner.describe())
    }

    fn fetch(&self, query: &str) -> BoardResult<QueryResponse> {
        if self.use_cache {
            match self.cache.get(query) {
                Ok(Some(entry)) => {
                    info!(
                        query,
                        fetched_at = %entry.metadata.fetched_at,
                        "using cached results"
                    );
                    return Ok(entry.response);
                }
                Ok(None) => info!(query, "no cached results"),
                Err(e) => {
                    warn!(query, error = %e, "discarding unusable cache entry");
                    self.cache.evict(query)?;
                }
            }
        }
        let response = self.inner.fetch(query)?;
        self.cache.put(query, &response, Some(&self.inner.describe()))?;
        Ok(response)
    }
}
