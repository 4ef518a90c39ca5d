//! Record sources.
//!
//! A source answers a named query with a columnar response
//! (`{"header": [...], "data": [[...], ...]}`). The engine does not care
//! whether the response came from disk, a cache or a live service.

pub mod cache;

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{BoardError, BoardResult};
use crate::record::RecordStore;

/// Columnar query result: one header row, then data rows in header order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QueryResponse {
    pub header: Vec<String>,
    #[serde(default)]
    pub data: Vec<Vec<serde_json::Value>>,
}

pub trait RecordSource {
    /// Short description for logs.
    fn describe(&self) -> String;

    fn fetch(&self, query: &str) -> BoardResult<QueryResponse>;
}

impl<S: RecordSource + ?Sized> RecordSource for &S {
    fn describe(&self) -> String {
        (**self).describe()
    }

    fn fetch(&self, query: &str) -> BoardResult<QueryResponse> {
        (**self).fetch(query)
    }
}

/// Fetch `query` from `source` and validate it into a [`RecordStore`].
pub fn load_store<S: RecordSource + ?Sized>(source: &S, query: &str) -> BoardResult<RecordStore> {
    validate_query_name(query)?;
    tracing::info!(query, source = %source.describe(), "loading records");
    let response = source.fetch(query)?;
    RecordStore::from_response(&response)
}

/// Query names become file names; keep them to a single path component.
pub fn validate_query_name(query: &str) -> BoardResult<()> {
    let ok = !query.is_empty()
        && query != "."
        && query != ".."
        && query
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'));
    if ok {
        Ok(())
    } else {
        Err(BoardError::Config {
            message: format!(
                "invalid query name '{}': use letters, digits, '_', '-' or '.'",
                query
            ),
        })
    }
}

/// Reads saved responses from `<dir>/<query>.json`.
#[derive(Debug, Clone)]
pub struct FileSource {
    dir: PathBuf,
}

impl FileSource {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn query_path(&self, query: &str) -> PathBuf {
        self.dir.join(format!("{}.json", query))
    }
}

impl RecordSource for FileSource {
    fn describe(&self) -> String {
        format!("file:{}", self.dir.display())
    }

    fn fetch(&self, query: &str) -> BoardResult<QueryResponse> {
        validate_query_name(query)?;
        let path = self.query_path(query);
        let raw = match std::fs::read_to_string(&path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(BoardError::QueryNotFound {
                    query: query.to_string(),
                    path,
                })
            }
            Err(source) => return Err(BoardError::Io { path, source }),
        };
        let response: QueryResponse =
            serde_json::from_str(&raw).map_err(|e| BoardError::InvalidResponse {
                message: format!("{}: {}", path.display(), e),
            })?;
        tracing::debug!(query, rows = response.data.len(), path = %path.display(), "read query response");
        Ok(response)
    }
}
