//! Index builder: one JSON document describing every local package.
//!
//! The remote index is replaced wholesale on every write, so it is always
//! built from the full local catalog and never from the current delta alone.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::{error, info};

use crate::contract::PackageRecord;
use crate::error::SyncError;
use crate::naming;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexDocument {
    /// Unix seconds at generation time.
    pub last_update: u64,
    pub packages: Vec<IndexEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexEntry {
    pub name: String,
    pub author: String,
    pub description: String,
    pub title: String,
    pub version: String,
    pub tags: Vec<String>,
    pub archive_url: String,
    pub archive_sha256_url: String,
}

impl IndexEntry {
    pub fn from_record(record: &PackageRecord, download_base_url: &str) -> Self {
        let base = download_base_url.trim_end_matches('/');
        IndexEntry {
            name: record.name.clone(),
            author: record.author.clone(),
            description: record.description.clone(),
            title: record.title.clone(),
            version: record.version.clone(),
            tags: record.tags.clone(),
            archive_url: format!(
                "{base}/{}",
                naming::archive_filename(&record.name, &record.version)
            ),
            archive_sha256_url: format!(
                "{base}/{}",
                naming::hash_filename(&record.name, &record.version)
            ),
        }
    }
}

/// Build the index over `catalog`, keeping its order.
pub fn build_index(catalog: &[PackageRecord], download_base_url: &str, last_update: u64) -> IndexDocument {
    IndexDocument {
        last_update,
        packages: catalog
            .iter()
            .map(|record| IndexEntry::from_record(record, download_base_url))
            .collect(),
    }
}

/// Serialize `index` to `<scratch_dir>/package_index.json`.
pub fn write_index(index: &IndexDocument, scratch_dir: &Path) -> Result<PathBuf, SyncError> {
    let path = scratch_dir.join(naming::INDEX_FILENAME);
    let json = serde_json::to_string(index)
        .map_err(|e| SyncError::io(&path, std::io::Error::other(e)))?;

    fs::write(&path, json).map_err(|e| {
        error!(path = %path.display(), error = %e, "[INDEX][ERROR] Cannot write index");
        SyncError::io(&path, e)
    })?;

    info!(
        path = %path.display(),
        entries = index.packages.len(),
        "[INDEX] Index written"
    );
    Ok(path)
}

/// Seconds since the Unix epoch; zero if the clock is before it.
pub fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default()
}
