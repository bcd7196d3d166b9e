//! Manifest scanner: discovers `<root>/<package>/<version>/_manifest.yml` files
//! and parses each into a [`PackageRecord`].
//!
//! A bad manifest never stops the scan. Every failure is collected into
//! [`ScanOutcome::failures`] so the caller can report all of them at once.

use serde::Deserialize;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, error, info, warn};
use walkdir::WalkDir;

use crate::contract::PackageRecord;
use crate::error::{ManifestError, ManifestErrorKind, SyncError};
use crate::naming;

pub const MANIFEST_FILENAME: &str = "_manifest.yml";

/// Manifests sit exactly this many levels below the packages root.
const MANIFEST_DEPTH: usize = 3;

/// Result of one scanner pass.
#[derive(Debug, Default)]
pub struct ScanOutcome {
    /// Valid records in discovery order, identity keys unique.
    pub records: Vec<PackageRecord>,
    pub failures: Vec<ManifestError>,
}

impl ScanOutcome {
    /// The records, or every failure as a single [`SyncError::Manifest`].
    pub fn into_catalog(self) -> Result<Vec<PackageRecord>, SyncError> {
        if self.failures.is_empty() {
            Ok(self.records)
        } else {
            Err(SyncError::Manifest {
                failures: self.failures,
            })
        }
    }
}

// All fields optional so a missing one can be reported by name.
#[derive(Debug, Deserialize)]
struct RawManifest {
    name: Option<String>,
    version: Option<String>,
    title: Option<String>,
    description: Option<String>,
    author: Option<String>,
    #[serde(default)]
    tags: Option<Vec<String>>,
}

/// Scan `root` for package manifests.
///
/// Fails only when `root` itself cannot be walked; per-manifest problems end
/// up in the outcome.
pub fn scan_packages(root: &Path) -> Result<ScanOutcome, SyncError> {
    info!(root = %root.display(), "[SCAN] Reading packages from repository");

    let mut manifests = Vec::new();
    for entry in WalkDir::new(root)
        .min_depth(MANIFEST_DEPTH)
        .max_depth(MANIFEST_DEPTH)
        .sort_by_file_name()
    {
        let entry = entry.map_err(|e| {
            let path = e.path().unwrap_or(root).to_path_buf();
            error!(error = %e, path = %path.display(), "[SCAN][ERROR] Cannot walk packages directory");
            let source = e
                .into_io_error()
                .unwrap_or_else(|| std::io::Error::other("filesystem loop"));
            SyncError::io(path, source)
        })?;
        if entry.file_type().is_file() && entry.file_name() == MANIFEST_FILENAME {
            manifests.push(entry.into_path());
        }
    }

    let mut outcome = ScanOutcome::default();
    let mut seen = HashSet::new();
    for path in manifests {
        debug!(path = %path.display(), "[SCAN] reading manifest");
        match parse_manifest(&path) {
            Ok(record) => {
                if seen.insert(record.identity_key()) {
                    outcome.records.push(record);
                } else {
                    warn!(
                        package = %record.identity_key(),
                        path = %path.display(),
                        "[SCAN] Duplicate package identity, keeping the first one"
                    );
                }
            }
            Err(e) => {
                error!(path = %path.display(), error = %e.kind, "[SCAN][ERROR] Invalid manifest");
                outcome.failures.push(e);
            }
        }
    }

    info!(
        packages = outcome.records.len(),
        failures = outcome.failures.len(),
        "[SCAN] Scan finished"
    );
    Ok(outcome)
}

/// Parse one manifest file. The package location is the file's parent directory.
pub fn parse_manifest(path: &Path) -> Result<PackageRecord, ManifestError> {
    let fail = |kind| ManifestError {
        path: path.to_path_buf(),
        kind,
    };

    let content =
        fs::read_to_string(path).map_err(|e| fail(ManifestErrorKind::Unreadable(e.to_string())))?;
    let raw: RawManifest = serde_yaml::from_str(&content)
        .map_err(|e| fail(ManifestErrorKind::Syntax(e.to_string())))?;

    let required = |value: Option<String>, field: &'static str| match value {
        None => Err(fail(ManifestErrorKind::MissingField(field))),
        Some(v) if v.trim().is_empty() => Err(fail(ManifestErrorKind::EmptyField(field))),
        Some(v) => Ok(v),
    };

    let name = required(raw.name, "name")?;
    let version = required(raw.version, "version")?;
    let title = required(raw.title, "title")?;
    let description = required(raw.description, "description")?;
    let author = required(raw.author, "author")?;

    if !naming::is_valid_name(&name) {
        return Err(fail(ManifestErrorKind::InvalidName(name)));
    }
    if !naming::is_valid_version(&version) {
        return Err(fail(ManifestErrorKind::InvalidVersion(version)));
    }

    let location: PathBuf = path
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."));

    Ok(PackageRecord {
        name,
        version,
        location,
        title,
        description,
        author,
        tags: raw.tags.unwrap_or_default(),
    })
}
