//! # contract: shared data types and the remote store interface
//!
//! This module defines the records that flow through the pipeline and the one
//! trait ([`ReleaseStore`]) the pipeline uses to talk to the remote,
//! append-only asset store.
//!
//! ## Interface & Extensibility
//! - Implement [`ReleaseStore`] to publish into a new kind of store (GitHub
//!   Releases, an S3 bucket, an in-memory fake for tests).
//! - All methods are async and return boxed errors; the pipeline converts them
//!   into [`crate::error::SyncError`] at the component boundary.
//!
//! ## Mocking & Testing
//! - The trait is annotated for `mockall`, so consumers get a
//!   `MockReleaseStore` for deterministic tests.

use async_trait::async_trait;
use std::fmt;
use std::path::{Path, PathBuf};

#[cfg(any(test, feature = "test-export-mocks"))]
use mockall::automock;

/// Canonical `name@version` string both sides of the delta are compared by.
pub fn identity_key(name: &str, version: &str) -> String {
    format!("{name}@{version}")
}

/// One package declared in the hub repository, parsed from its manifest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageRecord {
    pub name: String,
    /// Dotted numeric triple, e.g. `1.2.3`.
    pub version: String,
    /// Directory holding the package sources (the manifest's parent).
    pub location: PathBuf,
    pub title: String,
    pub description: String,
    pub author: String,
    pub tags: Vec<String>,
}

impl PackageRecord {
    pub fn identity_key(&self) -> String {
        identity_key(&self.name, &self.version)
    }
}

/// A package already present in the store, recovered from an asset file name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PublishedIdentity {
    pub name: String,
    pub version: String,
}

impl PublishedIdentity {
    pub fn identity_key(&self) -> String {
        identity_key(&self.name, &self.version)
    }
}

impl fmt::Display for PublishedIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.name, self.version)
    }
}

/// Asset metadata as reported by the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseAsset {
    pub name: String,
    pub size: u64,
}

/// Archive and hash file produced for one package. Lives only until it has
/// been uploaded.
#[derive(Debug, Clone)]
pub struct ArchiveArtifact {
    pub archive_path: PathBuf,
    pub hash_path: PathBuf,
    /// Lower-case hex SHA-256 of the archive bytes.
    pub sha256: String,
}

/// Error type for ReleaseStore implementations (simple boxed error)
pub type StoreError = Box<dyn std::error::Error + Send + Sync>;

/// Trait for listing and uploading the assets attached to a release.
/// The implementor is responsible for connecting to the backing service.
///
/// Uploads with `clobber` set must replace an existing asset of the same file
/// name, which is what makes re-running the pipeline safe.
#[cfg_attr(any(test, feature = "test-export-mocks"), automock)]
#[async_trait]
pub trait ReleaseStore: Send + Sync {
    /// List every asset attached to the release.
    async fn list_assets(&self, release_tag: &str) -> Result<Vec<ReleaseAsset>, StoreError>;

    /// Upload a local file as an asset named after its file name.
    async fn upload(&self, release_tag: &str, file: &Path, clobber: bool)
        -> Result<(), StoreError>;
}
