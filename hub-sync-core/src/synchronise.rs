//! High-level pipeline: orchestrates scan → inventory → delta → archive →
//! publish → index.
//!
//! # Lifecycle
//! A run moves through `Idle → Scanning → Diffing → PublishingMissing →
//! Indexing → Done`. When the delta is empty it stops at `UpToDate` straight
//! from `Diffing`, leaving the remote index untouched. Any fatal error moves
//! it to `Failed` and is returned to the caller; nothing is retried.
//!
//! # Failure policy
//! - Manifest failures abort before the store is contacted.
//! - Archive and upload failures of one package are collected while the
//!   remaining worklist is processed; the run then fails with
//!   [`SyncError::PackagesFailed`] and the index is not uploaded.
//! - I/O failures on the scratch location abort immediately. Package failures
//!   collected before the abort are returned with it as
//!   [`SyncError::PackagesFailed`], the I/O error last.
//!
//! Re-running after any failure is safe: uploads clobber, and the next delta
//! only contains what is still missing.

use std::fmt;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use tracing::{error, info};

use crate::archive;
use crate::config::SynchroniseConfig;
use crate::contract::{PackageRecord, ReleaseStore};
use crate::delta;
use crate::error::SyncError;
use crate::index;
use crate::inventory;
use crate::publish::{self, UploadOutcome};
use crate::scan;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncState {
    Idle,
    Scanning,
    Diffing,
    PublishingMissing,
    Indexing,
    UpToDate,
    Done,
    Failed,
}

impl fmt::Display for SyncState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SyncState::Idle => "idle",
            SyncState::Scanning => "scanning",
            SyncState::Diffing => "diffing",
            SyncState::PublishingMissing => "publishing-missing",
            SyncState::Indexing => "indexing",
            SyncState::UpToDate => "up-to-date",
            SyncState::Done => "done",
            SyncState::Failed => "failed",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncOutcome {
    /// Nothing was missing; no archive, upload or index work happened.
    UpToDate,
    Published,
}

#[derive(Debug)]
pub struct SynchroniseReport {
    pub outcome: SyncOutcome,
    /// Identity keys of the packages that were missing, in catalog order.
    pub worklist: Vec<String>,
    pub published: Vec<PublishedPackage>,
    pub index: Option<IndexReport>,
}

#[derive(Debug)]
pub struct PublishedPackage {
    pub identity: String,
    /// Archive file name as uploaded.
    pub archive: String,
    pub sha256: String,
    /// False on a dry run.
    pub uploaded: bool,
}

#[derive(Debug)]
pub struct IndexReport {
    pub entries: usize,
    pub last_update: u64,
    pub uploaded: bool,
}

/// Local catalog and the part of it that still has to be published.
#[derive(Debug)]
pub struct Plan {
    pub catalog: Vec<PackageRecord>,
    pub worklist: Vec<PackageRecord>,
}

/// Tracks and logs the orchestrator's state.
#[derive(Debug)]
struct StateMachine {
    state: SyncState,
}

impl StateMachine {
    fn new() -> Self {
        Self {
            state: SyncState::Idle,
        }
    }

    fn advance(&mut self, next: SyncState) {
        info!(from = %self.state, to = %next, "[SYNC] State transition");
        self.state = next;
    }
}

/// Compute the worklist without archiving or uploading anything.
pub async fn plan<S>(config: &SynchroniseConfig, store: &S) -> Result<Plan, SyncError>
where
    S: ReleaseStore + ?Sized,
{
    let mut machine = StateMachine::new();
    let result = plan_with(config, store, &mut machine).await;
    if let Err(e) = &result {
        machine.advance(SyncState::Failed);
        error!(error = %e, "[SYNC][ERROR] Planning failed");
    }
    result
}

/// Run the whole pipeline for `config` against `store`.
pub async fn synchronise<S>(
    config: &SynchroniseConfig,
    store: &S,
) -> Result<SynchroniseReport, SyncError>
where
    S: ReleaseStore + ?Sized,
{
    info!(
        release_tag = %config.release.tag,
        publish = config.publish,
        "[SYNC] Starting synchronisation pipeline"
    );

    let mut machine = StateMachine::new();
    let result = run(config, store, &mut machine).await;
    if let Err(e) = &result {
        machine.advance(SyncState::Failed);
        error!(error = %e, "[SYNC][ERROR] Synchronisation failed");
    }
    result
}

async fn plan_with<S>(
    config: &SynchroniseConfig,
    store: &S,
    machine: &mut StateMachine,
) -> Result<Plan, SyncError>
where
    S: ReleaseStore + ?Sized,
{
    machine.advance(SyncState::Scanning);
    let catalog = scan::scan_packages(&config.packages_dir)?.into_catalog()?;

    let published =
        inventory::published_identities(store, &config.release.tag, config.remote_timeout).await?;

    machine.advance(SyncState::Diffing);
    let worklist: Vec<PackageRecord> = delta::missing(&catalog, &published)
        .into_iter()
        .cloned()
        .collect();
    info!(
        local = catalog.len(),
        published = published.len(),
        missing = worklist.len(),
        "[SYNC] Delta calculated"
    );

    Ok(Plan { catalog, worklist })
}

async fn run<S>(
    config: &SynchroniseConfig,
    store: &S,
    machine: &mut StateMachine,
) -> Result<SynchroniseReport, SyncError>
where
    S: ReleaseStore + ?Sized,
{
    let Plan { catalog, worklist } = plan_with(config, store, machine).await?;
    let worklist_keys: Vec<String> = worklist.iter().map(PackageRecord::identity_key).collect();

    if worklist.is_empty() {
        machine.advance(SyncState::UpToDate);
        info!("[SYNC] Packages are already up-to-date");
        return Ok(SynchroniseReport {
            outcome: SyncOutcome::UpToDate,
            worklist: worklist_keys,
            published: Vec::new(),
            index: None,
        });
    }

    machine.advance(SyncState::PublishingMissing);
    let scratch = Scratch::prepare(config.scratch_dir.as_deref())?;

    let mut published = Vec::with_capacity(worklist.len());
    let mut failures = Vec::new();
    for package in &worklist {
        info!(package = %package.identity_key(), "[SYNC] Publishing package");
        match publish_package(config, store, package, scratch.path()).await {
            Ok(report) => published.push(report),
            Err(e @ SyncError::Io { .. }) if failures.is_empty() => return Err(e),
            Err(e @ SyncError::Io { .. }) => {
                failures.push(e);
                return Err(SyncError::PackagesFailed { failures });
            }
            Err(e) => {
                error!(
                    package = %package.identity_key(),
                    error = %e,
                    "[SYNC][ERROR] Package failed, continuing with the rest"
                );
                failures.push(e);
            }
        }
    }

    if !failures.is_empty() {
        return Err(SyncError::PackagesFailed { failures });
    }

    machine.advance(SyncState::Indexing);
    let last_update = index::unix_now();
    let document = index::build_index(&catalog, &config.release.download_base_url, last_update);
    let index_path = index::write_index(&document, scratch.path())?;
    let uploaded = publish::upload_file(
        store,
        &config.release.tag,
        &index_path,
        config.publish,
        config.remote_timeout,
    )
    .await?;

    machine.advance(SyncState::Done);
    Ok(SynchroniseReport {
        outcome: SyncOutcome::Published,
        worklist: worklist_keys,
        published,
        index: Some(IndexReport {
            entries: document.packages.len(),
            last_update,
            uploaded: uploaded == UploadOutcome::Uploaded,
        }),
    })
}

async fn publish_package<S>(
    config: &SynchroniseConfig,
    store: &S,
    package: &PackageRecord,
    scratch_dir: &Path,
) -> Result<PublishedPackage, SyncError>
where
    S: ReleaseStore + ?Sized,
{
    let artifact = archive::create_archive(package, scratch_dir)?;
    let outcome = publish::publish_artifact(
        store,
        &config.release.tag,
        &artifact,
        config.publish,
        config.remote_timeout,
    )
    .await?;

    Ok(PublishedPackage {
        identity: package.identity_key(),
        archive: artifact
            .archive_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default(),
        sha256: artifact.sha256,
        uploaded: outcome == UploadOutcome::Uploaded,
    })
}

/// Scratch location for one run. An owned temporary directory is removed
/// when the run ends.
enum Scratch {
    Configured(PathBuf),
    Temporary(TempDir),
}

impl Scratch {
    fn prepare(configured: Option<&Path>) -> Result<Self, SyncError> {
        match configured {
            Some(dir) => {
                std::fs::create_dir_all(dir).map_err(|e| SyncError::io(dir, e))?;
                Ok(Scratch::Configured(dir.to_path_buf()))
            }
            None => {
                let dir = tempfile::Builder::new()
                    .prefix("hub-sync-")
                    .tempdir()
                    .map_err(|e| SyncError::io(std::env::temp_dir(), e))?;
                Ok(Scratch::Temporary(dir))
            }
        }
    }

    fn path(&self) -> &Path {
        match self {
            Scratch::Configured(dir) => dir,
            Scratch::Temporary(dir) => dir.path(),
        }
    }
}
