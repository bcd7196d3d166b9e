//! Publisher: uploads an archive and its hash file with clobber semantics.

use std::path::Path;
use std::time::Duration;
use tracing::{error, info, warn};

use crate::contract::{ArchiveArtifact, ReleaseStore};
use crate::error::SyncError;

/// What happened to a file handed to the publisher.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadOutcome {
    Uploaded,
    /// Dry run: the file was built but not sent.
    Skipped,
}

/// Upload the hash file, then the archive, overwriting any existing asset of
/// the same name. Re-publishing after a partial failure converges on the same
/// end state.
pub async fn publish_artifact<S>(
    store: &S,
    release_tag: &str,
    artifact: &ArchiveArtifact,
    publish: bool,
    timeout: Duration,
) -> Result<UploadOutcome, SyncError>
where
    S: ReleaseStore + ?Sized,
{
    // The archive goes last: it is what the inventory treats as "published".
    upload_file(store, release_tag, &artifact.hash_path, publish, timeout).await?;
    upload_file(store, release_tag, &artifact.archive_path, publish, timeout).await
}

/// Upload one file with clobber semantics, or skip it when `publish` is false.
pub async fn upload_file<S>(
    store: &S,
    release_tag: &str,
    file: &Path,
    publish: bool,
    timeout: Duration,
) -> Result<UploadOutcome, SyncError>
where
    S: ReleaseStore + ?Sized,
{
    let file_name = file
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| file.display().to_string());

    if !publish {
        warn!(file = %file_name, release_tag, "[PUBLISH] Dry run, upload skipped");
        return Ok(UploadOutcome::Skipped);
    }

    info!(file = %file_name, release_tag, "[PUBLISH] Uploading");
    match tokio::time::timeout(timeout, store.upload(release_tag, file, true)).await {
        Ok(Ok(())) => {
            info!(file = %file_name, "[PUBLISH] Upload succeeded");
            Ok(UploadOutcome::Uploaded)
        }
        Ok(Err(e)) => {
            error!(file = %file_name, error = %e, "[PUBLISH][ERROR] Upload failed");
            Err(SyncError::Upload {
                file: file_name,
                reason: e.to_string(),
            })
        }
        Err(_) => {
            error!(
                file = %file_name,
                timeout_secs = timeout.as_secs(),
                "[PUBLISH][ERROR] Upload timed out"
            );
            Err(SyncError::Upload {
                reason: format!("timed out after {}s", timeout.as_secs()),
                file: file_name,
            })
        }
    }
}
