//! Release inventory: what has already been published.

use std::time::Duration;
use tracing::{debug, error, info};

use crate::contract::{PublishedIdentity, ReleaseStore};
use crate::error::SyncError;
use crate::naming;

/// List the release's assets and keep the identities of those named like a
/// package archive. Everything else on the release is skipped silently.
///
/// Any failure to reach the store, including the timeout expiring, is a
/// [`SyncError::RemoteQuery`]: without a trustworthy baseline no delta can be
/// computed.
pub async fn published_identities<S>(
    store: &S,
    release_tag: &str,
    timeout: Duration,
) -> Result<Vec<PublishedIdentity>, SyncError>
where
    S: ReleaseStore + ?Sized,
{
    info!(release_tag, "[INVENTORY] Obtaining released packages");

    let assets = match tokio::time::timeout(timeout, store.list_assets(release_tag)).await {
        Ok(Ok(assets)) => assets,
        Ok(Err(e)) => {
            error!(release_tag, error = %e, "[INVENTORY][ERROR] Listing assets failed");
            return Err(SyncError::RemoteQuery(e.to_string()));
        }
        Err(_) => {
            error!(
                release_tag,
                timeout_secs = timeout.as_secs(),
                "[INVENTORY][ERROR] Listing assets timed out"
            );
            return Err(SyncError::RemoteQuery(format!(
                "listing assets of {release_tag} timed out after {}s",
                timeout.as_secs()
            )));
        }
    };

    let total = assets.len();
    let identities: Vec<PublishedIdentity> = assets
        .iter()
        .filter_map(|asset| {
            let identity = naming::parse_archive_filename(&asset.name);
            if identity.is_none() {
                debug!(asset = %asset.name, "[INVENTORY] Skipping non-package asset");
            }
            identity
        })
        .collect();

    info!(
        assets = total,
        packages = identities.len(),
        "[INVENTORY] Released packages obtained"
    );
    Ok(identities)
}
