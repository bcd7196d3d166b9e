use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, info};

/// Release tag every asset is uploaded under unless configured otherwise.
pub const DEFAULT_RELEASE_TAG: &str = "v1.0.0";

/// Upper bound on any single call to the remote store.
pub const DEFAULT_REMOTE_TIMEOUT: Duration = Duration::from_secs(60);

/// Where assets go and how consumers reach them.
#[derive(Debug, Clone)]
pub struct ReleaseConfig {
    /// Release the assets are attached to.
    pub tag: String,
    /// Base that archive and hash file names are appended to in the index,
    /// e.g. `https://github.com/espanso/hub/releases/latest/download`.
    pub download_base_url: String,
}

/// Everything one synchronisation run needs. Passed explicitly to the
/// orchestrator; nothing is read from ambient state.
#[derive(Debug, Clone)]
pub struct SynchroniseConfig {
    /// Root holding `<package>/<version>/_manifest.yml`.
    pub packages_dir: PathBuf,
    /// Where archives, hash files and the index are written. A fresh
    /// temporary directory is used when unset.
    pub scratch_dir: Option<PathBuf>,
    pub release: ReleaseConfig,
    /// When false the run is dry: everything is built but nothing is uploaded.
    pub publish: bool,
    pub remote_timeout: Duration,
}

impl SynchroniseConfig {
    pub fn trace_loaded(&self) {
        info!(
            packages_dir = %self.packages_dir.display(),
            release_tag = %self.release.tag,
            publish = self.publish,
            timeout_secs = self.remote_timeout.as_secs(),
            "Loaded SynchroniseConfig"
        );
        debug!(?self, "SynchroniseConfig loaded (full debug)");
    }
}
