/// `load_config` module: Loads a static YAML config file, applies environment
/// overrides, and adapts it into the core [`SynchroniseConfig`] plus the
/// settings the GitHub client needs.
///
/// # Responsibilities
/// - Parse the user-supplied YAML into typed structs, filling defaults
/// - Apply the `PUBLISH` environment override (`true` enables uploads, any
///   other value disables them)
/// - Derive the download base URL from the repository when none is given
///
/// # Errors
/// All errors use `anyhow::Error` with context and are surfaced at the CLI
/// boundary.
use anyhow::{bail, Result};
use hub_sync_core::config::{
    ReleaseConfig, SynchroniseConfig, DEFAULT_RELEASE_TAG, DEFAULT_REMOTE_TIMEOUT,
};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{error, info};

pub const DEFAULT_API_URL: &str = "https://api.github.com";

/// Environment variable that switches uploads on (`true`) or off (anything else).
pub const PUBLISH_ENV: &str = "PUBLISH";

#[derive(Debug, Clone)]
pub struct CliConfig {
    pub sync: SynchroniseConfig,
    pub github: GithubSection,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GithubSection {
    /// `owner/name` slug of the repository hosting the release.
    pub repository: String,
    #[serde(default = "default_api_url")]
    pub api_url: String,
}

#[derive(Debug, Default, Deserialize)]
struct ReleaseSection {
    tag: Option<String>,
    download_base_url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawConfig {
    #[serde(default = "default_packages_dir")]
    packages_dir: PathBuf,
    #[serde(default)]
    scratch_dir: Option<PathBuf>,
    #[serde(default)]
    publish: bool,
    #[serde(default)]
    remote_timeout_secs: Option<u64>,
    #[serde(default)]
    release: ReleaseSection,
    github: GithubSection,
}

fn default_packages_dir() -> PathBuf {
    PathBuf::from("packages")
}

fn default_api_url() -> String {
    DEFAULT_API_URL.to_string()
}

/// Loads the YAML config file at `path` and merges environment overrides.
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<CliConfig> {
    let path_ref = path.as_ref();
    info!(config_path = ?path_ref, "Loading configuration from file");

    let config_content = match fs::read_to_string(path_ref) {
        Ok(content) => {
            info!(config_path = ?path_ref, "Config file read successfully");
            content
        }
        Err(e) => {
            error!(error = ?e, config_path = ?path_ref, "Failed to read config file");
            return Err(anyhow::anyhow!(
                "Failed to read config file {:?}: {}",
                path_ref,
                e
            ));
        }
    };

    let raw: RawConfig = match serde_yaml::from_str(&config_content) {
        Ok(conf) => {
            info!(config_path = ?path_ref, "Parsed config YAML successfully");
            conf
        }
        Err(e) => {
            error!(error = ?e, config_path = ?path_ref, "Failed to parse config YAML");
            return Err(anyhow::anyhow!("Failed to parse config YAML: {e}"));
        }
    };

    let repository = raw.github.repository.trim().to_string();
    if repository.split('/').filter(|part| !part.is_empty()).count() != 2 {
        error!(repository = %repository, "github.repository must look like owner/name");
        bail!("github.repository must look like owner/name, got {repository:?}");
    }

    let download_base_url = raw
        .release
        .download_base_url
        .unwrap_or_else(|| format!("https://github.com/{repository}/releases/latest/download"));

    let publish = match std::env::var(PUBLISH_ENV) {
        Ok(value) => {
            let enabled = value == "true";
            info!(env = PUBLISH_ENV, enabled, "Publish mode taken from environment");
            enabled
        }
        Err(_) => raw.publish,
    };

    let sync = SynchroniseConfig {
        packages_dir: raw.packages_dir,
        scratch_dir: raw.scratch_dir,
        release: ReleaseConfig {
            tag: raw
                .release
                .tag
                .unwrap_or_else(|| DEFAULT_RELEASE_TAG.to_string()),
            download_base_url,
        },
        publish,
        remote_timeout: raw
            .remote_timeout_secs
            .map(Duration::from_secs)
            .unwrap_or(DEFAULT_REMOTE_TIMEOUT),
    };

    info!(
        repository = %repository,
        release_tag = %sync.release.tag,
        publish = sync.publish,
        "Config loaded and merged successfully"
    );

    Ok(CliConfig {
        github: GithubSection {
            repository,
            api_url: raw.github.api_url,
        },
        sync,
    })
}
