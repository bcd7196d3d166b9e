#![allow(dead_code)]

use hub_sync_core::config::{ReleaseConfig, SynchroniseConfig};
use hub_sync_core::contract::PackageRecord;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const TAG: &str = "v1.0.0";
pub const BASE_URL: &str = "https://github.com/espanso/hub/releases/latest/download";

/// Write `<root>/<dir>/<version>/_manifest.yml` with the given body and
/// return the package directory.
pub fn write_manifest(root: &Path, dir: &str, version: &str, body: &str) -> PathBuf {
    let package_dir = root.join(dir).join(version);
    fs::create_dir_all(&package_dir).unwrap();
    fs::write(package_dir.join("_manifest.yml"), body).unwrap();
    package_dir
}

/// Write a complete, valid package with a manifest, a package file and a
/// nested README.
pub fn write_package(root: &Path, name: &str, version: &str) -> PathBuf {
    let body = format!(
        "name: {name}\nversion: {version}\ntitle: {name} title\ndescription: The {name} package\nauthor: Jane Doe\ntags: [\"utility\", \"{name}\"]\n"
    );
    let dir = write_manifest(root, name, version, &body);
    fs::write(
        dir.join("package.yml"),
        format!("matches:\n  - trigger: \":{name}\"\n    replace: \"{name} v{version}\"\n"),
    )
    .unwrap();
    fs::create_dir_all(dir.join("docs")).unwrap();
    fs::write(dir.join("docs").join("README.md"), format!("# {name}\n")).unwrap();
    dir
}

pub fn config_for(packages_dir: &Path, scratch_dir: Option<PathBuf>, publish: bool) -> SynchroniseConfig {
    SynchroniseConfig {
        packages_dir: packages_dir.to_path_buf(),
        scratch_dir,
        release: ReleaseConfig {
            tag: TAG.to_string(),
            download_base_url: BASE_URL.to_string(),
        },
        publish,
        remote_timeout: Duration::from_secs(5),
    }
}

pub fn record(name: &str, version: &str) -> PackageRecord {
    PackageRecord {
        name: name.to_string(),
        version: version.to_string(),
        location: PathBuf::from(format!("packages/{name}/{version}")),
        title: format!("{name} title"),
        description: format!("The {name} package"),
        author: "Jane Doe".to_string(),
        tags: vec![],
    }
}
