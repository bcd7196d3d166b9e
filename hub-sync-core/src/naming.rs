//! Asset naming convention shared by the publisher and the release inventory.
//!
//! `<name>-<version>.zip` and `<name>-<version>-sha256.txt` are the wire
//! contract with the store. Both directions live here so the pattern cannot
//! drift between the side that writes names and the side that parses them.

use regex::Regex;
use std::sync::LazyLock;

use crate::contract::PublishedIdentity;

/// File name of the package index uploaded next to the archives.
pub const INDEX_FILENAME: &str = "package_index.json";

static ARCHIVE_NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?P<name>.+?)-(?P<version>\d+\.\d+\.\d+)\.zip$").expect("valid archive pattern")
});

static VERSION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d+\.\d+\.\d+$").expect("valid version pattern"));

pub fn archive_filename(name: &str, version: &str) -> String {
    format!("{name}-{version}.zip")
}

pub fn hash_filename(name: &str, version: &str) -> String {
    format!("{name}-{version}-sha256.txt")
}

/// Recover the identity from an archive asset name. Names that do not follow
/// the convention (hash files, the index, anything else hosted on the
/// release) yield `None`.
pub fn parse_archive_filename(file_name: &str) -> Option<PublishedIdentity> {
    let caps = ARCHIVE_NAME.captures(file_name)?;
    Some(PublishedIdentity {
        name: caps["name"].to_string(),
        version: caps["version"].to_string(),
    })
}

/// Whether `version` survives a round trip through [`archive_filename`] and
/// [`parse_archive_filename`].
pub fn is_valid_version(version: &str) -> bool {
    VERSION.is_match(version)
}

/// Whether `name` is usable as a single file-name segment: no path
/// separators, no `..`, no control characters and no surrounding whitespace.
pub fn is_valid_name(name: &str) -> bool {
    !name.is_empty()
        && name.trim() == name
        && !name.contains(['/', '\\'])
        && !name.contains("..")
        && !name.chars().any(char::is_control)
}
