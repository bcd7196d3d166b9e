//! Error taxonomy for a synchronisation run.
//!
//! Every component converts its failures into [`SyncError`] so the orchestrator
//! can surface one descriptive error and terminate the run.

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Why a single manifest could not be turned into a package record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ManifestErrorKind {
    /// The file is not valid YAML or has the wrong shape.
    Syntax(String),
    MissingField(&'static str),
    EmptyField(&'static str),
    /// The name cannot be used as a single file-name segment.
    InvalidName(String),
    /// The version is not a dotted numeric triple.
    InvalidVersion(String),
    /// The file could not be read.
    Unreadable(String),
}

impl fmt::Display for ManifestErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ManifestErrorKind::Syntax(msg) => write!(f, "malformed YAML: {msg}"),
            ManifestErrorKind::MissingField(field) => write!(f, "missing required field `{field}`"),
            ManifestErrorKind::EmptyField(field) => write!(f, "field `{field}` must not be empty"),
            ManifestErrorKind::InvalidName(n) => {
                write!(f, "name `{n}` must be a single file name without separators or `..`")
            }
            ManifestErrorKind::InvalidVersion(v) => {
                write!(f, "version `{v}` is not of the form MAJOR.MINOR.PATCH")
            }
            ManifestErrorKind::Unreadable(msg) => write!(f, "cannot read file: {msg}"),
        }
    }
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("invalid manifest {}: {kind}", .path.display())]
pub struct ManifestError {
    pub path: PathBuf,
    pub kind: ManifestErrorKind,
}

#[derive(Debug, Error)]
pub enum SyncError {
    #[error("{} manifest(s) failed to parse: {}", .failures.len(), join(.failures))]
    Manifest { failures: Vec<ManifestError> },

    #[error("cannot list published assets: {0}")]
    RemoteQuery(String),

    #[error("cannot archive {package}: {reason}")]
    Archive { package: String, reason: String },

    #[error("I/O error at {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot upload {file}: {reason}")]
    Upload { file: String, reason: String },

    #[error("{} package(s) failed to publish: {}", .failures.len(), join(.failures))]
    PackagesFailed { failures: Vec<SyncError> },
}

impl SyncError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        SyncError::Io {
            path: path.into(),
            source,
        }
    }
}

fn join<T: fmt::Display>(items: &[T]) -> String {
    items
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}
