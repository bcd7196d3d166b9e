//! Archiver: packs a package directory into `<name>-<version>.zip` and writes
//! its SHA-256 next to it as `<name>-<version>-sha256.txt`.
//!
//! Archives are byte-for-byte reproducible for an unchanged directory tree:
//! entries are added in sorted order with a fixed timestamp (the zip epoch,
//! 1980-01-01) and fixed permissions. The digest is taken over the finished
//! archive bytes, never the source tree.

use sha2::{Digest, Sha256};
use std::fs::{self, File};
use std::io::{self, BufWriter, Read, Write};
use std::path::Path;
use tracing::{debug, error, info};
use walkdir::WalkDir;
use zip::result::ZipError;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, DateTime, ZipWriter};

use crate::contract::{ArchiveArtifact, PackageRecord};
use crate::error::SyncError;
use crate::naming;

/// Read size used while copying and hashing; bounds memory regardless of file size.
pub const HASH_CHUNK_SIZE: usize = 64 * 1024;

const FILE_MODE: u32 = 0o644;
const DIR_MODE: u32 = 0o755;

/// Archive `package.location` into `scratch_dir` and hash the result.
///
/// # Errors
/// - [`SyncError::Archive`] when the source directory is missing or cannot be read.
/// - [`SyncError::Io`] when writing into `scratch_dir` fails.
pub fn create_archive(package: &PackageRecord, scratch_dir: &Path) -> Result<ArchiveArtifact, SyncError> {
    let identity = package.identity_key();
    let archive_path = scratch_dir.join(naming::archive_filename(&package.name, &package.version));
    let hash_path = scratch_dir.join(naming::hash_filename(&package.name, &package.version));

    if !package.location.is_dir() {
        error!(
            package = %identity,
            path = %package.location.display(),
            "[ARCHIVE][ERROR] Package directory is missing"
        );
        return Err(SyncError::Archive {
            package: identity,
            reason: format!("{} is not a directory", package.location.display()),
        });
    }

    write_zip(&package.location, &archive_path).map_err(|e| match e {
        ArchiveFailure::Source(reason) => {
            error!(package = %identity, %reason, "[ARCHIVE][ERROR] Cannot read package sources");
            SyncError::Archive {
                package: identity.clone(),
                reason,
            }
        }
        ArchiveFailure::Target(source) => {
            error!(package = %identity, error = %source, path = %archive_path.display(), "[ARCHIVE][ERROR] Cannot write archive");
            SyncError::io(&archive_path, source)
        }
    })?;

    let sha256 = sha256_file(&archive_path).map_err(|e| SyncError::io(&archive_path, e))?;
    fs::write(&hash_path, &sha256).map_err(|e| {
        error!(package = %identity, error = %e, path = %hash_path.display(), "[ARCHIVE][ERROR] Cannot write hash file");
        SyncError::io(&hash_path, e)
    })?;

    info!(
        package = %identity,
        archive = %archive_path.display(),
        sha256 = %sha256,
        "[ARCHIVE] Created archive"
    );

    Ok(ArchiveArtifact {
        archive_path,
        hash_path,
        sha256,
    })
}

/// Streaming SHA-256 of a file, lower-case hex.
pub fn sha256_file(path: &Path) -> io::Result<String> {
    let mut file = File::open(path)?;
    let mut hasher = Sha256::new();
    let mut buffer = vec![0u8; HASH_CHUNK_SIZE];

    loop {
        let read = file.read(&mut buffer)?;
        if read == 0 {
            break;
        }
        hasher.update(&buffer[..read]);
    }

    Ok(hex::encode(hasher.finalize()))
}

enum ArchiveFailure {
    /// Reading the package directory failed.
    Source(String),
    /// Writing the archive failed.
    Target(io::Error),
}

impl From<ZipError> for ArchiveFailure {
    fn from(e: ZipError) -> Self {
        match e {
            ZipError::Io(io) => ArchiveFailure::Target(io),
            other => ArchiveFailure::Target(io::Error::other(other)),
        }
    }
}

fn write_zip(source: &Path, target: &Path) -> Result<(), ArchiveFailure> {
    let file = File::create(target).map_err(ArchiveFailure::Target)?;
    let mut zip = ZipWriter::new(BufWriter::new(file));

    for entry in WalkDir::new(source)
        .min_depth(1)
        .follow_links(true)
        .sort_by_file_name()
    {
        let entry = entry.map_err(|e| ArchiveFailure::Source(e.to_string()))?;
        let name = entry_name(source, entry.path())?;

        if entry.file_type().is_dir() {
            debug!(entry = %name, "[ARCHIVE] adding directory");
            zip.add_directory(format!("{name}/"), entry_options(DIR_MODE))?;
        } else {
            debug!(entry = %name, "[ARCHIVE] adding file");
            let mut input = File::open(entry.path())
                .map_err(|e| ArchiveFailure::Source(format!("{}: {e}", entry.path().display())))?;
            zip.start_file(name, entry_options(FILE_MODE))?;
            copy_entry(entry.path(), &mut input, &mut zip)?;
        }
    }

    let mut writer = zip.finish()?;
    writer.flush().map_err(ArchiveFailure::Target)?;
    Ok(())
}

/// Copy one source file into the archive, keeping read failures (a package
/// problem) apart from write failures (a scratch problem).
fn copy_entry(path: &Path, input: &mut File, output: &mut impl Write) -> Result<(), ArchiveFailure> {
    let mut buffer = vec![0u8; HASH_CHUNK_SIZE];
    loop {
        let read = match input.read(&mut buffer) {
            Ok(0) => return Ok(()),
            Ok(read) => read,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(ArchiveFailure::Source(format!("{}: {e}", path.display()))),
        };
        output
            .write_all(&buffer[..read])
            .map_err(ArchiveFailure::Target)?;
    }
}

fn entry_options(mode: u32) -> SimpleFileOptions {
    SimpleFileOptions::default()
        .compression_method(CompressionMethod::Deflated)
        .last_modified_time(DateTime::default())
        .unix_permissions(mode)
}

/// Entry name relative to the package root, always `/`-separated.
fn entry_name(root: &Path, path: &Path) -> Result<String, ArchiveFailure> {
    let relative = path
        .strip_prefix(root)
        .map_err(|e| ArchiveFailure::Source(e.to_string()))?;
    let parts = relative
        .components()
        .map(|c| {
            c.as_os_str().to_str().ok_or_else(|| {
                ArchiveFailure::Source(format!("{} is not a UTF-8 file name", path.display()))
            })
        })
        .collect::<Result<Vec<&str>, _>>()?;
    Ok(parts.join("/"))
}
