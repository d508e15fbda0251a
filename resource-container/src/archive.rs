//! Archive codec for closed containers.
//!
//! A closed container is a single bzip2-compressed tar of the container
//! directory, with entry paths relative to the directory root. Empty
//! directories are stored as directory entries so the tree round-trips
//! exactly.
//!
//! Intermediate files (the uncompressed tar and the archive being written)
//! are temporary files that are removed on every exit path; the finished
//! archive is moved into place only once it is complete.

use std::fs::{self, File};
use std::io::{self, BufReader, BufWriter, Read, Seek, SeekFrom, Write};
use std::path::{Component, Path, PathBuf};

use bzip2::read::BzDecoder;
use bzip2::write::BzEncoder;
use bzip2::Compression;
use sha2::{Digest, Sha256};
use tempfile::NamedTempFile;
use tracing::{debug, info, warn};
use walkdir::WalkDir;

use crate::error::{ContainerError, ContainerResult};

/// Buffer size for hashing archives (64KB).
const BUFFER_SIZE: usize = 64 * 1024;

/// Progress callback for archive operations.
/// Arguments: (stage, path of the entry or file being processed)
pub type ArchiveProgressCallback = Box<dyn Fn(ArchiveStage, &Path) + Send + Sync>;

/// Archive stages for progress reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchiveStage {
    /// Adding an entry to the tar stream.
    Packing,
    /// Compressing the tar stream into the archive.
    Compressing,
    /// Decompressing the archive into a tar stream.
    Decompressing,
    /// Unpacking an entry into the target directory.
    Extracting,
    /// The operation finished.
    Complete,
}

impl ArchiveStage {
    /// Get a human-readable name for the stage.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Packing => "Packing",
            Self::Compressing => "Compressing",
            Self::Decompressing => "Decompressing",
            Self::Extracting => "Extracting",
            Self::Complete => "Complete",
        }
    }
}

/// Result of closing a container into an archive.
#[derive(Debug, Clone)]
pub struct ClosedArchive {
    /// Full path to the archive file.
    pub path: PathBuf,

    /// Size of the archive in bytes.
    pub size: u64,

    /// SHA-256 checksum of the archive.
    pub checksum: String,

    /// Number of tar entries (files and directories).
    pub entries: usize,
}

fn report(on_progress: Option<&ArchiveProgressCallback>, stage: ArchiveStage, path: &Path) {
    if let Some(cb) = on_progress {
        cb(stage, path);
    }
}

/// Directory for temporary files: the configured staging directory, or the
/// directory containing `beside`.
fn staging_for(staging_dir: Option<&Path>, beside: &Path) -> PathBuf {
    match staging_dir {
        Some(dir) => dir.to_path_buf(),
        None => match beside.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        },
    }
}

fn temp_file_in(dir: &Path, suffix: &str) -> ContainerResult<NamedTempFile> {
    tempfile::Builder::new()
        .prefix(".rc-")
        .suffix(suffix)
        .tempfile_in(dir)
        .map_err(|e| ContainerError::WriteFailed {
            path: dir.to_path_buf(),
            source: e,
        })
}

/// Pack `source_dir` into a compressed archive at `archive_path`.
///
/// The source directory is never modified. Any existing file at
/// `archive_path` is replaced only after the new archive is complete.
///
/// # Errors
///
/// - [`ContainerError::ContainerNotFound`] / [`ContainerError::NotADirectory`]
///   if the source is not a directory
/// - [`ContainerError::ArchiveFailed`] if packing or compression fails
pub fn pack(
    source_dir: &Path,
    archive_path: &Path,
    staging_dir: Option<&Path>,
    on_progress: Option<&ArchiveProgressCallback>,
) -> ContainerResult<ClosedArchive> {
    if !source_dir.exists() {
        return Err(ContainerError::ContainerNotFound(source_dir.to_path_buf()));
    }
    if !source_dir.is_dir() {
        return Err(ContainerError::NotADirectory(source_dir.to_path_buf()));
    }

    let archive_failed = |reason: String| ContainerError::ArchiveFailed {
        path: source_dir.to_path_buf(),
        reason,
    };

    // Stage 1: tar the tree into a temporary file
    let mut tar_tmp = temp_file_in(&staging_for(staging_dir, archive_path), ".tar")?;
    let entries = write_tar(source_dir, tar_tmp.as_file_mut(), on_progress)
        .map_err(|e| archive_failed(format!("tar failed: {}", e)))?;

    // Stage 2: compress into a temporary file beside the final archive
    report(on_progress, ArchiveStage::Compressing, archive_path);
    let mut out_tmp = temp_file_in(&staging_for(None, archive_path), ".tsrc")?;
    compress(tar_tmp.as_file_mut(), out_tmp.as_file_mut())
        .map_err(|e| archive_failed(format!("compression failed: {}", e)))?;
    drop(tar_tmp);

    out_tmp
        .persist(archive_path)
        .map_err(|e| ContainerError::WriteFailed {
            path: archive_path.to_path_buf(),
            source: e.error,
        })?;

    let size = fs::metadata(archive_path)
        .map_err(|e| ContainerError::ReadFailed {
            path: archive_path.to_path_buf(),
            source: e,
        })?
        .len();
    let checksum = calculate_sha256(archive_path)?;

    report(on_progress, ArchiveStage::Complete, archive_path);
    info!(
        source = %source_dir.display(),
        archive = %archive_path.display(),
        entries,
        size,
        "Closed resource container"
    );

    Ok(ClosedArchive {
        path: archive_path.to_path_buf(),
        size,
        checksum,
        entries,
    })
}

/// Write every entry under `source_dir` to `out` as a tar stream.
fn write_tar(
    source_dir: &Path,
    out: &mut File,
    on_progress: Option<&ArchiveProgressCallback>,
) -> io::Result<usize> {
    let mut builder = tar::Builder::new(BufWriter::new(out));
    let mut entries = 0;

    for entry in WalkDir::new(source_dir).min_depth(1).sort_by_file_name() {
        let entry = entry.map_err(io::Error::from)?;
        let relative = entry
            .path()
            .strip_prefix(source_dir)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))?;

        report(on_progress, ArchiveStage::Packing, relative);
        if entry.file_type().is_dir() {
            builder.append_dir(relative, entry.path())?;
        } else {
            builder.append_path_with_name(entry.path(), relative)?;
        }
        debug!(entry = %relative.display(), "Packed entry");
        entries += 1;
    }

    builder.into_inner()?.flush()?;
    Ok(entries)
}

fn compress(tar_file: &mut File, out: &mut File) -> io::Result<()> {
    tar_file.seek(SeekFrom::Start(0))?;
    let mut encoder = BzEncoder::new(BufWriter::new(out), Compression::best());
    io::copy(&mut BufReader::new(tar_file), &mut encoder)?;
    encoder.finish()?.flush()
}

/// Unpack the archive at `archive_path` into `target_dir`.
///
/// `target_dir` is created if absent. If extraction fails, a target created
/// by this call is removed; in a target that already existed only the
/// entries this call added are removed. The archive is never modified.
///
/// Returns the number of entries extracted.
///
/// # Errors
///
/// - [`ContainerError::ArchiveNotFound`] if the archive does not exist
/// - [`ContainerError::ExtractionFailed`] if the archive is corrupt or holds
///   an entry that would land outside the target
pub fn unpack(
    archive_path: &Path,
    target_dir: &Path,
    staging_dir: Option<&Path>,
    on_progress: Option<&ArchiveProgressCallback>,
) -> ContainerResult<usize> {
    if !archive_path.is_file() {
        return Err(ContainerError::ArchiveNotFound(archive_path.to_path_buf()));
    }

    let extraction_failed = |reason: String| ContainerError::ExtractionFailed {
        path: archive_path.to_path_buf(),
        reason,
    };

    // Stage 1: decompress into a temporary tar
    report(on_progress, ArchiveStage::Decompressing, archive_path);
    let mut tar_tmp = temp_file_in(&staging_for(staging_dir, archive_path), ".tar")?;
    let archive = File::open(archive_path).map_err(|e| ContainerError::ReadFailed {
        path: archive_path.to_path_buf(),
        source: e,
    })?;
    decompress(archive, tar_tmp.as_file_mut())
        .map_err(|e| extraction_failed(format!("decompression failed: {}", e)))?;

    // Stage 2: unpack into the target, undoing this call's work on failure
    let existed = target_dir.exists();
    fs::create_dir_all(target_dir).map_err(|e| ContainerError::CreateDirFailed {
        path: target_dir.to_path_buf(),
        source: e,
    })?;
    let target = target_dir.to_path_buf();
    let mut created = scopeguard::guard(Vec::<PathBuf>::new(), move |created| {
        if existed {
            warn!(
                target = %target.display(),
                entries = created.len(),
                "Extraction failed, removing extracted entries"
            );
            for path in created.iter().rev() {
                remove_path(path);
            }
        } else {
            warn!(target = %target.display(), "Extraction failed, removing target directory");
            remove_path(&target);
        }
    });

    let entries = extract_tar(tar_tmp.as_file_mut(), target_dir, &mut created, on_progress)
        .map_err(|e| extraction_failed(e.to_string()))?;

    scopeguard::ScopeGuard::into_inner(created);

    report(on_progress, ArchiveStage::Complete, target_dir);
    info!(
        archive = %archive_path.display(),
        target = %target_dir.display(),
        entries,
        "Opened resource container archive"
    );
    Ok(entries)
}

fn decompress(archive: File, out: &mut File) -> io::Result<()> {
    let mut decoder = BzDecoder::new(BufReader::new(archive));
    let mut writer = BufWriter::new(out);
    io::copy(&mut decoder, &mut writer)?;
    writer.flush()
}

fn remove_path(path: &Path) {
    let result = match fs::symlink_metadata(path) {
        Ok(meta) if meta.is_dir() => fs::remove_dir_all(path),
        Ok(_) => fs::remove_file(path),
        Err(_) => return,
    };
    if let Err(e) = result {
        warn!(path = %path.display(), error = %e, "Failed to remove extracted path");
    }
}

/// The outermost path that unpacking `relative` into `target_dir` would
/// create, or `None` if every level already exists or the path is unsafe.
fn first_missing(target_dir: &Path, relative: &Path) -> Option<PathBuf> {
    let mut path = target_dir.to_path_buf();
    for component in relative.components() {
        match component {
            Component::Normal(part) => path.push(part),
            Component::CurDir => continue,
            _ => return None,
        }
        if fs::symlink_metadata(&path).is_err() {
            return Some(path);
        }
    }
    None
}

/// Unpack every entry of the tar in `tar_file` into `target_dir`.
///
/// Paths this call creates are pushed to `created`, outermost first.
fn extract_tar(
    tar_file: &mut File,
    target_dir: &Path,
    created: &mut Vec<PathBuf>,
    on_progress: Option<&ArchiveProgressCallback>,
) -> io::Result<usize> {
    tar_file.seek(SeekFrom::Start(0))?;
    let mut archive = tar::Archive::new(BufReader::new(tar_file));
    let mut entries = 0;

    for entry in archive.entries()? {
        let mut entry = entry?;
        let relative = entry.path()?.into_owned();

        report(on_progress, ArchiveStage::Extracting, &relative);
        created.extend(first_missing(target_dir, &relative));
        if !entry.unpack_in(target_dir)? {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!("unsafe entry path: {}", relative.display()),
            ));
        }
        debug!(entry = %relative.display(), "Extracted entry");
        entries += 1;
    }

    Ok(entries)
}

/// Calculate the SHA-256 checksum of a file as lowercase hex.
pub fn calculate_sha256(path: &Path) -> ContainerResult<String> {
    let mut file = File::open(path).map_err(|e| ContainerError::ReadFailed {
        path: path.to_path_buf(),
        source: e,
    })?;

    let mut hasher = Sha256::new();
    let mut buffer = vec![0u8; BUFFER_SIZE];

    loop {
        let bytes_read = file
            .read(&mut buffer)
            .map_err(|e| ContainerError::ReadFailed {
                path: path.to_path_buf(),
                source: e,
            })?;

        if bytes_read == 0 {
            break;
        }

        hasher.update(&buffer[..bytes_read]);
    }

    Ok(format!("{:x}", hasher.finalize()))
}
