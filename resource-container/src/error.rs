//! Error types for resource container operations.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Result type for container operations.
pub type ContainerResult<T> = Result<T, ContainerError>;

/// Broad classification of a [`ContainerError`].
///
/// Callers that only care about *what kind* of failure happened (for example
/// "the container is too new") can branch on this instead of matching every
/// variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// A container, archive, manifest, or project is missing.
    NotFound,
    /// A manifest is unparsable or is missing a required key.
    InvalidFormat,
    /// The compatibility marker is newer than this library supports.
    VersionUnsupported,
    /// The compatibility marker is older than this library supports.
    VersionOutdated,
    /// The creation target already exists.
    AlreadyExists,
    /// A project identifier is required because several projects exist.
    AmbiguousProject,
    /// An underlying filesystem or compression failure.
    IoFailure,
}

/// Errors that can occur while loading, creating, or archiving containers.
#[derive(Debug, Error)]
pub enum ContainerError {
    /// The container directory does not exist.
    #[error("resource container does not exist: {}", .0.display())]
    ContainerNotFound(PathBuf),

    /// The container path exists but is not a directory.
    #[error("not an open resource container: {}", .0.display())]
    NotADirectory(PathBuf),

    /// The archive file does not exist.
    #[error("missing resource container archive: {}", .0.display())]
    ArchiveNotFound(PathBuf),

    /// Neither a manifest nor a legacy package file exists in the container.
    #[error("not a resource container (no manifest found in {})", .0.display())]
    ManifestNotFound(PathBuf),

    /// No project matches the requested identifier.
    #[error("project not found: {0}")]
    ProjectNotFound(String),

    /// A metadata file exists but could not be parsed.
    #[error("invalid format in {}: {reason}", .path.display())]
    InvalidFormat { path: PathBuf, reason: String },

    /// A required manifest key is missing.
    #[error("missing required key: {0}")]
    MissingField(String),

    /// The container is newer than the supported specification.
    #[error("unsupported resource container version. Found {found} but expected {supported}")]
    VersionUnsupported { found: String, supported: String },

    /// The container is older than the supported specification.
    #[error("outdated resource container version. Found {found} but expected {supported}")]
    VersionOutdated { found: String, supported: String },

    /// The creation target already exists.
    #[error("resource container already exists: {}", .0.display())]
    AlreadyExists(PathBuf),

    /// Several projects exist and no identifier was given.
    #[error("multiple projects found ({count}); a project identifier is required")]
    AmbiguousProject { count: usize },

    /// Failed to read a file or directory.
    #[error("failed to read {}: {source}", .path.display())]
    ReadFailed {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Failed to write a file.
    #[error("failed to write {}: {source}", .path.display())]
    WriteFailed {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Failed to create a directory.
    #[error("failed to create directory {}: {source}", .path.display())]
    CreateDirFailed {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Packing or compressing an archive failed.
    #[error("failed to archive {}: {reason}", .path.display())]
    ArchiveFailed { path: PathBuf, reason: String },

    /// Decompressing or unpacking an archive failed.
    #[error("failed to extract {}: {reason}", .path.display())]
    ExtractionFailed { path: PathBuf, reason: String },

    /// The logging subscriber could not be installed.
    #[error("failed to initialize logging: {0}")]
    Logging(String),
}

impl ContainerError {
    /// Classify this error into one of the container error kinds.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::ContainerNotFound(_)
            | Self::NotADirectory(_)
            | Self::ArchiveNotFound(_)
            | Self::ManifestNotFound(_)
            | Self::ProjectNotFound(_) => ErrorKind::NotFound,
            Self::InvalidFormat { .. } | Self::MissingField(_) => ErrorKind::InvalidFormat,
            Self::VersionUnsupported { .. } => ErrorKind::VersionUnsupported,
            Self::VersionOutdated { .. } => ErrorKind::VersionOutdated,
            Self::AlreadyExists(_) => ErrorKind::AlreadyExists,
            Self::AmbiguousProject { .. } => ErrorKind::AmbiguousProject,
            Self::ReadFailed { .. }
            | Self::WriteFailed { .. }
            | Self::CreateDirFailed { .. }
            | Self::ArchiveFailed { .. }
            | Self::ExtractionFailed { .. }
            | Self::Logging(_) => ErrorKind::IoFailure,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn test_missing_field_display() {
        let err = ContainerError::MissingField("dublin_core.type".to_string());
        assert_eq!(err.to_string(), "missing required key: dublin_core.type");
        assert_eq!(err.kind(), ErrorKind::InvalidFormat);
    }

    #[test]
    fn test_version_errors_display() {
        let err = ContainerError::VersionUnsupported {
            found: "0.3".to_string(),
            supported: "0.2".to_string(),
        };
        assert!(err.to_string().contains("Found 0.3 but expected 0.2"));
        assert_eq!(err.kind(), ErrorKind::VersionUnsupported);

        let err = ContainerError::VersionOutdated {
            found: "0.1".to_string(),
            supported: "0.2".to_string(),
        };
        assert!(err.to_string().starts_with("outdated"));
        assert_eq!(err.kind(), ErrorKind::VersionOutdated);
    }

    #[test]
    fn test_not_found_kinds() {
        let path = PathBuf::from("/test/path");
        assert_eq!(
            ContainerError::ContainerNotFound(path.clone()).kind(),
            ErrorKind::NotFound
        );
        assert_eq!(
            ContainerError::ArchiveNotFound(path.clone()).kind(),
            ErrorKind::NotFound
        );
        assert_eq!(
            ContainerError::ManifestNotFound(path).kind(),
            ErrorKind::NotFound
        );
    }

    #[test]
    fn test_error_source_io() {
        let io_err = io::Error::new(io::ErrorKind::PermissionDenied, "denied");
        let err = ContainerError::WriteFailed {
            path: PathBuf::from("/test"),
            source: io_err,
        };
        assert!(err.source().is_some());
        assert_eq!(err.kind(), ErrorKind::IoFailure);
    }

    #[test]
    fn test_error_source_none() {
        let err = ContainerError::AmbiguousProject { count: 2 };
        assert!(err.source().is_none());
        assert!(err.to_string().contains("(2)"));
    }
}
