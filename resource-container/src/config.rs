//! Configuration for the container factory.

use std::path::PathBuf;

use crate::naming::{ARCHIVE_EXTENSION, CONFORMS_TO, PACKAGE_VERSION};

/// Configuration for [`ContainerFactory`](crate::ContainerFactory).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FactoryConfig {
    /// Container specification version accepted by strict loads and written
    /// into new manifests (without the `rc` prefix).
    pub conforms_to: String,

    /// `package_version` accepted for legacy containers.
    pub legacy_package_version: i64,

    /// Extension of closed container archives.
    pub archive_extension: String,

    /// Directory for temporary tar files.
    ///
    /// When `None`, temporaries are created beside the archive.
    pub staging_dir: Option<PathBuf>,
}

impl Default for FactoryConfig {
    fn default() -> Self {
        Self {
            conforms_to: CONFORMS_TO.to_string(),
            legacy_package_version: PACKAGE_VERSION,
            archive_extension: ARCHIVE_EXTENSION.to_string(),
            staging_dir: None,
        }
    }
}

impl FactoryConfig {
    /// Create a configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the supported container specification version.
    pub fn with_conforms_to(mut self, version: impl Into<String>) -> Self {
        self.conforms_to = version.into();
        self
    }

    /// Set the supported legacy `package_version`.
    pub fn with_legacy_package_version(mut self, version: i64) -> Self {
        self.legacy_package_version = version;
        self
    }

    /// Set the archive extension (without the leading dot).
    pub fn with_archive_extension(mut self, extension: impl Into<String>) -> Self {
        self.archive_extension = extension.into().trim_start_matches('.').to_string();
        self
    }

    /// Set the staging directory for temporary files.
    pub fn with_staging_dir(mut self, path: PathBuf) -> Self {
        self.staging_dir = Some(path);
        self
    }
}
