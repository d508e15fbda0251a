//! Container lifecycle: load, create, open, close and inspect.
//!
//! ```text
//!            create                     close
//!   partial ───────▶ directory ───────────────▶ <directory>.tsrc
//!                       ▲   │                        │
//!                  load │   └──────── open ◀─────────┘
//! ```
//!
//! Strict loads gate on the manifest's compatibility marker: newer
//! containers are rejected as unsupported and older ones as outdated.

use std::fs;
use std::path::{Path, PathBuf};

use serde_yaml::Value;
use tracing::{debug, info, warn};

use crate::archive::{self, ArchiveProgressCallback, ClosedArchive};
use crate::config::FactoryConfig;
use crate::container::Container;
use crate::error::{ContainerError, ContainerResult};
use crate::manifest::{self, Manifest, ManifestSource};
use crate::naming::{self, MANIFEST_FILENAME};
use crate::semver;

/// Loads, creates, opens and closes resource containers.
#[derive(Debug, Clone, Default)]
pub struct ContainerFactory {
    config: FactoryConfig,
}

impl ContainerFactory {
    /// Create a factory with the given configuration.
    pub fn new(config: FactoryConfig) -> Self {
        Self { config }
    }

    /// The factory configuration.
    pub fn config(&self) -> &FactoryConfig {
        &self.config
    }

    /// Path of the archive `close` writes for `directory`.
    pub fn archive_path(&self, directory: &Path) -> PathBuf {
        naming::archive_path(&absolute(directory), &self.config.archive_extension)
    }

    /// Load a container from its directory.
    ///
    /// In strict mode the directory must exist and hold a manifest whose
    /// compatibility marker matches the supported version. In non-strict
    /// mode nothing is checked: a missing directory or unreadable manifest
    /// yields a container without a manifest.
    ///
    /// # Errors (strict mode)
    ///
    /// - [`ContainerError::ContainerNotFound`] if the directory does not exist
    /// - [`ContainerError::NotADirectory`] if the path is a file
    /// - [`ContainerError::ManifestNotFound`] / [`ContainerError::InvalidFormat`]
    ///   if the manifest is missing or unparsable
    /// - [`ContainerError::MissingField`] if the compatibility marker is absent
    /// - [`ContainerError::VersionUnsupported`] / [`ContainerError::VersionOutdated`]
    pub fn load(&self, directory: &Path, strict: bool) -> ContainerResult<Container> {
        let path = absolute(directory);

        if !strict {
            return Ok(self.load_lenient(path));
        }

        if !path.exists() {
            return Err(ContainerError::ContainerNotFound(path));
        }
        if !path.is_dir() {
            return Err(ContainerError::NotADirectory(path));
        }

        let manifest = Manifest::read(&path)?;
        self.check_compatibility(&manifest)?;

        info!(path = %path.display(), "Loaded resource container");
        Ok(Container::new(path, Some(manifest)))
    }

    fn load_lenient(&self, path: PathBuf) -> Container {
        if !path.is_dir() {
            debug!(path = %path.display(), "Container directory missing, loading without manifest");
            return Container::new(path, None);
        }

        match Manifest::read(&path) {
            Ok(manifest) => Container::new(path, Some(manifest)),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Loading container without manifest");
                Container::new(path, None)
            }
        }
    }

    /// Reject manifests whose compatibility marker differs from the
    /// supported version.
    fn check_compatibility(&self, manifest: &Manifest) -> ContainerResult<()> {
        match manifest.source() {
            ManifestSource::Unified(_) => {
                let found = manifest.conforms_to().ok_or_else(|| {
                    ContainerError::MissingField("dublin_core.conformsto".to_string())
                })?;
                let supported = &self.config.conforms_to;

                if semver::gt(&found, supported) {
                    return Err(ContainerError::VersionUnsupported {
                        found,
                        supported: supported.clone(),
                    });
                }
                if semver::lt(&found, supported) {
                    return Err(ContainerError::VersionOutdated {
                        found,
                        supported: supported.clone(),
                    });
                }
            }
            ManifestSource::Legacy(_) => {
                let found = manifest
                    .package_version()
                    .ok_or_else(|| ContainerError::MissingField("package_version".to_string()))?;
                let supported = self.config.legacy_package_version;

                if found > supported {
                    return Err(ContainerError::VersionUnsupported {
                        found: found.to_string(),
                        supported: supported.to_string(),
                    });
                }
                if found < supported {
                    return Err(ContainerError::VersionOutdated {
                        found: found.to_string(),
                        supported: supported.to_string(),
                    });
                }
            }
        }
        Ok(())
    }

    /// Create a new container directory with a manifest built from `partial`.
    ///
    /// `partial` must provide `dublin_core.type`, `format`, `identifier`,
    /// `language` and `rights`; every other field is defaulted. Nothing is
    /// written if validation fails.
    ///
    /// # Errors
    ///
    /// - [`ContainerError::AlreadyExists`] if `directory` exists
    /// - [`ContainerError::MissingField`] naming the first missing field
    /// - [`ContainerError::CreateDirFailed`] / [`ContainerError::WriteFailed`]
    pub fn create(&self, directory: &Path, partial: &Value) -> ContainerResult<Container> {
        let path = absolute(directory);
        if path.exists() {
            return Err(ContainerError::AlreadyExists(path));
        }

        let manifest = manifest::create_defaults(partial, &self.config.conforms_to)?;
        let manifest_path = path.join(MANIFEST_FILENAME);
        let yaml = serde_yaml::to_string(&manifest).map_err(|e| ContainerError::InvalidFormat {
            path: manifest_path.clone(),
            reason: e.to_string(),
        })?;

        fs::create_dir_all(&path).map_err(|e| ContainerError::CreateDirFailed {
            path: path.clone(),
            source: e,
        })?;
        let cleanup = scopeguard::guard(path.clone(), |dir| {
            if let Err(e) = fs::remove_dir_all(&dir) {
                warn!(path = %dir.display(), error = %e, "Failed to remove partial container");
            }
        });

        fs::write(&manifest_path, yaml).map_err(|e| ContainerError::WriteFailed {
            path: manifest_path.clone(),
            source: e,
        })?;
        let manifest = Manifest::read(&path)?;

        scopeguard::ScopeGuard::into_inner(cleanup);
        info!(path = %path.display(), "Created resource container");
        Ok(Container::new(path, Some(manifest)))
    }

    /// Close a container directory into `<directory>.<extension>`.
    ///
    /// The directory is left in place.
    pub fn close(&self, directory: &Path) -> ContainerResult<ClosedArchive> {
        self.close_with_progress(directory, None)
    }

    /// Close a container directory, reporting progress.
    pub fn close_with_progress(
        &self,
        directory: &Path,
        on_progress: Option<&ArchiveProgressCallback>,
    ) -> ContainerResult<ClosedArchive> {
        let source = absolute(directory);
        let archive_path = self.archive_path(&source);
        archive::pack(
            &source,
            &archive_path,
            self.config.staging_dir.as_deref(),
            on_progress,
        )
    }

    /// Open an archive into `target` and strictly load it.
    pub fn open(&self, archive_path: &Path, target: &Path) -> ContainerResult<Container> {
        self.open_with_progress(archive_path, target, None)
    }

    /// Open an archive into `target`, reporting progress.
    pub fn open_with_progress(
        &self,
        archive_path: &Path,
        target: &Path,
        on_progress: Option<&ArchiveProgressCallback>,
    ) -> ContainerResult<Container> {
        archive::unpack(
            archive_path,
            target,
            self.config.staging_dir.as_deref(),
            on_progress,
        )?;
        self.load(target, true)
    }

    /// Read the manifest of a container without leaving it opened.
    ///
    /// Directories are strictly loaded. Archives are opened into a temporary
    /// directory that is removed before returning.
    ///
    /// # Errors
    ///
    /// Returns [`ContainerError::InvalidFormat`] for a file whose extension
    /// is not the archive extension, plus any error of
    /// [`load`](Self::load) or [`open`](Self::open).
    pub fn inspect(&self, path: &Path) -> ContainerResult<Manifest> {
        let path = absolute(path);

        if path.is_dir() {
            let container = self.load(&path, true)?;
            return container
                .manifest()
                .cloned()
                .ok_or(ContainerError::ManifestNotFound(path));
        }

        let is_archive = path
            .extension()
            .is_some_and(|ext| ext == self.config.archive_extension.as_str());

        if !path.exists() {
            return Err(if is_archive {
                ContainerError::ArchiveNotFound(path)
            } else {
                ContainerError::ContainerNotFound(path)
            });
        }
        if !is_archive {
            return Err(ContainerError::InvalidFormat {
                reason: format!("expected a .{} archive", self.config.archive_extension),
                path,
            });
        }

        let staging = match &self.config.staging_dir {
            Some(dir) => dir.clone(),
            None => std::env::temp_dir(),
        };
        let scratch = tempfile::Builder::new()
            .prefix(".rc-inspect-")
            .tempdir_in(&staging)
            .map_err(|e| ContainerError::CreateDirFailed {
                path: staging,
                source: e,
            })?;

        let target = scratch.path().join("container");
        let container = self.open(&path, &target)?;
        debug!(archive = %path.display(), "Inspected resource container archive");

        container
            .manifest()
            .cloned()
            .ok_or(ContainerError::ManifestNotFound(target))
    }
}

/// Absolute form of `path`, without resolving symlinks.
fn absolute(path: &Path) -> PathBuf {
    if path.is_absolute() {
        return path.to_path_buf();
    }
    match std::env::current_dir() {
        Ok(cwd) => cwd.join(path),
        Err(_) => path.to_path_buf(),
    }
}

/// Load a container with the default configuration.
pub fn load(directory: &Path, strict: bool) -> ContainerResult<Container> {
    ContainerFactory::default().load(directory, strict)
}

/// Create a container with the default configuration.
pub fn create(directory: &Path, partial: &Value) -> ContainerResult<Container> {
    ContainerFactory::default().create(directory, partial)
}

/// Open an archive with the default configuration.
pub fn open(archive_path: &Path, target: &Path) -> ContainerResult<Container> {
    ContainerFactory::default().open(archive_path, target)
}

/// Close a container directory with the default configuration.
pub fn close(directory: &Path) -> ContainerResult<ClosedArchive> {
    ContainerFactory::default().close(directory)
}

/// Inspect a container directory or archive with the default configuration.
pub fn inspect(path: &Path) -> ContainerResult<Manifest> {
    ContainerFactory::default().inspect(path)
}
