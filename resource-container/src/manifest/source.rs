//! Locating and parsing the manifest file of a container directory.

use std::fs;
use std::path::{Path, PathBuf};

use serde_yaml::Value;
use tracing::debug;

use crate::error::{ContainerError, ContainerResult};
use crate::naming::{LEGACY_PACKAGE_FILENAME, MANIFEST_FILENAME};

/// The parsed manifest tree, tagged by the file shape it was read from.
#[derive(Debug, Clone, PartialEq)]
pub enum ManifestSource {
    /// `manifest.yaml` with `dublin_core`, `checking` and `projects` groups.
    Unified(Value),
    /// `package.json` of a legacy single-project container.
    Legacy(Value),
}

impl ManifestSource {
    /// Find the manifest file in `directory`.
    ///
    /// `manifest.yaml` is preferred when both files are present.
    pub fn locate(directory: &Path) -> Option<PathBuf> {
        [MANIFEST_FILENAME, LEGACY_PACKAGE_FILENAME]
            .iter()
            .map(|name| directory.join(name))
            .find(|path| path.is_file())
    }

    /// Read and parse the manifest of `directory`.
    ///
    /// # Errors
    ///
    /// - [`ContainerError::ManifestNotFound`] if neither manifest file exists
    /// - [`ContainerError::ReadFailed`] if the file cannot be read
    /// - [`ContainerError::InvalidFormat`] if the file cannot be parsed
    pub fn read(directory: &Path) -> ContainerResult<Self> {
        let path = Self::locate(directory)
            .ok_or_else(|| ContainerError::ManifestNotFound(directory.to_path_buf()))?;

        let contents = fs::read_to_string(&path).map_err(|e| ContainerError::ReadFailed {
            path: path.clone(),
            source: e,
        })?;

        let legacy = path
            .file_name()
            .is_some_and(|name| name == LEGACY_PACKAGE_FILENAME);

        let source = if legacy {
            Self::parse_legacy(&contents, &path)?
        } else {
            Self::parse_unified(&contents, &path)?
        };

        debug!(path = %path.display(), legacy, "Read manifest");
        Ok(source)
    }

    /// Parse `manifest.yaml` contents.
    pub fn parse_unified(contents: &str, path: &Path) -> ContainerResult<Self> {
        let value: Value =
            serde_yaml::from_str(contents).map_err(|e| ContainerError::InvalidFormat {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })?;
        Ok(Self::Unified(value))
    }

    /// Parse `package.json` contents.
    pub fn parse_legacy(contents: &str, path: &Path) -> ContainerResult<Self> {
        let invalid = |reason: String| ContainerError::InvalidFormat {
            path: path.to_path_buf(),
            reason,
        };
        let json: serde_json::Value =
            serde_json::from_str(contents).map_err(|e| invalid(e.to_string()))?;
        let value = serde_yaml::to_value(json).map_err(|e| invalid(e.to_string()))?;
        Ok(Self::Legacy(value))
    }

    /// The raw manifest tree.
    pub fn value(&self) -> &Value {
        match self {
            Self::Unified(value) | Self::Legacy(value) => value,
        }
    }

    /// Whether this manifest came from a legacy `package.json`.
    pub fn is_legacy(&self) -> bool {
        matches!(self, Self::Legacy(_))
    }

    /// Name of the file this shape is stored in.
    pub fn filename(&self) -> &'static str {
        match self {
            Self::Unified(_) => MANIFEST_FILENAME,
            Self::Legacy(_) => LEGACY_PACKAGE_FILENAME,
        }
    }
}
