//! Container manifest model.
//!
//! A [`Manifest`] is a typed view over the metadata tree of a container. Two
//! on-disk shapes are supported through [`ManifestSource`]:
//!
//! - **Unified**: `manifest.yaml` with `dublin_core`, `checking` and
//!   `projects` groups. The compatibility marker is
//!   `dublin_core.conformsto` (e.g., `rc0.2`).
//! - **Legacy**: `package.json` describing a single project whose content
//!   lives under `content/`. The compatibility marker is the integer
//!   `package_version`.
//!
//! Loaded manifests are never validated for completeness; absent fields
//! read as empty values.

mod defaults;
mod source;
mod types;

pub use defaults::{create_defaults, default_manifest, validate, REQUIRED_FIELDS};
pub use source::ManifestSource;
pub use types::{Checking, Language, Project, ResourceInfo, Source};

use std::path::Path;

use serde_yaml::Value;

use crate::error::{ContainerError, ContainerResult};
use crate::naming::{CONFORMS_TO_PREFIX, LEGACY_CONTENT_DIR};
use crate::reader::TreeReader;

/// The metadata of a resource container.
#[derive(Debug, Clone, PartialEq)]
pub struct Manifest {
    source: ManifestSource,
}

impl Manifest {
    /// Wrap an already parsed manifest tree.
    pub fn new(source: ManifestSource) -> Self {
        Self { source }
    }

    /// Read the manifest of a container directory.
    pub fn read(directory: &Path) -> ContainerResult<Self> {
        ManifestSource::read(directory).map(Self::new)
    }

    /// The shape this manifest was read from.
    pub fn source(&self) -> &ManifestSource {
        &self.source
    }

    /// Whether this manifest came from a legacy `package.json`.
    pub fn is_legacy(&self) -> bool {
        self.source.is_legacy()
    }

    /// Navigate the raw manifest tree.
    pub fn reader(&self) -> TreeReader<'_> {
        TreeReader::new(self.source.value())
    }

    /// The raw manifest tree.
    pub fn value(&self) -> &Value {
        self.source.value()
    }

    /// The compatibility version this container conforms to, without the
    /// `rc` prefix (e.g., `0.2`).
    ///
    /// Returns `None` when the marker is absent. Legacy manifests carry a
    /// `package_version` instead; see [`Manifest::package_version`].
    pub fn conforms_to(&self) -> Option<String> {
        match &self.source {
            ManifestSource::Unified(_) => self
                .reader()
                .get("dublin_core")
                .get("conformsto")
                .as_string()
                .map(|marker| {
                    marker
                        .strip_prefix(CONFORMS_TO_PREFIX)
                        .map(str::to_string)
                        .unwrap_or(marker)
                }),
            ManifestSource::Legacy(_) => None,
        }
    }

    /// The `package_version` of a legacy manifest.
    pub fn package_version(&self) -> Option<i64> {
        match &self.source {
            ManifestSource::Legacy(_) => self.reader().get("package_version").as_i64(),
            ManifestSource::Unified(_) => None,
        }
    }

    /// The declared content MIME format (e.g., `text/usfm`).
    pub fn content_format(&self) -> String {
        let format = match &self.source {
            ManifestSource::Unified(_) => self.reader().get("dublin_core").get("format"),
            ManifestSource::Legacy(_) => self.reader().get("content_mime_type"),
        };
        format.string_or_empty()
    }

    /// The language of the container's content.
    pub fn language(&self) -> Language {
        match &self.source {
            ManifestSource::Unified(_) => {
                Language::from_reader(self.reader().get("dublin_core").get("language"))
            }
            ManifestSource::Legacy(_) => {
                let language = self.reader().get("language");
                Language {
                    identifier: language.get("slug").string_or_empty(),
                    title: language.get("name").string_or_empty(),
                    direction: language.get("direction").string_or_empty(),
                }
            }
        }
    }

    /// Publication information.
    pub fn resource_info(&self) -> ResourceInfo {
        match &self.source {
            ManifestSource::Unified(_) => {
                ResourceInfo::from_reader(self.reader().get("dublin_core"))
            }
            ManifestSource::Legacy(_) => {
                let root = self.reader();
                let resource = root.get("resource");
                let status = resource.get("status");
                ResourceInfo {
                    resource_type: resource.get("type").string_or_empty(),
                    conforms_to: root.get("package_version").string_or_empty(),
                    format: root.get("content_mime_type").string_or_empty(),
                    identifier: resource.get("slug").string_or_empty(),
                    title: resource.get("name").string_or_empty(),
                    language: self.language(),
                    rights: status.get("license").string_or_empty(),
                    issued: status.get("pub_date").string_or_empty(),
                    modified: root.get("modified_at").string_or_empty(),
                    version: status.get("version").string_or_empty(),
                    ..ResourceInfo::default()
                }
            }
        }
    }

    /// Checking status.
    pub fn checking(&self) -> Checking {
        match &self.source {
            ManifestSource::Unified(_) => Checking::from_reader(self.reader().get("checking")),
            ManifestSource::Legacy(_) => Checking {
                level: self
                    .reader()
                    .get("resource")
                    .get("status")
                    .get("checking_level")
                    .string_or_empty(),
                entities: Vec::new(),
            },
        }
    }

    /// All projects, in manifest order.
    pub fn projects(&self) -> Vec<Project> {
        match &self.source {
            ManifestSource::Unified(_) => self
                .reader()
                .get("projects")
                .iter()
                .map(Project::from_reader)
                .collect(),
            ManifestSource::Legacy(_) => {
                let project = self.reader().get("project");
                if project.is_absent() {
                    return Vec::new();
                }
                vec![Project {
                    identifier: project.get("slug").string_or_empty(),
                    title: project.get("name").string_or_empty(),
                    sort: project.get("sort").as_i64().unwrap_or(0),
                    path: LEGACY_CONTENT_DIR.to_string(),
                }]
            }
        }
    }

    /// Identifiers of all projects, in manifest order.
    pub fn project_ids(&self) -> Vec<String> {
        self.projects().into_iter().map(|p| p.identifier).collect()
    }

    /// Resolve a project.
    ///
    /// With an identifier, returns the matching project or `None`. Without
    /// one, returns the sole project, or `None` when there are no projects.
    ///
    /// # Errors
    ///
    /// Returns [`ContainerError::AmbiguousProject`] when no identifier is
    /// given and the container has more than one project.
    pub fn project(&self, identifier: Option<&str>) -> ContainerResult<Option<Project>> {
        let mut projects = self.projects();
        match identifier {
            Some(id) => Ok(projects.into_iter().find(|p| p.identifier == id)),
            None => match projects.len() {
                0 => Ok(None),
                1 => Ok(projects.pop()),
                count => Err(ContainerError::AmbiguousProject { count }),
            },
        }
    }
}
