//! An opened resource container and its addressed content.
//!
//! Content is addressed as `<project path>/<chapter>/<chunk>.<ext>`, where
//! `<ext>` comes from the manifest's declared content format. Every call
//! touches the filesystem; nothing is cached.

use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};

use serde_yaml::Value;
use tracing::{debug, warn};

use crate::error::{ContainerError, ContainerResult};
use crate::manifest::{Language, Manifest, Project};
use crate::naming::{self, CONFIG_FILENAME, TOC_FILENAME};

/// A resource container in its expanded (directory) form.
///
/// Created by [`ContainerFactory::load`](crate::ContainerFactory::load),
/// [`ContainerFactory::create`](crate::ContainerFactory::create), or
/// [`ContainerFactory::open`](crate::ContainerFactory::open).
#[derive(Debug, Clone)]
pub struct Container {
    path: PathBuf,
    manifest: Option<Manifest>,
}

impl Container {
    pub(crate) fn new(path: PathBuf, manifest: Option<Manifest>) -> Self {
        Self { path, manifest }
    }

    /// Directory of the container.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The container manifest.
    ///
    /// Only `None` for containers loaded in non-strict mode whose manifest
    /// was missing or unreadable.
    pub fn manifest(&self) -> Option<&Manifest> {
        self.manifest.as_ref()
    }

    /// The compatibility version the container conforms to (e.g., `0.2`).
    pub fn conforms_to(&self) -> Option<String> {
        self.manifest.as_ref().and_then(Manifest::conforms_to)
    }

    /// The content language.
    pub fn language(&self) -> Option<Language> {
        self.manifest.as_ref().map(Manifest::language)
    }

    /// Identifiers of all projects.
    pub fn project_ids(&self) -> Vec<String> {
        self.manifest
            .as_ref()
            .map(Manifest::project_ids)
            .unwrap_or_default()
    }

    /// Resolve a project by identifier, or the sole project when `None`.
    ///
    /// # Errors
    ///
    /// Returns [`ContainerError::AmbiguousProject`] when no identifier is
    /// given and there are several projects.
    pub fn project(&self, identifier: Option<&str>) -> ContainerResult<Option<Project>> {
        match &self.manifest {
            Some(manifest) => manifest.project(identifier),
            None => Ok(None),
        }
    }

    /// The container slug, `{language}_{project}_{resource}`.
    ///
    /// # Errors
    ///
    /// Fails when there is no manifest, the project is ambiguous, or any
    /// slug part is empty.
    pub fn slug(&self) -> ContainerResult<String> {
        let manifest = self
            .manifest
            .as_ref()
            .ok_or_else(|| ContainerError::ManifestNotFound(self.path.clone()))?;
        let project = manifest.project(None)?.unwrap_or_default();
        naming::make_slug(
            &manifest.language().identifier,
            &project.identifier,
            &manifest.resource_info().identifier,
        )
    }

    /// Extension of chunk files in this container.
    pub fn chunk_extension(&self) -> &'static str {
        let format = self
            .manifest
            .as_ref()
            .map(Manifest::content_format)
            .unwrap_or_default();
        naming::chunk_extension(&format)
    }

    /// Content directory of a project, or `None` if the project does not
    /// exist or its `path` points outside the container.
    fn content_dir(&self, project: Option<&str>) -> ContainerResult<Option<PathBuf>> {
        let Some(project) = self.project(project)? else {
            return Ok(None);
        };
        match relative_content_path(&project.path) {
            Some(relative) => Ok(Some(self.path.join(relative))),
            None => {
                warn!(
                    container = %self.path.display(),
                    project = %project.identifier,
                    path = %project.path,
                    "Ignoring project path outside the container"
                );
                Ok(None)
            }
        }
    }

    /// Chapter identifiers of a project, sorted.
    ///
    /// Empty when the project or its content directory does not exist.
    pub fn chapters(&self, project: Option<&str>) -> ContainerResult<Vec<String>> {
        let Some(dir) = self.content_dir(project)? else {
            return Ok(Vec::new());
        };
        list_entries(&dir, |path| path.is_dir(), file_name)
    }

    /// Chunk identifiers within a chapter, sorted.
    ///
    /// Chunk identifiers are file names without their extension. Empty when
    /// the project or chapter does not exist.
    pub fn chunks(&self, project: Option<&str>, chapter: &str) -> ContainerResult<Vec<String>> {
        let Some(dir) = self.content_dir(project)? else {
            return Ok(Vec::new());
        };
        let mut chunks = list_entries(&dir.join(chapter), |path| path.is_file(), file_stem)?;
        chunks.dedup();
        Ok(chunks)
    }

    /// Text of a chunk, or an empty string when it does not exist.
    pub fn read_chunk(
        &self,
        project: Option<&str>,
        chapter: &str,
        chunk: &str,
    ) -> ContainerResult<String> {
        let Some(dir) = self.content_dir(project)? else {
            return Ok(String::new());
        };
        let path = self.chunk_path(&dir, chapter, chunk);

        match fs::read_to_string(&path) {
            Ok(text) => Ok(text),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(String::new()),
            Err(e) => Err(ContainerError::ReadFailed { path, source: e }),
        }
    }

    /// Write the text of a chunk, creating the chapter directory as needed.
    ///
    /// # Errors
    ///
    /// - [`ContainerError::ProjectNotFound`] if no project can be resolved
    /// - [`ContainerError::CreateDirFailed`] / [`ContainerError::WriteFailed`]
    ///   on filesystem failure
    pub fn write_chunk(
        &self,
        project: Option<&str>,
        chapter: &str,
        chunk: &str,
        content: &str,
    ) -> ContainerResult<()> {
        let dir = self.content_dir(project)?.ok_or_else(|| {
            ContainerError::ProjectNotFound(project.unwrap_or("<default>").to_string())
        })?;

        let chapter_dir = dir.join(chapter);
        fs::create_dir_all(&chapter_dir).map_err(|e| ContainerError::CreateDirFailed {
            path: chapter_dir.clone(),
            source: e,
        })?;

        let path = self.chunk_path(&dir, chapter, chunk);
        fs::write(&path, content).map_err(|e| ContainerError::WriteFailed {
            path: path.clone(),
            source: e,
        })?;

        debug!(path = %path.display(), bytes = content.len(), "Wrote chunk");
        Ok(())
    }

    /// Table of contents of a project (`toc.yml`).
    ///
    /// Returns [`Value::Null`] when the project or file does not exist or
    /// the file cannot be parsed.
    pub fn toc(&self, project: Option<&str>) -> ContainerResult<Value> {
        self.read_content_yaml(project, TOC_FILENAME)
    }

    /// Configuration of a project (`config.yml`).
    ///
    /// Returns [`Value::Null`] when the project or file does not exist or
    /// the file cannot be parsed.
    pub fn config(&self, project: Option<&str>) -> ContainerResult<Value> {
        self.read_content_yaml(project, CONFIG_FILENAME)
    }

    fn read_content_yaml(&self, project: Option<&str>, filename: &str) -> ContainerResult<Value> {
        let Some(dir) = self.content_dir(project)? else {
            return Ok(Value::Null);
        };
        let path = dir.join(filename);

        let contents = match fs::read_to_string(&path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Value::Null),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Failed to read content metadata");
                return Ok(Value::Null);
            }
        };

        match serde_yaml::from_str(&contents) {
            Ok(value) => Ok(value),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Ignoring malformed content metadata");
                Ok(Value::Null)
            }
        }
    }

    fn chunk_path(&self, content_dir: &Path, chapter: &str, chunk: &str) -> PathBuf {
        content_dir
            .join(chapter)
            .join(format!("{}.{}", chunk, self.chunk_extension()))
    }
}

/// Project content path relative to the container root.
///
/// A leading `./` is dropped; an empty path is the container root.
/// A project `path` relative to the container root, or `None` if it is
/// absolute or climbs out with `..`.
fn relative_content_path(path: &str) -> Option<&str> {
    let trimmed = path.trim();
    let trimmed = trimmed.strip_prefix("./").unwrap_or(trimmed);
    let inside = Path::new(trimmed)
        .components()
        .all(|c| matches!(c, Component::Normal(_) | Component::CurDir));
    if !inside {
        return None;
    }
    Some(if trimmed == "." { "" } else { trimmed })
}

fn file_name(path: &Path) -> Option<String> {
    path.file_name().map(|n| n.to_string_lossy().into_owned())
}

fn file_stem(path: &Path) -> Option<String> {
    path.file_stem().map(|n| n.to_string_lossy().into_owned())
}

/// Sorted names of the entries in `dir` accepted by `keep`.
///
/// A missing directory yields an empty list.
fn list_entries(
    dir: &Path,
    keep: impl Fn(&Path) -> bool,
    name: impl Fn(&Path) -> Option<String>,
) -> ContainerResult<Vec<String>> {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) if !dir.is_dir() => {
            debug!(path = %dir.display(), error = %e, "Not a directory");
            return Ok(Vec::new());
        }
        Err(e) => {
            return Err(ContainerError::ReadFailed {
                path: dir.to_path_buf(),
                source: e,
            })
        }
    };

    let mut names = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| ContainerError::ReadFailed {
            path: dir.to_path_buf(),
            source: e,
        })?;
        let path = entry.path();
        if keep(&path) {
            if let Some(name) = name(&path) {
                names.push(name);
            }
        }
    }
    names.sort();
    Ok(names)
}
