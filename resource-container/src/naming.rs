//! Centralized container naming conventions.
//!
//! This module is the single source of truth for resource container naming:
//! - Archive filenames (e.g., `en_tit_ulb.tsrc`)
//! - Metadata filenames (`manifest.yaml`, `package.json`, `toc.yml`, `config.yml`)
//! - Chunk file extensions derived from the declared content format
//! - Container slugs and MIME types
//!
//! All other modules should use these functions rather than constructing names directly.

use std::path::{Path, PathBuf};

use crate::error::{ContainerError, ContainerResult};

/// File extension of a closed (archived) container.
pub const ARCHIVE_EXTENSION: &str = "tsrc";

/// Manifest file at the root of a container.
pub const MANIFEST_FILENAME: &str = "manifest.yaml";

/// Manifest file of a legacy container.
pub const LEGACY_PACKAGE_FILENAME: &str = "package.json";

/// Content directory of a legacy container's single project.
pub const LEGACY_CONTENT_DIR: &str = "content";

/// Table of contents file inside a project's content path.
pub const TOC_FILENAME: &str = "toc.yml";

/// Per-project configuration file inside a project's content path.
pub const CONFIG_FILENAME: &str = "config.yml";

/// Base MIME type of a container.
pub const BASE_MIME_TYPE: &str = "application/tsrc";

/// Container specification version this library reads and writes.
pub const CONFORMS_TO: &str = "0.2";

/// Legacy `package_version` this library reads.
pub const PACKAGE_VERSION: i64 = 7;

/// Prefix written in front of the version in `dublin_core.conformsto`.
pub const CONFORMS_TO_PREFIX: &str = "rc";

/// Path of the closed archive for a container directory.
///
/// The extension is appended to the full directory name, so a directory with
/// dots in its name keeps them.
///
/// # Examples
///
/// ```
/// use std::path::Path;
/// use resource_container::naming::archive_path;
///
/// assert_eq!(
///     archive_path(Path::new("/data/en_tit_ulb"), "tsrc"),
///     Path::new("/data/en_tit_ulb.tsrc")
/// );
/// assert_eq!(
///     archive_path(Path::new("/data/v1.2"), "tsrc"),
///     Path::new("/data/v1.2.tsrc")
/// );
/// ```
pub fn archive_path(directory: &Path, extension: &str) -> PathBuf {
    let mut name = directory
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".");
    name.push(extension);
    directory.with_file_name(name)
}

/// File extension of chunk files for a declared content format.
///
/// # Examples
///
/// ```
/// use resource_container::naming::chunk_extension;
///
/// assert_eq!(chunk_extension("text/usfm"), "usfm");
/// assert_eq!(chunk_extension("text/markdown"), "md");
/// assert_eq!(chunk_extension("application/pdf"), "txt");
/// ```
pub fn chunk_extension(format: &str) -> &'static str {
    match format.trim() {
        "text/usx" => "usx",
        "text/usfm" => "usfm",
        "text/markdown" => "md",
        _ => "txt",
    }
}

/// Build a container slug from its language, project, and resource identifiers.
///
/// # Format
///
/// `{language}_{project}_{resource}`
///
/// # Errors
///
/// Returns [`ContainerError::MissingField`] naming the first empty part.
///
/// # Examples
///
/// ```
/// use resource_container::naming::make_slug;
///
/// assert_eq!(make_slug("en", "gen", "ulb").unwrap(), "en_gen_ulb");
/// assert!(make_slug("en", "", "ulb").is_err());
/// ```
pub fn make_slug(language: &str, project: &str, resource: &str) -> ContainerResult<String> {
    for (name, part) in [
        ("language", language),
        ("project", project),
        ("resource", resource),
    ] {
        if part.trim().is_empty() {
            return Err(ContainerError::MissingField(format!("slug {}", name)));
        }
    }
    Ok(format!("{}_{}_{}", language, project, resource))
}

/// MIME type of a container holding the given resource type.
///
/// # Examples
///
/// ```
/// use resource_container::naming::type_to_mime;
///
/// assert_eq!(type_to_mime("book"), "application/tsrc+book");
/// ```
pub fn type_to_mime(resource_type: &str) -> String {
    format!("{}+{}", BASE_MIME_TYPE, resource_type)
}

/// Resource type encoded in a container MIME type.
///
/// Returns `None` when the MIME type carries no `+type` suffix.
pub fn mime_to_type(mime: &str) -> Option<&str> {
    mime.split_once('+')
        .map(|(_, resource_type)| resource_type)
        .filter(|t| !t.is_empty())
}

/// Compatibility marker written into a new manifest (e.g. `rc0.2`).
pub fn conforms_to_marker(version: &str) -> String {
    format!("{}{}", CONFORMS_TO_PREFIX, version)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_archive_path_appends_extension() {
        assert_eq!(
            archive_path(Path::new("/tmp/en_me"), "tsrc"),
            PathBuf::from("/tmp/en_me.tsrc")
        );
        assert_eq!(
            archive_path(Path::new("relative/dir"), "zip"),
            PathBuf::from("relative/dir.zip")
        );
    }

    #[test]
    fn test_archive_path_keeps_dots() {
        assert_eq!(
            archive_path(Path::new("/tmp/my.container"), ARCHIVE_EXTENSION),
            PathBuf::from("/tmp/my.container.tsrc")
        );
    }

    #[test]
    fn test_chunk_extension() {
        assert_eq!(chunk_extension("text/usx"), "usx");
        assert_eq!(chunk_extension("text/usfm"), "usfm");
        assert_eq!(chunk_extension("text/markdown"), "md");
        assert_eq!(chunk_extension(""), "txt");
        assert_eq!(chunk_extension("text/plain"), "txt");
    }

    #[test]
    fn test_make_slug() {
        assert_eq!(make_slug("en", "tit", "ulb").unwrap(), "en_tit_ulb");
    }

    #[test]
    fn test_make_slug_rejects_empty_parts() {
        let err = make_slug("", "tit", "ulb").unwrap_err();
        assert_eq!(err.to_string(), "missing required key: slug language");

        let err = make_slug("en", "tit", "  ").unwrap_err();
        assert_eq!(err.to_string(), "missing required key: slug resource");
    }

    #[test]
    fn test_mime_round_trip() {
        let mime = type_to_mime("help");
        assert_eq!(mime, "application/tsrc+help");
        assert_eq!(mime_to_type(&mime), Some("help"));
    }

    #[test]
    fn test_mime_to_type_without_suffix() {
        assert_eq!(mime_to_type("application/tsrc"), None);
        assert_eq!(mime_to_type("application/tsrc+"), None);
    }

    #[test]
    fn test_conforms_to_marker() {
        assert_eq!(conforms_to_marker(CONFORMS_TO), "rc0.2");
    }
}
