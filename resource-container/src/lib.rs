//! Resource Container - versioned packages of translatable content
//!
//! A resource container is a directory holding a manifest (`manifest.yaml`)
//! and the content of one or more projects, addressed as chapters and chunks.
//! Closed containers are single bzip2-compressed tar archives (`.tsrc`).
//!
//! # Lifecycle
//!
//! ```no_run
//! use std::path::Path;
//!
//! let partial: serde_yaml::Value = serde_yaml::from_str(r#"
//! dublin_core:
//!   type: book
//!   format: text/usfm
//!   identifier: en-me
//!   language: { identifier: en, title: English, direction: ltr }
//!   rights: CC BY-SA 4.0
//! projects:
//!   - { identifier: tit, title: Titus, sort: 56, path: ./content }
//! "#)?;
//!
//! let rc = resource_container::create(Path::new("/tmp/en-me"), &partial)?;
//! rc.write_chunk(None, "front", "title", "Titus")?;
//!
//! let closed = resource_container::close(rc.path())?;
//! let opened = resource_container::open(&closed.path, Path::new("/tmp/en-me-copy"))?;
//! assert_eq!(opened.read_chunk(None, "front", "title")?, "Titus");
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod archive;
pub mod config;
pub mod container;
pub mod error;
pub mod factory;
pub mod logging;
pub mod manifest;
pub mod naming;
pub mod reader;
pub mod semver;

pub use archive::{ArchiveProgressCallback, ArchiveStage, ClosedArchive};
pub use config::FactoryConfig;
pub use container::Container;
pub use error::{ContainerError, ContainerResult, ErrorKind};
pub use factory::{close, create, inspect, load, open, ContainerFactory};
pub use logging::{init_logging, LoggingConfig, LoggingGuard};
pub use manifest::{Checking, Language, Manifest, ManifestSource, Project, ResourceInfo};
pub use reader::{TreeKey, TreeReader};
