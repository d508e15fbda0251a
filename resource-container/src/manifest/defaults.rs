//! Default manifest skeleton and validation for newly created containers.

use serde_yaml::{Mapping, Sequence, Value};
use tracing::debug;

use crate::error::{ContainerError, ContainerResult};
use crate::naming;
use crate::reader::TreeReader;

/// `dublin_core` keys a caller must provide when creating a container, in
/// the order they are checked.
pub const REQUIRED_FIELDS: [&str; 5] = ["type", "format", "identifier", "language", "rights"];

fn text(s: &str) -> Value {
    Value::String(s.to_string())
}

fn list() -> Value {
    Value::Sequence(Sequence::new())
}

fn map() -> Value {
    Value::Mapping(Mapping::new())
}

/// The `dublin_core` group with every key present and empty.
fn default_dublin_core(conforms_to: &str) -> Mapping {
    let mut dc = Mapping::new();
    dc.insert(text("type"), text(""));
    dc.insert(text("conformsto"), text(&naming::conforms_to_marker(conforms_to)));
    dc.insert(text("format"), text(""));
    dc.insert(text("identifier"), text(""));
    dc.insert(text("title"), text(""));
    dc.insert(text("subject"), text(""));
    dc.insert(text("description"), text(""));
    dc.insert(text("language"), map());
    dc.insert(text("source"), list());
    dc.insert(text("rights"), text(""));
    dc.insert(text("creator"), text(""));
    dc.insert(text("contributor"), list());
    dc.insert(text("relation"), list());
    dc.insert(text("publisher"), text(""));
    dc.insert(text("issued"), text(""));
    dc.insert(text("modified"), text(""));
    dc.insert(text("version"), text(""));
    dc
}

fn default_checking() -> Mapping {
    let mut checking = Mapping::new();
    checking.insert(text("checking_entity"), list());
    checking.insert(text("checking_level"), text(""));
    checking
}

/// An empty manifest conforming to `conforms_to`.
pub fn default_manifest(conforms_to: &str) -> Value {
    assemble(default_dublin_core(conforms_to), default_checking(), Sequence::new())
}

fn assemble(dublin_core: Mapping, checking: Mapping, projects: Sequence) -> Value {
    let mut manifest = Mapping::new();
    manifest.insert(text("dublin_core"), Value::Mapping(dublin_core));
    manifest.insert(text("checking"), Value::Mapping(checking));
    manifest.insert(text("projects"), Value::Sequence(projects));
    Value::Mapping(manifest)
}

/// Check that `partial` carries every required `dublin_core` key.
///
/// # Errors
///
/// Returns [`ContainerError::MissingField`] naming the first missing key
/// (e.g., `dublin_core.format`).
pub fn validate(partial: &Value) -> ContainerResult<()> {
    let dc = TreeReader::new(partial).get("dublin_core");
    match REQUIRED_FIELDS.iter().find(|key| dc.get(**key).is_absent()) {
        Some(key) => Err(ContainerError::MissingField(format!("dublin_core.{}", key))),
        None => Ok(()),
    }
}

/// Build a complete manifest from caller-supplied values.
///
/// The caller's `dublin_core` and `checking` entries override the defaults
/// key by key; caller `projects` are appended. Other top-level keys are
/// ignored.
///
/// # Errors
///
/// Returns [`ContainerError::MissingField`] if a required key is missing.
pub fn create_defaults(partial: &Value, conforms_to: &str) -> ContainerResult<Value> {
    validate(partial)?;

    let reader = TreeReader::new(partial);

    let mut dublin_core = default_dublin_core(conforms_to);
    merge_into(&mut dublin_core, reader.get("dublin_core"));

    let mut checking = default_checking();
    merge_into(&mut checking, reader.get("checking"));

    let mut projects = Sequence::new();
    if let Some(Value::Sequence(seq)) = reader.get("projects").value() {
        projects.extend(seq.iter().cloned());
    }

    debug!(
        identifier = %reader.get("dublin_core").get("identifier").string_or_empty(),
        projects = projects.len(),
        "Built manifest from defaults"
    );

    Ok(assemble(dublin_core, checking, projects))
}

fn merge_into(target: &mut Mapping, overrides: TreeReader<'_>) {
    if let Some(Value::Mapping(map)) = overrides.value() {
        for (key, value) in map {
            target.insert(key.clone(), value.clone());
        }
    }
}
