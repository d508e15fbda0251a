//! Typed views over manifest metadata.
//!
//! Every field is populated; values absent from the manifest become empty
//! strings, empty lists, or zero.

use crate::reader::TreeReader;

/// The language a container's content is written in.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Language {
    /// Language code (e.g., `en`).
    pub identifier: String,
    /// Human-readable language name.
    pub title: String,
    /// Text direction, `ltr` or `rtl`.
    pub direction: String,
}

impl Language {
    pub(crate) fn from_reader(reader: TreeReader<'_>) -> Self {
        Self {
            identifier: reader.get("identifier").string_or_empty(),
            title: reader.get("title").string_or_empty(),
            direction: reader.get("direction").string_or_empty(),
        }
    }
}

/// A resource this container was derived from.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Source {
    pub identifier: String,
    pub language: String,
    pub version: String,
}

/// Publication information (the `dublin_core` group).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResourceInfo {
    /// Resource type (`book`, `help`, `dict`, `man`, ...).
    pub resource_type: String,
    /// Raw compatibility marker as written (e.g., `rc0.2`).
    pub conforms_to: String,
    /// Content MIME format (e.g., `text/usfm`).
    pub format: String,
    /// Resource identifier (e.g., `ulb`).
    pub identifier: String,
    pub title: String,
    pub subject: String,
    pub description: String,
    pub language: Language,
    pub source: Vec<Source>,
    pub rights: String,
    pub creator: String,
    pub contributor: Vec<String>,
    pub relation: Vec<String>,
    pub publisher: String,
    pub issued: String,
    pub modified: String,
    pub version: String,
}

impl ResourceInfo {
    pub(crate) fn from_reader(dc: TreeReader<'_>) -> Self {
        Self {
            resource_type: dc.get("type").string_or_empty(),
            conforms_to: dc.get("conformsto").string_or_empty(),
            format: dc.get("format").string_or_empty(),
            identifier: dc.get("identifier").string_or_empty(),
            title: dc.get("title").string_or_empty(),
            subject: dc.get("subject").string_or_empty(),
            description: dc.get("description").string_or_empty(),
            language: Language::from_reader(dc.get("language")),
            source: dc
                .get("source")
                .iter()
                .map(|s| Source {
                    identifier: s.get("identifier").string_or_empty(),
                    language: s.get("language").string_or_empty(),
                    version: s.get("version").string_or_empty(),
                })
                .collect(),
            rights: dc.get("rights").string_or_empty(),
            creator: dc.get("creator").string_or_empty(),
            contributor: dc.get("contributor").string_list(),
            relation: dc.get("relation").string_list(),
            publisher: dc.get("publisher").string_or_empty(),
            issued: dc.get("issued").string_or_empty(),
            modified: dc.get("modified").string_or_empty(),
            version: dc.get("version").string_or_empty(),
        }
    }
}

/// Checking (quality review) status.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Checking {
    pub level: String,
    pub entities: Vec<String>,
}

impl Checking {
    pub(crate) fn from_reader(reader: TreeReader<'_>) -> Self {
        Self {
            level: reader.get("checking_level").string_or_empty(),
            entities: reader.get("checking_entity").string_list(),
        }
    }
}

/// A project within a container.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Project {
    /// Slug, unique within the container (e.g., `tit`).
    pub identifier: String,
    pub title: String,
    /// Sort order among the container's projects.
    pub sort: i64,
    /// Content path relative to the container root. Empty means the root.
    pub path: String,
}

impl Project {
    pub(crate) fn from_reader(reader: TreeReader<'_>) -> Self {
        Self {
            identifier: reader.get("identifier").string_or_empty(),
            title: reader.get("title").string_or_empty(),
            sort: reader.get("sort").as_i64().unwrap_or(0),
            path: reader.get("path").string_or_empty(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_yaml::Value;

    #[test]
    fn test_resource_info_fills_absent_fields() {
        let value: Value =
            serde_yaml::from_str("identifier: ulb\nlanguage:\n  identifier: en\n").unwrap();
        let info = ResourceInfo::from_reader(TreeReader::new(&value));

        assert_eq!(info.identifier, "ulb");
        assert_eq!(info.language.identifier, "en");
        assert_eq!(info.language.direction, "");
        assert_eq!(info.title, "");
        assert!(info.source.is_empty());
        assert!(info.contributor.is_empty());
    }

    #[test]
    fn test_resource_info_sources() {
        let yaml = "source:\n  - identifier: ulb\n    language: en\n    version: 3\n";
        let value: Value = serde_yaml::from_str(yaml).unwrap();
        let info = ResourceInfo::from_reader(TreeReader::new(&value));

        assert_eq!(
            info.source,
            vec![Source {
                identifier: "ulb".to_string(),
                language: "en".to_string(),
                version: "3".to_string(),
            }]
        );
    }

    #[test]
    fn test_checking_from_reader() {
        let yaml = "checking_entity: [Wycliffe Associates]\nchecking_level: '3'\n";
        let value: Value = serde_yaml::from_str(yaml).unwrap();
        let checking = Checking::from_reader(TreeReader::new(&value));

        assert_eq!(checking.level, "3");
        assert_eq!(checking.entities, vec!["Wycliffe Associates"]);
    }

    #[test]
    fn test_mistyped_fields_fall_back_to_empty() {
        let yaml = "checking_level: 3\nchecking_entity: Wycliffe Associates\nsort: [1]\n";
        let value: Value = serde_yaml::from_str(yaml).unwrap();

        let checking = Checking::from_reader(TreeReader::new(&value));
        assert_eq!(checking.level, "3");
        assert!(checking.entities.is_empty());

        let project = Project::from_reader(TreeReader::new(&value));
        assert_eq!(project.sort, 0);
    }

    #[test]
    fn test_project_from_absent_reader() {
        let project = Project::from_reader(TreeReader::absent());
        assert_eq!(project, Project::default());
    }

    #[test]
    fn test_project_sort_accepts_string() {
        let value: Value =
            serde_yaml::from_str("identifier: tit\nsort: '56'\npath: ./content\n").unwrap();
        let project = Project::from_reader(TreeReader::new(&value));
        assert_eq!(project.sort, 56);
        assert_eq!(project.path, "./content");
    }
}
