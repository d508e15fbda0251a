//! Safe navigation over untyped metadata trees.
//!
//! Container metadata (`manifest.yaml`, `package.json`, `toc.yml`,
//! `config.yml`) is authored by hand and is frequently incomplete or shaped
//! by an older tool. [`TreeReader`] wraps a borrowed [`Value`] and lets
//! callers walk arbitrarily deep paths without checking every level: a
//! missing key, an out-of-range index, or a type mismatch simply yields an
//! absent reader.
//!
//! # Example
//!
//! ```
//! use resource_container::TreeReader;
//!
//! let value: serde_yaml::Value = serde_yaml::from_str(
//!     "dublin_core:\n  language:\n    identifier: en\nprojects:\n  - identifier: tit\n",
//! ).unwrap();
//! let reader = TreeReader::new(&value);
//!
//! assert_eq!(reader.get("dublin_core").get("language").get("identifier").as_str(), Some("en"));
//! assert_eq!(reader.get("projects").get(0).get("identifier").as_str(), Some("tit"));
//! assert!(reader.get("projects").get(5).get("identifier").is_absent());
//! assert_eq!(reader.get("nothing").get("here").size(), 0);
//! ```

use serde_yaml::Value;

/// A key used to step into a map entry or sequence element.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TreeKey<'k> {
    /// A map key.
    Name(&'k str),
    /// A sequence index (or an integer map key).
    Index(usize),
}

impl<'k> From<&'k str> for TreeKey<'k> {
    fn from(name: &'k str) -> Self {
        TreeKey::Name(name)
    }
}

impl<'k> From<&'k String> for TreeKey<'k> {
    fn from(name: &'k String) -> Self {
        TreeKey::Name(name.as_str())
    }
}

impl From<usize> for TreeKey<'_> {
    fn from(index: usize) -> Self {
        TreeKey::Index(index)
    }
}

/// Read-only, never-failing view over a metadata value.
///
/// A reader is either *present* (wrapping a non-null value) or *absent*.
/// YAML `~` and JSON `null` are treated as absent.
#[derive(Debug, Clone, Copy, Default)]
pub struct TreeReader<'a> {
    value: Option<&'a Value>,
}

impl<'a> TreeReader<'a> {
    /// Wrap a value.
    ///
    /// Tagged values (`!tag {...}`) are unwrapped to the value they tag.
    pub fn new(value: &'a Value) -> Self {
        match value {
            Value::Null => Self::absent(),
            Value::Tagged(tagged) => Self::new(&tagged.value),
            other => Self { value: Some(other) },
        }
    }

    /// A reader wrapping nothing.
    pub fn absent() -> Self {
        Self { value: None }
    }

    /// Step into a map key or sequence index.
    ///
    /// Returns an absent reader when the key does not exist, the index is
    /// out of range, or the wrapped value is not a container.
    pub fn get<'k>(&self, key: impl Into<TreeKey<'k>>) -> TreeReader<'a> {
        let Some(value) = self.value else {
            return Self::absent();
        };

        let child = match (value, key.into()) {
            (Value::Mapping(map), TreeKey::Name(name)) => map.get(name),
            (Value::Mapping(map), TreeKey::Index(index)) => map.get(Value::from(index as u64)),
            (Value::Sequence(seq), TreeKey::Index(index)) => seq.get(index),
            _ => None,
        };

        child.map(TreeReader::new).unwrap_or_default()
    }

    /// The wrapped value, or `None` when absent.
    pub fn value(&self) -> Option<&'a Value> {
        self.value
    }

    /// Number of entries in a wrapped map or sequence; `0` for anything else.
    pub fn size(&self) -> usize {
        match self.value {
            Some(Value::Mapping(map)) => map.len(),
            Some(Value::Sequence(seq)) => seq.len(),
            _ => 0,
        }
    }

    /// Whether this reader wraps nothing.
    pub fn is_absent(&self) -> bool {
        self.value.is_none()
    }

    /// The wrapped value as a string slice, if it is a string.
    pub fn as_str(&self) -> Option<&'a str> {
        self.value.and_then(Value::as_str)
    }

    /// The wrapped scalar rendered as text.
    ///
    /// Strings are returned as-is; numbers and booleans are formatted.
    /// Maps, sequences, and absent values yield `None`.
    pub fn as_string(&self) -> Option<String> {
        match self.value? {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            Value::Bool(b) => Some(b.to_string()),
            _ => None,
        }
    }

    /// The wrapped scalar as text, or an empty string.
    pub fn string_or_empty(&self) -> String {
        self.as_string().unwrap_or_default()
    }

    /// The wrapped value as an integer.
    ///
    /// Numeric strings (`"3"`) are accepted since hand-written metadata
    /// often quotes numbers.
    pub fn as_i64(&self) -> Option<i64> {
        match self.value? {
            Value::Number(n) => n.as_i64(),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    /// Iterate over the elements of a wrapped sequence.
    ///
    /// Yields nothing for non-sequences.
    pub fn iter(&self) -> impl Iterator<Item = TreeReader<'a>> + 'a {
        let items: &'a [Value] = match self.value {
            Some(Value::Sequence(seq)) => seq.as_slice(),
            _ => &[],
        };
        items.iter().map(TreeReader::new)
    }

    /// String keys of a wrapped map, in document order.
    pub fn keys(&self) -> Vec<&'a str> {
        match self.value {
            Some(Value::Mapping(map)) => map.keys().filter_map(Value::as_str).collect(),
            _ => Vec::new(),
        }
    }

    /// Elements of a wrapped sequence rendered as strings, skipping
    /// non-scalar entries.
    pub fn string_list(&self) -> Vec<String> {
        self.iter().filter_map(|item| item.as_string()).collect()
    }
}

impl<'a> From<Option<&'a Value>> for TreeReader<'a> {
    fn from(value: Option<&'a Value>) -> Self {
        value.map(TreeReader::new).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(yaml: &str) -> Value {
        serde_yaml::from_str(yaml).unwrap()
    }

    #[test]
    fn test_get_map_key() {
        let value = parse("a:\n  b: hello\n");
        let reader = TreeReader::new(&value);
        assert_eq!(reader.get("a").get("b").as_str(), Some("hello"));
    }

    #[test]
    fn test_get_missing_key_is_absent() {
        let value = parse("a: 1\n");
        let reader = TreeReader::new(&value);
        assert!(reader.get("missing").is_absent());
        assert!(reader.get("missing").get("deeper").get(3).is_absent());
        assert!(reader.get("missing").value().is_none());
    }

    #[test]
    fn test_get_sequence_index() {
        let value = parse("- zero\n- one\n");
        let reader = TreeReader::new(&value);
        assert_eq!(reader.get(1).as_str(), Some("one"));
        assert!(reader.get(2).is_absent());
    }

    #[test]
    fn test_name_on_sequence_is_absent() {
        let value = parse("- zero\n");
        let reader = TreeReader::new(&value);
        assert!(reader.get("zero").is_absent());
    }

    #[test]
    fn test_index_on_scalar_is_absent() {
        let value = parse("just text");
        let reader = TreeReader::new(&value);
        assert!(reader.get(0).is_absent());
        assert_eq!(reader.size(), 0);
    }

    #[test]
    fn test_integer_map_keys() {
        let value = parse("1: first\n2: second\n");
        let reader = TreeReader::new(&value);
        assert_eq!(reader.get(2).as_str(), Some("second"));
    }

    #[test]
    fn test_null_is_absent() {
        let value = parse("a: ~\nb: null\n");
        let reader = TreeReader::new(&value);
        assert!(reader.get("a").is_absent());
        assert!(reader.get("b").is_absent());
        assert!(!reader.is_absent());
    }

    #[test]
    fn test_size() {
        let value = parse("map:\n  a: 1\n  b: 2\nlist: [1, 2, 3]\nscalar: x\n");
        let reader = TreeReader::new(&value);
        assert_eq!(reader.size(), 3);
        assert_eq!(reader.get("map").size(), 2);
        assert_eq!(reader.get("list").size(), 3);
        assert_eq!(reader.get("scalar").size(), 0);
        assert_eq!(TreeReader::absent().size(), 0);
    }

    #[test]
    fn test_as_string_formats_scalars() {
        let value = parse("n: 3\nf: 1.5\nb: true\ns: text\nl: []\n");
        let reader = TreeReader::new(&value);
        assert_eq!(reader.get("n").as_string().as_deref(), Some("3"));
        assert_eq!(reader.get("f").as_string().as_deref(), Some("1.5"));
        assert_eq!(reader.get("b").as_string().as_deref(), Some("true"));
        assert_eq!(reader.get("s").as_string().as_deref(), Some("text"));
        assert_eq!(reader.get("l").as_string(), None);
        assert_eq!(reader.get("missing").string_or_empty(), "");
    }

    #[test]
    fn test_as_i64_accepts_quoted_numbers() {
        let value = parse("a: 7\nb: '7'\nc: seven\n");
        let reader = TreeReader::new(&value);
        assert_eq!(reader.get("a").as_i64(), Some(7));
        assert_eq!(reader.get("b").as_i64(), Some(7));
        assert_eq!(reader.get("c").as_i64(), None);
    }

    #[test]
    fn test_iter_and_string_list() {
        let value = parse("list: [a, 2, {x: 1}, b]\n");
        let reader = TreeReader::new(&value);
        assert_eq!(reader.get("list").iter().count(), 4);
        assert_eq!(reader.get("list").string_list(), vec!["a", "2", "b"]);
        assert_eq!(reader.get("missing").iter().count(), 0);
    }

    #[test]
    fn test_keys_in_document_order() {
        let value = parse("zeta: 1\nalpha: 2\nmid: 3\n");
        let reader = TreeReader::new(&value);
        assert_eq!(reader.keys(), vec!["zeta", "alpha", "mid"]);
    }

    #[test]
    fn test_tagged_values_are_unwrapped() {
        let value = parse("map: !meta\n  a: 1\n  b: 2\nlist: !items [x, y, z]\n");
        let reader = TreeReader::new(&value);
        assert_eq!(reader.get("map").size(), 2);
        assert_eq!(reader.get("map").get("b").as_i64(), Some(2));
        assert_eq!(reader.get("list").size(), 3);
        assert_eq!(reader.get("list").string_list(), vec!["x", "y", "z"]);
        assert_eq!(reader.get("map").keys(), vec!["a", "b"]);
    }

    #[test]
    fn test_from_option() {
        let value = parse("a: 1\n");
        assert!(!TreeReader::from(Some(&value)).is_absent());
        assert!(TreeReader::from(None).is_absent());
    }
}
