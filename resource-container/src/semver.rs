//! Variable-length version comparison.
//!
//! Compares loosely semver-styled strings such as `0.1.0`, `10.0.1`, `1.0`,
//! `1` or `1.2.3.4`. These are the compatibility markers written into
//! container manifests, so the comparison has to be forgiving:
//!
//! - Leading non-numeric characters are dropped (`v1.0` compares as `1.0`).
//! - A `-` inside a dotted slice splits it in two (`1.0-alpha.1` compares as
//!   the slots `1`, `0`, `alpha`, `1`).
//! - Non-digit characters inside a slot are ignored; a slot with no digits
//!   is `0`.
//! - A `*` slot matches anything at its position. A trailing `*` also
//!   matches every slot after it, so `10.*` matches `10.4.2` and a lone `*`
//!   matches any version.
//! - Missing slots on the shorter operand count as `0`.
//!
//! # Example
//!
//! ```
//! use std::cmp::Ordering;
//! use resource_container::semver;
//!
//! assert_eq!(semver::compare("10.9.6", "10.*.1"), Ordering::Greater);
//! assert!(semver::eq("v10.0.0", "10.0-alpha.0"));
//! assert!(semver::lt("0.1", "0.2"));
//! ```

use std::cmp::Ordering;

/// A single comparable slot of a version string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Slot {
    Number(u64),
    Wildcard,
}

impl Slot {
    fn parse(raw: &str) -> Self {
        if raw.trim() == "*" {
            return Slot::Wildcard;
        }
        let digits: String = raw.chars().filter(char::is_ascii_digit).collect();
        Slot::Number(digits.parse().unwrap_or(0))
    }

    fn cmp_slot(self, other: Slot) -> Ordering {
        match (self, other) {
            (Slot::Wildcard, _) | (_, Slot::Wildcard) => Ordering::Equal,
            (Slot::Number(a), Slot::Number(b)) => a.cmp(&b),
        }
    }
}

/// Parsed form of a version string, kept only for one comparison.
#[derive(Debug)]
struct Version {
    slots: Vec<Slot>,
}

impl Version {
    fn parse(version: &str) -> Self {
        let trimmed = version
            .trim()
            .trim_start_matches(|c: char| !c.is_ascii_digit() && c != '*');

        let slots = trimmed
            .split('.')
            .flat_map(|slice| slice.splitn(2, '-'))
            .map(Slot::parse)
            .collect();

        Self { slots }
    }

    fn len(&self) -> usize {
        self.slots.len()
    }

    /// Slot at `index`, filling past the end with `0` (or `*` after a
    /// trailing wildcard).
    fn slot(&self, index: usize) -> Slot {
        match self.slots.get(index) {
            Some(slot) => *slot,
            None => match self.slots.last() {
                Some(Slot::Wildcard) => Slot::Wildcard,
                _ => Slot::Number(0),
            },
        }
    }
}

/// Compare two version strings.
///
/// Returns [`Ordering::Less`] if `v1` is older than `v2`,
/// [`Ordering::Greater`] if it is newer, and [`Ordering::Equal`] when every
/// slot matches.
///
/// Only the first `-` in a dotted slice splits it, so `1-2-3` compares as the
/// slots `1` and `23`.
pub fn compare(v1: &str, v2: &str) -> Ordering {
    let ver1 = Version::parse(v1);
    let ver2 = Version::parse(v2);

    let max = ver1.len().max(ver2.len());
    (0..max)
        .map(|i| ver1.slot(i).cmp_slot(ver2.slot(i)))
        .find(|ordering| *ordering != Ordering::Equal)
        .unwrap_or(Ordering::Equal)
}

/// Check if `v1` is newer than `v2`.
pub fn gt(v1: &str, v2: &str) -> bool {
    compare(v1, v2) == Ordering::Greater
}

/// Check if `v1` is older than `v2`.
pub fn lt(v1: &str, v2: &str) -> bool {
    compare(v1, v2) == Ordering::Less
}

/// Check if `v1` and `v2` are equivalent.
pub fn eq(v1: &str, v2: &str) -> bool {
    compare(v1, v2) == Ordering::Equal
}
