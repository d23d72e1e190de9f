//! Tree model for parsed DON documents
//!
//! A DON document is an ordered tree of named nodes. Every node carries an
//! ordered mapping of properties (key with an optional text value; a missing
//! value marks a presence flag, e.g. `small` written without `=`) and an
//! ordered sequence of child nodes. Child order is semantically meaningful
//! and is preserved exactly as encountered in the source text.
//!
//! The parser is the only producer of trees inside this crate, but
//! construction is public so tests and tools can build expected trees for
//! structural comparison: two nodes are equal when their names match, their
//! properties are equal as a mapping (insertion order ignored), and their
//! children are equal as a sequence (order significant).

use std::fmt;

use indexmap::IndexMap;
use serde::Serialize;

/// Canonical form for case-insensitive lookup, computed once when a key is
/// inserted and once per lookup
fn fold(name: &str) -> String {
    name.to_lowercase()
}

/// An ordered mapping from property key to optional text value
///
/// Keys are unique; insertion order is preserved for iteration, and equality
/// ignores it. A `None` value is a presence flag.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(transparent)]
pub struct Properties {
    entries: IndexMap<String, Option<String>>,
    /// Folded keys, aligned with `entries` by index
    #[serde(skip)]
    folded: Vec<String>,
}

impl PartialEq for Properties {
    fn eq(&self, other: &Self) -> bool {
        self.entries == other.entries
    }
}

impl Properties {
    /// Create an empty property mapping
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of properties
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check whether there are no properties
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Insert a property, returning the previous value if the key was
    /// already present (the parser treats that as a duplicate-key error)
    pub fn insert(
        &mut self,
        key: impl Into<String>,
        value: Option<String>,
    ) -> Option<Option<String>> {
        let key = key.into();
        let folded = fold(&key);
        let previous = self.entries.insert(key, value);
        if previous.is_none() {
            self.folded.push(folded);
        }
        previous
    }

    /// Look up a property value by key, ignoring case
    ///
    /// An exact match wins over a case-folded one. The outer `Option` is key
    /// presence; the inner one distinguishes a `key=value` property (`Some`)
    /// from a presence flag (`None`).
    pub fn get(&self, key: &str) -> Option<Option<&str>> {
        if let Some(value) = self.entries.get(key) {
            return Some(value.as_deref());
        }
        let wanted = fold(key);
        let index = self.folded.iter().position(|stored| *stored == wanted)?;
        self.entries
            .get_index(index)
            .map(|(_, value)| value.as_deref())
    }

    /// Check for a property key, ignoring case
    pub fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Iterate over `(key, value)` pairs in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&str, Option<&str>)> {
        self.entries
            .iter()
            .map(|(key, value)| (key.as_str(), value.as_deref()))
    }

    /// Iterate over keys in insertion order
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }
}

impl<'a> IntoIterator for &'a Properties {
    type Item = (&'a String, &'a Option<String>);
    type IntoIter = indexmap::map::Iter<'a, String, Option<String>>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

/// A named tree element with properties and ordered children
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Node {
    pub name: String,
    pub properties: Properties,
    pub children: Vec<Node>,
}

impl Node {
    /// Create a node with the given name and no properties or children
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            properties: Properties::new(),
            children: Vec::new(),
        }
    }

    /// Append a child node
    pub fn push(&mut self, child: Node) {
        self.children.push(child);
    }

    /// Find the first child with the given name, ignoring case
    ///
    /// Children carry no folded-name index (names are data, not keys), so
    /// each candidate is folded during the scan.
    pub fn child(&self, name: &str) -> Option<&Node> {
        let wanted = fold(name);
        self.children
            .iter()
            .find(|child| fold(&child.name) == wanted)
    }

    /// Check for a property key, ignoring case
    pub fn has_property(&self, key: &str) -> bool {
        self.properties.contains(key)
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let properties = self.properties.len();
        let children = self.children.len();
        write!(
            f,
            "{}({} {}, {} {})",
            self.name,
            properties,
            if properties == 1 { "property" } else { "properties" },
            children,
            if children == 1 { "child" } else { "children" },
        )
    }
}

impl<'a> IntoIterator for &'a Node {
    type Item = &'a Node;
    type IntoIter = std::slice::Iter<'a, Node>;

    fn into_iter(self) -> Self::IntoIter {
        self.children.iter()
    }
}
