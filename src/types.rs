//! Core data types for header analysis

use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// Suffix that marks a tracked file as a header
pub const HEADER_SUFFIX: &str = ".h";

/// Display name of the anonymous namespace segment
pub const ANONYMOUS_NAMESPACE: &str = "(anonymous)";

/// Reserved activity key for counted `#define`s
pub const MACRO_KEY: &str = "#define";

/// Repository-relative header path, always `/`-separated
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HeaderId(String);

impl HeaderId {
    pub fn new(path: impl Into<String>) -> Self {
        Self(path.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether the path carries the header suffix
    pub fn is_header(path: &str) -> bool {
        path.ends_with(HEADER_SUFFIX)
    }

    /// Directory part of the path (everything before the last `/`)
    pub fn parent_dir(&self) -> Option<&str> {
        self.0.rsplit_once('/').map(|(dir, _)| dir)
    }
}

impl fmt::Display for HeaderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Borrow<str> for HeaderId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for HeaderId {
    fn from(path: &str) -> Self {
        Self(path.to_string())
    }
}

impl From<String> for HeaderId {
    fn from(path: String) -> Self {
        Self(path)
    }
}

/// One segment of a namespace path
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Segment {
    Named(String),
    Anonymous,
}

impl Segment {
    /// Segment for a `namespace NAME` opener; an empty name is anonymous
    pub fn from_name(name: &str) -> Self {
        if name.is_empty() {
            Segment::Anonymous
        } else {
            Segment::Named(name.to_string())
        }
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Segment::Named(name) => f.write_str(name),
            Segment::Anonymous => f.write_str(ANONYMOUS_NAMESPACE),
        }
    }
}

/// Fully-qualified namespace path. The empty path is the global scope.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NamespacePath(Vec<Segment>);

impl NamespacePath {
    pub fn global() -> Self {
        Self::default()
    }

    pub fn is_global(&self) -> bool {
        self.0.is_empty()
    }

    pub fn segments(&self) -> &[Segment] {
        &self.0
    }

    /// This path extended by `tail`
    pub fn join(&self, tail: &[Segment]) -> Self {
        let mut segments = self.0.clone();
        segments.extend_from_slice(tail);
        Self(segments)
    }
}

impl FromIterator<Segment> for NamespacePath {
    fn from_iter<I: IntoIterator<Item = Segment>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl fmt::Display for NamespacePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str("::")?;
            }
            write!(f, "{}", segment)?;
        }
        Ok(())
    }
}

/// Key of the namespace-activity map
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ActivityKey {
    Namespace(NamespacePath),
    Macros,
}

impl fmt::Display for ActivityKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ActivityKey::Namespace(path) => write!(f, "{}", path),
            ActivityKey::Macros => f.write_str(MACRO_KEY),
        }
    }
}

/// Declaration-activity count per namespace path (plus macros)
pub type NamespaceActivity = BTreeMap<ActivityKey, usize>;

/// Everything extracted from one header
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedHeader {
    /// Locally `#include`d header names, unfiltered
    pub includes: BTreeSet<String>,
    /// Activity per namespace path and `#define`
    pub namespace_activity: NamespaceActivity,
}

impl ParsedHeader {
    /// Activity count rendered with display keys, handy for reports and tests
    pub fn activity_by_name(&self) -> BTreeMap<String, usize> {
        self.namespace_activity
            .iter()
            .map(|(key, count)| (key.to_string(), *count))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_namespace_path_display() {
        let path: NamespacePath = vec![
            Segment::Named("webrtc".into()),
            Segment::Anonymous,
            Segment::Named("impl".into()),
        ]
        .into_iter()
        .collect();
        assert_eq!(path.to_string(), "webrtc::(anonymous)::impl");
        assert_eq!(NamespacePath::global().to_string(), "");
    }

    #[test]
    fn test_global_key_differs_from_macro_key() {
        let global = ActivityKey::Namespace(NamespacePath::global());
        assert_ne!(global, ActivityKey::Macros);
        assert_eq!(ActivityKey::Macros.to_string(), "#define");
    }

    #[test]
    fn test_header_parent_dir() {
        assert_eq!(HeaderId::from("api/audio/a.h").parent_dir(), Some("api/audio"));
        assert_eq!(HeaderId::from("top.h").parent_dir(), None);
        assert!(HeaderId::is_header("x/y.h"));
        assert!(!HeaderId::is_header("x/y.cc"));
    }
}
