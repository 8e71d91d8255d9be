//! Domain models for package segments and derived python paths.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::domain::errors::DomainError;

/// How the module name is derived from a file's base name.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StripMode {
    /// Trim every trailing `.`, `p` and `y` character, so `happy.py` becomes `ha`.
    #[default]
    Legacy,
    /// Remove a recognized extension as a true suffix, so `happy.py` becomes `happy`.
    Extension,
}

impl FromStr for StripMode {
    type Err = DomainError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "legacy" => Ok(Self::Legacy),
            "extension" => Ok(Self::Extension),
            other => Err(DomainError::UnknownStripMode(other.to_owned())),
        }
    }
}

/// Accumulator of module and package names, innermost first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SegmentList {
    segments: Vec<String>,
}

impl SegmentList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Push the next segment outwards from the module.
    pub fn push<S: Into<String>>(&mut self, segment: S) {
        self.segments.push(segment.into());
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Segments in the order they were collected.
    pub fn innermost_first(&self) -> &[String] {
        &self.segments
    }

    /// Reverse the collected segments into a python path. Returns `None` when nothing was
    /// collected.
    pub fn into_python_path(self, import_root: Option<PathBuf>) -> Option<PythonPath> {
        if self.segments.is_empty() {
            return None;
        }

        let mut segments = self.segments;
        segments.reverse();
        Some(PythonPath {
            dotted: segments.join("."),
            segments,
            import_root,
        })
    }
}

/// Dotted import path of a module within its package hierarchy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PythonPath {
    #[serde(rename = "python_path")]
    dotted: String,
    /// Outermost package first.
    segments: Vec<String>,
    /// Directory holding the top-level package, absent when the walk ran out of parents.
    #[serde(skip_serializing_if = "Option::is_none")]
    import_root: Option<PathBuf>,
}

impl PythonPath {
    pub fn as_str(&self) -> &str {
        &self.dotted
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    pub fn import_root(&self) -> Option<&Path> {
        self.import_root.as_deref()
    }

    pub fn into_string(self) -> String {
        self.dotted
    }
}

impl fmt::Display for PythonPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.dotted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use insta::assert_snapshot;

    #[test]
    fn segments_are_reversed_before_joining() {
        let mut list = SegmentList::new();
        list.push("mod");
        list.push("sub");
        list.push("pkg");

        let path = list.into_python_path(None).expect("segments collected");
        assert_eq!(path.as_str(), "pkg.sub.mod");
        assert_eq!(path.segments(), ["pkg", "sub", "mod"]);
        assert_eq!(path.to_string(), "pkg.sub.mod");
    }

    #[test]
    fn empty_list_has_no_python_path() {
        assert!(SegmentList::new().into_python_path(None).is_none());
    }

    #[test]
    fn report_serializes_outermost_first() {
        let mut list = SegmentList::new();
        list.push("mod");
        list.push("sub");
        list.push("pkg");
        let path = list.into_python_path(None).expect("segments collected");

        let json = serde_json::to_string_pretty(&path).expect("serialize report");
        assert_snapshot!(json, @r#"
        {
          "python_path": "pkg.sub.mod",
          "segments": [
            "pkg",
            "sub",
            "mod"
          ]
        }
        "#);
    }

    #[test]
    fn strip_mode_parses_case_insensitively() {
        assert_eq!("Legacy".parse::<StripMode>(), Ok(StripMode::Legacy));
        assert_eq!(" extension ".parse::<StripMode>(), Ok(StripMode::Extension));
        assert_eq!(
            "suffix".parse::<StripMode>(),
            Err(DomainError::UnknownStripMode("suffix".into()))
        );
    }
}
