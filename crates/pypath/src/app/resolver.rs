//! Python import path resolution.
//!
//! A file's import path is built by walking up from its directory while each directory holds a
//! package marker (`__init__` plus a recognized extension). Segments are collected innermost
//! first and reversed once the walk stops.

use std::path::Path;

use crate::domain::model::{PythonPath, SegmentList, StripMode};
use crate::infra::config::Config;

const PACKAGE_MARKER_STEM: &str = "__init__";
const LEGACY_STRIP_SET: &[char] = &['.', 'p', 'y'];

/// Resolves dotted python paths for files on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathResolver {
    extensions: Vec<String>,
    strip_mode: StripMode,
}

impl Default for PathResolver {
    fn default() -> Self {
        Self {
            extensions: vec![".py".to_owned()],
            strip_mode: StripMode::Legacy,
        }
    }
}

impl PathResolver {
    /// Build a resolver for the given extensions. Each extension includes its leading dot.
    pub fn new(extensions: Vec<String>, strip_mode: StripMode) -> Self {
        Self {
            extensions,
            strip_mode,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            config.resolver.extensions(),
            config.resolver.strip_mode(),
        )
    }

    pub fn extensions(&self) -> &[String] {
        &self.extensions
    }

    pub fn strip_mode(&self) -> StripMode {
        self.strip_mode
    }

    /// Whether `dir` directly contains a package marker for any recognized extension.
    ///
    /// Missing directories and file-system errors count as "not a package".
    pub fn is_package_directory(&self, dir: &Path) -> bool {
        self.extensions.iter().any(|extension| {
            let marker = dir.join(format!("{PACKAGE_MARKER_STEM}{extension}"));
            match marker.try_exists() {
                Ok(found) => found,
                Err(err) => {
                    tracing::debug!(path = %marker.display(), error = %err, "marker probe failed");
                    false
                }
            }
        })
    }

    /// Whether the file name carries a recognized extension.
    pub fn is_enabled(&self, active_file: &Path) -> bool {
        let Some(name) = active_file.file_name() else {
            return false;
        };
        let name = name.to_string_lossy();
        let Some((_, extension)) = name.rsplit_once('.') else {
            return false;
        };

        self.extensions
            .iter()
            .any(|known| known.strip_prefix('.') == Some(extension))
    }

    /// Dotted import path of `active_file`, or `None` when no segment was collected.
    pub fn resolve_python_path(&self, active_file: &Path) -> Option<String> {
        self.resolve(active_file).map(PythonPath::into_string)
    }

    /// Resolve `active_file` into a full [`PythonPath`] report.
    pub fn resolve(&self, active_file: &Path) -> Option<PythonPath> {
        self.walk(active_file, |dir| self.is_package_directory(dir))
    }

    /// Module name derived from a file's base name according to the strip mode.
    pub fn strip_module_name<'a>(&self, base_name: &'a str) -> &'a str {
        match self.strip_mode {
            StripMode::Legacy => base_name.trim_end_matches(LEGACY_STRIP_SET),
            StripMode::Extension => self
                .extensions
                .iter()
                .find_map(|extension| base_name.strip_suffix(extension.as_str()))
                .unwrap_or(base_name),
        }
    }

    pub(crate) fn walk<F>(&self, active_file: &Path, is_package: F) -> Option<PythonPath>
    where
        F: Fn(&Path) -> bool,
    {
        let mut segments = SegmentList::new();

        let base_name = active_file
            .file_name()
            .map(|name| name.to_string_lossy())
            .unwrap_or_default();
        let module = self.strip_module_name(&base_name);
        if module != PACKAGE_MARKER_STEM {
            segments.push(module);
        }

        let mut current = active_file.parent();
        let mut import_root = None;
        while let Some(dir) = current.take() {
            if !is_package(dir) {
                import_root = Some(dir.to_path_buf());
                break;
            }

            if let Some(name) = dir.file_name() {
                segments.push(name.to_string_lossy());
            }

            match dir.parent() {
                Some(parent) if parent != dir => current = Some(parent),
                _ => tracing::trace!(dir = %dir.display(), "package walk reached filesystem root"),
            }
        }

        tracing::debug!(
            file = %active_file.display(),
            segments = segments.len(),
            "resolved package segments"
        );
        segments.into_python_path(import_root)
    }
}
