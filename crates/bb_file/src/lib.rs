//! Build-pipeline file handle for babelbridge.
//!
//! Mirrors the capability set a file-based build pipeline hands to its
//! plugins: a bypass flag, a logical subpath, a physical path, an extras
//! bag for auxiliary metadata, and a list of derived output files (side
//! artifacts the pipeline should emit alongside the main output).

use serde_json::{Map, Value};

/// Auxiliary metadata attached to a pipeline file.
///
/// Keys are plugin-defined; babelbridge writes `babelHelpers` here.
pub type Extras = Map<String, Value>;

/// A file flowing through the build pipeline.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PipelineFile {
    /// When set, transform plugins must return the content untouched.
    pub disable_transform: bool,
    /// Logical path inside the project, always starting with `/`.
    pub subpath: String,
    /// Resolved physical path on disk.
    pub realpath: String,
    /// Auxiliary metadata bag.
    pub extras: Extras,
    /// Derived output files registered by plugins (e.g. source maps).
    pub derived: Vec<PipelineFile>,
    content: Option<String>,
}

impl PipelineFile {
    /// Create a file handle from its logical and physical paths.
    pub fn new(subpath: impl Into<String>, realpath: impl Into<String>) -> Self {
        Self {
            subpath: subpath.into(),
            realpath: realpath.into(),
            ..Self::default()
        }
    }

    /// Wrap a bare path as a file handle, the factory used for derived
    /// outputs that have no independent logical path.
    pub fn wrap(path: impl Into<String>) -> Self {
        let path = path.into();
        Self {
            subpath: path.clone(),
            realpath: path,
            ..Self::default()
        }
    }

    /// Set the file's content. The pipeline writes it out at emit time.
    pub fn set_content(&mut self, text: impl Into<String>) {
        self.content = Some(text.into());
    }

    /// Content set by a plugin, if any.
    pub fn content(&self) -> Option<&str> {
        self.content.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wrap_uses_path_for_both_paths() {
        let file = PipelineFile::wrap("/abs/a.js.map");
        assert_eq!(file.subpath, "/abs/a.js.map");
        assert_eq!(file.realpath, "/abs/a.js.map");
        assert!(!file.disable_transform);
        assert!(file.derived.is_empty());
    }

    #[test]
    fn content_roundtrip() {
        let mut file = PipelineFile::new("/a.js", "/abs/a.js");
        assert_eq!(file.content(), None);
        file.set_content("{}");
        assert_eq!(file.content(), Some("{}"));
    }
}
