//! Capabilities the embedder injects into the adapter.
//!
//! The transpiler is supplied externally, never integrated: the adapter
//! depends only on the [`TransformEngine`] trait. The optional
//! [`ModuleHook`] models the module-loader shortcut some engines use to
//! cut startup cost when `speed` mode is requested.

use anyhow::Result;
use bb_config::ConfigMap;
use serde_json::Value;

/// Result of one transform call.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TransformOutput {
    /// Generated code.
    pub code: String,
    /// Raw source-map data, if the engine produced any.
    pub map: Option<Value>,
    /// Metadata about the transformation, if the engine reports any.
    pub metadata: Option<TransformMetadata>,
}

/// Engine-reported metadata for one transform call.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TransformMetadata {
    /// Runtime helper functions the generated code depends on, in the
    /// order the engine reported them. `None` when the engine does not
    /// report helper usage at all; an empty list is still recorded on
    /// the file.
    pub used_helpers: Option<Vec<String>>,
}

/// An externally supplied babel-style transpiler.
///
/// Faults raised here propagate through the adapter verbatim; the adapter
/// never retries or recovers.
pub trait TransformEngine: Send + Sync {
    fn transform(&self, content: &str, options: &ConfigMap) -> Result<TransformOutput>;
}

/// Module-loader acceleration hook.
///
/// Installed while at least one in-flight compile requested `speed` mode,
/// uninstalled when the last one finishes. Both calls must be idempotent
/// per install/uninstall pair but are only ever issued in matched pairs by
/// the adapter.
pub trait ModuleHook: Send + Sync {
    fn install(&self);
    fn uninstall(&self);
}
