//! Adapter error type.

use bb_config::ConfigError;
use thiserror::Error;

/// Failure of one compile call. All failures are fatal to that file's
/// compilation; the adapter performs no partial-result recovery.
#[derive(Debug, Error)]
pub enum CompileError {
    /// Malformed or unreadable project configuration.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// No engine set on the context and none supplied with the call.
    #[error("no transform engine configured and none supplied with the call")]
    MissingEngine,

    /// Fault raised by the injected engine, propagated verbatim.
    #[error("transform engine failed")]
    Engine(#[source] anyhow::Error),

    /// Source-map data could not be serialized.
    #[error("failed to serialize source map")]
    SourceMap(#[from] serde_json::Error),
}
