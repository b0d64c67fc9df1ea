//! Compile adapter bridging a build pipeline to an injected transpiler.
//!
//! The adapter contains no parser and no code generator. For each file it:
//!
//! 1. resolves the effective options (default filename, project config,
//!    per-call overrides — see `bb_config`)
//! 2. hands the source text to the injected [`TransformEngine`]
//! 3. re-attaches the produced artifacts to the pipeline file: generated
//!    code, an optional `<realpath>.map` derived file, and the list of
//!    runtime helpers the transform used
//!
//! State that outlives a single call (the cross-file helper registry, the
//! module-loader speed hook, the cached project config) is owned by an
//! explicit [`CompileContext`] rather than process globals, so separate
//! pipelines and test runs do not interfere.

pub mod context;
pub mod engine;
pub mod error;

pub use context::{CompileContext, CompileOverrides};
pub use engine::{ModuleHook, TransformEngine, TransformMetadata, TransformOutput};
pub use error::CompileError;
