//! Adapter state and the compile entry point.

use std::path::PathBuf;
use std::sync::{Arc, Mutex, PoisonError};

use bb_config::ConfigMap;
use bb_file::PipelineFile;
use serde_json::Value;
use tracing::{debug, trace};

use crate::engine::{ModuleHook, TransformEngine};
use crate::error::CompileError;

/// Per-call overrides supplied by the plugin configuration.
#[derive(Clone, Default)]
pub struct CompileOverrides {
    /// Transform options; highest-precedence config layer.
    pub options: ConfigMap,
    /// Engine to use for this call only, replacing the context default.
    pub engine: Option<Arc<dyn TransformEngine>>,
}

impl CompileOverrides {
    /// Overrides carrying only an option map.
    pub fn options(options: ConfigMap) -> Self {
        Self {
            options,
            engine: None,
        }
    }
}

impl std::fmt::Debug for CompileOverrides {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompileOverrides")
            .field("options", &self.options)
            .field("engine", &self.engine.as_ref().map(|_| "<engine>"))
            .finish()
    }
}

/// State shared across compile calls: the default engine, the cached
/// project config, the cross-file helper registry, and the speed-hook
/// reference count.
///
/// One context per pipeline instance. All methods take `&self`; the
/// context is `Send + Sync` and safe to share across worker threads.
pub struct CompileContext {
    project_root: PathBuf,
    engine: Option<Arc<dyn TransformEngine>>,
    hook: Option<Arc<dyn ModuleHook>>,
    // Outer Option: whether discovery ran; inner: whether config exists.
    config_cache: Mutex<Option<Option<ConfigMap>>>,
    helpers: Mutex<Vec<String>>,
    hook_refs: Mutex<u32>,
}

impl Default for CompileContext {
    fn default() -> Self {
        Self {
            project_root: std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
            engine: None,
            hook: None,
            config_cache: Mutex::new(None),
            helpers: Mutex::new(Vec::new()),
            hook_refs: Mutex::new(0),
        }
    }
}

impl std::fmt::Debug for CompileContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompileContext")
            .field("project_root", &self.project_root)
            .field("engine", &self.engine.as_ref().map(|_| "<engine>"))
            .field("hook", &self.hook.as_ref().map(|_| "<hook>"))
            .finish()
    }
}

impl CompileContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Directory searched for `.babelrc` / `package.json`.
    pub fn with_project_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.project_root = root.into();
        self
    }

    /// Default engine, used when a call does not supply its own.
    pub fn with_engine(mut self, engine: Arc<dyn TransformEngine>) -> Self {
        self.engine = Some(engine);
        self
    }

    /// Module-loader hook toggled by `speed` mode.
    pub fn with_hook(mut self, hook: Arc<dyn ModuleHook>) -> Self {
        self.hook = Some(hook);
        self
    }

    /// Transform `content` for `file` and return the generated code.
    ///
    /// Attaches side artifacts to `file`: `extras["babelHelpers"]` when the
    /// engine reports helper usage, and a derived `<realpath>.map` file
    /// when `sourceMaps` is enabled and the engine produced map data.
    pub fn compile(
        &self,
        content: &str,
        file: &mut PipelineFile,
        overrides: &CompileOverrides,
    ) -> Result<String, CompileError> {
        if file.disable_transform {
            return Ok(content.to_string());
        }

        let project = self.project_config()?;
        let mut options = bb_config::merge(
            bb_config::default_filename(&file.subpath),
            project.as_ref(),
            &overrides.options,
        );
        // The engine is a typed capability, never a transform option; a
        // stray `parser` key from a shared .babelrc must not leak through.
        options.remove("parser");

        let engine = overrides
            .engine
            .clone()
            .or_else(|| self.engine.clone())
            .ok_or(CompileError::MissingEngine)?;

        debug!(filename = %options["filename"], "compiling with merged options");

        let hook_guard = bb_config::option_enabled(&options, "speed").then(|| self.acquire_hook());

        let result = engine
            .transform(content, &options)
            .map_err(CompileError::Engine)?;

        if let Some(used) = result
            .metadata
            .as_ref()
            .and_then(|metadata| metadata.used_helpers.as_ref())
        {
            file.extras.insert(
                "babelHelpers".into(),
                Value::Array(used.iter().cloned().map(Value::String).collect()),
            );
            self.record_helpers(used);
        }

        drop(hook_guard);

        if bb_config::option_enabled(&options, "sourceMaps") {
            if let Some(map) = &result.map {
                let map_path = format!("{}.map", file.realpath);
                let mut map_file = PipelineFile::wrap(&map_path);
                map_file.set_content(serde_json::to_string_pretty(map)?);
                file.derived.push(map_file);
                debug!(path = %map_path, "registered source map artifact");
            }
        }

        Ok(result.code)
    }

    /// Helpers used across all compiles on this context, first-seen order.
    pub fn helpers(&self) -> Vec<String> {
        self.helpers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Clear the helper registry, for test isolation or per-build resets.
    pub fn reset_helpers(&self) {
        self.helpers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }

    /// Whether the speed hook is currently installed.
    pub fn hook_active(&self) -> bool {
        *self.hook_refs.lock().unwrap_or_else(PoisonError::into_inner) > 0
    }

    /// Drop the cached project config so the next compile re-reads it.
    pub fn invalidate_config_cache(&self) {
        *self
            .config_cache
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = None;
    }

    fn project_config(&self) -> Result<Option<ConfigMap>, CompileError> {
        let mut cache = self
            .config_cache
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if let Some(cached) = cache.as_ref() {
            return Ok(cached.clone());
        }
        // Discovery failures are not cached; a fixed config file takes
        // effect on the next call.
        let loaded = bb_config::discover(&self.project_root)?;
        *cache = Some(loaded.clone());
        Ok(loaded)
    }

    fn record_helpers(&self, used: &[String]) {
        let mut helpers = self.helpers.lock().unwrap_or_else(PoisonError::into_inner);
        for helper in used {
            if !helpers.contains(helper) {
                trace!(helper = %helper, "recorded new runtime helper");
                helpers.push(helper.clone());
            }
        }
    }

    // The hook runs outside the lock: an embedder hook may call back into
    // the context (e.g. `hook_active`) without deadlocking.
    fn acquire_hook(&self) -> HookGuard<'_> {
        let first = {
            let mut refs = self.hook_refs.lock().unwrap_or_else(PoisonError::into_inner);
            *refs += 1;
            *refs == 1
        };
        if first {
            if let Some(hook) = &self.hook {
                trace!("installing module-loader speed hook");
                hook.install();
            }
        }
        HookGuard { context: self }
    }

    fn release_hook(&self) {
        let last = {
            let mut refs = self.hook_refs.lock().unwrap_or_else(PoisonError::into_inner);
            *refs -= 1;
            *refs == 0
        };
        if last {
            if let Some(hook) = &self.hook {
                trace!("uninstalling module-loader speed hook");
                hook.uninstall();
            }
        }
    }
}

/// Holds one reference on the speed hook; releasing the last reference
/// uninstalls it. Released on drop, including on engine failure.
struct HookGuard<'a> {
    context: &'a CompileContext,
}

impl Drop for HookGuard<'_> {
    fn drop(&mut self) {
        self.context.release_hook();
    }
}
