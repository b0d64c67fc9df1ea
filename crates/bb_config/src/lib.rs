//! Babel configuration discovery and option merging.
//!
//! Resolves the effective transform options for one compile call from
//! three layers, lowest to highest precedence:
//!
//! 1. a computed default `filename` derived from the file's subpath
//! 2. project-level config: `.babelrc` in the project root, else the
//!    `babel` field of `package.json`
//! 3. the per-call override map supplied by the plugin configuration
//!
//! Config files are parsed as strict JSON.

use std::fs;
use std::path::{Path, PathBuf};

use serde_json::{Map, Value};
use thiserror::Error;
use tracing::debug;

/// A set of babel options, as found in `.babelrc` or plugin config.
pub type ConfigMap = Map<String, Value>;

/// Failure to read or parse project-level configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed configuration in {}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("{}: `babel` field must be a JSON object", path.display())]
    InvalidShape { path: PathBuf },
}

/// Load project-level babel configuration from `project_root`.
///
/// `.babelrc` wins over the `babel` field of `package.json`; returns
/// `Ok(None)` when neither is present.
pub fn discover(project_root: &Path) -> Result<Option<ConfigMap>, ConfigError> {
    let babelrc = project_root.join(".babelrc");
    if babelrc.is_file() {
        let text = fs::read_to_string(&babelrc).map_err(|source| ConfigError::Io {
            path: babelrc.clone(),
            source,
        })?;
        let config: ConfigMap =
            serde_json::from_str(&text).map_err(|source| ConfigError::Parse {
                path: babelrc.clone(),
                source,
            })?;
        debug!(path = %babelrc.display(), "loaded project babel config");
        return Ok(Some(config));
    }

    let manifest = project_root.join("package.json");
    if manifest.is_file() {
        let text = fs::read_to_string(&manifest).map_err(|source| ConfigError::Io {
            path: manifest.clone(),
            source,
        })?;
        let parsed: Value = serde_json::from_str(&text).map_err(|source| ConfigError::Parse {
            path: manifest.clone(),
            source,
        })?;
        match parsed.get("babel") {
            None | Some(Value::Null) => {}
            Some(Value::Object(config)) => {
                debug!(path = %manifest.display(), "loaded babel config from manifest");
                return Ok(Some(config.clone()));
            }
            Some(_) => return Err(ConfigError::InvalidShape { path: manifest }),
        }
    }

    Ok(None)
}

/// Default `filename` option: the subpath with exactly one leading
/// separator removed.
pub fn default_filename(subpath: &str) -> &str {
    subpath.strip_prefix('/').unwrap_or(subpath)
}

/// Merge the three option layers into the effective config.
///
/// Shallow merge; a later layer replaces an earlier value wholesale.
pub fn merge(filename: &str, project: Option<&ConfigMap>, overrides: &ConfigMap) -> ConfigMap {
    let mut options = ConfigMap::new();
    options.insert("filename".into(), Value::String(filename.into()));
    if let Some(project) = project {
        for (key, value) in project {
            options.insert(key.clone(), value.clone());
        }
    }
    for (key, value) in overrides {
        options.insert(key.clone(), value.clone());
    }
    options
}

/// Whether an option is set to a truthy value, with JS semantics:
/// absent, `null`, `false`, `0` and `""` are off, everything else on.
pub fn option_enabled(options: &ConfigMap, key: &str) -> bool {
    match options.get(key) {
        None | Some(Value::Null) => false,
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(n)) => n.as_f64().is_some_and(|f| f != 0.0),
        Some(Value::String(s)) => !s.is_empty(),
        Some(Value::Array(_)) | Some(Value::Object(_)) => true,
    }
}
