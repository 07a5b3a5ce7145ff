//! Generator configuration.
//!
//! Configuration comes from three layers, later ones winning:
//!
//! 1. [`GeneratorConfig::default`]
//! 2. A `kinds.toml` file
//! 3. Command line flags (applied by the binary)
//!
//! ## Example
//!
//! ```toml
//! base_dir = "."
//! type_package = "src/client/generated"
//! controller_package = "src/controllers/generated"
//! prefix = "zz_generated"
//! type_module = "crate::client::generated"
//! strict_references = false
//! deep_copy = "builtin"
//! formatter = { command = ["rustfmt", "--edition", "2024"], per_file = true }
//! ```

use std::fs;
use std::path::{Component, Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::errors::GeneratorError;
use crate::naming::DEFAULT_PREFIX;
use crate::postprocess::{CommandStep, DeepCopyGen, PostProcess, PrettyPleaseFormatter};

/// Default configuration file name.
pub const CONFIG_FILE: &str = "kinds.toml";

/// Environment variable naming the base source tree.
pub const SOURCE_TREE_ENV: &str = "KINDS_SOURCE_TREE";

/// The base source tree from [`SOURCE_TREE_ENV`], or the current directory.
pub fn default_source_tree() -> PathBuf {
    std::env::var_os(SOURCE_TREE_ENV)
        .filter(|value| !value.is_empty())
        .map_or_else(|| PathBuf::from("."), PathBuf::from)
}

/// How a post-processing step is provided.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StepSpec {
    /// A built-in step: `builtin` (derived copies), `prettyplease` or `rustfmt`.
    Named(String),
    /// An external program, run from the base directory.
    Command {
        command: Vec<String>,
        #[serde(default)]
        per_file: bool,
    },
}

impl StepSpec {
    fn named(name: &str) -> Self {
        Self::Named(name.to_string())
    }
}

/// Settings for one generation run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GeneratorConfig {
    /// Base source tree the packages are resolved against.
    pub base_dir: PathBuf,
    /// Package receiving type artifacts and the client.
    pub type_package: String,
    /// Package receiving controller artifacts and derived copies.
    pub controller_package: String,
    /// Reserved file name prefix for generator-owned files. Lowercase only,
    /// since artifact file names are lowercased.
    pub prefix: String,
    /// Rust path of the type package (e.g. `crate::types`). When set,
    /// controller artifacts glob-import it so fields typed by other schemas
    /// resolve; otherwise the controller package must bring it into scope.
    pub type_module: Option<String>,
    /// Fail instead of guessing when a type name is not in the registry.
    pub strict_references: bool,
    pub deep_copy: StepSpec,
    pub formatter: StepSpec,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            base_dir: PathBuf::from("."),
            type_package: "types".to_string(),
            controller_package: "controllers".to_string(),
            prefix: DEFAULT_PREFIX.to_string(),
            type_module: None,
            strict_references: false,
            deep_copy: StepSpec::named("builtin"),
            formatter: StepSpec::named("prettyplease"),
        }
    }
}

impl GeneratorConfig {
    /// Default settings for the given base tree and packages.
    pub fn new(
        base_dir: impl Into<PathBuf>,
        type_package: impl Into<String>,
        controller_package: impl Into<String>,
    ) -> Self {
        Self {
            base_dir: base_dir.into(),
            type_package: type_package.into(),
            controller_package: controller_package.into(),
            ..Self::default()
        }
    }

    /// Parses a TOML document; absent keys keep their defaults.
    ///
    /// ## Errors
    ///
    /// Returns [`GeneratorError::ConfigError`] on invalid TOML or unknown keys.
    pub fn from_toml_str(source: &str) -> Result<Self, GeneratorError> {
        toml::from_str(source).map_err(|e| GeneratorError::ConfigError(e.to_string()))
    }

    /// Loads a TOML configuration file.
    ///
    /// ## Errors
    ///
    /// Returns [`GeneratorError::ReadError`] if the file cannot be read and
    /// [`GeneratorError::ConfigError`] if it does not parse.
    pub fn load(path: &Path) -> Result<Self, GeneratorError> {
        let source = fs::read_to_string(path).map_err(|e| GeneratorError::ReadError {
            path: path.display().to_string(),
            source: e,
        })?;
        Self::from_toml_str(&source).map_err(|e| match e {
            GeneratorError::ConfigError(message) => {
                GeneratorError::ConfigError(format!("{}: {message}", path.display()))
            }
            other => other,
        })
    }

    /// Checks packages, prefix and step specs.
    ///
    /// ## Errors
    ///
    /// Returns [`GeneratorError::ConfigError`] describing the first problem.
    pub fn validate(&self) -> Result<(), GeneratorError> {
        validate_package("type_package", &self.type_package)?;
        validate_package("controller_package", &self.controller_package)?;

        if normalized(&self.type_package) == normalized(&self.controller_package) {
            return Err(GeneratorError::ConfigError(format!(
                "type_package and controller_package must differ (both '{}')",
                self.type_package
            )));
        }

        if self.prefix.is_empty()
            || self.prefix.starts_with('.')
            || self.prefix.contains(['/', '\\'])
        {
            return Err(GeneratorError::ConfigError(format!(
                "prefix '{}' must be a non-empty file name prefix",
                self.prefix
            )));
        }

        if self.prefix != self.prefix.to_lowercase() {
            return Err(GeneratorError::ConfigError(format!(
                "prefix '{}' must be lowercase (generated file names are lowercased)",
                self.prefix
            )));
        }

        if let Some(module) = &self.type_module
            && syn::parse_str::<syn::Path>(module).is_err()
        {
            return Err(GeneratorError::ConfigError(format!(
                "type_module '{module}' must be a Rust path such as 'crate::types'"
            )));
        }

        self.deep_copy_step()?;
        self.formatter_step()?;
        Ok(())
    }

    /// Directory receiving type artifacts.
    pub fn type_dir(&self) -> PathBuf {
        self.base_dir.join(&self.type_package)
    }

    /// Directory receiving controller artifacts.
    pub fn controller_dir(&self) -> PathBuf {
        self.base_dir.join(&self.controller_package)
    }

    /// Builds the derived-copy step.
    ///
    /// ## Errors
    ///
    /// Returns [`GeneratorError::ConfigError`] for an unknown built-in name or
    /// an empty command.
    pub fn deep_copy_step(&self) -> Result<Box<dyn PostProcess>, GeneratorError> {
        match &self.deep_copy {
            StepSpec::Named(name) if name == "builtin" => {
                Ok(Box::new(DeepCopyGen::new(&self.prefix)))
            }
            StepSpec::Named(name) => Err(GeneratorError::ConfigError(format!(
                "unknown deep_copy step '{name}' (expected 'builtin' or a command)"
            ))),
            StepSpec::Command { command, per_file } => Ok(Box::new(CommandStep::new(
                "deep_copy",
                command,
                *per_file,
                &self.prefix,
            )?)),
        }
    }

    /// Builds the formatter step.
    ///
    /// ## Errors
    ///
    /// Returns [`GeneratorError::ConfigError`] for an unknown built-in name or
    /// an empty command.
    pub fn formatter_step(&self) -> Result<Box<dyn PostProcess>, GeneratorError> {
        match &self.formatter {
            StepSpec::Named(name) if name == "prettyplease" => {
                Ok(Box::new(PrettyPleaseFormatter::new(&self.prefix)))
            }
            StepSpec::Named(name) if name == "rustfmt" => {
                Ok(Box::new(CommandStep::rustfmt(&self.prefix)))
            }
            StepSpec::Named(name) => Err(GeneratorError::ConfigError(format!(
                "unknown formatter '{name}' (expected 'prettyplease', 'rustfmt' or a command)"
            ))),
            StepSpec::Command { command, per_file } => Ok(Box::new(CommandStep::new(
                "formatter",
                command,
                *per_file,
                &self.prefix,
            )?)),
        }
    }
}

fn normalized(package: &str) -> PathBuf {
    Path::new(package)
        .components()
        .filter(|c| *c != Component::CurDir)
        .collect()
}

/// A package must be a relative path that stays inside the base tree.
fn validate_package(key: &str, package: &str) -> Result<(), GeneratorError> {
    let path = Path::new(package);
    let escapes = path
        .components()
        .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir));

    if package.is_empty() || escapes || path.components().all(|c| c == Component::CurDir) {
        return Err(GeneratorError::ConfigError(format!(
            "{key} '{package}' must be a relative path inside the base directory"
        )));
    }
    Ok(())
}
