//! The generation pipeline.
//!
//! A run is a strict sequence of fallible stages; the first error aborts it:
//!
//! ```text
//! prepare dirs
//!   -> for each schema (registry order, meta-schemas skipped):
//!        type artifact, then controller artifact if the collection is listable
//!   -> aggregate client
//!   -> derived copies (controller package)
//!   -> format controller package
//!   -> format type package
//!   -> manifests
//! ```
//!
//! Nothing is rolled back. Files written before a failure stay on disk until
//! the next successful run cleans them up.

use std::path::PathBuf;

use kinds_define::{Schema, SchemaRegistry};
use tracing::{debug, info, warn};

use crate::codegen::{RustTemplates, Templates};
use crate::config::{GeneratorConfig, default_source_tree};
use crate::dirs::{prepare_dirs, write_manifest};
use crate::errors::GeneratorError;
use crate::naming::{client_file_name, deep_copy_file_name};
use crate::output::{Artifact, ArtifactEmitter};
use crate::postprocess::PostProcess;

/// Schema identifiers of the schema system's own meta-model; never generated.
pub const BLOCKED_SCHEMAS: [&str; 3] = ["schema", "resource", "collection"];

/// Outcome of a successful run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Report {
    /// Schemas with a type artifact, in generation order.
    pub generated: Vec<String>,
    /// Schemas with a controller artifact.
    pub controllers: Vec<String>,
    /// Meta-schemas that were skipped.
    pub skipped: Vec<String>,
    /// Every generator-owned file left in the output directories, sorted.
    pub files: Vec<PathBuf>,
    /// `(schema, type name)` pairs that fell back to a capitalized guess.
    pub degraded: Vec<(String, String)>,
}

/// Configured generation pipeline.
///
/// ## Examples
///
/// ```no_run
/// use kinds_define::Schemas;
/// use kinds_gen::{Generator, GeneratorConfig};
///
/// let registry = Schemas::load("schemas.yaml".as_ref())?;
/// let config = GeneratorConfig::new("src", "client/generated", "controllers/generated");
/// let report = Generator::new(config).run(&registry)?;
/// println!("generated {} schemas", report.generated.len());
/// # Ok::<(), kinds_gen::GeneratorError>(())
/// ```
pub struct Generator {
    config: GeneratorConfig,
    templates: Box<dyn Templates>,
    deep_copy: Option<Box<dyn PostProcess>>,
    formatter: Option<Box<dyn PostProcess>>,
}

impl Generator {
    /// A generator using the built-in templates and the configured steps.
    pub fn new(config: GeneratorConfig) -> Self {
        Self {
            config,
            templates: Box::new(RustTemplates),
            deep_copy: None,
            formatter: None,
        }
    }

    /// Replaces the templates.
    pub fn with_templates(mut self, templates: impl Templates + 'static) -> Self {
        self.templates = Box::new(templates);
        self
    }

    /// Replaces the configured derived-copy step.
    pub fn with_deep_copy(mut self, step: impl PostProcess + 'static) -> Self {
        self.deep_copy = Some(Box::new(step));
        self
    }

    /// Replaces the configured formatter.
    pub fn with_formatter(mut self, step: impl PostProcess + 'static) -> Self {
        self.formatter = Some(Box::new(step));
        self
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// Runs the full pipeline against `registry`.
    ///
    /// ## Errors
    ///
    /// Returns the first error of any stage. Configuration errors are
    /// reported before any file is touched.
    pub fn run(&self, registry: &dyn SchemaRegistry) -> Result<Report, GeneratorError> {
        let config = &self.config;
        config.validate()?;

        let configured_deep_copy;
        let deep_copy: &dyn PostProcess = match &self.deep_copy {
            Some(step) => step.as_ref(),
            None => {
                configured_deep_copy = config.deep_copy_step()?;
                configured_deep_copy.as_ref()
            }
        };
        let configured_formatter;
        let formatter: &dyn PostProcess = match &self.formatter {
            Some(step) => step.as_ref(),
            None => {
                configured_formatter = config.formatter_step()?;
                configured_formatter.as_ref()
            }
        };

        let type_dir = config.type_dir();
        let controller_dir = config.controller_dir();
        info!(
            types = %type_dir.display(),
            controllers = %controller_dir.display(),
            "Preparing output directories"
        );
        prepare_dirs(&[&type_dir, &controller_dir], &config.prefix)?;

        let mut emitter = ArtifactEmitter::new(self.templates.as_ref(), registry, &config.prefix)
            .with_type_module(config.type_module.as_deref());
        emitter.reserve(type_dir.join(client_file_name(&config.prefix)));
        emitter.reserve(controller_dir.join(deep_copy_file_name(&config.prefix)));

        let mut report = Report::default();
        let mut generated: Vec<&Schema> = Vec::new();

        for schema in registry.schemas() {
            if BLOCKED_SCHEMAS.contains(&schema.id.as_str()) {
                debug!(schema = %schema.id, "Skipping meta-schema");
                report.skipped.push(schema.id.clone());
                continue;
            }

            let artifact = emitter.emit_type(&type_dir, schema)?;
            self.check_degraded(schema, &artifact, &mut report)?;

            if schema.is_listable() {
                let artifact = emitter.emit_controller(&controller_dir, schema)?;
                self.check_degraded(schema, &artifact, &mut report)?;
                report.controllers.push(schema.id.clone());
            }

            report.generated.push(schema.id.clone());
            generated.push(schema);
        }

        emitter.emit_client(&type_dir, &generated)?;

        let base = &config.base_dir;
        info!(step = deep_copy.name(), package = %config.controller_package, "Running derived copies");
        deep_copy.run(base, &config.controller_package)?;

        for package in [&config.controller_package, &config.type_package] {
            info!(step = formatter.name(), package = %package, "Formatting package");
            formatter.run(base, package)?;
        }

        for dir in [&type_dir, &controller_dir] {
            let manifest = write_manifest(dir, &config.prefix)?;
            report
                .files
                .extend(manifest.files.iter().map(|name| dir.join(name)));
        }
        report.files.sort();

        info!(
            generated = report.generated.len(),
            controllers = report.controllers.len(),
            files = report.files.len(),
            "Generation complete"
        );
        Ok(report)
    }

    /// Logs degraded references, failing on the first one in strict mode.
    fn check_degraded(
        &self,
        schema: &Schema,
        artifact: &Artifact,
        report: &mut Report,
    ) -> Result<(), GeneratorError> {
        for name in &artifact.degraded {
            if self.config.strict_references {
                return Err(GeneratorError::UnresolvedReference {
                    schema: schema.id.clone(),
                    name: name.clone(),
                });
            }

            warn!(
                schema = %schema.id,
                name = %name,
                path = %artifact.path.display(),
                "Unknown type name, assuming capitalized form"
            );
            let entry = (schema.id.clone(), name.clone());
            if !report.degraded.contains(&entry) {
                report.degraded.push(entry);
            }
        }
        Ok(())
    }
}

/// Generates all artifacts for `registry` with the default configuration.
///
/// Packages are resolved against the base source tree named by
/// `KINDS_SOURCE_TREE`, or the current directory.
///
/// ## Errors
///
/// Returns the first error of any stage; see [`Generator::run`].
pub fn generate(
    registry: &dyn SchemaRegistry,
    type_package: &str,
    controller_package: &str,
) -> Result<Report, GeneratorError> {
    let config = GeneratorConfig::new(default_source_tree(), type_package, controller_package);
    Generator::new(config).run(registry)
}
