//! Artifact rendering, validation and file writing.
//!
//! ## Output Structure
//!
//! One run writes into two packages under the base source tree:
//! ```text
//! <base>/<type_package>/
//! ├── zz_generated_pod.rs         # type artifact per schema
//! ├── zz_generated_service.rs
//! ├── zz_generated_client.rs      # aggregate client
//! └── .kinds-manifest
//! <base>/<controller_package>/
//! ├── zz_generated_pod_controller.rs
//! ├── zz_generated_deepcopy.rs    # written by the derived-copy step
//! └── .kinds-manifest
//! ```
//!
//! ## Safety Guarantees
//!
//! - **Validation**: Generated code is parsed with `syn` before writing
//! - **Formatting**: Output is printed with `prettyplease`
//! - **Atomic writes**: Temp file + rename, so no artifact is ever half-written
//! - **No overwrites**: Two schemas mapping to one file name abort the run

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use kinds_define::{Schema, SchemaRegistry};
use proc_macro2::TokenStream;
use tracing::{debug, info};

use crate::codegen::{ClientContext, SchemaContext, Templates};
use crate::errors::GeneratorError;
use crate::naming::{client_file_name, controller_file_name, type_file_name};
use crate::projection::project;

/// First line of every generated file.
pub const GENERATED_HEADER: &str = "// Code generated by kinds-gen. DO NOT EDIT.";

/// Validates generated code by parsing it with syn.
///
/// ## Errors
///
/// Returns [`GeneratorError::Template`] naming `template` if the tokens do
/// not form a valid Rust file.
pub fn validate_code(
    template: &'static str,
    tokens: &TokenStream,
) -> Result<syn::File, GeneratorError> {
    syn::parse2(tokens.clone()).map_err(|e| GeneratorError::Template {
        template,
        message: e.to_string(),
    })
}

/// Formats a parsed file with prettyplease, prepending [`GENERATED_HEADER`].
pub fn format_code(file: &syn::File) -> String {
    let formatted = prettyplease::unparse(file);
    format!("{GENERATED_HEADER}\n\n{formatted}")
}

/// Writes content to a file atomically using temp file + rename.
///
/// ## Errors
///
/// Returns `GeneratorError::WriteError` if:
/// - Parent directories cannot be created
/// - The temp file cannot be written
/// - The rename operation fails
pub fn write_atomic(path: &Path, content: &str) -> Result<(), GeneratorError> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent).map_err(|e| GeneratorError::WriteError {
            path: parent.display().to_string(),
            source: e,
        })?;
    }

    let temp_path = path.with_extension("tmp");
    fs::write(&temp_path, content).map_err(|e| GeneratorError::WriteError {
        path: temp_path.display().to_string(),
        source: e,
    })?;

    fs::rename(&temp_path, path).map_err(|e| GeneratorError::WriteError {
        path: path.display().to_string(),
        source: e,
    })?;

    Ok(())
}

/// A file written for one schema.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    pub path: PathBuf,
    /// Type names that fell back to a capitalized guess while projecting.
    pub degraded: Vec<String>,
}

/// Renders and writes per-schema artifacts and the aggregate client.
///
/// The emitter remembers every path it wrote (and every path reserved for
/// later steps) for the lifetime of a run and refuses to write a second
/// schema over the first.
pub struct ArtifactEmitter<'a> {
    templates: &'a dyn Templates,
    registry: &'a dyn SchemaRegistry,
    prefix: &'a str,
    type_module: Option<&'a str>,
    written: HashSet<PathBuf>,
    reserved: HashSet<PathBuf>,
}

impl<'a> ArtifactEmitter<'a> {
    pub fn new(
        templates: &'a dyn Templates,
        registry: &'a dyn SchemaRegistry,
        prefix: &'a str,
    ) -> Self {
        Self {
            templates,
            registry,
            prefix,
            type_module: None,
            written: HashSet::new(),
            reserved: HashSet::new(),
        }
    }

    /// Makes controller artifacts import the type package at `module`.
    pub fn with_type_module(mut self, module: Option<&'a str>) -> Self {
        self.type_module = module;
        self
    }

    /// Reserves a path that a later step writes, so no schema claims it.
    pub fn reserve(&mut self, path: PathBuf) {
        self.reserved.insert(path);
    }

    /// Writes the type artifact of `schema` into `dir`.
    ///
    /// ## Errors
    ///
    /// Fails on malformed field descriptors, template failures, file name
    /// collisions and I/O errors.
    pub fn emit_type(&mut self, dir: &Path, schema: &Schema) -> Result<Artifact, GeneratorError> {
        let projection = project(schema, self.registry)?;
        let text = self.templates.render_type(&SchemaContext {
            schema,
            projection: &projection,
            type_module: None,
        })?;

        let path = dir.join(type_file_name(self.prefix, &schema.id));
        self.write(&schema.id, &path, &text)?;
        info!(schema = %schema.id, path = %path.display(), "Wrote type artifact");

        Ok(Artifact {
            path,
            degraded: projection.degraded,
        })
    }

    /// Writes the controller artifact of `schema` into `dir`.
    ///
    /// The artifact reflects the internal variant of the schema when one is
    /// declared; the file name always follows the public identifier.
    ///
    /// ## Errors
    ///
    /// Same as [`ArtifactEmitter::emit_type`].
    pub fn emit_controller(
        &mut self,
        dir: &Path,
        schema: &Schema,
    ) -> Result<Artifact, GeneratorError> {
        let internal = schema.controller_schema();
        let projection = project(internal, self.registry)?;
        let text = self.templates.render_controller(&SchemaContext {
            schema: internal,
            projection: &projection,
            type_module: self.type_module,
        })?;

        let path = dir.join(controller_file_name(self.prefix, &schema.id));
        self.write(&schema.id, &path, &text)?;
        info!(schema = %schema.id, path = %path.display(), "Wrote controller artifact");

        Ok(Artifact {
            path,
            degraded: projection.degraded,
        })
    }

    /// Writes the aggregate client over `schemas` into `dir`.
    ///
    /// ## Errors
    ///
    /// Fails on template failures, a collision with a schema artifact and
    /// I/O errors.
    pub fn emit_client(
        &mut self,
        dir: &Path,
        schemas: &[&Schema],
    ) -> Result<PathBuf, GeneratorError> {
        let text = self.templates.render_client(&ClientContext { schemas })?;

        let path = dir.join(client_file_name(self.prefix));
        self.reserved.remove(&path);
        self.write("client", &path, &text)?;
        info!(path = %path.display(), schemas = schemas.len(), "Wrote client artifact");

        Ok(path)
    }

    fn write(&mut self, owner: &str, path: &Path, text: &str) -> Result<(), GeneratorError> {
        if self.written.contains(path) || self.reserved.contains(path) {
            return Err(GeneratorError::FileNameCollision {
                schema: owner.to_string(),
                path: path.display().to_string(),
            });
        }

        write_atomic(path, text)?;
        debug!(path = %path.display(), bytes = text.len(), "Artifact written");
        self.written.insert(path.to_path_buf());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codegen::RustTemplates;
    use crate::test_utils::{registry, registry_with_meta, v1};
    use kinds_define::Schemas;
    use quote::quote;
    use tempfile::TempDir;

    // === validate_code tests ===

    #[test]
    fn validate_code_rejects_invalid_code() {
        let invalid_tokens = quote! {
            let x =
        };

        match validate_code("type", &invalid_tokens) {
            Err(GeneratorError::Template { template, .. }) => assert_eq!(template, "type"),
            Err(other) => panic!("Unexpected error type: {:?}", other),
            Ok(_) => panic!("Expected error but got success"),
        }
    }

    #[test]
    fn format_code_prepends_header() {
        let file = validate_code("type", &quote! { pub struct Pod; }).unwrap();
        let formatted = format_code(&file);

        assert!(formatted.starts_with(GENERATED_HEADER));
        assert!(formatted.contains("pub struct Pod;"));
    }

    // === write_atomic tests ===

    #[test]
    fn write_atomic_creates_parent_directories() {
        let temp_dir = TempDir::new().unwrap();
        let file_path = temp_dir.path().join("nested/deep/zz_generated_pod.rs");

        write_atomic(&file_path, "// Nested content").unwrap();
        assert_eq!(fs::read_to_string(&file_path).unwrap(), "// Nested content");
    }

    #[test]
    fn write_atomic_overwrites_existing_file() {
        let temp_dir = TempDir::new().unwrap();
        let file_path = temp_dir.path().join("existing.rs");
        fs::write(&file_path, "// Old content").unwrap();

        write_atomic(&file_path, "// New content").unwrap();

        assert_eq!(fs::read_to_string(&file_path).unwrap(), "// New content");
        assert!(!file_path.with_extension("tmp").exists());
    }

    // === ArtifactEmitter tests ===

    #[test]
    fn emit_type_writes_prefixed_file() {
        let temp_dir = TempDir::new().unwrap();
        let registry = registry();
        let pod = registry.schema(&v1(), "pod").unwrap();

        let mut emitter = ArtifactEmitter::new(&RustTemplates, &registry, "zz_generated");
        let artifact = emitter.emit_type(temp_dir.path(), pod).unwrap();

        assert_eq!(artifact.path, temp_dir.path().join("zz_generated_pod.rs"));
        assert_eq!(artifact.degraded, ["container"]);
        let code = fs::read_to_string(&artifact.path).unwrap();
        assert!(code.contains("pub struct Pod {"));
    }

    #[test]
    fn emit_controller_uses_internal_schema() {
        let temp_dir = TempDir::new().unwrap();
        let registry = registry();
        let pod = registry.schema(&v1(), "pod").unwrap();

        let mut emitter = ArtifactEmitter::new(&RustTemplates, &registry, "zz_generated");
        let artifact = emitter.emit_controller(temp_dir.path(), pod).unwrap();

        assert_eq!(artifact.path, temp_dir.path().join("zz_generated_pod_controller.rs"));
        let code = fs::read_to_string(&artifact.path).unwrap();
        assert!(code.contains("internal_state"));
        assert!(!code.contains("restart_count"));
    }

    #[test]
    fn emit_controller_imports_configured_type_module() {
        let temp_dir = TempDir::new().unwrap();
        let registry = registry();
        let pod = registry.schema(&v1(), "pod").unwrap();

        let mut emitter = ArtifactEmitter::new(&RustTemplates, &registry, "zz_generated")
            .with_type_module(Some("crate::types"));
        let controller = emitter.emit_controller(temp_dir.path(), pod).unwrap();
        let types = emitter.emit_type(temp_dir.path(), pod).unwrap();

        assert!(fs::read_to_string(&controller.path).unwrap().contains("use crate::types::*;"));
        assert!(!fs::read_to_string(&types.path).unwrap().contains("use crate::types::*;"));
    }

    #[test]
    fn emit_client_lists_given_schemas() {
        let temp_dir = TempDir::new().unwrap();
        let registry = registry_with_meta();
        let pod = registry.schema(&v1(), "pod").unwrap();
        let service = registry.schema(&v1(), "service").unwrap();

        let mut emitter = ArtifactEmitter::new(&RustTemplates, &registry, "zz_generated");
        let path = emitter.emit_client(temp_dir.path(), &[pod, service]).unwrap();

        let code = fs::read_to_string(path).unwrap();
        assert!(code.contains(r#"&["pod", "service"]"#));
    }

    #[test]
    fn colliding_file_names_are_rejected() {
        let temp_dir = TempDir::new().unwrap();
        let registry = Schemas::from_schemas([
            Schema::new("podSpec", v1()),
            Schema::new("pod_spec", v1()).with_code_name("PodSpecAlt"),
        ])
        .unwrap();

        let mut emitter = ArtifactEmitter::new(&RustTemplates, &registry, "zz_generated");
        let first = registry.schema(&v1(), "podSpec").unwrap();
        let second = registry.schema(&v1(), "pod_spec").unwrap();
        emitter.emit_type(temp_dir.path(), first).unwrap();

        match emitter.emit_type(temp_dir.path(), second) {
            Err(GeneratorError::FileNameCollision { schema, .. }) => assert_eq!(schema, "pod_spec"),
            other => panic!("Unexpected result: {:?}", other),
        }
    }

    #[test]
    fn reserved_paths_are_protected() {
        let temp_dir = TempDir::new().unwrap();
        let registry = Schemas::from_schemas([Schema::new("client", v1())]).unwrap();
        let client = registry.schema(&v1(), "client").unwrap();

        let mut emitter = ArtifactEmitter::new(&RustTemplates, &registry, "zz_generated");
        emitter.reserve(temp_dir.path().join("zz_generated_client.rs"));

        assert!(matches!(
            emitter.emit_type(temp_dir.path(), client),
            Err(GeneratorError::FileNameCollision { .. })
        ));
        assert!(emitter.emit_client(temp_dir.path(), &[]).is_ok());
    }
}
