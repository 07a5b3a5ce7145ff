//! Error types for the kinds generator.

use kinds_define::{DefineError, DescriptorError};
use thiserror::Error;

/// Errors that can occur during a generation run.
///
/// Every variant aborts the run. Lookup misses (unknown type names, actions
/// whose output schema does not exist) are deliberately not represented here:
/// they degrade to a fallback instead of failing.
#[derive(Debug, Error)]
pub enum GeneratorError {
    /// A field carries a malformed type descriptor
    #[error("Invalid type descriptor on field '{field}' of schema '{schema}': {source}")]
    Descriptor {
        schema: String,
        field: String,
        #[source]
        source: DescriptorError,
    },

    /// A template produced code that does not parse
    #[error("Template '{template}' produced invalid code: {message}")]
    Template {
        template: &'static str,
        message: String,
    },

    /// A template was given context data it cannot render
    #[error("Template '{template}' cannot render {message}")]
    TemplateContext {
        template: &'static str,
        message: String,
    },

    /// Failed to write output file
    #[error("Failed to write output file '{path}': {source}")]
    WriteError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Failed to read a previously generated file
    #[error("Failed to read generated file '{path}': {source}")]
    ReadError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Failed to create an output directory
    #[error("Failed to create output directory '{path}': {source}")]
    CreateDir {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Failed to list an output directory
    #[error("Failed to list output directory '{path}': {source}")]
    ReadDir {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Failed to delete a stale generated artifact
    #[error("failed to delete {path}: {source}")]
    Cleanup {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Two schemas map to the same artifact file
    #[error("Schema '{schema}' would overwrite '{path}', already written in this run")]
    FileNameCollision { schema: String, path: String },

    /// A type name fell back to its capitalized form while strict references are on
    #[error("Schema '{schema}' references unknown type '{name}'")]
    UnresolvedReference { schema: String, name: String },

    /// An external post-processing program could not be started
    #[error("Failed to launch '{program}' for step '{step}': {source}")]
    Spawn {
        step: String,
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// A post-processing step reported failure
    #[error("Post-processing step '{step}' failed: {message}")]
    PostProcess { step: String, message: String },

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    ConfigError(String),

    /// The schema registry could not be built or loaded
    #[error(transparent)]
    Registry(#[from] DefineError),
}
