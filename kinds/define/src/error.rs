//! Error types for schema definitions.

use thiserror::Error;

/// Errors produced while parsing a field's type descriptor string.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DescriptorError {
    /// The descriptor string was empty.
    #[error("type descriptor is empty")]
    Empty,

    /// A container or reference form is missing its closing bracket.
    #[error("type descriptor '{0}' is missing its closing ']'")]
    Unterminated(String),

    /// A container or reference form has nothing between its brackets.
    #[error("type descriptor '{0}' has an empty inner type")]
    EmptyInner(String),

    /// A leaf name contains a bracket that does not belong to any known form.
    #[error("type descriptor '{0}' contains an unexpected bracket")]
    UnexpectedBracket(String),
}

/// Errors that can occur while building or loading a schema registry.
#[derive(Debug, Error)]
pub enum DefineError {
    /// A field's type descriptor is malformed.
    #[error("invalid type descriptor: {0}")]
    Descriptor(#[from] DescriptorError),

    /// A schema with the same identifier is already registered for the version.
    #[error("duplicate schema '{id}' in version '{version}'")]
    DuplicateSchema {
        /// The schema identifier.
        id: String,
        /// The version the identifier collides in.
        version: String,
    },

    /// A schema document could not be read from disk.
    #[error("failed to read schema document '{path}': {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// A schema document could not be deserialized.
    #[error("failed to parse schema document '{path}': {message}")]
    Parse { path: String, message: String },

    /// The schema document has an extension we do not know how to read.
    #[error("unsupported schema document '{0}': expected .json, .yaml or .yml")]
    UnsupportedFormat(String),
}
