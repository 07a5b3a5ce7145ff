//! Kinds Definition Library
//!
//! This crate provides the abstract resource-schema model consumed by the
//! `kinds-gen` code generator. A schema describes one resource kind: its
//! fields, the HTTP methods it supports and the actions it declares.
//!
//! ## Core Types
//!
//! - [`Schema`] - One resource kind (identifier, version, fields, methods, actions)
//! - [`Field`] - A named, typed attribute of a schema
//! - [`Action`] - A named operation declared on a schema with an output type
//! - [`ApiVersion`] - The group/version a schema belongs to
//! - [`HttpMethod`] - HTTP methods advertised by collections and resources
//! - [`TypeDescriptor`] - The parsed form of a field's type string
//! - [`SchemaRegistry`] - Read-only lookup interface over a set of schemas
//! - [`Schemas`] - The in-memory registry implementation
//!
//! ## Examples
//!
//! ```
//! use kinds_define::{ApiVersion, Field, HttpMethod, Schema, SchemaRegistry, Schemas};
//!
//! let version = ApiVersion::new("apps", "v1");
//! let mut schemas = Schemas::new();
//! schemas
//!     .add(
//!         Schema::new("pod", version.clone())
//!             .field(Field::new("hostName", "string"))
//!             .collection_methods([HttpMethod::Get]),
//!     )
//!     .unwrap();
//!
//! let pod = schemas.schema(&version, "pod").unwrap();
//! assert_eq!(pod.code_name, "Pod");
//! assert!(pod.is_listable());
//! ```

pub mod descriptor;
pub mod error;
pub mod naming;
pub mod prelude;
pub mod registry;
pub mod schema;
pub mod types;

// Re-export main types at crate root
pub use descriptor::{Builtin, TypeDescriptor};
pub use error::{DefineError, DescriptorError};
pub use registry::{Lookup, SchemaRegistry, Schemas, lookup};
pub use schema::{Action, Field, Schema};
pub use types::{ApiVersion, HttpMethod};
