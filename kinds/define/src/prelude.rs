//! Convenient re-exports for building schema registries.
//!
//! ```
//! use kinds_define::prelude::*;
//!
//! let registry = Schemas::from_schemas([
//!     Schema::new("pod", ApiVersion::new("", "v1")).collection_methods([HttpMethod::Get]),
//! ])
//! .unwrap();
//! assert_eq!(registry.schemas().len(), 1);
//! ```

pub use crate::descriptor::{Builtin, TypeDescriptor};
pub use crate::error::{DefineError, DescriptorError};
pub use crate::registry::{Lookup, SchemaRegistry, Schemas, lookup};
pub use crate::schema::{Action, Field, Schema};
pub use crate::types::{ApiVersion, HttpMethod};
