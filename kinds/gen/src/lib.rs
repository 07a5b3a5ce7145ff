//! Kinds code generator library.
//!
//! This crate turns resource schemas defined with `kinds-define` into Rust
//! source artifacts. For every schema it writes:
//!
//! - A type artifact: identifier constants, the public resource struct, a
//!   collection wrapper and an operations trait
//! - A controller artifact, when the collection can be listed, reflecting the
//!   schema's internal variant if it declares one
//!
//! plus one aggregate client over everything generated. Derived-copy helpers
//! and formatting run as post-processing steps.
//!
//! ## Modules
//!
//! - [`resolver`] - Type descriptors to Rust type expressions
//! - [`projection`] - Per-schema field types and bindable actions
//! - [`codegen`] - Templates for the three artifact kinds
//! - [`output`] - Validation, formatting, atomic writes and the emitter
//! - [`dirs`] - Output directory cleanup and the ownership manifest
//! - [`postprocess`] - Derived copies and formatting steps
//! - [`config`] - `kinds.toml` configuration
//! - [`generator`] - The pipeline tying it all together
//! - [`errors`] - Error types for the generator
//!
//! ## Example Usage
//!
//! ```no_run
//! use kinds_define::{ApiVersion, Field, HttpMethod, Schema, Schemas};
//! use kinds_gen::generate;
//!
//! let v1 = ApiVersion::new("", "v1");
//! let registry = Schemas::from_schemas([
//!     Schema::new("pod", v1.clone())
//!         .field(Field::new("nodeName", "reference[node]"))
//!         .collection_methods([HttpMethod::Get]),
//!     Schema::new("node", v1),
//! ])?;
//!
//! let report = generate(&registry, "client/generated", "controllers/generated")?;
//! assert_eq!(report.generated, ["pod", "node"]);
//! # Ok::<(), kinds_gen::GeneratorError>(())
//! ```
//!
//! ## Using the Output
//!
//! Generated files reach their siblings through `use super::*`, so the
//! package's handwritten `mod.rs` declares the generated modules and
//! re-exports them:
//!
//! ```text
//! mod zz_generated_pod;
//! mod zz_generated_client;
//! pub use zz_generated_pod::*;
//! pub use zz_generated_client::*;
//! ```
//!
//! Controller structs may hold fields typed by other schemas, which live in
//! the type package. Set `type_module` (e.g. `crate::types`) so controller
//! artifacts import it, or add the equivalent `use crate::types::*;` to the
//! controller package's `mod.rs`.

pub mod codegen;
pub mod config;
pub mod dirs;
pub mod errors;
pub mod generator;
pub mod naming;
pub mod output;
pub mod postprocess;
pub mod projection;
pub mod resolver;

#[cfg(test)]
pub(crate) mod test_utils;

pub use codegen::{RustTemplates, Templates};
pub use config::{GeneratorConfig, StepSpec};
pub use errors::GeneratorError;
pub use generator::{BLOCKED_SCHEMAS, Generator, Report, generate};
pub use postprocess::{CommandStep, DeepCopyGen, PostProcess, PrettyPleaseFormatter};
