//! Templates that render generated artifacts.
//!
//! Each artifact kind has a generator returning a `proc_macro2::TokenStream`:
//!
//! - [`type_file`] - Public resource struct, collection, constants and operations trait
//! - [`controller`] - Internal resource struct, list type and controller traits
//! - [`client`] - The aggregate client over every generated schema
//!
//! [`RustTemplates`] wires them behind the [`Templates`] trait. Token streams
//! are validated with `syn` and printed with `prettyplease` (see
//! [`crate::output`]), so a template that emits malformed code surfaces as
//! [`GeneratorError::Template`] rather than as a broken file.

pub mod client;
pub mod controller;
pub mod type_file;

use proc_macro2::TokenStream;
use quote::quote;
use kinds_define::Schema;

use crate::errors::GeneratorError;
use crate::naming::snake_ident;
use crate::output::{format_code, validate_code};
use crate::projection::Projection;
use crate::resolver::TypeExpr;

pub use client::generate_client_file;
pub use controller::generate_controller_file;
pub use type_file::generate_type_file;

/// Context for the per-schema templates.
#[derive(Debug, Clone, Copy)]
pub struct SchemaContext<'a> {
    pub schema: &'a Schema,
    pub projection: &'a Projection,
    /// Rust path of the type package, glob-imported by controller artifacts.
    pub type_module: Option<&'a str>,
}

/// Context for the aggregate client template.
#[derive(Debug, Clone, Copy)]
pub struct ClientContext<'a> {
    /// Schemas whose type artifact was emitted, in emission order.
    pub schemas: &'a [&'a Schema],
}

/// Renders artifact text from template context.
pub trait Templates {
    fn render_type(&self, ctx: &SchemaContext<'_>) -> Result<String, GeneratorError>;

    fn render_controller(&self, ctx: &SchemaContext<'_>) -> Result<String, GeneratorError>;

    fn render_client(&self, ctx: &ClientContext<'_>) -> Result<String, GeneratorError>;
}

/// The built-in Rust templates.
#[derive(Debug, Clone, Copy, Default)]
pub struct RustTemplates;

impl Templates for RustTemplates {
    fn render_type(&self, ctx: &SchemaContext<'_>) -> Result<String, GeneratorError> {
        render(type_file::TEMPLATE, &generate_type_file(ctx)?)
    }

    fn render_controller(&self, ctx: &SchemaContext<'_>) -> Result<String, GeneratorError> {
        render(controller::TEMPLATE, &generate_controller_file(ctx)?)
    }

    fn render_client(&self, ctx: &ClientContext<'_>) -> Result<String, GeneratorError> {
        render(client::TEMPLATE, &generate_client_file(ctx)?)
    }
}

fn render(template: &'static str, tokens: &TokenStream) -> Result<String, GeneratorError> {
    let file = validate_code(template, tokens)?;
    Ok(format_code(&file))
}

/// Converts a resolved type into tokens.
pub(crate) fn rust_type(
    template: &'static str,
    ty: &TypeExpr,
) -> Result<syn::Type, GeneratorError> {
    ty.to_type().map_err(|_| GeneratorError::TemplateContext {
        template,
        message: format!("'{ty}' as a Rust type"),
    })
}

/// Struct fields for every projected field, in code-name order.
///
/// Fields keep their wire name through `serde(rename)`; `Option` fields are
/// skipped when absent.
pub(crate) fn struct_fields(
    template: &'static str,
    projection: &Projection,
) -> Result<Vec<TokenStream>, GeneratorError> {
    projection
        .fields
        .values()
        .map(|field| {
            let ident = snake_ident(template, &field.code_name)?;
            let ty = rust_type(template, &field.ty)?;
            let wire = &field.name;
            let doc = field
                .description
                .as_ref()
                .map(|d| format!(" {d}"))
                .map(|d| quote! { #[doc = #d] });
            let serde = if field.ty.is_optional() {
                quote! { #[serde(rename = #wire, default, skip_serializing_if = "Option::is_none")] }
            } else {
                quote! { #[serde(rename = #wire, default)] }
            };

            Ok(quote! {
                #doc
                #serde
                pub #ident: #ty,
            })
        })
        .collect()
}

/// Imports shared by every per-schema artifact.
pub(crate) fn preamble() -> TokenStream {
    quote! {
        use serde::{Deserialize, Serialize};

        #[allow(unused_imports)]
        use super::*;
    }
}
