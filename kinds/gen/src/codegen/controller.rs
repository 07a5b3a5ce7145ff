//! Controller artifact generation.
//!
//! Controllers reflect the internal shape of a resource, so the context
//! passed here is projected from
//! [`Schema::controller_schema`](kinds_define::Schema::controller_schema),
//! not from the public schema.
//!
//! Fields typed by another schema name that schema's type artifact, which
//! lives in the type package. With [`SchemaContext::type_module`] set the
//! artifact imports that package itself; otherwise the controller package
//! has to bring it into scope for `use super::*`.

use proc_macro2::TokenStream;
use quote::quote;

use super::{SchemaContext, preamble, struct_fields};
use crate::errors::GeneratorError;
use crate::naming::{const_ident, ident};

/// Template name used in error reports.
pub const TEMPLATE: &str = "controller";

/// Generates the controller artifact for a (controller) schema.
///
/// Produces the resource struct, a list wrapper, a boxed handler alias and
/// the `Lister`, `Controller` and `Lifecycle` traits a runtime implements.
///
/// ## Errors
///
/// Returns [`GeneratorError::TemplateContext`] when the code name cannot be
/// turned into a Rust identifier or the type module is not a Rust path.
pub fn generate_controller_file(ctx: &SchemaContext<'_>) -> Result<TokenStream, GeneratorError> {
    let schema = ctx.schema;
    let code = &schema.code_name;

    let group_version = const_ident(TEMPLATE, code, "GroupVersion")?;
    let version = schema.version.to_string();

    let name = ident(TEMPLATE, code)?;
    let list = ident(TEMPLATE, &format!("{code}List"))?;
    let handler = ident(TEMPLATE, &format!("{code}HandlerFunc"))?;
    let lister = ident(TEMPLATE, &format!("{code}Lister"))?;
    let controller = ident(TEMPLATE, &format!("{code}Controller"))?;
    let lifecycle = ident(TEMPLATE, &format!("{code}Lifecycle"))?;

    let fields = struct_fields(TEMPLATE, ctx.projection)?;
    let struct_doc = format!(" Internal shape of the `{}` resource.", schema.id);
    let preamble = preamble();
    let type_import = ctx
        .type_module
        .map(|module| {
            syn::parse_str::<syn::Path>(module)
                .map(|path| {
                    quote! {
                        #[allow(unused_imports)]
                        use #path::*;
                    }
                })
                .map_err(|_| GeneratorError::TemplateContext {
                    template: TEMPLATE,
                    message: format!("'{module}' as a module path"),
                })
        })
        .transpose()?;

    Ok(quote! {
        #preamble
        #type_import

        /// API group and version served by this controller.
        pub const #group_version: &str = #version;

        #[doc = #struct_doc]
        #[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
        pub struct #name {
            #(#fields)*
        }

        #[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
        pub struct #list {
            #[serde(default)]
            pub items: Vec<#name>,
        }

        /// Handler invoked with the object key and the current object, if any.
        pub type #handler = Box<
            dyn Fn(&str, Option<&#name>) -> Result<Option<#name>, Box<dyn std::error::Error + Send + Sync>>
                + Send
                + Sync,
        >;

        pub trait #lister {
            fn list(&self, namespace: &str) -> Vec<#name>;

            fn get(&self, namespace: &str, name: &str) -> Option<#name>;
        }

        pub trait #controller {
            fn lister(&self) -> &dyn #lister;

            fn add_handler(&mut self, name: &str, handler: #handler);

            fn enqueue(&self, namespace: &str, name: &str);
        }

        pub trait #lifecycle {
            type Error;

            fn create(&self, obj: #name) -> Result<#name, Self::Error>;

            fn remove(&self, obj: #name) -> Result<#name, Self::Error>;

            fn updated(&self, obj: #name) -> Result<#name, Self::Error>;
        }
    })
}
