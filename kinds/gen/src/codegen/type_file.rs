//! Type artifact generation.
//!
//! The type artifact is the public shape of one resource: identifier
//! constants, the resource struct, its collection wrapper and an operations
//! trait whose methods follow the HTTP methods the schema advertises.

use kinds_define::HttpMethod;
use kinds_define::naming::capitalize;
use proc_macro2::TokenStream;
use quote::quote;

use super::{SchemaContext, preamble, struct_fields};
use crate::errors::GeneratorError;
use crate::naming::{const_ident, ident, snake_ident};

/// Template name used in error reports.
pub const TEMPLATE: &str = "type";

/// Generates the type artifact for a schema.
///
/// ## Examples
///
/// For a schema `pod` with one `hostName: string` field and collection
/// methods `GET`, the generated code is:
/// ```ignore
/// pub const POD_TYPE: &str = "pod";
/// pub const POD_FIELD_HOST_NAME: &str = "hostName";
///
/// #[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
/// pub struct Pod {
///     #[serde(rename = "hostName", default)]
///     pub host_name: String,
/// }
///
/// #[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
/// pub struct PodCollection {
///     #[serde(default)]
///     pub data: Vec<Pod>,
/// }
///
/// pub trait PodOperations {
///     type Error;
///     fn list(&self) -> Result<PodCollection, Self::Error>;
/// }
/// ```
///
/// ## Errors
///
/// Returns [`GeneratorError::TemplateContext`] when a code name cannot be
/// turned into a Rust identifier or type.
pub fn generate_type_file(ctx: &SchemaContext<'_>) -> Result<TokenStream, GeneratorError> {
    let schema = ctx.schema;
    let code = &schema.code_name;

    let type_const = const_ident(TEMPLATE, code, "Type")?;
    let id = &schema.id;

    let field_consts = ctx
        .projection
        .fields
        .values()
        .map(|field| {
            let name = const_ident(TEMPLATE, code, &format!("Field{}", field.code_name))?;
            let wire = &field.name;
            Ok(quote! { pub const #name: &str = #wire; })
        })
        .collect::<Result<Vec<_>, GeneratorError>>()?;

    let struct_name = ident(TEMPLATE, code)?;
    let collection_name = ident(TEMPLATE, &format!("{code}Collection"))?;
    let operations_name = ident(TEMPLATE, &format!("{code}Operations"))?;
    let fields = struct_fields(TEMPLATE, ctx.projection)?;
    let struct_doc = format!(" Public shape of the `{id}` resource ({}).", schema.version);
    let operations = operations(ctx)?;
    let preamble = preamble();

    Ok(quote! {
        #preamble

        /// Resource type identifier.
        pub const #type_const: &str = #id;

        #(#field_consts)*

        #[doc = #struct_doc]
        #[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
        pub struct #struct_name {
            #(#fields)*
        }

        #[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
        pub struct #collection_name {
            #[serde(default)]
            pub data: Vec<#struct_name>,
            #[serde(rename = "continue", default, skip_serializing_if = "Option::is_none")]
            pub continue_token: Option<String>,
        }

        pub trait #operations_name {
            type Error;

            #(#operations)*
        }
    })
}

/// Operation signatures gated on advertised methods, then one per action.
fn operations(ctx: &SchemaContext<'_>) -> Result<Vec<TokenStream>, GeneratorError> {
    let schema = ctx.schema;
    let struct_name = ident(TEMPLATE, &schema.code_name)?;
    let collection_name = ident(TEMPLATE, &format!("{}Collection", schema.code_name))?;

    let collection = |method| schema.collection_methods.contains(&method);
    let resource = |method| schema.resource_methods.contains(&method);

    let mut ops = Vec::new();
    if collection(HttpMethod::Get) {
        ops.push(quote! {
            fn list(&self) -> Result<#collection_name, Self::Error>;
        });
    }
    if collection(HttpMethod::Post) {
        ops.push(quote! {
            fn create(&self, value: &#struct_name) -> Result<#struct_name, Self::Error>;
        });
    }
    if resource(HttpMethod::Get) {
        ops.push(quote! {
            fn by_id(&self, id: &str) -> Result<#struct_name, Self::Error>;
        });
    }
    if resource(HttpMethod::Put) || resource(HttpMethod::Patch) {
        ops.push(quote! {
            fn update(
                &self,
                existing: &#struct_name,
                updates: &#struct_name,
            ) -> Result<#struct_name, Self::Error>;
        });
    }
    if resource(HttpMethod::Delete) {
        ops.push(quote! {
            fn delete(&self, value: &#struct_name) -> Result<(), Self::Error>;
        });
    }

    for (name, action) in &ctx.projection.actions {
        let method = snake_ident(TEMPLATE, &format!("Action{}", capitalize(name)))?;
        let output = ident(TEMPLATE, &action.output)?;
        let signature = match &action.input {
            Some(input) => {
                let input = ident(TEMPLATE, input)?;
                quote! {
                    fn #method(
                        &self,
                        resource: &#struct_name,
                        input: &#input,
                    ) -> Result<#output, Self::Error>;
                }
            }
            None => quote! {
                fn #method(&self, resource: &#struct_name) -> Result<#output, Self::Error>;
            },
        };
        ops.push(signature);
    }

    Ok(ops)
}
