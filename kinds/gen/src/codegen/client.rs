//! Aggregate client generation.

use std::collections::HashSet;

use convert_case::{Case, Casing};
use proc_macro2::TokenStream;
use quote::quote;

use super::ClientContext;
use crate::errors::GeneratorError;
use crate::naming::ident;

/// Template name used in error reports.
pub const TEMPLATE: &str = "client";

/// Inherent methods of the generated `Client`; accessors never take these.
const CLIENT_METHODS: [&str; 2] = ["new", "transport"];

/// Accessor name for a schema code name, `_resource`-suffixed when it would
/// shadow an inherent client method.
fn accessor_name(code_name: &str) -> String {
    let name = code_name.to_case(Case::Snake);
    if CLIENT_METHODS.contains(&name.as_str()) {
        format!("{name}_resource")
    } else {
        name
    }
}

/// Generates the aggregate client over every emitted schema.
///
/// `Client<T>` wraps a transport; each schema gets an accessor that is only
/// callable when the transport implements that schema's operations trait.
///
/// ## Examples
///
/// For emitted schemas `pod` and `service`:
/// ```ignore
/// pub const SCHEMA_IDS: &[&str] = &["pod", "service"];
///
/// impl<T> Client<T> {
///     pub fn pod(&self) -> &T
///     where
///         T: PodOperations,
///     {
///         &self.transport
///     }
///     // ...
/// }
/// ```
///
/// ## Errors
///
/// Returns [`GeneratorError::TemplateContext`] when a code name is not a
/// valid identifier or two schemas map to the same accessor.
pub fn generate_client_file(ctx: &ClientContext<'_>) -> Result<TokenStream, GeneratorError> {
    let ids = ctx.schemas.iter().map(|schema| schema.id.as_str());

    let mut seen = HashSet::new();
    let accessors = ctx
        .schemas
        .iter()
        .map(|schema| {
            let name = accessor_name(&schema.code_name);
            if !seen.insert(name.clone()) {
                return Err(GeneratorError::TemplateContext {
                    template: TEMPLATE,
                    message: format!("accessor '{name}' for schema '{}' is already taken", schema.id),
                });
            }
            let method = ident(TEMPLATE, &name)?;
            let operations = ident(TEMPLATE, &format!("{}Operations", schema.code_name))?;
            let doc = format!(" Operations on `{}` resources.", schema.id);
            Ok(quote! {
                #[doc = #doc]
                pub fn #method(&self) -> &T
                where
                    T: #operations,
                {
                    &self.transport
                }
            })
        })
        .collect::<Result<Vec<_>, GeneratorError>>()?;

    Ok(quote! {
        #[allow(unused_imports)]
        use super::*;

        /// Identifiers of every generated schema, in generation order.
        pub const SCHEMA_IDS: &[&str] = &[#(#ids),*];

        /// Typed access to every generated resource over one transport.
        #[derive(Debug, Clone)]
        pub struct Client<T> {
            transport: T,
        }

        impl<T> Client<T> {
            pub fn new(transport: T) -> Self {
                Self { transport }
            }

            pub fn transport(&self) -> &T {
                &self.transport
            }

            #(#accessors)*
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::{format_code, validate_code};
    use crate::test_utils::{cluster_role_schema, node_schema, pod_schema, v1};
    use kinds_define::Schema;

    fn render(schemas: &[&Schema]) -> String {
        let tokens = generate_client_file(&ClientContext { schemas }).unwrap();
        format_code(&validate_code(TEMPLATE, &tokens).unwrap())
    }

    #[test]
    fn client_lists_schemas_in_order() {
        let (pod, node) = (pod_schema(), node_schema());
        let code = render(&[&pod, &node]);

        assert!(code.contains(r#"pub const SCHEMA_IDS: &[&str] = &["pod", "node"];"#));
    }

    #[test]
    fn client_has_one_accessor_per_schema() {
        let (pod, role) = (pod_schema(), cluster_role_schema());
        let code = render(&[&pod, &role]);

        assert!(code.contains("pub fn pod(&self) -> &T"));
        assert!(code.contains("T: PodOperations"));
        assert!(code.contains("pub fn cluster_role_spec(&self) -> &T"));
        assert!(code.contains("T: ClusterRoleSpecOperations"));
    }

    #[test]
    fn accessors_never_shadow_client_methods() {
        let transport = Schema::new("transport", v1());
        let new = Schema::new("new", v1());
        let code = render(&[&transport, &new]);

        assert!(code.contains("pub fn transport_resource(&self) -> &T"));
        assert!(code.contains("T: TransportOperations"));
        assert!(code.contains("pub fn new_resource(&self) -> &T"));
        assert_eq!(code.matches("pub fn transport(&self)").count(), 1);
        assert_eq!(code.matches("pub fn new(").count(), 1);
    }

    #[test]
    fn clashing_accessors_are_rejected() {
        let first = Schema::new("nodePool", v1());
        let second = Schema::new("node_pool", v1()).with_code_name("NodePool");
        let result = generate_client_file(&ClientContext {
            schemas: &[&first, &second],
        });

        assert!(matches!(
            result,
            Err(GeneratorError::TemplateContext { template: TEMPLATE, .. })
        ));
    }

    #[test]
    fn empty_client_is_valid() {
        let code = render(&[]);

        assert!(code.contains("pub struct Client<T>"));
        assert!(code.contains("pub const SCHEMA_IDS: &[&str] = &[];"));
    }
}
