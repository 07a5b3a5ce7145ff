//! Artifact file names and generated identifiers.
//!
//! ## File names
//!
//! Every artifact file name starts with the reserved prefix so that a later
//! run can find and delete it. Schema identifiers are split at each
//! lowercase-to-uppercase transition before the whole name is lowercased:
//!
//! | identifier | type artifact |
//! |---|---|
//! | `pod` | `zz_generated_pod.rs` |
//! | `podSecurityPolicy` | `zz_generated_pod_security_policy.rs` |
//!
//! ## Identifiers
//!
//! Generated identifiers are validated with `syn` rather than assumed. A
//! name that collides with a Rust keyword becomes a raw identifier
//! (`type` -> `r#type`); a name that cannot be an identifier at all is
//! reported as a template context error.

use std::sync::LazyLock;

use convert_case::{Case, Casing};
use proc_macro2::Ident;
use regex::Regex;

use crate::errors::GeneratorError;

/// Default reserved prefix for generator-owned files.
pub const DEFAULT_PREFIX: &str = "zz_generated";

static CASE_TRANSITION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([a-z])([A-Z])").expect("Invalid regex"));

/// Inserts an underscore at every lowercase-to-uppercase transition.
///
/// ## Examples
///
/// ```
/// use kinds_gen::naming::add_underscore;
///
/// assert_eq!(add_underscore("podSecurityPolicy"), "pod_Security_Policy");
/// assert_eq!(add_underscore("pod"), "pod");
/// ```
pub fn add_underscore(id: &str) -> String {
    CASE_TRANSITION.replace_all(id, "${1}_${2}").into_owned()
}

/// File name of the type artifact for schema `id`.
pub fn type_file_name(prefix: &str, id: &str) -> String {
    format!("{prefix}_{}.rs", add_underscore(id)).to_lowercase()
}

/// File name of the controller artifact for schema `id`.
pub fn controller_file_name(prefix: &str, id: &str) -> String {
    format!("{prefix}_{}_controller.rs", add_underscore(id)).to_lowercase()
}

/// File name of the aggregate client artifact.
pub fn client_file_name(prefix: &str) -> String {
    format!("{prefix}_client.rs").to_lowercase()
}

/// File name written by the derived-copy step.
pub fn deep_copy_file_name(prefix: &str) -> String {
    format!("{prefix}_deepcopy.rs").to_lowercase()
}

/// Parses `name` as an identifier, falling back to a raw identifier.
pub fn ident(template: &'static str, name: &str) -> Result<Ident, GeneratorError> {
    syn::parse_str::<Ident>(name)
        .or_else(|_| syn::parse_str::<Ident>(&format!("r#{name}")))
        .map_err(|_| GeneratorError::TemplateContext {
            template,
            message: format!("'{name}' as a Rust identifier"),
        })
}

/// Identifier for a struct field or accessor derived from a code name.
pub fn snake_ident(template: &'static str, code_name: &str) -> Result<Ident, GeneratorError> {
    ident(template, &code_name.to_case(Case::Snake))
}

/// Identifier for a constant, `<BASE>_<SUFFIX>` in constant case.
pub fn const_ident(
    template: &'static str,
    base: &str,
    suffix: &str,
) -> Result<Ident, GeneratorError> {
    ident(
        template,
        &format!("{}_{}", base.to_case(Case::UpperSnake), suffix.to_case(Case::UpperSnake)),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_underscore_splits_every_transition() {
        assert_eq!(add_underscore("aBcD"), "a_Bc_D");
        assert_eq!(add_underscore("clusterRoleTemplateBinding"), "cluster_Role_Template_Binding");
    }

    #[test]
    fn add_underscore_leaves_uppercase_runs() {
        assert_eq!(add_underscore("podCIDR"), "pod_CIDR");
        assert_eq!(add_underscore("ABC"), "ABC");
    }

    #[test]
    fn file_names_are_lowercase_and_prefixed() {
        assert_eq!(type_file_name("zz_generated", "pod"), "zz_generated_pod.rs");
        assert_eq!(
            type_file_name("zz_generated", "podSecurityPolicy"),
            "zz_generated_pod_security_policy.rs"
        );
        assert_eq!(
            controller_file_name("zz_generated", "nodePool"),
            "zz_generated_node_pool_controller.rs"
        );
        assert_eq!(client_file_name("zz_generated"), "zz_generated_client.rs");
        assert_eq!(deep_copy_file_name("ZZ_Gen"), "zz_gen_deepcopy.rs");
    }

    #[test]
    fn ident_accepts_plain_names() {
        assert_eq!(ident("test", "Pod").unwrap().to_string(), "Pod");
    }

    #[test]
    fn ident_escapes_keywords() {
        assert_eq!(ident("test", "type").unwrap().to_string(), "r#type");
        assert_eq!(snake_ident("test", "Match").unwrap().to_string(), "r#match");
    }

    #[test]
    fn ident_rejects_invalid_names() {
        let err = ident("test", "not-an-ident").unwrap_err();
        assert!(matches!(err, GeneratorError::TemplateContext { template: "test", .. }));
        assert!(ident("test", "self").is_err());
    }

    #[test]
    fn snake_ident_splits_acronyms() {
        assert_eq!(snake_ident("test", "HostName").unwrap().to_string(), "host_name");
        assert_eq!(snake_ident("test", "PodCIDR").unwrap().to_string(), "pod_cidr");
    }

    #[test]
    fn const_ident_uses_constant_case() {
        assert_eq!(
            const_ident("test", "PodSecurityPolicy", "Type").unwrap().to_string(),
            "POD_SECURITY_POLICY_TYPE"
        );
    }
}
