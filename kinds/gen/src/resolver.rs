//! Type resolution from schema descriptors to Rust type expressions.
//!
//! The resolver is a pure function of its inputs. It performs registry
//! lookups but never logs or fails on a miss: an unknown leaf name degrades
//! to its capitalized form. [`resolve_traced`] additionally reports which
//! names degraded so callers can surface them.
//!
//! ## Mapping
//!
//! | descriptor | type |
//! |---|---|
//! | `reference[X]` | `String` |
//! | `map[V]` | `std::collections::BTreeMap<String, V>` |
//! | `array[V]` | `Vec<V>` |
//! | `json` | `serde_json::Value` |
//! | `boolean` / `float` / `int` | `bool` / `f64` / `i64` |
//! | `password` / `date` / `string` / `enum` | `String` |
//! | other leaf `N` | code name of schema `N`, else `N` capitalized |
//!
//! Only `boolean`, `float`, `int` and named types honour nullability, by
//! wrapping in `Option`. Containers pass `nullable = false` to their inner
//! descriptor.
//!
//! The fallback only capitalizes; it does not sanitize. A leaf that is not a
//! Rust identifier (`node-pool`, `apps.deployment`) resolves to
//! `Node-pool` without error here, and the template that later turns it into
//! tokens reports it as [`GeneratorError::TemplateContext`](crate::errors::GeneratorError::TemplateContext).

use std::fmt;

use kinds_define::naming::capitalize;
use kinds_define::{Builtin, DescriptorError, Lookup, Schema, SchemaRegistry, TypeDescriptor, lookup};

/// A resolved Rust type expression.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeExpr {
    /// `serde_json::Value`
    Any,
    Bool,
    Float,
    Int,
    String,
    /// A generated (or assumed) type name.
    Named(String),
    Optional(Box<TypeExpr>),
    /// String-keyed map.
    Map(Box<TypeExpr>),
    Array(Box<TypeExpr>),
}

impl TypeExpr {
    /// Whether the outermost layer is `Option`.
    pub fn is_optional(&self) -> bool {
        matches!(self, Self::Optional(_))
    }

    /// Parses the expression into a `syn::Type` for code generation.
    ///
    /// Fails only when a named type is not a valid Rust path.
    pub fn to_type(&self) -> syn::Result<syn::Type> {
        syn::parse_str(&self.to_string())
    }
}

impl fmt::Display for TypeExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Any => f.write_str("serde_json::Value"),
            Self::Bool => f.write_str("bool"),
            Self::Float => f.write_str("f64"),
            Self::Int => f.write_str("i64"),
            Self::String => f.write_str("String"),
            Self::Named(name) => f.write_str(name),
            Self::Optional(inner) => write!(f, "Option<{inner}>"),
            Self::Map(value) => write!(f, "std::collections::BTreeMap<String, {value}>"),
            Self::Array(element) => write!(f, "Vec<{element}>"),
        }
    }
}

/// A resolved type plus the leaf names that fell back to a capitalized guess.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub expr: TypeExpr,
    pub degraded: Vec<String>,
}

/// Resolves a parsed descriptor.
///
/// `owner` supplies the version that named leaves are looked up in; without
/// an owner or a registry every named leaf takes the fallback.
///
/// ## Examples
///
/// ```
/// use kinds_define::TypeDescriptor;
/// use kinds_gen::resolver::{TypeExpr, resolve};
///
/// let ty = TypeDescriptor::parse("map[array[int]]").unwrap();
/// assert_eq!(
///     resolve(false, &ty, None, None),
///     TypeExpr::Map(Box::new(TypeExpr::Array(Box::new(TypeExpr::Int))))
/// );
///
/// let ty = TypeDescriptor::parse("widget").unwrap();
/// assert_eq!(resolve(true, &ty, None, None).to_string(), "Option<Widget>");
/// ```
pub fn resolve(
    nullable: bool,
    descriptor: &TypeDescriptor,
    owner: Option<&Schema>,
    registry: Option<&dyn SchemaRegistry>,
) -> TypeExpr {
    resolve_traced(nullable, descriptor, owner, registry).expr
}

/// Like [`resolve`], also reporting degraded leaf names in encounter order.
pub fn resolve_traced(
    nullable: bool,
    descriptor: &TypeDescriptor,
    owner: Option<&Schema>,
    registry: Option<&dyn SchemaRegistry>,
) -> Resolution {
    let mut degraded = Vec::new();
    let expr = resolve_into(nullable, descriptor, owner, registry, &mut degraded);
    Resolution { expr, degraded }
}

/// Parses `descriptor` and resolves it.
///
/// ## Errors
///
/// Returns the parse error for a malformed descriptor string.
pub fn resolve_str(
    nullable: bool,
    descriptor: &str,
    owner: Option<&Schema>,
    registry: Option<&dyn SchemaRegistry>,
) -> Result<TypeExpr, DescriptorError> {
    let descriptor = TypeDescriptor::parse(descriptor)?;
    Ok(resolve(nullable, &descriptor, owner, registry))
}

fn resolve_into(
    nullable: bool,
    descriptor: &TypeDescriptor,
    owner: Option<&Schema>,
    registry: Option<&dyn SchemaRegistry>,
    degraded: &mut Vec<String>,
) -> TypeExpr {
    let name = match descriptor {
        TypeDescriptor::Reference(_) => return TypeExpr::String,
        TypeDescriptor::Map(value) => {
            let value = resolve_into(false, value, owner, registry, degraded);
            return TypeExpr::Map(Box::new(value));
        }
        TypeDescriptor::Array(element) => {
            let element = resolve_into(false, element, owner, registry, degraded);
            return TypeExpr::Array(Box::new(element));
        }
        TypeDescriptor::Scalar(name) => name,
    };

    let base = match descriptor.builtin() {
        Some(Builtin::Json) => return TypeExpr::Any,
        Some(Builtin::Password | Builtin::Date | Builtin::String | Builtin::Enum) => {
            return TypeExpr::String;
        }
        Some(Builtin::Boolean) => TypeExpr::Bool,
        Some(Builtin::Float) => TypeExpr::Float,
        Some(Builtin::Int) => TypeExpr::Int,
        None => named(name, owner, registry, degraded),
    };

    if nullable {
        TypeExpr::Optional(Box::new(base))
    } else {
        base
    }
}

fn named(
    name: &str,
    owner: Option<&Schema>,
    registry: Option<&dyn SchemaRegistry>,
    degraded: &mut Vec<String>,
) -> TypeExpr {
    match lookup(registry, owner, name) {
        Lookup::Resolved(schema) if !schema.code_name.is_empty() => {
            TypeExpr::Named(schema.code_name.clone())
        }
        Lookup::Resolved(_) | Lookup::NotFound | Lookup::NoRegistry => {
            degraded.push(name.to_string());
            TypeExpr::Named(capitalize(name))
        }
    }
}
