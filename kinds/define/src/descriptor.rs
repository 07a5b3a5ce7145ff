//! Field type descriptors.
//!
//! Schema fields declare their type as a string following a small recursive
//! grammar. This module turns that string into an explicit tagged union so
//! the generator can pattern-match on it instead of slicing strings.
//!
//! ## Grammar
//!
//! ```text
//! descriptor := "reference[" target "]"
//!             | "map[" descriptor "]"
//!             | "array[" descriptor "]"
//!             | leaf
//! ```
//!
//! Prefixes are matched left-anchored. A reference target is kept verbatim:
//! it is never resolved, since references serialize as identifier strings.

use std::fmt;
use std::str::FromStr;

use strum::{Display, EnumIter, EnumString};

use crate::error::DescriptorError;

const REFERENCE_PREFIX: &str = "reference[";
const MAP_PREFIX: &str = "map[";
const ARRAY_PREFIX: &str = "array[";

/// A parsed field type descriptor.
///
/// ## Examples
///
/// ```
/// use kinds_define::TypeDescriptor;
///
/// let ty = TypeDescriptor::parse("map[array[int]]").unwrap();
/// assert_eq!(
///     ty,
///     TypeDescriptor::Map(Box::new(TypeDescriptor::Array(Box::new(
///         TypeDescriptor::Scalar("int".to_string())
///     ))))
/// );
/// assert_eq!(ty.to_string(), "map[array[int]]");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeDescriptor {
    /// A leaf: either a [`Builtin`] scalar name or the name of another schema.
    Scalar(String),
    /// `map[V]`: string keys to values of the inner type.
    Map(Box<TypeDescriptor>),
    /// `array[V]`: an ordered sequence of the inner type.
    Array(Box<TypeDescriptor>),
    /// `reference[X]`: the identifier of a resource of kind `X`.
    Reference(String),
}

impl TypeDescriptor {
    /// Parses a descriptor string.
    ///
    /// ## Errors
    ///
    /// Returns a [`DescriptorError`] when the string is empty, a container or
    /// reference is unterminated or empty, or a leaf contains brackets.
    pub fn parse(input: &str) -> Result<Self, DescriptorError> {
        if input.is_empty() {
            return Err(DescriptorError::Empty);
        }

        if let Some(rest) = input.strip_prefix(REFERENCE_PREFIX) {
            let target = inner(input, rest)?;
            return Ok(Self::Reference(target.to_string()));
        }

        if let Some(rest) = input.strip_prefix(MAP_PREFIX) {
            let value = Self::parse(inner(input, rest)?)?;
            return Ok(Self::Map(Box::new(value)));
        }

        if let Some(rest) = input.strip_prefix(ARRAY_PREFIX) {
            let element = Self::parse(inner(input, rest)?)?;
            return Ok(Self::Array(Box::new(element)));
        }

        if input.contains(['[', ']']) {
            return Err(DescriptorError::UnexpectedBracket(input.to_string()));
        }

        Ok(Self::Scalar(input.to_string()))
    }

    /// Returns the builtin scalar this descriptor names, if any.
    pub fn builtin(&self) -> Option<Builtin> {
        match self {
            Self::Scalar(name) => name.parse().ok(),
            _ => None,
        }
    }
}

/// Strips the closing bracket from the text following a prefix.
fn inner<'a>(full: &str, rest: &'a str) -> Result<&'a str, DescriptorError> {
    let inner = rest
        .strip_suffix(']')
        .ok_or_else(|| DescriptorError::Unterminated(full.to_string()))?;

    if inner.is_empty() {
        return Err(DescriptorError::EmptyInner(full.to_string()));
    }

    Ok(inner)
}

impl FromStr for TypeDescriptor {
    type Err = DescriptorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Scalar(name) => f.write_str(name),
            Self::Map(value) => write!(f, "{MAP_PREFIX}{value}]"),
            Self::Array(element) => write!(f, "{ARRAY_PREFIX}{element}]"),
            Self::Reference(target) => write!(f, "{REFERENCE_PREFIX}{target}]"),
        }
    }
}

/// Scalar leaf names with a fixed meaning.
///
/// Any other leaf name refers to a schema in the same version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter, EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum Builtin {
    /// Arbitrary JSON
    Json,
    Boolean,
    Float,
    Int,
    /// A secret, carried as a string
    Password,
    /// A timestamp, carried as a string
    Date,
    String,
    /// One of a fixed set of string values
    Enum,
}

impl Builtin {
    /// Whether values of this scalar are carried as plain strings.
    ///
    /// String-like scalars (and `json`) ignore nullability when resolved.
    pub fn is_string_like(self) -> bool {
        matches!(
            self,
            Self::Password | Self::Date | Self::String | Self::Enum
        )
    }
}
