//! Core value types shared by schemas.
//!
//! - [`HttpMethod`] - Methods a collection or resource advertises
//! - [`ApiVersion`] - The group/version scope of a schema identifier

use std::fmt;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

/// HTTP methods a schema can advertise for its collection or resources.
///
/// ## Examples
///
/// Parse from string:
///
/// ```
/// use std::str::FromStr;
/// use kinds_define::HttpMethod;
///
/// let method = HttpMethod::from_str("GET").unwrap();
/// assert_eq!(method, HttpMethod::Get);
/// ```
///
/// Display as uppercase:
///
/// ```
/// use kinds_define::HttpMethod;
///
/// assert_eq!(HttpMethod::Post.to_string(), "POST");
/// ```
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumIter, EnumString,
)]
#[serde(rename_all = "UPPERCASE")]
#[strum(serialize_all = "UPPERCASE")]
pub enum HttpMethod {
    /// List a collection or fetch a single resource
    Get,
    /// Create a resource in a collection
    Post,
    /// Replace a resource
    Put,
    /// Partially update a resource
    Patch,
    /// Remove a resource
    Delete,
}

/// The API group and version a schema is registered under.
///
/// Schema identifiers are unique within one `ApiVersion`; lookups of
/// referenced schemas always stay inside the owning schema's version.
///
/// ## Examples
///
/// ```
/// use kinds_define::ApiVersion;
///
/// let version = ApiVersion::new("management.example.io", "v3");
/// assert_eq!(version.to_string(), "management.example.io/v3");
///
/// let core = ApiVersion::new("", "v1");
/// assert_eq!(core.to_string(), "v1");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ApiVersion {
    /// API group, empty for the core group.
    #[serde(default)]
    pub group: String,
    /// Version within the group (e.g. `v1`).
    pub version: String,
}

impl ApiVersion {
    /// Creates a version from its group and version parts.
    pub fn new(group: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            group: group.into(),
            version: version.into(),
        }
    }
}

impl fmt::Display for ApiVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.group.is_empty() {
            write!(f, "{}", self.version)
        } else {
            write!(f, "{}/{}", self.group, self.version)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn http_method_serde_uses_uppercase() {
        let json = serde_json::to_string(&HttpMethod::Delete).unwrap();
        assert_eq!(json, "\"DELETE\"");

        let parsed: HttpMethod = serde_json::from_str("\"PATCH\"").unwrap();
        assert_eq!(parsed, HttpMethod::Patch);
    }

    #[test]
    fn http_method_iterates_all_variants() {
        assert_eq!(HttpMethod::iter().count(), 5);
    }

    #[test]
    fn api_version_group_defaults_to_empty() {
        let version: ApiVersion = serde_json::from_str(r#"{"version":"v1"}"#).unwrap();
        assert_eq!(version, ApiVersion::new("", "v1"));
    }
}
