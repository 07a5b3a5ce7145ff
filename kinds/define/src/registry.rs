//! Schema registries.
//!
//! The generator consumes schemas through the [`SchemaRegistry`] trait and
//! never mutates them. [`Schemas`] is the in-memory implementation, built
//! programmatically or loaded from a JSON/YAML document.
//!
//! ## Lookup rules
//!
//! A lookup is scoped to one [`ApiVersion`]. An exact identifier match wins;
//! otherwise the first schema whose identifier or plural name matches
//! case-insensitively is returned.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use crate::error::DefineError;
use crate::schema::Schema;
use crate::types::ApiVersion;

/// Read-only access to a set of schemas.
pub trait SchemaRegistry {
    /// All schemas, in registration order.
    fn schemas(&self) -> Vec<&Schema>;

    /// Finds the schema named `name` within `version`.
    fn schema(&self, version: &ApiVersion, name: &str) -> Option<&Schema>;
}

/// Outcome of resolving a schema name against an optional registry.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Lookup<'a> {
    /// The name matched a schema.
    Resolved(&'a Schema),
    /// A registry was available but holds no such schema.
    NotFound,
    /// No registry or owning schema was supplied, so nothing was searched.
    NoRegistry,
}

impl<'a> Lookup<'a> {
    /// The matched schema, if any.
    pub fn schema(self) -> Option<&'a Schema> {
        match self {
            Self::Resolved(schema) => Some(schema),
            Self::NotFound | Self::NoRegistry => None,
        }
    }
}

/// Looks up `name` in the version of `owner`.
///
/// ## Examples
///
/// ```
/// use kinds_define::{ApiVersion, Lookup, Schema, SchemaRegistry, Schemas, lookup};
///
/// let version = ApiVersion::new("", "v1");
/// let mut schemas = Schemas::new();
/// schemas.add(Schema::new("node", version.clone())).unwrap();
/// let owner = schemas.schema(&version, "node").unwrap();
///
/// assert!(matches!(lookup(Some(&schemas), Some(owner), "node"), Lookup::Resolved(_)));
/// assert_eq!(lookup(Some(&schemas), Some(owner), "widget"), Lookup::NotFound);
/// assert_eq!(lookup(None, Some(owner), "node"), Lookup::NoRegistry);
/// ```
pub fn lookup<'a>(
    registry: Option<&'a dyn SchemaRegistry>,
    owner: Option<&Schema>,
    name: &str,
) -> Lookup<'a> {
    match (registry, owner) {
        (Some(registry), Some(owner)) => registry
            .schema(&owner.version, name)
            .map_or(Lookup::NotFound, Lookup::Resolved),
        _ => Lookup::NoRegistry,
    }
}

/// An ordered, in-memory schema registry.
#[derive(Debug, Clone, Default)]
pub struct Schemas {
    schemas: Vec<Schema>,
    index: HashMap<(ApiVersion, String), usize>,
}

impl Schemas {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a schema, filling in default code names.
    ///
    /// ## Errors
    ///
    /// Returns [`DefineError::DuplicateSchema`] if the identifier is already
    /// registered for the schema's version.
    pub fn add(&mut self, mut schema: Schema) -> Result<&mut Self, DefineError> {
        let key = (schema.version.clone(), schema.id.clone());
        if self.index.contains_key(&key) {
            return Err(DefineError::DuplicateSchema {
                id: schema.id,
                version: schema.version.to_string(),
            });
        }

        schema.apply_defaults();
        self.index.insert(key, self.schemas.len());
        self.schemas.push(schema);
        Ok(self)
    }

    /// Builds a registry from schemas in order.
    pub fn from_schemas(schemas: impl IntoIterator<Item = Schema>) -> Result<Self, DefineError> {
        let mut registry = Self::new();
        for schema in schemas {
            registry.add(schema)?;
        }
        Ok(registry)
    }

    /// Parses a JSON array of schemas.
    pub fn from_json_str(source: &str) -> Result<Self, DefineError> {
        let schemas: Vec<Schema> =
            serde_json::from_str(source).map_err(|e| DefineError::Parse {
                path: "<json>".to_string(),
                message: e.to_string(),
            })?;
        Self::from_schemas(schemas)
    }

    /// Parses a YAML sequence of schemas.
    pub fn from_yaml_str(source: &str) -> Result<Self, DefineError> {
        let schemas: Vec<Schema> =
            serde_yaml::from_str(source).map_err(|e| DefineError::Parse {
                path: "<yaml>".to_string(),
                message: e.to_string(),
            })?;
        Self::from_schemas(schemas)
    }

    /// Loads a registry from a `.json`, `.yaml` or `.yml` document.
    pub fn load(path: &Path) -> Result<Self, DefineError> {
        let display = path.display().to_string();
        let source = fs::read_to_string(path).map_err(|e| DefineError::Read {
            path: display.clone(),
            source: e,
        })?;

        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase);

        let parsed = match extension.as_deref() {
            Some("json") => Self::from_json_str(&source),
            Some("yaml" | "yml") => Self::from_yaml_str(&source),
            _ => return Err(DefineError::UnsupportedFormat(display)),
        };

        parsed.map_err(|e| match e {
            DefineError::Parse { message, .. } => DefineError::Parse {
                path: display,
                message,
            },
            other => other,
        })
    }

    /// Number of registered schemas.
    pub fn len(&self) -> usize {
        self.schemas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.schemas.is_empty()
    }

    /// Iterates schemas in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &Schema> {
        self.schemas.iter()
    }
}

impl SchemaRegistry for Schemas {
    fn schemas(&self) -> Vec<&Schema> {
        self.schemas.iter().collect()
    }

    fn schema(&self, version: &ApiVersion, name: &str) -> Option<&Schema> {
        if let Some(&idx) = self.index.get(&(version.clone(), name.to_string())) {
            return self.schemas.get(idx);
        }

        self.schemas.iter().filter(|s| &s.version == version).find(|s| {
            s.id.eq_ignore_ascii_case(name)
                || s.plural_name
                    .as_deref()
                    .is_some_and(|plural| plural.eq_ignore_ascii_case(name))
        })
    }
}
