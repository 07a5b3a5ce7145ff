//! Projection of a schema into template context.
//!
//! A [`Projection`] is everything a template needs beyond the schema itself:
//! the resolved type of every field and the actions that can actually be
//! bound because their output schema exists.

use std::collections::BTreeMap;

use kinds_define::{Action, Schema, SchemaRegistry};

use crate::errors::GeneratorError;
use crate::resolver::{TypeExpr, resolve_traced};

/// A field with its resolved type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectedField {
    /// Wire name.
    pub name: String,
    pub code_name: String,
    pub ty: TypeExpr,
    pub description: Option<String>,
}

/// An action whose output schema exists in the registry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedAction {
    pub action: Action,
    /// Code name of the output schema.
    pub output: String,
    /// Code name of the input schema, when declared and found.
    pub input: Option<String>,
}

/// Field types and bindable actions of one schema.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Projection {
    /// Fields keyed by code name.
    pub fields: BTreeMap<String, ProjectedField>,
    /// Resolvable actions keyed by action name.
    pub actions: BTreeMap<String, ResolvedAction>,
    /// Leaf names that fell back to a capitalized guess, in field order.
    pub degraded: Vec<String>,
}

impl Projection {
    /// The code-name-to-type view of the fields.
    pub fn field_types(&self) -> BTreeMap<&str, &TypeExpr> {
        self.fields
            .iter()
            .map(|(code_name, field)| (code_name.as_str(), &field.ty))
            .collect()
    }
}

/// Projects `schema` against `registry`.
///
/// Actions whose output names no schema in `schema.version` are dropped
/// without error.
///
/// ## Errors
///
/// Returns [`GeneratorError::Descriptor`] if a field's type descriptor is
/// malformed.
///
/// ## Examples
///
/// ```
/// use kinds_define::{Action, ApiVersion, Field, Schema, SchemaRegistry, Schemas};
/// use kinds_gen::projection::project;
///
/// let v1 = ApiVersion::new("", "v1");
/// let registry = Schemas::from_schemas([
///     Schema::new("pod", v1.clone())
///         .field(Field::new("restartCount", "int").nullable())
///         .action("evict", Action::new("eviction"))
///         .action("drain", Action::new("missing")),
///     Schema::new("eviction", v1.clone()),
/// ])
/// .unwrap();
///
/// let pod = registry.schema(&v1, "pod").unwrap();
/// let projection = project(pod, &registry).unwrap();
/// assert_eq!(projection.fields["RestartCount"].ty.to_string(), "Option<i64>");
/// assert!(projection.actions.contains_key("evict"));
/// assert!(!projection.actions.contains_key("drain"));
/// ```
pub fn project(
    schema: &Schema,
    registry: &dyn SchemaRegistry,
) -> Result<Projection, GeneratorError> {
    let mut projection = Projection::default();

    for field in &schema.fields {
        let descriptor = field.descriptor().map_err(|source| GeneratorError::Descriptor {
            schema: schema.id.clone(),
            field: field.name.clone(),
            source,
        })?;

        let resolution = resolve_traced(field.nullable, &descriptor, Some(schema), Some(registry));
        projection.degraded.extend(resolution.degraded);
        projection.fields.insert(
            field.code_name.clone(),
            ProjectedField {
                name: field.name.clone(),
                code_name: field.code_name.clone(),
                ty: resolution.expr,
                description: field.description.clone(),
            },
        );
    }

    for (name, action) in &schema.actions {
        let Some(output) = registry.schema(&schema.version, &action.output) else {
            continue;
        };

        let input = action
            .input
            .as_deref()
            .and_then(|input| registry.schema(&schema.version, input))
            .map(|input| input.code_name.clone());

        projection.actions.insert(
            name.clone(),
            ResolvedAction {
                action: action.clone(),
                output: output.code_name.clone(),
                input,
            },
        );
    }

    Ok(projection)
}
