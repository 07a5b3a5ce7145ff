//! Resource schemas, their fields and their actions.
//!
//! Schemas are owned by a [`SchemaRegistry`](crate::SchemaRegistry). The
//! generator only reads them.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::descriptor::TypeDescriptor;
use crate::error::DescriptorError;
use crate::naming::capitalize;
use crate::types::{ApiVersion, HttpMethod};

/// One resource kind.
///
/// ## Examples
///
/// ```
/// use kinds_define::{Action, ApiVersion, Field, HttpMethod, Schema};
///
/// let schema = Schema::new("cluster", ApiVersion::new("management.example.io", "v3"))
///     .field(Field::new("name", "string"))
///     .field(Field::new("nodeCount", "int").nullable())
///     .collection_methods([HttpMethod::Get, HttpMethod::Post])
///     .action("rotateCertificates", Action::new("rotateCertificateOutput"));
///
/// assert_eq!(schema.code_name, "Cluster");
/// assert_eq!(schema.fields.len(), 2);
/// assert!(schema.is_listable());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Schema {
    /// Identifier, unique within `version`.
    pub id: String,
    #[serde(default)]
    pub version: ApiVersion,
    /// Name used for generated types. Defaults to the capitalized `id`.
    #[serde(default)]
    pub code_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plural_name: Option<String>,
    /// Fields in declaration order.
    #[serde(default, rename = "resourceFields")]
    pub fields: Vec<Field>,
    /// Methods supported on the collection (e.g. `GET` to list).
    #[serde(default)]
    pub collection_methods: Vec<HttpMethod>,
    /// Methods supported on individual resources.
    #[serde(default)]
    pub resource_methods: Vec<HttpMethod>,
    /// Named actions, keyed by action name.
    #[serde(default, rename = "resourceActions")]
    pub actions: BTreeMap<String, Action>,
    /// Alternate shape used when generating controllers.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub internal_schema: Option<Box<Schema>>,
}

impl Schema {
    /// Creates an empty schema with a code name derived from `id`.
    pub fn new(id: impl Into<String>, version: ApiVersion) -> Self {
        let id = id.into();
        Self {
            code_name: capitalize(&id),
            id,
            version,
            plural_name: None,
            fields: vec![],
            collection_methods: vec![],
            resource_methods: vec![],
            actions: BTreeMap::new(),
            internal_schema: None,
        }
    }

    /// Overrides the generated type name.
    pub fn with_code_name(mut self, code_name: impl Into<String>) -> Self {
        self.code_name = code_name.into();
        self
    }

    /// Sets the plural name used for case-insensitive lookups.
    pub fn with_plural_name(mut self, plural_name: impl Into<String>) -> Self {
        self.plural_name = Some(plural_name.into());
        self
    }

    /// Appends a field.
    pub fn field(mut self, field: Field) -> Self {
        self.fields.push(field);
        self
    }

    /// Replaces the collection methods.
    pub fn collection_methods(mut self, methods: impl IntoIterator<Item = HttpMethod>) -> Self {
        self.collection_methods = methods.into_iter().collect();
        self
    }

    /// Replaces the resource methods.
    pub fn resource_methods(mut self, methods: impl IntoIterator<Item = HttpMethod>) -> Self {
        self.resource_methods = methods.into_iter().collect();
        self
    }

    /// Declares an action.
    pub fn action(mut self, name: impl Into<String>, action: Action) -> Self {
        self.actions.insert(name.into(), action);
        self
    }

    /// Attaches the internal variant used for controller generation.
    pub fn with_internal_schema(mut self, internal: Schema) -> Self {
        self.internal_schema = Some(Box::new(internal));
        self
    }

    /// Whether the collection can be listed (advertises `GET`).
    pub fn is_listable(&self) -> bool {
        self.collection_methods.contains(&HttpMethod::Get)
    }

    /// The schema whose shape controllers should reflect.
    ///
    /// This is the internal variant when one is declared, otherwise `self`.
    pub fn controller_schema(&self) -> &Schema {
        self.internal_schema.as_deref().unwrap_or(self)
    }

    /// Fills in code names left empty by deserialization.
    pub(crate) fn apply_defaults(&mut self) {
        if self.code_name.is_empty() {
            self.code_name = capitalize(&self.id);
        }
        for field in &mut self.fields {
            if field.code_name.is_empty() {
                field.code_name = capitalize(&field.name);
            }
        }
        if let Some(internal) = self.internal_schema.as_deref_mut() {
            if internal.version == ApiVersion::default() {
                internal.version = self.version.clone();
            }
            internal.apply_defaults();
        }
    }
}

/// A named, typed attribute of a schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Field {
    /// Wire name of the field.
    pub name: String,
    /// Name used in generated code. Defaults to the capitalized `name`.
    #[serde(default)]
    pub code_name: String,
    /// Type descriptor string, e.g. `array[reference[node]]`.
    #[serde(rename = "type")]
    pub type_descriptor: String,
    #[serde(default)]
    pub nullable: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Field {
    /// Creates a non-nullable field.
    pub fn new(name: impl Into<String>, type_descriptor: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            code_name: capitalize(&name),
            name,
            type_descriptor: type_descriptor.into(),
            nullable: false,
            description: None,
        }
    }

    /// Marks the field nullable.
    pub fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }

    pub fn with_code_name(mut self, code_name: impl Into<String>) -> Self {
        self.code_name = code_name.into();
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Parses the field's type descriptor.
    pub fn descriptor(&self) -> Result<TypeDescriptor, DescriptorError> {
        TypeDescriptor::parse(&self.type_descriptor)
    }
}

/// A named operation on a schema.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Action {
    /// Name of the schema accepted as input, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input: Option<String>,
    /// Name of the schema the action returns.
    #[serde(default)]
    pub output: String,
}

impl Action {
    /// Creates an action without input.
    pub fn new(output: impl Into<String>) -> Self {
        Self {
            input: None,
            output: output.into(),
        }
    }

    pub fn with_input(mut self, input: impl Into<String>) -> Self {
        self.input = Some(input.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn controller_schema_prefers_internal_variant() {
        let version = ApiVersion::new("", "v1");
        let internal = Schema::new("pod", version.clone()).field(Field::new("nodeName", "string"));
        let schema = Schema::new("pod", version).with_internal_schema(internal.clone());

        assert_eq!(schema.controller_schema(), &internal);
    }

    #[test]
    fn controller_schema_falls_back_to_self() {
        let schema = Schema::new("service", ApiVersion::new("", "v1"));
        assert_eq!(schema.controller_schema(), &schema);
    }

    #[test]
    fn deserialize_applies_no_defaults_until_registered() {
        let schema: Schema = serde_json::from_str(
            r#"{
                "id": "node",
                "version": {"version": "v1"},
                "resourceFields": [{"name": "podCidr", "type": "string", "nullable": true}],
                "collectionMethods": ["GET"]
            }"#,
        )
        .unwrap();

        assert_eq!(schema.code_name, "");
        assert!(schema.fields[0].nullable);
        assert!(schema.is_listable());
    }

    #[test]
    fn apply_defaults_fills_code_names() {
        let mut schema: Schema = serde_json::from_str(
            r#"{
                "id": "node",
                "resourceFields": [{"name": "podCidr", "type": "string"}],
                "internalSchema": {"id": "node", "resourceFields": [{"name": "taints", "type": "array[string]"}]}
            }"#,
        )
        .unwrap();
        schema.version = ApiVersion::new("", "v1");
        schema.apply_defaults();

        assert_eq!(schema.code_name, "Node");
        assert_eq!(schema.fields[0].code_name, "PodCidr");
        let internal = schema.internal_schema.as_deref().unwrap();
        assert_eq!(internal.fields[0].code_name, "Taints");
        assert_eq!(internal.version, schema.version);
    }

    #[test]
    fn field_descriptor_parses() {
        let field = Field::new("labels", "map[string]");
        assert!(field.descriptor().is_ok());
        assert!(Field::new("bad", "map[").descriptor().is_err());
    }
}
