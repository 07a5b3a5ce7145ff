//! Shared test fixtures for kinds-gen unit tests.
//!
//! The fixture registry models a small `v1` API: `pod` references `node`
//! and `clusterRole`, and names one type (`container`) that is never
//! registered so tests can observe the capitalized fallback.

use kinds_define::{Action, ApiVersion, Field, HttpMethod, Schema, Schemas};

/// The core, group-less `v1` version.
pub fn v1() -> ApiVersion {
    ApiVersion::new("", "v1")
}

/// A listable schema with an internal variant and two actions.
///
/// `evict` resolves (output `node`, input `clusterRole`); `drain` names an
/// output that is never registered.
pub fn pod_schema() -> Schema {
    Schema::new("pod", v1())
        .with_plural_name("pods")
        .field(Field::new("hostName", "string").with_description("Host the pod is bound to."))
        .field(Field::new("nodeId", "reference[node]"))
        .field(Field::new("labels", "map[string]"))
        .field(Field::new("restartCount", "int").nullable())
        .field(Field::new("node", "node").nullable())
        .field(Field::new("containers", "array[container]"))
        .collection_methods([HttpMethod::Get, HttpMethod::Post])
        .resource_methods([HttpMethod::Get, HttpMethod::Put, HttpMethod::Delete])
        .action("evict", Action::new("node").with_input("clusterRole"))
        .action("drain", Action::new("drainOutput"))
        .with_internal_schema(
            Schema::new("pod", v1())
                .field(Field::new("hostName", "string"))
                .field(Field::new("internalState", "json")),
        )
}

/// A schema that can be created but not listed.
pub fn service_schema() -> Schema {
    Schema::new("service", v1())
        .field(Field::new("clusterIp", "string"))
        .collection_methods([HttpMethod::Post])
        .resource_methods([HttpMethod::Get])
}

pub fn node_schema() -> Schema {
    Schema::new("node", v1())
        .field(Field::new("capacity", "map[int]"))
        .field(Field::new("unschedulable", "boolean"))
        .collection_methods([HttpMethod::Get])
}

/// A schema whose code name differs from its capitalized identifier.
pub fn cluster_role_schema() -> Schema {
    Schema::new("clusterRole", v1())
        .with_code_name("ClusterRoleSpec")
        .field(Field::new("rules", "array[string]"))
}

/// Registry of `pod`, `node` and `clusterRole`.
pub fn registry() -> Schemas {
    Schemas::from_schemas([pod_schema(), node_schema(), cluster_role_schema()])
        .expect("fixture schemas are unique")
}

/// Registry that also carries the meta-schemas the generator skips.
pub fn registry_with_meta() -> Schemas {
    Schemas::from_schemas([
        Schema::new("schema", v1()).collection_methods([HttpMethod::Get]),
        Schema::new("resource", v1()),
        Schema::new("collection", v1()),
        pod_schema(),
        service_schema(),
        node_schema(),
    ])
    .expect("fixture schemas are unique")
}
