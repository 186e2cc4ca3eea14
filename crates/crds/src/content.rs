//! Content CRD
//!
//! The resource watched by the content controller. `spec` carries free-form
//! desired state; `status` records whether the controller has provisioned it.

use kube::CustomResource;
use kube::core::ObjectList;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// API group for all content filter resources
pub const API_GROUP: &str = "filter.tribit.io";

/// Served (and storage) version of the `Content` resource
pub const API_VERSION: &str = "v1alpha1";

#[derive(CustomResource, Debug, Clone, Default, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
#[kube(
    group = "filter.tribit.io",
    version = "v1alpha1",
    kind = "Content",
    namespaced,
    status = "ContentStatus",
    shortname = "cnt",
    derive = "PartialEq",
    printcolumn = r#"{"name":"Provisioned", "type":"boolean", "jsonPath":".status.provisioned"}"#,
    printcolumn = r#"{"name":"Age", "type":"date", "jsonPath":".metadata.creationTimestamp"}"#
)]
#[serde(rename_all = "camelCase")]
pub struct ContentSpec {
    /// Free-form value, not interpreted by the controller
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub foo: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ContentStatus {
    /// Set once by the controller; never cleared
    #[serde(default)]
    pub provisioned: bool,
}

/// List wrapper used for list/watch calls.
pub type ContentList = ObjectList<Content>;

impl Content {
    /// Whether the controller has already provisioned this object.
    ///
    /// A missing status counts as not provisioned.
    #[must_use]
    pub fn is_provisioned(&self) -> bool {
        self.status.as_ref().is_some_and(|s| s.provisioned)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kube::{CustomResourceExt, Resource};

    #[test]
    fn test_is_provisioned_without_status() {
        let content = Content::new("sample", ContentSpec::default());
        assert!(!content.is_provisioned(), "Missing status should not count as provisioned");
    }

    #[test]
    fn test_is_provisioned_follows_status_flag() {
        let mut content = Content::new("sample", ContentSpec::default());
        content.status = Some(ContentStatus { provisioned: false });
        assert!(!content.is_provisioned());

        content.status = Some(ContentStatus { provisioned: true });
        assert!(content.is_provisioned());
    }

    #[test]
    fn test_status_provisioned_defaults_to_false() {
        let status: ContentStatus = serde_json::from_str("{}").unwrap();
        assert!(!status.provisioned);
    }

    #[test]
    fn test_empty_foo_is_omitted() {
        let value = serde_json::to_value(ContentSpec::default()).unwrap();
        assert_eq!(value, serde_json::json!({}));

        let value = serde_json::to_value(ContentSpec { foo: "x".to_string() }).unwrap();
        assert_eq!(value, serde_json::json!({ "foo": "x" }));
    }

    #[test]
    fn test_deserialize_manifest() {
        let content: Content = serde_json::from_value(serde_json::json!({
            "apiVersion": "filter.tribit.io/v1alpha1",
            "kind": "Content",
            "metadata": { "name": "sample", "namespace": "default" },
            "spec": { "foo": "bar" },
            "status": { "provisioned": true }
        }))
        .unwrap();

        assert_eq!(content.spec.foo, "bar");
        assert!(content.is_provisioned());
        assert_eq!(content.metadata.namespace.as_deref(), Some("default"));
    }

    #[test]
    fn test_resource_identity() {
        assert_eq!(Content::group(&()), API_GROUP);
        assert_eq!(Content::version(&()), API_VERSION);
        assert_eq!(Content::kind(&()), "Content");
        assert_eq!(Content::plural(&()), "contents");
    }

    #[test]
    fn test_crd_has_status_subresource() {
        let crd = Content::crd();
        assert_eq!(crd.spec.group, API_GROUP);
        assert_eq!(crd.spec.names.kind, "Content");
        assert_eq!(crd.spec.scope, "Namespaced");

        let version = &crd.spec.versions[0];
        assert_eq!(version.name, API_VERSION);
        assert!(
            version.subresources.as_ref().and_then(|s| s.status.as_ref()).is_some(),
            "Content must expose the status subresource"
        );
    }

    #[test]
    fn test_crd_schema_properties() {
        let crd = Content::crd();
        let schema = crd.spec.versions[0]
            .schema
            .as_ref()
            .and_then(|s| s.open_api_v3_schema.as_ref())
            .unwrap();
        let props = schema.properties.as_ref().unwrap();

        let spec_props = props["spec"].properties.as_ref().unwrap();
        assert!(spec_props.contains_key("foo"));

        let status_props = props["status"].properties.as_ref().unwrap();
        assert_eq!(status_props["provisioned"].type_.as_deref(), Some("boolean"));
    }

    #[test]
    fn test_checked_in_crd_matches_derived() {
        use k8s_openapi::apiextensions_apiserver::pkg::apis::apiextensions::v1::{
            CustomResourceDefinition, CustomResourceDefinitionVersion,
        };

        let manifest: CustomResourceDefinition =
            serde_yaml::from_str(include_str!("../../../deploy/crd.yaml")).unwrap();
        let derived = Content::crd();

        assert_eq!(manifest.metadata.name, derived.metadata.name);
        assert_eq!(manifest.spec.group, derived.spec.group);
        assert_eq!(manifest.spec.scope, derived.spec.scope);
        assert_eq!(manifest.spec.names.kind, derived.spec.names.kind);
        assert_eq!(manifest.spec.names.plural, derived.spec.names.plural);
        assert_eq!(manifest.spec.names.short_names, derived.spec.names.short_names);

        let (ours, theirs) = (&manifest.spec.versions[0], &derived.spec.versions[0]);
        assert_eq!(ours.name, theirs.name);
        assert_eq!(ours.subresources, theirs.subresources);
        assert_eq!(ours.additional_printer_columns, theirs.additional_printer_columns);

        let props = |v: &CustomResourceDefinitionVersion| {
            v.schema
                .as_ref()
                .and_then(|s| s.open_api_v3_schema.as_ref())
                .and_then(|s| s.properties.as_ref())
                .map(|p| p.keys().cloned().collect::<Vec<_>>())
        };
        assert_eq!(props(ours), props(theirs));
    }
}
