use serde::{Deserialize, Serialize};

use crate::datatypes::Meta;
use crate::registry::{Resource, ResourceType};

/// FHIR CapabilityStatement resource (simplified)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CapabilityStatement {
    pub resource_type: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta: Option<Meta>,

    pub status: String,
    pub date: String,
    pub kind: String,
    pub fhir_version: String,
    pub format: Vec<String>,
    pub rest: Vec<CapabilityRest>,
}

impl Default for CapabilityStatement {
    fn default() -> Self {
        Self {
            resource_type: "CapabilityStatement".to_string(),
            id: None,
            meta: None,
            status: String::new(),
            date: String::new(),
            kind: String::new(),
            fhir_version: String::new(),
            format: Vec::new(),
            rest: Vec::new(),
        }
    }
}

impl CapabilityStatement {
    /// Active JSON-only instance statement for a server exposing `resources`
    pub fn server(fhir_version: &str, date: &str, resources: Vec<CapabilityResource>) -> Self {
        Self {
            status: "active".to_string(),
            date: date.to_string(),
            kind: "instance".to_string(),
            fhir_version: fhir_version.to_string(),
            format: vec!["json".to_string()],
            rest: vec![CapabilityRest {
                mode: "server".to_string(),
                resource: resources,
            }],
            ..Default::default()
        }
    }

    /// Declared capabilities of the server for a resource type
    pub fn resource(&self, resource_type: &str) -> Option<&CapabilityResource> {
        self.rest
            .iter()
            .filter(|r| r.mode == "server")
            .flat_map(|r| r.resource.iter())
            .find(|r| r.resource_type == resource_type)
    }

    /// Whether the server declares `interaction` (e.g. `read`) on a resource type
    pub fn supports(&self, resource_type: &str, interaction: &str) -> bool {
        self.resource(resource_type)
            .is_some_and(|r| r.interaction.iter().any(|i| i.code == interaction))
    }

    pub fn supports_json(&self) -> bool {
        self.format.iter().any(|f| f.contains("json"))
    }
}

impl Resource for CapabilityStatement {
    const RESOURCE_TYPE: ResourceType = ResourceType::CapabilityStatement;

    fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }
}

/// REST capability declaration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CapabilityRest {
    pub mode: String,
    pub resource: Vec<CapabilityResource>,
}

/// Capabilities for a single resource type
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CapabilityResource {
    #[serde(rename = "type")]
    pub resource_type: String,

    pub interaction: Vec<ResourceInteraction>,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub search_param: Vec<SearchParam>,
}

impl CapabilityResource {
    /// Resource declaring the given interaction codes
    pub fn new(resource_type: &str, interactions: &[&str]) -> Self {
        Self {
            resource_type: resource_type.to_string(),
            interaction: interactions
                .iter()
                .map(|code| ResourceInteraction {
                    code: code.to_string(),
                })
                .collect(),
            search_param: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResourceInteraction {
    pub code: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchParam {
    pub name: String,
    #[serde(rename = "type")]
    pub param_type: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn server_statement_declares_interactions() {
        let statement = CapabilityStatement::server(
            "4.3.0",
            "2026-02-02",
            vec![CapabilityResource::new("Patient", &["read", "search-type"])],
        );

        assert!(statement.supports("Patient", "read"));
        assert!(!statement.supports("Patient", "delete"));
        assert!(!statement.supports("Observation", "read"));
        assert!(statement.supports_json());
    }

    #[test]
    fn decodes_sparse_statement() {
        let statement: CapabilityStatement = serde_json::from_str(
            r#"{
                "resourceType": "CapabilityStatement",
                "fhirVersion": "4.0.1",
                "format": ["application/fhir+json"],
                "rest": [{"mode": "server", "resource": [{"type": "Observation", "interaction": [{"code": "create"}]}]}]
            }"#,
        )
        .unwrap();

        assert_eq!(statement.fhir_version, "4.0.1");
        assert!(statement.supports("Observation", "create"));
        assert!(statement.supports_json());
    }
}
