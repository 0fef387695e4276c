use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use crate::datatypes::{Meta, code_enum};
use crate::error::{FhirError, Result};
use crate::registry::{Resource, ResourceType};

code_enum! {
    /// FHIR Bundle types
    pub enum BundleType {
        Searchset => "searchset",
        History => "history",
        Collection => "collection",
        Document => "document",
        Message => "message",
        Transaction => "transaction",
        TransactionResponse => "transaction-response",
        Batch => "batch",
        BatchResponse => "batch-response",
        SubscriptionNotification => "subscription-notification",
    }
}

/// FHIR Bundle resource
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Bundle {
    pub resource_type: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta: Option<Meta>,

    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub bundle_type: Option<BundleType>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub total: Option<u32>,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub link: Vec<BundleLink>,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub entry: Vec<BundleEntry>,
}

impl Default for Bundle {
    fn default() -> Self {
        Self {
            resource_type: "Bundle".to_string(),
            id: None,
            meta: None,
            bundle_type: None,
            total: None,
            link: Vec::new(),
            entry: Vec::new(),
        }
    }
}

/// Navigation link of a Bundle (`self`, `next`, ...)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BundleLink {
    pub relation: String,
    pub url: String,
}

code_enum! {
    /// Why an entry is in a searchset
    pub enum SearchEntryMode {
        Match => "match",
        Include => "include",
        Outcome => "outcome",
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BundleEntrySearch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mode: Option<SearchEntryMode>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
}

/// Per-entry result of a batch or transaction
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BundleEntryResponse {
    pub status: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub etag: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub outcome: Option<JsonValue>,
}

/// A single entry of a Bundle. The resource stays raw JSON until asked for.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BundleEntry {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub full_url: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub resource: Option<JsonValue>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub search: Option<BundleEntrySearch>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub response: Option<BundleEntryResponse>,
}

impl BundleEntry {
    pub fn new(full_url: Option<String>, resource: JsonValue) -> Self {
        Self {
            full_url,
            resource: Some(resource),
            ..Default::default()
        }
    }

    /// Entry carrying a search match
    pub fn matched(full_url: Option<String>, resource: JsonValue) -> Self {
        Self {
            search: Some(BundleEntrySearch {
                mode: Some(SearchEntryMode::Match),
                score: None,
            }),
            ..Self::new(full_url, resource)
        }
    }

    /// `resourceType` of the embedded resource, if any
    pub fn resource_type(&self) -> Option<&str> {
        self.resource
            .as_ref()?
            .get("resourceType")
            .and_then(JsonValue::as_str)
    }

    /// Whether this entry is a primary search result rather than an
    /// `_include`d resource or a warning outcome
    pub fn is_match(&self) -> bool {
        match self.search.as_ref().and_then(|s| s.mode.as_ref()) {
            Some(mode) => *mode == SearchEntryMode::Match,
            None => true,
        }
    }

    /// Decode the embedded resource as `T`
    pub fn decode<T: Resource>(&self) -> Result<T> {
        let resource = self
            .resource
            .as_ref()
            .ok_or(FhirError::MissingResource)?;

        match self.resource_type() {
            Some(found) if found != T::RESOURCE_TYPE.as_str() => Err(FhirError::TypeMismatch {
                expected: T::RESOURCE_TYPE,
                found: found.to_string(),
            }),
            _ => T::deserialize(resource).map_err(|source| FhirError::Decode {
                resource_type: T::RESOURCE_TYPE,
                source,
            }),
        }
    }
}

impl Bundle {
    /// Create a searchset bundle
    pub fn searchset(total: u32, entries: Vec<BundleEntry>) -> Self {
        Self {
            bundle_type: Some(BundleType::Searchset),
            total: Some(total),
            entry: entries,
            ..Default::default()
        }
    }

    /// Create a history bundle
    pub fn history(entries: Vec<BundleEntry>) -> Self {
        Self {
            bundle_type: Some(BundleType::History),
            total: Some(entries.len() as u32),
            entry: entries,
            ..Default::default()
        }
    }

    /// URL of the link with the given relation, e.g. `next`
    pub fn link_url(&self, relation: &str) -> Option<&str> {
        self.link
            .iter()
            .find(|l| l.relation == relation)
            .map(|l| l.url.as_str())
    }

    /// Entries holding a resource of the given type
    pub fn entries_of(&self, resource_type: ResourceType) -> impl Iterator<Item = &BundleEntry> {
        self.entry
            .iter()
            .filter(move |e| e.resource_type() == Some(resource_type.as_str()))
    }

    /// Matched entries holding a resource of the given type
    pub fn matches_of(&self, resource_type: ResourceType) -> impl Iterator<Item = &BundleEntry> {
        self.entries_of(resource_type).filter(|e| e.is_match())
    }

    /// Decode every resource of type `T` in this bundle, skipping other types
    pub fn resources<T: Resource>(&self) -> Result<Vec<T>> {
        self.entries_of(T::RESOURCE_TYPE)
            .map(|e| e.decode::<T>())
            .collect()
    }
}

impl Resource for Bundle {
    const RESOURCE_TYPE: ResourceType = ResourceType::Bundle;

    fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }
}
