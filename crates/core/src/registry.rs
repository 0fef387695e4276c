//! Resource type registry.
//!
//! Maps a resource type name to a [`TypeDescriptor`] that can build a
//! zero-valued instance of the concrete shape and decode raw JSON into it.
//! The table is a `static` built at compile time and never changes, so
//! lookups need no locking.

use std::any::{Any, TypeId};
use std::fmt;
use std::str::FromStr;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use crate::bundle::Bundle;
use crate::capability::CapabilityStatement;
use crate::error::{FhirError, Result};
use crate::outcome::OperationOutcome;
use crate::resources::{Encounter, Observation, Organization, Patient, Practitioner};

/// Every resource type this crate can decode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ResourceType {
    Bundle,
    CapabilityStatement,
    Encounter,
    Observation,
    OperationOutcome,
    Organization,
    Patient,
    Practitioner,
}

impl ResourceType {
    pub const fn as_str(&self) -> &'static str {
        match self {
            ResourceType::Bundle => "Bundle",
            ResourceType::CapabilityStatement => "CapabilityStatement",
            ResourceType::Encounter => "Encounter",
            ResourceType::Observation => "Observation",
            ResourceType::OperationOutcome => "OperationOutcome",
            ResourceType::Organization => "Organization",
            ResourceType::Patient => "Patient",
            ResourceType::Practitioner => "Practitioner",
        }
    }
}

impl fmt::Display for ResourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ResourceType {
    type Err = FhirError;

    fn from_str(s: &str) -> Result<Self> {
        DESCRIPTORS
            .iter()
            .map(|d| d.resource_type)
            .find(|rt| rt.as_str() == s)
            .ok_or_else(|| FhirError::UnknownResourceType(s.to_string()))
    }
}

/// A concrete resource shape
pub trait Resource:
    Serialize + DeserializeOwned + Default + fmt::Debug + Send + Sync + 'static
{
    const RESOURCE_TYPE: ResourceType;

    /// Logical id assigned by the server
    fn id(&self) -> Option<&str>;
}

/// Object-safe view of a resource whose concrete type is only known at runtime
pub trait AnyResource: fmt::Debug + Send + Sync {
    fn resource_type(&self) -> ResourceType;

    fn logical_id(&self) -> Option<&str>;

    fn to_json(&self) -> serde_json::Result<JsonValue>;

    fn as_any(&self) -> &dyn Any;

    fn into_any(self: Box<Self>) -> Box<dyn Any + Send + Sync>;
}

impl<T: Resource> AnyResource for T {
    fn resource_type(&self) -> ResourceType {
        T::RESOURCE_TYPE
    }

    fn logical_id(&self) -> Option<&str> {
        self.id()
    }

    fn to_json(&self) -> serde_json::Result<JsonValue> {
        serde_json::to_value(self)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn into_any(self: Box<Self>) -> Box<dyn Any + Send + Sync> {
        self
    }
}

impl dyn AnyResource {
    pub fn downcast_ref<T: Resource>(&self) -> Option<&T> {
        self.as_any().downcast_ref::<T>()
    }

    pub fn downcast<T: Resource>(self: Box<Self>) -> Option<T> {
        self.into_any().downcast::<T>().ok().map(|boxed| *boxed)
    }
}

/// Describes a registered resource shape
pub struct TypeDescriptor {
    pub resource_type: ResourceType,
    type_name: fn() -> &'static str,
    type_id: fn() -> TypeId,
    create: fn() -> Box<dyn AnyResource>,
    decode: fn(&[u8]) -> serde_json::Result<Box<dyn AnyResource>>,
}

impl TypeDescriptor {
    const fn of<T: Resource>() -> Self {
        Self {
            resource_type: T::RESOURCE_TYPE,
            type_name: std::any::type_name::<T>,
            type_id: TypeId::of::<T>,
            create: create_boxed::<T>,
            decode: decode_boxed::<T>,
        }
    }

    /// Rust type backing this resource type
    pub fn type_name(&self) -> &'static str {
        (self.type_name)()
    }

    pub fn type_id(&self) -> TypeId {
        (self.type_id)()
    }

    /// Whether `T` is the shape registered for this resource type
    pub fn is<T: Resource>(&self) -> bool {
        self.type_id() == TypeId::of::<T>()
    }

    /// Fresh zero-valued instance
    pub fn create(&self) -> Box<dyn AnyResource> {
        (self.create)()
    }

    /// Decode `bytes` into this descriptor's shape
    pub fn decode(&self, bytes: &[u8]) -> Result<Box<dyn AnyResource>> {
        (self.decode)(bytes).map_err(|source| FhirError::Decode {
            resource_type: self.resource_type,
            source,
        })
    }
}

impl fmt::Debug for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeDescriptor")
            .field("resource_type", &self.resource_type)
            .field("type_name", &self.type_name())
            .finish()
    }
}

fn create_boxed<T: Resource>() -> Box<dyn AnyResource> {
    Box::new(T::default())
}

fn decode_boxed<T: Resource>(bytes: &[u8]) -> serde_json::Result<Box<dyn AnyResource>> {
    Ok(Box::new(serde_json::from_slice::<T>(bytes)?))
}

static DESCRIPTORS: [TypeDescriptor; 8] = [
    TypeDescriptor::of::<Bundle>(),
    TypeDescriptor::of::<CapabilityStatement>(),
    TypeDescriptor::of::<Encounter>(),
    TypeDescriptor::of::<Observation>(),
    TypeDescriptor::of::<OperationOutcome>(),
    TypeDescriptor::of::<Organization>(),
    TypeDescriptor::of::<Patient>(),
    TypeDescriptor::of::<Practitioner>(),
];

/// All registered descriptors
pub fn registered() -> &'static [TypeDescriptor] {
    &DESCRIPTORS
}

/// Descriptor for a known resource type
pub fn descriptor(resource_type: ResourceType) -> &'static TypeDescriptor {
    // The table holds one descriptor per variant, in declaration order.
    &DESCRIPTORS[resource_type as usize]
}

/// Look up the descriptor for a resource type name
pub fn describe(name: &str) -> Result<&'static TypeDescriptor> {
    name.parse::<ResourceType>().map(descriptor)
}

/// Zero-valued instance of the named resource type
pub fn create(name: &str) -> Result<Box<dyn AnyResource>> {
    Ok(describe(name)?.create())
}

/// Decode `bytes` as the named resource type
pub fn decode(name: &str, bytes: &[u8]) -> Result<Box<dyn AnyResource>> {
    describe(name)?.decode(bytes)
}
