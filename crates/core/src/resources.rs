//! Concrete resource shapes known to the registry.
//!
//! Each resource carries its `resourceType` as a plain field so it
//! round-trips through serde unchanged. The zero value has every element
//! empty and `resource_type` set to the resource's own name.

use serde::{Deserialize, Serialize};

use crate::datatypes::{
    CodeableConcept, Coding, HumanName, Identifier, Meta, Narrative, Quantity, Reference,
};
use crate::registry::{Resource, ResourceType};

macro_rules! resource {
    (
        $(#[$meta:meta])*
        pub struct $name:ident {
            $( $(#[$field_meta:meta])* pub $field:ident : $ty:ty, )*
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
        #[serde(rename_all = "camelCase", default)]
        pub struct $name {
            pub resource_type: String,

            #[serde(skip_serializing_if = "Option::is_none")]
            pub id: Option<String>,

            #[serde(skip_serializing_if = "Option::is_none")]
            pub meta: Option<Meta>,

            #[serde(skip_serializing_if = "Option::is_none")]
            pub text: Option<Narrative>,

            $( $(#[$field_meta])* pub $field: $ty, )*
        }

        impl Default for $name {
            fn default() -> Self {
                Self {
                    resource_type: stringify!($name).to_string(),
                    id: None,
                    meta: None,
                    text: None,
                    $( $field: Default::default(), )*
                }
            }
        }

        impl Resource for $name {
            const RESOURCE_TYPE: ResourceType = ResourceType::$name;

            fn id(&self) -> Option<&str> {
                self.id.as_deref()
            }
        }
    };
}

resource! {
    /// Demographics of a person receiving care
    pub struct Patient {
        #[serde(skip_serializing_if = "Vec::is_empty")]
        pub identifier: Vec<Identifier>,

        #[serde(skip_serializing_if = "Option::is_none")]
        pub active: Option<bool>,

        #[serde(skip_serializing_if = "Vec::is_empty")]
        pub name: Vec<HumanName>,

        #[serde(skip_serializing_if = "Option::is_none")]
        pub gender: Option<String>,

        #[serde(skip_serializing_if = "Option::is_none")]
        pub birth_date: Option<String>,

        #[serde(skip_serializing_if = "Option::is_none")]
        pub managing_organization: Option<Reference>,
    }
}

resource! {
    /// A person involved in providing care
    pub struct Practitioner {
        #[serde(skip_serializing_if = "Vec::is_empty")]
        pub identifier: Vec<Identifier>,

        #[serde(skip_serializing_if = "Option::is_none")]
        pub active: Option<bool>,

        #[serde(skip_serializing_if = "Vec::is_empty")]
        pub name: Vec<HumanName>,
    }
}

resource! {
    pub struct Organization {
        #[serde(skip_serializing_if = "Vec::is_empty")]
        pub identifier: Vec<Identifier>,

        #[serde(skip_serializing_if = "Option::is_none")]
        pub active: Option<bool>,

        #[serde(skip_serializing_if = "Option::is_none")]
        pub name: Option<String>,
    }
}

resource! {
    /// Measurement or assertion about a subject
    pub struct Observation {
        #[serde(skip_serializing_if = "Option::is_none")]
        pub status: Option<String>,

        #[serde(skip_serializing_if = "Option::is_none")]
        pub code: Option<CodeableConcept>,

        #[serde(skip_serializing_if = "Option::is_none")]
        pub subject: Option<Reference>,

        #[serde(skip_serializing_if = "Option::is_none")]
        pub effective_date_time: Option<String>,

        #[serde(skip_serializing_if = "Option::is_none")]
        pub value_quantity: Option<Quantity>,

        #[serde(skip_serializing_if = "Option::is_none")]
        pub value_string: Option<String>,
    }
}

resource! {
    /// Interaction between a patient and a provider
    pub struct Encounter {
        #[serde(skip_serializing_if = "Option::is_none")]
        pub status: Option<String>,

        #[serde(skip_serializing_if = "Option::is_none")]
        pub class: Option<Coding>,

        #[serde(skip_serializing_if = "Option::is_none")]
        pub subject: Option<Reference>,
    }
}
