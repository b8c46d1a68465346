//! The serializer's neutral intermediate representation.
//!
//! `Entity` is what a typed object becomes on its way to the wire, and
//! what a wire record becomes on its way back to a typed object. It knows
//! nothing about the driver or the Cypher text that produced it — see
//! `serde_graph` for the object↔`Entity` mapping and `execution` for the
//! wire↔`Entity` mapping.

use std::collections::HashMap;

use super::Value;

/// A property value after it has been classified per `schema::rules`:
/// either a plain [`Value`], a homogeneous collection of them, a nested
/// complex object, or a collection of nested complex objects.
#[derive(Debug, Clone, PartialEq)]
pub enum Serialized {
    Simple(Value),
    SimpleCollection(Vec<Value>),
    Complex(Entity),
    ComplexCollection(Vec<Entity>),
}

/// Neutral representation of one node or relationship, mid-flight between
/// a typed Rust value and the wire.
///
/// `simple` holds every property classified `Simple`/`SimpleCollection` by
/// `schema::rules::is_simple`; `complex` holds every property classified
/// `Complex`/`ComplexCollection`. The split mirrors exactly how the
/// serializer must route each property: simple values go directly onto
/// the node/relationship's own property map, complex values become
/// auxiliary `__PROPERTY__{name}__` relationships (see
/// `execution::wire::reserved`).
#[derive(Debug, Clone, PartialEq)]
pub struct Entity {
    /// The user type name this entity was serialized from (or will be
    /// deserialized into), e.g. `"Person"`.
    pub type_name: String,
    /// The label (for nodes) or relationship-type name this entity
    /// carries on the wire.
    pub label: String,
    pub simple: HashMap<String, Value>,
    pub complex: HashMap<String, Serialized>,
}

impl Entity {
    pub fn new(type_name: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            label: label.into(),
            simple: HashMap::new(),
            complex: HashMap::new(),
        }
    }

    pub fn with_simple(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.simple.insert(name.into(), value.into());
        self
    }

    pub fn with_complex(mut self, name: impl Into<String>, value: Serialized) -> Self {
        self.complex.insert(name.into(), value);
        self
    }
}
