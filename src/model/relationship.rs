//! Dynamic (schema-less) relationship representation.

use serde::{Deserialize, Serialize};
use super::{PropertyMap, Value};

/// Semantic direction of a relationship relative to its start node.
/// Storage is always directed; `Incoming` is represented by swapping
/// endpoints at write time (see §3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    Outgoing,
    Incoming,
    /// Only meaningful as a traversal filter, never as a stored value.
    Both,
}

/// A relationship (directed edge) in the property graph, addressed by its
/// application id and the application ids of its two endpoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DynamicRelationship {
    pub id: String,
    pub start_id: String,
    pub end_id: String,
    pub rel_type: String,
    pub direction: Direction,
    pub properties: PropertyMap,
}

impl DynamicRelationship {
    pub fn new(
        id: impl Into<String>,
        start_id: impl Into<String>,
        end_id: impl Into<String>,
        rel_type: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            start_id: start_id.into(),
            end_id: end_id.into(),
            rel_type: rel_type.into(),
            direction: Direction::Outgoing,
            properties: PropertyMap::new(),
        }
    }

    pub fn with_direction(mut self, direction: Direction) -> Self {
        self.direction = direction;
        self
    }

    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }

    /// The id of the "other" endpoint from the given node id.
    pub fn other_node(&self, from: &str) -> Option<&str> {
        if from == self.start_id { Some(&self.end_id) }
        else if from == self.end_id { Some(&self.start_id) }
        else { None }
    }
}
