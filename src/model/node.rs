//! Dynamic (schema-less) node representation.
//!
//! `DynamicNode` is the wire-level shape of a node: labels plus a property
//! bag, keyed by the application-assigned `id` (every `Entity` has a
//! stable, globally unique `id: string` — see §3). It is
//! what `graph.dynamic_nodes()` and `graph.get_dynamic_node()` hand back
//! when the caller has no static Rust type for the label(s) involved, and
//! it is also the shape the serializer's `Entity` IR is built from/into
//! on the way to and from a typed object.

use serde::{Deserialize, Serialize};

use super::{PropertyMap, Value};

/// A node in the property graph, addressed by its application id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DynamicNode {
    pub id: String,
    pub labels: Vec<String>,
    pub properties: PropertyMap,
}

impl DynamicNode {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into(), labels: Vec::new(), properties: PropertyMap::new() }
    }

    pub fn with_labels(mut self, labels: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.labels = labels.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }

    pub fn has_label(&self, label: &str) -> bool {
        self.labels.iter().any(|l| l == label)
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.properties.get(key)
    }
}
