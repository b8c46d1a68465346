//! Type Registry (C1).
//!
//! Reflects declared entity types into a process-wide schema index: maps
//! labels to Rust types and back, and resolves polymorphism for the read
//! path (`most_derived`, §4.1). Rust has no runtime type reflection, so
//! where the source relies on scanning loaded assemblies, this registry
//! relies on explicit registration — the application calls
//! [`Registry::register_node`] (and, for a polymorphic hierarchy,
//! [`Registry::declare_node_subtype`]) once at startup, hand-wired
//! rather than discovered.

pub mod metadata;

use std::any::TypeId;
use std::collections::HashMap;
use std::sync::OnceLock;

use parking_lot::RwLock;

use crate::error::{Error, Result};
use crate::model::Entity;
use crate::registry::metadata::{ErasedNode, NodeType, RelationshipType};
use crate::schema::Schema;

pub use metadata::{ComplexProperty, NodeType as NodeTypeTrait, RelationshipType as RelationshipTypeTrait};

type NodeCtor = Box<dyn Fn(&Entity) -> Result<Box<dyn ErasedNode>> + Send + Sync>;

struct NodeEntry {
    type_id: TypeId,
    type_name: &'static str,
    label: &'static str,
    /// This type and every ancestor it was declared a subtype of, most
    /// derived first. A plain (non-polymorphic) type's ancestry is just
    /// itself.
    ancestry: Vec<TypeId>,
    construct: NodeCtor,
}

struct RelEntry {
    type_id: TypeId,
    type_name: &'static str,
    label: &'static str,
}

/// Process-wide reflection index (§4.1, §4.9 "explicit singletons with
/// their own lifecycle"). Lookups are safe under concurrent inserts: all
/// mutation goes through a single coarse `parking_lot::RwLock`, read
/// traffic (`label_of`/`type_of`/`most_derived`/`compatible_labels`,
/// by far the hot path) takes only a shared read lock.
#[derive(Default)]
pub struct Registry {
    nodes_by_type: RwLock<HashMap<TypeId, usize>>,
    nodes: RwLock<Vec<NodeEntry>>,
    rels_by_type: RwLock<HashMap<TypeId, usize>>,
    rels: RwLock<Vec<RelEntry>>,
    /// `(target, label) -> resolved type` cache for `most_derived`, per
    /// §4.1 "Cached by (target, label)".
    most_derived_cache: RwLock<HashMap<(TypeId, String), Option<TypeId>>>,
}

static REGISTRY: OnceLock<Registry> = OnceLock::new();

/// The process-wide registry, initialised lazily on first use.
pub fn global() -> &'static Registry {
    REGISTRY.get_or_init(Registry::default)
}

impl Registry {
    /// Register a node type. Idempotent — registering the same `T` twice
    /// is a no-op rather than an error, since static initialisation order
    /// between independent modules is not guaranteed.
    pub fn register_node<T: NodeType>(&self) {
        let tid = TypeId::of::<T>();
        if self.nodes_by_type.read().contains_key(&tid) {
            return;
        }
        let mut nodes_by_type = self.nodes_by_type.write();
        if nodes_by_type.contains_key(&tid) {
            return;
        }
        let schema = T::schema();
        let label = T::declared_label().unwrap_or(schema.type_name);
        let mut nodes = self.nodes.write();
        let idx = nodes.len();
        nodes.push(NodeEntry {
            type_id: tid,
            type_name: schema.type_name,
            label,
            ancestry: vec![tid],
            construct: Box::new(|entity| {
                crate::serde_graph::populate_node::<T>(entity).map(|obj| Box::new(obj) as Box<dyn ErasedNode>)
            }),
        });
        nodes_by_type.insert(tid, idx);
    }

    /// Declare that `Derived` is assignable to `Base` — the Rust
    /// equivalent of `Derived : Base` inheritance for the purposes of
    /// `most_derived`/`compatible_labels`. Both types must already be
    /// registered via `register_node`.
    pub fn declare_node_subtype<Derived: NodeType, Base: NodeType>(&self) {
        self.register_node::<Derived>();
        self.register_node::<Base>();
        let base_tid = TypeId::of::<Base>();
        let derived_tid = TypeId::of::<Derived>();
        let base_ancestry = {
            let nodes_by_type = self.nodes_by_type.read();
            let nodes = self.nodes.read();
            let base_idx = nodes_by_type[&base_tid];
            nodes[base_idx].ancestry.clone()
        };
        let mut nodes = self.nodes.write();
        let nodes_by_type = self.nodes_by_type.read();
        let derived_idx = nodes_by_type[&derived_tid];
        for tid in base_ancestry {
            if !nodes[derived_idx].ancestry.contains(&tid) {
                nodes[derived_idx].ancestry.push(tid);
            }
        }
        drop(nodes_by_type);
        drop(nodes);
        self.most_derived_cache.write().clear();
    }

    pub fn register_relationship<R: RelationshipType>(&self) {
        let tid = TypeId::of::<R>();
        if self.rels_by_type.read().contains_key(&tid) {
            return;
        }
        let mut rels_by_type = self.rels_by_type.write();
        if rels_by_type.contains_key(&tid) {
            return;
        }
        let schema = R::schema();
        let label = R::declared_type_name().unwrap_or(schema.type_name);
        let mut rels = self.rels.write();
        let idx = rels.len();
        rels.push(RelEntry { type_id: tid, type_name: schema.type_name, label });
        rels_by_type.insert(tid, idx);
    }

    /// `label_of(type)` (§4.1). Fails with `InvalidType` only in the
    /// degenerate case of an unregistered type with no schema — in
    /// practice, `T::schema()` can always produce a name, so this is
    /// infallible for any type that compiles against `NodeType`.
    pub fn label_of<T: NodeType>(&self) -> Result<&'static str> {
        self.register_node::<T>();
        let nodes_by_type = self.nodes_by_type.read();
        let nodes = self.nodes.read();
        let idx = nodes_by_type
            .get(&TypeId::of::<T>())
            .copied()
            .ok_or_else(|| Error::InvalidInput("type has no usable name".into()))?;
        Ok(nodes[idx].label)
    }

    /// `type_of(label) -> type | NotFound` (§4.1). Scans the already
    /// `register_node`-ed population; there is no way to discover types
    /// the application never registered, so unlike the source this never
    /// lazily widens beyond what has been declared.
    pub fn type_of(&self, label: &str) -> Result<TypeId> {
        let nodes = self.nodes.read();
        nodes
            .iter()
            .find(|e| e.label == label)
            .map(|e| e.type_id)
            .ok_or_else(|| Error::NotFound(format!("no registered type for label {label:?}")))
    }

    pub fn type_name_of_label(&self, label: &str) -> Result<&'static str> {
        let nodes = self.nodes.read();
        nodes
            .iter()
            .find(|e| e.label == label)
            .map(|e| e.type_name)
            .ok_or_else(|| Error::NotFound(format!("no registered type for label {label:?}")))
    }

    /// `most_derived(target, label) -> type | None` (§4.1): the
    /// registered type `T` such that `T` is assignable to `target` (i.e.
    /// `target` appears in `T`'s ancestry) and `label_of(T) == label`.
    pub fn most_derived<Target: NodeType>(&self, label: &str) -> Option<TypeId> {
        let target = TypeId::of::<Target>();
        let key = (target, label.to_string());
        if let Some(hit) = self.most_derived_cache.read().get(&key) {
            return *hit;
        }
        self.register_node::<Target>();
        let resolved = {
            let nodes = self.nodes.read();
            nodes
                .iter()
                .find(|e| e.label == label && e.ancestry.contains(&target))
                .map(|e| e.type_id)
        };
        self.most_derived_cache.write().insert(key, resolved);
        resolved
    }

    /// Construct and populate a type-erased instance of the resolved
    /// `TypeId` from wire data, used by the polymorphic deserialization
    /// path (`serde_graph::deserialize_node_dyn`).
    pub fn construct(&self, type_id: TypeId, entity: &Entity) -> Option<Result<Box<dyn ErasedNode>>> {
        let nodes_by_type = self.nodes_by_type.read();
        let idx = *nodes_by_type.get(&type_id)?;
        let nodes = self.nodes.read();
        Some((nodes[idx].construct)(entity))
    }

    /// `compatible_labels(target) -> [string]` (§4.1): the label of
    /// `target` plus the labels of every registered type assignable to it.
    pub fn compatible_labels<Target: NodeType>(&self) -> Vec<&'static str> {
        self.register_node::<Target>();
        let target = TypeId::of::<Target>();
        let nodes = self.nodes.read();
        let mut labels: Vec<&'static str> =
            nodes.iter().filter(|e| e.ancestry.contains(&target)).map(|e| e.label).collect();
        labels.sort_unstable();
        labels.dedup();
        labels
    }

    pub fn relationship_label<R: RelationshipType>(&self) -> &'static str {
        self.register_relationship::<R>();
        let rels_by_type = self.rels_by_type.read();
        let rels = self.rels.read();
        let idx = rels_by_type[&TypeId::of::<R>()];
        rels[idx].label
    }

    /// Schema accessor, exposed for the compiler's pattern-synthesis
    /// phase (B) and the serializer.
    pub fn node_schema<T: NodeType>(&self) -> Schema {
        T::schema()
    }
}
