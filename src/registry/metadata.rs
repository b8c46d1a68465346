//! Entity-type metadata traits.
//!
//! These are the Rust equivalent of the external `Node(label?)`,
//! `Relationship(label?)`, `Property(label?, is_indexed)` attributes from
//! §6. There is no derive macro here on purpose — macro codegen for user
//! types is explicitly out of scope (§1); a type opts in by implementing
//! the trait directly, hand-wired rather than generated.

use std::any::{Any, TypeId};
use std::rc::Rc;

use crate::model::{Direction, Entity, PropertyMap, Serialized, Value};
use crate::schema::{ComplexNode, Schema};

/// Implemented by a user type that maps to graph nodes.
///
/// `declared_label()` corresponds to the optional `Node(label)` attribute;
/// returning `None` falls back to the type's short name (backtick
/// generics stripped), per `registry::label_of`. Implementors write
/// `set_property`/`get_property` the way one hand-writes a `serde::Serialize`
/// impl: match on `name`, and for complex fields recurse through
/// `serde_graph::serialize_complex`/`deserialize_complex` rather than
/// threading a second, type-erased complex-property trait through the
/// registry — the concrete field type is already known at the impl site.
pub trait NodeType: Any + Send + Sync + Sized {
    fn declared_label() -> Option<&'static str> {
        None
    }

    /// Schema for this type. Implementors normally construct this once as
    /// a `const`/`static`; see `schema::Schema`.
    fn schema() -> Schema;

    /// Construct an instance with every property set to its default/empty
    /// value — the "public default construction path" §3 requires of
    /// complex types applies transitively to nodes too, since the
    /// deserializer must build an instance before assigning fields.
    fn empty() -> Self;

    /// Assign one property (simple or complex), matched case-insensitively
    /// by `serde_graph::deserialize` against `name_on_wire`.
    fn set_property(&mut self, name: &str, value: Serialized);

    /// Read one property back out, used by `serde_graph::serialize`.
    fn get_property(&self, name: &str) -> Option<Serialized>;

    /// Application-assigned, globally unique id (see §3).
    fn id(&self) -> String;

    /// Roots of this node's complex-property object graph, for
    /// `schema::rules::has_reference_cycle` (§4.2, §8 invariant 4). Plain
    /// owned complex fields can never alias their ancestor and so can
    /// never cycle — only a type that shares complex children behind
    /// `Rc`/`Arc` needs to override this default empty implementation.
    fn complex_roots(&self) -> Vec<Rc<dyn ComplexNode>> {
        Vec::new()
    }
}

/// Implemented by a user type that maps to graph relationships.
pub trait RelationshipType: Any + Send + Sync + Sized {
    fn declared_type_name() -> Option<&'static str> {
        None
    }

    fn schema() -> Schema;
    fn empty() -> Self;
    /// Relationships only ever carry `Simple`/`SimpleCollection` properties
    /// (§3: "forbidden on relationships: complex properties"); the
    /// signature still takes `Serialized` so the serializer has one
    /// uniform call shape across nodes/relationships/complex types, but
    /// implementors should never be handed a `Complex`/`ComplexCollection`
    /// variant — `schema::rules` rejects those before construction.
    fn set_property(&mut self, name: &str, value: Serialized);
    fn get_property(&self, name: &str) -> Option<Serialized>;

    fn id(&self) -> String;
    fn start_id(&self) -> String;
    fn end_id(&self) -> String;
    fn direction(&self) -> Direction;
}

/// Implemented by a complex (nested, non-node/relationship) property
/// type. Requires a public default-construction path and publicly
/// accessible read+write per property, per §3.
pub trait ComplexProperty: Any + Send + Sync + Sized {
    fn schema() -> Schema;
    fn empty() -> Self;
    fn set_property(&mut self, name: &str, value: Serialized);
    fn get_property(&self, name: &str) -> Option<Serialized>;
}

/// Type-erased view over a [`NodeType`]/[`RelationshipType`] instance,
/// used by the registry's polymorphic read path (`most_derived`, §4.1)
/// and the dynamic facade. Blanket-implemented below; application code
/// never implements this directly.
pub trait ErasedNode: Any + Send + Sync {
    fn type_name(&self) -> &'static str;
    fn node_id(&self) -> String;
    fn as_any(&self) -> &dyn Any;
    fn into_any(self: Box<Self>) -> Box<dyn Any>;
}

impl<T: NodeType> ErasedNode for T {
    fn type_name(&self) -> &'static str {
        T::schema().type_name
    }
    fn node_id(&self) -> String {
        self.id()
    }
    fn as_any(&self) -> &dyn Any {
        self
    }
    fn into_any(self: Box<Self>) -> Box<dyn Any> {
        self
    }
}

pub(crate) fn type_id_of<T: Any>() -> TypeId {
    TypeId::of::<T>()
}

/// Bag of raw simple property values read off/written onto a typed
/// object without the full `NodeType`/`ComplexProperty` bound — used by
/// the dynamic facade to adapt a `DynamicNode`'s `PropertyMap` into the
/// simple-property calls typed code makes.
pub fn property_map_of(simple: impl IntoIterator<Item = (String, Value)>) -> PropertyMap {
    simple.into_iter().collect()
}

/// Helper re-exported for impls that want to build a `Serialized::Complex`
/// without importing `model::Entity` directly.
pub fn complex(entity: Entity) -> Serialized {
    Serialized::Complex(entity)
}
