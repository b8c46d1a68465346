//! # graph-ogm — an object-to-graph mapper for Bolt/Cypher-speaking property graphs
//!
//! Maps plain Rust types onto nodes and relationships of a property
//! graph, the way an ORM maps them onto rows of a relational one. The
//! eight load-bearing pieces, each its own module:
//!
//! - [`registry`] (C1) — the process-wide type reflection index:
//!   label ⇆ type lookups and `most_derived` polymorphic resolution.
//! - [`schema`] (C2) — property classification and the data-model rules
//!   (cycle detection, id/endpoint validation) every write goes through.
//! - [`serde_graph`] (C3) — the serializer: typed object ⇆ neutral
//!   [`model::Entity`].
//! - [`query`] (C4) — the deferred, statically-typed fluent query
//!   builder.
//! - [`compiler`] (C5) — turns a builder's operation tree into
//!   parameterized Cypher text and an executable plan.
//! - [`execution`] (C6) — the driver/cursor boundary plus the in-memory
//!   reference [`execution::MemoryDriver`].
//! - [`facade`] (C7) — [`Store`]/[`Graph`]/[`Tx`], the top-level handle
//!   application code actually holds.
//! - [`error`] (C8) — the error taxonomy every fallible operation above
//!   returns through.
//!
//! [`cypher`] is a retained Cypher front end (lexer/parser/AST), kept as
//! a round-trip test utility for the compiler's rendered text rather
//! than as part of the execution path — see `compiler::render`'s doc
//! comment.
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use graph_ogm::{Store, Schema, PropertyDescriptor, NodeType, Serialized, Value, ErasedNode};
//!
//! #[derive(Default)]
//! struct Person {
//!     id: String,
//!     name: String,
//! }
//!
//! impl NodeType for Person {
//!     fn schema() -> Schema {
//!         Schema::new("Person", vec!["Person"])
//!             .with_properties(vec![PropertyDescriptor::simple("id"), PropertyDescriptor::simple("name")])
//!     }
//!     fn empty() -> Self { Self::default() }
//!     fn set_property(&mut self, name: &str, value: Serialized) {
//!         match (name, value) {
//!             ("id", Serialized::Simple(Value::String(s))) => self.id = s,
//!             ("name", Serialized::Simple(Value::String(s))) => self.name = s,
//!             _ => {}
//!         }
//!     }
//!     fn get_property(&self, name: &str) -> Option<Serialized> {
//!         match name {
//!             "id" => Some(Serialized::Simple(Value::String(self.id.clone()))),
//!             "name" => Some(Serialized::Simple(Value::String(self.name.clone()))),
//!             _ => None,
//!         }
//!     }
//!     fn id(&self) -> String { self.id.clone() }
//! }
//!
//! # async fn example() -> graph_ogm::Result<()> {
//! let store = Store::open_memory();
//! let graph = store.graph();
//!
//! let person = Person { id: "p1".into(), name: "Ada".into() };
//! graph.create_node(None, &person).await?;
//!
//! let back = graph.get_node::<Person>(None, "p1").await?;
//! assert_eq!(back.as_any().downcast_ref::<Person>().unwrap().name, "Ada");
//!
//! let matches = graph.nodes::<Person>().where_clause(graph_ogm::field("name").eq("Ada")).to_list().await?;
//! assert_eq!(matches.len(), 1);
//! # Ok(())
//! # }
//! ```

// ============================================================================
// Modules
// ============================================================================

pub mod compiler;
pub mod cypher;
pub mod error;
pub mod execution;
pub mod facade;
pub mod model;
pub mod query;
pub mod registry;
pub mod schema;
pub mod serde_graph;

// ============================================================================
// Re-exports
// ============================================================================

pub use error::{Error, ErrorKind, Result};

pub use model::{DynamicNode, DynamicRelationship, Direction, Entity, Path, PathSegment, PropertyMap, Serialized, Value};

pub use registry::metadata::{ComplexProperty, ErasedNode, NodeType, RelationshipType};
pub use registry::Registry;

pub use schema::{ConstructorStrategy, PropertyDescriptor, PropertyKind, Schema};

pub use query::{
    field, rel_field, start_field, end_field, AggKind, DynamicNodeQuery, DynamicRelationshipQuery, GroupedQuery,
    NodeQuery, PathSegmentQuery, PathSegmentRow, Predicate, ProjectionQuery, RelationshipQuery, SearchQuery,
    Traversal, TraverseDirection,
};

pub use execution::{CancellationToken, Cursor, Driver, ExecutionContext, MemoryDriver, TxHandle, TxMode};

pub use facade::{Graph, GraphConfig, Store, Tx};
