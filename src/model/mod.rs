//! # Property Graph Model
//!
//! Clean DTOs that define the wire-level shape of nodes, relationships,
//! values, and the serializer's neutral `Entity` intermediate
//! representation. These types cross every boundary: registry ↔
//! serde_graph ↔ compiler ↔ execution ↔ user.
//!
//! Design rule: these types are pure data — no I/O, no state, no async.

pub mod node;
pub mod relationship;
pub mod path;
pub mod value;
pub mod property_map;
pub mod entity;

pub use node::DynamicNode;
pub use relationship::{DynamicRelationship, Direction};
pub use path::{Path, PathSegment};
pub use value::Value;
pub use property_map::PropertyMap;
pub use entity::{Entity, Serialized};
