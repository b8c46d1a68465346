//! Query Builder (C4, §4.4): the deferred, statically-typed fluent
//! surface. `expr`/`op` define the tree every builder method appends to;
//! `builder` is the fluent surface itself.

pub mod builder;
pub mod expr;
pub mod op;

pub use builder::{
    DynamicNodeQuery, DynamicRelationshipQuery, GroupedQuery, NodeQuery, PathSegmentQuery, PathSegmentRow,
    ProjectionQuery, RelationshipQuery, SearchQuery, Traversal,
};
pub use expr::{field, rel_field, start_field, end_field, Predicate};
pub use op::{AggKind, Operation, Program, Projection, TraverseDirection};
