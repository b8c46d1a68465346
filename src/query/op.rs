//! The operation tree (§4.4): the immutable, explicit AST every builder
//! method appends one node to. Exhaustive over §4.4's node list —
//! nothing the builder surface exposes skips this tree.

use crate::model::Value;
use crate::query::expr::Predicate;
use crate::schema::Schema;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AggKind {
    Sum,
    Avg,
    Min,
    Max,
    Count,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TraverseDirection {
    Outgoing,
    Incoming,
    Both,
}

/// What a terminal `Select` projects. `Identity` keeps the full entity
/// (and, per Phase F, enables complex-property loading); `Fields` names a
/// product-type projection and *disables* it (§4.5 Phase D).
#[derive(Debug, Clone)]
pub enum Projection {
    Identity,
    Fields(Vec<String>),
}

#[derive(Debug, Clone)]
pub enum Operation {
    /// `schema` is the root type's schema, carried so Phase C can decide
    /// whether a dotted predicate field names a `Complex` property and
    /// needs an auxiliary-relationship hop synthesised.
    RootNodes { labels: Vec<&'static str>, schema: Schema },
    RootRelationships { rel_type: &'static str, schema: Schema },
    Where(Predicate),
    Select(Projection),
    OrderBy { field: String, desc: bool },
    ThenBy { field: String, desc: bool },
    Skip(usize),
    Take(usize),
    Distinct,
    GroupBy { field: String },
    Aggregate { kind: AggKind, field: Option<String> },
    First { predicate: Option<Predicate> },
    Single { predicate: Option<Predicate> },
    Any { predicate: Option<Predicate> },
    All { predicate: Predicate },
    Contains { value: Value },
    ElementAt { index: usize, or_default: bool },
    Traverse { rel_labels: Vec<&'static str>, target_labels: Vec<&'static str>, target_schema: Schema },
    Direction(TraverseDirection),
    Depth { min: usize, max: usize },
    ThenTraverse { rel_labels: Vec<&'static str>, target_labels: Vec<&'static str>, target_schema: Schema },
    To,
    Relationships,
    PathSegments,
    Search { text: String, fields: Vec<String> },
    WithTransaction,
}

/// A builder value's accumulated operation tree. Every non-terminal
/// builder method clones this and appends one node (§8 invariant 8:
/// builder immutability — the prior value, if reused, still produces the
/// pre-operator query).
#[derive(Debug, Clone, Default)]
pub struct Program(pub Vec<Operation>);

impl Program {
    pub fn pushed(&self, op: Operation) -> Program {
        let mut ops = self.0.clone();
        ops.push(op);
        Program(ops)
    }
}
