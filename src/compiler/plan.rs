//! The compiler's output types (§4.5): `CypherQuery` is what the
//! execution layer actually runs. `text`/`params` are what a real Bolt
//! driver sends over the wire; `plan` is additional, non-wire metadata a
//! same-process `Driver` (our in-memory test implementation, §4.6) can
//! execute directly instead of re-parsing `text` — a real network driver
//! ignores it entirely. This mirrors a prepared statement carrying its
//! own execution plan alongside the SQL text a proxy would log.

use std::collections::HashMap;

use crate::model::Value;
use crate::query::expr::Predicate;
use crate::query::op::{AggKind, Projection, TraverseDirection};
use crate::schema::Schema;

#[derive(Debug, Clone)]
pub enum RootSpec {
    Nodes(Vec<String>),
    Relationships(String),
}

#[derive(Debug, Clone)]
pub struct HopSpec {
    pub rel_labels: Vec<String>,
    pub target_labels: Vec<String>,
    pub direction: TraverseDirection,
    pub min_depth: usize,
    pub max_depth: usize,
}

#[derive(Debug, Clone)]
pub enum Terminal {
    ToList,
    First,
    Single,
    Any,
    All(Predicate),
    Count,
    Contains(Value),
    ElementAt { index: usize, or_default: bool },
    /// Traversal completion: target nodes of the last hop.
    To,
    /// Traversal completion: relationships visited across all hops.
    Relationships,
    /// `path_segments()`: one `{start, rel, end}` triple per hop.
    PathSegments,
}

/// The compiler's internal target representation the in-memory driver
/// executes directly (§4.5 Phase B/C/D/E/F, all folded into one struct
/// rather than kept as separate AST passes, since this plan *is* the
/// already-normalised result of phases A–F).
#[derive(Debug, Clone)]
pub struct CompiledPlan {
    pub root: RootSpec,
    pub hops: Vec<HopSpec>,
    pub predicate: Option<Predicate>,
    pub order_by: Vec<(String, bool)>,
    pub skip: Option<usize>,
    pub take: Option<usize>,
    pub distinct: bool,
    pub group_by: Option<String>,
    pub aggregate: Option<(AggKind, Option<String>)>,
    pub projection: Projection,
    pub terminal: Terminal,
    pub search: Option<(String, Vec<String>)>,
    /// Phase F: whether the primary binding's auxiliary complex-property
    /// subgraph should be collected alongside it.
    pub load_complex: bool,
    /// The root binding's schema, carried through to the renderer so Phase
    /// C can recognise a dotted predicate field as naming a `Complex`
    /// property and synthesise the auxiliary-relationship hop needed to
    /// reach it in the emitted Cypher text.
    pub root_schema: Schema,
}

/// How the execution layer should interpret each record the driver
/// yields (§4.5 "result_shape", §6 "record binding names").
#[derive(Debug, Clone)]
pub enum ResultShape {
    /// A single node/relationship binding, with its complex-property
    /// companion collection if `load_complex` was set.
    Entity { binding: &'static str },
    /// A product-type projection: an ordered list of scalar fields.
    Projection { fields: Vec<String> },
    /// `{start, rel, end}` triples from `path_segments()`.
    PathSegment,
    /// A single scalar (count/any/all/aggregate-without-group-by).
    Scalar,
    /// Grouped aggregate rows keyed by `g.key`.
    Grouped,
}

/// The compiler's output: parametrised Cypher text, its parameter map,
/// a result-shape descriptor for the deserializer, and the structured
/// plan an in-process driver can execute without re-parsing `text`.
#[derive(Debug, Clone)]
pub struct CypherQuery {
    pub text: String,
    pub params: HashMap<String, Value>,
    pub result_shape: ResultShape,
    pub plan: CompiledPlan,
}
