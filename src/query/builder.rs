//! The deferred, statically-typed fluent surface (§4.4) — `NodeQuery<T>`,
//! `RelationshipQuery<R>`, `Traversal<S, Rel, Target>`,
//! `PathSegmentQuery<S, Rel, Target>`, `SearchQuery<T>`, and their
//! `Dynamic*` counterparts. Every chain method borrows `&self`, clones the
//! accumulated [`Program`], and returns a new builder value (§8 invariant
//! 8: builder immutability — the value a chain method was called on keeps
//! producing its own, unextended query). Terminators are the only methods
//! that consume `self`: there is nothing left to chain onto once the
//! query has actually run.

use std::marker::PhantomData;

use futures_core::Stream;
use futures_util::stream::StreamExt;

use crate::compiler;
use crate::error::{Error, Result};
use crate::execution::{self, Cursor, CancellationToken, Driver, ExecutionContext, RecordValue, TxHandle, TxMode};
use crate::model::{Entity, Value};
use crate::query::expr::Predicate;
use crate::query::op::{AggKind, Operation, Program, Projection, TraverseDirection};
use crate::registry::metadata::{ErasedNode, NodeType, RelationshipType};
use crate::registry::{self};
use crate::schema::Schema;
use crate::serde_graph;

/// Runs `program` against `ctx`'s driver. When the caller has not opened
/// an ambient transaction (`with_transaction`, §4.4), a query still needs
/// *some* transaction to run inside — a short-lived read-only one is
/// opened and rolled back around it, invisible to the caller.
async fn execute(ctx: &ExecutionContext, program: &Program) -> Result<(Vec<RecordValue>, Schema)> {
    let query = compiler::compile(program)?;
    let token = ctx.token.as_ref();
    let rows = match ctx.tx {
        Some(tx) => {
            let cursor = ctx.driver.run(tx, &query, token).await?;
            execution::drain(cursor, token).await?
        }
        None => {
            let tx = ctx.driver.begin_tx(TxMode::ReadOnly).await?;
            let result = run_and_drain(ctx.driver.as_ref(), tx, &query, token).await;
            ctx.driver.rollback_tx(tx).await?;
            result?
        }
    };
    Ok((rows, query.plan.root_schema))
}

async fn run_and_drain(
    driver: &(dyn Driver + '_),
    tx: TxHandle,
    query: &compiler::plan::CypherQuery,
    token: Option<&CancellationToken>,
) -> Result<Vec<RecordValue>> {
    let cursor: Box<dyn Cursor> = driver.run(tx, query, token).await?;
    execution::drain(cursor, token).await
}

/// The streaming sibling of `execute`: opens whatever transaction the
/// query needs exactly as `execute` does, but hands back a lazily-pulled
/// row stream (§4.6) instead of buffering everything into a `Vec` first.
/// A read-only transaction this call opened itself is rolled back once
/// the stream is exhausted, errors out, or is cancelled. Takes `ctx`/
/// `program` by value (both cheap to clone) so the returned stream owns
/// everything it needs and borrows nothing from the caller.
async fn stream_rows(ctx: ExecutionContext, program: Program) -> Result<impl Stream<Item = Result<RecordValue>>> {
    let query = compiler::compile(&program)?;
    let token = ctx.token.clone();
    let (cursor, owned_tx) = match ctx.tx {
        Some(tx) => (ctx.driver.run(tx, &query, token.as_ref()).await?, None),
        None => {
            let tx = ctx.driver.begin_tx(TxMode::ReadOnly).await?;
            let cursor = ctx.driver.run(tx, &query, token.as_ref()).await?;
            (cursor, Some((ctx.driver.clone(), tx)))
        }
    };
    let rows = execution::drain_stream(cursor, token);
    let cleanup = futures_util::stream::once(async move {
        if let Some((driver, tx)) = owned_tx {
            let _ = driver.rollback_tx(tx).await;
        }
        None::<Result<RecordValue>>
    })
    .filter_map(|row| async move { row });
    Ok(rows.chain(cleanup))
}

fn row_entity(row: RecordValue) -> Option<Entity> {
    match row {
        RecordValue::Entity { entity } => Some(entity),
        _ => None,
    }
}

fn row_scalar(row: RecordValue) -> Option<Value> {
    match row {
        RecordValue::Scalar(v) => Some(v),
        _ => None,
    }
}

fn row_grouped(row: RecordValue) -> Option<(Value, Value)> {
    match row {
        RecordValue::Grouped { key, value, .. } => Some((key, value)),
        _ => None,
    }
}

fn row_path_segment(row: RecordValue) -> Option<(Entity, Entity, Entity)> {
    match row {
        RecordValue::PathSegment { start, rel, end } => Some((start, rel, end)),
        _ => None,
    }
}

fn row_projection(row: RecordValue) -> Option<Vec<(String, Value)>> {
    match row {
        RecordValue::Projection { fields } => Some(fields),
        _ => None,
    }
}

fn dynamic_node_from_entity(entity: &Entity) -> Result<Box<dyn ErasedNode>> {
    let reg = registry::global();
    let type_id = reg.type_of(&entity.label)?;
    reg.construct(type_id, entity).unwrap_or_else(|| Err(Error::unresolvable_polymorphic(entity.label.clone())))
}

// ===========================================================================
// NodeQuery<T>
// ===========================================================================

/// `nodes<T>()` (§4.4): the typed entry point into the node query surface.
/// The root pattern matches every label `T` or a registered subtype of
/// `T` was declared under (`Registry::compatible_labels`), so a subtype
/// instance is included in the result set — and each row resolves
/// `most_derived(T, row.label)` and constructs that concrete type,
/// type-erased (§3, §8 scenario S3): the returned rows may carry a more
/// derived runtime type than the statically requested `T`.
pub struct NodeQuery<T: NodeType> {
    program: Program,
    ctx: ExecutionContext,
    _marker: PhantomData<T>,
}

impl<T: NodeType> Clone for NodeQuery<T> {
    fn clone(&self) -> Self {
        Self { program: self.program.clone(), ctx: self.ctx.clone(), _marker: PhantomData }
    }
}

impl<T: NodeType> NodeQuery<T> {
    pub fn new(ctx: ExecutionContext) -> Self {
        let schema = T::schema();
        let labels = registry::global().compatible_labels::<T>();
        let program = Program::default().pushed(Operation::RootNodes { labels, schema });
        Self { program, ctx, _marker: PhantomData }
    }

    pub fn where_clause(&self, predicate: Predicate) -> Self {
        self.push(Operation::Where(predicate))
    }

    pub fn order_by(&self, field: impl Into<String>, desc: bool) -> Self {
        self.push(Operation::OrderBy { field: field.into(), desc })
    }

    pub fn then_by(&self, field: impl Into<String>, desc: bool) -> Self {
        self.push(Operation::ThenBy { field: field.into(), desc })
    }

    pub fn skip(&self, n: usize) -> Self {
        self.push(Operation::Skip(n))
    }

    pub fn take(&self, n: usize) -> Self {
        self.push(Operation::Take(n))
    }

    pub fn distinct(&self) -> Self {
        self.push(Operation::Distinct)
    }

    pub fn with_transaction(&self, tx: TxHandle) -> Self {
        let mut next = self.push(Operation::WithTransaction);
        next.ctx.tx = Some(tx);
        next
    }

    pub fn select(&self, fields: impl IntoIterator<Item = impl Into<String>>) -> ProjectionQuery {
        let fields: Vec<String> = fields.into_iter().map(Into::into).collect();
        ProjectionQuery { program: self.push(Operation::Select(Projection::Fields(fields))).program, ctx: self.ctx.clone() }
    }

    pub fn group_by(&self, field: impl Into<String>) -> GroupedQuery {
        GroupedQuery { program: self.push(Operation::GroupBy { field: field.into() }).program, ctx: self.ctx.clone() }
    }

    pub fn search(&self, text: impl Into<String>, fields: impl IntoIterator<Item = impl Into<String>>) -> SearchQuery<T> {
        let op = Operation::Search { text: text.into(), fields: fields.into_iter().map(Into::into).collect() };
        SearchQuery { program: self.push(op).program, ctx: self.ctx.clone(), _marker: PhantomData }
    }

    /// `traverse<R, Target>()` (§4.4): starts a traversal from this root,
    /// hopping across relationships of type `R` to nodes assignable to
    /// `Target`, in the outgoing direction at depth one by default —
    /// refine with `.direction()`/`.depth()` before terminating.
    pub fn traverse<R: RelationshipType, Target: NodeType>(&self) -> Traversal<T, R, Target> {
        Traversal::from_program(self.push_hop::<R, Target>().program, self.ctx.clone())
    }

    fn push_hop<R: RelationshipType, Target: NodeType>(&self) -> Self {
        let rel_labels = vec![registry::global().relationship_label::<R>()];
        let target_labels = registry::global().compatible_labels::<Target>();
        self.push(Operation::Traverse { rel_labels, target_labels, target_schema: Target::schema() })
    }

    fn push(&self, op: Operation) -> Self {
        Self { program: self.program.pushed(op), ctx: self.ctx.clone(), _marker: PhantomData }
    }

    pub async fn to_list(self) -> Result<Vec<Box<dyn ErasedNode>>> {
        let (rows, _) = execute(&self.ctx, &self.program).await?;
        rows.into_iter().filter_map(row_entity).map(|e| serde_graph::deserialize_node_dyn::<T>(&e)).collect()
    }

    /// The streaming terminator (§4.6): rows are pulled from the driver
    /// one page at a time as the caller polls the returned stream, not
    /// materialized into a `Vec` before the first one is visible. Useful
    /// for result sets too large to hold in memory at once.
    pub async fn to_stream(self) -> Result<impl Stream<Item = Result<Box<dyn ErasedNode>>>> {
        let rows = stream_rows(self.ctx, self.program).await?;
        Ok(rows.filter_map(|row| async move {
            match row {
                Ok(r) => row_entity(r).map(|e| serde_graph::deserialize_node_dyn::<T>(&e)),
                Err(e) => Some(Err(e)),
            }
        }))
    }

    /// `to_array()` (§4.4): an alias for `to_list` under the array-shaped
    /// name the spec's terminator list also accepts — both produce the
    /// same in-memory, fully-resolved collection.
    pub async fn to_array(self) -> Result<Vec<Box<dyn ErasedNode>>> {
        self.to_list().await
    }

    /// `to_set()` (§4.4): like `to_list`, but deduplicated by node id —
    /// the only stable identity a type-erased row carries.
    pub async fn to_set(self) -> Result<Vec<Box<dyn ErasedNode>>> {
        let all = self.to_list().await?;
        let mut seen = std::collections::HashSet::new();
        Ok(all.into_iter().filter(|n| seen.insert(n.node_id())).collect())
    }

    /// `to_dictionary(key)` (§4.4): resolves each row polymorphically, then
    /// keys the result by the named simple property read off the
    /// underlying entity rather than the erased node itself — the erased
    /// trait only promises `node_id`/`type_name`, not arbitrary property
    /// access.
    pub async fn to_dictionary(self, key: impl Into<String>) -> Result<Vec<(Value, Box<dyn ErasedNode>)>> {
        let key = key.into();
        let (rows, _) = execute(&self.ctx, &self.program).await?;
        rows.into_iter()
            .filter_map(row_entity)
            .map(|e| {
                let k = e
                    .simple
                    .get(&key)
                    .cloned()
                    .ok_or_else(|| Error::InvalidInput(format!("to_dictionary: no property `{key}` on row")))?;
                let node = serde_graph::deserialize_node_dyn::<T>(&e)?;
                Ok((k, node))
            })
            .collect()
    }

    pub async fn first(self, predicate: Option<Predicate>) -> Result<Option<Box<dyn ErasedNode>>> {
        let program = self.program.pushed(Operation::First { predicate });
        let (rows, _) = execute(&self.ctx, &program).await?;
        rows.into_iter().filter_map(row_entity).next().map(|e| serde_graph::deserialize_node_dyn::<T>(&e)).transpose()
    }

    pub async fn single(self, predicate: Option<Predicate>) -> Result<Box<dyn ErasedNode>> {
        let program = self.program.pushed(Operation::Single { predicate });
        let (rows, _) = execute(&self.ctx, &program).await?;
        let mut entities = rows.into_iter().filter_map(row_entity);
        let first = entities.next().ok_or_else(|| Error::NotFound("single() matched no rows".into()))?;
        if entities.next().is_some() {
            return Err(Error::InvalidInput("single() matched more than one row".into()));
        }
        serde_graph::deserialize_node_dyn::<T>(&first)
    }

    pub async fn any(self, predicate: Option<Predicate>) -> Result<bool> {
        let program = self.program.pushed(Operation::Any { predicate });
        let (rows, _) = execute(&self.ctx, &program).await?;
        Ok(rows.into_iter().filter_map(row_scalar).next().map(|v| v.is_truthy()).unwrap_or(false))
    }

    pub async fn all(self, predicate: Predicate) -> Result<bool> {
        let program = self.program.pushed(Operation::All { predicate });
        let (rows, _) = execute(&self.ctx, &program).await?;
        Ok(rows.into_iter().filter_map(row_scalar).next().map(|v| v.is_truthy()).unwrap_or(true))
    }

    pub async fn contains(self, value: impl Into<Value>) -> Result<bool> {
        let program = self.program.pushed(Operation::Contains { value: value.into() });
        let (rows, _) = execute(&self.ctx, &program).await?;
        Ok(rows.into_iter().filter_map(row_scalar).next().map(|v| v.is_truthy()).unwrap_or(false))
    }

    pub async fn element_at(self, index: usize, or_default: bool) -> Result<Option<Box<dyn ErasedNode>>> {
        let program = self.program.pushed(Operation::ElementAt { index, or_default });
        let (rows, _) = execute(&self.ctx, &program).await?;
        rows.into_iter().filter_map(row_entity).next().map(|e| serde_graph::deserialize_node_dyn::<T>(&e)).transpose()
    }

    pub async fn count(self) -> Result<i64> {
        let program = self.program.pushed(Operation::Aggregate { kind: AggKind::Count, field: None });
        let (rows, _) = execute(&self.ctx, &program).await?;
        Ok(rows.into_iter().filter_map(row_scalar).next().and_then(|v| v.as_int()).unwrap_or(0))
    }
}

// ===========================================================================
// DynamicNodeQuery
// ===========================================================================

/// `dynamic_nodes(label)` (§4.4): the untyped counterpart to `NodeQuery`.
/// Rows resolve through the registry by label alone, with no statically
/// known target to narrow against.
#[derive(Clone)]
pub struct DynamicNodeQuery {
    program: Program,
    ctx: ExecutionContext,
}

impl DynamicNodeQuery {
    pub fn new(ctx: ExecutionContext, label: &'static str) -> Self {
        let type_name = registry::global().type_name_of_label(label).unwrap_or(label);
        let schema = Schema::new(type_name, vec![label]);
        let program = Program::default().pushed(Operation::RootNodes { labels: vec![label], schema });
        Self { program, ctx }
    }

    pub fn where_clause(&self, predicate: Predicate) -> Self {
        self.push(Operation::Where(predicate))
    }

    pub fn order_by(&self, field: impl Into<String>, desc: bool) -> Self {
        self.push(Operation::OrderBy { field: field.into(), desc })
    }

    pub fn skip(&self, n: usize) -> Self {
        self.push(Operation::Skip(n))
    }

    pub fn take(&self, n: usize) -> Self {
        self.push(Operation::Take(n))
    }

    fn push(&self, op: Operation) -> Self {
        Self { program: self.program.pushed(op), ctx: self.ctx.clone() }
    }

    pub async fn to_list(self) -> Result<Vec<Box<dyn ErasedNode>>> {
        let (rows, _) = execute(&self.ctx, &self.program).await?;
        rows.into_iter().filter_map(row_entity).map(|e| dynamic_node_from_entity(&e)).collect()
    }

    pub async fn first(self) -> Result<Option<Box<dyn ErasedNode>>> {
        let program = self.program.pushed(Operation::First { predicate: None });
        let (rows, _) = execute(&self.ctx, &program).await?;
        rows.into_iter().filter_map(row_entity).next().map(|e| dynamic_node_from_entity(&e)).transpose()
    }
}

// ===========================================================================
// RelationshipQuery<R>
// ===========================================================================

/// `relationships<R>()` (§4.4).
pub struct RelationshipQuery<R: RelationshipType> {
    program: Program,
    ctx: ExecutionContext,
    _marker: PhantomData<R>,
}

impl<R: RelationshipType> Clone for RelationshipQuery<R> {
    fn clone(&self) -> Self {
        Self { program: self.program.clone(), ctx: self.ctx.clone(), _marker: PhantomData }
    }
}

impl<R: RelationshipType> RelationshipQuery<R> {
    pub fn new(ctx: ExecutionContext) -> Self {
        let schema = R::schema();
        let rel_type = registry::global().relationship_label::<R>();
        let program = Program::default().pushed(Operation::RootRelationships { rel_type, schema });
        Self { program, ctx, _marker: PhantomData }
    }

    pub fn where_clause(&self, predicate: Predicate) -> Self {
        self.push(Operation::Where(predicate))
    }

    pub fn order_by(&self, field: impl Into<String>, desc: bool) -> Self {
        self.push(Operation::OrderBy { field: field.into(), desc })
    }

    pub fn skip(&self, n: usize) -> Self {
        self.push(Operation::Skip(n))
    }

    pub fn take(&self, n: usize) -> Self {
        self.push(Operation::Take(n))
    }

    fn push(&self, op: Operation) -> Self {
        Self { program: self.program.pushed(op), ctx: self.ctx.clone(), _marker: PhantomData }
    }

    pub async fn to_list(self) -> Result<Vec<R>> {
        let (rows, _) = execute(&self.ctx, &self.program).await?;
        rows.into_iter().filter_map(row_entity).map(|e| serde_graph::deserialize_relationship::<R>(&e)).collect()
    }

    pub async fn count(self) -> Result<i64> {
        let program = self.program.pushed(Operation::Aggregate { kind: AggKind::Count, field: None });
        let (rows, _) = execute(&self.ctx, &program).await?;
        Ok(rows.into_iter().filter_map(row_scalar).next().and_then(|v| v.as_int()).unwrap_or(0))
    }
}

/// `dynamic_relationships(rel_type)` (§4.4). Rows come back as the
/// neutral wire [`Entity`] shape: there is no statically declared `R` to
/// reconstruct a full typed value from, and the label alone is not a
/// registered relationship type to resolve polymorphically the way
/// `DynamicNodeQuery` resolves nodes.
#[derive(Clone)]
pub struct DynamicRelationshipQuery {
    program: Program,
    ctx: ExecutionContext,
}

impl DynamicRelationshipQuery {
    pub fn new(ctx: ExecutionContext, rel_type: &'static str) -> Self {
        let schema = Schema::new(rel_type, vec![rel_type]);
        let program = Program::default().pushed(Operation::RootRelationships { rel_type, schema });
        Self { program, ctx }
    }

    pub fn where_clause(&self, predicate: Predicate) -> Self {
        Self { program: self.program.pushed(Operation::Where(predicate)), ctx: self.ctx.clone() }
    }

    pub async fn to_list(self) -> Result<Vec<Entity>> {
        let (rows, _) = execute(&self.ctx, &self.program).await?;
        Ok(rows.into_iter().filter_map(row_entity).collect())
    }
}

// ===========================================================================
// ProjectionQuery / GroupedQuery — `select()` / `group_by()` results
// ===========================================================================

/// The result of `.select(fields)`: a query whose rows are product-type
/// projections (§4.5 Phase D), untyped by design — there is no `T` to
/// reconstruct once only some of its fields survive.
#[derive(Clone)]
pub struct ProjectionQuery {
    program: Program,
    ctx: ExecutionContext,
}

impl ProjectionQuery {
    pub fn order_by(&self, field: impl Into<String>, desc: bool) -> Self {
        Self { program: self.program.pushed(Operation::OrderBy { field: field.into(), desc }), ctx: self.ctx.clone() }
    }

    pub fn skip(&self, n: usize) -> Self {
        Self { program: self.program.pushed(Operation::Skip(n)), ctx: self.ctx.clone() }
    }

    pub fn take(&self, n: usize) -> Self {
        Self { program: self.program.pushed(Operation::Take(n)), ctx: self.ctx.clone() }
    }

    pub fn distinct(&self) -> Self {
        Self { program: self.program.pushed(Operation::Distinct), ctx: self.ctx.clone() }
    }

    pub async fn to_list(self) -> Result<Vec<Vec<(String, Value)>>> {
        let (rows, _) = execute(&self.ctx, &self.program).await?;
        Ok(rows.into_iter().filter_map(row_projection).collect())
    }
}

/// The result of `.group_by(field)`: needs an `.aggregate(kind, field?)`
/// before it is a runnable query (§4.5 Phase D, "GroupBy/Aggregate").
#[derive(Clone)]
pub struct GroupedQuery {
    program: Program,
    ctx: ExecutionContext,
}

impl GroupedQuery {
    pub fn aggregate(&self, kind: AggKind, field: Option<impl Into<String>>) -> Self {
        let op = Operation::Aggregate { kind, field: field.map(Into::into) };
        Self { program: self.program.pushed(op), ctx: self.ctx.clone() }
    }

    pub async fn to_list(self) -> Result<Vec<(Value, Value)>> {
        let (rows, _) = execute(&self.ctx, &self.program).await?;
        Ok(rows.into_iter().filter_map(row_grouped).collect())
    }
}

// ===========================================================================
// Traversal<S, Rel, Target> / PathSegmentQuery<S, Rel, Target>
// ===========================================================================

/// A traversal in progress: the most recently pushed [`HopSpec`] is the
/// one `.direction()`/`.depth()` refine, and the one `.then_traverse()`
/// chains off of (§4.4 "Traverse/ThenTraverse").
pub struct Traversal<S, Rel, Target> {
    program: Program,
    ctx: ExecutionContext,
    _marker: PhantomData<(S, Rel, Target)>,
}

impl<S, Rel, Target> Clone for Traversal<S, Rel, Target> {
    fn clone(&self) -> Self {
        Self { program: self.program.clone(), ctx: self.ctx.clone(), _marker: PhantomData }
    }
}

impl<S, Rel: RelationshipType, Target: NodeType> Traversal<S, Rel, Target> {
    fn from_program(program: Program, ctx: ExecutionContext) -> Self {
        Self { program, ctx, _marker: PhantomData }
    }

    pub fn direction(&self, direction: TraverseDirection) -> Self {
        self.push(Operation::Direction(direction))
    }

    pub fn depth(&self, min: usize, max: usize) -> Self {
        self.push(Operation::Depth { min, max })
    }

    pub fn where_clause(&self, predicate: Predicate) -> Self {
        self.push(Operation::Where(predicate))
    }

    pub fn skip(&self, n: usize) -> Self {
        self.push(Operation::Skip(n))
    }

    pub fn take(&self, n: usize) -> Self {
        self.push(Operation::Take(n))
    }

    /// Chains another hop onto this traversal (§4.4 `ThenTraverse`),
    /// landing on a new `NextRel`/`NextTarget` pair.
    pub fn then_traverse<NextRel: RelationshipType, NextTarget: NodeType>(&self) -> Traversal<S, NextRel, NextTarget> {
        let rel_labels = vec![registry::global().relationship_label::<NextRel>()];
        let target_labels = registry::global().compatible_labels::<NextTarget>();
        let op = Operation::ThenTraverse { rel_labels, target_labels, target_schema: NextTarget::schema() };
        Traversal::from_program(self.program.pushed(op), self.ctx.clone())
    }

    fn push(&self, op: Operation) -> Self {
        Self { program: self.program.pushed(op), ctx: self.ctx.clone(), _marker: PhantomData }
    }

    /// `.to()` (§4.4): the target nodes reached by the last hop.
    pub async fn to(self) -> Result<Vec<Target>> {
        let program = self.program.pushed(Operation::To);
        let (rows, _) = execute(&self.ctx, &program).await?;
        rows.into_iter().filter_map(row_entity).map(|e| serde_graph::deserialize_node::<Target>(&e)).collect()
    }

    /// `.relationships()` (§4.4): the relationships crossed by the last hop.
    pub async fn relationships(self) -> Result<Vec<Rel>> {
        let program = self.program.pushed(Operation::Relationships);
        let (rows, _) = execute(&self.ctx, &program).await?;
        rows.into_iter().filter_map(row_entity).map(|e| serde_graph::deserialize_relationship::<Rel>(&e)).collect()
    }

    /// `.path_segments()` (§4.4): one `{start, rel, end}` triple per hop.
    pub fn path_segments(&self) -> PathSegmentQuery<S, Rel, Target> {
        PathSegmentQuery { program: self.program.pushed(Operation::PathSegments), ctx: self.ctx.clone(), _marker: PhantomData }
    }
}

/// One `{start, rel, end}` triple, typed by the traversal that produced it.
#[derive(Debug, Clone)]
pub struct PathSegmentRow<S, Rel, Target> {
    pub start: S,
    pub rel: Rel,
    pub end: Target,
}

pub struct PathSegmentQuery<S, Rel, Target> {
    program: Program,
    ctx: ExecutionContext,
    _marker: PhantomData<(S, Rel, Target)>,
}

impl<S, Rel, Target> Clone for PathSegmentQuery<S, Rel, Target> {
    fn clone(&self) -> Self {
        Self { program: self.program.clone(), ctx: self.ctx.clone(), _marker: PhantomData }
    }
}

impl<S: NodeType, Rel: RelationshipType, Target: NodeType> PathSegmentQuery<S, Rel, Target> {
    pub async fn to_list(self) -> Result<Vec<PathSegmentRow<S, Rel, Target>>> {
        let (rows, _) = execute(&self.ctx, &self.program).await?;
        rows.into_iter()
            .filter_map(row_path_segment)
            .map(|(start, rel, end)| {
                Ok(PathSegmentRow {
                    start: serde_graph::deserialize_node::<S>(&start)?,
                    rel: serde_graph::deserialize_relationship::<Rel>(&rel)?,
                    end: serde_graph::deserialize_node::<Target>(&end)?,
                })
            })
            .collect()
    }
}

// ===========================================================================
// SearchQuery<T>
// ===========================================================================

/// `search("query", fields?)` (§4.4): full-text, case-insensitive
/// substring search over the given indexed fields.
pub struct SearchQuery<T: NodeType> {
    program: Program,
    ctx: ExecutionContext,
    _marker: PhantomData<T>,
}

impl<T: NodeType> Clone for SearchQuery<T> {
    fn clone(&self) -> Self {
        Self { program: self.program.clone(), ctx: self.ctx.clone(), _marker: PhantomData }
    }
}

impl<T: NodeType> SearchQuery<T> {
    pub fn take(&self, n: usize) -> Self {
        Self { program: self.program.pushed(Operation::Take(n)), ctx: self.ctx.clone(), _marker: PhantomData }
    }

    pub async fn to_list(self) -> Result<Vec<T>> {
        let (rows, _) = execute(&self.ctx, &self.program).await?;
        rows.into_iter().filter_map(row_entity).map(|e| serde_graph::deserialize_node::<T>(&e)).collect()
    }
}
