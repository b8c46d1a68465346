//! In-memory reference [`Driver`] (§4.6 "ships an in-memory Driver
//! implementation"): `HashMap`s behind `parking_lot::RwLock`,
//! single-process, no real network. Every transaction gets a
//! copy-on-write snapshot of the graph, so rollback actually restores
//! the pre-transaction state (§8 invariant 6, "transaction atomicity")
//! rather than treating commit/rollback as no-ops over writes that
//! already applied immediately.
//!
//! `run` executes a [`CompiledPlan`] directly against the staged graph
//! rather than re-parsing the Cypher text the compiler also emits — see
//! `compiler::plan`'s doc comment for why both exist.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::{Mutex, RwLock};

use crate::compiler::plan::{CompiledPlan, CypherQuery, ResultShape, RootSpec, Terminal};
use crate::error::{Error, Result};
use crate::execution::cancel::CancellationToken;
use crate::execution::driver::{Cursor, Driver, TxHandle, TxMode};
use crate::execution::eval;
use crate::execution::record::{RecordValue, VecCursor};
use crate::execution::wire::{self, is_aux_rel_type};
use crate::model::{Direction, DynamicNode, DynamicRelationship, Entity, Value};
use crate::query::op::{AggKind, Projection, TraverseDirection};

#[derive(Debug, Clone, Default)]
struct GraphState {
    nodes: HashMap<String, DynamicNode>,
    rels: HashMap<String, DynamicRelationship>,
}

impl GraphState {
    fn relationships_of(&self, node_id: &str, direction: Direction, rel_type: Option<&str>) -> Vec<DynamicRelationship> {
        self.rels
            .values()
            .filter(|r| match direction {
                Direction::Outgoing => r.start_id == node_id,
                Direction::Incoming => r.end_id == node_id,
                Direction::Both => r.start_id == node_id || r.end_id == node_id,
            })
            .filter(|r| rel_type.is_none_or(|rt| r.rel_type == rt))
            .cloned()
            .collect()
    }
}

struct TxState {
    mode: TxMode,
    staged: GraphState,
}

/// In-memory property graph, reachable by any number of concurrent
/// transactions (§5: "Multiple transactions from the same store may
/// proceed in parallel").
pub struct MemoryDriver {
    committed: RwLock<GraphState>,
    txs: Mutex<HashMap<u64, TxState>>,
    next_tx: AtomicU64,
}

impl MemoryDriver {
    pub fn new() -> Self {
        Self { committed: RwLock::new(GraphState::default()), txs: Mutex::new(HashMap::new()), next_tx: AtomicU64::new(1) }
    }

    pub fn shared() -> Arc<Self> {
        Arc::new(Self::new())
    }

    fn with_staged<R>(&self, tx: TxHandle, f: impl FnOnce(&mut GraphState) -> Result<R>) -> Result<R> {
        let mut txs = self.txs.lock();
        let state = txs.get_mut(&tx.0).ok_or_else(|| Error::InvalidInput(format!("unknown transaction {tx:?}")))?;
        if state.mode == TxMode::ReadOnly {
            return Err(Error::ConstraintViolation(format!("transaction {tx:?} is read-only")));
        }
        f(&mut state.staged)
    }

    fn read_staged<R>(&self, tx: TxHandle, f: impl FnOnce(&GraphState) -> R) -> Result<R> {
        let txs = self.txs.lock();
        let state = txs.get(&tx.0).ok_or_else(|| Error::InvalidInput(format!("unknown transaction {tx:?}")))?;
        Ok(f(&state.staged))
    }

    /// Recursively removes a node's auxiliary complex-property subgraph
    /// (§4.7 "its auxiliary complex-property subgraph", always removed
    /// regardless of `cascade`).
    fn delete_aux_subgraph(state: &mut GraphState, owner_id: &str) {
        let aux_rels: Vec<DynamicRelationship> = state
            .rels
            .values()
            .filter(|r| r.start_id == owner_id && is_aux_rel_type(&r.rel_type))
            .cloned()
            .collect();
        for rel in aux_rels {
            Self::delete_aux_subgraph(state, &rel.end_id);
            state.nodes.remove(&rel.end_id);
            state.rels.remove(&rel.id);
        }
    }

    fn entity_of(state: &GraphState, node: &DynamicNode, type_name: &str) -> Entity {
        wire::graph_to_entity(node, type_name, &|id| {
            state
                .relationships_of(id, Direction::Outgoing, None)
                .into_iter()
                .filter(|r| is_aux_rel_type(&r.rel_type))
                .filter_map(|r| state.nodes.get(&r.end_id).map(|n| (r.rel_type.clone(), n.clone())))
                .collect()
        })
    }

    fn candidate_nodes<'a>(state: &'a GraphState, labels: &[String]) -> Vec<&'a DynamicNode> {
        state.nodes.values().filter(|n| n.labels.iter().any(|l| labels.contains(l))).collect()
    }

    /// BFS from `roots` along `rel_labels`/`direction`, returning one
    /// `(root, edge_into_it, node)` triple for every node reachable at a
    /// hop count within `[min,max]` — the interpreter's counterpart to
    /// Phase B's variable-length pattern synthesis (§4.5 "`[*a..b]`").
    /// `edge_into_it` is the last relationship on whichever path reached
    /// that node first; for the common `depth == 1` case that is the only
    /// edge, which is the case every builder-surface traversal actually
    /// exercises today.
    fn expand(
        state: &GraphState,
        roots: &[String],
        rel_labels: &[String],
        direction: TraverseDirection,
        min: usize,
        max: usize,
    ) -> Vec<(String, DynamicRelationship, String)> {
        let dir = match direction {
            TraverseDirection::Outgoing => Direction::Outgoing,
            TraverseDirection::Incoming => Direction::Incoming,
            TraverseDirection::Both => Direction::Both,
        };
        // frontier: (root_id, current_node_id)
        let mut frontier: Vec<(String, String)> = roots.iter().map(|r| (r.clone(), r.clone())).collect();
        let mut out = Vec::new();
        for depth in 1..=max {
            let mut next_frontier = Vec::new();
            for (root, node_id) in &frontier {
                for rel in state.relationships_of(node_id, dir, None) {
                    if !rel_labels.is_empty() && !rel_labels.contains(&rel.rel_type) {
                        continue;
                    }
                    let other = rel.other_node(node_id).unwrap_or(&rel.end_id).to_string();
                    if depth >= min {
                        out.push((root.clone(), rel.clone(), other.clone()));
                    }
                    next_frontier.push((root.clone(), other));
                }
            }
            frontier = next_frontier;
            if frontier.is_empty() {
                break;
            }
        }
        out
    }

    fn eval_plan(&self, tx: TxHandle, plan: &CompiledPlan, token: Option<&CancellationToken>) -> Result<Vec<RecordValue>> {
        if let Some(t) = token {
            if t.is_cancelled() {
                return Err(Error::Cancelled);
            }
        }
        self.read_staged(tx, |state| self.eval_plan_in(state, plan))?
    }

    fn eval_plan_in(&self, state: &GraphState, plan: &CompiledPlan) -> Result<Vec<RecordValue>> {
        // A relationship-rooted query (`relationships<R>()`/
        // `dynamic_relationships(...)`, §4.4) never traverses further —
        // the builder surface over `RootRelationships` exposes no
        // `traverse`/`then_traverse` — so there is no node pattern to
        // match at all; the relationship itself is the primary binding,
        // reusing the same (start, rel, end) row shape as the node path
        // with all three positions pointing at the one matched edge.
        let mut rows: Vec<(Entity, Entity, Entity)> = match &plan.root {
            RootSpec::Relationships(rel_type) => state
                .rels
                .values()
                .filter(|r| &r.rel_type == rel_type)
                .map(|r| {
                    let mut e = Entity::new(plan.root_schema.type_name, r.rel_type.clone());
                    e.simple = r.properties.clone();
                    (e.clone(), e.clone(), e)
                })
                .collect(),
            RootSpec::Nodes(labels) => {
                if let Some((text, fields)) = &plan.search {
                    return self.eval_search(state, labels, text, fields);
                }

                let mut hop_triples: Vec<(String, DynamicRelationship, String)> = Vec::new();
                if plan.hops.is_empty() {
                    for node in Self::candidate_nodes(state, labels) {
                        hop_triples.push((node.id.clone(), DynamicRelationship::new("", "", "", ""), node.id.clone()));
                    }
                } else {
                    // (original_root, current_node) survives across hops so a
                    // multi-hop `then_traverse` chain still reports the very first
                    // root as the row's `start`, per `ThenTraverse`'s semantics.
                    let mut frontier: Vec<String> =
                        Self::candidate_nodes(state, labels).into_iter().map(|n| n.id.clone()).collect();
                    let mut origin: HashMap<String, String> = frontier.iter().map(|id| (id.clone(), id.clone())).collect();
                    let mut last_edge: HashMap<String, DynamicRelationship> = HashMap::new();

                    for hop in &plan.hops {
                        let triples =
                            Self::expand(state, &frontier, &hop.rel_labels, hop.direction, hop.min_depth.max(1), hop.max_depth);
                        let mut next_frontier = Vec::new();
                        let mut next_origin = HashMap::new();
                        let mut next_last_edge = HashMap::new();
                        for (root_in_call, rel, end) in triples {
                            let Some(orig) = origin.get(&root_in_call) else { continue };
                            next_frontier.push(end.clone());
                            next_origin.insert(end.clone(), orig.clone());
                            next_last_edge.insert(end, rel);
                        }
                        frontier = next_frontier;
                        origin = next_origin;
                        last_edge = next_last_edge;
                    }

                    for end_id in &frontier {
                        let Some(root_id) = origin.get(end_id) else { continue };
                        let Some(rel) = last_edge.get(end_id) else { continue };
                        hop_triples.push((root_id.clone(), rel.clone(), end_id.clone()));
                    }
                }

                // Build (start_entity, rel_entity, end_entity) bindings per row.
                let mut rows: Vec<(Entity, Entity, Entity)> = Vec::new();
                for (start_id, rel, end_id) in &hop_triples {
                    let Some(start_node) = state.nodes.get(start_id) else { continue };
                    let start_entity = Self::entity_of(state, start_node, plan.root_schema.type_name);
                    let end_entity = if end_id == start_id {
                        start_entity.clone()
                    } else if let Some(end_node) = state.nodes.get(end_id) {
                        Self::entity_of(state, end_node, plan.root_schema.type_name)
                    } else {
                        continue;
                    };
                    let rel_entity = {
                        let mut e = Entity::new(rel.rel_type.clone(), rel.rel_type.clone());
                        e.simple = rel.properties.clone();
                        e
                    };
                    rows.push((start_entity, rel_entity, end_entity));
                }
                rows
            }
        };

        // Filter.
        if let Some(pred) = &plan.predicate {
            rows.retain(|(start, rel, end)| {
                let bindings = HashMap::from([("", start), ("start", start), ("rel", rel), ("end", end)]);
                eval::eval(pred, &bindings)
            });
        }

        // Distinct (by primary-binding id, the common case for `to()`/entity reads).
        if plan.distinct {
            let mut seen = std::collections::HashSet::new();
            rows.retain(|(start, _, end)| {
                let key = match plan.terminal {
                    Terminal::To => end.simple.get("id").cloned(),
                    _ => start.simple.get("id").cloned(),
                };
                key.map(|k| seen.insert(format!("{k}"))).unwrap_or(true)
            });
        }

        // Order.
        if !plan.order_by.is_empty() {
            rows.sort_by(|a, b| {
                for (field, desc) in &plan.order_by {
                    let path = vec![field.clone()];
                    let av = eval_field(&a.0, &path);
                    let bv = eval_field(&b.0, &path);
                    let ord = match (av, bv) {
                        (Some(x), Some(y)) => x.neo4j_cmp(&y).unwrap_or(std::cmp::Ordering::Equal),
                        (None, Some(_)) => std::cmp::Ordering::Less,
                        (Some(_), None) => std::cmp::Ordering::Greater,
                        (None, None) => std::cmp::Ordering::Equal,
                    };
                    let ord = if *desc { ord.reverse() } else { ord };
                    if ord != std::cmp::Ordering::Equal {
                        return ord;
                    }
                }
                std::cmp::Ordering::Equal
            });
        }

        if let Some(group_field) = &plan.group_by {
            return Ok(self.eval_grouped(&rows, group_field, plan.aggregate.as_ref()));
        }

        match &plan.terminal {
            Terminal::Count => {
                let count = rows.len() as i64;
                return Ok(vec![RecordValue::Scalar(Value::Int(count))]);
            }
            Terminal::Any => {
                return Ok(vec![RecordValue::Scalar(Value::Bool(!rows.is_empty()))]);
            }
            Terminal::All(pred) => {
                let all = rows.iter().all(|(start, rel, end)| {
                    let bindings = HashMap::from([("", start), ("start", start), ("rel", rel), ("end", end)]);
                    eval::eval(pred, &bindings)
                });
                return Ok(vec![RecordValue::Scalar(Value::Bool(all))]);
            }
            Terminal::Contains(value) => {
                let found = rows.iter().any(|(start, _, _)| start.simple.values().any(|v| v == value));
                return Ok(vec![RecordValue::Scalar(Value::Bool(found))]);
            }
            _ => {}
        }

        // Skip/take apply after grouping/scalar short-circuits above.
        if let Some(skip) = plan.skip {
            rows = rows.into_iter().skip(skip).collect();
        }
        if let Some(take) = plan.take {
            rows.truncate(take);
        }

        match &plan.terminal {
            Terminal::ElementAt { index, or_default } => {
                let Some((s, _, _)) = rows.get(*index) else {
                    if *or_default {
                        return Ok(Vec::new());
                    }
                    return Err(Error::NotFound(format!("element_at({index}) is out of range")));
                };
                return Ok(vec![RecordValue::Entity { entity: s.clone() }]);
            }
            Terminal::To => Ok(rows.into_iter().map(|(_, _, end)| RecordValue::Entity { entity: end }).collect()),
            Terminal::Relationships => Ok(rows.into_iter().map(|(_, rel, _)| RecordValue::Entity { entity: rel }).collect()),
            Terminal::PathSegments => Ok(rows
                .into_iter()
                .map(|(start, rel, end)| RecordValue::PathSegment { start, rel, end })
                .collect()),
            Terminal::ToList | Terminal::First | Terminal::Single => match &plan.projection {
                Projection::Identity => Ok(rows.into_iter().map(|(start, _, _)| RecordValue::Entity { entity: start }).collect()),
                Projection::Fields(fields) => Ok(rows
                    .into_iter()
                    .map(|(start, _, _)| {
                        let values = fields
                            .iter()
                            .map(|f| (f.clone(), eval_field(&start, &[f.clone()]).unwrap_or(Value::Null)))
                            .collect();
                        RecordValue::Projection { fields: values }
                    })
                    .collect()),
            },
            Terminal::Count | Terminal::Any | Terminal::All(_) | Terminal::Contains(_) => unreachable!("handled above"),
        }
    }

    fn eval_grouped(
        &self,
        rows: &[(Entity, Entity, Entity)],
        group_field: &str,
        aggregate: Option<&(AggKind, Option<String>)>,
    ) -> Vec<RecordValue> {
        let mut groups: HashMap<String, (Value, Vec<Value>)> = HashMap::new();
        let (kind, agg_field) = aggregate.cloned().unwrap_or((AggKind::Count, None));
        for (start, _, _) in rows {
            let Some(key) = eval_field(start, &[group_field.to_string()]) else { continue };
            let agg_value = agg_field.as_ref().and_then(|f| eval_field(start, &[f.clone()])).unwrap_or(Value::Null);
            let entry = groups.entry(format!("{key}")).or_insert_with(|| (key.clone(), Vec::new()));
            entry.1.push(agg_value);
        }
        groups
            .into_values()
            .map(|(key, values)| {
                let value = aggregate_values(kind, &values);
                RecordValue::Grouped { key, kind, value }
            })
            .collect()
    }

    fn eval_search(&self, state: &GraphState, labels: &[String], text: &str, fields: &[String]) -> Result<Vec<RecordValue>> {
        let needle = text.to_lowercase();
        let mut matches: Vec<Entity> = Vec::new();
        for node in Self::candidate_nodes(state, labels) {
            let hit = fields.iter().any(|f| {
                node.properties.get(f).and_then(|v| v.as_str()).map(|s| s.to_lowercase().contains(&needle)).unwrap_or(false)
            });
            if hit {
                matches.push(Self::entity_of(state, node, labels.first().map(String::as_str).unwrap_or_default()));
            }
        }
        Ok(matches.into_iter().map(|entity| RecordValue::Entity { entity }).collect())
    }
}

/// Resolves a (possibly dotted, nested-complex-property) field path
/// against a single entity, for ordering/grouping/projection — the same
/// traversal `execution::eval`'s predicate resolver uses, without the
/// per-participant (`start`/`rel`/`end`) prefix since those contexts
/// always operate on one binding at a time.
fn eval_field(entity: &Entity, path: &[String]) -> Option<Value> {
    let name = path.first()?;
    if path.len() == 1 {
        return entity.simple.get(name).cloned();
    }
    match entity.complex.get(name) {
        Some(crate::model::Serialized::Complex(sub)) => eval_field(sub, &path[1..]),
        _ => None,
    }
}

fn aggregate_values(kind: AggKind, values: &[Value]) -> Value {
    let numeric: Vec<f64> = values.iter().filter_map(|v| v.as_float()).collect();
    match kind {
        AggKind::Count => Value::Int(values.len() as i64),
        AggKind::Sum => Value::Float(numeric.iter().sum()),
        AggKind::Avg => {
            if numeric.is_empty() {
                Value::Null
            } else {
                Value::Float(numeric.iter().sum::<f64>() / numeric.len() as f64)
            }
        }
        AggKind::Min => numeric.iter().cloned().fold(None, |acc, v| Some(acc.map_or(v, |a: f64| a.min(v)))).map(Value::Float).unwrap_or(Value::Null),
        AggKind::Max => numeric.iter().cloned().fold(None, |acc, v| Some(acc.map_or(v, |a: f64| a.max(v)))).map(Value::Float).unwrap_or(Value::Null),
    }
}

impl Default for MemoryDriver {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Driver for MemoryDriver {
    async fn begin_tx(&self, mode: TxMode) -> Result<TxHandle> {
        let id = self.next_tx.fetch_add(1, Ordering::SeqCst);
        let staged = self.committed.read().clone();
        self.txs.lock().insert(id, TxState { mode, staged });
        Ok(TxHandle(id))
    }

    async fn commit_tx(&self, tx: TxHandle) -> Result<()> {
        let state = self
            .txs
            .lock()
            .remove(&tx.0)
            .ok_or_else(|| Error::InvalidInput(format!("transaction {tx:?} is not open (double-commit?)")))?;
        *self.committed.write() = state.staged;
        Ok(())
    }

    async fn rollback_tx(&self, tx: TxHandle) -> Result<()> {
        self.txs
            .lock()
            .remove(&tx.0)
            .ok_or_else(|| Error::InvalidInput(format!("transaction {tx:?} is not open (double-rollback?)")))?;
        Ok(())
    }

    async fn create_node(&self, tx: TxHandle, node: DynamicNode) -> Result<()> {
        if node.labels.is_empty() {
            return Err(Error::InvalidInput("a stored node must carry at least one label".into()));
        }
        self.with_staged(tx, |state| {
            state.nodes.insert(node.id.clone(), node);
            Ok(())
        })
    }

    async fn get_node(&self, tx: TxHandle, id: &str) -> Result<Option<DynamicNode>> {
        self.read_staged(tx, |state| state.nodes.get(id).cloned())
    }

    async fn update_node(&self, tx: TxHandle, node: DynamicNode) -> Result<()> {
        self.with_staged(tx, |state| {
            if !state.nodes.contains_key(&node.id) {
                return Err(Error::NotFound(format!("node {} does not exist", node.id)));
            }
            state.nodes.insert(node.id.clone(), node);
            Ok(())
        })
    }

    async fn delete_node(&self, tx: TxHandle, id: &str, cascade: bool) -> Result<bool> {
        self.with_staged(tx, |state| {
            if !state.nodes.contains_key(id) {
                return Ok(false);
            }
            let touching = state.relationships_of(id, Direction::Both, None);
            let (aux, normal): (Vec<_>, Vec<_>) = touching.into_iter().partition(|r| is_aux_rel_type(&r.rel_type));
            if !cascade && !normal.is_empty() {
                return Err(Error::ConstraintViolation(format!(
                    "node {id} still has {} non-complex relationship(s); delete with cascade=true to detach",
                    normal.len()
                )));
            }
            Self::delete_aux_subgraph(state, id);
            for rel in normal {
                state.rels.remove(&rel.id);
            }
            for rel in aux {
                state.rels.remove(&rel.id);
            }
            state.nodes.remove(id);
            Ok(true)
        })
    }

    async fn create_relationship(&self, tx: TxHandle, rel: DynamicRelationship) -> Result<()> {
        let rel = wire::normalize_direction(rel);
        self.with_staged(tx, |state| {
            if !state.nodes.contains_key(&rel.start_id) || !state.nodes.contains_key(&rel.end_id) {
                return Err(Error::InvalidInput("relationship endpoints must already exist".into()));
            }
            state.rels.insert(rel.id.clone(), rel);
            Ok(())
        })
    }

    async fn get_relationship(&self, tx: TxHandle, id: &str) -> Result<Option<DynamicRelationship>> {
        self.read_staged(tx, |state| state.rels.get(id).cloned())
    }

    async fn update_relationship(&self, tx: TxHandle, rel: DynamicRelationship) -> Result<()> {
        let rel = wire::normalize_direction(rel);
        self.with_staged(tx, |state| {
            if !state.rels.contains_key(&rel.id) {
                return Err(Error::NotFound(format!("relationship {} does not exist", rel.id)));
            }
            state.rels.insert(rel.id.clone(), rel);
            Ok(())
        })
    }

    async fn delete_relationship(&self, tx: TxHandle, id: &str) -> Result<bool> {
        self.with_staged(tx, |state| Ok(state.rels.remove(id).is_some()))
    }

    async fn relationships_of(
        &self,
        tx: TxHandle,
        node_id: &str,
        direction: Direction,
        rel_type: Option<&str>,
    ) -> Result<Vec<DynamicRelationship>> {
        self.read_staged(tx, |state| state.relationships_of(node_id, direction, rel_type))
    }

    async fn run(&self, tx: TxHandle, query: &CypherQuery, token: Option<&CancellationToken>) -> Result<Box<dyn Cursor>> {
        let rows = self.eval_plan(tx, &query.plan, token)?;
        match &query.result_shape {
            ResultShape::Entity { .. }
            | ResultShape::Projection { .. }
            | ResultShape::PathSegment
            | ResultShape::Scalar
            | ResultShape::Grouped => Ok(Box::new(VecCursor::new(rows))),
        }
    }

    async fn dispose(&self) -> Result<()> {
        Ok(())
    }
}
