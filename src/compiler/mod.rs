//! Query Compiler (C5, §4.5): turns a builder's [`Program`] into a
//! [`CypherQuery`] through phases A–G.
//!
//! - **Phase A** (normalization): adjacent `Where`s fold into one
//!   conjunction; repeated `OrderBy`/`ThenBy` accumulate into one
//!   ordering list — all folded in a single left-to-right walk of the
//!   operation tree below, since the tree is already flat and ordered.
//! - **Phase B** (pattern synthesis): `Traverse`/`ThenTraverse` become
//!   [`HopSpec`]s; `Direction`/`Depth` refine the most recent one.
//! - **Phase C** (predicate translation): deferred to [`render`] — the
//!   in-memory driver needs the [`Predicate`] tree as-is, only the
//!   textual renderer needs to turn it into Cypher `WHERE`.
//! - **Phase D** (projection/grouping): `Select`/`GroupBy`/`Aggregate`.
//! - **Phase E** (ordering/pagination/distinct): `OrderBy`/`ThenBy`/
//!   `Skip`/`Take`/`Distinct`.
//! - **Phase F** (complex-property loading): `Select(Identity)` implies
//!   `load_complex = true`; a field projection never needs the
//!   auxiliary subgraph.
//! - **Phase G** (rendering): [`render::render`] turns the finished
//!   [`CompiledPlan`] into parameterized Cypher text.

pub mod plan;
pub mod render;

use crate::error::{Error, Result};
use crate::query::expr::Predicate;
use crate::query::op::{AggKind, Operation, Program, Projection, TraverseDirection};
use crate::schema::Schema;
use plan::{CompiledPlan, CypherQuery, HopSpec, ResultShape, RootSpec, Terminal};

#[derive(Default)]
struct Accum {
    root: Option<RootSpec>,
    root_schema: Option<Schema>,
    hops: Vec<HopSpec>,
    predicate: Option<Predicate>,
    order_by: Vec<(String, bool)>,
    skip: Option<usize>,
    take: Option<usize>,
    distinct: bool,
    group_by: Option<String>,
    aggregate: Option<(AggKind, Option<String>)>,
    projection: Projection,
    terminal: Option<Terminal>,
    search: Option<(String, Vec<String>)>,
}

fn new_hop(rel_labels: &[&'static str], target_labels: &[&'static str]) -> HopSpec {
    HopSpec {
        rel_labels: rel_labels.iter().map(|s| s.to_string()).collect(),
        target_labels: target_labels.iter().map(|s| s.to_string()).collect(),
        direction: TraverseDirection::Outgoing,
        min_depth: 1,
        max_depth: 1,
    }
}

fn and_predicate(existing: Option<Predicate>, next: Predicate) -> Predicate {
    match existing {
        Some(p) => p.and(next),
        None => next,
    }
}

/// Compiles a builder's finished operation tree into an executable,
/// parameterized query.
pub fn compile(program: &Program) -> Result<CypherQuery> {
    let mut acc = Accum { projection: Projection::Identity, ..Accum::default() };

    for op in &program.0 {
        match op {
            Operation::RootNodes { labels, schema } => {
                acc.root = Some(RootSpec::Nodes(labels.iter().map(|s| s.to_string()).collect()));
                acc.root_schema = Some(schema.clone());
            }
            Operation::RootRelationships { rel_type, schema } => {
                acc.root = Some(RootSpec::Relationships(rel_type.to_string()));
                acc.root_schema = Some(schema.clone());
            }
            Operation::Where(pred) => {
                acc.predicate = Some(and_predicate(acc.predicate.take(), pred.clone()));
            }
            Operation::Select(projection) => {
                acc.projection = projection.clone();
            }
            Operation::OrderBy { field, desc } => {
                acc.order_by = vec![(field.clone(), *desc)];
            }
            Operation::ThenBy { field, desc } => {
                acc.order_by.push((field.clone(), *desc));
            }
            Operation::Skip(n) => acc.skip = Some(*n),
            Operation::Take(n) => acc.take = Some(*n),
            Operation::Distinct => acc.distinct = true,
            Operation::GroupBy { field } => acc.group_by = Some(field.clone()),
            Operation::Aggregate { kind, field } => acc.aggregate = Some((*kind, field.clone())),
            Operation::First { predicate } => {
                if let Some(p) = predicate {
                    acc.predicate = Some(and_predicate(acc.predicate.take(), p.clone()));
                }
                acc.take = Some(1);
                acc.terminal = Some(Terminal::First);
            }
            Operation::Single { predicate } => {
                if let Some(p) = predicate {
                    acc.predicate = Some(and_predicate(acc.predicate.take(), p.clone()));
                }
                acc.terminal = Some(Terminal::Single);
            }
            Operation::Any { predicate } => {
                if let Some(p) = predicate {
                    acc.predicate = Some(and_predicate(acc.predicate.take(), p.clone()));
                }
                acc.terminal = Some(Terminal::Any);
            }
            Operation::All { predicate } => {
                acc.terminal = Some(Terminal::All(predicate.clone()));
            }
            Operation::Contains { value } => {
                acc.terminal = Some(Terminal::Contains(value.clone()));
            }
            Operation::ElementAt { index, or_default } => {
                acc.terminal = Some(Terminal::ElementAt { index: *index, or_default: *or_default });
            }
            Operation::Traverse { rel_labels, target_labels, target_schema: _ } => {
                acc.hops.push(new_hop(rel_labels, target_labels));
            }
            Operation::ThenTraverse { rel_labels, target_labels, target_schema: _ } => {
                acc.hops.push(new_hop(rel_labels, target_labels));
            }
            Operation::Direction(dir) => {
                if let Some(hop) = acc.hops.last_mut() {
                    hop.direction = *dir;
                }
            }
            Operation::Depth { min, max } => {
                if let Some(hop) = acc.hops.last_mut() {
                    hop.min_depth = *min;
                    hop.max_depth = *max;
                }
            }
            Operation::To => acc.terminal = Some(Terminal::To),
            Operation::Relationships => acc.terminal = Some(Terminal::Relationships),
            Operation::PathSegments => acc.terminal = Some(Terminal::PathSegments),
            Operation::Search { text, fields } => {
                acc.search = Some((text.clone(), fields.clone()));
            }
            Operation::WithTransaction => {
                // The ambient transaction is a facade/execution-layer
                // concern (`ExecutionContext::with_tx`); it carries no
                // plan-level information.
            }
        }
    }

    let root = acc.root.ok_or_else(|| Error::InvalidInput("a query must start from root_nodes()/root_relationships()".into()))?;
    let root_schema = acc.root_schema.expect("root_schema is always set alongside root");
    // `count()` compiles to an `Aggregate(Count)` node with no explicit
    // terminal of its own (§4.4's operation-tree list has no standalone
    // `Count` node, only `Aggregate`) — without a `GroupBy` to bind it to,
    // that's a bare scalar row count, Phase G's `Count -> count(n)`.
    let terminal = acc.terminal.take().unwrap_or_else(|| match (&acc.aggregate, &acc.group_by) {
        (Some((AggKind::Count, _)), None) => Terminal::Count,
        _ => Terminal::ToList,
    });
    let load_complex = matches!(acc.projection, Projection::Identity);

    let plan = CompiledPlan {
        root,
        hops: acc.hops,
        predicate: acc.predicate,
        order_by: acc.order_by,
        skip: acc.skip,
        take: acc.take,
        distinct: acc.distinct,
        group_by: acc.group_by,
        aggregate: acc.aggregate,
        projection: acc.projection,
        terminal,
        search: acc.search,
        load_complex,
        root_schema,
    };

    let result_shape = result_shape_for(&plan);
    let (text, params) = render::render(&plan)?;

    Ok(CypherQuery { text, params, result_shape, plan })
}

fn result_shape_for(plan: &CompiledPlan) -> ResultShape {
    if plan.group_by.is_some() {
        return ResultShape::Grouped;
    }
    match &plan.terminal {
        Terminal::Count | Terminal::Any | Terminal::All(_) | Terminal::Contains(_) => ResultShape::Scalar,
        Terminal::To => ResultShape::Entity { binding: "end" },
        Terminal::Relationships => ResultShape::Entity { binding: "rel" },
        Terminal::PathSegments => ResultShape::PathSegment,
        Terminal::ToList | Terminal::First | Terminal::Single | Terminal::ElementAt { .. } => match &plan.projection {
            Projection::Identity => ResultShape::Entity { binding: "n" },
            Projection::Fields(fields) => ResultShape::Projection { fields: fields.clone() },
        },
    }
}
