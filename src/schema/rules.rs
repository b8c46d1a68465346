//! Data-model rules (C2): pure predicates over values and complex-property
//! graphs, with no storage or registry dependency.

use std::collections::HashSet;
use std::rc::Rc;

use crate::model::Value;
use crate::{Error, Result};

/// Default max traversal depth for recursive complex-property
/// introspection (§4.2).
pub const DEFAULT_MAX_DEPTH: usize = 5;

/// A value is simple per §3 if it is a scalar, temporal, spatial, GUID,
/// URI, byte-array value, or a homogeneous collection of any of those.
/// Rust's type system already enforces element homogeneity at the
/// `NodeType`/`ComplexProperty` boundary, so this predicate only needs to
/// reject the shapes that are never simple: nested `Value::Node`,
/// `Value::Relationship`, `Value::Path`, and `Value::Map` (mappings are
/// not a supported property shape, §4.2).
pub fn is_simple(value: &Value) -> bool {
    match value {
        Value::Node(_) | Value::Relationship(_) | Value::Path(_) | Value::Map(_) => false,
        Value::List(items) => items.iter().all(is_simple),
        _ => true,
    }
}

/// The complement of `is_simple` bounded by `max_depth`: a value counts
/// as "complex" only while it is still a `List`/nested structure within
/// `max_depth` levels; beyond that, further introspection is refused
/// (mirrors the configurable recursion-depth bound of §4.2).
pub fn is_complex(value: &Value, max_depth: usize) -> bool {
    fn go(value: &Value, depth: usize) -> bool {
        if depth == 0 {
            return false;
        }
        match value {
            Value::Map(fields) => fields.values().all(|v| is_simple(v) || go(v, depth - 1)),
            _ => false,
        }
    }
    !is_simple(value) && go(value, max_depth)
}

/// Accepts arrays/ordered sequences/sets of simple values; rejects maps.
pub fn is_collection_of_simple(value: &Value) -> bool {
    matches!(value, Value::List(items) if items.iter().all(is_simple))
}

/// A homogeneous collection whose elements are each "complex" (nested
/// `Value::Map` shapes), per §4.2.
pub fn is_collection_of_complex(value: &Value, max_depth: usize) -> bool {
    matches!(value, Value::List(items) if !items.is_empty() && items.iter().all(|v| is_complex(v, max_depth)))
}

/// Interface a complex-property type implements so `has_reference_cycle`
/// can walk its object graph by reference identity. Plain owned fields
/// (the overwhelming common case — a `Box`/inline struct can never alias)
/// trivially satisfy this with a unique `node_identity()` per instance and
/// can never trip the cycle check; only `Rc`/`Arc`-shared complex children
/// can, which is exactly the case §3 forbids.
pub trait ComplexNode {
    /// Stable identity for this node — typically the address of the
    /// value itself, or the pointer backing an `Rc`.
    fn node_identity(&self) -> usize;
    /// Every complex (non-simple) child reachable directly from this node.
    fn complex_children(&self) -> Vec<Rc<dyn ComplexNode>>;
}

/// DFS over a complex-property graph with a current-path set (detects
/// true cycles) and a visited set (lets shared-but-acyclic references
/// through), backtracking correctly on exit. Returns `true` only when a
/// node reappears on the *current* path.
pub fn has_reference_cycle(root: &Rc<dyn ComplexNode>) -> bool {
    let mut current_path = HashSet::new();
    let mut visited = HashSet::new();
    dfs(root, &mut current_path, &mut visited)
}

fn dfs(node: &Rc<dyn ComplexNode>, current_path: &mut HashSet<usize>, visited: &mut HashSet<usize>) -> bool {
    let id = node.node_identity();
    if current_path.contains(&id) {
        return true;
    }
    if visited.contains(&id) {
        return false;
    }
    current_path.insert(id);
    visited.insert(id);
    for child in node.complex_children() {
        if dfs(&child, current_path, visited) {
            return true;
        }
    }
    current_path.remove(&id);
    false
}

/// Requires a non-empty id and, if `complex_roots` is non-empty, that none
/// of them participate in a reference cycle.
pub fn enforce_constraints_for_entity(id: &str, complex_roots: &[Rc<dyn ComplexNode>]) -> Result<()> {
    if id.trim().is_empty() {
        return Err(Error::InvalidInput("entity id must not be empty".into()));
    }
    for root in complex_roots {
        if has_reference_cycle(root) {
            return Err(Error::InvalidInput(format!(
                "complex property graph rooted at entity {id} contains a reference cycle"
            )));
        }
    }
    Ok(())
}

pub fn enforce_constraints_for_node(id: &str, complex_roots: &[Rc<dyn ComplexNode>]) -> Result<()> {
    enforce_constraints_for_entity(id, complex_roots)
}

pub fn enforce_constraints_for_relationship(
    id: &str,
    start_id: &str,
    end_id: &str,
    complex_roots: &[Rc<dyn ComplexNode>],
) -> Result<()> {
    if start_id.trim().is_empty() || end_id.trim().is_empty() {
        return Err(Error::InvalidInput(format!(
            "relationship {id} must have non-empty start/end ids"
        )));
    }
    // Complex properties are forbidden on relationships (§3); callers
    // should never pass roots here, but we still check defensively.
    enforce_constraints_for_entity(id, complex_roots)
}
