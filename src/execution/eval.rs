//! In-memory predicate evaluation over reconstructed [`Entity`] values.
//!
//! This is the interpreter-side counterpart to `compiler::render`'s
//! textual Phase C translation: [`MemoryDriver`](super::memory::MemoryDriver)
//! executes a [`CompiledPlan`](crate::compiler::plan::CompiledPlan)
//! directly rather than re-parsing the Cypher text it also emits, so it
//! needs its own (much smaller) predicate evaluator working over the
//! `Entity` shape instead of Cypher `Expr` nodes.

use std::collections::HashMap;

use crate::model::{Entity, Serialized, Value};
use crate::query::expr::{CmpOp, Predicate, StrOp};

/// Maps a path-segment participant prefix (`"start"`/`"rel"`/`"end"`) to
/// the `Entity` it should resolve against; `""` is the default entity for
/// a plain (non-path-segment) query.
pub type Bindings<'a> = HashMap<&'a str, &'a Entity>;

pub fn single(entity: &Entity) -> Bindings<'_> {
    HashMap::from([("", entity)])
}

fn resolve<'a>(bindings: &Bindings<'a>, path: &[String]) -> Option<Value> {
    if path.is_empty() {
        return None;
    }
    let (entity, rest): (&Entity, &[String]) = match bindings.get(path[0].as_str()) {
        Some(e) => (e, &path[1..]),
        None => (bindings.get("")?, path),
    };
    resolve_in_entity(entity, rest)
}

fn resolve_in_entity(entity: &Entity, path: &[String]) -> Option<Value> {
    let name = path.first()?;
    if path.len() == 1 {
        return entity.simple.get(name).cloned();
    }
    match entity.complex.get(name) {
        Some(Serialized::Complex(sub)) => resolve_in_entity(sub, &path[1..]),
        _ => None,
    }
}

/// Neo4j numeric equality holds across `Int`/`UInt`/`Float` (a `u64`-typed
/// property equals the `Int` literal a predicate builds for it), so this
/// defers to [`Value::neo4j_cmp`] for numeric pairs rather than `Value`'s
/// derived (variant-sensitive) `PartialEq`.
fn values_equal(a: &Value, b: &Value) -> bool {
    if a.is_numeric() || matches!(a, Value::UInt(_)) || b.is_numeric() || matches!(b, Value::UInt(_)) {
        return a.neo4j_cmp(b) == Some(std::cmp::Ordering::Equal);
    }
    a == b
}

pub fn eval(predicate: &Predicate, bindings: &Bindings<'_>) -> bool {
    match predicate {
        Predicate::True => true,
        Predicate::Compare { field, op, value } => {
            let Some(actual) = resolve(bindings, &field.0) else { return false };
            match op {
                CmpOp::Eq => values_equal(&actual, value),
                CmpOp::Neq => !values_equal(&actual, value),
                CmpOp::Lt => actual.neo4j_cmp(value) == Some(std::cmp::Ordering::Less),
                CmpOp::Lte => matches!(actual.neo4j_cmp(value), Some(std::cmp::Ordering::Less | std::cmp::Ordering::Equal)),
                CmpOp::Gt => actual.neo4j_cmp(value) == Some(std::cmp::Ordering::Greater),
                CmpOp::Gte => matches!(actual.neo4j_cmp(value), Some(std::cmp::Ordering::Greater | std::cmp::Ordering::Equal)),
            }
        }
        Predicate::StringOp { field, op, value } => {
            let Some(Value::String(actual)) = resolve(bindings, &field.0) else { return false };
            match op {
                StrOp::StartsWith => actual.starts_with(value.as_str()),
                StrOp::EndsWith => actual.ends_with(value.as_str()),
                StrOp::Contains => actual.contains(value.as_str()),
            }
        }
        Predicate::In { field, values } => {
            let Some(actual) = resolve(bindings, &field.0) else { return false };
            values.iter().any(|v| values_equal(v, &actual))
        }
        Predicate::IsNull { field, negated } => {
            let is_null = resolve(bindings, &field.0).is_none();
            if *negated {
                !is_null
            } else {
                is_null
            }
        }
        Predicate::And(a, b) => eval(a, bindings) && eval(b, bindings),
        Predicate::Or(a, b) => eval(a, bindings) || eval(b, bindings),
        Predicate::Not(a) => !eval(a, bindings),
    }
}
