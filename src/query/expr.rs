//! The query builder's embedded predicate DSL.
//!
//! §9 notes two acceptable strategies for the "deferred
//! expression tree" a lambda-based source would build by walking an
//! expression-tree-producing closure: a macro that reflects a closure
//! body, or "an embedded mini-expression type with operator overloading".
//! This module is the latter: `field("age").lt(30)` builds a [`Predicate`]
//! value directly — no reflection, no macros, just a small fluent type
//! the compiler (`compiler::phase_c`) walks like any other AST.
//!
//! Dotted paths (`field("home_address.city")`) address nested complex
//! properties; the compiler recognises a multi-segment path whose first
//! segment is a `Complex` property on the root schema and synthesises the
//! extra auxiliary-relationship hop needed to reach it (§4.5 Phase C).

use crate::model::Value;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldPath(pub Vec<String>);

impl FieldPath {
    pub fn single(name: impl Into<String>) -> Self {
        FieldPath(vec![name.into()])
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CmpOp {
    Eq,
    Neq,
    Lt,
    Lte,
    Gt,
    Gte,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StrOp {
    StartsWith,
    EndsWith,
    Contains,
}

/// The builder's predicate tree — the `Where(pred)` payload of the
/// operation tree (§4.4).
#[derive(Debug, Clone)]
pub enum Predicate {
    Compare { field: FieldPath, op: CmpOp, value: Value },
    StringOp { field: FieldPath, op: StrOp, value: String },
    In { field: FieldPath, values: Vec<Value> },
    IsNull { field: FieldPath, negated: bool },
    And(Box<Predicate>, Box<Predicate>),
    Or(Box<Predicate>, Box<Predicate>),
    Not(Box<Predicate>),
    /// Always-true predicate — the identity element `Where` folds onto
    /// when a query has no filter yet.
    True,
}

impl Predicate {
    pub fn and(self, other: Predicate) -> Predicate {
        match self {
            Predicate::True => other,
            _ => Predicate::And(Box::new(self), Box::new(other)),
        }
    }

    pub fn or(self, other: Predicate) -> Predicate {
        Predicate::Or(Box::new(self), Box::new(other))
    }

    pub fn negate(self) -> Predicate {
        Predicate::Not(Box::new(self))
    }
}

/// Entry point for the predicate DSL: `field("age")`, or
/// `field("home_address.city")` for a nested complex property.
pub fn field(path: &str) -> FieldBuilder {
    FieldBuilder(FieldPath(path.split('.').map(str::to_string).collect()))
}

/// Path-segment participant accessors (§4.4 "Path segments"):
/// `start_field("id")`, `rel_field("since")`, `end_field("username")`.
pub fn start_field(path: &str) -> FieldBuilder {
    prefixed("start", path)
}
pub fn rel_field(path: &str) -> FieldBuilder {
    prefixed("rel", path)
}
pub fn end_field(path: &str) -> FieldBuilder {
    prefixed("end", path)
}

fn prefixed(prefix: &str, path: &str) -> FieldBuilder {
    let mut segments = vec![prefix.to_string()];
    segments.extend(path.split('.').map(str::to_string));
    FieldBuilder(FieldPath(segments))
}

pub struct FieldBuilder(FieldPath);

impl FieldBuilder {
    fn cmp(self, op: CmpOp, value: impl Into<Value>) -> Predicate {
        Predicate::Compare { field: self.0, op, value: value.into() }
    }

    pub fn eq(self, value: impl Into<Value>) -> Predicate {
        self.cmp(CmpOp::Eq, value)
    }
    pub fn neq(self, value: impl Into<Value>) -> Predicate {
        self.cmp(CmpOp::Neq, value)
    }
    pub fn lt(self, value: impl Into<Value>) -> Predicate {
        self.cmp(CmpOp::Lt, value)
    }
    pub fn lte(self, value: impl Into<Value>) -> Predicate {
        self.cmp(CmpOp::Lte, value)
    }
    pub fn gt(self, value: impl Into<Value>) -> Predicate {
        self.cmp(CmpOp::Gt, value)
    }
    pub fn gte(self, value: impl Into<Value>) -> Predicate {
        self.cmp(CmpOp::Gte, value)
    }

    pub fn starts_with(self, value: impl Into<String>) -> Predicate {
        Predicate::StringOp { field: self.0, op: StrOp::StartsWith, value: value.into() }
    }
    pub fn ends_with(self, value: impl Into<String>) -> Predicate {
        Predicate::StringOp { field: self.0, op: StrOp::EndsWith, value: value.into() }
    }
    pub fn contains(self, value: impl Into<String>) -> Predicate {
        Predicate::StringOp { field: self.0, op: StrOp::Contains, value: value.into() }
    }

    pub fn in_list(self, values: impl IntoIterator<Item = impl Into<Value>>) -> Predicate {
        Predicate::In { field: self.0, values: values.into_iter().map(Into::into).collect() }
    }

    pub fn is_null(self) -> Predicate {
        Predicate::IsNull { field: self.0, negated: false }
    }
    pub fn is_not_null(self) -> Predicate {
        Predicate::IsNull { field: self.0, negated: true }
    }

    pub fn path(self) -> FieldPath {
        self.0
    }
}

/// Combine a list of predicates with AND (used by `Where.where(..)`
/// chaining, which collapses adjacent filters per Phase A).
pub fn conjunction(predicates: impl IntoIterator<Item = Predicate>) -> Predicate {
    predicates.into_iter().fold(Predicate::True, Predicate::and)
}
