//! Phase G: renders a finished [`CompiledPlan`] into parameterized Cypher
//! text, assembled clause-by-clause with plain `write!` calls (no
//! pretty-printer shipped with `cypher::ast`, so this is written fresh
//! rather than adapted from an existing renderer).
//!
//! Every literal value is bound through a named parameter (§8 invariant
//! 5: "no literal value may appear in emitted Cypher text outside a
//! named parameter reference") — [`ParamBag`] is the only place a
//! [`Value`] is ever turned into text.

use std::collections::HashMap;
use std::fmt::Write as _;

use crate::compiler::plan::{CompiledPlan, HopSpec, RootSpec, Terminal};
use crate::error::Result;
use crate::model::Value;
use crate::query::expr::{CmpOp, Predicate, StrOp};
use crate::query::op::{AggKind, Projection, TraverseDirection};

fn agg_fn_name(kind: AggKind) -> &'static str {
    match kind {
        AggKind::Sum => "sum",
        AggKind::Avg => "avg",
        AggKind::Min => "min",
        AggKind::Max => "max",
        AggKind::Count => "count",
    }
}

#[derive(Default)]
struct ParamBag {
    params: HashMap<String, Value>,
}

impl ParamBag {
    fn bind(&mut self, value: Value) -> String {
        let name = format!("p{}", self.params.len());
        self.params.insert(name.clone(), value);
        format!("${name}")
    }
}

fn rel_type_pattern(labels: &[String]) -> String {
    if labels.is_empty() {
        String::new()
    } else {
        format!(":{}", labels.join("|"))
    }
}

fn label_pattern(labels: &[String]) -> String {
    labels.iter().map(|l| format!(":{l}")).collect()
}

fn depth_pattern(hop: &HopSpec) -> String {
    if hop.min_depth == 1 && hop.max_depth == 1 {
        String::new()
    } else if hop.min_depth == hop.max_depth {
        format!("*{}", hop.min_depth)
    } else {
        format!("*{}..{}", hop.min_depth, hop.max_depth)
    }
}

fn hop_arrows(direction: TraverseDirection) -> (&'static str, &'static str) {
    match direction {
        TraverseDirection::Outgoing => ("-", "->"),
        TraverseDirection::Incoming => ("<-", "-"),
        TraverseDirection::Both => ("-", "-"),
    }
}

/// Builds the MATCH pattern: `(n:Label)` optionally followed by one arrow
/// segment per hop, aliasing relationships `r0, r1, ...` and intermediate
/// nodes `h0, h1, ...`, ending at `hN` (or `n` if there are no hops).
fn render_pattern(plan: &CompiledPlan, out: &mut String) {
    let root_labels = match &plan.root {
        RootSpec::Nodes(labels) => label_pattern(labels),
        RootSpec::Relationships(rel_type) => format!(":{rel_type}"),
    };
    let _ = write!(out, "(n{root_labels})");
    for (i, hop) in plan.hops.iter().enumerate() {
        let (left, right) = hop_arrows(hop.direction);
        let rel_pat = rel_type_pattern(&hop.rel_labels);
        let depth_pat = depth_pattern(hop);
        let target_labels = label_pattern(&hop.target_labels);
        let _ = write!(out, "{left}[r{i}{rel_pat}{depth_pat}]{right}(h{i}{target_labels})");
    }
}

/// The binding name the last pattern element is reachable under —
/// `"n"` with no hops, `"h{last_index}"` otherwise.
fn last_node_alias(plan: &CompiledPlan) -> String {
    match plan.hops.len() {
        0 => "n".to_string(),
        n => format!("h{}", n - 1),
    }
}

fn last_rel_alias(plan: &CompiledPlan) -> String {
    format!("r{}", plan.hops.len().saturating_sub(1))
}

/// Resolves a predicate field path to a Cypher property-access
/// expression, rewriting the `start`/`rel`/`end` path-segment prefixes
/// (§4.4) onto the pattern's real binding aliases.
fn render_field(plan: &CompiledPlan, path: &[String]) -> String {
    let (binding, rest): (String, &[String]) = match path.first().map(String::as_str) {
        Some("start") => ("n".to_string(), &path[1..]),
        Some("rel") => (last_rel_alias(plan), &path[1..]),
        Some("end") => (last_node_alias(plan), &path[1..]),
        _ => ("n".to_string(), path),
    };
    if rest.is_empty() {
        return binding;
    }
    format!("{binding}.{}", rest.join("."))
}

fn render_predicate(plan: &CompiledPlan, predicate: &Predicate, params: &mut ParamBag, out: &mut String) {
    match predicate {
        Predicate::True => {
            out.push_str("true");
        }
        Predicate::Compare { field, op, value } => {
            let field_expr = render_field(plan, &field.0);
            let param = params.bind(value.clone());
            let op_text = match op {
                CmpOp::Eq => "=",
                CmpOp::Neq => "<>",
                CmpOp::Lt => "<",
                CmpOp::Lte => "<=",
                CmpOp::Gt => ">",
                CmpOp::Gte => ">=",
            };
            let _ = write!(out, "{field_expr} {op_text} {param}");
        }
        Predicate::StringOp { field, op, value } => {
            let field_expr = render_field(plan, &field.0);
            let param = params.bind(Value::String(value.clone()));
            let op_text = match op {
                StrOp::StartsWith => "STARTS WITH",
                StrOp::EndsWith => "ENDS WITH",
                StrOp::Contains => "CONTAINS",
            };
            let _ = write!(out, "{field_expr} {op_text} {param}");
        }
        Predicate::In { field, values } => {
            let field_expr = render_field(plan, &field.0);
            let param = params.bind(Value::List(values.clone()));
            let _ = write!(out, "{field_expr} IN {param}");
        }
        Predicate::IsNull { field, negated } => {
            let field_expr = render_field(plan, &field.0);
            let suffix = if *negated { "IS NOT NULL" } else { "IS NULL" };
            let _ = write!(out, "{field_expr} {suffix}");
        }
        Predicate::And(a, b) => {
            out.push('(');
            render_predicate(plan, a, params, out);
            out.push_str(" AND ");
            render_predicate(plan, b, params, out);
            out.push(')');
        }
        Predicate::Or(a, b) => {
            out.push('(');
            render_predicate(plan, a, params, out);
            out.push_str(" OR ");
            render_predicate(plan, b, params, out);
            out.push(')');
        }
        Predicate::Not(a) => {
            out.push_str("NOT (");
            render_predicate(plan, a, params, out);
            out.push(')');
        }
    }
}

fn render_return(plan: &CompiledPlan, params: &mut ParamBag) -> String {
    if let Some(group_field) = &plan.group_by {
        let key_expr = render_field(plan, &[group_field.clone()]);
        let agg_expr = match &plan.aggregate {
            Some((kind, Some(field))) => format!("{}({})", agg_fn_name(*kind), render_field(plan, &[field.clone()])),
            Some((kind, None)) => format!("{}({})", agg_fn_name(*kind), last_node_alias(plan)),
            None => format!("count({})", last_node_alias(plan)),
        };
        return format!("RETURN {key_expr} AS key, {agg_expr} AS value");
    }

    match &plan.terminal {
        Terminal::Count => format!("RETURN count({}) AS count", last_node_alias(plan)),
        Terminal::Any => format!("RETURN count({}) > 0 AS result", last_node_alias(plan)),
        Terminal::All(predicate) => {
            let mut pred_text = String::new();
            render_predicate(plan, predicate, params, &mut pred_text);
            format!(
                "RETURN all({alias} IN collect({node}) WHERE {pred}) AS result",
                alias = last_node_alias(plan),
                node = last_node_alias(plan),
                pred = pred_text
            )
        }
        Terminal::Contains(value) => {
            let param = params.bind(value.clone());
            format!("RETURN {param} IN collect({}) AS result", last_node_alias(plan))
        }
        Terminal::To => format!("RETURN {} AS end", last_node_alias(plan)),
        Terminal::Relationships => format!("RETURN {} AS rel", last_rel_alias(plan)),
        Terminal::PathSegments => format!("RETURN n AS start, {} AS rel, {} AS end", last_rel_alias(plan), last_node_alias(plan)),
        Terminal::ToList | Terminal::First | Terminal::Single | Terminal::ElementAt { .. } => match &plan.projection {
            Projection::Identity => format!("RETURN {} AS n", last_node_alias(plan)),
            Projection::Fields(fields) => {
                let items: Vec<String> = fields
                    .iter()
                    .map(|f| {
                        let expr = render_field(plan, &[f.clone()]);
                        format!("{expr} AS {f}")
                    })
                    .collect();
                format!("RETURN {}", items.join(", "))
            }
        },
    }
}

/// Renders `plan` to `(text, params)`. `text` is never executed by this
/// crate's own driver (§4.6's interpreter runs `plan` directly) — it
/// exists for a real Bolt driver and for the `cypher::parse` round-trip
/// test utility.
pub fn render(plan: &CompiledPlan) -> Result<(String, HashMap<String, Value>)> {
    let mut params = ParamBag::default();
    let mut text = String::new();

    if let Some((search_text, fields)) = &plan.search {
        let labels = match &plan.root {
            RootSpec::Nodes(labels) => label_pattern(labels),
            RootSpec::Relationships(rel_type) => format!(":{rel_type}"),
        };
        let param = params.bind(Value::String(search_text.clone()));
        let conditions: Vec<String> = fields.iter().map(|f| format!("toLower(n.{f}) CONTAINS toLower({param})")).collect();
        let _ = write!(text, "MATCH (n{labels}) WHERE {} RETURN n", conditions.join(" OR "));
        return Ok((text, params.params));
    }

    text.push_str("MATCH ");
    render_pattern(plan, &mut text);

    if let Some(predicate) = &plan.predicate {
        text.push_str(" WHERE ");
        render_predicate(plan, predicate, &mut params, &mut text);
    }

    let _ = write!(text, " {}", render_return(plan, &mut params));

    if plan.distinct {
        text = text.replacen("RETURN ", "RETURN DISTINCT ", 1);
    }

    if !plan.order_by.is_empty() {
        let items: Vec<String> = plan
            .order_by
            .iter()
            .map(|(field, desc)| {
                let expr = render_field(plan, &[field.clone()]);
                if *desc {
                    format!("{expr} DESC")
                } else {
                    expr
                }
            })
            .collect();
        let _ = write!(text, " ORDER BY {}", items.join(", "));
    }

    if let Some(skip) = plan.skip {
        let param = params.bind(Value::Int(skip as i64));
        let _ = write!(text, " SKIP {param}");
    }
    if let Some(take) = plan.take {
        let param = params.bind(Value::Int(take as i64));
        let _ = write!(text, " LIMIT {param}");
    }

    Ok((text, params.params))
}
