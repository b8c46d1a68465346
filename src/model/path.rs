//! `Path` — a multi-hop sequence of alternating nodes and relationships,
//! and `PathSegment` — the single-hop triple the query builder's
//! `path_segments()` surface returns (see §4.4).

use serde::{Deserialize, Serialize};
use super::{DynamicNode, DynamicRelationship};

/// A path in the graph: node -[rel]-> node -[rel]-> node ...
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Path {
    /// Nodes along the path. Always has one more element than `relationships`.
    pub nodes: Vec<DynamicNode>,
    /// Relationships connecting consecutive nodes.
    pub relationships: Vec<DynamicRelationship>,
}

impl Path {
    pub fn single(node: DynamicNode) -> Self {
        Self { nodes: vec![node], relationships: Vec::new() }
    }

    pub fn len(&self) -> usize {
        self.relationships.len()
    }

    pub fn is_empty(&self) -> bool {
        self.relationships.is_empty()
    }

    pub fn start(&self) -> &DynamicNode {
        self.nodes.first().expect("Path always has at least one node")
    }

    pub fn end(&self) -> &DynamicNode {
        self.nodes.last().expect("Path always has at least one node")
    }

    /// Extend path with a relationship and its target node.
    pub fn append(&mut self, rel: DynamicRelationship, node: DynamicNode) {
        self.relationships.push(rel);
        self.nodes.push(node);
    }

    /// Returns an iterator over (node, relationship, node) triples along the path.
    pub fn triples(&self) -> impl Iterator<Item = (&DynamicNode, &DynamicRelationship, &DynamicNode)> {
        self.relationships.iter().enumerate().map(move |(i, rel)| {
            (&self.nodes[i], rel, &self.nodes[i + 1])
        })
    }

    /// Reverse the path direction.
    pub fn reverse(&mut self) {
        self.nodes.reverse();
        self.relationships.reverse();
    }

    pub fn contains_node(&self, id: &str) -> bool {
        self.nodes.iter().any(|n| n.id == id)
    }

    pub fn contains_relationship(&self, id: &str) -> bool {
        self.relationships.iter().any(|r| r.id == id)
    }

    pub fn node_at(&self, index: usize) -> Option<&DynamicNode> {
        self.nodes.get(index)
    }

    pub fn relationship_at(&self, index: usize) -> Option<&DynamicRelationship> {
        self.relationships.get(index)
    }

    pub fn node_ids(&self) -> Vec<&str> {
        self.nodes.iter().map(|n| n.id.as_str()).collect()
    }

    pub fn relationship_ids(&self) -> Vec<&str> {
        self.relationships.iter().map(|r| r.id.as_str()).collect()
    }
}

/// The triple `(start, rel, end)` of a single hop, as returned by
/// `nodes<S>().path_segments<R,T>()`. Unlike `Path`, this is always
/// exactly one relationship wide — it is the unit the compiler's
/// path-segment pattern (`MATCH (s)-[r]-(t)`) produces one of per row.
#[derive(Debug, Clone, PartialEq)]
pub struct PathSegment<S, R, T> {
    pub start: S,
    pub rel: R,
    pub end: T,
}

impl<S, R, T> PathSegment<S, R, T> {
    pub fn new(start: S, rel: R, end: T) -> Self {
        Self { start, rel, end }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Value;

    fn test_node(id: &str) -> DynamicNode {
        DynamicNode::new(id)
    }

    fn test_rel(id: &str, src: &str, dst: &str) -> DynamicRelationship {
        DynamicRelationship::new(id, src, dst, "KNOWS")
    }

    #[test]
    fn test_path_triples() {
        let mut path = Path::single(test_node("1"));
        path.append(test_rel("10", "1", "2"), test_node("2"));
        path.append(test_rel("11", "2", "3"), test_node("3"));

        let triples: Vec<_> = path.triples().collect();
        assert_eq!(triples.len(), 2);
        assert_eq!(triples[0].0.id, "1");
        assert_eq!(triples[0].2.id, "2");
        assert_eq!(triples[1].0.id, "2");
        assert_eq!(triples[1].2.id, "3");
    }

    #[test]
    fn test_path_contains() {
        let mut path = Path::single(test_node("1"));
        path.append(test_rel("10", "1", "2"), test_node("2"));

        assert!(path.contains_node("1"));
        assert!(path.contains_node("2"));
        assert!(!path.contains_node("99"));
        assert!(path.contains_relationship("10"));
        assert!(!path.contains_relationship("99"));
    }

    #[test]
    fn test_path_reverse() {
        let mut path = Path::single(test_node("1"));
        path.append(test_rel("10", "1", "2"), test_node("2"));
        path.append(test_rel("11", "2", "3"), test_node("3"));

        assert_eq!(path.start().id, "1");
        assert_eq!(path.end().id, "3");

        path.reverse();
        assert_eq!(path.start().id, "3");
        assert_eq!(path.end().id, "1");
    }

    #[test]
    fn test_path_segment_fields() {
        let seg = PathSegment::new(
            test_node("a"),
            test_rel("r1", "a", "b").with_property("since", Value::Int(2020)),
            test_node("b"),
        );
        assert_eq!(seg.start.id, "a");
        assert_eq!(seg.end.id, "b");
        assert_eq!(seg.rel.properties.get("since"), Some(&Value::Int(2020)));
    }
}
