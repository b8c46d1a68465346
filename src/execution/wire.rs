//! Wire-level encoding shared by every [`Driver`](super::Driver) impl:
//! the auxiliary-relationship scheme for complex properties (§6
//! "Reserved wire names"), and the deterministic full-text index naming
//! scheme (§9 Open Question 3).
//!
//! This module sits below the serializer: C3 only ever deals in
//! [`crate::model::Entity`]/[`Serialized`](crate::model::Serialized)
//! values; turning a `Complex`/`ComplexCollection` property into actual
//! carrier nodes and `__PROPERTY__{name}__` relationships (and back) is a
//! storage concern, so it lives here next to the driver that has to
//! persist it.

use std::collections::HashMap;

use crate::model::{Direction, DynamicNode, DynamicRelationship, Entity, Serialized};

pub const PROPERTY_PREFIX: &str = "__PROPERTY__";
pub const PROPERTY_SUFFIX: &str = "__";

/// §6: `__PROPERTY__{field_name}__`.
pub fn aux_rel_type(field_name: &str) -> String {
    format!("{PROPERTY_PREFIX}{field_name}{PROPERTY_SUFFIX}")
}

/// The inverse: recover the property name from an auxiliary relationship
/// type, or `None` if it isn't one (used to tell ordinary relationships
/// apart from property carriers when scanning a node's edges).
pub fn field_name_from_aux(rel_type: &str) -> Option<&str> {
    rel_type.strip_prefix(PROPERTY_PREFIX)?.strip_suffix(PROPERTY_SUFFIX)
}

pub fn is_aux_rel_type(rel_type: &str) -> bool {
    field_name_from_aux(rel_type).is_some()
}

/// §9 Open Question 3: a stable, deterministic index name derived from
/// labels + indexed fields, since the source leaves the naming scheme
/// unpinned. Chosen scheme: `ft__{labels joined by _}__{fields joined by _}`,
/// lower-cased so two declarations that differ only in case collide
/// (intentional — the backend's index names are usually case-folded too).
pub fn fulltext_index_name(labels: &[&str], fields: &[String]) -> String {
    let mut labels = labels.to_vec();
    labels.sort_unstable();
    let mut fields = fields.to_vec();
    fields.sort();
    format!("ft__{}__{}", labels.join("_"), fields.join("_")).to_lowercase()
}

/// Splits a typed object's serialized [`Entity`] into the node it owns
/// plus the auxiliary relationship+carrier-node pairs needed to persist
/// every `Complex`/`ComplexCollection` property (§3 "Complex-property
/// encoding", §6).
///
/// Nested complex fields recurse: a carrier node's own complex
/// properties become further auxiliary relationships hanging off *it*,
/// not off `owner_id` — this is what makes the encoding work for
/// arbitrarily nested complex types.
pub fn entity_to_graph(entity: &Entity, owner_id: &str) -> (DynamicNode, Vec<(DynamicRelationship, DynamicNode)>) {
    let mut node = DynamicNode::new(owner_id).with_labels([entity.label.clone()]);
    node.properties = entity.simple.clone();

    let mut aux = Vec::new();
    for (field_name, value) in &entity.complex {
        match value {
            Serialized::Complex(sub) => {
                let carrier_id = format!("{owner_id}::{field_name}");
                let (carrier_node, nested) = entity_to_graph(sub, &carrier_id);
                let rel = DynamicRelationship::new(
                    format!("{owner_id}::{field_name}::rel"),
                    owner_id,
                    carrier_id,
                    aux_rel_type(field_name),
                );
                aux.push((rel, carrier_node));
                aux.extend(nested);
            }
            Serialized::ComplexCollection(items) => {
                for (i, sub) in items.iter().enumerate() {
                    let carrier_id = format!("{owner_id}::{field_name}::{i}");
                    let (mut carrier_node, nested) = entity_to_graph(sub, &carrier_id);
                    // Ordering isn't implied by storage/iteration order, so
                    // the carrier node itself pins the original collection
                    // index (§8 round-trip invariant). This has to live on
                    // the carrier, not the relationship: `fetch_related`
                    // callbacks only ever hand back `(rel_type, carrier)`
                    // pairs, never the relationship's own properties.
                    carrier_node.properties.insert("__index__".to_string(), crate::model::Value::Int(i as i64));
                    let rel = DynamicRelationship::new(
                        format!("{owner_id}::{field_name}::{i}::rel"),
                        owner_id,
                        carrier_id,
                        aux_rel_type(field_name),
                    );
                    aux.push((rel, carrier_node));
                    aux.extend(nested);
                }
            }
            Serialized::Simple(_) | Serialized::SimpleCollection(_) => {
                unreachable!("Entity::complex only ever holds Complex/ComplexCollection values")
            }
        }
    }
    (node, aux)
}

/// The inverse of [`entity_to_graph`]: reassembles an [`Entity`] from a
/// stored node plus a `fetch_related` callback that, given a node id,
/// returns every `(aux_rel_type, carrier_node)` pair hanging directly off
/// it. Recurses into each carrier node's own related set to rebuild
/// nested complex properties.
pub fn graph_to_entity(
    node: &DynamicNode,
    type_name: &str,
    fetch_related: &impl Fn(&str) -> Vec<(String, DynamicNode)>,
) -> Entity {
    let mut entity = Entity::new(type_name, node.labels.first().cloned().unwrap_or_default());
    entity.simple = node.properties.clone();

    // `__index__`'s *presence*, not its value, is what tells a scalar
    // `Complex` carrier apart from a one-element `ComplexCollection`:
    // `entity_to_graph` only ever stamps it onto `ComplexCollection`
    // items (wire.rs's `entity_to_graph`), so a carrier with no
    // `__index__` at all is unambiguously a `Complex`.
    let mut grouped: HashMap<String, Vec<(Option<i64>, DynamicNode)>> = HashMap::new();
    for (rel_type, carrier) in fetch_related(&node.id) {
        if let Some(field) = field_name_from_aux(&rel_type) {
            let index = carrier.properties.get("__index__").and_then(|v| v.as_int());
            grouped.entry(field.to_string()).or_default().push((index, carrier));
        }
    }
    for (field, mut carriers) in grouped {
        carriers.sort_by_key(|(i, _)| i.unwrap_or(0));
        if carriers.len() == 1 && carriers[0].0.is_none() {
            let (_, carrier) = &carriers[0];
            let sub = graph_to_entity(carrier, &field, fetch_related);
            entity.complex.insert(field, Serialized::Complex(sub));
        } else {
            let subs = carriers
                .iter()
                .map(|(_, carrier)| graph_to_entity(carrier, &field, fetch_related))
                .collect();
            entity.complex.insert(field, Serialized::ComplexCollection(subs));
        }
    }
    entity
}

/// Normalises a relationship's logical direction to how it is actually
/// stored: `Incoming` swaps start/end at write time so storage is always
/// directed start→end (§3).
pub fn normalize_direction(mut rel: DynamicRelationship) -> DynamicRelationship {
    if rel.direction == Direction::Incoming {
        std::mem::swap(&mut rel.start_id, &mut rel.end_id);
        rel.direction = Direction::Outgoing;
    }
    rel
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn aux_rel_type_round_trips() {
        let rt = aux_rel_type("home_address");
        assert_eq!(rt, "__PROPERTY__home_address__");
        assert_eq!(field_name_from_aux(&rt), Some("home_address"));
        assert_eq!(field_name_from_aux("KNOWS"), None);
    }

    #[test]
    fn index_name_is_deterministic_and_order_independent() {
        let a = fulltext_index_name(&["Person", "Employee"], &["first_name".into(), "last_name".into()]);
        let b = fulltext_index_name(&["Employee", "Person"], &["last_name".into(), "first_name".into()]);
        assert_eq!(a, b);
    }

    #[test]
    fn complex_collection_round_trips_in_order() {
        let mut owner = Entity::new("Person", "Person");
        let items = vec![
            Entity::new("Address", "Address").with_simple("city", "Utrecht"),
            Entity::new("Address", "Address").with_simple("city", "Haarlem"),
            Entity::new("Address", "Address").with_simple("city", "Leiden"),
        ];
        owner.complex.insert("past_addresses".to_string(), Serialized::ComplexCollection(items));

        let (_owner_node, aux) = entity_to_graph(&owner, "person-1");
        // One carrier node per collection item, no nested aux beyond that.
        assert_eq!(aux.len(), 3);

        let fetch_related = |id: &str| -> Vec<(String, DynamicNode)> {
            aux.iter()
                .filter(|(rel, _)| rel.start_id == id)
                .map(|(rel, carrier)| (rel.rel_type.clone(), carrier.clone()))
                .collect()
        };

        let owner_node = DynamicNode::new("person-1").with_labels(["Person"]);
        let rebuilt = graph_to_entity(&owner_node, "Person", &fetch_related);
        let Some(Serialized::ComplexCollection(rebuilt_items)) = rebuilt.complex.get("past_addresses") else {
            panic!("expected a ComplexCollection to round-trip back");
        };
        let cities: Vec<_> =
            rebuilt_items.iter().map(|e| e.simple.get("city").and_then(|v| v.as_str()).unwrap_or_default()).collect();
        assert_eq!(cities, vec!["Utrecht", "Haarlem", "Leiden"]);
    }

    #[test]
    fn single_element_complex_collection_is_not_mistaken_for_a_scalar_complex() {
        let mut owner = Entity::new("Person", "Person");
        let items = vec![Entity::new("Address", "Address").with_simple("city", "Utrecht")];
        owner.complex.insert("past_addresses".to_string(), Serialized::ComplexCollection(items));

        let (_owner_node, aux) = entity_to_graph(&owner, "person-2");
        assert_eq!(aux.len(), 1);

        let fetch_related = |id: &str| -> Vec<(String, DynamicNode)> {
            aux.iter()
                .filter(|(rel, _)| rel.start_id == id)
                .map(|(rel, carrier)| (rel.rel_type.clone(), carrier.clone()))
                .collect()
        };

        let owner_node = DynamicNode::new("person-2").with_labels(["Person"]);
        let rebuilt = graph_to_entity(&owner_node, "Person", &fetch_related);
        match rebuilt.complex.get("past_addresses") {
            Some(Serialized::ComplexCollection(items)) => assert_eq!(items.len(), 1),
            other => panic!("expected a one-element ComplexCollection to stay a collection, got {other:?}"),
        }
    }
}
