//! Serializer (C3): the bidirectional mapping between a typed object and
//! the neutral [`Entity`] intermediate representation (§4.3).
//!
//! Three symmetric pairs, one per kind of typed value:
//!
//! - [`serialize_node`] / [`deserialize_node`] — [`NodeType`] ⇆ `Entity`
//! - [`serialize_relationship`] / [`deserialize_relationship`] — [`RelationshipType`] ⇆ `Entity`
//! - [`serialize_complex`] / [`deserialize_complex`] — [`ComplexProperty`] ⇆ `Entity`
//!
//! Complex (nested) fields recurse through the *same* pair of functions —
//! a type's `get_property`/`set_property` impl calls back into
//! `serialize_complex`/`deserialize_complex` for its own complex fields,
//! the way a hand-written `serde::Serialize` impl calls
//! `serializer.serialize_struct` recursively for nested fields. This
//! module supplies the generic per-kind driving loop; it never reaches
//! into a concrete type's fields itself.

use std::collections::HashMap;

use crate::error::{Error, Result};
use crate::model::{Entity, PropertyMap, Serialized, Value};
use crate::registry::metadata::{ComplexProperty, ErasedNode, NodeType, RelationshipType};
use crate::registry::{self, Registry};
use crate::schema::{PropertyDescriptor, PropertyKind, Schema};

/// Looks up `prop` in an `Entity`'s wire data, matching `name_on_wire`
/// case-insensitively as §4.3 requires, and wraps the result in the
/// `Serialized` shape a `set_property` impl expects. Unknown properties
/// (present on the type but absent from the wire record) simply yield
/// `None` — initial/default value is whatever `T::empty()` set.
fn lookup(entity: &Entity, prop: &PropertyDescriptor) -> Option<Serialized> {
    match prop.kind {
        PropertyKind::Simple | PropertyKind::SimpleCollection => entity
            .simple
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(prop.name_on_wire))
            .map(|(_, v)| Serialized::Simple(v.clone())),
        PropertyKind::Complex | PropertyKind::ComplexCollection => entity
            .complex
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(prop.name_on_wire))
            .map(|(_, v)| v.clone()),
    }
}

fn populate<T>(
    schema: &Schema,
    entity: &Entity,
    mut empty: T,
    set_property: impl Fn(&mut T, &str, Serialized),
) -> T {
    for prop in &schema.properties {
        if let Some(value) = lookup(entity, prop) {
            set_property(&mut empty, prop.name_in_code, value);
        }
    }
    empty
}

fn collect(schema: &Schema, get_property: impl Fn(&str) -> Option<Serialized>) -> (PropertyMap, HashMap<String, Serialized>) {
    let mut simple = PropertyMap::new();
    let mut complex = HashMap::new();
    for prop in &schema.properties {
        let Some(value) = get_property(prop.name_in_code) else { continue };
        match value {
            Serialized::Simple(v) => {
                simple.insert(prop.name_on_wire.to_string(), v);
            }
            Serialized::SimpleCollection(vs) => {
                simple.insert(prop.name_on_wire.to_string(), Value::List(vs));
            }
            c @ (Serialized::Complex(_) | Serialized::ComplexCollection(_)) => {
                complex.insert(prop.name_on_wire.to_string(), c);
            }
        }
    }
    (simple, complex)
}

// ===========================================================================
// NodeType
// ===========================================================================

/// `Serialize(obj)` for a node (§4.3).
pub fn serialize_node<T: NodeType>(obj: &T) -> Entity {
    let schema = T::schema();
    let (simple, complex) = collect(&schema, |name| obj.get_property(name));
    Entity { type_name: schema.type_name.to_string(), label: schema.primary_label().to_string(), simple, complex }
}

/// Builds a `T` from wire data without consulting the registry's
/// polymorphism resolver — used when the caller already knows the exact
/// concrete type, and internally by the registry's type-erased
/// constructors (which have already resolved `most_derived` themselves).
pub fn populate_node<T: NodeType>(entity: &Entity) -> Result<T> {
    Ok(populate(&T::schema(), entity, T::empty(), |obj, name, value| obj.set_property(name, value)))
}

/// `Deserialize(entity, requested_type)` for the non-polymorphic case
/// (§4.3): use `requested_type` directly, no label-driven resolution.
pub fn deserialize_node<T: NodeType>(entity: &Entity) -> Result<T> {
    populate_node::<T>(entity)
}

/// `Deserialize(entity, requested_type)` for the label-driven polymorphic
/// case (§4.3, invariant in §3): resolves `most_derived(requested_type,
/// entity.label)` and constructs *that* concrete type, type-erased,
/// because the statically declared `Target` is generally not the type
/// that actually gets built (the whole point of the invariant — see
/// §8 scenario S3). Falls back to `Target` itself when no
/// more-derived registration matches the label, mirroring "otherwise use
/// requested_type".
pub fn deserialize_node_dyn<Target: NodeType>(entity: &Entity) -> Result<Box<dyn ErasedNode>> {
    deserialize_node_dyn_in(registry::global(), entity)
}

pub fn deserialize_node_dyn_in<Target: NodeType>(reg: &Registry, entity: &Entity) -> Result<Box<dyn ErasedNode>> {
    reg.register_node::<Target>();
    match reg.most_derived::<Target>(&entity.label) {
        Some(type_id) => reg
            .construct(type_id, entity)
            .unwrap_or_else(|| Err(Error::unresolvable_polymorphic(entity.label.clone()))),
        None => {
            if reg.type_of(&entity.label).is_ok() {
                Err(Error::unresolvable_polymorphic(entity.label.clone()))
            } else {
                Ok(Box::new(populate_node::<Target>(entity)?))
            }
        }
    }
}

// ===========================================================================
// RelationshipType
// ===========================================================================

pub fn serialize_relationship<R: RelationshipType>(obj: &R) -> Entity {
    let schema = R::schema();
    let (simple, complex) = collect(&schema, |name| obj.get_property(name));
    debug_assert!(complex.is_empty(), "relationships cannot carry complex properties (§3)");
    Entity { type_name: schema.type_name.to_string(), label: schema.primary_label().to_string(), simple, complex }
}

pub fn deserialize_relationship<R: RelationshipType>(entity: &Entity) -> Result<R> {
    Ok(populate(&R::schema(), entity, R::empty(), |obj, name, value| obj.set_property(name, value)))
}

// ===========================================================================
// ComplexProperty
// ===========================================================================

pub fn serialize_complex<C: ComplexProperty>(obj: &C) -> Entity {
    let schema = C::schema();
    let (simple, complex) = collect(&schema, |name| obj.get_property(name));
    Entity { type_name: schema.type_name.to_string(), label: schema.type_name.to_string(), simple, complex }
}

pub fn deserialize_complex<C: ComplexProperty>(entity: &Entity) -> Result<C> {
    Ok(populate(&C::schema(), entity, C::empty(), |obj, name, value| obj.set_property(name, value)))
}

/// Used by `schema::rules::enforce_constraints_for_node` callers to
/// confirm a type's id before a write — surfaced here rather than in
/// `schema::rules` because it needs `NodeType::id`.
pub fn node_id<T: NodeType>(obj: &T) -> String {
    obj.id()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Value;
    use crate::schema::PropertyDescriptor;

    #[derive(Debug, Clone, PartialEq, Default)]
    struct Address {
        street: String,
        city: String,
        country: String,
    }

    impl ComplexProperty for Address {
        fn schema() -> Schema {
            Schema::new("Address", vec!["Address"]).with_properties(vec![
                PropertyDescriptor::simple("street"),
                PropertyDescriptor::simple("city"),
                PropertyDescriptor::simple("country"),
            ])
        }
        fn empty() -> Self {
            Self::default()
        }
        fn set_property(&mut self, name: &str, value: Serialized) {
            let Serialized::Simple(Value::String(s)) = value else { return };
            match name {
                "street" => self.street = s,
                "city" => self.city = s,
                "country" => self.country = s,
                _ => {}
            }
        }
        fn get_property(&self, name: &str) -> Option<Serialized> {
            let s = match name {
                "street" => &self.street,
                "city" => &self.city,
                "country" => &self.country,
                _ => return None,
            };
            Some(Serialized::Simple(Value::String(s.clone())))
        }
    }

    #[derive(Debug, Clone, PartialEq, Default)]
    struct Person {
        id: String,
        first_name: String,
        last_name: String,
        age: i64,
        home_address: Address,
    }

    impl NodeType for Person {
        fn schema() -> Schema {
            Schema::new("Person", vec!["Person"]).with_properties(vec![
                PropertyDescriptor::simple("id"),
                PropertyDescriptor::simple("first_name"),
                PropertyDescriptor::simple("last_name"),
                PropertyDescriptor::simple("age"),
                PropertyDescriptor::complex("home_address"),
            ])
        }
        fn empty() -> Self {
            Self::default()
        }
        fn set_property(&mut self, name: &str, value: Serialized) {
            match (name, value) {
                ("id", Serialized::Simple(Value::String(s))) => self.id = s,
                ("first_name", Serialized::Simple(Value::String(s))) => self.first_name = s,
                ("last_name", Serialized::Simple(Value::String(s))) => self.last_name = s,
                ("age", Serialized::Simple(v)) => self.age = v.as_int().unwrap_or_default(),
                ("home_address", Serialized::Complex(e)) => {
                    self.home_address = deserialize_complex::<Address>(&e).unwrap_or_default();
                }
                _ => {}
            }
        }
        fn get_property(&self, name: &str) -> Option<Serialized> {
            match name {
                "id" => Some(Serialized::Simple(Value::String(self.id.clone()))),
                "first_name" => Some(Serialized::Simple(Value::String(self.first_name.clone()))),
                "last_name" => Some(Serialized::Simple(Value::String(self.last_name.clone()))),
                "age" => Some(Serialized::Simple(Value::Int(self.age))),
                "home_address" => Some(Serialized::Complex(serialize_complex(&self.home_address))),
                _ => None,
            }
        }
        fn id(&self) -> String {
            self.id.clone()
        }
    }

    #[test]
    fn round_trip_with_nested_complex_property() {
        let person = Person {
            id: "p1".into(),
            first_name: "Alice".into(),
            last_name: "Smith".into(),
            age: 30,
            home_address: Address { street: "123 Main".into(), city: "Portland".into(), country: "USA".into() },
        };
        let entity = serialize_node(&person);
        assert_eq!(entity.label, "Person");
        assert_eq!(entity.simple.get("age"), Some(&Value::Int(30)));
        assert!(entity.complex.contains_key("home_address"));

        let back: Person = deserialize_node(&entity).unwrap();
        assert_eq!(back, person);
    }

    #[test]
    fn unknown_wire_property_is_ignored_not_fatal() {
        let mut entity = serialize_node(&Person {
            id: "p2".into(),
            first_name: "Bob".into(),
            ..Default::default()
        });
        entity.simple.insert("middle_name".into(), Value::String("Q".into()));
        let back: Person = deserialize_node(&entity).unwrap();
        assert_eq!(back.first_name, "Bob");
    }
}
