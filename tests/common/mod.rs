//! Shared fixture types for the end-to-end test suite: a small `Person`/
//! `Manager`/`Company` node hierarchy plus `WorksAt`/`Knows` relationships,
//! covering a complex property (`Address`), a simple collection (`tags`),
//! and one polymorphic subtype (`Manager` over `Person`).

use graph_ogm::{
    registry, ComplexProperty, Direction, NodeType, PropertyDescriptor, RelationshipType, Schema, Serialized, Value,
};

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Address {
    pub street: String,
    pub city: String,
}

impl ComplexProperty for Address {
    fn schema() -> Schema {
        Schema::new("Address", vec!["Address"])
            .with_properties(vec![PropertyDescriptor::simple("street"), PropertyDescriptor::simple("city")])
    }
    fn empty() -> Self {
        Self::default()
    }
    fn set_property(&mut self, name: &str, value: Serialized) {
        let Serialized::Simple(Value::String(s)) = value else { return };
        match name {
            "street" => self.street = s,
            "city" => self.city = s,
            _ => {}
        }
    }
    fn get_property(&self, name: &str) -> Option<Serialized> {
        let s = match name {
            "street" => &self.street,
            "city" => &self.city,
            _ => return None,
        };
        Some(Serialized::Simple(Value::String(s.clone())))
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Person {
    pub id: String,
    pub name: String,
    pub age: i64,
    /// Top-level copy of `home.city`, kept alongside the complex `home`
    /// field so `order_by`/`group_by` (which address only top-level
    /// fields — dotted paths are a `Where`-predicate-only feature, see
    /// `query::expr`'s doc comment) have something flat to group on.
    pub city: String,
    pub tags: Vec<String>,
    pub home: Address,
}

impl NodeType for Person {
    fn schema() -> Schema {
        Schema::new("Person", vec!["Person"]).with_properties(vec![
            PropertyDescriptor::simple("id"),
            PropertyDescriptor::simple("name"),
            PropertyDescriptor::simple("age"),
            PropertyDescriptor::simple("city"),
            PropertyDescriptor::simple_collection("tags", "String"),
            PropertyDescriptor::complex("home"),
        ])
    }
    fn empty() -> Self {
        Self::default()
    }
    fn set_property(&mut self, name: &str, value: Serialized) {
        match (name, value) {
            ("id", Serialized::Simple(Value::String(s))) => self.id = s,
            ("name", Serialized::Simple(Value::String(s))) => self.name = s,
            ("age", Serialized::Simple(v)) => self.age = v.as_int().unwrap_or_default(),
            ("city", Serialized::Simple(Value::String(s))) => self.city = s,
            ("tags", Serialized::Simple(Value::List(items))) => {
                self.tags = items.into_iter().filter_map(|v| v.as_str().map(str::to_string)).collect();
            }
            ("home", Serialized::Complex(e)) => {
                self.home = graph_ogm::serde_graph::deserialize_complex(&e).unwrap_or_default();
            }
            _ => {}
        }
    }
    fn get_property(&self, name: &str) -> Option<Serialized> {
        match name {
            "id" => Some(Serialized::Simple(Value::String(self.id.clone()))),
            "name" => Some(Serialized::Simple(Value::String(self.name.clone()))),
            "age" => Some(Serialized::Simple(Value::Int(self.age))),
            "city" => Some(Serialized::Simple(Value::String(self.city.clone()))),
            "tags" => Some(Serialized::SimpleCollection(self.tags.iter().map(|s| Value::String(s.clone())).collect())),
            "home" => Some(Serialized::Complex(graph_ogm::serde_graph::serialize_complex(&self.home))),
            _ => None,
        }
    }
    fn id(&self) -> String {
        self.id.clone()
    }
}

/// A `Person` subtype (§3/§8 scenario S3): registered as assignable to
/// `Person` via `declare_node_subtype`, stored under its own `"Manager"`
/// label, and resolved back to its concrete type by `get_node`/
/// `dynamic_nodes` even though the static root type queried for is `Person`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Manager {
    pub id: String,
    pub name: String,
    pub team_size: i64,
}

impl NodeType for Manager {
    fn declared_label() -> Option<&'static str> {
        Some("Manager")
    }
    fn schema() -> Schema {
        Schema::new("Manager", vec!["Manager"]).with_properties(vec![
            PropertyDescriptor::simple("id"),
            PropertyDescriptor::simple("name"),
            PropertyDescriptor::simple("team_size"),
        ])
    }
    fn empty() -> Self {
        Self::default()
    }
    fn set_property(&mut self, name: &str, value: Serialized) {
        match (name, value) {
            ("id", Serialized::Simple(Value::String(s))) => self.id = s,
            ("name", Serialized::Simple(Value::String(s))) => self.name = s,
            ("team_size", Serialized::Simple(v)) => self.team_size = v.as_int().unwrap_or_default(),
            _ => {}
        }
    }
    fn get_property(&self, name: &str) -> Option<Serialized> {
        match name {
            "id" => Some(Serialized::Simple(Value::String(self.id.clone()))),
            "name" => Some(Serialized::Simple(Value::String(self.name.clone()))),
            "team_size" => Some(Serialized::Simple(Value::Int(self.team_size))),
            _ => None,
        }
    }
    fn id(&self) -> String {
        self.id.clone()
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Company {
    pub id: String,
    pub name: String,
}

impl NodeType for Company {
    fn schema() -> Schema {
        Schema::new("Company", vec!["Company"])
            .with_properties(vec![PropertyDescriptor::simple("id"), PropertyDescriptor::simple("name")])
    }
    fn empty() -> Self {
        Self::default()
    }
    fn set_property(&mut self, name: &str, value: Serialized) {
        match (name, value) {
            ("id", Serialized::Simple(Value::String(s))) => self.id = s,
            ("name", Serialized::Simple(Value::String(s))) => self.name = s,
            _ => {}
        }
    }
    fn get_property(&self, name: &str) -> Option<Serialized> {
        match name {
            "id" => Some(Serialized::Simple(Value::String(self.id.clone()))),
            "name" => Some(Serialized::Simple(Value::String(self.name.clone()))),
            _ => None,
        }
    }
    fn id(&self) -> String {
        self.id.clone()
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct WorksAt {
    pub id: String,
    pub start_id: String,
    pub end_id: String,
    pub since: i64,
}

impl RelationshipType for WorksAt {
    fn declared_type_name() -> Option<&'static str> {
        Some("WORKS_AT")
    }
    fn schema() -> Schema {
        Schema::new("WorksAt", vec!["WORKS_AT"]).with_properties(vec![
            PropertyDescriptor::simple("id"),
            PropertyDescriptor::simple("start_id"),
            PropertyDescriptor::simple("end_id"),
            PropertyDescriptor::simple("since"),
        ])
    }
    fn empty() -> Self {
        Self::default()
    }
    fn set_property(&mut self, name: &str, value: Serialized) {
        match (name, value) {
            ("id", Serialized::Simple(Value::String(s))) => self.id = s,
            ("start_id", Serialized::Simple(Value::String(s))) => self.start_id = s,
            ("end_id", Serialized::Simple(Value::String(s))) => self.end_id = s,
            ("since", Serialized::Simple(v)) => self.since = v.as_int().unwrap_or_default(),
            _ => {}
        }
    }
    fn get_property(&self, name: &str) -> Option<Serialized> {
        match name {
            "id" => Some(Serialized::Simple(Value::String(self.id.clone()))),
            "start_id" => Some(Serialized::Simple(Value::String(self.start_id.clone()))),
            "end_id" => Some(Serialized::Simple(Value::String(self.end_id.clone()))),
            "since" => Some(Serialized::Simple(Value::Int(self.since))),
            _ => None,
        }
    }
    fn id(&self) -> String {
        self.id.clone()
    }
    fn start_id(&self) -> String {
        self.start_id.clone()
    }
    fn end_id(&self) -> String {
        self.end_id.clone()
    }
    fn direction(&self) -> Direction {
        Direction::Outgoing
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Knows {
    pub id: String,
    pub start_id: String,
    pub end_id: String,
    pub closeness: i64,
}

impl RelationshipType for Knows {
    fn declared_type_name() -> Option<&'static str> {
        Some("KNOWS")
    }
    fn schema() -> Schema {
        Schema::new("Knows", vec!["KNOWS"]).with_properties(vec![
            PropertyDescriptor::simple("id"),
            PropertyDescriptor::simple("start_id"),
            PropertyDescriptor::simple("end_id"),
            PropertyDescriptor::simple("closeness"),
        ])
    }
    fn empty() -> Self {
        Self::default()
    }
    fn set_property(&mut self, name: &str, value: Serialized) {
        match (name, value) {
            ("id", Serialized::Simple(Value::String(s))) => self.id = s,
            ("start_id", Serialized::Simple(Value::String(s))) => self.start_id = s,
            ("end_id", Serialized::Simple(Value::String(s))) => self.end_id = s,
            ("closeness", Serialized::Simple(v)) => self.closeness = v.as_int().unwrap_or_default(),
            _ => {}
        }
    }
    fn get_property(&self, name: &str) -> Option<Serialized> {
        match name {
            "id" => Some(Serialized::Simple(Value::String(self.id.clone()))),
            "start_id" => Some(Serialized::Simple(Value::String(self.start_id.clone()))),
            "end_id" => Some(Serialized::Simple(Value::String(self.end_id.clone()))),
            "closeness" => Some(Serialized::Simple(Value::Int(self.closeness))),
            _ => None,
        }
    }
    fn id(&self) -> String {
        self.id.clone()
    }
    fn start_id(&self) -> String {
        self.start_id.clone()
    }
    fn end_id(&self) -> String {
        self.end_id.clone()
    }
    fn direction(&self) -> Direction {
        Direction::Outgoing
    }
}

/// Registers every fixture type and the `Manager : Person` subtype
/// relationship. Idempotent (`register_node`/`declare_node_subtype` both
/// are) so each test can just call this first without coordinating with
/// the others in the same binary.
pub fn register_fixtures() {
    let reg = registry::global();
    reg.declare_node_subtype::<Manager, Person>();
    reg.register_node::<Company>();
    reg.register_relationship::<WorksAt>();
    reg.register_relationship::<Knows>();
}
