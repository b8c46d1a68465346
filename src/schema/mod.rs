//! Schema descriptors (C1/C3 support) and the data-model rules (C2).

pub mod rules;

pub use rules::{
    enforce_constraints_for_entity, enforce_constraints_for_node,
    enforce_constraints_for_relationship, has_reference_cycle, ComplexNode,
    DEFAULT_MAX_DEPTH,
};

/// How a property is classified, per §3.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PropertyKind {
    Simple,
    SimpleCollection,
    Complex,
    ComplexCollection,
}

/// One property of a node, relationship, or complex type's schema.
#[derive(Debug, Clone)]
pub struct PropertyDescriptor {
    /// Field name as used in Rust code.
    pub name_in_code: &'static str,
    /// Property name as stored on the wire (defaults to `name_in_code`
    /// unless overridden by a `Property(label)` declaration).
    pub name_on_wire: &'static str,
    pub kind: PropertyKind,
    pub is_nullable: bool,
    pub is_indexed: bool,
    /// For `SimpleCollection`/`ComplexCollection`, the element type's name
    /// (diagnostic only — Rust's type system already enforces element
    /// homogeneity, unlike a reflection-based implementation).
    pub element_type: Option<&'static str>,
}

impl PropertyDescriptor {
    pub const fn simple(name: &'static str) -> Self {
        Self {
            name_in_code: name,
            name_on_wire: name,
            kind: PropertyKind::Simple,
            is_nullable: false,
            is_indexed: false,
            element_type: None,
        }
    }

    pub const fn complex(name: &'static str) -> Self {
        Self {
            name_in_code: name,
            name_on_wire: name,
            kind: PropertyKind::Complex,
            is_nullable: false,
            is_indexed: false,
            element_type: None,
        }
    }

    pub const fn simple_collection(name: &'static str, element_type: &'static str) -> Self {
        Self {
            name_in_code: name,
            name_on_wire: name,
            kind: PropertyKind::SimpleCollection,
            is_nullable: false,
            is_indexed: false,
            element_type: Some(element_type),
        }
    }

    pub const fn complex_collection(name: &'static str, element_type: &'static str) -> Self {
        Self {
            name_in_code: name,
            name_on_wire: name,
            kind: PropertyKind::ComplexCollection,
            is_nullable: false,
            is_indexed: false,
            element_type: Some(element_type),
        }
    }

    pub const fn wire_name(mut self, name_on_wire: &'static str) -> Self {
        self.name_on_wire = name_on_wire;
        self
    }

    pub const fn nullable(mut self) -> Self {
        self.is_nullable = true;
        self
    }

    pub const fn indexed(mut self) -> Self {
        self.is_indexed = true;
        self
    }
}

/// How the deserializer should build an empty instance before assigning
/// fields. Every node/relationship/complex type in this crate goes
/// through `Default`-style empty construction (§3: "public default
/// construction path"); `ConstructorStrategy` exists so a future
/// strategy (e.g. a builder-style constructor) can be added without
/// breaking the `Schema` shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConstructorStrategy {
    #[default]
    EmptyThenAssign,
}

/// Schema produced once per type by the registry (§3 "Schema").
#[derive(Debug, Clone)]
pub struct Schema {
    pub type_name: &'static str,
    pub labels: Vec<&'static str>,
    pub properties: Vec<PropertyDescriptor>,
    pub constructor: ConstructorStrategy,
}

impl Schema {
    pub fn new(type_name: &'static str, labels: Vec<&'static str>) -> Self {
        Self { type_name, labels, properties: Vec::new(), constructor: ConstructorStrategy::default() }
    }

    pub fn with_properties(mut self, properties: Vec<PropertyDescriptor>) -> Self {
        self.properties = properties;
        self
    }

    pub fn property(&self, name_in_code: &str) -> Option<&PropertyDescriptor> {
        self.properties.iter().find(|p| p.name_in_code == name_in_code)
    }

    /// Find a property by wire name, matched case-insensitively, per the
    /// deserializer's contract in §4.3.
    pub fn property_by_wire_name(&self, name_on_wire: &str) -> Option<&PropertyDescriptor> {
        self.properties
            .iter()
            .find(|p| p.name_on_wire.eq_ignore_ascii_case(name_on_wire))
    }

    pub fn primary_label(&self) -> &'static str {
        self.labels.first().copied().unwrap_or(self.type_name)
    }
}
