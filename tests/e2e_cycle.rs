//! Reference-cycle rejection (§3, §8 scenario S6): a node whose complex
//! properties share an `Rc`-cycle must fail `create_node` with
//! `InvalidInput` and leave nothing persisted.

use std::cell::RefCell;
use std::rc::Rc;

use graph_ogm::schema::ComplexNode;
use graph_ogm::{ErrorKind, NodeType, PropertyDescriptor, Schema, Serialized, Store};

/// One link of a hand-built complex-property object graph. Real
/// `ComplexProperty` types never alias each other (they're owned fields),
/// so this fixture is the one place in the suite that reaches for `Rc`
/// directly to build the shared-reference cycle §3 forbids.
struct LoopNode {
    next: RefCell<Option<Rc<LoopNode>>>,
}

impl ComplexNode for LoopNode {
    fn node_identity(&self) -> usize {
        self as *const _ as usize
    }
    fn complex_children(&self) -> Vec<Rc<dyn ComplexNode>> {
        self.next.borrow().iter().map(|n| n.clone() as Rc<dyn ComplexNode>).collect()
    }
}

#[derive(Default)]
struct CyclicPerson {
    id: String,
}

impl NodeType for CyclicPerson {
    fn schema() -> Schema {
        Schema::new("CyclicPerson", vec!["CyclicPerson"]).with_properties(vec![PropertyDescriptor::simple("id")])
    }
    fn empty() -> Self {
        Self::default()
    }
    fn set_property(&mut self, name: &str, value: Serialized) {
        if let ("id", Serialized::Simple(graph_ogm::Value::String(s))) = (name, value) {
            self.id = s;
        }
    }
    fn get_property(&self, name: &str) -> Option<Serialized> {
        match name {
            "id" => Some(Serialized::Simple(graph_ogm::Value::String(self.id.clone()))),
            _ => None,
        }
    }
    fn id(&self) -> String {
        self.id.clone()
    }
    fn complex_roots(&self) -> Vec<Rc<dyn ComplexNode>> {
        let a = Rc::new(LoopNode { next: RefCell::new(None) });
        let b = Rc::new(LoopNode { next: RefCell::new(None) });
        *a.next.borrow_mut() = Some(b.clone());
        *b.next.borrow_mut() = Some(a.clone());
        vec![a as Rc<dyn ComplexNode>]
    }
}

#[tokio::test]
async fn create_node_with_a_reference_cycle_is_rejected_and_persists_nothing() {
    let store = Store::open_memory();
    let graph = store.graph();

    let cyclic = CyclicPerson { id: "a".into() };
    let err = graph.create_node(None, &cyclic).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidInput);

    let missing = graph.get_node::<CyclicPerson>(None, "a").await.unwrap_err();
    assert_eq!(missing.kind(), ErrorKind::NotFound);
}
