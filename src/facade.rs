//! Graph Facade (C7, §4.7): the top-level object applications hold.
//! `Store` owns the driver and opens `Tx`s; `Graph` is the CRUD + query
//! entry point, generalized away from a single storage-backend type
//! parameter to the dyn-safe `Arc<dyn Driver>` the execution layer
//! exposes (see `execution::driver`'s doc comment for why).
//!
//! A `None` transaction argument means implicit (§5): the call opens its
//! own `Tx`, runs, and commits on success / rolls back on error, closing
//! its own transaction around a single closure.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;

use crate::error::{Error, Result};
use crate::execution::{Driver, ExecutionContext, MemoryDriver, TxHandle, TxMode};
use crate::model::{Direction, DynamicNode, DynamicRelationship, Entity};
use crate::query::builder::{DynamicNodeQuery, DynamicRelationshipQuery, NodeQuery, RelationshipQuery};
use crate::registry::metadata::{ErasedNode, NodeType, RelationshipType};
use crate::registry::{self};
use crate::schema;
use crate::serde_graph;

/// Connection parameters for a real Bolt endpoint (§6 `open(endpoint,
/// username, password, database?)`). The wire driver that would actually
/// dial `endpoint` is external to this crate (spec's Non-goals, §1); this
/// struct only carries what a caller hands to their own `Driver` impl.
#[derive(Debug, Clone)]
pub struct GraphConfig {
    pub endpoint: String,
    pub username: String,
    pub password: String,
    pub database: Option<String>,
}

impl GraphConfig {
    pub fn new(endpoint: impl Into<String>, username: impl Into<String>, password: impl Into<String>) -> Self {
        Self { endpoint: endpoint.into(), username: username.into(), password: password.into(), database: None }
    }

    pub fn with_database(mut self, database: impl Into<String>) -> Self {
        self.database = Some(database.into());
        self
    }
}

/// Owns a driver and its configuration; `graph()` is the handle
/// application code actually calls CRUD/query methods on.
pub struct Store {
    config: GraphConfig,
    graph: Graph,
}

impl Store {
    /// Pairs a caller-supplied `Driver` with its connection parameters.
    /// There is no Bolt dialing here — see the module doc comment.
    #[tracing::instrument(skip(driver), fields(endpoint = %config.endpoint))]
    pub fn open(config: GraphConfig, driver: Arc<dyn Driver>) -> Self {
        tracing::info!("opened graph store");
        Self { graph: Graph::new(driver), config }
    }

    /// Convenience entry point for tests and examples: an in-memory
    /// store with no real endpoint behind it.
    pub fn open_memory() -> Self {
        Self::open(GraphConfig::new("memory", "", ""), MemoryDriver::shared())
    }

    pub fn config(&self) -> &GraphConfig {
        &self.config
    }

    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    pub async fn close(self) -> Result<()> {
        self.graph.driver.dispose().await
    }
}

/// Recursively fetches the whole auxiliary complex-property subgraph
/// rooted at `root_id` into a flat `owner_id -> [(rel_type, carrier)]`
/// map, so `wire::graph_to_entity`'s synchronous `fetch_related` callback
/// can be satisfied without re-entering the (async) driver mid-recursion.
async fn fetch_aux_map(
    driver: &dyn Driver,
    tx: TxHandle,
    root_id: &str,
) -> Result<HashMap<String, Vec<(String, DynamicNode)>>> {
    let mut map: HashMap<String, Vec<(String, DynamicNode)>> = HashMap::new();
    let mut frontier = vec![root_id.to_string()];
    while let Some(owner) = frontier.pop() {
        if map.contains_key(&owner) {
            continue;
        }
        let rels = driver.relationships_of(tx, &owner, Direction::Outgoing, None).await?;
        let mut entries = Vec::new();
        for rel in rels {
            if !crate::execution::wire::is_aux_rel_type(&rel.rel_type) {
                continue;
            }
            if let Some(carrier) = driver.get_node(tx, &rel.end_id).await? {
                frontier.push(carrier.id.clone());
                entries.push((rel.rel_type.clone(), carrier));
            }
        }
        map.insert(owner, entries);
    }
    Ok(map)
}

/// Removes just the auxiliary carrier nodes/relationships hanging off
/// `owner_id` (not `owner_id` itself) — used by `update_node` to clear
/// out the previous complex-property subgraph before writing the new
/// one. Recursive async fns need boxing on stable Rust; see
/// `futures::future::BoxFuture` for the idiom this follows.
fn clear_aux_subgraph<'a>(
    driver: &'a dyn Driver,
    tx: TxHandle,
    owner_id: &'a str,
) -> std::pin::Pin<Box<dyn Future<Output = Result<()>> + 'a>> {
    Box::pin(async move {
        let rels = driver.relationships_of(tx, owner_id, Direction::Outgoing, None).await?;
        for rel in rels {
            if !crate::execution::wire::is_aux_rel_type(&rel.rel_type) {
                continue;
            }
            clear_aux_subgraph(driver, tx, &rel.end_id).await?;
            driver.delete_relationship(tx, &rel.id).await?;
            driver.delete_node(tx, &rel.end_id, true).await?;
        }
        Ok(())
    })
}

/// The CRUD + query entry point (§4.7). Cheap to clone — it is just a
/// thin handle onto an `Arc<dyn Driver>` shared storage backend.
#[derive(Clone)]
pub struct Graph {
    driver: Arc<dyn Driver>,
}

impl Graph {
    pub fn new(driver: Arc<dyn Driver>) -> Self {
        Self { driver }
    }

    fn ctx(&self) -> ExecutionContext {
        ExecutionContext::new(self.driver.clone())
    }

    /// `begin_tx()` (§4.7, §5): opens an explicit, caller-managed
    /// transaction. Dropping it without `commit`/`rollback` is a leak
    /// the `Tx` itself warns about (or best-effort rolls back, under the
    /// `bolt` feature — see `Tx`'s `Drop` impl).
    pub async fn begin_tx(&self) -> Result<Tx> {
        self.begin_tx_mode(TxMode::ReadWrite).await
    }

    async fn begin_tx_mode(&self, mode: TxMode) -> Result<Tx> {
        let handle = self.driver.begin_tx(mode).await?;
        Ok(Tx { driver: self.driver.clone(), handle: Some(handle), mode })
    }

    /// Runs `f` against the handle of `tx` if the caller supplied one, or
    /// against a freshly opened implicit transaction of `mode` that is
    /// committed on success and rolled back on error (§5).
    async fn run_in_tx<F, Fut, R>(&self, tx: Option<&Tx>, mode: TxMode, f: F) -> Result<R>
    where
        F: FnOnce(TxHandle) -> Fut,
        Fut: Future<Output = Result<R>>,
    {
        match tx {
            Some(tx) => f(tx.handle()?).await,
            None => {
                let owned = self.begin_tx_mode(mode).await?;
                let handle = owned.handle()?;
                match f(handle).await {
                    Ok(value) => {
                        owned.commit().await?;
                        Ok(value)
                    }
                    Err(err) => {
                        let _ = owned.rollback().await;
                        Err(err)
                    }
                }
            }
        }
    }

    // -----------------------------------------------------------------
    // Writes
    // -----------------------------------------------------------------

    /// `create_node<T>(t, obj)` (§4.7). Writes `obj`'s own node plus one
    /// auxiliary carrier node/relationship per complex property (§3, §6).
    pub async fn create_node<T: NodeType>(&self, tx: Option<&Tx>, obj: &T) -> Result<()> {
        registry::global().register_node::<T>();
        let id = obj.id();
        schema::enforce_constraints_for_node(&id, &obj.complex_roots())?;
        let entity = serde_graph::serialize_node(obj);
        let (node, aux) = crate::execution::wire::entity_to_graph(&entity, &id);

        let driver = self.driver.clone();
        self.run_in_tx(tx, TxMode::ReadWrite, move |handle| {
            let driver = driver.clone();
            async move {
                driver.create_node(handle, node).await?;
                for (rel, carrier) in aux {
                    driver.create_node(handle, carrier).await?;
                    driver.create_relationship(handle, rel).await?;
                }
                Ok(())
            }
        })
        .await
    }

    /// `update_node<T>(t, obj)` (§4.7): replaces the node's own
    /// properties and its entire auxiliary complex-property subgraph.
    pub async fn update_node<T: NodeType>(&self, tx: Option<&Tx>, obj: &T) -> Result<()> {
        registry::global().register_node::<T>();
        let id = obj.id();
        schema::enforce_constraints_for_node(&id, &obj.complex_roots())?;
        let entity = serde_graph::serialize_node(obj);
        let (node, aux) = crate::execution::wire::entity_to_graph(&entity, &id);

        let driver = self.driver.clone();
        self.run_in_tx(tx, TxMode::ReadWrite, move |handle| {
            let driver = driver.clone();
            let id = id.clone();
            async move {
                driver.update_node(handle, node).await?;
                clear_aux_subgraph(driver.as_ref(), handle, &id).await?;
                for (rel, carrier) in aux {
                    driver.create_node(handle, carrier).await?;
                    driver.create_relationship(handle, rel).await?;
                }
                Ok(())
            }
        })
        .await
    }

    /// `delete_node(t, id, cascade)` (§4.7). `cascade=true` detaches and
    /// removes every ordinary relationship too; `cascade=false` fails if
    /// any remain. The node's auxiliary subgraph is always removed
    /// regardless of `cascade` — see `Driver::delete_node`.
    pub async fn delete_node(&self, tx: Option<&Tx>, id: &str, cascade: bool) -> Result<bool> {
        let driver = self.driver.clone();
        let id = id.to_string();
        self.run_in_tx(tx, TxMode::ReadWrite, move |handle| {
            let driver = driver.clone();
            let id = id.clone();
            async move { driver.delete_node(handle, &id, cascade).await }
        })
        .await
    }

    /// `create_relationship<R>(t, obj)` (§4.7). Both endpoints must
    /// already exist.
    pub async fn create_relationship<R: RelationshipType>(&self, tx: Option<&Tx>, obj: &R) -> Result<()> {
        registry::global().register_relationship::<R>();
        let id = obj.id();
        schema::enforce_constraints_for_relationship(&id, &obj.start_id(), &obj.end_id(), &[])?;
        let entity = serde_graph::serialize_relationship(obj);
        let mut rel = DynamicRelationship::new(id, obj.start_id(), obj.end_id(), entity.label.clone()).with_direction(obj.direction());
        rel.properties = entity.simple;

        let driver = self.driver.clone();
        self.run_in_tx(tx, TxMode::ReadWrite, move |handle| {
            let driver = driver.clone();
            async move { driver.create_relationship(handle, rel).await }
        })
        .await
    }

    /// `update_relationship<R>(t, obj)` (§4.7): replaces the
    /// relationship's own simple properties; endpoints are immutable
    /// once created (an endpoint change is a delete + create, per §3's
    /// "relationships are addressed by id and their two endpoint ids").
    pub async fn update_relationship<R: RelationshipType>(&self, tx: Option<&Tx>, obj: &R) -> Result<()> {
        registry::global().register_relationship::<R>();
        let id = obj.id();
        schema::enforce_constraints_for_relationship(&id, &obj.start_id(), &obj.end_id(), &[])?;
        let entity = serde_graph::serialize_relationship(obj);
        let mut rel = DynamicRelationship::new(id, obj.start_id(), obj.end_id(), entity.label.clone()).with_direction(obj.direction());
        rel.properties = entity.simple;

        let driver = self.driver.clone();
        self.run_in_tx(tx, TxMode::ReadWrite, move |handle| {
            let driver = driver.clone();
            async move { driver.update_relationship(handle, rel).await }
        })
        .await
    }

    /// `delete_relationship(t, id)` (§4.7). Returns whether it existed.
    pub async fn delete_relationship(&self, tx: Option<&Tx>, id: &str) -> Result<bool> {
        let driver = self.driver.clone();
        let id = id.to_string();
        self.run_in_tx(tx, TxMode::ReadWrite, move |handle| {
            let driver = driver.clone();
            let id = id.clone();
            async move { driver.delete_relationship(handle, &id).await }
        })
        .await
    }

    // -----------------------------------------------------------------
    // Direct reads (by id, outside the query builder)
    // -----------------------------------------------------------------

    /// `get_node<T>(t, id)` (§4.7, §8 invariant 2/scenario S3): resolves
    /// `most_derived(T, stored_label)` and builds *that* concrete type —
    /// not `T` itself whenever a more-derived registered subtype actually
    /// persisted the row. The result is type-erased behind [`ErasedNode`]
    /// because Rust has no covariant-return generics to express "returns
    /// `T` but is really `Manager`" in a single typed signature (§9 Design
    /// Notes); the erased object's `type_name()`/downcast reflect the
    /// node's true runtime type, exactly as the contract requires — this
    /// is non-negotiable, not an opt-in extra surface.
    pub async fn get_node<T: NodeType>(&self, tx: Option<&Tx>, id: &str) -> Result<Box<dyn ErasedNode>> {
        registry::global().register_node::<T>();
        let driver = self.driver.clone();
        let id = id.to_string();
        self.run_in_tx(tx, TxMode::ReadOnly, move |handle| {
            let driver = driver.clone();
            let id = id.clone();
            async move {
                let node = driver
                    .get_node(handle, &id)
                    .await?
                    .ok_or_else(|| Error::NotFound(format!("no node with id {id:?}")))?;
                let type_name = registry::global()
                    .type_name_of_label(node.labels.first().map(String::as_str).unwrap_or_default())
                    .unwrap_or(T::schema().type_name);
                let aux_map = fetch_aux_map(driver.as_ref(), handle, &node.id).await?;
                let entity = crate::execution::wire::graph_to_entity(&node, type_name, &|owner| {
                    aux_map.get(owner).cloned().unwrap_or_default()
                });
                serde_graph::deserialize_node_dyn::<T>(&entity)
            }
        })
        .await
    }

    /// `get_relationship<R>(t, id)` (§4.7).
    pub async fn get_relationship<R: RelationshipType>(&self, tx: Option<&Tx>, id: &str) -> Result<R> {
        registry::global().register_relationship::<R>();
        let driver = self.driver.clone();
        let id = id.to_string();
        let schema = R::schema();
        self.run_in_tx(tx, TxMode::ReadOnly, move |handle| {
            let driver = driver.clone();
            let id = id.clone();
            async move {
                let rel = driver
                    .get_relationship(handle, &id)
                    .await?
                    .ok_or_else(|| Error::NotFound(format!("no relationship with id {id:?}")))?;
                let mut entity = Entity::new(schema.type_name, rel.rel_type.clone());
                entity.simple = rel.properties.clone();
                serde_graph::deserialize_relationship::<R>(&entity)
            }
        })
        .await
    }

    /// `get_node(t, id)` with no static type (§4.7): the raw wire shape.
    pub async fn get_dynamic_node(&self, tx: Option<&Tx>, id: &str) -> Result<DynamicNode> {
        let driver = self.driver.clone();
        let id = id.to_string();
        self.run_in_tx(tx, TxMode::ReadOnly, move |handle| {
            let driver = driver.clone();
            let id = id.clone();
            async move { driver.get_node(handle, &id).await?.ok_or_else(|| Error::NotFound(format!("no node with id {id:?}"))) }
        })
        .await
    }

    pub async fn get_dynamic_relationship(&self, tx: Option<&Tx>, id: &str) -> Result<DynamicRelationship> {
        let driver = self.driver.clone();
        let id = id.to_string();
        self.run_in_tx(tx, TxMode::ReadOnly, move |handle| {
            let driver = driver.clone();
            let id = id.clone();
            async move {
                driver.get_relationship(handle, &id).await?.ok_or_else(|| Error::NotFound(format!("no relationship with id {id:?}")))
            }
        })
        .await
    }

    // -----------------------------------------------------------------
    // Query builder entry points (§4.4/§4.7)
    // -----------------------------------------------------------------

    pub fn nodes<T: NodeType>(&self) -> NodeQuery<T> {
        NodeQuery::new(self.ctx())
    }

    pub fn relationships<R: RelationshipType>(&self) -> RelationshipQuery<R> {
        RelationshipQuery::new(self.ctx())
    }

    pub fn dynamic_nodes(&self, label: &'static str) -> DynamicNodeQuery {
        DynamicNodeQuery::new(self.ctx(), label)
    }

    pub fn dynamic_relationships(&self, rel_type: &'static str) -> DynamicRelationshipQuery {
        DynamicRelationshipQuery::new(self.ctx(), rel_type)
    }
}

/// An explicit, caller-managed transaction (§4.7/§5). Consumed by
/// `commit`/`rollback`; the ambient `None`-tx call sites above open and
/// close their own instance of this same type.
pub struct Tx {
    driver: Arc<dyn Driver>,
    handle: Option<TxHandle>,
    mode: TxMode,
}

impl Tx {
    pub fn mode(&self) -> TxMode {
        self.mode
    }

    /// The opaque handle a driver call needs; errors once this `Tx` has
    /// already been committed or rolled back.
    pub fn handle(&self) -> Result<TxHandle> {
        self.handle.ok_or_else(|| Error::InvalidInput("transaction has already been committed or rolled back".into()))
    }

    pub async fn commit(mut self) -> Result<()> {
        let handle = self.handle.take().ok_or_else(|| Error::InvalidInput("transaction has already been committed or rolled back".into()))?;
        self.driver.commit_tx(handle).await
    }

    pub async fn rollback(mut self) -> Result<()> {
        let handle = self.handle.take().ok_or_else(|| Error::InvalidInput("transaction has already been committed or rolled back".into()))?;
        self.driver.rollback_tx(handle).await
    }
}

impl Drop for Tx {
    fn drop(&mut self) {
        let Some(handle) = self.handle.take() else { return };
        let driver = self.driver.clone();
        #[cfg(feature = "bolt")]
        {
            if let Ok(rt) = tokio::runtime::Handle::try_current() {
                rt.spawn(async move {
                    let _ = driver.rollback_tx(handle).await;
                });
                return;
            }
        }
        let _ = (driver, handle);
        tracing::warn!("Tx dropped without commit() or rollback(); it will remain open until the driver reclaims it");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Serialized, Value};
    use crate::schema::{PropertyDescriptor, Schema};

    #[derive(Debug, Clone, PartialEq, Default)]
    struct Address {
        city: String,
    }
    impl crate::registry::metadata::ComplexProperty for Address {
        fn schema() -> Schema {
            Schema::new("Address", vec!["Address"]).with_properties(vec![PropertyDescriptor::simple("city")])
        }
        fn empty() -> Self {
            Self::default()
        }
        fn set_property(&mut self, name: &str, value: Serialized) {
            if let ("city", Serialized::Simple(Value::String(s))) = (name, value) {
                self.city = s;
            }
        }
        fn get_property(&self, name: &str) -> Option<Serialized> {
            (name == "city").then(|| Serialized::Simple(Value::String(self.city.clone())))
        }
    }

    #[derive(Debug, Clone, PartialEq, Default)]
    struct Person {
        id: String,
        name: String,
        home: Address,
    }
    impl NodeType for Person {
        fn schema() -> Schema {
            Schema::new("Person", vec!["Person"]).with_properties(vec![
                PropertyDescriptor::simple("id"),
                PropertyDescriptor::simple("name"),
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
                ("home", Serialized::Complex(e)) => self.home = serde_graph::deserialize_complex(&e).unwrap_or_default(),
                _ => {}
            }
        }
        fn get_property(&self, name: &str) -> Option<Serialized> {
            match name {
                "id" => Some(Serialized::Simple(Value::String(self.id.clone()))),
                "name" => Some(Serialized::Simple(Value::String(self.name.clone()))),
                "home" => Some(Serialized::Complex(serde_graph::serialize_complex(&self.home))),
                _ => None,
            }
        }
        fn id(&self) -> String {
            self.id.clone()
        }
    }

    #[tokio::test]
    async fn create_then_get_round_trips_with_complex_property() {
        let store = Store::open_memory();
        let graph = store.graph();
        let person = Person { id: "p1".into(), name: "Alice".into(), home: Address { city: "Portland".into() } };
        graph.create_node(None, &person).await.unwrap();

        let back = graph.get_node::<Person>(None, "p1").await.unwrap();
        assert_eq!(back.as_any().downcast_ref::<Person>(), Some(&person));
    }

    #[tokio::test]
    async fn explicit_transaction_rolls_back_on_drop_without_commit() {
        let store = Store::open_memory();
        let graph = store.graph();
        {
            let tx = graph.begin_tx().await.unwrap();
            let person = Person { id: "p2".into(), name: "Bob".into(), ..Default::default() };
            graph.create_node(Some(&tx), &person).await.unwrap();
            // `tx` drops here without commit — its write never lands.
        }
        let result = graph.get_node::<Person>(None, "p2").await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn explicit_transaction_commits_on_request() {
        let store = Store::open_memory();
        let graph = store.graph();
        let tx = graph.begin_tx().await.unwrap();
        let person = Person { id: "p3".into(), name: "Cora".into(), ..Default::default() };
        graph.create_node(Some(&tx), &person).await.unwrap();
        tx.commit().await.unwrap();

        let back = graph.get_node::<Person>(None, "p3").await.unwrap();
        assert_eq!(back.as_any().downcast_ref::<Person>().unwrap().id, "p3");
    }

    #[tokio::test]
    async fn delete_node_without_cascade_fails_when_relationships_remain() {
        let store = Store::open_memory();
        let graph = store.graph();
        let a = Person { id: "a".into(), name: "A".into(), ..Default::default() };
        let b = Person { id: "b".into(), name: "B".into(), ..Default::default() };
        graph.create_node(None, &a).await.unwrap();
        graph.create_node(None, &b).await.unwrap();

        let tx = graph.begin_tx().await.unwrap();
        graph
            .driver
            .create_relationship(tx.handle().unwrap(), DynamicRelationship::new("r1", "a", "b", "KNOWS"))
            .await
            .unwrap();
        tx.commit().await.unwrap();

        let err = graph.delete_node(None, "a", false).await.unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::ConstraintViolation);

        assert!(graph.delete_node(None, "a", true).await.unwrap());
    }
}
