//! The driver/cursor boundary (§4.6, §1 "the wire driver ... is external").
//!
//! `Driver` is the abstraction a real Bolt-protocol client would
//! implement against; this crate ships one reference implementation,
//! [`super::memory::MemoryDriver`], reshaped around the OGM's actual
//! boundary: node/relationship CRUD for the facade's write path, plus
//! `run`/`drain` for the query builder's compiled plans.
//!
//! `Tx` is not an associated type on this trait. A dyn-safe
//! `Arc<dyn Driver>` is what lets the query builder and facade stay free
//! of a driver type parameter; an opaque [`TxHandle`] plays the role an
//! associated transaction type otherwise would, with the driver keeping
//! the real per-transaction state behind it.

use async_trait::async_trait;

use crate::compiler::plan::CypherQuery;
use crate::error::Result;
use crate::execution::cancel::CancellationToken;
use crate::execution::record::RecordValue;
use crate::model::{Direction, DynamicNode, DynamicRelationship};

/// Read-only vs. read-write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TxMode {
    ReadOnly,
    ReadWrite,
}

/// Opaque transaction handle. Carries no state itself — the issuing
/// driver is the only thing that can resolve it back to the underlying
/// transaction, which keeps `Driver` object-safe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TxHandle(pub u64);

/// A lazily-pulled stream of rows from a single `run` call (§4.6
/// "the cursor pulls from the driver one page at a time").
#[async_trait]
pub trait Cursor: Send {
    async fn next(&mut self) -> Result<Option<RecordValue>>;
    /// Idempotent; cancellation and terminator-drop both route through
    /// this so a half-drained cursor never leaks a server-side resource.
    async fn close(&mut self) -> Result<()>;
}

/// The execution-layer contract (§4.6): transaction lifecycle, compiled
/// Cypher execution, and the node/relationship CRUD primitives the
/// facade's write path uses directly — a Bolt-like query executor
/// boundary rather than an embedded database's own storage trait.
#[async_trait]
pub trait Driver: Send + Sync + 'static {
    async fn begin_tx(&self, mode: TxMode) -> Result<TxHandle>;
    async fn commit_tx(&self, tx: TxHandle) -> Result<()>;
    async fn rollback_tx(&self, tx: TxHandle) -> Result<()>;

    async fn create_node(&self, tx: TxHandle, node: DynamicNode) -> Result<()>;
    async fn get_node(&self, tx: TxHandle, id: &str) -> Result<Option<DynamicNode>>;
    async fn update_node(&self, tx: TxHandle, node: DynamicNode) -> Result<()>;
    /// §4.7: `cascade=true` removes the node, its non-complex-property
    /// relationships, and its auxiliary complex-property subgraph;
    /// `cascade=false` fails with `ConstraintViolation` if non-complex
    /// relationships still touch the node. Returns whether the node
    /// existed at all.
    async fn delete_node(&self, tx: TxHandle, id: &str, cascade: bool) -> Result<bool>;

    async fn create_relationship(&self, tx: TxHandle, rel: DynamicRelationship) -> Result<()>;
    async fn get_relationship(&self, tx: TxHandle, id: &str) -> Result<Option<DynamicRelationship>>;
    async fn update_relationship(&self, tx: TxHandle, rel: DynamicRelationship) -> Result<()>;
    async fn delete_relationship(&self, tx: TxHandle, id: &str) -> Result<bool>;

    /// Every relationship touching `node_id`, optionally filtered by
    /// direction and type — used by cascade delete and by the serializer's
    /// auxiliary-relationship wire round-trip.
    async fn relationships_of(
        &self,
        tx: TxHandle,
        node_id: &str,
        direction: Direction,
        rel_type: Option<&str>,
    ) -> Result<Vec<DynamicRelationship>>;

    /// Execute a compiled query (§4.5's `CypherQuery`) and return a
    /// streaming cursor over its rows. `token` is threaded through so a
    /// cancellation mid-stream can close the cursor immediately (§5).
    async fn run(&self, tx: TxHandle, query: &CypherQuery, token: Option<&CancellationToken>) -> Result<Box<dyn Cursor>>;

    /// Idempotent shutdown (§4.6 `dispose`).
    async fn dispose(&self) -> Result<()>;
}
