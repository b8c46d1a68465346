//! Execution Layer (C6, §4.6): the driver/cursor boundary, the in-memory
//! reference driver, and the glue that turns a stream of wire records
//! back into typed objects for the query builder's terminators.

pub mod cancel;
pub mod driver;
pub mod eval;
pub mod memory;
pub mod record;
pub mod wire;

pub use cancel::CancellationToken;
pub use driver::{Cursor, Driver, TxHandle, TxMode};
pub use memory::MemoryDriver;
pub use record::RecordValue;

use std::sync::Arc;

use futures_core::Stream;

use crate::error::{Error, Result};
use crate::model::Entity;
use crate::registry::metadata::{ErasedNode, NodeType};
use crate::serde_graph;

/// Pulls every row off `cursor`, checking `token` between pulls so a
/// cancelled query stops draining instead of running to completion (§5
/// "checked at every suspension point"). Closes the cursor once drained
/// or once cancellation is observed.
pub async fn drain(mut cursor: Box<dyn Cursor>, token: Option<&CancellationToken>) -> Result<Vec<RecordValue>> {
    let mut rows = Vec::new();
    loop {
        if let Some(t) = token {
            if t.is_cancelled() {
                cursor.close().await?;
                return Err(Error::Cancelled);
            }
        }
        match cursor.next().await? {
            Some(row) => rows.push(row),
            None => break,
        }
    }
    cursor.close().await?;
    Ok(rows)
}

/// The streaming counterpart to [`drain`] (§4.6 "the cursor pulls from the
/// driver one page at a time; the caller's async iterator drives it"):
/// nothing runs until the returned stream is polled, and pulling a row
/// happens only when the caller asks for the next one — no `Vec` buffers
/// the whole result set up front. Still honors cancellation between
/// pulls, and closes the cursor once exhausted, errored, or cancelled.
pub fn drain_stream(
    cursor: Box<dyn Cursor>,
    token: Option<CancellationToken>,
) -> impl Stream<Item = Result<RecordValue>> {
    futures_util::stream::unfold(Some((cursor, token)), |state| async move {
        let (mut cursor, token) = state?;
        if let Some(t) = &token {
            if t.is_cancelled() {
                let _ = cursor.close().await;
                return Some((Err(Error::Cancelled), None));
            }
        }
        match cursor.next().await {
            Ok(Some(row)) => Some((Ok(row), Some((cursor, token)))),
            Ok(None) => {
                let _ = cursor.close().await;
                None
            }
            Err(e) => {
                let _ = cursor.close().await;
                Some((Err(e), None))
            }
        }
    })
}

/// Drains `cursor` and deserializes every [`RecordValue::Entity`] row
/// into `T` directly (the non-polymorphic path, §4.3): no label-driven
/// resolution, `T` is what gets built regardless of the stored label.
pub async fn drain_to_list<T: NodeType>(cursor: Box<dyn Cursor>, token: Option<&CancellationToken>) -> Result<Vec<T>> {
    drain(cursor, token)
        .await?
        .into_iter()
        .filter_map(row_entity)
        .map(|entity| serde_graph::deserialize_node::<T>(&entity))
        .collect()
}

/// The polymorphic counterpart to [`drain_to_list`]: resolves
/// `most_derived(T, entity.label)` per row instead of always building
/// `T` itself (§3 "most-derived type assignable to target whose label
/// matches", §8 scenario S3).
pub async fn drain_to_dyn_list<T: NodeType>(
    cursor: Box<dyn Cursor>,
    token: Option<&CancellationToken>,
) -> Result<Vec<Box<dyn ErasedNode>>> {
    drain(cursor, token)
        .await?
        .into_iter()
        .filter_map(row_entity)
        .map(|entity| serde_graph::deserialize_node_dyn::<T>(&entity))
        .collect()
}

fn row_entity(row: RecordValue) -> Option<Entity> {
    match row {
        RecordValue::Entity { entity } => Some(entity),
        _ => None,
    }
}

/// A store's executable backend: the driver plus the transaction it
/// should run against, if any (an ambient transaction set by
/// `with_transaction()`, §4.4/§4.6).
#[derive(Clone)]
pub struct ExecutionContext {
    pub driver: Arc<dyn Driver>,
    pub tx: Option<TxHandle>,
    pub token: Option<CancellationToken>,
}

impl ExecutionContext {
    pub fn new(driver: Arc<dyn Driver>) -> Self {
        Self { driver, tx: None, token: None }
    }

    pub fn with_tx(mut self, tx: TxHandle) -> Self {
        self.tx = Some(tx);
        self
    }

    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.token = Some(token);
        self
    }
}
