//! Row shapes a [`Cursor`](super::driver::Cursor) yields, and the
//! in-memory cursor every `Driver` impl in this crate can reuse.

use async_trait::async_trait;
use std::collections::HashMap;

use crate::error::Result;
use crate::model::Value;
use crate::{model::Entity, query::op::AggKind};

/// One row's content, tagged by which `ResultShape` (§4.5 Phase G)
/// produced it. A real Bolt driver would hand back a generic named
/// record and let the execution layer interpret it per `ResultShape`; the
/// in-memory driver in this crate already knows the shape at the point it
/// builds a row; carrying the shape here avoids re-deriving it from a
/// loosely-typed map.
#[derive(Debug, Clone)]
pub enum RecordValue {
    /// A full node/relationship binding, with its auxiliary
    /// complex-property subgraph already collected (§4.5 Phase F) when
    /// `load_complex` was set.
    Entity { entity: Entity },
    /// `path_segments()`'s `{start, rel, end}` triple (§4.4, §4.5).
    PathSegment { start: Entity, rel: Entity, end: Entity },
    /// A product-type projection: ordered `(field name, value)` pairs,
    /// matching `Projection::Fields`'s declared order.
    Projection { fields: Vec<(String, Value)> },
    /// `count`/`any`/`all`/`contains`/ungrouped-aggregate results.
    Scalar(Value),
    /// One `GroupBy(key)` bucket plus its aggregate.
    Grouped { key: Value, kind: AggKind, value: Value },
}

/// A cursor over an already-materialised `Vec<RecordValue>`. The
/// in-memory driver has no real backpressure to speak of — it computes
/// the whole result eagerly and hands it back through this cursor so the
/// execution layer's streaming contract (`next()` pulls one row at a
/// time) is still honoured by callers that `await for` instead of
/// `to_list()`.
pub struct VecCursor {
    rows: std::vec::IntoIter<RecordValue>,
    closed: bool,
}

impl VecCursor {
    pub fn new(rows: Vec<RecordValue>) -> Self {
        Self { rows: rows.into_iter(), closed: false }
    }
}

#[async_trait]
impl super::driver::Cursor for VecCursor {
    async fn next(&mut self) -> Result<Option<RecordValue>> {
        if self.closed {
            return Ok(None);
        }
        Ok(self.rows.next())
    }

    async fn close(&mut self) -> Result<()> {
        self.closed = true;
        Ok(())
    }
}

/// Convenience used by the renderer/tests: a loosely-typed record map
/// keyed by binding name, for callers that want to inspect a row without
/// going through a typed projection.
pub type RecordMap = HashMap<String, Value>;
