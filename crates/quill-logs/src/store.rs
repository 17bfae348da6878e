//! In-memory log backend.
//!
//! [`MemoryLogStore`] evaluates [`LogQuery`] predicates in process with the
//! same semantics as the SQL backend. It keeps nothing on disk.

use std::sync::atomic::{AtomicI64, Ordering};

use parking_lot::RwLock;
use tracing::trace;

use crate::error::{LogError, Result};
use crate::query::LogQuery;
use crate::traits::{LogBackend, RowSet};
use crate::types::{LogRecord, LogRow, RecordId};

/// Thread-safe in-memory log backend.
#[derive(Debug)]
pub struct MemoryLogStore {
    /// Stored rows, in insertion order
    rows: RwLock<Vec<LogRow>>,
    /// Next identifier to assign
    next_id: AtomicI64,
}

impl Default for MemoryLogStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryLogStore {
    /// Creates an empty store. Identifiers start at 1.
    #[must_use]
    pub fn new() -> Self {
        Self {
            rows: RwLock::new(Vec::new()),
            next_id: AtomicI64::new(1),
        }
    }

    /// Stores a raw row as-is, bypassing validation.
    ///
    /// The row's `id` is replaced with a freshly assigned one.
    pub fn insert_row(&self, mut row: LogRow) -> RecordId {
        let id = RecordId(self.next_id.fetch_add(1, Ordering::Relaxed));
        row.id = id.0;
        self.rows.write().push(row);
        id
    }

    /// Number of stored rows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.read().len()
    }

    /// Returns true if nothing has been stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.read().is_empty()
    }
}

impl LogBackend for MemoryLogStore {
    fn insert(&self, record: &LogRecord) -> Result<RecordId> {
        let id = RecordId(self.next_id.fetch_add(1, Ordering::Relaxed));
        if id.0 <= 0 {
            return Err(LogError::Storage("record identifiers exhausted".to_string()));
        }
        self.rows.write().push(LogRow::from_record(id, record));
        trace!(id = %id, tenant = %record.tenant, "stored log record in memory");
        Ok(id)
    }

    fn select(&self, query: &LogQuery) -> Result<RowSet> {
        let mut matched: Vec<LogRow> = {
            let rows = self.rows.read();
            rows.iter().filter(|row| query.matches(row)).cloned().collect()
        };

        let order = query.order();
        matched.sort_by(|a, b| order.compare(a, b));

        Ok(query.page().apply(matched.into_iter()).map(Ok).collect())
    }
}
