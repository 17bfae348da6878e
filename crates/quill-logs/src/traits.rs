//! Traits for log persistence backends.
//!
//! This module provides the [`LogBackend`] trait for abstracting over the
//! storage engine behind ingestion and retrieval (SQLite, in-memory).

use std::sync::Arc;

use crate::error::Result;
use crate::query::LogQuery;
use crate::types::{LogRecord, LogRow, RecordId};

/// Rows produced by one select.
///
/// Each row is decoded on its own; a failed row carries its error so the
/// caller can skip it without losing the rest.
pub type RowSet = Vec<Result<LogRow>>;

/// Trait for log persistence backends.
///
/// Both operations are synchronous and may block; async callers should run
/// them on a blocking thread. Each call is a single statement with no
/// surrounding transaction.
pub trait LogBackend: Send + Sync {
    /// Inserts a validated record and returns the identifier storage assigned.
    ///
    /// Any `id` on the record is ignored.
    ///
    /// # Errors
    ///
    /// Returns [`crate::LogError::Storage`] if the insert fails.
    fn insert(&self, record: &LogRecord) -> Result<RecordId>;

    /// Executes a query, returning matching rows newest first.
    ///
    /// # Errors
    ///
    /// Returns [`crate::LogError::Storage`] if the query itself fails.
    fn select(&self, query: &LogQuery) -> Result<RowSet>;
}

impl<B: LogBackend + ?Sized> LogBackend for Arc<B> {
    fn insert(&self, record: &LogRecord) -> Result<RecordId> {
        (**self).insert(record)
    }

    fn select(&self, query: &LogQuery) -> Result<RowSet> {
        (**self).select(query)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::LogError;
    use crate::query::QueryFilterBuilder;
    use chrono::{TimeZone, Utc};
    use parking_lot::Mutex;
    use quill_auth::{AuthGate, TenantRegistry};

    /// A backend that records calls and always fails selects.
    #[derive(Default)]
    struct RecordingBackend {
        inserted: Mutex<Vec<LogRecord>>,
    }

    impl LogBackend for RecordingBackend {
        fn insert(&self, record: &LogRecord) -> Result<RecordId> {
            let mut inserted = self.inserted.lock();
            inserted.push(record.clone());
            Ok(RecordId(i64::try_from(inserted.len()).unwrap_or(i64::MAX)))
        }

        fn select(&self, _query: &LogQuery) -> Result<RowSet> {
            Err(LogError::Storage("offline".to_string()))
        }
    }

    fn record() -> LogRecord {
        LogRecord {
            id: None,
            tenant: "cont123".to_string(),
            system: "sys456".to_string(),
            user: "user789".to_string(),
            module: "auth".to_string(),
            task: "task101".to_string(),
            timestamp: Utc.with_ymd_and_hms(2025, 7, 19, 12, 0, 0).unwrap(),
            message: "User logged in".to_string(),
            level: 30,
            stack_trace: None,
        }
    }

    #[test]
    fn backend_is_object_safe() {
        let backend: Arc<dyn LogBackend> = Arc::new(RecordingBackend::default());
        assert_eq!(backend.insert(&record()).unwrap(), RecordId(1));
        assert_eq!(backend.insert(&record()).unwrap(), RecordId(2));
    }

    #[test]
    fn arc_forwards_to_inner_backend() {
        let inner = Arc::new(RecordingBackend::default());
        let shared = Arc::clone(&inner);
        shared.insert(&record()).unwrap();

        assert_eq!(inner.inserted.lock().len(), 1);

        let registry = TenantRegistry::from_entries([("cont123", "key")]).unwrap();
        let tenant = AuthGate::new(Arc::new(registry))
            .authenticate(Some("Bearer key"), Some("cont123"))
            .unwrap();
        let query = QueryFilterBuilder::new(&tenant).build();
        assert!(matches!(shared.select(&query), Err(LogError::Storage(_))));
    }
}
