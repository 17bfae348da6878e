//! # quill-logs
//!
//! Tenant log records for the Quill log service.
//!
//! This crate provides:
//!
//! - [`LogRecord`] — A structured event owned by one tenant
//! - [`RecordValidator`] — Required-field, timestamp and tenant-binding checks
//! - [`QueryFilterBuilder`] — Optional parameters to a tenant-scoped [`LogQuery`]
//! - [`LogBackend`] — Abstract insert/select persistence
//! - [`SqliteLogStore`] — SQLite persistence
//! - [`MemoryLogStore`] — In-process persistence
//!
//! ## Example
//!
//! ```rust
//! use std::sync::Arc;
//! use quill_auth::{AuthGate, TenantRegistry};
//! use quill_logs::{
//!     LogBackend, LogRecordPayload, MemoryLogStore, QueryFilterBuilder, QueryParams,
//!     RecordValidator,
//! };
//!
//! let registry = TenantRegistry::from_entries([("cont123", "s3cret")])?;
//! let gate = AuthGate::new(Arc::new(registry));
//! let tenant = gate.authenticate(Some("Bearer s3cret"), Some("cont123"))?;
//!
//! let payload = LogRecordPayload::from_json(br#"{
//!     "tenant": "cont123", "system": "sys456", "user": "user789",
//!     "module": "auth", "task": "task101",
//!     "timestamp": "2025-07-19T12:00:00Z", "msg": "User logged in", "level": 30
//! }"#)?;
//! let record = RecordValidator::new().validate(payload, &tenant)?;
//!
//! let store = MemoryLogStore::new();
//! store.insert(&record)?;
//!
//! let query = QueryFilterBuilder::from_params(&tenant, &QueryParams::default())?;
//! assert_eq!(store.select(&query)?.len(), 1);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod error;
pub mod query;
pub mod sqlite;
pub mod store;
pub mod traits;
pub mod types;
pub mod validate;

// Re-export main types
pub use error::{LogError, Result};
pub use query::{
    BoundValue, Column, Comparison, LogQuery, OrderBy, Page, Predicate, QueryFilterBuilder,
    QueryParams, DEFAULT_LIMIT, DEFAULT_OFFSET,
};
pub use sqlite::SqliteLogStore;
pub use store::MemoryLogStore;
pub use traits::{LogBackend, RowSet};
pub use types::{
    format_timestamp, parse_timestamp, zero_timestamp, LogRecord, LogRecordPayload, LogRow,
    RecordId,
};
pub use validate::RecordValidator;
