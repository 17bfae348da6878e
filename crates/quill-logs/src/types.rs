//! Core types for tenant log records.
//!
//! This module provides:
//! - [`RecordId`] — Storage-assigned identifier
//! - [`LogRecord`] — A validated or stored log record
//! - [`LogRecordPayload`] — The unvalidated ingest body
//! - [`LogRow`] — The untyped shape a backend returns for one stored row

use std::fmt;

use chrono::{DateTime, SecondsFormat, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::error::LogError;

/// Identifier assigned by storage on insert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(pub i64);

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A structured log event scoped to one tenant.
///
/// `id` is `None` for records that have not been persisted and always `Some`
/// for records read back from storage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogRecord {
    /// Storage-assigned identifier
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<RecordId>,
    /// Owning tenant
    pub tenant: String,
    /// Originating system
    pub system: String,
    /// Acting user
    pub user: String,
    /// Module within the system
    pub module: String,
    /// Task being performed
    pub task: String,
    /// When the event happened
    pub timestamp: DateTime<Utc>,
    /// Free-text message
    #[serde(rename = "msg")]
    pub message: String,
    /// Severity code; any integer is accepted
    pub level: i64,
    /// Optional stack trace
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stack_trace: Option<String>,
}

/// An ingest body as submitted, before validation.
///
/// Every field is optional here so that absent fields surface as validation
/// errors rather than JSON errors. A client-supplied `id` is ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct LogRecordPayload {
    /// Tenant the record claims to belong to
    #[serde(default)]
    pub tenant: Option<String>,
    /// Originating system
    #[serde(default)]
    pub system: Option<String>,
    /// Acting user
    #[serde(default)]
    pub user: Option<String>,
    /// Module within the system
    #[serde(default)]
    pub module: Option<String>,
    /// Task being performed
    #[serde(default)]
    pub task: Option<String>,
    /// RFC 3339 timestamp
    #[serde(default)]
    pub timestamp: Option<String>,
    /// Free-text message
    #[serde(default, rename = "msg")]
    pub message: Option<String>,
    /// Severity code, 0 when absent
    #[serde(default)]
    pub level: Option<i64>,
    /// Optional stack trace
    #[serde(default)]
    pub stack_trace: Option<String>,
}

impl LogRecordPayload {
    /// Parses an ingest body.
    ///
    /// # Errors
    ///
    /// Returns the JSON error if the body is not an object with the expected
    /// field types. Arrays are rejected even though a derived struct
    /// deserializer would fill fields from them by position.
    pub fn from_json(body: &[u8]) -> serde_json::Result<Self> {
        match serde_json::from_slice::<serde_json::Value>(body)? {
            value @ serde_json::Value::Object(_) => serde_json::from_value(value),
            _ => Err(serde::de::Error::custom("expected a JSON object")),
        }
    }
}

/// One stored row as read from a backend, before decoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogRow {
    /// Storage-assigned identifier
    pub id: i64,
    /// Owning tenant
    pub tenant: String,
    /// Originating system
    pub system: String,
    /// Acting user
    pub user: String,
    /// Module within the system
    pub module: String,
    /// Task being performed
    pub task: String,
    /// Timestamp in storage form, see [`format_timestamp`]
    pub timestamp: String,
    /// Free-text message
    pub message: String,
    /// Severity code
    pub level: i64,
    /// Optional stack trace
    pub stack_trace: Option<String>,
}

impl LogRow {
    /// Builds the stored form of a record under the given identifier.
    #[must_use]
    pub fn from_record(id: RecordId, record: &LogRecord) -> Self {
        Self {
            id: id.0,
            tenant: record.tenant.clone(),
            system: record.system.clone(),
            user: record.user.clone(),
            module: record.module.clone(),
            task: record.task.clone(),
            timestamp: format_timestamp(record.timestamp),
            message: record.message.clone(),
            level: record.level,
            stack_trace: record.stack_trace.clone(),
        }
    }
}

impl TryFrom<LogRow> for LogRecord {
    type Error = LogError;

    fn try_from(row: LogRow) -> Result<Self, Self::Error> {
        let timestamp = DateTime::parse_from_rfc3339(&row.timestamp)
            .map_err(|e| LogError::RowDecode(format!("row {}: timestamp: {e}", row.id)))?
            .with_timezone(&Utc);

        Ok(Self {
            id: Some(RecordId(row.id)),
            tenant: row.tenant,
            system: row.system,
            user: row.user,
            module: row.module,
            task: row.task,
            timestamp,
            message: row.message,
            level: row.level,
            stack_trace: row.stack_trace,
        })
    }
}

/// The unset instant, `0001-01-01T00:00:00Z`. Never a valid record time.
#[must_use]
pub fn zero_timestamp() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(1, 1, 1, 0, 0, 0)
        .single()
        .unwrap_or(DateTime::<Utc>::MIN_UTC)
}

/// Parses an RFC 3339 timestamp into UTC.
///
/// Returns `None` for unparsable input and for the zero instant.
#[must_use]
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let parsed = DateTime::parse_from_rfc3339(raw.trim()).ok()?.with_timezone(&Utc);
    (parsed != zero_timestamp()).then_some(parsed)
}

/// Renders a timestamp in the fixed-width storage form
/// (`YYYY-MM-DDTHH:MM:SS.nnnnnnnnnZ`).
///
/// Every stored timestamp uses this form, so comparing two of them as text
/// gives the same answer as comparing them as instants.
#[must_use]
pub fn format_timestamp(timestamp: DateTime<Utc>) -> String {
    timestamp.to_rfc3339_opts(SecondsFormat::Nanos, true)
}
