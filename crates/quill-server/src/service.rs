//! Ingestion and retrieval pipelines.
//!
//! Both pipelines start at the [`AuthGate`] and are plain synchronous
//! functions over borrowed request parts, so they can be driven from a
//! blocking thread or directly from tests.

use std::sync::Arc;

use quill_auth::{extract_bearer, AuthGate, TenantRegistry};
use quill_logs::{
    LogBackend, LogRecord, LogRecordPayload, QueryFilterBuilder, QueryParams, RecordId,
    RecordValidator,
};
use tracing::{debug, info, warn};

use crate::error::{ApiError, ApiResult};

/// Borrowed parts of an ingest request.
#[derive(Debug, Clone, Copy)]
pub struct IngestRequest<'a> {
    /// Raw `Authorization` header value
    pub authorization: Option<&'a str>,
    /// Tenant named by the `X-Tenant-Id` header
    pub tenant_header: Option<&'a str>,
    /// JSON body
    pub body: &'a [u8],
}

/// Runs the ingestion and retrieval pipelines against one backend.
pub struct LogService {
    gate: AuthGate,
    validator: RecordValidator,
    backend: Arc<dyn LogBackend>,
}

impl std::fmt::Debug for LogService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LogService")
            .field("gate", &self.gate)
            .finish_non_exhaustive()
    }
}

impl LogService {
    /// Creates a service over a shared registry and backend.
    #[must_use]
    pub fn new(registry: Arc<TenantRegistry>, backend: Arc<dyn LogBackend>) -> Self {
        Self {
            gate: AuthGate::new(registry),
            validator: RecordValidator::new(),
            backend,
        }
    }

    /// Authenticates, validates and stores one record.
    ///
    /// The tenant claim comes from the header when present, otherwise from
    /// the body; either way the body `tenant` must equal the authenticated
    /// tenant. The insert is attempted exactly once.
    ///
    /// # Errors
    ///
    /// - [`ApiError::Auth`] for a missing, malformed or rejected credential,
    ///   or a missing tenant
    /// - [`ApiError::Validation`] for an unreadable body or invalid record
    /// - [`ApiError::Storage`] if the insert fails
    pub fn ingest(&self, request: &IngestRequest<'_>) -> ApiResult<RecordId> {
        extract_bearer(request.authorization)?;

        let payload = LogRecordPayload::from_json(request.body).map_err(|e| {
            debug!(error = %e, "rejected ingest body");
            ApiError::Validation("invalid request body".to_string())
        })?;

        let claimed = request
            .tenant_header
            .filter(|t| !t.is_empty())
            .or(payload.tenant.as_deref());
        let tenant = self.gate.authenticate(request.authorization, claimed)?;

        let record = self.validator.validate(payload, &tenant)?;
        let id = self.backend.insert(&record)?;

        info!(tenant = %tenant, id = %id, "log record saved");
        Ok(id)
    }

    /// Authenticates and runs one filtered read for the caller's tenant.
    ///
    /// Rows that fail to decode are skipped with a warning.
    ///
    /// # Errors
    ///
    /// - [`ApiError::Auth`] for a missing, malformed or rejected credential,
    ///   or a missing `tenant` parameter
    /// - [`ApiError::Validation`] for a malformed time bound
    /// - [`ApiError::Storage`] if the query fails
    pub fn retrieve(
        &self,
        authorization: Option<&str>,
        params: &QueryParams,
    ) -> ApiResult<Vec<LogRecord>> {
        let tenant = self
            .gate
            .authenticate(authorization, params.tenant.as_deref())?;
        let query = QueryFilterBuilder::from_params(&tenant, params)?;

        let rows = self.backend.select(&query)?;
        let records: Vec<LogRecord> = rows
            .into_iter()
            .filter_map(|row| match row.and_then(LogRecord::try_from) {
                Ok(record) => Some(record),
                Err(e) => {
                    warn!(tenant = %tenant, error = %e, "skipping malformed log row");
                    None
                }
            })
            .collect();

        debug!(tenant = %tenant, count = records.len(), "log records retrieved");
        Ok(records)
    }
}
