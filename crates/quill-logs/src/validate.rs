//! Validation of submitted log records.

use quill_auth::AuthenticatedTenant;

use crate::error::{LogError, Result};
use crate::types::{parse_timestamp, LogRecord, LogRecordPayload};

/// Checks a submitted record and binds it to the authenticated tenant.
///
/// Only presence of the text fields, the timestamp, and the tenant binding
/// are checked. `level` accepts any integer and `stack_trace` is free text.
#[derive(Debug, Clone, Copy, Default)]
pub struct RecordValidator;

impl RecordValidator {
    /// Creates a validator.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Validates a payload submitted by `tenant`.
    ///
    /// The returned record has no identifier; storage assigns one on insert.
    ///
    /// # Errors
    ///
    /// - [`LogError::MissingField`] for the first empty or absent field among
    ///   tenant, system, user, module, task and msg
    /// - [`LogError::InvalidTimestamp`] if the timestamp is absent, not
    ///   RFC 3339, or the zero instant
    /// - [`LogError::TenantMismatch`] if the payload tenant differs from the
    ///   authenticated tenant
    pub fn validate(
        &self,
        payload: LogRecordPayload,
        tenant: &AuthenticatedTenant,
    ) -> Result<LogRecord> {
        let LogRecordPayload {
            tenant: record_tenant,
            system,
            user,
            module,
            task,
            timestamp,
            message,
            level,
            stack_trace,
        } = payload;

        let record_tenant = required("tenant", record_tenant)?;
        let system = required("system", system)?;
        let user = required("user", user)?;
        let module = required("module", module)?;
        let task = required("task", task)?;
        let message = required("msg", message)?;

        let timestamp = timestamp
            .as_deref()
            .and_then(parse_timestamp)
            .ok_or(LogError::InvalidTimestamp)?;

        if record_tenant != tenant.as_str() {
            return Err(LogError::TenantMismatch);
        }

        Ok(LogRecord {
            id: None,
            tenant: record_tenant,
            system,
            user,
            module,
            task,
            timestamp,
            message,
            level: level.unwrap_or(0),
            stack_trace,
        })
    }
}

fn required(field: &'static str, value: Option<String>) -> Result<String> {
    value
        .filter(|v| !v.is_empty())
        .ok_or(LogError::MissingField(field))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use quill_auth::{AuthGate, TenantRegistry};
    use std::sync::Arc;
    use test_case::test_case;

    fn authenticated(tenant: &str) -> AuthenticatedTenant {
        let registry = TenantRegistry::from_entries([(tenant, "key")]).unwrap();
        AuthGate::new(Arc::new(registry))
            .authenticate(Some("Bearer key"), Some(tenant))
            .unwrap()
    }

    fn payload() -> LogRecordPayload {
        LogRecordPayload {
            tenant: Some("cont123".to_string()),
            system: Some("sys456".to_string()),
            user: Some("user789".to_string()),
            module: Some("auth".to_string()),
            task: Some("task101".to_string()),
            timestamp: Some("2025-07-19T12:00:00Z".to_string()),
            message: Some("User logged in".to_string()),
            level: Some(30),
            stack_trace: None,
        }
    }

    #[test]
    fn valid_payload_becomes_record() {
        let record = RecordValidator::new()
            .validate(payload(), &authenticated("cont123"))
            .unwrap();

        assert_eq!(record.id, None);
        assert_eq!(record.tenant, "cont123");
        assert_eq!(record.message, "User logged in");
        assert_eq!(record.level, 30);
        assert_eq!(
            record.timestamp,
            Utc.with_ymd_and_hms(2025, 7, 19, 12, 0, 0).unwrap()
        );
    }

    #[test_case("tenant" ; "tenant")]
    #[test_case("system" ; "system")]
    #[test_case("user" ; "user")]
    #[test_case("module" ; "module")]
    #[test_case("task" ; "task")]
    #[test_case("msg" ; "msg")]
    fn empty_field_is_rejected(field: &'static str) {
        fn with_field(field: &str, value: Option<String>) -> LogRecordPayload {
            let mut p = payload();
            match field {
                "tenant" => p.tenant = value,
                "system" => p.system = value,
                "user" => p.user = value,
                "module" => p.module = value,
                "task" => p.task = value,
                _ => p.message = value,
            }
            p
        }

        let result = RecordValidator::new()
            .validate(with_field(field, Some(String::new())), &authenticated("cont123"));
        assert_eq!(result, Err(LogError::MissingField(field)));

        let result = RecordValidator::new().validate(with_field(field, None), &authenticated("cont123"));
        assert_eq!(result, Err(LogError::MissingField(field)));
    }

    #[test_case(None ; "absent")]
    #[test_case(Some("") ; "empty")]
    #[test_case(Some("not a time") ; "garbage")]
    #[test_case(Some("2025-07-19 12:00:00") ; "missing offset")]
    #[test_case(Some("0001-01-01T00:00:00Z") ; "zero instant")]
    fn bad_timestamp_is_rejected(timestamp: Option<&str>) {
        let mut p = payload();
        p.timestamp = timestamp.map(str::to_string);

        let result = RecordValidator::new().validate(p, &authenticated("cont123"));
        assert_eq!(result, Err(LogError::InvalidTimestamp));
    }

    #[test]
    fn tenant_must_match_authenticated_tenant() {
        let result = RecordValidator::new().validate(payload(), &authenticated("cont456"));
        assert_eq!(result, Err(LogError::TenantMismatch));
    }

    #[test]
    fn missing_fields_reported_before_timestamp() {
        let mut p = payload();
        p.system = None;
        p.timestamp = None;

        let result = RecordValidator::new().validate(p, &authenticated("cont123"));
        assert_eq!(result, Err(LogError::MissingField("system")));
    }

    #[test]
    fn level_and_stack_trace_are_free_form() {
        let mut p = payload();
        p.level = Some(-12_345);
        p.stack_trace = Some(String::new());

        let record = RecordValidator::new()
            .validate(p, &authenticated("cont123"))
            .unwrap();
        assert_eq!(record.level, -12_345);
        assert_eq!(record.stack_trace.as_deref(), Some(""));
    }

    #[test]
    fn absent_level_defaults_to_zero() {
        let mut p = payload();
        p.level = None;

        let record = RecordValidator::new()
            .validate(p, &authenticated("cont123"))
            .unwrap();
        assert_eq!(record.level, 0);
    }
}
