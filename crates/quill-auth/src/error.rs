//! Error types for tenant authentication.

use thiserror::Error;

/// Errors produced while building the tenant registry or authenticating a request.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    /// The Authorization value is absent or does not use the bearer scheme.
    #[error("invalid or missing authorization header")]
    MissingOrMalformedCredential,

    /// The request did not name a tenant.
    #[error("tenant identifier required")]
    MissingTenant,

    /// Unknown tenant or wrong secret; both map to this one variant.
    #[error("unauthorized: invalid secret key for tenant")]
    Unauthorized,

    /// The tenant-to-secret mapping supplied at startup is unusable.
    #[error("invalid tenant registry: {reason}")]
    InvalidRegistry {
        /// Why the mapping was rejected.
        reason: String,
    },
}

impl AuthError {
    /// Returns true for failures caused by a malformed request rather than a
    /// bad credential.
    #[must_use]
    pub const fn is_validation(&self) -> bool {
        matches!(self, Self::MissingTenant)
    }
}

/// Result type alias for auth operations.
pub type Result<T> = std::result::Result<T, AuthError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_formats_correctly() {
        assert_eq!(
            AuthError::MissingOrMalformedCredential.to_string(),
            "invalid or missing authorization header"
        );
        assert_eq!(
            AuthError::MissingTenant.to_string(),
            "tenant identifier required"
        );
        assert_eq!(
            AuthError::Unauthorized.to_string(),
            "unauthorized: invalid secret key for tenant"
        );

        let err = AuthError::InvalidRegistry {
            reason: "empty secret for tenant cont123".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "invalid tenant registry: empty secret for tenant cont123"
        );
    }

    #[test]
    fn only_missing_tenant_is_validation() {
        assert!(AuthError::MissingTenant.is_validation());
        assert!(!AuthError::Unauthorized.is_validation());
        assert!(!AuthError::MissingOrMalformedCredential.is_validation());
    }

    #[test]
    fn error_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<AuthError>();
    }
}
