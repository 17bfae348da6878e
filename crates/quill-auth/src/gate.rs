//! Bearer-credential gate in front of every request.

use std::fmt;
use std::sync::Arc;

use tracing::debug;

use crate::error::{AuthError, Result};
use crate::registry::{TenantId, TenantRegistry, TenantSecret};

/// The standard HTTP Authorization header name.
pub const AUTHORIZATION_HEADER: &str = "Authorization";

/// Scheme prefix for bearer credentials.
pub const BEARER_PREFIX: &str = "Bearer ";

/// Extracts the secret from an `Authorization: Bearer <secret>` value.
///
/// Everything after the prefix is the secret, whitespace included.
///
/// # Errors
///
/// Returns [`AuthError::MissingOrMalformedCredential`] if the value is
/// absent, uses another scheme, or carries an empty secret.
pub fn extract_bearer(authorization: Option<&str>) -> Result<&str> {
    let secret = authorization
        .and_then(|auth| auth.strip_prefix(BEARER_PREFIX))
        .ok_or(AuthError::MissingOrMalformedCredential)?;

    if secret.is_empty() {
        return Err(AuthError::MissingOrMalformedCredential);
    }
    Ok(secret)
}

/// A tenant identity proven by [`AuthGate::authenticate`].
///
/// Only the gate can construct this, so downstream components that take an
/// `&AuthenticatedTenant` can rely on it rather than on client-supplied
/// values.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AuthenticatedTenant(TenantId);

impl AuthenticatedTenant {
    /// Returns the tenant identifier.
    #[must_use]
    pub const fn id(&self) -> &TenantId {
        &self.0
    }

    /// Returns the tenant identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for AuthenticatedTenant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

/// Verifies bearer credentials against the [`TenantRegistry`].
#[derive(Debug, Clone)]
pub struct AuthGate {
    registry: Arc<TenantRegistry>,
    decoy: TenantSecret,
}

impl AuthGate {
    /// Creates a gate over a shared registry.
    #[must_use]
    pub fn new(registry: Arc<TenantRegistry>) -> Self {
        Self {
            registry,
            decoy: TenantSecret::decoy(),
        }
    }

    /// Returns the registry this gate checks against.
    #[must_use]
    pub fn registry(&self) -> &TenantRegistry {
        &self.registry
    }

    /// Authenticates a caller claiming to act as `tenant`.
    ///
    /// Checks run in order: credential scheme, tenant presence, secret.
    ///
    /// # Errors
    ///
    /// - [`AuthError::MissingOrMalformedCredential`] without a bearer credential
    /// - [`AuthError::MissingTenant`] if `tenant` is absent or empty
    /// - [`AuthError::Unauthorized`] if the tenant is unknown or the secret
    ///   does not match
    pub fn authenticate(
        &self,
        authorization: Option<&str>,
        tenant: Option<&str>,
    ) -> Result<AuthenticatedTenant> {
        let presented = extract_bearer(authorization)?;
        let tenant = tenant
            .and_then(TenantId::parse)
            .ok_or(AuthError::MissingTenant)?;

        // Unknown tenants are checked against the decoy so both rejection
        // paths hash and compare.
        let expected = self.registry.lookup(tenant.as_str());
        let matched = expected.unwrap_or(&self.decoy).verify(presented);

        if expected.is_some() && matched {
            debug!(tenant = %tenant, "tenant authenticated");
            Ok(AuthenticatedTenant(tenant))
        } else {
            debug!(tenant = %tenant, "credential rejected");
            Err(AuthError::Unauthorized)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    fn gate() -> AuthGate {
        let registry = TenantRegistry::from_entries([("cont123", "key-a"), ("cont456", "key-b")])
            .expect("registry");
        AuthGate::new(Arc::new(registry))
    }

    #[test_case(Some("Bearer key-a"), Ok("key-a") ; "bearer")]
    #[test_case(Some("Bearer   key-a\t"), Ok("  key-a\t") ; "padding kept")]
    #[test_case(None, Err(AuthError::MissingOrMalformedCredential) ; "absent")]
    #[test_case(Some(""), Err(AuthError::MissingOrMalformedCredential) ; "empty")]
    #[test_case(Some("Bearer "), Err(AuthError::MissingOrMalformedCredential) ; "empty secret")]
    #[test_case(Some("Basic a2V5LWE="), Err(AuthError::MissingOrMalformedCredential) ; "basic scheme")]
    #[test_case(Some("bearer key-a"), Err(AuthError::MissingOrMalformedCredential) ; "lowercase scheme")]
    #[test_case(Some("key-a"), Err(AuthError::MissingOrMalformedCredential) ; "bare secret")]
    fn bearer_extraction(authorization: Option<&str>, expected: Result<&str>) {
        assert_eq!(extract_bearer(authorization), expected);
    }

    #[test]
    fn authenticates_matching_secret() {
        let tenant = gate()
            .authenticate(Some("Bearer key-a"), Some("cont123"))
            .expect("authenticated");
        assert_eq!(tenant.as_str(), "cont123");
        assert_eq!(tenant.to_string(), "cont123");
    }

    #[test_case("Bearer   key-a\t" ; "leading spaces trailing tab")]
    #[test_case("Bearer key-a " ; "trailing space")]
    #[test_case("Bearer  key-a" ; "double space after scheme")]
    fn padded_secret_is_rejected(authorization: &str) {
        let result = gate().authenticate(Some(authorization), Some("cont123"));
        assert_eq!(result, Err(AuthError::Unauthorized));
    }

    #[test]
    fn secret_with_whitespace_matches_only_exactly() {
        let registry = TenantRegistry::from_json(r#"{"cont123":"key "}"#).expect("registry");
        let gate = AuthGate::new(Arc::new(registry));

        let tenant = gate
            .authenticate(Some("Bearer key "), Some("cont123"))
            .expect("authenticated");
        assert_eq!(tenant.as_str(), "cont123");
        assert_eq!(
            gate.authenticate(Some("Bearer key"), Some("cont123")),
            Err(AuthError::Unauthorized)
        );
    }

    #[test]
    fn credential_checked_before_tenant() {
        let result = gate().authenticate(None, None);
        assert_eq!(result, Err(AuthError::MissingOrMalformedCredential));
    }

    #[test_case(None ; "absent")]
    #[test_case(Some("") ; "empty")]
    fn missing_tenant(tenant: Option<&str>) {
        let result = gate().authenticate(Some("Bearer key-a"), tenant);
        assert_eq!(result, Err(AuthError::MissingTenant));
    }

    #[test]
    fn wrong_secret_and_unknown_tenant_are_identical() {
        let gate = gate();
        let wrong_secret = gate.authenticate(Some("Bearer key-b"), Some("cont123"));
        let unknown_tenant = gate.authenticate(Some("Bearer key-a"), Some("nobody"));

        assert_eq!(wrong_secret, Err(AuthError::Unauthorized));
        assert_eq!(unknown_tenant, Err(AuthError::Unauthorized));
        assert_eq!(
            wrong_secret.map_err(|e| e.to_string()),
            unknown_tenant.map_err(|e| e.to_string())
        );
    }

    #[test]
    fn other_tenants_secret_is_rejected() {
        let result = gate().authenticate(Some("Bearer key-b"), Some("cont123"));
        assert_eq!(result, Err(AuthError::Unauthorized));
    }

    #[test]
    fn registry_is_shared_not_copied() {
        let registry = Arc::new(
            TenantRegistry::from_entries([("cont123", "key-a")]).expect("registry"),
        );
        let gate = AuthGate::new(Arc::clone(&registry));
        assert_eq!(Arc::strong_count(&registry), 2);
        assert_eq!(gate.registry().len(), 1);
    }

    mod proptest_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn prop_only_registered_secret_authenticates(presented in "[a-zA-Z0-9-]{1,24}") {
                let result = gate().authenticate(
                    Some(format!("Bearer {presented}").as_str()),
                    Some("cont123"),
                );
                if presented == "key-a" {
                    prop_assert!(result.is_ok());
                } else {
                    prop_assert_eq!(result, Err(AuthError::Unauthorized));
                }
            }
        }
    }
}
