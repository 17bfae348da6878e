//! Tenant registry: the immutable tenant-to-secret mapping.
//!
//! This module provides:
//! - [`TenantId`] — Identifier of an isolated log namespace
//! - [`TenantSecret`] — Hashed shared secret, compared in constant time
//! - [`TenantRegistry`] — Read-only lookup table built once at startup

use std::borrow::Borrow;
use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use subtle::ConstantTimeEq;
use tracing::debug;
use zeroize::Zeroize;

use crate::error::{AuthError, Result};

/// Identifier of a tenant. Never empty.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TenantId(String);

impl TenantId {
    /// Parses a tenant identifier, returning `None` for an empty string.
    #[must_use]
    pub fn parse(id: &str) -> Option<Self> {
        if id.is_empty() {
            None
        } else {
            Some(Self(id.to_string()))
        }
    }

    /// Returns the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for TenantId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TenantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A tenant's shared secret, held only as a blake3 digest.
#[derive(Clone)]
pub struct TenantSecret {
    hash: [u8; 32],
}

impl TenantSecret {
    /// Hashes a plaintext secret.
    #[must_use]
    pub fn from_plaintext(secret: &str) -> Self {
        Self {
            hash: *blake3::hash(secret.as_bytes()).as_bytes(),
        }
    }

    /// A digest that no registered secret produces. Used so that lookups of
    /// unknown tenants still run a full comparison.
    pub(crate) const fn decoy() -> Self {
        Self { hash: [0u8; 32] }
    }

    /// Checks a presented secret against this one.
    ///
    /// Both sides are fixed-length digests, so the comparison time does not
    /// depend on the secret length or on where the inputs first differ.
    #[must_use]
    pub fn verify(&self, presented: &str) -> bool {
        let presented = blake3::hash(presented.as_bytes());
        self.hash.ct_eq(presented.as_bytes()).into()
    }
}

impl fmt::Debug for TenantSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TenantSecret")
            .field("hash", &"[REDACTED]")
            .finish()
    }
}

impl PartialEq for TenantSecret {
    fn eq(&self, other: &Self) -> bool {
        self.hash.ct_eq(&other.hash).into()
    }
}

impl Eq for TenantSecret {}

/// Immutable mapping of tenant identifier to expected secret.
///
/// Built once from configuration and shared read-only (typically behind an
/// `Arc`) by every request. There is no insertion or removal after
/// construction.
#[derive(Debug, Clone, Default)]
pub struct TenantRegistry {
    secrets: HashMap<TenantId, TenantSecret>,
}

impl TenantRegistry {
    /// Builds a registry from `(tenant, secret)` pairs.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::InvalidRegistry`] if a tenant name or secret is
    /// empty, or a tenant appears twice.
    pub fn from_entries<I, K, V>(entries: I) -> Result<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut secrets = HashMap::new();
        for (tenant, secret) in entries {
            let tenant = tenant.as_ref();
            let id = TenantId::parse(tenant).ok_or_else(|| AuthError::InvalidRegistry {
                reason: "empty tenant identifier".to_string(),
            })?;
            if secret.as_ref().is_empty() {
                return Err(AuthError::InvalidRegistry {
                    reason: format!("empty secret for tenant {tenant}"),
                });
            }
            if secrets
                .insert(id, TenantSecret::from_plaintext(secret.as_ref()))
                .is_some()
            {
                return Err(AuthError::InvalidRegistry {
                    reason: format!("duplicate tenant {tenant}"),
                });
            }
        }
        debug!(tenants = secrets.len(), "tenant registry built");
        Ok(Self { secrets })
    }

    /// Builds a registry from a JSON object such as
    /// `{"cont123": "secret-a", "cont456": "secret-b"}`.
    ///
    /// The parsed plaintext secrets are zeroized once hashed.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::InvalidRegistry`] if the input is not a JSON
    /// object of strings, is empty, or contains an invalid entry.
    pub fn from_json(raw: &str) -> Result<Self> {
        let mut parsed: HashMap<String, String> =
            serde_json::from_str(raw).map_err(|e| AuthError::InvalidRegistry {
                reason: format!("expected a JSON object of tenant to secret: {e}"),
            })?;
        let registry = Self::from_entries(parsed.iter());
        for secret in parsed.values_mut() {
            secret.zeroize();
        }
        let registry = registry?;
        if registry.is_empty() {
            return Err(AuthError::InvalidRegistry {
                reason: "no tenants configured".to_string(),
            });
        }
        Ok(registry)
    }

    /// Looks up the expected secret for a tenant.
    #[must_use]
    pub fn lookup(&self, tenant: &str) -> Option<&TenantSecret> {
        self.secrets.get(tenant)
    }

    /// Returns the number of registered tenants.
    #[must_use]
    pub fn len(&self) -> usize {
        self.secrets.len()
    }

    /// Returns true if no tenants are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.secrets.is_empty()
    }
}
