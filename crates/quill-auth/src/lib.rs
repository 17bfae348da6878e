//! # quill-auth
//!
//! Tenant authentication for the Quill log service.
//!
//! This crate provides:
//!
//! - [`TenantRegistry`] — Immutable tenant-to-secret mapping built at startup
//! - [`AuthGate`] — Bearer-credential check yielding an [`AuthenticatedTenant`]
//! - [`AuthError`] — Credential and tenant failures
//!
//! ## Example
//!
//! ```rust
//! use std::sync::Arc;
//! use quill_auth::{AuthGate, TenantRegistry};
//!
//! let registry = TenantRegistry::from_json(r#"{"cont123": "s3cret"}"#)?;
//! let gate = AuthGate::new(Arc::new(registry));
//!
//! let tenant = gate.authenticate(Some("Bearer s3cret"), Some("cont123"))?;
//! assert_eq!(tenant.as_str(), "cont123");
//!
//! assert!(gate.authenticate(Some("Bearer wrong"), Some("cont123")).is_err());
//! # Ok::<(), quill_auth::AuthError>(())
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod error;
pub mod gate;
pub mod registry;

pub use error::{AuthError, Result};
pub use gate::{extract_bearer, AuthGate, AuthenticatedTenant, AUTHORIZATION_HEADER, BEARER_PREFIX};
pub use registry::{TenantId, TenantRegistry, TenantSecret};
