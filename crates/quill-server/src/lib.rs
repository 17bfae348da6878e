//! # quill-server
//!
//! HTTP front end for the Quill multi-tenant log service.
//!
//! This crate provides:
//!
//! - [`LogService`] — Ingestion and retrieval pipelines behind the auth gate
//! - [`LogServer`] — axum server exposing `POST /logdata` and `GET /getdata`
//! - [`ServerConfig`] — Command-line and environment configuration
//! - [`ApiError`] — Error taxonomy mapped to JSON responses
//!
//! ## Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | POST | `/logdata` | Store one record for the authenticated tenant |
//! | GET | `/getdata` | Filtered, paginated records, newest first |
//! | GET | `/health` | Liveness probe |
//!
//! Both log endpoints require `Authorization: Bearer <tenant secret>`.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod config;
pub mod error;
pub mod handlers;
pub mod routes;
pub mod server;
pub mod service;
pub mod state;

pub use config::{Cli, LogFormat, ServerConfig, DEFAULT_PORT};
pub use error::{ApiError, ApiResult, ServerError};
pub use routes::{create_router, MAX_BODY_BYTES};
pub use server::LogServer;
pub use service::{IngestRequest, LogService};
pub use state::AppState;
