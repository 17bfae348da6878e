//! Shared state for the log server.

use std::sync::Arc;
use std::time::Instant;

use crate::service::LogService;

/// State shared by every request handler.
#[derive(Debug)]
pub struct AppState {
    /// Ingestion and retrieval pipelines.
    service: Arc<LogService>,
    /// Server start time.
    start_time: Instant,
}

impl AppState {
    /// Creates the state around a service.
    #[must_use]
    pub fn new(service: LogService) -> Self {
        Self {
            service: Arc::new(service),
            start_time: Instant::now(),
        }
    }

    /// Handle to the service, cheap to move onto a blocking thread.
    #[must_use]
    pub fn service(&self) -> Arc<LogService> {
        Arc::clone(&self.service)
    }

    /// Seconds since the server started.
    #[must_use]
    pub fn uptime_secs(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }
}
