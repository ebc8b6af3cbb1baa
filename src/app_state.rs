// =============================================================================
// Central Application State - Stock Terminal
// =============================================================================
//
// Shared by every request handler via `Arc<AppState>`.  The indicator engine
// itself is stateless; this only carries configuration, the provider client
// and a few counters for the health endpoint.
//
// Thread safety:
//   - Atomic counters for lock-free request tracking.
//   - parking_lot::RwLock around the runtime config.  Handlers copy what
//     they need out of the guard before awaiting.
// =============================================================================

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use anyhow::Result;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;

use crate::runtime_config::RuntimeConfig;
use crate::yahoo::YahooClient;

/// Central application state shared across all handlers.
pub struct AppState {
    pub runtime_config: Arc<RwLock<RuntimeConfig>>,
    pub client: YahooClient,
    pub started_at: DateTime<Utc>,
    requests_served: AtomicU64,
}

impl AppState {
    pub fn new(config: RuntimeConfig) -> Result<Self> {
        let client = YahooClient::new(&config.provider)?;
        Ok(Self {
            runtime_config: Arc::new(RwLock::new(config)),
            client,
            started_at: Utc::now(),
            requests_served: AtomicU64::new(0),
        })
    }

    /// Count one served chart request and return the new total.
    pub fn record_request(&self) -> u64 {
        self.requests_served.fetch_add(1, Ordering::Relaxed) + 1
    }

    pub fn requests_served(&self) -> u64 {
        self.requests_served.load(Ordering::Relaxed)
    }
}
