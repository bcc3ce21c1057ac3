//! Server state - shared service handles
//!
//! Cloned into every handler; all inner services are cheap `Arc` clones.

use std::sync::Arc;

use crate::core::Config;
use crate::dispatch::{CapabilityRegistry, DispatchClient};
use crate::orders::{OrderManager, OrderStore};
use crate::realtime::NotifyBus;

/// Shared state for the HTTP API and realtime layer
#[derive(Debug, Clone)]
pub struct ServerState {
    /// Server configuration
    pub config: Config,
    /// Unified order orchestrator
    pub manager: Arc<OrderManager>,
    /// Realtime notification bus
    pub notify: NotifyBus,
}

impl ServerState {
    /// Initialize all services from configuration, opening the database
    /// at `config.db_path`.
    pub fn initialize(config: &Config) -> anyhow::Result<Self> {
        let store = OrderStore::open(&config.db_path)?;
        Self::with_store(config.clone(), store)
    }

    /// Build state around an existing store (tests use the in-memory
    /// backend here).
    pub fn with_store(config: Config, store: OrderStore) -> anyhow::Result<Self> {
        let notify = NotifyBus::new();
        let dispatcher = DispatchClient::new(config.dispatch_timeout_ms, config.portal_name.clone())?;
        let registry = CapabilityRegistry::from_config(&config);
        let manager = Arc::new(OrderManager::new(
            store,
            dispatcher,
            registry,
            notify.clone(),
            &config,
        ));

        Ok(Self {
            config,
            manager,
            notify,
        })
    }
}
