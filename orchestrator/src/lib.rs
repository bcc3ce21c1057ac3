//! Unified Clinical Order Orchestrator
//!
//! Accepts a single clinical order spanning multiple independent domains
//! (medication, laboratory, imaging, procedure), fans it out to autonomous
//! downstream services, tracks each sub-order's lifecycle, aggregates a
//! deterministic overall status, keeps an append-only audit trail, and
//! pushes realtime state-change signals to subscribed clients.
//!
//! # Module structure
//!
//! ```text
//! orchestrator/src/
//! ├── core/          # Config, state, server, errors
//! ├── auth/          # Identity context + authorization guard
//! ├── orders/        # Domain model, aggregate, store, manager
//! ├── dispatch/      # Typed payloads, capability registry, HTTP client
//! ├── api/           # HTTP routes and handlers
//! ├── realtime/      # Notify bus + WebSocket fan-out
//! └── utils/         # Logging
//! ```

pub mod api;
pub mod auth;
pub mod core;
pub mod dispatch;
pub mod orders;
pub mod realtime;
pub mod utils;

// Re-export common types
pub use auth::Identity;
pub use core::{AppError, AppResult, Config, Server, ServerState};
pub use orders::{OrderManager, OrderStore};
pub use realtime::{NotifyBus, OrderUpdate};
pub use utils::init_logger;
