//! Realtime notification layer
//!
//! The orchestrator core only knows the in-process [`NotifyBus`]; the
//! WebSocket transport in [`socket`] is one subscriber among any number.

pub mod bus;
pub mod socket;

pub use bus::{NotifyBus, ORDER_UPDATED_EVENT, OrderUpdate};
