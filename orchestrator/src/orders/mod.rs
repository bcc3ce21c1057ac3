//! Unified order domain
//!
//! - **model**: order/item/event types and status enums
//! - **aggregate**: pure status state machine
//! - **number**: order number candidates
//! - **store**: redb persistence (orders, items, events, indexes)
//! - **manager**: orchestration (intake, dispatch, callbacks, recompute)
//!
//! # Data Flow
//!
//! 1. Intake API hands a validated `NewOrder` to the [`OrderManager`]
//! 2. Order + items are persisted atomically, `UNIFIED_ORDER_CREATED` appended
//! 3. Items are dispatched sequentially; each outcome commits alone
//! 4. Downstream services report progress through the integration endpoint
//! 5. Every commit recomputes the aggregate status and signals the bus

pub mod aggregate;
pub mod manager;
pub mod model;
pub mod number;
pub mod store;

pub use aggregate::aggregate;
pub use manager::{ItemStatusResult, ItemStatusUpdate, NewOrder, NewOrderItem, OrderManager};
pub use model::{
    ItemStatus, ItemType, OrderGraph, OrderStatus, Priority, UnifiedOrder, UnifiedOrderItem,
    WorkflowEvent,
};
pub use store::{OrderStore, StorageError};
