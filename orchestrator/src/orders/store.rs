//! redb-based storage for unified orders
//!
//! # Tables
//!
//! | Table | Key | Value | Purpose |
//! |-------|-----|-------|---------|
//! | `orders` | `order_id` | `UnifiedOrder` | Order records |
//! | `order_items` | `item_id` | `UnifiedOrderItem` | Item records |
//! | `order_item_ids` | `order_id` | `Vec<item_id>` | Items per order, creation order |
//! | `provider_orders` | `provider_id -> order_id` | multimap | Ownership index for listing |
//! | `events` | `(order_id, seq)` | `WorkflowEvent` | Audit trail (append-only) |
//! | `event_seq` | `order_id` | `u64` | Per-order sequence counter |
//! | `order_numbers` | `order_number` | `order_id` | Uniqueness constraint |
//! | `dispatch_index` | `(target_service_order_id, item_type)` | `item_id` | Callback lookup |
//!
//! # Concurrency
//!
//! redb allows exactly one write transaction at a time. Every mutation of an
//! order graph (item update + status recompute + event append) happens inside
//! a single write transaction, so concurrent integration callbacks for
//! sibling items of the same order cannot lose updates on the
//! read-modify-write of `UnifiedOrder.status`.

use redb::{
    Database, MultimapTableDefinition, ReadableDatabase, ReadableTable, TableDefinition,
    WriteTransaction,
};
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;

use super::model::{UnifiedOrder, UnifiedOrderItem, WorkflowEvent};

/// Table for orders: key = order_id, value = JSON-serialized UnifiedOrder
const ORDERS_TABLE: TableDefinition<&str, &[u8]> = TableDefinition::new("orders");

/// Table for items: key = item_id, value = JSON-serialized UnifiedOrderItem
const ITEMS_TABLE: TableDefinition<&str, &[u8]> = TableDefinition::new("order_items");

/// Table for per-order item lists: key = order_id, value = JSON Vec<item_id>
const ORDER_ITEM_IDS_TABLE: TableDefinition<&str, &[u8]> = TableDefinition::new("order_item_ids");

/// Ownership index: provider_id -> order_ids
const PROVIDER_ORDERS_TABLE: MultimapTableDefinition<&str, &str> =
    MultimapTableDefinition::new("provider_orders");

/// Table for events: key = (order_id, seq), value = JSON-serialized WorkflowEvent
const EVENTS_TABLE: TableDefinition<(&str, u64), &[u8]> = TableDefinition::new("events");

/// Table for per-order event sequence counters: key = order_id, value = last seq
const EVENT_SEQ_TABLE: TableDefinition<&str, u64> = TableDefinition::new("event_seq");

/// Uniqueness constraint for order numbers: key = order_number, value = order_id
const ORDER_NUMBERS_TABLE: TableDefinition<&str, &str> = TableDefinition::new("order_numbers");

/// Callback lookup: key = (target_service_order_id, item_type tag), value = item_id
const DISPATCH_INDEX_TABLE: TableDefinition<(&str, &str), &str> =
    TableDefinition::new("dispatch_index");

/// Storage errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(#[from] redb::DatabaseError),

    #[error("Transaction error: {0}")]
    Transaction(#[from] redb::TransactionError),

    #[error("Table error: {0}")]
    Table(#[from] redb::TableError),

    #[error("Storage error: {0}")]
    Storage(#[from] redb::StorageError),

    #[error("Commit error: {0}")]
    Commit(#[from] redb::CommitError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Order not found: {0}")]
    OrderNotFound(String),

    #[error("Order item not found: {0}")]
    ItemNotFound(String),
}

pub type StorageResult<T> = Result<T, StorageError>;

/// Unified order storage backed by redb
#[derive(Clone)]
pub struct OrderStore {
    db: Arc<Database>,
}

impl OrderStore {
    /// Open or create the database at the given path
    pub fn open(path: impl AsRef<Path>) -> StorageResult<Self> {
        let db = Database::create(path)?;
        let store = Self { db: Arc::new(db) };
        store.init_tables()?;
        Ok(store)
    }

    /// Open an in-memory database (tests and ephemeral deployments)
    pub fn open_in_memory() -> StorageResult<Self> {
        let db = Database::builder().create_with_backend(redb::backends::InMemoryBackend::new())?;
        let store = Self { db: Arc::new(db) };
        store.init_tables()?;
        Ok(store)
    }

    fn init_tables(&self) -> StorageResult<()> {
        let write_txn = self.db.begin_write()?;
        {
            let _ = write_txn.open_table(ORDERS_TABLE)?;
            let _ = write_txn.open_table(ITEMS_TABLE)?;
            let _ = write_txn.open_table(ORDER_ITEM_IDS_TABLE)?;
            let _ = write_txn.open_multimap_table(PROVIDER_ORDERS_TABLE)?;
            let _ = write_txn.open_table(EVENTS_TABLE)?;
            let _ = write_txn.open_table(EVENT_SEQ_TABLE)?;
            let _ = write_txn.open_table(ORDER_NUMBERS_TABLE)?;
            let _ = write_txn.open_table(DISPATCH_INDEX_TABLE)?;
        }
        write_txn.commit()?;
        Ok(())
    }

    /// Begin a write transaction
    pub fn begin_write(&self) -> StorageResult<WriteTransaction> {
        Ok(self.db.begin_write()?)
    }

    // ========== Order Number Constraint ==========

    /// Claim an order number for an order.
    ///
    /// Returns `false` when the number is already taken. The check and the
    /// insert are atomic because they run inside the single active write
    /// transaction; there is no check-then-create window.
    pub fn claim_order_number(
        &self,
        txn: &WriteTransaction,
        order_number: &str,
        order_id: &str,
    ) -> StorageResult<bool> {
        let mut table = txn.open_table(ORDER_NUMBERS_TABLE)?;
        if table.get(order_number)?.is_some() {
            return Ok(false);
        }
        table.insert(order_number, order_id)?;
        Ok(true)
    }

    // ========== Order Operations ==========

    /// Insert or overwrite an order record (within transaction)
    pub fn save_order(&self, txn: &WriteTransaction, order: &UnifiedOrder) -> StorageResult<()> {
        let mut table = txn.open_table(ORDERS_TABLE)?;
        let value = serde_json::to_vec(order)?;
        table.insert(order.id.as_str(), value.as_slice())?;
        Ok(())
    }

    /// Load an order within a write transaction (sees uncommitted writes)
    pub fn get_order_txn(
        &self,
        txn: &WriteTransaction,
        order_id: &str,
    ) -> StorageResult<UnifiedOrder> {
        let table = txn.open_table(ORDERS_TABLE)?;
        let guard = table
            .get(order_id)?
            .ok_or_else(|| StorageError::OrderNotFound(order_id.to_string()))?;
        Ok(serde_json::from_slice(guard.value())?)
    }

    /// Load an order (read-only)
    pub fn get_order(&self, order_id: &str) -> StorageResult<Option<UnifiedOrder>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(ORDERS_TABLE)?;
        match table.get(order_id)? {
            Some(guard) => Ok(Some(serde_json::from_slice(guard.value())?)),
            None => Ok(None),
        }
    }

    /// Record ownership for provider-scoped listing (within transaction)
    pub fn index_provider(
        &self,
        txn: &WriteTransaction,
        provider_id: &str,
        order_id: &str,
    ) -> StorageResult<()> {
        let mut table = txn.open_multimap_table(PROVIDER_ORDERS_TABLE)?;
        table.insert(provider_id, order_id)?;
        Ok(())
    }

    /// List orders owned by a provider, newest first
    pub fn list_orders_by_provider(&self, provider_id: &str) -> StorageResult<Vec<UnifiedOrder>> {
        let read_txn = self.db.begin_read()?;
        let index = read_txn.open_multimap_table(PROVIDER_ORDERS_TABLE)?;
        let orders_table = read_txn.open_table(ORDERS_TABLE)?;

        let mut orders = Vec::new();
        for result in index.get(provider_id)? {
            let guard = result?;
            if let Some(value) = orders_table.get(guard.value())? {
                orders.push(serde_json::from_slice::<UnifiedOrder>(value.value())?);
            }
        }
        orders.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(orders)
    }

    /// List every order (bypass roles), newest first
    pub fn list_all_orders(&self) -> StorageResult<Vec<UnifiedOrder>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(ORDERS_TABLE)?;

        let mut orders = Vec::new();
        for result in table.iter()? {
            let (_key, value) = result?;
            orders.push(serde_json::from_slice::<UnifiedOrder>(value.value())?);
        }
        orders.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(orders)
    }

    // ========== Item Operations ==========

    /// Insert or overwrite an item record (within transaction)
    pub fn save_item(&self, txn: &WriteTransaction, item: &UnifiedOrderItem) -> StorageResult<()> {
        let mut table = txn.open_table(ITEMS_TABLE)?;
        let value = serde_json::to_vec(item)?;
        table.insert(item.id.as_str(), value.as_slice())?;
        Ok(())
    }

    /// Persist the per-order item id list (within transaction)
    pub fn save_order_item_ids(
        &self,
        txn: &WriteTransaction,
        order_id: &str,
        item_ids: &[String],
    ) -> StorageResult<()> {
        let mut table = txn.open_table(ORDER_ITEM_IDS_TABLE)?;
        let value = serde_json::to_vec(item_ids)?;
        table.insert(order_id, value.as_slice())?;
        Ok(())
    }

    /// Load an item within a write transaction
    pub fn get_item_txn(
        &self,
        txn: &WriteTransaction,
        item_id: &str,
    ) -> StorageResult<UnifiedOrderItem> {
        let table = txn.open_table(ITEMS_TABLE)?;
        let guard = table
            .get(item_id)?
            .ok_or_else(|| StorageError::ItemNotFound(item_id.to_string()))?;
        Ok(serde_json::from_slice(guard.value())?)
    }

    /// Load all items of an order, creation order (within transaction)
    pub fn get_order_items_txn(
        &self,
        txn: &WriteTransaction,
        order_id: &str,
    ) -> StorageResult<Vec<UnifiedOrderItem>> {
        let ids_table = txn.open_table(ORDER_ITEM_IDS_TABLE)?;
        let item_ids: Vec<String> = match ids_table.get(order_id)? {
            Some(guard) => serde_json::from_slice(guard.value())?,
            None => Vec::new(),
        };
        drop(ids_table);

        let items_table = txn.open_table(ITEMS_TABLE)?;
        let mut items = Vec::with_capacity(item_ids.len());
        for item_id in &item_ids {
            let guard = items_table
                .get(item_id.as_str())?
                .ok_or_else(|| StorageError::ItemNotFound(item_id.clone()))?;
            items.push(serde_json::from_slice(guard.value())?);
        }
        Ok(items)
    }

    /// Load all items of an order, creation order (read-only)
    pub fn get_order_items(&self, order_id: &str) -> StorageResult<Vec<UnifiedOrderItem>> {
        let read_txn = self.db.begin_read()?;

        let ids_table = read_txn.open_table(ORDER_ITEM_IDS_TABLE)?;
        let item_ids: Vec<String> = match ids_table.get(order_id)? {
            Some(guard) => serde_json::from_slice(guard.value())?,
            None => Vec::new(),
        };

        let items_table = read_txn.open_table(ITEMS_TABLE)?;
        let mut items = Vec::with_capacity(item_ids.len());
        for item_id in &item_ids {
            let guard = items_table
                .get(item_id.as_str())?
                .ok_or_else(|| StorageError::ItemNotFound(item_id.clone()))?;
            items.push(serde_json::from_slice(guard.value())?);
        }
        Ok(items)
    }

    // ========== Dispatch Index ==========

    /// Register the downstream id assigned to an item (within transaction)
    pub fn index_dispatch(
        &self,
        txn: &WriteTransaction,
        target_service_order_id: &str,
        item_type_tag: &str,
        item_id: &str,
    ) -> StorageResult<()> {
        let mut table = txn.open_table(DISPATCH_INDEX_TABLE)?;
        table.insert((target_service_order_id, item_type_tag), item_id)?;
        Ok(())
    }

    /// Resolve an item from a downstream callback key (within transaction)
    pub fn find_item_by_dispatch_txn(
        &self,
        txn: &WriteTransaction,
        target_service_order_id: &str,
        item_type_tag: &str,
    ) -> StorageResult<Option<UnifiedOrderItem>> {
        let index = txn.open_table(DISPATCH_INDEX_TABLE)?;
        let item_id = match index.get((target_service_order_id, item_type_tag))? {
            Some(guard) => guard.value().to_string(),
            None => return Ok(None),
        };
        drop(index);
        Ok(Some(self.get_item_txn(txn, &item_id)?))
    }

    // ========== Event Operations ==========

    /// Allocate the next per-order event sequence number (within transaction)
    pub fn next_event_seq(&self, txn: &WriteTransaction, order_id: &str) -> StorageResult<u64> {
        let mut table = txn.open_table(EVENT_SEQ_TABLE)?;
        let current = table.get(order_id)?.map(|g| g.value()).unwrap_or(0);
        let next = current + 1;
        table.insert(order_id, next)?;
        Ok(next)
    }

    /// Append a workflow event (within transaction). Events are never
    /// mutated or deleted.
    pub fn append_event(&self, txn: &WriteTransaction, event: &WorkflowEvent) -> StorageResult<()> {
        let mut table = txn.open_table(EVENTS_TABLE)?;
        let key = (event.unified_order_id.as_str(), event.seq);
        let value = serde_json::to_vec(event)?;
        table.insert(key, value.as_slice())?;
        Ok(())
    }

    /// Get all events for an order in sequence order
    pub fn get_events_for_order(&self, order_id: &str) -> StorageResult<Vec<WorkflowEvent>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(EVENTS_TABLE)?;

        let mut events = Vec::new();
        let range_start = (order_id, 0u64);
        let range_end = (order_id, u64::MAX);

        for result in table.range(range_start..=range_end)? {
            let (_key, value) = result?;
            let event: WorkflowEvent = serde_json::from_slice(value.value())?;
            events.push(event);
        }

        events.sort_by_key(|e| e.seq);
        Ok(events)
    }
}

impl std::fmt::Debug for OrderStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OrderStore").finish()
    }
}
