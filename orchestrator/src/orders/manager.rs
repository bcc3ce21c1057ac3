//! OrderManager - unified order orchestration
//!
//! Owns the full lifecycle of a unified order:
//!
//! ```text
//! create_order(input)
//!     ├─ 1. Begin write transaction
//!     ├─ 2. Claim order number (bounded retries on collision)
//!     ├─ 3. Persist order + items (REQUESTED / "PENDING")
//!     ├─ 4. Append UNIFIED_ORDER_CREATED event
//!     ├─ 5. Commit + notify
//!     ├─ 6. Dispatch items sequentially, one transaction per outcome
//!     └─ 7. Return the full order graph
//! ```
//!
//! Dispatch failures are isolated per item: a validation or downstream
//! failure marks that item ERROR and never aborts siblings or the request.
//! Every committed mutation recomputes the aggregate order status inside
//! the same transaction and publishes one realtime signal after commit.

use chrono::Utc;
use serde::Deserialize;
use serde_json::{Value, json};
use uuid::Uuid;

use super::aggregate::aggregate;
use super::model::{
    EVENT_ORDER_CREATED, EVENT_ORDER_STATUS, ItemStatus, ItemType, OrderGraph, OrderStatus,
    PENDING_SERVICE_ORDER_ID, Priority, UnifiedOrder, UnifiedOrderItem, WorkflowEvent,
};
use super::number;
use super::store::{OrderStore, StorageResult};
use crate::core::Config;
use crate::core::error::{AppError, AppResult};
use crate::dispatch::{CapabilityRegistry, DispatchClient, DispatchOutcome, ItemPayload};
use crate::realtime::NotifyBus;

/// Intake shape for one requested sub-order
#[derive(Debug, Clone, Deserialize)]
pub struct NewOrderItem {
    #[serde(rename = "type")]
    pub item_type: ItemType,
    #[serde(default)]
    pub payload: Value,
}

/// Intake shape for a unified order
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewOrder {
    pub patient_id: String,
    pub provider_id: String,
    pub encounter_id: String,
    pub priority: Priority,
    #[serde(default)]
    pub notes: Option<String>,
    pub items: Vec<NewOrderItem>,
}

/// Integration callback shape from downstream services
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemStatusUpdate {
    pub target_service_order_id: String,
    pub item_type: ItemType,
    pub status: ItemStatus,
    #[serde(default)]
    pub metadata: Option<Value>,
}

/// Result of an integration callback
#[derive(Debug, Clone, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemStatusResult {
    pub item: UnifiedOrderItem,
    pub order_status: OrderStatus,
}

/// Unified order orchestrator
#[derive(Debug, Clone)]
pub struct OrderManager {
    store: OrderStore,
    dispatcher: DispatchClient,
    registry: CapabilityRegistry,
    notify: NotifyBus,
    number_prefix: String,
    number_max_attempts: u32,
}

impl OrderManager {
    pub fn new(
        store: OrderStore,
        dispatcher: DispatchClient,
        registry: CapabilityRegistry,
        notify: NotifyBus,
        config: &Config,
    ) -> Self {
        Self {
            store,
            dispatcher,
            registry,
            notify,
            number_prefix: config.order_number_prefix.clone(),
            number_max_attempts: config.order_number_max_attempts.max(1),
        }
    }

    // ========== Intake ==========

    /// Create a unified order and dispatch its items.
    ///
    /// Always succeeds once the order itself is persisted, even when every
    /// dispatch fails; callers inspect per-item status for partial failure.
    pub async fn create_order(&self, input: NewOrder) -> AppResult<OrderGraph> {
        validate_intake(&input)?;

        let order_id = Uuid::new_v4().to_string();
        let now = Utc::now();

        let txn = self.store.begin_write()?;

        let order_number = self.claim_order_number(&txn, &order_id)?;

        let order = UnifiedOrder {
            id: order_id.clone(),
            order_number: order_number.clone(),
            patient_id: input.patient_id.clone(),
            provider_id: input.provider_id.clone(),
            encounter_id: input.encounter_id.clone(),
            priority: input.priority,
            status: OrderStatus::New,
            notes: input.notes.clone(),
            created_at: now,
            updated_at: now,
        };
        self.store.save_order(&txn, &order)?;
        self.store.index_provider(&txn, &order.provider_id, &order_id)?;

        let mut items = Vec::with_capacity(input.items.len());
        let mut item_ids = Vec::with_capacity(input.items.len());
        for requested in &input.items {
            let item = UnifiedOrderItem {
                id: Uuid::new_v4().to_string(),
                unified_order_id: order_id.clone(),
                item_type: requested.item_type,
                status: ItemStatus::Requested,
                target_service_order_id: PENDING_SERVICE_ORDER_ID.to_string(),
                metadata: Value::Null,
                created_at: now,
                updated_at: now,
            };
            self.store.save_item(&txn, &item)?;
            item_ids.push(item.id.clone());
            items.push(item);
        }
        self.store.save_order_item_ids(&txn, &order_id, &item_ids)?;

        self.append_event(
            &txn,
            &order_id,
            EVENT_ORDER_CREATED,
            json!({
                "orderNumber": order_number,
                "patientId": order.patient_id,
                "providerId": order.provider_id,
                "encounterId": order.encounter_id,
                "priority": order.priority,
                "items": items
                    .iter()
                    .map(|i| json!({"itemId": i.id, "itemType": i.item_type}))
                    .collect::<Vec<_>>(),
            }),
        )?;

        txn.commit().map_err(crate::orders::store::StorageError::from)?;
        self.notify.publish(&order_id);

        tracing::info!(
            order_id = %order_id,
            order_number = %order_number,
            items = items.len(),
            "Unified order created"
        );

        // Sequential dispatch keeps the event order deterministic; one
        // item's failure never touches its siblings.
        for (item, requested) in items.iter().zip(&input.items) {
            self.dispatch_item(&order, item, &requested.payload).await?;
        }

        self.get_order_graph(&order_id)
    }

    /// Allocate and claim a unique order number within the creation
    /// transaction, regenerating on conflict up to the configured bound.
    fn claim_order_number(
        &self,
        txn: &redb::WriteTransaction,
        order_id: &str,
    ) -> AppResult<String> {
        for attempt in 0..self.number_max_attempts {
            let candidate = number::candidate(&self.number_prefix);
            if self.store.claim_order_number(txn, &candidate, order_id)? {
                return Ok(candidate);
            }
            tracing::warn!(
                candidate = %candidate,
                attempt = attempt + 1,
                "Order number collision, regenerating"
            );
        }
        Err(AppError::internal(format!(
            "Could not allocate a unique order number after {} attempts",
            self.number_max_attempts
        )))
    }

    // ========== Dispatch ==========

    /// Validate and dispatch one item, recording the outcome on the item.
    async fn dispatch_item(
        &self,
        order: &UnifiedOrder,
        item: &UnifiedOrderItem,
        raw_payload: &Value,
    ) -> AppResult<()> {
        let payload = match ItemPayload::build(item.item_type, order, raw_payload) {
            Ok(payload) => payload,
            Err(shape_err) => {
                tracing::warn!(
                    order_id = %order.id,
                    item_id = %item.id,
                    item_type = %item.item_type,
                    error = %shape_err,
                    "Item payload rejected"
                );
                return self.record_dispatch_failure(&order.id, &item.id, shape_err.to_string());
            }
        };

        let Some(capability) = self.registry.get(item.item_type) else {
            return self.record_dispatch_failure(
                &order.id,
                &item.id,
                format!("No downstream capability registered for {}", item.item_type),
            );
        };

        match self
            .dispatcher
            .dispatch(capability, &order.provider_id, &payload)
            .await
        {
            Ok(outcome) => self.record_dispatch_success(&order.id, &item.id, outcome),
            Err(dispatch_err) => {
                tracing::warn!(
                    order_id = %order.id,
                    item_id = %item.id,
                    item_type = %item.item_type,
                    error = %dispatch_err,
                    "Item dispatch failed"
                );
                self.record_dispatch_failure(&order.id, &item.id, dispatch_err.to_string())
            }
        }
    }

    fn record_dispatch_success(
        &self,
        order_id: &str,
        item_id: &str,
        outcome: DispatchOutcome,
    ) -> AppResult<()> {
        let now = Utc::now();
        let txn = self.store.begin_write()?;

        let mut item = self.store.get_item_txn(&txn, item_id)?;
        item.status = ItemStatus::InProgress;
        item.target_service_order_id = outcome.target_service_order_id.clone();
        item.metadata = outcome.response;
        item.updated_at = now;
        self.store.save_item(&txn, &item)?;
        self.store.index_dispatch(
            &txn,
            &outcome.target_service_order_id,
            item.item_type.event_tag(),
            item_id,
        )?;

        self.append_event(
            &txn,
            order_id,
            &format!("{}_ORDER_SUBMITTED", item.item_type.event_tag()),
            json!({
                "itemId": item.id,
                "status": item.status,
                "targetServiceOrderId": item.target_service_order_id,
            }),
        )?;
        self.recompute_status(&txn, order_id)?;

        txn.commit().map_err(crate::orders::store::StorageError::from)?;
        self.notify.publish(order_id);
        Ok(())
    }

    fn record_dispatch_failure(
        &self,
        order_id: &str,
        item_id: &str,
        reason: String,
    ) -> AppResult<()> {
        let now = Utc::now();
        let txn = self.store.begin_write()?;

        let mut item = self.store.get_item_txn(&txn, item_id)?;
        item.status = ItemStatus::Error;
        item.metadata = json!({"error": reason});
        item.updated_at = now;
        self.store.save_item(&txn, &item)?;

        self.append_event(
            &txn,
            order_id,
            &format!("{}_ORDER_FAILED", item.item_type.event_tag()),
            json!({
                "itemId": item.id,
                "status": item.status,
                "error": reason,
            }),
        )?;
        self.recompute_status(&txn, order_id)?;

        txn.commit().map_err(crate::orders::store::StorageError::from)?;
        self.notify.publish(order_id);
        Ok(())
    }

    // ========== Integration callbacks ==========

    /// Apply a status report from a downstream service.
    ///
    /// The whole read-modify-write runs inside one write transaction; redb
    /// admits a single writer, so concurrent callbacks for sibling items
    /// serialize here instead of losing status updates.
    pub fn apply_item_status(&self, update: ItemStatusUpdate) -> AppResult<ItemStatusResult> {
        let tag = update.item_type.event_tag();
        let now = Utc::now();
        let txn = self.store.begin_write()?;

        let Some(mut item) =
            self.store
                .find_item_by_dispatch_txn(&txn, &update.target_service_order_id, tag)?
        else {
            return Err(AppError::not_found(format!(
                "No {} item for service order {}",
                tag, update.target_service_order_id
            )));
        };

        item.status = update.status;
        if let Some(metadata) = update.metadata {
            item.metadata = metadata;
        }
        item.updated_at = now;
        self.store.save_item(&txn, &item)?;

        let order_id = item.unified_order_id.clone();
        self.append_event(
            &txn,
            &order_id,
            &format!("{}_ORDER_STATUS_UPDATED", tag),
            json!({
                "itemId": item.id,
                "status": item.status,
                "targetServiceOrderId": item.target_service_order_id,
            }),
        )?;
        self.recompute_status(&txn, &order_id)?;
        let order = self.store.get_order_txn(&txn, &order_id)?;

        txn.commit().map_err(crate::orders::store::StorageError::from)?;
        self.notify.publish(&order_id);

        tracing::info!(
            order_id = %order_id,
            item_id = %item.id,
            status = ?item.status,
            "Item status reported by downstream service"
        );

        Ok(ItemStatusResult {
            item,
            order_status: order.status,
        })
    }

    // ========== Queries ==========

    pub fn get_order_graph(&self, order_id: &str) -> AppResult<OrderGraph> {
        let order = self
            .store
            .get_order(order_id)?
            .ok_or_else(|| AppError::not_found(format!("Order {} not found", order_id)))?;
        let items = self.store.get_order_items(order_id)?;
        let events = self.store.get_events_for_order(order_id)?;
        Ok(OrderGraph {
            order,
            items,
            events,
        })
    }

    pub fn list_orders(&self, provider_id: Option<&str>) -> AppResult<Vec<UnifiedOrder>> {
        let orders = match provider_id {
            Some(provider_id) => self.store.list_orders_by_provider(provider_id)?,
            None => self.store.list_all_orders()?,
        };
        Ok(orders)
    }

    // ========== Shared internals ==========

    fn append_event(
        &self,
        txn: &redb::WriteTransaction,
        order_id: &str,
        event_type: &str,
        payload: Value,
    ) -> StorageResult<()> {
        let seq = self.store.next_event_seq(txn, order_id)?;
        self.store.append_event(
            txn,
            &WorkflowEvent {
                id: Uuid::new_v4().to_string(),
                unified_order_id: order_id.to_string(),
                seq,
                event_type: event_type.to_string(),
                payload,
                created_at: Utc::now(),
            },
        )
    }

    /// Recompute the aggregate status from the item multiset; persist and
    /// record a `UNIFIED_ORDER_STATUS` event only on an actual change.
    fn recompute_status(&self, txn: &redb::WriteTransaction, order_id: &str) -> StorageResult<()> {
        let items = self.store.get_order_items_txn(txn, order_id)?;
        let statuses: Vec<ItemStatus> = items.iter().map(|i| i.status).collect();
        let computed = aggregate(&statuses);

        let mut order = self.store.get_order_txn(txn, order_id)?;
        if order.status == computed {
            return Ok(());
        }

        let previous = order.status;
        order.status = computed;
        order.updated_at = Utc::now();
        self.store.save_order(txn, &order)?;

        self.append_event(
            txn,
            order_id,
            EVENT_ORDER_STATUS,
            json!({"previous": previous, "current": computed}),
        )
    }
}

fn validate_intake(input: &NewOrder) -> AppResult<()> {
    for (field, value) in [
        ("patientId", &input.patient_id),
        ("providerId", &input.provider_id),
        ("encounterId", &input.encounter_id),
    ] {
        if value.trim().is_empty() {
            return Err(AppError::validation(format!("{} must not be empty", field)));
        }
    }
    Ok(())
}
