//! Unified order domain model
//!
//! A unified order is a single provider-initiated request that fans out into
//! one or more domain-specific sub-orders (items). The order status is never
//! stored independently of its items: it is always recomputed from the item
//! status multiset (see [`super::aggregate`]).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Placeholder value for `target_service_order_id` until the first
/// successful dispatch assigns the downstream id.
pub const PENDING_SERVICE_ORDER_ID: &str = "PENDING";

/// Clinical priority of a unified order
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Priority {
    #[default]
    Routine,
    Urgent,
    Stat,
}

/// Aggregate status of a unified order
///
/// Derived exclusively from item statuses; the only value ever assigned
/// directly is the initial `New` before any item exists.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    #[default]
    New,
    PartiallyFulfilled,
    Completed,
}

/// Lifecycle status of a single item (sub-order)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ItemStatus {
    #[default]
    Requested,
    InProgress,
    Completed,
    Error,
}

/// Closed set of clinical domains an item can belong to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ItemType {
    Pharmacy,
    Lab,
    Radiology,
    Procedure,
}

impl ItemType {
    /// Tag used in workflow event type names, e.g. `LAB_ORDER_SUBMITTED`
    pub fn event_tag(&self) -> &'static str {
        match self {
            ItemType::Pharmacy => "PHARMACY",
            ItemType::Lab => "LAB",
            ItemType::Radiology => "RADIOLOGY",
            ItemType::Procedure => "PROCEDURE",
        }
    }

    /// Downstream role the dispatcher impersonates for this domain
    pub fn dispatch_role(&self) -> Option<&'static str> {
        match self {
            ItemType::Pharmacy => Some("PHARMACIST"),
            ItemType::Lab => Some("LAB_TECH"),
            ItemType::Radiology => Some("RADIOLOGIST"),
            ItemType::Procedure => None,
        }
    }
}

impl std::fmt::Display for ItemType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.event_tag())
    }
}

/// A provider-initiated order spanning multiple clinical domains
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnifiedOrder {
    pub id: String,
    /// Human-readable identifier, globally unique, immutable once assigned
    pub order_number: String,
    pub patient_id: String,
    pub provider_id: String,
    pub encounter_id: String,
    pub priority: Priority,
    pub status: OrderStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// One domain-specific sub-order within a unified order
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnifiedOrderItem {
    pub id: String,
    pub unified_order_id: String,
    pub item_type: ItemType,
    pub status: ItemStatus,
    /// `"PENDING"` until a downstream call succeeds, then set exactly once
    pub target_service_order_id: String,
    /// Opaque snapshot of the last known downstream response or error detail
    pub metadata: serde_json::Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Append-only audit record for one unified order
///
/// The ordered event sequence for an order is its full audit trail and is
/// sufficient to reconstruct the final order status by replay.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowEvent {
    pub id: String,
    pub unified_order_id: String,
    /// Per-order sequence number, the authoritative ordering for replay
    pub seq: u64,
    pub event_type: String,
    pub payload: serde_json::Value,
    pub created_at: DateTime<Utc>,
}

/// Full order graph returned by the intake and query API
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderGraph {
    #[serde(flatten)]
    pub order: UnifiedOrder,
    pub items: Vec<UnifiedOrderItem>,
    pub events: Vec<WorkflowEvent>,
}

// Event type tags owned by the orchestrator itself. Item-level tags are
// derived from `ItemType::event_tag()`.
pub const EVENT_ORDER_CREATED: &str = "UNIFIED_ORDER_CREATED";
pub const EVENT_ORDER_STATUS: &str = "UNIFIED_ORDER_STATUS";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn enums_serialize_screaming_snake_case() {
        assert_eq!(
            serde_json::to_value(ItemStatus::InProgress).unwrap(),
            serde_json::json!("IN_PROGRESS")
        );
        assert_eq!(
            serde_json::to_value(OrderStatus::PartiallyFulfilled).unwrap(),
            serde_json::json!("PARTIALLY_FULFILLED")
        );
        assert_eq!(
            serde_json::to_value(ItemType::Radiology).unwrap(),
            serde_json::json!("RADIOLOGY")
        );
        assert_eq!(
            serde_json::to_value(Priority::Stat).unwrap(),
            serde_json::json!("STAT")
        );
    }

    #[test]
    fn procedure_is_the_only_domain_without_a_dispatch_role() {
        assert_eq!(ItemType::Pharmacy.dispatch_role(), Some("PHARMACIST"));
        assert_eq!(ItemType::Lab.dispatch_role(), Some("LAB_TECH"));
        assert_eq!(ItemType::Radiology.dispatch_role(), Some("RADIOLOGIST"));
        assert_eq!(ItemType::Procedure.dispatch_role(), None);
    }
}
