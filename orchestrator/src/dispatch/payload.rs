//! Typed dispatch payloads
//!
//! Each item type has a closed payload shape validated before any remote
//! call is made. A missing required field is a per-item failure; it never
//! fails the unified order request itself.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::orders::model::{ItemType, UnifiedOrder};

/// Payload shape violation for one item
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PayloadShapeError {
    #[error("{item_type} payload missing required field '{field}'")]
    MissingField {
        item_type: ItemType,
        field: &'static str,
    },

    #[error("{item_type} payload field '{field}' has the wrong shape")]
    InvalidField {
        item_type: ItemType,
        field: &'static str,
    },
}

/// Patient/provider/encounter context every domain service expects
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ClinicalContext {
    pub patient_id: String,
    pub provider_id: String,
    pub encounter_id: String,
}

impl ClinicalContext {
    pub fn from_order(order: &UnifiedOrder) -> Self {
        Self {
            patient_id: order.patient_id.clone(),
            provider_id: order.provider_id.clone(),
            encounter_id: order.encounter_id.clone(),
        }
    }
}

/// Closed tagged union of per-domain dispatch payloads
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(untagged)]
pub enum ItemPayload {
    #[serde(rename_all = "camelCase")]
    Pharmacy {
        #[serde(flatten)]
        context: ClinicalContext,
        items: Vec<Value>,
    },
    #[serde(rename_all = "camelCase")]
    Lab {
        #[serde(flatten)]
        context: ClinicalContext,
        tests: Vec<Value>,
    },
    #[serde(rename_all = "camelCase")]
    Radiology {
        #[serde(flatten)]
        context: ClinicalContext,
        study_type: String,
        body_part: String,
    },
    #[serde(rename_all = "camelCase")]
    Procedure {
        #[serde(flatten)]
        context: ClinicalContext,
        #[serde(skip_serializing_if = "Option::is_none")]
        detail: Option<Value>,
    },
}

fn required_array(
    item_type: ItemType,
    raw: &Value,
    field: &'static str,
) -> Result<Vec<Value>, PayloadShapeError> {
    match raw.get(field) {
        None | Some(Value::Null) => Err(PayloadShapeError::MissingField { item_type, field }),
        Some(Value::Array(values)) => Ok(values.clone()),
        Some(_) => Err(PayloadShapeError::InvalidField { item_type, field }),
    }
}

fn required_string(
    item_type: ItemType,
    raw: &Value,
    field: &'static str,
) -> Result<String, PayloadShapeError> {
    match raw.get(field) {
        None | Some(Value::Null) => Err(PayloadShapeError::MissingField { item_type, field }),
        Some(Value::String(s)) if !s.is_empty() => Ok(s.clone()),
        Some(_) => Err(PayloadShapeError::InvalidField { item_type, field }),
    }
}

impl ItemPayload {
    /// Validate the raw request payload for an item and build the typed
    /// dispatch body. Patient/provider/encounter context comes from the
    /// parent order, so callers only supply the domain-specific fields.
    pub fn build(
        item_type: ItemType,
        order: &UnifiedOrder,
        raw: &Value,
    ) -> Result<Self, PayloadShapeError> {
        let context = ClinicalContext::from_order(order);
        match item_type {
            ItemType::Pharmacy => Ok(ItemPayload::Pharmacy {
                context,
                items: required_array(item_type, raw, "items")?,
            }),
            ItemType::Lab => Ok(ItemPayload::Lab {
                context,
                tests: required_array(item_type, raw, "tests")?,
            }),
            ItemType::Radiology => Ok(ItemPayload::Radiology {
                study_type: required_string(item_type, raw, "studyType")?,
                body_part: required_string(item_type, raw, "bodyPart")?,
                context,
            }),
            ItemType::Procedure => Ok(ItemPayload::Procedure {
                context,
                detail: match raw {
                    Value::Null => None,
                    other => Some(other.clone()),
                },
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::orders::model::{OrderStatus, Priority};
    use chrono::Utc;
    use serde_json::json;

    fn order() -> UnifiedOrder {
        let now = Utc::now();
        UnifiedOrder {
            id: "o1".into(),
            order_number: "UCO-20260830120000-AAAAA".into(),
            patient_id: "pat-1".into(),
            provider_id: "prov-1".into(),
            encounter_id: "enc-1".into(),
            priority: Priority::Urgent,
            status: OrderStatus::New,
            notes: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn lab_requires_tests() {
        let err = ItemPayload::build(ItemType::Lab, &order(), &json!({})).unwrap_err();
        assert_eq!(
            err,
            PayloadShapeError::MissingField {
                item_type: ItemType::Lab,
                field: "tests"
            }
        );
        assert!(
            ItemPayload::build(ItemType::Lab, &order(), &json!({"tests": [{"code": "CBC"}]}))
                .is_ok()
        );
    }

    #[test]
    fn radiology_requires_study_type_and_body_part() {
        let err =
            ItemPayload::build(ItemType::Radiology, &order(), &json!({"studyType": "XRAY"}))
                .unwrap_err();
        assert_eq!(
            err,
            PayloadShapeError::MissingField {
                item_type: ItemType::Radiology,
                field: "bodyPart"
            }
        );
    }

    #[test]
    fn procedure_accepts_empty_payload() {
        assert!(ItemPayload::build(ItemType::Procedure, &order(), &Value::Null).is_ok());
    }

    #[test]
    fn dispatch_body_carries_order_context() {
        let payload = ItemPayload::build(
            ItemType::Pharmacy,
            &order(),
            &json!({"items": [{"drug": "amoxicillin", "dose": "500mg"}]}),
        )
        .unwrap();
        let body = serde_json::to_value(&payload).unwrap();
        assert_eq!(body["patientId"], "pat-1");
        assert_eq!(body["providerId"], "prov-1");
        assert_eq!(body["encounterId"], "enc-1");
        assert_eq!(body["items"][0]["drug"], "amoxicillin");
    }

    #[test]
    fn wrong_shape_is_rejected() {
        let err =
            ItemPayload::build(ItemType::Pharmacy, &order(), &json!({"items": "not-a-list"}))
                .unwrap_err();
        assert_eq!(
            err,
            PayloadShapeError::InvalidField {
                item_type: ItemType::Pharmacy,
                field: "items"
            }
        );
    }
}
