//! Outbound dispatch to downstream domain services
//!
//! One POST per item with the caller's identity context in headers. Any
//! transport error, timeout, or non-2xx response is a `DispatchError` the
//! manager records against that item alone.

use serde_json::Value;
use std::time::Duration;
use thiserror::Error;

use super::payload::ItemPayload;
use super::registry::DomainCapability;

pub const HEADER_USER_ID: &str = "x-user-id";
pub const HEADER_USER_ROLE: &str = "x-user-role";
pub const HEADER_PORTAL: &str = "x-portal";

/// Failure of a single outbound dispatch
#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("request to {url} failed: {source}")]
    Http {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{url} returned {status}: {body}")]
    Status {
        url: String,
        status: u16,
        body: String,
    },

    #[error("service response missing order id: {0}")]
    MalformedResponse(String),
}

/// Successful dispatch result
#[derive(Debug, Clone)]
pub struct DispatchOutcome {
    /// Id the downstream service assigned (`id` or `orderNumber` field)
    pub target_service_order_id: String,
    /// Full response snapshot, stored as item metadata
    pub response: Value,
}

/// reqwest-backed dispatcher
#[derive(Debug, Clone)]
pub struct DispatchClient {
    http: reqwest::Client,
    portal: String,
}

impl DispatchClient {
    pub fn new(timeout_ms: u64, portal: String) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_millis(timeout_ms))
            .build()?;
        Ok(Self { http, portal })
    }

    /// POST one item payload to its owning domain service.
    pub async fn dispatch(
        &self,
        capability: &DomainCapability,
        user_id: &str,
        payload: &ItemPayload,
    ) -> Result<DispatchOutcome, DispatchError> {
        let url = capability.order_url();

        let response = self
            .http
            .post(&url)
            .header(HEADER_USER_ID, user_id)
            .header(HEADER_USER_ROLE, capability.role)
            .header(HEADER_PORTAL, self.portal.as_str())
            .json(payload)
            .send()
            .await
            .map_err(|source| DispatchError::Http {
                url: url.clone(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(DispatchError::Status {
                url,
                status: status.as_u16(),
                body,
            });
        }

        let body: Value = response.json().await.map_err(|source| DispatchError::Http {
            url: url.clone(),
            source,
        })?;

        let target_service_order_id = extract_service_order_id(&body)
            .ok_or_else(|| DispatchError::MalformedResponse(body.to_string()))?;

        Ok(DispatchOutcome {
            target_service_order_id,
            response: body,
        })
    }
}

/// Downstream services answer with `{id, ...}` or `{orderNumber, ...}`;
/// either identifies the sub-order for later callbacks.
fn extract_service_order_id(body: &Value) -> Option<String> {
    for field in ["id", "orderNumber"] {
        match body.get(field) {
            Some(Value::String(s)) if !s.is_empty() => return Some(s.clone()),
            Some(Value::Number(n)) => return Some(n.to_string()),
            _ => {}
        }
    }
    None
}
