//! Identity context extraction
//!
//! Authentication happens upstream; by the time a request reaches the
//! orchestrator its identity has already been validated and is carried in
//! plain headers (`x-user-id`, `x-user-role`, `x-portal`), the same headers
//! the orchestrator itself sends on outbound dispatches. The extractor is
//! infallible: an absent identity is a valid (anonymous) context and each
//! guard decides whether that is acceptable.

use axum::{extract::FromRequestParts, http::request::Parts};
use std::convert::Infallible;

use crate::core::ServerState;
use crate::dispatch::client::{HEADER_PORTAL, HEADER_USER_ID, HEADER_USER_ROLE};

/// Roles that may read any order regardless of ownership
const READ_BYPASS_ROLES: &[&str] = &["SYSTEM", "CLINICAL_WORKFLOW"];

/// Roles trusted to report sub-order progress on the integration endpoint
const TRUSTED_SERVICE_ROLES: &[&str] = &[
    "LAB_SERVICE",
    "PHARMACY_SERVICE",
    "RADIOLOGY_SERVICE",
    "SYSTEM",
];

/// Validated identity context of the current request
#[derive(Debug, Clone, Default)]
pub struct Identity {
    pub user_id: Option<String>,
    pub role: Option<String>,
    pub portal: Option<String>,
}

impl Identity {
    pub fn new(user_id: Option<String>, role: Option<String>, portal: Option<String>) -> Self {
        Self {
            user_id,
            role,
            portal,
        }
    }

    /// Identity with just a user id (ordinary provider caller)
    pub fn provider(user_id: impl Into<String>) -> Self {
        Self {
            user_id: Some(user_id.into()),
            role: None,
            portal: None,
        }
    }

    /// Identity with a role and no particular user
    pub fn role(role: impl Into<String>) -> Self {
        Self {
            user_id: None,
            role: Some(role.into()),
            portal: None,
        }
    }

    pub fn has_read_bypass(&self) -> bool {
        self.role
            .as_deref()
            .is_some_and(|r| READ_BYPASS_ROLES.contains(&r))
    }

    pub fn is_trusted_service(&self) -> bool {
        self.role
            .as_deref()
            .is_some_and(|r| TRUSTED_SERVICE_ROLES.contains(&r))
    }
}

impl FromRequestParts<ServerState> for Identity {
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        _state: &ServerState,
    ) -> Result<Self, Self::Rejection> {
        let header = |name: &str| {
            parts
                .headers
                .get(name)
                .and_then(|v| v.to_str().ok())
                .filter(|v| !v.is_empty())
                .map(str::to_string)
        };

        Ok(Identity {
            user_id: header(HEADER_USER_ID),
            role: header(HEADER_USER_ROLE),
            portal: header(HEADER_PORTAL),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bypass_roles() {
        assert!(Identity::role("SYSTEM").has_read_bypass());
        assert!(Identity::role("CLINICAL_WORKFLOW").has_read_bypass());
        assert!(!Identity::role("DOCTOR").has_read_bypass());
        assert!(!Identity::default().has_read_bypass());
    }

    #[test]
    fn trusted_service_roles() {
        for role in ["LAB_SERVICE", "PHARMACY_SERVICE", "RADIOLOGY_SERVICE", "SYSTEM"] {
            assert!(Identity::role(role).is_trusted_service(), "{role}");
        }
        assert!(!Identity::role("CLINICAL_WORKFLOW").is_trusted_service());
        assert!(!Identity::provider("prov-1").is_trusted_service());
    }
}
