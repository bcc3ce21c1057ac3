//! Authorization guard
//!
//! Ownership and role checks applied before any state is touched. A guard
//! rejection is always request-level (403) and mutates nothing.

use super::identity::Identity;
use crate::core::error::{AppError, AppResult};

/// Order creation: a known identity must match the `providerId` it claims
/// to order on behalf of. Anonymous internal callers are allowed through;
/// the upstream gateway is responsible for stripping spoofed headers.
pub fn authorize_create(identity: &Identity, provider_id: &str) -> AppResult<()> {
    if let Some(user_id) = &identity.user_id
        && user_id != provider_id
    {
        return Err(AppError::forbidden(
            "Cannot create orders on behalf of another provider",
        ));
    }
    Ok(())
}

/// Reading a single order: SYSTEM and CLINICAL_WORKFLOW bypass ownership;
/// everyone else must own the order.
pub fn authorize_read(identity: &Identity, provider_id: &str) -> AppResult<()> {
    if identity.has_read_bypass() {
        return Ok(());
    }
    match &identity.user_id {
        Some(user_id) if user_id == provider_id => Ok(()),
        _ => Err(AppError::forbidden("Not authorized to view this order")),
    }
}

/// Listing orders requires a known principal: either a bypass role (sees
/// everything) or a provider identity (sees own orders).
pub fn authorize_list(identity: &Identity) -> AppResult<Option<String>> {
    if identity.has_read_bypass() {
        return Ok(None);
    }
    match &identity.user_id {
        Some(user_id) => Ok(Some(user_id.clone())),
        None => Err(AppError::forbidden("Listing orders requires an identity")),
    }
}

/// Integration callbacks are accepted only from trusted service roles.
pub fn authorize_integration(identity: &Identity) -> AppResult<()> {
    if identity.is_trusted_service() {
        Ok(())
    } else {
        Err(AppError::forbidden(
            "Integration endpoint is restricted to trusted services",
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_allows_matching_or_anonymous_identity() {
        assert!(authorize_create(&Identity::provider("prov-1"), "prov-1").is_ok());
        assert!(authorize_create(&Identity::default(), "prov-1").is_ok());
        assert!(authorize_create(&Identity::provider("prov-2"), "prov-1").is_err());
    }

    #[test]
    fn read_enforces_ownership_with_role_bypass() {
        assert!(authorize_read(&Identity::provider("prov-1"), "prov-1").is_ok());
        assert!(authorize_read(&Identity::provider("prov-2"), "prov-1").is_err());
        assert!(authorize_read(&Identity::role("SYSTEM"), "prov-1").is_ok());
        assert!(authorize_read(&Identity::role("CLINICAL_WORKFLOW"), "prov-1").is_ok());
        assert!(authorize_read(&Identity::default(), "prov-1").is_err());
    }

    #[test]
    fn list_requires_principal() {
        assert_eq!(
            authorize_list(&Identity::provider("prov-1")).unwrap(),
            Some("prov-1".to_string())
        );
        assert_eq!(authorize_list(&Identity::role("SYSTEM")).unwrap(), None);
        assert!(authorize_list(&Identity::default()).is_err());
    }

    #[test]
    fn integration_restricted_to_trusted_services() {
        assert!(authorize_integration(&Identity::role("LAB_SERVICE")).is_ok());
        assert!(authorize_integration(&Identity::role("SYSTEM")).is_ok());
        assert!(authorize_integration(&Identity::role("DOCTOR")).is_err());
        assert!(authorize_integration(&Identity::default()).is_err());
    }
}
