//! Capability registry: item type -> downstream service
//!
//! Built once from config so new domains can be added without touching the
//! dispatch loop. PROCEDURE deliberately has no capability; there is no
//! downstream procedure service, so procedure items fail dispatch with a
//! per-item error instead of aborting the order.

use std::collections::HashMap;

use crate::core::Config;
use crate::orders::model::ItemType;

/// One downstream domain service the orchestrator can dispatch to
#[derive(Debug, Clone)]
pub struct DomainCapability {
    /// Role impersonated on the outbound call (`x-user-role`)
    pub role: &'static str,
    /// Service base URL, e.g. `http://pharmacy:3001`
    pub base_url: String,
    /// Order-creation path on the service
    pub order_path: &'static str,
}

impl DomainCapability {
    pub fn order_url(&self) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), self.order_path)
    }
}

/// Registry of dispatchable domains
#[derive(Debug, Clone)]
pub struct CapabilityRegistry {
    capabilities: HashMap<ItemType, DomainCapability>,
}

impl CapabilityRegistry {
    pub fn from_config(config: &Config) -> Self {
        let services = [
            (
                ItemType::Pharmacy,
                config.pharmacy_service_url.clone(),
                "/prescriptions",
            ),
            (ItemType::Lab, config.lab_service_url.clone(), "/orders"),
            (
                ItemType::Radiology,
                config.radiology_service_url.clone(),
                "/orders",
            ),
        ];

        let mut capabilities = HashMap::new();
        for (item_type, base_url, order_path) in services {
            if let Some(role) = item_type.dispatch_role() {
                capabilities.insert(
                    item_type,
                    DomainCapability {
                        role,
                        base_url,
                        order_path,
                    },
                );
            }
        }
        Self { capabilities }
    }

    pub fn get(&self, item_type: ItemType) -> Option<&DomainCapability> {
        self.capabilities.get(&item_type)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registry_maps_domains_to_roles_and_paths() {
        let config = Config::default_for_tests();
        let registry = CapabilityRegistry::from_config(&config);

        let pharmacy = registry.get(ItemType::Pharmacy).unwrap();
        assert_eq!(pharmacy.role, "PHARMACIST");
        assert!(pharmacy.order_url().ends_with("/prescriptions"));

        let lab = registry.get(ItemType::Lab).unwrap();
        assert_eq!(lab.role, "LAB_TECH");
        assert!(lab.order_url().ends_with("/orders"));

        let radiology = registry.get(ItemType::Radiology).unwrap();
        assert_eq!(radiology.role, "RADIOLOGIST");

        assert!(registry.get(ItemType::Procedure).is_none());
    }

    #[test]
    fn registry_roles_come_from_the_item_type() {
        let config = Config::default_for_tests();
        let registry = CapabilityRegistry::from_config(&config);

        for item_type in [
            ItemType::Pharmacy,
            ItemType::Lab,
            ItemType::Radiology,
            ItemType::Procedure,
        ] {
            assert_eq!(
                registry.get(item_type).map(|c| c.role),
                item_type.dispatch_role()
            );
        }
    }

    #[test]
    fn order_url_handles_trailing_slash() {
        let capability = DomainCapability {
            role: "LAB_TECH",
            base_url: "http://lab:3002/".into(),
            order_path: "/orders",
        };
        assert_eq!(capability.order_url(), "http://lab:3002/orders");
    }
}
