//! [`ProvisioningRecord`] — on-disk representation of a provisioning run's
//! results.

use crate::error::ProvisionError;
use crate::params::{
    OUTPUT_PRIMARY_NETWORK_ID, OUTPUT_PRIMARY_SUBNET_ID, OUTPUT_RESOURCE_GROUP_NAME,
    OUTPUT_SECONDARY_NETWORK_ID, OUTPUT_SECONDARY_SUBNET_ID, REQUIRED_BASE_OUTPUTS,
};
use crate::state::current_unix_time;
use crate::types::ParameterMap;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// Logical roles keying `base_resource_ids`.
pub const ROLE_PRIMARY_NETWORK: &str = "primaryNetwork";
pub const ROLE_SECONDARY_NETWORK: &str = "secondaryNetwork";
pub const ROLE_PRIMARY_SUBNET: &str = "primarySubnet";
pub const ROLE_SECONDARY_SUBNET: &str = "secondarySubnet";

/// Last-known identifiers of a provisioned deployment, persisted so
/// teardown can run without re-querying the backend.
///
/// Created only after the base deployment is backend-confirmed;
/// `dependent_resource_name` is set only after the dependent deployment
/// succeeded — a partial or failed dependent deployment never leaves a
/// dangling name here. Deleted outright (not marked) on teardown.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProvisioningRecord {
    pub resource_group_name: String,
    /// Backend identifiers keyed by logical role.
    pub base_resource_ids: BTreeMap<String, String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub dependent_resource_name: Option<String>,
    pub created_at: u64,
}

impl ProvisioningRecord {
    /// Build a record from a successful base deployment's outputs.
    ///
    /// Every required output must be present and non-blank; anything less
    /// is a template contract mismatch reported as
    /// [`ProvisionError::DeploymentIncomplete`] listing all missing names.
    pub fn from_outputs(outputs: &ParameterMap) -> Result<Self, ProvisionError> {
        let missing: Vec<&str> = REQUIRED_BASE_OUTPUTS
            .iter()
            .filter(|name| {
                outputs
                    .get(**name)
                    .map(|value| value.is_empty())
                    .unwrap_or(true)
            })
            .copied()
            .collect();

        if !missing.is_empty() {
            return Err(ProvisionError::DeploymentIncomplete(missing.join(", ")));
        }

        let mut base_resource_ids = BTreeMap::new();
        for (role, output) in [
            (ROLE_PRIMARY_NETWORK, OUTPUT_PRIMARY_NETWORK_ID),
            (ROLE_SECONDARY_NETWORK, OUTPUT_SECONDARY_NETWORK_ID),
            (ROLE_PRIMARY_SUBNET, OUTPUT_PRIMARY_SUBNET_ID),
            (ROLE_SECONDARY_SUBNET, OUTPUT_SECONDARY_SUBNET_ID),
        ] {
            // presence checked above
            if let Some(id) = outputs.get(output) {
                base_resource_ids.insert(role.to_string(), id.clone());
            }
        }

        Ok(Self {
            resource_group_name: outputs
                .get(OUTPUT_RESOURCE_GROUP_NAME)
                .cloned()
                .unwrap_or_default(),
            base_resource_ids,
            dependent_resource_name: None,
            created_at: current_unix_time(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full_outputs() -> ParameterMap {
        let mut outputs = ParameterMap::new();
        outputs.insert(
            OUTPUT_RESOURCE_GROUP_NAME.to_string(),
            "rg-pp-vnet".to_string(),
        );
        outputs.insert(OUTPUT_PRIMARY_NETWORK_ID.to_string(), "net-a".to_string());
        outputs.insert(OUTPUT_SECONDARY_NETWORK_ID.to_string(), "net-b".to_string());
        outputs.insert(OUTPUT_PRIMARY_SUBNET_ID.to_string(), "snet-a".to_string());
        outputs.insert(OUTPUT_SECONDARY_SUBNET_ID.to_string(), "snet-b".to_string());
        outputs
    }

    #[test]
    fn test_from_outputs_complete() {
        let record = ProvisioningRecord::from_outputs(&full_outputs()).unwrap();

        assert_eq!(record.resource_group_name, "rg-pp-vnet");
        assert_eq!(record.base_resource_ids.len(), 4);
        assert_eq!(
            record.base_resource_ids.get(ROLE_PRIMARY_NETWORK).unwrap(),
            "net-a"
        );
        assert_eq!(
            record.base_resource_ids.get(ROLE_SECONDARY_SUBNET).unwrap(),
            "snet-b"
        );
        assert!(record.dependent_resource_name.is_none());
        assert!(record.created_at > 0);
    }

    #[test]
    fn test_from_outputs_missing_key() {
        let mut outputs = full_outputs();
        outputs.remove(OUTPUT_PRIMARY_SUBNET_ID);

        let err = ProvisioningRecord::from_outputs(&outputs).unwrap_err();
        assert!(matches!(err, ProvisionError::DeploymentIncomplete(_)));
        assert!(err.to_string().contains(OUTPUT_PRIMARY_SUBNET_ID));
    }

    #[test]
    fn test_from_outputs_reports_every_missing_key() {
        let mut outputs = full_outputs();
        outputs.remove(OUTPUT_PRIMARY_NETWORK_ID);
        outputs.insert(OUTPUT_SECONDARY_NETWORK_ID.to_string(), String::new());

        let err = ProvisioningRecord::from_outputs(&outputs).unwrap_err();
        let message = err.to_string();
        assert!(message.contains(OUTPUT_PRIMARY_NETWORK_ID));
        assert!(message.contains(OUTPUT_SECONDARY_NETWORK_ID));
    }

    #[test]
    fn test_record_serialization_roundtrip() {
        let mut record = ProvisioningRecord::from_outputs(&full_outputs()).unwrap();

        // Without the dependent name, the field is omitted entirely.
        let json = serde_json::to_string_pretty(&record).unwrap();
        assert!(!json.contains("dependent_resource_name"));
        let restored: ProvisioningRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, record);

        record.dependent_resource_name = Some("pp-vnet-policy-4821".to_string());
        let json = serde_json::to_string_pretty(&record).unwrap();
        let restored: ProvisioningRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, record);
        assert_eq!(
            restored.dependent_resource_name.as_deref(),
            Some("pp-vnet-policy-4821")
        );
    }
}
