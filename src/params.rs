//! Typed deployment parameter builders.
//!
//! The base and dependent templates each have a fixed parameter contract.
//! Parameters are built from typed fields mapped to contract names
//! directly — a value that is missing is a hard error at build time,
//! never a placeholder silently passed through.

use crate::error::ProvisionError;
use crate::naming::UniqueName;
use crate::types::{ParameterMap, PrincipalId};

// Base template parameter names.
pub const PARAM_PRIMARY_REGION: &str = "primaryRegion";
pub const PARAM_SECONDARY_REGION: &str = "secondaryRegion";
pub const PARAM_PRIMARY_NETWORK_NAME: &str = "primaryNetworkName";
pub const PARAM_SECONDARY_NETWORK_NAME: &str = "secondaryNetworkName";
pub const PARAM_PRINCIPAL_ID: &str = "principalId";
pub const PARAM_PRINCIPAL_IDENTIFIER: &str = "principalIdentifier";

// Dependent template parameter names.
pub const PARAM_GENERATED_NAME: &str = "generatedName";
pub const PARAM_PRIMARY_NETWORK_ID: &str = "primaryNetworkId";
pub const PARAM_SECONDARY_NETWORK_ID: &str = "secondaryNetworkId";
pub const PARAM_PRIMARY_SUBNET_NAME: &str = "primarySubnetName";
pub const PARAM_SECONDARY_SUBNET_NAME: &str = "secondarySubnetName";

// Base template output names.
pub const OUTPUT_RESOURCE_GROUP_NAME: &str = "resourceGroupName";
pub const OUTPUT_PRIMARY_NETWORK_ID: &str = "primaryNetworkId";
pub const OUTPUT_SECONDARY_NETWORK_ID: &str = "secondaryNetworkId";
pub const OUTPUT_PRIMARY_SUBNET_ID: &str = "primarySubnetId";
pub const OUTPUT_SECONDARY_SUBNET_ID: &str = "secondarySubnetId";

/// Every output a nominally successful base deployment must carry.
pub const REQUIRED_BASE_OUTPUTS: [&str; 5] = [
    OUTPUT_RESOURCE_GROUP_NAME,
    OUTPUT_PRIMARY_NETWORK_ID,
    OUTPUT_SECONDARY_NETWORK_ID,
    OUTPUT_PRIMARY_SUBNET_ID,
    OUTPUT_SECONDARY_SUBNET_ID,
];

/// Resource type tag of the virtual networks the base template creates.
pub const NETWORK_RESOURCE_TYPE: &str = "virtualNetwork";

/// Parameters for the base (dual-region network) deployment.
#[derive(Debug, Clone)]
pub struct BaseParameters {
    pub primary_region: String,
    pub secondary_region: String,
    pub primary_network_name: String,
    pub secondary_network_name: String,
    pub principal_id: PrincipalId,
    pub principal_identifier: String,
}

impl BaseParameters {
    pub fn into_map(self) -> ParameterMap {
        let mut map = ParameterMap::new();
        map.insert(PARAM_PRIMARY_REGION.to_string(), self.primary_region);
        map.insert(PARAM_SECONDARY_REGION.to_string(), self.secondary_region);
        map.insert(
            PARAM_PRIMARY_NETWORK_NAME.to_string(),
            self.primary_network_name,
        );
        map.insert(
            PARAM_SECONDARY_NETWORK_NAME.to_string(),
            self.secondary_network_name,
        );
        map.insert(
            PARAM_PRINCIPAL_ID.to_string(),
            self.principal_id.as_str().to_string(),
        );
        map.insert(
            PARAM_PRINCIPAL_IDENTIFIER.to_string(),
            self.principal_identifier,
        );
        map
    }
}

/// Parameters for the dependent (injection policy) deployment, built from
/// the base deployment's outputs plus a generated name.
#[derive(Debug, Clone)]
pub struct DependentParameters {
    pub generated_name: String,
    pub primary_network_id: String,
    pub secondary_network_id: String,
    pub primary_subnet_name: String,
    pub secondary_subnet_name: String,
}

impl DependentParameters {
    /// Build from a successful base result's outputs. An output that is
    /// absent (or blank) at this point is a template contract mismatch.
    pub fn from_outputs(
        outputs: &ParameterMap,
        name: &UniqueName,
    ) -> Result<Self, ProvisionError> {
        let primary_subnet_id = required_output(outputs, OUTPUT_PRIMARY_SUBNET_ID)?;
        let secondary_subnet_id = required_output(outputs, OUTPUT_SECONDARY_SUBNET_ID)?;

        Ok(Self {
            generated_name: name.to_string(),
            primary_network_id: required_output(outputs, OUTPUT_PRIMARY_NETWORK_ID)?.to_string(),
            secondary_network_id: required_output(outputs, OUTPUT_SECONDARY_NETWORK_ID)?
                .to_string(),
            primary_subnet_name: subnet_name_from_id(primary_subnet_id)?.to_string(),
            secondary_subnet_name: subnet_name_from_id(secondary_subnet_id)?.to_string(),
        })
    }

    pub fn into_map(self) -> ParameterMap {
        let mut map = ParameterMap::new();
        map.insert(PARAM_GENERATED_NAME.to_string(), self.generated_name);
        map.insert(
            PARAM_PRIMARY_NETWORK_ID.to_string(),
            self.primary_network_id,
        );
        map.insert(
            PARAM_SECONDARY_NETWORK_ID.to_string(),
            self.secondary_network_id,
        );
        map.insert(
            PARAM_PRIMARY_SUBNET_NAME.to_string(),
            self.primary_subnet_name,
        );
        map.insert(
            PARAM_SECONDARY_SUBNET_NAME.to_string(),
            self.secondary_subnet_name,
        );
        map
    }
}

/// Fetch an output the contract requires, rejecting absent or blank values.
pub(crate) fn required_output<'a>(
    outputs: &'a ParameterMap,
    name: &str,
) -> Result<&'a str, ProvisionError> {
    match outputs.get(name) {
        Some(value) if !value.is_empty() => Ok(value),
        _ => Err(ProvisionError::DeploymentIncomplete(name.to_string())),
    }
}

/// Derive a subnet's name from its backend identifier (the last path
/// segment of ids like `.../virtualNetworks/vnet-a/subnets/snet-a`).
pub fn subnet_name_from_id(id: &str) -> Result<&str, ProvisionError> {
    let name = id.trim_end_matches('/').rsplit('/').next().unwrap_or(id);
    if name.is_empty() {
        return Err(ProvisionError::Parameter(format!(
            "cannot derive subnet name from id '{}'",
            id
        )));
    }
    Ok(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_outputs() -> ParameterMap {
        let mut outputs = ParameterMap::new();
        outputs.insert(
            OUTPUT_RESOURCE_GROUP_NAME.to_string(),
            "rg-pp-vnet".to_string(),
        );
        outputs.insert(
            OUTPUT_PRIMARY_NETWORK_ID.to_string(),
            "/sub-1/rg-pp-vnet/virtualNetworks/vnet-pp-primary".to_string(),
        );
        outputs.insert(
            OUTPUT_SECONDARY_NETWORK_ID.to_string(),
            "/sub-1/rg-pp-vnet/virtualNetworks/vnet-pp-secondary".to_string(),
        );
        outputs.insert(
            OUTPUT_PRIMARY_SUBNET_ID.to_string(),
            "/sub-1/rg-pp-vnet/virtualNetworks/vnet-pp-primary/subnets/snet-injection".to_string(),
        );
        outputs.insert(
            OUTPUT_SECONDARY_SUBNET_ID.to_string(),
            "/sub-1/rg-pp-vnet/virtualNetworks/vnet-pp-secondary/subnets/snet-injection"
                .to_string(),
        );
        outputs
    }

    #[test]
    fn test_base_parameters_map() {
        let map = BaseParameters {
            primary_region: "westeurope".to_string(),
            secondary_region: "northeurope".to_string(),
            primary_network_name: "vnet-pp-primary".to_string(),
            secondary_network_name: "vnet-pp-secondary".to_string(),
            principal_id: PrincipalId::new("principal-123"),
            principal_identifier: "alice@example.com".to_string(),
        }
        .into_map();

        assert_eq!(map.len(), 6);
        assert_eq!(map.get(PARAM_PRIMARY_REGION).unwrap(), "westeurope");
        assert_eq!(map.get(PARAM_PRINCIPAL_ID).unwrap(), "principal-123");
        assert_eq!(
            map.get(PARAM_PRINCIPAL_IDENTIFIER).unwrap(),
            "alice@example.com"
        );
    }

    #[test]
    fn test_dependent_parameters_from_outputs() {
        let name = UniqueName::generate("pp-vnet-policy");
        let params = DependentParameters::from_outputs(&sample_outputs(), &name).unwrap();

        assert_eq!(params.generated_name, name.to_string());
        assert_eq!(params.primary_subnet_name, "snet-injection");
        assert_eq!(params.secondary_subnet_name, "snet-injection");

        let map = params.into_map();
        assert_eq!(map.len(), 5);
        assert_eq!(map.get(PARAM_GENERATED_NAME).unwrap(), &name.to_string());
        assert!(map
            .get(PARAM_PRIMARY_NETWORK_ID)
            .unwrap()
            .ends_with("vnet-pp-primary"));
    }

    #[test]
    fn test_dependent_parameters_missing_output() {
        let mut outputs = sample_outputs();
        outputs.remove(OUTPUT_SECONDARY_SUBNET_ID);

        let name = UniqueName::generate("pp-vnet-policy");
        let err = DependentParameters::from_outputs(&outputs, &name).unwrap_err();
        assert!(matches!(err, ProvisionError::DeploymentIncomplete(_)));
        assert!(err.to_string().contains(OUTPUT_SECONDARY_SUBNET_ID));
    }

    #[test]
    fn test_dependent_parameters_blank_output() {
        let mut outputs = sample_outputs();
        outputs.insert(OUTPUT_PRIMARY_NETWORK_ID.to_string(), String::new());

        let name = UniqueName::generate("pp-vnet-policy");
        let err = DependentParameters::from_outputs(&outputs, &name).unwrap_err();
        assert!(matches!(err, ProvisionError::DeploymentIncomplete(_)));
    }

    #[test]
    fn test_subnet_name_from_id() {
        assert_eq!(
            subnet_name_from_id("/a/b/virtualNetworks/vnet/subnets/snet-injection").unwrap(),
            "snet-injection"
        );
        assert_eq!(subnet_name_from_id("snet-plain").unwrap(), "snet-plain");
        assert_eq!(subnet_name_from_id("/a/b/snet/").unwrap(), "snet");
        assert!(subnet_name_from_id("").is_err());
        assert!(subnet_name_from_id("///").is_err());
    }
}
