//! Dual-Region Network Provisioning Library
//!
//! Standalone, trait-based provisioning workflow for managed-platform
//! network injection: dual-region virtual networks first, then an
//! injection policy bound to their subnets, with teardown that survives
//! partial or missing local state.
//!
//! # Design
//!
//! The library provides the orchestration logic without coupling to any
//! specific control plane. You implement the [`ProvisioningBackend`]
//! trait with your infrastructure (a REST adapter for resource-manager
//! APIs ships as [`RestBackend`]), and the workflow engine handles the
//! two-stage deployment: base outputs feed the dependent deployment's
//! parameters, generated names retry on collision, and a local record
//! file remembers what was created so teardown needs no re-query.
//!
//! # Usage
//!
//! ```ignore
//! use vnet_provision_rs::{
//!     FileRecordStore, ProvisionArgs, RestBackend, TemplateRef, WorkflowConfig,
//! };
//!
//! let backend = RestBackend::new("https://management.example.net");
//! let mut store = FileRecordStore::new_default();
//!
//! let args = ProvisionArgs {
//!     subscription_id: "sub-1".into(),
//!     principal_identifier: "alice@example.com".into(),
//!     resource_group: "rg-pp-vnet".into(),
//!     primary_region: "westeurope".into(),
//!     secondary_region: "northeurope".into(),
//!     primary_network_name: "vnet-pp-primary".into(),
//!     secondary_network_name: "vnet-pp-secondary".into(),
//!     base_template: TemplateRef::new("dual-region-vnet"),
//!     deploy_dependent_policy: true,
//!     timeout: None,
//! };
//!
//! let record =
//!     vnet_provision_rs::run_provision(&backend, &mut store, WorkflowConfig::default(), args)
//!         .await?;
//! println!("policy: {:?}", record.dependent_resource_name);
//! ```

pub mod backend;
pub mod error;
pub mod identity;
pub mod naming;
pub mod ops;
pub mod params;
pub mod rest;
pub mod state;
pub mod store;
pub mod types;
pub mod workflow;

// Re-export the main types at crate root for convenience
pub use backend::ProvisioningBackend;
pub use error::ProvisionError;
pub use identity::{resolve_principal, ResolvedPrincipal};
pub use naming::UniqueName;
pub use ops::{
    run_provision, run_teardown, ProvisionArgs, TeardownArgs, DEFAULT_RESOURCE_GROUP,
};
pub use params::{subnet_name_from_id, BaseParameters, DependentParameters};
pub use rest::RestBackend;
pub use state::{Phase, ProvisionRun};
pub use store::{FileRecordStore, ProvisioningRecord, RecordStore, DEFAULT_RECORD_PATH};
pub use types::*;
pub use workflow::{ProvisionWorkflow, ReversalOptions, WorkflowConfig};
