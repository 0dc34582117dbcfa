//! Provision/teardown drivers.
//!
//! These compose identity resolution, the workflow engine and the record
//! store into the two operations the CLI exposes. All policy that isn't
//! pure orchestration logic — settling delays, record persistence,
//! reconciliation of leftover state — lives here.

use crate::backend::ProvisioningBackend;
use crate::error::ProvisionError;
use crate::identity;
use crate::params::BaseParameters;
use crate::state::ProvisionRun;
use crate::store::{ProvisioningRecord, RecordStore};
use crate::types::{DeletionHandle, DeploymentRequest, Scope, TemplateRef};
use crate::workflow::{ProvisionWorkflow, ReversalOptions, WorkflowConfig};
use std::time::Duration;
use tracing::{info, warn};

/// Default resource-group name for the injection networks.
pub const DEFAULT_RESOURCE_GROUP: &str = "rg-pp-vnet";

/// Inputs to a provision run.
#[derive(Debug, Clone)]
pub struct ProvisionArgs {
    pub subscription_id: String,
    pub principal_identifier: String,
    pub resource_group: String,
    pub primary_region: String,
    pub secondary_region: String,
    pub primary_network_name: String,
    pub secondary_network_name: String,
    pub base_template: TemplateRef,
    /// Also attach the network-injection policy.
    pub deploy_dependent_policy: bool,
    /// Per-deployment deadline.
    pub timeout: Option<Duration>,
}

/// Inputs to a teardown run.
#[derive(Debug, Clone)]
pub struct TeardownArgs {
    pub subscription_id: String,
    /// Defaults to the recorded resource group, then to
    /// [`DEFAULT_RESOURCE_GROUP`].
    pub resource_group: Option<String>,
    /// Delete injection policies found in the scope before removing it.
    pub delete_dependent_resources: bool,
}

/// Provision the dual-region networks and, when requested, the dependent
/// injection policy. The record is persisted after each backend-confirmed
/// success, never before.
pub async fn run_provision<B, S>(
    backend: &B,
    store: &mut S,
    config: WorkflowConfig,
    args: ProvisionArgs,
) -> Result<ProvisioningRecord, ProvisionError>
where
    B: ProvisioningBackend,
    S: RecordStore,
{
    let workflow = ProvisionWorkflow::new(backend, config);
    let scope = Scope::new(&args.subscription_id, &args.resource_group);

    // A leftover record means a previous run was interrupted or is being
    // re-run. Learn the backend's actual state before assuming anything.
    if let Some(existing) = store.load().await? {
        let existing_scope = Scope::new(&args.subscription_id, &existing.resource_group_name);
        let report = workflow.reconcile(&existing, &existing_scope).await?;
        if report.is_consistent() {
            info!(
                resource_group = %existing.resource_group_name,
                "existing record matches backend state, redeploying over it"
            );
        } else {
            warn!(
                resource_group = %existing.resource_group_name,
                missing = ?report.missing,
                scope_present = report.scope_present,
                "existing record does not match backend state"
            );
        }
    }

    let principal =
        identity::resolve_principal(backend, Some(&args.principal_identifier)).await?;
    if principal.via_directory {
        let settle = workflow.config().directory_settle;
        info!(
            delay = ?settle,
            "principal resolved via directory lookup, waiting for replication"
        );
        tokio::time::sleep(settle).await;
    }

    let parameters = BaseParameters {
        primary_region: args.primary_region.clone(),
        secondary_region: args.secondary_region.clone(),
        primary_network_name: args.primary_network_name.clone(),
        secondary_network_name: args.secondary_network_name.clone(),
        principal_id: principal.id,
        principal_identifier: args.principal_identifier.clone(),
    }
    .into_map();

    let request = DeploymentRequest {
        template: args.base_template.clone(),
        scope: scope.clone(),
        parameters,
        timeout: args.timeout,
    };

    let mut run = ProvisionRun::new(scope, request);
    let mut record = workflow.provision_base(&mut run).await?;
    store.save(&record).await?;

    if args.deploy_dependent_policy {
        match workflow.provision_dependent(&mut run, &mut record).await {
            Ok(name) => {
                store.save(&record).await?;
                info!(%name, "injection policy attached");
            }
            Err(err) => {
                // The networks do not depend on the policy; they stay
                // provisioned and recorded.
                warn!(%err, "policy deployment failed, base networks remain usable");
                return Err(err);
            }
        }
    }

    Ok(record)
}

/// Tear down previously provisioned resources.
///
/// Works from the persisted record when one exists, but never requires
/// it — an absent record falls back to backend enumeration by scope.
/// Returns `None` when the scope did not exist (success), otherwise the
/// handle of the in-flight scope deletion.
pub async fn run_teardown<B, S>(
    backend: &B,
    store: &mut S,
    config: WorkflowConfig,
    args: TeardownArgs,
) -> Result<Option<DeletionHandle>, ProvisionError>
where
    B: ProvisioningBackend,
    S: RecordStore,
{
    let record = store.load().await?;

    let resource_group = args
        .resource_group
        .clone()
        .or_else(|| record.as_ref().map(|r| r.resource_group_name.clone()))
        .unwrap_or_else(|| DEFAULT_RESOURCE_GROUP.to_string());
    let scope = Scope::new(&args.subscription_id, &resource_group);

    if !backend.scope_exists(&scope).await? {
        info!(%scope, "scope does not exist, nothing to tear down");
        store.clear().await?;
        return Ok(None);
    }

    let workflow = ProvisionWorkflow::new(backend, config);
    let options = ReversalOptions {
        include_dependent: args.delete_dependent_resources,
    };
    let outcome = workflow.reverse(record.as_ref(), &scope, &options).await?;

    // The scope deletion is committed at the backend; the local record is
    // cleared optimistically rather than waiting for it to finish.
    store.clear().await?;

    if !outcome.report.is_clean() {
        return Err(ProvisionError::ReversalPartialFailure(outcome.report));
    }

    Ok(Some(outcome.scope_deletion))
}
