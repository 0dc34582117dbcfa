//! vnet-provision CLI
//!
//! Command-line interface for the dual-region network provisioning
//! workflow: `provision` creates the networks (optionally attaching the
//! injection policy), `teardown` removes everything and the local record.

use anyhow::Result;
use clap::{Parser, Subcommand};
use colored::Colorize;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::time::Duration;
use vnet_provision_rs::{
    ops, FileRecordStore, ProvisionArgs, ProvisionError, RestBackend, TeardownArgs, TemplateRef,
    WorkflowConfig, DEFAULT_RECORD_PATH, DEFAULT_RESOURCE_GROUP,
};

#[derive(Parser)]
#[command(name = "vnet-provision")]
#[command(about = "Dual-region network provisioning for managed-platform network injection", long_about = None)]
struct Cli {
    /// Provisioning backend URL
    #[arg(
        long,
        env = "VNET_PROVISION_BACKEND_URL",
        default_value = "http://localhost:8080"
    )]
    backend_url: String,

    /// Record file path
    #[arg(long, env = "VNET_PROVISION_RECORD", default_value = DEFAULT_RECORD_PATH)]
    record_path: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Provision the dual-region networks, optionally attaching the policy
    Provision {
        /// Target subscription
        #[arg(long)]
        subscription_id: String,

        /// Principal identifier (email/UPN) granted access to the networks
        #[arg(long)]
        principal: String,

        #[arg(long, default_value = DEFAULT_RESOURCE_GROUP)]
        resource_group: String,

        #[arg(long, default_value = "westeurope")]
        primary_region: String,

        #[arg(long, default_value = "northeurope")]
        secondary_region: String,

        #[arg(long, default_value = "vnet-pp-primary")]
        primary_network_name: String,

        #[arg(long, default_value = "vnet-pp-secondary")]
        secondary_network_name: String,

        /// Base deployment template
        #[arg(long, default_value = "dual-region-vnet")]
        base_template: String,

        /// Also deploy the network-injection policy bound to the new subnets
        #[arg(long)]
        deploy_policy: bool,

        /// Deadline per deployment, in seconds
        #[arg(long)]
        timeout_secs: Option<u64>,
    },
    /// Delete the provisioned resources and the local record
    Teardown {
        /// Target subscription
        #[arg(long)]
        subscription_id: String,

        /// Resource group (defaults to the recorded one)
        #[arg(long)]
        resource_group: Option<String>,

        /// Also delete injection policies found in the resource group
        #[arg(long)]
        delete_policies: bool,

        /// Skip the confirmation prompt
        #[arg(long)]
        force: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let cli = Cli::parse();
    let backend = RestBackend::new(&cli.backend_url);
    let mut store = FileRecordStore::new(cli.record_path);

    match cli.command {
        Commands::Provision {
            subscription_id,
            principal,
            resource_group,
            primary_region,
            secondary_region,
            primary_network_name,
            secondary_network_name,
            base_template,
            deploy_policy,
            timeout_secs,
        } => {
            let args = ProvisionArgs {
                subscription_id,
                principal_identifier: principal,
                resource_group,
                primary_region,
                secondary_region,
                primary_network_name,
                secondary_network_name,
                base_template: TemplateRef::new(base_template),
                deploy_dependent_policy: deploy_policy,
                timeout: timeout_secs.map(Duration::from_secs),
            };

            let record =
                ops::run_provision(&backend, &mut store, WorkflowConfig::default(), args).await?;

            println!(
                "{} resource group {}",
                "provisioned".green().bold(),
                record.resource_group_name
            );
            for (role, id) in &record.base_resource_ids {
                println!("  {}: {}", role, id);
            }
            if let Some(name) = &record.dependent_resource_name {
                println!("  policy: {}", name);
            }
        }
        Commands::Teardown {
            subscription_id,
            resource_group,
            delete_policies,
            force,
        } => {
            let target = resource_group
                .clone()
                .unwrap_or_else(|| format!("{} (or the recorded group)", DEFAULT_RESOURCE_GROUP));
            if !force
                && !confirm(&format!(
                    "Delete resource group '{}' and all contained resources?",
                    target
                ))?
            {
                println!("aborted");
                return Ok(());
            }

            let args = TeardownArgs {
                subscription_id,
                resource_group,
                delete_dependent_resources: delete_policies,
            };

            match ops::run_teardown(&backend, &mut store, WorkflowConfig::default(), args).await {
                Ok(Some(handle)) => {
                    println!(
                        "{} scope deletion in progress (operation {})",
                        "accepted".green().bold(),
                        handle.operation_id
                    );
                }
                Ok(None) => {
                    println!("{}", "nothing to tear down".yellow());
                }
                Err(err) => {
                    if let ProvisionError::ReversalPartialFailure(report) = &err {
                        for failure in &report.failures {
                            eprintln!(
                                "  {} {}: {}",
                                "failed".red(),
                                failure.handle.name,
                                failure.error
                            );
                        }
                    }
                    return Err(err.into());
                }
            }
        }
    }

    Ok(())
}

fn confirm(prompt: &str) -> Result<bool> {
    print!("{} [y/N]: ", prompt);
    io::stdout().flush()?;

    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    Ok(matches!(line.trim().to_lowercase().as_str(), "y" | "yes"))
}
