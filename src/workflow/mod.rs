// SPDX-License-Identifier: Apache-2.0

//! The operator workflows: deploy, status, delete, manifest. Each is a linear
//! composition of the preflight/apply/observe phases and runs to completion
//! independently of previous invocations.

pub mod apply;
pub mod observe;
pub mod preflight;

pub use observe::WaitOutcome;

use crate::config::Config;
use crate::error::{Result, SonaropsError};
use crate::kubernetes::{apply_namespace, build_namespace, delete_namespace};
use kube::Client;
use tracing::{error, info, warn};

/// preflight → apply namespace → apply application → wait → snapshot.
/// The convergence wait is best-effort: a timeout is logged but never fails
/// the workflow, so the operator always ends up at the snapshot.
pub async fn deploy(client: &Client, config: &Config) -> Result<()> {
    preflight::run(client, config).await?;

    apply_namespace(client, config).await?;
    apply::apply_application(client, config).await?;

    match observe::wait_for_convergence(client, config).await? {
        WaitOutcome::Converged => {
            info!("Deployment converged");
        }
        WaitOutcome::TimedOut => {
            warn!(
                "Application did not converge within {}s; ArgoCD keeps reconciling in the background",
                config.sync_timeout.as_secs()
            );
        }
        WaitOutcome::TimedOutDegraded { errors } => {
            error!(
                "Application did not converge within {}s and reported errors:",
                config.sync_timeout.as_secs()
            );
            for message in errors {
                error!("  {}", message);
            }
        }
    }

    observe::print_status(client, config).await
}

/// Print the current state of the application and its workload. Read-only.
pub async fn status(client: &Client, config: &Config) -> Result<()> {
    observe::print_status(client, config).await
}

/// Delete the Application first so ArgoCD prunes the workload, then the
/// namespace. Both steps tolerate the resource already being gone.
pub async fn delete(client: &Client, config: &Config) -> Result<()> {
    apply::delete_application(client, config).await?;
    delete_namespace(client, &config.target_namespace).await?;
    info!("Teardown complete");
    Ok(())
}

/// Render the documents the applier would submit as a multi-document YAML
/// stream, suitable for checking into the GitOps repository.
pub fn render_manifests(config: &Config) -> Result<String> {
    // k8s-openapi types do not serialize apiVersion/kind themselves
    let mut namespace = serde_json::to_value(build_namespace(config))
        .map_err(|e| SonaropsError::SerializationError(e.to_string()))?;
    namespace["apiVersion"] = "v1".into();
    namespace["kind"] = "Namespace".into();

    let application = apply::build_application(config);

    let namespace_yaml = serde_yaml::to_string(&namespace)
        .map_err(|e| SonaropsError::SerializationError(e.to_string()))?;
    let application_yaml = serde_yaml::to_string(&application)
        .map_err(|e| SonaropsError::SerializationError(e.to_string()))?;

    Ok(format!("---\n{}---\n{}", namespace_yaml, application_yaml))
}
