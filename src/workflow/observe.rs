// SPDX-License-Identifier: Apache-2.0

//! Convergence polling and the human-readable status snapshot.

use crate::config::Config;
use crate::error::Result;
use crate::types::Application;
use k8s_openapi::api::core::v1::{PersistentVolumeClaim, Pod, Service};
use kube::{api::ListParams, Api, Client, ResourceExt};
use tokio::time::{sleep, Instant};
use tracing::{debug, info, instrument, warn};

/// Outcome of the convergence wait. None of these fail the deploy workflow;
/// the operator always gets the status snapshot. `TimedOutDegraded` is kept
/// separate so a timeout that coincided with error signals is not mistaken
/// for one that is merely slow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WaitOutcome {
    /// The Application reported Synced and Healthy within the deadline
    Converged,
    /// The deadline passed without any error signal observed
    TimedOut,
    /// The deadline passed and a Degraded health state or error condition
    /// was observed while polling
    TimedOutDegraded { errors: Vec<String> },
}

/// Poll the Application until it converges or the deadline elapses
#[instrument(skip(client, config), fields(application = %config.app_name))]
pub async fn wait_for_convergence(client: &Client, config: &Config) -> Result<WaitOutcome> {
    let apps: Api<Application> = Api::namespaced(client.clone(), &config.argocd_namespace);
    let deadline = Instant::now() + config.sync_timeout;
    let mut errors: Vec<String> = Vec::new();

    info!(
        "Waiting up to {}s for application {} to converge",
        config.sync_timeout.as_secs(),
        config.app_name
    );

    loop {
        match apps.get(&config.app_name).await {
            Ok(app) => {
                if app.is_converged() {
                    info!("Application {} is Synced and Healthy", config.app_name);
                    return Ok(WaitOutcome::Converged);
                }

                debug!(
                    "Application {} sync={} health={}",
                    config.app_name,
                    app.sync_status().unwrap_or("Unknown"),
                    app.health_status().unwrap_or("Unknown")
                );

                if app.is_degraded() {
                    errors.push(format!(
                        "health is Degraded{}",
                        app.status
                            .as_ref()
                            .and_then(|s| s.health.as_ref())
                            .and_then(|h| h.message.as_deref())
                            .map(|m| format!(": {}", m))
                            .unwrap_or_default()
                    ));
                }
                for message in app.error_conditions() {
                    errors.push(message.to_string());
                }
            }
            // Transient poll failures do not abort the wait
            Err(e) => warn!("Failed to poll application {}: {}", config.app_name, e),
        }

        if Instant::now() >= deadline {
            errors.dedup();
            return Ok(if errors.is_empty() {
                WaitOutcome::TimedOut
            } else {
                WaitOutcome::TimedOutDegraded { errors }
            });
        }

        sleep(config.poll_interval).await;
    }
}

/// Print a snapshot of the Application and the workload it manages. Issues
/// only reads.
#[instrument(skip(client, config))]
pub async fn print_status(client: &Client, config: &Config) -> Result<()> {
    let apps: Api<Application> = Api::namespaced(client.clone(), &config.argocd_namespace);

    println!("APPLICATION ({})", config.argocd_namespace);
    match apps.get_opt(&config.app_name).await? {
        Some(app) => println!("  {}", format_application_line(&app)),
        None => println!("  {} (not found)", config.app_name),
    }

    let pods: Api<Pod> = Api::namespaced(client.clone(), &config.target_namespace);
    let services: Api<Service> = Api::namespaced(client.clone(), &config.target_namespace);
    let volumes: Api<PersistentVolumeClaim> =
        Api::namespaced(client.clone(), &config.target_namespace);

    let lp = ListParams::default();
    let (pods, services, volumes) = tokio::try_join!(
        pods.list(&lp),
        services.list(&lp),
        volumes.list(&lp)
    )?;

    println!();
    println!("PODS ({})", config.target_namespace);
    if pods.items.is_empty() {
        println!("  (none)");
    }
    for pod in &pods.items {
        println!("  {}", format_pod_line(pod));
    }

    println!();
    println!("SERVICES ({})", config.target_namespace);
    if services.items.is_empty() {
        println!("  (none)");
    }
    for service in &services.items {
        println!("  {}", format_service_line(service));
    }

    println!();
    println!("VOLUMES ({})", config.target_namespace);
    if volumes.items.is_empty() {
        println!("  (none)");
    }
    for volume in &volumes.items {
        println!("  {}", format_volume_line(volume));
    }

    Ok(())
}

pub fn format_application_line(app: &Application) -> String {
    let revision = app.synced_revision().unwrap_or("-");
    let revision = &revision[..revision.len().min(7)];
    format!(
        "{:<32} sync={:<10} health={:<12} revision={}",
        app.name_any(),
        app.sync_status().unwrap_or("Unknown"),
        app.health_status().unwrap_or("Unknown"),
        revision
    )
}

pub fn format_pod_line(pod: &Pod) -> String {
    let phase = pod
        .status
        .as_ref()
        .and_then(|s| s.phase.as_deref())
        .unwrap_or("Unknown");
    let statuses = pod.status.as_ref().and_then(|s| s.container_statuses.as_ref());
    let total = statuses.map(|c| c.len()).unwrap_or(0);
    let ready = statuses
        .map(|c| c.iter().filter(|cs| cs.ready).count())
        .unwrap_or(0);
    let restarts: i32 = statuses
        .map(|c| c.iter().map(|cs| cs.restart_count).sum())
        .unwrap_or(0);

    format!(
        "{:<40} {:<12} ready={}/{} restarts={}",
        pod.name_any(),
        phase,
        ready,
        total,
        restarts
    )
}

pub fn format_service_line(service: &Service) -> String {
    let spec = service.spec.as_ref();
    let type_ = spec
        .and_then(|s| s.type_.as_deref())
        .unwrap_or("ClusterIP");
    let cluster_ip = spec.and_then(|s| s.cluster_ip.as_deref()).unwrap_or("-");
    let ports = spec
        .and_then(|s| s.ports.as_ref())
        .map(|ports| {
            ports
                .iter()
                .map(|p| p.port.to_string())
                .collect::<Vec<_>>()
                .join(",")
        })
        .unwrap_or_else(|| "-".to_string());

    format!(
        "{:<40} {:<12} {:<16} ports={}",
        service.name_any(),
        type_,
        cluster_ip,
        ports
    )
}

pub fn format_volume_line(volume: &PersistentVolumeClaim) -> String {
    let phase = volume
        .status
        .as_ref()
        .and_then(|s| s.phase.as_deref())
        .unwrap_or("Unknown");
    let capacity = volume
        .status
        .as_ref()
        .and_then(|s| s.capacity.as_ref())
        .and_then(|c| c.get("storage"))
        .map(|q| q.0.clone())
        .unwrap_or_else(|| "-".to_string());

    format!("{:<40} {:<12} capacity={}", volume.name_any(), phase, capacity)
}
