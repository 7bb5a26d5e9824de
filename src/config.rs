// SPDX-License-Identifier: Apache-2.0
use anyhow::{Context, Result};
use std::env;
use std::time::Duration;

use crate::constants::defaults;

/// Deployment configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    /// ArgoCD Application name
    pub app_name: String,
    /// ArgoCD project the Application belongs to
    pub app_project: String,
    /// Git repository holding the deployment source
    pub repo_url: String,
    /// Target revision within the repository
    pub revision: String,
    /// Path to the chart/manifests within the repository
    pub source_path: String,
    /// Helm value files under the source path, in override order
    pub helm_value_files: Vec<String>,
    /// Namespace the workload is deployed into
    pub target_namespace: String,
    /// Namespace the ArgoCD control plane runs in
    pub argocd_namespace: String,
    /// Destination cluster API endpoint as ArgoCD addresses it
    pub destination_server: String,
    /// Deadline for the convergence wait
    pub sync_timeout: Duration,
    /// Interval between convergence polls
    pub poll_interval: Duration,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        let repo_url =
            env::var("GITOPS_REPO_URL").context("GITOPS_REPO_URL environment variable not set")?;

        Ok(Config {
            app_name: env_or("APP_NAME", defaults::APP_NAME),
            app_project: env_or("APP_PROJECT", defaults::APP_PROJECT),
            repo_url,
            revision: env_or("GITOPS_REVISION", defaults::REVISION),
            source_path: env_or("GITOPS_PATH", defaults::SOURCE_PATH),
            helm_value_files: parse_value_files(&env_or("HELM_VALUE_FILES", "")),
            target_namespace: env_or("TARGET_NAMESPACE", defaults::TARGET_NAMESPACE),
            argocd_namespace: env_or("ARGOCD_NAMESPACE", defaults::ARGOCD_NAMESPACE),
            destination_server: env_or("DESTINATION_SERVER", defaults::DESTINATION_SERVER),
            sync_timeout: Duration::from_secs(parse_secs(
                "SYNC_TIMEOUT_SECS",
                defaults::SYNC_TIMEOUT_SECS,
            )?),
            poll_interval: Duration::from_secs(parse_secs(
                "POLL_INTERVAL_SECS",
                defaults::POLL_INTERVAL_SECS,
            )?),
        })
    }
}

fn env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

fn parse_secs(key: &str, default: u64) -> Result<u64> {
    match env::var(key) {
        Ok(v) => v
            .parse::<u64>()
            .with_context(|| format!("{} must be a non-negative number of seconds, got '{}'", key, v)),
        Err(_) => Ok(default),
    }
}

/// Split a comma-separated list of Helm value files, dropping empty entries
fn parse_value_files(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_value_files_empty() {
        assert!(parse_value_files("").is_empty());
    }

    #[test]
    fn test_parse_value_files_single() {
        assert_eq!(parse_value_files("values.yaml"), vec!["values.yaml"]);
    }

    #[test]
    fn test_parse_value_files_trims_and_skips_blanks() {
        assert_eq!(
            parse_value_files("values.yaml, values-prod.yaml,,"),
            vec!["values.yaml", "values-prod.yaml"]
        );
    }
}
