// SPDX-License-Identifier: Apache-2.0

//! Typed model of the ArgoCD `Application` custom resource, limited to the
//! fields this tool reads and writes.

use kube::CustomResource;
use serde::{Deserialize, Serialize};

#[derive(CustomResource, Serialize, Deserialize, Clone, Debug, schemars::JsonSchema)]
#[kube(group = "argoproj.io", version = "v1alpha1", kind = "Application")]
#[kube(namespaced)]
#[kube(status = "ApplicationStatus")]
#[serde(rename_all = "camelCase")]
pub struct ApplicationSpec {
    pub project: String,
    pub source: ApplicationSource,
    pub destination: ApplicationDestination,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sync_policy: Option<SyncPolicy>,
}

#[derive(Serialize, Deserialize, Clone, Debug, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationSource {
    #[serde(rename = "repoURL")]
    pub repo_url: String,
    pub target_revision: String,
    pub path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub helm: Option<HelmSource>,
}

#[derive(Serialize, Deserialize, Clone, Debug, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct HelmSource {
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub value_files: Vec<String>,
}

#[derive(Serialize, Deserialize, Clone, Debug, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationDestination {
    pub server: String,
    pub namespace: String,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct SyncPolicy {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub automated: Option<SyncPolicyAutomated>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sync_options: Option<Vec<String>>,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct SyncPolicyAutomated {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prune: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub self_heal: Option<bool>,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationStatus {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sync: Option<SyncStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub health: Option<HealthStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conditions: Option<Vec<ApplicationCondition>>,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct SyncStatus {
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub revision: Option<String>,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct HealthStatus {
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

#[derive(Serialize, Deserialize, Clone, Debug, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationCondition {
    #[serde(rename = "type")]
    pub condition_type: String,
    pub message: String,
}

impl Application {
    /// Reported sync state, e.g. "Synced" or "OutOfSync"
    pub fn sync_status(&self) -> Option<&str> {
        self.status
            .as_ref()
            .and_then(|s| s.sync.as_ref())
            .map(|s| s.status.as_str())
    }

    /// Reported health state, e.g. "Healthy", "Progressing" or "Degraded"
    pub fn health_status(&self) -> Option<&str> {
        self.status
            .as_ref()
            .and_then(|s| s.health.as_ref())
            .map(|h| h.status.as_str())
    }

    /// Revision the last sync operated on
    pub fn synced_revision(&self) -> Option<&str> {
        self.status
            .as_ref()
            .and_then(|s| s.sync.as_ref())
            .and_then(|s| s.revision.as_deref())
    }

    /// Converged: the controller reports both Synced and Healthy
    pub fn is_converged(&self) -> bool {
        self.sync_status() == Some("Synced") && self.health_status() == Some("Healthy")
    }

    pub fn is_degraded(&self) -> bool {
        self.health_status() == Some("Degraded")
    }

    /// Messages of error-class conditions (condition types ending in "Error")
    pub fn error_conditions(&self) -> Vec<&str> {
        self.status
            .as_ref()
            .and_then(|s| s.conditions.as_ref())
            .map(|conditions| {
                conditions
                    .iter()
                    .filter(|c| c.condition_type.ends_with("Error"))
                    .map(|c| c.message.as_str())
                    .collect()
            })
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kube::api::ObjectMeta;

    fn make_spec() -> ApplicationSpec {
        ApplicationSpec {
            project: "default".to_string(),
            source: ApplicationSource {
                repo_url: "https://git.example.com/deploy.git".to_string(),
                target_revision: "HEAD".to_string(),
                path: "sonarqube".to_string(),
                helm: None,
            },
            destination: ApplicationDestination {
                server: "https://kubernetes.default.svc".to_string(),
                namespace: "sonarqube".to_string(),
            },
            sync_policy: None,
        }
    }

    fn make_app(status: Option<ApplicationStatus>) -> Application {
        Application {
            metadata: ObjectMeta {
                name: Some("sonarqube".to_string()),
                namespace: Some("argocd".to_string()),
                ..Default::default()
            },
            spec: make_spec(),
            status,
        }
    }

    fn make_status(sync: &str, health: &str) -> ApplicationStatus {
        ApplicationStatus {
            sync: Some(SyncStatus {
                status: sync.to_string(),
                revision: Some("abc1234".to_string()),
            }),
            health: Some(HealthStatus {
                status: health.to_string(),
                message: None,
            }),
            conditions: None,
        }
    }

    #[test]
    fn test_is_converged_when_synced_and_healthy() {
        let app = make_app(Some(make_status("Synced", "Healthy")));
        assert!(app.is_converged());
    }

    #[test]
    fn test_not_converged_when_out_of_sync() {
        let app = make_app(Some(make_status("OutOfSync", "Healthy")));
        assert!(!app.is_converged());
    }

    #[test]
    fn test_not_converged_when_progressing() {
        let app = make_app(Some(make_status("Synced", "Progressing")));
        assert!(!app.is_converged());
    }

    #[test]
    fn test_not_converged_without_status() {
        let app = make_app(None);
        assert!(!app.is_converged());
    }

    #[test]
    fn test_is_degraded() {
        let app = make_app(Some(make_status("OutOfSync", "Degraded")));
        assert!(app.is_degraded());
        assert!(!make_app(None).is_degraded());
    }

    #[test]
    fn test_error_conditions_filters_by_type() {
        let mut status = make_status("OutOfSync", "Degraded");
        status.conditions = Some(vec![
            ApplicationCondition {
                condition_type: "ComparisonError".to_string(),
                message: "repo unreachable".to_string(),
            },
            ApplicationCondition {
                condition_type: "SharedResourceWarning".to_string(),
                message: "shared".to_string(),
            },
        ]);
        let app = make_app(Some(status));
        assert_eq!(app.error_conditions(), vec!["repo unreachable"]);
    }

    #[test]
    fn test_synced_revision() {
        let app = make_app(Some(make_status("Synced", "Healthy")));
        assert_eq!(app.synced_revision(), Some("abc1234"));
    }

    #[test]
    fn test_spec_serializes_with_argocd_casing() {
        let spec = ApplicationSpec {
            sync_policy: Some(SyncPolicy {
                automated: Some(SyncPolicyAutomated {
                    prune: Some(true),
                    self_heal: Some(true),
                }),
                sync_options: Some(vec!["CreateNamespace=true".to_string()]),
            }),
            ..make_spec()
        };
        let value = serde_json::to_value(&spec).unwrap();

        assert_eq!(
            value["source"]["repoURL"],
            "https://git.example.com/deploy.git"
        );
        assert_eq!(value["source"]["targetRevision"], "HEAD");
        assert_eq!(value["syncPolicy"]["automated"]["selfHeal"], true);
        assert_eq!(value["syncPolicy"]["automated"]["prune"], true);
        assert_eq!(
            value["syncPolicy"]["syncOptions"][0],
            "CreateNamespace=true"
        );
    }

    #[test]
    fn test_status_deserializes_from_argocd_payload() {
        let app: Application = serde_json::from_value(serde_json::json!({
            "apiVersion": "argoproj.io/v1alpha1",
            "kind": "Application",
            "metadata": { "name": "sonarqube", "namespace": "argocd" },
            "spec": {
                "project": "default",
                "source": {
                    "repoURL": "https://git.example.com/deploy.git",
                    "targetRevision": "HEAD",
                    "path": "sonarqube"
                },
                "destination": {
                    "server": "https://kubernetes.default.svc",
                    "namespace": "sonarqube"
                }
            },
            "status": {
                "sync": { "status": "Synced", "revision": "deadbeef" },
                "health": { "status": "Healthy" }
            }
        }))
        .unwrap();

        assert!(app.is_converged());
        assert_eq!(app.synced_revision(), Some("deadbeef"));
    }
}
