// SPDX-License-Identifier: Apache-2.0

//! Desired-state document construction and server-side apply.

use crate::config::Config;
use crate::constants::{labels, FIELD_MANAGER, RESOURCES_FINALIZER};
use crate::error::{Result, SonaropsError};
use crate::types::{
    Application, ApplicationDestination, ApplicationSource, ApplicationSpec, HelmSource,
    SyncPolicy, SyncPolicyAutomated,
};
use kube::{
    api::{DeleteParams, ObjectMeta, Patch, PatchParams},
    Api, Client,
};
use std::collections::BTreeMap;
use tracing::{debug, info, instrument};

/// Build the ArgoCD Application document for the configured deployment
pub fn build_application(config: &Config) -> Application {
    let mut app_labels = BTreeMap::new();
    app_labels.insert(labels::NAME.to_string(), config.app_name.clone());
    app_labels.insert(
        labels::MANAGED_BY.to_string(),
        labels::MANAGED_BY_VALUE.to_string(),
    );

    let helm = if config.helm_value_files.is_empty() {
        None
    } else {
        Some(HelmSource {
            value_files: config.helm_value_files.clone(),
        })
    };

    Application {
        metadata: ObjectMeta {
            name: Some(config.app_name.clone()),
            namespace: Some(config.argocd_namespace.clone()),
            labels: Some(app_labels),
            // Makes ArgoCD cascade deletion to the deployed resources
            finalizers: Some(vec![RESOURCES_FINALIZER.to_string()]),
            ..Default::default()
        },
        spec: ApplicationSpec {
            project: config.app_project.clone(),
            source: ApplicationSource {
                repo_url: config.repo_url.clone(),
                target_revision: config.revision.clone(),
                path: config.source_path.clone(),
                helm,
            },
            destination: ApplicationDestination {
                server: config.destination_server.clone(),
                namespace: config.target_namespace.clone(),
            },
            sync_policy: Some(SyncPolicy {
                automated: Some(SyncPolicyAutomated {
                    prune: Some(true),
                    self_heal: Some(true),
                }),
                sync_options: Some(vec!["CreateNamespace=true".to_string()]),
            }),
        },
        status: None,
    }
}

/// Server-side apply the Application so repeated deploys converge instead of
/// erroring on an existing resource
#[instrument(skip(client, config), fields(application = %config.app_name))]
pub async fn apply_application(client: &Client, config: &Config) -> Result<()> {
    let apps: Api<Application> = Api::namespaced(client.clone(), &config.argocd_namespace);
    let app = build_application(config);

    let pp = PatchParams::apply(FIELD_MANAGER).force();
    apps.patch(&config.app_name, &pp, &Patch::Apply(&app))
        .await
        .map_err(|e| {
            SonaropsError::ApplyError(format!(
                "Failed to apply application {}/{}: {}",
                config.argocd_namespace, config.app_name, e
            ))
        })?;

    info!(
        "Application {}/{} applied (repo {}, revision {}, path {})",
        config.argocd_namespace, config.app_name, config.repo_url, config.revision, config.source_path
    );
    Ok(())
}

/// Delete the Application, treating absence as success
#[instrument(skip(client, config), fields(application = %config.app_name))]
pub async fn delete_application(client: &Client, config: &Config) -> Result<()> {
    let apps: Api<Application> = Api::namespaced(client.clone(), &config.argocd_namespace);

    match apps.delete(&config.app_name, &DeleteParams::default()).await {
        Ok(_) => {
            info!(
                "Application {}/{} deleted",
                config.argocd_namespace, config.app_name
            );
            Ok(())
        }
        Err(kube::Error::Api(err)) if err.code == 404 => {
            debug!(
                "Application {}/{} already absent",
                config.argocd_namespace, config.app_name
            );
            Ok(())
        }
        Err(e) => Err(e.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{application_json, test_config, MockService};

    #[test]
    fn test_build_application_references_source() {
        let config = test_config();
        let app = build_application(&config);

        assert_eq!(app.spec.source.repo_url, "https://git.example.com/deploy.git");
        assert_eq!(app.spec.source.target_revision, "HEAD");
        assert_eq!(app.spec.source.path, "sonarqube");
        assert_eq!(app.spec.destination.namespace, "sonarqube");
        assert_eq!(app.metadata.namespace.as_deref(), Some("argocd"));
    }

    #[test]
    fn test_build_application_sets_automated_sync_policy() {
        let app = build_application(&test_config());

        let policy = app.spec.sync_policy.unwrap();
        let automated = policy.automated.unwrap();
        assert_eq!(automated.prune, Some(true));
        assert_eq!(automated.self_heal, Some(true));
        assert_eq!(
            policy.sync_options.unwrap(),
            vec!["CreateNamespace=true".to_string()]
        );
    }

    #[test]
    fn test_build_application_carries_resources_finalizer() {
        let app = build_application(&test_config());

        assert_eq!(
            app.metadata.finalizers.unwrap(),
            vec![RESOURCES_FINALIZER.to_string()]
        );
    }

    #[test]
    fn test_build_application_omits_helm_without_value_files() {
        let app = build_application(&test_config());
        assert!(app.spec.source.helm.is_none());
    }

    #[test]
    fn test_build_application_includes_helm_value_files() {
        let mut config = test_config();
        config.helm_value_files = vec!["values.yaml".to_string(), "values-prod.yaml".to_string()];

        let app = build_application(&config);
        assert_eq!(
            app.spec.source.helm.unwrap().value_files,
            vec!["values.yaml", "values-prod.yaml"]
        );
    }

    #[tokio::test]
    async fn test_apply_application_is_repeatable() {
        let mock = MockService::new().on_patch(
            "/apis/argoproj.io/v1alpha1/namespaces/argocd/applications/sonarqube",
            200,
            &application_json("sonarqube", "OutOfSync", "Missing"),
        );
        let client = mock.into_client();
        let config = test_config();

        apply_application(&client, &config).await.unwrap();
        apply_application(&client, &config).await.unwrap();
    }

    #[tokio::test]
    async fn test_delete_application_swallows_404() {
        let client = MockService::new().into_client();

        delete_application(&client, &test_config()).await.unwrap();
    }
}
