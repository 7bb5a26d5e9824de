// SPDX-License-Identifier: Apache-2.0

//! Prerequisite checks run before any cluster mutation.

use crate::config::Config;
use crate::error::{Prerequisite, Result, SonaropsError};
use crate::kubernetes::{application_crd_exists, namespace_exists};
use kube::Client;
use tracing::{info, instrument};

/// Verify, in order: the API server answers, the ArgoCD Application CRD is
/// registered, and the ArgoCD control-plane namespace exists. Absence of a
/// prerequisite is terminal and user-actionable, so there are no retries.
#[instrument(skip(client, config))]
pub async fn run(client: &Client, config: &Config) -> Result<()> {
    let version = client.apiserver_version().await.map_err(|e| {
        SonaropsError::MissingPrerequisite(
            Prerequisite::ApiServer,
            format!("Kubernetes API server is not reachable: {}", e),
        )
    })?;
    info!(
        "Kubernetes API server reachable (version {}.{})",
        version.major, version.minor
    );

    if !application_crd_exists(client).await? {
        return Err(SonaropsError::MissingPrerequisite(
            Prerequisite::ApplicationCrd,
            "ArgoCD Application CRD (argoproj.io/v1alpha1) is not registered; is ArgoCD installed?"
                .to_string(),
        ));
    }
    info!("ArgoCD Application CRD is registered");

    if !namespace_exists(client, &config.argocd_namespace).await? {
        return Err(SonaropsError::MissingPrerequisite(
            Prerequisite::ArgocdNamespace,
            format!(
                "ArgoCD namespace '{}' does not exist; install ArgoCD first",
                config.argocd_namespace
            ),
        ));
    }
    info!("ArgoCD namespace '{}' exists", config.argocd_namespace);

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{
        argocd_api_group_list_json, argocd_api_resource_list_json, namespace_json, test_config,
        version_json, MockService,
    };

    fn reachable_api() -> MockService {
        MockService::new().on_get("/version", 200, &version_json())
    }

    #[tokio::test]
    async fn test_fails_with_crd_error_when_crd_absent() {
        let mock = reachable_api().on_get(
            "/apis",
            200,
            r#"{"kind":"APIGroupList","apiVersion":"v1","groups":[]}"#,
        );
        let client = mock.clone().into_client();

        let err = run(&client, &test_config()).await.unwrap_err();
        match err {
            SonaropsError::MissingPrerequisite(p, _) => {
                assert_eq!(p, Prerequisite::ApplicationCrd)
            }
            other => panic!("unexpected error: {other}"),
        }
        // Preflight must not mutate anything
        assert!(mock.recorded_mutations().is_empty());
    }

    #[tokio::test]
    async fn test_fails_with_namespace_error_when_argocd_namespace_absent() {
        let mock = reachable_api()
            .on_get("/apis", 200, &argocd_api_group_list_json())
            .on_get(
                "/apis/argoproj.io/v1alpha1",
                200,
                &argocd_api_resource_list_json(),
            );
        let client = mock.clone().into_client();

        let err = run(&client, &test_config()).await.unwrap_err();
        match err {
            SonaropsError::MissingPrerequisite(p, _) => {
                assert_eq!(p, Prerequisite::ArgocdNamespace)
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(mock.recorded_mutations().is_empty());
    }

    #[tokio::test]
    async fn test_passes_when_all_prerequisites_present() {
        let mock = reachable_api()
            .on_get("/apis", 200, &argocd_api_group_list_json())
            .on_get(
                "/apis/argoproj.io/v1alpha1",
                200,
                &argocd_api_resource_list_json(),
            )
            .on_get("/api/v1/namespaces/argocd", 200, &namespace_json("argocd"));
        let client = mock.clone().into_client();

        run(&client, &test_config()).await.unwrap();
        assert!(mock.recorded_mutations().is_empty());
    }

    #[tokio::test]
    async fn test_fails_with_api_server_error_when_unreachable() {
        // No /version stub: the default 404 makes the version probe fail
        let client = MockService::new().into_client();

        let err = run(&client, &test_config()).await.unwrap_err();
        match err {
            SonaropsError::MissingPrerequisite(p, _) => assert_eq!(p, Prerequisite::ApiServer),
            other => panic!("unexpected error: {other}"),
        }
    }
}
