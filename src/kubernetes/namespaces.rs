// SPDX-License-Identifier: Apache-2.0

//! Namespace management utilities

use crate::config::Config;
use crate::constants::{labels, FIELD_MANAGER};
use crate::error::{Result, SonaropsError};
use k8s_openapi::api::core::v1::Namespace;
use kube::{
    api::{DeleteParams, ObjectMeta, Patch, PatchParams},
    Api, Client, ResourceExt,
};
use std::collections::BTreeMap;
use tracing::{debug, info, instrument};

/// Build the target namespace document with the labels this tool manages
pub fn build_namespace(config: &Config) -> Namespace {
    let mut ns_labels = BTreeMap::new();
    ns_labels.insert(labels::NAME.to_string(), config.app_name.clone());
    ns_labels.insert(
        labels::MANAGED_BY.to_string(),
        labels::MANAGED_BY_VALUE.to_string(),
    );

    Namespace {
        metadata: ObjectMeta {
            name: Some(config.target_namespace.clone()),
            labels: Some(ns_labels),
            ..Default::default()
        },
        ..Default::default()
    }
}

/// Server-side apply the namespace so labels converge on repeat deploys
#[instrument(skip(client, config), fields(namespace = %config.target_namespace))]
pub async fn apply_namespace(client: &Client, config: &Config) -> Result<()> {
    let namespaces: Api<Namespace> = Api::all(client.clone());
    let ns = build_namespace(config);
    let name = ns.name_any();

    let pp = PatchParams::apply(FIELD_MANAGER).force();
    namespaces.patch(&name, &pp, &Patch::Apply(&ns)).await?;

    info!("Namespace {} applied", name);
    Ok(())
}

/// Check whether a namespace exists
#[instrument(skip(client))]
pub async fn namespace_exists(client: &Client, namespace: &str) -> Result<bool> {
    let namespaces: Api<Namespace> = Api::all(client.clone());

    match namespaces.get(namespace).await {
        Ok(_) => Ok(true),
        Err(kube::Error::Api(err)) if err.code == 404 => Ok(false),
        Err(e) => Err(SonaropsError::NamespaceError(format!(
            "Failed to check namespace {}: {}",
            namespace, e
        ))),
    }
}

/// Delete a namespace, treating absence as success so teardown is idempotent
#[instrument(skip(client))]
pub async fn delete_namespace(client: &Client, namespace: &str) -> Result<()> {
    let namespaces: Api<Namespace> = Api::all(client.clone());

    match namespaces.delete(namespace, &DeleteParams::default()).await {
        Ok(_) => {
            info!("Namespace {} deleted", namespace);
            Ok(())
        }
        Err(kube::Error::Api(err)) if err.code == 404 => {
            debug!("Namespace {} already absent", namespace);
            Ok(())
        }
        Err(e) => Err(SonaropsError::NamespaceError(format!(
            "Failed to delete namespace {}: {}",
            namespace, e
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{namespace_json, test_config, MockService};

    #[test]
    fn test_build_namespace_sets_name_and_labels() {
        let config = test_config();
        let ns = build_namespace(&config);

        assert_eq!(ns.metadata.name.as_deref(), Some("sonarqube"));
        let ns_labels = ns.metadata.labels.unwrap();
        assert_eq!(ns_labels.get(labels::NAME).unwrap(), "sonarqube");
        assert_eq!(ns_labels.get(labels::MANAGED_BY).unwrap(), "sonarops");
    }

    #[tokio::test]
    async fn test_namespace_exists_true() {
        let client = MockService::new()
            .on_get("/api/v1/namespaces/argocd", 200, &namespace_json("argocd"))
            .into_client();

        assert!(namespace_exists(&client, "argocd").await.unwrap());
    }

    #[tokio::test]
    async fn test_namespace_exists_false_on_404() {
        // MockService answers unmatched requests with 404
        let client = MockService::new().into_client();

        assert!(!namespace_exists(&client, "argocd").await.unwrap());
    }

    #[tokio::test]
    async fn test_delete_namespace_swallows_404() {
        let client = MockService::new().into_client();

        delete_namespace(&client, "sonarqube").await.unwrap();
    }

    #[tokio::test]
    async fn test_apply_namespace_is_repeatable() {
        let mock = MockService::new().on_patch(
            "/api/v1/namespaces/sonarqube",
            200,
            &namespace_json("sonarqube"),
        );
        let client = mock.into_client();
        let config = test_config();

        apply_namespace(&client, &config).await.unwrap();
        apply_namespace(&client, &config).await.unwrap();
    }
}
