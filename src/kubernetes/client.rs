// SPDX-License-Identifier: Apache-2.0

//! Cluster client creation

use anyhow::Result;
use kube::{config::KubeConfigOptions, Client};

/// Create a Kubernetes client from the local kubeconfig, falling back to
/// in-cluster configuration when no kubeconfig is present.
pub async fn create_client() -> Result<Client> {
    let options = KubeConfigOptions::default();

    // Load kubeconfig if it's present otherwise fall back to cluster config
    let config = kube::Config::from_kubeconfig(&options)
        .await
        .or_else(|_| kube::Config::incluster())?;

    Ok(Client::try_from(config)?)
}
