// SPDX-License-Identifier: Apache-2.0

//! CRD availability checking utilities

use crate::constants::argocd;
use crate::error::Result;
use kube::{discovery::Discovery, Client};

/// Check if the ArgoCD Application CRD is registered by attempting to
/// discover it. Preflight treats absence as terminal, so unlike a controller
/// startup gate this probes exactly once.
pub async fn application_crd_exists(client: &Client) -> Result<bool> {
    let discovery = Discovery::new(client.clone())
        .filter(&[argocd::GROUP])
        .run()
        .await?;

    for group in discovery.groups() {
        if group.name() == argocd::GROUP {
            for (ar, _) in group.recommended_resources() {
                if ar.kind == argocd::KIND && ar.version == argocd::VERSION {
                    return Ok(true);
                }
            }
        }
    }

    Ok(false)
}
