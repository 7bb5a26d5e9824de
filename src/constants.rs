// SPDX-License-Identifier: Apache-2.0

/// The field manager name used for server-side apply
pub const FIELD_MANAGER: &str = "sonarops";

/// ArgoCD finalizer that makes Application deletion cascade to its resources
pub const RESOURCES_FINALIZER: &str = "resources-finalizer.argocd.argoproj.io";

/// API group and version of the ArgoCD Application CRD
pub mod argocd {
    pub const GROUP: &str = "argoproj.io";
    pub const VERSION: &str = "v1alpha1";
    pub const KIND: &str = "Application";
}

/// Kubernetes labels stamped on resources this tool applies
pub mod labels {
    pub const NAME: &str = "app.kubernetes.io/name";
    pub const MANAGED_BY: &str = "app.kubernetes.io/managed-by";
    pub const MANAGED_BY_VALUE: &str = "sonarops";
}

/// Configuration defaults (overridable via environment variables)
pub mod defaults {
    pub const APP_NAME: &str = "sonarqube";
    pub const APP_PROJECT: &str = "default";
    pub const TARGET_NAMESPACE: &str = "sonarqube";
    pub const ARGOCD_NAMESPACE: &str = "argocd";
    pub const DESTINATION_SERVER: &str = "https://kubernetes.default.svc";
    pub const REVISION: &str = "HEAD";
    pub const SOURCE_PATH: &str = "sonarqube";

    /// Deadline for the convergence wait in seconds
    pub const SYNC_TIMEOUT_SECS: u64 = 300;
    /// Interval between convergence polls in seconds
    pub const POLL_INTERVAL_SECS: u64 = 5;
}
