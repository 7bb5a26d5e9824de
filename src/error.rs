// SPDX-License-Identifier: Apache-2.0
use thiserror::Error;

/// A prerequisite the preflight phase found missing.
///
/// Each variant maps to its own process exit status so scripts wrapping the
/// CLI can tell the failure modes apart.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Prerequisite {
    ApiServer,
    ApplicationCrd,
    ArgocdNamespace,
}

impl Prerequisite {
    pub fn exit_code(&self) -> i32 {
        match self {
            Prerequisite::ApiServer => 10,
            Prerequisite::ApplicationCrd => 11,
            Prerequisite::ArgocdNamespace => 12,
        }
    }
}

#[derive(Error, Debug)]
pub enum SonaropsError {
    #[error("Kubernetes API error: {0}")]
    KubeError(#[from] kube::Error),

    #[error("Missing prerequisite: {1}")]
    MissingPrerequisite(Prerequisite, String),

    #[error("Namespace operation failed: {0}")]
    NamespaceError(String),

    #[error("Apply failed: {0}")]
    ApplyError(String),

    #[error("Failed to render manifest: {0}")]
    SerializationError(String),
}

impl SonaropsError {
    /// Exit status for the process when this error terminates the workflow.
    pub fn exit_code(&self) -> i32 {
        match self {
            SonaropsError::MissingPrerequisite(p, _) => p.exit_code(),
            _ => 1,
        }
    }
}

pub type Result<T> = std::result::Result<T, SonaropsError>;
