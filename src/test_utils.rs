// SPDX-License-Identifier: Apache-2.0

//! Test utilities for mocking Kubernetes API responses.

use http::{Request, Response};
use kube::client::Body;
use kube::Client;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::task::{Context, Poll};
use std::time::Duration;
use tower::Service;

use crate::config::Config;

/// A mock HTTP service that returns predefined responses based on request
/// method and path, and records every request it serves so tests can assert
/// on side effects (or their absence).
#[derive(Clone)]
pub struct MockService {
    responses: Arc<Mutex<HashMap<(String, String), (u16, String)>>>,
    requests: Arc<Mutex<Vec<(String, String)>>>,
}

impl MockService {
    pub fn new() -> Self {
        Self {
            responses: Arc::new(Mutex::new(HashMap::new())),
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Add a response for GET requests matching the exact path
    pub fn on_get(self, path: &str, status: u16, body: &str) -> Self {
        self.on("GET", path, status, body)
    }

    /// Add a response for PATCH requests matching the exact path
    pub fn on_patch(self, path: &str, status: u16, body: &str) -> Self {
        self.on("PATCH", path, status, body)
    }

    /// Add a response for DELETE requests matching the exact path
    pub fn on_delete(self, path: &str, status: u16, body: &str) -> Self {
        self.on("DELETE", path, status, body)
    }

    fn on(self, method: &str, path: &str, status: u16, body: &str) -> Self {
        self.responses
            .lock()
            .unwrap()
            .insert((method.to_string(), path.to_string()), (status, body.to_string()));
        self
    }

    /// Build a kube Client from this mock service
    pub fn into_client(self) -> Client {
        Client::new(self, "default")
    }

    /// All (method, path) pairs served so far, in order
    pub fn recorded(&self) -> Vec<(String, String)> {
        self.requests.lock().unwrap().clone()
    }

    /// Methods other than GET that were served so far
    pub fn recorded_mutations(&self) -> Vec<(String, String)> {
        self.recorded()
            .into_iter()
            .filter(|(m, _)| m != "GET")
            .collect()
    }

    fn find_response(&self, method: &str, path: &str) -> Option<(u16, String)> {
        let responses = self.responses.lock().unwrap();

        // Try exact match first
        if let Some(resp) = responses.get(&(method.to_string(), path.to_string())) {
            return Some(resp.clone());
        }

        // Try prefix match for paths like /api/v1/namespaces/foo
        for ((m, p), resp) in responses.iter() {
            if m == method && path.starts_with(p) {
                return Some(resp.clone());
            }
        }

        None
    }
}

impl Default for MockService {
    fn default() -> Self {
        Self::new()
    }
}

impl Service<Request<Body>> for MockService {
    type Response = Response<Body>;
    type Error = tower::BoxError;
    type Future = std::pin::Pin<
        Box<dyn std::future::Future<Output = Result<Self::Response, Self::Error>> + Send>,
    >;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, req: Request<Body>) -> Self::Future {
        let method = req.method().to_string();
        let path = req.uri().path().to_string();

        self.requests
            .lock()
            .unwrap()
            .push((method.clone(), path.clone()));

        let response = self.find_response(&method, &path);

        Box::pin(async move {
            match response {
                Some((status, body)) => Ok(Response::builder()
                    .status(status)
                    .header("content-type", "application/json")
                    .body(Body::from(body.into_bytes()))
                    .unwrap()),
                None => {
                    // Default 404 for unmatched requests
                    let body = r#"{"kind":"Status","apiVersion":"v1","status":"Failure","message":"not found","reason":"NotFound","code":404}"#;
                    Ok(Response::builder()
                        .status(404)
                        .header("content-type", "application/json")
                        .body(Body::from(body.as_bytes().to_vec()))
                        .unwrap())
                }
            }
        })
    }
}

/// A config with the default names and a zero convergence deadline, so tests
/// never sleep.
pub fn test_config() -> Config {
    Config {
        app_name: "sonarqube".to_string(),
        app_project: "default".to_string(),
        repo_url: "https://git.example.com/deploy.git".to_string(),
        revision: "HEAD".to_string(),
        source_path: "sonarqube".to_string(),
        helm_value_files: Vec::new(),
        target_namespace: "sonarqube".to_string(),
        argocd_namespace: "argocd".to_string(),
        destination_server: "https://kubernetes.default.svc".to_string(),
        sync_timeout: Duration::ZERO,
        poll_interval: Duration::from_millis(10),
    }
}

/// Create a mock namespace JSON response
pub fn namespace_json(name: &str) -> String {
    serde_json::json!({
        "apiVersion": "v1",
        "kind": "Namespace",
        "metadata": {
            "name": name,
            "uid": "test-uid"
        }
    })
    .to_string()
}

/// Create a mock /version JSON response
pub fn version_json() -> String {
    serde_json::json!({
        "major": "1",
        "minor": "30",
        "gitVersion": "v1.30.0",
        "gitCommit": "0000000000000000000000000000000000000000",
        "gitTreeState": "clean",
        "buildDate": "2024-01-01T00:00:00Z",
        "goVersion": "go1.22.0",
        "compiler": "gc",
        "platform": "linux/amd64"
    })
    .to_string()
}

/// Create a mock APIGroupList JSON response advertising the argoproj.io group
pub fn argocd_api_group_list_json() -> String {
    serde_json::json!({
        "kind": "APIGroupList",
        "apiVersion": "v1",
        "groups": [{
            "name": "argoproj.io",
            "versions": [
                {"groupVersion": "argoproj.io/v1alpha1", "version": "v1alpha1"}
            ],
            "preferredVersion": {
                "groupVersion": "argoproj.io/v1alpha1",
                "version": "v1alpha1"
            }
        }]
    })
    .to_string()
}

/// Create a mock APIResourceList JSON response for argoproj.io/v1alpha1
pub fn argocd_api_resource_list_json() -> String {
    serde_json::json!({
        "kind": "APIResourceList",
        "apiVersion": "v1",
        "groupVersion": "argoproj.io/v1alpha1",
        "resources": [{
            "name": "applications",
            "singularName": "application",
            "namespaced": true,
            "kind": "Application",
            "verbs": ["get", "list", "watch", "create", "update", "patch", "delete"]
        }]
    })
    .to_string()
}

/// Create a mock ArgoCD Application JSON response with the given sync and
/// health states
pub fn application_json(name: &str, sync: &str, health: &str) -> String {
    serde_json::json!({
        "apiVersion": "argoproj.io/v1alpha1",
        "kind": "Application",
        "metadata": {
            "name": name,
            "namespace": "argocd",
            "uid": "test-uid"
        },
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
            "sync": { "status": sync, "revision": "abc1234def" },
            "health": { "status": health }
        }
    })
    .to_string()
}

/// Create an empty Kubernetes list JSON response of the given kind
pub fn empty_list_json(kind: &str) -> String {
    serde_json::json!({
        "kind": kind,
        "apiVersion": "v1",
        "metadata": {},
        "items": []
    })
    .to_string()
}

/// Create a mock PodList JSON response with a single running pod
pub fn pod_list_json(pod_name: &str) -> String {
    serde_json::json!({
        "kind": "PodList",
        "apiVersion": "v1",
        "metadata": {},
        "items": [{
            "apiVersion": "v1",
            "kind": "Pod",
            "metadata": { "name": pod_name, "namespace": "sonarqube", "uid": "pod-uid" },
            "spec": { "containers": [{ "name": "main", "image": "example" }] },
            "status": {
                "phase": "Running",
                "containerStatuses": [{
                    "name": "main",
                    "ready": true,
                    "restartCount": 0,
                    "image": "example",
                    "imageID": "example@sha256:0"
                }]
            }
        }]
    })
    .to_string()
}

/// Create a 404 not found response
pub fn not_found_json(resource: &str, name: &str) -> String {
    serde_json::json!({
        "kind": "Status",
        "apiVersion": "v1",
        "status": "Failure",
        "message": format!("{} \"{}\" not found", resource, name),
        "reason": "NotFound",
        "code": 404
    })
    .to_string()
}
