// SPDX-License-Identifier: Apache-2.0

//! Kubernetes utilities for client creation, CRD discovery, and namespace
//! management.

pub mod client;
pub mod crd;
pub mod namespaces;

pub use client::create_client;
pub use crd::application_crd_exists;
pub use namespaces::{apply_namespace, build_namespace, delete_namespace, namespace_exists};
