// SPDX-License-Identifier: Apache-2.0
pub mod application;

pub use application::{
    Application, ApplicationDestination, ApplicationSource, ApplicationSpec, ApplicationStatus,
    HelmSource, SyncPolicy, SyncPolicyAutomated,
};
