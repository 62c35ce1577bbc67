//! kubectl-captain library
//!
//! Creates and upgrades HelmRequests, waits for the controller to sync them
//! and reads back the manifests of deployed releases.

pub mod app;
pub mod errors;
pub mod kube;
pub mod logs;
pub mod release;
pub mod utils;
pub mod values;
pub mod watch;
