//! Cluster API access

pub mod api;
pub mod client;
pub mod config;
pub mod config_maps;
pub mod events;
pub mod helm_requests;
pub mod releases;

pub use api::{Cluster, EventSink, ReleaseStore, RequestStore, StatusAccessor, ValueSourceStore};
pub use client::KubeClient;
pub use config::{ClusterConfig, KubeconfigOptions, DEFAULT_NAMESPACE};
