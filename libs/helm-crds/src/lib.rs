//! Wire models for the captain custom resources
//!
//! Mirrors the JSON shape served by the API server for `HelmRequest` and
//! `Release` objects in the `app.alauda.io/v1` group, plus the handful of core
//! objects the plugin reads or writes.

pub mod models;

pub use models::*;
