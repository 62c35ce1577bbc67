//! Plugin commands

pub mod cli;
pub mod context;
pub mod create;
pub mod get_manifest;
pub mod options;
pub mod run;
pub mod upgrade;
pub mod wait;
